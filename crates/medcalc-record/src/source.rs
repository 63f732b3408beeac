use std::future::Future;
use std::pin::Pin;

use crate::error::RecordError;
use crate::observation::Observation;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the clinical record.
///
/// Lookups are asynchronous; callers never block on them while a user is
/// entering data.
pub trait RecordSource: Send + Sync {
    /// Whether the record system is connected and has a subject loaded.
    fn is_ready(&self) -> bool;

    /// Most recent observation for `code`. None = no such observation.
    fn observation<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Result<Option<Observation>, RecordError>>;

    /// True when any of `codes` is an active condition.
    fn has_condition<'a>(&'a self, codes: &'a [String]) -> BoxFuture<'a, Result<bool, RecordError>>;
}

/// Source for hosts without a record system. Never ready, never has data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecords;

impl RecordSource for NoRecords {
    fn is_ready(&self) -> bool {
        false
    }

    fn observation<'a>(
        &'a self,
        _code: &'a str,
    ) -> BoxFuture<'a, Result<Option<Observation>, RecordError>> {
        Box::pin(async { Ok(None) })
    }

    fn has_condition<'a>(&'a self, _codes: &'a [String]) -> BoxFuture<'a, Result<bool, RecordError>> {
        Box::pin(async { Ok(false) })
    }
}
