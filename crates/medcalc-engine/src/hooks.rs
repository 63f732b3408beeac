//! Author-supplied callbacks and the guard they run under.
//!
//! A hook that returns an error or panics is logged and skipped. The rest of
//! the pipeline keeps running.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::error;

use medcalc_core::models::result::ResultItem;
use medcalc_core::units::UnitConversion;
use medcalc_record::source::{BoxFuture, RecordSource};
use medcalc_record::subject::Subject;
use medcalc_widgets::render::Widgets;

use crate::error::HookError;
use crate::fragment::Fragment;
use crate::prefill::FragmentWriter;
use crate::resolver::Values;

/// Everything a custom result renderer may look at.
pub struct RenderInput<'a> {
    /// Score total, or the value a complex evaluator asked to classify.
    pub score: Option<f64>,
    /// Rows produced by the evaluator.
    pub items: &'a [ResultItem],
    pub values: &'a Values,
    /// Per-group points of a score calculator; empty otherwise.
    pub breakdown: &'a BTreeMap<String, f64>,
    pub widgets: &'a Widgets,
}

/// Replaces classification and default rendering entirely.
pub type CustomRenderer = dyn Fn(&RenderInput<'_>) -> Result<String, HookError> + Send + Sync;

/// Runs once, on the first attach of a fragment.
pub type CustomInitialize = dyn Fn(&Fragment, &Subject) -> Result<(), HookError> + Send + Sync;

/// Handed to a custom auto-population hook.
#[derive(Clone)]
pub struct PrefillContext {
    pub writer: FragmentWriter,
    pub record: Arc<dyn RecordSource>,
    pub subject: Subject,
    pub units: Arc<dyn UnitConversion>,
}

/// Custom auto-population, run after the declarative pass.
pub type PrefillHook =
    dyn Fn(PrefillContext) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync;

/// Runs `hook`, catching errors and panics.
pub(crate) fn guard<T>(
    calculator: &str,
    hook: &'static str,
    f: impl FnOnce() -> Result<T, HookError>,
) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            error!(calculator, hook, error = %e, "hook failed");
            None
        }
        Err(payload) => {
            error!(calculator, hook, panic = %panic_message(payload.as_ref()), "hook panicked");
            None
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
