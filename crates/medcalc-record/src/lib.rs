//! medcalc-record
//!
//! Interface to the clinical record system that calculators read from when
//! pre-filling fields, plus two local implementations: an in-memory record
//! (fixtures, tests, the CLI) and a source for hosts with no record system.

pub mod error;
pub mod memory;
pub mod observation;
pub mod source;
pub mod subject;
