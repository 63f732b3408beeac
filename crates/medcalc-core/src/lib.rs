//! medcalc-core
//!
//! Pure domain types for declarative clinical calculators and the unit
//! conversion service. No async, no I/O. This is the shared vocabulary of
//! the engine, the widget builder and the calculator catalog.

pub mod error;
pub mod models;
pub mod units;
