//! medcalc-calculators
//!
//! Built-in clinical calculator configurations and the [`registry::Registry`]
//! hosts look them up in. Pure declarations: every calculator here is data
//! plus small formula closures handed to the engine.

pub mod calculators;
pub mod error;
pub mod registry;
