//! medcalc-engine
//!
//! Turns a static [`config::CalculatorConfig`] into a [`compile::RuntimeUnit`]
//! that renders its markup and, once attached to a live [`fragment::Fragment`],
//! recomputes and classifies its result on every field change.
//!
//! Three evaluation modes share one pipeline: direct formulas, multi-step
//! formulas that branch on categorical inputs, and point scores.

pub mod attach;
pub mod classify;
pub mod compile;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod fragment;
pub mod history;
pub mod hooks;
pub mod prefill;
pub mod render;
pub mod resolver;
pub mod settings;
