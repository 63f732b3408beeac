//! medcalc-widgets
//!
//! Markup construction for calculator fields, sections, alerts and result
//! rows. Every function is pure: configuration in, markup string out.

pub mod error;
pub mod render;
