pub mod formula;
pub mod input;
pub mod result;
pub mod risk;
pub mod severity;
