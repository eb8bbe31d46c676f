pub mod core;
pub mod substitutions;
