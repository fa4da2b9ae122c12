//! The functional parts of the application, one module per feature.

pub mod info;
pub mod item;
