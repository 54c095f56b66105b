//! Type definitions for tokdash

mod error;
mod usage;

pub use error::*;
pub use usage::*;
