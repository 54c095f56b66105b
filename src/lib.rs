//! tokdash: cost & token analytics for AI coding-assistant usage exports
//!
//! Parse an export with [`parsers::load_usage_log`], then derive each view
//! with the pure functions in [`services`].

pub mod format;
pub mod logging;
pub mod parsers;
pub mod services;
pub mod types;
