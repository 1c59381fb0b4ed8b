//! # Lanefall Development Tools
//!
//! Command-line tools for development:
//! - Match config validation
//! - Headless simulation with a scripted player
//! - Replay verification

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod simulate;
pub mod validate;

pub use error::{ToolError, ToolResult};
