//! # Ability Tools
//!
//! Command-line support for content authors:
//! - RON content validation
//! - Content summaries
//! - Exporting the built-in content as a starting point

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod summary;
pub mod validate;
