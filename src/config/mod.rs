//! Configuration module for quiz2moodle
//!
//! This module handles converter settings, including
//! serialization/deserialization to/from JSON and discovery of the
//! configuration file in platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
