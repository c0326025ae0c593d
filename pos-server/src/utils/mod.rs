//! Utility functions

pub mod logger;
