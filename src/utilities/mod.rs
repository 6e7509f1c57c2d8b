//! Shared helpers: environment configuration and placeholder interpolation.

pub mod config;
pub mod string_utils;

pub use config::{MentorConfig, StoreLocation};
