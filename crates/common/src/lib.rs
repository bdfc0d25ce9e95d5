//! Shared configuration, error taxonomy and entity types.

pub mod config;
pub mod error;
pub mod types;
