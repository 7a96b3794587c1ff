//! Configuration module for sitecost
//!
//! This module provides configuration management including:
//! - Platform config directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SiteCostPaths;
pub use settings::Settings;
