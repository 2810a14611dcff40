//! # Utility Modules
//!
//! This module contains utility functions and constants used throughout the
//! photo settings service.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Application-wide configuration constants
//! - **Multipart** (`multipart`) - Reading the photo form from a multipart body
//! - **Secrets** (`secret`) - Loading secrets from files or env variables
//! - **Statics** (`static_object`) - Lazily read environment settings

pub mod constant;
pub mod multipart;
pub mod secret;
pub mod static_object;
