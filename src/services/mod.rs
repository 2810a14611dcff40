//! # Business Logic Services
//!
//! This module contains the services the photo settings handlers depend on.
//! Services encapsulate domain-specific functionality and provide clean interfaces
//! for use by HTTP handlers and other application components.
//!
//! ## Available Services
//!
//! - **CSRF** (`csrf`) - Double-submit anti-forgery token issuance and validation
//! - **Image Store** (`image_store`) - Profile photo persistence with multiple implementations
//! - **JWT** (`jwt`) - JSON Web Token creation and validation

pub mod csrf;
pub mod image_store;
pub mod jwt;
