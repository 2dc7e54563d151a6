//! Comprehensive error handling system using `thiserror` and `anyhow`.
//!
//! This module provides the cross-domain error union for precise error
//! handling and operational error context propagation for rich debugging
//! information.

pub mod domain;
pub mod operational;

pub use {
    domain::ControlError,
    operational::{ErrorReporter, ResultExt},
};
