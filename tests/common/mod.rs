//! Common test utilities for geoscatter.
//!
//! This module provides fixture generation and image/SVG assertions shared by the
//! integration tests.

// Re-export all common test utilities
pub mod assertions;
pub mod image_utils;
pub mod test_data;
