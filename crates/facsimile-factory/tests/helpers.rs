//! Test helpers for facsimile-factory tests.
//!
//! This module provides a shared model registry and recording collaborators
//! used across the integration tests.

#[path = "helpers/models.rs"]
pub mod models;
