//! Manufacturing engine module.
//!
//! The factory, its collaborators and the provider configuration.

pub use facsimile_factory::*;
