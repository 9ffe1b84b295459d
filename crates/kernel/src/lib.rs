//! Core traits, settings, validation rules, and module registry for the course library.

pub mod module;
pub mod patch;
pub mod registry;
pub mod settings;
pub mod validation;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
