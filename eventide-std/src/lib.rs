//! # eventide-std
//!
//! Standard implementations for the Eventide in-process event bus.
//!
//! This crate provides:
//! - **Hierarchy flattening**: [`TypeHierarchyCache`]
//! - **Handler storage**: [`HandlerRegistry`]
//! - **Handler discovery**: [`DeclaredHandlerFinder`]
//! - **Observability**: [`LoggingSink`](logging::LoggingSink)
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use eventide_core;

// Modules
pub mod finder;
pub mod hierarchy;
pub mod logging;
pub mod registry;
pub mod testing;

pub use finder::DeclaredHandlerFinder;
pub use hierarchy::TypeHierarchyCache;
pub use registry::HandlerRegistry;
