//! Host-facing embedding helpers
//!
//! - `native`: build host closures into callable `Value`s

pub mod native;

pub use native::NativeFunctionBuilder;
