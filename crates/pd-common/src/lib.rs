//! plandiff common types and errors.
//!
//! This crate provides the foundational types shared by every plandiff crate:
//! - [`ConfigValue`], the recursive value tree all comparisons operate on
//! - [`ResourceRecord`] and [`EnvironmentSnapshot`], the comparison inputs
//! - the unified [`Error`] with stable codes

pub mod error;
pub mod resource;
pub mod value;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use resource::{path_is_within, EnvironmentSnapshot, ResourceRecord};
pub use value::ConfigValue;
