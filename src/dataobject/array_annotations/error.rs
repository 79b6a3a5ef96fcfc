use smol_str::SmolStr;
use thiserror::Error;

use crate::{dtype::DataType, metadata::AnnotationError};

/// Errors returned when a proposed array annotation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A mapping value was itself a mapping.
    #[error("nested mappings are not allowed as array annotations")]
    NestedMapping,
    #[error("array annotations must not be null")]
    Null,
    /// An element failed the simple-type check.
    #[error(transparent)]
    NotSimple(#[from] AnnotationError),
    /// An empty plain list carries no element type to fill with.
    #[error(
        "empty array annotation without data type; use a typed empty array to create an uninitialized array annotation"
    )]
    UntypedEmpty,
    #[error("incorrect length of array annotation: {actual} != {expected}")]
    LengthMismatch { actual: usize, expected: usize },
    /// An element was itself a sequence.
    #[error("array annotations must be one-dimensional")]
    NotOneDimensional,
    /// A write through an index view did not fit the stored element kind.
    #[error("cannot store a {found} value in a {expected} array annotation")]
    ElementTypeMismatch {
        expected: DataType,
        found: &'static str,
    },
    #[error("no array annotation named `{key}`")]
    UnknownKey { key: SmolStr },
}
