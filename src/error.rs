use crate::{
    dataobject::array_annotations::{error::ValidationError, index::IndexError},
    metadata::AnnotationError,
    units::error::UnitConversionError,
};

/// Errors raised while building or transforming a data object.
#[derive(Debug, thiserror::Error)]
pub enum DataObjectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    UnitConversion(#[from] UnitConversionError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("{kind} data must have at most {max_ndim} dimensions, got shape {shape:?}")]
    Shape {
        kind: &'static str,
        max_ndim: usize,
        shape: Vec<usize>,
    },
}
