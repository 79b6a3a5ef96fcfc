//! Checks for proposed array annotations.
//!
//! A proposal is one of three shapes, each with a single check path:
//!
//! ```text
//! ProposedAnnotation
//!   ├── Value(Null)        -> ValidationError::Null
//!   ├── Value(Map)         -> ValidationError::NestedMapping
//!   ├── Value(List)        -> list path:  non-empty, elements not sequences, len == own_length
//!   ├── Value(scalar)      -> simple-type check, then list path with [scalar]
//!   └── Array(typed)       -> array path: empty -> default-filled to own_length,
//!                                         rank <= 1, len == own_length
//! ```
//!
//! Element checks run before the length check so that nested input is reported as such
//! whatever the object's length.

use chrono::NaiveDateTime;
use ndarray::{Array, Dimension};
use smol_str::SmolStr;

use crate::{
    dataobject::array_annotations::{
        datatype::{AnnotationArray, AnnotationArrayD, TypedArray},
        error::ValidationError,
        AnnotationMap,
    },
    metadata::{check_annotation, AnnotationValue},
    units::quantity::{Quantity, ScalarQuantity},
};

/// A caller-supplied array annotation, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProposedAnnotation {
    /// A plain value: a scalar, a list, a mapping or null.
    Value(AnnotationValue),
    /// An array-backed value with an explicit element kind.
    Array(AnnotationArrayD),
}

impl ProposedAnnotation {
    pub fn array(array: impl Into<AnnotationArrayD>) -> Self {
        ProposedAnnotation::Array(array.into())
    }
}

macro_rules! impl_from_for_proposed_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ProposedAnnotation {
                fn from(value: $ty) -> Self {
                    ProposedAnnotation::Value(value.into())
                }
            }
        )*
    };
}

impl_from_for_proposed_value!(
    AnnotationValue,
    bool,
    i64,
    i32,
    f64,
    String,
    &str,
    NaiveDateTime,
    ScalarQuantity,
);

impl<T: Into<AnnotationValue>> From<Vec<T>> for ProposedAnnotation {
    fn from(values: Vec<T>) -> Self {
        ProposedAnnotation::Value(AnnotationValue::from(values))
    }
}

impl From<AnnotationArrayD> for ProposedAnnotation {
    fn from(array: AnnotationArrayD) -> Self {
        ProposedAnnotation::Array(array)
    }
}

impl From<AnnotationArray> for ProposedAnnotation {
    fn from(array: AnnotationArray) -> Self {
        ProposedAnnotation::Array(array.into_dyn())
    }
}

impl From<Quantity> for ProposedAnnotation {
    fn from(quantity: Quantity) -> Self {
        ProposedAnnotation::Array(quantity.into())
    }
}

impl<A, D> From<Array<A, D>> for ProposedAnnotation
where
    D: Dimension,
    AnnotationArrayD: From<Array<A, D>>,
{
    fn from(array: Array<A, D>) -> Self {
        ProposedAnnotation::Array(array.into())
    }
}

/// Validate every entry of a proposed mapping against `own_length`.
///
/// Nothing is returned unless every entry passes, so callers can merge the result without
/// partial writes.
///
/// # Errors
/// Returns the first [`ValidationError`] encountered.
pub fn check_array_annotations<I, K, V>(
    entries: I,
    own_length: usize,
) -> Result<AnnotationMap, ValidationError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<SmolStr>,
    V: Into<ProposedAnnotation>,
{
    let mut checked = AnnotationMap::new();
    for (key, value) in entries {
        let key = key.into();
        let array = check_array_annotation(value.into(), own_length).inspect_err(|e| {
            tracing::debug!(key = %key, error = %e, "rejected array annotation");
        })?;
        checked.insert(key, array);
    }
    Ok(checked)
}

/// Validate a single proposed value and normalize it into a 1-D array of `own_length`.
///
/// # Errors
/// - [`ValidationError::Null`] for a null value
/// - [`ValidationError::NestedMapping`] for a mapping value
/// - [`ValidationError::NotSimple`] for a value that fails the simple-type check
/// - [`ValidationError::UntypedEmpty`] for an empty plain list
/// - [`ValidationError::NotOneDimensional`] for nested lists or arrays of rank two or more
/// - [`ValidationError::LengthMismatch`] if the length differs from `own_length`
pub fn check_array_annotation(
    value: ProposedAnnotation,
    own_length: usize,
) -> Result<AnnotationArray, ValidationError> {
    match value {
        ProposedAnnotation::Value(AnnotationValue::Null) => Err(ValidationError::Null),
        ProposedAnnotation::Value(AnnotationValue::Map(_)) => Err(ValidationError::NestedMapping),
        ProposedAnnotation::Value(AnnotationValue::List(items)) => check_list(items, own_length),
        ProposedAnnotation::Value(scalar) => {
            check_annotation(&scalar)?;
            check_list(vec![scalar], own_length)
        }
        ProposedAnnotation::Array(array) => check_array(array, own_length),
    }
}

fn check_element(element: &AnnotationValue) -> Result<(), ValidationError> {
    if element.is_sequence() {
        return Err(ValidationError::NotOneDimensional);
    }
    check_annotation(element)?;
    Ok(())
}

fn check_length(actual: usize, expected: usize) -> Result<(), ValidationError> {
    if actual != expected {
        return Err(ValidationError::LengthMismatch { actual, expected });
    }
    Ok(())
}

fn check_list(items: Vec<AnnotationValue>, own_length: usize) -> Result<AnnotationArray, ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::UntypedEmpty);
    }
    items.iter().try_for_each(check_element)?;
    check_length(items.len(), own_length)?;
    Ok(AnnotationArray::from_values(items))
}

fn check_array(array: AnnotationArrayD, own_length: usize) -> Result<AnnotationArray, ValidationError> {
    if array.ndim() > 0 && array.outer_len() == 0 {
        return Ok(array.zeros_like(own_length));
    }
    if array.ndim() > 1 {
        return Err(ValidationError::NotOneDimensional);
    }
    if let TypedArray::Object(elements) = &array {
        elements.iter().try_for_each(check_element)?;
    }
    check_length(array.outer_len(), own_length)?;
    array.into_one_dimensional()
}
