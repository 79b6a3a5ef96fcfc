//! Whole-object metadata.
//!
//! This module contains [`BaseMetadata`] (name, description, file origin and free-form
//! annotations) and [`AnnotationValue`], the value type shared by whole-object annotations
//! and array-annotation elements.
//!
//! ## Simple types
//! An annotation value is *simple* if it is null, a boolean, a number, a string, a date/time,
//! a unit-bearing scalar, or a list/map of simple values. [`check_annotation`] enforces this.
//! [`AnnotationValue::Foreign`] stands for a host value of any other type (for instance an
//! object handed over by a scripting binding); it can be represented but never stored.
//!
//! ### JSON
//! Values serialize untagged:
//! ```json
//! {
//!    "electrode": "E12",
//!    "depth": 1.25,
//!    "channel": 4,
//!    "sorted": true,
//!    "recorded": "2024-03-01T10:15:00",
//!    "impedance": { "value": 1.2, "units": "MOhm" },
//!    "missing": null
//! }
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use smol_str::SmolStr;
use thiserror::Error;

use crate::units::quantity::ScalarQuantity;

/// Errors from the simple-type check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("annotation value of type `{type_name}` is not a simple type")]
    NotSimple { type_name: SmolStr },
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    String(String),
    Quantity(ScalarQuantity),
    List(Vec<AnnotationValue>),
    Map(BTreeMap<String, AnnotationValue>),
    #[serde(skip)]
    Foreign { type_name: SmolStr },
}

impl AnnotationValue {
    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnnotationValue::Null => "null",
            AnnotationValue::Boolean(_) => "bool",
            AnnotationValue::Integer(_) => "int",
            AnnotationValue::Float(_) => "float",
            AnnotationValue::DateTime(_) => "datetime",
            AnnotationValue::String(_) => "str",
            AnnotationValue::Quantity(_) => "quantity",
            AnnotationValue::List(_) => "list",
            AnnotationValue::Map(_) => "map",
            AnnotationValue::Foreign { .. } => "foreign",
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, AnnotationValue::List(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AnnotationValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnnotationValue::Float(v) => Some(*v),
            AnnotationValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }}

macro_rules! impl_from_for_annotation_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for AnnotationValue {
                fn from(value: $ty) -> Self {
                    AnnotationValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_annotation_value!(
    bool => Boolean,
    i64 => Integer,
    i32 => Integer,
    u32 => Integer,
    f64 => Float,
    f32 => Float,
    String => String,
    &str => String,
    NaiveDateTime => DateTime,
    ScalarQuantity => Quantity,
);

impl<T: Into<AnnotationValue>> From<Vec<T>> for AnnotationValue {
    fn from(values: Vec<T>) -> Self {
        AnnotationValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AnnotationValue>> From<BTreeMap<String, T>> for AnnotationValue {
    fn from(entries: BTreeMap<String, T>) -> Self {
        AnnotationValue::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Check that `value` is a simple type, recursing into lists and maps.
///
/// # Errors
/// Returns [`AnnotationError::NotSimple`] for the first [`AnnotationValue::Foreign`] found.
pub fn check_annotation(value: &AnnotationValue) -> Result<(), AnnotationError> {
    match value {
        AnnotationValue::Foreign { type_name } => Err(AnnotationError::NotSimple {
            type_name: type_name.clone(),
        }),
        AnnotationValue::List(items) => items.iter().try_for_each(check_annotation),
        AnnotationValue::Map(entries) => entries.values().try_for_each(check_annotation),
        _ => Ok(()),
    }
}

/// Name, description, origin and free-form annotations of a data object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub file_origin: Option<String>,
    annotations: BTreeMap<String, AnnotationValue>,
}

impl BaseMetadata {
    /// # Errors
    /// Returns [`AnnotationError`] if any annotation is not a simple type.
    pub fn new<I, K>(
        name: Option<String>,
        description: Option<String>,
        file_origin: Option<String>,
        annotations: I,
    ) -> Result<Self, AnnotationError>
    where
        I: IntoIterator<Item = (K, AnnotationValue)>,
        K: Into<String>,
    {
        let mut metadata = Self {
            name,
            description,
            file_origin,
            annotations: BTreeMap::new(),
        };
        metadata.annotate(annotations)?;
        Ok(metadata)
    }

    /// Add or overwrite annotations.
    ///
    /// All values are checked before any is stored.
    pub fn annotate<I, K>(&mut self, annotations: I) -> Result<(), AnnotationError>
    where
        I: IntoIterator<Item = (K, AnnotationValue)>,
        K: Into<String>,
    {
        let annotations: Vec<(String, AnnotationValue)> = annotations
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();
        for (_, value) in &annotations {
            check_annotation(value)?;
        }
        self.annotations.extend(annotations);
        Ok(())
    }

    pub fn annotations(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.annotations
    }

    pub fn annotation(&self, key: &str) -> Option<&AnnotationValue> {
        self.annotations.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foreign() -> AnnotationValue {
        AnnotationValue::Foreign {
            type_name: SmolStr::new("Figure"),
        }
    }

    #[test]
    fn simple_values_pass() {
        let values = [
            AnnotationValue::Null,
            AnnotationValue::from(true),
            AnnotationValue::from(3),
            AnnotationValue::from(1.5),
            AnnotationValue::from("E12"),
            AnnotationValue::from(vec![1, 2, 3]),
        ];
        for value in &values {
            check_annotation(value).unwrap();
        }
    }

    #[test]
    fn foreign_value_is_rejected_even_when_nested() {
        let nested = AnnotationValue::List(vec![
            AnnotationValue::from(1),
            AnnotationValue::Map(BTreeMap::from([("plot".to_string(), foreign())])),
        ]);
        let err = match check_annotation(&nested) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert_eq!(
            err,
            AnnotationError::NotSimple {
                type_name: SmolStr::new("Figure")
            }
        );
    }

    #[test]
    fn annotate_is_all_or_nothing() {
        let mut metadata =
            BaseMetadata::new(Some("trial 1".into()), None, None, [("good", AnnotationValue::from(true))])
                .unwrap();
        let result = metadata.annotate([("depth", AnnotationValue::from(1.25)), ("plot", foreign())]);
        assert!(result.is_err());
        assert_eq!(metadata.annotations().len(), 1);
        assert_eq!(metadata.annotation("good"), Some(&AnnotationValue::Boolean(true)));
    }

    #[test]
    fn untagged_json_roundtrip() {
        let value = AnnotationValue::Map(BTreeMap::from([
            ("channel".to_string(), AnnotationValue::from(4)),
            ("label".to_string(), AnnotationValue::from("E12")),
            ("missing".to_string(), AnnotationValue::Null),
        ]));
        let mut bytes = simd_json::to_vec(&value).unwrap();
        let back: AnnotationValue = simd_json::from_slice(&mut bytes).unwrap();
        assert_eq!(back, value);
    }
}
