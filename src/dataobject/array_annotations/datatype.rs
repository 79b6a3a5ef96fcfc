//! Typed annotation arrays.
//!
//! [`TypedArray`] is an `ndarray` array tagged with its element kind ([`DataType`]).
//! - [`AnnotationArray`] (`TypedArray<Ix1>`) is the canonical, stored form.
//! - [`AnnotationArrayD`] (`TypedArray<IxDyn>`) is what callers propose; it may have any rank
//!   and any length until validation turns it into an `AnnotationArray`.
//!
//! ## Kind inference
//! Plain lists of [`AnnotationValue`]s are converted with [`AnnotationArray::from_values`],
//! which picks the narrowest kind that holds every element:
//!
//! ```text
//! [true, false]           -> Bool
//! [1, 2, 3]               -> I64
//! [1, 2.5]                -> F64
//! ["a", "b"]              -> Utf8
//! [t0, t1]                -> Timestamp
//! [1 ms, 2 ms]            -> Quantity (ms)
//! [1 ms, 2 s] / [1, "a"]  -> Object
//! ```

use chrono::NaiveDateTime;
use ndarray::{Array, Array1, Axis, Dimension, Ix1, IxDyn};

use crate::{
    dataobject::array_annotations::error::ValidationError,
    dtype::DataType,
    metadata::{check_annotation, AnnotationValue},
    units::{quantity::Quantity, quantity::ScalarQuantity, Unit},
};

/// An `ndarray` array of annotation elements, tagged with its element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray<D: Dimension> {
    Integer(Array<i64, D>),
    Float(Array<f64, D>),
    Boolean(Array<bool, D>),
    Utf8(Array<String, D>),
    DateTime(Array<NaiveDateTime, D>),
    Quantity { values: Array<f64, D>, units: Unit },
    Object(Array<AnnotationValue, D>),
}

/// A stored, one-dimensional array annotation.
pub type AnnotationArray = TypedArray<Ix1>;

/// A proposed array annotation of any rank.
pub type AnnotationArrayD = TypedArray<IxDyn>;

/// Evaluate `$body` with `$values` bound to the inner `ndarray` array, whatever the kind.
macro_rules! with_values {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            TypedArray::Integer($values) => $body,
            TypedArray::Float($values) => $body,
            TypedArray::Boolean($values) => $body,
            TypedArray::Utf8($values) => $body,
            TypedArray::DateTime($values) => $body,
            TypedArray::Quantity { values: $values, .. } => $body,
            TypedArray::Object($values) => $body,
        }
    };
}

/// Rebuild a `TypedArray` of the same kind (and units) from `$body`.
macro_rules! map_values {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            TypedArray::Integer($values) => TypedArray::Integer($body),
            TypedArray::Float($values) => TypedArray::Float($body),
            TypedArray::Boolean($values) => TypedArray::Boolean($body),
            TypedArray::Utf8($values) => TypedArray::Utf8($body),
            TypedArray::DateTime($values) => TypedArray::DateTime($body),
            TypedArray::Quantity {
                values: $values,
                units,
            } => TypedArray::Quantity {
                values: $body,
                units: units.clone(),
            },
            TypedArray::Object($values) => TypedArray::Object($body),
        }
    };
}

impl<D: Dimension> TypedArray<D> {
    pub fn data_type(&self) -> DataType {
        match self {
            TypedArray::Integer(_) => DataType::I64,
            TypedArray::Float(_) => DataType::F64,
            TypedArray::Boolean(_) => DataType::Bool,
            TypedArray::Utf8(_) => DataType::Utf8,
            TypedArray::DateTime(_) => DataType::Timestamp,
            TypedArray::Quantity { .. } => DataType::Quantity,
            TypedArray::Object(_) => DataType::Object,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_values!(self, values => values.shape())
    }

    pub fn ndim(&self) -> usize {
        with_values!(self, values => values.ndim())
    }

    /// Units of a [`TypedArray::Quantity`] array.
    pub fn units(&self) -> Option<&Unit> {
        match self {
            TypedArray::Quantity { units, .. } => Some(units),
            _ => None,
        }
    }

    /// A default-filled 1-D array of `len` elements with the same kind (and units).
    ///
    /// Defaults are `0`, `0.0`, `false`, `""`, the UNIX epoch and null.
    pub fn zeros_like(&self, len: usize) -> AnnotationArray {
        match self {
            TypedArray::Integer(_) => TypedArray::Integer(Array1::zeros(len)),
            TypedArray::Float(_) => TypedArray::Float(Array1::zeros(len)),
            TypedArray::Boolean(_) => TypedArray::Boolean(Array1::from_elem(len, false)),
            TypedArray::Utf8(_) => TypedArray::Utf8(Array1::from_elem(len, String::new())),
            TypedArray::DateTime(_) => {
                TypedArray::DateTime(Array1::from_elem(len, NaiveDateTime::default()))
            }
            TypedArray::Quantity { units, .. } => TypedArray::Quantity {
                values: Array1::zeros(len),
                units: units.clone(),
            },
            TypedArray::Object(_) => TypedArray::Object(Array1::from_elem(len, AnnotationValue::Null)),
        }
    }

    pub fn into_dyn(self) -> AnnotationArrayD {
        map_values!(self, values => values.into_dyn())
    }
}

impl AnnotationArrayD {
    /// A typed empty array, used to request a default-filled annotation.
    ///
    /// `DataType::Quantity` yields a dimensionless quantity; use [`Self::empty_quantity`] to
    /// choose the unit.
    pub fn empty(data_type: DataType) -> Self {
        let shape = IxDyn(&[0]);
        match data_type {
            DataType::I64 => TypedArray::Integer(Array::zeros(shape)),
            DataType::F64 => TypedArray::Float(Array::zeros(shape)),
            DataType::Bool => TypedArray::Boolean(Array::from_elem(shape, false)),
            DataType::Utf8 => TypedArray::Utf8(Array::from_elem(shape, String::new())),
            DataType::Timestamp => {
                TypedArray::DateTime(Array::from_elem(shape, NaiveDateTime::default()))
            }
            DataType::Quantity => Self::empty_quantity(Unit::dimensionless()),
            DataType::Object => TypedArray::Object(Array::from_elem(shape, AnnotationValue::Null)),
        }
    }

    pub fn empty_quantity(units: Unit) -> Self {
        TypedArray::Quantity {
            values: Array::zeros(IxDyn(&[0])),
            units,
        }
    }

    /// Length of the outermost axis; a 0-d array counts as one element.
    pub fn outer_len(&self) -> usize {
        self.shape().first().copied().unwrap_or(1)
    }

    /// Convert into the stored 1-D form. A 0-d array becomes a one-element array.
    ///
    /// # Errors
    /// Returns [`ValidationError::NotOneDimensional`] for arrays of rank two or more.
    pub fn into_one_dimensional(self) -> Result<AnnotationArray, ValidationError> {
        let array = if self.ndim() == 0 {
            map_values!(self, values => values.insert_axis(Axis(0)))
        } else {
            self
        };
        Ok(map_values!(array, values => values
            .into_dimensionality::<Ix1>()
            .map_err(|_| ValidationError::NotOneDimensional)?))
    }
}

macro_rules! impl_from_ndarray {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<D: Dimension> From<Array<$ty, D>> for AnnotationArrayD {
                fn from(values: Array<$ty, D>) -> Self {
                    TypedArray::$variant(values.into_dyn())
                }
            }
        )*
    };
}

impl_from_ndarray!(
    i64 => Integer,
    f64 => Float,
    bool => Boolean,
    String => Utf8,
    NaiveDateTime => DateTime,
    AnnotationValue => Object,
);

impl From<Quantity> for AnnotationArrayD {
    fn from(quantity: Quantity) -> Self {
        TypedArray::Quantity {
            values: quantity.to_magnitude(),
            units: quantity.units().clone(),
        }
    }
}

impl From<AnnotationArray> for AnnotationArrayD {
    fn from(array: AnnotationArray) -> Self {
        array.into_dyn()
    }
}

fn infer_data_type(values: &[AnnotationValue]) -> DataType {
    use AnnotationValue as V;

    if values.iter().all(|v| matches!(v, V::Boolean(_))) {
        DataType::Bool
    } else if values.iter().all(|v| matches!(v, V::Integer(_))) {
        DataType::I64
    } else if values.iter().all(|v| matches!(v, V::Integer(_) | V::Float(_))) {
        DataType::F64
    } else if values.iter().all(|v| matches!(v, V::String(_))) {
        DataType::Utf8
    } else if values.iter().all(|v| matches!(v, V::DateTime(_))) {
        DataType::Timestamp
    } else if common_units(values).is_some() {
        DataType::Quantity
    } else {
        DataType::Object
    }
}

/// The unit shared by every element, if all elements are quantities in the same unit.
fn common_units(values: &[AnnotationValue]) -> Option<&Unit> {
    let AnnotationValue::Quantity(first) = values.first()? else {
        return None;
    };
    values
        .iter()
        .all(|v| matches!(v, AnnotationValue::Quantity(q) if q.units == first.units))
        .then_some(&first.units)
}

impl AnnotationArray {
    /// Build the canonical array for a plain list, preserving order.
    pub fn from_values(values: Vec<AnnotationValue>) -> AnnotationArray {
        use AnnotationValue as V;

        match infer_data_type(&values) {
            DataType::Bool => TypedArray::Boolean(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        V::Boolean(b) => Some(b),
                        _ => None,
                    })
                    .collect(),
            ),
            DataType::I64 => TypedArray::Integer(values.into_iter().filter_map(|v| v.as_i64()).collect()),
            DataType::F64 => TypedArray::Float(values.into_iter().filter_map(|v| v.as_f64()).collect()),
            DataType::Utf8 => TypedArray::Utf8(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        V::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            DataType::Timestamp => TypedArray::DateTime(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        V::DateTime(t) => Some(t),
                        _ => None,
                    })
                    .collect(),
            ),
            DataType::Quantity => {
                let units = common_units(&values)
                    .cloned()
                    .unwrap_or_else(Unit::dimensionless);
                TypedArray::Quantity {
                    values: values
                        .into_iter()
                        .filter_map(|v| match v {
                            V::Quantity(q) => Some(q.value),
                            _ => None,
                        })
                        .collect(),
                    units,
                }
            }
            DataType::Object => TypedArray::Object(Array1::from(values)),
        }
    }

    pub fn len(&self) -> usize {
        with_values!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index` as an [`AnnotationValue`].
    pub fn get(&self, index: usize) -> Option<AnnotationValue> {
        match self {
            TypedArray::Integer(a) => a.get(index).map(|&v| AnnotationValue::Integer(v)),
            TypedArray::Float(a) => a.get(index).map(|&v| AnnotationValue::Float(v)),
            TypedArray::Boolean(a) => a.get(index).map(|&v| AnnotationValue::Boolean(v)),
            TypedArray::Utf8(a) => a.get(index).map(|v| AnnotationValue::String(v.clone())),
            TypedArray::DateTime(a) => a.get(index).map(|&v| AnnotationValue::DateTime(v)),
            TypedArray::Quantity { values, units } => values
                .get(index)
                .map(|&v| AnnotationValue::Quantity(ScalarQuantity::new(v, units.clone()))),
            TypedArray::Object(a) => a.get(index).cloned(),
        }
    }

    pub fn to_values(&self) -> Vec<AnnotationValue> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Gather the elements at `positions` into a new array.
    ///
    /// # Panics
    /// Panics if a position is out of bounds; callers resolve positions first.
    pub fn select(&self, positions: &[usize]) -> AnnotationArray {
        map_values!(self, values => values.select(Axis(0), positions))
    }

    /// Overwrite element `index` with `value`.
    ///
    /// Integers widen into float arrays and quantities are converted into the array's unit.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds; callers resolve positions first.
    pub(crate) fn set(&mut self, index: usize, value: &AnnotationValue) -> Result<(), ValidationError> {
        let expected = self.data_type();
        let mismatch = || ValidationError::ElementTypeMismatch {
            expected,
            found: value.kind_name(),
        };
        match (self, value) {
            (TypedArray::Integer(a), AnnotationValue::Integer(v)) => a[index] = *v,
            (TypedArray::Float(a), AnnotationValue::Float(v)) => a[index] = *v,
            (TypedArray::Float(a), AnnotationValue::Integer(v)) => a[index] = *v as f64,
            (TypedArray::Boolean(a), AnnotationValue::Boolean(v)) => a[index] = *v,
            (TypedArray::Utf8(a), AnnotationValue::String(v)) => a[index] = v.clone(),
            (TypedArray::DateTime(a), AnnotationValue::DateTime(v)) => a[index] = *v,
            (TypedArray::Quantity { values, units }, AnnotationValue::Quantity(q)) => {
                values[index] = q.rescale(units).map_err(|_| mismatch())?.value;
            }
            (TypedArray::Object(a), v) => {
                if v.is_sequence() {
                    return Err(ValidationError::NotOneDimensional);
                }
                check_annotation(v)?;
                a[index] = v.clone();
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms() -> Unit {
        Unit::parse("ms").unwrap()
    }

    fn values<T: Into<AnnotationValue>>(items: Vec<T>) -> Vec<AnnotationValue> {
        items.into_iter().map(Into::into).collect()
    }

    #[test]
    fn from_values_infers_narrowest_kind() {
        assert_eq!(AnnotationArray::from_values(values(vec![true, false])).data_type(), DataType::Bool);
        assert_eq!(AnnotationArray::from_values(values(vec![1, 2, 3])).data_type(), DataType::I64);
        assert_eq!(AnnotationArray::from_values(values(vec!["a", "b"])).data_type(), DataType::Utf8);

        let mixed = vec![AnnotationValue::from(1), AnnotationValue::from(2.5)];
        let floats = AnnotationArray::from_values(mixed);
        assert_eq!(floats, TypedArray::Float(ndarray::array![1.0, 2.5]));

        let heterogeneous = vec![AnnotationValue::from(1), AnnotationValue::from("a")];
        assert_eq!(AnnotationArray::from_values(heterogeneous).data_type(), DataType::Object);
    }

    #[test]
    fn from_values_keeps_shared_units() {
        let same = vec![
            AnnotationValue::from(ScalarQuantity::new(1.0, ms())),
            AnnotationValue::from(ScalarQuantity::new(2.0, ms())),
        ];
        let array = AnnotationArray::from_values(same);
        assert_eq!(array.units(), Some(&ms()));
        assert_eq!(array.get(1), Some(AnnotationValue::Quantity(ScalarQuantity::new(2.0, ms()))));

        let different = vec![
            AnnotationValue::from(ScalarQuantity::new(1.0, ms())),
            AnnotationValue::from(ScalarQuantity::new(2.0, Unit::parse("s").unwrap())),
        ];
        assert_eq!(AnnotationArray::from_values(different).data_type(), DataType::Object);
    }

    #[test]
    fn zeros_like_preserves_kind_and_units() {
        let empty = AnnotationArrayD::empty_quantity(ms());
        let filled = empty.zeros_like(3);
        assert_eq!(filled.len(), 3);
        assert_eq!(filled.units(), Some(&ms()));

        let labels = AnnotationArrayD::empty(DataType::Utf8).zeros_like(2);
        assert_eq!(labels.to_values(), values(vec!["", ""]));
    }

    #[test]
    fn into_one_dimensional_wraps_scalars_and_rejects_matrices() {
        let scalar = AnnotationArrayD::from(ndarray::arr0(7i64));
        let wrapped = scalar.into_one_dimensional().unwrap();
        assert_eq!(wrapped.to_values(), values(vec![7]));

        let matrix = AnnotationArrayD::from(ndarray::array![[1i64, 2], [3, 4]]);
        let err = match matrix.into_one_dimensional() {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, ValidationError::NotOneDimensional));
    }

    #[test]
    fn select_gathers_positions() {
        let array = AnnotationArray::from_values(values(vec!["a", "b", "c", "d"]));
        let picked = array.select(&[3, 0]);
        assert_eq!(picked.to_values(), values(vec!["d", "a"]));
    }

    #[test]
    fn set_widens_and_converts() {
        let mut floats = AnnotationArray::from_values(values(vec![0.5, 1.5]));
        floats.set(0, &AnnotationValue::from(2)).unwrap();
        assert_eq!(floats.get(0), Some(AnnotationValue::Float(2.0)));

        let mut durations = TypedArray::Quantity {
            values: ndarray::array![1.0, 2.0],
            units: ms(),
        };
        durations
            .set(1, &AnnotationValue::from(ScalarQuantity::new(0.5, Unit::parse("s").unwrap())))
            .unwrap();
        match durations.get(1) {
            Some(AnnotationValue::Quantity(q)) => assert!((q.value - 500.0).abs() < 1e-9),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut ints = AnnotationArray::from_values(values(vec![1, 2]));
        let err = match ints.set(0, &AnnotationValue::from("x")) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert_eq!(
            err,
            ValidationError::ElementTypeMismatch {
                expected: DataType::I64,
                found: "str"
            }
        );
        assert_eq!(ints.get(0), Some(AnnotationValue::Integer(1)));
    }
}
