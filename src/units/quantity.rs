//! Unit-tagged arrays.
//!
//! [`Quantity`] wraps an `ndarray::ArcArray<f64, IxDyn>` together with a [`Unit`]. The backing
//! buffer is reference counted:
//! - `clone()` shares the buffer (copy-on-write on mutation).
//! - [`Quantity::deep_copy`] always copies the buffer.
//! - [`Quantity::rescale`] produces a new buffer in the target unit.
//!
//! The last axis is the *index* axis of a data object. A 0-d quantity has no index axis and
//! counts as one sample.

use ndarray::{ArcArray, Array, ArrayD, ArrayViewD, Axis, Dimension, IxDyn};

use crate::units::{error::UnitConversionError, Unit};

/// An N-dimensional `f64` array tagged with a physical unit.
#[derive(Debug, Clone)]
pub struct Quantity {
    data: ArcArray<f64, IxDyn>,
    units: Unit,
}

impl Quantity {
    pub fn new<D: Dimension>(data: Array<f64, D>, units: Unit) -> Self {
        Self {
            data: data.into_dyn().into_shared(),
            units,
        }
    }

    /// A 1-D quantity.
    pub fn from_vec(values: Vec<f64>, units: Unit) -> Self {
        Self::new(ndarray::Array1::from(values), units)
    }

    /// A 0-d quantity.
    pub fn scalar(value: f64, units: Unit) -> Self {
        Self::new(ndarray::arr0(value), units)
    }

    pub fn units(&self) -> &Unit {
        &self.units
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Length of the last axis, or `1` when there is no axis.
    pub fn index_len(&self) -> usize {
        self.data.shape().last().copied().unwrap_or(1)
    }

    /// Borrow the raw magnitudes.
    pub fn magnitude(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    /// Owned copy of the raw magnitudes.
    pub fn to_magnitude(&self) -> ArrayD<f64> {
        self.data.to_owned()
    }

    /// Convert into `units`.
    ///
    /// # Errors
    /// Returns [`UnitConversionError::Incompatible`] if the dimensionalities differ.
    pub fn rescale(&self, units: &Unit) -> Result<Quantity, UnitConversionError> {
        let factor = self.units.conversion_factor(units)?;
        Ok(Self {
            data: self.data.mapv(|v| v * factor).into_shared(),
            units: units.clone(),
        })
    }

    /// Copy the buffer so that the result shares nothing with `self`.
    pub fn deep_copy(&self) -> Quantity {
        Self {
            data: self.data.to_owned().into_shared(),
            units: self.units.clone(),
        }
    }

    /// Whether both quantities read from the same buffer.
    pub fn shares_data_with(&self, other: &Quantity) -> bool {
        self.data.as_ptr() == other.data.as_ptr()
    }

    /// Append a trailing axis of length one (`[n] -> [n, 1]`).
    pub fn into_column(self) -> Quantity {
        let ndim = self.data.ndim();
        Self {
            data: self.data.insert_axis(Axis(ndim)),
            units: self.units,
        }
    }
}

/// A single magnitude with a unit.
///
/// This is the 0-d unit-bearing value accepted as an annotation element.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScalarQuantity {
    pub value: f64,
    pub units: Unit,
}

impl ScalarQuantity {
    pub fn new(value: f64, units: Unit) -> Self {
        Self { value, units }
    }

    /// # Errors
    /// Returns [`UnitConversionError::Incompatible`] if the dimensionalities differ.
    pub fn rescale(&self, units: &Unit) -> Result<ScalarQuantity, UnitConversionError> {
        let factor = self.units.conversion_factor(units)?;
        Ok(Self::new(self.value * factor, units.clone()))
    }
}

impl std::fmt::Display for ScalarQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms() -> Unit {
        Unit::parse("ms").unwrap()
    }

    #[test]
    fn index_len_is_last_axis() {
        let q = Quantity::new(ndarray::Array2::<f64>::zeros((10, 4)), ms());
        assert_eq!(q.index_len(), 4);
        assert_eq!(q.shape(), &[10, 4]);
    }

    #[test]
    fn index_len_of_scalar_is_one() {
        let q = Quantity::scalar(3.0, ms());
        assert_eq!(q.ndim(), 0);
        assert_eq!(q.index_len(), 1);
    }

    #[test]
    fn clone_shares_buffer_and_deep_copy_does_not() {
        let q = Quantity::from_vec(vec![1.0, 2.0], ms());
        let shallow = q.clone();
        let deep = q.deep_copy();
        assert!(q.shares_data_with(&shallow));
        assert!(!q.shares_data_with(&deep));
    }

    #[test]
    fn rescale_converts_magnitudes() {
        let q = Quantity::from_vec(vec![1500.0, 250.0], ms());
        let s = q.rescale(&Unit::parse("s").unwrap()).unwrap();
        let got: Vec<f64> = s.magnitude().iter().copied().collect();
        assert!((got[0] - 1.5).abs() < 1e-12);
        assert!((got[1] - 0.25).abs() < 1e-12);
        assert_eq!(s.units().symbol(), "s");
        // the source keeps its data and unit
        assert_eq!(q.magnitude()[[0]], 1500.0);
    }

    #[test]
    fn rescale_rejects_incompatible_units() {
        let q = Quantity::from_vec(vec![1.0], ms());
        let err = match q.rescale(&Unit::parse("mV").unwrap()) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, UnitConversionError::Incompatible { .. }));
    }

    #[test]
    fn into_column_appends_axis() {
        let q = Quantity::from_vec(vec![1.0, 2.0, 3.0], ms()).into_column();
        assert_eq!(q.shape(), &[3, 1]);
        assert_eq!(q.index_len(), 1);
    }
}
