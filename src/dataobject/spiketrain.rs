//! Spike times of a single unit.

use crate::{
    dataobject::{array_annotations::ArrayAnnotations, impl_data_object_storage, DataObject, ObjectInit, ParentLink},
    error::DataObjectError,
    metadata::BaseMetadata,
    units::{
        quantity::{Quantity, ScalarQuantity},
        Unit,
    },
};

/// Spike times, annotated per spike.
#[derive(Debug)]
pub struct SpikeTrain {
    times: Quantity,
    t_start: ScalarQuantity,
    t_stop: ScalarQuantity,
    metadata: BaseMetadata,
    array_annotations: ArrayAnnotations,
    parent: Option<ParentLink>,
}

impl SpikeTrain {
    /// # Errors
    /// - [`DataObjectError::Shape`] if `times` has more than one axis
    /// - [`DataObjectError::UnitConversion`] if `times`, `t_start` or `t_stop` is not a time
    /// - [`DataObjectError::Validation`] / [`DataObjectError::Annotation`] for rejected
    ///   annotations in `init`
    pub fn new(
        times: Quantity,
        t_start: ScalarQuantity,
        t_stop: ScalarQuantity,
        init: ObjectInit,
    ) -> Result<Self, DataObjectError> {
        if times.ndim() > 1 {
            return Err(DataObjectError::Shape {
                kind: "SpikeTrain",
                max_ndim: 1,
                shape: times.shape().to_vec(),
            });
        }
        let second = Unit::second();
        times.units().conversion_factor(&second)?;
        t_start.units.conversion_factor(&second)?;
        t_stop.units.conversion_factor(&second)?;

        let mut obj = Self {
            times,
            t_start,
            t_stop,
            metadata: BaseMetadata::default(),
            array_annotations: ArrayAnnotations::new(),
            parent: None,
        };
        init.apply(&mut obj)?;
        Ok(obj)
    }

    pub fn times(&self) -> &Quantity {
        &self.times
    }

    pub fn t_start(&self) -> &ScalarQuantity {
        &self.t_start
    }

    pub fn t_stop(&self) -> &ScalarQuantity {
        &self.t_stop
    }
}

impl DataObject for SpikeTrain {
    impl_data_object_storage!(times);

    fn duplicate_with_new_data(&self, times: Quantity) -> Self {
        Self {
            times,
            t_start: self.t_start.clone(),
            t_stop: self.t_stop.clone(),
            metadata: self.metadata.clone(),
            array_annotations: ArrayAnnotations::new(),
            parent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataobject::array_annotations::{error::ValidationError, validation::ProposedAnnotation},
        metadata::AnnotationValue,
    };

    fn train(times: Vec<f64>) -> SpikeTrain {
        let s = Unit::second();
        SpikeTrain::new(
            Quantity::from_vec(times, s.clone()),
            ScalarQuantity::new(0.0, s.clone()),
            ScalarQuantity::new(10.0, s),
            ObjectInit::default(),
        )
        .unwrap()
    }

    #[test]
    fn annotations_follow_spike_count() {
        let mut st = train(vec![0.5, 1.5, 2.5]);
        assert_eq!(st.sample_count(), 3);
        st.array_annotate([("quality", vec![1, 2, 3])]).unwrap();

        let err = match st.array_annotate([("amplitude", vec![1.0])]) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert_eq!(err, ValidationError::LengthMismatch { actual: 1, expected: 3 });
    }

    #[test]
    fn single_spike_without_axis_takes_scalar_annotation() {
        let s = Unit::second();
        let mut st = SpikeTrain::new(
            Quantity::scalar(1.0, s.clone()),
            ScalarQuantity::new(0.0, s.clone()),
            ScalarQuantity::new(2.0, s),
            ObjectInit::default(),
        )
        .unwrap();
        assert_eq!(st.sample_count(), 1);
        st.array_annotate([("label", ProposedAnnotation::from("only"))]).unwrap();
        assert_eq!(
            st.array_annotations().get("label").unwrap().to_values(),
            vec![AnnotationValue::from("only")]
        );
    }

    #[test]
    fn non_time_units_are_rejected() {
        let err = match SpikeTrain::new(
            Quantity::from_vec(vec![1.0], Unit::parse("mV").unwrap()),
            ScalarQuantity::new(0.0, Unit::second()),
            ScalarQuantity::new(2.0, Unit::second()),
            ObjectInit::default(),
        ) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, DataObjectError::UnitConversion(_)));
    }

    #[test]
    fn two_dimensional_times_are_rejected() {
        let err = match SpikeTrain::new(
            Quantity::new(ndarray::Array2::<f64>::zeros((2, 2)), Unit::second()),
            ScalarQuantity::new(0.0, Unit::second()),
            ScalarQuantity::new(2.0, Unit::second()),
            ObjectInit::default(),
        ) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, DataObjectError::Shape { kind: "SpikeTrain", .. }));
    }

    #[test]
    fn copy_shares_and_deep_duplicate_separates() {
        let mut st = train(vec![0.1, 0.2]);
        st.array_annotate([("id", vec![1, 2])]).unwrap();

        let shallow = st.copy();
        assert!(shallow.array_annotations().shares_storage_with(st.array_annotations()));
        assert!(shallow.times().shares_data_with(st.times()));

        let deep = st.deep_duplicate();
        assert!(!deep.array_annotations().shares_storage_with(st.array_annotations()));
        assert!(!deep.times().shares_data_with(st.times()));
        assert_eq!(deep.t_stop(), st.t_stop());
    }
}
