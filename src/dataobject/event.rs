//! Labelled points in time.

use ndarray::Array1;

use crate::{
    dataobject::{
        array_annotations::{error::ValidationError, ArrayAnnotations},
        impl_data_object_storage, DataObject, ObjectInit, ParentLink,
    },
    error::DataObjectError,
    metadata::BaseMetadata,
    units::{quantity::Quantity, Unit},
};

/// Event times with one label per time.
#[derive(Debug)]
pub struct Event {
    times: Quantity,
    labels: Array1<String>,
    metadata: BaseMetadata,
    array_annotations: ArrayAnnotations,
    parent: Option<ParentLink>,
}

impl Event {
    /// Build an event array. Empty `labels` gives every event an empty label.
    ///
    /// # Errors
    /// - [`DataObjectError::Shape`] if `times` has more than one axis
    /// - [`DataObjectError::UnitConversion`] if `times` is not a time
    /// - [`DataObjectError::Validation`] if the label count differs from the event count, or
    ///   for rejected array annotations in `init`
    pub fn new(times: Quantity, labels: Vec<String>, init: ObjectInit) -> Result<Self, DataObjectError> {
        if times.ndim() > 1 {
            return Err(DataObjectError::Shape {
                kind: "Event",
                max_ndim: 1,
                shape: times.shape().to_vec(),
            });
        }
        times.units().conversion_factor(&Unit::second())?;

        let count = times.index_len();
        let labels = if labels.is_empty() {
            Array1::from_elem(count, String::new())
        } else if labels.len() == count {
            Array1::from(labels)
        } else {
            return Err(ValidationError::LengthMismatch {
                actual: labels.len(),
                expected: count,
            }
            .into());
        };

        let mut obj = Self {
            times,
            labels,
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

    pub fn labels(&self) -> &Array1<String> {
        &self.labels
    }
}

impl DataObject for Event {
    impl_data_object_storage!(times);

    fn duplicate_with_new_data(&self, times: Quantity) -> Self {
        Self {
            times,
            labels: self.labels.clone(),
            metadata: self.metadata.clone(),
            array_annotations: ArrayAnnotations::new(),
            parent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AnnotationValue;

    fn ms() -> Unit {
        Unit::parse("ms").unwrap()
    }

    #[test]
    fn missing_labels_are_empty() {
        let ev = Event::new(Quantity::from_vec(vec![1.0, 2.0], ms()), Vec::new(), ObjectInit::default()).unwrap();
        assert_eq!(ev.labels().to_vec(), vec![String::new(), String::new()]);
    }

    #[test]
    fn label_count_must_match() {
        let err = match Event::new(
            Quantity::from_vec(vec![1.0, 2.0], ms()),
            vec!["stim".to_string()],
            ObjectInit::default(),
        ) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(
            err,
            DataObjectError::Validation(ValidationError::LengthMismatch { actual: 1, expected: 2 })
        ));
    }

    #[test]
    fn rescale_keeps_labels() {
        let init = ObjectInit::default().with_array_annotation("trial", vec![1, 2]);
        let ev = Event::new(
            Quantity::from_vec(vec![1500.0, 2500.0], ms()),
            vec!["on".to_string(), "off".to_string()],
            init,
        )
        .unwrap();

        let in_seconds = ev.rescale(&Unit::second()).unwrap();
        assert_eq!(in_seconds.labels(), ev.labels());
        let seconds = in_seconds.as_array(None).unwrap();
        assert!((seconds[[0]] - 1.5).abs() < 1e-12 && (seconds[[1]] - 2.5).abs() < 1e-12);
        assert_eq!(
            in_seconds.array_annotations().get("trial").unwrap().to_values(),
            vec![AnnotationValue::Integer(1), AnnotationValue::Integer(2)]
        );
    }
}
