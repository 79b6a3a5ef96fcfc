//! Continuous, regularly sampled signals.
//!
//! The data is `samples × channels`. The channel axis is the index axis, so array annotations
//! hold one value per channel.

use crate::{
    dataobject::{array_annotations::ArrayAnnotations, impl_data_object_storage, DataObject, ObjectInit, ParentLink},
    error::DataObjectError,
    metadata::BaseMetadata,
    units::{
        quantity::{Quantity, ScalarQuantity},
        Unit,
    },
};

#[derive(Debug)]
pub struct AnalogSignal {
    signal: Quantity,
    sampling_rate: ScalarQuantity,
    t_start: ScalarQuantity,
    metadata: BaseMetadata,
    array_annotations: ArrayAnnotations,
    parent: Option<ParentLink>,
}

impl AnalogSignal {
    /// Build a signal from `samples × channels` data.
    ///
    /// 1-D data is a single channel; 0-d data is a single sample of a single channel.
    ///
    /// # Errors
    /// - [`DataObjectError::Shape`] for data with more than two axes
    /// - [`DataObjectError::UnitConversion`] if `sampling_rate` is not a frequency or `t_start`
    ///   is not a time
    /// - [`DataObjectError::Validation`] / [`DataObjectError::Annotation`] for rejected
    ///   annotations in `init`
    pub fn new(
        signal: Quantity,
        sampling_rate: ScalarQuantity,
        t_start: ScalarQuantity,
        init: ObjectInit,
    ) -> Result<Self, DataObjectError> {
        let signal = match signal.ndim() {
            0 => signal.into_column().into_column(),
            1 => signal.into_column(),
            2 => signal,
            _ => {
                return Err(DataObjectError::Shape {
                    kind: "AnalogSignal",
                    max_ndim: 2,
                    shape: signal.shape().to_vec(),
                })
            }
        };
        sampling_rate.units.conversion_factor(&Unit::hertz())?;
        t_start.units.conversion_factor(&Unit::second())?;

        let mut obj = Self {
            signal,
            sampling_rate,
            t_start,
            metadata: BaseMetadata::default(),
            array_annotations: ArrayAnnotations::new(),
            parent: None,
        };
        init.apply(&mut obj)?;
        Ok(obj)
    }

    pub fn sampling_rate(&self) -> &ScalarQuantity {
        &self.sampling_rate
    }

    pub fn t_start(&self) -> &ScalarQuantity {
        &self.t_start
    }

    pub fn num_samples(&self) -> usize {
        self.signal.shape()[0]
    }

    pub fn num_channels(&self) -> usize {
        self.signal.shape()[1]
    }

    /// Time just after the last sample, in the units of `t_start`.
    pub fn t_stop(&self) -> ScalarQuantity {
        let rate_hz = self.sampling_rate.value * self.sampling_rate.units.scale();
        let duration_s = self.num_samples() as f64 / rate_hz;
        ScalarQuantity::new(
            self.t_start.value + duration_s / self.t_start.units.scale(),
            self.t_start.units.clone(),
        )
    }
}

impl DataObject for AnalogSignal {
    impl_data_object_storage!(signal);

    fn duplicate_with_new_data(&self, signal: Quantity) -> Self {
        Self {
            signal,
            sampling_rate: self.sampling_rate.clone(),
            t_start: self.t_start.clone(),
            metadata: self.metadata.clone(),
            array_annotations: ArrayAnnotations::new(),
            parent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{
        dataobject::array_annotations::{error::ValidationError, validation::ProposedAnnotation},
        metadata::AnnotationValue,
        units::error::UnitConversionError,
    };

    fn unit(symbol: &str) -> Unit {
        Unit::parse(symbol).unwrap()
    }

    fn signal(data: Quantity) -> Result<AnalogSignal, DataObjectError> {
        AnalogSignal::new(
            data,
            ScalarQuantity::new(1.0, unit("kHz")),
            ScalarQuantity::new(0.0, unit("s")),
            ObjectInit::default(),
        )
    }

    #[test]
    fn one_dimensional_data_is_one_channel() {
        let sig = signal(Quantity::from_vec(vec![1.0, 2.0, 3.0, 4.0], unit("mV"))).unwrap();
        assert_eq!(sig.quantity().shape(), &[4, 1]);
        assert_eq!(sig.num_samples(), 4);
        assert_eq!(sig.num_channels(), 1);
        assert_eq!(sig.sample_count(), 1);
    }

    #[test]
    fn annotations_are_per_channel() {
        let data = Quantity::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], unit("mV"));
        let mut sig = signal(data).unwrap();
        assert_eq!(sig.sample_count(), 3);

        sig.array_annotate([("electrode", vec!["e1", "e2", "e3"])]).unwrap();
        let err = match sig.array_annotate([("gain", vec![1.0, 2.0])]) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert_eq!(err, ValidationError::LengthMismatch { actual: 2, expected: 3 });
        assert!(!sig.array_annotations().contains_key("gain"));

        let at = sig.array_annotations_at(2usize).unwrap();
        assert_eq!(
            at.get("electrode"),
            Some(crate::dataobject::array_annotations::Selection::One(AnnotationValue::from("e3")))
        );
    }

    #[test]
    fn more_than_two_axes_is_rejected() {
        let data = Quantity::new(ndarray::Array3::<f64>::zeros((2, 2, 2)), unit("mV"));
        let err = match signal(data) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, DataObjectError::Shape { max_ndim: 2, .. }));
    }

    #[test]
    fn sampling_rate_must_be_a_frequency() {
        let err = match AnalogSignal::new(
            Quantity::from_vec(vec![1.0], unit("mV")),
            ScalarQuantity::new(1.0, unit("s")),
            ScalarQuantity::new(0.0, unit("s")),
            ObjectInit::default(),
        ) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(
            err,
            DataObjectError::UnitConversion(UnitConversionError::Incompatible { .. })
        ));
    }

    #[test]
    fn t_stop_follows_sampling_rate() {
        let sig = AnalogSignal::new(
            Quantity::from_vec(vec![0.0; 500], unit("uV")),
            ScalarQuantity::new(1.0, unit("kHz")),
            ScalarQuantity::new(100.0, unit("ms")),
            ObjectInit::default(),
        )
        .unwrap();
        let t_stop = sig.t_stop();
        assert_eq!(t_stop.units, unit("ms"));
        assert!((t_stop.value - 600.0).abs() < 1e-9);
    }

    #[test]
    fn rescale_keeps_timing_and_copies_annotations() {
        let init = ObjectInit::default()
            .with_name("lfp")
            .with_array_annotation("channel_id", ProposedAnnotation::from(vec![7, 8]));
        let sig = AnalogSignal::new(
            Quantity::new(array![[1.0, 2.0]], unit("mV")),
            ScalarQuantity::new(10.0, unit("Hz")),
            ScalarQuantity::new(0.0, unit("s")),
            init,
        )
        .unwrap();

        let in_volts = sig.rescale(&unit("V")).unwrap();
        assert_eq!(in_volts.as_array(None).unwrap(), array![[0.001, 0.002]].into_dyn());
        assert_eq!(in_volts.sampling_rate(), sig.sampling_rate());
        assert_eq!(in_volts.name(), Some("lfp"));
        assert!(!in_volts.array_annotations().shares_storage_with(sig.array_annotations()));
        assert_eq!(in_volts.array_annotations().snapshot(), sig.array_annotations().snapshot());
    }
}
