//! Data objects.
//!
//! A data object is a unit-tagged array ([`Quantity`]) plus whole-object metadata
//! ([`BaseMetadata`]) plus array annotations ([`ArrayAnnotations`]). The last axis of the data is
//! the *index* axis: [`DataObject::sample_count`] is its length, and every array annotation has
//! one element per index.
//!
//! ## Variants
//! - [`AnalogSignal`](analogsignal::AnalogSignal): samples × channels, annotated per channel
//! - [`SpikeTrain`](spiketrain::SpikeTrain): spike times, annotated per spike
//! - [`Event`](event::Event): labelled times, annotated per event
//!
//! ## Duplication
//! ```text
//!                     data            array annotations     parent link
//! shallow_duplicate   shared (COW)    shared (aliased)      carried
//! deep_duplicate      copied          copied                carried
//! rescale (same unit) = shallow_duplicate
//! rescale (new unit)  converted       copied                carried
//! ```

use std::rc::{Rc, Weak};

use ndarray::ArrayD;
use smol_str::SmolStr;

use crate::{
    dataobject::array_annotations::{
        error::ValidationError,
        index::{AnnotationIndex, IndexError},
        validation::{check_array_annotations, ProposedAnnotation},
        AnnotationsAt, ArrayAnnotations,
    },
    error::DataObjectError,
    metadata::{AnnotationError, AnnotationValue, BaseMetadata},
    units::{error::UnitConversionError, quantity::Quantity, Unit},
};

/// Implements the storage accessors of [`DataObject`] for a struct with `metadata`,
/// `array_annotations` and `parent` fields and a named quantity field.
macro_rules! impl_data_object_storage {
    ($quantity:ident) => {
        fn quantity(&self) -> &$crate::units::quantity::Quantity {
            &self.$quantity
        }

        fn metadata(&self) -> &$crate::metadata::BaseMetadata {
            &self.metadata
        }

        fn metadata_mut(&mut self) -> &mut $crate::metadata::BaseMetadata {
            &mut self.metadata
        }

        fn array_annotations(&self) -> &$crate::dataobject::array_annotations::ArrayAnnotations {
            &self.array_annotations
        }

        fn replace_array_annotations(
            &mut self,
            annotations: $crate::dataobject::array_annotations::ArrayAnnotations,
        ) {
            self.array_annotations = annotations;
        }

        fn parent(&self) -> Option<&$crate::dataobject::ParentLink> {
            self.parent.as_ref()
        }

        fn set_parent(&mut self, parent: Option<$crate::dataobject::ParentLink>) {
            self.parent = parent;
        }
    };
}

pub(crate) use impl_data_object_storage;

pub mod analogsignal;
pub mod array_annotations;
pub mod event;
pub mod spiketrain;

/// The container a data object belongs to, seen from the object.
#[derive(Debug)]
pub struct ContainerHandle {
    name: SmolStr,
}

impl ContainerHandle {
    pub fn new(name: impl Into<SmolStr>) -> Rc<Self> {
        Rc::new(Self { name: name.into() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Back-reference from a data object to its container.
pub type ParentLink = Weak<ContainerHandle>;

/// Construction options shared by every data object.
#[derive(Debug, Clone, Default)]
pub struct ObjectInit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub file_origin: Option<String>,
    pub annotations: Vec<(String, AnnotationValue)>,
    pub array_annotations: Option<Vec<(SmolStr, ProposedAnnotation)>>,
}

impl ObjectInit {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_file_origin(mut self, file_origin: impl Into<String>) -> Self {
        self.file_origin = Some(file_origin.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.annotations.push((key.into(), value.into()));
        self
    }

    pub fn with_array_annotation(
        mut self,
        key: impl Into<SmolStr>,
        value: impl Into<ProposedAnnotation>,
    ) -> Self {
        self.array_annotations
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Apply to a freshly built object: array annotations first, then the metadata.
    ///
    /// # Errors
    /// Returns [`DataObjectError::Validation`] or [`DataObjectError::Annotation`] if any
    /// annotation is rejected.
    pub fn apply<O: DataObject>(self, object: &mut O) -> Result<(), DataObjectError> {
        if let Some(array_annotations) = self.array_annotations {
            object.array_annotate(array_annotations)?;
        }
        *object.metadata_mut() = BaseMetadata::new(
            self.name,
            self.description,
            self.file_origin,
            self.annotations,
        )?;
        Ok(())
    }
}

/// A unit-tagged data array with whole-object metadata and array annotations.
///
/// Implementors provide storage access and [`DataObject::duplicate_with_new_data`]; every
/// annotation, copy and rescale operation is provided on top of those.
pub trait DataObject: Sized {
    fn quantity(&self) -> &Quantity;

    fn metadata(&self) -> &BaseMetadata;

    fn metadata_mut(&mut self) -> &mut BaseMetadata;

    fn array_annotations(&self) -> &ArrayAnnotations;

    fn replace_array_annotations(&mut self, annotations: ArrayAnnotations);

    fn parent(&self) -> Option<&ParentLink>;

    fn set_parent(&mut self, parent: Option<ParentLink>);

    /// A same-kind object around `signal` with this object's metadata and variant fields,
    /// no array annotations and no parent link.
    fn duplicate_with_new_data(&self, signal: Quantity) -> Self;

    /// Length of the index axis; `1` for axis-less data.
    fn sample_count(&self) -> usize {
        self.quantity().index_len()
    }

    fn units(&self) -> &Unit {
        self.quantity().units()
    }

    fn name(&self) -> Option<&str> {
        self.metadata().name.as_deref()
    }

    /// Add or overwrite whole-object annotations.
    ///
    /// # Errors
    /// Returns [`AnnotationError`] if a value is not a simple type; nothing is stored then.
    fn annotate<I, K>(&mut self, annotations: I) -> Result<(), AnnotationError>
    where
        I: IntoIterator<Item = (K, AnnotationValue)>,
        K: Into<String>,
    {
        self.metadata_mut().annotate(annotations)
    }

    /// Add or overwrite array annotations.
    ///
    /// Every entry is validated against [`DataObject::sample_count`] before any is stored.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`]; the stored annotations are unchanged then.
    fn array_annotate<I, K, V>(&mut self, annotations: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<ProposedAnnotation>,
    {
        let checked = check_array_annotations(annotations, self.sample_count())?;
        self.array_annotations().merge(checked);
        Ok(())
    }

    /// The array annotations at `index`.
    ///
    /// The returned view writes through to this object's annotations (and to every object
    /// sharing them).
    ///
    /// # Errors
    /// Returns [`IndexError`] if `index` does not fit [`DataObject::sample_count`].
    fn array_annotations_at(&self, index: impl Into<AnnotationIndex>) -> Result<AnnotationsAt, IndexError> {
        self.array_annotations().at(&index.into(), self.sample_count())
    }

    /// Same data buffer, same array annotation map, same parent.
    fn shallow_duplicate(&self) -> Self {
        let mut obj = self.duplicate_with_new_data(self.quantity().clone());
        obj.replace_array_annotations(self.array_annotations().share());
        obj.set_parent(self.parent().cloned());
        obj
    }

    /// Alias of [`DataObject::shallow_duplicate`].
    fn copy(&self) -> Self {
        self.shallow_duplicate()
    }

    /// Independent data and independent array annotations, same parent.
    fn deep_duplicate(&self) -> Self {
        let mut obj = self.duplicate_with_new_data(self.quantity().deep_copy());
        obj.replace_array_annotations(self.array_annotations().deep_clone());
        obj.set_parent(self.parent().cloned());
        obj
    }

    /// Convert to `units`.
    ///
    /// Equal units give a [`DataObject::shallow_duplicate`]. Otherwise the data is converted,
    /// the array annotations are deep-copied and the parent link is carried over.
    ///
    /// # Errors
    /// Returns [`UnitConversionError::Incompatible`] if the dimensionalities differ.
    fn rescale(&self, units: &Unit) -> Result<Self, UnitConversionError> {
        if self.units() == units {
            tracing::trace!(units = %units, "rescale to current units, sharing annotations");
            return Ok(self.shallow_duplicate());
        }
        let signal = self.quantity().rescale(units)?;
        tracing::trace!(from = %self.units(), to = %units, "rescaled data object");
        let mut obj = self.duplicate_with_new_data(signal);
        obj.replace_array_annotations(self.array_annotations().deep_clone());
        obj.set_parent(self.parent().cloned());
        Ok(obj)
    }

    /// The raw magnitudes, converted to `units` first if given.
    ///
    /// # Errors
    /// Returns [`UnitConversionError::Incompatible`] if `units` is not compatible.
    fn as_array(&self, units: Option<&Unit>) -> Result<ArrayD<f64>, UnitConversionError> {
        match units {
            Some(units) => Ok(self.quantity().rescale(units)?.to_magnitude()),
            None => Ok(self.quantity().to_magnitude()),
        }
    }

    /// The data as a plain quantity, sharing the buffer.
    fn as_quantity(&self) -> Quantity {
        self.quantity().clone()
    }
}
