//! Data objects with physical units and per-element array annotations.
//!
//! ## Layout
//!
//! ```text
//! neo_core
//!   ├── dtype            element kinds of annotation arrays
//!   ├── units            units, dimensionality and unit-tagged arrays
//!   ├── metadata         whole-object metadata and the simple-type check
//!   ├── dataobject       the DataObject capability and its variants
//!   │     └── array_annotations
//!   │           ├── datatype     typed 1-D annotation arrays
//!   │           ├── validation   checks for proposed annotations
//!   │           └── index        positions, lists, masks and slices
//!   └── error            crate-level error
//! ```
//!
//! ## Array annotations
//! Every data object indexes its samples along the last axis of its data. An array
//! annotation holds one value per sample, so each stored annotation has exactly
//! [`DataObject::sample_count`](dataobject::DataObject::sample_count) elements.
//!
//! ```rust,ignore
//! use neo_core::prelude::*;
//!
//! let s = Unit::parse("s")?;
//! let times = Quantity::from_vec(vec![0.5, 1.2, 3.3], s.clone());
//! let mut train = SpikeTrain::new(
//!     times,
//!     ScalarQuantity::new(0.0, s.clone()),
//!     ScalarQuantity::new(10.0, s),
//!     ObjectInit::default(),
//! )?;
//! train.array_annotate([("quality", vec![1, 2, 3])])?;
//! let at_second = train.array_annotations_at(1usize)?;
//! ```

pub mod dataobject;
pub mod dtype;
pub mod error;
pub mod metadata;
pub mod units;

pub use error::DataObjectError;

pub mod prelude {
    pub use crate::dataobject::{
        analogsignal::AnalogSignal,
        array_annotations::{
            datatype::{AnnotationArray, AnnotationArrayD, TypedArray},
            error::ValidationError,
            index::{AnnotationIndex, IndexError},
            validation::ProposedAnnotation,
            AnnotationsAt, ArrayAnnotations, Selection,
        },
        event::Event,
        spiketrain::SpikeTrain,
        ContainerHandle, DataObject, ObjectInit, ParentLink,
    };
    pub use crate::dtype::DataType;
    pub use crate::error::DataObjectError;
    pub use crate::metadata::{AnnotationError, AnnotationValue, BaseMetadata};
    pub use crate::units::{
        error::{UnitConversionError, UnitParseError},
        quantity::{Quantity, ScalarQuantity},
        Dimensionality, Unit,
    };
}
