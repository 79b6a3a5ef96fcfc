//! Array annotations: per-sample metadata.
//!
//! [`ArrayAnnotations`] is a handle to a key → [`AnnotationArray`] map. Every stored array has
//! exactly as many elements as the owning object has samples.
//!
//! ## Sharing
//! The map lives behind `Rc<RefCell<_>>`. There are two ways of duplicating a handle:
//! - [`ArrayAnnotations::share`] returns a second handle to the *same* map. A cheap copy of a
//!   data object uses it, so writes through either object are seen by both.
//! - [`ArrayAnnotations::deep_clone`] returns a handle to an independent copy. Rescaling and
//!   deep duplication use it.
//!
//! `ArrayAnnotations` does not implement `Clone`.
//!
//! ## Index views
//! [`AnnotationsAt`] (returned by
//! [`DataObject::array_annotations_at`](crate::dataobject::DataObject::array_annotations_at))
//! reads and writes the elements at resolved positions of every key. It holds its own handle to
//! the map, so it never keeps a borrow open between calls.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use smol_str::SmolStr;

use crate::{
    dataobject::array_annotations::{
        datatype::AnnotationArray,
        error::ValidationError,
        index::{AnnotationIndex, IndexError, Positions},
    },
    metadata::AnnotationValue,
};

pub mod datatype;
pub mod error;
pub mod index;
pub mod validation;

/// Stored annotations, iterated in key order.
pub type AnnotationMap = BTreeMap<SmolStr, AnnotationArray>;

/// A handle to the array annotations of one or more data objects.
#[derive(Debug, Default)]
pub struct ArrayAnnotations {
    inner: Rc<RefCell<AnnotationMap>>,
}

impl ArrayAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// A second handle to the same map.
    pub fn share(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }

    /// A handle to an independent copy of the map.
    pub fn deep_clone(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(self.inner.borrow().clone())),
        }
    }

    /// Whether both handles point at the same map.
    pub fn shares_storage_with(&self, other: &ArrayAnnotations) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<SmolStr> {
        self.inner.borrow().keys().cloned().collect()
    }

    /// A copy of the array stored under `key`.
    pub fn get(&self, key: &str) -> Option<AnnotationArray> {
        self.inner.borrow().get(key).cloned()
    }

    /// A copy of the whole map.
    pub fn snapshot(&self) -> AnnotationMap {
        self.inner.borrow().clone()
    }

    /// Insert already validated arrays, overwriting existing keys.
    pub(crate) fn merge(&self, checked: AnnotationMap) {
        self.inner.borrow_mut().extend(checked);
    }

    /// A view over the elements at `index`, resolved against `sample_count`.
    ///
    /// The index is resolved even when the map is empty; keys added later are reached through
    /// the same positions.
    ///
    /// # Errors
    /// Returns [`IndexError`] if the index cannot be resolved.
    pub fn at(&self, index: &AnnotationIndex, sample_count: usize) -> Result<AnnotationsAt, IndexError> {
        let positions = index.resolve(sample_count)?;
        Ok(AnnotationsAt {
            storage: Rc::clone(&self.inner),
            positions,
            scalar: index.is_scalar(),
        })
    }
}

/// What an index view yields for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The element at a single position.
    One(AnnotationValue),
    /// The elements at a list, mask or slice of positions.
    Many(AnnotationArray),
}

/// A view over the array annotations at a fixed set of positions.
///
/// Reads copy the selected elements out; writes go straight to the shared map.
#[derive(Debug)]
pub struct AnnotationsAt {
    storage: Rc<RefCell<AnnotationMap>>,
    positions: Positions,
    scalar: bool,
}

impl AnnotationsAt {
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn keys(&self) -> Vec<SmolStr> {
        self.storage.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Selection> {
        self.storage.borrow().get(key).map(|array| self.select(array))
    }

    /// Every key with its selected element(s), in key order.
    pub fn to_map(&self) -> BTreeMap<SmolStr, Selection> {
        self.storage
            .borrow()
            .iter()
            .map(|(key, array)| (key.clone(), self.select(array)))
            .collect()
    }

    /// Write `value` at every selected position of `key`.
    ///
    /// # Errors
    /// - [`ValidationError::UnknownKey`] if `key` is not annotated
    /// - [`ValidationError::ElementTypeMismatch`] if `value` does not fit the stored kind
    ///
    /// On error nothing is written.
    pub fn set(&self, key: &str, value: impl Into<AnnotationValue>) -> Result<(), ValidationError> {
        let value = value.into();
        let mut storage = self.storage.borrow_mut();
        let array = storage.get_mut(key).ok_or_else(|| ValidationError::UnknownKey {
            key: SmolStr::new(key),
        })?;
        // Write into a scratch copy so a failing position leaves the stored array untouched.
        let mut updated = array.clone();
        for &position in &self.positions {
            updated.set(position, &value)?;
        }
        *array = updated;
        Ok(())
    }

    fn select(&self, array: &AnnotationArray) -> Selection {
        match (self.scalar, self.positions.first()) {
            (true, Some(&position)) => Selection::One(array.get(position).unwrap_or_default()),
            _ => Selection::Many(array.select(&self.positions)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataobject::array_annotations::validation::{check_array_annotations, ProposedAnnotation};

    fn annotations(sample_count: usize, entries: Vec<(&str, ProposedAnnotation)>) -> ArrayAnnotations {
        let annotations = ArrayAnnotations::new();
        annotations.merge(check_array_annotations(entries, sample_count).unwrap());
        annotations
    }

    #[test]
    fn share_aliases_and_deep_clone_separates() {
        let original = annotations(2, vec![("id", ProposedAnnotation::from(vec![1, 2]))]);
        let shared = original.share();
        let deep = original.deep_clone();
        assert!(original.shares_storage_with(&shared));
        assert!(!original.shares_storage_with(&deep));

        shared.at(&AnnotationIndex::Position(0), 2).unwrap().set("id", 10).unwrap();
        assert_eq!(original.get("id").unwrap().get(0), Some(AnnotationValue::Integer(10)));
        assert_eq!(deep.get("id").unwrap().get(0), Some(AnnotationValue::Integer(1)));
    }

    #[test]
    fn view_reads_scalar_and_many() {
        let stored = annotations(
            3,
            vec![
                ("id", ProposedAnnotation::from(vec![1, 2, 3])),
                ("label", ProposedAnnotation::from(vec!["a", "b", "c"])),
            ],
        );
        let at_one = stored.at(&AnnotationIndex::Position(1), 3).unwrap();
        assert_eq!(at_one.get("id"), Some(Selection::One(AnnotationValue::Integer(2))));
        assert_eq!(at_one.keys(), vec![SmolStr::new("id"), SmolStr::new("label")]);

        let tail = stored.at(&AnnotationIndex::from(1..3), 3).unwrap();
        match tail.get("label") {
            Some(Selection::Many(array)) => assert_eq!(
                array.to_values(),
                vec![AnnotationValue::from("b"), AnnotationValue::from("c")]
            ),
            other => panic!("unexpected selection: {:?}", other),
        }
    }

    #[test]
    fn empty_annotations_still_resolve_the_index() {
        let empty = ArrayAnnotations::new();
        let err = match empty.at(&AnnotationIndex::Position(99), 3) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert_eq!(err, IndexError::OutOfBounds { index: 99, len: 3 });
    }

    #[test]
    fn view_taken_before_annotating_sees_new_keys() {
        let stored = ArrayAnnotations::new();
        let view = stored.at(&AnnotationIndex::Position(1), 3).unwrap();
        assert!(view.is_empty());

        stored.merge(check_array_annotations([("id", ProposedAnnotation::from(vec![1, 2, 3]))], 3).unwrap());
        assert_eq!(view.get("id"), Some(Selection::One(AnnotationValue::Integer(2))));

        view.set("id", 5).unwrap();
        assert_eq!(
            stored.get("id").unwrap().to_values(),
            vec![AnnotationValue::Integer(1), AnnotationValue::Integer(5), AnnotationValue::Integer(3)]
        );
    }

    #[test]
    fn failed_write_leaves_array_untouched() {
        let stored = annotations(3, vec![("id", ProposedAnnotation::from(vec![1, 2, 3]))]);
        let view = stored.at(&AnnotationIndex::Positions(vec![0, 2]), 3).unwrap();
        assert!(view.set("id", "x").is_err());
        assert_eq!(
            stored.get("id").unwrap().to_values(),
            vec![AnnotationValue::Integer(1), AnnotationValue::Integer(2), AnnotationValue::Integer(3)]
        );

        let err = match view.set("missing", 1) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, ValidationError::UnknownKey { .. }));
    }
}
