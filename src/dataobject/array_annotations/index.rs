//! Indices into the sample axis.
//!
//! [`AnnotationIndex`] covers the index forms accepted by
//! [`DataObject::array_annotations_at`](crate::dataobject::DataObject::array_annotations_at):
//!
//! ```text
//! Position(1)                     -> [1]        (scalar: one element per key)
//! Position(-1)                    -> [len - 1]
//! Positions(vec![2, 0])           -> [2, 0]
//! Mask(vec![true, false, true])   -> [0, 2]     (mask length must equal len)
//! Slice { 1.., step 2 }           -> [1, 3, ...]
//! ```
//!
//! Negative positions and slice bounds count from the end; out-of-range slice bounds are
//! clamped, out-of-range positions are errors. Unsigned values past `isize::MAX` saturate, so
//! they are out of bounds as positions and clamp to the end as slice bounds.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use smallvec::SmallVec;
use thiserror::Error;

/// Resolved positions along the sample axis.
pub type Positions = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("index {index} is out of bounds for axis 0 with size {len}")]
    OutOfBounds { index: isize, len: usize },
    #[error("boolean index did not match indexed array along axis 0; size is {len} but mask has {mask_len} entries")]
    MaskLength { len: usize, mask_len: usize },
    #[error("slice step cannot be zero")]
    ZeroStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationIndex {
    Position(isize),
    Positions(Vec<isize>),
    Mask(Vec<bool>),
    Slice {
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    },
}

impl AnnotationIndex {
    pub fn slice(start: Option<isize>, stop: Option<isize>, step: isize) -> Self {
        AnnotationIndex::Slice { start, stop, step }
    }

    /// Whether the index selects a single element rather than a sub-array.
    pub fn is_scalar(&self) -> bool {
        matches!(self, AnnotationIndex::Position(_))
    }

    /// Resolve into concrete positions for an axis of length `len`.
    ///
    /// # Errors
    /// - [`IndexError::OutOfBounds`] for a position outside `-len..len`
    /// - [`IndexError::MaskLength`] if a mask's length differs from `len`
    /// - [`IndexError::ZeroStep`] for a slice with step `0`
    pub fn resolve(&self, len: usize) -> Result<Positions, IndexError> {
        match self {
            AnnotationIndex::Position(index) => Ok(smallvec::smallvec![resolve_position(*index, len)?]),
            AnnotationIndex::Positions(indices) => indices
                .iter()
                .map(|&index| resolve_position(index, len))
                .collect(),
            AnnotationIndex::Mask(mask) => {
                if mask.len() != len {
                    return Err(IndexError::MaskLength {
                        len,
                        mask_len: mask.len(),
                    });
                }
                Ok(mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &keep)| keep.then_some(i))
                    .collect())
            }
            AnnotationIndex::Slice { start, stop, step } => resolve_slice(*start, *stop, *step, len),
        }
    }
}

fn saturating_isize(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}

fn resolve_position(index: isize, len: usize) -> Result<usize, IndexError> {
    let len_i = saturating_isize(len);
    let resolved = if index < 0 { index + len_i } else { index };
    if resolved < 0 || resolved >= len_i {
        return Err(IndexError::OutOfBounds { index, len });
    }
    Ok(resolved as usize)
}

fn resolve_slice(
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
    len: usize,
) -> Result<Positions, IndexError> {
    if step == 0 {
        return Err(IndexError::ZeroStep);
    }
    let len = saturating_isize(len);
    let wrap = |bound: isize| if bound < 0 { bound + len } else { bound };

    let mut out = Positions::new();
    if step > 0 {
        let start = start.map(wrap).unwrap_or(0).clamp(0, len);
        let stop = stop.map(wrap).unwrap_or(len).clamp(0, len);
        let mut i = start;
        while i < stop {
            out.push(i as usize);
            let Some(next) = i.checked_add(step) else {
                break;
            };
            i = next;
        }
    } else {
        // -1 here means "before the first element", not "last element".
        let start = start.map(wrap).unwrap_or(len - 1).clamp(-1, len - 1);
        let stop = stop.map(wrap).unwrap_or(-1).clamp(-1, len - 1);
        let mut i = start;
        while i > stop {
            out.push(i as usize);
            let Some(next) = i.checked_add(step) else {
                break;
            };
            i = next;
        }
    }
    Ok(out)
}

impl From<isize> for AnnotationIndex {
    fn from(index: isize) -> Self {
        AnnotationIndex::Position(index)
    }
}

impl From<usize> for AnnotationIndex {
    fn from(index: usize) -> Self {
        AnnotationIndex::Position(saturating_isize(index))
    }
}

impl From<i32> for AnnotationIndex {
    fn from(index: i32) -> Self {
        AnnotationIndex::Position(index as isize)
    }
}

impl From<Vec<isize>> for AnnotationIndex {
    fn from(indices: Vec<isize>) -> Self {
        AnnotationIndex::Positions(indices)
    }
}

impl From<Vec<usize>> for AnnotationIndex {
    fn from(indices: Vec<usize>) -> Self {
        AnnotationIndex::Positions(indices.into_iter().map(saturating_isize).collect())
    }
}

impl From<Vec<bool>> for AnnotationIndex {
    fn from(mask: Vec<bool>) -> Self {
        AnnotationIndex::Mask(mask)
    }
}

impl From<Range<usize>> for AnnotationIndex {
    fn from(range: Range<usize>) -> Self {
        AnnotationIndex::slice(Some(saturating_isize(range.start)), Some(saturating_isize(range.end)), 1)
    }
}

impl From<RangeFrom<usize>> for AnnotationIndex {
    fn from(range: RangeFrom<usize>) -> Self {
        AnnotationIndex::slice(Some(saturating_isize(range.start)), None, 1)
    }
}

impl From<RangeTo<usize>> for AnnotationIndex {
    fn from(range: RangeTo<usize>) -> Self {
        AnnotationIndex::slice(None, Some(saturating_isize(range.end)), 1)
    }
}

impl From<RangeFull> for AnnotationIndex {
    fn from(_: RangeFull) -> Self {
        AnnotationIndex::slice(None, None, 1)
    }
}
