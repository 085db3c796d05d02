//! Per-layer storage.
//!
//! The layer count is fixed when a simulation is built from its soil
//! profile; ten layers fit inline without a heap allocation.

use smallvec::SmallVec;

pub const INLINE_LAYERS: usize = 10;

pub type LayerVec = SmallVec<[f64; INLINE_LAYERS]>;

pub type LayerArray<T> = SmallVec<[T; INLINE_LAYERS]>;

pub fn zeros(n: usize) -> LayerVec {
    smallvec::smallvec![0.0; n]
}

/// Reset every element to zero without changing the length.
pub fn clear(v: &mut LayerVec) {
    v.iter_mut().for_each(|x| *x = 0.0);
}

pub fn sum(v: &[f64]) -> f64 {
    v.iter().sum()
}
