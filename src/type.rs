use std::collections::BTreeMap;
use std::fmt::Debug;

use num_traits::Float;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Volumes, margins and
/// center distances are all computed in the coordinate type itself, so only floating point types
/// are supported.
pub trait IndexableNum: private::Sealed + Float + Debug + Send + Sync + 'static {}

impl IndexableNum for f32 {}

impl IndexableNum for f64 {}

/// The caller-assigned identifier of an indexed point.
pub type PointId = u64;

/// The points held by a leaf, keyed by their identifier.
pub type PointMap<N> = BTreeMap<PointId, Vec<N>>;

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
