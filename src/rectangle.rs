//! Axis-aligned rectangles over `d` dimensions and the geometric helpers used by the R*-tree.

use geo_traits::{CoordTrait, RectTrait};

use crate::error::{RStarIndexError, Result};
use crate::r#type::IndexableNum;

/// An axis-aligned bounding box over `d` dimensions.
///
/// Rectangles built through [`Rectangle::new`] are either a single point (`minima == maxima`) or
/// strictly rectangular on every axis. Unions of valid rectangles may be flat on some axes (for
/// example the bounding box of collinear points); those are only ever produced internally.
///
/// ```
/// use rstar_index::Rectangle;
///
/// let a = Rectangle::new(vec![0., 0., 0.], vec![2., 2., 2.]).unwrap();
/// let b = Rectangle::new(vec![-1., -1., -1.], vec![1., 1., 1.]).unwrap();
/// assert_eq!(a.intersection_volume(&b), 1.);
/// ```
#[derive(Debug, Clone)]
pub struct Rectangle<N: IndexableNum> {
    minima: Vec<N>,
    maxima: Vec<N>,
    is_point: bool,
}

impl<N: IndexableNum> Rectangle<N> {
    /// Create a new rectangle from its lower and upper corners.
    pub fn new(minima: Vec<N>, maxima: Vec<N>) -> Result<Self> {
        check_dimension(minima.len(), maxima.len())?;
        if minima.is_empty() {
            return Err(RStarIndexError::InvalidBounds(
                "Rectangle must have at least one dimension.".to_string(),
            ));
        }

        let rect = Self::new_unchecked(minima, maxima);
        if !rect.is_point && !are_bounds_rectangular(&rect.minima, &rect.maxima) {
            return Err(RStarIndexError::InvalidBounds(format!(
                "{:?} to {:?} is neither a point nor rectangular.",
                rect.minima, rect.maxima
            )));
        }
        Ok(rect)
    }

    /// Create the degenerate rectangle covering exactly `coord`.
    pub fn point(coord: &[N]) -> Result<Self> {
        Self::new(coord.to_vec(), coord.to_vec())
    }

    /// Create a rectangle from any [`RectTrait`] implementation.
    pub fn from_rect(rect: &impl RectTrait<T = N>) -> Result<Self> {
        Self::new(coord_to_vec(&rect.min()), coord_to_vec(&rect.max()))
    }

    pub(crate) fn new_unchecked(minima: Vec<N>, maxima: Vec<N>) -> Self {
        debug_assert_eq!(minima.len(), maxima.len());
        let is_point = minima == maxima;
        Self {
            minima,
            maxima,
            is_point,
        }
    }

    /// The number of axes.
    pub fn dimension(&self) -> usize {
        self.minima.len()
    }

    /// The lower corner.
    pub fn minima(&self) -> &[N] {
        &self.minima
    }

    /// The upper corner.
    pub fn maxima(&self) -> &[N] {
        &self.maxima
    }

    /// Returns `true` if this rectangle is degenerate to a single point.
    pub fn is_point(&self) -> bool {
        self.is_point
    }

    /// The product of the per-axis extents, or zero for a point.
    pub fn volume(&self) -> N {
        if self.is_point {
            return N::zero();
        }
        self.extents().fold(N::one(), |acc, extent| acc * extent)
    }

    /// The overlap of two rectangles.
    ///
    /// When the rectangles do not overlap on some axis, or only touch, this returns the canonical
    /// [`empty_rectangle`] instead of failing.
    pub fn intersect(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dimension(), other.dimension());
        let lower: Vec<N> = self
            .minima
            .iter()
            .zip(&other.minima)
            .map(|(&a, &b)| a.max(b))
            .collect();
        let upper: Vec<N> = self
            .maxima
            .iter()
            .zip(&other.maxima)
            .map(|(&a, &b)| a.min(b))
            .collect();

        if !are_bounds_rectangular(&lower, &upper) {
            return empty_rectangle(self.dimension());
        }
        Self::new_unchecked(lower, upper)
    }

    /// The volume of [`Rectangle::intersect`].
    pub fn intersection_volume(&self, other: &Self) -> N {
        self.intersect(other).volume()
    }

    /// The smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dimension(), other.dimension());
        let lower = self
            .minima
            .iter()
            .zip(&other.minima)
            .map(|(&a, &b)| a.min(b))
            .collect();
        let upper = self
            .maxima
            .iter()
            .zip(&other.maxima)
            .map(|(&a, &b)| a.max(b))
            .collect();
        Self::new_unchecked(lower, upper)
    }

    /// The smallest rectangle covering both `self` and `point`.
    pub fn union_with_point(&self, point: &[N]) -> Self {
        debug_assert_eq!(self.dimension(), point.len());
        let lower = self
            .minima
            .iter()
            .zip(point)
            .map(|(&a, &b)| a.min(b))
            .collect();
        let upper = self
            .maxima
            .iter()
            .zip(point)
            .map(|(&a, &b)| a.max(b))
            .collect();
        Self::new_unchecked(lower, upper)
    }

    /// Returns `true` if every coordinate of `point` lies within the closed bounds of this
    /// rectangle.
    pub fn is_element(&self, point: &[N]) -> bool {
        debug_assert_eq!(self.dimension(), point.len());
        self.minima
            .iter()
            .zip(&self.maxima)
            .zip(point)
            .all(|((lower, upper), x)| lower <= x && x <= upper)
    }

    /// Returns `true` if both corners of `other` are elements of `self`.
    ///
    /// This is a corner containment test only.
    pub fn is_proper_superset(&self, other: &Self) -> bool {
        self.is_element(&other.minima) && self.is_element(&other.maxima)
    }

    /// The per-axis midpoint. For a point rectangle, the point itself.
    pub fn center(&self) -> Vec<N> {
        if self.is_point {
            return self.minima.clone();
        }
        let two = N::one() + N::one();
        self.minima
            .iter()
            .zip(&self.maxima)
            .map(|(lower, upper)| (*lower + *upper) / two)
            .collect()
    }

    /// The squared euclidean distance between the centers of two rectangles.
    pub fn center_distance_squared(&self, other: &Self) -> N {
        squared_distance(&self.center(), &other.center())
    }

    /// The margin of this rectangle: `2^(d-1)` times the sum of its extents.
    ///
    /// This is the generalized surface measure used to pick a split axis. It is only a geometric
    /// perimeter in two dimensions.
    pub fn perimeter(&self) -> N {
        let two = N::one() + N::one();
        let sum = self.extents().fold(N::zero(), |acc, extent| acc + extent);
        two.powi(self.dimension() as i32 - 1) * sum
    }

    /// Fails with [`RStarIndexError::DimensionMismatch`] unless this rectangle has `dimension`
    /// axes.
    pub fn check_dimension(&self, dimension: usize) -> Result<()> {
        check_dimension(dimension, self.dimension())
    }

    fn extents(&self) -> impl Iterator<Item = N> + '_ {
        self.minima
            .iter()
            .zip(&self.maxima)
            .map(|(lower, upper)| *upper - *lower)
    }
}

impl<N: IndexableNum> PartialEq for Rectangle<N> {
    fn eq(&self, other: &Self) -> bool {
        self.minima == other.minima && self.maxima == other.maxima
    }
}

/// The squared euclidean distance from `point` to the center of `rect`.
pub fn point_to_center_distance_squared<N: IndexableNum>(point: &[N], rect: &Rectangle<N>) -> N {
    squared_distance(point, &rect.center())
}

/// The bounding box of a sequence of rectangles, or `None` if the sequence is empty.
pub fn bounding_box<'a, N: IndexableNum>(
    rects: impl IntoIterator<Item = &'a Rectangle<N>>,
) -> Option<Rectangle<N>> {
    let mut rects = rects.into_iter();
    let first = rects.next()?.clone();
    Some(rects.fold(first, |acc, rect| acc.union(rect)))
}

/// The bounding box of a sequence of points, or `None` if the sequence is empty.
pub fn bounding_box_points<N: IndexableNum, P: AsRef<[N]>>(
    points: impl IntoIterator<Item = P>,
) -> Option<Rectangle<N>> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let first = first.as_ref();
    let start = Rectangle::new_unchecked(first.to_vec(), first.to_vec());
    Some(points.fold(start, |acc, point| acc.union_with_point(point.as_ref())))
}

/// Returns `true` if both bounds have the same length and `lower[i] < upper[i]` on every axis.
pub fn are_bounds_rectangular<N: IndexableNum>(lower: &[N], upper: &[N]) -> bool {
    lower.len() == upper.len() && lower.iter().zip(upper).all(|(l, u)| l < u)
}

/// The canonical empty rectangle: a point at the origin of dimension `dimension`.
pub fn empty_rectangle<N: IndexableNum>(dimension: usize) -> Rectangle<N> {
    Rectangle::new_unchecked(vec![N::zero(); dimension], vec![N::zero(); dimension])
}

/// The margin of `rect`. See [`Rectangle::perimeter`].
pub fn rectangle_perimeter<N: IndexableNum>(rect: &Rectangle<N>) -> N {
    rect.perimeter()
}

/// Collect the coordinates of any [`CoordTrait`] implementation, in axis order.
pub fn coord_to_vec<N: IndexableNum>(coord: &impl CoordTrait<T = N>) -> Vec<N> {
    (0..coord.dim().size())
        .map(|axis| coord.nth_or_panic(axis))
        .collect()
}

pub(crate) fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(RStarIndexError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[inline]
fn squared_distance<N: IndexableNum>(a: &[N], b: &[N]) -> N {
    a.iter().zip(b).fold(N::zero(), |acc, (x, y)| {
        let d = *x - *y;
        acc + d * d
    })
}
