//! Tree nodes and their cached bounding keys.

use crate::error::{RStarIndexError, Result};
use crate::r#type::{IndexableNum, PointId, PointMap};
use crate::rectangle::{
    bounding_box, bounding_box_points, check_dimension, empty_rectangle, Rectangle,
};

/// The contents of a node: either points (leaf) or child nodes (internal).
#[derive(Debug, Clone)]
pub(crate) enum NodeContents<N: IndexableNum> {
    Leaf(PointMap<N>),
    Internal(Vec<Node<N>>),
}

/// A node in an R*-tree.
///
/// A leaf owns a mapping from point id to coordinates; an internal node exclusively owns an
/// ordered list of children. Every node caches `key`, the tight bounding rectangle of its
/// contents, and every mutation recomputes it.
#[derive(Debug, Clone)]
pub struct Node<N: IndexableNum> {
    key: Rectangle<N>,
    contents: NodeContents<N>,
}

impl<N: IndexableNum> Node<N> {
    /// Create a node from either a non-empty set of children or a non-empty set of points.
    ///
    /// Supplying both, or neither, fails with [`RStarIndexError::InvalidNode`].
    pub fn try_new(children: Vec<Node<N>>, points: PointMap<N>) -> Result<Self> {
        match (children.is_empty(), points.is_empty()) {
            (true, false) => Self::new_leaf(points),
            (false, true) => Self::new_internal(children),
            (false, false) => Err(RStarIndexError::InvalidNode(
                "A node cannot hold both children and points.".to_string(),
            )),
            (true, true) => Err(RStarIndexError::InvalidNode(
                "A node must hold either children or points.".to_string(),
            )),
        }
    }

    /// Create a leaf from a non-empty set of points sharing one dimension.
    pub fn new_leaf(points: PointMap<N>) -> Result<Self> {
        let dimension = points
            .values()
            .next()
            .map(Vec::len)
            .ok_or_else(|| RStarIndexError::InvalidNode("A leaf must hold points.".to_string()))?;
        for coord in points.values() {
            validate_coord(coord, dimension)?;
        }

        let mut node = Self {
            key: empty_rectangle(dimension),
            contents: NodeContents::Leaf(points),
        };
        node.update_bounding_key();
        Ok(node)
    }

    /// Create an internal node from a non-empty list of children sharing one dimension.
    pub fn new_internal(children: Vec<Node<N>>) -> Result<Self> {
        let dimension = children.first().map(|c| c.key.dimension()).ok_or_else(|| {
            RStarIndexError::InvalidNode("An internal node must hold children.".to_string())
        })?;
        for child in children.iter() {
            child.key.check_dimension(dimension)?;
        }

        let mut node = Self {
            key: empty_rectangle(dimension),
            contents: NodeContents::Internal(children),
        };
        node.update_bounding_key();
        Ok(node)
    }

    /// An internal node without children.
    ///
    /// Only used as a placeholder while the root is moved out and replaced.
    pub(crate) fn null() -> Self {
        Self {
            key: empty_rectangle(1),
            contents: NodeContents::Internal(vec![]),
        }
    }

    /// The bounding rectangle of this node's contents.
    pub fn key(&self) -> &Rectangle<N> {
        &self.key
    }

    /// Returns `true` if this node holds points rather than children.
    pub fn is_leaf(&self) -> bool {
        matches!(self.contents, NodeContents::Leaf(_))
    }

    /// The ordered children of an internal node. Empty for a leaf.
    pub fn children(&self) -> &[Node<N>] {
        match &self.contents {
            NodeContents::Leaf(_) => &[],
            NodeContents::Internal(children) => children,
        }
    }

    /// The points of a leaf, or `None` for an internal node.
    pub fn points(&self) -> Option<&PointMap<N>> {
        match &self.contents {
            NodeContents::Leaf(points) => Some(points),
            NodeContents::Internal(_) => None,
        }
    }

    /// The number of children. Zero for a leaf.
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// The number of points. Zero for an internal node.
    pub fn point_count(&self) -> usize {
        self.points().map_or(0, |points| points.len())
    }

    /// The number of points of a leaf or children of an internal node.
    pub fn entry_count(&self) -> usize {
        match &self.contents {
            NodeContents::Leaf(points) => points.len(),
            NodeContents::Internal(children) => children.len(),
        }
    }

    /// Returns `true` if every child is a leaf. This is vacuously `true` for a leaf.
    pub fn all_children_are_leaves(&self) -> bool {
        self.children().iter().all(Node::is_leaf)
    }

    /// Recompute the cached key from the current contents.
    ///
    /// A leaf whose last point was removed keeps its dimension; an internal node without children
    /// falls back to the one-dimensional [`empty_rectangle`].
    pub fn update_bounding_key(&mut self) {
        self.key = match &self.contents {
            NodeContents::Leaf(points) => bounding_box_points(points.values())
                .unwrap_or_else(|| empty_rectangle(self.key.dimension())),
            NodeContents::Internal(children) => {
                bounding_box(children.iter().map(|child| &child.key))
                    .unwrap_or_else(|| empty_rectangle(1))
            }
        };
    }

    /// Add a point to a leaf. An existing point with the same id is replaced.
    pub fn add_point(&mut self, id: PointId, coord: Vec<N>) -> Result<()> {
        let dimension = self.key.dimension();
        let NodeContents::Leaf(points) = &mut self.contents else {
            return Err(RStarIndexError::InvalidNode(
                "Cannot add a point to an internal node.".to_string(),
            ));
        };
        validate_coord(&coord, dimension)?;
        points.insert(id, coord);
        self.update_bounding_key();
        Ok(())
    }

    /// Remove a point from a leaf, returning its coordinates.
    pub fn remove_point(&mut self, id: PointId) -> Result<Vec<N>> {
        let NodeContents::Leaf(points) = &mut self.contents else {
            return Err(RStarIndexError::InvalidNode(
                "Cannot remove a point from an internal node.".to_string(),
            ));
        };
        let coord = points
            .remove(&id)
            .ok_or_else(|| RStarIndexError::KeyNotFound(format!("Point {} not in leaf.", id)))?;
        self.update_bounding_key();
        Ok(coord)
    }

    /// Append a child to an internal node.
    pub fn add_child(&mut self, child: Node<N>) -> Result<()> {
        let dimension = self.key.dimension();
        let NodeContents::Internal(children) = &mut self.contents else {
            return Err(RStarIndexError::InvalidNode(
                "Cannot add a child to a leaf.".to_string(),
            ));
        };
        if !children.is_empty() {
            child.key.check_dimension(dimension)?;
        }
        children.push(child);
        self.update_bounding_key();
        Ok(())
    }

    /// Remove the first child equal to `child` (same key and kind), returning it.
    pub fn remove_child(&mut self, child: &Node<N>) -> Result<Node<N>> {
        if self.is_leaf() {
            return Err(RStarIndexError::InvalidNode(
                "Cannot remove a child from a leaf.".to_string(),
            ));
        }
        let index = self
            .children()
            .iter()
            .position(|c| c == child)
            .ok_or_else(|| {
                RStarIndexError::KeyNotFound(format!("Child with key {:?} not found.", child.key))
            })?;
        Ok(self.take_child(index))
    }

    /// Remove the child at `index`. The caller guarantees the index is in range.
    pub(crate) fn take_child(&mut self, index: usize) -> Node<N> {
        let NodeContents::Internal(children) = &mut self.contents else {
            unreachable!("take_child called on a leaf");
        };
        let child = children.remove(index);
        self.update_bounding_key();
        child
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut Node<N>> {
        match &mut self.contents {
            NodeContents::Leaf(_) => None,
            NodeContents::Internal(children) => children.get_mut(index),
        }
    }

    pub(crate) fn into_contents(self) -> NodeContents<N> {
        self.contents
    }
}

impl<N: IndexableNum> PartialEq for Node<N> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.is_leaf() == other.is_leaf()
    }
}

fn validate_coord<N: IndexableNum>(coord: &[N], dimension: usize) -> Result<()> {
    check_dimension(dimension, coord.len())?;
    Rectangle::point(coord)?;
    Ok(())
}
