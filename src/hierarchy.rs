//! Explicit part trees for composite characters.
//!
//! A [`PartTree`] is an arena of nodes. Each node stores a local matrix and a
//! parent link; its world matrix is `parent_world · local`. Joint nodes only
//! carry a frame, part nodes additionally carry a [`PartDraw`] whose local
//! matrix is the part's own scale, so siblings never see that scale.
//!
//! Trees are assembled with a [`CompositeBuilder`], usually from tables of
//! [`Segment`] rows.

use glam::{Mat4, Vec3};

use crate::frame::Topology;
use crate::transform::rotate_degrees;

/// Index of a node inside one [`PartTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Which shared mesh a part is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartShape {
    Cube,
    Sphere,
}

/// Primitive topology for a part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PartTopology {
    /// Use the topology the composite is drawn with.
    #[default]
    Inherit,
    /// Always draw with this topology.
    Fixed(Topology),
}

impl PartTopology {
    pub fn resolve(self, inherited: Topology) -> Topology {
        match self {
            PartTopology::Inherit => inherited,
            PartTopology::Fixed(topology) => topology,
        }
    }
}

/// Draw data carried by a part node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartDraw {
    pub shape: PartShape,
    /// Index into the palette the composite is drawn with.
    pub slot: usize,
    pub topology: PartTopology,
}

#[derive(Clone, Debug)]
struct PartNode {
    parent: Option<NodeId>,
    local: Mat4,
    draw: Option<PartDraw>,
}

/// Arena of transform nodes with parent links.
///
/// Nodes can only be parented to nodes that already exist, so every parent
/// index is smaller than its child's and one forward sweep resolves all world
/// matrices.
#[derive(Clone, Debug, Default)]
pub struct PartTree {
    nodes: Vec<PartNode>,
}

impl PartTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, parent: Option<NodeId>, local: Mat4, draw: Option<PartDraw>) -> NodeId {
        if let Some(parent) = parent {
            debug_assert!(parent.0 < self.nodes.len(), "parent must exist");
        }
        self.nodes.push(PartNode {
            parent,
            local,
            draw,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn local(&self, id: NodeId) -> Mat4 {
        self.nodes[id.0].local
    }

    pub fn set_local(&mut self, id: NodeId, local: Mat4) {
        self.nodes[id.0].local = local;
    }

    /// World matrix of one node, walking parent links up to the root.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes[id.0].local;
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            matrix = self.nodes[parent.0].local * matrix;
            cursor = self.nodes[parent.0].parent;
        }
        matrix
    }

    /// World matrices for every node, in insertion order.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let matrix = match node.parent {
                Some(parent) => world[parent.0] * node.local,
                None => node.local,
            };
            world.push(matrix);
        }
        world
    }

    /// World matrix and draw data of every part, in insertion order.
    pub fn parts(&self) -> Vec<(Mat4, PartDraw)> {
        self.world_matrices()
            .into_iter()
            .zip(&self.nodes)
            .filter_map(|(world, node)| node.draw.map(|draw| (world, draw)))
            .collect()
    }
}

/// One row of a character table: move, turn, then draw a scaled part.
///
/// The offset and rotation accumulate into the chain; the scale applies to
/// the drawn part only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub offset: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub slot: usize,
}

impl Segment {
    pub const fn new(offset: [f32; 3], rotation: [f32; 3], scale: [f32; 3], slot: usize) -> Self {
        Self {
            offset: Vec3::from_array(offset),
            rotation: Vec3::from_array(rotation),
            scale: Vec3::from_array(scale),
            slot,
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local frame of the segment's joint: `T(offset) · R(rotation)`.
    pub fn joint_matrix(&self) -> Mat4 {
        rotate_degrees(Mat4::from_translation(self.offset), self.rotation)
    }
}

/// Builds a [`PartTree`] by walking a cursor through local frames.
///
/// `translate`, `rotate` and `scale` add a joint below the cursor and move the
/// cursor onto it. `part` hangs a drawn leaf below the cursor without moving.
pub struct CompositeBuilder {
    tree: PartTree,
    root: NodeId,
    cursor: NodeId,
    topology: PartTopology,
}

impl Default for CompositeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeBuilder {
    pub fn new() -> Self {
        let mut tree = PartTree::new();
        let root = tree.add(None, Mat4::IDENTITY, None);
        Self {
            tree,
            root,
            cursor: root,
            topology: PartTopology::Inherit,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Moves the cursor back to an existing node.
    pub fn goto(&mut self, node: NodeId) -> &mut Self {
        self.cursor = node;
        self
    }

    /// Topology assigned to parts added from now on.
    pub fn topology(&mut self, topology: PartTopology) -> &mut Self {
        self.topology = topology;
        self
    }

    /// Adds a joint with an arbitrary local matrix and moves onto it.
    pub fn joint(&mut self, local: Mat4) -> NodeId {
        self.cursor = self.tree.add(Some(self.cursor), local, None);
        self.cursor
    }

    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.joint(Mat4::from_translation(offset));
        self
    }

    pub fn rotate(&mut self, degrees: Vec3) -> &mut Self {
        self.joint(rotate_degrees(Mat4::IDENTITY, degrees));
        self
    }

    /// A scale that stays in effect for everything below it.
    pub fn scale(&mut self, factors: Vec3) -> &mut Self {
        self.joint(Mat4::from_scale(factors));
        self
    }

    /// Adds a drawn leaf scaled by `scale` below the cursor.
    pub fn part(&mut self, shape: PartShape, scale: Vec3, slot: usize) -> NodeId {
        let draw = PartDraw {
            shape,
            slot,
            topology: self.topology,
        };
        self.tree
            .add(Some(self.cursor), Mat4::from_scale(scale), Some(draw))
    }

    pub fn cube(&mut self, scale: Vec3, slot: usize) -> NodeId {
        self.part(PartShape::Cube, scale, slot)
    }

    /// Adds the segment's joint, moves onto it, and hangs a cube below it.
    /// Returns the joint.
    pub fn segment(&mut self, segment: &Segment) -> NodeId {
        let joint = self.joint(segment.joint_matrix());
        self.cube(segment.scale, segment.slot);
        joint
    }

    pub fn segments(&mut self, segments: &[Segment]) -> &mut Self {
        for segment in segments {
            self.segment(segment);
        }
        self
    }

    pub fn repeat(&mut self, count: usize, segment: &Segment) -> &mut Self {
        for _ in 0..count {
            self.segment(segment);
        }
        self
    }

    pub fn build(self) -> PartTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformChain;

    #[test]
    fn world_matrix_composes_with_parent() {
        let mut tree = PartTree::new();
        let root = tree.add(None, Mat4::from_translation(Vec3::Y), None);
        let child = tree.add(Some(root), Mat4::from_rotation_z(1.0), None);
        let leaf = tree.add(Some(child), Mat4::from_scale(Vec3::splat(2.0)), None);

        let expected = Mat4::from_translation(Vec3::Y)
            * Mat4::from_rotation_z(1.0)
            * Mat4::from_scale(Vec3::splat(2.0));
        assert!(tree.world_matrix(leaf).abs_diff_eq(expected, 1e-6));
        assert_eq!(tree.world_matrices()[leaf.0], tree.world_matrix(leaf));
        assert_eq!(tree.parent(leaf), Some(child));
    }

    #[test]
    fn part_scale_does_not_leak_into_siblings() {
        let mut builder = CompositeBuilder::new();
        builder.translate(Vec3::new(0.0, 0.0, -1.0));
        builder.cube(Vec3::new(0.2, 36.0, 0.2), 0);
        builder.translate(Vec3::new(0.0, 0.0, -1.0));
        builder.cube(Vec3::new(0.2, 36.0, 0.2), 0);
        let parts = builder.build().parts();

        let second = parts[1].0.transform_point3(Vec3::ZERO);
        assert!(second.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-6));
    }

    #[test]
    fn segments_match_scale_unscale_chain() {
        let rows = [
            Segment::new([0.0, 0.0, 0.0], [45.0, 0.0, 0.0], [1.0, 5.0, 1.0], 0),
            Segment::new([0.0, 5.0, 0.0], [-45.0, 0.0, 0.0], [1.0, 4.0, 1.0], 0),
            Segment::new([0.0, 4.0, 0.0], [0.0, 0.0, 0.0], [0.5, 4.0, 0.5], 1),
        ];

        let mut builder = CompositeBuilder::new();
        builder.segments(&rows);
        let tree_matrices: Vec<Mat4> = builder.build().parts().iter().map(|p| p.0).collect();

        let mut chain = TransformChain::default();
        for row in &rows {
            chain.translate(row.offset).rotate(row.rotation).draw_scaled(row.scale);
        }

        assert_eq!(tree_matrices.len(), chain.drawn().len());
        for (tree, chained) in tree_matrices.iter().zip(chain.drawn()) {
            assert!(tree.abs_diff_eq(*chained, 1e-4));
        }
    }

    #[test]
    fn moving_a_joint_moves_its_descendants() {
        let mut builder = CompositeBuilder::new();
        let joint = builder.joint(Mat4::IDENTITY);
        let leaf = builder.cube(Vec3::ONE, 0);
        let mut tree = builder.build();

        tree.set_local(joint, Mat4::from_translation(Vec3::X));
        let origin = tree.world_matrix(leaf).transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn fixed_topology_overrides_inherited() {
        assert_eq!(PartTopology::Inherit.resolve(Topology::Points), Topology::Points);
        assert_eq!(
            PartTopology::Fixed(Topology::Triangles).resolve(Topology::Lines),
            Topology::Triangles
        );
    }
}
