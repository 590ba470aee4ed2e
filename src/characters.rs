//! The hard-coded composites of the tennis scene.
//!
//! Every character is a table of [`Segment`] rows plus a few free-form steps,
//! fed through a [`CompositeBuilder`]. Racket rigs keep handles to the root
//! and upper-arm joints so the scene can pose them each frame without
//! rebuilding the tree.

use glam::{Mat4, Vec3};

use crate::frame::Topology;
use crate::hierarchy::{CompositeBuilder, NodeId, PartShape, PartTopology, PartTree, Segment};
use crate::transform::rotate_degrees;

/// Palette slots shared by all racket rigs.
pub mod slot {
    pub const SKIN: usize = 0;
    pub const HANDLE: usize = 1;
    pub const PRIMARY: usize = 2;
    pub const SECONDARY: usize = 3;
    pub const STRINGS: usize = 4;
    pub const LETTER: usize = 5;
    pub const BALL: usize = 6;
    pub const PALETTE_LEN: usize = 7;

    pub const NET_POST: usize = 0;
    pub const NET_MESH: usize = 1;
    pub const NET_PALETTE_LEN: usize = 2;
}

use slot::*;

/// Row of the arm chain whose rotation is driven by the upper-arm pose.
const ARM_ROW: usize = 1;

/// Upper-arm rotation every rig starts with and resets to.
pub const DEFAULT_ARM_ROTATION: Vec3 = Vec3::new(-45.0, 0.0, 0.0);

const BALL_OFFSET: Vec3 = Vec3::new(2.0, 15.0, 2.0);

const fn seg(offset: [f32; 3], rotation: [f32; 3], scale: [f32; 3], slot: usize) -> Segment {
    Segment::new(offset, rotation, scale, slot)
}

const AUGUSTO_ARM: [Segment; 10] = [
    seg([0.0, 0.0, 0.0], [45.0, 0.0, 0.0], [1.0, 5.0, 1.0], SKIN),
    seg([0.0, 5.0, 0.0], [0.0, 0.0, 0.0], [1.0, 4.0, 1.0], SKIN),
    seg([0.0, 4.0, 0.0], [0.0, 0.0, 0.0], [0.5, 4.0, 0.5], HANDLE),
    seg([0.0, 4.0, 0.0], [-60.0, 0.0, 0.0], [0.5, 2.0, 0.5], PRIMARY),
    seg([0.0, 2.0, 0.0], [60.0, 0.0, 0.0], [0.5, 3.0, 0.5], SECONDARY),
    seg([0.0, 3.0, 0.0], [60.0, 0.0, 0.0], [0.5, 1.0, 0.5], PRIMARY),
    seg([0.0, 1.0, 0.0], [30.0, 0.0, 0.0], [0.5, 1.6, 0.5], SECONDARY),
    seg([0.0, 1.6, 0.0], [30.0, 0.0, 0.0], [0.5, 1.0, 0.5], PRIMARY),
    seg([0.0, 1.0, 0.0], [60.0, 0.0, 0.0], [0.5, 3.0, 0.5], SECONDARY),
    seg([0.0, 3.0, 0.0], [90.0, 0.0, 0.0], [0.4, 3.2, 0.4], PRIMARY),
];

const GABRIELLE_ARM: [Segment; 10] = [
    seg([0.0, 0.0, 0.0], [45.0, 0.0, 0.0], [1.0, 5.0, 1.0], SKIN),
    seg([0.0, 5.0, 0.0], [0.0, 0.0, 0.0], [1.0, 4.0, 1.0], SKIN),
    seg([0.0, 4.0, 0.0], [0.0, 0.0, 0.0], [0.5, 4.0, 0.5], PRIMARY),
    seg([0.0, 4.0, 0.0], [-60.0, 0.0, 0.0], [0.5, 2.5, 0.5], PRIMARY),
    seg([0.0, 2.5, 0.0], [60.0, 0.0, 0.0], [0.5, 2.5, 0.5], PRIMARY),
    seg([0.0, 2.5, 0.0], [40.0, 0.0, 0.0], [0.5, 1.5, 0.5], PRIMARY),
    seg([0.0, 1.5, 0.0], [50.0, 0.0, 0.0], [0.5, 2.0, 0.5], PRIMARY),
    seg([0.0, 2.0, 0.0], [50.0, 0.0, 0.0], [0.5, 1.5, 0.5], PRIMARY),
    seg([0.0, 1.5, 0.0], [40.0, 0.0, 0.0], [0.5, 2.5, 0.5], PRIMARY),
    seg([0.0, 2.5, 0.0], [90.0, 0.0, 0.0], [0.5, 4.0, 0.5], PRIMARY),
];

const JACK_ARM: [Segment; 7] = [
    seg([0.0, 0.0, 0.0], [45.0, 0.0, 0.0], [1.0, 5.0, 1.0], SKIN),
    seg([0.0, 5.0, 0.0], [0.0, 0.0, 0.0], [1.0, 4.0, 1.0], SKIN),
    seg([0.0, 4.0, 0.0], [0.0, 0.0, 0.0], [0.5, 5.0, 0.5], PRIMARY),
    seg([0.0, 5.0, -2.5], [-90.0, 0.0, 0.0], [0.5, 5.0, 0.5], PRIMARY),
    seg([0.0, 0.0, 0.0], [90.0, 0.0, 0.0], [0.5, 7.0, 0.5], PRIMARY),
    seg([0.0, 7.0, 0.0], [-90.0, 0.0, 0.0], [0.5, 5.0, 0.5], PRIMARY),
    seg([0.0, 5.0, 0.0], [-90.0, 0.0, 0.0], [0.5, 7.0, 0.5], PRIMARY),
];

const LETTER_A_STEPS: [[f32; 3]; 12] = [
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, -1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, -1.0, 0.0],
    [-1.0, 2.0, 0.0],
    [-1.0, 0.0, 0.0],
];

const LETTER_G_STEPS: [[f32; 3]; 11] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.75],
    [0.0, 0.75, 0.75],
    [0.0, 0.75, 0.0],
    [0.0, 0.75, 0.0],
    [0.0, 0.75, -0.75],
    [0.0, 0.0, -0.75],
    [0.0, 0.0, -0.75],
    [0.0, -1.5, 0.0],
    [0.0, 0.0, 0.75],
    [0.0, -0.75, -0.75],
];

const LETTER_J_STEPS: [[f32; 3]; 9] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.75],
    [0.0, 0.75, 0.75],
    [0.0, 0.0, -1.5],
    [0.0, 0.75, 0.0],
    [0.0, 0.75, 0.0],
    [0.0, 0.75, 0.0],
    [0.0, 0.0, 0.75],
    [0.0, 0.0, -1.5],
];

/// The three selectable players, each holding a racket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Augusto,
    Gabrielle,
    Jack,
}

impl Player {
    pub const ALL: [Player; 3] = [Player::Augusto, Player::Gabrielle, Player::Jack];

    pub fn index(self) -> usize {
        match self {
            Player::Augusto => 0,
            Player::Gabrielle => 1,
            Player::Jack => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A racket tree with handles to its posable joints.
#[derive(Clone, Debug)]
pub struct RacketRig {
    pub tree: PartTree,
    root: NodeId,
    arm: NodeId,
    arm_offset: Vec3,
}

impl RacketRig {
    pub fn build(player: Player) -> Self {
        match player {
            Player::Augusto => augusto(),
            Player::Gabrielle => gabrielle(),
            Player::Jack => jack(),
        }
    }

    /// Places the whole rig and bends its upper arm.
    pub fn set_pose(&mut self, root: Mat4, arm_rotation: Vec3) {
        self.tree.set_local(self.root, root);
        let arm = rotate_degrees(Mat4::from_translation(self.arm_offset), arm_rotation);
        self.tree.set_local(self.arm, arm);
    }
}

/// Walks an arm table and returns the joint of [`ARM_ROW`].
fn arm_chain(builder: &mut CompositeBuilder, rows: &[Segment]) -> NodeId {
    let mut arm = builder.cursor();
    for (index, row) in rows.iter().enumerate() {
        if index == ARM_ROW {
            arm = builder.segment(&row.with_rotation(DEFAULT_ARM_ROTATION));
        } else {
            builder.segment(row);
        }
    }
    arm
}

fn letter(builder: &mut CompositeBuilder, steps: &[[f32; 3]], part_scale: Vec3) {
    builder.topology(PartTopology::Fixed(Topology::Triangles));
    for step in steps {
        builder.translate(Vec3::from_array(*step));
        builder.cube(part_scale, LETTER);
    }
    builder.topology(PartTopology::Inherit);
}

fn ball(builder: &mut CompositeBuilder) {
    let root = builder.root();
    builder.goto(root).translate(BALL_OFFSET);
    builder.part(PartShape::Sphere, Vec3::ONE, BALL);
}

fn finish(builder: CompositeBuilder, arm: NodeId, rows: &[Segment]) -> RacketRig {
    let root = builder.root();
    RacketRig {
        tree: builder.build(),
        root,
        arm,
        arm_offset: rows[ARM_ROW].offset,
    }
}

fn augusto() -> RacketRig {
    let mut b = CompositeBuilder::new();
    let arm = arm_chain(&mut b, &AUGUSTO_ARM);

    b.rotate(Vec3::new(90.0, -90.0, 0.0));
    b.segment(&seg([-0.65, 0.0, 0.0], [0.0; 3], [0.1, 3.55, 0.1], STRINGS));
    b.repeat(4, &seg([-0.5, 0.0, 0.0], [0.0; 3], [0.1, 3.55, 0.1], STRINGS));
    b.translate(Vec3::new(-0.4, 0.0, 0.0))
        .rotate(Vec3::new(0.0, 0.0, 90.0));
    b.segment(&seg([-0.6, 0.0, 0.0], [0.0; 3], [0.1, 3.05, 0.1], STRINGS));
    b.repeat(4, &seg([-0.5, 0.0, 0.0], [0.0; 3], [0.1, 3.05, 0.1], STRINGS));
    b.segment(&seg([2.65, 3.2, 0.0], [0.0, 0.0, 150.0], [0.5, 2.0, 0.5], PRIMARY));

    let root = b.root();
    b.goto(root)
        .rotate(Vec3::new(0.0, 90.0, 0.0))
        .translate(Vec3::new(-1.125, 20.0, 0.0))
        .scale(Vec3::splat(0.75));
    letter(&mut b, &LETTER_A_STEPS, Vec3::ONE);

    ball(&mut b);
    finish(b, arm, &AUGUSTO_ARM)
}

fn gabrielle() -> RacketRig {
    let mut b = CompositeBuilder::new();
    let arm = arm_chain(&mut b, &GABRIELLE_ARM);

    b.translate(Vec3::new(0.0, 4.0, 0.0))
        .rotate(Vec3::new(-150.0, 0.0, 0.0));
    b.segment(&seg([0.0, 2.5, 0.0], [-60.0, 0.0, 0.0], [0.5, 2.25, 0.5], PRIMARY));

    b.segment(&seg([0.0, 0.75, 5.0], [30.0, 0.0, 0.0], [0.1, 2.5, 0.1], STRINGS));
    b.repeat(6, &seg([0.0, 0.0, -0.5], [0.0; 3], [0.1, 3.5, 0.1], STRINGS));
    b.segment(&seg([0.0, 0.0, -0.5], [-90.0, 0.0, 0.0], [0.1, 3.5, 0.1], STRINGS));
    b.repeat(6, &seg([0.0, 0.0, -0.5], [0.0; 3], [0.1, 3.5, 0.1], STRINGS));

    let root = b.root();
    b.goto(root).translate(Vec3::new(0.0, 20.0, -3.0));
    letter(&mut b, &LETTER_G_STEPS, Vec3::splat(0.75));

    ball(&mut b);
    finish(b, arm, &GABRIELLE_ARM)
}

fn jack() -> RacketRig {
    let mut b = CompositeBuilder::new();
    let arm = arm_chain(&mut b, &JACK_ARM);

    b.rotate(Vec3::new(-90.0, 0.0, 0.0))
        .translate(Vec3::new(0.0, 0.2, 0.0));
    b.repeat(13, &seg([0.0, 0.0, -0.5], [0.0; 3], [0.1, 4.5, 0.1], STRINGS));
    b.rotate(Vec3::new(-90.0, 0.0, 0.0))
        .translate(Vec3::new(0.0, -0.25, 0.25));
    b.repeat(9, &seg([0.0, 0.0, -0.5], [0.0; 3], [0.1, 6.5, 0.1], STRINGS));

    let root = b.root();
    b.goto(root).translate(Vec3::new(0.0, 23.0, -3.0));
    letter(&mut b, &LETTER_J_STEPS, Vec3::splat(0.75));

    ball(&mut b);
    finish(b, arm, &JACK_ARM)
}

/// The court net: two posts with a lattice of thin strands between them.
pub fn net() -> PartTree {
    let mut b = CompositeBuilder::new();
    let post = Vec3::new(1.0, 8.0, 1.0);

    b.translate(Vec3::new(0.0, 0.0, -18.0));
    b.cube(post, NET_POST);

    b.rotate(Vec3::new(-90.0, 0.0, 0.0));
    b.repeat(7, &seg([0.0, 0.0, -1.0], [0.0; 3], [0.2, 36.0, 0.2], NET_MESH));

    b.translate(Vec3::new(0.0, 0.0, 6.0))
        .rotate(Vec3::new(90.0, 0.0, 0.0));
    b.repeat(36, &seg([0.0, 0.0, 1.0], [0.0; 3], [0.2, 6.0, 0.2], NET_MESH));

    b.translate(Vec3::new(0.0, -1.0, 0.0));
    b.cube(post, NET_POST);

    b.build()
}
