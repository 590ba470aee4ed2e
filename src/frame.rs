//! CPU-side description of one frame.
//!
//! The scene records a [`FramePlan`]: an optional depth pass rendered from
//! the light, then the colour pass rendered from the camera. Each pass is a
//! list of [`DrawCommand`]s with their uniforms already resolved. The
//! renderer executes the plan in that order; nothing in here touches the GPU.

use glam::{Mat4, Vec3};

use crate::light::LightParams;
use crate::material::{DrawUniforms, Material, ShaderKind};
use crate::resources::{MeshId, TextureId};

/// Primitive assembly for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    Triangles,
}

impl Topology {
    pub const ALL: [Topology; 4] = [
        Topology::Points,
        Topology::Lines,
        Topology::LineStrip,
        Topology::Triangles,
    ];

    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Points => wgpu::PrimitiveTopology::PointList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
        }
    }

    pub fn is_triangles(self) -> bool {
        self == Topology::Triangles
    }
}

/// One recorded draw: which vertices, which program, which uniforms.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub mesh: MeshId,
    pub vertex_count: u32,
    pub shader: ShaderKind,
    pub topology: Topology,
    pub texture: TextureId,
    pub uniforms: DrawUniforms,
}

/// Draws that share a view-projection and eye position.
#[derive(Clone, Debug)]
pub struct PassPlan {
    pub view_projection: Mat4,
    pub eye: Vec3,
    pub light: LightParams,
    pub draws: Vec<DrawCommand>,
}

impl PassPlan {
    pub fn new(view_projection: Mat4, eye: Vec3, light: LightParams) -> Self {
        Self {
            view_projection,
            eye,
            light,
            draws: Vec::new(),
        }
    }

    /// Records a draw of every vertex of `mesh` with the resolved material.
    pub fn record(
        &mut self,
        mesh: MeshId,
        vertex_count: u32,
        material: &Material,
        model: Mat4,
        topology: Topology,
    ) {
        self.draws.push(DrawCommand {
            mesh,
            vertex_count,
            shader: material.shader,
            topology,
            texture: material.texture,
            uniforms: DrawUniforms::new(material, model, &self.light),
        });
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

/// Shadow-map settings the colour pass samples with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSettings {
    pub enabled: bool,
    /// Depth bias applied when comparing against the shadow map.
    pub bias: f32,
    pub map_size: u32,
    /// Near and far planes of the light projection, for displaying depth.
    pub depth_range: (f32, f32),
}

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct FramePlan {
    /// Present only when shadows are on.
    pub depth: Option<PassPlan>,
    pub color: PassPlan,
    pub light_view_projection: Mat4,
    pub shadow: ShadowSettings,
    pub clear_color: wgpu::Color,
}

impl FramePlan {
    pub fn draw_count(&self) -> usize {
        self.depth.as_ref().map_or(0, PassPlan::len) + self.color.len()
    }

    /// The passes to encode, in order. The depth pass is absent entirely
    /// when shadows are off, so the shadow map is never attached.
    ///
    /// Each pass's draws occupy consecutive uniform slots starting at
    /// `first_slot`.
    pub fn passes(&self) -> Vec<ScheduledPass<'_>> {
        let mut passes = Vec::with_capacity(2);
        let mut next_slot = 0;
        if let Some(depth) = &self.depth {
            passes.push(ScheduledPass {
                kind: PassKind::Depth,
                plan: depth,
                first_slot: next_slot,
            });
            next_slot += depth.len();
        }
        passes.push(ScheduledPass {
            kind: PassKind::Color,
            plan: &self.color,
            first_slot: next_slot,
        });
        passes
    }
}

/// Which render target a pass draws into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    /// The shadow map, from the light.
    Depth,
    /// The window, from the camera.
    Color,
}

/// One pass of [`FramePlan::passes`].
#[derive(Clone, Copy, Debug)]
pub struct ScheduledPass<'a> {
    pub kind: PassKind,
    pub plan: &'a PassPlan,
    pub first_slot: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_resolves_uniforms_against_pass_light() {
        let light = LightParams {
            position: Vec3::new(0.0, 13.0, 0.0),
            color: Vec3::ONE,
            ambient_strength: 0.2,
            specular_strength: 0.4,
        };
        let mut pass = PassPlan::new(Mat4::IDENTITY, Vec3::ZERO, light);
        pass.record(
            MeshId(3),
            36,
            &Material::unlit(Vec3::X),
            Mat4::from_translation(Vec3::Y),
            Topology::Lines,
        );

        let draw = &pass.draws[0];
        assert_eq!(draw.shader, ShaderKind::Unlit);
        assert_eq!(draw.vertex_count, 36);
        assert_eq!(draw.uniforms.light_position, [0.0, 13.0, 0.0, 1.0]);
        assert_eq!(draw.uniforms.model[3], [0.0, 1.0, 0.0, 1.0]);
    }

    fn plan(depth_draws: Option<usize>, color_draws: usize) -> FramePlan {
        let light = LightParams {
            position: Vec3::Y,
            color: Vec3::ONE,
            ambient_strength: 0.2,
            specular_strength: 0.4,
        };
        let pass = |count: usize| {
            let mut pass = PassPlan::new(Mat4::IDENTITY, Vec3::ZERO, light);
            for _ in 0..count {
                pass.record(MeshId(0), 36, &Material::shadow_mapper(), Mat4::IDENTITY, Topology::Triangles);
            }
            pass
        };
        FramePlan {
            depth: depth_draws.map(|count| pass(count)),
            color: pass(color_draws),
            light_view_projection: Mat4::IDENTITY,
            shadow: ShadowSettings {
                enabled: depth_draws.is_some(),
                bias: 0.005,
                map_size: 2048,
                depth_range: (1.0, 100.0),
            },
            clear_color: wgpu::Color::BLACK,
        }
    }

    #[test]
    fn shadows_off_schedules_only_the_colour_pass() {
        let plan = plan(None, 4);
        let passes = plan.passes();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].kind, PassKind::Color);
        assert_eq!(passes[0].first_slot, 0);
    }

    #[test]
    fn depth_pass_precedes_colour_pass() {
        let plan = plan(Some(3), 5);
        let passes = plan.passes();
        let kinds: Vec<PassKind> = passes.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PassKind::Depth, PassKind::Color]);
        assert_eq!(passes[0].first_slot, 0);
        assert_eq!(passes[1].first_slot, 3);
        assert_eq!(passes[1].plan.len(), 5);
        assert_eq!(passes[1].first_slot + passes[1].plan.len(), plan.draw_count());
    }

    #[test]
    fn line_loop_style_topologies_map_to_wgpu() {
        assert_eq!(Topology::LineStrip.to_wgpu(), wgpu::PrimitiveTopology::LineStrip);
        assert_eq!(Topology::Points.to_wgpu(), wgpu::PrimitiveTopology::PointList);
        assert!(Topology::Triangles.is_triangles());
    }
}
