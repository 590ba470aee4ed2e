//! Primitive instances: an immutable mesh plus mutable transform and material.

use glam::Mat4;

use crate::frame::{PassPlan, Topology};
use crate::hierarchy::{PartShape, PartTree};
use crate::material::Material;
use crate::mesh::Geometry;
use crate::resources::{MeshId, ResourceStore};
use crate::transform::Transform;

/// A drawable primitive instance.
///
/// The geometry behind `mesh` never changes after upload. Transform and
/// material belong to the instance and may be edited every frame; one
/// instance may also be drawn many times per frame with different matrices
/// and material overrides.
#[derive(Clone, Debug)]
pub struct VisualObject {
    mesh: MeshId,
    vertex_count: u32,
    pub transform: Transform,
    pub material: Material,
}

impl VisualObject {
    /// Uploads `geometry` and wraps it with a default transform.
    pub fn new(
        store: &mut impl ResourceStore,
        label: &str,
        geometry: &Geometry,
        material: Material,
    ) -> Self {
        Self::from_mesh(store.add_mesh(label, geometry), geometry.vertex_count(), material)
    }

    /// Another instance of an already uploaded mesh.
    pub fn from_mesh(mesh: MeshId, vertex_count: u32, material: Material) -> Self {
        Self {
            mesh,
            vertex_count,
            transform: Transform::default(),
            material,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Draws with the instance's own transform.
    pub fn draw(&self, pass: &mut PassPlan, topology: Topology, override_material: Option<&Material>) {
        self.draw_from_matrix(pass, self.transform.matrix(), topology, override_material);
    }

    /// Draws with an explicit world matrix. `override_material`, when given,
    /// replaces the instance material for this draw only.
    pub fn draw_from_matrix(
        &self,
        pass: &mut PassPlan,
        model: Mat4,
        topology: Topology,
        override_material: Option<&Material>,
    ) {
        let material = Material::resolve(&self.material, override_material);
        pass.record(self.mesh, self.vertex_count, material, model, topology);
    }
}

/// The primitive instances a composite is drawn with.
#[derive(Clone, Copy, Debug)]
pub struct PartShapes<'a> {
    pub cube: &'a VisualObject,
    pub sphere: &'a VisualObject,
}

impl PartShapes<'_> {
    fn get(&self, shape: PartShape) -> &VisualObject {
        match shape {
            PartShape::Cube => self.cube,
            PartShape::Sphere => self.sphere,
        }
    }
}

/// Draws every part of `tree` in insertion order.
///
/// A part is drawn with `palette[slot]`, or with `override_material` when one
/// is given. Parts pinned to a topology ignore `topology`.
pub fn draw_composite(
    pass: &mut PassPlan,
    tree: &PartTree,
    shapes: PartShapes<'_>,
    palette: &[Material],
    topology: Topology,
    override_material: Option<&Material>,
) {
    for (world, part) in tree.parts() {
        let object = shapes.get(part.shape);
        let material = override_material
            .or_else(|| palette.get(part.slot))
            .unwrap_or(&object.material);
        object.draw_from_matrix(pass, world, part.topology.resolve(topology), Some(material));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::light::LightParams;
    use crate::material::{DrawUniforms, ShaderKind};
    use crate::resources::HeadlessStore;

    fn pass() -> PassPlan {
        PassPlan::new(
            Mat4::IDENTITY,
            Vec3::ZERO,
            LightParams {
                position: Vec3::Y,
                color: Vec3::ONE,
                ambient_strength: 0.2,
                specular_strength: 0.4,
            },
        )
    }

    #[test]
    fn no_override_uses_instance_material_for_every_uniform() {
        let mut store = HeadlessStore::new();
        let material = Material::lit(Vec3::new(0.51, 0.53, 0.53))
            .alpha(0.95)
            .shininess(64)
            .line_thickness(2.0)
            .point_size(3.0);
        let cube = VisualObject::new(&mut store, "cube", &Geometry::cube(Vec3::ZERO), material.clone())
            .with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));

        let mut pass = pass();
        cube.draw(&mut pass, Topology::Triangles, None);

        let expected = DrawUniforms::new(&material, cube.transform.matrix(), &pass.light);
        assert_eq!(pass.draws[0].uniforms, expected);
        assert_eq!(pass.draws[0].shader, ShaderKind::Lit);
        assert_eq!(pass.draws[0].vertex_count, 36);
    }

    #[test]
    fn override_replaces_material_for_one_draw() {
        let mut store = HeadlessStore::new();
        let cube = VisualObject::new(
            &mut store,
            "cube",
            &Geometry::cube(Vec3::ZERO),
            Material::lit(Vec3::ONE),
        );
        let depth = Material::shadow_mapper();

        let mut pass = pass();
        cube.draw_from_matrix(&mut pass, Mat4::IDENTITY, Topology::Triangles, Some(&depth));
        cube.draw_from_matrix(&mut pass, Mat4::IDENTITY, Topology::Triangles, None);

        assert_eq!(pass.draws[0].shader, ShaderKind::ShadowMapper);
        assert_eq!(pass.draws[1].shader, ShaderKind::Lit);
    }

    #[test]
    fn composite_uses_palette_slots_and_pinned_topology() {
        use crate::hierarchy::{CompositeBuilder, PartTopology};

        let mut store = HeadlessStore::new();
        let cube = VisualObject::new(&mut store, "cube", &Geometry::cube(Vec3::Y * 0.5), Material::default());
        let sphere = VisualObject::new(&mut store, "ball", &Geometry::icosphere(1.0, 0), Material::default());
        let shapes = PartShapes { cube: &cube, sphere: &sphere };
        let palette = [Material::lit(Vec3::X), Material::unlit(Vec3::Y)];

        let mut builder = CompositeBuilder::new();
        builder.cube(Vec3::ONE, 1);
        builder.topology(PartTopology::Fixed(Topology::Triangles));
        builder.translate(Vec3::Y).part(PartShape::Sphere, Vec3::ONE, 0);
        let tree = builder.build();

        let mut pass = pass();
        draw_composite(&mut pass, &tree, shapes, &palette, Topology::Points, None);
        assert_eq!(pass.draws.len(), 2);
        assert_eq!(pass.draws[0].shader, ShaderKind::Unlit);
        assert_eq!(pass.draws[0].topology, Topology::Points);
        assert_eq!(pass.draws[1].mesh, sphere.mesh());
        assert_eq!(pass.draws[1].topology, Topology::Triangles);

        let depth = Material::shadow_mapper();
        let mut pass = self::pass();
        draw_composite(&mut pass, &tree, shapes, &palette, Topology::Points, Some(&depth));
        assert!(pass.draws.iter().all(|d| d.shader == ShaderKind::ShadowMapper));
    }
}
