//! Shader programs and the uniform values drawn with them.

use glam::{Mat4, Vec3};

use crate::light::LightParams;
use crate::resources::TextureId;

/// The compiled programs the renderer knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Phong lighting with shadow lookup and optional texture.
    Lit,
    /// Flat colour.
    Unlit,
    /// Flat colour that fades with distance from the camera.
    Grid,
    /// Screen-space quad showing the shadow map.
    Screen,
    /// Depth-only output for the shadow pass.
    ShadowMapper,
}

impl ShaderKind {
    /// Programs that render in the colour pass.
    pub const COLOR: [ShaderKind; 4] = [
        ShaderKind::Lit,
        ShaderKind::Unlit,
        ShaderKind::Grid,
        ShaderKind::Screen,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Lit => "lit",
            ShaderKind::Unlit => "unlit",
            ShaderKind::Grid => "grid",
            ShaderKind::Screen => "screen",
            ShaderKind::ShadowMapper => "shadow_mapper",
        }
    }
}

/// A bag of shader uniform values.
///
/// Materials are cheap to clone. A draw either uses the object's own material
/// or an override supplied for that draw; see [`Material::resolve`].
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shader: ShaderKind,
    pub color: Vec3,
    pub alpha: f32,
    pub line_thickness: f32,
    pub point_size: f32,
    pub ambient_strength: f32,
    pub specular_strength: f32,
    pub shininess: u32,
    pub light_position: Vec3,
    pub light_color: Vec3,
    /// Take light position, colour and strengths from the scene light at
    /// draw time instead of the fields above.
    pub main_light: bool,
    pub texture: TextureId,
    /// 0 uses only `color`, 1 uses only the texture.
    pub texture_influence: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shader: ShaderKind::Lit,
            color: Vec3::ONE,
            alpha: 1.0,
            line_thickness: 1.0,
            point_size: 1.0,
            ambient_strength: 0.1,
            specular_strength: 0.5,
            shininess: 32,
            light_position: Vec3::ZERO,
            light_color: Vec3::ONE,
            main_light: true,
            texture: TextureId::NONE,
            texture_influence: 0.0,
        }
    }
}

impl Material {
    pub fn lit(color: Vec3) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn unlit(color: Vec3) -> Self {
        Self {
            shader: ShaderKind::Unlit,
            color,
            ..Default::default()
        }
    }

    pub fn grid(color: Vec3, alpha: f32) -> Self {
        Self {
            shader: ShaderKind::Grid,
            color,
            alpha,
            ..Default::default()
        }
    }

    pub fn screen() -> Self {
        Self {
            shader: ShaderKind::Screen,
            ..Default::default()
        }
    }

    /// The depth-only material used for every caster in the shadow pass.
    pub fn shadow_mapper() -> Self {
        Self {
            shader: ShaderKind::ShadowMapper,
            ..Default::default()
        }
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn shininess(mut self, shininess: u32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn line_thickness(mut self, thickness: f32) -> Self {
        self.line_thickness = thickness;
        self
    }

    pub fn point_size(mut self, size: f32) -> Self {
        self.point_size = size;
        self
    }

    pub fn texture(mut self, texture: TextureId, influence: f32) -> Self {
        self.texture = texture;
        self.texture_influence = influence;
        self
    }

    /// Uses fixed light values instead of the scene light.
    pub fn fixed_light(mut self, light: LightParams) -> Self {
        self.main_light = false;
        self.light_position = light.position;
        self.light_color = light.color;
        self.ambient_strength = light.ambient_strength;
        self.specular_strength = light.specular_strength;
        self
    }

    /// The override wins when present.
    pub fn resolve<'a>(own: &'a Material, override_material: Option<&'a Material>) -> &'a Material {
        override_material.unwrap_or(own)
    }

    /// Light values this material is drawn with.
    pub fn light(&self, scene_light: &LightParams) -> LightParams {
        if self.main_light {
            *scene_light
        } else {
            LightParams {
                position: self.light_position,
                color: self.light_color,
                ambient_strength: self.ambient_strength,
                specular_strength: self.specular_strength,
            }
        }
    }
}

/// Per-draw uniform block, one slot of the dynamic uniform buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`.
    pub normal_matrix: [[f32; 4]; 4],
    /// RGB colour and alpha.
    pub color: [f32; 4],
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
    /// Ambient strength, specular strength, shininess, texture influence.
    pub lighting: [f32; 4],
    /// Line thickness and point size. Kept for completeness; wgpu rasterizes
    /// one-pixel lines and points.
    pub raster: [f32; 4],
}

impl DrawUniforms {
    pub fn new(material: &Material, model: Mat4, scene_light: &LightParams) -> Self {
        let light = material.light(scene_light);
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix(model).to_cols_array_2d(),
            color: material.color.extend(material.alpha).to_array(),
            light_position: light.position.extend(1.0).to_array(),
            light_color: light.color.extend(1.0).to_array(),
            lighting: [
                light.ambient_strength,
                light.specular_strength,
                material.shininess as f32,
                material.texture_influence,
            ],
            raster: [material.line_thickness, material.point_size, 0.0, 0.0],
        }
    }
}

/// Inverse transpose of `model`, or identity for a singular matrix.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() <= f32::EPSILON {
        Mat4::IDENTITY
    } else {
        model.inverse().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_light() -> LightParams {
        LightParams {
            position: Vec3::new(0.0, 13.0, 0.0),
            color: Vec3::new(0.99, 0.95, 0.78),
            ambient_strength: 0.2,
            specular_strength: 0.4,
        }
    }

    #[test]
    fn missing_override_uses_own_material() {
        let own = Material::lit(Vec3::new(0.15, 0.92, 0.17))
            .alpha(0.5)
            .shininess(4)
            .line_thickness(2.0)
            .point_size(3.0);

        let resolved = Material::resolve(&own, None);
        let uniforms = DrawUniforms::new(resolved, Mat4::IDENTITY, &scene_light());

        assert_eq!(uniforms.color, [0.15, 0.92, 0.17, 0.5]);
        assert_eq!(uniforms.lighting[2], 4.0);
        assert_eq!(uniforms.raster[..2], [2.0, 3.0]);
        assert_eq!(uniforms.lighting[0], 0.2);
    }

    #[test]
    fn override_takes_precedence() {
        let own = Material::lit(Vec3::X);
        let pink = Material::lit(Vec3::new(1.0, 0.714, 0.757)).shininess(128);
        let resolved = Material::resolve(&own, Some(&pink));
        assert_eq!(resolved, &pink);
    }

    #[test]
    fn fixed_light_ignores_scene_light() {
        let fixed = LightParams {
            position: Vec3::new(1.0, 2.0, 3.0),
            color: Vec3::ONE,
            ambient_strength: 0.05,
            specular_strength: 0.9,
        };
        let material = Material::lit(Vec3::ONE).fixed_light(fixed);
        assert_eq!(material.light(&scene_light()), fixed);
    }

    #[test]
    fn singular_model_gets_identity_normal_matrix() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(normal_matrix(flat), Mat4::IDENTITY);

        let scaled = Mat4::from_scale(Vec3::new(2.0, 4.0, 2.0));
        assert!(normal_matrix(scaled).abs_diff_eq(Mat4::from_scale(Vec3::new(0.5, 0.25, 0.5)), 1e-6));
    }

    #[test]
    fn draw_uniforms_fill_whole_slots() {
        assert_eq!(std::mem::size_of::<DrawUniforms>() % 16, 0);
    }
}
