//! Vertex data for the scene's primitives and its GPU upload.
//!
//! - [`Vertex3d`]: position, normal and UV, the only vertex format
//! - [`Geometry`]: CPU-side, non-indexed vertex lists generated once at startup
//! - [`Mesh`]: a vertex buffer holding one [`Geometry`]
//!
//! Geometry is never modified after upload. Every draw covers all vertices of
//! its mesh in one non-indexed call.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::gpu::GpuContext;

/// A vertex with position, normal, and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// Vertex buffer layout: position at location 0, normal at 1, uv at 2.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A non-indexed vertex list.
///
/// Triangle shapes list three vertices per triangle; lines list two per
/// segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex3d>,
}

impl Geometry {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Unit cube, 36 vertices, shifted by `offset`.
    ///
    /// With `offset = (0, 0.5, 0)` the cube stands on the origin, so scaling
    /// along Y grows it upwards. Composite characters are built from that
    /// variant.
    pub fn cube(offset: Vec3) -> Self {
        // One quad per face: corners in counter-clockwise order seen from outside.
        #[rustfmt::skip]
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([ 0.0,  0.0,  1.0], [[-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5]]),
            ([ 0.0,  0.0, -1.0], [[ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5]]),
            ([ 0.0,  1.0,  0.0], [[-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5]]),
            ([ 0.0, -1.0,  0.0], [[-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5]]),
            ([ 1.0,  0.0,  0.0], [[ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5]]),
            ([-1.0,  0.0,  0.0], [[-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5]]),
        ];
        const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut vertices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            for corner in [0, 1, 2, 2, 3, 0] {
                let position = Vec3::from_array(corners[corner]) + offset;
                vertices.push(Vertex3d::new(position.to_array(), normal, UVS[corner]));
            }
        }
        Self { vertices }
    }

    /// Unit square on the XZ plane facing +Y, UVs spanning `uv_repeat` tiles.
    pub fn plane(uv_repeat: f32) -> Self {
        let r = uv_repeat;
        #[rustfmt::skip]
        let corners = [
            ([-0.5, 0.0,  0.5], [0.0, r  ]),
            ([ 0.5, 0.0,  0.5], [r,   r  ]),
            ([ 0.5, 0.0, -0.5], [r,   0.0]),
            ([-0.5, 0.0, -0.5], [0.0, 0.0]),
        ];
        let vertices = [0, 1, 2, 2, 3, 0]
            .into_iter()
            .map(|i| Vertex3d::new(corners[i].0, [0.0, 1.0, 0.0], corners[i].1))
            .collect();
        Self { vertices }
    }

    /// Icosphere of `radius` made by splitting each triangle of an
    /// icosahedron into four, `subdivisions` times.
    pub fn icosphere(radius: f32, subdivisions: u32) -> Self {
        let t = (1.0 + 5f32.sqrt()) / 2.0;
        let mut points: Vec<Vec3> = [
            [-1.0, t, 0.0],
            [1.0, t, 0.0],
            [-1.0, -t, 0.0],
            [1.0, -t, 0.0],
            [0.0, -1.0, t],
            [0.0, 1.0, t],
            [0.0, -1.0, -t],
            [0.0, 1.0, -t],
            [t, 0.0, -1.0],
            [t, 0.0, 1.0],
            [-t, 0.0, -1.0],
            [-t, 0.0, 1.0],
        ]
        .into_iter()
        .map(|p| Vec3::from_array(p).normalize())
        .collect();

        #[rustfmt::skip]
        let mut triangles: Vec<[u32; 3]> = vec![
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut midpoint = |a: u32, b: u32, points: &mut Vec<Vec3>| -> u32 {
                let key = (a.min(b), a.max(b));
                *midpoints.entry(key).or_insert_with(|| {
                    let mid = (points[a as usize] + points[b as usize]).normalize();
                    points.push(mid);
                    points.len() as u32 - 1
                })
            };

            let mut next = Vec::with_capacity(triangles.len() * 4);
            for [a, b, c] in triangles {
                let ab = midpoint(a, b, &mut points);
                let bc = midpoint(b, c, &mut points);
                let ca = midpoint(c, a, &mut points);
                next.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
            }
            triangles = next;
        }

        let vertices = triangles
            .iter()
            .flatten()
            .map(|&index| {
                let normal = points[index as usize];
                let uv = Vec2::new(
                    0.5 + normal.z.atan2(normal.x) / std::f32::consts::TAU,
                    0.5 - normal.y.asin() / std::f32::consts::PI,
                );
                Vertex3d::new(
                    (normal * radius).to_array(),
                    normal.to_array(),
                    uv.to_array(),
                )
            })
            .collect();
        Self { vertices }
    }

    /// A single line segment.
    pub fn line(start: Vec3, end: Vec3) -> Self {
        let normal = [0.0, 1.0, 0.0];
        Self {
            vertices: vec![
                Vertex3d::new(start.to_array(), normal, [0.0, 0.0]),
                Vertex3d::new(end.to_array(), normal, [1.0, 0.0]),
            ],
        }
    }

    /// Line list of a `columns` × `rows` grid on the XY plane, centred on the
    /// origin. Rotate 90° about X to lay it on the ground.
    pub fn grid(columns: u32, rows: u32, cell_size: f32) -> Self {
        let half_w = columns as f32 * cell_size / 2.0;
        let half_h = rows as f32 * cell_size / 2.0;
        let normal = [0.0, 0.0, 1.0];
        let mut vertices = Vec::with_capacity(((columns + 1 + rows + 1) * 2) as usize);

        for column in 0..=columns {
            let x = -half_w + column as f32 * cell_size;
            vertices.push(Vertex3d::new([x, -half_h, 0.0], normal, [0.0, 0.0]));
            vertices.push(Vertex3d::new([x, half_h, 0.0], normal, [0.0, 1.0]));
        }
        for row in 0..=rows {
            let y = -half_h + row as f32 * cell_size;
            vertices.push(Vertex3d::new([-half_w, y, 0.0], normal, [0.0, 0.0]));
            vertices.push(Vertex3d::new([half_w, y, 0.0], normal, [1.0, 0.0]));
        }
        Self { vertices }
    }

    /// Quad covering clip space, for screen-space overlays.
    pub fn screen_quad() -> Self {
        #[rustfmt::skip]
        let corners = [
            ([-1.0, -1.0, 0.0], [0.0, 1.0]),
            ([ 1.0, -1.0, 0.0], [1.0, 1.0]),
            ([ 1.0,  1.0, 0.0], [1.0, 0.0]),
            ([-1.0,  1.0, 0.0], [0.0, 0.0]),
        ];
        let vertices = [0, 1, 2, 2, 3, 0]
            .into_iter()
            .map(|i| Vertex3d::new(corners[i].0, [0.0, 0.0, 1.0], corners[i].1))
            .collect();
        Self { vertices }
    }
}

/// GPU-resident geometry.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) vertex_count: u32,
}

impl Mesh {
    /// Uploads `geometry` into a new vertex buffer.
    pub fn new(gpu: &GpuContext, geometry: &Geometry, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            vertex_buffer,
            vertex_count: geometry.vertex_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_36_vertices_and_honours_offset() {
        let centred = Geometry::cube(Vec3::ZERO);
        assert_eq!(centred.vertex_count(), 36);

        let standing = Geometry::cube(Vec3::new(0.0, 0.5, 0.0));
        let min_y = standing
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::INFINITY, f32::min);
        let max_y = standing
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!((min_y, max_y), (0.0, 1.0));
    }

    #[test]
    fn cube_triangles_face_outward() {
        let cube = Geometry::cube(Vec3::ZERO);
        for tri in cube.vertices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| Vec3::from_array(v.position));
            let face_normal = (b - a).cross(c - a).normalize();
            assert!(face_normal.abs_diff_eq(Vec3::from_array(tri[0].normal), 1e-6));
        }
    }

    #[test]
    fn icosphere_vertices_lie_on_radius() {
        let sphere = Geometry::icosphere(1.0, 3);
        assert_eq!(sphere.vertex_count(), 20 * 4u32.pow(3) * 3);
        for v in &sphere.vertices {
            assert!((Vec3::from_array(v.position).length() - 1.0).abs() < 1e-5);
        }

        let half = Geometry::icosphere(0.5, 0);
        assert_eq!(half.vertex_count(), 60);
        assert!((Vec3::from_array(half.vertices[0].position).length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn grid_has_two_vertices_per_line() {
        let grid = Geometry::grid(78, 36, 1.0);
        assert_eq!(grid.vertex_count(), (79 + 37) * 2);
        assert_eq!(grid.vertices[0].position, [-39.0, -18.0, 0.0]);
    }

    #[test]
    fn plane_repeats_uvs() {
        let plane = Geometry::plane(8.0);
        assert_eq!(plane.vertex_count(), 6);
        assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert!(plane.vertices.iter().any(|v| v.uv == [8.0, 8.0]));
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 32);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 32);
    }
}
