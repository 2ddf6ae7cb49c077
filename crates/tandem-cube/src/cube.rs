//! Unit cube geometry and transforms.

use glam::{Mat4, Vec3};
use tandem_engine::render::mesh::ColorVertex;

pub const SHADER: &str = include_str!("shaders/cube.wgsl");

/// Vertex color is the position shifted into `[0, 1]`.
const fn corner(x: f32, y: f32, z: f32) -> ColorVertex {
    ColorVertex::new([x, y, z], [x + 0.5, y + 0.5, z + 0.5])
}

pub const VERTICES: [ColorVertex; 8] = [
    corner(-0.5, -0.5, -0.5),
    corner(-0.5, -0.5, 0.5),
    corner(-0.5, 0.5, -0.5),
    corner(-0.5, 0.5, 0.5),
    corner(0.5, -0.5, -0.5),
    corner(0.5, -0.5, 0.5),
    corner(0.5, 0.5, -0.5),
    corner(0.5, 0.5, 0.5),
];

#[rustfmt::skip]
pub const INDICES: [u16; 36] = [
    0, 2, 1,  1, 2, 3, // -x
    4, 5, 6,  5, 7, 6, // +x
    0, 1, 5,  0, 5, 4, // -y
    2, 6, 7,  2, 7, 3, // +y
    0, 4, 6,  0, 6, 2, // -z
    1, 3, 7,  1, 7, 5, // +z
];

pub const FOV_Y_DEG: f32 = 70.0;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 100.0;

/// Perspective for a `width` x `height` drawable; `None` for a zero side.
pub fn projection(width: u32, height: u32) -> Option<Mat4> {
    (width > 0 && height > 0).then(|| {
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), width as f32 / height as f32, Z_NEAR, Z_FAR)
    })
}

/// Two units back, tilted 30° about X, spun `angle_deg` about Y.
pub fn modelview(angle_deg: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0))
        * Mat4::from_rotation_x(30f32.to_radians())
        * Mat4::from_rotation_y(angle_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_triangles_over_eight_vertices() {
        assert_eq!(INDICES.len() / 3, 12);
        assert!(INDICES.iter().all(|&i| (i as usize) < VERTICES.len()));
        for v in 0..VERTICES.len() as u16 {
            assert!(INDICES.contains(&v), "vertex {v} unused");
        }
    }

    #[test]
    fn color_encodes_position() {
        for v in VERTICES {
            for axis in 0..3 {
                assert_eq!(v.color[axis], v.pos[axis] + 0.5);
            }
        }
    }

    #[test]
    fn faces_are_axis_aligned() {
        // Every triangle lies on one face: its three corners share a coordinate.
        for tri in INDICES.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| VERTICES[i as usize].pos);
            assert!((0..3).any(|k| a[k] == b[k] && b[k] == c[k]), "{tri:?}");
        }
    }

    #[test]
    fn modelview_places_cube_in_front_of_camera() {
        let center = modelview(123.0).transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-6);
    }

    #[test]
    fn projection_rejects_empty_drawable() {
        assert!(projection(0, 768).is_none());
        assert!(projection(1024, 768).is_some());
    }
}
