//! The fixed cube mesh.
//!
//! Positions and colors live in one contiguous buffer: every position first,
//! then every color. The GPU reads them through two vertex-buffer views, the
//! second starting halfway through the buffer, so both halves must be the same
//! length.

use std::mem::size_of;

/// Number of vertices drawn per frame (12 triangles).
pub const CUBE_VERTEX_COUNT: u32 = 36;

/// Byte stride of one position or color entry.
pub const VERTEX_STRIDE: u64 = size_of::<[f32; 4]>() as u64;

#[rustfmt::skip]
const CUBE_POSITIONS: [[f32; 4]; CUBE_VERTEX_COUNT as usize] = [
    // front
    [ 0.25,  0.25, -1.25, 1.0],
    [ 0.25, -0.25, -1.25, 1.0],
    [-0.25,  0.25, -1.25, 1.0],

    [ 0.25, -0.25, -1.25, 1.0],
    [-0.25, -0.25, -1.25, 1.0],
    [-0.25,  0.25, -1.25, 1.0],

    // back
    [ 0.25,  0.25, -2.75, 1.0],
    [-0.25,  0.25, -2.75, 1.0],
    [ 0.25, -0.25, -2.75, 1.0],

    [ 0.25, -0.25, -2.75, 1.0],
    [-0.25,  0.25, -2.75, 1.0],
    [-0.25, -0.25, -2.75, 1.0],

    // left
    [-0.25,  0.25, -1.25, 1.0],
    [-0.25, -0.25, -1.25, 1.0],
    [-0.25, -0.25, -2.75, 1.0],

    [-0.25,  0.25, -1.25, 1.0],
    [-0.25, -0.25, -2.75, 1.0],
    [-0.25,  0.25, -2.75, 1.0],

    // right
    [ 0.25,  0.25, -1.25, 1.0],
    [ 0.25, -0.25, -2.75, 1.0],
    [ 0.25, -0.25, -1.25, 1.0],

    [ 0.25,  0.25, -1.25, 1.0],
    [ 0.25,  0.25, -2.75, 1.0],
    [ 0.25, -0.25, -2.75, 1.0],

    // top
    [ 0.25,  0.25, -2.75, 1.0],
    [ 0.25,  0.25, -1.25, 1.0],
    [-0.25,  0.25, -1.25, 1.0],

    [ 0.25,  0.25, -2.75, 1.0],
    [-0.25,  0.25, -1.25, 1.0],
    [-0.25,  0.25, -2.75, 1.0],

    // bottom
    [ 0.25, -0.25, -2.75, 1.0],
    [-0.25, -0.25, -1.25, 1.0],
    [ 0.25, -0.25, -1.25, 1.0],

    [ 0.25, -0.25, -2.75, 1.0],
    [-0.25, -0.25, -2.75, 1.0],
    [-0.25, -0.25, -1.25, 1.0],
];

const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const GREY: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const OLIVE: [f32; 4] = [0.5, 0.5, 0.0, 1.0];
const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

#[rustfmt::skip]
const CUBE_COLORS: [[f32; 4]; CUBE_VERTEX_COUNT as usize] = [
    BLUE, BLUE, BLUE, BLUE, BLUE, BLUE,
    GREY, GREY, GREY, GREY, GREY, GREY,
    GREEN, GREEN, GREEN, GREEN, GREEN, GREEN,
    OLIVE, OLIVE, OLIVE, OLIVE, OLIVE, OLIVE,
    RED, RED, RED, RED, RED, RED,
    CYAN, CYAN, CYAN, CYAN, CYAN, CYAN,
];

const _: () = assert!(CUBE_POSITIONS.len() == CUBE_COLORS.len());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("position and color sections differ in length ({positions} vs {colors} vertices)")]
    UnevenSections { positions: usize, colors: usize },
    #[error("mesh has no vertices")]
    Empty,
}

/// Vertex data laid out as `[positions..., colors...]`.
#[derive(Debug, Clone)]
pub struct CubeMesh {
    data: Vec<[f32; 4]>,
    vertex_count: usize,
}

impl CubeMesh {
    /// Builds a mesh from matching position and color lists.
    pub fn new(positions: &[[f32; 4]], colors: &[[f32; 4]]) -> Result<Self, GeometryError> {
        if positions.len() != colors.len() {
            return Err(GeometryError::UnevenSections {
                positions: positions.len(),
                colors: colors.len(),
            });
        }
        if positions.is_empty() {
            return Err(GeometryError::Empty);
        }
        Ok(Self {
            data: [positions, colors].concat(),
            vertex_count: positions.len(),
        })
    }

    /// The hard-coded six-faced cube.
    pub fn cube() -> Self {
        Self {
            data: [CUBE_POSITIONS.as_slice(), CUBE_COLORS.as_slice()].concat(),
            vertex_count: CUBE_POSITIONS.len(),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count as u32
    }

    pub fn positions(&self) -> &[[f32; 4]] {
        &self.data[..self.vertex_count]
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.data[self.vertex_count..]
    }

    /// Raw bytes uploaded to the vertex buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn byte_len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    pub fn position_offset(&self) -> u64 {
        0
    }

    /// Start of the color section; half the buffer.
    pub fn color_offset(&self) -> u64 {
        self.byte_len() / 2
    }
}

impl Default for CubeMesh {
    fn default() -> Self {
        Self::cube()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_buffer_is_split_in_half() {
        let mesh = CubeMesh::cube();
        assert_eq!(mesh.vertex_count(), CUBE_VERTEX_COUNT);
        assert_eq!(mesh.byte_len(), 72 * 16);
        assert_eq!(mesh.color_offset(), mesh.byte_len() / 2);
        assert_eq!(mesh.color_offset(), 576);
        assert_eq!(
            mesh.color_offset(),
            mesh.positions().len() as u64 * VERTEX_STRIDE
        );
    }

    #[test]
    fn color_view_starts_at_first_color() {
        let mesh = CubeMesh::cube();
        let bytes = mesh.as_bytes();
        let start = mesh.color_offset() as usize;
        let first: &[f32] = bytemuck::cast_slice(&bytes[start..start + VERTEX_STRIDE as usize]);
        assert_eq!(first, &BLUE);

        let last_position: &[f32] = bytemuck::cast_slice(&bytes[start - VERTEX_STRIDE as usize..start]);
        assert_eq!(last_position, &[-0.25, -0.25, -1.25, 1.0]);
    }

    #[test]
    fn rejects_uneven_sections() {
        let positions = [[0.0; 4]; 3];
        let colors = [[1.0; 4]; 2];
        assert_eq!(
            CubeMesh::new(&positions, &colors).unwrap_err(),
            GeometryError::UnevenSections {
                positions: 3,
                colors: 2,
            }
        );
        assert_eq!(CubeMesh::new(&[], &[]).unwrap_err(), GeometryError::Empty);
    }

    #[test]
    fn custom_mesh_keeps_sections_apart() {
        let positions = [[0.0, 0.0, -1.0, 1.0], [1.0, 0.0, -1.0, 1.0]];
        let colors = [RED, GREEN];
        let mesh = CubeMesh::new(&positions, &colors).unwrap();
        assert_eq!(mesh.positions(), &positions);
        assert_eq!(mesh.colors(), &colors);
        assert_eq!(mesh.color_offset(), 32);
    }
}
