use bytemuck::{Pod, Zeroable};

/// Largest segment count whose vertex grid still fits `u16` indices.
pub const MAX_GRID_SEGMENTS: u32 = 254;

/// Base grid vertex; the vertex shader adds the wave displacement.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
}

impl GridVertex {
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Corner of the unit sprite quad, in [-0.5, 0.5].
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
}

impl QuadVertex {
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [-0.5, -0.5] },
    QuadVertex { corner: [0.5, -0.5] },
    QuadVertex { corner: [0.5, 0.5] },
    QuadVertex { corner: [-0.5, 0.5] },
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Per-sprite instance data (slot 1).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuParticleInstance {
    pub position: [f32; 3],
}

impl GpuParticleInstance {
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Flat square grid in the XZ plane (Y up), centered at origin, with
/// `segments` subdivisions per edge.
pub fn create_grid_geometry(size: f32, segments: u32) -> (Vec<GridVertex>, Vec<u16>) {
    let segments = if segments > MAX_GRID_SEGMENTS {
        log::warn!(
            "Grid segments {} exceed {}, clamping",
            segments,
            MAX_GRID_SEGMENTS
        );
        MAX_GRID_SEGMENTS
    } else {
        segments.max(1)
    };

    let row = segments + 1;
    let half = size * 0.5;
    let cell = size / segments as f32;

    let mut vertices = Vec::with_capacity((row * row) as usize);
    for iz in 0..row {
        for ix in 0..row {
            vertices.push(GridVertex {
                position: [-half + ix as f32 * cell, 0.0, -half + iz as f32 * cell],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for iz in 0..segments {
        for ix in 0..segments {
            let a = (iz * row + ix) as u16;
            let b = a + 1;
            let c = a + row as u16;
            let d = c + 1;
            // Two triangles per quad
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_counts() {
        let (vertices, indices) = create_grid_geometry(15.0, 100);
        assert_eq!(vertices.len(), 101 * 101);
        assert_eq!(indices.len(), 100 * 100 * 6);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_grid_extent() {
        let (vertices, _) = create_grid_geometry(20.0, 50);
        let first = vertices[0].position;
        let last = vertices[vertices.len() - 1].position;
        assert_eq!(first, [-10.0, 0.0, -10.0]);
        assert!((last[0] - 10.0).abs() < 1e-4 && (last[2] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_grid_segments_clamped() {
        let (vertices, _) = create_grid_geometry(1.0, 1000);
        assert_eq!(vertices.len(), 255 * 255);
        let (vertices, _) = create_grid_geometry(1.0, 0);
        assert_eq!(vertices.len(), 4);
    }

    #[test]
    fn test_vertex_layout_sizes() {
        assert_eq!(std::mem::size_of::<GridVertex>(), 12);
        assert_eq!(std::mem::size_of::<QuadVertex>(), 8);
        assert_eq!(std::mem::size_of::<GpuParticleInstance>(), 12);
    }
}
