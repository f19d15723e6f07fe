//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.918, 0.965, 1.0, 1.0];
    pub const CIRCLE_NORMAL: [f32; 4] = [0.145, 0.388, 0.922, 1.0];
    pub const CIRCLE_HOVER: [f32; 4] = [0.133, 0.773, 0.369, 1.0];
    pub const CIRCLE_COLLIDE: [f32; 4] = [0.937, 0.267, 0.267, 1.0];
    pub const LABEL: [f32; 4] = [0.067, 0.067, 0.067, 1.0];
    pub const FLASH: [f32; 4] = [0.133, 0.827, 0.933, 1.0];
    pub const PAUSE_DIM: [f32; 4] = [0.0, 0.0, 0.0, 0.55];

    /// Same color with alpha multiplied
    pub fn faded(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * alpha]
    }
}
