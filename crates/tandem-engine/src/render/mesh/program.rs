use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::mesh::ColorVertex;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MvpUniform {
    mvp: [[f32; 4]; 4],
}

impl From<Mat4> for MvpUniform {
    fn from(m: Mat4) -> Self {
        Self { mvp: m.to_cols_array_2d() }
    }
}

/// Parameters for [`ShaderProgram::new`].
///
/// The WGSL source must expose `vs_main`/`fs_main`, read [`ColorVertex`]
/// attributes at locations 0 and 1, and declare the MVP matrix as
/// `@group(0) @binding(0) var<uniform>`.
#[derive(Debug, Clone, Copy)]
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub source: &'a str,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    /// Ignored without a depth format. `None` draws without depth testing.
    pub depth_compare: Option<wgpu::CompareFunction>,
}

/// Compiled pipeline with its MVP uniform.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    pub fn new(device: &wgpu::Device, desc: &ProgramDesc<'_>) -> Self {
        let label = desc.label;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} shader")),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });

        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} mvp ubo")),
            contents: bytemuck::bytes_of(&MvpUniform::from(Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} bgl")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<MvpUniform>() as u64),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} bind group")),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let depth_stencil = desc.depth_format.map(|format| depth_state(format, desc.depth_compare));

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} pipeline")),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[ColorVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline, uniform, bind_group }
    }

    /// Uploads `mvp` and binds the pipeline and uniform on `rpass`.
    pub fn bind(&self, queue: &wgpu::Queue, rpass: &mut wgpu::RenderPass<'_>, mvp: Mat4) {
        queue.write_buffer(&self.uniform, 0, bytemuck::bytes_of(&MvpUniform::from(mvp)));
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
    }
}

fn depth_state(
    format: wgpu::TextureFormat,
    compare: Option<wgpu::CompareFunction>,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: compare.is_some(),
        depth_compare: compare.unwrap_or(wgpu::CompareFunction::Always),
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mvp_uniform_is_column_major() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let u = MvpUniform::from(m);
        assert_eq!(u.mvp[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<MvpUniform>(), 64);
    }

    #[test]
    fn depth_state_without_compare_never_writes() {
        let s = depth_state(wgpu::TextureFormat::Depth24PlusStencil8, None);
        assert!(!s.depth_write_enabled);
        assert_eq!(s.depth_compare, wgpu::CompareFunction::Always);

        let s = depth_state(wgpu::TextureFormat::Depth32Float, Some(wgpu::CompareFunction::Less));
        assert!(s.depth_write_enabled);
        assert_eq!(s.depth_compare, wgpu::CompareFunction::Less);
    }
}
