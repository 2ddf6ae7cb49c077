//! Building blocks shared by the UI shape renderers: unit quad, viewport
//! uniform, growable instance buffer, overlay pass and clip grouping.

use std::marker::PhantomData;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{Rect, Viewport};
use crate::render::{RenderCtx, RenderTarget};

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

// ── unit quad ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2], // 0..1
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

pub(super) const QUAD_INDEX_COUNT: u32 = QUAD_INDICES.len() as u32;

/// Unit quad vertex/index buffers, bound at vertex slot 0.
pub(super) struct QuadGeometry {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
}

impl QuadGeometry {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn new(device: &wgpu::Device, label: &str) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} quad vbo")),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} quad ibo")),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self { vbo, ibo }
    }

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    pub(super) fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint16);
    }
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    viewport: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

/// Viewport UBO visible to the vertex stage.
pub(super) struct ViewportBinding {
    ubo: wgpu::Buffer,
}

impl ViewportBinding {
    pub(super) fn new(device: &wgpu::Device, label: &str) -> Self {
        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} viewport ubo")),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { ubo }
    }

    pub(super) fn layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as u64),
            },
            count: None,
        }
    }

    pub(super) fn entry(&self, binding: u32) -> wgpu::BindGroupEntry<'_> {
        wgpu::BindGroupEntry { binding, resource: self.ubo.as_entire_binding() }
    }

    pub(super) fn write(&self, queue: &wgpu::Queue, viewport: Viewport) {
        let u = ViewportUniform {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.ubo, 0, bytemuck::bytes_of(&u));
    }
}

// ── instance buffer ───────────────────────────────────────────────────────

/// Per-instance vertex buffer that grows to the next power of two.
pub(super) struct InstanceBuffer<T> {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> InstanceBuffer<T> {
    pub(super) fn new(label: &'static str) -> Self {
        Self { label, buffer: None, capacity: 0, _marker: PhantomData }
    }

    /// Uploads `data`, reallocating when it does not fit.
    pub(super) fn upload(&mut self, ctx: &RenderCtx<'_>, data: &[T]) -> Option<&wgpu::Buffer> {
        if data.is_empty() {
            return None;
        }
        if self.buffer.is_none() || data.len() > self.capacity {
            self.capacity = grown_capacity(data.len());
            self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: (self.capacity * std::mem::size_of::<T>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
        let buffer = self.buffer.as_ref()?;
        ctx.queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
        Some(buffer)
    }
}

pub(super) fn grown_capacity(required: usize) -> usize {
    required.next_power_of_two().max(64)
}

// ── pass + pipeline ───────────────────────────────────────────────────────

/// Begins a color-only pass that keeps what earlier passes drew.
pub(super) fn begin_overlay_pass<'e>(
    target: &'e mut RenderTarget<'_>,
    label: &str,
) -> wgpu::RenderPass<'e> {
    target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

/// Pipeline for an instanced quad shader with `vs_main` / `fs_main` entry points.
pub(super) fn overlay_pipeline(
    ctx: &RenderCtx<'_>,
    label: &str,
    shader_src: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    instance_layout: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} shader")),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} pipeline layout")),
        bind_group_layouts,
        immediate_size: 0,
    });

    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} pipeline")),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[QuadGeometry::layout(), instance_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

// ── texture bindings ──────────────────────────────────────────────────────

pub(super) fn texture_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(super) fn sampler_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub(super) fn linear_clamp_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

// ── clipping ──────────────────────────────────────────────────────────────

/// Splits a per-instance clip sequence into runs sharing the same clip.
pub(super) fn clip_runs(clips: &[Option<Rect>]) -> Vec<(Range<u32>, Option<Rect>)> {
    let mut runs: Vec<(Range<u32>, Option<Rect>)> = Vec::new();
    for (i, clip) in clips.iter().enumerate() {
        let i = i as u32;
        match runs.last_mut() {
            Some((range, c)) if c == clip => range.end = i + 1,
            _ => runs.push((i..i + 1, *clip)),
        }
    }
    runs
}

/// Converts a logical clip rect to a physical scissor `(x, y, w, h)`.
///
/// `None` clip means the full viewport. Returns `None` for a zero-area
/// result so the caller can skip the draw.
pub(super) fn logical_clip_to_scissor(
    clip: Option<Rect>,
    viewport: Viewport,
    scale: f32,
) -> Option<(u32, u32, u32, u32)> {
    let vw = (viewport.width * scale).max(1.0) as u32;
    let vh = (viewport.height * scale).max(1.0) as u32;

    let Some(r) = clip else { return Some((0, 0, vw, vh)) };

    let to_px = |v: f32, limit: u32| ((v * scale).max(0.0) as u32).min(limit);
    let max = r.max();
    let (x, y) = (to_px(r.origin.x, vw), to_px(r.origin.y, vh));
    let (x2, y2) = (to_px(max.x, vw), to_px(max.y, vh));
    let (w, h) = (x2.saturating_sub(x), y2.saturating_sub(y));

    (w > 0 && h > 0).then_some((x, y, w, h))
}

/// Issues one instanced quad draw per clip run.
pub(super) fn draw_clip_runs(rpass: &mut wgpu::RenderPass<'_>, ctx: &RenderCtx<'_>, clips: &[Option<Rect>]) {
    for (range, clip) in clip_runs(clips) {
        if let Some((x, y, w, h)) = logical_clip_to_scissor(clip, ctx.viewport, ctx.scale_factor) {
            rpass.set_scissor_rect(x, y, w, h);
            rpass.draw_indexed(0..QUAD_INDEX_COUNT, 0, range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport::new(100.0, 50.0);

    // ── logical_clip_to_scissor ───────────────────────────────────────────

    #[test]
    fn no_clip_is_full_viewport() {
        assert_eq!(logical_clip_to_scissor(None, VP, 2.0), Some((0, 0, 200, 100)));
    }

    #[test]
    fn clip_is_scaled_and_clamped() {
        let clip = Rect::new(10.0, 10.0, 200.0, 10.0);
        assert_eq!(logical_clip_to_scissor(Some(clip), VP, 2.0), Some((20, 20, 180, 20)));
    }

    #[test]
    fn zero_area_clip_is_skipped() {
        assert_eq!(logical_clip_to_scissor(Some(Rect::default()), VP, 1.0), None);
    }

    // ── clip_runs ─────────────────────────────────────────────────────────

    #[test]
    fn consecutive_equal_clips_merge() {
        let a = Some(Rect::new(0.0, 0.0, 5.0, 5.0));
        let runs = clip_runs(&[None, None, a, a, None]);
        assert_eq!(runs, vec![(0..2, None), (2..4, a), (4..5, None)]);
    }

    #[test]
    fn empty_clips_yield_no_runs() {
        assert!(clip_runs(&[]).is_empty());
    }

    // ── grown_capacity ────────────────────────────────────────────────────

    #[test]
    fn capacity_has_floor_and_rounds_up() {
        assert_eq!(grown_capacity(1), 64);
        assert_eq!(grown_capacity(65), 128);
    }
}
