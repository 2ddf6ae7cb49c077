use bytemuck::{Pod, Zeroable};

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::common::{
    begin_overlay_pass, draw_clip_runs, overlay_pipeline, InstanceBuffer, QuadGeometry,
    ViewportBinding,
};

/// Solid rectangle renderer (fills and borders).
///
/// Colors are linear premultiplied RGBA.
pub struct RectRenderer {
    gpu: Option<RectGpu>,
    instances: InstanceBuffer<RectInstance>,
}

struct RectGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport: ViewportBinding,
    quad: QuadGeometry,
}

impl Default for RectRenderer {
    fn default() -> Self {
        Self { gpu: None, instances: InstanceBuffer::new("tandem rect instances") }
    }
}

impl RectRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every `DrawCmd::Rect` in `draw_list` on top of `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draw_list: &mut DrawList) {
        let mut raw: Vec<RectInstance> = Vec::new();
        let mut clips: Vec<Option<Rect>> = Vec::new();

        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Rect(cmd) = &item.cmd else { continue };
            for (r, c) in cmd.quads() {
                raw.push(RectInstance {
                    origin: [r.origin.x, r.origin.y],
                    size: [r.size.x, r.size.y],
                    color: c.to_array(),
                });
                clips.push(item.clip_rect);
            }
        }

        if raw.is_empty() {
            return;
        }

        self.ensure_gpu(ctx);
        let Some(instance_vbo) = self.instances.upload(ctx, &raw) else { return };
        let Some(gpu) = self.gpu.as_ref() else { return };
        gpu.viewport.write(ctx.queue, ctx.viewport);

        let mut rpass = begin_overlay_pass(target, "tandem rect pass");
        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.bind_group, &[]);
        gpu.quad.bind(&mut rpass);
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        draw_clip_runs(&mut rpass, ctx, &clips);
    }

    fn ensure_gpu(&mut self, ctx: &RenderCtx<'_>) {
        if self.gpu.as_ref().is_some_and(|g| g.format == ctx.surface_format) {
            return;
        }

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tandem rect bgl"),
            entries: &[ViewportBinding::layout_entry(0)],
        });
        let pipeline = overlay_pipeline(
            ctx,
            "tandem rect",
            include_str!("shaders/rect.wgsl"),
            &[&bgl],
            RectInstance::layout(),
        );
        let viewport = ViewportBinding::new(ctx.device, "tandem rect");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tandem rect bind group"),
            layout: &bgl,
            entries: &[viewport.entry(0)],
        });

        self.gpu = Some(RectGpu {
            format: ctx.surface_format,
            pipeline,
            bind_group,
            viewport,
            quad: QuadGeometry::new(ctx.device, "tandem rect"),
        });
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct RectInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
