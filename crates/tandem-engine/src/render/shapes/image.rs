use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{Bitmap, BitmapId, DrawCmd, DrawList};

use super::common::{
    begin_overlay_pass, linear_clamp_sampler, logical_clip_to_scissor, overlay_pipeline,
    sampler_layout_entry, texture_layout_entry, InstanceBuffer, QuadGeometry, ViewportBinding,
    QUAD_INDEX_COUNT,
};

/// Renderer for `DrawCmd::Image`.
///
/// Each distinct [`Bitmap`] is uploaded once as an RGBA8 sRGB texture and kept
/// while it is drawn; textures not referenced in a frame are released.
pub struct ImageRenderer {
    gpu: Option<ImageGpu>,
    textures: HashMap<BitmapId, CachedTexture>,
    instances: InstanceBuffer<ImageInstance>,
}

struct ImageGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    viewport_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    viewport: ViewportBinding,
    quad: QuadGeometry,
}

struct CachedTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self {
            gpu: None,
            textures: HashMap::new(),
            instances: InstanceBuffer::new("tandem image instances"),
        }
    }
}

impl ImageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures currently resident.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draw_list: &mut DrawList) {
        self.ensure_gpu(ctx);

        let mut raw: Vec<ImageInstance> = Vec::new();
        let mut draws: Vec<(BitmapId, Option<Rect>)> = Vec::new();

        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Image(cmd) = &item.cmd else { continue };
            if cmd.rect.is_empty() {
                continue;
            }
            self.ensure_texture(ctx, &cmd.bitmap);
            raw.push(ImageInstance {
                origin: [cmd.rect.origin.x, cmd.rect.origin.y],
                size: [cmd.rect.size.x, cmd.rect.size.y],
            });
            draws.push((cmd.bitmap.id(), item.clip_rect));
        }

        // Drop textures that were not drawn this frame.
        self.textures.retain(|id, _| draws.iter().any(|(d, _)| d == id));

        let Some(instance_vbo) = self.instances.upload(ctx, &raw) else { return };
        let Some(gpu) = self.gpu.as_ref() else { return };
        gpu.viewport.write(ctx.queue, ctx.viewport);

        let mut rpass = begin_overlay_pass(target, "tandem image pass");
        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.viewport_group, &[]);
        gpu.quad.bind(&mut rpass);
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));

        for (i, (id, clip)) in draws.iter().enumerate() {
            let Some(tex) = self.textures.get(id) else { continue };
            let Some((x, y, w, h)) = logical_clip_to_scissor(*clip, ctx.viewport, ctx.scale_factor) else {
                continue;
            };
            let i = i as u32;
            rpass.set_scissor_rect(x, y, w, h);
            rpass.set_bind_group(1, &tex.bind_group, &[]);
            rpass.draw_indexed(0..QUAD_INDEX_COUNT, 0, i..i + 1);
        }
    }

    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>, bitmap: &Bitmap) {
        if self.textures.contains_key(&bitmap.id()) {
            return;
        }
        let Some(gpu) = self.gpu.as_ref() else { return };

        let size = wgpu::Extent3d {
            width: bitmap.width(),
            height: bitmap.height(),
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tandem image texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bitmap.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * bitmap.width()),
                rows_per_image: Some(bitmap.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tandem image bind group"),
            layout: &gpu.texture_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&gpu.sampler) },
            ],
        });

        log::debug!("uploaded image {}x{}", bitmap.width(), bitmap.height());
        self.textures.insert(bitmap.id(), CachedTexture { _texture: texture, bind_group });
    }

    fn ensure_gpu(&mut self, ctx: &RenderCtx<'_>) {
        if self.gpu.as_ref().is_some_and(|g| g.format == ctx.surface_format) {
            return;
        }

        let viewport_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tandem image viewport bgl"),
            entries: &[ViewportBinding::layout_entry(0)],
        });
        let texture_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tandem image texture bgl"),
            entries: &[texture_layout_entry(0), sampler_layout_entry(1)],
        });

        let pipeline = overlay_pipeline(
            ctx,
            "tandem image",
            include_str!("shaders/image.wgsl"),
            &[&viewport_layout, &texture_layout],
            ImageInstance::layout(),
        );

        let viewport = ViewportBinding::new(ctx.device, "tandem image");
        let viewport_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tandem image viewport group"),
            layout: &viewport_layout,
            entries: &[viewport.entry(0)],
        });

        self.textures.clear();
        self.gpu = Some(ImageGpu {
            format: ctx.surface_format,
            pipeline,
            viewport_group,
            texture_layout,
            sampler: linear_clamp_sampler(ctx.device, "tandem image sampler"),
            viewport,
            quad: QuadGeometry::new(ctx.device, "tandem image"),
        });
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ImageInstance {
    origin: [f32; 2],
    size: [f32; 2],
}

impl ImageInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2  // size
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ImageInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
