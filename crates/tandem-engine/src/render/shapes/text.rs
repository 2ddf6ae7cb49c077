use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};
use crate::text::FontSystem;

use super::atlas::ShelfPacker;
use super::common::{
    begin_overlay_pass, draw_clip_runs, linear_clamp_sampler, overlay_pipeline,
    sampler_layout_entry, texture_layout_entry, InstanceBuffer, QuadGeometry, ViewportBinding,
};

const ATLAS_SIZE: u32 = 2048;
const GLYPH_PADDING: u32 = 1;

struct CachedGlyph {
    size: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

/// Renderer for `DrawCmd::Text`.
///
/// Glyphs are rasterized with fontdue on first use into a single R8 atlas and
/// cached by `GlyphRasterConfig` (font, glyph, size) for the renderer's
/// lifetime. When the atlas fills up, new glyphs are skipped with a warning.
pub struct TextRenderer {
    gpu: Option<TextGpu>,
    packer: ShelfPacker,
    glyphs: HashMap<GlyphRasterConfig, CachedGlyph>,
    instances: InstanceBuffer<GlyphInstance>,
    layout: Layout<()>,
    warned_full: bool,
}

struct TextGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport: ViewportBinding,
    quad: QuadGeometry,
    atlas: wgpu::Texture,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            gpu: None,
            packer: ShelfPacker::new(ATLAS_SIZE, GLYPH_PADDING),
            glyphs: HashMap::new(),
            instances: InstanceBuffer::new("tandem text instances"),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            warned_full: false,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders all `DrawCmd::Text` entries in `draw_list`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        fonts: &FontSystem,
    ) {
        self.ensure_gpu(ctx);

        let mut raw: Vec<GlyphInstance> = Vec::new();
        let mut clips: Vec<Option<Rect>> = Vec::new();

        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Text(cmd) = &item.cmd else { continue };
            let Some(font) = fonts.get(cmd.font) else {
                log::warn!("text renderer: unknown font {:?}", cmd.font);
                continue;
            };

            self.layout.reset(&LayoutSettings {
                x: cmd.origin.x,
                y: cmd.origin.y,
                max_width: cmd.max_width,
                ..LayoutSettings::default()
            });
            self.layout.append(&[font], &TextStyle::new(&cmd.text, cmd.size, 0));

            // Copy positions out so `self.layout` is no longer borrowed while caching.
            let placed: Vec<(GlyphRasterConfig, f32, f32)> = self
                .layout
                .glyphs()
                .iter()
                .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
                .map(|g| (g.key, g.x, g.y))
                .collect();

            for (key, x, y) in placed {
                if !self.glyphs.contains_key(&key) {
                    let (metrics, bitmap) = font.rasterize_config(key);
                    if let Some(cached) = self.upload_glyph(ctx, &bitmap, metrics.width as u32, metrics.height as u32) {
                        self.glyphs.insert(key, cached);
                    }
                }
                let Some(cached) = self.glyphs.get(&key) else { continue };

                raw.push(GlyphInstance {
                    dst_min: [x, y],
                    dst_max: [x + cached.size[0], y + cached.size[1]],
                    uv_min: cached.uv_min,
                    uv_max: cached.uv_max,
                    color: cmd.color.to_array(),
                });
                clips.push(item.clip_rect);
            }
        }

        let Some(instance_vbo) = self.instances.upload(ctx, &raw) else { return };
        let Some(gpu) = self.gpu.as_ref() else { return };
        gpu.viewport.write(ctx.queue, ctx.viewport);

        let mut rpass = begin_overlay_pass(target, "tandem text pass");
        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.bind_group, &[]);
        gpu.quad.bind(&mut rpass);
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        draw_clip_runs(&mut rpass, ctx, &clips);
    }

    fn upload_glyph(&mut self, ctx: &RenderCtx<'_>, bitmap: &[u8], w: u32, h: u32) -> Option<CachedGlyph> {
        if w == 0 || h == 0 {
            return None;
        }
        let Some((x, y)) = self.packer.place(w, h) else {
            if !self.warned_full {
                log::warn!("glyph atlas is full ({ATLAS_SIZE}x{ATLAS_SIZE}); some glyphs will not be drawn");
                self.warned_full = true;
            }
            return None;
        };
        let atlas = &self.gpu.as_ref()?.atlas;

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: atlas,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let (uv_min, uv_max) = self.packer.uv(x, y, w, h);
        Some(CachedGlyph { size: [w as f32, h as f32], uv_min, uv_max })
    }

    fn ensure_gpu(&mut self, ctx: &RenderCtx<'_>) {
        if self.gpu.as_ref().is_some_and(|g| g.format == ctx.surface_format) {
            return;
        }

        let atlas = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tandem glyph atlas"),
            size: wgpu::Extent3d { width: ATLAS_SIZE, height: ATLAS_SIZE, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let atlas_view = atlas.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = linear_clamp_sampler(ctx.device, "tandem text sampler");

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tandem text bgl"),
            entries: &[
                ViewportBinding::layout_entry(0),
                texture_layout_entry(1),
                sampler_layout_entry(2),
            ],
        });
        let pipeline = overlay_pipeline(
            ctx,
            "tandem text",
            include_str!("shaders/text.wgsl"),
            &[&bgl],
            GlyphInstance::layout(),
        );
        let viewport = ViewportBinding::new(ctx.device, "tandem text");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tandem text bind group"),
            layout: &bgl,
            entries: &[
                viewport.entry(0),
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&atlas_view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        // A fresh atlas invalidates every cached glyph.
        self.glyphs.clear();
        self.packer = ShelfPacker::new(ATLAS_SIZE, GLYPH_PADDING);
        self.warned_full = false;

        self.gpu = Some(TextGpu {
            format: ctx.surface_format,
            pipeline,
            bind_group,
            viewport,
            quad: QuadGeometry::new(ctx.device, "tandem text"),
            atlas,
        });
    }
}

/// Instance layout (48 bytes): dst_min, dst_max, uv_min, uv_max, color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // dst_min
        2 => Float32x2, // dst_max
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
