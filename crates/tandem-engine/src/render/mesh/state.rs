use glam::Mat4;

use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

/// Frame-level 3D render state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    clear_color: Color,
    clear_depth: f32,
    depth_compare: Option<wgpu::CompareFunction>,
    projection: Mat4,
    modelview: Mat4,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            clear_depth: 1.0,
            depth_compare: None,
            projection: Mat4::IDENTITY,
            modelview: Mat4::IDENTITY,
        }
    }
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Clamped to `[0, 1]`.
    pub fn set_clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth.clamp(0.0, 1.0);
    }

    /// `None` disables the depth test.
    pub fn enable_depth_test(&mut self, compare: Option<wgpu::CompareFunction>) {
        self.depth_compare = compare;
    }

    pub fn set_projection_matrix(&mut self, m: Mat4) {
        self.projection = m;
    }

    pub fn set_modelview_matrix(&mut self, m: Mat4) {
        self.modelview = m;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn clear_depth(&self) -> f32 {
        self.clear_depth
    }

    pub fn depth_compare(&self) -> Option<wgpu::CompareFunction> {
        self.depth_compare
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn modelview(&self) -> Mat4 {
        self.modelview
    }

    /// `projection * modelview`.
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.modelview
    }

    /// Opens a render pass on `target`.
    ///
    /// With `clear` set, color and depth are cleared to the stored values;
    /// otherwise existing contents are kept. The depth attachment is bound only
    /// when the target carries a depth view.
    pub fn begin_pass<'t>(
        &self,
        ctx: &RenderCtx<'_>,
        target: &'t mut RenderTarget<'_>,
        clear: bool,
    ) -> wgpu::RenderPass<'t> {
        let color_load = if clear {
            wgpu::LoadOp::Clear(self.clear_color.to_wgpu())
        } else {
            wgpu::LoadOp::Load
        };

        let depth_attachment = target.depth_view.map(|view| {
            let depth_load = if clear {
                wgpu::LoadOp::Clear(self.clear_depth)
            } else {
                wgpu::LoadOp::Load
            };
            let has_stencil = ctx.depth_format.is_some_and(|f| f.has_stencil_aspect());
            wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: has_stencil.then_some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }
        });

        target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tandem mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: depth_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn defaults_are_identity_with_depth_off() {
        let s = RenderState::new();
        assert_eq!(s.mvp(), Mat4::IDENTITY);
        assert_eq!(s.clear_depth(), 1.0);
        assert!(s.depth_compare().is_none());
    }

    #[test]
    fn mvp_applies_modelview_first() {
        let mut s = RenderState::new();
        s.set_projection_matrix(Mat4::from_scale(Vec3::splat(2.0)));
        s.set_modelview_matrix(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let p = s.mvp().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn clear_depth_is_clamped() {
        let mut s = RenderState::new();
        s.set_clear_depth(3.0);
        assert_eq!(s.clear_depth(), 1.0);
        s.set_clear_depth(-1.0);
        assert_eq!(s.clear_depth(), 0.0);
    }

    #[test]
    fn depth_test_toggles() {
        let mut s = RenderState::new();
        s.enable_depth_test(Some(wgpu::CompareFunction::Less));
        assert_eq!(s.depth_compare(), Some(wgpu::CompareFunction::Less));
        s.enable_depth_test(None);
        assert_eq!(s.depth_compare(), None);
    }
}
