use winit::dpi::PhysicalSize;

/// Depth/stencil attachment sized to the surface.
///
/// Recreated whenever the surface is resized; the old texture is dropped.
pub struct DepthBuffer {
    format: wgpu::TextureFormat,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: PhysicalSize<u32>) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tandem depth buffer"),
            size: depth_extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { format, texture, view }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Replaces the attachment with one matching `size`.
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        let extent = depth_extent(size);
        if self.texture.width() == extent.width && self.texture.height() == extent.height {
            return;
        }
        *self = Self::new(device, self.format, size);
    }
}

/// Texture extent for a drawable size; zero dimensions are clamped to 1.
pub(crate) fn depth_extent(size: PhysicalSize<u32>) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width.max(1),
        height: size.height.max(1),
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_matches_size() {
        let e = depth_extent(PhysicalSize::new(1024, 768));
        assert_eq!((e.width, e.height, e.depth_or_array_layers), (1024, 768, 1));
    }

    #[test]
    fn extent_clamps_zero() {
        let e = depth_extent(PhysicalSize::new(0, 0));
        assert_eq!((e.width, e.height), (1, 1));
    }
}
