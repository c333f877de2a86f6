//! Splash image overlay
//!
//! An [`ImageOverlay`] holds a texture and the pixel offset at which it is
//! drawn in the 2-D overlay phase. The overlay only talks to the GPU through
//! an [`OverlayBackend`], so the quad geometry can be checked without a
//! device.

use std::path::Path;

use crate::pipeline::types::OverlayVertex;
use crate::texture::{SamplerSettings, TextureError, TextureImage};

/// Opaque reference to a texture owned by an overlay backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

/// A textured quad to draw in pixel space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadCommand {
    pub texture: TextureHandle,
    /// Pixel offset applied to every vertex
    pub translation: [f32; 2],
    /// Corners in fan order, relative to `translation`
    pub vertices: [OverlayVertex; 4],
}

impl QuadCommand {
    /// Screen-space rectangle covered by the quad: (min, max)
    pub fn extent(&self) -> ([f32; 2], [f32; 2]) {
        let mut min = [f32::INFINITY; 2];
        let mut max = [f32::NEG_INFINITY; 2];
        for v in &self.vertices {
            for axis in 0..2 {
                let p = v.position[axis] + self.translation[axis];
                min[axis] = min[axis].min(p);
                max[axis] = max[axis].max(p);
            }
        }
        (min, max)
    }
}

/// GPU operations the overlay needs
pub trait OverlayBackend {
    /// Take ownership of an image and make it sampleable
    fn create_texture(&mut self, image: &TextureImage, sampler: SamplerSettings) -> TextureHandle;

    /// Queue a textured quad for the current frame
    fn draw_quad(&mut self, quad: &QuadCommand);
}

/// A loaded image drawn at a fixed pixel offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageOverlay {
    x: f32,
    y: f32,
    width: u32,
    height: u32,
    texture: TextureHandle,
}

impl ImageOverlay {
    /// Load `path` and register it with `backend`
    ///
    /// The texture uses nearest filtering with clamped edges and carries a
    /// full mip chain.
    pub fn load(
        x: f32,
        y: f32,
        path: impl AsRef<Path>,
        backend: &mut dyn OverlayBackend,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = TextureImage::load(path)?;
        let texture = backend.create_texture(&image, SamplerSettings::NEAREST_CLAMP);
        log::info!(
            "Loaded overlay {} ({}x{}, {} mip levels)",
            path.display(),
            image.width(),
            image.height(),
            image.mip_level_count()
        );

        Ok(Self {
            x,
            y,
            width: image.width(),
            height: image.height(),
            texture,
        })
    }

    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// The quad drawn for this overlay
    pub fn quad(&self) -> QuadCommand {
        let w = self.width as f32;
        let h = self.height as f32;
        QuadCommand {
            texture: self.texture,
            translation: [self.x, self.y],
            vertices: [
                OverlayVertex::new([0.0, 0.0], [0.0, 0.0]),
                OverlayVertex::new([w, 0.0], [1.0, 0.0]),
                OverlayVertex::new([w, h], [1.0, 1.0]),
                OverlayVertex::new([0.0, h], [0.0, 1.0]),
            ],
        }
    }

    pub fn draw(&self, backend: &mut dyn OverlayBackend) {
        backend.draw_quad(&self.quad());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingBackend {
        textures: Vec<(u32, u32, u32, SamplerSettings)>,
        quads: Vec<QuadCommand>,
    }

    impl OverlayBackend for RecordingBackend {
        fn create_texture(&mut self, image: &TextureImage, sampler: SamplerSettings) -> TextureHandle {
            self.textures
                .push((image.width(), image.height(), image.mip_level_count(), sampler));
            TextureHandle::new(self.textures.len() as u32 - 1)
        }

        fn draw_quad(&mut self, quad: &QuadCommand) {
            self.quads.push(*quad);
        }
    }

    fn write_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sofa_overlay_{}_{}", std::process::id(), name));
        RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 255, 128]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_load_registers_texture() {
        let path = write_png("register.png", 64, 32);
        let mut backend = RecordingBackend::default();

        let overlay = ImageOverlay::load(640.0, 400.0, &path, &mut backend).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(backend.textures.len(), 1);
        let (w, h, mips, sampler) = backend.textures[0];
        assert_eq!((w, h), (64, 32));
        assert_eq!(mips, 7);
        assert_eq!(sampler, SamplerSettings::NEAREST_CLAMP);
        assert_eq!(overlay.size(), (64, 32));
        assert_eq!(overlay.position(), [640.0, 400.0]);
        assert!(backend.quads.is_empty());
    }

    #[test]
    fn test_draw_covers_image_at_offset() {
        let path = write_png("extent.png", 300, 120);
        let mut backend = RecordingBackend::default();

        let overlay = ImageOverlay::load(640.0, 400.0, &path, &mut backend).unwrap();
        let _ = std::fs::remove_file(&path);
        overlay.draw(&mut backend);

        assert_eq!(backend.quads.len(), 1);
        let (min, max) = backend.quads[0].extent();
        assert_eq!(min, [640.0, 400.0]);
        assert_eq!(max, [940.0, 520.0]);
    }

    #[test]
    fn test_quad_tex_coords_follow_corners() {
        let path = write_png("coords.png", 10, 20);
        let mut backend = RecordingBackend::default();
        let overlay = ImageOverlay::load(0.0, 0.0, &path, &mut backend).unwrap();
        let _ = std::fs::remove_file(&path);

        let quad = overlay.quad();
        let corners: Vec<_> = quad.vertices.iter().map(|v| (v.position, v.tex_coords)).collect();
        assert_eq!(
            corners,
            vec![
                ([0.0, 0.0], [0.0, 0.0]),
                ([10.0, 0.0], [1.0, 0.0]),
                ([10.0, 20.0], [1.0, 1.0]),
                ([0.0, 20.0], [0.0, 1.0]),
            ]
        );
        assert_eq!(quad.texture, overlay.texture());
    }

    #[test]
    fn test_draw_is_repeatable() {
        let path = write_png("repeat.png", 4, 4);
        let mut backend = RecordingBackend::default();
        let overlay = ImageOverlay::load(1.0, 2.0, &path, &mut backend).unwrap();
        let _ = std::fs::remove_file(&path);

        overlay.draw(&mut backend);
        overlay.draw(&mut backend);
        assert_eq!(backend.quads.len(), 2);
        assert_eq!(backend.quads[0], backend.quads[1]);
        assert_eq!(backend.textures.len(), 1);
    }

    #[test]
    fn test_missing_file_creates_nothing() {
        let mut backend = RecordingBackend::default();
        let result = ImageOverlay::load(0.0, 0.0, "no/such/splash.png", &mut backend);
        assert!(matches!(result, Err(TextureError::Io { .. })));
        assert!(backend.textures.is_empty());
    }
}
