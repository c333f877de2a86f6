//! Decoded images and their GPU textures

use std::fmt;
use std::path::{Path, PathBuf};

use image::{imageops::FilterType, RgbaImage};

/// Error loading an image into a texture
#[derive(Debug)]
pub enum TextureError {
    /// The file could not be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The bytes are not a supported image
    Decode { path: PathBuf, message: String },
    /// The image has no pixels
    Empty,
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Io { path, source } => {
                write!(f, "Failed to read image {}: {}", path.display(), source)
            }
            TextureError::Decode { path, message } => {
                write!(f, "Failed to decode image {}: {}", path.display(), message)
            }
            TextureError::Empty => write!(f, "Image has zero width or height"),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// RGBA8 image plus a mip chain down to 1x1
#[derive(Clone, Debug)]
pub struct TextureImage {
    levels: Vec<RgbaImage>,
}

impl TextureImage {
    /// Read and decode an image file, generating mip levels
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| TextureError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Self::from_rgba(decoded.to_rgba8())
    }

    /// Wrap an already decoded image
    pub fn from_rgba(base: RgbaImage) -> Result<Self, TextureError> {
        if base.width() == 0 || base.height() == 0 {
            return Err(TextureError::Empty);
        }

        let mut levels = vec![base];
        loop {
            let last = &levels[levels.len() - 1];
            let (w, h) = (last.width(), last.height());
            if w == 1 && h == 1 {
                break;
            }
            let next = image::imageops::resize(last, (w / 2).max(1), (h / 2).max(1), FilterType::Triangle);
            levels.push(next);
        }

        Ok(Self { levels })
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width()
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height()
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// All levels, largest first
    pub fn levels(&self) -> &[RgbaImage] {
        &self.levels
    }
}

/// Sampling behaviour requested for a texture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerSettings {
    pub filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
}

impl SamplerSettings {
    /// Nearest-neighbour filtering with clamped edges
    pub const NEAREST_CLAMP: Self = Self {
        filter: wgpu::FilterMode::Nearest,
        address_mode: wgpu::AddressMode::ClampToEdge,
    };
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self::NEAREST_CLAMP
    }
}

/// A texture resident on the GPU with its sampler
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload every mip level of `image`
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        sampler: SamplerSettings,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: image.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, pixels) in image.levels().iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * pixels.width()),
                    rows_per_image: Some(pixels.height()),
                },
                wgpu::Extent3d {
                    width: pixels.width(),
                    height: pixels.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: sampler.address_mode,
            address_mode_v: sampler.address_mode,
            address_mode_w: sampler.address_mode,
            mag_filter: sampler.filter,
            min_filter: sampler.filter,
            mipmap_filter: sampler.filter,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}
