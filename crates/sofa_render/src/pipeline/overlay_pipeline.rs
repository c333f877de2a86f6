//! Overlay pipeline for textured screen-space quads
//!
//! Quads are queued through [`OverlayFrame`], which implements
//! [`OverlayBackend`], then flattened into one vertex buffer by
//! [`OverlayPipeline::prepare`] and drawn with blending on and depth testing
//! off.

use std::ops::Range;

use sofa_math::Mat4;
use wgpu::util::DeviceExt;

use super::types::{OverlayUniforms, OverlayVertex};
use super::DEPTH_FORMAT;
use crate::frame::RenderState;
use crate::overlay::{OverlayBackend, QuadCommand, TextureHandle};
use crate::texture::{GpuTexture, SamplerSettings, TextureImage};

/// Vertices emitted per quad (two triangles)
pub const QUAD_VERTEX_COUNT: usize = 6;

/// Expand a quad into two triangles with its translation applied
pub fn quad_vertices(quad: &QuadCommand) -> [OverlayVertex; QUAD_VERTEX_COUNT] {
    let [tx, ty] = quad.translation;
    let corner = |i: usize| {
        let v = quad.vertices[i];
        OverlayVertex::new([v.position[0] + tx, v.position[1] + ty], v.tex_coords)
    };
    [corner(0), corner(1), corner(2), corner(0), corner(2), corner(3)]
}

struct OverlayTexture {
    // Keeps the texture alive for the bind group
    _gpu: GpuTexture,
    bind_group: wgpu::BindGroup,
}

/// Render pipeline for the splash overlay
pub struct OverlayPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    textures: Vec<OverlayTexture>,
    pending: Vec<QuadCommand>,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    batches: Vec<(TextureHandle, Range<u32>)>,
}

impl OverlayPipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/overlay.wgsl").into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[OverlayVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: RenderState::OVERLAY.blend_state(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // Shares the scene's depth attachment but never tests or writes it
            depth_stencil: Some(RenderState::OVERLAY.depth_stencil(DEPTH_FORMAT)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Uniform Buffer"),
            contents: bytemuck::bytes_of(&OverlayUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            textures: Vec::new(),
            pending: Vec::new(),
            vertex_buffer: None,
            vertex_capacity: 0,
            batches: Vec::new(),
        }
    }

    /// Borrow the pipeline as an [`OverlayBackend`] for one frame
    pub fn frame<'a>(&'a mut self, device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> OverlayFrame<'a> {
        OverlayFrame {
            pipeline: self,
            device,
            queue,
        }
    }

    /// Drop quads queued for a frame that will not be presented
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Upload queued quads and the projection; must precede `draw`
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, projection: Mat4) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&OverlayUniforms { projection }),
        );

        self.batches.clear();
        let mut vertices = Vec::with_capacity(self.pending.len() * QUAD_VERTEX_COUNT);
        for quad in self.pending.drain(..) {
            if quad.texture.index() as usize >= self.textures.len() {
                log::warn!("Skipping quad with unknown texture {}", quad.texture.index());
                continue;
            }
            let start = vertices.len() as u32;
            vertices.extend_from_slice(&quad_vertices(&quad));
            self.batches.push((quad.texture, start..vertices.len() as u32));
        }

        if vertices.is_empty() {
            return;
        }

        if vertices.len() > self.vertex_capacity {
            self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Overlay Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            }));
            self.vertex_capacity = vertices.len();
        } else if let Some(buffer) = &self.vertex_buffer {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&vertices));
        }
    }

    /// Record the prepared quads into `pass`
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(vertex_buffer) = &self.vertex_buffer else {
            return;
        };
        if self.batches.is_empty() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        for (texture, range) in &self.batches {
            let bind_group = &self.textures[texture.index() as usize].bind_group;
            pass.set_bind_group(1, bind_group, &[]);
            pass.draw(range.clone(), 0..1);
        }
    }
}

/// An [`OverlayPipeline`] bound to a device for the current frame
pub struct OverlayFrame<'a> {
    pipeline: &'a mut OverlayPipeline,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl OverlayBackend for OverlayFrame<'_> {
    fn create_texture(&mut self, image: &TextureImage, sampler: SamplerSettings) -> TextureHandle {
        let handle = TextureHandle::new(self.pipeline.textures.len() as u32);
        let gpu = GpuTexture::upload(self.device, self.queue, image, sampler, "Overlay Texture");
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Texture Bind Group"),
            layout: &self.pipeline.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&gpu.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&gpu.sampler),
                },
            ],
        });
        self.pipeline.textures.push(OverlayTexture {
            _gpu: gpu,
            bind_group,
        });
        handle
    }

    fn draw_quad(&mut self, quad: &QuadCommand) {
        self.pipeline.pending.push(*quad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> QuadCommand {
        QuadCommand {
            texture: TextureHandle::new(0),
            translation: [640.0, 400.0],
            vertices: [
                OverlayVertex::new([0.0, 0.0], [0.0, 0.0]),
                OverlayVertex::new([100.0, 0.0], [1.0, 0.0]),
                OverlayVertex::new([100.0, 50.0], [1.0, 1.0]),
                OverlayVertex::new([0.0, 50.0], [0.0, 1.0]),
            ],
        }
    }

    #[test]
    fn test_quad_vertices_apply_translation() {
        let vertices = quad_vertices(&quad());
        assert_eq!(vertices[0].position, [640.0, 400.0]);
        assert_eq!(vertices[2].position, [740.0, 450.0]);
        assert_eq!(vertices[5].position, [640.0, 450.0]);
    }

    #[test]
    fn test_quad_vertices_two_triangles() {
        let vertices = quad_vertices(&quad());
        // Both triangles share the first and third corners
        assert_eq!(vertices[0], vertices[3]);
        assert_eq!(vertices[2], vertices[4]);
        assert_eq!(vertices[1].tex_coords, [1.0, 0.0]);
        assert_eq!(vertices[5].tex_coords, [0.0, 1.0]);
    }
}
