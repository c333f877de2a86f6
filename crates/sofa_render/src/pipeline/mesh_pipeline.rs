//! Mesh pipeline for the engine's visual models
//!
//! The engine draws through [`MeshFrame`], which implements [`DrawTarget`].
//! Vertex data is cached per [`VisualKey`] and only re-uploaded when the
//! model's revision changes.

use slotmap::SecondaryMap;
use sofa_core::{DirectionalLight, DrawTarget, VisualKey, VisualModel};
use sofa_math::Mat4;
use wgpu::util::DeviceExt;

use super::types::{MeshUniforms, MeshVertex};
use super::DEPTH_FORMAT;
use crate::frame::RenderState;

/// Material lighting coefficients
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingSettings {
    pub ambient: f32,
    pub diffuse: f32,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient: 0.3,
            diffuse: 0.7,
        }
    }
}

/// Interleave a visual model's positions, normals and color
pub fn mesh_vertices(visual: &VisualModel) -> Vec<MeshVertex> {
    let mesh = &visual.mesh;
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| MeshVertex {
            position: p.to_array(),
            normal: mesh.normals.get(i).map(|n| n.to_array()).unwrap_or([0.0, 0.0, 1.0]),
            color: visual.color,
        })
        .collect()
}

/// Build the uniform block for one frame
///
/// Only the first light is used. Without lights the scene is lit from the
/// viewer's side of the z axis.
pub fn mesh_uniforms(
    view: Mat4,
    projection: Mat4,
    lights: &[DirectionalLight],
    state: RenderState,
    lighting: LightingSettings,
) -> MeshUniforms {
    let light = lights.first().copied().unwrap_or(DirectionalLight {
        direction: sofa_math::Vec3::Z,
        color: [1.0, 1.0, 1.0],
    });
    let dir = light.direction.normalized();

    MeshUniforms {
        view_matrix: view,
        projection_matrix: projection,
        light_dir: [dir.x, dir.y, dir.z, 0.0],
        light_color: [light.color[0], light.color[1], light.color[2], 0.0],
        ambient_strength: lighting.ambient,
        diffuse_strength: lighting.diffuse,
        lighting_enabled: if state.contains(RenderState::LIGHTING) { 1.0 } else { 0.0 },
        _padding: 0.0,
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    revision: u64,
}

/// Render pipeline for lit triangle meshes
pub struct MeshPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    meshes: SecondaryMap<VisualKey, GpuMesh>,
    lights: Vec<DirectionalLight>,
    queued: Vec<VisualKey>,
    draw_list: Vec<VisualKey>,
    depth_texture: Option<wgpu::TextureView>,
    depth_size: (u32, u32),
}

impl MeshPipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: RenderState::SCENE.blend_state(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Loaded meshes have arbitrary winding
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(RenderState::SCENE.depth_stencil(DEPTH_FORMAT)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Uniform Buffer"),
            contents: bytemuck::bytes_of(&MeshUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            meshes: SecondaryMap::new(),
            lights: Vec::new(),
            queued: Vec::new(),
            draw_list: Vec::new(),
            depth_texture: None,
            depth_size: (0, 0),
        }
    }

    /// Borrow the pipeline as a [`DrawTarget`] for one frame
    pub fn frame<'a>(&'a mut self, device: &'a wgpu::Device) -> MeshFrame<'a> {
        MeshFrame {
            pipeline: self,
            device,
        }
    }

    /// Number of meshes resident on the GPU
    pub fn uploaded_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Drop draws queued this frame, keeping their uploads
    pub fn discard_queued(&mut self) {
        self.queued.clear();
    }

    /// Ensure depth texture exists and is the right size
    pub fn ensure_depth_texture(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.depth_texture.is_none() || self.depth_size != (width, height) {
            let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });

            self.depth_texture = Some(depth_texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.depth_size = (width, height);
        }
    }

    /// Depth attachment shared by every pass of the frame
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth_texture.as_ref()
    }

    /// Write uniforms and latch the queued draws; must precede `draw`
    pub fn prepare(
        &mut self,
        queue: &wgpu::Queue,
        view: Mat4,
        projection: Mat4,
        state: RenderState,
        lighting: LightingSettings,
    ) {
        let uniforms = mesh_uniforms(view, projection, &self.lights, state, lighting);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.draw_list = std::mem::take(&mut self.queued);
    }

    /// Record the latched draws into `pass`
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.draw_list.is_empty() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        for key in &self.draw_list {
            if let Some(mesh) = self.meshes.get(*key) {
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }

    fn upload(&mut self, device: &wgpu::Device, key: VisualKey, visual: &VisualModel) {
        let vertices = mesh_vertices(visual);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&visual.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Uploaded visual '{}' ({} vertices, {} triangles, revision {})",
            visual.name,
            visual.mesh.vertex_count(),
            visual.mesh.triangle_count(),
            visual.revision
        );

        self.meshes.insert(
            key,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: visual.mesh.indices.len() as u32,
                revision: visual.revision,
            },
        );
    }
}

/// A [`MeshPipeline`] bound to a device for the current frame
pub struct MeshFrame<'a> {
    pipeline: &'a mut MeshPipeline,
    device: &'a wgpu::Device,
}

impl DrawTarget for MeshFrame<'_> {
    fn set_lights(&mut self, lights: &[DirectionalLight]) {
        self.pipeline.lights = lights.to_vec();
    }

    fn draw_visual(&mut self, key: VisualKey, visual: &VisualModel) {
        if visual.mesh.indices.is_empty() {
            return;
        }
        let stale = self
            .pipeline
            .meshes
            .get(key)
            .map_or(true, |mesh| mesh.revision != visual.revision);
        if stale {
            self.pipeline.upload(self.device, key, visual);
        }
        self.pipeline.queued.push(key);
    }
}
