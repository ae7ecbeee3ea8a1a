//! GPU renderer for the wave scene.
//!
//! Draws the displaced wave grid and the sprite particle layers of the current
//! [`SceneDescription`]. Static buffers (grid, particle positions) are rebuilt
//! only when the scene revision changes; uniforms are rewritten every frame.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniforms;
use crate::gpu::mesh::{self, GpuParticleInstance, QUAD_INDICES, QUAD_VERTICES};
use crate::gpu::pipeline::{self, DEPTH_FORMAT};
use crate::particle::{ParticleLayer, SpriteStyle};
use crate::scene_graph::SceneDescription;
use crate::visualiser::VisualiserState;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct WaveUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color_a: [f32; 4],
    color_b: [f32; 4],
    color_c: [f32; 4],
    terms: [[f32; 4]; 3],
    /// time, alpha mode flag, opacity, unused
    params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ParticleUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    color: [f32; 4],
    /// time, speed, jitter radius, style flag
    params: [f32; 4],
    /// sprite world size, unused x3
    sizing: [f32; 4],
}

struct GridBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
}

struct ParticleBuffers {
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count: u32,
}

/// sRGB transfer function inverse.
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,
    depth_view: wgpu::TextureView,

    // Wave rendering
    wave_pipeline: wgpu::RenderPipeline,
    wave_uniform_buffer: wgpu::Buffer,
    wave_bind_group: wgpu::BindGroup,
    grid: Option<GridBuffers>,

    // Particle rendering
    particle_pipeline: wgpu::RenderPipeline,
    particle_bind_group_layout: wgpu::BindGroupLayout,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    particle_layers: Vec<ParticleBuffers>,

    /// Revision of the scene the static buffers were built from.
    scene_revision: Option<u64>,
}

impl Renderer {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        // === Wave Pipeline Setup ===

        let wave_bind_group_layout = uniform_bind_group_layout::<WaveUniforms>(&device, "wave_bind_group_layout");
        let wave_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Wave Uniform Buffer"),
            size: std::mem::size_of::<WaveUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let wave_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &wave_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wave_uniform_buffer.as_entire_binding(),
            }],
            label: Some("wave_bind_group"),
        });
        let wave_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Wave Pipeline Layout"),
            bind_group_layouts: &[&wave_bind_group_layout],
            push_constant_ranges: &[],
        });
        let wave_pipeline = pipeline::create_wave_pipeline(&device, &wave_pipeline_layout, format);

        // === Particle Pipeline Setup ===

        let particle_bind_group_layout =
            uniform_bind_group_layout::<ParticleUniforms>(&device, "particle_bind_group_layout");
        let particle_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&particle_bind_group_layout],
            push_constant_ranges: &[],
        });
        let particle_pipeline = pipeline::create_particle_pipeline(&device, &particle_pipeline_layout, format);

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Quad Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let depth_view = create_depth_view(&device, size);

        log::info!(
            "Renderer created: {}x{} {:?}",
            size.width,
            size.height,
            format
        );

        Self {
            device,
            queue,
            size,
            format,
            depth_view,
            wave_pipeline,
            wave_uniform_buffer,
            wave_bind_group,
            grid: None,
            particle_pipeline,
            particle_bind_group_layout,
            quad_vertex_buffer,
            quad_index_buffer,
            particle_layers: Vec::new(),
            scene_revision: None,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
            self.depth_view = create_depth_view(&self.device, self.size);
        }
    }

    /// Colour as written to the target: linearized for sRGB targets, which
    /// re-encode on store.
    fn target_color(&self, rgb: [f32; 3], alpha: f32) -> [f32; 4] {
        if self.format.is_srgb() {
            [srgb_to_linear(rgb[0]), srgb_to_linear(rgb[1]), srgb_to_linear(rgb[2]), alpha]
        } else {
            [rgb[0], rgb[1], rgb[2], alpha]
        }
    }

    /// Rebuild grid and particle buffers for a new scene description.
    fn rebuild_scene(&mut self, scene: &SceneDescription) {
        let (vertices, indices) = mesh::create_grid_geometry(scene.wave.size, scene.wave.segments);
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wave Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wave Grid Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.grid = Some(GridBuffers {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        });

        self.particle_layers = scene
            .particles
            .iter()
            .filter(|layer| !layer.positions.is_empty())
            .map(|layer| self.create_particle_buffers(layer))
            .collect();

        log::debug!(
            "Rebuilt scene buffers: {} grid indices, {} particle layers",
            indices.len(),
            self.particle_layers.len()
        );
    }

    fn create_particle_buffers(&self, layer: &ParticleLayer) -> ParticleBuffers {
        let instances: Vec<GpuParticleInstance> = layer
            .positions
            .iter()
            .map(|&position| GpuParticleInstance { position })
            .collect();
        let instance_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(layer.name),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Uniform Buffer"),
            size: std::mem::size_of::<ParticleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.particle_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("particle_bind_group"),
        });
        ParticleBuffers {
            instance_buffer,
            uniform_buffer,
            bind_group,
            count: instances.len() as u32,
        }
    }

    pub fn render(&mut self, view: &wgpu::TextureView, state: &VisualiserState) {
        if self.scene_revision != Some(state.scene_revision()) {
            self.rebuild_scene(state.scene());
            self.scene_revision = Some(state.scene_revision());
        }

        let scene = state.scene();
        let camera = state.camera_uniforms();
        let aspect = self.size.width as f32 / self.size.height as f32;
        let view_proj = camera.view_projection_matrix(aspect).to_cols_array_2d();
        let elapsed = state.elapsed();

        // All uniform writes happen before the pass; write_buffer is not
        // ordered with draw calls inside it.
        self.write_wave_uniforms(scene, state, view_proj);
        self.write_particle_uniforms(scene, &camera, view_proj, elapsed);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let [r, g, b, a] = scene.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Wave Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(grid) = &self.grid {
                render_pass.set_pipeline(&self.wave_pipeline);
                render_pass.set_bind_group(0, &self.wave_bind_group, &[]);
                render_pass.set_vertex_buffer(0, grid.vertex_buffer.slice(..));
                render_pass.set_index_buffer(grid.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..grid.num_indices, 0, 0..1);
            }

            if !self.particle_layers.is_empty() {
                render_pass.set_pipeline(&self.particle_pipeline);
                render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
                render_pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                for layer in &self.particle_layers {
                    render_pass.set_bind_group(0, &layer.bind_group, &[]);
                    render_pass.set_vertex_buffer(1, layer.instance_buffer.slice(..));
                    render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..layer.count);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn write_wave_uniforms(&self, scene: &SceneDescription, state: &VisualiserState, view_proj: [[f32; 4]; 4]) {
        let wave = &scene.wave;
        let shader = state.uniforms();
        let terms = wave.profile.terms(shader.amplitude, shader.frequency);
        let uniforms = WaveUniforms {
            view_proj,
            model: wave.model_matrix(state.elapsed()).to_cols_array_2d(),
            color_a: self.target_color(wave.palette.color_a, 1.0),
            color_b: self.target_color(wave.palette.color_b, 1.0),
            color_c: self.target_color(wave.palette.color_c, 1.0),
            terms: [terms[0].to_vec4(), terms[1].to_vec4(), terms[2].to_vec4()],
            params: [shader.time, wave.alpha_mode.shader_flag() as f32, scene.opacity, 0.0],
        };
        self.queue.write_buffer(&self.wave_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn write_particle_uniforms(
        &self,
        scene: &SceneDescription,
        camera: &CameraUniforms,
        view_proj: [[f32; 4]; 4],
        elapsed: f32,
    ) {
        let right = camera.right();
        let up = camera.camera_up();
        let layers = scene.particles.iter().filter(|layer| !layer.positions.is_empty());
        for (layer, buffers) in layers.zip(&self.particle_layers) {
            let style = match layer.style {
                SpriteStyle::Sparkle => 0.0,
                SpriteStyle::Dot => 1.0,
            };
            let uniforms = ParticleUniforms {
                view_proj,
                model: layer.model_matrix(elapsed).to_cols_array_2d(),
                camera_right: [right.x, right.y, right.z, 0.0],
                camera_up: [up.x, up.y, up.z, 0.0],
                color: self.target_color(layer.color, layer.opacity * scene.opacity),
                params: [elapsed, layer.speed, layer.jitter, style],
                sizing: [
                    layer.sprite_world_size(camera.fov, self.size.height as f32),
                    0.0,
                    0.0,
                    0.0,
                ],
            };
            self.queue.write_buffer(&buffers.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }
    }
}

/// Whether a failed `get_current_texture` is fixed by reconfiguring the surface.
pub fn surface_needs_reconfigure(error: &wgpu::SurfaceError) -> bool {
    matches!(error, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
}

/// Pick an adapter (compatible with `surface` if given) and open a device.
#[cfg(not(target_arch = "wasm32"))]
pub async fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> anyhow::Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow::anyhow!("No adapter found"))?;

    log::info!("Using adapter: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor::default(), None)
        .await?;
    Ok((adapter, device, queue))
}

fn uniform_bind_group_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }],
        label: Some(label),
    })
}

fn create_depth_view(device: &wgpu::Device, size: wgpu::Extent3d) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<WaveUniforms>(), 240);
        assert_eq!(std::mem::size_of::<ParticleUniforms>(), 208);
    }

    #[test]
    fn test_lost_and_outdated_surfaces_reconfigure() {
        assert!(surface_needs_reconfigure(&wgpu::SurfaceError::Lost));
        assert!(surface_needs_reconfigure(&wgpu::SurfaceError::Outdated));
        assert!(!surface_needs_reconfigure(&wgpu::SurfaceError::Timeout));
        assert!(!surface_needs_reconfigure(&wgpu::SurfaceError::OutOfMemory));
    }

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 1e-3);
    }
}
