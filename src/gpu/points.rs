//! Soft round points.
//!
//! One instance per point; the vertex shader builds a camera-facing quad of
//! the point's pixel size and the fragment shader fades it into a disc.

use bytemuck::{Pod, Zeroable};

use super::{additive_blend, storage_layout_entry, uniform_layout_entry};
use crate::glow::Frame;

const INITIAL_CAPACITY: usize = 2048;

/// One point as the shader reads it.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointSprite {
    /// xyz = position, w = alpha.
    pub position: [f32; 4],
    /// rgb = color, w = size in pixels.
    pub color: [f32; 4],
}

impl PointSprite {
    /// Flatten every point batch of a frame, appending to `out`.
    pub fn collect(frame: &Frame, out: &mut Vec<PointSprite>) {
        for batch in &frame.points {
            out.extend(batch.points.iter().map(|p| PointSprite {
                position: p.position.extend(p.alpha).to_array(),
                color: p.color.extend(batch.size).to_array(),
            }));
        }
    }
}

pub(crate) const POINT_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    viewport: vec2<f32>,
};

struct Sprite {
    position: vec4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var<storage, read> sprites: array<Sprite>;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    var out: VertexOutput;
    let sprite = sprites[instance_index];

    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    var clip_pos = uniforms.view_proj * vec4<f32>(sprite.position.xyz, 1.0);
    let half_size = sprite.color.w * 0.5 / uniforms.viewport * 2.0;
    clip_pos.x += quad_pos.x * half_size.x * clip_pos.w;
    clip_pos.y += quad_pos.y * half_size.y * clip_pos.w;

    out.clip_position = clip_pos;
    out.color = vec4<f32>(sprite.color.rgb, sprite.position.w);
    out.uv = quad_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let circle_alpha = 1.0 - smoothstep(0.5, 1.0, dist);
    return vec4<f32>(in.color.rgb, circle_alpha * in.color.a);
}
"#;

/// GPU state for drawing [`PointSprite`]s.
pub struct PointRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl PointRenderer {
    pub fn new(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Bind Group Layout"),
            entries: &[uniform_layout_entry(0), storage_layout_entry(1)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let buffer = create_sprite_buffer(device, INITIAL_CAPACITY);
        let bind_group = create_bind_group(device, &bind_group_layout, uniform_buffer, &buffer);

        Self {
            pipeline,
            bind_group_layout,
            bind_group,
            buffer,
            capacity: INITIAL_CAPACITY,
            count: 0,
        }
    }

    /// Upload this frame's points, growing the buffer if needed.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniform_buffer: &wgpu::Buffer,
        sprites: &[PointSprite],
    ) {
        if sprites.len() > self.capacity {
            self.capacity = sprites.len().next_power_of_two();
            log::debug!("Growing point buffer to {} sprites", self.capacity);
            self.buffer = create_sprite_buffer(device, self.capacity);
            self.bind_group =
                create_bind_group(device, &self.bind_group_layout, uniform_buffer, &self.buffer);
        }

        if !sprites.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(sprites));
        }
        self.count = sprites.len() as u32;
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..self.count);
    }
}

fn create_sprite_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Point Sprite Buffer"),
        size: (capacity * std::mem::size_of::<PointSprite>()) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    sprite_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Point Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: sprite_buffer.as_entire_binding(),
            },
        ],
    })
}
