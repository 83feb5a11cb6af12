//! Thick glowing lines.
//!
//! Each segment is one instance. The vertex shader expands it into a
//! screen-space quad of the segment's pixel width, so line width does not
//! depend on distance and needs no `wgpu::Features`.

use bytemuck::{Pod, Zeroable};

use super::{additive_blend, storage_layout_entry, uniform_layout_entry};
use crate::glow::{Frame, GlowVertex};

/// Segments the buffer starts with. Grows by doubling.
const INITIAL_CAPACITY: usize = 4096;

/// One line segment as the shader reads it.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineSegment {
    /// xyz = start, w = start alpha.
    pub start: [f32; 4],
    /// xyz = end, w = end alpha.
    pub end: [f32; 4],
    /// rgb = start color, w = width in pixels.
    pub start_color: [f32; 4],
    /// rgb = end color, w unused.
    pub end_color: [f32; 4],
}

impl LineSegment {
    pub fn new(a: &GlowVertex, b: &GlowVertex, width: f32) -> Self {
        Self {
            start: a.position.extend(a.alpha).to_array(),
            end: b.position.extend(b.alpha).to_array(),
            start_color: a.color.extend(width).to_array(),
            end_color: b.color.extend(0.0).to_array(),
        }
    }

    /// Flatten every strip of a frame into segments, appending to `out`.
    pub fn collect(frame: &Frame, out: &mut Vec<LineSegment>) {
        for batch in &frame.lines {
            for strip in &batch.strips {
                out.extend(strip.windows(2).map(|w| LineSegment::new(&w[0], &w[1], batch.width)));
            }
        }
    }
}

pub(crate) const LINE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    viewport: vec2<f32>,
};

struct Segment {
    start: vec4<f32>,
    end: vec4<f32>,
    start_color: vec4<f32>,
    end_color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var<storage, read> segments: array<Segment>;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) edge: f32,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    var out: VertexOutput;
    let seg = segments[instance_index];

    let clip_a = uniforms.view_proj * vec4<f32>(seg.start.xyz, 1.0);
    let clip_b = uniforms.view_proj * vec4<f32>(seg.end.xyz, 1.0);

    // Direction in pixels, so the quad is square to the screen
    var dir = (clip_b.xy / clip_b.w - clip_a.xy / clip_a.w) * uniforms.viewport;
    if length(dir) < 0.0001 {
        dir = vec2<f32>(1.0, 0.0);
    }
    dir = normalize(dir);
    let normal = vec2<f32>(-dir.y, dir.x);
    let half_width = seg.start_color.w * 0.5;
    let offset_ndc = normal * half_width / uniforms.viewport * 2.0;

    // x picks the endpoint, y the side
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, -1.0),
        vec2<f32>(0.0,  1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(0.0,  1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0,  1.0),
    );
    let corner = corners[vertex_index];

    var clip: vec4<f32>;
    if corner.x < 0.5 {
        clip = clip_a;
        out.color = vec4<f32>(seg.start_color.rgb, seg.start.w);
    } else {
        clip = clip_b;
        out.color = vec4<f32>(seg.end_color.rgb, seg.end.w);
    }

    out.clip_position = vec4<f32>(clip.xy + offset_ndc * corner.y * clip.w, clip.zw);
    out.edge = corner.y;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let soft = 1.0 - smoothstep(0.6, 1.0, abs(in.edge));
    return vec4<f32>(in.color.rgb, in.color.a * soft);
}
"#;

/// GPU state for drawing [`LineSegment`]s.
pub struct LineRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl LineRenderer {
    pub fn new(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Line Bind Group Layout"),
            entries: &[uniform_layout_entry(0), storage_layout_entry(1)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
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
            // Additive glow: no depth test
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let buffer = create_segment_buffer(device, INITIAL_CAPACITY);
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

    /// Upload this frame's segments, growing the buffer if needed.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniform_buffer: &wgpu::Buffer,
        segments: &[LineSegment],
    ) {
        if segments.len() > self.capacity {
            self.capacity = segments.len().next_power_of_two();
            log::debug!("Growing line buffer to {} segments", self.capacity);
            self.buffer = create_segment_buffer(device, self.capacity);
            self.bind_group =
                create_bind_group(device, &self.bind_group_layout, uniform_buffer, &self.buffer);
        }

        if !segments.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(segments));
        }
        self.count = segments.len() as u32;
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

fn create_segment_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Line Segment Buffer"),
        size: (capacity * std::mem::size_of::<LineSegment>()) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    segment_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Line Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: segment_buffer.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glow::LineBatch;
    use glam::Vec3;

    fn vertex(x: f32, alpha: f32) -> GlowVertex {
        GlowVertex {
            position: Vec3::new(x, 0.0, 0.0),
            color: Vec3::new(0.0, 1.0, 1.0),
            alpha,
        }
    }

    #[test]
    fn test_segment_layout() {
        assert_eq!(std::mem::size_of::<LineSegment>(), 64);
    }

    #[test]
    fn test_strips_flatten_to_segments() {
        let frame = Frame {
            lines: vec![
                LineBatch {
                    width: 3.0,
                    strips: vec![
                        vec![vertex(0.0, 0.1), vertex(1.0, 0.2), vertex(2.0, 0.3)],
                        vec![vertex(5.0, 1.0)],
                    ],
                },
                LineBatch {
                    width: 1.5,
                    strips: vec![vec![vertex(9.0, 0.5), vertex(10.0, 0.5)]],
                },
            ],
            points: Vec::new(),
        };

        let mut segments = Vec::new();
        LineSegment::collect(&frame, &mut segments);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].start, [0.0, 0.0, 0.0, 0.1]);
        assert_eq!(segments[0].end, [1.0, 0.0, 0.0, 0.2]);
        assert_eq!(segments[0].start_color[3], 3.0);
        assert_eq!(segments[2].start_color[3], 1.5);
    }

    #[test]
    fn test_line_shader_validates() {
        crate::gpu::tests::validate_wgsl(LINE_SHADER).unwrap();
    }
}
