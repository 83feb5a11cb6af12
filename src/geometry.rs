//! Procedural wireframe geometry.
//!
//! Every generator is a pure function from a parameter struct to a [`Shape`]:
//! a set of polylines to draw, a subset of points to emphasize, and the
//! paths the particle aura flows along.
//!
//! | Generator | Look |
//! |-----------|------|
//! | [`dna_helix`] | Two intertwined strands with rungs |
//! | [`torus_knot`] | (p, q) knot wound around a torus |
//! | [`lorenz_attractor`] | Chaotic butterfly trajectory |
//! | [`wireframe_cube`] | 12 edges, 8 glowing corners |
//! | [`icosphere`] | Subdivided geodesic sphere |
//! | [`mobius_strip`] | Half-twisted band, drawn by its boundary |
//! | [`double_helix_torus`] | Two helices wrapped around a torus |
//!
//! Parameters are not validated. A zero radius or zero sample count produces
//! degenerate (but finite) geometry, so callers should start from the
//! `Default` of each parameter struct.

use std::collections::{BTreeSet, HashMap};
use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Ordered points drawn as connected line segments.
pub type Polyline = Vec<Vec3>;

/// An immutable wireframe shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Display name.
    pub name: String,
    /// Line strips to render. Each has at least two points.
    pub polylines: Vec<Polyline>,
    /// Points rendered once, emphasized, on top of the lines.
    pub vertices: Vec<Vec3>,
    /// Paths the particle aura flows along.
    pub particle_paths: Vec<Polyline>,
}

impl Shape {
    /// Total number of line segments across all polylines.
    pub fn segment_count(&self) -> usize {
        self.polylines
            .iter()
            .map(|line| line.len().saturating_sub(1))
            .sum()
    }

    /// Total number of points across all polylines.
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(Vec::len).sum()
    }
}

/// `n` evenly spaced samples over `[start, end]`, both ends included.
fn linspace(start: f32, end: f32, n: usize) -> impl Iterator<Item = f32> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f32
    } else {
        0.0
    };
    (0..n).map(move |i| start + step * i as f32)
}

/// Two-point polylines joining `a[i]` and `b[i]` every `every` samples.
fn rungs<'a>(a: &'a [Vec3], b: &'a [Vec3], every: usize) -> impl Iterator<Item = Polyline> + 'a {
    a.iter()
        .zip(b)
        .step_by(every)
        .map(|(p, q)| vec![*p, *q])
}

fn every_nth(points: &[Vec3], n: usize) -> impl Iterator<Item = Vec3> + '_ {
    points.iter().step_by(n).copied()
}

// ========== DNA helix ==========

/// Parameters for [`dna_helix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DnaHelixParams {
    pub height: f32,
    pub radius: f32,
    pub turns: usize,
    pub points_per_turn: usize,
}

impl Default for DnaHelixParams {
    fn default() -> Self {
        Self {
            height: 150.0,
            radius: 40.0,
            turns: 4,
            points_per_turn: 50,
        }
    }
}

/// Two intertwined helical strands, half a turn apart, joined by a rung
/// every 10th sample.
pub fn dna_helix(params: &DnaHelixParams) -> Shape {
    let n = params.turns * params.points_per_turn;
    let r = params.radius;
    let half = params.height / 2.0;

    let samples: Vec<(f32, f32)> = linspace(0.0, params.turns as f32 * TAU, n)
        .zip(linspace(-half, half, n))
        .collect();

    let strand = |phase: f32| -> Polyline {
        samples
            .iter()
            .map(|&(t, y)| Vec3::new(r * (t + phase).cos(), y, r * (t + phase).sin()))
            .collect()
    };
    let strand1 = strand(0.0);
    let strand2 = strand(PI);

    let mut polylines = vec![strand1.clone(), strand2.clone()];
    polylines.extend(rungs(&strand1, &strand2, 10));

    // Rung endpoints
    let vertices = every_nth(&strand1, 10)
        .chain(every_nth(&strand2, 10))
        .collect();

    Shape {
        name: "DNA Double Helix".into(),
        polylines,
        vertices,
        particle_paths: vec![strand1, strand2],
    }
}

// ========== Torus knot ==========

/// Parameters for [`torus_knot`]. `p = 3, q = 2` is the trefoil.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusKnotParams {
    pub p: u32,
    pub q: u32,
    /// Major radius.
    pub major_radius: f32,
    /// Tube radius.
    pub minor_radius: f32,
    pub num_points: usize,
}

impl Default for TorusKnotParams {
    fn default() -> Self {
        Self {
            p: 3,
            q: 2,
            major_radius: 60.0,
            minor_radius: 20.0,
            num_points: 500,
        }
    }
}

/// A closed (p, q) torus knot.
pub fn torus_knot(params: &TorusKnotParams) -> Shape {
    let p = params.p as f32;
    let q = params.q as f32;
    let big_r = params.major_radius;
    let r = params.minor_radius;

    let path: Polyline = linspace(0.0, TAU * q, params.num_points)
        .map(|t| {
            let ring = big_r + r * (p * t).cos();
            Vec3::new(ring * (q * t).cos(), ring * (q * t).sin(), r * (p * t).sin())
        })
        .collect();

    Shape {
        name: "Torus Knot".into(),
        polylines: vec![path.clone()],
        vertices: every_nth(&path, 50).collect(),
        particle_paths: vec![path],
    }
}

// ========== Lorenz attractor ==========

/// Parameters for [`lorenz_attractor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LorenzParams {
    pub num_points: usize,
    pub scale: f32,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            num_points: 2000,
            scale: 3.0,
        }
    }
}

/// The Lorenz butterfly, integrated with forward Euler (σ=10, ρ=28, β=8/3,
/// dt=0.01) from (0.1, 0, 0), scaled, then re-centered on its centroid.
pub fn lorenz_attractor(params: &LorenzParams) -> Shape {
    const SIGMA: f64 = 10.0;
    const RHO: f64 = 28.0;
    const BETA: f64 = 8.0 / 3.0;
    const DT: f64 = 0.01;

    let scale = f64::from(params.scale);
    let (mut x, mut y, mut z) = (0.1_f64, 0.0_f64, 0.0_f64);

    let mut raw = Vec::with_capacity(params.num_points);
    if params.num_points > 0 {
        raw.push([x * scale, y * scale, z * scale]);
    }
    for _ in 1..params.num_points {
        let dx = SIGMA * (y - x) * DT;
        let dy = (x * (RHO - z) - y) * DT;
        let dz = (x * y - BETA * z) * DT;
        x += dx;
        y += dy;
        z += dz;
        raw.push([x * scale, y * scale, z * scale]);
    }

    // Center in double precision so the f32 result sums to ~0
    let count = raw.len().max(1) as f64;
    let mut centroid = [0.0_f64; 3];
    for p in &raw {
        for axis in 0..3 {
            centroid[axis] += p[axis] / count;
        }
    }
    let path: Polyline = raw
        .iter()
        .map(|p| {
            Vec3::new(
                (p[0] - centroid[0]) as f32,
                (p[1] - centroid[1]) as f32,
                (p[2] - centroid[2]) as f32,
            )
        })
        .collect();

    Shape {
        name: "Lorenz Attractor".into(),
        polylines: vec![path.clone()],
        vertices: every_nth(&path, 100).collect(),
        particle_paths: vec![path],
    }
}

// ========== Cube ==========

/// Parameters for [`wireframe_cube`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeParams {
    /// Edge length.
    pub size: f32,
}

impl Default for CubeParams {
    fn default() -> Self {
        Self { size: 100.0 }
    }
}

/// Cube (12 edges, 8 corners). Particles run along every edge.
pub fn wireframe_cube(params: &CubeParams) -> Shape {
    let s = params.size / 2.0;

    let vertices = vec![
        // Bottom
        Vec3::new(-s, -s, -s),
        Vec3::new(s, -s, -s),
        Vec3::new(s, s, -s),
        Vec3::new(-s, s, -s),
        // Top
        Vec3::new(-s, -s, s),
        Vec3::new(s, -s, s),
        Vec3::new(s, s, s),
        Vec3::new(-s, s, s),
    ];

    const EDGES: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0), // Bottom square
        (4, 5), (5, 6), (6, 7), (7, 4), // Top square
        (0, 4), (1, 5), (2, 6), (3, 7), // Verticals
    ];

    let polylines: Vec<Polyline> = EDGES
        .iter()
        .map(|&(i, j)| vec![vertices[i], vertices[j]])
        .collect();

    Shape {
        name: "Wireframe Cube".into(),
        particle_paths: polylines.clone(),
        polylines,
        vertices,
    }
}

// ========== Icosphere ==========

/// Parameters for [`icosphere`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcosphereParams {
    pub radius: f32,
    /// Each pass quadruples the face count.
    pub subdivisions: u32,
}

impl Default for IcosphereParams {
    fn default() -> Self {
        Self {
            radius: 70.0,
            subdivisions: 2,
        }
    }
}

/// Number of icosphere edges that carry particles.
const ICOSPHERE_PARTICLE_PATHS: usize = 30;

/// Geodesic sphere: an icosahedron subdivided by midpoint insertion, every
/// new vertex projected back onto the sphere.
pub fn icosphere(params: &IcosphereParams) -> Shape {
    let radius = params.radius;
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let base = [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ];
    let mut vertices: Vec<Vec3> = base.iter().map(|v| v.normalize() * radius).collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    for _ in 0..params.subdivisions {
        // Midpoints shared by two faces must become a single vertex
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (vertices[a as usize] + vertices[b as usize]) / 2.0;
                vertices.push(mid.normalize() * radius);
                (vertices.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for &[v0, v1, v2] in &faces {
            let a = midpoint(v0, v1, &mut vertices);
            let b = midpoint(v1, v2, &mut vertices);
            let c = midpoint(v2, v0, &mut vertices);

            next.push([v0, a, c]);
            next.push([v1, b, a]);
            next.push([v2, c, b]);
            next.push([a, b, c]);
        }
        faces = next;
    }

    let edges: BTreeSet<(u32, u32)> = faces
        .iter()
        .flat_map(|f| [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])])
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect();

    let polylines: Vec<Polyline> = edges
        .iter()
        .map(|&(a, b)| vec![vertices[a as usize], vertices[b as usize]])
        .collect();
    // Strided so the paths spread over the whole sphere
    let stride = (polylines.len() / ICOSPHERE_PARTICLE_PATHS).max(1);
    let particle_paths = polylines
        .iter()
        .step_by(stride)
        .take(ICOSPHERE_PARTICLE_PATHS)
        .cloned()
        .collect();

    Shape {
        name: "Icosphere".into(),
        polylines,
        vertices,
        particle_paths,
    }
}

// ========== Möbius strip ==========

/// Parameters for [`mobius_strip`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MobiusParams {
    /// Distance from the center to the middle of the band.
    pub radius: f32,
    /// Band width.
    pub width: f32,
    pub num_points: usize,
}

impl Default for MobiusParams {
    fn default() -> Self {
        Self {
            radius: 60.0,
            width: 25.0,
            num_points: 200,
        }
    }
}

/// Möbius strip drawn as its two boundary curves plus cross rungs.
pub fn mobius_strip(params: &MobiusParams) -> Shape {
    let big_r = params.radius;
    let us: Vec<f32> = linspace(0.0, TAU, params.num_points).collect();

    let boundary = |v: f32| -> Polyline {
        us.iter()
            .map(|&u| {
                let ring = big_r + v * (u / 2.0).cos();
                Vec3::new(ring * u.cos(), ring * u.sin(), v * (u / 2.0).sin())
            })
            .collect()
    };
    let inner = boundary(-params.width / 2.0);
    let outer = boundary(params.width / 2.0);

    let mut polylines = vec![inner.clone(), outer.clone()];
    polylines.extend(rungs(&inner, &outer, 10));

    Shape {
        name: "Möbius Strip".into(),
        polylines,
        vertices: every_nth(&inner, 20).collect(),
        particle_paths: vec![inner, outer],
    }
}

// ========== Double-helix torus ==========

/// Parameters for [`double_helix_torus`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleHelixTorusParams {
    /// Radius of the torus centerline.
    pub major_radius: f32,
    /// Helix offset from the centerline.
    pub minor_radius: f32,
    /// Helix turns per trip around the torus.
    pub wraps: u32,
    pub num_points: usize,
}

impl Default for DoubleHelixTorusParams {
    fn default() -> Self {
        Self {
            major_radius: 50.0,
            minor_radius: 15.0,
            wraps: 6,
            num_points: 500,
        }
    }
}

/// Two helices on opposite sides, wound around a torus centerline.
pub fn double_helix_torus(params: &DoubleHelixTorusParams) -> Shape {
    let big_r = params.major_radius;
    let r = params.minor_radius;
    let wraps = params.wraps as f32;
    let ts: Vec<f32> = linspace(0.0, TAU, params.num_points).collect();

    let strand = |phase: f32| -> Polyline {
        ts.iter()
            .map(|&t| {
                let helix = wraps * t + phase;
                let radial = r * helix.cos();
                Vec3::new(
                    (big_r + radial) * t.cos(),
                    (big_r + radial) * t.sin(),
                    r * helix.sin(),
                )
            })
            .collect()
    };
    let first = strand(0.0);
    let second = strand(PI);

    let mut polylines = vec![first.clone(), second.clone()];
    polylines.extend(rungs(&first, &second, 25));

    Shape {
        name: "Double Helix Torus".into(),
        polylines,
        vertices: every_nth(&first, 50).collect(),
        particle_paths: vec![first, second],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_paths_valid(shape: &Shape) {
        for (i, path) in shape.particle_paths.iter().enumerate() {
            assert!(path.len() >= 2, "{} path {} has {} points", shape.name, i, path.len());
        }
        for line in &shape.polylines {
            assert!(line.len() >= 2, "{} has a polyline shorter than 2", shape.name);
        }
    }

    #[test]
    fn test_linspace_includes_endpoints() {
        let v: Vec<f32> = linspace(-1.0, 1.0, 5).collect();
        assert_eq!(v, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1).collect::<Vec<_>>(), vec![3.0]);
        assert_eq!(linspace(0.0, 1.0, 0).count(), 0);
    }

    #[test]
    fn test_dna_helix() {
        let shape = dna_helix(&DnaHelixParams::default());
        assert_paths_valid(&shape);

        // 200 samples, rungs at 0, 10, ..., 190
        assert_eq!(shape.polylines.len(), 2 + 20);
        assert_eq!(shape.vertices.len(), 40);
        assert_eq!(shape.particle_paths.len(), 2);

        let s1 = &shape.particle_paths[0];
        let s2 = &shape.particle_paths[1];
        assert_eq!(s1.len(), 200);
        assert!((s1[0].y + 75.0).abs() < 1e-4);
        assert!((s1[199].y - 75.0).abs() < 1e-4);
        // Strands sit on opposite sides of the axis
        assert!((s1[0].x + s2[0].x).abs() < 1e-3);
        assert!((s1[37].x + s2[37].x).abs() < 1e-3);
        assert!((s1[37].z + s2[37].z).abs() < 1e-3);
    }

    #[test]
    fn test_torus_knot_closes_on_itself() {
        let shape = torus_knot(&TorusKnotParams::default());
        assert_paths_valid(&shape);

        let path = &shape.polylines[0];
        assert_eq!(path.len(), 500);
        assert_eq!(shape.vertices.len(), 10);
        assert!(path[0].distance(path[499]) < 1e-2);
        assert!((path[0] - Vec3::new(80.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_lorenz_is_centered() {
        let shape = lorenz_attractor(&LorenzParams { num_points: 2000, scale: 3.0 });
        assert_paths_valid(&shape);
        assert_eq!(shape.polylines.len(), 1);
        assert_eq!(shape.polylines[0].len(), 2000);

        let sum: Vec3 = shape.polylines[0].iter().copied().sum();
        let centroid = sum / 2000.0;
        assert!(centroid.length() < 1e-3, "centroid {:?}", centroid);
    }

    #[test]
    fn test_lorenz_is_deterministic() {
        let a = lorenz_attractor(&LorenzParams::default());
        let b = lorenz_attractor(&LorenzParams::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_cube_counts() {
        let shape = wireframe_cube(&CubeParams { size: 100.0 });
        assert_paths_valid(&shape);
        assert_eq!(shape.vertices.len(), 8);
        assert_eq!(shape.polylines.len(), 12);
        assert_eq!(shape.particle_paths.len(), 12);
        for line in &shape.polylines {
            assert!((line[0].distance(line[1]) - 100.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_icosphere_edges_are_unique() {
        let shape = icosphere(&IcosphereParams::default());
        assert_paths_valid(&shape);

        // V = 10 * 4^n + 2, E = 30 * 4^n
        assert_eq!(shape.vertices.len(), 162);
        assert_eq!(shape.polylines.len(), 480);
        assert_eq!(shape.particle_paths.len(), 30);

        for v in &shape.vertices {
            assert!((v.length() - 70.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_icosphere_without_subdivision() {
        let shape = icosphere(&IcosphereParams { radius: 1.0, subdivisions: 0 });
        assert_eq!(shape.vertices.len(), 12);
        assert_eq!(shape.polylines.len(), 30);
        assert_eq!(shape.particle_paths, shape.polylines);
    }

    #[test]
    fn test_icosphere_paths_cover_the_edge_list() {
        let shape = icosphere(&IcosphereParams::default());
        let stride = 480 / 30;

        for (i, path) in shape.particle_paths.iter().enumerate() {
            assert_eq!(*path, shape.polylines[i * stride]);
        }
        // Not just the leading run of edges around the first vertices
        assert_ne!(shape.particle_paths[29], shape.polylines[29]);
    }

    #[test]
    fn test_mobius_strip_has_half_twist() {
        let shape = mobius_strip(&MobiusParams::default());
        assert_paths_valid(&shape);
        assert_eq!(shape.polylines.len(), 2 + 20);
        assert_eq!(shape.vertices.len(), 10);

        // After one trip around, each boundary ends where the other began
        let inner = &shape.particle_paths[0];
        let outer = &shape.particle_paths[1];
        assert!(inner[199].distance(outer[0]) < 1e-3);
        assert!(outer[199].distance(inner[0]) < 1e-3);
    }

    #[test]
    fn test_double_helix_torus() {
        let shape = double_helix_torus(&DoubleHelixTorusParams::default());
        assert_paths_valid(&shape);
        assert_eq!(shape.polylines.len(), 2 + 20);
        assert_eq!(shape.vertices.len(), 10);
        let first = &shape.particle_paths[0];
        assert!((first[0] - Vec3::new(65.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_segment_and_point_counts() {
        let shape = wireframe_cube(&CubeParams::default());
        assert_eq!(shape.segment_count(), 12);
        assert_eq!(shape.point_count(), 24);
    }
}
