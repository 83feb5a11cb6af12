//! Ordered catalogue of the built-in shapes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::geometry::{self, Shape};

/// The built-in shapes, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    DnaHelix,
    TorusKnot,
    LorenzAttractor,
    WireframeCube,
    Icosphere,
    MobiusStrip,
    DoubleHelixTorus,
}

impl ShapeKind {
    /// Every shape in display order.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::DnaHelix,
        ShapeKind::TorusKnot,
        ShapeKind::LorenzAttractor,
        ShapeKind::WireframeCube,
        ShapeKind::Icosphere,
        ShapeKind::MobiusStrip,
        ShapeKind::DoubleHelixTorus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::DnaHelix => "DNA Double Helix",
            ShapeKind::TorusKnot => "Torus Knot",
            ShapeKind::LorenzAttractor => "Lorenz Attractor",
            ShapeKind::WireframeCube => "Wireframe Cube",
            ShapeKind::Icosphere => "Icosphere",
            ShapeKind::MobiusStrip => "Möbius Strip",
            ShapeKind::DoubleHelixTorus => "Double Helix Torus",
        }
    }

    /// Run the generator with its default parameters.
    pub fn generate(self) -> Shape {
        match self {
            ShapeKind::DnaHelix => geometry::dna_helix(&Default::default()),
            ShapeKind::TorusKnot => geometry::torus_knot(&Default::default()),
            ShapeKind::LorenzAttractor => geometry::lorenz_attractor(&Default::default()),
            ShapeKind::WireframeCube => geometry::wireframe_cube(&Default::default()),
            ShapeKind::Icosphere => geometry::icosphere(&Default::default()),
            ShapeKind::MobiusStrip => geometry::mobius_strip(&Default::default()),
            ShapeKind::DoubleHelixTorus => geometry::double_helix_torus(&Default::default()),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lazily generated, cached shapes addressed by index.
///
/// Indices wrap modulo [`len`](Self::len), so any `usize` is valid.
#[derive(Debug, Default)]
pub struct ShapeLibrary {
    cache: HashMap<usize, Arc<Shape>>,
}

impl ShapeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shapes in the catalogue.
    pub fn len(&self) -> usize {
        ShapeKind::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn kind(&self, index: usize) -> ShapeKind {
        ShapeKind::ALL[index % ShapeKind::ALL.len()]
    }

    /// Shape at `index`, generated on first request.
    pub fn shape(&mut self, index: usize) -> Arc<Shape> {
        let index = index % self.len();
        let kind = self.kind(index);
        Arc::clone(self.cache.entry(index).or_insert_with(|| {
            log::debug!("Generating shape {} ({})", index, kind);
            Arc::new(kind.generate())
        }))
    }

    /// Name of the shape at `index` without generating it.
    pub fn shape_name(&self, index: usize) -> &'static str {
        self.kind(index).name()
    }

    /// Number of shapes generated so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
