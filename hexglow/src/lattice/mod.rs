//! Pointy-top hexagonal lattice covering the viewport.
//!
//! Cells are laid out in offset rows (odd rows shifted right by half a
//! column) with one extra ring of cells past every viewport edge so partially
//! visible hexagons are never missing. Each cell links to the cells whose
//! centers sit within [`Lattice::neighbor_threshold`], which for a regular
//! layout means its 2..=6 immediate neighbors.

use rand::Rng;

use crate::framework::util::{SQRT_3, clamp01};

pub mod active;
pub mod coloring;
mod spatial;

pub use active::ActiveSet;
pub use coloring::{ConflictReport, resolve_conflicts, validate};
use spatial::SpatialHash;

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
    pub x: f32,
    pub y: f32,
    pub glyph_index: usize,
    /// Indices into the owning lattice's cells
    pub neighbors: Vec<usize>,
    pub hue: f32,
    /// Set when conflict resolution left this cell sharing a glyph with a
    /// neighbor
    pub conflict: bool,
    intensity: f32,
}

impl Cell {
    pub fn new(row: i32, col: i32, x: f32, y: f32, glyph_index: usize) -> Self {
        Self {
            row,
            col,
            x,
            y,
            glyph_index,
            neighbors: vec![],
            hue: 0.0,
            conflict: false,
            intensity: 0.0,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = clamp01(intensity);
    }

    /// Full intensity in `hue`
    pub fn ignite(&mut self, hue: f32) {
        self.intensity = 1.0;
        self.hue = hue;
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        (self.x - x).hypot(self.y - y)
    }
}

/// Tunables for [`Lattice::build`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeParams {
    pub radius: f32,
    /// Neighbor threshold as a multiple of the nearest-neighbor spacing
    pub neighbor_tolerance: f32,
    pub max_passes: usize,
    pub random_passes: usize,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            radius: 25.0,
            neighbor_tolerance: 1.2,
            max_passes: 10,
            random_passes: 5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Lattice {
    width: f32,
    height: f32,
    radius: f32,
    threshold: f32,
    cells: Vec<Cell>,
    index: SpatialHash,
    passes: usize,
}

impl Lattice {
    pub fn empty(width: f32, height: f32, radius: f32) -> Self {
        let threshold = radius * SQRT_3 * 1.2;
        Self {
            width,
            height,
            radius,
            threshold,
            cells: vec![],
            index: SpatialHash::new(threshold.max(1.0)),
            passes: 0,
        }
    }

    /// Lays out, links and colors a lattice for a `width` x `height`
    /// viewport. A zero-glyph catalog or an empty viewport yields an empty
    /// lattice.
    pub fn build(
        width: f32,
        height: f32,
        glyph_count: usize,
        params: &LatticeParams,
        rng: &mut impl Rng,
    ) -> Self {
        let radius = params.radius;
        let mut lattice = Self::empty(width, height, radius);
        lattice.threshold = radius * SQRT_3 * params.neighbor_tolerance;
        lattice.index = SpatialHash::new(lattice.threshold);

        if glyph_count == 0
            || !(width > 0.0 && height > 0.0 && radius > 0.0)
        {
            return lattice;
        }

        let col_spacing = SQRT_3 * radius;
        let row_spacing = 1.5 * radius;
        let rows = (height / row_spacing).ceil() as i32;
        let cols = (width / col_spacing).ceil() as i32;

        for row in -1..=rows + 1 {
            let offset = if row.rem_euclid(2) == 1 {
                col_spacing / 2.0
            } else {
                0.0
            };
            for col in -1..=cols + 1 {
                let x = col as f32 * col_spacing + offset;
                let y = row as f32 * row_spacing;
                let glyph = rng.random_range(0..glyph_count);
                lattice.index.insert(lattice.cells.len(), x, y);
                lattice.cells.push(Cell::new(row, col, x, y, glyph));
            }
        }

        lattice.link_neighbors();
        lattice.passes = resolve_conflicts(
            &mut lattice.cells,
            glyph_count,
            params.max_passes,
            params.random_passes,
            rng,
        );

        lattice
    }

    fn link_neighbors(&mut self) {
        let threshold = self.threshold;
        for i in 0..self.cells.len() {
            let (x, y) = (self.cells[i].x, self.cells[i].y);
            let mut neighbors: Vec<usize> = self
                .index
                .query(
                    x - threshold,
                    y - threshold,
                    x + threshold,
                    y + threshold,
                )
                .filter(|&j| {
                    j != i && self.cells[j].distance_to(x, y) < threshold
                })
                .collect();
            neighbors.sort_unstable();
            self.cells[i].neighbors = neighbors;
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Center distance below which two cells are neighbors
    pub fn neighbor_threshold(&self) -> f32 {
        self.threshold
    }

    /// Conflict resolution passes the last build needed
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// Nearest cell whose center lies within one radius of `(x, y)`
    pub fn hit_test(&self, x: f32, y: f32) -> Option<usize> {
        let r = self.radius;
        self.index
            .query(x - r, y - r, x + r, y + r)
            .map(|i| (i, self.cells[i].distance_to(x, y)))
            .filter(|(_, d)| *d <= r)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(i, _)| i)
    }

    /// Cells whose centers may lie within `reach` of `(x, y)`. Callers still
    /// filter on exact distance; this only narrows the search to nearby
    /// buckets.
    pub fn candidates_near(
        &self,
        x: f32,
        y: f32,
        reach: f32,
    ) -> impl Iterator<Item = usize> + '_ {
        self.index.query(x - reach, y - reach, x + reach, y + reach)
    }

    pub fn validate(&self) -> ConflictReport {
        validate(&self.cells)
    }
}
