//! Glyph assignment without adjacent duplicates.
//!
//! A greedy local search: every cell that shares its glyph with a neighbor
//! takes a glyph none of its neighbors use. Early passes pick among the free
//! glyphs at random to shake the layout out of repeating patterns; later
//! passes take the first free glyph so the search settles. A cell with no
//! free glyph first tries to free one by moving a neighbor whose glyph occurs
//! only once around it, then falls back to the least used glyph.
//!
//! With at least 7 glyphs (maximum degree + 1) a free glyph always exists and
//! the final pass leaves no conflict. With fewer glyphs the search can get
//! stuck; a regular hexagonal lattice is then recolored from its three
//! axial classes, which needs only 3 glyphs. Anything else is best effort
//! and cells still in conflict are flagged.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use super::Cell;
use crate::framework::util::SQRT_3;

/// Reassigns glyphs until no neighbors share one or `max_passes` is spent,
/// then runs one forcing pass and flags the cells left in conflict. Returns
/// the number of passes that found conflicts, excluding the forcing pass.
pub fn resolve_conflicts(
    cells: &mut [Cell],
    glyph_count: usize,
    max_passes: usize,
    random_passes: usize,
    rng: &mut impl Rng,
) -> usize {
    for cell in cells.iter_mut() {
        cell.conflict = false;
    }

    if glyph_count == 0 || cells.is_empty() {
        return 0;
    }

    let mut passes = 0;
    for pass in 0..max_passes {
        if !run_pass(cells, glyph_count, pass < random_passes, rng) {
            break;
        }
        passes += 1;
    }

    force_remaining(cells, glyph_count);
    if !validate(cells).is_clean() {
        recolor_by_class(cells, glyph_count, rng);
    }

    for i in 0..cells.len() {
        cells[i].conflict = in_conflict(cells, i);
    }

    passes
}

/// One sweep over every cell. Returns false when nothing was in conflict.
fn run_pass(
    cells: &mut [Cell],
    glyph_count: usize,
    randomize: bool,
    rng: &mut impl Rng,
) -> bool {
    let mut found = false;

    for i in 0..cells.len() {
        if !in_conflict(cells, i) {
            continue;
        }
        found = true;

        let counts = neighbor_counts(cells, i, glyph_count);
        let free: Vec<usize> =
            (0..glyph_count).filter(|g| counts[*g] == 0).collect();

        let glyph = if !free.is_empty() {
            if randomize {
                free[rng.random_range(0..free.len())]
            } else {
                free[0]
            }
        } else if let Some(glyph) =
            free_by_moving_neighbor(cells, i, &counts, glyph_count)
        {
            glyph
        } else {
            least_used(&counts)
        };

        cells[i].glyph_index = glyph;
    }

    found
}

/// Moves one neighbor that alone holds some glyph to an alternative it is
/// free to take, and returns the glyph that frees up for cell `i`.
fn free_by_moving_neighbor(
    cells: &mut [Cell],
    i: usize,
    counts: &[usize],
    glyph_count: usize,
) -> Option<usize> {
    for k in 0..cells[i].neighbors.len() {
        let j = cells[i].neighbors[k];
        let held = cells[j].glyph_index;
        if counts[held] != 1 {
            continue;
        }

        let around_j = neighbor_counts(cells, j, glyph_count);
        let alternative = (0..glyph_count)
            .find(|g| *g != held && around_j[*g] == 0);

        if let Some(alternative) = alternative {
            cells[j].glyph_index = alternative;
            return Some(held);
        }
    }

    None
}

fn force_remaining(cells: &mut [Cell], glyph_count: usize) {
    for i in 0..cells.len() {
        if !in_conflict(cells, i) {
            continue;
        }

        let counts = neighbor_counts(cells, i, glyph_count);
        let glyph =
            counts.iter().position(|count| *count == 0).or_else(|| {
                free_by_moving_neighbor(cells, i, &counts, glyph_count)
            });

        if let Some(glyph) = glyph {
            cells[i].glyph_index = glyph;
        }
    }
}

/// Splits the glyphs into three shuffled groups and gives every cell a
/// random glyph from its class's group. No two cells of a class touch, so
/// neighbors never share a glyph. Returns false, leaving `cells` untouched,
/// with fewer than 3 glyphs or when the cells are not a regular lattice.
fn recolor_by_class(
    cells: &mut [Cell],
    glyph_count: usize,
    rng: &mut impl Rng,
) -> bool {
    if glyph_count < 3 {
        return false;
    }
    let Some(classes) = axial_classes(cells) else {
        return false;
    };

    let mut glyphs: Vec<usize> = (0..glyph_count).collect();
    glyphs.shuffle(rng);
    let groups: [Vec<usize>; 3] = std::array::from_fn(|class| {
        glyphs.iter().copied().skip(class).step_by(3).collect()
    });

    for (cell, class) in cells.iter_mut().zip(classes) {
        let group = &groups[class];
        cell.glyph_index = group[rng.random_range(0..group.len())];
    }

    true
}

/// `(q - r) mod 3` of each cell's axial coordinates relative to the first
/// cell, with the neighbor spacing taken from the first linked pair. None
/// when a center is off the lattice or two neighbors land in one class.
fn axial_classes(cells: &[Cell]) -> Option<Vec<usize>> {
    let origin = cells.first()?;
    let spacing = cells.iter().find_map(|cell| {
        let &j = cell.neighbors.first()?;
        Some(cells[j].distance_to(cell.x, cell.y))
    })?;
    if !(spacing > 0.0) {
        return None;
    }

    let mut classes = Vec::with_capacity(cells.len());
    for cell in cells {
        let r = 2.0 * (cell.y - origin.y) / (SQRT_3 * spacing);
        let q = (cell.x - origin.x) / spacing - r / 2.0;
        let (qi, ri) = (q.round(), r.round());
        if (q - qi).abs() > 0.1 || (r - ri).abs() > 0.1 {
            return None;
        }
        classes.push((qi as i64 - ri as i64).rem_euclid(3) as usize);
    }

    let separated = cells.iter().enumerate().all(|(i, cell)| {
        cell.neighbors.iter().all(|&j| classes[i] != classes[j])
    });
    separated.then_some(classes)
}

fn in_conflict(cells: &[Cell], i: usize) -> bool {
    let glyph = cells[i].glyph_index;
    cells[i]
        .neighbors
        .iter()
        .any(|&j| cells[j].glyph_index == glyph)
}

fn neighbor_counts(
    cells: &[Cell],
    i: usize,
    glyph_count: usize,
) -> Vec<usize> {
    let mut counts = vec![0; glyph_count];
    for &j in &cells[i].neighbors {
        if let Some(count) = counts.get_mut(cells[j].glyph_index) {
            *count += 1;
        }
    }
    counts
}

fn least_used(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .min_by_key(|(_, count)| **count)
        .map(|(glyph, _)| glyph)
        .unwrap_or(0)
}

/// Outcome of checking a lattice for neighbors sharing a glyph
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConflictReport {
    /// Neighbor pairs sharing a glyph, each pair counted once
    pub conflicting_pairs: usize,
    /// Cells involved in at least one conflicting pair
    pub cells: Vec<usize>,
    /// Cells the final pass had to force
    pub flagged: usize,
}

impl ConflictReport {
    pub fn is_clean(&self) -> bool {
        self.conflicting_pairs == 0
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conflicting pair(s) across {} cell(s), {} flagged",
            self.conflicting_pairs,
            self.cells.len(),
            self.flagged
        )
    }
}

pub fn validate(cells: &[Cell]) -> ConflictReport {
    let mut report = ConflictReport::default();

    for (i, cell) in cells.iter().enumerate() {
        if cell.conflict {
            report.flagged += 1;
        }

        let mut involved = false;
        for &j in &cell.neighbors {
            if cells[j].glyph_index == cell.glyph_index {
                involved = true;
                if i < j {
                    report.conflicting_pairs += 1;
                }
            }
        }

        if involved {
            report.cells.push(i);
        }
    }

    report
}
