use crate::config::{ClickMode, EngineConfig};
use crate::lattice::{ActiveSet, Lattice};
use crate::motion::RippleEngine;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x
            && x < self.x + self.width
            && y >= self.y
            && y < self.y + self.height
    }
}

/// Named screen areas owned by the host (buttons, links, cards) where clicks
/// belong to the host and never reach the backdrop.
#[derive(Clone, Debug, Default)]
pub struct InteractiveRegions {
    regions: Vec<(String, Rect)>,
}

impl InteractiveRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region, replacing any region of the same name
    pub fn insert(&mut self, name: impl Into<String>, rect: Rect) {
        let name = name.into();
        match self.regions.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = rect,
            None => self.regions.push((name, rect)),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.regions.len();
        self.regions.retain(|(n, _)| n != name);
        self.regions.len() != before
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn get(&self, name: &str) -> Option<Rect> {
        self.regions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rect)| *rect)
    }

    /// The most recently added region containing the point
    pub fn hit(&self, x: f32, y: f32) -> Option<&str> {
        self.regions
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    /// Landed on the named interactive region
    Blocked(String),
    /// No cell within reach of the click
    Miss,
    /// The cell under the click was not lit enough
    Dim,
    Spawned { cell: Option<usize>, hue: f32 },
}

/// Everything a click may touch
pub struct ClickTargets<'a> {
    pub lattice: &'a mut Lattice,
    pub active: &'a mut ActiveSet,
    pub ripples: &'a mut RippleEngine,
}

#[derive(Clone, Debug, Default)]
pub struct InputRouter {
    pointer: Option<(f32, f32)>,
    regions: InteractiveRegions,
    palette_cursor: usize,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer = None;
    }

    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    /// Name of the interactive region under the pointer, if any
    pub fn hovered_region(&self) -> Option<&str> {
        let (x, y) = self.pointer?;
        self.regions.hit(x, y)
    }

    pub fn regions(&self) -> &InteractiveRegions {
        &self.regions
    }

    pub fn regions_mut(&mut self) -> &mut InteractiveRegions {
        &mut self.regions
    }

    pub fn on_click(
        &mut self,
        x: f32,
        y: f32,
        config: &EngineConfig,
        targets: ClickTargets<'_>,
    ) -> ClickOutcome {
        if let Some(name) = self.regions.hit(x, y) {
            return ClickOutcome::Blocked(name.to_string());
        }

        match config.click_mode {
            ClickMode::LitCells => {
                let Some(index) = targets.lattice.hit_test(x, y) else {
                    return ClickOutcome::Miss;
                };
                let Some(cell) = targets.lattice.cell_mut(index) else {
                    return ClickOutcome::Miss;
                };
                if cell.intensity() <= config.click_threshold {
                    return ClickOutcome::Dim;
                }

                let hue = cell.hue;
                cell.ignite(hue);
                targets.active.insert(index);
                targets.ripples.spawn(x, y, hue);
                ClickOutcome::Spawned {
                    cell: Some(index),
                    hue,
                }
            }
            ClickMode::Anywhere => {
                let Some(hue) = config
                    .palette
                    .get(self.palette_cursor % config.palette.len().max(1))
                    .copied()
                else {
                    return ClickOutcome::Miss;
                };
                self.palette_cursor = self.palette_cursor.wrapping_add(1);
                targets.ripples.spawn(x, y, hue);
                ClickOutcome::Spawned { cell: None, hue }
            }
        }
    }
}
