use crate::config::EngineConfig;
use crate::lattice::{ActiveSet, Lattice};

/// An expanding shockwave. Its radius only ever grows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ripple {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Pixels added to `radius` on the next tick
    pub speed: f32,
    /// Added to `speed` after every tick
    pub acceleration: f32,
    pub max_radius: f32,
    pub hue: f32,
}

impl Ripple {
    pub fn is_finished(&self) -> bool {
        self.radius > self.max_radius
    }
}

/// The band of distances a ripple swept during one tick: `inner < d <= outer`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    pub inner: f32,
    pub outer: f32,
}

impl Ring {
    pub fn contains(&self, distance: f32) -> bool {
        distance > self.inner && distance <= self.outer
    }
}

/// Advances a ripple by one tick and returns the ring it now covers. The
/// ring is `ring_factor` times as wide as the distance just traveled so fast
/// ripples never skip over a cell.
pub fn step_ripple(ripple: &mut Ripple, ring_factor: f32) -> Ring {
    let traveled = ripple.speed.max(0.0);
    ripple.radius += traveled;
    ripple.speed += ripple.acceleration;

    Ring {
        inner: ripple.radius - traveled * ring_factor,
        outer: ripple.radius,
    }
}

#[derive(Clone, Debug)]
pub struct RippleEngine {
    ripples: Vec<Ripple>,
    speed: f32,
    acceleration: f32,
    ring_factor: f32,
    reignite_threshold: f32,
    max_radius: f32,
}

impl RippleEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            ripples: vec![],
            speed: config.ripple_speed,
            acceleration: config.ripple_acceleration,
            ring_factor: config.ring_factor,
            reignite_threshold: config.reignite_threshold,
            max_radius: 0.0,
        }
    }

    /// Ripples die once they pass the viewport diagonal
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.max_radius = width.max(0.0).hypot(height.max(0.0));
    }

    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    pub fn spawn(&mut self, x: f32, y: f32, hue: f32) {
        self.ripples.push(Ripple {
            x,
            y,
            radius: 0.0,
            speed: self.speed,
            acceleration: self.acceleration,
            max_radius: self.max_radius,
            hue,
        });
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    pub fn len(&self) -> usize {
        self.ripples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ripples.is_empty()
    }

    pub fn clear(&mut self) {
        self.ripples.clear();
    }

    /// Steps every ripple, ignites the cells on each ring and drops the
    /// ripples that left the viewport. Returns the number of ignitions.
    ///
    /// Only dim cells ignite, so a ring passing over a cell that is still
    /// glowing does not restart it. When rings overlap the later ripple
    /// sets the hue.
    pub fn advance(
        &mut self,
        lattice: &mut Lattice,
        active: &mut ActiveSet,
    ) -> usize {
        let mut ignited = 0;
        let mut candidates = Vec::new();

        for ripple in self.ripples.iter_mut() {
            let ring = step_ripple(ripple, self.ring_factor);

            candidates.clear();
            candidates.extend(lattice.candidates_near(
                ripple.x,
                ripple.y,
                ring.outer,
            ));

            for &index in &candidates {
                let Some(cell) = lattice.cell_mut(index) else {
                    continue;
                };
                if !ring.contains(cell.distance_to(ripple.x, ripple.y)) {
                    continue;
                }
                if cell.intensity() >= self.reignite_threshold {
                    continue;
                }
                cell.ignite(ripple.hue);
                active.insert(index);
                ignited += 1;
            }
        }

        self.ripples.retain(|ripple| !ripple.is_finished());
        ignited
    }
}
