use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::EngineConfig;
use crate::lattice::{ActiveSet, Lattice};

/// One cell held lit for a window of time. Refers to its cell by index and
/// never outlives the lattice it was scheduled on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WanderItem {
    pub cell: usize,
    /// Seconds, on the engine clock
    pub start: f32,
    pub end: f32,
    pub hue: f32,
    /// Set the first tick the window is entered
    pub activated: bool,
}

impl WanderItem {
    pub fn is_live(&self, now: f32) -> bool {
        now >= self.start && now < self.end
    }
}

/// Holds every item whose window contains `now` at full intensity and drops
/// the items whose window has passed. Returns how many items entered their
/// window on this tick.
pub fn step_wander(
    items: &mut Vec<WanderItem>,
    now: f32,
    lattice: &mut Lattice,
    active: &mut ActiveSet,
) -> usize {
    let mut entered = 0;

    for item in items.iter_mut() {
        if !item.is_live(now) {
            continue;
        }
        let Some(cell) = lattice.cell_mut(item.cell) else {
            continue;
        };
        cell.ignite(item.hue);
        active.insert(item.cell);
        if !item.activated {
            item.activated = true;
            entered += 1;
        }
    }

    items.retain(|item| item.end > now);
    entered
}

#[derive(Clone, Debug, PartialEq)]
pub struct WanderParams {
    /// Seconds between batches
    pub cadence: f32,
    /// Seconds each item stays lit
    pub hold: f32,
    pub batch_size: usize,
    /// Portion of the viewport, from the top, batches prefer
    pub upper_fraction: f32,
    pub palette: Vec<f32>,
}

impl WanderParams {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            cadence: config.wander_cadence,
            hold: config.wander_hold,
            batch_size: config.wander_batch,
            upper_fraction: config.wander_upper_fraction,
            palette: config.palette.clone(),
        }
    }
}

/// Lights a batch of random cells every `cadence` seconds, staggering their
/// windows across the period. The first batch is scheduled on the first tick
/// after a reset.
#[derive(Clone, Debug)]
pub struct WanderScheduler {
    params: WanderParams,
    items: Vec<WanderItem>,
    next_batch: Option<f32>,
}

impl WanderScheduler {
    pub fn new(params: WanderParams) -> Self {
        Self {
            params,
            items: vec![],
            next_batch: None,
        }
    }

    pub fn items(&self) -> &[WanderItem] {
        &self.items
    }

    /// Forgets every item; the next tick starts a fresh batch
    pub fn reset(&mut self) {
        self.items.clear();
        self.next_batch = None;
    }

    pub fn advance(
        &mut self,
        now: f32,
        lattice: &mut Lattice,
        active: &mut ActiveSet,
        rng: &mut impl Rng,
    ) -> usize {
        if self.next_batch.is_none_or(|at| now >= at) {
            self.schedule_batch(now, lattice, rng);
            self.next_batch = Some(now + self.params.cadence);
        }

        step_wander(&mut self.items, now, lattice, active)
    }

    /// Picks `batch_size` distinct cells, from the upper part of the viewport
    /// when enough cells qualify, and gives each a window within the next
    /// period.
    pub fn schedule_batch(
        &mut self,
        now: f32,
        lattice: &Lattice,
        rng: &mut impl Rng,
    ) {
        let params = &self.params;
        if lattice.is_empty() || params.batch_size == 0 {
            return;
        }

        let limit = lattice.height() * params.upper_fraction;
        let upper: Vec<usize> = lattice
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.y >= 0.0 && cell.y <= limit)
            .map(|(index, _)| index)
            .collect();

        let mut pool = if upper.len() >= params.batch_size {
            upper
        } else {
            (0..lattice.len()).collect()
        };
        pool.shuffle(rng);
        pool.truncate(params.batch_size);

        let mut hues: Vec<f32> = params
            .palette
            .iter()
            .copied()
            .cycle()
            .take(pool.len())
            .collect();
        hues.shuffle(rng);

        let spread = (params.cadence - params.hold).max(0.0);
        for (cell, hue) in pool.into_iter().zip(hues) {
            let offset = if spread > 0.0 {
                rng.random_range(0.0..spread)
            } else {
                0.0
            };
            let start = now + offset;
            self.items.push(WanderItem {
                cell,
                start,
                end: start + params.hold,
                hue,
                activated: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::assert_approx_eq;
    use crate::lattice::LatticeParams;

    fn lattice(seed: u64) -> Lattice {
        let mut rng = StdRng::seed_from_u64(seed);
        Lattice::build(400.0, 300.0, 7, &LatticeParams::default(), &mut rng)
    }

    fn params() -> WanderParams {
        WanderParams::from_config(&EngineConfig::default())
    }

    #[test]
    fn test_batch_prefers_upper_half() {
        let lattice = lattice(1);
        let mut rng = StdRng::seed_from_u64(2);
        let mut scheduler = WanderScheduler::new(params());

        scheduler.schedule_batch(0.0, &lattice, &mut rng);
        let items = scheduler.items();

        assert_eq!(items.len(), 14);
        let mut cells: Vec<usize> = items.iter().map(|i| i.cell).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 14);

        for item in items {
            let y = lattice.cells()[item.cell].y;
            assert!((0.0..=150.0).contains(&y));
            assert!(item.start >= 0.0 && item.start < 8.5);
            assert_approx_eq!(item.end - item.start, 1.5);
            assert!(params().palette.contains(&item.hue));
        }
    }

    #[test]
    fn test_hues_cover_the_palette() {
        let lattice = lattice(3);
        let mut rng = StdRng::seed_from_u64(4);
        let mut scheduler = WanderScheduler::new(params());

        scheduler.schedule_batch(0.0, &lattice, &mut rng);
        for hue in params().palette {
            let uses = scheduler
                .items()
                .iter()
                .filter(|item| item.hue == hue)
                .count();
            assert!((2..=3).contains(&uses));
        }
    }

    #[test]
    fn test_small_lattice_falls_back_to_all_cells() {
        let mut rng = StdRng::seed_from_u64(5);
        let lattice_params = LatticeParams::default();
        let lattice = Lattice::build(40.0, 30.0, 7, &lattice_params, &mut rng);
        let mut scheduler = WanderScheduler::new(WanderParams {
            batch_size: 10,
            ..params()
        });

        scheduler.schedule_batch(0.0, &lattice, &mut rng);
        assert_eq!(scheduler.items().len(), 10);
    }

    #[test]
    fn test_activation_is_idempotent() {
        let mut lattice = lattice(6);
        let mut active = ActiveSet::new(lattice.len());
        let mut items = vec![
            WanderItem {
                cell: 3,
                start: 1.0,
                end: 2.5,
                hue: 190.0,
                activated: false,
            },
            WanderItem {
                cell: 3,
                start: 2.0,
                end: 3.5,
                hue: 60.0,
                activated: false,
            },
        ];

        assert_eq!(step_wander(&mut items, 0.5, &mut lattice, &mut active), 0);
        assert!(active.is_empty());

        assert_eq!(step_wander(&mut items, 1.0, &mut lattice, &mut active), 1);
        assert_eq!(step_wander(&mut items, 1.5, &mut lattice, &mut active), 0);
        assert_eq!(step_wander(&mut items, 2.0, &mut lattice, &mut active), 1);
        assert_eq!(active.len(), 1);
        assert_eq!(lattice.cells()[3].hue, 60.0);
        assert_eq!(lattice.cells()[3].intensity(), 1.0);

        step_wander(&mut items, 3.0, &mut lattice, &mut active);
        assert_eq!(items.len(), 1);
        step_wander(&mut items, 3.5, &mut lattice, &mut active);
        assert!(items.is_empty());
    }

    #[test]
    fn test_scheduler_fires_on_cadence() {
        let mut lattice = lattice(7);
        let mut active = ActiveSet::new(lattice.len());
        let mut rng = StdRng::seed_from_u64(8);
        let mut scheduler = WanderScheduler::new(params());

        scheduler.advance(0.0, &mut lattice, &mut active, &mut rng);
        assert_eq!(scheduler.items().len(), 14);

        // Every window of the first batch closes by the next batch
        assert!(scheduler.items().iter().all(|item| item.end <= 10.0));
        scheduler.advance(9.0, &mut lattice, &mut active, &mut rng);
        assert!(scheduler.items().len() <= 14);

        scheduler.advance(10.0, &mut lattice, &mut active, &mut rng);
        assert_eq!(scheduler.items().len(), 14);

        scheduler.reset();
        assert!(scheduler.items().is_empty());
    }
}
