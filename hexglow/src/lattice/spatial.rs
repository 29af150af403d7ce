use crate::framework::util::HashMap;

/// Uniform grid of buckets keyed by `floor(p / size)`. Buckets are exactly
/// one neighbor threshold wide, so any pair of neighbors lives in the same or
/// adjacent buckets.
#[derive(Clone, Debug)]
pub struct SpatialHash {
    size: f32,
    buckets: HashMap<(i32, i32), Vec<usize>>,
    min: (i32, i32),
    max: (i32, i32),
}

impl SpatialHash {
    pub fn new(size: f32) -> Self {
        Self {
            size: if size.is_finite() { size.max(1.0) } else { 1.0 },
            buckets: HashMap::default(),
            min: (i32::MAX, i32::MAX),
            max: (i32::MIN, i32::MIN),
        }
    }

    fn key(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.size).floor() as i32,
            (y / self.size).floor() as i32,
        )
    }

    pub fn insert(&mut self, index: usize, x: f32, y: f32) {
        let key = self.key(x, y);
        self.min = (self.min.0.min(key.0), self.min.1.min(key.1));
        self.max = (self.max.0.max(key.0), self.max.1.max(key.1));
        self.buckets.entry(key).or_default().push(index);
    }

    /// Every index in the buckets overlapping the given box, in bucket order
    pub fn query(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> impl Iterator<Item = usize> + '_ {
        // Clamping to the occupied range keeps huge boxes cheap; `as i32`
        // saturates for infinities.
        let (lo_x, lo_y) = self.key(min_x, min_y);
        let (hi_x, hi_y) = self.key(max_x, max_y);
        let (lo_x, hi_x) = (lo_x.max(self.min.0), hi_x.min(self.max.0));
        let (lo_y, hi_y) = (lo_y.max(self.min.1), hi_y.min(self.max.1));

        (lo_y..=hi_y)
            .flat_map(move |by| (lo_x..=hi_x).map(move |bx| (bx, by)))
            .filter_map(|key| self.buckets.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }
}
