use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickResult {
    pub should_render: bool,
    pub frames_advanced: u32,
}

/// Fixed-rate frame pacer. Wall time accumulates between ticks and a frame is
/// due whenever a full frame interval has built up.
///
/// The clock also tracks animation time: seconds since start, minus any time
/// spent paused (an occluded window), which is what the engine's wander
/// schedule runs on.
#[derive(Debug)]
pub struct FrameClock {
    fps: f32,
    frame_count: u64,
    paused: bool,
    start: Instant,
    paused_total: Duration,
    paused_at: Option<Instant>,
    last_tick: Instant,
    accumulator: Duration,
    frame_intervals: VecDeque<Duration>,
    max_intervals: usize,
}

impl FrameClock {
    pub fn new(fps: f32) -> Self {
        Self::with_start(fps, Instant::now())
    }

    pub fn with_start(fps: f32, now: Instant) -> Self {
        Self {
            fps: fps.max(1.0),
            frame_count: 0,
            paused: false,
            start: now,
            paused_total: Duration::ZERO,
            paused_at: None,
            last_tick: now,
            accumulator: Duration::ZERO,
            frame_intervals: VecDeque::new(),
            max_intervals: 90,
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps.max(1.0);
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.paused_at = Some(now);
        } else if let Some(at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(at);
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.fps)
    }

    pub fn next_deadline(&self) -> Instant {
        let remaining = self
            .frame_duration()
            .checked_sub(self.accumulator)
            .unwrap_or_default();
        self.last_tick + remaining
    }

    /// Animation seconds at `now`, excluding paused stretches
    pub fn seconds(&self, now: Instant) -> f32 {
        let paused_now = self
            .paused_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default();
        now.saturating_duration_since(self.start)
            .saturating_sub(self.paused_total + paused_now)
            .as_secs_f32()
    }

    pub fn average_fps(&self) -> f32 {
        if self.frame_intervals.is_empty() {
            return 0.0;
        }

        let sum: Duration = self.frame_intervals.iter().copied().sum();
        let avg = sum / self.frame_intervals.len() as u32;

        if avg.is_zero() {
            return 0.0;
        }

        1.0 / avg.as_secs_f32()
    }

    pub fn tick(&mut self, now: Instant) -> TickResult {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;

        if self.paused {
            // No catching up on missed frames after resume
            self.accumulator = Duration::ZERO;
            return TickResult::default();
        }

        self.accumulator += elapsed;
        let frame_duration = self.frame_duration();
        let mut advanced = 0u32;

        while self.accumulator >= frame_duration {
            self.accumulator -= frame_duration;
            self.frame_count += 1;
            advanced += 1;
        }

        if advanced == 0 {
            return TickResult::default();
        }

        self.frame_intervals.push_back(elapsed);
        if self.frame_intervals.len() > self.max_intervals {
            self.frame_intervals.pop_front();
        }

        TickResult {
            should_render: true,
            frames_advanced: advanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_renders_once_a_full_interval_builds_up() {
        let start = Instant::now();
        let mut clock = FrameClock::with_start(60.0, start);

        let half = start + clock.frame_duration() / 2;
        assert_eq!(clock.tick(half), TickResult::default());

        let full = half + clock.frame_duration() / 2;
        let tick = clock.tick(full);
        assert!(tick.should_render);
        assert_eq!(tick.frames_advanced, 1);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_lagging_tick_counts_every_missed_frame() {
        let start = Instant::now();
        let mut clock = FrameClock::with_start(30.0, start);
        let now = start + clock.frame_duration() * 3;

        let tick = clock.tick(now);
        assert!(tick.should_render);
        assert_eq!(tick.frames_advanced, 3);
        assert!(clock.average_fps() > 0.0);
    }

    #[test]
    fn test_paused_time_is_excluded_from_seconds() {
        let start = Instant::now();
        let mut clock = FrameClock::with_start(60.0, start);

        clock.set_paused(true, start + Duration::from_secs(2));
        let during = start + Duration::from_secs(5);
        assert_eq!(clock.tick(during), TickResult::default());
        assert_approx_eq!(clock.seconds(during), 2.0);

        clock.set_paused(false, start + Duration::from_secs(7));
        assert_approx_eq!(
            clock.seconds(start + Duration::from_secs(8)),
            3.0
        );
    }

    #[test]
    fn test_resume_does_not_catch_up() {
        let start = Instant::now();
        let mut clock = FrameClock::with_start(60.0, start);
        clock.set_paused(true, start);
        clock.tick(start + Duration::from_secs(1));
        clock.set_paused(false, start + Duration::from_secs(1));

        let next = start + Duration::from_secs(1) + clock.frame_duration();
        assert_eq!(clock.tick(next).frames_advanced, 1);
    }

    #[test]
    fn test_fps_floor() {
        let mut clock = FrameClock::new(0.0);
        assert_eq!(clock.fps(), 1.0);
        clock.set_fps(24.0);
        assert_eq!(clock.fps(), 24.0);
    }
}
