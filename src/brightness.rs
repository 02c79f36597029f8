/*
 *  brightness.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Activity-driven brightness fade
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BrightnessConfig {
    /// Level while the user is active (0-255)
    pub bright: u8,
    /// Level after the dim threshold lapses
    pub dim: u8,
    /// Inactivity period before dimming starts
    pub dim_after: Duration,
    /// Maximum level change per scheduler tick
    pub fade_step: u8,
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self {
            bright: 255,
            dim: 40,
            dim_after: Duration::from_secs(120),
            fade_step: 8,
        }
    }
}

/// Tracks last activity and fades the panel brightness toward a target.
///
/// Activity is any host notification or Span protocol call; the thresholds
/// and levels come from configuration. The level converges by a bounded step
/// per tick, never jumping, except through `override_level`.
pub struct BrightnessController {
    cfg: BrightnessConfig,
    last_activity: Instant,
    current: u8,
    target: u8,
}

impl BrightnessController {
    pub fn new(cfg: BrightnessConfig) -> Self {
        let current = cfg.bright;
        Self {
            cfg,
            last_activity: Instant::now(),
            current,
            target: current,
        }
    }

    pub fn note_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    pub fn current(&self) -> u8 { self.current }
    pub fn target(&self) -> u8 { self.target }

    /// True when the panel has faded all the way down
    pub fn is_dimmed(&self) -> bool {
        self.current == self.cfg.dim
    }

    /// Jump to a level immediately (explicit override, e.g. power save)
    pub fn override_level(&mut self, level: u8) {
        self.current = level;
        self.target = level;
    }

    /// One scheduler tick: retarget from the activity clock, then move the
    /// current level one bounded step. Returns the new level when it changed.
    pub fn tick(&mut self, now: Instant) -> Option<u8> {
        self.target = if now.duration_since(self.last_activity) >= self.cfg.dim_after {
            self.cfg.dim
        } else {
            self.cfg.bright
        };

        if self.current == self.target {
            return None;
        }
        let step = self.cfg.fade_step.max(1);
        self.current = if self.current < self.target {
            self.current.saturating_add(step).min(self.target)
        } else {
            self.current.saturating_sub(step).max(self.target)
        };
        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> BrightnessConfig {
        BrightnessConfig {
            bright: 200,
            dim: 40,
            dim_after: Duration::from_secs(10),
            fade_step: 50,
        }
    }

    #[test]
    fn fades_down_in_bounded_steps() {
        let mut b = BrightnessController::new(cfg());
        let t0 = Instant::now();
        b.note_activity(t0);

        // within the threshold: stays bright
        assert_eq!(b.tick(t0 + Duration::from_secs(5)), None);
        assert_eq!(b.current(), 200);

        // past the threshold: steps down, never more than fade_step per tick
        let mut prev = b.current();
        let late = t0 + Duration::from_secs(11);
        while let Some(level) = b.tick(late) {
            assert!(prev - level <= 50);
            assert!(level >= 40);
            prev = level;
        }
        assert_eq!(b.current(), 40);
        assert!(b.is_dimmed());
    }

    #[test]
    fn activity_fades_back_up() {
        let mut b = BrightnessController::new(cfg());
        let t0 = Instant::now();
        b.override_level(40);
        b.note_activity(t0);

        assert_eq!(b.tick(t0), Some(90));
        assert_eq!(b.tick(t0), Some(140));
        assert_eq!(b.tick(t0), Some(190));
        assert_eq!(b.tick(t0), Some(200));
        assert_eq!(b.tick(t0), None);
    }

    #[test]
    fn override_jumps_immediately() {
        let mut b = BrightnessController::new(cfg());
        b.override_level(0);
        assert_eq!(b.current(), 0);
        assert_eq!(b.target(), 0);
    }
}
