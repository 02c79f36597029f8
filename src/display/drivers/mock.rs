/*
 *  display/drivers/mock.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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

use std::sync::{Arc, Mutex};

use embedded_graphics::primitives::Rectangle;

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameView;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// Mock display driver.
///
/// Simulates a display without hardware: records every operation and keeps
/// the last flushed frame for inspection, with switchable failure injection
/// for error-path tests.
pub struct MockDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state, shared so tests can inspect it while the scheduler owns
/// the driver
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of flush attempts (including failed ones)
    pub flush_count: usize,

    /// Regions passed to flush, in order
    pub regions: Vec<Rectangle>,

    /// Packed bytes of the last successfully flushed frame
    pub last_frame: Vec<u8>,

    /// Last brightness value set
    pub last_brightness: Option<u8>,

    /// When true, every flush returns an error
    pub simulate_flush_failure: bool,
}

impl MockDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                max_fps: 60,
                supports_brightness: true,
            },
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Shared state handle for test assertions
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn flush(&mut self, frame: &FrameView<'_>, region: Rectangle) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.flush_count += 1;

        if state.simulate_flush_failure {
            return Err(DisplayError::FlushFailed("simulated failure".to_string()));
        }
        if (frame.width(), frame.height()) != (self.capabilities.width, self.capabilities.height) {
            return Err(DisplayError::GeometryMismatch {
                expected: (self.capabilities.width, self.capabilities.height),
                actual: (frame.width(), frame.height()),
            });
        }

        state.regions.push(region);
        state.last_frame = frame.to_packed_bytes();
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.state.lock().unwrap().last_brightness = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::RenderSurface;
    use embedded_graphics::prelude::*;

    #[test]
    fn records_flushes_and_failures() {
        let mut driver = MockDriver::new(128, 64);
        let state = driver.state();
        let surface = RenderSurface::new(128, 64);
        let region = surface.full_region();

        driver.flush(&surface.view(), region).unwrap();
        assert_eq!(state.lock().unwrap().flush_count, 1);
        assert_eq!(state.lock().unwrap().regions.len(), 1);

        state.lock().unwrap().simulate_flush_failure = true;
        assert!(driver.flush(&surface.view(), region).is_err());
        assert_eq!(state.lock().unwrap().flush_count, 2);
        assert_eq!(state.lock().unwrap().regions.len(), 1);
    }

    #[test]
    fn rejects_mismatched_geometry() {
        let mut driver = MockDriver::new(128, 64);
        let surface = RenderSurface::new(64, 48);
        let err = driver.flush(&surface.view(), surface.full_region()).unwrap_err();
        assert!(matches!(err, DisplayError::GeometryMismatch { .. }));
    }

    #[test]
    fn brightness_recorded() {
        let mut driver = MockDriver::new(128, 64);
        let state = driver.state();
        driver.set_brightness(42).unwrap();
        assert_eq!(state.lock().unwrap().last_brightness, Some(42));
    }
}
