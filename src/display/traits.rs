/*
 *  display/traits.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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

use embedded_graphics::primitives::Rectangle;

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameView;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Maximum recommended frame rate
    pub max_fps: u32,

    /// Whether the display supports brightness control
    pub supports_brightness: bool,
}

/// Minimal hardware abstraction - the seam the render engine flushes through.
///
/// Drivers receive finished frames only; they never see engine state and they
/// must not retain the borrowed frame view past the flush call. Physical bus
/// protocols (I2C/SPI wiring, controller init sequences) live behind this
/// trait and are out of the engine's scope.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Push the given region of a finished frame to the device.
    ///
    /// A failed flush is reported, not retried here; the scheduler owns the
    /// retry/escalation policy.
    fn flush(&mut self, frame: &FrameView<'_>, region: Rectangle) -> Result<(), DisplayError>;

    /// Set display brightness (0-255)
    ///
    /// Returns an error if the display doesn't support brightness control.
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let _ = value;
        if !self.capabilities().supports_brightness {
            return Err(DisplayError::UnsupportedOperation);
        }
        // Drivers with brightness support must override
        Err(DisplayError::UnsupportedOperation)
    }
}
