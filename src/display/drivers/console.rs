/*
 *  display/drivers/console.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Terminal display driver: renders frames as block characters so the
 *  daemon can run without panel hardware
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

use std::io::{self, Write};

use embedded_graphics::primitives::Rectangle;

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameView;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// Draws every flushed frame to stdout, two vertical pixels per character
/// cell using half-block glyphs.
pub struct ConsoleDriver {
    capabilities: DisplayCapabilities,
}

impl ConsoleDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                max_fps: 10,
                supports_brightness: false,
            },
        }
    }
}

impl DisplayDriver for ConsoleDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn flush(&mut self, frame: &FrameView<'_>, region: Rectangle) -> Result<(), DisplayError> {
        let mut out = io::stdout().lock();
        let mut buf = String::with_capacity((frame.width() as usize + 1) * frame.height() as usize / 2);

        // home the cursor instead of clearing to keep the output stable
        buf.push_str("\x1b[H");
        for y in (0..frame.height()).step_by(2) {
            for x in 0..frame.width() {
                let top = frame.pixel(x, y).is_on();
                let bottom = y + 1 < frame.height() && frame.pixel(x, y + 1).is_on();
                buf.push(match (top, bottom) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
            }
            buf.push('\n');
        }
        out.write_all(buf.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| DisplayError::FlushFailed(e.to_string()))?;

        log::trace!(
            "console flush, region {}x{} at ({}, {})",
            region.size.width, region.size.height, region.top_left.x, region.top_left.y
        );
        Ok(())
    }
}
