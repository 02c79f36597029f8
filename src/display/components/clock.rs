/*
 *  display/components/clock.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clock panel with blinking colon
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

use chrono::{DateTime, Local, Timelike};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_13::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

/// Clock panel, drawn in the top-right corner of the Normal state.
pub struct ClockPanel {
    last_drawn: String,
}

impl ClockPanel {
    pub fn new() -> Self {
        Self { last_drawn: String::new() }
    }

    /// True when the displayed string would change for `now`
    pub fn is_dirty(&self, now: DateTime<Local>) -> bool {
        self.format(now) != self.last_drawn
    }

    fn format(&self, now: DateTime<Local>) -> String {
        // colon blinks on even seconds
        let sep = if now.second() % 2 == 0 { ':' } else { ' ' };
        format!("{:02}{}{:02}", now.hour(), sep, now.minute())
    }

    pub fn render<D>(&mut self, target: &mut D, now: DateTime<Local>, top_right: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let text = self.format(now);
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let x = top_right.x - text.chars().count() as i32 * 6;
        Text::new(&text, Point::new(x, top_right.y + 8), style).draw(target)?;
        self.last_drawn = text;
        Ok(())
    }
}

impl Default for ClockPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn colon_blinks_with_seconds() {
        let clock = ClockPanel::new();
        let even = Local.with_ymd_and_hms(2026, 1, 5, 9, 30, 4).unwrap();
        let odd = Local.with_ymd_and_hms(2026, 1, 5, 9, 30, 5).unwrap();
        assert_eq!(clock.format(even), "09:30");
        assert_eq!(clock.format(odd), "09 30");
    }

    #[test]
    fn dirty_tracks_rendered_text() {
        let mut clock = ClockPanel::new();
        let now = Local.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        assert!(clock.is_dirty(now));

        let mut surface = crate::display::framebuffer::RenderSurface::new(128, 64);
        clock.render(surface.canvas_mut(), now, Point::new(127, 0)).unwrap();
        assert!(!clock.is_dirty(now));

        let later = Local.with_ymd_and_hms(2026, 1, 5, 12, 0, 1).unwrap();
        assert!(clock.is_dirty(later));
    }
}
