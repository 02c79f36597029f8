/*
 *  display/components/scroller.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Marquee scrolling for text fields that exceed their visible width
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

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_13::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

/// Advance per tick in pixels
const SCROLL_STEP: i32 = 1;

/// Approximate glyph advance for FONT_6X10
const CHAR_WIDTH: i32 = 6;

/// Gap between the end of the text and its looped repeat
pub const LOOP_GAP: i32 = 12;

/// Scroll state for one line of text.
///
/// The offset only ever resets when the text itself changes; repeated
/// assignment of identical text leaves the marquee running undisturbed.
#[derive(Debug, Clone)]
pub struct ScrollerEntry {
    text: String,
    offset: i32,
    visible_width: u32,
    ticks: u32,
}

impl ScrollerEntry {
    pub fn new(visible_width: u32) -> Self {
        Self {
            text: String::new(),
            offset: 0,
            visible_width,
            ticks: 0,
        }
    }

    /// Replace the text. Returns true when the incoming text differed and
    /// scroll state was reset.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        self.offset = 0;
        self.ticks = 0;
        true
    }

    pub fn text(&self) -> &str { &self.text }
    pub fn offset(&self) -> i32 { self.offset }
    pub fn ticks(&self) -> u32 { self.ticks }
    pub fn visible_width(&self) -> u32 { self.visible_width }

    fn pixel_width(&self) -> i32 {
        self.text.chars().count() as i32 * CHAR_WIDTH
    }

    /// True when the text does not fit and must scroll
    pub fn needs_scroll(&self) -> bool {
        self.pixel_width() > self.visible_width as i32
    }

    /// Advance the marquee one step, wrapping after the text has scrolled
    /// fully past the visible width plus the inter-loop gap.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        if !self.needs_scroll() {
            self.offset = 0;
            return;
        }
        self.offset -= SCROLL_STEP;
        if self.offset < -(self.pixel_width() + LOOP_GAP) {
            self.offset = 0;
        }
    }

    /// Render at the given origin (text baseline), drawing the looped repeat
    /// so the marquee is continuous.
    pub fn render<D>(&self, target: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if self.text.is_empty() {
            return Ok(());
        }
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let x = origin.x + self.offset;
        Text::new(&self.text, Point::new(x, origin.y), style).draw(target)?;

        if self.needs_scroll() {
            let loop_x = x + self.pixel_width() + LOOP_GAP;
            Text::new(&self.text, Point::new(loop_x, origin.y), style).draw(target)?;
        }
        Ok(())
    }
}

/// An ordered set of scrollers backing a multi-line text panel.
pub struct ScrollerSet {
    entries: Vec<ScrollerEntry>,
    visible_width: u32,
}

impl ScrollerSet {
    pub fn new(visible_width: u32) -> Self {
        Self { entries: Vec::new(), visible_width }
    }

    pub fn entries(&self) -> &[ScrollerEntry] { &self.entries }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Compare the incoming ordered lines against the stored ones.
    /// Any difference in length or content counts as changed.
    pub fn lines_changed(&self, lines: &[String]) -> bool {
        if self.entries.len() != lines.len() {
            return true;
        }
        self.entries.iter().zip(lines.iter()).any(|(e, l)| e.text() != l)
    }

    /// Feed new lines. On any difference every entry is rebuilt with scroll
    /// state reset; identical input leaves the marquees running.
    /// Returns true when a reset occurred.
    pub fn update(&mut self, lines: &[String]) -> bool {
        if !self.lines_changed(lines) {
            return false;
        }
        self.entries = lines
            .iter()
            .map(|l| {
                let mut e = ScrollerEntry::new(self.visible_width);
                e.set_text(l);
                e
            })
            .collect();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Advance every marquee one step
    pub fn tick(&mut self) {
        for e in &mut self.entries {
            e.tick();
        }
    }

    /// Render lines stacked from `origin`, `line_height` pixels apart
    pub fn render<D>(&self, target: &mut D, origin: Point, line_height: i32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        for (i, e) in self.entries.iter().enumerate() {
            e.render(target, Point::new(origin.x, origin.y + i as i32 * line_height))?;
        }
        Ok(())
    }
}
