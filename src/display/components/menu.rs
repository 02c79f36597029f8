/*
 *  display/components/menu.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Menu panel: scrolled item viewport, bounded tab-aligned columns and the
 *  color-button bar
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

use arrayvec::ArrayVec;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_13::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;

/// Upper bound on tab-aligned columns per menu
pub const MAX_TAB_COUNT: usize = 10;

const CHAR_WIDTH: u32 = 6;
const LINE_HEIGHT: i32 = 10;

/// One menu row, already split at tab characters.
#[derive(Debug, Clone, Default)]
pub struct MenuItem {
    pub columns: ArrayVec<String, MAX_TAB_COUNT>,
}

impl MenuItem {
    /// Split raw item text at tabs. Columns past the bound are folded into
    /// the last one rather than dropped, keeping the capacity invariant
    /// without losing text.
    pub fn parse(text: &str) -> Self {
        let mut columns: ArrayVec<String, MAX_TAB_COUNT> = ArrayVec::new();
        for part in text.split('\t') {
            if columns.is_full() {
                let last = columns.last_mut().unwrap();
                last.push(' ');
                last.push_str(part);
            } else {
                columns.push(part.to_string());
            }
        }
        Self { columns }
    }

    fn flat_text(&self) -> String {
        self.columns.join(" ")
    }
}

/// Scrolled window over the menu items.
///
/// Invariants: `top + visible <= total` once items are known, and every tab
/// index stays below `MAX_TAB_COUNT` by construction of `MenuItem`.
#[derive(Debug, Clone)]
pub struct MenuViewport {
    title: String,
    items: Vec<MenuItem>,
    top: usize,
    visible: usize,
    current: Option<usize>,
    tab_stops: ArrayVec<u32, MAX_TAB_COUNT>,
}

impl MenuViewport {
    pub fn new(visible: usize) -> Self {
        Self {
            title: String::new(),
            items: Vec::new(),
            top: 0,
            visible: visible.max(1),
            current: None,
            tab_stops: ArrayVec::new(),
        }
    }

    /// A new title starts a new menu page; items and scroll position reset.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.items.clear();
        self.top = 0;
        self.current = None;
        self.tab_stops.clear();
    }

    pub fn title(&self) -> &str { &self.title }
    pub fn top(&self) -> usize { self.top }
    pub fn visible(&self) -> usize { self.visible }
    pub fn total(&self) -> usize { self.items.len() }
    pub fn current(&self) -> Option<usize> { self.current }

    pub fn push_item(&mut self, text: &str) {
        self.items.push(MenuItem::parse(text));
    }

    /// Mark the item matching `text` current and scroll it into view.
    /// Unknown text leaves the selection untouched.
    pub fn set_current_item(&mut self, text: &str) {
        let needle = MenuItem::parse(text);
        let flat = needle.flat_text();
        if let Some(idx) = self.items.iter().position(|i| i.flat_text() == flat) {
            self.current = Some(idx);
            self.scroll_to(idx);
        }
    }

    fn scroll_to(&mut self, idx: usize) {
        if idx < self.top {
            self.top = idx;
        } else if idx >= self.top + self.visible {
            self.top = idx + 1 - self.visible;
        }
        self.clamp_top();
    }

    fn clamp_top(&mut self) {
        let max_top = self.items.len().saturating_sub(self.visible);
        if self.top > max_top {
            self.top = max_top;
        }
    }

    pub fn reset(&mut self) {
        self.set_title("");
    }

    /// Compute tab-stop pixel positions from the widest cell of each column
    /// across the visible window. The bound holds because items never carry
    /// more than `MAX_TAB_COUNT` columns.
    pub fn compute_tab_stops(&mut self, panel_width: u32) {
        self.clamp_top();
        let mut widths: ArrayVec<u32, MAX_TAB_COUNT> = ArrayVec::new();
        for item in self.items.iter().skip(self.top).take(self.visible) {
            for (col, text) in item.columns.iter().enumerate() {
                let w = text.chars().count() as u32 * CHAR_WIDTH + CHAR_WIDTH;
                if col == widths.len() {
                    widths.push(w);
                } else if w > widths[col] {
                    widths[col] = w;
                }
            }
        }

        self.tab_stops.clear();
        let mut x = 0u32;
        for w in widths {
            self.tab_stops.push(x.min(panel_width));
            x = (x + w).min(panel_width);
        }
    }

    pub fn tab_stops(&self) -> &[u32] { &self.tab_stops }

    /// The rows currently in the viewport, with their absolute indices
    pub fn visible_items(&self) -> impl Iterator<Item = (usize, &MenuItem)> {
        self.items
            .iter()
            .enumerate()
            .skip(self.top)
            .take(self.visible)
    }

    /// Render title, viewport rows and selection bar. Over-wide first columns
    /// of the current row are handled by the caller's scroller panel.
    pub fn render<D>(&self, target: &mut D, area: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let inverse = MonoTextStyle::new(&FONT_6X10, BinaryColor::Off);
        let x0 = area.top_left.x;
        let mut y = area.top_left.y + 8;

        if !self.title.is_empty() {
            Text::new(&self.title, Point::new(x0, y), style).draw(target)?;
            y += LINE_HEIGHT + 2;
        }

        for (row, (idx, item)) in self.visible_items().enumerate() {
            let row_y = y + row as i32 * LINE_HEIGHT;
            let selected = self.current == Some(idx);
            if selected {
                Rectangle::new(
                    Point::new(x0, row_y - 8),
                    Size::new(area.size.width, LINE_HEIGHT as u32),
                )
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(target)?;
            }
            for (col, text) in item.columns.iter().enumerate() {
                let cx = x0 + self.tab_stops.get(col).copied().unwrap_or(0) as i32;
                let s = if selected { inverse } else { style };
                Text::new(text, Point::new(cx, row_y), s).draw(target)?;
            }
        }
        Ok(())
    }
}

/// The four host color buttons rendered along the bottom edge.
#[derive(Debug, Clone, Default)]
pub struct ColorButtons {
    pub labels: [String; 4],
}

impl ColorButtons {
    pub fn set(&mut self, red: &str, green: &str, yellow: &str, blue: &str) {
        self.labels = [
            red.to_string(),
            green.to_string(),
            yellow.to_string(),
            blue.to_string(),
        ];
    }

    pub fn any(&self) -> bool {
        self.labels.iter().any(|l| !l.is_empty())
    }

    pub fn render<D>(&self, target: &mut D, area: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let cell = area.size.width / 4;
        let y = area.top_left.y + area.size.height as i32 - 2;
        for (i, label) in self.labels.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            let x = area.top_left.x + i as i32 * cell as i32;
            Rectangle::new(
                Point::new(x, area.top_left.y),
                Size::new(cell.saturating_sub(1), area.size.height),
            )
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(target)?;
            Text::new(label, Point::new(x + 2, y), style).draw(target)?;
        }
        Ok(())
    }
}
