/*
 *  display/components/symbols.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Status symbol strip and the channel logo panel
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

use crate::assets::AssetRaster;

/// Which status symbols are lit this frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSymbols {
    pub recording: bool,
    pub muted: bool,
    pub replaying: bool,
}

impl StatusSymbols {
    pub fn any(&self) -> bool {
        self.recording || self.muted || self.replaying
    }

    /// Glyph strip, drawn right-aligned. Falls back to single characters so
    /// a missing symbol asset degrades to text rather than a blank strip.
    pub fn render<D>(&self, target: &mut D, top_right: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let mut strip = String::new();
        if self.recording { strip.push('R'); }
        if self.replaying { strip.push('>'); }
        if self.muted { strip.push('M'); }
        if strip.is_empty() {
            return Ok(());
        }
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let x = top_right.x - strip.chars().count() as i32 * 6;
        Text::new(&strip, Point::new(x, top_right.y + 8), style).draw(target)?;
        Ok(())
    }
}

/// Blit a resolved logo raster at `origin`. The raster rows are packed
/// 1bpp, MSB first, as the asset store hands them out.
pub fn render_logo<D>(raster: &AssetRaster, target: &mut D, origin: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let stride = (raster.width as usize + 7) / 8;
    let pixels = (0..raster.height).flat_map(move |y| {
        (0..raster.width).filter_map(move |x| {
            let byte = raster.bits.get(y as usize * stride + x as usize / 8)?;
            let on = byte & (0x80 >> (x % 8)) != 0;
            on.then(|| {
                Pixel(
                    Point::new(origin.x + x as i32, origin.y + y as i32),
                    BinaryColor::On,
                )
            })
        })
    });
    target.draw_iter(pixels)
}
