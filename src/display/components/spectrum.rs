/*
 *  display/components/spectrum.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Spectrum-analyzer bars and the transient volume overlay
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

/// Normalized spectrum data as rendered: bands and peak caps in 0..=255
#[derive(Debug, Clone, Default)]
pub struct SpectrumSnapshot {
    pub bands: Vec<u8>,
    pub peaks: Vec<u8>,
}

/// Draw vertical bars with one-pixel peak caps across `area`.
/// Bands that do not fit the width are simply not drawn.
pub fn render_bars<D>(snap: &SpectrumSnapshot, target: &mut D, area: Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if snap.bands.is_empty() || area.size.height < 2 {
        return Ok(());
    }
    let slot = (area.size.width / snap.bands.len() as u32).max(1);
    let bar_w = slot.saturating_sub(1).max(1);
    let h = area.size.height;
    let base_y = area.top_left.y + h as i32;

    for (i, &level) in snap.bands.iter().enumerate() {
        let x = area.top_left.x + (i as u32 * slot) as i32;
        if x + bar_w as i32 > area.top_left.x + area.size.width as i32 {
            break;
        }
        let bar_h = (level as u32 * h) / 255;
        if bar_h > 0 {
            Rectangle::new(Point::new(x, base_y - bar_h as i32), Size::new(bar_w, bar_h))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(target)?;
        }
        if let Some(&peak) = snap.peaks.get(i) {
            let peak_h = (peak as u32 * h) / 255;
            if peak_h > bar_h {
                Rectangle::new(Point::new(x, base_y - peak_h as i32), Size::new(bar_w, 1))
                    .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                    .draw(target)?;
            }
        }
    }
    Ok(())
}

/// Horizontal volume bar, level 0..=100
pub fn render_volume<D>(level: u8, target: &mut D, area: Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Rectangle::new(area.top_left, area.size)
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)?;

    let inner_w = area.size.width.saturating_sub(2);
    let filled = (inner_w * level.min(100) as u32) / 100;
    if filled > 0 {
        Rectangle::new(
            Point::new(area.top_left.x + 1, area.top_left.y + 1),
            Size::new(filled, area.size.height.saturating_sub(2)),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::RenderSurface;

    #[test]
    fn bars_stay_inside_area() {
        let mut surface = RenderSurface::new(128, 64);
        let snap = SpectrumSnapshot {
            bands: vec![255; 20],
            peaks: vec![255; 20],
        };
        let area = Rectangle::new(Point::new(8, 16), Size::new(100, 32));
        render_bars(&snap, surface.canvas_mut(), area).unwrap();

        let view = surface.view();
        for y in 0..64 {
            for x in 0..128 {
                if view.pixel(x, y).is_on() {
                    assert!((8..108).contains(&(x as i32)));
                    assert!((16..48).contains(&(y as i32)));
                }
            }
        }
    }

    #[test]
    fn volume_fill_scales_with_level() {
        let mut surface = RenderSurface::new(64, 8);
        let area = Rectangle::new(Point::zero(), Size::new(64, 8));
        render_volume(50, surface.canvas_mut(), area).unwrap();
        let half = surface.view().to_packed_bytes().iter().map(|b| b.count_ones()).sum::<u32>();

        let mut surface_full = RenderSurface::new(64, 8);
        render_volume(100, surface_full.canvas_mut(), area).unwrap();
        let full = surface_full.view().to_packed_bytes().iter().map(|b| b.count_ones()).sum::<u32>();

        assert!(full > half);
    }
}
