/*
 *  display/framebuffer.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized framebuffer plus the double-buffered render surface the
 *  scheduler draws into
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor + Clone> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Overwrite this buffer with another of identical geometry
    pub fn copy_from(&mut self, other: &VarFrameBuf<C>) {
        debug_assert_eq!(self.buf.len(), other.buf.len());
        self.buf.clone_from_slice(&other.buf);
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor + Clone> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }
        let (w, h) = (width as usize, height as usize);
        let mut it = colors.into_iter();

        // fast path for fills that lie entirely inside the buffer
        if area.top_left.x >= 0
            && area.top_left.y >= 0
            && area.top_left.x as usize + w <= self.w
            && area.top_left.y as usize + h <= self.h
        {
            let (x0, y0) = (area.top_left.x as usize, area.top_left.y as usize);
            for row in 0..h {
                let base = (y0 + row) * self.w + x0;
                for col in 0..w {
                    match it.next() {
                        Some(c) => self.buf[base + col] = c,
                        None => return Ok(()),
                    }
                }
            }
            return Ok(());
        }

        // clipping path: pixels outside the buffer still consume their color
        // so the in-bounds remainder of the area stays aligned
        for row in 0..h as i32 {
            for col in 0..w as i32 {
                let Some(c) = it.next() else { return Ok(()) };
                let p = Point::new(area.top_left.x + col, area.top_left.y + row);
                if let Some(i) = self.idx(p) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }
}

/// Read-only view of a finished frame, handed to the driver for flushing.
///
/// Borrows the surface pixels; drivers must not retain it past the flush call.
pub struct FrameView<'a> {
    pixels: &'a [BinaryColor],
    width: u32,
    height: u32,
}

impl<'a> FrameView<'a> {
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> BinaryColor {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Pack pixels into bytes, 8 pixels per byte, LSB first
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        let num_bytes = (self.pixels.len() + 7) / 8;
        let mut bytes = vec![0u8; num_bytes];
        for (i, &pixel) in self.pixels.iter().enumerate() {
            if pixel.is_on() {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        bytes
    }
}

/// Double-buffered render surface.
///
/// The canvas persists across frames so unchanged panels keep their pixels;
/// the shadow holds the previously flushed frame and is used to compute the
/// dirty region handed to the driver.
pub struct RenderSurface {
    canvas: VarFrameBuf<BinaryColor>,
    shadow: VarFrameBuf<BinaryColor>,
}

impl RenderSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: VarFrameBuf::new(width, height, BinaryColor::Off),
            shadow: VarFrameBuf::new(width, height, BinaryColor::Off),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.canvas.width() as u32, self.canvas.height() as u32)
    }

    /// The drawable canvas for this frame
    pub fn canvas_mut(&mut self) -> &mut VarFrameBuf<BinaryColor> {
        &mut self.canvas
    }

    pub fn clear(&mut self) {
        self.canvas.clear_color(BinaryColor::Off);
    }

    /// Read-only view of the finished canvas
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            pixels: self.canvas.as_slice(),
            width: self.canvas.width() as u32,
            height: self.canvas.height() as u32,
        }
    }

    pub fn full_region(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.canvas.size())
    }

    /// Bounding box of pixels that changed since the last `commit()`,
    /// or None when the frame is identical to what the device shows.
    pub fn dirty_region(&self) -> Option<Rectangle> {
        let w = self.canvas.width();
        let canvas = self.canvas.as_slice();
        let shadow = self.shadow.as_slice();

        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        let mut dirty = false;

        for (i, (a, b)) in canvas.iter().zip(shadow.iter()).enumerate() {
            if a != b {
                let (x, y) = (i % w, i / w);
                if x < min_x { min_x = x; }
                if y < min_y { min_y = y; }
                if x > max_x { max_x = x; }
                if y > max_y { max_y = y; }
                dirty = true;
            }
        }

        if !dirty {
            return None;
        }
        Some(Rectangle::new(
            Point::new(min_x as i32, min_y as i32),
            Size::new((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32),
        ))
    }

    /// Record the canvas as flushed
    pub fn commit(&mut self) {
        self.shadow.copy_from(&self.canvas);
    }
}
