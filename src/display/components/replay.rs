/*
 *  display/components/replay.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Replay progress panel: frame-index to wall-time conversion and the
 *  progress bar drawn while the host is replaying
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
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;

/// What kind of media the host is replaying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayMode {
    #[default]
    Video,
    Audio,
    Dvd,
    Image,
}

/// Snapshot of the host's replay position
#[derive(Debug, Clone, Default)]
pub struct ReplayInfo {
    pub name: String,
    pub mode: ReplayMode,
    /// Current frame index
    pub index: i64,
    /// Total frame count, 0 when unknown
    pub total: i64,
    /// Frames per second of the material
    pub fps: f64,
}

/// True iff the elapsed time at `index` reaches one hour
pub fn index_reaches_hour(index: i64, fps: f64) -> bool {
    index_to_seconds(index, fps) >= 3600
}

fn index_to_seconds(index: i64, fps: f64) -> i64 {
    if fps <= 0.0 {
        return 0;
    }
    (index.max(0) as f64 / fps).round() as i64
}

/// Translate a replay frame index to wall time.
///
/// Durations under one hour read `MM:SS`; from one hour up the format
/// switches to `H:MM:SS`.
pub fn index_to_time(index: i64, fps: f64) -> String {
    let secs = index_to_seconds(index, fps);
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Parse a string produced by `index_to_time` back to a frame index with the
/// same frame rate. Returns None for malformed input.
pub fn time_to_index(s: &str, fps: f64) -> Option<i64> {
    let mut parts = s.split(':').rev();
    let secs: i64 = parts.next()?.parse().ok()?;
    let mins: i64 = parts.next()?.parse().ok()?;
    let hours: i64 = match parts.next() {
        Some(h) => h.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || secs >= 60 || mins >= 60 {
        return None;
    }
    let total_secs = hours * 3600 + mins * 60 + secs;
    Some((total_secs as f64 * fps).round() as i64)
}

/// Render the replay panel: name line, elapsed / total times, progress bar.
pub fn render<D>(replay: &ReplayInfo, target: &mut D, area: Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let x = area.top_left.x;
    let y = area.top_left.y;

    if !replay.name.is_empty() {
        Text::new(&replay.name, Point::new(x, y + 8), style).draw(target)?;
    }

    let elapsed = index_to_time(replay.index, replay.fps);
    Text::new(&elapsed, Point::new(x, y + 20), style).draw(target)?;

    if replay.total > 0 {
        let total = index_to_time(replay.total, replay.fps);
        let tx = x + area.size.width as i32 - (total.chars().count() as i32 * 6);
        Text::new(&total, Point::new(tx, y + 20), style).draw(target)?;

        // progress bar underneath the time line
        let bar_w = area.size.width.saturating_sub(2);
        let filled = ((replay.index.clamp(0, replay.total) as f64 / replay.total as f64)
            * bar_w as f64) as u32;
        Rectangle::new(Point::new(x, y + 24), Size::new(area.size.width, 6))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(target)?;
        if filled > 0 {
            Rectangle::new(Point::new(x + 1, y + 25), Size::new(filled, 4))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_an_hour_is_minutes_seconds() {
        let fps = 25.0;
        assert_eq!(index_to_time(0, fps), "00:00");
        assert_eq!(index_to_time((59 * 60 + 59) * 25, fps), "59:59");
        assert!(!index_reaches_hour((59 * 60 + 59) * 25, fps));
    }

    #[test]
    fn hour_boundary_switches_format() {
        let fps = 25.0;
        let one_hour = 3600 * 25;
        assert_eq!(index_to_time(one_hour, fps), "1:00:00");
        assert!(index_reaches_hour(one_hour, fps));
        assert_eq!(index_to_time(one_hour - 25, fps), "59:59");
    }

    #[test]
    fn round_trip_at_second_granularity() {
        for fps in [25.0, 50.0, 29.97] {
            for secs in [0i64, 1, 59, 61, 3599, 3600, 3661, 7325] {
                let index = (secs as f64 * fps).round() as i64;
                let formatted = index_to_time(index, fps);
                let parsed = time_to_index(&formatted, fps).unwrap();
                // one frame of rounding slack across format/parse
                assert!((parsed - index).abs() <= 1, "fps={} secs={}", fps, secs);
            }
        }
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(time_to_index("junk", 25.0), None);
        assert_eq!(time_to_index("10:99", 25.0), None);
        assert_eq!(time_to_index("1:2:3:4", 25.0), None);
    }
}
