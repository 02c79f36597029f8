/*
 *  lib.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Background rendering engine for host-driven character/graphic LCDs:
 *  a debounced update scheduler, a three-state frame composer and the
 *  Span capability protocol for spectrum data
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

pub mod assets;
pub mod brightness;
pub mod config;
pub mod display;
pub mod span;

pub use display::{DisplayError, DisplayState, Engine, EngineConfig, EngineHandle};
pub use span::{SpanError, SpanRequest, SpanResponse};
