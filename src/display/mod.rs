/*
 *  display/mod.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem: render engine, scheduler, framebuffer and drivers
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

pub mod components;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod scheduler;
pub mod traits;

pub use engine::{DisplayState, Engine, EngineConfig, EngineHandle};
pub use error::DisplayError;
pub use traits::{DisplayCapabilities, DisplayDriver};
