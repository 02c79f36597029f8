/*
 *  display/error.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the display subsystem
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

use std::fmt;
use std::error::Error;

/// Unified error type for all display operations
#[derive(Debug)]
pub enum DisplayError {
    /// Pushing a frame to the device failed
    FlushFailed(String),

    /// The flush region does not lie within the device geometry
    InvalidRegion { x: i32, y: i32, width: u32, height: u32 },

    /// Frame geometry does not match the device geometry
    GeometryMismatch { expected: (u32, u32), actual: (u32, u32) },

    /// Unsupported operation for this display
    UnsupportedOperation,

    /// The engine has been marked inactive after repeated flush failures
    /// and must be explicitly reactivated
    Inactive,

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::FlushFailed(msg) =>
                write!(f, "Display flush failed: {}", msg),
            DisplayError::InvalidRegion { x, y, width, height } =>
                write!(f, "Flush region out of bounds: {}x{} at ({}, {})", width, height, x, y),
            DisplayError::GeometryMismatch { expected, actual } =>
                write!(f, "Frame geometry mismatch: expected {}x{}, got {}x{}",
                       expected.0, expected.1, actual.0, actual.1),
            DisplayError::UnsupportedOperation =>
                write!(f, "Operation not supported by this display"),
            DisplayError::Inactive =>
                write!(f, "Display engine is inactive; reactivate before use"),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {}
