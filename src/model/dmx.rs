// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use super::error::{FixtureError, Result};
use super::range::Range;

/// A DMX value resolution in bytes (1 = 8 bit, 2 = 16 bit, ...).
pub type Resolution = u8;

pub const RESOLUTION_8BIT: Resolution = 1;
pub const RESOLUTION_16BIT: Resolution = 2;
pub const RESOLUTION_24BIT: Resolution = 3;
pub const RESOLUTION_32BIT: Resolution = 4;

/// DMX values are held in a u32, so nothing finer than 32 bit can be represented.
pub const MAX_SUPPORTED_RESOLUTION: Resolution = RESOLUTION_32BIT;

/// Gets the highest DMX value at the given resolution, e.g. 255 for 8 bit.
pub fn max_dmx_value(resolution: Resolution) -> u32 {
    ((1u64 << (8 * u32::from(resolution))) - 1) as u32
}

/// Rescales a DMX value from one resolution to another.
///
/// Widening appends zero low bytes, narrowing drops low bytes, which always rounds toward zero.
/// The value must fit the current resolution.
pub fn scale_dmx_value(value: u32, current: Resolution, desired: Resolution) -> u32 {
    debug_assert!(value <= max_dmx_value(current));
    if desired >= current {
        value << (8 * u32::from(desired - current))
    } else {
        value >> (8 * u32::from(current - desired))
    }
}

/// Rescales a DMX range. Widening fills the low bytes of the range end with 255 so that
/// adjacent ranges stay adjacent at the higher resolution.
pub fn scale_dmx_range(range: Range, current: Resolution, desired: Resolution) -> Range {
    let start = scale_dmx_value(range.start(), current, desired);
    let mut end = scale_dmx_value(range.end(), current, desired);
    if desired > current {
        end |= max_dmx_value(desired - current);
    }
    // start <= end holds for both directions of scaling a valid range
    Range::new(start, end).unwrap_or(range)
}

/// Parses a resolution declaration like "8bit" or "16bit".
pub fn parse_resolution(literal: &str) -> Result<Resolution> {
    let resolution = match literal {
        "8bit" => RESOLUTION_8BIT,
        "16bit" => RESOLUTION_16BIT,
        "24bit" => RESOLUTION_24BIT,
        "32bit" => RESOLUTION_32BIT,
        _ => return Err(FixtureError::parse("DMX value resolution", literal)),
    };
    Ok(resolution)
}

/// Fails unless the resolution is within [1, max_resolution].
pub fn ensure_proper_resolution(resolution: Resolution, max_resolution: Resolution) -> Result<()> {
    if resolution < 1 || resolution > max_resolution {
        return Err(FixtureError::Range(format!(
            "resolution {} is not in range [1, {}]",
            resolution, max_resolution
        )));
    }
    Ok(())
}
