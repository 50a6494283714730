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

use std::sync::Arc;

use super::CoarseChannel;
use crate::model::dmx::{Resolution, RESOLUTION_16BIT};
use crate::model::error::Result;

/// A channel holding a lower byte of a multi-byte coarse channel.
#[derive(Debug)]
pub struct FineChannel {
    key: String,
    coarse_channel: Arc<CoarseChannel>,
    resolution: Resolution,
}

impl FineChannel {
    pub(crate) fn new(
        key: String,
        coarse_channel: Arc<CoarseChannel>,
        resolution: Resolution,
    ) -> FineChannel {
        FineChannel {
            key,
            coarse_channel,
            resolution,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gets the name: "<coarse> fine" for 16 bit, "<coarse> fine^<n>" for finer bytes.
    pub fn name(&self) -> String {
        if self.resolution > RESOLUTION_16BIT {
            format!(
                "{} fine^{}",
                self.coarse_channel.name(),
                self.resolution - 1
            )
        } else {
            format!("{} fine", self.coarse_channel.name())
        }
    }

    pub fn coarse_channel(&self) -> &Arc<CoarseChannel> {
        &self.coarse_channel
    }

    /// Gets the resolution at which this channel holds the lowest byte; 2 for the first fine
    /// channel.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Gets the byte of the coarse channel's default value that this channel transmits.
    pub fn default_value(&self) -> Result<u32> {
        let value = self
            .coarse_channel
            .get_default_value_with_resolution(self.resolution)?;
        Ok(value & 0xFF)
    }
}
