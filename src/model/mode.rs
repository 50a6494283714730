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

use serde::Deserialize;
use serde_json::Value;

use super::channel::{resolve_template_string, Channel, SwitchingChannelBehavior};
use super::error::{FixtureError, Result};
use super::matrix::{Axis, Matrix};
use super::physical::Physical;

/// The raw JSON of a mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModeJson {
    pub name: String,
    pub short_name: Option<String>,
    pub rdm_personality_index: Option<u32>,
    pub physical: Option<Value>,
    pub channels: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertBlockJson {
    insert: String,
    repeat_for: Value,
    channel_order: String,
    template_channels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelOrder {
    PerPixel,
    PerChannel,
}

/// Expands a mode's raw channel list into channel keys. Null entries stay None. The matrix is
/// only requested if the list contains a matrix insert block.
pub(crate) fn resolve_channel_keys<'m>(
    entries: &[Value],
    matrix: impl Fn() -> Result<Option<&'m Matrix>>,
) -> Result<Vec<Option<String>>> {
    let mut keys = Vec::new();
    for entry in entries {
        match entry {
            Value::Null => keys.push(None),
            Value::String(key) => keys.push(Some(key.clone())),
            Value::Object(_) => {
                let block = InsertBlockJson::deserialize(entry)?;
                let matrix = matrix()?.ok_or_else(|| {
                    FixtureError::Reference(
                        "matrix channels are inserted into a mode of a fixture without matrix"
                            .to_string(),
                    )
                })?;
                keys.extend(expand_insert_block(&block, matrix)?.into_iter().map(Some));
            }
            other => {
                return Err(FixtureError::Json(format!(
                    "mode channel is neither a key, null nor an insert block: {}",
                    other
                )))
            }
        }
    }
    Ok(keys)
}

fn repeat_for_keys<'m>(repeat_for: &'m Value, matrix: &'m Matrix) -> Result<Vec<&'m str>> {
    match repeat_for {
        Value::Array(keys) => keys
            .iter()
            .map(|key| {
                key.as_str()
                    .ok_or_else(|| FixtureError::parse("repeatFor", key.to_string()))
            })
            .collect(),
        Value::String(keyword) if keyword == "eachPixelABC" => {
            Ok(matrix.pixel_keys().iter().map(String::as_str).collect())
        }
        Value::String(keyword) if keyword == "eachPixelGroup" => {
            Ok(matrix.pixel_group_keys().collect())
        }
        Value::String(keyword) => {
            let order = keyword
                .strip_prefix("eachPixel")
                .ok_or_else(|| FixtureError::parse("repeatFor", keyword.as_str()))?;
            let [a, b, c] = Axis::parse_order(order)
                .map_err(|_| FixtureError::parse("repeatFor", keyword.as_str()))?;
            Ok(matrix.get_pixel_keys_by_order(a, b, c))
        }
        other => Err(FixtureError::parse("repeatFor", other.to_string())),
    }
}

fn expand_insert_block(block: &InsertBlockJson, matrix: &Matrix) -> Result<Vec<String>> {
    if block.insert != "matrixChannels" {
        return Err(FixtureError::parse("insert block", block.insert.as_str()));
    }
    let order = match block.channel_order.as_str() {
        "perPixel" => ChannelOrder::PerPixel,
        "perChannel" => ChannelOrder::PerChannel,
        other => return Err(FixtureError::parse("channelOrder", other)),
    };
    let pixel_keys = repeat_for_keys(&block.repeat_for, matrix)?;

    let mut keys = Vec::with_capacity(pixel_keys.len() * block.template_channels.len());
    match order {
        ChannelOrder::PerPixel => {
            for pixel_key in &pixel_keys {
                for template in &block.template_channels {
                    keys.push(resolve_template_string(template, pixel_key));
                }
            }
        }
        ChannelOrder::PerChannel => {
            for template in &block.template_channels {
                for pixel_key in &pixel_keys {
                    keys.push(resolve_template_string(template, pixel_key));
                }
            }
        }
    }
    Ok(keys)
}

/// One channel layout a fixture can be operated in.
#[derive(Debug, Clone)]
pub struct Mode {
    name: String,
    short_name: Option<String>,
    rdm_personality_index: Option<u32>,
    physical_override: Option<Physical>,
    physical: Option<Physical>,
    channel_keys: Vec<Option<String>>,
    channels: Vec<Option<Channel>>,
}

impl Mode {
    pub(crate) fn new(
        json: &ModeJson,
        fixture_physical: Option<&Physical>,
        channel_keys: Vec<Option<String>>,
        channels: Vec<Option<Channel>>,
    ) -> Mode {
        let physical_override = Physical::from_json(json.physical.as_ref());
        Mode {
            name: json.name.clone(),
            short_name: json.short_name.clone(),
            rdm_personality_index: json.rdm_personality_index,
            physical: Physical::merged(fixture_physical, physical_override.as_ref()),
            physical_override,
            channel_keys,
            channels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the short name, defaulting to the name.
    pub fn short_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }

    pub fn rdm_personality_index(&self) -> Option<u32> {
        self.rdm_personality_index
    }

    /// Gets the mode's own physical data.
    pub fn physical_override(&self) -> Option<&Physical> {
        self.physical_override.as_ref()
    }

    /// Gets the fixture's physical data merged with the mode's override.
    pub fn physical(&self) -> Option<&Physical> {
        self.physical.as_ref()
    }

    /// Gets the channel keys with expanded insert blocks; None marks an unused slot.
    pub fn channel_keys(&self) -> &[Option<String>] {
        &self.channel_keys
    }

    /// Gets the channels. Unused slots hold null channels; keys that name no channel of the
    /// fixture are None.
    pub fn channels(&self) -> &[Option<Channel>] {
        &self.channels
    }

    pub fn null_channel_count(&self) -> usize {
        self.channel_keys.iter().filter(|key| key.is_none()).count()
    }

    /// Gets the index of a channel. A switching channel also matches the target keys selected
    /// by `behavior`.
    pub fn get_channel_index(
        &self,
        key: &str,
        behavior: SwitchingChannelBehavior,
    ) -> Result<Option<usize>> {
        for (index, channel) in self.channels.iter().enumerate() {
            let Some(channel) = channel else {
                continue;
            };
            if channel.key() == key {
                return Ok(Some(index));
            }
            if let Channel::Switching(switching) = channel {
                if switching.uses_channel_key(key, behavior)? {
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }
}
