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

use serde_json::{Map, Value};
use tracing::debug;

use super::coarse::{capability_objects, switching_aliases};
use super::{Channel, CoarseChannel, FixtureContext};
use crate::model::error::{FixtureError, Result};

/// The variable in template channel keys that stands for a pixel or pixel group key.
pub const PIXEL_KEY_VARIABLE: &str = "$pixelKey";

/// Replaces every `$pixelKey` in the string. The pixel key is inserted literally.
pub fn resolve_template_string(template: &str, pixel_key: &str) -> String {
    template.replace(PIXEL_KEY_VARIABLE, pixel_key)
}

/// Replaces `$pixelKey` in every string and object key of a JSON tree.
pub fn resolve_template_value(template: &Value, pixel_key: &str) -> Value {
    match template {
        Value::String(s) => Value::String(resolve_template_string(s, pixel_key)),
        Value::Array(values) => Value::Array(
            values
                .iter()
                .map(|value| resolve_template_value(value, pixel_key))
                .collect(),
        ),
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(key, value)| {
                    (
                        resolve_template_string(key, pixel_key),
                        resolve_template_value(value, pixel_key),
                    )
                })
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

/// Fails unless the key uses `$pixelKey` and has no other `$` variables.
fn validate_template_key(key: &str) -> Result<()> {
    let malformed = key
        .match_indices('$')
        .any(|(index, _)| !key[index..].starts_with(PIXEL_KEY_VARIABLE));
    if malformed || !key.contains(PIXEL_KEY_VARIABLE) {
        return Err(FixtureError::parse("template channel key", key));
    }
    Ok(())
}

/// A channel blueprint that is instantiated once per pixel and pixel group of the matrix.
#[derive(Debug)]
pub struct TemplateChannel {
    key: String,
    json: Value,
    fixture: Arc<FixtureContext>,
    fine_channel_aliases: Vec<String>,
    switching_channel_aliases: Vec<String>,
}

impl TemplateChannel {
    pub(crate) fn new(
        key: String,
        json: Value,
        fixture: Arc<FixtureContext>,
    ) -> Result<TemplateChannel> {
        validate_template_key(&key)?;
        if !json.is_object() {
            return Err(FixtureError::Json(format!(
                "template channel '{}' is not an object",
                key
            )));
        }

        let fine_channel_aliases: Vec<String> = json
            .get("fineChannelAliases")
            .and_then(Value::as_array)
            .map(|aliases| {
                aliases
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let switching_channel_aliases = switching_aliases(&capability_objects(&json));
        for alias in fine_channel_aliases.iter().chain(&switching_channel_aliases) {
            validate_template_key(alias)?;
        }

        Ok(TemplateChannel {
            key,
            json,
            fixture,
            fine_channel_aliases,
            switching_channel_aliases,
        })
    }

    /// Gets the template key, e.g. "Red $pixelKey".
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gets the unresolved name, defaulting to the key.
    pub fn name(&self) -> &str {
        self.json
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&self.key)
    }

    pub fn json(&self) -> &Value {
        &self.json
    }

    pub fn fine_channel_aliases(&self) -> &[String] {
        &self.fine_channel_aliases
    }

    pub fn switching_channel_aliases(&self) -> &[String] {
        &self.switching_channel_aliases
    }

    /// Gets the key of this template and of its fine and switching channels.
    pub fn all_template_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str())
            .chain(self.fine_channel_aliases.iter().map(String::as_str))
            .chain(self.switching_channel_aliases.iter().map(String::as_str))
    }

    /// Gets the channel keys this template generates for one pixel key.
    pub fn resolved_keys(&self, pixel_key: &str) -> Vec<String> {
        self.all_template_keys()
            .map(|key| resolve_template_string(key, pixel_key))
            .collect()
    }

    /// Instantiates the template for every given pixel key. Each coarse channel is followed by
    /// its fine and switching channels, all tagged with the pixel key.
    pub fn create_matrix_channels<'k>(
        &self,
        pixel_keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<Vec<Channel>> {
        let mut channels = Vec::new();
        for pixel_key in pixel_keys {
            let coarse = Arc::new(CoarseChannel::new(
                resolve_template_string(&self.key, pixel_key),
                &resolve_template_value(&self.json, pixel_key),
                Arc::clone(&self.fixture),
                Some(pixel_key.to_string()),
            )?);
            let fine_channels = coarse.fine_channels();
            let switching_channels = coarse.switching_channels();
            channels.push(Channel::Coarse(coarse));
            channels.extend(fine_channels.into_iter().map(Channel::Fine));
            channels.extend(switching_channels.into_iter().map(Channel::Switching));
        }
        debug!(
            fixture = self.fixture.key(),
            template = self.key.as_str(),
            count = channels.len(),
            "Expanded template channel"
        );
        Ok(channels)
    }
}
