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

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::channel::{
    Channel, CoarseChannel, FineChannel, FixtureContext, NullChannel, SwitchingChannel,
    TemplateChannel,
};
use super::error::{memoized, FixtureError, Result};
use super::matrix::Matrix;
use super::meta::{Manufacturer, Meta, Rdm};
use super::mode::{resolve_channel_keys, Mode, ModeJson};
use super::physical::Physical;
use super::registry::ChannelRegistry;
use super::wheel::Wheel;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureJson {
    name: String,
    short_name: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    meta: Meta,
    comment: Option<String>,
    help_wanted: Option<String>,
    #[serde(default)]
    links: Map<String, Value>,
    rdm: Option<Rdm>,
    physical: Option<Value>,
    matrix: Option<Value>,
    #[serde(default)]
    wheels: Map<String, Value>,
    #[serde(default)]
    available_channels: Map<String, Value>,
    #[serde(default)]
    template_channels: Map<String, Value>,
    modes: Vec<ModeJson>,
}

/// A fixture definition resolved into modes and channels.
///
/// Everything derived from the JSON is computed on first access and memoized, including
/// failures.
#[derive(Debug)]
pub struct Fixture {
    manufacturer: Manufacturer,
    context: Arc<FixtureContext>,
    json: Value,
    short_name: Option<String>,
    categories: Vec<String>,
    meta: Meta,
    comment: Option<String>,
    help_wanted: Option<String>,
    links: Vec<(String, Vec<String>)>,
    rdm: Option<Rdm>,
    physical: Option<Physical>,
    matrix_json: Option<Value>,
    available_channels_json: Map<String, Value>,
    template_channels_json: Map<String, Value>,
    modes_json: Vec<ModeJson>,

    matrix: OnceLock<Result<Option<Matrix>>>,
    template_channels: OnceLock<Result<Vec<TemplateChannel>>>,
    template_pixel_keys: OnceLock<Result<HashMap<String, String>>>,
    mode_channel_keys: OnceLock<Result<Vec<Vec<Option<String>>>>>,
    available_channels: OnceLock<Result<Vec<Arc<CoarseChannel>>>>,
    null_channels: OnceLock<Result<Vec<Arc<NullChannel>>>>,
    generated_matrix_channels: OnceLock<Result<Vec<Channel>>>,
    registry: OnceLock<Result<ChannelRegistry>>,
    modes: OnceLock<Result<Vec<Mode>>>,
    unique_channel_names: OnceLock<Result<HashMap<String, String>>>,
}

impl Fixture {
    /// Creates a fixture from its JSON definition. Wheels are parsed right away, everything
    /// else on first access.
    pub fn new(key: impl Into<String>, manufacturer: Manufacturer, json: Value) -> Result<Fixture> {
        let key = key.into();
        let fixture = FixtureJson::deserialize(&json)?;

        let wheels = fixture
            .wheels
            .iter()
            .map(|(name, wheel)| Wheel::from_json(name, wheel).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let links = fixture
            .links
            .into_iter()
            .map(|(link_type, urls)| -> Result<(String, Vec<String>)> {
                Ok((link_type, serde_json::from_value(urls)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Fixture {
            manufacturer,
            context: Arc::new(FixtureContext::new(key, fixture.name, wheels)),
            short_name: fixture.short_name,
            categories: fixture.categories,
            meta: fixture.meta,
            comment: fixture.comment,
            help_wanted: fixture.help_wanted,
            links,
            rdm: fixture.rdm,
            physical: Physical::from_json(fixture.physical.as_ref()),
            matrix_json: fixture.matrix,
            available_channels_json: fixture.available_channels,
            template_channels_json: fixture.template_channels,
            modes_json: fixture.modes,
            json,
            matrix: OnceLock::new(),
            template_channels: OnceLock::new(),
            template_pixel_keys: OnceLock::new(),
            mode_channel_keys: OnceLock::new(),
            available_channels: OnceLock::new(),
            null_channels: OnceLock::new(),
            generated_matrix_channels: OnceLock::new(),
            registry: OnceLock::new(),
            modes: OnceLock::new(),
            unique_channel_names: OnceLock::new(),
        })
    }

    pub fn key(&self) -> &str {
        self.context.key()
    }

    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// Gets the short name, defaulting to the name.
    pub fn short_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(self.context.name())
    }

    pub fn manufacturer(&self) -> &Manufacturer {
        &self.manufacturer
    }

    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Gets the context shared by all channels of this fixture.
    pub fn context(&self) -> &Arc<FixtureContext> {
        &self.context
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Gets the first category.
    pub fn main_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn help_wanted(&self) -> Option<&str> {
        self.help_wanted.as_deref()
    }

    /// Returns true if the fixture or any of its channels' capabilities asks for help.
    pub fn is_help_wanted(&self) -> Result<bool> {
        if self.help_wanted.is_some() {
            return Ok(true);
        }
        for channel in self.all_channels()? {
            if channel.is_help_wanted()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Gets the links by type, e.g. "manual" or "productPage".
    pub fn links(&self) -> &[(String, Vec<String>)] {
        &self.links
    }

    pub fn get_links_of_type(&self, link_type: &str) -> &[String] {
        self.links
            .iter()
            .find(|(t, _)| t == link_type)
            .map(|(_, urls)| urls.as_slice())
            .unwrap_or(&[])
    }

    pub fn rdm(&self) -> Option<&Rdm> {
        self.rdm.as_ref()
    }

    pub fn physical(&self) -> Option<&Physical> {
        self.physical.as_ref()
    }

    /// Gets the matrix, failing if the matrix JSON cannot be resolved.
    pub fn matrix(&self) -> Result<Option<&Matrix>> {
        memoized(&self.matrix, || {
            self.matrix_json.as_ref().map(Matrix::from_json).transpose()
        })
        .map(Option::as_ref)
    }

    pub fn wheels(&self) -> &[Arc<Wheel>] {
        self.context.wheels()
    }

    pub fn get_wheel_by_name(&self, name: &str) -> Option<&Arc<Wheel>> {
        self.context.get_wheel_by_name(name)
    }

    pub fn template_channels(&self) -> Result<&[TemplateChannel]> {
        memoized(&self.template_channels, || {
            self.template_channels_json
                .iter()
                .map(|(key, json)| {
                    TemplateChannel::new(key.clone(), json.clone(), Arc::clone(&self.context))
                })
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Gets the matrix, which a fixture with template channels must have.
    fn required_matrix(&self) -> Result<&Matrix> {
        self.matrix()?.ok_or_else(|| {
            FixtureError::Reference(format!(
                "fixture '{}' uses template channels but defines no matrix",
                self.key()
            ))
        })
    }

    /// Maps every key a template channel can generate to the pixel key it is generated for.
    fn template_pixel_keys(&self) -> Result<&HashMap<String, String>> {
        memoized(&self.template_pixel_keys, || {
            let mut pixel_keys = HashMap::new();
            let templates = self.template_channels()?;
            if templates.is_empty() {
                return Ok(pixel_keys);
            }
            let matrix = self.required_matrix()?;
            for template in templates {
                for pixel_key in matrix.pixel_and_group_keys() {
                    for key in template.resolved_keys(pixel_key) {
                        pixel_keys
                            .entry(key)
                            .or_insert_with(|| pixel_key.to_string());
                    }
                }
            }
            Ok(pixel_keys)
        })
    }

    /// Gets the author-declared coarse channels. A channel whose key a template channel would
    /// generate takes over that matrix channel's pixel key.
    pub fn available_channels(&self) -> Result<&[Arc<CoarseChannel>]> {
        memoized(&self.available_channels, || {
            let pixel_keys = self.template_pixel_keys()?;
            self.available_channels_json
                .iter()
                .map(|(key, json)| {
                    let pixel_key = pixel_keys.get(key).cloned();
                    if let Some(pixel_key) = &pixel_key {
                        debug!(
                            fixture = self.key(),
                            channel = key.as_str(),
                            pixel_key = pixel_key.as_str(),
                            "Available channel overrides matrix channel"
                        );
                    }
                    CoarseChannel::new(key.clone(), json, Arc::clone(&self.context), pixel_key)
                        .map(Arc::new)
                })
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Gets the channel keys of every mode, in mode order.
    fn mode_channel_keys(&self) -> Result<&[Vec<Option<String>>]> {
        memoized(&self.mode_channel_keys, || {
            self.modes_json
                .iter()
                .map(|mode| resolve_channel_keys(&mode.channels, || self.matrix()))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Gets the number of null channels of the mode that uses the most.
    pub fn null_channel_count(&self) -> Result<usize> {
        Ok(self
            .mode_channel_keys()?
            .iter()
            .map(|keys| keys.iter().filter(|key| key.is_none()).count())
            .max()
            .unwrap_or(0))
    }

    /// Gets the null channels, shared by all modes: the n-th unused slot of every mode is
    /// filled with the n-th null channel.
    pub fn null_channels(&self) -> Result<&[Arc<NullChannel>]> {
        memoized(&self.null_channels, || {
            (1..=self.null_channel_count()?)
                .map(|number| NullChannel::new(number, Arc::clone(&self.context)).map(Arc::new))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Gets every channel the template channels generate, before overriding and pruning.
    pub fn generated_matrix_channels(&self) -> Result<&[Channel]> {
        memoized(&self.generated_matrix_channels, || {
            let templates = self.template_channels()?;
            if templates.is_empty() {
                return Ok(Vec::new());
            }
            let matrix = self.required_matrix()?;
            let mut channels = Vec::new();
            for template in templates {
                channels.extend(template.create_matrix_channels(matrix.pixel_and_group_keys())?);
            }
            Ok(channels)
        })
        .map(Vec::as_slice)
    }

    /// Gets the channel registry: available channels with their fine and switching channels,
    /// then the null channels, then the matrix channels that some mode uses.
    pub fn all_channels_by_key(&self) -> Result<&ChannelRegistry> {
        memoized(&self.registry, || self.build_registry())
    }

    fn build_registry(&self) -> Result<ChannelRegistry> {
        let mut registry = ChannelRegistry::default();
        for coarse in self.available_channels()? {
            let fine_channels = coarse.fine_channels();
            let switching_channels = coarse.switching_channels();
            registry.insert(Channel::Coarse(Arc::clone(coarse)));
            for fine in fine_channels {
                registry.insert(Channel::Fine(fine));
            }
            for switching in switching_channels {
                registry.insert(Channel::Switching(switching));
            }
        }
        for null in self.null_channels()? {
            registry.insert(Channel::Null(Arc::clone(null)));
        }

        let mut candidates: HashMap<&str, &Channel> = HashMap::new();
        for channel in self.generated_matrix_channels()? {
            if registry.contains_key(channel.key()) {
                debug!(
                    fixture = self.key(),
                    channel = channel.key(),
                    "Dropping matrix channel in favor of available channel"
                );
                continue;
            }
            candidates.entry(channel.key()).or_insert(channel);
        }

        let mut included = 0;
        for keys in self.mode_channel_keys()? {
            for key in keys.iter().flatten() {
                let switching = match registry.get(key) {
                    Some(channel) => channel.as_switching().cloned(),
                    None => match candidates.get(key.as_str()) {
                        Some(channel) => {
                            registry.insert((*channel).clone());
                            included += 1;
                            channel.as_switching().cloned()
                        }
                        None => None,
                    },
                };
                let Some(switching) = switching else {
                    continue;
                };
                for target in switching.switch_to_channel_keys()? {
                    if registry.contains_key(target) {
                        continue;
                    }
                    if let Some(channel) = candidates.get(target) {
                        registry.insert((*channel).clone());
                        included += 1;
                    }
                }
            }
        }
        debug!(
            fixture = self.key(),
            included,
            pruned = candidates.len() - included,
            "Resolved matrix channels"
        );
        Ok(registry)
    }

    /// Gets all channels in registry order.
    pub fn all_channels(&self) -> Result<&[Channel]> {
        Ok(self.all_channels_by_key()?.channels())
    }

    pub fn get_channel_by_key(&self, key: &str) -> Result<Option<&Channel>> {
        Ok(self.all_channels_by_key()?.get(key))
    }

    /// Gets the coarse channels of the registry, including matrix channels but not null channels.
    pub fn coarse_channels(&self) -> Result<Vec<&Arc<CoarseChannel>>> {
        Ok(self.all_channels()?.iter().filter_map(Channel::as_coarse).collect())
    }

    pub fn fine_channels(&self) -> Result<Vec<&Arc<FineChannel>>> {
        Ok(self
            .all_channels()?
            .iter()
            .filter_map(|channel| match channel {
                Channel::Fine(fine) => Some(fine),
                _ => None,
            })
            .collect())
    }

    pub fn switching_channels(&self) -> Result<Vec<&Arc<SwitchingChannel>>> {
        Ok(self
            .all_channels()?
            .iter()
            .filter_map(Channel::as_switching)
            .collect())
    }

    /// Gets the registry channels that belong to a pixel, i.e. used matrix channels and
    /// available channels overriding one.
    pub fn matrix_channels(&self) -> Result<Vec<&Channel>> {
        Ok(self
            .all_channels()?
            .iter()
            .filter(|channel| channel.pixel_key().is_some())
            .collect())
    }

    /// Gets the modes in declaration order.
    pub fn modes(&self) -> Result<&[Mode]> {
        memoized(&self.modes, || {
            let registry = self.all_channels_by_key()?;
            let null_channels = self.null_channels()?;
            let modes: Vec<Mode> = self
                .modes_json
                .iter()
                .zip(self.mode_channel_keys()?)
                .map(|(json, keys)| {
                    let mut nulls = null_channels.iter();
                    let channels = keys
                        .iter()
                        .map(|key| match key {
                            Some(key) => registry.get(key).cloned(),
                            None => nulls.next().map(|null| Channel::Null(Arc::clone(null))),
                        })
                        .collect();
                    Mode::new(json, self.physical.as_ref(), keys.clone(), channels)
                })
                .collect();
            Ok(modes)
        })
        .map(Vec::as_slice)
    }

    pub fn get_mode_by_name(&self, name: &str) -> Result<Option<&Mode>> {
        Ok(self
            .modes()?
            .iter()
            .find(|mode| mode.name() == name || mode.short_name() == name))
    }

    /// Gets a unique name for every channel key. Channels sharing a name are numbered in
    /// registry order.
    pub fn unique_channel_names(&self) -> Result<&HashMap<String, String>> {
        memoized(&self.unique_channel_names, || {
            let channels = self.all_channels()?;
            let mut keys_by_name: Vec<(String, Vec<&str>)> = Vec::new();
            for channel in channels {
                let name = channel.name();
                match keys_by_name.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, keys)) => keys.push(channel.key()),
                    None => keys_by_name.push((name, vec![channel.key()])),
                }
            }

            let mut names = HashMap::new();
            for (name, keys) in keys_by_name {
                if keys.len() == 1 {
                    names.insert(keys[0].to_string(), name);
                    continue;
                }
                for (index, key) in keys.iter().enumerate() {
                    names.insert(key.to_string(), format!("{} {}", name, index + 1));
                }
            }
            Ok(names)
        })
    }

    pub fn unique_channel_name(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.unique_channel_names()?.get(key).map(String::as_str))
    }
}
