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

use std::sync::{Arc, OnceLock};

use super::{Channel, CoarseChannel};
use crate::model::error::{memoized, Result};
use crate::model::range::Range;
use crate::model::registry::ChannelRegistry;

/// Which channels a switching channel stands for when looking it up by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchingChannelBehavior {
    /// Only the switching channel's own key.
    None,
    /// The switching channel's key or its default target.
    DefaultOnly,
    /// The switching channel's key or any target other than the default.
    SwitchedOnly,
    /// The switching channel's key or any of its targets.
    #[default]
    All,
}

/// A virtual channel whose function depends on the value of its trigger channel.
#[derive(Debug)]
pub struct SwitchingChannel {
    key: String,
    trigger_channel: Arc<CoarseChannel>,
    trigger_ranges: OnceLock<Result<Vec<(String, Vec<Range>)>>>,
}

impl SwitchingChannel {
    pub(crate) fn new(key: String, trigger_channel: Arc<CoarseChannel>) -> SwitchingChannel {
        SwitchingChannel {
            key,
            trigger_channel,
            trigger_ranges: OnceLock::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Switching channels are named after their alias.
    pub fn name(&self) -> &str {
        &self.key
    }

    pub fn trigger_channel(&self) -> &Arc<CoarseChannel> {
        &self.trigger_channel
    }

    /// Gets, per target channel key, the merged DMX ranges of the trigger channel (at its
    /// maximum resolution) for which that target is active. Targets are ordered by first use.
    pub fn trigger_ranges(&self) -> Result<&[(String, Vec<Range>)]> {
        memoized(&self.trigger_ranges, || {
            let mut grouped: Vec<(String, Vec<Range>)> = Vec::new();
            for capability in self.trigger_channel.capabilities()? {
                let Some(target) = capability.switch_channel_target(&self.key) else {
                    continue;
                };
                match grouped.iter_mut().find(|(key, _)| key == target) {
                    Some((_, ranges)) => ranges.push(capability.dmx_range()),
                    None => grouped.push((target.to_string(), vec![capability.dmx_range()])),
                }
            }
            Ok(grouped
                .into_iter()
                .map(|(key, ranges)| (key, Range::merge_ranges(&ranges)))
                .collect())
        })
        .map(Vec::as_slice)
    }

    /// Gets the keys of all channels this channel can switch to.
    pub fn switch_to_channel_keys(&self) -> Result<Vec<&str>> {
        Ok(self
            .trigger_ranges()?
            .iter()
            .map(|(key, _)| key.as_str())
            .collect())
    }

    /// Gets the target that is active at the trigger channel's default value. None means the
    /// definition is inconsistent, which is left to validation.
    pub fn default_channel_key(&self) -> Result<Option<&str>> {
        let default_value = self
            .trigger_channel
            .get_default_value_with_resolution(self.trigger_channel.max_resolution())?;
        Ok(self
            .trigger_ranges()?
            .iter()
            .find(|(_, ranges)| ranges.iter().any(|range| range.contains(default_value)))
            .map(|(key, _)| key.as_str()))
    }

    /// Looks up the target channels in the registry. Unknown keys map to None.
    pub fn switch_to_channels<'r>(
        &self,
        registry: &'r ChannelRegistry,
    ) -> Result<Vec<Option<&'r Channel>>> {
        Ok(self
            .switch_to_channel_keys()?
            .into_iter()
            .map(|key| registry.get(key))
            .collect())
    }

    /// Looks up the default target channel in the registry.
    pub fn default_channel<'r>(&self, registry: &'r ChannelRegistry) -> Result<Option<&'r Channel>> {
        Ok(self
            .default_channel_key()?
            .and_then(|key| registry.get(key)))
    }

    /// Returns true if this channel stands for the given target key under the given behavior.
    /// The channel's own key is not a target.
    pub fn uses_channel_key(&self, key: &str, behavior: SwitchingChannelBehavior) -> Result<bool> {
        let uses = match behavior {
            SwitchingChannelBehavior::None => false,
            SwitchingChannelBehavior::DefaultOnly => self.default_channel_key()? == Some(key),
            SwitchingChannelBehavior::SwitchedOnly => {
                self.default_channel_key()? != Some(key)
                    && self.switch_to_channel_keys()?.contains(&key)
            }
            SwitchingChannelBehavior::All => self.switch_to_channel_keys()?.contains(&key),
        };
        Ok(uses)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::model::channel::FixtureContext;

    fn trigger(json: Value) -> Arc<CoarseChannel> {
        let fixture = Arc::new(FixtureContext::new(
            "test".to_string(),
            "Test".to_string(),
            Vec::new(),
        ));
        Arc::new(CoarseChannel::new("Mode".to_string(), &json, fixture, None).unwrap())
    }

    #[test]
    fn test_default_channel_follows_trigger_default() {
        let mode = trigger(json!({
            "defaultValue": 200,
            "capabilities": [
                { "dmxRange": [0, 127], "type": "Generic", "switchChannels": { "Color": "Red" } },
                { "dmxRange": [128, 255], "type": "Generic", "switchChannels": { "Color": "Green" } }
            ]
        }));
        let switching = &mode.switching_channels()[0];
        assert_eq!(switching.key(), "Color");
        assert_eq!(switching.switch_to_channel_keys().unwrap(), vec!["Red", "Green"]);
        assert_eq!(switching.default_channel_key(), Ok(Some("Green")));

        assert!(!switching.uses_channel_key("Green", SwitchingChannelBehavior::None).unwrap());
        assert!(switching.uses_channel_key("Green", SwitchingChannelBehavior::DefaultOnly).unwrap());
        assert!(!switching.uses_channel_key("Red", SwitchingChannelBehavior::DefaultOnly).unwrap());
        assert!(switching.uses_channel_key("Red", SwitchingChannelBehavior::SwitchedOnly).unwrap());
        assert!(!switching.uses_channel_key("Green", SwitchingChannelBehavior::SwitchedOnly).unwrap());
        assert!(switching.uses_channel_key("Red", SwitchingChannelBehavior::All).unwrap());
        assert!(!switching.uses_channel_key("Blue", SwitchingChannelBehavior::All).unwrap());
    }

    #[test]
    fn test_trigger_ranges_merge_per_target() {
        let mode = trigger(json!({
            "capabilities": [
                { "dmxRange": [0, 63], "type": "Generic", "switchChannels": { "Sw": "A" } },
                { "dmxRange": [64, 127], "type": "Generic", "switchChannels": { "Sw": "A" } },
                { "dmxRange": [128, 191], "type": "Generic", "switchChannels": { "Sw": "B" } },
                { "dmxRange": [192, 255], "type": "Generic", "switchChannels": { "Sw": "A" } }
            ]
        }));
        let switching = &mode.switching_channels()[0];
        let ranges = switching.trigger_ranges().unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].0, "A");
        assert_eq!(
            ranges[0].1,
            vec![Range::new(0, 127).unwrap(), Range::new(192, 255).unwrap()]
        );
        assert_eq!(ranges[1].0, "B");
        assert_eq!(ranges[1].1, vec![Range::new(128, 191).unwrap()]);
        assert_eq!(switching.default_channel_key(), Ok(Some("A")));
    }

    #[test]
    fn test_trigger_ranges_at_max_resolution() {
        let mode = trigger(json!({
            "fineChannelAliases": ["Mode fine"],
            "dmxValueResolution": "8bit",
            "defaultValue": 128,
            "capabilities": [
                { "dmxRange": [0, 127], "type": "Generic", "switchChannels": { "Sw": "A" } },
                { "dmxRange": [128, 255], "type": "Generic", "switchChannels": { "Sw": "B" } }
            ]
        }));
        let switching = &mode.switching_channels()[0];
        let ranges = switching.trigger_ranges().unwrap();
        assert_eq!(ranges[1].1, vec![Range::new(32768, 65535).unwrap()]);
        assert_eq!(switching.default_channel_key(), Ok(Some("B")));
    }
}
