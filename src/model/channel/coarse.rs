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

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ChannelType, FineChannel, FixtureContext, SwitchingChannel};
use crate::model::capability::{Capability, CapabilityContext, CapabilityType};
use crate::model::dmx::{
    ensure_proper_resolution, max_dmx_value, parse_resolution, scale_dmx_value, Resolution,
    MAX_SUPPORTED_RESOLUTION,
};
use crate::model::error::{memoized, FixtureError, Result};
use crate::model::wheel::WheelType;

/// Which value wins when several sources control the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Precedence {
    /// Highest takes precedence.
    #[serde(rename = "HTP")]
    Htp,
    /// Latest takes precedence.
    #[default]
    #[serde(rename = "LTP")]
    Ltp,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DmxValueJson {
    Number(u32),
    Percent(String),
}

impl DmxValueJson {
    /// Resolves the value against the highest DMX value of the channel's DMX value resolution.
    fn resolve(&self, max_dmx_bound: u32) -> Result<u32> {
        match self {
            DmxValueJson::Number(value) => Ok(*value),
            DmxValueJson::Percent(literal) => {
                let percent = literal
                    .strip_suffix('%')
                    .and_then(|number| number.trim().parse::<f64>().ok())
                    .ok_or_else(|| FixtureError::parse("DMX value", literal.as_str()))?;
                Ok((f64::from(max_dmx_bound) * percent / 100.0).floor() as u32)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelJson {
    name: Option<String>,
    #[serde(default)]
    fine_channel_aliases: Vec<String>,
    dmx_value_resolution: Option<String>,
    default_value: Option<DmxValueJson>,
    highlight_value: Option<DmxValueJson>,
    #[serde(default)]
    precedence: Precedence,
    #[serde(default)]
    constant: bool,
    capability: Option<Value>,
    #[serde(default)]
    capabilities: Vec<Value>,
}

/// Collects the switching channel aliases of a list of capability objects in order of first use.
pub(crate) fn switching_aliases(capabilities: &[Value]) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    for capability in capabilities {
        let Some(switch_channels) = capability.get("switchChannels").and_then(Value::as_object)
        else {
            continue;
        };
        for alias in switch_channels.keys() {
            if !aliases.contains(alias) {
                aliases.push(alias.clone());
            }
        }
    }
    aliases
}

/// Gets the capability objects of a channel object, taking a single `capability` into account.
pub(crate) fn capability_objects(channel: &Value) -> Vec<Value> {
    match channel.get("capability") {
        Some(capability) => vec![capability.clone()],
        None => channel
            .get("capabilities")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

/// A channel that occupies its own DMX address and defines the capabilities of the channel
/// family, i.e. its fine and switching channels.
#[derive(Debug)]
pub struct CoarseChannel {
    key: String,
    json: Map<String, Value>,
    fixture: Arc<FixtureContext>,
    pixel_key: Option<String>,
    name: String,
    fine_channel_aliases: Vec<String>,
    switching_channel_aliases: Vec<String>,
    dmx_value_resolution: Resolution,
    max_resolution: Resolution,
    default_value: Option<u32>,
    highlight_value: Option<u32>,
    precedence: Precedence,
    constant: bool,
    capability_json: Vec<Value>,
    capabilities: OnceLock<Result<Vec<Capability>>>,
}

impl CoarseChannel {
    /// Creates a coarse channel. Matrix channels carry the pixel key they were generated for.
    pub(crate) fn new(
        key: String,
        json: &Value,
        fixture: Arc<FixtureContext>,
        pixel_key: Option<String>,
    ) -> Result<CoarseChannel> {
        let object = json.as_object().cloned().ok_or_else(|| {
            FixtureError::Json(format!("channel '{}' is not an object", key))
        })?;
        let channel = ChannelJson::deserialize(json)?;

        let resolution_count = channel.fine_channel_aliases.len() + 1;
        if resolution_count > usize::from(MAX_SUPPORTED_RESOLUTION) {
            return Err(FixtureError::Range(format!(
                "channel '{}' has {} fine channels, at most {} are supported",
                key,
                channel.fine_channel_aliases.len(),
                MAX_SUPPORTED_RESOLUTION - 1
            )));
        }
        let max_resolution = resolution_count as Resolution;
        let dmx_value_resolution = match &channel.dmx_value_resolution {
            Some(literal) => parse_resolution(literal)?,
            None => max_resolution,
        };
        ensure_proper_resolution(dmx_value_resolution, max_resolution)?;

        let max_dmx_bound = max_dmx_value(dmx_value_resolution);
        let default_value = channel
            .default_value
            .as_ref()
            .map(|value| value.resolve(max_dmx_bound))
            .transpose()?;
        let highlight_value = channel
            .highlight_value
            .as_ref()
            .map(|value| value.resolve(max_dmx_bound))
            .transpose()?;
        for (property, value) in [("default", default_value), ("highlight", highlight_value)] {
            if let Some(value) = value.filter(|value| *value > max_dmx_bound) {
                return Err(FixtureError::Range(format!(
                    "{} value {} of channel '{}' exceeds the highest DMX value {}",
                    property, value, key, max_dmx_bound
                )));
            }
        }

        let capability_json = match channel.capability {
            Some(capability) => vec![capability],
            None => channel.capabilities,
        };
        if capability_json.is_empty() {
            return Err(FixtureError::Json(format!(
                "channel '{}' has no capabilities",
                key
            )));
        }

        Ok(CoarseChannel {
            name: channel.name.unwrap_or_else(|| key.clone()),
            switching_channel_aliases: switching_aliases(&capability_json),
            key,
            json: object,
            fixture,
            pixel_key,
            fine_channel_aliases: channel.fine_channel_aliases,
            dmx_value_resolution,
            max_resolution,
            default_value,
            highlight_value,
            precedence: channel.precedence,
            constant: channel.constant,
            capability_json,
            capabilities: OnceLock::new(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn json(&self) -> &Map<String, Value> {
        &self.json
    }

    pub fn fixture(&self) -> &Arc<FixtureContext> {
        &self.fixture
    }

    /// Gets the pixel key if this channel was generated from a template channel, or overrides
    /// one generated channel.
    pub fn pixel_key(&self) -> Option<&str> {
        self.pixel_key.as_deref()
    }

    /// Gets the fine channel aliases, coarsest first.
    pub fn fine_channel_aliases(&self) -> &[String] {
        &self.fine_channel_aliases
    }

    /// Gets the fine channel alias that holds the lowest byte at the given resolution.
    pub fn fine_channel_alias(&self, resolution: Resolution) -> Option<&str> {
        usize::from(resolution)
            .checked_sub(2)
            .and_then(|index| self.fine_channel_aliases.get(index))
            .map(String::as_str)
    }

    /// Gets the aliases of the switching channels defined by this channel's capabilities.
    pub fn switching_channel_aliases(&self) -> &[String] {
        &self.switching_channel_aliases
    }

    /// Gets the resolution the DMX values of this channel are declared in.
    pub fn dmx_value_resolution(&self) -> Resolution {
        self.dmx_value_resolution
    }

    /// Gets the finest resolution of this channel: one byte plus one per fine channel.
    pub fn max_resolution(&self) -> Resolution {
        self.max_resolution
    }

    /// Gets the highest DMX value at the channel's DMX value resolution.
    pub fn max_dmx_bound(&self) -> u32 {
        max_dmx_value(self.dmx_value_resolution)
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    pub fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }

    /// Gets the default DMX value at the DMX value resolution; 0 if undeclared.
    pub fn default_value(&self) -> u32 {
        self.default_value.unwrap_or(0)
    }

    pub fn get_default_value_with_resolution(&self, resolution: Resolution) -> Result<u32> {
        ensure_proper_resolution(resolution, self.max_resolution)?;
        Ok(scale_dmx_value(
            self.default_value(),
            self.dmx_value_resolution,
            resolution,
        ))
    }

    pub fn has_highlight_value(&self) -> bool {
        self.highlight_value.is_some()
    }

    /// Gets the highlight DMX value at the DMX value resolution; the highest value if undeclared.
    pub fn highlight_value(&self) -> u32 {
        self.highlight_value.unwrap_or_else(|| self.max_dmx_bound())
    }

    pub fn get_highlight_value_with_resolution(&self, resolution: Resolution) -> Result<u32> {
        ensure_proper_resolution(resolution, self.max_resolution)?;
        Ok(scale_dmx_value(
            self.highlight_value(),
            self.dmx_value_resolution,
            resolution,
        ))
    }

    /// Gets the capabilities in declaration order, parsing them on first access.
    pub fn capabilities(&self) -> Result<&[Capability]> {
        memoized(&self.capabilities, || {
            let context = CapabilityContext {
                resolution: self.dmx_value_resolution,
                max_resolution: self.max_resolution,
                channel_name: &self.name,
                wheels: self.fixture.wheels(),
            };
            let capabilities = self
                .capability_json
                .iter()
                .map(|json| Capability::new(json, &context))
                .collect::<Result<Vec<_>>>()?;
            self.ensure_capabilities_tile(&capabilities)?;
            Ok(capabilities)
        })
        .map(Vec::as_slice)
    }

    /// Fails unless the capability ranges cover `[0, max_dmx_bound]` in declaration order,
    /// without gaps or overlaps.
    fn ensure_capabilities_tile(&self, capabilities: &[Capability]) -> Result<()> {
        let mut next_start = 0u64;
        for capability in capabilities {
            let range = capability.json_dmx_range();
            if u64::from(range.start()) != next_start {
                let problem = if u64::from(range.start()) > next_start {
                    "leaves a gap before"
                } else {
                    "overlaps"
                };
                return Err(FixtureError::Range(format!(
                    "capability {} of channel '{}' {} DMX value {}",
                    range, self.key, problem, next_start
                )));
            }
            next_start = u64::from(range.end()) + 1;
        }

        let bound = self.max_dmx_bound();
        if next_start != u64::from(bound) + 1 {
            return Err(FixtureError::Range(format!(
                "capabilities of channel '{}' end at {} instead of {}",
                self.key,
                next_start.saturating_sub(1),
                bound
            )));
        }
        Ok(())
    }

    pub fn is_help_wanted(&self) -> Result<bool> {
        Ok(self.capabilities()?.iter().any(Capability::is_help_wanted))
    }

    /// Creates the fine channels of this channel, coarsest first.
    pub fn fine_channels(self: &Arc<Self>) -> Vec<Arc<FineChannel>> {
        self.fine_channel_aliases
            .iter()
            .enumerate()
            .map(|(index, alias)| {
                Arc::new(FineChannel::new(
                    alias.clone(),
                    Arc::clone(self),
                    index as Resolution + 2,
                ))
            })
            .collect()
    }

    /// Creates the switching channels triggered by this channel.
    pub fn switching_channels(self: &Arc<Self>) -> Vec<Arc<SwitchingChannel>> {
        self.switching_channel_aliases
            .iter()
            .map(|alias| Arc::new(SwitchingChannel::new(alias.clone(), Arc::clone(self))))
            .collect()
    }

    /// Derives the channel type from the capabilities, ignoring NoFunction ranges.
    pub fn channel_type(&self) -> Result<ChannelType> {
        let functional: Vec<&Capability> = self
            .capabilities()?
            .iter()
            .filter(|capability| capability.capability_type() != CapabilityType::NoFunction)
            .collect();
        let Some(first) = functional.first() else {
            return Ok(ChannelType::Nothing);
        };

        if functional
            .iter()
            .all(|capability| capability.capability_type() == CapabilityType::ColorIntensity)
        {
            let single = functional
                .iter()
                .all(|capability| capability.color() == first.color());
            return Ok(if single {
                ChannelType::SingleColor
            } else {
                ChannelType::MultiColor
            });
        }

        let channel_type = match first.capability_type() {
            CapabilityType::Intensity => ChannelType::Intensity,
            CapabilityType::ColorIntensity | CapabilityType::ColorPreset => ChannelType::MultiColor,
            CapabilityType::ColorTemperature => ChannelType::ColorTemperature,
            CapabilityType::Pan | CapabilityType::PanContinuous => ChannelType::Pan,
            CapabilityType::Tilt | CapabilityType::TiltContinuous => ChannelType::Tilt,
            CapabilityType::PanTiltSpeed | CapabilityType::Speed | CapabilityType::Time => {
                ChannelType::Speed
            }
            CapabilityType::ShutterStrobe => {
                let strobes = functional.iter().any(|capability| {
                    capability.capability_type() == CapabilityType::ShutterStrobe
                        && !matches!(capability.shutter_effect(), Some("Open") | Some("Closed"))
                });
                if strobes {
                    ChannelType::Strobe
                } else {
                    ChannelType::Shutter
                }
            }
            CapabilityType::StrobeSpeed | CapabilityType::StrobeDuration => ChannelType::Strobe,
            CapabilityType::WheelSlot
            | CapabilityType::WheelShake
            | CapabilityType::WheelSlotRotation
            | CapabilityType::WheelRotation => {
                match first.wheels().first().map(|wheel| wheel.wheel_type()) {
                    Some(WheelType::Gobo) | Some(WheelType::AnimationGobo) => ChannelType::Gobo,
                    Some(WheelType::Prism) => ChannelType::Prism,
                    Some(WheelType::Iris) => ChannelType::Iris,
                    Some(WheelType::Frost) => ChannelType::Effect,
                    Some(WheelType::Color) | None => ChannelType::MultiColor,
                }
            }
            CapabilityType::Focus => ChannelType::Focus,
            CapabilityType::Zoom | CapabilityType::BeamAngle => ChannelType::Zoom,
            CapabilityType::Iris | CapabilityType::IrisEffect => ChannelType::Iris,
            CapabilityType::Prism | CapabilityType::PrismRotation => ChannelType::Prism,
            CapabilityType::Fog | CapabilityType::FogOutput | CapabilityType::FogType => {
                ChannelType::Fog
            }
            CapabilityType::Effect
            | CapabilityType::EffectSpeed
            | CapabilityType::EffectDuration
            | CapabilityType::EffectParameter
            | CapabilityType::SoundSensitivity
            | CapabilityType::Frost
            | CapabilityType::FrostEffect
            | CapabilityType::Rotation => ChannelType::Effect,
            CapabilityType::Maintenance => ChannelType::Maintenance,
            _ => ChannelType::Generic,
        };
        Ok(channel_type)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::range::Range;
    use crate::model::wheel::Wheel;

    fn fixture() -> Arc<FixtureContext> {
        Arc::new(FixtureContext::new(
            "test".to_string(),
            "Test".to_string(),
            Vec::new(),
        ))
    }

    fn channel(key: &str, json: Value) -> Arc<CoarseChannel> {
        Arc::new(CoarseChannel::new(key.to_string(), &json, fixture(), None).unwrap())
    }

    #[test]
    fn test_defaults() {
        let dimmer = channel("Dimmer", json!({ "capability": { "type": "Intensity" } }));
        assert_eq!(dimmer.name(), "Dimmer");
        assert_eq!(dimmer.dmx_value_resolution(), 1);
        assert_eq!(dimmer.max_resolution(), 1);
        assert_eq!(dimmer.default_value(), 0);
        assert!(!dimmer.has_default_value());
        assert_eq!(dimmer.highlight_value(), 255);
        assert_eq!(dimmer.precedence(), Precedence::Ltp);
        assert!(!dimmer.is_constant());
        assert_eq!(
            dimmer.capabilities().unwrap()[0].dmx_range(),
            Range::new(0, 255).unwrap()
        );
        assert_eq!(dimmer.channel_type(), Ok(ChannelType::Intensity));
    }

    #[test]
    fn test_percent_values_and_rescaling() {
        let pan = channel(
            "Pan",
            json!({
                "fineChannelAliases": ["Pan fine"],
                "defaultValue": "50%",
                "highlightValue": 1000,
                "precedence": "HTP",
                "capability": { "type": "Pan", "angleStart": "0deg", "angleEnd": "540deg" }
            }),
        );
        assert_eq!(pan.dmx_value_resolution(), 2);
        assert_eq!(pan.max_dmx_bound(), 65535);
        assert_eq!(pan.default_value(), 32767);
        assert_eq!(pan.get_default_value_with_resolution(1), Ok(127));
        assert_eq!(pan.get_highlight_value_with_resolution(2), Ok(1000));
        assert_eq!(pan.get_highlight_value_with_resolution(1), Ok(3));
        assert!(pan.get_default_value_with_resolution(3).is_err());
        assert_eq!(pan.precedence(), Precedence::Htp);
        assert_eq!(pan.fine_channel_alias(2), Some("Pan fine"));
        assert_eq!(pan.fine_channel_alias(1), None);
        assert_eq!(pan.channel_type(), Ok(ChannelType::Pan));
    }

    #[test]
    fn test_values_above_bound_are_rejected() {
        let result = CoarseChannel::new(
            "Tilt".to_string(),
            &json!({
                "fineChannelAliases": ["Tilt fine", "Tilt fine^2", "Tilt fine^3"],
                "dmxValueResolution": "8bit",
                "defaultValue": 300,
                "capability": { "type": "Tilt", "angle": "0deg" }
            }),
            fixture(),
            None,
        );
        assert!(matches!(result, Err(FixtureError::Range(message)) if message.contains("300")));

        let result = CoarseChannel::new(
            "Dimmer".to_string(),
            &json!({ "highlightValue": "120%", "capability": { "type": "Intensity" } }),
            fixture(),
            None,
        );
        assert!(matches!(result, Err(FixtureError::Range(_))));

        let widest = channel(
            "Pan",
            json!({
                "fineChannelAliases": ["Pan fine", "Pan fine^2", "Pan fine^3"],
                "dmxValueResolution": "8bit",
                "defaultValue": 255,
                "capability": { "type": "Pan", "angle": "0deg" }
            }),
        );
        assert_eq!(widest.get_default_value_with_resolution(4), Ok(0xFF00_0000));
    }

    #[test]
    fn test_declared_resolution_below_max() {
        let tilt = channel(
            "Tilt",
            json!({
                "fineChannelAliases": ["Tilt fine"],
                "dmxValueResolution": "8bit",
                "defaultValue": 128,
                "capabilities": [
                    { "dmxRange": [0, 127], "type": "Tilt", "angle": "0deg" },
                    { "dmxRange": [128, 255], "type": "Tilt", "angle": "90deg" }
                ]
            }),
        );
        assert_eq!(tilt.dmx_value_resolution(), 1);
        assert_eq!(tilt.max_resolution(), 2);
        assert_eq!(tilt.get_default_value_with_resolution(2), Ok(32768));
        let capabilities = tilt.capabilities().unwrap();
        assert_eq!(capabilities[1].dmx_range(), Range::new(32768, 65535).unwrap());
    }

    #[test]
    fn test_too_many_fine_channels() {
        let result = CoarseChannel::new(
            "Dimmer".to_string(),
            &json!({
                "fineChannelAliases": ["a", "b", "c", "d"],
                "capability": { "type": "Intensity" }
            }),
            fixture(),
            None,
        );
        assert!(matches!(result, Err(FixtureError::Range(_))));
    }

    #[test]
    fn test_bad_capability_is_memoized() {
        let dimmer = channel(
            "Dimmer",
            json!({ "capability": { "type": "Intensity", "brightness": "very bright" } }),
        );
        let first = dimmer.capabilities().err();
        assert!(matches!(first, Some(FixtureError::Parse { .. })));
        assert_eq!(dimmer.capabilities().err(), first);
    }

    #[test]
    fn test_children() {
        let color = channel(
            "Color",
            json!({
                "fineChannelAliases": ["Color fine", "Color fine^2"],
                "capabilities": [
                    { "dmxRange": [0, 8388607], "type": "Generic", "switchChannels": { "Sw": "A" } },
                    { "dmxRange": [8388608, 16777215], "type": "Generic", "switchChannels": { "Sw": "B", "Other": "C" } }
                ]
            }),
        );
        let fine: Vec<(String, Resolution)> = color
            .fine_channels()
            .iter()
            .map(|fine| (fine.key().to_string(), fine.resolution()))
            .collect();
        assert_eq!(
            fine,
            vec![("Color fine".to_string(), 2), ("Color fine^2".to_string(), 3)]
        );
        let switching: Vec<String> = color
            .switching_channels()
            .iter()
            .map(|switching| switching.key().to_string())
            .collect();
        assert_eq!(switching, vec!["Sw", "Other"]);
    }

    #[test]
    fn test_channel_types() {
        let red = channel(
            "Red",
            json!({ "capability": { "type": "ColorIntensity", "color": "Red" } }),
        );
        assert_eq!(red.channel_type(), Ok(ChannelType::SingleColor));

        let unused = channel("Unused", json!({ "capability": { "type": "NoFunction" } }));
        assert_eq!(unused.channel_type(), Ok(ChannelType::Nothing));

        let shutter = channel(
            "Shutter",
            json!({ "capabilities": [
                { "dmxRange": [0, 127], "type": "ShutterStrobe", "shutterEffect": "Closed" },
                { "dmxRange": [128, 255], "type": "ShutterStrobe", "shutterEffect": "Open" }
            ] }),
        );
        assert_eq!(shutter.channel_type(), Ok(ChannelType::Shutter));

        let wheel = Wheel::from_json(
            "Gobo Wheel",
            &json!({ "slots": [{ "type": "Open" }, { "type": "Gobo" }, { "type": "Gobo" }] }),
        )
        .unwrap();
        let context = Arc::new(FixtureContext::new(
            "test".to_string(),
            "Test".to_string(),
            vec![Arc::new(wheel)],
        ));
        let gobo = CoarseChannel::new(
            "Gobo Wheel".to_string(),
            &json!({ "capabilities": [
                { "dmxRange": [0, 127], "type": "WheelSlot", "slotNumber": 1 },
                { "dmxRange": [128, 255], "type": "WheelSlot", "slotNumber": 2 }
            ] }),
            context,
            None,
        )
        .unwrap();
        assert_eq!(gobo.channel_type(), Ok(ChannelType::Gobo));
    }
}
