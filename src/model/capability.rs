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

use serde::Deserialize;
use serde_json::{Map, Value};

use super::dmx::{
    ensure_proper_resolution, max_dmx_value, scale_dmx_range, scale_dmx_value, Resolution,
};
use super::entity::Entity;
use super::error::{FixtureError, Result};
use super::range::Range;
use super::wheel::{Wheel, WheelSlot};
use crate::util::split_pascal_case;

/// The semantic type of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum CapabilityType {
    NoFunction,
    ShutterStrobe,
    StrobeSpeed,
    StrobeDuration,
    Intensity,
    ColorIntensity,
    ColorPreset,
    ColorTemperature,
    Pan,
    PanContinuous,
    Tilt,
    TiltContinuous,
    PanTiltSpeed,
    WheelSlot,
    WheelShake,
    WheelSlotRotation,
    WheelRotation,
    Effect,
    EffectSpeed,
    EffectDuration,
    EffectParameter,
    SoundSensitivity,
    BeamAngle,
    BeamPosition,
    Focus,
    Zoom,
    Iris,
    IrisEffect,
    Frost,
    FrostEffect,
    Prism,
    PrismRotation,
    BladeInsertion,
    BladeRotation,
    BladeSystemRotation,
    Fog,
    FogOutput,
    FogType,
    Rotation,
    Speed,
    Time,
    Maintenance,
    Generic,
}

impl CapabilityType {
    /// Returns true for the capability types that reference wheel slots or wheels.
    pub fn uses_wheels(&self) -> bool {
        matches!(
            self,
            CapabilityType::WheelSlot
                | CapabilityType::WheelShake
                | CapabilityType::WheelSlotRotation
                | CapabilityType::WheelRotation
        )
    }
}

/// Which DMX value a lighting console should send when the capability is clicked in a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuClick {
    #[default]
    Start,
    Center,
    End,
    Hidden,
}

/// Capability properties that hold an entity, either as a single value or as a
/// `<property>Start` / `<property>End` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityProperty {
    Speed,
    Duration,
    Time,
    Distance,
    Brightness,
    Angle,
    HorizontalAngle,
    VerticalAngle,
    ColorTemperature,
    SoundSensitivity,
    ShakeAngle,
    ShakeSpeed,
    Parameter,
    Insertion,
    FogOutput,
}

impl EntityProperty {
    pub const ALL: [EntityProperty; 15] = [
        EntityProperty::Speed,
        EntityProperty::Duration,
        EntityProperty::Time,
        EntityProperty::Distance,
        EntityProperty::Brightness,
        EntityProperty::Angle,
        EntityProperty::HorizontalAngle,
        EntityProperty::VerticalAngle,
        EntityProperty::ColorTemperature,
        EntityProperty::SoundSensitivity,
        EntityProperty::ShakeAngle,
        EntityProperty::ShakeSpeed,
        EntityProperty::Parameter,
        EntityProperty::Insertion,
        EntityProperty::FogOutput,
    ];

    /// Gets the property name used in the fixture JSON.
    pub fn json_name(&self) -> &'static str {
        match self {
            EntityProperty::Speed => "speed",
            EntityProperty::Duration => "duration",
            EntityProperty::Time => "time",
            EntityProperty::Distance => "distance",
            EntityProperty::Brightness => "brightness",
            EntityProperty::Angle => "angle",
            EntityProperty::HorizontalAngle => "horizontalAngle",
            EntityProperty::VerticalAngle => "verticalAngle",
            EntityProperty::ColorTemperature => "colorTemperature",
            EntityProperty::SoundSensitivity => "soundSensitivity",
            EntityProperty::ShakeAngle => "shakeAngle",
            EntityProperty::ShakeSpeed => "shakeSpeed",
            EntityProperty::Parameter => "parameter",
            EntityProperty::Insertion => "insertion",
            EntityProperty::FogOutput => "fogOutput",
        }
    }
}

/// The start and end value of one entity property.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRange {
    property: EntityProperty,
    start: Entity,
    end: Entity,
}

impl EntityRange {
    /// Gets the property.
    pub fn property(&self) -> EntityProperty {
        self.property
    }

    /// Gets the value at the start of the DMX range.
    pub fn start(&self) -> &Entity {
        &self.start
    }

    /// Gets the value at the end of the DMX range.
    pub fn end(&self) -> &Entity {
        &self.end
    }

    /// Returns true if start and end are equal.
    pub fn is_step(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WheelReference {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapabilityJson {
    dmx_range: Option<[u32; 2]>,
    #[serde(rename = "type")]
    capability_type: CapabilityType,
    comment: Option<String>,
    help_wanted: Option<String>,
    #[serde(default)]
    menu_click: MenuClick,
    #[serde(default)]
    switch_channels: Map<String, Value>,
    color: Option<String>,
    colors: Option<Vec<String>>,
    colors_start: Option<Vec<String>>,
    colors_end: Option<Vec<String>>,
    shutter_effect: Option<String>,
    effect_name: Option<String>,
    effect_preset: Option<String>,
    fog_type: Option<String>,
    blade: Option<Value>,
    #[serde(default)]
    sound_controlled: bool,
    #[serde(default)]
    random_timing: bool,
    slot_number: Option<f64>,
    slot_number_start: Option<f64>,
    slot_number_end: Option<f64>,
    wheel: Option<WheelReference>,
}

/// What a capability needs to know about the channel that owns it.
pub(crate) struct CapabilityContext<'a> {
    /// The resolution the channel's DMX ranges are declared in.
    pub resolution: Resolution,
    /// The finest resolution of the channel (coarse plus fine channels).
    pub max_resolution: Resolution,
    /// The channel name, the default wheel name.
    pub channel_name: &'a str,
    /// All wheels of the fixture.
    pub wheels: &'a [Arc<Wheel>],
}

/// One DMX sub-range of a channel with a semantic type.
#[derive(Debug, Clone)]
pub struct Capability {
    json: Map<String, Value>,
    json_dmx_range: Range,
    resolution: Resolution,
    max_resolution: Resolution,
    capability_type: CapabilityType,
    comment: Option<String>,
    help_wanted: Option<String>,
    menu_click: MenuClick,
    switch_channels: Vec<(String, String)>,
    entity_ranges: Vec<EntityRange>,
    slot_number: Option<(f64, f64)>,
    color: Option<String>,
    colors: Option<(Vec<String>, Vec<String>)>,
    shutter_effect: Option<String>,
    effect_name: Option<String>,
    effect_preset: Option<String>,
    fog_type: Option<String>,
    blade: Option<String>,
    sound_controlled: bool,
    random_timing: bool,
    wheel_names: Vec<String>,
    wheels: Vec<Arc<Wheel>>,
}

fn entity_from_json(capability: &Map<String, Value>, name: &str) -> Result<Option<Entity>> {
    match capability.get(name) {
        None => Ok(None),
        Some(Value::String(literal)) => Entity::parse(literal).map(Some),
        Some(other) => Err(FixtureError::parse("entity", other.to_string())),
    }
}

fn parse_entity_ranges(capability: &Map<String, Value>) -> Result<Vec<EntityRange>> {
    let mut ranges = Vec::new();
    for property in EntityProperty::ALL {
        let name = property.json_name();
        let single = entity_from_json(capability, name)?;
        let start = entity_from_json(capability, &format!("{}Start", name))?;
        let end = entity_from_json(capability, &format!("{}End", name))?;

        let (start, end) = match (single, start, end) {
            (Some(value), _, _) => (value.clone(), value),
            (None, Some(start), Some(end)) => (start, end),
            (None, Some(start), None) => (start.clone(), start),
            (None, None, Some(end)) => (end.clone(), end),
            (None, None, None) => continue,
        };
        ranges.push(EntityRange {
            property,
            start,
            end,
        });
    }
    Ok(ranges)
}

impl Capability {
    /// Creates a capability from its JSON object. A missing DMX range covers the whole channel.
    pub(crate) fn new(json: &Value, context: &CapabilityContext) -> Result<Capability> {
        let object = json
            .as_object()
            .cloned()
            .ok_or_else(|| FixtureError::Json(format!("capability is not an object: {}", json)))?;
        let capability = CapabilityJson::deserialize(json)?;

        let json_dmx_range = match capability.dmx_range {
            Some([start, end]) => Range::new(start, end)?,
            None => Range::new(0, max_dmx_value(context.resolution))?,
        };

        let switch_channels = capability
            .switch_channels
            .into_iter()
            .map(|(alias, target)| match target {
                Value::String(target) => Ok((alias, target)),
                other => Err(FixtureError::Json(format!(
                    "switch channel target of '{}' is not a string: {}",
                    alias, other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let slot_number = match (
            capability.slot_number,
            capability.slot_number_start,
            capability.slot_number_end,
        ) {
            (Some(nr), _, _) => Some((nr, nr)),
            (None, Some(start), Some(end)) => Some((start, end)),
            (None, Some(nr), None) | (None, None, Some(nr)) => Some((nr, nr)),
            (None, None, None) => None,
        };

        let colors = match (capability.colors, capability.colors_start, capability.colors_end) {
            (Some(colors), _, _) => Some((colors.clone(), colors)),
            (None, Some(start), Some(end)) => Some((start, end)),
            (None, Some(colors), None) | (None, None, Some(colors)) => {
                Some((colors.clone(), colors))
            }
            (None, None, None) => None,
        };

        let wheel_names = match capability.wheel {
            Some(WheelReference::One(name)) => vec![name],
            Some(WheelReference::Many(names)) => names,
            None if capability.capability_type.uses_wheels() => {
                vec![context.channel_name.to_string()]
            }
            None => Vec::new(),
        };
        let wheels = wheel_names
            .iter()
            .filter_map(|name| context.wheels.iter().find(|w| w.name() == name).cloned())
            .collect();

        let blade = capability.blade.map(|blade| match blade {
            Value::String(blade) => blade,
            other => other.to_string(),
        });

        Ok(Capability {
            entity_ranges: parse_entity_ranges(&object)?,
            json: object,
            json_dmx_range,
            resolution: context.resolution,
            max_resolution: context.max_resolution,
            capability_type: capability.capability_type,
            comment: capability.comment,
            help_wanted: capability.help_wanted,
            menu_click: capability.menu_click,
            switch_channels,
            slot_number,
            color: capability.color,
            colors,
            shutter_effect: capability.shutter_effect,
            effect_name: capability.effect_name,
            effect_preset: capability.effect_preset,
            fog_type: capability.fog_type,
            blade,
            sound_controlled: capability.sound_controlled,
            random_timing: capability.random_timing,
            wheel_names,
            wheels,
        })
    }

    /// Gets the raw JSON object of the capability.
    pub fn json(&self) -> &Map<String, Value> {
        &self.json
    }

    /// Gets the DMX range as declared, in the channel's DMX value resolution.
    pub fn json_dmx_range(&self) -> Range {
        self.json_dmx_range
    }

    /// Gets the DMX range at the channel's maximum resolution.
    pub fn dmx_range(&self) -> Range {
        scale_dmx_range(self.json_dmx_range, self.resolution, self.max_resolution)
    }

    /// Gets the declared DMX range values rescaled one by one to the channel's maximum
    /// resolution, without filling the low bytes of the range end.
    pub fn raw_dmx_range(&self) -> Range {
        let start = scale_dmx_value(self.json_dmx_range.start(), self.resolution, self.max_resolution);
        let end = scale_dmx_value(self.json_dmx_range.end(), self.resolution, self.max_resolution);
        Range::new(start, end).unwrap_or(self.json_dmx_range)
    }

    /// Gets the DMX range rescaled to the given resolution.
    pub fn get_dmx_range_with_resolution(&self, resolution: Resolution) -> Result<Range> {
        ensure_proper_resolution(resolution, self.max_resolution)?;
        Ok(scale_dmx_range(self.json_dmx_range, self.resolution, resolution))
    }

    /// Gets the capability type.
    pub fn capability_type(&self) -> CapabilityType {
        self.capability_type
    }

    /// Gets the comment.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Gets the help wanted note.
    pub fn help_wanted(&self) -> Option<&str> {
        self.help_wanted.as_deref()
    }

    /// Returns true if the capability asks for help.
    pub fn is_help_wanted(&self) -> bool {
        self.help_wanted.is_some()
    }

    /// Gets the menu click behavior.
    pub fn menu_click(&self) -> MenuClick {
        self.menu_click
    }

    /// Gets the DMX value to send when the capability is selected from a menu.
    pub fn get_menu_click_dmx_value_with_resolution(&self, resolution: Resolution) -> Result<u32> {
        let range = self.get_dmx_range_with_resolution(resolution)?;
        Ok(match self.menu_click {
            MenuClick::Start | MenuClick::Hidden => range.start(),
            MenuClick::Center => range.center(),
            MenuClick::End => range.end(),
        })
    }

    /// Gets the switching channel aliases and the channel each one switches to.
    pub fn switch_channels(&self) -> &[(String, String)] {
        &self.switch_channels
    }

    /// Gets the channel a switching channel alias switches to in this capability.
    pub fn switch_channel_target(&self, alias: &str) -> Option<&str> {
        self.switch_channels
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, target)| target.as_str())
    }

    /// Gets all entity properties used by this capability in declaration order.
    pub fn entity_ranges(&self) -> &[EntityRange] {
        &self.entity_ranges
    }

    /// Gets the start and end entity of one property.
    pub fn entity_range(&self, property: EntityProperty) -> Option<&EntityRange> {
        self.entity_ranges.iter().find(|r| r.property == property)
    }

    /// Gets the speed.
    pub fn speed(&self) -> Option<&EntityRange> {
        self.entity_range(EntityProperty::Speed)
    }

    /// Gets the angle.
    pub fn angle(&self) -> Option<&EntityRange> {
        self.entity_range(EntityProperty::Angle)
    }

    /// Gets the brightness.
    pub fn brightness(&self) -> Option<&EntityRange> {
        self.entity_range(EntityProperty::Brightness)
    }

    /// Gets the color temperature.
    pub fn color_temperature(&self) -> Option<&EntityRange> {
        self.entity_range(EntityProperty::ColorTemperature)
    }

    /// Gets the start and end slot number.
    pub fn slot_number(&self) -> Option<(f64, f64)> {
        self.slot_number
    }

    /// Gets the single color of a ColorIntensity capability.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Gets the start and end colors.
    pub fn colors(&self) -> Option<(&[String], &[String])> {
        self.colors
            .as_ref()
            .map(|(start, end)| (start.as_slice(), end.as_slice()))
    }

    /// Gets the shutter effect, e.g. "Strobe" or "Open".
    pub fn shutter_effect(&self) -> Option<&str> {
        self.shutter_effect.as_deref()
    }

    /// Gets the effect name.
    pub fn effect_name(&self) -> Option<&str> {
        self.effect_name.as_deref()
    }

    /// Gets the effect preset.
    pub fn effect_preset(&self) -> Option<&str> {
        self.effect_preset.as_deref()
    }

    /// Gets the fog type.
    pub fn fog_type(&self) -> Option<&str> {
        self.fog_type.as_deref()
    }

    /// Gets the blade, e.g. "Top" or "3".
    pub fn blade(&self) -> Option<&str> {
        self.blade.as_deref()
    }

    /// Returns true if the capability reacts to sound.
    pub fn is_sound_controlled(&self) -> bool {
        self.sound_controlled
    }

    /// Returns true if the capability uses random timing.
    pub fn has_random_timing(&self) -> bool {
        self.random_timing
    }

    /// Gets the names of the referenced wheels.
    pub fn wheel_names(&self) -> &[String] {
        &self.wheel_names
    }

    /// Gets the referenced wheels that exist in the fixture.
    pub fn wheels(&self) -> &[Arc<Wheel>] {
        &self.wheels
    }

    /// Gets the start and end slot of the first referenced wheel.
    pub fn wheel_slots(&self) -> Option<(WheelSlot<'_>, WheelSlot<'_>)> {
        let (start, end) = self.slot_number?;
        let wheel = self.wheels.first()?;
        Some((wheel.get_slot(start)?, wheel.get_slot(end)?))
    }

    /// Returns true if every start/end pair is equal, i.e. the capability does not fade.
    pub fn is_step(&self) -> bool {
        self.entity_ranges.iter().all(EntityRange::is_step)
            && self.slot_number.map_or(true, |(start, end)| start == end)
            && self
                .colors
                .as_ref()
                .map_or(true, |(start, end)| start == end)
    }

    /// Returns true if some value decreases from the start to the end of the DMX range.
    pub fn is_inverted(&self) -> bool {
        self.entity_ranges.iter().any(|range| {
            range.start.to_base_unit().number() > range.end.to_base_unit().number()
        }) || self.slot_number.is_some_and(|(start, end)| start > end)
    }

    /// Gets a generated human-readable description of the capability.
    pub fn name(&self) -> String {
        let mut name = match self.capability_type {
            CapabilityType::NoFunction => "No function".to_string(),
            CapabilityType::ShutterStrobe => match &self.shutter_effect {
                Some(effect) => effect.clone(),
                None => "Shutter".to_string(),
            },
            CapabilityType::ColorIntensity => match &self.color {
                Some(color) => color.clone(),
                None => "Color intensity".to_string(),
            },
            CapabilityType::WheelSlot => match self.wheel_slots() {
                Some((start, end)) if start.nr() == end.nr() => start.name(),
                Some((start, end)) => format!("{}…{}", start.name(), end.name()),
                None => "Wheel slot".to_string(),
            },
            CapabilityType::Effect => self
                .effect_name
                .clone()
                .or_else(|| self.effect_preset.clone())
                .unwrap_or_else(|| "Effect".to_string()),
            CapabilityType::FogType => match &self.fog_type {
                Some(fog_type) => format!("Fog type {}", fog_type),
                None => "Fog type".to_string(),
            },
            other => split_pascal_case(&format!("{:?}", other)),
        };

        for range in &self.entity_ranges {
            if range.is_step() {
                name.push_str(&format!(" {}", range.start));
            } else {
                name.push_str(&format!(" {}…{}", range.start, range.end));
            }
        }
        if let Some(comment) = &self.comment {
            name.push_str(&format!(" ({})", comment));
        }
        name
    }
}
