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

use super::entity::Entity;
use super::error::Result;
use super::resource::ResourceRef;

/// The type of a single wheel slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum WheelSlotType {
    Open,
    Closed,
    Color,
    Gobo,
    Prism,
    Iris,
    Frost,
    AnimationGoboStart,
    AnimationGoboEnd,
    /// A position between two neighboring slots.
    #[serde(skip_deserializing)]
    Split,
}

/// The overall type of a wheel, derived from its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelType {
    Color,
    Gobo,
    Prism,
    Iris,
    Frost,
    AnimationGobo,
}

/// The default rotation direction of a wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WheelDirection {
    #[serde(rename = "CW")]
    Clockwise,
    #[serde(rename = "CCW")]
    CounterClockwise,
}

#[derive(Deserialize)]
struct WheelJson {
    direction: Option<WheelDirection>,
    slots: Vec<WheelSlotJson>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WheelSlotJson {
    #[serde(rename = "type")]
    slot_type: WheelSlotType,
    name: Option<String>,
    #[serde(default)]
    colors: Vec<String>,
    color_temperature: Option<String>,
    resource: Option<ResourceRef>,
    facets: Option<u32>,
    open_percent: Option<String>,
    frost_intensity: Option<String>,
}

#[derive(Debug, Clone)]
struct SlotDefinition {
    slot_type: WheelSlotType,
    name: Option<String>,
    colors: Vec<String>,
    color_temperature: Option<Entity>,
    resource: Option<ResourceRef>,
    facets: Option<u32>,
    open_percent: Option<Entity>,
    frost_intensity: Option<Entity>,
}

fn parse_optional_entity(literal: Option<&str>) -> Result<Option<Entity>> {
    literal.map(Entity::parse).transpose()
}

impl SlotDefinition {
    fn from_json(json: WheelSlotJson) -> Result<SlotDefinition> {
        Ok(SlotDefinition {
            slot_type: json.slot_type,
            color_temperature: parse_optional_entity(json.color_temperature.as_deref())?,
            open_percent: parse_optional_entity(json.open_percent.as_deref())?,
            frost_intensity: parse_optional_entity(json.frost_intensity.as_deref())?,
            name: json.name,
            colors: json.colors,
            resource: json.resource,
            facets: json.facets,
        })
    }
}

/// A rotating element like a color or gobo wheel.
#[derive(Debug, Clone)]
pub struct Wheel {
    name: String,
    direction: Option<WheelDirection>,
    slots: Vec<SlotDefinition>,
}

impl Wheel {
    /// Creates a wheel from its JSON definition.
    pub fn from_json(name: &str, json: &Value) -> Result<Wheel> {
        let wheel = WheelJson::deserialize(json)?;
        let slots = wheel
            .slots
            .into_iter()
            .map(SlotDefinition::from_json)
            .collect::<Result<Vec<_>>>()?;

        Ok(Wheel {
            name: name.to_string(),
            direction: wheel.direction,
            slots,
        })
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the default rotation direction.
    pub fn direction(&self) -> Option<WheelDirection> {
        self.direction
    }

    /// Gets the number of discrete slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Gets all discrete slots, numbered from 1.
    pub fn slots(&self) -> Vec<WheelSlot<'_>> {
        (1..=self.slots.len())
            .map(|nr| WheelSlot {
                wheel: self,
                nr: nr as f64,
            })
            .collect()
    }

    /// Gets the most common slot type, ignoring open and closed slots. Ties go to the type
    /// that occurs first.
    pub fn wheel_type(&self) -> WheelType {
        let mut counts: Vec<(WheelType, usize)> = Vec::new();
        for slot in &self.slots {
            let wheel_type = match slot.slot_type {
                WheelSlotType::Color => WheelType::Color,
                WheelSlotType::Gobo => WheelType::Gobo,
                WheelSlotType::Prism => WheelType::Prism,
                WheelSlotType::Iris => WheelType::Iris,
                WheelSlotType::Frost => WheelType::Frost,
                WheelSlotType::AnimationGoboStart | WheelSlotType::AnimationGoboEnd => {
                    WheelType::AnimationGobo
                }
                WheelSlotType::Open | WheelSlotType::Closed | WheelSlotType::Split => continue,
            };
            match counts.iter_mut().find(|(t, _)| *t == wheel_type) {
                Some((_, count)) => *count += 1,
                None => counts.push((wheel_type, 1)),
            }
        }

        let mut best: Option<(WheelType, usize)> = None;
        for (wheel_type, count) in counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((wheel_type, count));
            }
        }
        best.map_or(WheelType::Color, |(wheel_type, _)| wheel_type)
    }

    /// Gets the slot at the given (possibly fractional) slot number. A fractional number between
    /// the last and the first slot wraps around. Numbers outside the wheel yield None.
    pub fn get_slot(&self, nr: f64) -> Option<WheelSlot<'_>> {
        if !nr.is_finite() || nr < 1.0 || nr >= (self.slots.len() + 1) as f64 {
            return None;
        }
        Some(WheelSlot { wheel: self, nr })
    }

    /// Gets the type of the slot at the given slot number.
    pub fn get_slot_type(&self, nr: f64) -> Option<WheelSlotType> {
        self.get_slot(nr).map(|slot| slot.slot_type())
    }
}

/// A view of one wheel position. Fractional slot numbers describe split slots.
#[derive(Debug, Clone, Copy)]
pub struct WheelSlot<'w> {
    wheel: &'w Wheel,
    nr: f64,
}

impl<'w> WheelSlot<'w> {
    /// Gets the wheel this slot belongs to.
    pub fn wheel(&self) -> &'w Wheel {
        self.wheel
    }

    /// Gets the slot number.
    pub fn nr(&self) -> f64 {
        self.nr
    }

    /// Returns true if this position lies between two discrete slots.
    pub fn is_split(&self) -> bool {
        self.nr.fract() != 0.0
    }

    /// Gets the discrete slot before a split position.
    pub fn floor_slot(&self) -> Option<WheelSlot<'w>> {
        if !self.is_split() {
            return None;
        }
        self.wheel.get_slot(self.nr.floor())
    }

    /// Gets the discrete slot after a split position, wrapping to the first slot.
    pub fn ceil_slot(&self) -> Option<WheelSlot<'w>> {
        if !self.is_split() {
            return None;
        }
        let ceil = self.nr.ceil();
        let ceil = if ceil > self.wheel.slots.len() as f64 {
            1.0
        } else {
            ceil
        };
        self.wheel.get_slot(ceil)
    }

    fn definition(&self) -> Option<&'w SlotDefinition> {
        if self.is_split() {
            return None;
        }
        self.wheel.slots.get(self.nr as usize - 1)
    }

    /// Gets the slot type.
    pub fn slot_type(&self) -> WheelSlotType {
        self.definition()
            .map_or(WheelSlotType::Split, |definition| definition.slot_type)
    }

    /// Gets the slot colors.
    pub fn colors(&self) -> &'w [String] {
        self.definition()
            .map_or(&[], |definition| definition.colors.as_slice())
    }

    /// Gets the color temperature of a color slot.
    pub fn color_temperature(&self) -> Option<&'w Entity> {
        self.definition()?.color_temperature.as_ref()
    }

    /// Gets the resource of a gobo slot.
    pub fn resource(&self) -> Option<&'w ResourceRef> {
        self.definition()?.resource.as_ref()
    }

    /// Gets the number of prism facets.
    pub fn facets(&self) -> Option<u32> {
        self.definition()?.facets
    }

    /// Gets how far an iris slot is open.
    pub fn open_percent(&self) -> Option<&'w Entity> {
        self.definition()?.open_percent.as_ref()
    }

    /// Gets the intensity of a frost slot.
    pub fn frost_intensity(&self) -> Option<&'w Entity> {
        self.definition()?.frost_intensity.as_ref()
    }

    /// Gets the animation gobo start slot an AnimationGoboEnd slot belongs to.
    pub fn animation_gobo_start(&self) -> Option<WheelSlot<'w>> {
        if self.slot_type() != WheelSlotType::AnimationGoboEnd {
            return None;
        }
        let previous = self.wheel.get_slot(self.nr - 1.0)?;
        (previous.slot_type() == WheelSlotType::AnimationGoboStart).then_some(previous)
    }

    /// Gets the slot name, generated from the slot's properties if it has no explicit one.
    pub fn name(&self) -> String {
        if let (Some(floor), Some(ceil)) = (self.floor_slot(), self.ceil_slot()) {
            return format!("Split {} / {}", floor.name(), ceil.name());
        }

        let Some(definition) = self.definition() else {
            return format!("Slot {}", self.nr);
        };
        if let Some(name) = &definition.name {
            return name.clone();
        }

        let resource_name = definition
            .resource
            .as_ref()
            .and_then(|r| r.resource())
            .map(|r| r.name().to_string());

        match definition.slot_type {
            WheelSlotType::Open => "Open".to_string(),
            WheelSlotType::Closed => "Closed".to_string(),
            WheelSlotType::Color => match &definition.color_temperature {
                Some(temperature) => format!("{} color temperature", temperature),
                None => format!("Color {}", self.nr),
            },
            WheelSlotType::Gobo => resource_name.unwrap_or_else(|| format!("Gobo {}", self.nr)),
            WheelSlotType::Prism => match definition.facets {
                Some(facets) => format!("{}-facet prism", facets),
                None => "Prism".to_string(),
            },
            WheelSlotType::Iris => match &definition.open_percent {
                Some(open) => format!("Iris {}", open),
                None => "Iris".to_string(),
            },
            WheelSlotType::Frost => match &definition.frost_intensity {
                Some(intensity) => format!("Frost {}", intensity),
                None => "Frost".to_string(),
            },
            WheelSlotType::AnimationGoboStart => {
                resource_name.unwrap_or_else(|| format!("Animation Gobo {}", self.nr))
            }
            WheelSlotType::AnimationGoboEnd => match self.animation_gobo_start() {
                Some(start) => format!("End of {}", start.name()),
                None => "End of animation gobo".to_string(),
            },
            WheelSlotType::Split => format!("Slot {}", self.nr),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::error::FixtureError;

    fn color_wheel() -> Wheel {
        Wheel::from_json(
            "Color Wheel",
            &json!({
                "direction": "CW",
                "slots": [
                    { "type": "Open" },
                    { "type": "Color", "name": "Red", "colors": ["#ff0000"] },
                    { "type": "Color", "colors": ["#00ff00"] },
                    { "type": "Color", "colorTemperature": "3200K" }
                ]
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_wheel_basics() {
        let wheel = color_wheel();
        assert_eq!(wheel.name(), "Color Wheel");
        assert_eq!(wheel.direction(), Some(WheelDirection::Clockwise));
        assert_eq!(wheel.slot_count(), 4);
        assert_eq!(wheel.wheel_type(), WheelType::Color);
        assert_eq!(wheel.get_slot_type(2.0), Some(WheelSlotType::Color));
        assert_eq!(wheel.get_slot_type(1.0), Some(WheelSlotType::Open));
    }

    #[test]
    fn test_slot_names() {
        let wheel = color_wheel();
        let names: Vec<String> = wheel.slots().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["Open", "Red", "Color 3", "3200K color temperature"]
        );
        assert_eq!(wheel.get_slot(2.0).unwrap().colors(), ["#ff0000"]);
    }

    #[test]
    fn test_split_slots() {
        let wheel = color_wheel();
        let split = wheel.get_slot(2.5).unwrap();
        assert!(split.is_split());
        assert_eq!(split.slot_type(), WheelSlotType::Split);
        assert_eq!(split.floor_slot().unwrap().nr(), 2.0);
        assert_eq!(split.ceil_slot().unwrap().nr(), 3.0);
        assert_eq!(split.name(), "Split Red / Color 3");
        assert!(split.colors().is_empty());

        // between the last and the first slot
        let wrapped = wheel.get_slot(4.5).unwrap();
        assert_eq!(wrapped.ceil_slot().unwrap().nr(), 1.0);
        assert_eq!(wrapped.name(), "Split 3200K color temperature / Open");

        let discrete = wheel.get_slot(3.0).unwrap();
        assert!(!discrete.is_split());
        assert!(discrete.floor_slot().is_none());
    }

    #[test]
    fn test_out_of_range_slots() {
        let wheel = color_wheel();
        assert!(wheel.get_slot(0.0).is_none());
        assert!(wheel.get_slot(0.5).is_none());
        assert!(wheel.get_slot(5.0).is_none());
        assert!(wheel.get_slot(f64::NAN).is_none());
    }

    #[test]
    fn test_gobo_wheel_with_animation_gobo() {
        let wheel = Wheel::from_json(
            "Gobo Wheel",
            &json!({
                "slots": [
                    { "type": "Open" },
                    { "type": "Gobo" },
                    { "type": "AnimationGoboStart", "name": "Flames" },
                    { "type": "AnimationGoboEnd" },
                    { "type": "Prism", "facets": 3 },
                    { "type": "Gobo", "resource": {
                        "key": "gobos/dots",
                        "name": "Dots",
                        "type": "gobo"
                    } }
                ]
            }),
        )
        .unwrap();

        assert_eq!(wheel.direction(), None);
        assert_eq!(wheel.wheel_type(), WheelType::Gobo);
        let names: Vec<String> = wheel.slots().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "Open",
                "Gobo 2",
                "Flames",
                "End of Flames",
                "3-facet prism",
                "Dots"
            ]
        );
        let end = wheel.get_slot(4.0).unwrap();
        assert_eq!(end.animation_gobo_start().unwrap().nr(), 3.0);
        assert!(wheel.get_slot(3.0).unwrap().animation_gobo_start().is_none());
    }

    #[test]
    fn test_wheel_type_ties_go_to_first_type() {
        let wheel = Wheel::from_json(
            "Mixed",
            &json!({ "slots": [
                { "type": "Prism", "facets": 3 },
                { "type": "Frost" },
                { "type": "Open" }
            ] }),
        )
        .unwrap();
        assert_eq!(wheel.wheel_type(), WheelType::Prism);

        let open_only =
            Wheel::from_json("Open", &json!({ "slots": [{ "type": "Open" }] })).unwrap();
        assert_eq!(open_only.wheel_type(), WheelType::Color);
    }

    #[test]
    fn test_invalid_slot_entity() {
        let result = Wheel::from_json(
            "Iris",
            &json!({ "slots": [{ "type": "Iris", "openPercent": "wide open" }] }),
        );
        assert!(matches!(result, Err(FixtureError::Parse { .. })));
    }
}
