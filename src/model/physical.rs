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

use serde_json::{Map, Value};

use super::entity::Entity;

/// Physical data of a fixture or of one of its modes.
#[derive(Debug, Clone, PartialEq)]
pub struct Physical {
    json: Map<String, Value>,
}

fn number_triple(value: Option<&Value>) -> Option<[f64; 3]> {
    match value?.as_array()?.as_slice() {
        [a, b, c] => Some([a.as_f64()?, b.as_f64()?, c.as_f64()?]),
        _ => None,
    }
}

fn number_pair(value: Option<&Value>) -> Option<[f64; 2]> {
    match value?.as_array()?.as_slice() {
        [a, b] => Some([a.as_f64()?, b.as_f64()?]),
        _ => None,
    }
}

/// Merges `overlay` into `base`; nested objects are merged key by key, overlay values win.
fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(base)), Value::Object(overlay)) => deep_merge(base, overlay),
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

impl Physical {
    pub fn new(json: Map<String, Value>) -> Physical {
        Physical { json }
    }

    /// Creates physical data from an optional JSON object. Values other than objects are ignored.
    pub fn from_json(json: Option<&Value>) -> Option<Physical> {
        json.and_then(Value::as_object)
            .map(|object| Physical::new(object.clone()))
    }

    /// Merges the fixture's physical data with a mode's override. Mode values win.
    pub fn merged(base: Option<&Physical>, mode_override: Option<&Physical>) -> Option<Physical> {
        match (base, mode_override) {
            (None, None) => None,
            (Some(physical), None) | (None, Some(physical)) => Some(physical.clone()),
            (Some(base), Some(mode_override)) => {
                let mut json = base.json.clone();
                deep_merge(&mut json, &mode_override.json);
                Some(Physical::new(json))
            }
        }
    }

    pub fn json(&self) -> &Map<String, Value> {
        &self.json
    }

    fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.json.get(name).and_then(Value::as_object)
    }

    /// Gets width, height and depth in mm.
    pub fn dimensions(&self) -> Option<[f64; 3]> {
        number_triple(self.json.get("dimensions"))
    }

    pub fn width(&self) -> Option<f64> {
        self.dimensions().map(|[width, _, _]| width)
    }

    pub fn height(&self) -> Option<f64> {
        self.dimensions().map(|[_, height, _]| height)
    }

    pub fn depth(&self) -> Option<f64> {
        self.dimensions().map(|[_, _, depth]| depth)
    }

    /// Gets the weight in kg.
    pub fn weight(&self) -> Option<f64> {
        self.json.get("weight").and_then(Value::as_f64)
    }

    /// Gets the power consumption in W.
    pub fn power(&self) -> Option<f64> {
        self.json.get("power").and_then(Value::as_f64)
    }

    pub fn dmx_connector(&self) -> Option<&str> {
        self.json.get("DMXconnector").and_then(Value::as_str)
    }

    pub fn bulb_type(&self) -> Option<&str> {
        self.section("bulb")?.get("type").and_then(Value::as_str)
    }

    /// Gets the bulb color temperature in K.
    pub fn bulb_color_temperature(&self) -> Option<f64> {
        self.section("bulb")?
            .get("colorTemperature")
            .and_then(Value::as_f64)
    }

    pub fn bulb_lumens(&self) -> Option<f64> {
        self.section("bulb")?.get("lumens").and_then(Value::as_f64)
    }

    pub fn lens_name(&self) -> Option<&str> {
        self.section("lens")?.get("name").and_then(Value::as_str)
    }

    /// Gets the minimum and maximum beam angle in degrees.
    pub fn lens_degrees_min_max(&self) -> Option<[f64; 2]> {
        number_pair(self.section("lens")?.get("degreesMinMax"))
    }

    /// Gets the beam angle range as entities, e.g. "10deg" to "40deg".
    pub fn lens_degrees_entities(&self) -> Option<[Entity; 2]> {
        let [min, max] = self.lens_degrees_min_max()?;
        Some([Entity::new(min, "deg"), Entity::new(max, "deg")])
    }

    /// Gets the size of one matrix pixel in mm.
    pub fn matrix_pixels_dimensions(&self) -> Option<[f64; 3]> {
        number_triple(self.section("matrixPixels")?.get("dimensions"))
    }

    /// Gets the spacing between matrix pixels in mm.
    pub fn matrix_pixels_spacing(&self) -> Option<[f64; 3]> {
        number_triple(self.section("matrixPixels")?.get("spacing"))
    }
}
