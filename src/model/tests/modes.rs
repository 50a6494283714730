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

use serde_json::{json, Value};

use super::{fixture, mode_channel_keys};
use crate::model::{FixtureError, SwitchingChannelBehavior};

fn rgb_bar() -> Value {
    json!({
        "name": "RGB Bar",
        "physical": {
            "power": 40,
            "bulb": { "type": "LED", "lumens": 800 }
        },
        "matrix": { "pixelCount": [3, 1, 1] },
        "availableChannels": {
            "Dimmer": { "capability": { "type": "Intensity" } }
        },
        "templateChannels": {
            "Red $pixelKey": { "capability": { "type": "ColorIntensity", "color": "Red" } },
            "Green $pixelKey": { "capability": { "type": "ColorIntensity", "color": "Green" } }
        },
        "modes": [
            {
                "name": "Per Pixel",
                "shortName": "pp",
                "rdmPersonalityIndex": 1,
                "channels": [
                    "Dimmer",
                    {
                        "insert": "matrixChannels",
                        "repeatFor": "eachPixelXYZ",
                        "channelOrder": "perPixel",
                        "templateChannels": ["Red $pixelKey", "Green $pixelKey"]
                    }
                ]
            },
            {
                "name": "Per Channel",
                "physical": { "power": 25, "bulb": { "lumens": 500 } },
                "channels": [
                    {
                        "insert": "matrixChannels",
                        "repeatFor": ["3", "1"],
                        "channelOrder": "perChannel",
                        "templateChannels": ["Red $pixelKey", "Green $pixelKey"]
                    },
                    null,
                    "Blue 1"
                ]
            }
        ]
    })
}

#[test]
fn test_insert_blocks_resolve_to_channels() {
    let fixture = fixture(rgb_bar());
    assert_eq!(
        mode_channel_keys(&fixture, 0),
        vec!["Dimmer", "Red 1", "Green 1", "Red 2", "Green 2", "Red 3", "Green 3"]
    );
    assert_eq!(
        mode_channel_keys(&fixture, 1),
        vec!["Red 3", "Red 1", "Green 3", "Green 1", "null-1", "?"]
    );

    let modes = fixture.modes().unwrap();
    assert_eq!(
        modes[1].channel_keys(),
        [
            Some("Red 3".to_string()),
            Some("Red 1".to_string()),
            Some("Green 3".to_string()),
            Some("Green 1".to_string()),
            None,
            Some("Blue 1".to_string()),
        ]
    );
}

#[test]
fn test_mode_properties() {
    let fixture = fixture(rgb_bar());
    let modes = fixture.modes().unwrap();

    assert_eq!(modes[0].name(), "Per Pixel");
    assert_eq!(modes[0].short_name(), "pp");
    assert_eq!(modes[0].rdm_personality_index(), Some(1));
    assert_eq!(modes[1].short_name(), "Per Channel");
    assert_eq!(modes[1].rdm_personality_index(), None);

    assert!(modes[0].physical_override().is_none());
    assert_eq!(modes[0].physical().and_then(|p| p.power()), Some(40.0));

    let physical = modes[1].physical().unwrap();
    assert_eq!(physical.power(), Some(25.0));
    assert_eq!(physical.bulb_type(), Some("LED"));
    assert_eq!(physical.bulb_lumens(), Some(500.0));
    assert_eq!(modes[1].physical_override().and_then(|p| p.bulb_type()), None);

    assert_eq!(fixture.get_mode_by_name("pp").unwrap().unwrap().name(), "Per Pixel");
    assert!(fixture.get_mode_by_name("missing").unwrap().is_none());
}

#[test]
fn test_get_channel_index() {
    let fixture = fixture(rgb_bar());
    let modes = fixture.modes().unwrap();
    assert_eq!(
        modes[0].get_channel_index("Green 2", SwitchingChannelBehavior::All),
        Ok(Some(4))
    );
    assert_eq!(
        modes[0].get_channel_index("Blue 2", SwitchingChannelBehavior::All),
        Ok(None)
    );
    // unresolved keys are never found
    assert_eq!(
        modes[1].get_channel_index("Blue 1", SwitchingChannelBehavior::All),
        Ok(None)
    );
}

#[test]
fn test_mode_without_matrix_insert_fails() {
    let fixture = fixture(json!({
        "name": "Dimmer",
        "availableChannels": {
            "Dimmer": { "capability": { "type": "Intensity" } }
        },
        "modes": [{
            "name": "A",
            "channels": [{
                "insert": "matrixChannels",
                "repeatFor": "eachPixelABC",
                "channelOrder": "perPixel",
                "templateChannels": ["Red $pixelKey"]
            }]
        }]
    }));

    assert!(matches!(fixture.modes(), Err(FixtureError::Reference(_))));
    assert!(matches!(
        fixture.null_channel_count(),
        Err(FixtureError::Reference(_))
    ));
}

#[test]
fn test_invalid_channel_order_surfaces() {
    let mut json = rgb_bar();
    json["modes"][0]["channels"][1]["channelOrder"] = json!("diagonal");
    let fixture = fixture(json);

    assert_eq!(
        fixture.modes().err(),
        Some(FixtureError::parse("channelOrder", "diagonal"))
    );
}
