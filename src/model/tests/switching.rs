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

use serde_json::json;

use super::fixture;
use crate::model::{Channel, ChannelType, Fixture, SwitchingChannelBehavior};

fn moving_head() -> Fixture {
    fixture(json!({
        "name": "Moving Head",
        "availableChannels": {
            "Color Mode": {
                "defaultValue": 200,
                "capabilities": [
                    { "dmxRange": [0, 127], "type": "Generic", "switchChannels": { "Color": "Red" } },
                    { "dmxRange": [128, 255], "type": "Generic", "switchChannels": { "Color": "Green" } }
                ]
            },
            "Red": { "capability": { "type": "ColorIntensity", "color": "Red" } },
            "Green": { "capability": { "type": "ColorIntensity", "color": "Green" } }
        },
        "modes": [
            { "name": "Basic", "channels": ["Color Mode", "Color"] }
        ]
    }))
}

#[test]
fn test_default_channel() {
    let fixture = moving_head();
    let registry = fixture.all_channels_by_key().unwrap();
    assert_eq!(
        registry.keys().collect::<Vec<_>>(),
        vec!["Color Mode", "Color", "Red", "Green"]
    );

    let switching = fixture.switching_channels().unwrap()[0];
    assert_eq!(switching.trigger_channel().key(), "Color Mode");
    assert_eq!(switching.default_channel_key(), Ok(Some("Green")));
    assert_eq!(
        switching.default_channel(registry).unwrap().map(Channel::key),
        Some("Green")
    );
    let targets: Vec<&str> = switching
        .switch_to_channels(registry)
        .unwrap()
        .into_iter()
        .flatten()
        .map(Channel::key)
        .collect();
    assert_eq!(targets, vec!["Red", "Green"]);
}

#[test]
fn test_channel_index_behaviors() {
    let fixture = moving_head();
    let mode = &fixture.modes().unwrap()[0];

    assert_eq!(mode.get_channel_index("Color", SwitchingChannelBehavior::None), Ok(Some(1)));
    assert_eq!(mode.get_channel_index("Red", SwitchingChannelBehavior::None), Ok(None));
    assert_eq!(
        mode.get_channel_index("Green", SwitchingChannelBehavior::DefaultOnly),
        Ok(Some(1))
    );
    assert_eq!(
        mode.get_channel_index("Red", SwitchingChannelBehavior::DefaultOnly),
        Ok(None)
    );
    assert_eq!(
        mode.get_channel_index("Red", SwitchingChannelBehavior::SwitchedOnly),
        Ok(Some(1))
    );
    assert_eq!(
        mode.get_channel_index("Green", SwitchingChannelBehavior::SwitchedOnly),
        Ok(None)
    );
    assert_eq!(mode.get_channel_index("Red", SwitchingChannelBehavior::All), Ok(Some(1)));
    assert_eq!(
        mode.get_channel_index("Color Mode", SwitchingChannelBehavior::All),
        Ok(Some(0))
    );
}

#[test]
fn test_switching_channel_type() {
    let fixture = moving_head();
    let color = fixture.get_channel_by_key("Color").unwrap().unwrap();
    assert_eq!(color.channel_type(), Ok(ChannelType::Switching));
    assert!(color.capabilities().unwrap().is_empty());
    assert_eq!(color.name(), "Color");
}

#[test]
fn test_missing_default_target() {
    let fixture = fixture(json!({
        "name": "Gap",
        "availableChannels": {
            "Mode": {
                "defaultValue": 150,
                "capabilities": [
                    { "dmxRange": [0, 99], "type": "Generic", "switchChannels": { "Sw": "A" } },
                    { "dmxRange": [100, 199], "type": "Generic" },
                    { "dmxRange": [200, 255], "type": "Generic", "switchChannels": { "Sw": "B" } }
                ]
            },
            "A": { "capability": { "type": "Intensity" } },
            "B": { "capability": { "type": "Intensity" } }
        },
        "modes": [{ "name": "A", "channels": ["Mode", "Sw"] }]
    }));

    let switching = fixture.switching_channels().unwrap()[0];
    assert_eq!(switching.default_channel_key(), Ok(None));
}
