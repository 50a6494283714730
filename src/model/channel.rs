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

//! The four channel variants of a fixture and the template channels they are generated from.

use std::fmt;
use std::sync::Arc;

use super::capability::Capability;
use super::error::Result;
use super::wheel::Wheel;

mod coarse;
mod fine;
mod null;
mod switching;
mod template;

pub use coarse::{CoarseChannel, Precedence};
pub use fine::FineChannel;
pub use null::NullChannel;
pub use switching::{SwitchingChannel, SwitchingChannelBehavior};
pub use template::{
    resolve_template_string, resolve_template_value, TemplateChannel, PIXEL_KEY_VARIABLE,
};

/// The parts of a fixture every channel needs: its identity and its wheels.
#[derive(Debug)]
pub struct FixtureContext {
    key: String,
    name: String,
    wheels: Vec<Arc<Wheel>>,
}

impl FixtureContext {
    pub(crate) fn new(key: String, name: String, wheels: Vec<Arc<Wheel>>) -> FixtureContext {
        FixtureContext { key, name, wheels }
    }

    /// Gets the fixture key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gets the fixture name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the fixture's wheels in declaration order.
    pub fn wheels(&self) -> &[Arc<Wheel>] {
        &self.wheels
    }

    /// Gets a wheel by its name.
    pub fn get_wheel_by_name(&self, name: &str) -> Option<&Arc<Wheel>> {
        self.wheels.iter().find(|wheel| wheel.name() == name)
    }
}

/// The kind of function a channel controls, derived from its capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    Nothing,
    Intensity,
    SingleColor,
    MultiColor,
    ColorTemperature,
    Pan,
    Tilt,
    Focus,
    Zoom,
    Iris,
    Gobo,
    Prism,
    Strobe,
    Shutter,
    Fog,
    Speed,
    Effect,
    Maintenance,
    Generic,
    Fine,
    Switching,
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChannelType::Nothing => "Nothing",
            ChannelType::Intensity => "Intensity",
            ChannelType::SingleColor => "Single Color",
            ChannelType::MultiColor => "Multi-Color",
            ChannelType::ColorTemperature => "Color Temperature",
            ChannelType::Pan => "Pan",
            ChannelType::Tilt => "Tilt",
            ChannelType::Focus => "Focus",
            ChannelType::Zoom => "Zoom",
            ChannelType::Iris => "Iris",
            ChannelType::Gobo => "Gobo",
            ChannelType::Prism => "Prism",
            ChannelType::Strobe => "Strobe",
            ChannelType::Shutter => "Shutter",
            ChannelType::Fog => "Fog",
            ChannelType::Speed => "Speed",
            ChannelType::Effect => "Effect",
            ChannelType::Maintenance => "Maintenance",
            ChannelType::Generic => "Generic",
            ChannelType::Fine => "Fine",
            ChannelType::Switching => "Switching",
        };
        write!(f, "{}", label)
    }
}

/// A resolved channel of a fixture.
#[derive(Debug, Clone)]
pub enum Channel {
    Coarse(Arc<CoarseChannel>),
    Fine(Arc<FineChannel>),
    Switching(Arc<SwitchingChannel>),
    Null(Arc<NullChannel>),
}

impl Channel {
    /// Gets the channel key, unique within the fixture.
    pub fn key(&self) -> &str {
        match self {
            Channel::Coarse(channel) => channel.key(),
            Channel::Fine(channel) => channel.key(),
            Channel::Switching(channel) => channel.key(),
            Channel::Null(channel) => channel.key(),
        }
    }

    /// Gets the channel name. Names are not necessarily unique.
    pub fn name(&self) -> String {
        match self {
            Channel::Coarse(channel) => channel.name().to_string(),
            Channel::Fine(channel) => channel.name(),
            Channel::Switching(channel) => channel.name().to_string(),
            Channel::Null(channel) => channel.name().to_string(),
        }
    }

    /// Gets the fixture this channel belongs to.
    pub fn fixture(&self) -> &Arc<FixtureContext> {
        match self {
            Channel::Coarse(channel) => channel.fixture(),
            Channel::Fine(channel) => channel.coarse_channel().fixture(),
            Channel::Switching(channel) => channel.trigger_channel().fixture(),
            Channel::Null(channel) => channel.coarse_channel().fixture(),
        }
    }

    /// Gets the pixel key of a matrix channel.
    pub fn pixel_key(&self) -> Option<&str> {
        match self {
            Channel::Coarse(channel) => channel.pixel_key(),
            Channel::Fine(channel) => channel.coarse_channel().pixel_key(),
            Channel::Switching(channel) => channel.trigger_channel().pixel_key(),
            Channel::Null(_) => None,
        }
    }

    /// Gets the capabilities. Fine and switching channels have none of their own.
    pub fn capabilities(&self) -> Result<&[Capability]> {
        match self {
            Channel::Coarse(channel) => channel.capabilities(),
            Channel::Null(channel) => channel.coarse_channel().capabilities(),
            Channel::Fine(_) | Channel::Switching(_) => Ok(&[]),
        }
    }

    /// Gets the channel type.
    pub fn channel_type(&self) -> Result<ChannelType> {
        match self {
            Channel::Coarse(channel) => channel.channel_type(),
            Channel::Null(channel) => channel.coarse_channel().channel_type(),
            Channel::Fine(_) => Ok(ChannelType::Fine),
            Channel::Switching(_) => Ok(ChannelType::Switching),
        }
    }

    /// Returns true if the channel or one of its capabilities asks for help.
    pub fn is_help_wanted(&self) -> Result<bool> {
        match self {
            Channel::Coarse(channel) => channel.is_help_wanted(),
            Channel::Switching(channel) => channel.trigger_channel().is_help_wanted(),
            Channel::Fine(_) | Channel::Null(_) => Ok(false),
        }
    }

    /// Gets the coarse channel if this is one.
    pub fn as_coarse(&self) -> Option<&Arc<CoarseChannel>> {
        match self {
            Channel::Coarse(channel) => Some(channel),
            _ => None,
        }
    }

    /// Gets the switching channel if this is one.
    pub fn as_switching(&self) -> Option<&Arc<SwitchingChannel>> {
        match self {
            Channel::Switching(channel) => Some(channel),
            _ => None,
        }
    }
}
