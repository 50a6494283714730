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

//! The fixture definition model. A [`Fixture`] is built from immutable JSON; every derived
//! property is resolved lazily and memoized.

pub mod capability;
pub mod channel;
pub mod dmx;
pub mod entity;
pub mod error;
pub mod fixture;
pub mod matrix;
pub mod meta;
pub mod mode;
pub mod physical;
pub mod range;
pub mod registry;
pub mod resource;
pub mod wheel;


pub use capability::{Capability, CapabilityType, EntityProperty, EntityRange, MenuClick};
pub use channel::{
    Channel, ChannelType, CoarseChannel, FineChannel, FixtureContext, NullChannel, Precedence,
    SwitchingChannel, SwitchingChannelBehavior, TemplateChannel,
};
pub use dmx::Resolution;
pub use entity::Entity;
pub use error::{FixtureError, Result};
pub use fixture::Fixture;
pub use matrix::{Axis, Matrix, PixelPosition};
pub use meta::{ImportPlugin, Manufacturer, Meta, Rdm};
pub use mode::Mode;
pub use physical::Physical;
pub use range::Range;
pub use registry::ChannelRegistry;
pub use resource::{ImageEncoding, Resource, ResourceImage, ResourceRef};
pub use wheel::{Wheel, WheelDirection, WheelSlot, WheelSlotType, WheelType};
