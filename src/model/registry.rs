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

use super::channel::Channel;

/// All channels of a fixture by key, in registry order.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
    index: HashMap<String, usize>,
}

impl ChannelRegistry {
    /// Adds a channel unless its key is already taken. Returns false if the channel was dropped.
    pub(crate) fn insert(&mut self, channel: Channel) -> bool {
        if self.index.contains_key(channel.key()) {
            return false;
        }
        self.index
            .insert(channel.key().to_string(), self.channels.len());
        self.channels.push(channel);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Channel> {
        self.index.get(key).map(|index| &self.channels[*index])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Channel> {
        self.channels.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(Channel::key)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl<'a> IntoIterator for &'a ChannelRegistry {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
