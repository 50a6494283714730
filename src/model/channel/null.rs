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

use serde_json::json;

use super::{CoarseChannel, FixtureContext};
use crate::model::error::Result;

const NULL_KEY_PREFIX: &str = "null-";

/// A placeholder for a DMX address that a mode leaves unused.
#[derive(Debug)]
pub struct NullChannel {
    coarse_channel: Arc<CoarseChannel>,
}

impl NullChannel {
    /// Creates the n-th (1-based) null channel of a fixture.
    pub(crate) fn new(number: usize, fixture: Arc<FixtureContext>) -> Result<NullChannel> {
        let coarse_channel = CoarseChannel::new(
            format!("{}{}", NULL_KEY_PREFIX, number),
            &json!({
                "name": "Unused",
                "capability": { "type": "NoFunction" }
            }),
            fixture,
            None,
        )?;
        Ok(NullChannel {
            coarse_channel: Arc::new(coarse_channel),
        })
    }

    /// Returns true if the key is one of the generated null channel keys.
    pub fn is_null_key(key: &str) -> bool {
        key.strip_prefix(NULL_KEY_PREFIX)
            .is_some_and(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn key(&self) -> &str {
        self.coarse_channel.key()
    }

    pub fn name(&self) -> &str {
        self.coarse_channel.name()
    }

    /// Gets the no-function coarse channel this placeholder stands for.
    pub fn coarse_channel(&self) -> &Arc<CoarseChannel> {
        &self.coarse_channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::capability::CapabilityType;
    use crate::model::channel::ChannelType;

    #[test]
    fn test_null_channel() {
        let fixture = Arc::new(FixtureContext::new(
            "test".to_string(),
            "Test".to_string(),
            Vec::new(),
        ));
        let null = NullChannel::new(2, fixture).unwrap();
        assert_eq!(null.key(), "null-2");
        assert_eq!(null.name(), "Unused");
        let capabilities = null.coarse_channel().capabilities().unwrap();
        assert_eq!(capabilities.len(), 1);
        assert_eq!(capabilities[0].capability_type(), CapabilityType::NoFunction);
        assert_eq!(null.coarse_channel().channel_type(), Ok(ChannelType::Nothing));
    }

    #[test]
    fn test_is_null_key() {
        assert!(NullChannel::is_null_key("null-1"));
        assert!(NullChannel::is_null_key("null-12"));
        assert!(!NullChannel::is_null_key("null-"));
        assert!(!NullChannel::is_null_key("null-x"));
        assert!(!NullChannel::is_null_key("Dimmer"));
    }
}
