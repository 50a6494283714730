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

/// A fixture manufacturer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    #[serde(skip)]
    key: String,
    name: String,
    website: Option<String>,
    comment: Option<String>,
    rdm_id: Option<u32>,
}

impl Manufacturer {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Manufacturer {
        Manufacturer {
            key: key.into(),
            name: name.into(),
            website: None,
            comment: None,
            rdm_id: None,
        }
    }

    /// Sets the key of a manufacturer read from the manufacturer list, where it is the map key.
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Manufacturer {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Gets the ESTA manufacturer ID used by RDM.
    pub fn rdm_id(&self) -> Option<u32> {
        self.rdm_id
    }
}

/// Information about the plugin a fixture was imported with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportPlugin {
    plugin: String,
    date: String,
    comment: Option<String>,
}

impl ImportPlugin {
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// The history of a fixture definition. Dates are ISO 8601 strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    create_date: String,
    #[serde(default)]
    last_modify_date: String,
    import_plugin: Option<ImportPlugin>,
}

impl Meta {
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn create_date(&self) -> &str {
        &self.create_date
    }

    pub fn last_modify_date(&self) -> &str {
        &self.last_modify_date
    }

    pub fn import_plugin(&self) -> Option<&ImportPlugin> {
        self.import_plugin.as_ref()
    }
}

/// RDM identification of a fixture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rdm {
    model_id: u32,
    software_version: Option<String>,
}

impl Rdm {
    pub fn model_id(&self) -> u32 {
        self.model_id
    }

    pub fn software_version(&self) -> Option<&str> {
        self.software_version.as_deref()
    }
}
