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

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

mod error;

pub use self::error::ConfigError;

const DEFAULT_LIBRARY: &str = "fixtures";

/// Settings of the fixture library loader.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Settings {
    /// The root of the fixture library, holding manufacturers.json and one directory per
    /// manufacturer.
    library: Option<PathBuf>,

    /// The directory of embeddable resources. Defaults to a resources directory next to the
    /// library.
    resources: Option<PathBuf>,

    /// Whether wheel slot resource references are replaced by the resource itself.
    embed_resources: Option<bool>,
}

impl Settings {
    /// Creates new settings.
    pub fn new(
        library: Option<PathBuf>,
        resources: Option<PathBuf>,
        embed_resources: Option<bool>,
    ) -> Settings {
        Settings {
            library,
            resources,
            embed_resources,
        }
    }

    /// Loads settings from an optional YAML file, overridden by FIXTUREDEF_* environment
    /// variables.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        Ok(builder
            .add_source(Environment::with_prefix("FIXTUREDEF").try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// Returns a copy of these settings reading from the given library.
    pub fn with_library(mut self, library: PathBuf) -> Settings {
        self.library = Some(library);
        self
    }

    /// Gets the library root.
    pub fn library(&self) -> PathBuf {
        self.library
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY))
    }

    /// Gets the resources directory.
    pub fn resources(&self) -> PathBuf {
        self.resources
            .clone()
            .unwrap_or_else(|| self.library().join("..").join("resources"))
    }

    /// Whether resources are embedded into wheel slots.
    pub fn embed_resources(&self) -> bool {
        self.embed_resources.unwrap_or(true)
    }
}
