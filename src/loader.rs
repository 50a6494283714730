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

//! Reads fixture definitions from an Open Fixture Library style directory tree. The model
//! never touches the file system; everything it needs is read here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::Settings;
use crate::model::{Fixture, FixtureError, Manufacturer};

const MANUFACTURERS_FILE: &str = "manufacturers.json";

/// Image files that may sit next to a resource definition, in lookup order.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown manufacturer '{0}'")]
    UnknownManufacturer(String),

    #[error(transparent)]
    Model(#[from] FixtureError),
}

/// Loads manufacturers and fixtures from a fixture library.
#[derive(Debug, Clone)]
pub struct Loader {
    library: PathBuf,
    resources: PathBuf,
    embed_resources: bool,
}

impl Loader {
    /// Creates a new loader.
    pub fn new(settings: &Settings) -> Loader {
        Loader {
            library: settings.library(),
            resources: settings.resources(),
            embed_resources: settings.embed_resources(),
        }
    }

    /// Reads all manufacturers in the order they are listed.
    pub fn load_manufacturers(&self) -> Result<Vec<Manufacturer>, LoadError> {
        let path = self.library.join(MANUFACTURERS_FILE);
        let manufacturers: Map<String, Value> = read_json(&path)?;

        let manufacturers = manufacturers
            .into_iter()
            .filter(|(key, _)| !key.starts_with('$'))
            .map(|(key, json)| {
                Manufacturer::deserialize(json)
                    .map(|manufacturer| manufacturer.with_key(key))
                    .map_err(|source| LoadError::Json {
                        path: path.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = manufacturers.len(), "Loaded manufacturers");
        Ok(manufacturers)
    }

    /// Gets the keys of all fixtures of a manufacturer, sorted.
    pub fn list_fixtures(&self, manufacturer_key: &str) -> Result<Vec<String>, LoadError> {
        let dir = self.library.join(manufacturer_key);
        let io_error = |source: io::Error| LoadError::Io {
            path: dir.clone(),
            source,
        };

        let mut keys = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Reads a fixture definition and builds the fixture.
    pub fn load_fixture(
        &self,
        manufacturer_key: &str,
        fixture_key: &str,
    ) -> Result<Fixture, LoadError> {
        let manufacturer = self
            .load_manufacturers()?
            .into_iter()
            .find(|manufacturer| manufacturer.key() == manufacturer_key)
            .ok_or_else(|| LoadError::UnknownManufacturer(manufacturer_key.to_string()))?;

        let path = self
            .library
            .join(manufacturer_key)
            .join(format!("{}.json", fixture_key));
        info!(
            manufacturer = manufacturer_key,
            fixture = fixture_key,
            path = %path.display(),
            "Loading fixture"
        );
        let mut json: Value = read_json(&path)?;
        if self.embed_resources {
            self.embed_wheel_resources(&mut json)?;
        }

        Ok(Fixture::new(fixture_key, manufacturer, json)?)
    }

    /// Replaces string resource references of wheel slots by the resource objects they name.
    /// References that cannot be resolved are left alone.
    fn embed_wheel_resources(&self, json: &mut Value) -> Result<(), LoadError> {
        let Some(wheels) = json.get_mut("wheels").and_then(Value::as_object_mut) else {
            return Ok(());
        };

        for (wheel_name, wheel) in wheels.iter_mut() {
            let Some(slots) = wheel.get_mut("slots").and_then(Value::as_array_mut) else {
                continue;
            };
            for slot in slots.iter_mut() {
                let Some(reference) = slot.get("resource").and_then(Value::as_str) else {
                    continue;
                };
                let reference = reference.to_string();
                match self.load_resource(&reference)? {
                    Some(resource) => slot["resource"] = resource,
                    None => warn!(
                        wheel = wheel_name.as_str(),
                        resource = reference.as_str(),
                        "Could not resolve wheel slot resource"
                    ),
                }
            }
        }
        Ok(())
    }

    /// Builds the inline object of a resource like "gobos/dots" from gobos/dots.json and an
    /// optional sibling image.
    fn load_resource(&self, reference: &str) -> Result<Option<Value>, LoadError> {
        let path = self.resources.join(format!("{}.json", reference));
        if !path.is_file() {
            return Ok(None);
        }
        info!(resource = reference, "Embedding resource");

        let mut resource: Map<String, Value> = read_json(&path)?;
        resource.remove("$schema");
        resource.insert("key".to_string(), Value::from(reference));
        if !resource.contains_key("name") {
            let name = reference.rsplit('/').next().unwrap_or(reference);
            resource.insert("name".to_string(), Value::from(name));
        }
        if let Some((directory, _)) = reference.split_once('/') {
            let resource_type = directory.strip_suffix('s').unwrap_or(directory);
            resource.insert("type".to_string(), Value::from(resource_type));
        }
        if let Some(image) = self.load_resource_image(reference)? {
            resource.insert("image".to_string(), image);
        }

        Ok(Some(Value::Object(resource)))
    }

    fn load_resource_image(&self, reference: &str) -> Result<Option<Value>, LoadError> {
        for (extension, mime_type) in IMAGE_TYPES {
            let path = self.resources.join(format!("{}.{}", reference, extension));
            if !path.is_file() {
                continue;
            }

            let (data, encoding) = if *extension == "svg" {
                (read_to_string(&path)?, "utf8")
            } else {
                let bytes = fs::read(&path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                (
                    base64::engine::general_purpose::STANDARD.encode(bytes),
                    "base64",
                )
            };
            return Ok(Some(serde_json::json!({
                "mimeType": mime_type,
                "data": data,
                "encoding": encoding,
            })));
        }
        Ok(None)
    }
}

/// Builds a fixture from an in-memory JSON definition.
pub fn fixture_from_str(
    manufacturer: Manufacturer,
    key: &str,
    json: &str,
) -> Result<Fixture, LoadError> {
    let json: Value = serde_json::from_str(json).map_err(|source| LoadError::Json {
        path: PathBuf::from(key),
        source,
    })?;
    Ok(Fixture::new(key, manufacturer, json)?)
}

fn read_to_string(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    serde_json::from_str(&read_to_string(path)?).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
