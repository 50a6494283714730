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

/// How the image data of a resource is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Base64,
    Utf8,
}

/// The embedded image of a resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceImage {
    mime_type: String,
    data: String,
    encoding: ImageEncoding,
}

impl ResourceImage {
    /// Creates a new resource image.
    pub fn new(mime_type: String, data: String, encoding: ImageEncoding) -> ResourceImage {
        ResourceImage {
            mime_type,
            data,
            encoding,
        }
    }

    /// Gets the MIME type, e.g. "image/svg+xml".
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Gets the encoded image data.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Gets the encoding of the image data.
    pub fn encoding(&self) -> ImageEncoding {
        self.encoding
    }

    /// Gets the image as a data URL.
    pub fn data_url(&self) -> String {
        match self.encoding {
            ImageEncoding::Base64 => format!("data:{};base64,{}", self.mime_type, self.data),
            ImageEncoding::Utf8 => format!("data:{};charset=utf8,{}", self.mime_type, self.data),
        }
    }
}

/// An embedded external asset like a gobo image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    key: String,
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
    source: Option<String>,
    #[serde(rename = "type")]
    resource_type: Option<String>,
    image: Option<ResourceImage>,
}

impl Resource {
    /// Gets the resource key, e.g. "gobos/dots".
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the search keywords.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Gets where the resource was taken from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Gets the resource type, e.g. "gobo".
    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    /// Gets the embedded image.
    pub fn image(&self) -> Option<&ResourceImage> {
        self.image.as_ref()
    }
}

/// A wheel slot's reference to a resource: embedded by the loader, or still a plain key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    Unresolved(String),
    Embedded(Resource),
}

impl ResourceRef {
    /// Gets the embedded resource, if the reference was resolved.
    pub fn resource(&self) -> Option<&Resource> {
        match self {
            ResourceRef::Embedded(resource) => Some(resource),
            ResourceRef::Unresolved(_) => None,
        }
    }
}
