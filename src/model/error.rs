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

use std::sync::OnceLock;

/// Errors raised while resolving a fixture definition.
///
/// The engine assumes schema-valid input. These errors cover the semantic problems a schema
/// cannot express, and are raised by the property or method that first detects them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FixtureError {
    #[error("could not parse {what} from '{literal}'")]
    Parse { what: &'static str, literal: String },

    #[error("range error: {0}")]
    Range(String),

    #[error("reference error: {0}")]
    Reference(String),

    #[error("invalid fixture JSON: {0}")]
    Json(String),
}

impl FixtureError {
    pub(crate) fn parse(what: &'static str, literal: impl Into<String>) -> FixtureError {
        FixtureError::Parse {
            what,
            literal: literal.into(),
        }
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(err: serde_json::Error) -> Self {
        FixtureError::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FixtureError>;

/// Returns the memoized value of a fallible property, computing it on first access.
/// A failure is memoized as well, so every later access reports the same error.
pub(crate) fn memoized<T>(
    cell: &OnceLock<Result<T>>,
    init: impl FnOnce() -> Result<T>,
) -> Result<&T> {
    cell.get_or_init(init).as_ref().map_err(Clone::clone)
}
