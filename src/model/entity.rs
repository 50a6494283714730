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

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{FixtureError, Result};

lazy_static! {
    static ref ENTITY_PATTERN: Regex = Regex::new(r"^([\d.-]+)(.*)$").unwrap();
}

/// Keywords that stand in for a fixed percentage.
const KEYWORDS: &[(&str, f64)] = &[
    // speed
    ("fast reverse", -100.0),
    ("slow reverse", -1.0),
    ("stop", 0.0),
    ("slow", 1.0),
    ("fast", 100.0),
    // rotation speed
    ("slow CW", 1.0),
    ("fast CW", 100.0),
    ("slow CCW", -1.0),
    ("fast CCW", -100.0),
    // time
    ("instant", 0.0),
    ("short", 1.0),
    ("long", 100.0),
    // distance
    ("near", 1.0),
    ("far", 100.0),
    // brightness
    ("off", 0.0),
    ("dark", 1.0),
    ("bright", 100.0),
    // color temperature
    ("warm", -100.0),
    ("CTO", -100.0),
    ("default", 0.0),
    ("cold", 100.0),
    ("CTB", 100.0),
    // beam angle
    ("closed", 0.0),
    ("narrow", 1.0),
    ("wide", 100.0),
    // horizontal / vertical angle
    ("left", -100.0),
    ("center", 0.0),
    ("right", 100.0),
    ("top", -100.0),
    ("bottom", 100.0),
    // parameter
    ("weak", 1.0),
    ("strong", 100.0),
    ("low", 1.0),
    ("high", 100.0),
    ("small", 1.0),
    ("big", 100.0),
];

/// A physical value like "50%", "3000K" or "fast CW".
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    number: f64,
    unit: String,
    keyword: Option<String>,
}

impl Entity {
    /// Creates a new entity without a keyword.
    pub fn new(number: f64, unit: impl Into<String>) -> Entity {
        Entity {
            number,
            unit: unit.into(),
            keyword: None,
        }
    }

    /// Parses an entity string. Keywords resolve to their fixed percentage.
    pub fn parse(literal: &str) -> Result<Entity> {
        if let Some((keyword, number)) = KEYWORDS.iter().find(|(keyword, _)| *keyword == literal)
        {
            return Ok(Entity {
                number: *number,
                unit: "%".to_string(),
                keyword: Some(keyword.to_string()),
            });
        }

        let captures = ENTITY_PATTERN
            .captures(literal)
            .ok_or_else(|| FixtureError::parse("entity", literal))?;
        let number = captures[1]
            .parse::<f64>()
            .map_err(|_| FixtureError::parse("entity", literal))?;

        Ok(Entity::new(number, &captures[2]))
    }

    /// Gets the numeric value.
    pub fn number(&self) -> f64 {
        self.number
    }

    /// Gets the unit. Keyword entities always use "%".
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Gets the keyword this entity was parsed from, if any.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Converts the entity into its base unit: ms become s, bpm and rpm become Hz.
    /// Entities already in a base unit are returned unchanged.
    pub fn to_base_unit(&self) -> Entity {
        match self.unit.as_str() {
            "ms" => Entity::new(self.number / 1000.0, "s"),
            "bpm" | "rpm" => Entity::new(self.number / 60.0, "Hz"),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keyword {
            Some(keyword) => write!(f, "{}", keyword),
            None => write!(f, "{}{}", self.number, self.unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_and_unit() {
        let entity = Entity::parse("3000K").unwrap();
        assert_eq!(entity.number(), 3000.0);
        assert_eq!(entity.unit(), "K");
        assert_eq!(entity.keyword(), None);

        let entity = Entity::parse("-12.5deg").unwrap();
        assert_eq!(entity.number(), -12.5);
        assert_eq!(entity.unit(), "deg");

        let entity = Entity::parse("50%").unwrap();
        assert_eq!(entity, Entity::new(50.0, "%"));
    }

    #[test]
    fn test_parse_keywords() {
        let fast = Entity::parse("fast").unwrap();
        assert_eq!(fast.number(), 100.0);
        assert_eq!(fast.unit(), "%");
        assert_eq!(fast.keyword(), Some("fast"));

        assert_eq!(Entity::parse("slow").unwrap().number(), 1.0);
        assert_eq!(Entity::parse("stop").unwrap().number(), 0.0);
        assert_eq!(Entity::parse("fast CCW").unwrap().number(), -100.0);
        assert_eq!(Entity::parse("fast CW").unwrap().to_string(), "fast CW");
    }

    #[test]
    fn test_keyword_is_not_equal_to_plain_percentage() {
        let keyword = Entity::parse("fast").unwrap();
        let plain = Entity::parse("100%").unwrap();
        assert_ne!(keyword, plain);
        assert_eq!(keyword.number(), plain.number());
    }

    #[test]
    fn test_parse_errors() {
        for literal in ["", "fastest", "%", "Hz", "1.2.3Hz", "--"] {
            match Entity::parse(literal) {
                Err(FixtureError::Parse { what, literal: got }) => {
                    assert_eq!(what, "entity");
                    assert_eq!(got, literal);
                }
                other => panic!("expected parse error for {:?}, got {:?}", literal, other),
            }
        }
    }

    #[test]
    fn test_to_base_unit() {
        assert_eq!(
            Entity::parse("500ms").unwrap().to_base_unit(),
            Entity::new(0.5, "s")
        );
        assert_eq!(
            Entity::parse("120bpm").unwrap().to_base_unit(),
            Entity::new(2.0, "Hz")
        );
        assert_eq!(
            Entity::parse("30rpm").unwrap().to_base_unit(),
            Entity::new(0.5, "Hz")
        );

        let hertz = Entity::parse("10Hz").unwrap();
        assert_eq!(hertz.to_base_unit(), hertz);
        let keyword = Entity::parse("slow").unwrap();
        assert_eq!(keyword.to_base_unit(), keyword);
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::parse("50%").unwrap().to_string(), "50%");
        assert_eq!(Entity::parse("2.5Hz").unwrap().to_string(), "2.5Hz");
        assert_eq!(Entity::parse("off").unwrap().to_string(), "off");
    }
}
