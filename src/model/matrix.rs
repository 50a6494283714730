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
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::error::{FixtureError, Result};
use crate::util::natural_cmp;

lazy_static! {
    static ref COMPARISON_CONSTRAINT: Regex = Regex::new(r"^(=|<=|>=)(\d+)$").unwrap();
    static ref MODULO_CONSTRAINT: Regex = Regex::new(r"^(\d+)n(?:\+(\d+))?$").unwrap();
}

/// A matrix axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Parses an axis order like "XYZ" or "ZYX". Every axis must appear exactly once.
    pub fn parse_order(literal: &str) -> Result<[Axis; 3]> {
        let axes: Vec<Axis> = literal
            .chars()
            .map(|c| match c {
                'X' => Ok(Axis::X),
                'Y' => Ok(Axis::Y),
                'Z' => Ok(Axis::Z),
                _ => Err(FixtureError::parse("axis order", literal)),
            })
            .collect::<Result<_>>()?;
        match axes.as_slice() {
            [a, b, c] if a != b && b != c && a != c => Ok([*a, *b, *c]),
            _ => Err(FixtureError::parse("axis order", literal)),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        write!(f, "{}", name)
    }
}

/// A 1-based (x, y, z) pixel position.
pub type PixelPosition = [u32; 3];

#[derive(Debug, Clone, PartialEq)]
enum NumberConstraint {
    Equal(u32),
    AtLeast(u32),
    AtMost(u32),
    /// Positions k*n + r for n >= 0.
    Modulo { k: u32, r: u32 },
}

impl NumberConstraint {
    fn parse(literal: &str) -> Result<NumberConstraint> {
        match literal {
            "even" => return Ok(NumberConstraint::Modulo { k: 2, r: 0 }),
            "odd" => return Ok(NumberConstraint::Modulo { k: 2, r: 1 }),
            _ => {}
        }

        let invalid = || FixtureError::parse("pixel group constraint", literal);
        if let Some(captures) = COMPARISON_CONSTRAINT.captures(literal) {
            let number = captures[2].parse::<u32>().map_err(|_| invalid())?;
            return Ok(match &captures[1] {
                "=" => NumberConstraint::Equal(number),
                ">=" => NumberConstraint::AtLeast(number),
                _ => NumberConstraint::AtMost(number),
            });
        }
        if let Some(captures) = MODULO_CONSTRAINT.captures(literal) {
            let k = captures[1].parse::<u32>().map_err(|_| invalid())?;
            let r = match captures.get(2) {
                Some(r) => r.as_str().parse::<u32>().map_err(|_| invalid())?,
                None => 0,
            };
            if k == 0 {
                return Err(invalid());
            }
            return Ok(NumberConstraint::Modulo { k, r });
        }
        Err(invalid())
    }

    fn matches(&self, position: u32) -> bool {
        match *self {
            NumberConstraint::Equal(number) => position == number,
            NumberConstraint::AtLeast(number) => position >= number,
            NumberConstraint::AtMost(number) => position <= number,
            NumberConstraint::Modulo { k, r } => position >= r && (position - r) % k == 0,
        }
    }
}

/// The constraints of a pixel group defined by position and name.
#[derive(Debug, Clone)]
struct GroupConstraints {
    axes: [Vec<NumberConstraint>; 3],
    names: Vec<Regex>,
}

fn constraint_literals(json: Option<&Value>) -> Result<Vec<String>> {
    match json {
        None => Ok(Vec::new()),
        Some(Value::String(literal)) => Ok(vec![literal.clone()]),
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| FixtureError::parse("pixel group constraint", value.to_string()))
            })
            .collect(),
        Some(other) => Err(FixtureError::parse("pixel group constraint", other.to_string())),
    }
}

impl GroupConstraints {
    fn from_json(json: &serde_json::Map<String, Value>) -> Result<GroupConstraints> {
        let mut axes: [Vec<NumberConstraint>; 3] = Default::default();
        for axis in Axis::ALL {
            let name = axis.to_string().to_lowercase();
            axes[axis.index()] = constraint_literals(json.get(&name))?
                .iter()
                .map(|literal| NumberConstraint::parse(literal))
                .collect::<Result<_>>()?;
        }
        let names = constraint_literals(json.get("name"))?
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|_| FixtureError::parse("pixel group name pattern", pattern.as_str()))
            })
            .collect::<Result<_>>()?;
        Ok(GroupConstraints { axes, names })
    }

    fn matches(&self, key: &str, position: PixelPosition) -> bool {
        Axis::ALL.iter().all(|axis| {
            self.axes[axis.index()]
                .iter()
                .all(|constraint| constraint.matches(position[axis.index()]))
        }) && self.names.iter().all(|pattern| pattern.is_match(key))
    }
}

/// The pixel address space of a multi-pixel fixture.
#[derive(Debug, Clone)]
pub struct Matrix {
    pixel_count: [usize; 3],
    /// Indexed [z][y][x]; None marks a position without a pixel.
    pixel_key_structure: Vec<Vec<Vec<Option<String>>>>,
    pixel_key_positions: Vec<(String, PixelPosition)>,
    positions_by_key: HashMap<String, PixelPosition>,
    pixel_keys: Vec<String>,
    pixel_groups: Vec<(String, Vec<String>)>,
}

impl Matrix {
    /// Creates a matrix from either `pixelCount` or `pixelKeys`, plus optional `pixelGroups`.
    pub fn from_json(json: &Value) -> Result<Matrix> {
        let pixel_key_structure = match (json.get("pixelKeys"), json.get("pixelCount")) {
            (Some(pixel_keys), _) => parse_pixel_key_structure(pixel_keys)?,
            (None, Some(pixel_count)) => {
                let pixel_count = parse_pixel_count(pixel_count)?;
                default_pixel_key_structure(pixel_count)?
            }
            (None, None) => {
                return Err(FixtureError::Reference(
                    "matrix needs either pixelCount or pixelKeys".to_string(),
                ))
            }
        };

        let pixel_count = [
            pixel_key_structure
                .iter()
                .flatten()
                .map(Vec::len)
                .max()
                .unwrap_or(0),
            pixel_key_structure.iter().map(Vec::len).max().unwrap_or(0),
            pixel_key_structure.len(),
        ];

        let mut pixel_key_positions = Vec::new();
        for (z, plane) in pixel_key_structure.iter().enumerate() {
            for (y, row) in plane.iter().enumerate() {
                for (x, key) in row.iter().enumerate() {
                    if let Some(key) = key {
                        let position = [x as u32 + 1, y as u32 + 1, z as u32 + 1];
                        pixel_key_positions.push((key.clone(), position));
                    }
                }
            }
        }
        let positions_by_key: HashMap<String, PixelPosition> =
            pixel_key_positions.iter().cloned().collect();

        let mut pixel_keys: Vec<String> = pixel_key_positions
            .iter()
            .map(|(key, _)| key.clone())
            .collect();
        pixel_keys.sort_by(|a, b| natural_cmp(a, b));

        let mut matrix = Matrix {
            pixel_count,
            pixel_key_structure,
            pixel_key_positions,
            positions_by_key,
            pixel_keys,
            pixel_groups: Vec::new(),
        };

        if let Some(groups) = json.get("pixelGroups") {
            let groups = groups.as_object().ok_or_else(|| {
                FixtureError::Json(format!("pixelGroups is not an object: {}", groups))
            })?;
            for (name, group) in groups {
                let keys = matrix.resolve_pixel_group(group)?;
                matrix.pixel_groups.push((name.clone(), keys));
            }
        }
        Ok(matrix)
    }

    fn resolve_pixel_group(&self, group: &Value) -> Result<Vec<String>> {
        match group {
            Value::String(all) if all == "all" => Ok(self.pixel_keys.clone()),
            Value::Array(keys) => keys
                .iter()
                .map(|key| {
                    key.as_str().map(str::to_string).ok_or_else(|| {
                        FixtureError::Json(format!("pixel group key is not a string: {}", key))
                    })
                })
                .collect(),
            Value::Object(constraints) => {
                let constraints = GroupConstraints::from_json(constraints)?;
                Ok(self
                    .pixel_keys
                    .iter()
                    .filter(|key| {
                        self.positions_by_key
                            .get(key.as_str())
                            .is_some_and(|position| constraints.matches(key, *position))
                    })
                    .cloned()
                    .collect())
            }
            other => Err(FixtureError::parse("pixel group", other.to_string())),
        }
    }

    /// Gets the number of pixels along the X, Y and Z axes.
    pub fn pixel_count(&self) -> [usize; 3] {
        self.pixel_count
    }

    /// Gets the axes with more than one pixel.
    pub fn defined_axes(&self) -> Vec<Axis> {
        defined_axes(self.pixel_count)
    }

    pub fn pixel_key_structure(&self) -> &[Vec<Vec<Option<String>>>] {
        &self.pixel_key_structure
    }

    /// Gets every pixel key with its position, X varying fastest.
    pub fn pixel_key_positions(&self) -> &[(String, PixelPosition)] {
        &self.pixel_key_positions
    }

    pub fn get_pixel_position(&self, key: &str) -> Option<PixelPosition> {
        self.positions_by_key.get(key).copied()
    }

    /// Gets all pixel keys in natural order, so "2" sorts before "10".
    pub fn pixel_keys(&self) -> &[String] {
        &self.pixel_keys
    }

    /// Gets the pixel keys sorted by position on axis `c`, then `b`, then `a`.
    pub fn get_pixel_keys_by_order(&self, a: Axis, b: Axis, c: Axis) -> Vec<&str> {
        let mut positions: Vec<&(String, PixelPosition)> = self.pixel_key_positions.iter().collect();
        positions.sort_by_key(|(_, position)| {
            (
                position[c.index()],
                position[b.index()],
                position[a.index()],
            )
        });
        positions.into_iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Gets the pixel groups with their pixel keys in declaration order.
    pub fn pixel_groups(&self) -> &[(String, Vec<String>)] {
        &self.pixel_groups
    }

    pub fn pixel_group_keys(&self) -> impl Iterator<Item = &str> {
        self.pixel_groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn get_pixel_group(&self, name: &str) -> Option<&[String]> {
        self.pixel_groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, keys)| keys.as_slice())
    }

    /// Gets the pixel keys followed by the pixel group keys, i.e. every key a template channel
    /// is instantiated for.
    pub fn pixel_and_group_keys(&self) -> impl Iterator<Item = &str> {
        self.pixel_keys
            .iter()
            .map(String::as_str)
            .chain(self.pixel_group_keys())
    }
}

fn defined_axes(pixel_count: [usize; 3]) -> Vec<Axis> {
    Axis::ALL
        .into_iter()
        .filter(|axis| pixel_count[axis.index()] > 1)
        .collect()
}

fn parse_pixel_count(json: &Value) -> Result<[usize; 3]> {
    let counts: Vec<u64> = serde_json::from_value(json.clone())?;
    match counts.as_slice() {
        [x, y, z] if *x >= 1 && *y >= 1 && *z >= 1 => Ok([*x as usize, *y as usize, *z as usize]),
        _ => Err(FixtureError::Range(format!(
            "pixelCount must hold three positive numbers: {}",
            json
        ))),
    }
}

fn parse_pixel_key_structure(json: &Value) -> Result<Vec<Vec<Vec<Option<String>>>>> {
    Ok(serde_json::from_value(json.clone())?)
}

/// Generates the default pixel keys: "n" for one defined axis, "(a,b)" for two and "(x,y,z)"
/// for three.
fn default_pixel_key_structure(pixel_count: [usize; 3]) -> Result<Vec<Vec<Vec<Option<String>>>>> {
    let axes = defined_axes(pixel_count);
    if axes.is_empty() || axes.len() > 3 {
        return Err(FixtureError::Range(format!(
            "matrix with pixelCount {:?} has {} defined axes",
            pixel_count,
            axes.len()
        )));
    }

    let [x_count, y_count, z_count] = pixel_count;
    let key = |x: usize, y: usize, z: usize| -> String {
        match axes.as_slice() {
            [_] => x.max(y).max(z).to_string(),
            [_, _] => {
                let first = if axes.contains(&Axis::X) { x } else { y };
                let last = if axes.contains(&Axis::Z) { z } else { y };
                format!("({},{})", first, last)
            }
            _ => format!("({},{},{})", x, y, z),
        }
    };

    Ok((1..=z_count)
        .map(|z| {
            (1..=y_count)
                .map(|y| (1..=x_count).map(|x| Some(key(x, y, z))).collect())
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_one_dimensional_keys() {
        let matrix = Matrix::from_json(&json!({ "pixelCount": [4, 1, 1] })).unwrap();
        assert_eq!(matrix.pixel_keys(), ["1", "2", "3", "4"]);
        assert_eq!(matrix.defined_axes(), vec![Axis::X]);

        let matrix = Matrix::from_json(&json!({ "pixelCount": [1, 1, 12] })).unwrap();
        assert_eq!(matrix.pixel_keys()[..3], ["1", "2", "3"]);
        assert_eq!(matrix.pixel_keys()[11], "12");
        assert_eq!(matrix.get_pixel_position("10"), Some([1, 1, 10]));
    }

    #[test]
    fn test_two_dimensional_positions() {
        let matrix = Matrix::from_json(&json!({ "pixelCount": [2, 2, 1] })).unwrap();
        let positions: Vec<&str> = matrix
            .pixel_key_positions()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(positions, vec!["(1,1)", "(2,1)", "(1,2)", "(2,2)"]);
        assert_eq!(matrix.get_pixel_position("(2,1)"), Some([2, 1, 1]));

        let matrix = Matrix::from_json(&json!({ "pixelCount": [1, 2, 3] })).unwrap();
        assert_eq!(matrix.pixel_key_positions()[1].0, "(2,1)");
        assert_eq!(matrix.get_pixel_position("(2,3)"), Some([1, 2, 3]));
    }

    #[test]
    fn test_three_dimensional_keys() {
        let matrix = Matrix::from_json(&json!({ "pixelCount": [2, 2, 2] })).unwrap();
        assert_eq!(matrix.pixel_keys().len(), 8);
        assert_eq!(matrix.pixel_key_positions()[7].0, "(2,2,2)");
    }

    #[test]
    fn test_invalid_matrix() {
        assert!(matches!(
            Matrix::from_json(&json!({})),
            Err(FixtureError::Reference(_))
        ));
        assert!(matches!(
            Matrix::from_json(&json!({ "pixelCount": [1, 1, 1] })),
            Err(FixtureError::Range(_))
        ));
        assert!(matches!(
            Matrix::from_json(&json!({ "pixelCount": [0, 2, 1] })),
            Err(FixtureError::Range(_))
        ));
    }

    #[test]
    fn test_pixel_keys_structure() {
        let matrix = Matrix::from_json(&json!({
            "pixelKeys": [[
                ["Top", null, "Ring 10"],
                ["Ring 2", "Center"]
            ]]
        }))
        .unwrap();
        assert_eq!(matrix.pixel_count(), [3, 2, 1]);
        assert_eq!(matrix.pixel_keys(), ["Center", "Ring 2", "Ring 10", "Top"]);
        assert_eq!(matrix.get_pixel_position("Center"), Some([2, 2, 1]));
        assert_eq!(matrix.get_pixel_position("missing"), None);
    }

    #[test]
    fn test_pixel_keys_by_order() {
        let matrix = Matrix::from_json(&json!({ "pixelCount": [2, 2, 1] })).unwrap();
        assert_eq!(
            matrix.get_pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z),
            vec!["(1,1)", "(2,1)", "(1,2)", "(2,2)"]
        );
        assert_eq!(
            matrix.get_pixel_keys_by_order(Axis::Y, Axis::X, Axis::Z),
            vec!["(1,1)", "(1,2)", "(2,1)", "(2,2)"]
        );
    }

    #[test]
    fn test_pixel_groups() {
        let matrix = Matrix::from_json(&json!({
            "pixelCount": [6, 1, 1],
            "pixelGroups": {
                "All": "all",
                "Outer": ["1", "6"],
                "Even": { "x": "even" },
                "Odd": { "x": ["odd", ">=3"] },
                "Every third": { "x": "3n+1" },
                "Low": { "x": "<=2" },
                "Fifth": { "x": "=5", "name": "^5$" }
            }
        }))
        .unwrap();
        assert_eq!(
            matrix.pixel_group_keys().collect::<Vec<_>>(),
            vec!["All", "Outer", "Even", "Odd", "Every third", "Low", "Fifth"]
        );
        assert_eq!(matrix.get_pixel_group("All").unwrap().len(), 6);
        assert_eq!(matrix.get_pixel_group("Outer").unwrap(), ["1", "6"]);
        assert_eq!(matrix.get_pixel_group("Even").unwrap(), ["2", "4", "6"]);
        assert_eq!(matrix.get_pixel_group("Odd").unwrap(), ["3", "5"]);
        assert_eq!(matrix.get_pixel_group("Every third").unwrap(), ["1", "4"]);
        assert_eq!(matrix.get_pixel_group("Low").unwrap(), ["1", "2"]);
        assert_eq!(matrix.get_pixel_group("Fifth").unwrap(), ["5"]);
        assert_eq!(matrix.pixel_and_group_keys().count(), 13);
    }

    #[test]
    fn test_invalid_constraints() {
        for constraint in ["evn", "0n+1", "<3", "n"] {
            let result = Matrix::from_json(&json!({
                "pixelCount": [4, 1, 1],
                "pixelGroups": { "Bad": { "x": constraint } }
            }));
            assert_eq!(
                result.err(),
                Some(FixtureError::parse("pixel group constraint", constraint))
            );
        }
    }

    #[test]
    fn test_parse_axis_order() {
        assert_eq!(Axis::parse_order("ZXY"), Ok([Axis::Z, Axis::X, Axis::Y]));
        assert!(Axis::parse_order("XXY").is_err());
        assert!(Axis::parse_order("XY").is_err());
        assert!(Axis::parse_order("XYW").is_err());
    }
}
