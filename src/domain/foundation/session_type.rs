//! Session category and level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use super::ValidationError;

/// The dance style taught in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salsa,
    Bachata,
    Reggaeton,
}

impl Category {
    /// Returns all categories in canonical order.
    pub fn all() -> &'static [Category] {
        &[Category::Salsa, Category::Bachata, Category::Reggaeton]
    }

    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salsa => "salsa",
            Category::Bachata => "bachata",
            Category::Reggaeton => "reggaeton",
        }
    }

    /// Returns the allowed levels, or `None` if the category has no levels.
    pub fn levels(&self) -> Option<RangeInclusive<u8>> {
        match self {
            Category::Salsa => Some(1..=3),
            Category::Bachata => Some(1..=2),
            Category::Reggaeton => None,
        }
    }

    /// Returns every valid type within this category.
    pub fn session_types(&self) -> Vec<SessionType> {
        match self.levels() {
            Some(levels) => levels
                .map(|level| SessionType {
                    category: *self,
                    level: Some(level),
                })
                .collect(),
            None => vec![SessionType {
                category: *self,
                level: None,
            }],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "salsa" => Ok(Category::Salsa),
            "bachata" => Ok(Category::Bachata),
            "reggaeton" => Ok(Category::Reggaeton),
            other => Err(ValidationError::invalid_format(
                "type",
                format!(
                    "Invalid class type: {}. Must be one of: salsa, bachata, reggaeton",
                    other
                ),
            )),
        }
    }
}

/// Category plus level. Salsa takes levels 1-3, bachata 1-2, reggaeton none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionType {
    category: Category,
    level: Option<u8>,
}

impl SessionType {
    /// Creates a validated session type.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if a levelled category is given no level
    /// - `OutOfRange` if the level is outside the category's range
    /// - `NotAllowed` if a level is given for a category without levels
    pub fn new(category: Category, level: Option<u8>) -> Result<Self, ValidationError> {
        match (category.levels(), level) {
            (Some(range), Some(level)) if !range.contains(&level) => {
                Err(ValidationError::out_of_range(
                    "level",
                    i64::from(*range.start()),
                    i64::from(*range.end()),
                    i64::from(level),
                ))
            }
            (Some(_), None) => Err(ValidationError::empty_field("level")),
            (None, Some(_)) => Err(ValidationError::not_allowed(
                "level",
                format!("{} does not have levels", category),
            )),
            _ => Ok(Self { category, level }),
        }
    }

    /// Returns the category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the level, if the category has levels.
    pub fn level(&self) -> Option<u8> {
        self.level
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Some(level) => write!(f, "{}/{}", self.category, level),
            None => write!(f, "{}", self.category),
        }
    }
}
