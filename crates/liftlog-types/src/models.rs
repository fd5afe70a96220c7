use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// General exercise category. An exercise without one is stored as `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cardio,
    Strength,
    Flexibility,
    Balance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardio => "cardio",
            Self::Strength => "strength",
            Self::Flexibility => "flexibility",
            Self::Balance => "balance",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cardio" => Ok(Self::Cardio),
            "strength" => Ok(Self::Strength),
            "flexibility" => Ok(Self::Flexibility),
            "balance" => Ok(Self::Balance),
            other => Err(UnknownChoice(other.to_string())),
        }
    }
}

/// Primary muscle group targeted by an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Arms,
    Shoulders,
    Core,
}

impl MuscleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Legs => "legs",
            Self::Arms => "arms",
            Self::Shoulders => "shoulders",
            Self::Core => "core",
        }
    }
}

impl FromStr for MuscleGroup {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chest" => Ok(Self::Chest),
            "back" => Ok(Self::Back),
            "legs" => Ok(Self::Legs),
            "arms" => Ok(Self::Arms),
            "shoulders" => Ok(Self::Shoulders),
            "core" => Ok(Self::Core),
            other => Err(UnknownChoice(other.to_string())),
        }
    }
}

/// Returned when a stored choice column holds a value outside its enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown choice '{0}'")]
pub struct UnknownChoice(pub String);

/// Direction for the scheduled workout listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only a case-insensitive `desc` flips the order; anything else is ascending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(p) if p.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}
