use serde::{Deserialize, Serialize};
use tourbook_shared::Masked;

/// Rider gender for equipment sizing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "X")]
    NonBinary,
    #[serde(rename = "?")]
    Unknown,
}

impl Gender {
    /// Parses a form code; anything outside the fixed set is `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "F" | "f" => Some(Gender::Female),
            "M" | "m" => Some(Gender::Male),
            "X" | "x" => Some(Gender::NonBinary),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::NonBinary => "X",
            Gender::Unknown => "?",
        }
    }
}

/// One rider on a booking. `height` is `None` when not provided or invalid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rider {
    pub gender: Gender,
    pub height: Option<u16>,
}

/// Customer contact fields, already trimmed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: Masked<String>,
    pub mobile: String,
    pub hotel: String,
    pub misc: String,
}

impl Contact {
    /// Trims every field as submitted.
    pub fn trimmed(name: &str, email: &str, mobile: &str, hotel: &str, misc: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: Masked::from(email.trim()),
            mobile: mobile.trim().to_string(),
            hotel: hotel.trim().to_string(),
            misc: misc.trim().to_string(),
        }
    }
}
