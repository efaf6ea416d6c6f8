//! Person (identity) models

use serde::{Deserialize, Serialize};

/// Someone who can own cultivation management records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: PersonRole,
}

/// Role of a person in the host application
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    Admin,
    User,
}

impl PersonRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonRole::Admin => "admin",
            PersonRole::User => "user",
        }
    }
}

impl std::str::FromStr for PersonRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(PersonRole::Admin),
            "user" => Ok(PersonRole::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Input for creating or editing a person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonInput {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}
