use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

/// Role of a principal.
///
/// Parsing is case-insensitive so rows written with the legacy lowercase
/// spelling (`admin`, `employee`) load as the canonical variant. The legacy
/// `investor` role has no variant and is rejected.
#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    #[serde(alias = "admin")]
    Admin,
    #[default]
    #[serde(alias = "employee")]
    Employee,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Status {
    #[default]
    #[serde(alias = "active")]
    #[strum(to_string = "online", serialize = "active")]
    Online,
    #[strum(to_string = "offline")]
    Offline,
    #[serde(alias = "archive")]
    #[strum(to_string = "archived", serialize = "archive")]
    Archived,
}

impl Status {
    /// Archived principals can no longer sign in.
    pub fn can_login(&self) -> bool {
        *self != Status::Archived
    }
}
