//! Policy of every resource operation the API exposes.
//!
//! Handlers never pick a policy themselves; routers look it up here.

use strum::{Display, EnumString, VariantArray};

use crate::config::AuthConfig;
use crate::policy::Policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantArray)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Business,
    Investible,
    Marker,
    Report,
    Location,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantArray)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::List | Operation::Retrieve)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Catalogue {
    open_registration: bool,
}

impl Catalogue {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            open_registration: config.open_registration,
        }
    }

    /// `None` means the operation does not exist and must not be routed.
    pub fn policy(&self, resource: Resource, operation: Operation) -> Option<Policy> {
        let policy = match (resource, operation) {
            // Map data is public to read.
            (Resource::Business | Resource::Investible | Resource::Marker, op) if op.is_read() => {
                Policy::Public
            }
            (Resource::Business | Resource::Investible | Resource::Marker, _) => {
                Policy::AuthenticatedOnly
            }
            (Resource::Report | Resource::Location, _) => Policy::AuthenticatedOnly,

            (Resource::User, Operation::List | Operation::Retrieve) => Policy::AuthenticatedOnly,
            (Resource::User, Operation::Create) if self.open_registration => Policy::Public,
            (Resource::User, Operation::Create) => Policy::AdminOnly,
            (Resource::User, Operation::Update) => Policy::SelfOrAdmin,
            (Resource::User, Operation::Delete) => return None,
        };

        Some(policy)
    }
}
