//! Account roles and the operator invoking a privileged command

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::record::{str_field, Record};
use crate::error::{OrtomatError, OrtomatResult};

/// Role stored on account records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Doctor,
    Courier,
}

impl Role {
    /// Parse the role string stored on an account record
    pub fn parse(value: &str) -> Option<Role> {
        match value.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "DOCTOR" => Some(Role::Doctor),
            "COURIER" => Some(Role::Courier),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Doctor => write!(f, "DOCTOR"),
            Role::Courier => write!(f, "COURIER"),
        }
    }
}

/// Whoever is running a backup operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub email: String,
    pub role: Role,
}

impl Operator {
    /// Operator used when the store holds no accounts yet
    pub fn bootstrap(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: Role::Admin,
        }
    }

    /// Build an operator from an account record
    pub fn from_account(account: &Record) -> OrtomatResult<Self> {
        let email = str_field(account, "email").ok_or_else(|| {
            OrtomatError::constraint(EntityKind::Accounts, "account record has no email")
        })?;
        let role = str_field(account, "role")
            .and_then(Role::parse)
            .ok_or_else(|| {
                OrtomatError::constraint(
                    EntityKind::Accounts,
                    format!("account '{}' has no valid role", email),
                )
            })?;

        Ok(Self {
            email: email.to_string(),
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail unless the operator may run privileged backup commands
    pub fn require_admin(&self, action: &str) -> OrtomatResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(OrtomatError::Forbidden(format!(
                "{} requires an ADMIN account, '{}' is {}",
                action, self.email, self.role
            )))
        }
    }
}
