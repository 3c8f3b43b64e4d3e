//! Identity models
//!
//! The authentication collaborator owns users; the chat core only sees a
//! read-only snapshot of whoever is signed in, or mints a guest.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::now_millis;

/// Display name used for guest senders
pub const GUEST_DISPLAY_NAME: &str = "Khách hàng";

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    #[serde(alias = "Staff", alias = "STAFF")]
    Staff,
    #[serde(alias = "Customer", alias = "CUSTOMER")]
    Customer,
    #[serde(alias = "Admin", alias = "ADMIN")]
    Admin,
}

impl SenderRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            SenderRole::Staff => "Staff",
            SenderRole::Customer => "Customer",
            SenderRole::Admin => "Admin",
        }
    }

    /// Parse a role name as typed by a user (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "staff" => Some(SenderRole::Staff),
            "customer" => Some(SenderRole::Customer),
            "admin" => Some(SenderRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for SenderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The signed-in user as reported by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: SenderRole,
}

impl UserSnapshot {
    pub fn new(id: impl Into<String>, role: SenderRole) -> Self {
        Self {
            id: id.into(),
            fullname: None,
            email: None,
            role,
        }
    }

    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Full name, falling back to email, then to the id
    pub fn display_name(&self) -> &str {
        non_blank(self.fullname.as_deref())
            .or_else(|| non_blank(self.email.as_deref()))
            .unwrap_or(&self.id)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Identity used to stamp outgoing messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(UserSnapshot),
    Guest { id: String },
}

impl Identity {
    /// Mint a fresh anonymous guest (`guest_<millis>`)
    pub fn guest() -> Self {
        Identity::Guest {
            id: format!("guest_{}", now_millis()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Identity::Authenticated(user) => &user.id,
            Identity::Guest { id } => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::Authenticated(user) => user.display_name(),
            Identity::Guest { .. } => GUEST_DISPLAY_NAME,
        }
    }

    pub fn role(&self) -> SenderRole {
        match self {
            Identity::Authenticated(user) => user.role,
            Identity::Guest { .. } => SenderRole::Customer,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest { .. })
    }
}

impl From<UserSnapshot> for Identity {
    fn from(user: UserSnapshot) -> Self {
        Identity::Authenticated(user)
    }
}

/// Storefront records may carry numeric user ids
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}
