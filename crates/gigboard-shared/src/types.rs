use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::KEY_NOTIFICATIONS_PREFIX;
use crate::error::SharedError;

/// Marketplace role. Notifications are partitioned by role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Client,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Client, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Client => "client",
            Self::Admin => "admin",
        }
    }

    /// Storage key of this role's notification collection.
    pub fn notifications_key(&self) -> String {
        format!("{KEY_NOTIFICATIONS_PREFIX}{}", self.as_str())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "client" => Ok(Self::Client),
            "admin" => Ok(Self::Admin),
            _ => Err(SharedError::UnknownRole(s.to_string())),
        }
    }
}

// Status fields are free-form strings in storage. Known values map to
// variants, anything else is kept verbatim in `Other`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($text => Self::$variant,)+
                    _ => Self::Other(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Lifecycle state of a gig. Transitions are not validated.
    GigStatus {
        Open => "open",
        Paused => "paused",
        Hired => "hired",
        Closed => "closed",
        Completed => "completed",
    }
}

string_enum! {
    ApplicationStatus {
        Pending => "pending",
        Hired => "hired",
        Completed => "completed",
        Rejected => "rejected",
    }
}

string_enum! {
    TransactionStatus {
        Pending => "pending",
        Completed => "completed",
    }
}

string_enum! {
    /// Severity shown next to a notification.
    NotificationKind {
        Info => "info",
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

impl Default for GigStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for NotificationKind {
    fn default() -> Self {
        Self::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn notification_keys_are_per_role() {
        assert_eq!(Role::Client.notifications_key(), "notifications_client");
        assert_ne!(
            Role::Student.notifications_key(),
            Role::Admin.notifications_key()
        );
    }

    #[test]
    fn known_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&GigStatus::Hired).unwrap();
        assert_eq!(json, "\"hired\"");
    }

    #[test]
    fn unknown_status_survives_deserialization() {
        let status: GigStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, GigStatus::Other("archived".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"archived\"");
    }
}
