use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Player,
}

impl Role {
    /// Parses the role column of a directory row. Unknown values fall back to `Player`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            _ => Role::Player,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Player => "player",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> Self {
        Email(raw.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub email: Email,
    pub display_name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_lenient() {
        assert_eq!(Role::parse_lenient("Admin"), Role::Admin);
        assert_eq!(Role::parse_lenient(" MANAGER "), Role::Manager);
        assert_eq!(Role::parse_lenient("player"), Role::Player);
        assert_eq!(Role::parse_lenient("coach"), Role::Player);
        assert_eq!(Role::parse_lenient(""), Role::Player);
    }

    #[test]
    fn test_email_normalized() {
        assert_eq!(Email::new("  Ana@Example.COM "), Email::new("ana@example.com"));
        assert_eq!(Email::new("Ana@Example.com").as_str(), "ana@example.com");
    }
}
