//! Tenants and the users acting on their behalf.

use serde::{Deserialize, Serialize};

/// Role a user holds within its tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    #[default]
    User,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Editor => write!(f, "editor"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" | "administrator" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "user" => Ok(Self::User),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// A user authenticated through its API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// URI identifying the user in RDF metadata (creator, contributor, ...).
    pub uri: String,
    pub name: String,
    /// Code of the tenant the user belongs to.
    pub tenant: String,
    pub role: UserRole,
    /// API key; never serialized back out.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// An owning organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub users: Vec<User>,
}

impl Tenant {
    /// Users of this tenant holding `role`.
    pub fn users_with_role(&self, role: UserRole) -> impl Iterator<Item = &User> {
        self.users.iter().filter(move |u| u.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            uri: "http://x/users/1".to_string(),
            name: "Ada".to_string(),
            tenant: "beng".to_string(),
            role,
            api_key: Some("secret".to_string()),
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("Editor".parse::<UserRole>().unwrap(), UserRole::Editor);
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let json = serde_json::to_value(user(UserRole::Admin)).unwrap();
        assert!(json.get("api_key").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_users_with_role() {
        let tenant = Tenant {
            code: "beng".to_string(),
            name: "Beeld en Geluid".to_string(),
            users: vec![user(UserRole::Admin), user(UserRole::User)],
        };
        assert_eq!(tenant.users_with_role(UserRole::Admin).count(), 1);
        assert!(user(UserRole::Admin).is_admin());
        assert!(!user(UserRole::Editor).is_admin());
    }
}
