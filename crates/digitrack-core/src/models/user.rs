use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Facility staff role. The server enforces what each role may do; the
/// client only needs the enumeration for display and form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Operator,
    Manager,
    Panchayat,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Operator, Role::Manager, Role::Panchayat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::Manager => "manager",
            Role::Panchayat => "panchayat",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff account as returned by the API. The backing store is Mongo,
/// so the id arrives as `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub mrf_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Payload for registration and manager-side user creation. The password
/// travels in this request only; it is never stored by the client.
#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrf_id: Option<String>,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_parses_mongo_shape() {
        let json = r#"{
            "_id": "665f1c2ab1d2c3d4e5f60718",
            "email": "asha@mrf.example",
            "full_name": "Asha Nair",
            "role": "operator",
            "mrf_id": "MRF-KL-014",
            "is_active": true,
            "created_at": "2026-01-12T06:30:00Z",
            "updated_at": "2026-01-12T06:30:00Z"
        }"#;

        let user: User = serde_json::from_str(json).expect("valid user");
        assert_eq!(user.id, "665f1c2ab1d2c3d4e5f60718");
        assert_eq!(user.role, Role::Operator);
        assert_eq!(user.mrf_id.as_deref(), Some("MRF-KL-014"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let json = r#"{"_id": "x", "email": "a@b.c", "full_name": "A", "role": "admin"}"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }

    #[test]
    fn user_create_omits_absent_mrf_id() {
        let payload = UserCreate {
            email: "new@mrf.example".into(),
            full_name: "New Operator".into(),
            role: Role::Operator,
            mrf_id: None,
            password: "secret".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("mrf_id").is_none());
        assert_eq!(json["role"], "operator");
    }
}
