use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use declarant_auth::{IssuedToken, NewPrincipal, Principal, Role};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub document_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub document_number: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl RegisterRequest {
    /// Split into identity fields and the optional secret.
    pub fn into_parts(self) -> (NewPrincipal, Option<String>) {
        let identity = NewPrincipal {
            full_name: self.full_name,
            document_number: self.document_number,
            email: self.email,
            phone_number: self.phone_number,
            role: self.role.unwrap_or_default(),
        };
        (identity, self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: Principal,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionResponse {
    pub fn new(user: Principal, issued: IssuedToken) -> Self {
        Self {
            user,
            expires_at: issued.claims.expires_at,
            token: issued.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: Principal,
}
