use serde::{Deserialize, Serialize};

use super::user::AdminProfile;

/// Claims embedded in the JWT access token. `admin` carries the operator
/// claim the provisioning CLIs grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // admin user UUID
    pub admin: bool,
    pub exp: usize,
    pub iat: usize,
}

/// Who is acting, passed explicitly into every adapter call.
///
/// Deliberately not ambient state: handlers build it from the validated JWT
/// and thread it through, so authorization is testable without an identity
/// backend.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Option<String>,
    pub is_operator: bool,
}

impl Session {
    pub fn operator(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
            is_operator: true,
        }
    }

    pub fn signed_in(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
            is_operator: false,
        }
    }

    /// Audit-field value: the principal id, or the `unknown` sentinel.
    pub fn actor(&self) -> &str {
        self.principal.as_deref().unwrap_or("unknown")
    }

    pub fn require_operator(&self) -> Result<(), crate::error::StoreError> {
        if self.is_operator {
            Ok(())
        } else {
            Err(crate::error::StoreError::Permission)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: AdminProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn operator_check_needs_no_backend() {
        assert!(Session::operator("uid-1").require_operator().is_ok());
        assert!(matches!(
            Session::signed_in("uid-2").require_operator(),
            Err(StoreError::Permission)
        ));
    }

    #[test]
    fn actor_falls_back_to_sentinel() {
        let anonymous = Session {
            principal: None,
            is_operator: false,
        };
        assert_eq!(anonymous.actor(), "unknown");
        assert_eq!(Session::operator("uid-1").actor(), "uid-1");
    }
}
