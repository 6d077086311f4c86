use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    auth::{Claims, LoginResponse},
    user::{AdminProfile, AdminUser},
};

const ADMIN_COLS: &str = "id, email, password_hash, is_operator, created_at, updated_at";

pub struct AuthService;

impl AuthService {
    /// Validate credentials and issue an access token carrying the operator
    /// claim. Both "no such account" and "wrong password" collapse into the
    /// same message.
    pub async fn login(
        pool: &PgPool,
        email: &str,
        password: &str,
        jwt_secret: &str,
        expiry_seconds: u64,
    ) -> anyhow::Result<LoginResponse> {
        let user = sqlx::query_as::<_, AdminUser>(&format!(
            "SELECT {ADMIN_COLS} FROM admin_users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Invalid credentials"))?;

        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|_| anyhow::anyhow!("Invalid credentials"))?;
        if !valid {
            anyhow::bail!("Invalid credentials");
        }

        let access_token = Self::generate_access_token(&user, jwt_secret, expiry_seconds)?;
        Ok(LoginResponse {
            access_token,
            user: user.into(),
        })
    }

    pub fn generate_access_token(
        user: &AdminUser,
        secret: &str,
        expiry_seconds: u64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user.id.to_string(),
            admin: user.is_operator,
            exp: now + expiry_seconds as usize,
            iat: now,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub async fn fetch_profile(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<AdminProfile>> {
        let user = sqlx::query_as::<_, AdminUser>(&format!(
            "SELECT {ADMIN_COLS} FROM admin_users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(user.map(AdminProfile::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_access_token;

    fn operator_user() -> AdminUser {
        let now = Utc::now();
        AdminUser {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            password_hash: String::new(),
            is_operator: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trips_the_operator_claim() {
        let user = operator_user();
        let token = AuthService::generate_access_token(&user, "secret", 3600).unwrap();
        let session = decode_access_token(&token, "secret").unwrap();
        assert!(session.is_operator);
        assert_eq!(session.principal.as_deref(), Some(user.id.to_string().as_str()));
    }

    #[test]
    fn token_rejects_the_wrong_secret() {
        let user = operator_user();
        let token = AuthService::generate_access_token(&user, "secret", 3600).unwrap();
        assert!(decode_access_token(&token, "other-secret").is_err());
    }
}
