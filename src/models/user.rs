//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Token lifetime, fixed at one hour from issuance
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Permission level of an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "User_Admin")]
    Admin,
    #[serde(rename = "User_Standard")]
    Standard,
    #[serde(rename = "User_ReadOnly")]
    ReadOnly,
    /// Default for self-registered accounts
    #[default]
    #[serde(rename = "Member_Client")]
    MemberClient,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Standard, Role::ReadOnly, Role::MemberClient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "User_Admin",
            Role::Standard => "User_Standard",
            Role::ReadOnly => "User_ReadOnly",
            Role::MemberClient => "Member_Client",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid role: {}", s))
    }
}

// SQLx conversion for Role
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh, active user around an already hashed password
    pub fn new(username: String, password_hash: String, email: String, full_name: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            email,
            full_name,
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// Self-service registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub full_name: Option<String>,
}

/// Create user request (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: Role,
    pub full_name: Option<String>,
}

/// Update user request (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Claims for `user`, valid for [`TOKEN_LIFETIME_SECS`]
    pub fn for_user(user: &User, issuer: &str, audience: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            exp: now + TOKEN_LIFETIME_SECS,
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, AppError> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        // HMAC accepts a zero-length key, so reject it here
        if secret.is_empty() {
            return Err(AppError::Internal("JWT signing key must not be empty".to_string()));
        }

        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Parse and validate a JWT token (signature, expiry, issuer, audience)
    pub fn from_token(
        token: &str,
        secret: &str,
        issuer: &str,
        audience: &str,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

        // Anyone can sign with a zero-length key
        if secret.is_empty() {
            return Err(ErrorKind::InvalidKeyFormat.into());
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);

        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }

    /// Require the caller to hold one of `allowed`
    pub fn require_any_of(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Role {} is not allowed to perform this action",
                self.role
            )))
        }
    }

    /// Catalog and loan desk staff
    pub fn require_librarian(&self) -> Result<(), AppError> {
        self.require_any_of(&[Role::Admin, Role::Standard])
    }

    /// Staff, including read-only accounts
    pub fn require_staff(&self) -> Result<(), AppError> {
        self.require_any_of(&[Role::Admin, Role::Standard, Role::ReadOnly])
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User::new(
            "jdoe".to_string(),
            "hash".to_string(),
            "jdoe@library.test".to_string(),
            "John Doe".to_string(),
            role,
        )
    }

    #[test]
    fn role_strings_match_the_wire_names() {
        assert_eq!(serde_json::to_string(&Role::MemberClient).unwrap(), "\"Member_Client\"");
        assert_eq!("user_admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn token_round_trips_identity_and_role() {
        let user = user(Role::Standard);
        let claims = UserClaims::for_user(&user, "iss", "aud");
        let token = claims.create_token("secret").unwrap();

        let decoded = UserClaims::from_token(&token, "secret", "iss", "aud").unwrap();
        assert_eq!(decoded.sub, "jdoe");
        assert_eq!(decoded.user_id, user.id);
        assert_eq!(decoded.role, Role::Standard);
        assert_eq!(decoded.exp - decoded.iat, TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn token_rejected_for_wrong_audience_or_secret() {
        let claims = UserClaims::for_user(&user(Role::Admin), "iss", "aud");
        let token = claims.create_token("secret").unwrap();

        assert!(UserClaims::from_token(&token, "other", "iss", "aud").is_err());
        assert!(UserClaims::from_token(&token, "secret", "iss", "elsewhere").is_err());
    }

    #[test]
    fn empty_key_never_validates_a_token() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = UserClaims::for_user(&user(Role::Admin), "iss", "aud");
        let forged = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"")).unwrap();

        assert!(UserClaims::from_token(&forged, "", "iss", "aud").is_err());
    }

    #[test]
    fn empty_signing_key_is_an_error() {
        let claims = UserClaims::for_user(&user(Role::Admin), "iss", "aud");
        assert!(matches!(claims.create_token(""), Err(AppError::Internal(_))));
    }

    #[test]
    fn member_client_is_not_staff() {
        let claims = UserClaims::for_user(&user(Role::MemberClient), "iss", "aud");
        assert!(claims.require_admin().is_err());
        assert!(claims.require_staff().is_err());
        assert!(claims.require_any_of(&Role::ALL).is_ok());
    }
}
