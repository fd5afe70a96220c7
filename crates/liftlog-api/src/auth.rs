use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};
use uuid::Uuid;

use liftlog_core::FieldErrors;
use liftlog_core::error::BLANK;
use liftlog_db::Database;
use liftlog_types::api::{
    AccessTokenResponse, Claims, Field, RefreshRequest, RegisterRequest, RegisterResponse,
    TokenPairResponse, TokenRequest, TokenType,
};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::run_blocking;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const BAD_CREDENTIALS: &str = "No active account found with the given credentials";
pub const INVALID_TOKEN: &str = "Given token not valid for any token type";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenIssuer,
}

/// Signs and verifies HS256 access and refresh tokens.
pub struct TokenIssuer {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, username: &str, token_type: TokenType) -> anyhow::Result<String> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            token_type,
            exp: (Utc::now() + ttl).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Decode `token` and require it to be of `expected` type.
    pub fn verify(&self, token: &str, expected: TokenType) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        if data.claims.token_type != expected {
            anyhow::bail!("expected {:?} token, got {:?}", expected, data.claims.token_type);
        }
        Ok(data.claims)
    }
}

/// A present, non-blank string.
fn not_blank(errors: &mut FieldErrors, name: &str, field: Field<String>) -> Option<String> {
    errors.required(name, field).filter(|v| {
        let blank = v.trim().is_empty();
        if blank {
            errors.add(name, BLANK);
        }
        !blank
    })
}

struct NewAccount {
    username: String,
    email: String,
    password: String,
}

fn validate_registration(req: RegisterRequest) -> Result<NewAccount, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = not_blank(&mut errors, "username", req.username);
    if let Some(username) = &username {
        let len = username.chars().count();
        if len < 3 {
            errors.add("username", "Ensure this field has at least 3 characters.");
        } else if len > 150 {
            errors.add("username", "Ensure this field has no more than 150 characters.");
        }
    }
    let email = not_blank(&mut errors, "email", req.email);
    if email.as_deref().is_some_and(|e| !e.contains('@')) {
        errors.add("email", "Enter a valid email address.");
    }
    let password = not_blank(&mut errors, "password", req.password);
    if password.as_deref().is_some_and(|p| p.chars().count() < 8) {
        errors.add(
            "password",
            "This password is too short. It must contain at least 8 characters.",
        );
    }
    let password2 = not_blank(&mut errors, "password2", req.password2);

    if errors.is_empty() && password != password2 {
        errors.add("non_field_errors", "Password fields didn't match.");
    }
    match (username, email, password) {
        (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(NewAccount {
            username,
            email,
            password,
        }),
        _ => Err(errors),
    }
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let NewAccount {
        username,
        email,
        password,
    } = validate_registration(req).map_err(ApiError::Validation)?;

    let user_id = Uuid::new_v4();
    let st = state.clone();
    let (name, mail) = (username.clone(), email.clone());
    let created = run_blocking(move || {
        if st.db.get_user_by_username(&name)?.is_some() {
            return Ok(false);
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();

        Ok(st
            .db
            .create_user(&user_id.to_string(), &name, &mail, &password_hash)?)
    })
    .await?;

    if !created {
        return Err(ApiError::Validation(FieldErrors::single("username", USERNAME_TAKEN)));
    }

    info!("User {} registered", username);
    Ok((
        StatusCode::CREATED,
        ApiJson(RegisterResponse {
            id: user_id,
            username,
            email,
        }),
    ))
}

pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::new();
    let username = not_blank(&mut errors, "username", req.username);
    let password = not_blank(&mut errors, "password", req.password);
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::Validation(errors));
    };

    let st = state.clone();
    let lookup = username.clone();
    let user = run_blocking(move || Ok(st.db.get_user_by_username(&lookup)?)).await?;

    let Some(user) = user else {
        warn!("Login failed for unknown user {}", username);
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    };

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("corrupt password hash for {}: {}", user.username, e))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!("Login failed for {}", user.username);
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let user_ref = user.user_ref()?;
    let access = state
        .tokens
        .issue(user_ref.id, &user_ref.username, TokenType::Access)?;
    let refresh = state
        .tokens
        .issue(user_ref.id, &user_ref.username, TokenType::Refresh)?;

    info!("Issued tokens for {}", user_ref.username);
    Ok(ApiJson(TokenPairResponse { access, refresh }))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::new();
    let Some(refresh) = not_blank(&mut errors, "refresh", req.refresh) else {
        return Err(ApiError::Validation(errors));
    };

    let claims = state
        .tokens
        .verify(&refresh, TokenType::Refresh)
        .map_err(|e| {
            warn!("Refresh rejected: {}", e);
            ApiError::Unauthorized(INVALID_TOKEN.into())
        })?;

    let access = state
        .tokens
        .issue(claims.sub, &claims.username, TokenType::Access)?;
    Ok(ApiJson(AccessTokenResponse { access }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_core::error::{NULL, REQUIRED};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Duration::minutes(5), Duration::hours(24))
    }

    fn registration(username: &str, email: &str, p1: &str, p2: &str) -> RegisterRequest {
        RegisterRequest {
            username: Field::Value(username.into()),
            email: Field::Value(email.into()),
            password: Field::Value(p1.into()),
            password2: Field::Value(p2.into()),
        }
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let tokens = issuer();
        let id = Uuid::new_v4();
        let access = tokens.issue(id, "alice", TokenType::Access).unwrap();
        let refresh = tokens.issue(id, "alice", TokenType::Refresh).unwrap();

        let claims = tokens.verify(&access, TokenType::Access).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "alice");
        assert!(tokens.verify(&access, TokenType::Refresh).is_err());
        assert!(tokens.verify(&refresh, TokenType::Access).is_err());
        assert!(tokens.verify(&refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn foreign_secret_and_expired_tokens_fail() {
        let tokens = issuer();
        let other = TokenIssuer::new("other-secret", Duration::minutes(5), Duration::hours(1));
        let token = other.issue(Uuid::new_v4(), "bob", TokenType::Access).unwrap();
        assert!(tokens.verify(&token, TokenType::Access).is_err());

        let stale = TokenIssuer::new("test-secret", Duration::minutes(-10), Duration::hours(1));
        let token = stale.issue(Uuid::new_v4(), "bob", TokenType::Access).unwrap();
        assert!(tokens.verify(&token, TokenType::Access).is_err());
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration(registration("alice", "a@b.c", "password1", "password1"))
            .is_ok());

        let errors = validate_registration(RegisterRequest::default()).err().unwrap();
        for field in ["username", "email", "password", "password2"] {
            assert_eq!(errors.get(field).unwrap(), [REQUIRED.to_string()]);
        }

        let errors = validate_registration(registration("al", "nope", "short", "short"))
            .err()
            .unwrap();
        assert!(errors.get("username").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
        assert!(errors.get("non_field_errors").is_none());

        let errors = validate_registration(registration("alice", "a@b.c", "password1", "password2"))
            .err()
            .unwrap();
        assert_eq!(
            errors.get("non_field_errors").unwrap(),
            ["Password fields didn't match.".to_string()]
        );
    }

    #[test]
    fn mistyped_registration_fields_are_reported_per_field() {
        let req = RegisterRequest {
            username: Field::Invalid("Not a valid string."),
            email: Field::Null,
            ..registration("alice", "a@b.c", "password1", "password1")
        };
        let errors = validate_registration(req).err().unwrap();
        assert_eq!(
            errors.get("username").unwrap(),
            ["Not a valid string.".to_string()]
        );
        assert_eq!(errors.get("email").unwrap(), [NULL.to_string()]);
        assert!(errors.get("password").is_none());
    }
}
