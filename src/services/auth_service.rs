use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ConnectionTrait;

use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    models::User,
    repository::UserRepository,
    response::{ApiResponse, Meta},
    state::AppState,
    validate::validate_login,
};

const TOKEN_TTL_HOURS: i64 = 24;

pub fn hash_password(senha: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(senha.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(senha: &str, senha_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(senha_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(senha.as_bytes(), &parsed)
        .is_ok()
}

/// Credential checks and token handling, injected with the user repository
/// and the signing secret.
#[derive(Debug, Clone)]
pub struct Identity<R> {
    users: R,
    jwt_secret: String,
}

impl<R: UserRepository> Identity<R> {
    pub fn new(users: R, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    /// Resolve credentials to a user. Unknown email and wrong password both
    /// come back as `None`; only infrastructure failures are errors.
    pub async fn authenticate<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
        senha: &str,
    ) -> AppResult<Option<User>> {
        let Some(found) = self.users.find_by_email(conn, email).await? else {
            return Ok(None);
        };

        if verify_password(senha, &found.senha_hash) {
            Ok(Some(found.user))
        } else {
            Ok(None)
        }
    }

    /// Authenticate and issue a token. The rejection never says whether the
    /// email or the password was wrong.
    pub async fn login<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
        senha: &str,
    ) -> AppResult<LoginResponse> {
        let user = self
            .authenticate(conn, email, senha)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciais inválidas".into()))?;

        let access_token = self.issue_token(&user)?;
        Ok(LoginResponse { user, access_token })
    }

    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    pub fn decode_token(&self, token: &str) -> AppResult<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
        Ok(decoded.claims)
    }
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let errors = validate_login(&payload);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let resp = state
        .identity
        .login(&state.orm, &payload.email, &payload.senha)
        .await?;

    audit::record(
        &state.pool,
        Some(resp.user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": resp.user.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Login realizado",
        resp,
        Some(Meta::empty()),
    ))
}
