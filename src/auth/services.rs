use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_new_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }
    Ok(())
}

/// Creates exactly one user. The plaintext password only lives in `req`.
pub async fn register(st: &AppState, req: RegisterRequest) -> AppResult<User> {
    let name = req.name.trim().to_string();
    let email = normalize_email(&req.email);

    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    validate_new_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;

    let user = st
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "create user failed");
            AppError::from(e)
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Verifies credentials and issues a bearer token. Unknown email and wrong
/// password produce the same error.
pub async fn login(st: &AppState, req: LoginRequest) -> AppResult<String> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let user = match st.store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(st);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AppError::Internal(e)
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Resolves an `Authorization` header value to a live user id.
pub async fn authenticate(st: &AppState, header: Option<&str>) -> AppResult<Uuid> {
    let header = header.ok_or_else(|| AppError::unauthenticated("Missing Authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthenticated("Invalid Authorization header"))?;

    let claims = JwtKeys::from_ref(st).verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::unauthenticated("Invalid or expired token")
    })?;

    // A valid token for a user that no longer exists is still a rejected credential.
    match st.store.find_user(claims.sub).await? {
        Some(user) => Ok(user.id),
        None => {
            warn!(user_id = %claims.sub, "token for unknown user");
            Err(AppError::unauthenticated("Invalid or expired token"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Claims;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;

    fn register_req(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two words@b.co"));
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[tokio::test]
    async fn register_twice_with_same_email_fails() {
        let st = AppState::fake();
        register(&st, register_req("Ada", "ada@example.com", "password-1"))
            .await
            .unwrap();
        let err = register(&st, register_req("Other", "ADA@example.com ", "password-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        let stored = st.store.find_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada");
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let st = AppState::fake();
        for req in [
            register_req("", "ada@example.com", "password-1"),
            register_req("Ada", "", "password-1"),
            register_req("Ada", "ada@example.com", ""),
            register_req("Ada", "not-an-email", "password-1"),
            register_req("Ada", "ada@example.com", "short"),
        ] {
            let err = register(&st, req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
        }
        assert!(st.store.find_user_by_email("ada@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_never_stores_plaintext() {
        let st = AppState::fake();
        let user = register(&st, register_req("Ada", "ada@example.com", "hunter2-hunter2"))
            .await
            .unwrap();
        assert!(!user.password_hash.contains("hunter2"));
        assert!(!serde_json::to_string(&user).unwrap().contains("password"));
    }

    #[tokio::test]
    async fn login_token_resolves_to_registered_user() {
        let st = AppState::fake();
        let user = register(&st, register_req("Ada", "ada@example.com", "password-1"))
            .await
            .unwrap();
        let token = login(&st, login_req("ada@example.com", "password-1")).await.unwrap();
        let header = format!("Bearer {token}");
        let resolved = authenticate(&st, Some(header.as_str())).await.unwrap();
        assert_eq!(resolved, user.id);
    }

    #[tokio::test]
    async fn login_failures_look_the_same() {
        let st = AppState::fake();
        register(&st, register_req("Ada", "ada@example.com", "password-1"))
            .await
            .unwrap();

        let wrong_pw = login(&st, login_req("ada@example.com", "password-2")).await.unwrap_err();
        let unknown = login(&st, login_req("bob@example.com", "password-1")).await.unwrap_err();
        assert!(matches!(wrong_pw, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn authenticate_rejects_bad_credentials() {
        let st = AppState::fake();
        register(&st, register_req("Ada", "ada@example.com", "password-1"))
            .await
            .unwrap();
        let token = login(&st, login_req("ada@example.com", "password-1")).await.unwrap();

        let foreign = JwtKeys::from(&crate::config::JwtConfig {
            secret: "someone-else".into(),
            issuer: st.config.jwt.issuer.clone(),
            audience: st.config.jwt.audience.clone(),
            ttl_minutes: 5,
        })
        .sign(Uuid::new_v4())
        .unwrap();

        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let expired = encode(
            &Header::default(),
            &Claims {
                sub: Uuid::new_v4(),
                iat: now - 7200,
                exp: now - 3600,
                iss: st.config.jwt.issuer.clone(),
                aud: st.config.jwt.audience.clone(),
            },
            &EncodingKey::from_secret(st.config.jwt.secret.as_bytes()),
        )
        .unwrap();

        let cases = [
            None,
            Some(String::new()),
            Some(token.clone()),
            Some(format!("Basic {token}")),
            Some("Bearer ".to_string()),
            Some("Bearer garbage".to_string()),
            Some(format!("Bearer {foreign}")),
            Some(format!("Bearer {expired}")),
        ];
        for header in cases {
            let err = authenticate(&st, header.as_deref()).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthenticated(_)), "header {header:?}");
        }
    }

    #[tokio::test]
    async fn authenticate_rejects_token_for_missing_user() {
        let st = AppState::fake();
        let token = JwtKeys::from_ref(&st).sign(Uuid::new_v4()).unwrap();
        let err = authenticate(&st, Some(format!("Bearer {token}").as_str()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }
}
