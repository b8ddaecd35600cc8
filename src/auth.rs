//! Identity provider client (Firebase Identity Toolkit REST API).
//!
//! The rest of the crate only ever consumes the `user_id` out of the
//! session; everything else here exists so login, sign-up, and profile
//! updates surface a plain error message the caller can show and retry.

use serde::Deserialize;

const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// The signed-in user, as far as this crate cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub id_token: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    id_token: String,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AuthClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, IDENTITY_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, String> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        });
        let resp: AuthResponse = self.post("accounts:signInWithPassword", &body).await?;
        log::info!("user {} logged in", resp.local_id);
        Ok(resp.into())
    }

    /// Create the account, then set the display name on the fresh session.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Session, String> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        });
        let resp: AuthResponse = self.post("accounts:signUp", &body).await?;
        let mut session: Session = resp.into();

        let update = serde_json::json!({
            "idToken": session.id_token,
            "displayName": name,
            "returnSecureToken": false
        });
        self.post::<serde_json::Value>("accounts:update", &update)
            .await?;
        session.display_name = Some(name.to_string());
        log::info!("user {} signed up", session.user_id);
        Ok(session)
    }

    pub async fn update_photo(&self, session: &Session, photo_url: &str) -> Result<Session, String> {
        let update = serde_json::json!({
            "idToken": session.id_token,
            "photoUrl": photo_url,
            "returnSecureToken": false
        });
        self.post::<serde_json::Value>("accounts:update", &update)
            .await?;
        let mut updated = session.clone();
        updated.photo_url = Some(photo_url.to_string());
        Ok(updated)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T, String> {
        let resp = self
            .client
            .post(format!("{}/{endpoint}?key={}", self.base_url, self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Auth request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("Auth error {status}"));
            log::warn!("auth call {endpoint} failed: {message}");
            return Err(message);
        }

        resp.json::<T>()
            .await
            .map_err(|e| format!("Failed to parse auth response: {e}"))
    }
}

impl From<AuthResponse> for Session {
    fn from(resp: AuthResponse) -> Self {
        Self {
            user_id: resp.local_id,
            id_token: resp.id_token,
            display_name: resp.display_name,
            photo_url: resp.photo_url,
        }
    }
}

/// Synchronous sign-up form validation. Failures are user-facing messages,
/// checked before any network call is made.
pub fn validate_sign_up(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), String> {
    if name.trim().is_empty() || email.trim().is_empty() || password.trim().is_empty() {
        return Err("Please fill in all fields".to_string());
    }
    if password != confirm_password {
        return Err("Passwords do not match".to_string());
    }
    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_rejected() {
        let err = validate_sign_up("", "a@b.c", "secret1", "secret1").unwrap_err();
        assert_eq!(err, "Please fill in all fields");
        assert!(validate_sign_up("Ann", " ", "secret1", "secret1").is_err());
        assert!(validate_sign_up("Ann", "a@b.c", "", "").is_err());
    }

    #[test]
    fn mismatched_passwords_rejected() {
        let err = validate_sign_up("Ann", "a@b.c", "secret1", "secret2").unwrap_err();
        assert_eq!(err, "Passwords do not match");
    }

    #[test]
    fn short_password_rejected() {
        let err = validate_sign_up("Ann", "a@b.c", "five5", "five5").unwrap_err();
        assert_eq!(err, "Password must be at least 6 characters long");
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate_sign_up("Ann", "a@b.c", "secret1", "secret1").is_ok());
    }

    #[test]
    fn parses_auth_response() {
        let body = r#"{"localId":"u123","idToken":"tok","displayName":"Ann","photoUrl":null}"#;
        let resp: AuthResponse = serde_json::from_str(body).unwrap();
        let session: Session = resp.into();
        assert_eq!(session.user_id, "u123");
        assert_eq!(session.display_name.as_deref(), Some("Ann"));
        assert!(session.photo_url.is_none());
    }

    #[test]
    fn parses_error_message() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#;
        let resp: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.error.message, "EMAIL_EXISTS");
    }
}
