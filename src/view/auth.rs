use crate::auth::{AuthClient, Session, validate_sign_up};

/// Whether a user is signed in. Signing out is purely local: the session
/// handle is discarded and with it the scoping id for every store call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Session),
}

impl AuthState {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn(session) => Some(&session.user_id),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn(session) => Some(session),
        }
    }

    pub fn sign_in(&mut self, session: Session) {
        *self = Self::SignedIn(session);
    }

    pub fn sign_out(&mut self) {
        *self = Self::SignedOut;
    }
}

/// Login form state. A failed attempt leaves every field as typed so the
/// user can correct and retry.
#[derive(Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    busy: bool,
    error: Option<String>,
}

impl LoginView {
    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, client: &AuthClient) -> Option<Session> {
        if self.busy {
            return None;
        }
        self.busy = true;
        self.error = None;
        let result = client.login(&self.email, &self.password).await;
        self.busy = false;
        match result {
            Ok(session) => Some(session),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }
}

/// Sign-up form state. Validation runs before any network call; its
/// messages land in the same error slot as provider failures.
#[derive(Debug, Default)]
pub struct SignUpView {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    busy: bool,
    error: Option<String>,
}

impl SignUpView {
    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, client: &AuthClient) -> Option<Session> {
        if self.busy {
            return None;
        }
        if let Err(message) =
            validate_sign_up(&self.name, &self.email, &self.password, &self.confirm_password)
        {
            self.error = Some(message);
            return None;
        }
        self.busy = true;
        self.error = None;
        let result = client.sign_up(&self.name, &self.email, &self.password).await;
        self.busy = false;
        match result {
            Ok(session) => Some(session),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }
}

/// Profile screen state: shows the session's name and photo, lets the user
/// swap the photo.
#[derive(Debug)]
pub struct ProfileView {
    session: Session,
    busy: bool,
    error: Option<String>,
}

impl ProfileView {
    pub fn open(session: Session) -> Self {
        Self {
            session,
            busy: false,
            error: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.session.display_name.as_deref().unwrap_or("")
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.session.photo_url.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn update_photo(&mut self, client: &AuthClient, photo_url: &str) {
        if self.busy {
            return;
        }
        self.busy = true;
        match client.update_photo(&self.session, photo_url).await {
            Ok(session) => {
                self.session = session;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(if message.is_empty() {
                    "Unknown error".to_string()
                } else {
                    message
                });
            }
        }
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "u1".into(),
            id_token: "tok".into(),
            display_name: Some("Ann".into()),
            photo_url: None,
        }
    }

    #[test]
    fn auth_state_scopes_store_calls() {
        let mut state = AuthState::default();
        assert_eq!(state.user_id(), None);

        state.sign_in(session());
        assert_eq!(state.user_id(), Some("u1"));

        state.sign_out();
        assert_eq!(state.user_id(), None);
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn invalid_sign_up_fails_before_any_network_call() {
        // Unroutable base URL: reaching the network would error differently.
        let client = AuthClient::with_base_url("k", "http://127.0.0.1:1");
        let mut view = SignUpView {
            name: "Ann".into(),
            email: "a@b.c".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
            ..Default::default()
        };

        assert!(view.submit(&client).await.is_none());
        assert_eq!(view.error(), Some("Passwords do not match"));
        // the form is left as typed
        assert_eq!(view.password, "secret1");
        assert_eq!(view.confirm_password, "secret2");
    }

    #[tokio::test]
    async fn failed_login_keeps_the_form_for_retry() {
        let client = AuthClient::with_base_url("k", "http://127.0.0.1:1");
        let mut view = LoginView {
            email: "a@b.c".into(),
            password: "secret1".into(),
            ..Default::default()
        };

        assert!(view.submit(&client).await.is_none());
        assert!(view.error().is_some());
        assert_eq!(view.email, "a@b.c");
        assert_eq!(view.password, "secret1");
        assert!(!view.busy());
    }
}
