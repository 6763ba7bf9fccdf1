//! Session context for authenticated operations
//!
//! Every operation that acts on behalf of a user takes an explicit
//! [`Session`] rather than consulting ambient global state. Login constructs
//! the session from the identity provider's response; logout is simply
//! dropping it.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{AuthError, Result, SteeplecastError};
use crate::types::Role;

/// An authenticated user's session context
///
/// The bearer token is held as a [`SecretString`] so it is zeroed on drop
/// and never appears in debug output.
pub struct Session {
    user_id: String,
    access_token: SecretString,
    church_id: Option<String>,
    role: Role,
}

impl Session {
    /// Construct a session from a successful sign-in
    pub fn login(
        user_id: impl Into<String>,
        access_token: impl Into<String>,
        church_id: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: SecretString::from(access_token.into()),
            church_id,
            role,
        }
    }

    /// Build a session from `STEEPLECAST_USER` / `STEEPLECAST_TOKEN`
    /// (plus optional `STEEPLECAST_CHURCH` and `STEEPLECAST_ROLE`)
    pub fn from_env() -> Result<Self> {
        let user_id = std::env::var("STEEPLECAST_USER").map_err(|_| {
            AuthError::Unauthorized("not signed in: STEEPLECAST_USER is not set".to_string())
        })?;
        let access_token = std::env::var("STEEPLECAST_TOKEN").map_err(|_| {
            AuthError::Unauthorized("not signed in: STEEPLECAST_TOKEN is not set".to_string())
        })?;
        let church_id = std::env::var("STEEPLECAST_CHURCH").ok();
        let role = match std::env::var("STEEPLECAST_ROLE") {
            Ok(value) => value.parse()?,
            Err(_) => Role::default(),
        };

        Ok(Self::login(user_id, access_token, church_id, role))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The session bearer token, for authenticating outbound calls
    pub fn bearer_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The user's church affiliation, required for content creation
    pub fn church_id(&self) -> Result<&str> {
        self.church_id.as_deref().ok_or_else(|| {
            SteeplecastError::InvalidInput(
                "no church affiliation set; set one before creating content".to_string(),
            )
        })
    }

    /// Verify that a caller-supplied user id matches this session
    pub fn ensure_user(&self, user_id: &str) -> Result<()> {
        if user_id != self.user_id {
            return Err(AuthError::Unauthorized("user id mismatch".to_string()).into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("church_id", &self.church_id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
