//! Admin session service
//!
//! Single configured credential pair, opaque session tokens held in an
//! in-process TTL map. Sessions do not survive a restart, which is fine
//! for a small internal admin tool.

use anyhow::Result;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::info;

/// How long an issued session stays valid
const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub struct AuthService {
    username: String,
    password: String,
    // token -> expiry
    sessions: DashMap<String, Instant>,
}

impl AuthService {
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password,
            sessions: DashMap::new(),
        }
    }

    /// Check credentials and issue a session token
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        if username != self.username || password != self.password {
            anyhow::bail!("Invalid credentials");
        }

        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .insert(token.clone(), Instant::now() + SESSION_TTL);
        info!("Admin session issued for {}", username);
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> bool {
        // Copy the expiry out so the map ref is released before any removal
        let expires = match self.sessions.get(token) {
            Some(entry) => *entry,
            None => return false,
        };

        if Instant::now() < expires {
            true
        } else {
            self.sessions.remove(token);
            false
        }
    }

    pub fn logout(&self, token: &str) {
        self.sessions.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("admin".to_string(), "secret".to_string())
    }

    #[test]
    fn login_with_valid_credentials_issues_a_session() {
        let auth = service();
        let token = auth.login("admin", "secret").unwrap();
        assert!(auth.validate(&token));
    }

    #[test]
    fn login_with_wrong_credentials_fails() {
        let auth = service();
        assert!(auth.login("admin", "wrong").is_err());
        assert!(auth.login("root", "secret").is_err());
    }

    #[test]
    fn logout_revokes_the_session() {
        let auth = service();
        let token = auth.login("admin", "secret").unwrap();
        auth.logout(&token);
        assert!(!auth.validate(&token));
    }

    #[test]
    fn expired_sessions_are_rejected_and_dropped() {
        let auth = service();
        auth.sessions.insert(
            "stale".to_string(),
            Instant::now() - Duration::from_secs(1),
        );
        assert!(!auth.validate("stale"));
        assert!(!auth.sessions.contains_key("stale"));
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let auth = service();
        assert!(!auth.validate("nope"));
    }
}
