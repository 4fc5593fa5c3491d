use crate::auth::Identity;
use crate::config::SessionConfig;
use crate::models::session::SessionState;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    /// No session, or a cookie that does not decode.
    NotAuthenticated,
    /// Idle longer than the inactivity window; the session must be discarded.
    Expired,
}

/// Stateful web sessions with a sliding inactivity window.
///
/// The state itself lives in the encrypted cookie; this type only decides
/// whether a presented state is still alive and produces its refreshed form.
#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    inactivity: Duration,
}

impl SessionAuthenticator {
    pub fn new(inactivity: Duration) -> Self {
        Self { inactivity }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::minutes(config.inactivity_minutes))
    }

    pub fn start(&self, identity: &Identity, now: DateTime<Utc>) -> SessionState {
        SessionState {
            user_id: identity.user_id,
            username: identity.username.clone(),
            last_activity: now.timestamp(),
        }
    }

    /// Check-then-refresh, run on every authenticated request. On success the
    /// returned state carries `last_activity = now` and must be written back.
    pub fn authenticate(&self, state: Option<&SessionState>, now: DateTime<Utc>) -> Result<(Identity, SessionState), SessionRejection> {
        let state = state.ok_or(SessionRejection::NotAuthenticated)?;
        let last_activity = state.last_activity_at().ok_or(SessionRejection::NotAuthenticated)?;

        if now - last_activity > self.inactivity {
            return Err(SessionRejection::Expired);
        }

        let identity = Identity {
            user_id: state.user_id,
            username: state.username.clone(),
        };
        let refreshed = SessionState {
            last_activity: now.timestamp().max(state.last_activity),
            ..state.clone()
        };
        Ok((identity, refreshed))
    }
}
