use crate::factory::{ProviderSession, SessionFactory};
use crudpanel_core::{AppConfig, CoreError, Credentials, ErrorExt, Provider};
use reddit_client::RedditSession;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};
use youtube_client::YouTubeSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoCredentials,
    Active,
}

/// What a successful credential submission established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub provider: Provider,
    /// Canonical account name, when the provider has one to check.
    pub identity: Option<String>,
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            Some(name) => write!(f, "Logged in to {} as {}", self.provider, name),
            None => write!(f, "{} credentials saved", self.provider),
        }
    }
}

/// Holds at most one live session per provider.
///
/// A session only gets in here after the factory established it, so
/// anything borrowed through [`reddit`](CredentialStore::reddit) or
/// [`youtube`](CredentialStore::youtube) is known to be valid.
#[derive(Debug)]
pub struct CredentialStore {
    factory: SessionFactory,
    reddit: Option<RedditSession>,
    youtube: Option<YouTubeSession>,
}

impl CredentialStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            factory: SessionFactory::new(config),
            reddit: None,
            youtube: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        self.factory.config()
    }

    /// Replaces the provider's session with one built from `credentials`.
    ///
    /// The old session is dropped before the new one is attempted, so a
    /// failed submission leaves the provider with no session at all.
    pub async fn submit(&mut self, credentials: Credentials) -> Result<ValidationOutcome, CoreError> {
        let provider = credentials.provider();
        self.clear(provider);

        let session = match self.factory.establish(&credentials).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding {} credentials", provider);
                e.log_warn();
                return Err(e);
            }
        };

        debug_assert_eq!(session.provider(), provider);
        let identity = match session {
            ProviderSession::Reddit(session) => {
                let name = session.username().to_string();
                self.reddit = Some(session);
                Some(name)
            }
            ProviderSession::YouTube(session) => {
                self.youtube = Some(session);
                None
            }
        };

        info!("{} session active", provider);
        Ok(ValidationOutcome { provider, identity })
    }

    pub fn clear(&mut self, provider: Provider) {
        let had_session = match provider {
            Provider::Reddit => self.reddit.take().is_some(),
            Provider::YouTube => self.youtube.take().is_some(),
        };
        if had_session {
            info!("Cleared {} session", provider);
        }
    }

    pub fn state(&self, provider: Provider) -> SessionState {
        let active = match provider {
            Provider::Reddit => self.reddit.is_some(),
            Provider::YouTube => self.youtube.is_some(),
        };
        if active {
            SessionState::Active
        } else {
            SessionState::NoCredentials
        }
    }

    pub fn reddit(&self) -> Result<&RedditSession, CoreError> {
        self.reddit.as_ref().ok_or(CoreError::NoActiveSession {
            provider: Provider::Reddit,
        })
    }

    pub fn youtube(&self) -> Result<&YouTubeSession, CoreError> {
        self.youtube.as_ref().ok_or(CoreError::NoActiveSession {
            provider: Provider::YouTube,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudpanel_core::{ErrorKind, YouTubeCredentials};

    #[test]
    fn test_empty_store() {
        let store = CredentialStore::new(AppConfig::default());
        assert_eq!(store.state(Provider::Reddit), SessionState::NoCredentials);
        assert_eq!(store.state(Provider::YouTube), SessionState::NoCredentials);

        let error = store.reddit().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert!(matches!(
            error,
            CoreError::NoActiveSession {
                provider: Provider::Reddit
            }
        ));
    }

    #[tokio::test]
    async fn test_youtube_submit_and_clear() {
        let mut store = CredentialStore::new(AppConfig::default());
        let credentials = YouTubeCredentials::new("some-key").unwrap();

        let outcome = store
            .submit(Credentials::YouTube(credentials))
            .await
            .unwrap();
        assert_eq!(outcome.provider, Provider::YouTube);
        assert_eq!(outcome.identity, None);
        assert_eq!(store.state(Provider::YouTube), SessionState::Active);
        assert!(store.youtube().is_ok());
        assert_eq!(store.state(Provider::Reddit), SessionState::NoCredentials);

        store.clear(Provider::YouTube);
        assert_eq!(store.state(Provider::YouTube), SessionState::NoCredentials);
        assert!(store.youtube().is_err());
    }

    #[test]
    fn test_validation_outcome_display() {
        let outcome = ValidationOutcome {
            provider: Provider::Reddit,
            identity: Some("tester".to_string()),
        };
        assert_eq!(outcome.to_string(), "Logged in to reddit as tester");

        let outcome = ValidationOutcome {
            provider: Provider::YouTube,
            identity: None,
        };
        assert_eq!(outcome.to_string(), "youtube credentials saved");
    }
}
