use crudpanel_core::{AppConfig, CoreError, Credentials, Provider};
use reddit_client::RedditSession;
use tracing::info;
use youtube_client::YouTubeSession;

/// A freshly established session for one provider.
#[derive(Debug)]
pub enum ProviderSession {
    Reddit(RedditSession),
    YouTube(YouTubeSession),
}

impl ProviderSession {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderSession::Reddit(_) => Provider::Reddit,
            ProviderSession::YouTube(_) => Provider::YouTube,
        }
    }
}

/// Turns credentials into a usable session, or explains why it cannot.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    config: AppConfig,
}

impl SessionFactory {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Reddit sessions are verified against `/api/v1/me` before they are
    /// returned. YouTube keys are taken on trust until the first call.
    pub async fn establish(&self, credentials: &Credentials) -> Result<ProviderSession, CoreError> {
        info!("Establishing {} session", credentials.provider());
        match credentials {
            Credentials::Reddit(reddit) => RedditSession::establish(reddit, &self.config)
                .await
                .map(ProviderSession::Reddit),
            Credentials::YouTube(youtube) => {
                YouTubeSession::new(youtube, &self.config).map(ProviderSession::YouTube)
            }
        }
    }
}
