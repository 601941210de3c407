use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://keen-feasible-snake.ngrok-free.app";
pub const BASE_URL_ENV: &str = "AGORA_API_URL";
pub const DEFAULT_USER_AGENT: &str = "agora-client/0.1";

/// Process-wide client settings, resolved once and handed to the transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub user_agent: String,
    /// Send the tunnel's skip-interstitial header on every request.
    pub tunnel_bypass: bool,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            tunnel_bypass: true,
        }
    }

    pub fn parse(base_url: &str) -> Result<Self, ApiError> {
        let url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self::new(url))
    }

    /// Reads `AGORA_API_URL`; empty or unset means the development host.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_setting(std::env::var(BASE_URL_ENV).ok().as_deref())
    }

    pub fn from_setting(value: Option<&str>) -> Result<Self, ApiError> {
        match value {
            Some(v) if !v.trim().is_empty() => Self::parse(v),
            _ => Self::parse(DEFAULT_BASE_URL),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_tunnel_bypass(mut self, enabled: bool) -> Self {
        self.tunnel_bypass = enabled;
        self
    }

    /// Joins an absolute API path (optionally with a query) onto the base URL,
    /// keeping any path prefix the base URL already has.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = format!("{base}{path}");
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }
}
