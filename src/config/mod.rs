use std::env;
use url::Url;

use crate::cli::Args;
use crate::llm::AssistError;

pub const DEFAULT_BASE_URL: &str = "http://10.4.0.141:8000";
pub const BASE_URL_ENV: &str = "ASSIST_DOCTOR_BASE_URL";

/// Where the AssistDoctor service lives. Passed to the client at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_url: String,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AssistError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');

        let parsed = Url::parse(trimmed).map_err(|e|
            AssistError::InvalidConfig(format!("invalid base URL '{}': {}", base_url, e))
        )?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(
                AssistError::InvalidConfig(
                    format!("base URL '{}' must use http or https", base_url)
                )
            );
        }

        Ok(Self { base_url: trimmed.to_string() })
    }

    /// Reads `ASSIST_DOCTOR_BASE_URL`, falling back to the built-in default.
    pub fn from_env() -> Result<Self, AssistError> {
        match env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Ok(Self::default()),
        }
    }

    /// `--base-url` if given, otherwise whatever `from_env` resolves.
    pub fn from_args(args: &Args) -> Result<Self, AssistError> {
        match &args.base_url {
            Some(url) => Self::new(url.clone()),
            None => Self::from_env(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string() }
    }
}
