// src/config.rs
use std::{env, path::PathBuf, time::Duration};

use anyhow::Context as _;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 8;

/// Process configuration, read once at startup from the environment
/// (`.env` is loaded first when present).
#[derive(Clone, Debug)]
pub struct Config {
    /// Path to the lesson corpus. Required: the service must not boot without it.
    pub knowledge_base_path: PathBuf,
    pub port: u16,
    /// Absent key means the provider is disabled, not misconfigured.
    pub provider_api_key: Option<String>,
    pub provider_api_base: String,
    pub provider_model: String,
    pub provider_timeout: Duration,
    /// Admin routes are disabled entirely when no key is set.
    pub admin_api_key: Option<String>,
    /// Collaborator settings for the asset-hosting side. Logged at startup so
    /// a misdeployed environment is visible, never used by the answering logic.
    pub aws_region: Option<String>,
    pub aws_s3_bucket: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let knowledge_base_path = env::var("KNOWLEDGE_BASE_PATH")
            .map(PathBuf::from)
            .context("KNOWLEDGE_BASE_PATH environment variable is required")?;

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {raw:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let provider_timeout = match env::var("PROVIDER_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.trim().parse::<u64>().with_context(|| {
                    format!("PROVIDER_TIMEOUT_SECS is not a valid number of seconds: {raw:?}")
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        };

        Ok(Self {
            knowledge_base_path,
            port,
            provider_api_key: non_empty_var("OPENAI_API_KEY"),
            provider_api_base: non_empty_var("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            provider_model: non_empty_var("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            provider_timeout,
            admin_api_key: non_empty_var("ADMIN_API_KEY"),
            aws_region: non_empty_var("AWS_REGION"),
            aws_s3_bucket: non_empty_var("AWS_S3_BUCKET"),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
