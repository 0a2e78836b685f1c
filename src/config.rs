use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "ScanSight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hosted inference endpoint for both model calls.
pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
/// Model hub, used to verify that VQA weights are fetchable at load time.
pub const DEFAULT_HUB_BASE: &str = "https://huggingface.co";

/// Pre-trained visual question answering model.
pub const VQA_MODEL_ID: &str = "Salesforce/blip-vqa-base";
/// Remote text-generation model for narrative explanations.
pub const TEXT_MODEL_ID: &str = "google/flan-t5-xl";

/// Bounded timeout for remote model calls. The explanation call has no
/// inherent bound, so every remote request gets this cap.
pub const REMOTE_TIMEOUT_SECS: u64 = 30;

/// Environment variable carrying the bearer credential for hosted models.
pub const TOKEN_ENV: &str = "HF_API_TOKEN";

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_PKG_NAME"))
}

/// Remote model configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_base: String,
    pub hub_base: String,
    pub vqa_model: String,
    pub text_model: String,
    /// Bearer token for hosted models. Absent token means anonymous access.
    pub credential: Option<String>,
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Resolve configuration from the environment, falling back to defaults.
    ///
    /// `SCANSIGHT_API_BASE` / `SCANSIGHT_HUB_BASE` exist so deployments can
    /// point at a gateway or proxy; model ids are fixed.
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("SCANSIGHT_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            hub_base: std::env::var("SCANSIGHT_HUB_BASE")
                .unwrap_or_else(|_| DEFAULT_HUB_BASE.to_string()),
            vqa_model: VQA_MODEL_ID.to_string(),
            text_model: TEXT_MODEL_ID.to_string(),
            credential: std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty()),
            timeout_secs: REMOTE_TIMEOUT_SECS,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            hub_base: DEFAULT_HUB_BASE.to_string(),
            vqa_model: VQA_MODEL_ID.to_string(),
            text_model: TEXT_MODEL_ID.to_string(),
            credential: None,
            timeout_secs: REMOTE_TIMEOUT_SECS,
        }
    }
}

/// Server bind address: `SCANSIGHT_ADDR` or 127.0.0.1:8490.
pub fn bind_addr() -> SocketAddr {
    std::env::var("SCANSIGHT_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8490)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_hosted_endpoints() {
        let cfg = RemoteConfig::default();
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.vqa_model, "Salesforce/blip-vqa-base");
        assert_eq!(cfg.text_model, "google/flan-t5-xl");
        assert!(cfg.credential.is_none());
    }

    #[test]
    fn timeout_is_bounded() {
        assert_eq!(RemoteConfig::default().timeout_secs, 30);
    }

    #[test]
    fn app_name_is_scansight() {
        assert_eq!(APP_NAME, "ScanSight");
    }
}
