use crate::types::DEFAULT_PROFILING_FIELDS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environment variable that overrides `model.api_key`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

// ── Model endpoint ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Single bounded timeout for one generate call. No retries.
    pub timeout_secs: u64,
    pub temperature: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url:     "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model:        "gemini-2.0-flash-001".to_string(),
            api_key:      None,
            timeout_secs: 120,
            temperature:  None,
        }
    }
}

// ── Category colours ──────────────────────────────────────────────

/// Category → hex colour. Any category not listed uses `fallback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub colors: BTreeMap<String, String>,
    pub fallback: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let colors = [
            ("Data", "#4285F4"),
            ("Voice", "#EA4335"),
            ("SMS", "#FBBC05"),
            ("Bundle", "#34A853"),
            ("VAS", "#8E24AA"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            colors,
            fallback: "#9E9E9E".to_string(),
        }
    }
}

// ── Top level ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub subscriber_file: String,
    pub product_file: String,
    /// Read at most this many subscriber rows. `None` reads the whole file.
    pub subscriber_limit: Option<usize>,
    pub product_limit: Option<usize>,
    /// Profiling attributes switched on unless the operator overrides them.
    pub profiling_fields: Vec<String>,
    pub model: ModelConfig,
    pub palette: PaletteConfig,
    pub report_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            subscriber_file:  "SubscriberProfileData.csv".to_string(),
            product_file:     "ProductCatalogue.csv".to_string(),
            subscriber_limit: Some(50),
            product_limit:    Some(20),
            profiling_fields: DEFAULT_PROFILING_FIELDS.iter().map(|f| f.to_string()).collect(),
            model:            ModelConfig::default(),
            palette:          PaletteConfig::default(),
            report_dir:       "reports".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. Missing keys fall back to the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model.timeout_secs == 0 {
            anyhow::bail!("model.timeout_secs must be > 0");
        }
        if self.model.model.trim().is_empty() {
            anyhow::bail!("model.model must not be empty");
        }
        if self.subscriber_limit == Some(0) || self.product_limit == Some(0) {
            anyhow::bail!("row limits must be > 0 when set");
        }
        Ok(())
    }

    /// API key from the environment, else from the file.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.model.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}
