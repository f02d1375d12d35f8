//! Integration health probes shown before a run.

use crate::{
    config::{AppConfig, API_KEY_ENV},
    dataset::{ProductCatalogue, SubscriberTable},
    error::RecResult,
    model::GenerativeModel,
};
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthProbe {
    pub service: &'static str,
    pub ok:      bool,
    pub tooltip: &'static str,
    /// Failure detail, empty when the probe passed.
    pub detail:  String,
}

impl HealthProbe {
    fn from_result<E: std::fmt::Display>(
        service: &'static str,
        tooltip: &'static str,
        result: Result<(), E>,
    ) -> Self {
        let (ok, detail) = match result {
            Ok(()) => (true, String::new()),
            Err(e) => {
                warn!("health check '{service}' failed: {e}");
                (false, e.to_string())
            }
        };
        Self { service, ok, tooltip, detail }
    }
}

/// A data file passes when it loads with at least one usable row.
fn require_row(loaded: RecResult<usize>) -> Result<(), String> {
    match loaded {
        Ok(0) => Err("file has a header but no usable data rows".to_string()),
        Ok(_) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Run every probe. Data files need a header and one usable row. The model
/// probe sends a one-word prompt and is skipped when `model` is `None`.
pub fn check_integration_health(
    config: &AppConfig,
    model: Option<&dyn GenerativeModel>,
) -> Vec<HealthProbe> {
    let mut probes = vec![
        HealthProbe::from_result(
            "Subscriber CSV",
            "Checks that the subscriber profile file is present and readable",
            require_row(SubscriberTable::load(&config.subscriber_file, Some(1)).map(|t| t.len())),
        ),
        HealthProbe::from_result(
            "Product Catalogue CSV",
            "Checks that the product catalogue file is present and readable",
            require_row(ProductCatalogue::load(&config.product_file, Some(1)).map(|c| c.len())),
        ),
        HealthProbe::from_result(
            "Credentials",
            "Checks that an API key is configured for the model service",
            config
                .resolved_api_key()
                .map(|_| ())
                .ok_or_else(|| format!("set model.api_key or {API_KEY_ENV}")),
        ),
    ];

    if let Some(model) = model {
        probes.push(HealthProbe::from_result(
            "Model API",
            "Checks the connection to the hosted generative model",
            model.generate("ping").map(|_| ()),
        ));
    }
    probes
}

pub fn all_healthy(probes: &[HealthProbe]) -> bool {
    probes.iter().all(|p| p.ok)
}
