//! Integration health check tests.

use amabutho_core::{
    config::{AppConfig, API_KEY_ENV},
    error::{RecError, RecResult},
    health::{all_healthy, check_integration_health, HealthProbe},
    model::GenerativeModel,
};
use std::io::Write;
use tempfile::NamedTempFile;

// ── Test helpers ────────────────────────────────────────────────────────────

const SUBSCRIBERS: &str = "MSISDN,DeviceType\n27831000001,Smartphone\n";
const PRODUCTS: &str = "ProductCode,ProductName\nP001,Gaming Pass\n";

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn config(subscribers: &str, products: &str, api_key: Option<&str>) -> AppConfig {
    let mut config = AppConfig {
        subscriber_file: subscribers.to_string(),
        product_file: products.to_string(),
        ..AppConfig::default()
    };
    config.model.api_key = api_key.map(str::to_string);
    config
}

fn path(file: &NamedTempFile) -> String {
    file.path().display().to_string()
}

fn check<'a>(probes: &'a [HealthProbe], service: &str) -> &'a HealthProbe {
    probes.iter().find(|p| p.service == service).unwrap()
}

/// Replies with a fixed outcome to the ping prompt.
struct PingModel(Result<&'static str, &'static str>);

impl GenerativeModel for PingModel {
    fn name(&self) -> &str {
        "ping"
    }

    fn generate(&self, _prompt: &str) -> RecResult<String> {
        self.0
            .map(str::to_string)
            .map_err(|e| RecError::ExternalService(e.to_string()))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[test]
fn readable_files_and_key_are_healthy() {
    let subs = csv_file(SUBSCRIBERS);
    let products = csv_file(PRODUCTS);
    let probes = check_integration_health(&config(&path(&subs), &path(&products), Some("k")), None);

    let services: Vec<_> = probes.iter().map(|p| p.service).collect();
    assert_eq!(services, vec!["Subscriber CSV", "Product Catalogue CSV", "Credentials"]);
    assert!(probes.iter().all(|p| p.detail.is_empty() && !p.tooltip.is_empty()));
    assert!(all_healthy(&probes));
}

#[test]
fn missing_files_fail_their_checks() {
    let probes = check_integration_health(
        &config("/no/such/subscribers.csv", "/no/such/products.csv", Some("k")),
        None,
    );
    assert!(!check(&probes, "Subscriber CSV").ok);
    assert!(!check(&probes, "Product Catalogue CSV").ok);
    assert!(!check(&probes, "Subscriber CSV").detail.is_empty());
    assert!(check(&probes, "Credentials").ok);
    assert!(!all_healthy(&probes));
}

/// A header with no usable row is not a readable data file.
#[test]
fn header_only_file_fails() {
    let subs = csv_file("MSISDN,DeviceType\nnot-a-number,Smartphone\n");
    let products = csv_file("ProductCode,ProductName\n");
    let probes = check_integration_health(&config(&path(&subs), &path(&products), Some("k")), None);

    assert!(!check(&probes, "Subscriber CSV").ok);
    assert!(!check(&probes, "Product Catalogue CSV").ok);
    assert!(!all_healthy(&probes));
}

#[test]
fn missing_key_fails_credentials() {
    std::env::remove_var(API_KEY_ENV);
    let subs = csv_file(SUBSCRIBERS);
    let products = csv_file(PRODUCTS);
    let probes = check_integration_health(&config(&path(&subs), &path(&products), None), None);

    let credentials = check(&probes, "Credentials");
    assert!(!credentials.ok);
    assert!(credentials.detail.contains(API_KEY_ENV));
    assert!(!all_healthy(&probes));
}

#[test]
fn model_ping_reports_service_failure() {
    let subs = csv_file(SUBSCRIBERS);
    let products = csv_file(PRODUCTS);
    let config = config(&path(&subs), &path(&products), Some("k"));

    let failing = PingModel(Err("quota exceeded"));
    let probes = check_integration_health(&config, Some(&failing as &dyn GenerativeModel));
    assert_eq!(probes.len(), 4);
    let model = check(&probes, "Model API");
    assert!(!model.ok);
    assert!(model.detail.contains("quota exceeded"));
    assert!(!all_healthy(&probes));

    let working = PingModel(Ok("pong"));
    let probes = check_integration_health(&config, Some(&working as &dyn GenerativeModel));
    assert!(check(&probes, "Model API").ok);
    assert!(all_healthy(&probes));
}
