//! Unit tests for client module.

use super::*;

// ============================================================================
// ClientConfig Tests
// ============================================================================

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();

    assert_eq!(config.base_url, "http://localhost:3000/api");
    assert_eq!(config.timeout, Duration::from_secs(30));
}

#[test]
fn test_client_config_custom() {
    let config = ClientConfig {
        base_url: "http://monitor.example.com:9000/api".to_string(),
        timeout: Duration::from_secs(5),
    };

    assert_eq!(config.base_url, "http://monitor.example.com:9000/api");
    assert_eq!(config.timeout, Duration::from_secs(5));
}

// ============================================================================
// MonitorClient Creation Tests
// ============================================================================

#[test]
fn test_monitor_client_new() {
    let client = MonitorClient::new(ClientConfig::default());

    assert!(client.is_ok());
}

#[test]
fn test_monitor_client_invalid_base_url() {
    let client = MonitorClient::with_base_url("not a url");

    assert!(matches!(client, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_monitor_client_base_url_trimmed() {
    let client = MonitorClient::with_base_url("http://localhost:3000/api/").unwrap();

    assert_eq!(client.base_url(), "http://localhost:3000/api");
}

// ============================================================================
// URL Building Tests
// ============================================================================

#[test]
fn test_endpoint_urls() {
    let client = MonitorClient::with_base_url("http://localhost:5000/api").unwrap();

    assert_eq!(client.options_url(), "http://localhost:5000/api/options");
    assert_eq!(client.health_url(), "http://localhost:5000/api/health");
}

#[tokio::test]
async fn test_get_options_unreachable_backend() {
    // Port 9 (discard) is not expected to accept HTTP connections.
    let client = MonitorClient::new(ClientConfig {
        base_url: "http://127.0.0.1:9/api".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let result = client.get_options().await;
    assert!(matches!(result, Err(Error::Http(_))));
}
