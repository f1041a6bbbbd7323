use brickline_common::ContractName;
use figment::{
    Figment,
    providers::{Format, Toml},
};

use crate::{AppConfig, ContractsConfig};

#[test]
fn test_defaults_when_sections_absent() {
    let config: AppConfig = Figment::new()
        .merge(Toml::string(""))
        .extract()
        .expect("empty config should load with defaults");

    assert_eq!(config.telemetry.log_level, "info");
    assert_eq!(config.ledger.network, "testnet");
    assert_eq!(config.ledger.finality_timeout_secs, 30);
    assert!(config.contracts.address_of(ContractName::LoanManager).is_none());
}

#[test]
fn test_configured_addresses_resolve() {
    let config: AppConfig = Figment::new()
        .merge(Toml::string(
            r#"
            [contracts]
            property_registry = "0.0.5001"
            loan_manager = "0.0.5002"
            "#,
        ))
        .extract()
        .expect("config should load");

    let addr = config
        .contracts
        .address_of(ContractName::PropertyRegistry)
        .expect("property registry should be configured");
    assert_eq!(addr.as_str(), "0.0.5001");
    assert!(config.contracts.address_of(ContractName::Oracle).is_none());
}

#[test]
fn test_placeholder_addresses_are_unconfigured() {
    let contracts = ContractsConfig {
        property_registry: Some("YOUR_DEPLOYED_PROPERTY_REGISTRY_ADDRESS".to_string()),
        loan_manager: Some("   ".to_string()),
        oracle: None,
    };

    for name in ContractName::ALL {
        assert!(
            contracts.address_of(name).is_none(),
            "{name} should be treated as unconfigured"
        );
    }
}
