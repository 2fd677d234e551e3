#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::Arc;

    use alloy_primitives::{Address, U256};
    use supplychain_client::{
        chunk_ranges, Config, ContractAddresses, ContractKey, EthereumError, EventMonitor,
        FailureKind, LogEventHandler, NetworkConfig, RegistryClient, Role, TxOutcome,
        UNKNOWN_ERROR_MESSAGE,
    };
    use url::Url;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Built-in addresses make the default config valid.
        assert!(config.validate().is_ok());

        config.contracts.registry = Address::ZERO;
        assert!(config.validate().is_err());

        config = Config::default();
        config.monitoring.polling_interval_seconds = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.monitoring.max_block_range = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_network_config() {
        let config = NetworkConfig {
            name: "sepolia".to_string(),
            chain_id: 11155111,
            rpc_url: Some(Url::parse("https://eth-sepolia.g.alchemy.com/v2/test").unwrap()),
            explorer_url: None,
            is_testnet: true,
        };

        assert_eq!(config.name, "sepolia");
        assert_eq!(config.chain_id, 11155111);
        assert!(config.is_testnet);
    }

    #[test]
    fn test_contract_addresses() {
        let registry = Address::random();
        let product_token = Address::random();
        let marketplace = Address::random();

        let addresses = ContractAddresses::new(registry, product_token, marketplace);

        assert_eq!(addresses.address_of(ContractKey::Registry), registry);
        assert_eq!(addresses.address_of(ContractKey::ProductToken), product_token);
        assert_eq!(addresses.address_of(ContractKey::Marketplace), marketplace);
    }

    #[test]
    fn test_types_serialization() {
        let outcome = TxOutcome {
            transaction_hash: alloy_primitives::FixedBytes::random(),
            block_number: Some(12345),
            gas_used: 21_000,
        };

        let json = serde_json::to_string(&outcome).unwrap();
        let deserialized: TxOutcome = serde_json::from_str(&json).unwrap();

        assert_eq!(outcome.transaction_hash, deserialized.transaction_hash);
        assert_eq!(outcome.block_number, deserialized.block_number);
        assert_eq!(outcome.gas_used, deserialized.gas_used);
    }

    #[test]
    fn test_error_types() {
        let config_error = EthereumError::Config("test error".to_string());
        assert!(matches!(config_error, EthereumError::Config(_)));

        let invalid_addr_error = EthereumError::InvalidAddress("0xinvalid".to_string());
        assert!(matches!(invalid_addr_error, EthereumError::InvalidAddress(_)));

        let error_msg = format!("{config_error}");
        assert!(error_msg.contains("Configuration error"));
    }

    #[test]
    fn test_chunk_ranges_cover_scan_range() {
        assert_eq!(
            chunk_ranges(0, 12_000, 5_000),
            vec![(0, 4_999), (5_000, 9_999), (10_000, 12_000)],
        );
    }

    #[tokio::test]
    async fn test_offline_client_rejects_chain_operations() {
        let client = RegistryClient::offline(Config::default()).unwrap();
        assert!(!client.is_connected());

        let filter = client.event_filter(ContractKey::Registry);
        let result = client.fetch_events(ContractKey::Registry, filter).await;
        assert!(matches!(result, Err(EthereumError::NotConnected)));

        let result = client.participant_role(Address::random()).await;
        assert!(matches!(result, Err(EthereumError::NotConnected)));

        let result = client.participant(Address::random()).await;
        assert!(matches!(result, Err(EthereumError::NotConnected)));
    }

    #[tokio::test]
    async fn test_monitor_flag_clears_when_scan_fails() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("supplychain_client=warn")
            .try_init();

        // A dead local endpoint makes the first poll pass fail fast.
        let mut config = Config::default();
        config.network.rpc_url = Some(Url::parse("http://127.0.0.1:9").unwrap());
        let client = RegistryClient::connect(config).await.unwrap();

        let mut monitor = EventMonitor::new(Arc::new(client));
        monitor.register_handler(Arc::new(LogEventHandler::new("test".to_string())));
        let handle = monitor.handle();

        let result = monitor.run().await;
        assert!(result.is_err());
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_offline_client_resolves_known_deployment_block() {
        let client = RegistryClient::offline(Config::default()).unwrap();
        assert_eq!(client.start_block(ContractKey::Registry).await, 9_664_166);
    }

    #[tokio::test]
    async fn test_admin_override_skips_chain_lookup() {
        let admin = Address::random();
        let mut config = Config::default();
        config.contracts.admin_override = Some(admin);

        // Offline client: only the override can satisfy this call.
        let client = RegistryClient::offline(config).unwrap();
        assert_eq!(client.admin().await.unwrap(), admin);
    }

    #[test]
    fn test_failure_classification_end_to_end() {
        let rejected = FailureKind::classify_message("User rejected the request");
        assert_eq!(rejected.user_message(), "Transaction rejected by user.");

        let balance = FailureKind::classify_message("execution reverted: InsufficientBalance(2, 1)");
        assert_eq!(
            balance.user_message(),
            "Insufficient balance to complete this action."
        );

        let passthrough = FailureKind::classify_message("weird supply chain problem");
        assert_eq!(passthrough.user_message(), "weird supply chain problem");

        let unknown = FailureKind::classify(None, None);
        assert_eq!(unknown.user_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_role_values_match_contract_encoding() {
        assert_eq!(Role::Producer.as_u8(), 1);
        assert_eq!(Role::Consumer.as_u8(), 4);
        assert_eq!(Role::from_u8(3), Some(Role::Retailer));
        assert_eq!(Role::from_u8(0), None);

        let _ = U256::from(Role::Factory.as_u8());
    }

    #[tokio::test]
    async fn test_config_from_env() {
        env::set_var("ETHEREUM_NETWORK", "sepolia");
        env::set_var(
            "REGISTRY_CONTRACT_ADDRESS",
            "0x1234567890123456789012345678901234567890",
        );

        if let Ok(config) = Config::from_env() {
            assert_eq!(config.network.name, "sepolia");
            assert_eq!(config.network.chain_id, 11155111);
            assert!(config.network.is_testnet);
            assert_eq!(
                config.contracts.registry,
                "0x1234567890123456789012345678901234567890"
                    .parse::<Address>()
                    .unwrap()
            );
        }

        env::remove_var("ETHEREUM_NETWORK");
        env::remove_var("REGISTRY_CONTRACT_ADDRESS");
    }
}
