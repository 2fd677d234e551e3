use std::env;

use alloy_primitives::{address, Address, FixedBytes};
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EthereumError, Result};
use crate::scan::DEFAULT_SCAN_WINDOW;

/// Built-in contract addresses used when none are configured.
pub const DEFAULT_REGISTRY_ADDRESS: Address =
    address!("4f2a8b1c9d3e5f60718293a4b5c6d7e8f9001122");
pub const DEFAULT_PRODUCT_TOKEN_ADDRESS: Address =
    address!("7c1d2e3f4a5b6c7d8e9f0a1b2c3d4e5f60718293");
pub const DEFAULT_MARKETPLACE_ADDRESS: Address =
    address!("a1b2c3d4e5f60718293a4b5c6d7e8f9001122334");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub contracts: ContractConfig,
    pub signer: Option<SignerConfig>,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    /// Absent when running without a live connection; required by
    /// [`crate::RegistryClient::connect`].
    pub rpc_url: Option<Url>,
    pub explorer_url: Option<Url>,
    pub is_testnet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    pub registry: Address,
    pub product_token: Address,
    pub marketplace: Address,
    /// When set, overrides the on-chain `admin()` lookup.
    pub admin_override: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    pub private_key: String,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enable_event_monitoring: bool,
    pub polling_interval_seconds: u64,
    /// Window width for chunked log scans.
    pub max_block_range: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let network_name = env::var("ETHEREUM_NETWORK").unwrap_or_else(|_| "sepolia".to_string());
        let chain_id: u64 = env::var("CHAIN_ID")
            .unwrap_or_else(|_| {
                #[allow(clippy::wildcard_in_or_patterns)]
                match network_name.as_str() {
                    "mainnet" => "1".to_string(),
                    "sepolia" | _ => "11155111".to_string(),
                }
            })
            .parse()
            .map_err(|e| EthereumError::Config(format!("Invalid chain ID: {e}")))?;

        let rpc_url = match env::var("ETHEREUM_RPC_URL") {
            Ok(raw) => Some(
                Url::parse(&raw)
                    .map_err(|e| EthereumError::Config(format!("Invalid ETHEREUM_RPC_URL: {e}")))?,
            ),
            Err(_) => None,
        };

        let registry = parse_address_env("REGISTRY_CONTRACT_ADDRESS", DEFAULT_REGISTRY_ADDRESS)?;
        let product_token =
            parse_address_env("PRODUCT_TOKEN_CONTRACT_ADDRESS", DEFAULT_PRODUCT_TOKEN_ADDRESS)?;
        let marketplace =
            parse_address_env("MARKETPLACE_CONTRACT_ADDRESS", DEFAULT_MARKETPLACE_ADDRESS)?;

        let admin_override = match env::var("ADMIN_ADDRESS") {
            Ok(raw) => Some(raw.parse::<Address>().map_err(|e| {
                EthereumError::InvalidAddress(format!("Invalid ADMIN_ADDRESS: {e}"))
            })?),
            Err(_) => None,
        };

        let signer = if let Ok(private_key) = env::var("ETHEREUM_WALLET_PRIVATE_KEY") {
            let key = private_key.trim_start_matches("0x");
            let parsed = PrivateKeySigner::from_bytes(&FixedBytes::<32>::try_from(
                hex::decode(key)?.as_slice(),
            )?)
            .map_err(|e| EthereumError::Signer(e.to_string()))?;

            let address = match env::var("ETHEREUM_WALLET_ADDRESS") {
                Ok(raw) => {
                    let declared = raw.parse::<Address>().map_err(|e| {
                        EthereumError::InvalidAddress(format!(
                            "Invalid ETHEREUM_WALLET_ADDRESS: {e}"
                        ))
                    })?;
                    if parsed.address() != declared {
                        return Err(EthereumError::Config(format!(
                            "Private key address ({}) does not match ETHEREUM_WALLET_ADDRESS ({declared})",
                            parsed.address(),
                        )));
                    }
                    declared
                }
                Err(_) => parsed.address(),
            };

            Some(SignerConfig {
                private_key,
                address,
            })
        } else {
            None
        };

        Ok(Self {
            network: NetworkConfig {
                explorer_url: Self::explorer_url(&network_name),
                is_testnet: Self::is_testnet(chain_id),
                name: network_name,
                chain_id,
                rpc_url,
            },
            contracts: ContractConfig {
                registry,
                product_token,
                marketplace,
                admin_override,
            },
            signer,
            monitoring: MonitoringConfig {
                enable_event_monitoring: env::var("ENABLE_EVENT_MONITORING")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
                polling_interval_seconds: env::var("POLLING_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
                max_block_range: env::var("MAX_BLOCK_RANGE")
                    .unwrap_or_else(|_| DEFAULT_SCAN_WINDOW.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_SCAN_WINDOW),
            },
        })
    }

    fn explorer_url(network: &str) -> Option<Url> {
        let url_str = match network {
            "mainnet" => "https://etherscan.io",
            "sepolia" => "https://sepolia.etherscan.io",
            _ => return None,
        };

        Url::parse(url_str).ok()
    }

    const fn is_testnet(chain_id: u64) -> bool {
        matches!(chain_id, 11_155_111)
    }

    pub fn validate(&self) -> Result<()> {
        if self.contracts.registry == Address::ZERO
            || self.contracts.product_token == Address::ZERO
            || self.contracts.marketplace == Address::ZERO
        {
            return Err(EthereumError::Config(
                "Contract addresses must be non-zero".to_string(),
            ));
        }

        if self.monitoring.polling_interval_seconds == 0 {
            return Err(EthereumError::Config(
                "Polling interval must be greater than 0".to_string(),
            ));
        }

        if self.monitoring.max_block_range == 0 {
            return Err(EthereumError::Config(
                "Max block range must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_address_env(var: &str, default: Address) -> Result<Address> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<Address>()
            .map_err(|e| EthereumError::InvalidAddress(format!("Invalid {var}: {e}"))),
        Err(_) => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                name: "sepolia".to_string(),
                chain_id: 11_155_111,
                rpc_url: None,
                explorer_url: Url::parse("https://sepolia.etherscan.io").ok(),
                is_testnet: true,
            },
            contracts: ContractConfig {
                registry: DEFAULT_REGISTRY_ADDRESS,
                product_token: DEFAULT_PRODUCT_TOKEN_ADDRESS,
                marketplace: DEFAULT_MARKETPLACE_ADDRESS,
                admin_override: None,
            },
            signer: None,
            monitoring: MonitoringConfig {
                enable_event_monitoring: true,
                polling_interval_seconds: 30,
                max_block_range: DEFAULT_SCAN_WINDOW,
            },
        }
    }
}
