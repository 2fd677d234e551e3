//! Resolves the block number from which to start scanning a contract's
//! event logs.
//!
//! Scanning from genesis against public providers is prohibitively slow, so
//! the resolver works down a priority list: cached value, static deployment
//! block, receipt lookup of the deployment transaction, current head minus a
//! conservative offset, and finally a hard-coded fallback. Every outcome is
//! cached so repeated calls never repeat I/O, and no step failure escapes to
//! the caller.

use std::collections::HashMap;

use alloy_primitives::{b256, TxHash};
use alloy_provider::Provider;
use parking_lot::Mutex;
use tracing::debug;

use crate::contracts::ContractKey;

/// Blocks to look back from the chain head when no deployment block is known.
pub const DEFAULT_FALLBACK_OFFSET: u64 = 50_000;

/// Last-resort start block when there is no metadata and no live connection.
pub const DEFAULT_FALLBACK_BLOCK: u64 = 9_600_000;

/// Static per-network deployment metadata, fixed at build time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentInfo {
    /// Exact block the contract was deployed at, when recorded.
    pub block: Option<u64>,
    /// Deployment transaction, for a receipt lookup when the block is not
    /// recorded.
    pub deploy_tx: Option<TxHash>,
    /// Per-contract override for [`DEFAULT_FALLBACK_BLOCK`].
    pub fallback_block: Option<u64>,
    /// Per-contract override for [`DEFAULT_FALLBACK_OFFSET`].
    pub fallback_offset: Option<u64>,
}

/// Deployment metadata for the two supported networks. Anything else gets no
/// metadata and relies on the fallback chain.
#[must_use]
pub fn deployment_info(network: &str, key: ContractKey) -> Option<DeploymentInfo> {
    let info = match (network, key) {
        ("mainnet", ContractKey::Registry) => DeploymentInfo {
            block: Some(19_218_412),
            ..DeploymentInfo::default()
        },
        ("mainnet", ContractKey::ProductToken) => DeploymentInfo {
            block: Some(19_218_437),
            ..DeploymentInfo::default()
        },
        ("mainnet", ContractKey::Marketplace) => DeploymentInfo {
            block: Some(19_220_103),
            ..DeploymentInfo::default()
        },
        ("sepolia", ContractKey::Registry) => DeploymentInfo {
            block: Some(9_664_166),
            ..DeploymentInfo::default()
        },
        ("sepolia", ContractKey::ProductToken) => DeploymentInfo {
            deploy_tx: Some(b256!(
                "8f1f6c7dd41d7b4b96e55e648a75fa4bfea8c1b91a1f79c4f67d17b4d4f0a2cd"
            )),
            fallback_offset: Some(100_000),
            ..DeploymentInfo::default()
        },
        ("sepolia", ContractKey::Marketplace) => DeploymentInfo {
            fallback_block: Some(9_650_000),
            ..DeploymentInfo::default()
        },
        _ => return None,
    };
    Some(info)
}

/// Cache of resolved start blocks, keyed by declared network name plus
/// logical contract. Owned by the client and dropped with it.
///
/// Known limitation carried over from the original behavior: the key does
/// not include the RPC endpoint, so switching endpoints without changing the
/// declared network reuses previously resolved blocks.
#[derive(Debug, Default)]
pub struct StartBlockCache {
    resolved: Mutex<HashMap<(String, ContractKey), u64>>,
}

impl StartBlockCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, network: &str, key: ContractKey) -> Option<u64> {
        self.resolved
            .lock()
            .get(&(network.to_string(), key))
            .copied()
    }

    pub fn insert(&self, network: &str, key: ContractKey, block: u64) {
        self.resolved.lock().insert((network.to_string(), key), block);
    }
}

/// Resolve the start block for an event scan. Infallible: individual lookup
/// failures fall through to the next step, and the final fallback is a
/// constant. The result is always at least 1 and is cached before returning.
///
/// Callers racing on the same key may each run the fallback I/O once;
/// last-write-wins into the cache is tolerated since resolution is
/// idempotent.
pub async fn resolve_start_block<P: Provider>(
    cache: &StartBlockCache,
    provider: Option<&P>,
    network: &str,
    key: ContractKey,
) -> u64 {
    if let Some(block) = cache.get(network, key) {
        return block;
    }

    let info = deployment_info(network, key).unwrap_or_default();
    let resolved = resolve_uncached(provider, network, key, &info).await;
    cache.insert(network, key, resolved);
    debug!(network, contract = key.name(), block = resolved, "resolved start block");
    resolved
}

async fn resolve_uncached<P: Provider>(
    provider: Option<&P>,
    network: &str,
    key: ContractKey,
    info: &DeploymentInfo,
) -> u64 {
    if let Some(block) = info.block {
        return block.max(1);
    }

    if let (Some(tx), Some(provider)) = (info.deploy_tx, provider) {
        match provider.get_transaction_receipt(tx).await {
            Ok(Some(receipt)) => {
                if let Some(block) = receipt.block_number {
                    return block.max(1);
                }
            }
            Ok(None) => {
                debug!(%tx, "deployment receipt not found, falling back");
            }
            Err(err) => {
                debug!(%tx, %err, "deployment receipt lookup failed, falling back");
            }
        }
    }

    if let Some(provider) = provider {
        match provider.get_block_number().await {
            Ok(head) => {
                let offset = info.fallback_offset.unwrap_or(DEFAULT_FALLBACK_OFFSET);
                return head.saturating_sub(offset).max(1);
            }
            Err(err) => {
                debug!(network, contract = key.name(), %err, "head lookup failed, using static fallback");
            }
        }
    }

    info.fallback_block.unwrap_or(DEFAULT_FALLBACK_BLOCK).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_provider::DynProvider;

    #[tokio::test]
    async fn unknown_network_without_connection_uses_static_fallback() {
        let cache = StartBlockCache::new();
        let block = resolve_start_block(
            &cache,
            None::<&DynProvider>,
            "devnet",
            ContractKey::Registry,
        )
        .await;

        assert_eq!(block, DEFAULT_FALLBACK_BLOCK);
        assert!(block >= 1);
    }

    #[tokio::test]
    async fn known_deployment_block_is_returned_exactly_without_io() {
        let cache = StartBlockCache::new();
        let block = resolve_start_block(
            &cache,
            None::<&DynProvider>,
            "sepolia",
            ContractKey::Registry,
        )
        .await;

        assert_eq!(block, 9_664_166);
    }

    #[tokio::test]
    async fn second_resolution_hits_the_cache() {
        let cache = StartBlockCache::new();

        // A pre-seeded sentinel proves the metadata table is not consulted
        // again once a value is cached.
        cache.insert("sepolia", ContractKey::Registry, 777);
        let block = resolve_start_block(
            &cache,
            None::<&DynProvider>,
            "sepolia",
            ContractKey::Registry,
        )
        .await;

        assert_eq!(block, 777);
    }

    #[tokio::test]
    async fn fallback_resolution_is_cached_too() {
        let cache = StartBlockCache::new();
        resolve_start_block(
            &cache,
            None::<&DynProvider>,
            "devnet",
            ContractKey::Marketplace,
        )
        .await;

        assert_eq!(
            cache.get("devnet", ContractKey::Marketplace),
            Some(DEFAULT_FALLBACK_BLOCK),
        );
    }

    #[tokio::test]
    async fn per_contract_fallback_block_overrides_the_default() {
        let cache = StartBlockCache::new();
        let block = resolve_start_block(
            &cache,
            None::<&DynProvider>,
            "sepolia",
            ContractKey::Marketplace,
        )
        .await;

        assert_eq!(block, 9_650_000);
    }

    #[test]
    fn cache_keys_separate_networks_and_contracts() {
        let cache = StartBlockCache::new();
        cache.insert("mainnet", ContractKey::Registry, 10);
        cache.insert("sepolia", ContractKey::Registry, 20);
        cache.insert("mainnet", ContractKey::Marketplace, 30);

        assert_eq!(cache.get("mainnet", ContractKey::Registry), Some(10));
        assert_eq!(cache.get("sepolia", ContractKey::Registry), Some(20));
        assert_eq!(cache.get("mainnet", ContractKey::Marketplace), Some(30));
        assert_eq!(cache.get("sepolia", ContractKey::Marketplace), None);
    }
}
