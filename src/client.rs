use alloy_network::{Ethereum, EthereumWallet};
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{Filter, Log};
use alloy_signer_local::PrivateKeySigner;
use tracing::{debug, info};

use crate::config::{Config, SignerConfig};
use crate::contracts::{
    ContractAddresses, ContractKey, IMarketplace, IParticipantRegistry, IProductToken,
};
use crate::error::{EthereumError, Result};
use crate::scan;
use crate::start_block::{self, StartBlockCache};
use crate::types::{Participant, ProductCreation, ProductRecord, Role, TxOutcome};

/// Typed client for the supply-chain registry contracts.
///
/// Exists in two states, mirroring the pre- and post-connect phases of the
/// original wallet flow: [`RegistryClient::offline`] carries configuration
/// only, and every chain-touching operation fails with
/// [`EthereumError::NotConnected`]; [`RegistryClient::connect`] attaches an
/// HTTP provider, with a wallet filler when a signer is configured.
pub struct RegistryClient {
    config: Config,
    provider: Option<DynProvider>,
    contracts: ContractAddresses,
    start_blocks: StartBlockCache,
}

impl RegistryClient {
    /// Build a client with no live chain connection.
    pub fn offline(config: Config) -> Result<Self> {
        config.validate()?;
        let contracts = Self::addresses(&config);
        Ok(Self {
            config,
            provider: None,
            contracts,
            start_blocks: StartBlockCache::new(),
        })
    }

    /// Build a client connected over HTTP. Requires `ETHEREUM_RPC_URL`.
    pub async fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let rpc_url = config.network.rpc_url.clone().ok_or_else(|| {
            EthereumError::Config("ETHEREUM_RPC_URL is required to connect".to_string())
        })?;

        let provider = match &config.signer {
            Some(signer_config) => {
                let signer = Self::build_signer(signer_config)?;
                let wallet = EthereumWallet::from(signer);
                ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_http(rpc_url)
                    .erased()
            }
            None => ProviderBuilder::new().connect_http(rpc_url).erased(),
        };

        info!(
            network = %config.network.name,
            chain_id = config.network.chain_id,
            signing = config.signer.is_some(),
            "connected to chain provider"
        );

        let contracts = Self::addresses(&config);
        Ok(Self {
            config,
            provider: Some(provider),
            contracts,
            start_blocks: StartBlockCache::new(),
        })
    }

    fn addresses(config: &Config) -> ContractAddresses {
        ContractAddresses::new(
            config.contracts.registry,
            config.contracts.product_token,
            config.contracts.marketplace,
        )
    }

    fn build_signer(config: &SignerConfig) -> Result<PrivateKeySigner> {
        let key = config.private_key.trim_start_matches("0x");
        let signer = PrivateKeySigner::from_bytes(&FixedBytes::<32>::try_from(
            hex::decode(key)?.as_slice(),
        )?)
        .map_err(|e| EthereumError::Signer(e.to_string()))?;

        if signer.address() != config.address {
            return Err(EthereumError::Signer(format!(
                "private key does not match configured address {}",
                config.address
            )));
        }
        Ok(signer)
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.provider.is_some()
    }

    fn require_provider(&self) -> Result<&DynProvider> {
        self.provider.as_ref().ok_or(EthereumError::NotConnected)
    }

    fn registry(&self) -> Result<IParticipantRegistry::IParticipantRegistryInstance<DynProvider>> {
        Ok(IParticipantRegistry::new(
            self.contracts.registry,
            self.require_provider()?.clone(),
        ))
    }

    fn token(&self) -> Result<IProductToken::IProductTokenInstance<DynProvider>> {
        Ok(IProductToken::new(
            self.contracts.product_token,
            self.require_provider()?.clone(),
        ))
    }

    fn marketplace(&self) -> Result<IMarketplace::IMarketplaceInstance<DynProvider>> {
        Ok(IMarketplace::new(
            self.contracts.marketplace,
            self.require_provider()?.clone(),
        ))
    }

    // --- reads ---

    pub async fn block_number(&self) -> Result<u64> {
        Ok(self.require_provider()?.get_block_number().await?)
    }

    /// Role of `account`, or `None` when the account is unregistered.
    pub async fn participant_role(&self, account: Address) -> Result<Option<Role>> {
        let raw = self.registry()?.participantRole(account).call().await?;
        Ok(Role::from_u8(raw))
    }

    /// Registered participant at `account`, or `None` when unregistered.
    pub async fn participant(&self, account: Address) -> Result<Option<Participant>> {
        let role = self.participant_role(account).await?;
        Ok(role.map(|role| Participant {
            address: account,
            role,
        }))
    }

    /// Administrator address: the configured override when present, the
    /// on-chain value otherwise.
    pub async fn admin(&self) -> Result<Address> {
        if let Some(admin) = self.config.contracts.admin_override {
            return Ok(admin);
        }
        Ok(self.registry()?.admin().call().await?)
    }

    pub async fn product(&self, product_id: U256) -> Result<ProductRecord> {
        let product = self.token()?.getProduct(product_id).call().await?;
        if !product.exists {
            return Err(EthereumError::Contract(format!(
                "product {product_id} does not exist"
            )));
        }
        Ok(ProductRecord {
            id: product.id,
            name: product.name,
            owner: product.owner,
            price: product.price,
        })
    }

    pub async fn product_count(&self) -> Result<U256> {
        Ok(self.token()?.productCount().call().await?)
    }

    pub async fn products_of(&self, owner: Address) -> Result<Vec<U256>> {
        Ok(self.token()?.productsOf(owner).call().await?)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        Ok(self.token()?.balanceOf(account).call().await?)
    }

    /// Listing price of a product, or `None` when it is not listed.
    pub async fn listing_price(&self, product_id: U256) -> Result<Option<U256>> {
        let listing = self.marketplace()?.listingPrice(product_id).call().await?;
        Ok(listing.listed.then_some(listing.price))
    }

    // --- writes ---

    pub async fn register_participant(&self, account: Address, role: Role) -> Result<TxOutcome> {
        let pending = self
            .registry()?
            .registerParticipant(account, role.as_u8())
            .send()
            .await?;
        self.confirm(pending).await
    }

    /// Create a product and recover its id from the `ProductCreated` event in
    /// the confirmation receipt.
    pub async fn create_product(&self, name: &str, price: U256) -> Result<ProductCreation> {
        let pending = self
            .token()?
            .createProduct(name.to_string(), price)
            .send()
            .await?;

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(EthereumError::TransactionFailed(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        let product_id = receipt.inner.logs().iter().find_map(|log| {
            log.log_decode::<IProductToken::ProductCreated>()
                .ok()
                .map(|decoded| decoded.inner.data.productId)
        });

        Ok(ProductCreation {
            product_id,
            outcome: TxOutcome {
                transaction_hash: receipt.transaction_hash,
                block_number: receipt.block_number,
                gas_used: receipt.gas_used,
            },
        })
    }

    pub async fn initiate_transfer(&self, product_id: U256, to: Address) -> Result<TxOutcome> {
        let pending = self.token()?.initiateTransfer(product_id, to).send().await?;
        self.confirm(pending).await
    }

    pub async fn accept_transfer(&self, product_id: U256) -> Result<TxOutcome> {
        let pending = self.token()?.acceptTransfer(product_id).send().await?;
        self.confirm(pending).await
    }

    pub async fn list_product(&self, product_id: U256, price: U256) -> Result<TxOutcome> {
        let pending = self
            .marketplace()?
            .listProduct(product_id, price)
            .send()
            .await?;
        self.confirm(pending).await
    }

    /// Purchase a listed product, sending `price` along with the call.
    pub async fn purchase_product(&self, product_id: U256, price: U256) -> Result<TxOutcome> {
        let pending = self
            .marketplace()?
            .purchaseProduct(product_id)
            .value(price)
            .send()
            .await?;
        self.confirm(pending).await
    }

    async fn confirm(&self, pending: PendingTransactionBuilder<Ethereum>) -> Result<TxOutcome> {
        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(EthereumError::TransactionFailed(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }
        debug!(tx = %receipt.transaction_hash, block = receipt.block_number, "transaction confirmed");
        Ok(TxOutcome {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    // --- event scanning ---

    /// Filter matching all events of one logical contract.
    #[must_use]
    pub fn event_filter(&self, key: ContractKey) -> Filter {
        Filter::new().address(self.contracts.address_of(key))
    }

    /// Start block for scanning `key`'s events, resolved once per (network,
    /// contract) and cached for the client's lifetime.
    pub async fn start_block(&self, key: ContractKey) -> u64 {
        start_block::resolve_start_block(
            &self.start_blocks,
            self.provider.as_ref(),
            &self.config.network.name,
            key,
        )
        .await
    }

    /// Fetch all logs for `filter` from the resolved start block of `key`
    /// through the current head, in bounded windows.
    pub async fn fetch_events(&self, key: ContractKey, filter: Filter) -> Result<Vec<Log>> {
        let provider = self.require_provider()?;
        let from_block = self.start_block(key).await;
        scan::fetch_logs_chunked(
            provider,
            &filter,
            from_block,
            self.config.monitoring.max_block_range,
        )
        .await
    }

    /// Same as [`Self::fetch_events`] with an explicit start block.
    pub async fn fetch_events_from(&self, filter: Filter, from_block: u64) -> Result<Vec<Log>> {
        let provider = self.require_provider()?;
        scan::fetch_logs_chunked(
            provider,
            &filter,
            from_block,
            self.config.monitoring.max_block_range,
        )
        .await
    }
}
