//! Polling event monitor over the registry contracts.
//!
//! The monitor scans each contract's logs on a fixed interval, decodes the
//! known events, and dispatches them to registered handlers. The lifecycle
//! is plain start/stop: [`MonitorHandle::stop`] flips a flag and the loop
//! exits at its next tick, matching the original UI's
//! stop-polling-on-disconnect behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use tracing::{debug, info, warn};

use crate::client::RegistryClient;
use crate::contracts::{ContractKey, IMarketplace, IParticipantRegistry, IProductToken};
use crate::error::Result;
use crate::types::Role;

/// Receives decoded registry events.
pub trait RegistryEventHandler: Send + Sync {
    fn on_participant_registered(&self, account: Address, role: Option<Role>, block_number: u64);

    fn on_product_created(
        &self,
        product_id: U256,
        producer: Address,
        name: &str,
        price: U256,
        block_number: u64,
    );

    fn on_transfer_initiated(&self, product_id: U256, from: Address, to: Address, block_number: u64);

    fn on_transfer_accepted(&self, product_id: U256, new_owner: Address, block_number: u64);

    fn on_product_listed(&self, product_id: U256, seller: Address, price: U256, block_number: u64);

    fn on_product_purchased(&self, product_id: U256, buyer: Address, price: U256, block_number: u64);
}

/// Stops a running [`EventMonitor`].
#[derive(Clone)]
pub struct MonitorHandle {
    running: Arc<AtomicBool>,
}

impl MonitorHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

pub struct EventMonitor {
    client: Arc<RegistryClient>,
    handlers: Vec<Arc<dyn RegistryEventHandler>>,
    running: Arc<AtomicBool>,
}

impl EventMonitor {
    #[must_use]
    pub fn new(client: Arc<RegistryClient>) -> Self {
        Self {
            client,
            handlers: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn RegistryEventHandler>) {
        self.handlers.push(handler);
        info!("Registered new event handler");
    }

    #[must_use]
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Poll all three contracts until stopped. The first pass starts at each
    /// contract's resolved start block, later passes just past the last seen
    /// log. A scan failure stops the monitor and propagates, mirroring the
    /// fetcher's no-retry contract.
    ///
    /// The running flag is cleared on every exit path, so
    /// [`MonitorHandle::is_running`] stays truthful after a failed scan.
    pub async fn run(&self) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        info!("Starting registry event monitor");

        let result = self.poll_loop().await;
        self.running.store(false, Ordering::SeqCst);
        if result.is_ok() {
            info!("Registry event monitor stopped");
        }
        result
    }

    async fn poll_loop(&self) -> Result<()> {
        let interval =
            Duration::from_secs(self.client.config().monitoring.polling_interval_seconds);

        let mut next_blocks: HashMap<ContractKey, u64> = HashMap::new();
        while self.running.load(Ordering::SeqCst) {
            for key in ContractKey::ALL {
                let from_block = match next_blocks.get(&key) {
                    Some(block) => *block,
                    None => self.client.start_block(key).await,
                };

                let filter = self.client.event_filter(key);
                let logs = self.client.fetch_events_from(filter, from_block).await?;

                let mut last_seen = None;
                for log in &logs {
                    self.dispatch(log);
                    if let Some(block) = log.block_number {
                        last_seen = Some(last_seen.map_or(block, |b: u64| b.max(block)));
                    }
                }
                if let Some(block) = last_seen {
                    next_blocks.insert(key, block + 1);
                }
                debug!(contract = key.name(), from_block, count = logs.len(), "poll pass complete");
            }

            tokio::time::sleep(interval).await;
        }

        Ok(())
    }

    fn dispatch(&self, log: &Log) {
        let block_number = log.block_number.unwrap_or_default();
        let Some(topic0) = log.topic0().copied() else {
            return;
        };

        if topic0 == IParticipantRegistry::ParticipantRegistered::SIGNATURE_HASH {
            match log.log_decode::<IParticipantRegistry::ParticipantRegistered>() {
                Ok(decoded) => {
                    let event = decoded.inner.data;
                    for handler in &self.handlers {
                        handler.on_participant_registered(
                            event.account,
                            Role::from_u8(event.role),
                            block_number,
                        );
                    }
                }
                Err(err) => warn!(%err, "Failed to decode ParticipantRegistered log"),
            }
        } else if topic0 == IProductToken::ProductCreated::SIGNATURE_HASH {
            match log.log_decode::<IProductToken::ProductCreated>() {
                Ok(decoded) => {
                    let event = decoded.inner.data;
                    for handler in &self.handlers {
                        handler.on_product_created(
                            event.productId,
                            event.producer,
                            &event.name,
                            event.price,
                            block_number,
                        );
                    }
                }
                Err(err) => warn!(%err, "Failed to decode ProductCreated log"),
            }
        } else if topic0 == IProductToken::TransferInitiated::SIGNATURE_HASH {
            match log.log_decode::<IProductToken::TransferInitiated>() {
                Ok(decoded) => {
                    let event = decoded.inner.data;
                    for handler in &self.handlers {
                        handler.on_transfer_initiated(
                            event.productId,
                            event.from,
                            event.to,
                            block_number,
                        );
                    }
                }
                Err(err) => warn!(%err, "Failed to decode TransferInitiated log"),
            }
        } else if topic0 == IProductToken::TransferAccepted::SIGNATURE_HASH {
            match log.log_decode::<IProductToken::TransferAccepted>() {
                Ok(decoded) => {
                    let event = decoded.inner.data;
                    for handler in &self.handlers {
                        handler.on_transfer_accepted(event.productId, event.newOwner, block_number);
                    }
                }
                Err(err) => warn!(%err, "Failed to decode TransferAccepted log"),
            }
        } else if topic0 == IMarketplace::ProductListed::SIGNATURE_HASH {
            match log.log_decode::<IMarketplace::ProductListed>() {
                Ok(decoded) => {
                    let event = decoded.inner.data;
                    for handler in &self.handlers {
                        handler.on_product_listed(
                            event.productId,
                            event.seller,
                            event.price,
                            block_number,
                        );
                    }
                }
                Err(err) => warn!(%err, "Failed to decode ProductListed log"),
            }
        } else if topic0 == IMarketplace::ProductPurchased::SIGNATURE_HASH {
            match log.log_decode::<IMarketplace::ProductPurchased>() {
                Ok(decoded) => {
                    let event = decoded.inner.data;
                    for handler in &self.handlers {
                        handler.on_product_purchased(
                            event.productId,
                            event.buyer,
                            event.price,
                            block_number,
                        );
                    }
                }
                Err(err) => warn!(%err, "Failed to decode ProductPurchased log"),
            }
        } else {
            debug!(%topic0, "Ignoring unrecognized log");
        }
    }
}

/// Handler that reports every event through `tracing`.
pub struct LogEventHandler {
    name: String,
}

impl LogEventHandler {
    #[must_use]
    pub const fn new(name: String) -> Self {
        Self { name }
    }
}

impl RegistryEventHandler for LogEventHandler {
    fn on_participant_registered(&self, account: Address, role: Option<Role>, block_number: u64) {
        info!(
            "[{}] Participant registered: account={account}, role={role:?}, block={block_number}",
            self.name
        );
    }

    fn on_product_created(
        &self,
        product_id: U256,
        producer: Address,
        name: &str,
        price: U256,
        block_number: u64,
    ) {
        info!(
            "[{}] Product created: id={product_id}, producer={producer}, name={name}, price={price}, block={block_number}",
            self.name
        );
    }

    fn on_transfer_initiated(
        &self,
        product_id: U256,
        from: Address,
        to: Address,
        block_number: u64,
    ) {
        info!(
            "[{}] Transfer initiated: id={product_id}, from={from}, to={to}, block={block_number}",
            self.name
        );
    }

    fn on_transfer_accepted(&self, product_id: U256, new_owner: Address, block_number: u64) {
        info!(
            "[{}] Transfer accepted: id={product_id}, new_owner={new_owner}, block={block_number}",
            self.name
        );
    }

    fn on_product_listed(&self, product_id: U256, seller: Address, price: U256, block_number: u64) {
        info!(
            "[{}] Product listed: id={product_id}, seller={seller}, price={price}, block={block_number}",
            self.name
        );
    }

    fn on_product_purchased(
        &self,
        product_id: U256,
        buyer: Address,
        price: U256,
        block_number: u64,
    ) {
        info!(
            "[{}] Product purchased: id={product_id}, buyer={buyer}, price={price}, block={block_number}",
            self.name
        );
    }
}
