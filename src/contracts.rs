use alloy_primitives::Address;
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

sol! {
    #[sol(rpc)]
    interface IParticipantRegistry {
        function registerParticipant(address account, uint8 role) external;

        function participantRole(address account) external view returns (uint8);

        function isRegistered(address account) external view returns (bool);

        function admin() external view returns (address);

        #[derive(Debug, PartialEq, Eq)]
        event ParticipantRegistered(address indexed account, uint8 indexed role, uint256 timestamp);

        error Unauthorized(address account);
    }
}

sol! {
    #[sol(rpc)]
    interface IProductToken {
        #[derive(Debug, PartialEq, Eq)]
        struct Product {
            uint256 id;
            string name;
            address owner;
            uint256 price;
            bool exists;
        }

        function createProduct(string calldata name, uint256 price) external returns (uint256 productId);

        function getProduct(uint256 productId) external view returns (Product memory product);

        function productCount() external view returns (uint256);

        function productsOf(address owner) external view returns (uint256[] memory productIds);

        function initiateTransfer(uint256 productId, address to) external;

        function acceptTransfer(uint256 productId) external;

        function pendingTransfer(uint256 productId) external view returns (address to, bool exists);

        function balanceOf(address account) external view returns (uint256);

        #[derive(Debug, PartialEq, Eq)]
        event ProductCreated(uint256 indexed productId, address indexed producer, string name, uint256 price);

        #[derive(Debug, PartialEq, Eq)]
        event TransferInitiated(uint256 indexed productId, address indexed from, address indexed to);

        #[derive(Debug, PartialEq, Eq)]
        event TransferAccepted(uint256 indexed productId, address indexed newOwner);

        error NonexistentProduct(uint256 productId);
        error TransferAlreadyPending(uint256 productId);
        error InsufficientBalance(uint256 required, uint256 available);
    }
}

sol! {
    #[sol(rpc)]
    interface IMarketplace {
        function listProduct(uint256 productId, uint256 price) external;

        function purchaseProduct(uint256 productId) external payable;

        function listingPrice(uint256 productId) external view returns (uint256 price, bool listed);

        #[derive(Debug, PartialEq, Eq)]
        event ProductListed(uint256 indexed productId, address indexed seller, uint256 price);

        #[derive(Debug, PartialEq, Eq)]
        event ProductPurchased(uint256 indexed productId, address indexed buyer, uint256 price);
    }
}

pub use IMarketplace::IMarketplaceInstance;
pub use IParticipantRegistry::IParticipantRegistryInstance;
pub use IProductToken::IProductTokenInstance;

/// Logical contract identifier, used to key deployment metadata and the
/// resolved start-block cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKey {
    Registry,
    ProductToken,
    Marketplace,
}

impl ContractKey {
    pub const ALL: [Self; 3] = [Self::Registry, Self::ProductToken, Self::Marketplace];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::ProductToken => "product-token",
            Self::Marketplace => "marketplace",
        }
    }
}

impl std::fmt::Display for ContractKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContractAddresses {
    pub registry: Address,
    pub product_token: Address,
    pub marketplace: Address,
}

impl ContractAddresses {
    #[must_use]
    pub const fn new(registry: Address, product_token: Address, marketplace: Address) -> Self {
        Self {
            registry,
            product_token,
            marketplace,
        }
    }

    #[must_use]
    pub const fn address_of(&self, key: ContractKey) -> Address {
        match key {
            ContractKey::Registry => self.registry,
            ContractKey::ProductToken => self.product_token,
            ContractKey::Marketplace => self.marketplace,
        }
    }
}
