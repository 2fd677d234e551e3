use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Supply-chain participant role as encoded by the registry contract.
///
/// The contract reserves `0` for unregistered accounts, which maps to `None`
/// at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Producer,
    Factory,
    Retailer,
    Consumer,
}

impl Role {
    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Producer),
            2 => Some(Self::Factory),
            3 => Some(Self::Retailer),
            4 => Some(Self::Consumer),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Producer => 1,
            Self::Factory => 2,
            Self::Retailer => 3,
            Self::Consumer => 4,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Producer => "producer",
            Self::Factory => "factory",
            Self::Retailer => "retailer",
            Self::Consumer => "consumer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub address: Address,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: U256,
    pub name: String,
    pub owner: Address,
    pub price: U256,
}

/// Result of a confirmed state-mutating call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutcome {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Outcome of `createProduct`, with the product id recovered from the
/// `ProductCreated` event when the receipt carries one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreation {
    pub product_id: Option<U256>,
    pub outcome: TxOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_contract_encoding() {
        for role in [Role::Producer, Role::Factory, Role::Retailer, Role::Consumer] {
            assert_eq!(Role::from_u8(role.as_u8()), Some(role));
        }
        assert_eq!(Role::from_u8(0), None);
        assert_eq!(Role::from_u8(5), None);
    }

    #[test]
    fn product_record_serializes() {
        let record = ProductRecord {
            id: U256::from(7),
            name: "olive oil".to_string(),
            owner: Address::ZERO,
            price: U256::from(1_000_000u64),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
