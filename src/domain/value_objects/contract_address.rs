use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a per-activity contract. Stored lowercase, `0x` + 40 hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractAddress(String);

impl ContractAddress {
    pub fn new(value: String) -> Result<Self, String> {
        let normalized = value.trim().to_ascii_lowercase();
        let hex = normalized
            .strip_prefix("0x")
            .ok_or_else(|| "Contract address must start with 0x".to_string())?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("Invalid contract address: must be 0x + 40 hex characters".to_string());
        }
        Ok(Self(normalized))
    }

    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    /// The all-zero address is the ledger's "no contract" marker.
    pub fn is_zero(&self) -> bool {
        self.0[2..].chars().all(|c| c == '0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ContractAddress> for String {
    fn from(addr: ContractAddress) -> Self {
        addr.0
    }
}
