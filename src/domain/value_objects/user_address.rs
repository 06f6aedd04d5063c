use serde::{Deserialize, Serialize};
use std::fmt;

/// Wallet address of the user whose participation records are cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserAddress(String);

impl UserAddress {
    pub fn new(value: String) -> Result<Self, String> {
        let normalized = value.trim().to_ascii_lowercase();
        let hex = normalized
            .strip_prefix("0x")
            .ok_or_else(|| "User address must start with 0x".to_string())?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("Invalid user address: must be 0x + 40 hex characters".to_string());
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_lowercase() {
        let addr =
            UserAddress::new("0x00FF00000000000000000000000000000000AB12".to_string()).unwrap();
        assert_eq!(addr.as_str(), "0x00ff00000000000000000000000000000000ab12");
    }

    #[test]
    fn rejects_non_hex() {
        assert!(UserAddress::new(format!("0x{}", "z".repeat(40))).is_err());
    }
}
