use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{WalletError, WalletResult};

/// Represents an amount of ether
///
/// Uses fixed-point arithmetic on wei so user input round-trips exactly.
/// The wire format of the wallet service is a JSON number in ETH, which is
/// produced only at serialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct EthAmount {
    wei: u128,
}

impl EthAmount {
    /// Number of decimal places for ETH
    pub const DECIMALS: u8 = 18;
    /// Wei per ETH (10^18)
    pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
    /// Largest transfer accepted from user input
    pub const MAX_ETH: u128 = 1_000_000_000;

    pub fn from_wei(wei: u128) -> WalletResult<Self> {
        let max_wei = Self::MAX_ETH
            .checked_mul(Self::WEI_PER_ETH)
            .ok_or_else(|| WalletError::ValidationError("Amount limit overflow".to_string()))?;

        if wei > max_wei {
            return Err(WalletError::ValidationError("Amount too large".to_string()));
        }

        Ok(EthAmount { wei })
    }

    /// Parse decimal notation as typed by a user ("0.5", "12", ".25").
    pub fn from_string(amount_str: &str) -> WalletResult<Self> {
        let amount_str = amount_str.trim();
        if amount_str.is_empty() {
            return Err(WalletError::ValidationError(
                "Amount cannot be empty".to_string(),
            ));
        }

        let parts: Vec<&str> = amount_str.split('.').collect();
        if parts.len() > 2 {
            return Err(WalletError::ValidationError(
                "Invalid decimal format".to_string(),
            ));
        }

        let whole_part: u128 = if parts[0].is_empty() && parts.len() == 2 {
            0
        } else {
            parse_digits(parts[0])?
        };

        let fractional_wei = if parts.len() == 2 {
            let fractional_str = parts[1];
            if fractional_str.is_empty() {
                return Err(WalletError::ValidationError(
                    "Invalid decimal format".to_string(),
                ));
            }
            if fractional_str.len() > Self::DECIMALS as usize {
                return Err(WalletError::ValidationError(
                    "Too many decimal places".to_string(),
                ));
            }

            let padded = format!("{:0<18}", fractional_str);
            parse_digits(&padded)?
        } else {
            0
        };

        let total_wei = whole_part
            .checked_mul(Self::WEI_PER_ETH)
            .and_then(|w| w.checked_add(fractional_wei))
            .ok_or_else(|| WalletError::ValidationError("Amount too large".to_string()))?;

        Self::from_wei(total_wei)
    }

    pub fn wei(&self) -> u128 {
        self.wei
    }

    /// Amount in ETH as a float (may lose precision beyond ~15 digits)
    pub fn as_eth(&self) -> f64 {
        self.wei as f64 / Self::WEI_PER_ETH as f64
    }

    pub fn is_zero(&self) -> bool {
        self.wei == 0
    }

    /// Full-precision decimal string without trailing zeros
    pub fn as_string(&self) -> String {
        let whole = self.wei / Self::WEI_PER_ETH;
        let fractional = self.wei % Self::WEI_PER_ETH;

        if fractional == 0 {
            whole.to_string()
        } else {
            let frac_str = format!("{:018}", fractional)
                .trim_end_matches('0')
                .to_string();
            format!("{}.{}", whole, frac_str)
        }
    }
}

fn parse_digits(digits: &str) -> WalletResult<u128> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalletError::ValidationError(
            "Amount must be a number".to_string(),
        ));
    }
    digits
        .parse()
        .map_err(|_| WalletError::ValidationError("Amount too large".to_string()))
}

impl FromStr for EthAmount {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EthAmount::from_string(s)
    }
}

impl fmt::Display for EthAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.as_string())
    }
}

impl Serialize for EthAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_eth())
    }
}

/// Last balance reported by the service for the session's ETH address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub eth: f64,
    #[serde(default)]
    pub wei: Option<u128>,
    pub fetched_at: DateTime<Utc>,
}

impl Balance {
    pub fn new(eth: f64, wei: Option<u128>) -> Self {
        Self {
            eth,
            wei,
            fetched_at: Utc::now(),
        }
    }

    /// Six-decimal rendering used by the wallet display.
    pub fn display_eth(&self) -> String {
        format!("{:.6} ETH", self.eth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parsing() {
        let amount = EthAmount::from_string("1.5").unwrap();
        assert_eq!(amount.wei(), 1_500_000_000_000_000_000);
        assert_eq!(amount.as_string(), "1.5");
        assert_eq!(amount.to_string(), "1.5 ETH");
    }

    #[test]
    fn test_amount_leading_dot_and_whitespace() {
        let amount: EthAmount = " .25 ".parse().unwrap();
        assert_eq!(amount.wei(), 250_000_000_000_000_000);
        assert_eq!(amount.as_eth(), 0.25);
    }

    #[test]
    fn test_amount_rejects_garbage() {
        for input in ["", "abc", "1.2.3", "-1", "1e5", "1.", "0.1234567890123456789"] {
            let err = EthAmount::from_string(input).unwrap_err();
            assert!(
                matches!(err, WalletError::ValidationError(_)),
                "input {:?} gave {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_amount_limit() {
        assert!(EthAmount::from_string("1000000000").is_ok());
        assert!(EthAmount::from_string("1000000000.000000000000000001").is_err());
    }

    #[test]
    fn test_amount_serializes_as_eth_number() {
        let amount = EthAmount::from_string("0.5").unwrap();
        assert_eq!(serde_json::to_value(amount).unwrap(), serde_json::json!(0.5));
    }

    #[test]
    fn test_balance_display() {
        let balance = Balance::new(0.1234567, None);
        assert_eq!(balance.display_eth(), "0.123457 ETH");
    }
}
