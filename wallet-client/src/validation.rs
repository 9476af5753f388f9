use crate::blockchain::EthAmount;
use crate::errors::{WalletError, WalletResult};
use regex::Regex;

const MAX_INPUT_LENGTH: usize = 1000;
const MAX_RECIPIENT_LENGTH: usize = 100;

/// Input validation for values typed by the user before they reach the service
pub struct InputValidator {
    // Compiled regex patterns for performance
    amount_pattern: Regex,

    // Blacklisted patterns for security
    malicious_patterns: Vec<Regex>,
}

impl InputValidator {
    pub fn new() -> WalletResult<Self> {
        let amount_pattern = Regex::new(r"^(\d+(\.\d{1,18})?|\.\d{1,18})$")
            .map_err(|e| WalletError::ValidationError(format!("Invalid amount regex: {}", e)))?;

        // Common malicious patterns to block
        let malicious_patterns = [
            r"<script",
            r"javascript:",
            r"data:text/html",
            r"vbscript:",
            r"onload=",
            r"onerror=",
        ]
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| {
                WalletError::ValidationError(format!("Invalid security regex: {}", e))
            })
        })
        .collect::<WalletResult<Vec<_>>>()?;

        Ok(InputValidator {
            amount_pattern,
            malicious_patterns,
        })
    }

    /// Validate a transfer recipient; returns the trimmed value.
    ///
    /// Address format is left to the service, which knows which networks it
    /// can broadcast to.
    pub fn validate_recipient<'a>(&self, recipient: &'a str) -> WalletResult<&'a str> {
        self.check_basic_security(recipient)?;

        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(WalletError::ValidationError(
                "Recipient address cannot be empty".to_string(),
            ));
        }

        if recipient.len() > MAX_RECIPIENT_LENGTH {
            return Err(WalletError::ValidationError(
                "Recipient address too long".to_string(),
            ));
        }

        Ok(recipient)
    }

    /// Validate and parse a transfer amount; it must be strictly positive.
    pub fn validate_amount(&self, amount: &str) -> WalletResult<EthAmount> {
        self.check_basic_security(amount)?;

        let amount = amount.trim();
        if amount.is_empty() {
            return Err(WalletError::ValidationError(
                "Amount cannot be empty".to_string(),
            ));
        }

        if !self.amount_pattern.is_match(amount) {
            return Err(WalletError::ValidationError(
                "Amount must be a positive number".to_string(),
            ));
        }

        let parsed = EthAmount::from_string(amount)?;
        if parsed.is_zero() {
            return Err(WalletError::ValidationError(
                "Amount must be greater than zero".to_string(),
            ));
        }

        Ok(parsed)
    }

    /// Validate a private key typed for import; returns the trimmed key.
    pub fn validate_private_key<'a>(&self, raw_key: &'a str) -> WalletResult<&'a str> {
        if raw_key.len() > MAX_INPUT_LENGTH {
            return Err(WalletError::ValidationError("Input too long".to_string()));
        }

        let key = raw_key.trim();
        if key.is_empty() {
            return Err(WalletError::ValidationError(
                "Please enter a private key".to_string(),
            ));
        }

        Ok(key)
    }

    /// Check for basic security issues in any input
    fn check_basic_security(&self, input: &str) -> WalletResult<()> {
        if input.len() > MAX_INPUT_LENGTH {
            return Err(WalletError::ValidationError("Input too long".to_string()));
        }

        let lowered = input.to_lowercase();
        for pattern in &self.malicious_patterns {
            if pattern.is_match(&lowered) {
                return Err(WalletError::ValidationError(
                    "Input contains potentially malicious content".to_string(),
                ));
            }
        }

        Ok(())
    }
}
