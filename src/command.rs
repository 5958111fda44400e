use std::fmt;

use rust_decimal::{Decimal, prelude::Zero};
use thiserror::Error;

use crate::{
    account::{AccountError, Passcode},
    config::LedgerConfig,
    money::{Nu, normalize},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Deposit,
    Withdraw,
    Transfer,
    MobileTopUp,
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdrawal",
            Self::Transfer => "transfer",
            Self::MobileTopUp => "mobile top-up",
        })
    }
}

/// Single-account command, validated but not yet checked against a balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCommand {
    Deposit { amount: Decimal },
    Withdraw { amount: Decimal },
    MobileTopUp { amount: Decimal, phone_number: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCommand {
    pub amount: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpenAccountError {
    #[error("Invalid or duplicate name")]
    DuplicateOrInvalidName,
    #[error("Invalid passcode, expected at least {min_len} digits")]
    InvalidPasscode { min_len: usize },
    #[error("Opening balance must be at least {}", Nu(*minimum))]
    BelowMinimumBalance { minimum: Decimal },
}

#[derive(Debug, Clone)]
pub struct OpenAccountCommand {
    pub holder_name: String,
    pub passcode: Passcode,
    pub opening_balance: Decimal,
}

/// Rounds `amount` to two decimals and rejects anything that is not positive afterwards.
fn parse_amount(amount: Decimal, action: TransactionAction) -> Result<Decimal, AccountError> {
    let amount = normalize(amount);
    if amount > Decimal::zero() {
        Ok(amount)
    } else {
        Err(AccountError::InvalidAmount { action })
    }
}

impl AccountCommand {
    pub fn deposit(amount: Decimal) -> Result<Self, AccountError> {
        Ok(Self::Deposit {
            amount: parse_amount(amount, TransactionAction::Deposit)?,
        })
    }

    pub fn withdraw(amount: Decimal) -> Result<Self, AccountError> {
        Ok(Self::Withdraw {
            amount: parse_amount(amount, TransactionAction::Withdraw)?,
        })
    }

    pub fn mobile_top_up(
        amount: Decimal,
        phone_number: impl Into<String>,
    ) -> Result<Self, AccountError> {
        Ok(Self::MobileTopUp {
            amount: parse_amount(amount, TransactionAction::MobileTopUp)?,
            phone_number: phone_number.into(),
        })
    }

    pub fn action(&self) -> TransactionAction {
        match self {
            Self::Deposit { .. } => TransactionAction::Deposit,
            Self::Withdraw { .. } => TransactionAction::Withdraw,
            Self::MobileTopUp { .. } => TransactionAction::MobileTopUp,
        }
    }
}

impl TransferCommand {
    pub fn new(amount: Decimal) -> Result<Self, AccountError> {
        Ok(Self {
            amount: parse_amount(amount, TransactionAction::Transfer)?,
        })
    }
}

impl OpenAccountCommand {
    /// Validates the name first, then the passcode, then the opening balance.
    /// `name_taken` reports whether an open account already uses the name.
    pub fn parse(
        holder_name: &str,
        passcode: &str,
        opening_balance: Decimal,
        config: &LedgerConfig,
        name_taken: impl Fn(&str) -> bool,
    ) -> Result<Self, OpenAccountError> {
        let holder_name = holder_name.trim();
        if holder_name.is_empty() || name_taken(holder_name) {
            return Err(OpenAccountError::DuplicateOrInvalidName);
        }

        let valid_passcode = !passcode.is_empty()
            && passcode.len() >= config.min_passcode_len
            && passcode.chars().all(|c| c.is_ascii_digit());
        if !valid_passcode {
            return Err(OpenAccountError::InvalidPasscode {
                min_len: config.min_passcode_len,
            });
        }

        let opening_balance = normalize(opening_balance);
        if opening_balance < config.minimum_opening_balance {
            return Err(OpenAccountError::BelowMinimumBalance {
                minimum: config.minimum_opening_balance,
            });
        }

        Ok(Self {
            holder_name: holder_name.to_owned(),
            passcode: Passcode::new(passcode),
            opening_balance,
        })
    }
}
