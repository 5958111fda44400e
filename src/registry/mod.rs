use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, AccountError, AccountNumber},
    command::OpenAccountError,
    config::LedgerConfig,
};

pub mod in_memory_registry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Account not found or wrong passcode")]
    AuthenticationFailed,
    #[error("Account {account_number} not found")]
    AccountNotFound { account_number: AccountNumber },
    #[error("No unused account numbers left")]
    AccountNumbersExhausted,
    #[error(transparent)]
    OpenAccount(#[from] OpenAccountError),
    #[error(transparent)]
    Account(#[from] AccountError),
}

pub trait AccountRegistry {
    fn config(&self) -> &LedgerConfig;

    /// Opens a new account and returns its number.
    fn open_account(
        &mut self,
        holder_name: &str,
        passcode: &str,
        opening_balance: Decimal,
    ) -> Result<AccountNumber, RegistryError>;

    fn authenticate(
        &self,
        account_number: AccountNumber,
        passcode: &str,
    ) -> Result<&Account, RegistryError>;

    fn close_account(&mut self, account_number: AccountNumber) -> Result<Account, RegistryError>;

    fn account(&self, account_number: AccountNumber) -> Result<&Account, RegistryError>;

    fn account_mut(&mut self, account_number: AccountNumber) -> Result<&mut Account, RegistryError>;

    /// Moves `amount` between two registered accounts, all or nothing.
    fn transfer(
        &mut self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
    ) -> Result<(), RegistryError>;

    /// All open accounts, ordered by account number.
    fn accounts(&self) -> Vec<&Account>;
}
