use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::{
    account::{Account, AccountNumber},
    registry::{AccountRegistry, RegistryError},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No account is logged in")]
    NoActiveAccount,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Which account, if any, is logged in. Every operation takes the registry explicitly.
#[derive(Debug, Default)]
pub struct Session {
    active: Option<AccountNumber>,
}

impl Session {
    pub fn active_account_number(&self) -> Option<AccountNumber> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Replaces any previously active account on success; leaves the session untouched on failure.
    pub fn login<'r, R: AccountRegistry>(
        &mut self,
        registry: &'r R,
        account_number: AccountNumber,
        passcode: &str,
    ) -> Result<&'r Account, SessionError> {
        let acc = registry.authenticate(account_number, passcode)?;
        self.active = Some(account_number);
        info!(account_number, "logged in");
        Ok(acc)
    }

    pub fn logout(&mut self) -> Option<AccountNumber> {
        let previous = self.active.take();
        if let Some(account_number) = previous {
            info!(account_number, "logged out");
        }
        previous
    }

    pub fn current<'r, R: AccountRegistry>(
        &self,
        registry: &'r R,
    ) -> Result<&'r Account, SessionError> {
        Ok(registry.account(self.require_active()?)?)
    }

    pub fn deposit<R: AccountRegistry>(
        &self,
        registry: &mut R,
        amount: Decimal,
    ) -> Result<(), SessionError> {
        let account_number = self.require_active()?;
        registry
            .account_mut(account_number)?
            .deposit(amount)
            .map_err(RegistryError::from)?;
        Ok(())
    }

    pub fn withdraw<R: AccountRegistry>(
        &self,
        registry: &mut R,
        amount: Decimal,
    ) -> Result<(), SessionError> {
        let account_number = self.require_active()?;
        registry
            .account_mut(account_number)?
            .withdraw(amount)
            .map_err(RegistryError::from)?;
        Ok(())
    }

    pub fn transfer<R: AccountRegistry>(
        &self,
        registry: &mut R,
        to: AccountNumber,
        amount: Decimal,
    ) -> Result<(), SessionError> {
        registry.transfer(self.require_active()?, to, amount)?;
        Ok(())
    }

    pub fn mobile_top_up<R: AccountRegistry>(
        &self,
        registry: &mut R,
        phone_number: &str,
        amount: Decimal,
    ) -> Result<(), SessionError> {
        let account_number = self.require_active()?;
        registry
            .account_mut(account_number)?
            .mobile_top_up(amount, phone_number)
            .map_err(RegistryError::from)?;
        Ok(())
    }

    /// Removes the active account from the registry and ends the session.
    pub fn close_account<R: AccountRegistry>(
        &mut self,
        registry: &mut R,
    ) -> Result<Account, SessionError> {
        let account_number = self.require_active()?;
        self.logout();
        Ok(registry.close_account(account_number)?)
    }

    fn require_active(&self) -> Result<AccountNumber, SessionError> {
        self.active.ok_or(SessionError::NoActiveAccount)
    }
}
