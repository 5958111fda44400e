use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    account::{Account, AccountError, AccountNumber},
    command::{OpenAccountCommand, TransferCommand},
    config::LedgerConfig,
};

use super::{AccountRegistry, RegistryError};

pub struct InMemoryAccountRegistry<G = StdRng> {
    config: LedgerConfig,
    rng: G,
    accounts: HashMap<AccountNumber, Account>,
}

impl Default for InMemoryAccountRegistry {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl InMemoryAccountRegistry {
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<G: Rng> InMemoryAccountRegistry<G> {
    pub fn with_rng(config: LedgerConfig, rng: G) -> Self {
        Self {
            config,
            rng,
            accounts: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Draws random numbers from the configured range until an unused one comes up.
    pub fn generate_account_number(&mut self) -> Result<AccountNumber, RegistryError> {
        if self.accounts.len() >= self.config.account_number_capacity() {
            return Err(RegistryError::AccountNumbersExhausted);
        }
        loop {
            let candidate = self.rng.gen_range(self.config.account_numbers.clone());
            if !self.accounts.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
    }
}

impl<G: Rng> AccountRegistry for InMemoryAccountRegistry<G> {
    fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn open_account(
        &mut self,
        holder_name: &str,
        passcode: &str,
        opening_balance: Decimal,
    ) -> Result<AccountNumber, RegistryError> {
        let command =
            OpenAccountCommand::parse(holder_name, passcode, opening_balance, &self.config, |name| {
                self.accounts.values().any(|acc| acc.holder_name() == name)
            })?;
        let account_number = self.generate_account_number()?;
        info!(account_number, "account opened");
        self.accounts
            .insert(account_number, Account::open(account_number, command));
        Ok(account_number)
    }

    fn authenticate(
        &self,
        account_number: AccountNumber,
        passcode: &str,
    ) -> Result<&Account, RegistryError> {
        match self.accounts.get(&account_number) {
            Some(acc) if acc.passcode_matches(passcode) => Ok(acc),
            _ => {
                warn!(account_number, "authentication failed");
                Err(RegistryError::AuthenticationFailed)
            }
        }
    }

    fn close_account(&mut self, account_number: AccountNumber) -> Result<Account, RegistryError> {
        let acc = self
            .accounts
            .remove(&account_number)
            .ok_or(RegistryError::AccountNotFound { account_number })?;
        info!(account_number, "account closed");
        Ok(acc)
    }

    fn account(&self, account_number: AccountNumber) -> Result<&Account, RegistryError> {
        self.accounts
            .get(&account_number)
            .ok_or(RegistryError::AccountNotFound { account_number })
    }

    fn account_mut(&mut self, account_number: AccountNumber) -> Result<&mut Account, RegistryError> {
        self.accounts
            .get_mut(&account_number)
            .ok_or(RegistryError::AccountNotFound { account_number })
    }

    fn transfer(
        &mut self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
    ) -> Result<(), RegistryError> {
        if from == to {
            return Err(AccountError::InvalidTransferTarget.into());
        }
        let source = self.account(from)?;
        let target = self.account(to)?;
        let command = TransferCommand::new(amount)?;
        let (sent, received) = source.handle_transfer(command, target)?;

        // both accounts were resolved above, so neither lookup can fail here
        self.account_mut(from)?.apply(sent);
        self.account_mut(to)?.apply(received);
        Ok(())
    }

    fn accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|acc| acc.account_number());
        accounts
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal::prelude::FromPrimitive;

    use crate::command::OpenAccountError;

    use super::*;

    fn dec(value: i32) -> Decimal {
        Decimal::from_i32(value).unwrap()
    }

    fn registry() -> InMemoryAccountRegistry {
        InMemoryAccountRegistry::with_rng(LedgerConfig::default(), StdRng::seed_from_u64(7))
    }

    #[test]
    fn open_and_authenticate() {
        let mut registry = registry();
        let alice = registry.open_account("Alice", "1111", dec(1000)).unwrap();
        assert!(LedgerConfig::default().account_numbers.contains(&alice));

        let acc = registry.authenticate(alice, "1111").unwrap();
        assert_eq!(acc.holder_name(), "Alice");
        assert_eq!(acc.balance(), dec(1000));
        assert!(acc.history().is_empty());

        assert_eq!(
            registry.authenticate(alice, "1112").unwrap_err(),
            RegistryError::AuthenticationFailed
        );
        let unknown = if alice == 10000 { 10001 } else { 10000 };
        assert_eq!(
            registry.authenticate(unknown, "1111").unwrap_err(),
            RegistryError::AuthenticationFailed
        );
    }

    #[test]
    fn open_account_rejections() {
        let mut registry = registry();
        registry.open_account("Alice", "1111", dec(1000)).unwrap();

        assert_eq!(
            registry.open_account("Alice", "2222", dec(800)).unwrap_err(),
            RegistryError::OpenAccount(OpenAccountError::DuplicateOrInvalidName)
        );
        assert_eq!(
            registry.open_account("", "2222", dec(800)).unwrap_err(),
            RegistryError::OpenAccount(OpenAccountError::DuplicateOrInvalidName)
        );
        assert_eq!(
            registry.open_account("Bob", "222", dec(800)).unwrap_err(),
            RegistryError::OpenAccount(OpenAccountError::InvalidPasscode { min_len: 4 })
        );
        assert_eq!(
            registry.open_account("Bob", "2222", dec(499)).unwrap_err(),
            RegistryError::OpenAccount(OpenAccountError::BelowMinimumBalance {
                minimum: dec(500)
            })
        );
        assert_eq!(registry.len(), 1);

        registry.open_account("Bob", "2222", dec(500)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn generated_numbers_never_collide() {
        let config = LedgerConfig {
            account_numbers: 1..=20,
            ..Default::default()
        };
        let mut registry = InMemoryAccountRegistry::with_rng(config, StdRng::seed_from_u64(1));
        let mut seen = HashSet::new();
        for i in 0..20 {
            let number = registry
                .open_account(&format!("holder-{i}"), "1234", dec(500))
                .unwrap();
            assert!((1..=20).contains(&number));
            assert!(seen.insert(number), "number {number} was handed out twice");
        }
        assert_eq!(
            registry.generate_account_number().unwrap_err(),
            RegistryError::AccountNumbersExhausted
        );
        assert_eq!(
            registry.open_account("one-too-many", "1234", dec(500)).unwrap_err(),
            RegistryError::AccountNumbersExhausted
        );
    }

    #[test]
    fn close_account() {
        let mut registry = registry();
        let alice = registry.open_account("Alice", "1111", dec(1000)).unwrap();
        let closed = registry.close_account(alice).unwrap();
        assert_eq!(closed.account_number(), alice);
        assert!(registry.is_empty());
        assert_eq!(
            registry.close_account(alice).unwrap_err(),
            RegistryError::AccountNotFound {
                account_number: alice
            }
        );
        // the name is free again once the account is gone
        registry.open_account("Alice", "1111", dec(1000)).unwrap();
    }

    #[test]
    fn transfer_between_accounts() {
        let mut registry = registry();
        let alice = registry.open_account("Alice", "1111", dec(1000)).unwrap();
        let bob = registry.open_account("Bob", "2222", dec(500)).unwrap();

        registry.transfer(alice, bob, dec(400)).unwrap();
        assert_eq!(registry.account(alice).unwrap().balance(), dec(600));
        assert_eq!(registry.account(bob).unwrap().balance(), dec(900));
        assert_eq!(
            registry.account(alice).unwrap().history()[0].to_string(),
            "Sent Nu.400.00 to Bob"
        );
        assert_eq!(
            registry.account(bob).unwrap().history()[0].to_string(),
            "Received Nu.400.00 from Alice"
        );

        assert_eq!(
            registry.transfer(bob, alice, dec(1000)).unwrap_err(),
            RegistryError::Account(AccountError::InsufficientFunds {
                action: crate::command::TransactionAction::Transfer
            })
        );
        assert_eq!(
            registry.transfer(alice, alice, dec(-1)).unwrap_err(),
            RegistryError::Account(AccountError::InvalidTransferTarget)
        );
        let missing = (10000..).find(|n| *n != alice && *n != bob).unwrap();
        assert_eq!(
            registry.transfer(alice, missing, dec(10)).unwrap_err(),
            RegistryError::AccountNotFound {
                account_number: missing
            }
        );
        assert_eq!(registry.account(alice).unwrap().balance(), dec(600));
        assert_eq!(registry.account(bob).unwrap().balance(), dec(900));
        assert_eq!(registry.account(alice).unwrap().history().len(), 1);
    }

    #[test]
    fn accounts_are_listed_in_number_order() {
        let mut registry = registry();
        for name in ["Alice", "Bob", "Carol"] {
            registry.open_account(name, "1234", dec(500)).unwrap();
        }
        let numbers: Vec<AccountNumber> = registry
            .accounts()
            .iter()
            .map(|acc| acc.account_number())
            .collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers.len(), 3);
        assert_eq!(numbers, sorted);
    }
}
