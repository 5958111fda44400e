use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    command::{AccountCommand, OpenAccountCommand, TransactionAction, TransferCommand},
    money::Nu,
};

pub type AccountNumber = u32;

/// Numeric passcode, compared verbatim at login.
#[derive(Clone, PartialEq, Eq)]
pub struct Passcode(String);

impl Passcode {
    pub(crate) fn new(passcode: impl Into<String>) -> Self {
        Self(passcode.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passcode(****)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
    Sent { to: String },
    Received { from: String },
    MobileTopUp { phone_number: String },
}

/// One entry of the transaction history. Its `Display` form is the log line.
#[derive(Debug, PartialEq, Eq)]
pub struct AccountEvent {
    amount: Decimal,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> &AccountEventKind {
        &self.kind
    }
}

impl fmt::Display for AccountEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = Nu(self.amount);
        match &self.kind {
            AccountEventKind::Deposited => write!(f, "Deposited {amount}"),
            AccountEventKind::Withdrawn => write!(f, "Withdrew {amount}"),
            AccountEventKind::Sent { to } => write!(f, "Sent {amount} to {to}"),
            AccountEventKind::Received { from } => write!(f, "Received {amount} from {from}"),
            AccountEventKind::MobileTopUp { phone_number } => {
                write!(f, "Mobile top-up {amount} to {phone_number}")
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Amount must be positive for {action}")]
    InvalidAmount { action: TransactionAction },
    #[error("Not enough balance for {action}")]
    InsufficientFunds { action: TransactionAction },
    #[error("Amount is too large for {action}")]
    AmountTooLarge { action: TransactionAction },
    #[error("Cannot transfer to the same account")]
    InvalidTransferTarget,
}

#[derive(Debug)]
pub struct Account {
    account_number: AccountNumber,
    holder_name: String,
    passcode: Passcode,
    balance: Decimal,
    history: Vec<AccountEvent>,
}

impl Account {
    pub(crate) fn new(
        account_number: AccountNumber,
        holder_name: impl Into<String>,
        passcode: Passcode,
        balance: Decimal,
    ) -> Self {
        Self {
            account_number,
            holder_name: holder_name.into(),
            passcode,
            balance,
            history: Vec::new(),
        }
    }

    pub(crate) fn open(account_number: AccountNumber, command: OpenAccountCommand) -> Self {
        Self::new(
            account_number,
            command.holder_name,
            command.passcode,
            command.opening_balance,
        )
    }

    pub fn account_number(&self) -> AccountNumber {
        self.account_number
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn passcode_matches(&self, candidate: &str) -> bool {
        self.passcode.matches(candidate)
    }

    /// Full history, oldest first.
    pub fn history(&self) -> &[AccountEvent] {
        &self.history
    }

    /// Up to `limit` latest history entries, most recent first.
    pub fn recent_history(&self, limit: usize) -> impl Iterator<Item = &AccountEvent> {
        self.history.iter().rev().take(limit)
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        let evt = self.handle_command(AccountCommand::deposit(amount)?)?;
        self.apply(evt);
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        let evt = self.handle_command(AccountCommand::withdraw(amount)?)?;
        self.apply(evt);
        Ok(())
    }

    pub fn mobile_top_up(
        &mut self,
        amount: Decimal,
        phone_number: impl Into<String>,
    ) -> Result<(), AccountError> {
        let evt = self.handle_command(AccountCommand::mobile_top_up(amount, phone_number)?)?;
        self.apply(evt);
        Ok(())
    }

    /// Moves `amount` to `target`. Neither account changes unless both do.
    pub fn transfer(&mut self, amount: Decimal, target: &mut Account) -> Result<(), AccountError> {
        if target.account_number == self.account_number {
            return Err(AccountError::InvalidTransferTarget);
        }
        let (sent, received) = self.handle_transfer(TransferCommand::new(amount)?, target)?;
        self.apply(sent);
        target.apply(received);
        Ok(())
    }

    /// Events come only from `handle_*`, which already checked funds and overflow.
    pub(crate) fn apply(&mut self, event: AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited | AccountEventKind::Received { .. } => {
                self.balance += event.amount;
            }
            AccountEventKind::Withdrawn
            | AccountEventKind::Sent { .. }
            | AccountEventKind::MobileTopUp { .. } => {
                self.balance -= event.amount;
            }
        }
        debug!(account_number = self.account_number, event = %event, "applied account event");
        self.history.push(event);
    }

    pub(crate) fn handle_command(
        &self,
        command: AccountCommand,
    ) -> Result<AccountEvent, AccountError> {
        let action = command.action();
        match command {
            AccountCommand::Deposit { amount } => {
                self.ensure_room(amount, action)?;
                Ok(AccountEvent {
                    amount,
                    kind: AccountEventKind::Deposited,
                })
            }
            AccountCommand::Withdraw { amount } => {
                self.ensure_funds(amount, action)?;
                Ok(AccountEvent {
                    amount,
                    kind: AccountEventKind::Withdrawn,
                })
            }
            AccountCommand::MobileTopUp {
                amount,
                phone_number,
            } => {
                self.ensure_funds(amount, action)?;
                Ok(AccountEvent {
                    amount,
                    kind: AccountEventKind::MobileTopUp { phone_number },
                })
            }
        }
    }

    /// Returns the event for this account and the event for `target`.
    pub(crate) fn handle_transfer(
        &self,
        command: TransferCommand,
        target: &Account,
    ) -> Result<(AccountEvent, AccountEvent), AccountError> {
        if target.account_number == self.account_number {
            return Err(AccountError::InvalidTransferTarget);
        }
        self.ensure_funds(command.amount, TransactionAction::Transfer)?;
        target.ensure_room(command.amount, TransactionAction::Transfer)?;
        Ok((
            AccountEvent {
                amount: command.amount,
                kind: AccountEventKind::Sent {
                    to: target.holder_name.clone(),
                },
            },
            AccountEvent {
                amount: command.amount,
                kind: AccountEventKind::Received {
                    from: self.holder_name.clone(),
                },
            },
        ))
    }

    fn ensure_funds(&self, amount: Decimal, action: TransactionAction) -> Result<(), AccountError> {
        if amount <= self.balance {
            Ok(())
        } else {
            Err(AccountError::InsufficientFunds { action })
        }
    }

    fn ensure_room(&self, amount: Decimal, action: TransactionAction) -> Result<(), AccountError> {
        match self.balance.checked_add(amount) {
            Some(_) => Ok(()),
            None => Err(AccountError::AmountTooLarge { action }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::{FromPrimitive, Zero};

    use super::*;

    fn dec(value: i32) -> Decimal {
        Decimal::from_i32(value).unwrap()
    }

    fn alice() -> Account {
        Account::new(12345, "Alice", Passcode::new("1111"), dec(1000))
    }

    fn bob() -> Account {
        Account::new(54321, "Bob", Passcode::new("2222"), dec(500))
    }

    fn last_entry(acc: &Account) -> String {
        acc.history().last().unwrap().to_string()
    }

    #[test]
    fn deposit_positive() {
        let mut acc = alice();
        acc.deposit(dec(200)).unwrap();
        assert_eq!(acc.balance(), dec(1200));
        assert_eq!(acc.history().len(), 1);
        assert_eq!(last_entry(&acc), "Deposited Nu.200.00");
    }

    #[test]
    fn withdraw_success() {
        let mut acc = alice();
        acc.withdraw(dec(300)).unwrap();
        assert_eq!(acc.balance(), dec(700));
        assert_eq!(last_entry(&acc), "Withdrew Nu.300.00");
    }

    #[test]
    fn withdraw_whole_balance() {
        let mut acc = bob();
        acc.withdraw(dec(500)).unwrap();
        assert_eq!(acc.balance(), Decimal::zero());
    }

    #[test]
    fn non_positive_amounts_leave_state_unchanged() {
        let mut acc = alice();
        for amount in [dec(0), dec(-10)] {
            assert!(matches!(
                acc.deposit(amount).unwrap_err(),
                AccountError::InvalidAmount {
                    action: TransactionAction::Deposit
                }
            ));
            assert!(matches!(
                acc.withdraw(amount).unwrap_err(),
                AccountError::InvalidAmount {
                    action: TransactionAction::Withdraw
                }
            ));
            assert!(matches!(
                acc.mobile_top_up(amount, "17123456").unwrap_err(),
                AccountError::InvalidAmount {
                    action: TransactionAction::MobileTopUp
                }
            ));
        }
        assert_eq!(acc.balance(), dec(1000));
        assert!(acc.history().is_empty());
    }

    #[test]
    fn overdraft_leaves_state_unchanged() {
        let mut acc = bob();
        assert_eq!(
            acc.withdraw(dec(600)).unwrap_err(),
            AccountError::InsufficientFunds {
                action: TransactionAction::Withdraw
            }
        );
        assert_eq!(
            acc.mobile_top_up(dec(1000), "17123456").unwrap_err(),
            AccountError::InsufficientFunds {
                action: TransactionAction::MobileTopUp
            }
        );
        assert_eq!(acc.balance(), dec(500));
        assert!(acc.history().is_empty());
    }

    #[test]
    fn transfer_success() {
        let mut alice = alice();
        let mut bob = bob();
        alice.transfer(dec(400), &mut bob).unwrap();
        assert_eq!(alice.balance(), dec(600));
        assert_eq!(bob.balance(), dec(900));
        assert_eq!(alice.balance() + bob.balance(), dec(1500));
        assert_eq!(alice.history().len(), 1);
        assert_eq!(bob.history().len(), 1);
        assert_eq!(last_entry(&alice), "Sent Nu.400.00 to Bob");
        assert_eq!(last_entry(&bob), "Received Nu.400.00 from Alice");
    }

    #[test]
    fn transfer_failures_touch_neither_account() {
        let mut alice = alice();
        let mut bob = bob();

        let err = bob.transfer(dec(1000), &mut alice).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                action: TransactionAction::Transfer
            }
        );
        let err = alice.transfer(dec(-50), &mut bob).unwrap_err();
        assert_eq!(
            err,
            AccountError::InvalidAmount {
                action: TransactionAction::Transfer
            }
        );

        assert_eq!(alice.balance(), dec(1000));
        assert_eq!(bob.balance(), dec(500));
        assert!(alice.history().is_empty());
        assert!(bob.history().is_empty());
    }

    #[test]
    fn transfer_to_self_is_rejected_regardless_of_amount() {
        let alice = alice();
        let mut twin = Account::new(12345, "Alice", Passcode::new("1111"), dec(1000));
        for amount in [dec(100), dec(0), dec(-5), dec(5000)] {
            let mut source = Account::new(12345, "Alice", Passcode::new("1111"), dec(1000));
            assert_eq!(
                source.transfer(amount, &mut twin).unwrap_err(),
                AccountError::InvalidTransferTarget
            );
            assert_eq!(source.balance(), dec(1000));
        }
        let err = alice
            .handle_transfer(TransferCommand::new(dec(1)).unwrap(), &alice)
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidTransferTarget);
        assert_eq!(err.to_string(), "Cannot transfer to the same account");
    }

    #[test]
    fn mobile_top_up_success() {
        let mut acc = alice();
        acc.mobile_top_up(dec(100), "17123456").unwrap();
        assert_eq!(acc.balance(), dec(900));
        assert_eq!(last_entry(&acc), "Mobile top-up Nu.100.00 to 17123456");
    }

    #[test]
    fn deposit_overflow_is_rejected() {
        let mut acc = alice();
        assert_eq!(
            acc.deposit(Decimal::MAX).unwrap_err(),
            AccountError::AmountTooLarge {
                action: TransactionAction::Deposit
            }
        );
        assert_eq!(acc.balance(), dec(1000));
        assert!(acc.history().is_empty());
    }

    #[test]
    fn transfer_overflowing_target_touches_neither_account() {
        let mut rich = Account::new(777, "Rich", Passcode::new("7777"), Decimal::MAX);
        let mut alice = alice();
        let err = alice.transfer(dec(1), &mut rich).unwrap_err();
        assert_eq!(
            err,
            AccountError::AmountTooLarge {
                action: TransactionAction::Transfer
            }
        );
        assert_eq!(err.to_string(), "Amount is too large for transfer");
        assert_eq!(alice.balance(), dec(1000));
        assert_eq!(rich.balance(), Decimal::MAX);
        assert!(alice.history().is_empty());
        assert!(rich.history().is_empty());
    }

    #[test]
    fn repeated_withdrawal_never_goes_negative() {
        let mut acc = alice();
        acc.withdraw(dec(1000)).unwrap();
        assert_eq!(
            acc.withdraw(dec(1000)).unwrap_err(),
            AccountError::InsufficientFunds {
                action: TransactionAction::Withdraw
            }
        );
        assert_eq!(acc.balance(), Decimal::zero());
        assert_eq!(acc.history().len(), 1);
    }

    #[test]
    fn handle_command_does_not_mutate() {
        let acc = bob();
        let evt = acc
            .handle_command(AccountCommand::withdraw(dec(100)).unwrap())
            .unwrap();
        assert_eq!(evt.amount(), dec(100));
        assert_eq!(evt.kind(), &AccountEventKind::Withdrawn);
        assert_eq!(acc.balance(), dec(500));
        assert!(acc.history().is_empty());
    }

    #[test]
    fn recent_history_is_newest_first_and_limited() {
        let mut acc = alice();
        for amount in 1..=12 {
            acc.deposit(dec(amount)).unwrap();
        }
        let recent: Vec<String> = acc.recent_history(10).map(ToString::to_string).collect();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0], "Deposited Nu.12.00");
        assert_eq!(recent[9], "Deposited Nu.3.00");
        // storage is never truncated
        assert_eq!(acc.history().len(), 12);
    }

    #[test]
    fn passcode_is_compared_verbatim_and_hidden() {
        let acc = alice();
        assert!(acc.passcode_matches("1111"));
        assert!(!acc.passcode_matches("1111 "));
        assert!(!acc.passcode_matches("01111"));
        assert!(!format!("{acc:?}").contains("1111"));
    }
}
