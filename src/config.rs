use std::ops::RangeInclusive;

use rust_decimal::Decimal;

use crate::account::AccountNumber;

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Smallest balance an account can be opened with.
    pub minimum_opening_balance: Decimal,
    pub min_passcode_len: usize,
    /// Account numbers are drawn at random from this range.
    pub account_numbers: RangeInclusive<AccountNumber>,
    /// How many history entries the shell shows.
    pub history_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            minimum_opening_balance: Decimal::from(500),
            min_passcode_len: 4,
            account_numbers: 10000..=99999,
            history_limit: 10,
        }
    }
}

impl LedgerConfig {
    /// How many distinct account numbers the configured range holds.
    pub fn account_number_capacity(&self) -> usize {
        if self.account_numbers.is_empty() {
            0
        } else {
            (self.account_numbers.end() - self.account_numbers.start()) as usize + 1
        }
    }
}
