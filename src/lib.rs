/// Ledger entry for a single holder: balance, credentials and transaction history.
/// State is modified using events, which are created by handling commands
pub mod account;

/// Validated inputs that later are executed by [`account`].
pub mod command;

/// Ledger limits: minimum opening balance, passcode length, account number range.
pub mod config;

/// Two-decimal amounts and `Nu.` formatting.
pub mod money;

/// Account registry interface, plus "in memory" implementation.
/// Owns every open account and hands out account numbers.
pub mod registry;

/// Explicit login state. The front end keeps one of these instead of a global
/// "current account".
pub mod session;

/// Command shell over [`session`] and [`registry`]. It is here rather than in
/// the binary so the integration tests can drive it.
pub mod bin_utils;
