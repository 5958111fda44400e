use std::io::Read;

use csv::{StringRecord, StringRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountNumber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open {
        holder_name: String,
        passcode: String,
        opening_balance: Decimal,
    },
    Login {
        account_number: AccountNumber,
        passcode: String,
    },
    Logout,
    Deposit {
        amount: Decimal,
    },
    Withdraw {
        amount: Decimal,
    },
    Send {
        to: AccountNumber,
        amount: Decimal,
    },
    TopUp {
        phone_number: String,
        amount: Decimal,
    },
    Close,
    Balance,
    History,
    Accounts,
}

#[derive(Debug, Error)]
pub enum ShellCommandError {
    #[error("Unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        command: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("`{0}` is not a valid amount")]
    InvalidAmount(String),
    #[error("`{0}` is not a valid account number")]
    InvalidAccountNumber(String),
    #[error("Malformed line: {0}")]
    Malformed(#[from] csv::Error),
}

/// Reads one shell command per line.
///
/// Arguments are separated by spaces and may be double-quoted, so
/// `open "Mary Jane" 1234 500` names the holder `Mary Jane`.
/// Blank lines and lines starting with `#` are skipped.
pub struct CommandLineParser<R> {
    iter: StringRecordsIntoIter<R>,
}

impl<R> CommandLineParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_records(),
        }
    }
}

impl<R> Iterator for CommandLineParser<R>
where
    R: Read,
{
    type Item = (u64, Result<ShellCommand, ShellCommandError>);

    fn next(&mut self) -> Option<Self::Item> {
        let fallback_line = self.iter.reader().position().line();
        self.iter.next().map(|row| match row {
            Ok(record) => {
                let line = record
                    .position()
                    .map_or(fallback_line, |position| position.line());
                (line, parse_record(&record))
            }
            Err(err) => {
                let line = err.position().map_or(fallback_line, |position| position.line());
                (line, Err(err.into()))
            }
        })
    }
}

fn parse_record(record: &StringRecord) -> Result<ShellCommand, ShellCommandError> {
    // consecutive spaces show up as empty fields
    let fields: Vec<&str> = record.iter().filter(|field| !field.is_empty()).collect();
    let Some((name, args)) = fields.split_first() else {
        return Err(ShellCommandError::UnknownCommand(String::new()));
    };

    match name.to_ascii_lowercase().as_str() {
        "open" => {
            expect_args("open", args, 3)?;
            Ok(ShellCommand::Open {
                holder_name: args[0].to_owned(),
                passcode: args[1].to_owned(),
                opening_balance: parse_amount(args[2])?,
            })
        }
        "login" => {
            expect_args("login", args, 2)?;
            Ok(ShellCommand::Login {
                account_number: parse_account_number(args[0])?,
                passcode: args[1].to_owned(),
            })
        }
        "logout" => {
            expect_args("logout", args, 0)?;
            Ok(ShellCommand::Logout)
        }
        "deposit" => {
            expect_args("deposit", args, 1)?;
            Ok(ShellCommand::Deposit {
                amount: parse_amount(args[0])?,
            })
        }
        "withdraw" => {
            expect_args("withdraw", args, 1)?;
            Ok(ShellCommand::Withdraw {
                amount: parse_amount(args[0])?,
            })
        }
        "send" => {
            expect_args("send", args, 2)?;
            Ok(ShellCommand::Send {
                to: parse_account_number(args[0])?,
                amount: parse_amount(args[1])?,
            })
        }
        "topup" => {
            expect_args("topup", args, 2)?;
            Ok(ShellCommand::TopUp {
                phone_number: args[0].to_owned(),
                amount: parse_amount(args[1])?,
            })
        }
        "close" => {
            expect_args("close", args, 0)?;
            Ok(ShellCommand::Close)
        }
        "balance" => {
            expect_args("balance", args, 0)?;
            Ok(ShellCommand::Balance)
        }
        "history" => {
            expect_args("history", args, 0)?;
            Ok(ShellCommand::History)
        }
        "accounts" => {
            expect_args("accounts", args, 0)?;
            Ok(ShellCommand::Accounts)
        }
        _ => Err(ShellCommandError::UnknownCommand((*name).to_owned())),
    }
}

fn expect_args(
    command: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), ShellCommandError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ShellCommandError::ArgumentCount {
            command,
            expected,
            actual: args.len(),
        })
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, ShellCommandError> {
    raw.parse()
        .map_err(|_| ShellCommandError::InvalidAmount(raw.to_owned()))
}

fn parse_account_number(raw: &str) -> Result<AccountNumber, ShellCommandError> {
    raw.parse()
        .map_err(|_| ShellCommandError::InvalidAccountNumber(raw.to_owned()))
}
