//! Line-oriented front end for [`bank_sim`](crate). It could live in its own crate,
//! but the integration tests drive it directly, so it stays here.

use std::io::{Read, Write};

use crate::{
    account::Account,
    money::Nu,
    registry::{AccountRegistry, RegistryError},
    session::{Session, SessionError},
};
use anyhow::Result;
use command_parser::{CommandLineParser, ShellCommand, ShellCommandError};
use printer::{AccountRow, print_accounts, print_lines};
use thiserror::Error;
pub mod command_parser;
pub mod printer;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Command(#[from] ShellCommandError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        Self::Session(err.into())
    }
}

enum Reply {
    Lines(Vec<String>),
    Accounts(Vec<AccountRow>),
}

/// Runs every command read from `input` against `registry` within a single session.
/// Replies go to `output`; rejected commands go to `error_printer` with their line number.
pub struct Service<'w, R, W: 'w, A: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub registry: &'w mut A,
    pub error_printer: Box<dyn FnMut(u64, ServiceError)>,
}

impl<'w, R, W, A> Service<'w, R, W, A>
where
    R: Read,
    W: Write + 'w,
    A: AccountRegistry + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CommandLineParser::new(self.input);
        let mut session = Session::default();

        for (line, parsed) in parser {
            let reply = parsed
                .map_err(ServiceError::from)
                .and_then(|command| execute(self.registry, &mut session, command));
            match reply {
                Ok(Reply::Lines(lines)) => print_lines(self.output, lines)?,
                Ok(Reply::Accounts(rows)) => print_accounts(self.output, rows.into_iter())?,
                Err(err) => (self.error_printer)(line, err),
            }
        }
        self.output.flush()?;
        Ok(())
    }
}

fn execute<A: AccountRegistry>(
    registry: &mut A,
    session: &mut Session,
    command: ShellCommand,
) -> Result<Reply, ServiceError> {
    let lines = match command {
        ShellCommand::Open {
            holder_name,
            passcode,
            opening_balance,
        } => {
            let account_number = registry.open_account(&holder_name, &passcode, opening_balance)?;
            let acc = registry.account(account_number)?;
            vec![
                format!("Account opened for {}", acc.holder_name()),
                format!("Account Number: {account_number}"),
                format!("Initial Balance: {}", Nu(acc.balance())),
            ]
        }
        ShellCommand::Login {
            account_number,
            passcode,
        } => statement(session.login(registry, account_number, &passcode)?),
        ShellCommand::Logout => {
            session.logout();
            vec!["You have been logged out.".to_owned()]
        }
        ShellCommand::Deposit { amount } => {
            session.deposit(registry, amount)?;
            vec![format!("Deposited {}", Nu(amount))]
        }
        ShellCommand::Withdraw { amount } => {
            session.withdraw(registry, amount)?;
            vec![format!("Withdrew {}", Nu(amount))]
        }
        ShellCommand::Send { to, amount } => {
            session.transfer(registry, to, amount)?;
            let recipient = registry.account(to)?;
            vec![format!(
                "Transferred {} to {}",
                Nu(amount),
                recipient.holder_name()
            )]
        }
        ShellCommand::TopUp {
            phone_number,
            amount,
        } => {
            session.mobile_top_up(registry, &phone_number, amount)?;
            vec![format!("Topped up {} to {phone_number}", Nu(amount))]
        }
        ShellCommand::Close => {
            session.close_account(registry)?;
            vec!["Account closed successfully".to_owned()]
        }
        ShellCommand::Balance => statement(session.current(registry)?),
        ShellCommand::History => {
            let limit = registry.config().history_limit;
            let lines: Vec<String> = session
                .current(registry)?
                .recent_history(limit)
                .map(|evt| format!("- {evt}"))
                .collect();
            if lines.is_empty() {
                vec!["No transactions yet".to_owned()]
            } else {
                lines
            }
        }
        ShellCommand::Accounts => {
            return Ok(Reply::Accounts(
                registry.accounts().into_iter().map(AccountRow::from).collect(),
            ));
        }
    };
    Ok(Reply::Lines(lines))
}

fn statement(acc: &Account) -> Vec<String> {
    vec![
        format!("Account: {}", acc.account_number()),
        format!("Holder: {}", acc.holder_name()),
        format!("Balance: {}", Nu(acc.balance())),
    ]
}
