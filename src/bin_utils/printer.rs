use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::{
    account::{Account, AccountNumber},
    money::normalize,
};

#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub account: AccountNumber,
    pub holder: String,
    pub balance: String,
}

impl From<&Account> for AccountRow {
    fn from(acc: &Account) -> Self {
        Self {
            account: acc.account_number(),
            holder: acc.holder_name().to_owned(),
            balance: format!("{:.2}", normalize(acc.balance())),
        }
    }
}

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountRow>,
) -> anyhow::Result<()>
where
    W: Write,
{
    // header is written by hand so an empty listing still gets one
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
    if let Err(err) = writer.write_record(["account", "holder", "balance"]) {
        anyhow::bail!("Failed to write to CSV: {err}")
    }
    for acc in accounts {
        if let Err(err) = writer.serialize(acc) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}

pub fn print_lines<W, S>(output: &mut W, lines: impl IntoIterator<Item = S>) -> anyhow::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for line in lines {
        writeln!(output, "{}", line.as_ref())?;
    }
    Ok(())
}
