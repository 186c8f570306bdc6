//! JSON output of final account snapshots

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::types::{Account, AccountSnapshot, Login, ReplayError};

/// Final state of one account after a replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReport {
    pub login: Login,
    pub info: AccountSnapshot,
}

impl AccountReport {
    pub fn new(login: impl Into<Login>, info: AccountSnapshot) -> Self {
        Self {
            login: login.into(),
            info,
        }
    }

    /// Login and balance only, for the CSV output
    pub fn account(&self) -> Account {
        Account::new(self.login.clone(), self.info.balance)
    }
}

/// Write reports as a pretty-printed JSON array sorted by login
pub fn write_reports_json(
    reports: &[AccountReport],
    output: &mut dyn Write,
) -> Result<(), ReplayError> {
    let mut sorted: Vec<&AccountReport> = reports.iter().collect();
    sorted.sort_by(|a, b| a.login.cmp(&b.login));

    serde_json::to_writer_pretty(&mut *output, &sorted)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
