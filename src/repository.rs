//! Loading and persisting the ledger.
//!
//! The service works on whole collections: the ledger is read once at
//! startup, and rewritten entirely after every successful transfer.

use crate::ledger::{round_to_minor_unit, Account, Amount, Ledger, DECIMAL_PRECISION};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // CSV is malformed, or a record doesn't hold a valid account.
    #[error("malformed ledger file: {0}")]
    Csv(#[from] csv::Error),

    #[error("ledger storage unavailable: {0}")]
    Unavailable(String),
}

/// Where the ledger comes from and goes to.
pub trait UserRepository: Send + Sync {
    fn load(&self) -> Result<Ledger, RepositoryError>;
    fn save(&self, ledger: &Ledger) -> Result<(), RepositoryError>;
}

// I have an AccountRecord type because the CSV layout is not the domain type:
// the column is called `user_id`, and balances are text, written with exactly
// 2 decimal places.
#[derive(Debug, Serialize, Deserialize)]
struct AccountRecord {
    #[serde(rename = "user_id")]
    id: String,

    country: String,

    #[serde(with = "rust_decimal::serde::str")]
    balance: Amount,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Account::new(record.id, record.country, record.balance)
    }
}

impl From<&Account> for AccountRecord {
    fn from(account: &Account) -> Self {
        let mut balance = round_to_minor_unit(account.balance());
        balance.rescale(DECIMAL_PRECISION);

        Self {
            id: account.id.clone(),
            country: account.country.clone(),
            balance,
        }
    }
}

/// Reads a ledger from CSV with a `user_id,country,balance` header.
///
/// Any malformed record aborts the whole read: starting the service on a
/// partial ledger would reject transfers for accounts that do exist.
pub fn read(input: impl io::Read) -> Result<Ledger, RepositoryError> {
    let buffered = io::BufReader::new(input);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(buffered);

    let mut ledger = Ledger::new();
    for record in reader.deserialize::<AccountRecord>() {
        let account: Account = record?.into();
        let id = account.id.clone();
        if ledger.insert(account).is_some() {
            tracing::warn!(account = %id, "duplicate account in ledger file, keeping the last one");
        }
    }

    Ok(ledger)
}

/// Writes the ledger as CSV, accounts sorted by ID.
pub fn write(output: impl io::Write, ledger: &Ledger) -> Result<(), RepositoryError> {
    let mut writer = csv::Writer::from_writer(output);

    for account in ledger.sorted() {
        writer.serialize(AccountRecord::from(account))?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// A ledger stored in CSV files.
///
/// The ledger can be read from one file and written to another one.
pub struct CsvRepository {
    source: PathBuf,
    destination: PathBuf,
}

impl CsvRepository {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Read from and write to the same file.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(path.clone(), path)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl UserRepository for CsvRepository {
    fn load(&self) -> Result<Ledger, RepositoryError> {
        let file = File::open(&self.source).map_err(|source| RepositoryError::Io {
            path: self.source.clone(),
            source,
        })?;

        read(file)
    }

    // Writes a sibling file first, then renames it over the destination, so a
    // crash mid-write never leaves a truncated ledger behind.
    fn save(&self, ledger: &Ledger) -> Result<(), RepositoryError> {
        let staging = self.destination.with_extension("csv.tmp");
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| RepositoryError::Io { path, source }
        };

        let file = File::create(&staging).map_err(io_err(&staging))?;
        write(io::BufWriter::new(file), ledger)?;
        fs::rename(&staging, &self.destination).map_err(io_err(&self.destination))?;

        Ok(())
    }
}

/// A ledger kept in memory, for tests and benchmarks.
#[derive(Default)]
pub struct MemoryRepository {
    stored: Mutex<Ledger>,
    saves: Mutex<usize>,
}

impl MemoryRepository {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            stored: Mutex::new(ledger),
            saves: Mutex::new(0),
        }
    }

    /// The last ledger that was saved (or the initial one).
    pub fn stored(&self) -> Ledger {
        self.stored.lock().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock()
    }
}

impl UserRepository for MemoryRepository {
    fn load(&self) -> Result<Ledger, RepositoryError> {
        Ok(self.stored())
    }

    fn save(&self, ledger: &Ledger) -> Result<(), RepositoryError> {
        *self.stored.lock() = ledger.clone();
        *self.saves.lock() += 1;

        Ok(())
    }
}
