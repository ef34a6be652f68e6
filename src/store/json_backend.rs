use std::{
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, RecordKind};
use crate::expense::{IncomeRecord, RecurringExpense};

use super::{RecordStore, Result};

const STORE_FILE: &str = "records.json";
const TMP_SUFFIX: &str = "tmp";
const APP_DIR: &str = "cashflow";

/// Full record snapshot persisted as one JSON document. Every operation
/// reads the whole snapshot and rewrites it atomically, which gives callers
/// the copy-on-read isolation the engine assumes.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    expenses: Vec<RecurringExpense>,
    #[serde(default)]
    income: Vec<IncomeRecord>,
    #[serde(default)]
    settings: HashMap<String, String>,
}

/// File-backed record store keeping all records in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Opens (or prepares) a store rooted at `root`, defaulting to the
    /// per-user data directory.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = root.unwrap_or_else(default_base_dir);
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(STORE_FILE),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Snapshot> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Snapshot::default())
        }
    }

    fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut Snapshot) -> Result<()>,
    {
        let mut snapshot = self.read()?;
        op(&mut snapshot)?;
        self.write(&snapshot)
    }
}

impl RecordStore for JsonStore {
    fn list_expenses(&self) -> Result<Vec<RecurringExpense>> {
        Ok(self.read()?.expenses)
    }

    fn get_expense(&self, id: Uuid) -> Result<Option<RecurringExpense>> {
        Ok(self
            .read()?
            .expenses
            .into_iter()
            .find(|expense| expense.id == id))
    }

    fn insert_expense(&self, record: &RecurringExpense) -> Result<()> {
        let record = record.clone();
        self.mutate(move |snapshot| {
            snapshot.expenses.push(record);
            Ok(())
        })
    }

    fn upsert_expense(&self, record: &RecurringExpense) -> Result<()> {
        let record = record.clone();
        self.mutate(move |snapshot| {
            match snapshot
                .expenses
                .iter_mut()
                .find(|existing| existing.id == record.id)
            {
                Some(existing) => *existing = record,
                None => snapshot.expenses.push(record),
            }
            Ok(())
        })
    }

    fn delete_expense(&self, id: Uuid) -> Result<()> {
        self.mutate(move |snapshot| {
            let position = snapshot
                .expenses
                .iter()
                .position(|expense| expense.id == id)
                .ok_or(EngineError::NotFound {
                    kind: RecordKind::Expense,
                    id,
                })?;
            snapshot.expenses.remove(position);
            Ok(())
        })
    }

    fn list_income(&self) -> Result<Vec<IncomeRecord>> {
        Ok(self.read()?.income)
    }

    fn insert_income(&self, record: &IncomeRecord) -> Result<()> {
        let record = record.clone();
        self.mutate(move |snapshot| {
            snapshot.income.push(record);
            Ok(())
        })
    }

    fn delete_income(&self, id: Uuid) -> Result<()> {
        self.mutate(move |snapshot| {
            let position = snapshot
                .income
                .iter()
                .position(|income| income.id == id)
                .ok_or(EngineError::NotFound {
                    kind: RecordKind::Income,
                    id,
                })?;
            snapshot.income.remove(position);
            Ok(())
        })
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.settings.get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.mutate(move |snapshot| {
            snapshot.settings.insert(key, value);
            Ok(())
        })
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
