pub mod json_backend;

use uuid::Uuid;

use crate::errors::EngineError;
use crate::expense::{IncomeRecord, RecurringExpense};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Abstraction over persistence backends holding expense, income, and
/// settings records.
///
/// Dates cross this boundary as date-only values with local-day semantics;
/// backends must never reinterpret them in another zone, which would
/// silently shift which calendar day an occurrence falls on.
pub trait RecordStore: Send + Sync {
    fn list_expenses(&self) -> Result<Vec<RecurringExpense>>;
    fn get_expense(&self, id: Uuid) -> Result<Option<RecurringExpense>>;
    fn insert_expense(&self, record: &RecurringExpense) -> Result<()>;
    fn upsert_expense(&self, record: &RecurringExpense) -> Result<()>;
    fn delete_expense(&self, id: Uuid) -> Result<()>;

    fn list_income(&self) -> Result<Vec<IncomeRecord>>;
    fn insert_income(&self, record: &IncomeRecord) -> Result<()>;
    fn delete_income(&self, id: Uuid) -> Result<()>;

    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
}

pub use json_backend::JsonStore;
