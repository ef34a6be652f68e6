use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;

use super::frequency::Frequency;

/// A recurring expense series. `start_date` is the first ideal occurrence;
/// `end_date`, when set, is the last permitted ideal date (inclusive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

impl RecurringExpense {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            frequency,
            start_date,
            end_date: None,
            adjustments: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.amount > 0.0) {
            return Err(EngineError::Validation(format!(
                "expense amount must be positive, got {}",
                self.amount
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(EngineError::Validation(format!(
                    "end date {} precedes start date {}",
                    end, self.start_date
                )));
            }
        }
        Ok(())
    }

    /// Whether `date` may still appear as an ideal occurrence. A date equal
    /// to `end_date` is allowed; termination only fences dates after it.
    pub fn allows_ideal(&self, date: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| date <= end)
    }

    pub fn is_terminated(&self) -> bool {
        self.end_date.is_some()
    }
}

/// One sparse date override, keyed by the ideal occurrence date it replaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Adjustment {
    pub original_date: NaiveDate,
    pub new_date: NaiveDate,
}

/// A one-off income record. Immutable once created, except by delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

impl IncomeRecord {
    pub fn new(description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            date,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.amount > 0.0) {
            return Err(EngineError::Validation(format!(
                "income amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// A known balance snapshot: `disposable` is the balance at the start of
/// `last_reset`. Cash-flow dated strictly before `last_reset` is irrelevant
/// history for forecasting. Both fields are always written together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceAnchor {
    pub disposable: f64,
    pub last_reset: NaiveDate,
}

impl Default for BalanceAnchor {
    fn default() -> Self {
        Self {
            disposable: 0.0,
            last_reset: NaiveDate::MIN,
        }
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::Validation(format!(
                "window end {} precedes window start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
