//! Request-level facade: reads one full record snapshot per call and computes
//! projections, edits, and forecasts from it.

use std::cmp;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::errors::{EngineError, RecordKind};
use crate::expense::frequency::shift_month;
use crate::expense::{
    edit, project, BalanceAnchor, DateWindow, Frequency, IncomeRecord, Projection,
    RecurringExpense,
};
use crate::forecast::{self, BalancePoint};
use crate::store::RecordStore;

const DISPOSABLE_INCOME_KEY: &str = "disposable_income";
const LAST_RESET_KEY: &str = "last_reset";
const UPCOMING_LOOKAHEAD_MONTHS: i32 = 6;

/// Tunables for forecast computation.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// How many days before a requested display range the balance walk may
    /// start in order to accumulate running history.
    pub history_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_days: 365 * 2,
        }
    }
}

/// Balance forecast output plus integrity warnings for series excluded
/// fail-closed from the underlying cash flow.
#[derive(Debug, Clone, Default)]
pub struct Forecast {
    pub points: Vec<BalancePoint>,
    pub warnings: Vec<String>,
}

/// Records written by an occurrence edit.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// A single occurrence was overridden in place.
    Overridden { expense: RecurringExpense },
    /// The series was terminated and forked forward.
    Split {
        terminated: RecurringExpense,
        forked: RecurringExpense,
    },
}

pub struct Engine<S: RecordStore> {
    store: S,
    config: EngineConfig,
}

impl<S: RecordStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and persists a new recurring expense, returning its id.
    pub fn add_expense(
        &self,
        description: &str,
        amount: f64,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Result<Uuid, EngineError> {
        let record = RecurringExpense::new(description, amount, frequency, start_date);
        record.validate()?;
        self.store.insert_expense(&record)?;
        tracing::info!(id = %record.id, "expense added");
        Ok(record.id)
    }

    /// Validates and persists a one-off income record, returning its id.
    pub fn add_income(
        &self,
        description: &str,
        amount: f64,
        date: NaiveDate,
    ) -> Result<Uuid, EngineError> {
        let record = IncomeRecord::new(description, amount, date);
        record.validate()?;
        self.store.insert_income(&record)?;
        tracing::info!(id = %record.id, "income added");
        Ok(record.id)
    }

    pub fn delete_expense(&self, id: Uuid) -> Result<(), EngineError> {
        self.store.delete_expense(id)?;
        tracing::info!(%id, "expense deleted");
        Ok(())
    }

    pub fn delete_income(&self, id: Uuid) -> Result<(), EngineError> {
        self.store.delete_income(id)?;
        tracing::info!(%id, "income deleted");
        Ok(())
    }

    /// Expands every stored series inside `window`, sorted by display date.
    pub fn project_occurrences(&self, window: DateWindow) -> Result<Projection, EngineError> {
        let expenses = self.store.list_expenses()?;
        Ok(project(&expenses, window))
    }

    /// The landing view: occurrences due within the next six months of
    /// `reference`.
    pub fn upcoming(&self, reference: NaiveDate) -> Result<Projection, EngineError> {
        let horizon = shift_month(reference, UPCOMING_LOOKAHEAD_MONTHS);
        self.project_occurrences(DateWindow::new(reference, horizon)?)
    }

    /// Moves one future occurrence. With `propagate` false this upserts a
    /// date override; with `propagate` true it terminates the series the day
    /// before `ideal_date` and forks a fresh series starting at `new_date`.
    pub fn apply_edit(
        &self,
        expense_id: Uuid,
        ideal_date: NaiveDate,
        new_date: NaiveDate,
        propagate: bool,
    ) -> Result<EditOutcome, EngineError> {
        let expense = self
            .store
            .get_expense(expense_id)?
            .ok_or(EngineError::NotFound {
                kind: RecordKind::Expense,
                id: expense_id,
            })?;

        if propagate {
            if expense.is_terminated() {
                return Err(EngineError::Validation(format!(
                    "expense {} is already terminated and cannot be split again",
                    expense_id
                )));
            }
            let split = edit::split_series(&expense, ideal_date, new_date);
            self.store.upsert_expense(&split.terminated)?;
            self.store.insert_expense(&split.forked)?;
            tracing::info!(
                original = %split.terminated.id,
                fork = %split.forked.id,
                "series split"
            );
            Ok(EditOutcome::Split {
                terminated: split.terminated,
                forked: split.forked,
            })
        } else {
            let mut updated = expense;
            edit::override_occurrence(&mut updated, ideal_date, new_date);
            self.store.upsert_expense(&updated)?;
            tracing::info!(id = %updated.id, "occurrence overridden");
            Ok(EditOutcome::Overridden { expense: updated })
        }
    }

    /// The stored balance anchor, or the zero anchor when never reset.
    pub fn anchor(&self) -> Result<BalanceAnchor, EngineError> {
        let disposable = self.store.get_setting(DISPOSABLE_INCOME_KEY)?;
        let last_reset = self.store.get_setting(LAST_RESET_KEY)?;
        match (disposable, last_reset) {
            (Some(value), Some(instant)) => {
                let disposable = value.parse::<f64>().map_err(|_| {
                    EngineError::Validation(format!(
                        "stored disposable income `{value}` is not a number"
                    ))
                })?;
                let last_reset = instant.parse::<NaiveDate>().map_err(|_| {
                    EngineError::Validation(format!(
                        "stored reset date `{instant}` is not a calendar date"
                    ))
                })?;
                Ok(BalanceAnchor {
                    disposable,
                    last_reset,
                })
            }
            _ => Ok(BalanceAnchor::default()),
        }
    }

    /// Records a known balance at `instant`. Both settings are written
    /// together so the anchor value and its validity instant stay
    /// consistent; the new pair is returned for the caller to pass around
    /// explicitly.
    pub fn reset_anchor(
        &self,
        disposable: f64,
        instant: NaiveDate,
    ) -> Result<BalanceAnchor, EngineError> {
        self.store
            .set_setting(DISPOSABLE_INCOME_KEY, &disposable.to_string())?;
        self.store
            .set_setting(LAST_RESET_KEY, &instant.to_string())?;
        tracing::info!(%instant, "balance anchor reset");
        Ok(BalanceAnchor {
            disposable,
            last_reset: instant,
        })
    }

    /// Daily running-balance series over `range`, one point per day.
    pub fn forecast_balance(&self, range: DateWindow) -> Result<Forecast, EngineError> {
        let expenses = self.store.list_expenses()?;
        let income = self.store.list_income()?;
        let anchor = self.anchor()?;

        let floor = range
            .start
            .checked_sub_signed(Duration::days(self.config.history_days))
            .unwrap_or(NaiveDate::MIN);
        let walk_start = cmp::min(range.start, cmp::max(floor, anchor.last_reset));

        let flow_window = DateWindow::new(walk_start, range.end)?;
        let flow = forecast::net_daily_flow(&expenses, &income, flow_window);
        let points = forecast::forecast_series(range, &anchor, &flow.by_day, walk_start);

        Ok(Forecast {
            points,
            warnings: flow.warnings,
        })
    }
}
