//! Expense and income domain models, schedule expansion, and series edits.

pub mod edit;
pub mod frequency;
pub mod record;
pub mod schedule;

pub use edit::{override_occurrence, split_series, SeriesSplit};
pub use frequency::Frequency;
pub use record::{Adjustment, BalanceAnchor, DateWindow, IncomeRecord, RecurringExpense};
pub use schedule::{display_date, project, IdealDates, Occurrence, Projection};
