use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::EngineError;

use super::frequency::Frequency;
use super::record::{Adjustment, DateWindow, RecurringExpense};

const MAX_SERIES_OCCURRENCES: usize = 1024;

/// A single expanded occurrence of a recurring expense. Derived on every
/// query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub expense_id: Uuid,
    pub ideal_date: NaiveDate,
    pub display_date: NaiveDate,
    pub amount: f64,
}

/// Lazy iterator over a series' ideal occurrence dates, bounded by the
/// window end and the series' own end date (inclusive). Construction is
/// cheap, so a sequence is restarted by rebuilding the iterator.
#[derive(Debug, Clone)]
pub struct IdealDates {
    next: Option<NaiveDate>,
    frequency: Frequency,
    series_end: Option<NaiveDate>,
    limit: NaiveDate,
    produced: usize,
}

impl IdealDates {
    /// Fails closed: a non-positive stored amount is a data-integrity error
    /// and an unrecognized frequency must never expand.
    pub fn new(expense: &RecurringExpense, window: DateWindow) -> Result<Self, EngineError> {
        if !(expense.amount > 0.0) {
            return Err(EngineError::Validation(format!(
                "expense {} has non-positive amount {}",
                expense.id, expense.amount
            )));
        }
        if expense.frequency == Frequency::Unknown {
            return Err(EngineError::UnrecognizedFrequency {
                expense_id: expense.id,
            });
        }
        Ok(Self {
            next: Some(expense.start_date),
            frequency: expense.frequency,
            series_end: expense.end_date,
            limit: window.end,
            produced: 0,
        })
    }
}

impl Iterator for IdealDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        if current > self.limit || self.produced >= MAX_SERIES_OCCURRENCES {
            self.next = None;
            return None;
        }
        if let Some(end) = self.series_end {
            if current > end {
                self.next = None;
                return None;
            }
        }
        self.produced += 1;
        self.next = self.frequency.advance(current);
        Some(current)
    }
}

/// Resolves an ideal date to its display date: the matching override's new
/// date when one exists, else the ideal date unchanged.
pub fn display_date(ideal: NaiveDate, adjustments: &[Adjustment]) -> NaiveDate {
    adjustments
        .iter()
        .find(|adj| adj.original_date == ideal)
        .map(|adj| adj.new_date)
        .unwrap_or(ideal)
}

/// Occurrence projection plus integrity warnings for series skipped
/// fail-closed.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub occurrences: Vec<Occurrence>,
    pub warnings: Vec<String>,
}

/// Expands every expense into display-dated occurrences. Ideal dates are
/// kept inside `window`; an occurrence whose override pushes its display
/// date past the window end is dropped. Series that fail integrity checks
/// are skipped and surfaced as warnings without aborting the rest.
pub fn project(expenses: &[RecurringExpense], window: DateWindow) -> Projection {
    let mut projection = Projection::default();

    for expense in expenses {
        let dates = match IdealDates::new(expense, window) {
            Ok(dates) => dates,
            Err(err) => {
                tracing::warn!(expense_id = %expense.id, error = %err, "skipping series");
                projection
                    .warnings
                    .push(format!("skipped expense `{}`: {}", expense.description, err));
                continue;
            }
        };
        for ideal in dates {
            if ideal < window.start {
                continue;
            }
            let display = display_date(ideal, &expense.adjustments);
            if display > window.end {
                continue;
            }
            projection.occurrences.push(Occurrence {
                expense_id: expense.id,
                ideal_date: ideal,
                display_date: display,
                amount: expense.amount,
            });
        }
    }

    projection
        .occurrences
        .sort_by_key(|occurrence| occurrence.display_date);
    projection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    fn weekly_fifty() -> RecurringExpense {
        RecurringExpense::new("Groceries", 50.0, Frequency::Weekly, date(2024, 1, 1))
    }

    #[test]
    fn weekly_series_expands_inclusively() {
        let expense = weekly_fifty();
        let dates: Vec<_> = IdealDates::new(&expense, window(date(2024, 1, 1), date(2024, 1, 22)))
            .unwrap()
            .collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 8),
                date(2024, 1, 15),
                date(2024, 1, 22),
            ]
        );
    }

    #[test]
    fn end_date_still_produces_its_own_occurrence() {
        let mut expense = weekly_fifty();
        expense.end_date = Some(date(2024, 1, 15));
        let dates: Vec<_> = IdealDates::new(&expense, window(date(2024, 1, 1), date(2024, 2, 1)))
            .unwrap()
            .collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]
        );
    }

    #[test]
    fn generation_stays_within_start_and_end_bounds() {
        let mut expense = weekly_fifty();
        expense.end_date = Some(date(2024, 3, 1));
        let win = window(date(2024, 1, 1), date(2024, 2, 1));
        for ideal in IdealDates::new(&expense, win).unwrap() {
            assert!(ideal >= expense.start_date);
            assert!(expense.allows_ideal(ideal));
            assert!(ideal <= win.end);
        }
    }

    #[test]
    fn zero_amount_is_reported_not_skipped() {
        let mut expense = weekly_fifty();
        expense.amount = 0.0;
        let err = IdealDates::new(&expense, window(date(2024, 1, 1), date(2024, 1, 31)))
            .expect_err("non-positive amount must fail");
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn unknown_frequency_fails_closed() {
        let mut expense = weekly_fifty();
        expense.frequency = Frequency::Unknown;
        let err = IdealDates::new(&expense, window(date(2024, 1, 1), date(2024, 1, 31)))
            .expect_err("unknown frequency must not expand");
        assert!(matches!(err, EngineError::UnrecognizedFrequency { .. }));
    }

    #[test]
    fn resolution_is_idempotent() {
        let adjustments = vec![Adjustment {
            original_date: date(2024, 1, 15),
            new_date: date(2024, 1, 17),
        }];
        let first = display_date(date(2024, 1, 15), &adjustments);
        let second = display_date(date(2024, 1, 15), &adjustments);
        assert_eq!(first, date(2024, 1, 17));
        assert_eq!(first, second);
        assert_eq!(display_date(date(2024, 1, 8), &adjustments), date(2024, 1, 8));
    }

    #[test]
    fn projection_sorts_by_display_date() {
        let mut early = weekly_fifty();
        early.adjustments.push(Adjustment {
            original_date: date(2024, 1, 1),
            new_date: date(2024, 1, 20),
        });
        let late = RecurringExpense::new("Rent", 900.0, Frequency::Monthly, date(2024, 1, 5));
        let projection = project(
            &[early, late],
            window(date(2024, 1, 1), date(2024, 1, 22)),
        );
        let displays: Vec<_> = projection
            .occurrences
            .iter()
            .map(|o| o.display_date)
            .collect();
        let mut sorted = displays.clone();
        sorted.sort();
        assert_eq!(displays, sorted);
    }

    #[test]
    fn adjustment_past_window_end_drops_the_occurrence() {
        let mut expense = weekly_fifty();
        expense.adjustments.push(Adjustment {
            original_date: date(2024, 1, 22),
            new_date: date(2024, 2, 2),
        });
        let projection = project(
            std::slice::from_ref(&expense),
            window(date(2024, 1, 1), date(2024, 1, 22)),
        );
        assert_eq!(projection.occurrences.len(), 3);
        assert!(projection
            .occurrences
            .iter()
            .all(|o| o.ideal_date != date(2024, 1, 22)));
    }

    #[test]
    fn broken_series_becomes_a_warning_not_a_failure() {
        let mut broken = weekly_fifty();
        broken.frequency = Frequency::Unknown;
        let healthy = RecurringExpense::new("Rent", 900.0, Frequency::Monthly, date(2024, 1, 5));
        let projection = project(
            &[broken, healthy],
            window(date(2024, 1, 1), date(2024, 1, 31)),
        );
        assert_eq!(projection.occurrences.len(), 1);
        assert_eq!(projection.warnings.len(), 1);
    }

    #[test]
    fn iterator_rebuild_yields_the_same_sequence() {
        let expense = weekly_fifty();
        let win = window(date(2024, 1, 1), date(2024, 2, 1));
        let first: Vec<_> = IdealDates::new(&expense, win).unwrap().collect();
        let second: Vec<_> = IdealDates::new(&expense, win).unwrap().collect();
        assert_eq!(first, second);
    }
}
