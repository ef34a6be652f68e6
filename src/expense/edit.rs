use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use super::record::{Adjustment, RecurringExpense};

/// Result of a propagate edit: the original series terminated the day before
/// the edited occurrence, plus the fork that carries the schedule forward.
#[derive(Debug, Clone)]
pub struct SeriesSplit {
    pub terminated: RecurringExpense,
    pub forked: RecurringExpense,
}

/// Moves a single occurrence by upserting into the expense's adjustment
/// table. The only way adjustments grow, so `original_date` stays unique.
/// Never touches `start_date`, `end_date`, or `frequency`.
pub fn override_occurrence(
    expense: &mut RecurringExpense,
    ideal_date: NaiveDate,
    new_date: NaiveDate,
) {
    match expense
        .adjustments
        .iter_mut()
        .find(|adj| adj.original_date == ideal_date)
    {
        Some(existing) => existing.new_date = new_date,
        None => expense.adjustments.push(Adjustment {
            original_date: ideal_date,
            new_date,
        }),
    }
}

/// Redefines a series from `ideal_date` onward. The original timeline ends
/// the day before `ideal_date` so it never again produces that occurrence or
/// any later one; a new series with the same description, amount, and
/// frequency starts fresh at `new_date`.
///
/// When `ideal_date` equals the series' own start date the terminated record
/// ends before it starts and produces zero occurrences. That is valid: the
/// dead record is retained for history.
pub fn split_series(
    expense: &RecurringExpense,
    ideal_date: NaiveDate,
    new_date: NaiveDate,
) -> SeriesSplit {
    let mut terminated = expense.clone();
    terminated.end_date = Some(ideal_date - Duration::days(1));

    let forked = RecurringExpense {
        id: Uuid::new_v4(),
        description: expense.description.clone(),
        amount: expense.amount,
        frequency: expense.frequency,
        start_date: new_date,
        end_date: None,
        adjustments: Vec::new(),
    };

    SeriesSplit { terminated, forked }
}
