//! Day-keyed cash-flow aggregation and running-balance forecasting.

use std::cmp;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::expense::schedule::{display_date, IdealDates};
use crate::expense::{BalanceAnchor, DateWindow, IncomeRecord, RecurringExpense};

/// Net amount change per calendar day inside a window. Per-transaction
/// identity is deliberately discarded so forecasting walks days, not
/// transactions.
#[derive(Debug, Clone, Default)]
pub struct DailyFlow {
    pub by_day: BTreeMap<NaiveDate, f64>,
    pub warnings: Vec<String>,
}

/// Merges expense occurrences and income records into a day-keyed net-change
/// map. Window membership is tested on the *display* date, since an
/// adjustment can move an occurrence into or out of the window independent
/// of its ideal date. Broken series are skipped fail-closed and reported as
/// warnings.
pub fn net_daily_flow(
    expenses: &[RecurringExpense],
    income: &[IncomeRecord],
    window: DateWindow,
) -> DailyFlow {
    let mut flow = DailyFlow::default();

    for expense in expenses {
        let dates = match IdealDates::new(expense, window) {
            Ok(dates) => dates,
            Err(err) => {
                tracing::warn!(expense_id = %expense.id, error = %err, "excluding series from cash flow");
                flow.warnings
                    .push(format!("skipped expense `{}`: {}", expense.description, err));
                continue;
            }
        };
        for ideal in dates {
            let display = display_date(ideal, &expense.adjustments);
            if !window.contains(display) {
                continue;
            }
            *flow.by_day.entry(display).or_insert(0.0) -= expense.amount;
        }
    }

    for record in income {
        if window.contains(record.date) {
            *flow.by_day.entry(record.date).or_insert(0.0) += record.amount;
        }
    }

    flow
}

/// One day of the forecast output series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: f64,
}

/// Walks one `balance` variable day by day and emits a point for every day
/// of `range`, in order, with no gaps.
///
/// The walk may begin before `range.start` (at `walk_start`) purely to
/// accumulate running history. On the anchor's reset day the balance is
/// overwritten with the anchor value; flow dated strictly before the reset
/// is never applied.
pub fn forecast_series(
    range: DateWindow,
    anchor: &BalanceAnchor,
    flow: &BTreeMap<NaiveDate, f64>,
    walk_start: NaiveDate,
) -> Vec<BalancePoint> {
    let mut points = Vec::new();
    let mut balance = 0.0;
    let mut day = cmp::min(walk_start, range.start);

    while day <= range.end {
        if day == anchor.last_reset {
            balance = anchor.disposable;
        }
        if day >= anchor.last_reset {
            balance += flow.get(&day).copied().unwrap_or(0.0);
        }
        if range.contains(day) {
            points.push(BalancePoint {
                date: day,
                balance: round_cents(balance),
            });
        }
        day += Duration::days(1);
    }

    points
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
