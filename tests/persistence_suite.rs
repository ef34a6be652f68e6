use cashflow_core::engine::Engine;
use cashflow_core::expense::Frequency;
use cashflow_core::store::{JsonStore, RecordStore};
use chrono::NaiveDate;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn records_survive_a_store_reopen() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();

    let expense_id = {
        let engine = Engine::new(JsonStore::new(Some(root.clone())).unwrap());
        let id = engine
            .add_expense("Rent", 900.0, Frequency::Monthly, date(2024, 1, 1))
            .unwrap();
        engine.add_income("Invoice", 250.0, date(2024, 2, 1)).unwrap();
        engine.reset_anchor(120.0, date(2024, 1, 15)).unwrap();
        id
    };

    let reopened = Engine::new(JsonStore::new(Some(root)).unwrap());
    let expenses = reopened.store().list_expenses().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].id, expense_id);

    let income = reopened.store().list_income().unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].amount, 250.0);

    let anchor = reopened.anchor().unwrap();
    assert_eq!(anchor.disposable, 120.0);
    assert_eq!(anchor.last_reset, date(2024, 1, 15));
}

#[test]
fn adjustments_written_by_edits_persist() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();

    let id = {
        let engine = Engine::new(JsonStore::new(Some(root.clone())).unwrap());
        let id = engine
            .add_expense("Gym", 25.0, Frequency::Weekly, date(2024, 1, 1))
            .unwrap();
        engine
            .apply_edit(id, date(2024, 1, 8), date(2024, 1, 9), false)
            .unwrap();
        id
    };

    let reopened = JsonStore::new(Some(root)).unwrap();
    let stored = reopened.get_expense(id).unwrap().unwrap();
    assert_eq!(stored.adjustments.len(), 1);
    assert_eq!(stored.adjustments[0].original_date, date(2024, 1, 8));
    assert_eq!(stored.adjustments[0].new_date, date(2024, 1, 9));
}

#[test]
fn split_writes_both_records() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();

    let engine = Engine::new(JsonStore::new(Some(root.clone())).unwrap());
    let id = engine
        .add_expense("Groceries", 50.0, Frequency::Weekly, date(2024, 1, 1))
        .unwrap();
    engine
        .apply_edit(id, date(2024, 1, 15), date(2024, 1, 16), true)
        .unwrap();

    let reopened = JsonStore::new(Some(root)).unwrap();
    let expenses = reopened.list_expenses().unwrap();
    assert_eq!(expenses.len(), 2);

    let original = expenses.iter().find(|e| e.id == id).unwrap();
    assert_eq!(original.end_date, Some(date(2024, 1, 14)));

    let fork = expenses.iter().find(|e| e.id != id).unwrap();
    assert_eq!(fork.start_date, date(2024, 1, 16));
    assert!(fork.end_date.is_none());
    assert!(fork.adjustments.is_empty());
}
