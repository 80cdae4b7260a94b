use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use finavatar_core::time::local_midnight_utc;
use finavatar_core::{score, BodyArchetype, GoalProfile};
use finavatar_ledger::{export_csv, import_csv, Ledger, NewTransaction};

fn february_ledger() -> Ledger {
    let now = Utc.with_ymd_and_hms(2026, 2, 27, 12, 0, 0).unwrap();
    let day = |d: u32| Utc.with_ymd_and_hms(2026, 2, d, 15, 0, 0).unwrap();

    let mut l = Ledger::with_default_categories(now);
    l.add_transaction(NewTransaction::income("demo", 5000.0, day(1)).with_description("Payroll"), now);
    for (d, amount, cat) in [(3, 1800.0, None), (7, 600.0, Some("1")), (14, 400.0, Some("3")), (20, 200.0, Some("2"))] {
        let mut t = NewTransaction::expense("demo", amount, day(d));
        t.category_id = cat.map(str::to_string);
        l.add_transaction(t, now);
    }
    l
}

/// A month of ledger rows drives the avatar just like hand-entered numbers.
#[test]
fn test_month_snapshot_scores_fit() {
    let ledger = february_ledger();
    let snapshot = ledger
        .snapshot_for_month(2026, 2, Tz::UTC, 1000.0, 500.0, 500.0, GoalProfile::Moderate)
        .unwrap();
    assert_eq!(snapshot.monthly_income, 5000.0);
    assert_eq!(snapshot.monthly_expenses, 3000.0);

    let metrics = score(&snapshot);
    assert_eq!(metrics.body_archetype, BodyArchetype::Fit);
    assert!((metrics.weight_level - 0.6).abs() < 1e-9);
}

/// Exported rows import back into a fresh ledger with the same monthly
/// totals, including a row dated the 1st in a zone behind UTC.
#[test]
fn test_export_then_import_preserves_totals() {
    let chicago: Tz = "America/Chicago".parse().unwrap();
    let mut ledger = february_ledger();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let march_first = local_midnight_utc(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), chicago).unwrap();
    ledger.add_transaction(NewTransaction::expense("demo", 100.0, march_first).with_description("Rent"), now);

    let dir = std::env::temp_dir().join(format!("finavatar-ledger-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("transactions.csv");

    let written = export_csv(&ledger, &path, chicago).unwrap();
    assert_eq!(written, 6);

    let mut restored = Ledger::with_default_categories(now);
    let file = std::fs::File::open(&path).unwrap();
    assert_eq!(import_csv(&mut restored, file, "demo", chicago, now).unwrap(), 6);

    for month in [2, 3] {
        let a = ledger.monthly_totals(2026, month, chicago).unwrap();
        let b = restored.monthly_totals(2026, month, chicago).unwrap();
        assert_eq!(a, b, "month {month}");
    }
    assert_eq!(restored.monthly_totals(2026, 3, chicago).unwrap().expenses, 100.0);
    assert_eq!(ledger.category_totals(5), restored.category_totals(5));

    std::fs::remove_dir_all(&dir).ok();
}
