use chrono::{Duration, TimeZone, Utc};
use finavatar_core::{
    score, FinancialSnapshot, FixedClock, Frequency, GoalProfile, HabitStore, HabitUpdate,
    NewHabit, Trend,
};

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap())
}

fn seeded() -> HabitStore<FixedClock> {
    let mut store = HabitStore::with_clock(clock());
    let now = store.now();
    store.add_habit_at(
        NewHabit::new("demo", "Food & Dining", 45.5, Frequency::Daily).with_description("Lunch"),
        now - Duration::days(45),
    );
    store.add_habit_at(
        NewHabit::new("demo", "Food & Dining", 60.0, Frequency::Daily).with_description("Dinner"),
        now - Duration::days(3),
    );
    store.add_habit(
        NewHabit::new("demo", "Exercise & Fitness", 50.0, Frequency::Monthly)
            .with_description("Gym Membership")
            .recurring(true),
    );
    store.add_habit(
        NewHabit::new("demo", "Entertainment", 15.99, Frequency::Monthly)
            .with_description("Streaming")
            .recurring(true),
    );
    store
}

/// Adding and then removing a habit leaves the insights exactly as they were.
#[test]
fn test_add_then_delete_restores_insights() {
    let mut store = seeded();
    let before = store.spending_insights();

    let h = store.add_habit(NewHabit::new("demo", "Travel", 2400.0, Frequency::Yearly).recurring(true));
    assert_ne!(store.spending_insights(), before);

    store.delete_habit(&h.id);
    assert_eq!(store.spending_insights(), before);
}

/// Updates flow through to patterns before the call returns.
#[test]
fn test_update_recomputes_before_next_read() {
    let mut store = seeded();
    let dinner = store
        .habits()
        .iter()
        .find(|h| h.description == "Dinner")
        .cloned()
        .unwrap();

    let dining = store.patterns().iter().find(|p| p.category == "Food & Dining").unwrap();
    assert_eq!(dining.trend, Trend::Increasing);

    store.update_habit(
        &dinner.id,
        HabitUpdate {
            amount: Some(40.0),
            ..Default::default()
        },
    );
    let dining = store.patterns().iter().find(|p| p.category == "Food & Dining").unwrap();
    assert_eq!(dining.trend, Trend::Decreasing);
    assert_eq!(dining.total_spent, 85.5);
}

/// A realistic month: insights line up with the habit list.
#[test]
fn test_seeded_insights() {
    let store = seeded();
    let insights = store.spending_insights();

    assert_eq!(
        insights.top_categories,
        vec!["Food & Dining", "Exercise & Fitness", "Entertainment"]
    );
    assert!((insights.total_recurring_monthly_cost - 65.99).abs() < 1e-9);
    // (60 + 50/30 + 15.99/30) / 30
    let expected_daily = (60.0 + 50.0 / 30.0 + 15.99 / 30.0) / 30.0;
    assert!((insights.average_daily_spending - expected_daily).abs() < 1e-9);
    // 65.99 recurring against ~62.2 of monthly spend
    assert_eq!(
        insights.recommendations,
        vec!["A large portion of your spending is recurring - look for subscription services to cancel"]
    );
}

/// Scorer output is a pure function of its input.
#[test]
fn test_score_matches_across_calls() {
    let snapshot = FinancialSnapshot {
        monthly_income: 5000.0,
        monthly_expenses: 3000.0,
        savings: 1000.0,
        debt: 500.0,
        investments: 500.0,
        goal_profile: GoalProfile::Moderate,
    };
    let a = score(&snapshot);
    let b = score(&snapshot);
    assert_eq!(a.fitness_level.to_bits(), b.fitness_level.to_bits());
    assert_eq!(a.happiness_level.to_bits(), b.happiness_level.to_bits());
    assert_eq!(a, b);
}
