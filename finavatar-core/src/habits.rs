//! Habit store: the spending-habit collection and its per-category patterns.
//!
//! Patterns are never edited directly. Every mutation rebuilds them before it
//! returns, so readers always see patterns that match the current habits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::insights::{self, SpendingInsights};
use crate::time::{trailing_window_start, Clock, SystemClock};

/// How often a habit's amount is incurred
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Convert one occurrence into its monthly cost
    pub fn monthly_equivalent(&self, amount: f64) -> f64 {
        match self {
            Frequency::Daily => amount * 30.0,
            Frequency::Weekly => amount * 4.0,
            Frequency::Monthly => amount,
            Frequency::Yearly => amount / 12.0,
        }
    }

    /// Convert one occurrence into its daily cost
    pub fn daily_equivalent(&self, amount: f64) -> f64 {
        match self {
            Frequency::Daily => amount,
            Frequency::Weekly => amount / 7.0,
            Frequency::Monthly => amount / 30.0,
            Frequency::Yearly => amount / 365.0,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => anyhow::bail!("unknown frequency: {other}"),
        }
    }
}

/// A recorded spending habit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Habit {
    pub id: String,
    pub owner_id: String,
    pub category: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub description: String,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Amount expressed as a monthly cost
    pub fn monthly_amount(&self) -> f64 {
        self.frequency.monthly_equivalent(self.amount)
    }

    /// Amount expressed as a daily cost
    pub fn daily_amount(&self) -> f64 {
        self.frequency.daily_equivalent(self.amount)
    }
}

/// Fields supplied when recording a habit; id and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewHabit {
    pub owner_id: String,
    pub category: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub description: String,
    pub is_recurring: bool,
}

impl NewHabit {
    pub fn new(
        owner_id: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        frequency: Frequency,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            category: category.into(),
            amount,
            frequency,
            description: String::new(),
            is_recurring: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }
}

/// Partial update. `None` leaves the field untouched; id and created_at are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HabitUpdate {
    pub owner_id: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    pub description: Option<String>,
    pub is_recurring: Option<bool>,
}

impl HabitUpdate {
    fn apply(self, habit: &mut Habit) {
        if let Some(v) = self.owner_id {
            habit.owner_id = v;
        }
        if let Some(v) = self.category {
            habit.category = v;
        }
        if let Some(v) = self.amount {
            habit.amount = v;
        }
        if let Some(v) = self.frequency {
            habit.frequency = v;
        }
        if let Some(v) = self.description {
            habit.description = v;
        }
        if let Some(v) = self.is_recurring {
            habit.is_recurring = v;
        }
    }
}

/// Direction of spending in a category, recent window vs. everything before it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Trend {
    #[serde(rename = "increasing")]
    Increasing,
    #[serde(rename = "decreasing")]
    Decreasing,
    #[serde(rename = "stable")]
    Stable,
}

impl Trend {
    /// Compare averages with a +/-10% dead band. A missing half averages to 0.
    pub fn between(recent_avg: f64, older_avg: f64) -> Self {
        if recent_avg > older_avg * 1.1 {
            Trend::Increasing
        } else if recent_avg < older_avg * 0.9 {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

/// Per-category aggregate over raw (not period-normalized) amounts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitPattern {
    pub category: String,
    pub average_amount: f64,
    /// Number of habit records in the category
    pub frequency: usize,
    pub total_spent: f64,
    pub trend: Trend,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Group habits by exact (case-sensitive) category, in first-seen order.
pub fn analyze_patterns(habits: &[Habit], now: DateTime<Utc>) -> Vec<HabitPattern> {
    let cutoff = trailing_window_start(now);

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Habit>> = HashMap::new();
    for h in habits {
        let entry = groups.entry(h.category.as_str()).or_default();
        if entry.is_empty() {
            order.push(h.category.as_str());
        }
        entry.push(h);
    }

    order
        .into_iter()
        .map(|category| {
            let items = &groups[category];
            let total: f64 = items.iter().map(|h| h.amount).sum();
            let count = items.len();

            let (recent, older): (Vec<&Habit>, Vec<&Habit>) =
                items.iter().copied().partition(|h| h.created_at > cutoff);
            let recent_avg = mean(&recent.iter().map(|h| h.amount).collect::<Vec<_>>());
            let older_avg = mean(&older.iter().map(|h| h.amount).collect::<Vec<_>>());

            HabitPattern {
                category: category.to_string(),
                average_amount: total / count as f64,
                frequency: count,
                total_spent: total,
                trend: Trend::between(recent_avg, older_avg),
            }
        })
        .collect()
}

/// In-memory habit collection owned by a single session.
///
/// Persistence is the caller's concern: load with [`HabitStore::from_habits`],
/// save whatever [`HabitStore::habits`] returns.
#[derive(Debug, Clone)]
pub struct HabitStore<C: Clock = SystemClock> {
    habits: Vec<Habit>,
    patterns: Vec<HabitPattern>,
    clock: C,
}

impl HabitStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn from_habits(habits: Vec<Habit>) -> Self {
        Self::from_habits_with_clock(habits, SystemClock)
    }
}

impl Default for HabitStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> HabitStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::from_habits_with_clock(Vec::new(), clock)
    }

    pub fn from_habits_with_clock(habits: Vec<Habit>, clock: C) -> Self {
        let mut store = Self {
            habits,
            patterns: Vec::new(),
            clock,
        };
        store.recompute_patterns();
        store
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn patterns(&self) -> &[HabitPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Record a habit stamped with the current time.
    pub fn add_habit(&mut self, data: NewHabit) -> Habit {
        let now = self.clock.now();
        self.add_habit_at(data, now)
    }

    /// Record a habit with an explicit timestamp (backfill/import).
    pub fn add_habit_at(&mut self, data: NewHabit, created_at: DateTime<Utc>) -> Habit {
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            owner_id: data.owner_id,
            category: data.category,
            amount: data.amount,
            frequency: data.frequency,
            description: data.description,
            is_recurring: data.is_recurring,
            created_at,
        };
        debug!(id = %habit.id, category = %habit.category, amount = habit.amount, "habit added");
        self.habits.push(habit.clone());
        self.recompute_patterns();
        habit
    }

    /// Apply a partial update. Returns false when no habit has this id.
    pub fn update_habit(&mut self, id: &str, update: HabitUpdate) -> bool {
        let found = match self.habits.iter_mut().find(|h| h.id == id) {
            Some(habit) => {
                update.apply(habit);
                debug!(id, "habit updated");
                true
            }
            None => {
                debug!(id, "update skipped: habit not found");
                false
            }
        };
        self.recompute_patterns();
        found
    }

    /// Remove a habit. Returns the removed record, if any.
    pub fn delete_habit(&mut self, id: &str) -> Option<Habit> {
        let removed = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .map(|i| self.habits.remove(i));
        match &removed {
            Some(_) => debug!(id, "habit deleted"),
            None => debug!(id, "delete skipped: habit not found"),
        }
        self.recompute_patterns();
        removed
    }

    /// Case-insensitive category match.
    pub fn habits_by_category(&self, category: &str) -> Vec<&Habit> {
        let needle = category.to_lowercase();
        self.habits
            .iter()
            .filter(|h| h.category.to_lowercase() == needle)
            .collect()
    }

    /// Habits created within `[start, end]`, both ends inclusive.
    pub fn habits_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|h| h.created_at >= start && h.created_at <= end)
            .collect()
    }

    pub fn recompute_patterns(&mut self) {
        self.patterns = analyze_patterns(&self.habits, self.clock.now());
    }

    pub fn spending_insights(&self) -> SpendingInsights {
        insights::spending_insights(&self.habits, &self.patterns, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::{Duration, TimeZone};
    use std::cell::Cell;
    use std::rc::Rc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap()
    }

    fn store() -> HabitStore<FixedClock> {
        HabitStore::with_clock(FixedClock(now()))
    }

    #[test]
    fn test_add_assigns_id_and_timestamp() {
        let mut s = store();
        let a = s.add_habit(NewHabit::new("u1", "Coffee", 4.5, Frequency::Daily));
        let b = s.add_habit(NewHabit::new("u1", "Coffee", 5.0, Frequency::Daily));
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, now());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_same_category_collapses_into_one_pattern() {
        let mut s = store();
        s.add_habit(NewHabit::new("u1", "Dining", 40.0, Frequency::Weekly));
        s.add_habit(NewHabit::new("u1", "Dining", 60.0, Frequency::Monthly));

        assert_eq!(s.patterns().len(), 1);
        let p = &s.patterns()[0];
        assert_eq!(p.frequency, 2);
        assert_eq!(p.total_spent, 100.0);
        assert_eq!(p.average_amount, 50.0);
    }

    #[test]
    fn test_grouping_is_case_sensitive_but_lookup_is_not() {
        let mut s = store();
        s.add_habit(NewHabit::new("u1", "Food", 10.0, Frequency::Daily));
        s.add_habit(NewHabit::new("u1", "food", 12.0, Frequency::Daily));

        assert_eq!(s.patterns().len(), 2);
        assert_eq!(s.habits_by_category("FOOD").len(), 2);
    }

    #[test]
    fn test_trend_increasing_against_older_habit() {
        let mut s = store();
        s.add_habit_at(NewHabit::new("u1", "Fuel", 10.0, Frequency::Weekly), now() - Duration::days(40));
        s.add_habit_at(NewHabit::new("u1", "Fuel", 20.0, Frequency::Weekly), now());
        assert_eq!(s.patterns()[0].trend, Trend::Increasing);
    }

    #[test]
    fn test_trend_decreasing_and_stable() {
        let mut s = store();
        s.add_habit_at(NewHabit::new("u1", "Books", 100.0, Frequency::Monthly), now() - Duration::days(60));
        s.add_habit_at(NewHabit::new("u1", "Books", 50.0, Frequency::Monthly), now() - Duration::days(2));
        s.add_habit_at(NewHabit::new("u1", "Gym", 30.0, Frequency::Monthly), now() - Duration::days(45));
        s.add_habit_at(NewHabit::new("u1", "Gym", 31.0, Frequency::Monthly), now() - Duration::days(1));

        let trends: Vec<_> = s.patterns().iter().map(|p| (p.category.as_str(), p.trend)).collect();
        assert_eq!(trends, vec![("Books", Trend::Decreasing), ("Gym", Trend::Stable)]);
    }

    #[test]
    fn test_only_recent_habits_always_increasing() {
        let mut s = store();
        s.add_habit(NewHabit::new("u1", "Games", 1.0, Frequency::Monthly));
        assert_eq!(s.patterns()[0].trend, Trend::Increasing);
    }

    #[test]
    fn test_habit_exactly_at_cutoff_is_older() {
        let mut s = store();
        s.add_habit_at(NewHabit::new("u1", "Rent", 900.0, Frequency::Monthly), now() - Duration::days(30));
        // recent half is empty (0) vs older 900
        assert_eq!(s.patterns()[0].trend, Trend::Decreasing);
    }

    #[test]
    fn test_update_replaces_only_supplied_fields() {
        let mut s = store();
        let h = s.add_habit(
            NewHabit::new("u1", "Streaming", 15.0, Frequency::Monthly)
                .with_description("Netflix")
                .recurring(true),
        );

        let found = s.update_habit(
            &h.id,
            HabitUpdate {
                amount: Some(18.0),
                category: Some("Subscriptions".into()),
                ..Default::default()
            },
        );
        assert!(found);

        let updated = s.get(&h.id).unwrap();
        assert_eq!(updated.amount, 18.0);
        assert_eq!(updated.description, "Netflix");
        assert_eq!(updated.created_at, h.created_at);
        assert_eq!(s.patterns()[0].category, "Subscriptions");
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let mut s = store();
        s.add_habit(NewHabit::new("u1", "Coffee", 4.0, Frequency::Daily));
        assert!(!s.update_habit("nope", HabitUpdate::default()));
        assert!(s.delete_habit("nope").is_none());
        assert_eq!(s.len(), 1);
    }

    /// Clock the test can move forward between calls.
    #[derive(Clone)]
    struct SteppingClock(Rc<Cell<DateTime<Utc>>>);

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }

    #[test]
    fn test_missing_id_mutations_still_rebuild_patterns() {
        let instant = Rc::new(Cell::new(now()));
        let mut s = HabitStore::with_clock(SteppingClock(instant.clone()));
        s.add_habit(NewHabit::new("u1", "Coffee", 4.0, Frequency::Daily));
        assert_eq!(s.patterns()[0].trend, Trend::Increasing);

        // the habit ages out of the recent window
        instant.set(now() + Duration::days(45));
        assert!(!s.update_habit("nope", HabitUpdate::default()));
        assert_eq!(s.patterns()[0].trend, Trend::Decreasing);

        instant.set(now());
        assert!(s.delete_habit("nope").is_none());
        assert_eq!(s.patterns()[0].trend, Trend::Increasing);
    }

    #[test]
    fn test_delete_drops_empty_pattern() {
        let mut s = store();
        let h = s.add_habit(NewHabit::new("u1", "Coffee", 4.0, Frequency::Daily));
        s.add_habit(NewHabit::new("u1", "Rent", 1200.0, Frequency::Monthly));
        s.delete_habit(&h.id);
        let cats: Vec<_> = s.patterns().iter().map(|p| p.category.clone()).collect();
        assert_eq!(cats, vec!["Rent".to_string()]);
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut s = store();
        let start = now() - Duration::days(10);
        s.add_habit_at(NewHabit::new("u1", "A", 1.0, Frequency::Daily), start);
        s.add_habit_at(NewHabit::new("u1", "B", 1.0, Frequency::Daily), now());
        s.add_habit_at(NewHabit::new("u1", "C", 1.0, Frequency::Daily), start - Duration::seconds(1));

        let hits: Vec<_> = s.habits_in_range(start, now()).iter().map(|h| h.category.clone()).collect();
        assert_eq!(hits, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_from_habits_rebuilds_patterns() {
        let mut s = store();
        s.add_habit(NewHabit::new("u1", "Coffee", 4.0, Frequency::Daily));
        let json = serde_json::to_string(s.habits()).unwrap();

        let habits: Vec<Habit> = serde_json::from_str(&json).unwrap();
        let restored = HabitStore::from_habits_with_clock(habits, FixedClock(now()));
        assert_eq!(restored.patterns(), s.patterns());
    }

    #[test]
    fn test_frequency_normalization() {
        assert_eq!(Frequency::Weekly.monthly_equivalent(10.0), 40.0);
        assert_eq!(Frequency::Yearly.monthly_equivalent(1200.0), 100.0);
        assert_eq!(Frequency::Weekly.daily_equivalent(70.0), 10.0);
        assert_eq!("Yearly".parse::<Frequency>().unwrap(), Frequency::Yearly);
    }
}
