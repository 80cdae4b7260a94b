use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use finavatar_core::{FinancialSnapshot, Habit};
use finavatar_ledger::Ledger;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// `$FINAVATAR_HOME`, else `~/.finavatar`
pub fn finavatar_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("FINAVATAR_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".finavatar"))
}

pub fn ensure_finavatar_home() -> Result<PathBuf> {
    let dir = finavatar_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// JSON files backing the habit store, the ledger and the saved snapshot.
#[derive(Debug, Clone)]
pub struct StateDir {
    dir: PathBuf,
}

impl StateDir {
    pub fn open() -> Result<Self> {
        Ok(Self::at(ensure_finavatar_home()?))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn load_habits(&self) -> Result<Vec<Habit>> {
        Ok(read_json(&self.path("habits.json"))?.unwrap_or_default())
    }

    pub fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        write_json(&self.path("habits.json"), &habits)
    }

    /// A fresh ledger starts with the built-in categories.
    pub fn load_ledger(&self, now: DateTime<Utc>) -> Result<Ledger> {
        Ok(read_json(&self.path("ledger.json"))?.unwrap_or_else(|| Ledger::with_default_categories(now)))
    }

    pub fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        write_json(&self.path("ledger.json"), ledger)
    }

    pub fn load_snapshot(&self) -> Result<Option<FinancialSnapshot>> {
        read_json(&self.path("snapshot.json"))
    }

    pub fn save_snapshot(&self, snapshot: &FinancialSnapshot) -> Result<()> {
        write_json(&self.path("snapshot.json"), snapshot)
    }
}

fn read_json<T: DeserializeOwned>(p: &Path) -> Result<Option<T>> {
    if !p.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let v = serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    Ok(Some(v))
}

fn write_json<T: Serialize + ?Sized>(p: &Path, value: &T) -> Result<()> {
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use finavatar_core::{Frequency, GoalProfile, HabitStore, NewHabit};

    fn temp_state(name: &str) -> StateDir {
        let dir = std::env::temp_dir().join(format!("finavatar-state-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        StateDir::at(dir)
    }

    #[test]
    fn test_missing_files_load_defaults() {
        let s = temp_state("defaults");
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(s.load_habits().unwrap().is_empty());
        assert!(s.load_snapshot().unwrap().is_none());
        assert_eq!(s.load_ledger(now).unwrap().categories().len(), 3);
    }

    #[test]
    fn test_habits_and_snapshot_persist() {
        let s = temp_state("persist");
        let mut store = HabitStore::new();
        store.add_habit(NewHabit::new("u1", "Coffee", 4.5, Frequency::Daily));
        s.save_habits(store.habits()).unwrap();

        let reloaded = HabitStore::from_habits(s.load_habits().unwrap());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.patterns()[0].category, "Coffee");

        let snap = FinancialSnapshot {
            monthly_income: 5000.0,
            monthly_expenses: 3000.0,
            savings: 10000.0,
            debt: 2000.0,
            investments: 5000.0,
            goal_profile: GoalProfile::Moderate,
        };
        s.save_snapshot(&snap).unwrap();
        assert_eq!(s.load_snapshot().unwrap(), Some(snap));

        let _ = fs::remove_dir_all(&s.dir);
    }
}
