//! CSV exchange for ledger transactions.
//!
//! Format (one header row):
//! Date,Description,Category,Type,Amount
//!
//! Dates are YYYY-MM-DD calendar days in the caller's timezone; an imported
//! row lands at local midnight. Amounts have two decimals.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use finavatar_core::time::local_midnight_utc;
use tracing::warn;

use crate::ledger::{Ledger, UNCATEGORIZED};
use crate::records::{NewTransaction, TransactionType};

pub const HEADER: [&str; 5] = ["Date", "Description", "Category", "Type", "Amount"];

/// Write the given transactions (or all of them) as CSV.
pub fn write_csv<W: Write>(ledger: &Ledger, ids: Option<&[String]>, tz: Tz, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;

    for t in ledger.transactions() {
        if let Some(ids) = ids {
            if !ids.contains(&t.id) {
                continue;
            }
        }
        wtr.write_record([
            t.transaction_date.with_timezone(&tz).format("%Y-%m-%d").to_string(),
            t.description.clone(),
            ledger.category_name(t).to_string(),
            t.transaction_type.as_str().to_string(),
            format!("{:.2}", t.amount),
        ])?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

/// Export every transaction to a file.
pub fn export_csv(ledger: &Ledger, path: impl AsRef<Path>, tz: Tz) -> Result<usize> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(ledger, None, tz, file)?;
    Ok(ledger.transactions().len())
}

/// Import rows into the ledger, creating categories by name as needed.
/// Rows with an unparseable date, type, or amount are skipped.
pub fn import_csv<R: Read>(
    ledger: &mut Ledger,
    input: R,
    user_id: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(input);

    let mut imported = 0;
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading csv row {}", line + 2))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let Ok(date) = NaiveDate::parse_from_str(field(0), "%Y-%m-%d") else {
            warn!(row = line + 2, "skipping row: bad date");
            continue;
        };
        let Ok(kind) = field(3).parse::<TransactionType>() else {
            warn!(row = line + 2, "skipping row: bad type");
            continue;
        };
        let amount: f64 = match field(4).parse() {
            Ok(a) if a > 0.0 => a,
            _ => {
                warn!(row = line + 2, "skipping row: bad amount");
                continue;
            }
        };

        let category_name = field(2);
        let category_id = if category_name.is_empty() || category_name == UNCATEGORIZED {
            None
        } else {
            let id = match ledger.category_by_name(category_name) {
                Some(c) => c.id.clone(),
                None => ledger.add_category(Some(user_id.to_string()), category_name, 0.0, now).id,
            };
            Some(id)
        };

        let when = match local_midnight_utc(date, tz) {
            Ok(w) => w,
            Err(e) => {
                warn!(row = line + 2, error = %e, "skipping row: no local midnight");
                continue;
            }
        };
        let mut data = match kind {
            TransactionType::Income => NewTransaction::income(user_id, amount, when),
            TransactionType::Expense => NewTransaction::expense(user_id, amount, when),
        }
        .with_description(field(1));
        data.category_id = category_id;

        ledger.add_transaction(data, now);
        imported += 1;
    }

    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_export_format() {
        let mut l = Ledger::with_default_categories(now());
        l.add_transaction(
            NewTransaction::expense("u1", 45.5, Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap())
                .with_category("1")
                .with_description("Lunch, downtown"),
            now(),
        );

        let mut buf = Vec::new();
        write_csv(&l, None, Tz::UTC, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Date,Description,Category,Type,Amount");
        assert_eq!(lines[1], "2026-02-10,\"Lunch, downtown\",Food & Dining,expense,45.50");
    }

    #[test]
    fn test_import_creates_categories_and_skips_bad_rows() {
        let csv = "Date,Description,Category,Type,Amount\n\
                   2026-02-01,Payroll,,income,4200\n\
                   2026-02-03,Groceries,food & dining,expense,82.10\n\
                   2026-02-04,Concert,Live Music,expense,60\n\
                   not-a-date,Broken,,expense,10\n\
                   2026-02-05,Refund?,,transfer,10\n\
                   2026-02-06,Zero,,expense,0\n";

        let mut l = Ledger::with_default_categories(now());
        let n = import_csv(&mut l, csv.as_bytes(), "u1", Tz::UTC, now()).unwrap();
        assert_eq!(n, 3);
        assert_eq!(l.categories().len(), 4);
        assert!(l.category_by_name("Live Music").is_some());

        let groceries = l.transactions().iter().find(|t| t.description == "Groceries").unwrap();
        assert_eq!(groceries.category_id.as_deref(), Some("1"));
        let payroll = l.transactions().iter().find(|t| t.description == "Payroll").unwrap();
        assert!(payroll.is_income());
        assert_eq!(payroll.category_id, None);
    }

    #[test]
    fn test_dates_are_local_calendar_days() {
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        let chicago: Tz = "America/Chicago".parse().unwrap();
        let mut l = Ledger::new();
        // 2026-03-01 00:00 in Tokyo is still Feb 28 in UTC
        let first = local_midnight_utc(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), tokyo).unwrap();
        l.add_transaction(NewTransaction::expense("u1", 12.0, first), now());

        let mut buf = Vec::new();
        write_csv(&l, None, tokyo, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("2026-03-01,"));

        let mut back = Ledger::new();
        import_csv(&mut back, text.as_bytes(), "u1", tokyo, now()).unwrap();
        assert_eq!(back.transactions()[0].transaction_date, first);

        let mut central = Ledger::new();
        import_csv(&mut central, "Date,Description,Category,Type,Amount\n2026-03-01,Rent,,expense,900\n".as_bytes(), "u1", chicago, now()).unwrap();
        assert_eq!(
            central.transactions()[0].transaction_date,
            Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap()
        );
    }
}
