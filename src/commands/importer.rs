// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{FlowType, NewCategory, NewTransaction, Payer};
use crate::store;
use crate::utils::{maybe_print_json, parse_payer, required};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Category used for rows that name none, or name one that does not exist.
pub const FALLBACK_CATEGORY: &str = "Other expense";

/// Category remapped salary rows are filed under unless overridden.
pub const SALARY_CATEGORY: &str = "Salary";

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("static regex"));

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("csv", sub)) => {
            let path = required(sub, "path")?.trim();
            let mut opts = ImportOptions::default();
            if let Some(p) = sub.get_one::<String>("payer") {
                opts.payer = parse_payer(p)?;
            }
            if let Some(name) = sub.get_one::<String>("salary-category") {
                opts.salary_category = name.trim().to_string();
            }
            if let Some(remaps) = sub.get_many::<String>("salary") {
                for r in remaps {
                    opts.salary_sources.push(parse_salary_remap(r)?);
                }
            }
            opts.create_unknown = sub.get_flag("create-categories");
            opts.force = sub.get_flag("force");

            let report = import_csv(conn, Path::new(path), &opts)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
                println!(
                    "Imported {} transactions from {} ({} rows skipped, {} categories created)",
                    report.imported, path, report.skipped, report.categories_created
                );
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Payer of every row that is not a remapped salary row.
    pub payer: Payer,
    /// Source category names that are salary income of a given payer.
    pub salary_sources: Vec<(String, Payer)>,
    pub salary_category: String,
    /// Create categories the database does not know instead of filing the
    /// row under [`FALLBACK_CATEGORY`].
    pub create_unknown: bool,
    /// Import even when transactions already exist.
    pub force: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            payer: Payer::PersonB,
            salary_sources: Vec::new(),
            salary_category: SALARY_CATEGORY.to_string(),
            create_unknown: false,
            force: false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub categories_created: usize,
}

/// Parses `NAME=PAYER`, e.g. `A salary=person_a`.
pub fn parse_salary_remap(raw: &str) -> Result<(String, Payer)> {
    let (name, payer) = raw
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Invalid salary mapping '{}', expected NAME=PAYER", raw))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid salary mapping '{}': empty category name", raw);
    }
    Ok((name.to_string(), parse_payer(payer)?))
}

/// Digits of `raw` as an amount; currency symbols and separators are dropped.
pub fn parse_amount_lenient(raw: &str) -> i64 {
    let digits = NON_DIGITS.replace_all(raw, "");
    digits.parse::<i64>().unwrap_or(0)
}

fn parse_csv_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .with_context(|| format!("Invalid date '{}', expected YYYY/MM/DD", raw))
}

struct Columns {
    date: usize,
    category: Option<usize>,
    expense: Option<usize>,
    income: Option<usize>,
    memo: Option<usize>,
}

impl Columns {
    /// Accepts English headers as well as the Japanese ones of the
    /// household-ledger app export.
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().trim_start_matches('\u{feff}');
                names.iter().any(|n| h.eq_ignore_ascii_case(n))
            })
        };
        Ok(Self {
            date: find(&["date", "日付"]).ok_or_else(|| anyhow!("CSV has no 'date' column"))?,
            category: find(&["category", "カテゴリー"]),
            expense: find(&["expense", "支出"]),
            income: find(&["income", "収入"]),
            memo: find(&["memo", "メモ"]),
        })
    }
}

fn cell(rec: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| rec.get(i)).unwrap_or("").trim()
}

/// Where a source category name ended up.
#[derive(Clone, Copy)]
struct Resolved {
    id: i64,
    /// Row was redirected to the fallback category and is booked as expense.
    fallback: bool,
}

struct CategoryResolver<'a> {
    opts: &'a ImportOptions,
    cache: HashMap<String, Resolved>,
    created: usize,
}

impl CategoryResolver<'_> {
    fn resolve(
        &mut self,
        conn: &Connection,
        name: &str,
        flow_type: FlowType,
        salary: bool,
    ) -> Result<Resolved> {
        if let Some(r) = self.cache.get(name) {
            return Ok(*r);
        }
        let resolved = match store::find_category_by_name(conn, name)? {
            Some(c) => Resolved {
                id: c.id,
                fallback: false,
            },
            None if salary || self.opts.create_unknown => Resolved {
                id: self.create(conn, name, flow_type)?,
                fallback: false,
            },
            None => {
                tracing::debug!(category = name, "unknown category, filed under fallback");
                let id = match store::find_category_by_name(conn, FALLBACK_CATEGORY)? {
                    Some(c) => c.id,
                    None => self.create(conn, FALLBACK_CATEGORY, FlowType::Expense)?,
                };
                Resolved { id, fallback: true }
            }
        };
        self.cache.insert(name.to_string(), resolved);
        Ok(resolved)
    }

    fn create(&mut self, conn: &Connection, name: &str, flow_type: FlowType) -> Result<i64> {
        let id = store::insert_category(
            conn,
            &NewCategory {
                name: name.to_string(),
                flow_type,
                icon: None,
                color: None,
            },
        )?;
        self.created += 1;
        // A later row may name the created category directly.
        self.cache.insert(name.to_string(), Resolved { id, fallback: false });
        Ok(id)
    }
}

/// Imports a household-ledger CSV export in a single SQLite transaction.
///
/// Refuses to run while transactions exist unless `opts.force` is set, so a
/// repeated import cannot book every row twice.
pub fn import_csv(conn: &mut Connection, path: &Path, opts: &ImportOptions) -> Result<ImportReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;
    let cols = Columns::from_headers(rdr.headers()?)?;

    let tx = conn.transaction()?;
    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))?;
    if existing > 0 && !opts.force {
        bail!(
            "{} transactions already exist; pass --force to import anyway",
            existing
        );
    }

    let mut categories = CategoryResolver {
        opts,
        cache: HashMap::new(),
        created: 0,
    };
    let mut report = ImportReport::default();

    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let line = line + 2;
        let date_raw = cell(&rec, Some(cols.date));
        if date_raw.is_empty() {
            report.skipped += 1;
            continue;
        }
        let income_raw = cell(&rec, cols.income);
        let (mut flow_type, amount) = if income_raw.is_empty() {
            (FlowType::Expense, parse_amount_lenient(cell(&rec, cols.expense)))
        } else {
            (FlowType::Income, parse_amount_lenient(income_raw))
        };
        let mut category = cell(&rec, cols.category).to_string();
        let mut payer = opts.payer;

        // Salary rows name the earner in the category; fold them into one
        // income category and attribute them to that payer.
        let salary_payer = opts
            .salary_sources
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, p)| *p);
        if let Some(p) = salary_payer {
            category = opts.salary_category.clone();
            flow_type = FlowType::Income;
            payer = p;
        }

        if amount <= 0 {
            tracing::debug!(line, "skipping row without amount");
            report.skipped += 1;
            continue;
        }
        let date = parse_csv_date(date_raw).with_context(|| format!("CSV line {}", line))?;

        if category.is_empty() {
            category = FALLBACK_CATEGORY.to_string();
            flow_type = FlowType::Expense;
        }
        let resolved = categories.resolve(&tx, &category, flow_type, salary_payer.is_some())?;
        if resolved.fallback {
            flow_type = FlowType::Expense;
        }

        let memo = cell(&rec, cols.memo);
        store::insert_transaction(
            &tx,
            &NewTransaction {
                date,
                flow_type,
                category_id: resolved.id,
                payer,
                amount,
                memo: Some(memo.to_string()).filter(|m| !m.is_empty()),
                recurring_transaction_id: None,
            },
        )?;
        report.imported += 1;
    }
    report.categories_created = categories.created;
    tx.commit()?;
    tracing::info!(
        path = %path.display(),
        imported = report.imported,
        skipped = report.skipped,
        "csv import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_amount_strips_symbols_and_separators() {
        assert_eq!(parse_amount_lenient("¥1,200"), 1200);
        assert_eq!(parse_amount_lenient(" 80000 "), 80000);
        assert_eq!(parse_amount_lenient(""), 0);
        assert_eq!(parse_amount_lenient("n/a"), 0);
    }

    #[test]
    fn csv_dates_accept_slashes_and_dashes() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(parse_csv_date("2025/04/01").unwrap(), d);
        assert_eq!(parse_csv_date("2025-04-01").unwrap(), d);
        assert!(parse_csv_date("04/01/2025").is_err());
    }

    #[test]
    fn salary_remaps_parse_name_and_payer() {
        assert_eq!(
            parse_salary_remap("A salary=person_a").unwrap(),
            ("A salary".to_string(), Payer::PersonA)
        );
        assert_eq!(
            parse_salary_remap("x=y=person_b").unwrap(),
            ("x=y".to_string(), Payer::PersonB)
        );
        assert!(parse_salary_remap("A salary").is_err());
        assert!(parse_salary_remap("=person_a").is_err());
        assert!(parse_salary_remap("A salary=nobody").is_err());
    }
}
