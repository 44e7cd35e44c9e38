// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use numfmt::{Formatter, Precision};
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{FlowType, Payer, YearMonth};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_year_month(s: &str) -> Result<YearMonth> {
    Ok(s.parse::<YearMonth>()?)
}

/// Parses a positive amount in the smallest currency unit.
pub fn parse_amount(s: &str) -> Result<i64> {
    let amount = s
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid amount '{}', expected a whole number", s))?;
    if amount <= 0 {
        return Err(anyhow!("Amount must be greater than zero, got {}", amount));
    }
    Ok(amount)
}

pub fn parse_flow_type(s: &str) -> Result<FlowType> {
    Ok(s.parse::<FlowType>()?)
}

pub fn parse_payer(s: &str) -> Result<Payer> {
    Ok(s.parse::<Payer>()?)
}

pub fn parse_id(s: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", s))
}

pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("Missing required argument --{}", name))
}

/// Trims an optional CLI value, treating blank input as absent.
pub fn non_empty(v: Option<&String>) -> Option<String> {
    v.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

static THOUSANDS: Lazy<Formatter> = Lazy::new(|| {
    Formatter::new()
        .separator(',')
        .expect("single-byte separator")
        .precision(Precision::Decimals(0))
});

/// Whole amount with `,` thousands separators, e.g. `-1,234,567`.
pub fn fmt_amount(amount: i64) -> String {
    let digits = THOUSANDS.fmt_string(amount.unsigned_abs());
    if amount < 0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Resolves a category given either its name or its numeric id.
pub fn id_for_category(conn: &Connection, name_or_id: &str) -> Result<i64> {
    let key = name_or_id.trim();
    let by_name: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE name=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = by_name {
        return Ok(id);
    }
    if let Ok(id) = key.parse::<i64>() {
        let exists: Option<i64> = conn
            .query_row("SELECT id FROM categories WHERE id=?1", params![id], |r| {
                r.get(0)
            })
            .optional()?;
        if let Some(id) = exists {
            return Ok(id);
        }
    }
    Err(anyhow!("Category '{}' not found", key))
}

pub fn get_setting(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM settings WHERE key=?1",
        params![key],
        |r| r.get(0),
    )
    .optional()
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// First and last calendar day of `ym`, both inclusive.
pub fn month_bounds(ym: YearMonth) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(ym.year(), ym.month(), 1)
        .unwrap_or(NaiveDate::MIN);
    let next = if ym.month() == 12 {
        NaiveDate::from_ymd_opt(ym.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(ym.year(), ym.month() + 1, 1)
    };
    let last = next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX);
    debug_assert_eq!(last.month(), ym.month());
    (first, last)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
