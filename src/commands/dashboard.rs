// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use crate::balance::{Balance, PayerBalance, balance, daily_balances, payer_balances};
use crate::config::{PayerLabels, PayerOption, payer_options};
use crate::models::{Category, Payer, TransactionWithCategory, YearMonth};
use crate::store;
use crate::utils::{fmt_amount, maybe_print_json, parse_date, pretty_table, required, today};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("month", sub)) => {
            let now = today();
            let year = sub.get_one::<i32>("year").copied().unwrap_or(now.year());
            let month = sub.get_one::<u32>("month").copied().unwrap_or(now.month());
            let labels = PayerLabels::load(conn)?;
            let view = month_view(conn, YearMonth::new(year, month)?, &labels)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
                print_month(&view);
            }
        }
        Some(("day", sub)) => {
            let date = parse_date(required(sub, "date")?)?;
            let view = day_view(conn, date)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
                print_day(&view);
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub daily_balances: BTreeMap<u32, Balance>,
    pub monthly_balance: Balance,
    pub payer_balances: BTreeMap<Payer, PayerBalance>,
    pub categories: Vec<Category>,
    pub payers: Vec<PayerOption>,
}

#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub transactions: Vec<TransactionWithCategory>,
}

pub fn month_view(conn: &Connection, ym: YearMonth, labels: &PayerLabels) -> Result<MonthView> {
    let txs = store::find_by_month(conn, ym)?;
    tracing::debug!(month = %ym, count = txs.len(), "loaded month");
    Ok(MonthView {
        year: ym.year(),
        month: ym.month(),
        daily_balances: daily_balances(&txs),
        monthly_balance: balance(&txs),
        payer_balances: payer_balances(&txs, labels),
        categories: store::list_categories(conn)?,
        payers: payer_options(labels),
    })
}

pub fn day_view(conn: &Connection, date: NaiveDate) -> Result<DayView> {
    Ok(DayView {
        date,
        transactions: store::find_by_date(conn, date)?,
    })
}

fn print_month(view: &MonthView) {
    let rows = view
        .daily_balances
        .iter()
        .map(|(day, b)| {
            vec![
                format!("{:04}-{:02}-{:02}", view.year, view.month, day),
                fmt_amount(b.income),
                fmt_amount(b.expense),
                fmt_amount(b.balance),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Day", "Income", "Expense", "Balance"], rows)
    );
    let m = &view.monthly_balance;
    println!(
        "{:04}-{:02} total: income {}, expense {}, balance {}",
        view.year,
        view.month,
        fmt_amount(m.income),
        fmt_amount(m.expense),
        fmt_amount(m.balance)
    );
    for pb in view.payer_balances.values() {
        println!("  {}: {}", pb.label, fmt_amount(pb.balance));
    }
}

fn print_day(view: &DayView) {
    let rows = view
        .transactions
        .iter()
        .map(|r| {
            vec![
                r.transaction.id.to_string(),
                r.transaction.flow_type.label().to_string(),
                r.category.name.clone(),
                r.transaction.payer.to_string(),
                fmt_amount(r.transaction.amount),
                r.transaction.memo.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!("{}", view.date);
    println!(
        "{}",
        pretty_table(&["ID", "Type", "Category", "Payer", "Amount", "Memo"], rows)
    );
}
