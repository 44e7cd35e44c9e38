// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::balance::{Summary, summarize};
use crate::filter::{MonthSelection, TransactionFilter, TransactionQuery};
use crate::models::{NewTransaction, TransactionWithCategory, YearMonth};
use crate::store;
use crate::utils::{
    fmt_amount, id_for_category, maybe_print_json, non_empty, parse_amount, parse_date,
    parse_flow_type, parse_id, parse_payer, pretty_table, required, today,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            store::delete_transaction(conn, id)?;
            println!("Removed transaction {}", id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let t = NewTransaction {
        date: parse_date(required(sub, "date")?)?,
        flow_type: parse_flow_type(required(sub, "type")?)?,
        category_id: id_for_category(conn, required(sub, "category")?)?,
        payer: parse_payer(required(sub, "payer")?)?,
        amount: parse_amount(required(sub, "amount")?)?,
        memo: non_empty(sub.get_one::<String>("memo")),
        recurring_transaction_id: None,
    };
    let id = store::insert_transaction(conn, &t)?;
    tracing::debug!(id, date = %t.date, amount = t.amount, "transaction recorded");
    println!(
        "Recorded {} {} on {} (id {})",
        t.flow_type,
        fmt_amount(t.amount),
        t.date,
        id
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(required(sub, "id")?)?;
    let cur = store::get_transaction(conn, id)?;
    let mut t = NewTransaction {
        date: cur.date,
        flow_type: cur.flow_type,
        category_id: cur.category_id,
        payer: cur.payer,
        amount: cur.amount,
        memo: cur.memo,
        recurring_transaction_id: cur.recurring_transaction_id,
    };
    if let Some(v) = sub.get_one::<String>("date") {
        t.date = parse_date(v)?;
    }
    if let Some(v) = sub.get_one::<String>("type") {
        t.flow_type = parse_flow_type(v)?;
    }
    if let Some(v) = sub.get_one::<String>("category") {
        t.category_id = id_for_category(conn, v)?;
    }
    if let Some(v) = sub.get_one::<String>("payer") {
        t.payer = parse_payer(v)?;
    }
    if let Some(v) = sub.get_one::<String>("amount") {
        t.amount = parse_amount(v)?;
    }
    if let Some(v) = sub.get_one::<String>("memo") {
        t.memo = Some(v.trim().to_string()).filter(|s| !s.is_empty());
    }
    store::update_transaction(conn, id, &t)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let listing = query_listing(conn, sub, today())?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &listing)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = listing
        .transactions
        .iter()
        .map(|r| {
            let t = &r.transaction;
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.flow_type.label().to_string(),
                r.category.name.clone(),
                t.payer.to_string(),
                fmt_amount(t.amount),
                t.memo.clone().unwrap_or_default(),
                t.recurring_transaction_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Type", "Category", "Payer", "Amount", "Memo", "Rule"],
            rows,
        )
    );
    let month = match listing.filters.month {
        MonthSelection::All => "all months".to_string(),
        MonthSelection::Month(ym) => ym.to_string(),
    };
    println!(
        "{}: income {}, expense {}",
        month,
        fmt_amount(listing.summary.income),
        fmt_amount(listing.summary.expense)
    );
    if let Some(months) = &listing.months {
        let months: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        println!("Months: {}", months.join(", "));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionListing {
    pub transactions: Vec<TransactionWithCategory>,
    pub filters: TransactionFilter,
    /// Totals over every filtered row, before `--limit` applies.
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<YearMonth>>,
}

/// Builds filter criteria from `tx list` arguments.
pub fn filter_from_args(
    conn: &Connection,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<TransactionFilter> {
    // An unknown category narrows the listing to nothing rather than failing.
    let (category_id, category_name) = match non_empty(sub.get_one::<String>("category")) {
        None => (None, None),
        Some(c) => match store::find_category_by_name(conn, &c)? {
            Some(found) => (Some(found.id), None),
            None => match c.parse::<i64>() {
                Ok(id) => (Some(id), None),
                Err(_) => (None, Some(c)),
            },
        },
    };
    Ok(TransactionFilter {
        category_id,
        category_name,
        payer: non_empty(sub.get_one::<String>("payer"))
            .map(|p| parse_payer(&p))
            .transpose()?,
        flow_type: non_empty(sub.get_one::<String>("type"))
            .map(|t| parse_flow_type(&t))
            .transpose()?,
        memo: non_empty(sub.get_one::<String>("memo")),
        month: MonthSelection::from_param(
            sub.get_one::<String>("month").map(String::as_str),
            today,
        )?,
    })
}

pub fn query_listing(
    conn: &Connection,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<TransactionListing> {
    let filters = filter_from_args(conn, sub, today)?;
    let mut transactions = TransactionQuery::new()
        .filter(&filters)
        .newest_first()
        .fetch(conn)?;
    let summary = summarize(transactions.iter().map(|r| &r.transaction));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        transactions.truncate(*limit);
    }
    let months = if sub.get_flag("months") {
        Some(month_options(conn, today)?)
    } else {
        None
    };
    Ok(TransactionListing {
        transactions,
        filters,
        summary,
        months,
    })
}

/// Year-months with transactions, newest first, always including the month
/// of `today`.
pub fn month_options(conn: &Connection, today: NaiveDate) -> Result<Vec<YearMonth>> {
    let mut months = store::distinct_year_months(conn)?;
    let current = YearMonth::of(today);
    if !months.contains(&current) {
        months.push(current);
        months.sort_by(|a, b| b.cmp(a));
    }
    Ok(months)
}
