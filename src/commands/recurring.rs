// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{DayOfMonth, NewRecurringTransaction};
use crate::recurring::generate;
use crate::utils::{
    fmt_amount, id_for_category, maybe_print_json, non_empty, parse_amount, parse_date,
    parse_flow_type, parse_id, parse_payer, pretty_table, required, today,
};
use crate::store;
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            store::delete_recurring(conn, id)?;
            println!("Removed recurring transaction {}", id);
        }
        Some(("generate", sub)) => run_generate(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_day(s: &str) -> Result<DayOfMonth> {
    let day = s
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid day of month '{}'", s))?;
    Ok(DayOfMonth::new(day)?)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let r = NewRecurringTransaction {
        name: required(sub, "name")?.trim().to_string(),
        day_of_month: parse_day(required(sub, "day")?)?,
        flow_type: parse_flow_type(required(sub, "type")?)?,
        category_id: id_for_category(conn, required(sub, "category")?)?,
        payer: parse_payer(required(sub, "payer")?)?,
        amount: parse_amount(required(sub, "amount")?)?,
        memo: non_empty(sub.get_one::<String>("memo")),
        is_active: !sub.get_flag("inactive"),
    };
    let id = store::insert_recurring(conn, &r)?;
    println!(
        "Added recurring '{}' on day {} for {} (id {})",
        r.name,
        r.day_of_month,
        fmt_amount(r.amount),
        id
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(required(sub, "id")?)?;
    let cur = store::get_recurring(conn, id)?;
    let mut r = NewRecurringTransaction {
        name: cur.name,
        day_of_month: cur.day_of_month,
        flow_type: cur.flow_type,
        category_id: cur.category_id,
        payer: cur.payer,
        amount: cur.amount,
        memo: cur.memo,
        is_active: cur.is_active,
    };
    if let Some(v) = non_empty(sub.get_one::<String>("name")) {
        r.name = v;
    }
    if let Some(v) = sub.get_one::<String>("day") {
        r.day_of_month = parse_day(v)?;
    }
    if let Some(v) = sub.get_one::<String>("type") {
        r.flow_type = parse_flow_type(v)?;
    }
    if let Some(v) = sub.get_one::<String>("category") {
        r.category_id = id_for_category(conn, v)?;
    }
    if let Some(v) = sub.get_one::<String>("payer") {
        r.payer = parse_payer(v)?;
    }
    if let Some(v) = sub.get_one::<String>("amount") {
        r.amount = parse_amount(v)?;
    }
    if let Some(v) = sub.get_one::<String>("memo") {
        r.memo = Some(v.trim().to_string()).filter(|s| !s.is_empty());
    }
    if let Some(active) = sub.get_one::<bool>("active") {
        r.is_active = *active;
    }
    store::update_recurring(conn, id, &r)?;
    println!("Updated recurring transaction {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rules = store::list_recurring(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rules)? {
        return Ok(());
    }
    let names: std::collections::HashMap<i64, String> = store::list_categories(conn)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let rows = rules
        .into_iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.day_of_month.to_string(),
                r.name,
                r.flow_type.label().to_string(),
                names.get(&r.category_id).cloned().unwrap_or_default(),
                r.payer.to_string(),
                fmt_amount(r.amount),
                r.memo.unwrap_or_default(),
                if r.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Day", "Name", "Type", "Category", "Payer", "Amount", "Memo", "Active"],
            rows,
        )
    );
    Ok(())
}

fn run_generate(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let outcome = generate(conn, date)
        .with_context(|| format!("Generate recurring transactions for {}", date))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &outcome)? {
        println!(
            "{}: created {}, skipped {}",
            outcome.date, outcome.created, outcome.skipped
        );
    }
    Ok(())
}
