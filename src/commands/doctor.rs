// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let issues = find_issues(conn)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn find_issues(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Transactions pointing at a missing category
    let mut stmt = conn.prepare(
        "SELECT t.id, t.category_id FROM transactions t
         LEFT JOIN categories c ON t.category_id=c.id
         WHERE c.id IS NULL ORDER BY t.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let cat: i64 = r.get(1)?;
        issues.push(Issue {
            kind: "missing_category",
            detail: format!("transaction {} -> category {}", id, cat),
        });
    }

    // 2) Provenance links to deleted rules
    let mut stmt = conn.prepare(
        "SELECT t.id, t.recurring_transaction_id FROM transactions t
         LEFT JOIN recurring_transactions r ON t.recurring_transaction_id=r.id
         WHERE t.recurring_transaction_id IS NOT NULL AND r.id IS NULL ORDER BY t.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let rule: i64 = r.get(1)?;
        issues.push(Issue {
            kind: "missing_rule",
            detail: format!("transaction {} -> recurring {}", id, rule),
        });
    }

    // 3) A rule generated more than once in the same month
    let mut stmt = conn.prepare(
        "SELECT recurring_transaction_id, substr(date,1,7) AS ym, COUNT(*) FROM transactions
         WHERE recurring_transaction_id IS NOT NULL
         GROUP BY recurring_transaction_id, ym HAVING COUNT(*) > 1
         ORDER BY recurring_transaction_id, ym",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let rule: i64 = r.get(0)?;
        let ym: String = r.get(1)?;
        let n: i64 = r.get(2)?;
        issues.push(Issue {
            kind: "duplicate_generation",
            detail: format!("recurring {} has {} transactions in {}", rule, n, ym),
        });
    }

    // 4) Flow type differing from the category's nominal type; allowed, but
    // usually a typo
    let mut stmt = conn.prepare(
        "SELECT t.id, t.type, c.name, c.type FROM transactions t
         JOIN categories c ON t.category_id=c.id
         WHERE t.type != c.type ORDER BY t.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let t_type: String = r.get(1)?;
        let cat: String = r.get(2)?;
        let c_type: String = r.get(3)?;
        issues.push(Issue {
            kind: "type_mismatch",
            detail: format!("transaction {} is {} in {} category '{}'", id, t_type, c_type, cat),
        });
    }

    Ok(issues)
}
