// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Materializes recurring rules into transactions.

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use crate::error::Result;
use crate::models::YearMonth;
use crate::store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub date: NaiveDate,
    pub created: usize,
    pub skipped: usize,
}

/// Creates this month's transaction for every active rule that fires on
/// `target`'s day of month.
///
/// A rule that already produced a transaction in `target`'s month is
/// skipped, so re-running for the same date is harmless. All inserts share
/// one SQLite transaction: on error nothing is committed.
pub fn generate(conn: &mut Connection, target: NaiveDate) -> Result<GenerationOutcome> {
    let period = YearMonth::of(target);
    let tx = conn.transaction()?;

    let rules = store::active_rules_for_day(&tx, target.day())?;
    let mut created = 0;
    let mut skipped = 0;
    for rule in &rules {
        if store::generated_in_month(&tx, rule.id, period)? {
            tracing::debug!(rule_id = rule.id, name = %rule.name, "already generated this month, skipping");
            skipped += 1;
            continue;
        }
        let id = store::insert_transaction(&tx, &rule.materialize(target))?;
        tracing::debug!(rule_id = rule.id, name = %rule.name, transaction_id = id, "generated");
        created += 1;
    }
    tx.commit()?;

    tracing::info!(date = %target, created, skipped, "recurring generation finished");
    Ok(GenerationOutcome {
        date: target,
        created,
        skipped,
    })
}
