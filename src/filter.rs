// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction list filtering.
//!
//! Criteria live in [`TransactionFilter`]; [`TransactionQuery`] turns them
//! into SQL. Every present criterion narrows the result (logical AND).

use chrono::NaiveDate;
use rusqlite::Connection;
use rusqlite::types::Value;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::models::{FlowType, Payer, TransactionWithCategory, YearMonth};
use crate::store::{CATEGORY_COLUMNS, TRANSACTION_COLUMNS, transaction_with_category};
use crate::utils::month_bounds;

/// Month restriction of a transaction listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonthSelection {
    /// No month restriction.
    #[default]
    All,
    Month(YearMonth),
}

impl MonthSelection {
    /// Resolves the raw `month` parameter of a listing request.
    ///
    /// A missing parameter means the month containing `today`; a present but
    /// blank one means every month.
    pub fn from_param(param: Option<&str>, today: NaiveDate) -> Result<Self> {
        match param.map(str::trim) {
            None => Ok(Self::Month(YearMonth::of(today))),
            Some("") => Ok(Self::All),
            Some(s) => Ok(Self::Month(s.parse()?)),
        }
    }
}

impl Serialize for MonthSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str(""),
            Self::Month(ym) => ym.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionFilter {
    pub category_id: Option<i64>,
    /// Category given by name. A name no category carries matches nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub payer: Option<Payer>,
    #[serde(rename = "type")]
    pub flow_type: Option<FlowType>,
    /// Substring of the memo. Blank means no constraint.
    pub memo: Option<String>,
    #[serde(rename = "year_month")]
    pub month: MonthSelection,
}

/// A `SELECT` over transactions joined with their category, plus the values
/// bound to its placeholders.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    sql: String,
    params: Vec<Value>,
    order: Option<&'static str>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self {
            sql: format!(
                "SELECT {TRANSACTION_COLUMNS}, {CATEGORY_COLUMNS} FROM transactions t \
                 JOIN categories c ON t.category_id=c.id WHERE 1=1"
            ),
            params: Vec::new(),
            order: None,
        }
    }

    fn push(&mut self, clause: &str, value: Value) {
        self.sql.push_str(" AND ");
        self.sql.push_str(clause);
        self.params.push(value);
    }

    /// Narrows the query by every criterion present in `f`.
    pub fn filter(mut self, f: &TransactionFilter) -> Self {
        if let Some(id) = f.category_id {
            self.push("t.category_id=?", Value::Integer(id));
        }
        if let Some(name) = &f.category_name {
            self.push("c.name=?", Value::Text(name.clone()));
        }
        if let Some(payer) = f.payer {
            self.push("t.payer=?", Value::Text(payer.as_str().into()));
        }
        if let Some(flow) = f.flow_type {
            self.push("t.type=?", Value::Text(flow.as_str().into()));
        }
        if let Some(memo) = f.memo.as_deref().filter(|m| !m.is_empty()) {
            self.push(
                "t.memo LIKE ? ESCAPE '\\'",
                Value::Text(format!("%{}%", escape_like(memo))),
            );
        }
        if let MonthSelection::Month(ym) = f.month {
            let (start, end) = month_bounds(ym);
            self.push("t.date>=?", Value::Text(start.to_string()));
            self.push("t.date<=?", Value::Text(end.to_string()));
        }
        self
    }

    /// Newest first; same-day rows by descending id.
    pub fn newest_first(mut self) -> Self {
        self.order = Some("t.date DESC, t.id DESC");
        self
    }

    pub fn sql(&self) -> String {
        let mut sql = self.sql.clone();
        if let Some(order) = self.order {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn fetch(&self, conn: &Connection) -> Result<Vec<TransactionWithCategory>> {
        let mut stmt = conn.prepare(&self.sql())?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(self.params.iter()),
            transaction_with_category,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Applies `criteria` to `query`.
pub fn filter(query: TransactionQuery, criteria: &TransactionFilter) -> TransactionQuery {
    query.filter(criteria)
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
