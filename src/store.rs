// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence for categories, transactions and recurring transactions.
//!
//! Every function takes a plain `&Connection`, so callers can pass either a
//! connection or an open `rusqlite::Transaction`.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{Error, Result};
use crate::models::{
    Category, NewCategory, NewRecurringTransaction, NewTransaction, RecurringTransaction,
    Transaction, TransactionWithCategory, YearMonth,
};
use crate::utils::month_bounds;

pub(crate) const TRANSACTION_COLUMNS: &str =
    "t.id, t.date, t.type, t.category_id, t.payer, t.amount, t.memo, t.recurring_transaction_id";
pub(crate) const CATEGORY_COLUMNS: &str = "c.id, c.name, c.type, c.icon, c.color";
const RECURRING_COLUMNS: &str =
    "id, name, day_of_month, type, category_id, payer, amount, memo, is_active";

/// Categories seeded into an empty database, as `(name, type)`.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Food", "expense"),
    ("Rent", "expense"),
    ("Utilities", "expense"),
    ("Insurance", "expense"),
    ("Household goods", "expense"),
    ("Sundries", "expense"),
    ("Dates", "expense"),
    ("Special expenses", "expense"),
    ("Other expense", "expense"),
    ("Salary", "income"),
    ("Bonus", "income"),
    ("Other income", "income"),
];

pub(crate) fn category_at(r: &Row, offset: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(offset)?,
        name: r.get(offset + 1)?,
        flow_type: r.get(offset + 2)?,
        icon: r.get(offset + 3)?,
        color: r.get(offset + 4)?,
    })
}

pub(crate) fn transaction_at(r: &Row, offset: usize) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(offset)?,
        date: r.get(offset + 1)?,
        flow_type: r.get(offset + 2)?,
        category_id: r.get(offset + 3)?,
        payer: r.get(offset + 4)?,
        amount: r.get(offset + 5)?,
        memo: r.get(offset + 6)?,
        recurring_transaction_id: r.get(offset + 7)?,
    })
}

/// Maps a row selected as `TRANSACTION_COLUMNS, CATEGORY_COLUMNS`.
pub(crate) fn transaction_with_category(r: &Row) -> rusqlite::Result<TransactionWithCategory> {
    Ok(TransactionWithCategory {
        transaction: transaction_at(r, 0)?,
        category: category_at(r, 8)?,
    })
}

fn recurring_from_row(r: &Row) -> rusqlite::Result<RecurringTransaction> {
    Ok(RecurringTransaction {
        id: r.get(0)?,
        name: r.get(1)?,
        day_of_month: r.get(2)?,
        flow_type: r.get(3)?,
        category_id: r.get(4)?,
        payer: r.get(5)?,
        amount: r.get(6)?,
        memo: r.get(7)?,
        is_active: r.get(8)?,
    })
}

fn expect_changed(changed: usize, entity: &'static str, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(Error::NotFound { entity, id });
    }
    Ok(())
}

// Categories

pub fn insert_category(conn: &Connection, c: &NewCategory) -> Result<i64> {
    c.validate()?;
    conn.execute(
        "INSERT INTO categories(name, type, icon, color) VALUES (?1, ?2, ?3, ?4)",
        params![c.name.trim(), c.flow_type, c.icon, c.color],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_category(conn: &Connection, id: i64, c: &NewCategory) -> Result<()> {
    c.validate()?;
    let changed = conn.execute(
        "UPDATE categories SET name=?1, type=?2, icon=?3, color=?4, updated_at=datetime('now')
         WHERE id=?5",
        params![c.name.trim(), c.flow_type, c.icon, c.color, id],
    )?;
    expect_changed(changed, "category", id)
}

/// Deletes a category nobody references.
///
/// Fails with [`Error::CategoryInUse`] while any transaction or recurring
/// rule still points at it.
pub fn delete_category(conn: &Connection, id: i64) -> Result<()> {
    let transactions: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE category_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    let rules: i64 = conn.query_row(
        "SELECT COUNT(*) FROM recurring_transactions WHERE category_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if transactions > 0 || rules > 0 {
        return Err(Error::CategoryInUse {
            id,
            transactions,
            rules,
        });
    }
    let changed = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    expect_changed(changed, "category", id)
}

pub fn get_category(conn: &Connection, id: i64) -> Result<Category> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id=?1");
    conn.query_row(&sql, params![id], |r| category_at(r, 0))
        .optional()?
        .ok_or(Error::NotFound {
            entity: "category",
            id,
        })
}

pub fn find_category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.name=?1");
    Ok(conn
        .query_row(&sql, params![name.trim()], |r| category_at(r, 0))
        .optional()?)
}

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c ORDER BY c.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |r| category_at(r, 0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Inserts [`DEFAULT_CATEGORIES`] when no category exists yet. Returns how
/// many were inserted.
pub fn seed_default_categories(conn: &Connection) -> Result<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if existing > 0 {
        return Ok(0);
    }
    let mut stmt = conn.prepare("INSERT INTO categories(name, type) VALUES (?1, ?2)")?;
    for (name, flow) in DEFAULT_CATEGORIES {
        stmt.execute(params![name, flow])?;
    }
    Ok(DEFAULT_CATEGORIES.len())
}

// Transactions

pub fn insert_transaction(conn: &Connection, t: &NewTransaction) -> Result<i64> {
    t.validate()?;
    conn.execute(
        "INSERT INTO transactions(date, type, category_id, payer, amount, memo, recurring_transaction_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            t.date,
            t.flow_type,
            t.category_id,
            t.payer,
            t.amount,
            t.memo,
            t.recurring_transaction_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites the editable fields. The provenance link is left untouched.
pub fn update_transaction(conn: &Connection, id: i64, t: &NewTransaction) -> Result<()> {
    t.validate()?;
    let changed = conn.execute(
        "UPDATE transactions SET date=?1, type=?2, category_id=?3, payer=?4, amount=?5, memo=?6,
         updated_at=datetime('now') WHERE id=?7",
        params![
            t.date,
            t.flow_type,
            t.category_id,
            t.payer,
            t.amount,
            t.memo,
            id
        ],
    )?;
    expect_changed(changed, "transaction", id)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    expect_changed(changed, "transaction", id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.id=?1");
    conn.query_row(&sql, params![id], |r| transaction_at(r, 0))
        .optional()?
        .ok_or(Error::NotFound {
            entity: "transaction",
            id,
        })
}

/// Transactions dated within `[start, end]`, oldest first.
pub fn find_by_date_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions t
         WHERE t.date BETWEEN ?1 AND ?2 ORDER BY t.date, t.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![start, end], |r| transaction_at(r, 0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn find_by_month(conn: &Connection, ym: YearMonth) -> Result<Vec<Transaction>> {
    let (start, end) = month_bounds(ym);
    find_by_date_range(conn, start, end)
}

/// Transactions on `date` with their category attached.
pub fn find_by_date(conn: &Connection, date: NaiveDate) -> Result<Vec<TransactionWithCategory>> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS}, {CATEGORY_COLUMNS} FROM transactions t
         JOIN categories c ON t.category_id=c.id
         WHERE t.date=?1 ORDER BY t.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![date], transaction_with_category)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Every year-month with at least one transaction, newest first.
pub fn distinct_year_months(conn: &Connection) -> Result<Vec<YearMonth>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT substr(date, 1, 7) AS ym FROM transactions ORDER BY ym DESC",
    )?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.parse::<YearMonth>()?);
    }
    Ok(out)
}

// Recurring transactions

pub fn insert_recurring(conn: &Connection, r: &NewRecurringTransaction) -> Result<i64> {
    r.validate()?;
    conn.execute(
        "INSERT INTO recurring_transactions(name, day_of_month, type, category_id, payer, amount, memo, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            r.name.trim(),
            r.day_of_month,
            r.flow_type,
            r.category_id,
            r.payer,
            r.amount,
            r.memo,
            r.is_active
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_recurring(conn: &Connection, id: i64, r: &NewRecurringTransaction) -> Result<()> {
    r.validate()?;
    let changed = conn.execute(
        "UPDATE recurring_transactions SET name=?1, day_of_month=?2, type=?3, category_id=?4,
         payer=?5, amount=?6, memo=?7, is_active=?8, updated_at=datetime('now') WHERE id=?9",
        params![
            r.name.trim(),
            r.day_of_month,
            r.flow_type,
            r.category_id,
            r.payer,
            r.amount,
            r.memo,
            r.is_active,
            id
        ],
    )?;
    expect_changed(changed, "recurring transaction", id)
}

/// Deletes a rule. Transactions it generated stay; their provenance link is
/// cleared by the `ON DELETE SET NULL` constraint.
pub fn delete_recurring(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM recurring_transactions WHERE id=?1",
        params![id],
    )?;
    expect_changed(changed, "recurring transaction", id)
}

pub fn get_recurring(conn: &Connection, id: i64) -> Result<RecurringTransaction> {
    let sql = format!("SELECT {RECURRING_COLUMNS} FROM recurring_transactions WHERE id=?1");
    conn.query_row(&sql, params![id], recurring_from_row)
        .optional()?
        .ok_or(Error::NotFound {
            entity: "recurring transaction",
            id,
        })
}

/// All rules, in the order they fire within a month.
pub fn list_recurring(conn: &Connection) -> Result<Vec<RecurringTransaction>> {
    let sql = format!(
        "SELECT {RECURRING_COLUMNS} FROM recurring_transactions ORDER BY day_of_month, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], recurring_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Active rules firing on `day`, by id ascending.
pub fn active_rules_for_day(conn: &Connection, day: u32) -> Result<Vec<RecurringTransaction>> {
    let sql = format!(
        "SELECT {RECURRING_COLUMNS} FROM recurring_transactions
         WHERE is_active=1 AND day_of_month=?1 ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![day], recurring_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Whether `rule_id` already produced a transaction dated inside `ym`.
pub fn generated_in_month(conn: &Connection, rule_id: i64, ym: YearMonth) -> Result<bool> {
    let (start, end) = month_bounds(ym);
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM transactions
             WHERE recurring_transaction_id=?1 AND date BETWEEN ?2 AND ?3 LIMIT 1",
            params![rule_id, start, end],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
