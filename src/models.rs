// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

/// Whether money comes in or goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Income,
    Expense,
}

impl FlowType {
    pub const ALL: [FlowType; 2] = [FlowType::Income, FlowType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl FromStr for FlowType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(Error::InvalidFlowType(s.to_string())),
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The household member a transaction belongs to.
///
/// The set of payers is fixed; only their display labels are configurable,
/// see [`crate::config::PayerLabels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payer {
    PersonA,
    PersonB,
}

impl Payer {
    pub const ALL: [Payer; 2] = [Payer::PersonA, Payer::PersonB];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonA => "person_a",
            Self::PersonB => "person_b",
        }
    }
}

impl FromStr for Payer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "person_a" | "a" => Ok(Self::PersonA),
            "person_b" | "b" => Ok(Self::PersonB),
            _ => Err(Error::InvalidPayer(s.to_string())),
        }
    }
}

impl fmt::Display for Payer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_column!(FlowType);
text_column!(Payer);

/// Day on which a recurring rule fires. Capped at 28 so every month has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DayOfMonth(u8);

impl DayOfMonth {
    pub const MAX: u8 = 28;

    pub fn new(day: i64) -> Result<Self, Error> {
        if (1..=i64::from(Self::MAX)).contains(&day) {
            Ok(Self(day as u8))
        } else {
            Err(Error::InvalidDayOfMonth(day))
        }
    }

    pub fn get(&self) -> u32 {
        u32::from(self.0)
    }
}

impl ToSql for DayOfMonth {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for DayOfMonth {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        DayOfMonth::new(value.as_i64()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl fmt::Display for DayOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, Error> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(Error::InvalidYearMonth(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidYearMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub flow_type: FlowType,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub flow_type: FlowType,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub flow_type: FlowType,
    pub category_id: i64,
    pub payer: Payer,
    /// Smallest currency unit, always positive.
    pub amount: i64,
    pub memo: Option<String>,
    /// Set when the row was materialized from a recurring rule.
    pub recurring_transaction_id: Option<i64>,
}

/// Insert/update payload for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub flow_type: FlowType,
    pub category_id: i64,
    pub payer: Payer,
    pub amount: i64,
    pub memo: Option<String>,
    pub recurring_transaction_id: Option<i64>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), Error> {
        if self.amount <= 0 {
            return Err(Error::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

/// A transaction with its category attached, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub name: String,
    pub day_of_month: DayOfMonth,
    #[serde(rename = "type")]
    pub flow_type: FlowType,
    pub category_id: i64,
    pub payer: Payer,
    pub amount: i64,
    pub memo: Option<String>,
    pub is_active: bool,
}

impl RecurringTransaction {
    /// The transaction this rule produces on `date`.
    pub fn materialize(&self, date: NaiveDate) -> NewTransaction {
        NewTransaction {
            date,
            flow_type: self.flow_type,
            category_id: self.category_id,
            payer: self.payer,
            amount: self.amount,
            memo: self.memo.clone(),
            recurring_transaction_id: Some(self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurringTransaction {
    pub name: String,
    pub day_of_month: DayOfMonth,
    pub flow_type: FlowType,
    pub category_id: i64,
    pub payer: Payer,
    pub amount: i64,
    pub memo: Option<String>,
    pub is_active: bool,
}

impl NewRecurringTransaction {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.amount <= 0 {
            return Err(Error::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}
