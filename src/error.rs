// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Library level error type.

/// Errors raised by the store, the generation engine and the domain types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Recurring rules may only fire on days that exist in every month.
    #[error("day of month must be between 1 and 28, got {0}")]
    InvalidDayOfMonth(i64),

    /// Amounts are stored in the smallest currency unit and must be positive.
    /// Whether money flows in or out is carried by the flow type.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(i64),

    #[error("name cannot be empty")]
    EmptyName,

    #[error("invalid year-month '{0}', expected YYYY-MM")]
    InvalidYearMonth(String),

    #[error("unknown flow type '{0}', expected income or expense")]
    InvalidFlowType(String),

    #[error("unknown payer '{0}', expected person_a or person_b")]
    InvalidPayer(String),

    /// A category cannot be deleted while transactions or recurring rules
    /// still point at it.
    #[error(
        "category {id} is still used by {transactions} transaction(s) and {rules} recurring transaction(s)"
    )]
    CategoryInUse {
        id: i64,
        transactions: i64,
        rules: i64,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
