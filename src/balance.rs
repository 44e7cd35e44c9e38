// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Income/expense aggregation for the dashboard and the transaction list.
//!
//! Everything here is pure: callers fetch transactions from the store and
//! pass them in.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::config::{PayerLabels, label};
use crate::models::{FlowType, Payer, Transaction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub income: i64,
    pub expense: i64,
    pub balance: i64,
}

impl Balance {
    fn record(&mut self, t: &Transaction) {
        match t.flow_type {
            FlowType::Income => self.income = self.income.saturating_add(t.amount),
            FlowType::Expense => self.expense = self.expense.saturating_add(t.amount),
        }
        // Totals clamp at the i64 bounds instead of overflowing.
        self.balance = self.income.saturating_sub(self.expense);
    }
}

/// Income and expense totals without the derived balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub income: i64,
    pub expense: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayerBalance {
    pub label: String,
    pub balance: i64,
}

pub fn balance<'a, I>(transactions: I) -> Balance
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut b = Balance::default();
    for t in transactions {
        b.record(t);
    }
    b
}

/// Balance per day of month. Days without transactions are absent.
pub fn daily_balances<'a, I>(transactions: I) -> BTreeMap<u32, Balance>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut by_day: BTreeMap<u32, Vec<&Transaction>> = BTreeMap::new();
    for t in transactions {
        by_day.entry(t.date.day()).or_default().push(t);
    }
    by_day
        .into_iter()
        .map(|(day, txs)| (day, balance(txs)))
        .collect()
}

/// Net balance per payer. Every payer is present, even with no transactions.
pub fn payer_balances<'a, I>(transactions: I, labels: &PayerLabels) -> BTreeMap<Payer, PayerBalance>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let transactions: Vec<&Transaction> = transactions.into_iter().collect();
    Payer::ALL
        .iter()
        .map(|&payer| {
            let b = balance(transactions.iter().copied().filter(|t| t.payer == payer));
            (
                payer,
                PayerBalance {
                    label: label(payer, labels).to_string(),
                    balance: b.balance,
                },
            )
        })
        .collect()
}

pub fn summarize<'a, I>(transactions: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let b = balance(transactions);
    Summary {
        income: b.income,
        expense: b.expense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(day: u32, flow_type: FlowType, payer: Payer, amount: i64) -> Transaction {
        Transaction {
            id: 0,
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            flow_type,
            category_id: 1,
            payer,
            amount,
            memo: None,
            recurring_transaction_id: None,
        }
    }

    #[test]
    fn empty_balance_is_zero() {
        let empty: Vec<Transaction> = Vec::new();
        assert_eq!(
            balance(&empty),
            Balance {
                income: 0,
                expense: 0,
                balance: 0
            }
        );
    }

    #[test]
    fn balance_subtracts_expense_from_income() {
        let txs = vec![
            tx(10, FlowType::Income, Payer::PersonA, 50000),
            tx(10, FlowType::Expense, Payer::PersonA, 1000),
        ];
        assert_eq!(
            balance(&txs),
            Balance {
                income: 50000,
                expense: 1000,
                balance: 49000
            }
        );
    }

    #[test]
    fn daily_balances_only_has_days_with_transactions() {
        let txs = vec![
            tx(10, FlowType::Income, Payer::PersonA, 50000),
            tx(10, FlowType::Expense, Payer::PersonB, 1000),
            tx(15, FlowType::Expense, Payer::PersonA, 2000),
        ];
        let daily = daily_balances(&txs);
        assert_eq!(daily.len(), 2);
        assert_eq!(
            daily[&10],
            Balance {
                income: 50000,
                expense: 1000,
                balance: 49000
            }
        );
        assert_eq!(
            daily[&15],
            Balance {
                income: 0,
                expense: 2000,
                balance: -2000
            }
        );
        assert!(!daily.contains_key(&11));
    }

    #[test]
    fn payer_balances_cover_every_payer() {
        let labels = PayerLabels {
            person_a: "Alice".into(),
            person_b: "Bob".into(),
        };
        let txs = vec![
            tx(1, FlowType::Income, Payer::PersonA, 300000),
            tx(2, FlowType::Expense, Payer::PersonA, 80000),
        ];
        let by_payer = payer_balances(&txs, &labels);
        assert_eq!(by_payer.len(), 2);
        assert_eq!(
            by_payer[&Payer::PersonA],
            PayerBalance {
                label: "Alice".into(),
                balance: 220000
            }
        );
        assert_eq!(
            by_payer[&Payer::PersonB],
            PayerBalance {
                label: "Bob".into(),
                balance: 0
            }
        );
    }

    #[test]
    fn payer_balances_of_nothing_are_zero_with_labels() {
        let empty: Vec<Transaction> = Vec::new();
        let by_payer = payer_balances(&empty, &PayerLabels::default());
        assert_eq!(by_payer[&Payer::PersonA].balance, 0);
        assert_eq!(by_payer[&Payer::PersonA].label, "Person A");
        assert_eq!(by_payer[&Payer::PersonB].balance, 0);
    }

    #[test]
    fn daily_balances_serialize_with_day_keys() {
        let txs = vec![tx(5, FlowType::Expense, Payer::PersonB, 700)];
        let v = serde_json::to_value(daily_balances(&txs)).unwrap();
        assert_eq!(v["5"]["expense"], 700);
        assert_eq!(v["5"]["balance"], -700);
    }

    #[test]
    fn huge_totals_clamp_instead_of_overflowing() {
        let txs = vec![
            tx(1, FlowType::Income, Payer::PersonA, i64::MAX),
            tx(1, FlowType::Income, Payer::PersonA, i64::MAX),
            tx(2, FlowType::Expense, Payer::PersonB, i64::MAX),
            tx(2, FlowType::Expense, Payer::PersonB, i64::MAX),
        ];
        let b = balance(&txs);
        assert_eq!(b.income, i64::MAX);
        assert_eq!(b.expense, i64::MAX);
        assert_eq!(b.balance, 0);

        let by_payer = payer_balances(&txs, &PayerLabels::default());
        assert_eq!(by_payer[&Payer::PersonA].balance, i64::MAX);
        assert_eq!(by_payer[&Payer::PersonB].balance, -i64::MAX);
        assert_eq!(daily_balances(&txs)[&1].income, i64::MAX);
    }
}
