// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kakeibo::commands::transactions;
use kakeibo::filter::{MonthSelection, TransactionFilter, TransactionQuery, filter};
use kakeibo::models::{FlowType, NewCategory, NewTransaction, Payer, YearMonth};
use kakeibo::{cli, db, store};
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn category(conn: &Connection, name: &str, flow_type: FlowType) -> i64 {
    store::insert_category(
        conn,
        &NewCategory {
            name: name.into(),
            flow_type,
            icon: None,
            color: None,
        },
    )
    .unwrap()
}

fn tx(
    conn: &Connection,
    d: NaiveDate,
    flow_type: FlowType,
    category_id: i64,
    payer: Payer,
    amount: i64,
    memo: Option<&str>,
) -> i64 {
    store::insert_transaction(
        conn,
        &NewTransaction {
            date: d,
            flow_type,
            category_id,
            payer,
            amount,
            memo: memo.map(str::to_string),
            recurring_transaction_id: None,
        },
    )
    .unwrap()
}

struct Fixture {
    conn: Connection,
    food: i64,
    salary: i64,
}

fn setup() -> Fixture {
    let conn = db::open_in_memory().unwrap();
    let food = category(&conn, "Food", FlowType::Expense);
    let salary = category(&conn, "Salary", FlowType::Income);
    tx(&conn, date(2025, 4, 3), FlowType::Expense, food, Payer::PersonA, 1200, Some("lunch at cafe"));
    tx(&conn, date(2025, 4, 5), FlowType::Expense, food, Payer::PersonB, 3400, Some("dinner"));
    tx(&conn, date(2025, 4, 25), FlowType::Income, salary, Payer::PersonA, 300000, None);
    tx(&conn, date(2025, 3, 28), FlowType::Expense, food, Payer::PersonA, 800, Some("lunch"));
    Fixture { conn, food, salary }
}

fn april() -> MonthSelection {
    MonthSelection::Month(YearMonth::new(2025, 4).unwrap())
}

fn run(conn: &Connection, f: &TransactionFilter) -> Vec<i64> {
    filter(TransactionQuery::new(), f)
        .newest_first()
        .fetch(conn)
        .unwrap()
        .into_iter()
        .map(|r| r.transaction.id)
        .collect()
}

#[test]
fn filters_by_category() {
    let fx = setup();
    let f = TransactionFilter {
        category_id: Some(fx.salary),
        month: MonthSelection::All,
        ..Default::default()
    };
    let rows = filter(TransactionQuery::new(), &f).fetch(&fx.conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category.name, "Salary");
    assert_eq!(rows[0].transaction.amount, 300000);
}

#[test]
fn criteria_combine_with_and() {
    let fx = setup();
    let f = TransactionFilter {
        category_id: Some(fx.food),
        payer: Some(Payer::PersonA),
        memo: Some("lunch".into()),
        month: april(),
        ..Default::default()
    };
    assert_eq!(run(&fx.conn, &f), vec![1]);

    let all_months = TransactionFilter {
        month: MonthSelection::All,
        ..f
    };
    assert_eq!(run(&fx.conn, &all_months), vec![1, 4]);
}

#[test]
fn type_filter_and_newest_first_order() {
    let fx = setup();
    let f = TransactionFilter {
        flow_type: Some(FlowType::Expense),
        month: april(),
        ..Default::default()
    };
    assert_eq!(run(&fx.conn, &f), vec![2, 1]);
}

#[test]
fn no_criteria_with_all_months_returns_everything() {
    let fx = setup();
    let f = TransactionFilter::default();
    assert_eq!(f.month, MonthSelection::All);
    assert_eq!(run(&fx.conn, &f), vec![3, 2, 1, 4]);
}

#[test]
fn memo_wildcards_match_literally() {
    let fx = setup();
    tx(&fx.conn, date(2025, 4, 9), FlowType::Expense, fx.food, Payer::PersonB, 500, Some("50% off"));
    let f = TransactionFilter {
        memo: Some("%".into()),
        month: MonthSelection::All,
        ..Default::default()
    };
    assert_eq!(run(&fx.conn, &f), vec![5]);

    let f = TransactionFilter {
        memo: Some("LUNCH".into()),
        month: MonthSelection::All,
        ..Default::default()
    };
    assert_eq!(run(&fx.conn, &f).len(), 2);
}

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["kakeibo", "tx", "list"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().get_matches_from(argv);
    m.subcommand_matches("tx")
        .and_then(|t| t.subcommand_matches("list"))
        .cloned()
        .unwrap()
}

#[test]
fn absent_month_means_current_month() {
    let fx = setup();
    let listing =
        transactions::query_listing(&fx.conn, &list_matches(&[]), date(2025, 4, 20)).unwrap();
    assert_eq!(listing.filters.month, april());
    assert_eq!(listing.transactions.len(), 3);
}

#[test]
fn empty_month_means_all_months() {
    let fx = setup();
    let listing =
        transactions::query_listing(&fx.conn, &list_matches(&["--month="]), date(2025, 4, 20))
            .unwrap();
    assert_eq!(listing.filters.month, MonthSelection::All);
    assert_eq!(listing.transactions.len(), 4);
}

#[test]
fn listing_args_resolve_category_by_name() {
    let fx = setup();
    let listing = transactions::query_listing(
        &fx.conn,
        &list_matches(&["--month", "2025-03", "--category", "Food", "--payer", "person_a"]),
        date(2025, 4, 20),
    )
    .unwrap();
    assert_eq!(listing.filters.category_id, Some(fx.food));
    assert_eq!(listing.transactions.len(), 1);
    assert_eq!(listing.transactions[0].transaction.amount, 800);
}

#[test]
fn summary_covers_rows_beyond_the_limit() {
    let fx = setup();
    let listing = transactions::query_listing(
        &fx.conn,
        &list_matches(&["--month", "2025-04", "--limit", "1"]),
        date(2025, 4, 20),
    )
    .unwrap();
    assert_eq!(listing.transactions.len(), 1);
    assert_eq!(listing.transactions[0].transaction.date, date(2025, 4, 25));
    assert_eq!(listing.summary.income, 300000);
    assert_eq!(listing.summary.expense, 4600);
}

#[test]
fn month_options_include_current_month() {
    let fx = setup();
    let months = transactions::month_options(&fx.conn, date(2025, 6, 1)).unwrap();
    let shown: Vec<String> = months.iter().map(|m| m.to_string()).collect();
    assert_eq!(shown, vec!["2025-06", "2025-04", "2025-03"]);

    let months = transactions::month_options(&fx.conn, date(2025, 4, 1)).unwrap();
    assert_eq!(months.len(), 2);
}

#[test]
fn invalid_month_is_rejected() {
    let fx = setup();
    let res = transactions::query_listing(
        &fx.conn,
        &list_matches(&["--month", "2025-4x"]),
        date(2025, 4, 20),
    );
    assert!(res.is_err());
}

#[test]
fn amounts_must_be_positive() {
    let fx = setup();
    let bad = NewTransaction {
        date: date(2025, 4, 1),
        flow_type: FlowType::Expense,
        category_id: fx.food,
        payer: Payer::PersonA,
        amount: 0,
        memo: None,
        recurring_transaction_id: None,
    };
    assert!(store::insert_transaction(&fx.conn, &bad).is_err());
}

#[test]
fn update_keeps_provenance_and_delete_removes() {
    let fx = setup();
    let mut t = NewTransaction {
        date: date(2025, 4, 2),
        flow_type: FlowType::Expense,
        category_id: fx.food,
        payer: Payer::PersonA,
        amount: 100,
        memo: None,
        recurring_transaction_id: None,
    };
    let id = store::insert_transaction(&fx.conn, &t).unwrap();
    t.amount = 250;
    store::update_transaction(&fx.conn, id, &t).unwrap();
    assert_eq!(store::get_transaction(&fx.conn, id).unwrap().amount, 250);

    store::delete_transaction(&fx.conn, id).unwrap();
    assert!(store::get_transaction(&fx.conn, id).is_err());
    assert!(store::delete_transaction(&fx.conn, id).is_err());
}

#[test]
fn unknown_category_lists_nothing() {
    let fx = setup();
    let today = date(2025, 4, 20);

    let by_id =
        transactions::query_listing(&fx.conn, &list_matches(&["--category", "999", "--month="]), today)
            .unwrap();
    assert_eq!(by_id.filters.category_id, Some(999));
    assert!(by_id.transactions.is_empty());
    assert_eq!(by_id.summary.income + by_id.summary.expense, 0);

    let by_name =
        transactions::query_listing(&fx.conn, &list_matches(&["--category", "Pets", "--month="]), today)
            .unwrap();
    assert_eq!(by_name.filters.category_name.as_deref(), Some("Pets"));
    assert!(by_name.transactions.is_empty());
}
