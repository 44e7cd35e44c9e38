// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kakeibo::Error;
use kakeibo::models::{DayOfMonth, FlowType, NewCategory, NewRecurringTransaction, Payer};
use kakeibo::recurring::generate;
use kakeibo::utils::id_for_category;
use kakeibo::{db, store};

fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: name.into(),
        flow_type: FlowType::Expense,
        icon: Some("cart".into()),
        color: Some("#ff8800".into()),
    }
}

#[test]
fn seeding_only_fills_an_empty_table() {
    let conn = db::open_in_memory().unwrap();
    let n = store::seed_default_categories(&conn).unwrap();
    assert_eq!(n, store::DEFAULT_CATEGORIES.len());
    assert_eq!(store::seed_default_categories(&conn).unwrap(), 0);
    assert_eq!(store::list_categories(&conn).unwrap().len(), n);
}

#[test]
fn categories_round_trip_and_rename() {
    let conn = db::open_in_memory().unwrap();
    let id = store::insert_category(&conn, &new_category("Groceries")).unwrap();
    let c = store::get_category(&conn, id).unwrap();
    assert_eq!(c.name, "Groceries");
    assert_eq!(c.icon.as_deref(), Some("cart"));

    store::update_category(&conn, id, &new_category("Food")).unwrap();
    assert_eq!(id_for_category(&conn, "Food").unwrap(), id);
    assert_eq!(id_for_category(&conn, &id.to_string()).unwrap(), id);
    assert!(id_for_category(&conn, "Groceries").is_err());
}

#[test]
fn names_are_required_and_unique() {
    let conn = db::open_in_memory().unwrap();
    assert!(matches!(
        store::insert_category(&conn, &new_category(" ")),
        Err(Error::EmptyName)
    ));
    store::insert_category(&conn, &new_category("Food")).unwrap();
    assert!(store::insert_category(&conn, &new_category("Food")).is_err());
}

#[test]
fn referenced_category_cannot_be_deleted() {
    let mut conn = db::open_in_memory().unwrap();
    let rent = store::insert_category(&conn, &new_category("Rent")).unwrap();
    let spare = store::insert_category(&conn, &new_category("Spare")).unwrap();
    store::insert_recurring(
        &conn,
        &NewRecurringTransaction {
            name: "Rent".into(),
            day_of_month: DayOfMonth::new(1).unwrap(),
            flow_type: FlowType::Expense,
            category_id: rent,
            payer: Payer::PersonB,
            amount: 70000,
            memo: None,
            is_active: true,
        },
    )
    .unwrap();
    generate(&mut conn, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()).unwrap();

    match store::delete_category(&conn, rent) {
        Err(Error::CategoryInUse {
            transactions,
            rules,
            ..
        }) => assert_eq!((transactions, rules), (1, 1)),
        other => panic!("unexpected {:?}", other),
    }
    store::delete_category(&conn, spare).unwrap();
    assert!(matches!(
        store::delete_category(&conn, spare),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn deleting_a_rule_keeps_its_transactions() {
    let mut conn = db::open_in_memory().unwrap();
    let rent = store::insert_category(&conn, &new_category("Rent")).unwrap();
    let rule = store::insert_recurring(
        &conn,
        &NewRecurringTransaction {
            name: "Rent".into(),
            day_of_month: DayOfMonth::new(1).unwrap(),
            flow_type: FlowType::Expense,
            category_id: rent,
            payer: Payer::PersonB,
            amount: 70000,
            memo: None,
            is_active: true,
        },
    )
    .unwrap();
    generate(&mut conn, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()).unwrap();

    store::delete_recurring(&conn, rule).unwrap();
    let txs = store::find_by_month(&conn, "2025-07".parse().unwrap()).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].recurring_transaction_id, None);
    assert!(store::get_recurring(&conn, rule).is_err());
}
