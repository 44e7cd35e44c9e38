// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{PayerLabels, payer_options};
use crate::utils::{maybe_print_json, parse_payer, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let labels = PayerLabels::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &labels)? {
                let rows = payer_options(&labels)
                    .into_iter()
                    .map(|o| vec![o.value.to_string(), o.label])
                    .collect();
                println!("{}", pretty_table(&["Payer", "Label"], rows));
            }
        }
        Some(("set-payer-label", sub)) => {
            let payer = parse_payer(required(sub, "payer")?)?;
            let label = required(sub, "label")?;
            PayerLabels::save(conn, payer, label)?;
            println!("Payer {} is now shown as '{}'", payer, label.trim());
        }
        _ => {}
    }
    Ok(())
}
