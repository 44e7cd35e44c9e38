// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::NewCategory;
use crate::store;
use crate::utils::{maybe_print_json, non_empty, parse_flow_type, parse_id, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let c = NewCategory {
                name: required(sub, "name")?.trim().to_string(),
                flow_type: parse_flow_type(required(sub, "type")?)?,
                icon: non_empty(sub.get_one::<String>("icon")),
                color: non_empty(sub.get_one::<String>("color")),
            };
            let id = store::insert_category(conn, &c)
                .with_context(|| format!("Add category '{}'", c.name))?;
            println!("Added category '{}' ({}) with id {}", c.name, c.flow_type, id);
        }
        Some(("list", sub)) => {
            let cats = store::list_categories(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let rows = cats
                    .into_iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name,
                            c.flow_type.label().to_string(),
                            c.icon.unwrap_or_default(),
                            c.color.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Category", "Type", "Icon", "Color"], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            let cur = store::get_category(conn, id)?;
            let c = NewCategory {
                name: non_empty(sub.get_one::<String>("name")).unwrap_or(cur.name),
                flow_type: match sub.get_one::<String>("type") {
                    Some(t) => parse_flow_type(t)?,
                    None => cur.flow_type,
                },
                icon: sub
                    .get_one::<String>("icon")
                    .map(|s| Some(s.trim().to_string()).filter(|s| !s.is_empty()))
                    .unwrap_or(cur.icon),
                color: sub
                    .get_one::<String>("color")
                    .map(|s| Some(s.trim().to_string()).filter(|s| !s.is_empty()))
                    .unwrap_or(cur.color),
            };
            store::update_category(conn, id, &c)?;
            println!("Updated category {}", id);
        }
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            store::delete_category(conn, id)?;
            println!("Removed category {}", id);
        }
        Some(("seed", _)) => {
            let n = store::seed_default_categories(conn)?;
            if n == 0 {
                println!("Categories already present, nothing seeded");
            } else {
                println!("Seeded {} categories", n);
            }
        }
        _ => {}
    }
    Ok(())
}
