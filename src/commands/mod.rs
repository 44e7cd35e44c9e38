// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;

use crate::{cli, db};

pub mod categories;
pub mod dashboard;
pub mod doctor;
pub mod importer;
pub mod recurring;
pub mod settings;
pub mod transactions;

/// Runs the parsed command line. The database is only opened once a
/// subcommand is known, so printing help leaves the filesystem alone.
pub fn run(matches: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = matches.subcommand() else {
        cli::build_cli().print_help()?;
        println!();
        return Ok(());
    };

    let path = db::db_path(matches.get_one::<PathBuf>("db").map(PathBuf::as_path))?;
    let mut conn = db::open_or_init(&path)?;

    match name {
        "init" => println!("Database initialized at {}", path.display()),
        "category" => categories::handle(&conn, sub)?,
        "tx" => transactions::handle(&conn, sub)?,
        "recurring" => recurring::handle(&mut conn, sub)?,
        "dashboard" => dashboard::handle(&conn, sub)?,
        "import" => importer::handle(&mut conn, sub)?,
        "config" => settings::handle(&conn, sub)?,
        "doctor" => doctor::handle(&conn, sub)?,
        _ => {}
    }
    Ok(())
}
