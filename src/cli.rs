// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON document per line"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn id_arg() -> Arg {
    req("id", "Record id")
}

fn transaction_fields(cmd: Command, required: bool) -> Command {
    let field = |name, help| if required { req(name, help) } else { opt(name, help) };
    cmd.arg(field("date", "Date (YYYY-MM-DD)"))
        .arg(field("type", "income or expense"))
        .arg(field("category", "Category name or id"))
        .arg(field("payer", "person_a or person_b"))
        .arg(field("amount", "Positive amount in the smallest currency unit"))
        .arg(opt("memo", "Free text memo"))
}

fn recurring_fields(cmd: Command, required: bool) -> Command {
    let field = |name, help| if required { req(name, help) } else { opt(name, help) };
    cmd.arg(field("name", "Rule name"))
        .arg(field("day", "Day of month the rule fires on (1-28)"))
        .arg(field("type", "income or expense"))
        .arg(field("category", "Category name or id"))
        .arg(field("payer", "person_a or person_b"))
        .arg(field("amount", "Positive amount in the smallest currency unit"))
        .arg(opt("memo", "Copied onto every generated transaction"))
}

pub fn build_cli() -> Command {
    Command::new("kakeibo")
        .about("Household income/expense tracker with recurring transactions")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database file (defaults to $KAKEIBO_DB, then the data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug details to stderr"),
        )
        .subcommand(Command::new("init").about("Create the database and print its path"))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Category name"))
                        .arg(req("type", "income or expense"))
                        .arg(opt("icon", "Icon"))
                        .arg(opt("color", "Display color")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(opt("name", "Category name"))
                        .arg(opt("type", "income or expense"))
                        .arg(opt("icon", "Icon"))
                        .arg(opt("color", "Display color")),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    Command::new("seed").about("Insert the default categories into an empty table"),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(transaction_fields(Command::new("add"), true))
                .subcommand(transaction_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_args(
                    Command::new("list")
                        .arg(opt("category", "Category name or id"))
                        .arg(opt("payer", "person_a or person_b"))
                        .arg(opt("type", "income or expense"))
                        .arg(opt("memo", "Memo substring"))
                        .arg(
                            opt(
                                "month",
                                "YYYY-MM; omitted means the current month, empty means all months",
                            )
                            .num_args(0..=1)
                            .default_missing_value(""),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .help("Show at most N rows"),
                        )
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .action(ArgAction::SetTrue)
                                .help("Include the year-months that have transactions"),
                        ),
                )),
        )
        .subcommand(
            Command::new("recurring")
                .about("Manage recurring transactions")
                .subcommand(
                    recurring_fields(Command::new("add"), true).arg(
                        Arg::new("inactive")
                            .long("inactive")
                            .action(ArgAction::SetTrue)
                            .help("Create the rule disabled"),
                    ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    recurring_fields(Command::new("edit").arg(id_arg()), false).arg(
                        Arg::new("active")
                            .long("active")
                            .value_parser(value_parser!(bool))
                            .help("true or false"),
                    ),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_args(
                    Command::new("generate")
                        .about("Create this month's transactions for rules due on the date")
                        .arg(opt("date", "Target date (YYYY-MM-DD), defaults to today")),
                )),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Calendar balances")
                .subcommand(json_args(
                    Command::new("month")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .value_parser(value_parser!(i32))
                                .help("Defaults to the current year"),
                        )
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_parser(value_parser!(u32).range(1..=12))
                                .help("1-12, defaults to the current month"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("day").arg(req("date", "Date (YYYY-MM-DD)")),
                )),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(json_args(
                Command::new("csv")
                    .arg(req("path", "CSV with date,category,expense,income,memo columns"))
                    .arg(opt("payer", "Payer for imported rows (default person_b)"))
                    .arg(
                        opt("salary", "NAME=PAYER: rows in category NAME are that payer's salary")
                            .action(ArgAction::Append),
                    )
                    .arg(opt(
                        "salary-category",
                        "Category for remapped salary rows (default Salary)",
                    ))
                    .arg(
                        Arg::new("create-categories")
                            .long("create-categories")
                            .action(ArgAction::SetTrue)
                            .help("Create unknown categories instead of using 'Other expense'"),
                    )
                    .arg(
                        Arg::new("force")
                            .long("force")
                            .action(ArgAction::SetTrue)
                            .help("Import even if transactions already exist"),
                    ),
            )),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set-payer-label")
                        .arg(req("payer", "person_a or person_b"))
                        .arg(req("label", "Display name")),
                ),
        )
        .subcommand(json_args(
            Command::new("doctor").about("Report integrity problems"),
        ))
}
