//! splitledger CLI
//!
//! Compute balances and settlements for a shared-expense ledger.
//!
//! # Usage
//!
//! ```bash
//! # Net balance per participant
//! splitledger balances --input ledger.json
//!
//! # Who pays whom, as JSON
//! splitledger settle --input ledger.json --format json
//!
//! # One participant's view
//! splitledger breakdown --input ledger.json --participant Alice
//!
//! # Generate a random ledger for testing
//! splitledger generate --participants 6 --expenses 40
//! ```

use rust_decimal::Decimal;
use splitledger::config::{LedgerFile, RosterSources};
use splitledger::core::expense::ExpenseLog;
use splitledger::engine::summary::GroupSummary;
use splitledger::simulation::random_ledger::{generate_random_ledger, LedgerConfig};
use std::fs;
use std::path::Path;
use std::process;

fn print_usage() {
    eprintln!(
        r#"splitledger — shared-expense netting and settlement

USAGE:
    splitledger <COMMAND> [OPTIONS]

COMMANDS:
    balances    Show the net balance of every participant
    settle      Show the payments that settle all balances
    breakdown   Show one participant's balance and settlements
    generate    Generate a random ledger (for testing)
    help        Show this message

OPTIONS (balances, settle, breakdown):
    --input <FILE>        Path to JSON ledger file
    --format <FORMAT>     Output format: text (default) or json
    --roster <LIST>       Comma-separated roster; overrides SPLITLEDGER_ROSTER
                          and the file's "roster" field
    --participant <NAME>  Participant to inspect (breakdown only)

OPTIONS (generate):
    --participants <N>    Number of participants (default: 5)
    --expenses <N>        Number of expenses (default: 30)
    --max-amount <AMOUNT> Largest expense amount (default: 5000)
    --output <FILE>       Write to file instead of stdout

ENVIRONMENT:
    SPLITLEDGER_ROSTER    Comma-separated roster
    RUST_LOG              Log filter, e.g. debug

EXAMPLES:
    splitledger balances --input ledger.json
    splitledger settle --input ledger.json --format json
    splitledger breakdown --input ledger.json --participant Alice
    splitledger generate --participants 8 --expenses 100 --output ledger.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

#[derive(Default)]
struct LedgerArgs {
    input: Option<String>,
    format: Format,
    roster: Option<String>,
    participant: Option<String>,
}

#[derive(Default, PartialEq)]
enum Format {
    #[default]
    Text,
    Json,
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires a value", flag)))
}

fn parse_ledger_args(args: &[String]) -> LedgerArgs {
    let mut parsed = LedgerArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" => parsed.input = Some(take_value(args, &mut i, flag)),
            "--roster" => parsed.roster = Some(take_value(args, &mut i, flag)),
            "--participant" => parsed.participant = Some(take_value(args, &mut i, flag)),
            "--format" => {
                parsed.format = match take_value(args, &mut i, flag).as_str() {
                    "text" => Format::Text,
                    "json" => Format::Json,
                    other => fail(format!("unknown format '{}', expected text or json", other)),
                }
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }
    parsed
}

fn load_summary(args: &LedgerArgs) -> GroupSummary {
    let path = args
        .input
        .as_deref()
        .unwrap_or_else(|| fail("--input <FILE> is required"));

    let sources = RosterSources::from_env(args.roster.clone());
    let (roster, log) = LedgerFile::read(Path::new(path))
        .and_then(|file| file.into_ledger(&sources))
        .unwrap_or_else(|e| fail(e));

    GroupSummary::compute(&roster, log.expenses()).unwrap_or_else(|e| fail(e))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn cmd_balances(args: &[String]) {
    let args = parse_ledger_args(args);
    let summary = load_summary(&args);

    if args.format == Format::Json {
        print_json(summary.balances());
    } else {
        println!("Participants: {}", summary.roster());
        println!("Expenses:     {}", summary.expense_count());
        println!("Total Spent:  {}\n", summary.total_spent());
        print!("{}", summary.balances());
    }
}

fn cmd_settle(args: &[String]) {
    let args = parse_ledger_args(args);
    let summary = load_summary(&args);

    if args.format == Format::Json {
        print_json(summary.plan());
    } else {
        print!("{}", summary.plan());
    }
}

fn cmd_breakdown(args: &[String]) {
    let args = parse_ledger_args(args);
    let summary = load_summary(&args);

    let name = args
        .participant
        .as_deref()
        .unwrap_or_else(|| fail("--participant <NAME> is required"));
    let participant = summary.roster().resolve(name).unwrap_or_else(|e| fail(e));
    let breakdown = summary
        .breakdown(&participant)
        .unwrap_or_else(|| fail(format!("no balance for '{}'", participant)));

    if args.format == Format::Json {
        print_json(&breakdown);
    } else {
        print!("{}", breakdown);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = LedgerConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                config.participant_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--participants requires a number"));
            }
            "--expenses" => {
                i += 1;
                config.expense_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--expenses requires a number"));
            }
            "--max-amount" => {
                i += 1;
                config.max_amount = args
                    .get(i)
                    .and_then(|s| s.parse::<Decimal>().ok())
                    .unwrap_or_else(|| fail("--max-amount requires a decimal amount"));
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let (roster, expenses) = generate_random_ledger(&config).unwrap_or_else(|e| fail(e));
    let log: ExpenseLog = expenses.into_iter().collect();
    let file = LedgerFile::from_ledger(&roster, &log);

    let json = serde_json::to_string_pretty(&file).unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("cannot write to '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} participants → {}",
            log.len(),
            roster.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "breakdown" => cmd_breakdown(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
