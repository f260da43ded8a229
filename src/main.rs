//! cashflow-settle CLI
//!
//! Settle a batch of peer-to-peer debts from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Settle transactions from a JSON file
//! cashflow-settle settle --input transactions.json
//!
//! # Settle as of a fixed payment date, JSON output
//! cashflow-settle settle --input transactions.json --payment-date 2024-06-30 --format json
//!
//! # Show which records would be dropped
//! cashflow-settle validate --input transactions.json
//!
//! # Generate a random batch for testing
//! cashflow-settle generate --parties 10 --transactions 30
//! ```
//!
//! Set `RUST_LOG=debug` to see dropped records and individual matches.

use cashflow_settlement::core::temporal::parse_instant;
use cashflow_settlement::core::transaction::RawTransaction;
use cashflow_settlement::ingest::validator::{parse_batch, validate_with_report};
use cashflow_settlement::optimization::minimizer::balances;
use cashflow_settlement::pipeline::{PipelineConfig, SettlementPipeline};
use cashflow_settlement::schedule::constraints::apply_constraints;
use cashflow_settlement::simulation::generator::{generate_random_batch, BatchConfig};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"cashflow-settle — minimize the transfers needed to clear peer-to-peer debts

USAGE:
    cashflow-settle <COMMAND> [OPTIONS]

COMMANDS:
    settle      Validate, accrue late charges and compute settling transfers
    validate    Report which records are accepted and why others are dropped
    balances    Show each party's net balance after accrual
    generate    Generate a random transaction batch (for testing)
    help        Show this message

OPTIONS (settle, validate, balances):
    --input <FILE>          Path to JSON transactions file
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (settle, balances):
    --payment-date <DATE>   ISO-8601 instant debts are paid at (default: now)
    --no-constraints        Skip interest and penalty accrual

OPTIONS (generate):
    --parties <N>           Number of parties (default: 10)
    --transactions <N>      Number of records (default: 30)
    --overdue-ratio <F>     Share of records with late-payment terms (default: 0.25)
    --seed <N>              Seed for a reproducible batch
    --output <FILE>         Write to file instead of stdout

EXAMPLES:
    cashflow-settle settle --input transactions.json
    cashflow-settle settle --input transactions.json --payment-date 2024-06-30 --format json
    cashflow-settle validate --input transactions.json --format json
    cashflow-settle balances --input transactions.json --no-constraints
    cashflow-settle generate --parties 5 --transactions 20 --seed 7 --output test.json"#
    );
}

/// Options shared by the commands that read a batch.
struct BatchArgs {
    input: String,
    format: String,
    payment_date: Option<NaiveDateTime>,
    apply_constraints: bool,
}

fn parse_batch_args(args: &[String]) -> BatchArgs {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut payment_date = None;
    let mut apply_constraints = true;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            "--payment-date" => {
                i += 1;
                let raw = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--payment-date requires an ISO-8601 date");
                    process::exit(1);
                });
                payment_date = Some(parse_instant(&raw).unwrap_or_else(|| {
                    eprintln!("Invalid payment date '{}'", raw);
                    process::exit(1);
                }));
            }
            "--no-constraints" => apply_constraints = false,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    BatchArgs {
        input,
        format,
        payment_date,
        apply_constraints,
    }
}

fn load_records(path: &str) -> Vec<RawTransaction> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    parse_batch(&content).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "transactions": [
    {{ "sender": "alice", "receiver": "bob", "amount": 100, "due_date": "2024-06-01", "interest_rate": 0.01, "penalty": 5 }}
  ]
}}"#
        );
        process::exit(1);
    })
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

/// JSON output schema for one settling transfer.
#[derive(serde::Serialize)]
struct TransferOutput {
    sender: String,
    receiver: String,
    amount: String,
}

/// JSON output schema for a settlement run.
#[derive(serde::Serialize)]
struct SettleOutput {
    id: String,
    payment_date: String,
    rejected: usize,
    gross_total: String,
    accrued_total: String,
    settled_total: String,
    savings_percent: f64,
    transfers: Vec<TransferOutput>,
}

#[derive(serde::Serialize)]
struct BalanceOutput {
    party: String,
    balance: String,
    status: String,
}

fn cmd_settle(args: &[String]) {
    let opts = parse_batch_args(args);
    let records = load_records(&opts.input);

    let pipeline = SettlementPipeline::new(PipelineConfig {
        payment_date: opts.payment_date,
        apply_constraints: opts.apply_constraints,
    });
    let report = pipeline.run(&records).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if opts.format == "json" {
        let output = SettleOutput {
            id: report.id.to_string(),
            payment_date: report.payment_date.to_string(),
            rejected: report.rejected.len(),
            gross_total: report.summary.gross_total.to_string(),
            accrued_total: report.summary.accrued_total.to_string(),
            settled_total: report.summary.settled_total.to_string(),
            savings_percent: report.summary.savings_ratio() * 100.0,
            transfers: report
                .transfers
                .iter()
                .map(|t| TransferOutput {
                    sender: t.sender.to_string(),
                    receiver: t.receiver.to_string(),
                    amount: t.amount.to_string(),
                })
                .collect(),
        };
        print_json(&output);
    } else {
        println!("{}", report.summary);
        if !report.rejected.is_empty() {
            println!("Dropped {} malformed records.\n", report.rejected.len());
        }
        if report.transfers.is_empty() {
            println!("Everyone is settled. No transfers needed.");
        } else {
            println!("Transfers:");
            for transfer in &report.transfers {
                println!("  {}", transfer);
            }
        }
    }
}

fn cmd_validate(args: &[String]) {
    let opts = parse_batch_args(args);
    let records = load_records(&opts.input);
    let report = validate_with_report(&records);

    if opts.format == "json" {
        print_json(&report);
    } else {
        println!(
            "{} accepted, {} rejected",
            report.accepted.len(),
            report.rejected.len()
        );
        for rejection in &report.rejected {
            println!("  record {}: {}", rejection.index, rejection.reason);
        }
    }
}

fn cmd_balances(args: &[String]) {
    let opts = parse_batch_args(args);
    let records = load_records(&opts.input);
    let report = validate_with_report(&records);

    let transactions = if opts.apply_constraints {
        apply_constraints(&report.accepted, opts.payment_date)
    } else {
        report.accepted
    };
    let net = balances(&transactions);

    let rows: Vec<BalanceOutput> = net
        .iter()
        .map(|(party, balance)| BalanceOutput {
            party: party.to_string(),
            balance: balance.to_string(),
            status: if balance > Decimal::ZERO {
                "CREDITOR".to_string()
            } else if balance < Decimal::ZERO {
                "DEBTOR".to_string()
            } else {
                "SETTLED".to_string()
            },
        })
        .collect();

    if opts.format == "json" {
        print_json(&rows);
    } else if rows.is_empty() {
        println!("No valid transactions.");
    } else {
        for row in &rows {
            println!("  {:<15} {:>15}  [{}]", row.party, row.balance, row.status);
        }
        println!("\nOutstanding: {}", net.total_outstanding());
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = BatchConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--parties" => {
                i += 1;
                config.party_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--parties requires a number");
                        process::exit(1);
                    });
            }
            "--transactions" => {
                i += 1;
                config.transaction_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--transactions requires a number");
                        process::exit(1);
                    });
            }
            "--overdue-ratio" => {
                i += 1;
                config.overdue_ratio = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--overdue-ratio requires a number between 0 and 1");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                config.seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(
                    || {
                        eprintln!("--seed requires a number");
                        process::exit(1);
                    },
                ));
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        transactions: Vec<RawTransaction>,
    }

    let output = OutputFile {
        transactions: generate_random_batch(&config),
    };
    let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
        eprintln!("Error serializing batch: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} transactions across {} parties → {}",
            output.transactions.len(),
            config.party_count,
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
        "settle" => cmd_settle(rest),
        "validate" => cmd_validate(rest),
        "balances" => cmd_balances(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
