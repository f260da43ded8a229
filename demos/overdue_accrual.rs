//! Late-payment accrual example.
//!
//! Runs the full pipeline on raw JSON records, some of them overdue and
//! one of them malformed, and shows how interest and penalties change
//! what has to be paid.

use cashflow_settlement::core::temporal::parse_instant;
use cashflow_settlement::ingest::validator::{parse_batch, validate};
use cashflow_settlement::pipeline::{PipelineConfig, SettlementPipeline};
use cashflow_settlement::schedule::constraints::assess;

fn main() {
    println!("╔═════════════════════════════════════════════╗");
    println!("║  cashflow-settlement: Overdue Accrual Demo  ║");
    println!("╚═════════════════════════════════════════════╝\n");

    let batch = parse_batch(
        r#"[
          { "sender": "ana", "receiver": "ben", "amount": 100, "due_date": "2024-06-01",
            "interest_rate": 0.01, "penalty": 5, "timestamp": "2024-05-20" },
          { "sender": "ben", "receiver": "cleo", "amount": 40, "due_date": "2024-06-20",
            "interest_rate": 0.02, "timestamp": "2024-05-25" },
          { "sender": "cleo", "receiver": "ana", "amount": 25, "timestamp": "2024-05-28" },
          { "sender": "dev", "receiver": "ana", "amount": "a lot" }
        ]"#,
    )
    .expect("demo batch is valid JSON");

    let payment_date = parse_instant("2024-06-11").expect("demo date is valid");
    println!("Payment date: {}\n", payment_date);

    let report = SettlementPipeline::new(PipelineConfig {
        payment_date: Some(payment_date),
        ..Default::default()
    })
    .run(&batch)
    .expect("demo batch has valid transactions");

    println!("━━━ Late Charges ━━━\n");
    for tx in validate(&batch) {
        let accrual = assess(&tx, payment_date);
        if accrual.late {
            println!(
                "  {:<5} → {:<5} {:>8}  late {} days: +{} interest, +{} penalty",
                tx.sender(),
                tx.receiver(),
                tx.amount(),
                accrual.days_late,
                accrual.interest,
                accrual.penalty
            );
        } else {
            println!("  {:<5} → {:<5} {:>8}  on time", tx.sender(), tx.receiver(), tx.amount());
        }
    }

    println!("\n━━━ Adjusted Transactions ━━━\n");
    for tx in &report.adjusted {
        println!("  {:<5} → {:<5} {:>8}", tx.sender(), tx.receiver(), tx.amount());
    }

    println!("\n━━━ Dropped Records ━━━\n");
    for rejection in &report.rejected {
        println!("  record {}: {}", rejection.index, rejection.reason);
    }

    println!("\n{}", report.summary);

    println!("━━━ Transfers ━━━\n");
    for transfer in &report.transfers {
        println!("  {}", transfer);
    }
}
