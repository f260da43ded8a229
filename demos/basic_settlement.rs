//! Basic settlement example.
//!
//! Shows how a tangle of shared-expense debts collapses into a handful
//! of settling transfers.

use cashflow_settlement::core::party::PartyId;
use cashflow_settlement::core::transaction::Transaction;
use cashflow_settlement::optimization::minimizer::{balances, minimize};
use cashflow_settlement::optimization::summary::SettlementSummary;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  cashflow-settlement: Basic Settlement Example ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // --- Scenario 1: A chain collapses to one payment ---
    println!("━━━ Scenario 1: Transitive Chain ━━━\n");

    let ana = PartyId::new("ana");
    let ben = PartyId::new("ben");
    let cleo = PartyId::new("cleo");
    let dev = PartyId::new("dev");
    let eli = PartyId::new("eli");

    let chain = vec![
        Transaction::new(ana.clone(), ben.clone(), dec!(100)),
        Transaction::new(ben.clone(), cleo.clone(), dec!(100)),
    ];
    for transfer in minimize(&chain) {
        println!("  {}", transfer);
    }
    println!();

    // --- Scenario 2: A shared-house month ---
    println!("━━━ Scenario 2: Shared House (5 people) ━━━\n");

    let month = vec![
        Transaction::new(ana.clone(), ben.clone(), dec!(62.40)),
        Transaction::new(ben.clone(), cleo.clone(), dec!(18.00)),
        Transaction::new(cleo.clone(), dev.clone(), dec!(45.75)),
        Transaction::new(dev.clone(), ana.clone(), dec!(30.00)),
        Transaction::new(eli.clone(), ben.clone(), dec!(120.00)),
        Transaction::new(ana.clone(), eli.clone(), dec!(12.50)),
        Transaction::new(dev.clone(), cleo.clone(), dec!(9.99)),
        Transaction::new(cleo.clone(), eli.clone(), dec!(33.10)),
    ];

    let transfers = minimize(&month);
    println!("{}", SettlementSummary::from_stages(&month, &month, &transfers));

    println!("━━━ Net Balances ━━━\n");
    for (party, balance) in balances(&month).iter() {
        let status = if balance > dec!(0) {
            "CREDITOR"
        } else if balance < dec!(0) {
            "DEBTOR"
        } else {
            "SETTLED"
        };
        println!("  {:<8} {:>10}  [{}]", party, balance, status);
    }

    println!("\n━━━ Transfers ━━━\n");
    for transfer in &transfers {
        println!("  {}", transfer);
    }
}
