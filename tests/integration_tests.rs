use cashflow_settlement::core::party::PartyId;
use cashflow_settlement::core::temporal::parse_instant;
use cashflow_settlement::core::transaction::{RawTransaction, SettlementTransfer, Transaction};
use cashflow_settlement::ingest::validator::{parse_batch, validate};
use cashflow_settlement::optimization::minimizer::{balances, minimize};
use cashflow_settlement::pipeline::{PipelineConfig, SettleError, SettlementPipeline};
use cashflow_settlement::schedule::chronology::sort_chronologically;
use cashflow_settlement::schedule::constraints::apply_constraints;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn raw(value: serde_json::Value) -> RawTransaction {
    RawTransaction::from(value)
}

fn transfer(from: &str, to: &str, amount: Decimal) -> SettlementTransfer {
    SettlementTransfer {
        sender: PartyId::new(from),
        receiver: PartyId::new(to),
        amount,
    }
}

/// Full pipeline, stage by stage: raw records → validate → sort → accrue → minimize.
#[test]
fn full_pipeline_household_scenario() {
    let batch = parse_batch(
        r#"{
          "transactions": [
            { "sender": "ana",  "receiver": "ben",  "amount": 120,    "timestamp": "2024-03-02T09:00:00" },
            { "sender": "ben",  "receiver": "cleo", "amount": "45.5", "timestamp": "2024-03-01T18:30:00" },
            { "sender": "cleo", "receiver": "ana",  "amount": 30,     "timestamp": "2024-03-03",
              "due_date": "2024-03-10", "interest_rate": 0.01, "penalty": 2 },
            { "sender": "dev",  "receiver": "ana",  "amount": 0 },
            { "sender": "dev",  "receiver": "ben",  "amount": 20,     "penalty": null },
            { "receiver": "ben", "amount": 99 }
          ]
        }"#,
    )
    .unwrap();
    assert_eq!(batch.len(), 6);

    let valid = validate(&batch);
    assert_eq!(valid.len(), 4);

    let ordered = sort_chronologically(&valid);
    let order: Vec<&str> = ordered.iter().map(|t| t.sender().as_str()).collect();
    assert_eq!(order, vec!["dev", "ben", "ana", "cleo"]);

    // Paid 2024-03-15: cleo is 5 days late on 30 → 30 + 1.5 + 2 = 33.50
    let adjusted = apply_constraints(&ordered, parse_instant("2024-03-15"));
    assert_eq!(adjusted[3].amount(), dec!(33.50));
    assert_eq!(adjusted[0].amount(), dec!(20));

    let net = balances(&adjusted);
    assert!(net.is_balanced());
    // ana: -120 + 33.5 = -86.5; ben: +120 - 45.5 + 20 = 94.5;
    // cleo: +45.5 - 33.5 = 12; dev: -20
    assert_eq!(net.position(&PartyId::new("ana")), dec!(-86.5));
    assert_eq!(net.position(&PartyId::new("ben")), dec!(94.5));
    assert_eq!(net.position(&PartyId::new("cleo")), dec!(12));
    assert_eq!(net.position(&PartyId::new("dev")), dec!(-20));

    let transfers = minimize(&adjusted);
    assert_eq!(
        transfers,
        vec![
            transfer("ana", "ben", dec!(86.50)),
            transfer("dev", "cleo", dec!(12)),
            transfer("dev", "ben", dec!(8)),
        ]
    );
}

#[test]
fn scenario_a_transitive_cancellation() {
    let txs = vec![
        Transaction::new(PartyId::new("A"), PartyId::new("B"), dec!(100)),
        Transaction::new(PartyId::new("B"), PartyId::new("C"), dec!(100)),
    ];
    assert_eq!(minimize(&txs), vec![transfer("A", "C", dec!(100))]);
}

#[test]
fn scenario_b_two_debtors_one_creditor() {
    let txs = vec![
        Transaction::new(PartyId::new("A"), PartyId::new("B"), dec!(50)),
        Transaction::new(PartyId::new("C"), PartyId::new("B"), dec!(30)),
    ];
    let net = balances(&txs);
    assert_eq!(net.position(&PartyId::new("A")), dec!(-50));
    assert_eq!(net.position(&PartyId::new("B")), dec!(80));
    assert_eq!(net.position(&PartyId::new("C")), dec!(-30));

    let transfers = minimize(&txs);
    assert_eq!(transfers.len(), 2);
    assert!(transfers.iter().all(|t| t.receiver.as_str() == "B"));
    let total: Decimal = transfers.iter().map(|t| t.amount).sum();
    assert_eq!(total, dec!(80));
}

#[test]
fn scenario_c_interest_and_penalty() {
    let reference = parse_instant("2024-05-11T12:00:00").unwrap();
    let due = "2024-05-01T12:00:00";
    let tx = Transaction::new(PartyId::new("A"), PartyId::new("B"), dec!(100))
        .with_due_date(due)
        .with_interest_rate(dec!(0.01))
        .with_penalty(dec!(5));
    let adjusted = apply_constraints(&[tx], Some(reference));
    assert_eq!(adjusted[0].amount(), dec!(115.00));
}

#[test]
fn scenario_d_empty_input() {
    assert!(validate(&[]).is_empty());
    assert!(minimize(&[]).is_empty());
}

#[test]
fn empty_valid_input_is_surfaced_by_pipeline() {
    let batch = vec![
        raw(json!({"sender": "A", "receiver": "B", "amount": -10})),
        raw(json!("garbage")),
    ];
    match SettlementPipeline::default().run(&batch) {
        Err(SettleError::NoValidTransactions { rejected }) => assert_eq!(rejected, 2),
        other => panic!("expected NoValidTransactions, got {:?}", other),
    }
}

#[test]
fn pipeline_matches_manual_stages() {
    let batch = vec![
        raw(json!({"sender": "A", "receiver": "B", "amount": 40, "timestamp": "2024-01-05",
                   "due_date": "2024-01-10", "interest_rate": "0.002", "penalty": 1})),
        raw(json!({"sender": "B", "receiver": "C", "amount": 25, "timestamp": "2024-01-02"})),
        raw(json!({"sender": "C", "receiver": "A", "amount": 10})),
    ];
    let payment_date = parse_instant("2024-02-09");

    let manual = minimize(&apply_constraints(
        &sort_chronologically(&validate(&batch)),
        payment_date,
    ));
    let report = SettlementPipeline::new(PipelineConfig {
        payment_date,
        ..Default::default()
    })
    .run(&batch)
    .unwrap();

    assert_eq!(report.transfers, manual);
    assert!(report.rejected.is_empty());
}

#[test]
fn self_transfers_contribute_nothing() {
    let txs = validate(&[
        raw(json!({"sender": "A", "receiver": "A", "amount": 500})),
        raw(json!({"sender": "B", "receiver": "C", "amount": 5})),
    ]);
    assert_eq!(txs.len(), 2);
    assert_eq!(minimize(&txs), vec![transfer("B", "C", dec!(5))]);
    assert_eq!(balances(&txs).position(&PartyId::new("A")), Decimal::ZERO);
}

#[test]
fn settlement_report_json_shape() {
    let batch = vec![raw(json!({"sender": "A", "receiver": "B", "amount": "12.34"}))];
    let report = SettlementPipeline::default().run(&batch).unwrap();
    let json = serde_json::to_string_pretty(&report).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["transfers"][0]["amount"], "12.34");
    assert_eq!(parsed["summary"]["transfer_count"], 1);
    assert!(parsed.get("payment_date").is_some());
}

#[test]
fn oversized_batch_settles_without_overflow() {
    let batch = vec![
        raw(json!({"sender": "A", "receiver": "B", "amount": "50000000000000000000000000000"})),
        raw(json!({"sender": "C", "receiver": "B", "amount": "50000000000000000000000000000"})),
    ];
    let report = SettlementPipeline::default().run(&batch).unwrap();

    assert_eq!(report.adjusted.len(), 2);
    assert_eq!(
        report.transfers,
        vec![transfer("A", "B", dec!(50000000000000000000000000000))]
    );
    assert_eq!(report.summary.gross_total, Decimal::MAX);
}

#[test]
fn sub_cent_overdue_amount_stays_positive() {
    let batch = vec![raw(json!({
        "sender": "A", "receiver": "B", "amount": "0.001",
        "due_date": "2024-01-01", "penalty": "0.001"
    }))];
    let report = SettlementPipeline::new(PipelineConfig {
        payment_date: parse_instant("2024-01-05"),
        ..Default::default()
    })
    .run(&batch)
    .unwrap();

    assert_eq!(report.adjusted[0].amount(), dec!(0.002));
    assert!(report.transfers.is_empty());
}
