//! Reservation ledger tests: conservation, clamping, and the audit trail.

#![cfg(feature = "inventory")]

use rust_decimal_macros::dec;
use werkplaats::StockError;
use werkplaats::inventory::{InventoryLedger, StockMoveType};

fn ledger_with(qty: rust_decimal::Decimal) -> InventoryLedger {
    let ledger = InventoryLedger::new();
    ledger.register_product(1, "BRAKE-PAD-V40", qty);
    ledger
}

#[test]
fn reserve_then_release_conserves_quantities() {
    let ledger = ledger_with(dec!(10));

    let levels = ledger.reserve(1, dec!(4), 12, 301).unwrap();
    assert_eq!(levels.qty_available, dec!(6));
    assert_eq!(levels.qty_reserved, dec!(4));
    assert_eq!(levels.qty, dec!(10));

    let levels = ledger.release(1, dec!(4), 12, 301, None).unwrap();
    assert_eq!(levels.qty_reserved, dec!(0));
    assert_eq!(levels.qty_available, dec!(10));

    let moves = ledger.moves_for(1);
    assert_eq!(moves.len(), 2);
    assert_eq!(moves[0].move_type, StockMoveType::Reserved);
    assert_eq!(moves[0].quantity, dec!(4));
    assert_eq!(moves[0].reference, "WO-12");
    assert_eq!(moves[1].move_type, StockMoveType::Released);
    assert_eq!(moves[1].quantity, dec!(-4));
}

#[test]
fn insufficient_stock_carries_the_numbers() {
    let ledger = ledger_with(dec!(3));
    let err = ledger.reserve(1, dec!(5), 12, 301).unwrap_err();
    match err {
        StockError::InsufficientStock {
            available,
            requested,
        } => {
            assert_eq!(available, dec!(3));
            assert_eq!(requested, dec!(5));
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    // A failed reservation must not leave a move behind.
    assert!(ledger.moves_for(1).is_empty());
    assert_eq!(ledger.available_quantity(1), dec!(3));
}

#[test]
fn reservations_reduce_subsequent_availability() {
    let ledger = ledger_with(dec!(10));
    ledger.reserve(1, dec!(7), 12, 301).unwrap();
    assert!(ledger.is_available(1, dec!(3)));
    assert!(!ledger.is_available(1, dec!(4)));
    let err = ledger.reserve(1, dec!(4), 13, 302).unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { .. }));
}

#[test]
fn over_release_clamps_at_zero() {
    let ledger = ledger_with(dec!(10));
    ledger.reserve(1, dec!(2), 12, 301).unwrap();

    let levels = ledger.release(1, dec!(5), 12, 301, Some("line deleted")).unwrap();
    assert_eq!(levels.qty_reserved, dec!(0));
    assert_eq!(levels.qty, dec!(10));

    let moves = ledger.moves_for(1);
    assert_eq!(moves[1].quantity, dec!(-5));
    assert_eq!(moves[1].notes.as_deref(), Some("line deleted"));
}

#[test]
fn consume_floors_both_counters_at_zero() {
    let ledger = ledger_with(dec!(2));
    ledger.reserve(1, dec!(2), 12, 301).unwrap();

    let levels = ledger.consume(1, dec!(3), 12, 77, 301).unwrap();
    assert_eq!(levels.qty, dec!(0));
    assert_eq!(levels.qty_reserved, dec!(0));
    assert!(!levels.is_in_stock);

    let moves = ledger.moves_for(1);
    let out = moves.last().unwrap();
    assert_eq!(out.move_type, StockMoveType::Out);
    assert_eq!(out.quantity, dec!(-3));
    assert_eq!(out.reference, "INV-77");
}

#[test]
fn consume_to_exactly_zero_marks_out_of_stock() {
    let ledger = ledger_with(dec!(2));
    ledger.reserve(1, dec!(2), 12, 301).unwrap();
    let levels = ledger.consume(1, dec!(2), 12, 77, 301).unwrap();
    assert_eq!(levels.qty, dec!(0));
    assert!(!levels.is_in_stock);
}

#[test]
fn partial_consume_stays_in_stock() {
    let ledger = ledger_with(dec!(5));
    ledger.reserve(1, dec!(2), 12, 301).unwrap();
    let levels = ledger.consume(1, dec!(2), 12, 77, 301).unwrap();
    assert_eq!(levels.qty, dec!(3));
    assert_eq!(levels.qty_reserved, dec!(0));
    assert!(levels.is_in_stock);
}

#[test]
fn unknown_product_errors_on_mutation() {
    let ledger = InventoryLedger::new();
    assert!(matches!(
        ledger.reserve(99, dec!(1), 12, 301),
        Err(StockError::NotFound(_))
    ));
    assert!(matches!(
        ledger.release(99, dec!(1), 12, 301, None),
        Err(StockError::NotFound(_))
    ));
    assert!(matches!(
        ledger.consume(99, dec!(1), 12, 77, 301),
        Err(StockError::NotFound(_))
    ));
}

#[test]
fn unknown_product_reads_are_zeroed_not_errors() {
    let ledger = InventoryLedger::new();
    assert_eq!(ledger.available_quantity(99), dec!(0));
    assert!(!ledger.is_available(99, dec!(1)));
    let summary = ledger.summary(99);
    assert_eq!(summary.qty, dec!(0));
    assert_eq!(summary.qty_reserved, dec!(0));
    assert!(!summary.is_in_stock);
}

#[test]
fn every_mutation_writes_exactly_one_move() {
    let ledger = ledger_with(dec!(10));
    ledger.reserve(1, dec!(4), 12, 301).unwrap();
    ledger.release(1, dec!(1), 12, 301, None).unwrap();
    ledger.consume(1, dec!(3), 12, 77, 301).unwrap();
    assert_eq!(ledger.moves_for(1).len(), 3);

    // Ids are assigned in order and the log is append-only.
    let moves = ledger.moves_for(1);
    assert!(moves.windows(2).all(|w| w[0].id < w[1].id));
}

#[test]
fn concurrent_reservations_never_oversell() {
    use std::sync::Arc;

    let ledger = Arc::new(ledger_with(dec!(10)));
    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            std::thread::spawn(move || ledger.reserve(1, dec!(3), 12, 300 + i).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(false))
        .filter(|&ok| ok)
        .count();

    // 10 on hand, 3 per reservation: at most 3 can succeed.
    assert_eq!(successes, 3);
    let summary = ledger.summary(1);
    assert_eq!(summary.qty_reserved, dec!(9));
    assert_eq!(summary.qty_available, dec!(1));
}
