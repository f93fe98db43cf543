use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use werkplaats::vat::*;

fn breakdown_bench(c: &mut Criterion) {
    let store = VatStore::new(MemoryBackend::with_dutch_defaults());
    let customer = CustomerVatInfo::default();
    let codes = ["HIGH", "LOW", "ZERO", "REVERSED"];
    let lines: Vec<InvoiceLine> = (0..100)
        .map(|i| InvoiceLine {
            amount: Decimal::new(1000 + i as i64 * 7, 2),
            vat_rate_code: codes[i % codes.len()].into(),
        })
        .collect();

    c.bench_function("invoice_breakdown_100_lines", |b| {
        b.iter(|| calculate_invoice_vat(black_box(&store), black_box(&lines), &customer).unwrap())
    });

    let breakdown = calculate_invoice_vat(&store, &lines, &customer).unwrap();
    c.bench_function("validate_invoice_totals", |b| {
        b.iter(|| validate_invoice_totals(black_box(&breakdown)))
    });
}

criterion_group!(benches, breakdown_bench);
criterion_main!(benches);
