//! Concurrent lookups: isolation between requests and telemetry totals.

use std::sync::Arc;

use futures_util::future::join_all;

use order_enrichment::observability::SignalKind;

mod common;
use common::Harness;

const EXPECTED: [(&str, &str); 5] = [
    ("ORD-001", "123"),
    ("ORD-002", "456"),
    ("ORD-003", "789"),
    ("ORD-004", "999"),
    ("ORD-005", "123"),
];

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_do_not_mix_customers() {
    let customers = Harness::new("customer-service");
    let customer_addr = common::start_customer_service(&customers).await;
    let orders = Harness::new("order-service");
    let service = Arc::new(common::order_service(customer_addr, 2000, orders.telemetry.clone()));

    let rounds = 10;
    let tasks = (0..rounds).flat_map(|_| EXPECTED).map(|(order_id, customer_id)| {
        let service = service.clone();
        tokio::spawn(async move {
            let order = service.get(order_id).await.unwrap();
            (order_id, customer_id, order)
        })
    });

    for joined in join_all(tasks).await {
        let (order_id, customer_id, order) = joined.unwrap();
        assert_eq!(order.order_id(), order_id);
        assert_eq!(order.customer_id(), customer_id);
        assert_eq!(order.customer().map(|c| c.customer_id()), Some(customer_id));
    }

    let total = rounds * EXPECTED.len();
    let rec = &orders.recording;
    assert_eq!(rec.count(SignalKind::Event, "OrderRequest"), total);
    assert_eq!(rec.count(SignalKind::Event, "CustomerEnrichmentSuccess"), total);
    assert_eq!(rec.open_spans(), 0);

    // Every enrichment span names the order it belongs to.
    for start in rec.matching(SignalKind::SpanStart, "customer.enrichment") {
        let order_id = start.attribute("order.id").unwrap();
        let customer_id = EXPECTED.iter().find(|(o, _)| *o == order_id).unwrap().1;
        assert_eq!(start.attribute("customer.id"), Some(customer_id));
    }

    let metrics = orders.metrics.snapshot();
    assert_eq!(
        metrics.counter("telemetry_events_total", &[("event", "OrderRequest")]),
        total as u64
    );
    assert_eq!(
        metrics
            .histogram("customer.enrichment.duration", &[("outcome", "success")])
            .count,
        total as u64
    );
    assert_eq!(
        metrics.counter(
            "telemetry_spans_total",
            &[("span", "order.processing"), ("status", "ok")]
        ),
        total as u64
    );
}

#[tokio::test]
async fn test_repeated_lookups_are_identical() {
    let customers = Harness::new("customer-service");
    let customer_addr = common::start_customer_service(&customers).await;
    let orders = Harness::new("order-service");
    let service = common::order_service(customer_addr, 2000, orders.telemetry.clone());

    let first = service.get("ORD-003").await.unwrap();
    let second = service.get("ORD-003").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );

    // Each lookup reports on its own.
    assert_eq!(orders.recording.count(SignalKind::SpanEnd, "order.processing"), 2);
    assert_eq!(orders.recording.count(SignalKind::SpanEnd, "customer.enrichment"), 2);
}
