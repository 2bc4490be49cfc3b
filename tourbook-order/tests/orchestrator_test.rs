mod common;

use common::{tour_detail, GatewayOutcome, Harness, OPERATOR};
use tourbook_catalog::SubmittedRider;
use tourbook_order::notification::NO_CONF_SENT_PREFIX;
use tourbook_order::{CheckoutRequest, ConfirmError, WarningKind};

fn request(rider_count: i64, quoted_total: &str) -> CheckoutRequest {
    CheckoutRequest {
        tour_id: 562,
        rider_count,
        riders: Vec::new(),
        quoted_total: quoted_total.to_string(),
        payment_token: "tok_visa".into(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        mobile: "555-0100".to_string(),
        hotel: "Pod 51".to_string(),
        misc: String::new(),
    }
}

fn rider(gender: &str, height: i64) -> SubmittedRider {
    SubmittedRider {
        gender: gender.to_string(),
        height: Some(height),
    }
}

#[tokio::test]
async fn test_charges_exactly_the_persisted_total() {
    let harness = Harness::new(tour_detail(13.57, 10));

    let result = harness
        .orchestrator()
        .confirm(request(2, "$27.14"))
        .await
        .expect("confirmation should succeed");

    assert_eq!(harness.charges(), vec![2714]);
    let created = harness.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1.total_cents, 2714);
    assert_eq!(result.total_cents, 2714);
    assert_eq!(result.display_total, "$27.14");
    assert!(result.warnings.is_empty());
    assert!(result.email_skipped.is_empty());

    assert_eq!(*harness.orders.payment_recorded.lock().unwrap(), vec![result.order_id]);
    assert_eq!(*harness.orders.confirmation_sent.lock().unwrap(), vec![result.order_id]);

    let customer = harness.notifier.sent_to("ada@example.com");
    assert_eq!(customer.len(), 1);
    assert_eq!(customer[0].bcc.as_ref().map(|m| m.address.as_str()), Some(OPERATOR));
    let operator = harness.notifier.sent_to(OPERATOR);
    assert_eq!(operator.len(), 1);
    assert!(!operator[0].subject.starts_with(NO_CONF_SENT_PREFIX));
}

#[tokio::test]
async fn test_unknown_tour_has_no_side_effects() {
    let harness = Harness::new(tour_detail(13.57, 10));
    let mut req = request(1, "13.57");
    req.tour_id = 999;

    let err = harness.orchestrator().confirm(req).await.unwrap_err();

    assert!(matches!(err, ConfirmError::TourNotFound(999)));
    assert!(harness.created().is_empty());
    assert!(harness.charges().is_empty());
    assert!(harness.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_cent_mismatch_blocks_everything() {
    let harness = Harness::new(tour_detail(10.01, 10));

    let err = harness
        .orchestrator()
        .confirm(request(1, "$10.00"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConfirmError::PricingMismatch {
            quoted_cents: 1000,
            actual_cents: 1001
        }
    ));
    assert_eq!(err.public_message(), "Pricing error");
    assert!(harness.created().is_empty());
    assert!(harness.charges().is_empty());
}

#[tokio::test]
async fn test_zero_riders_is_invalid_input() {
    let harness = Harness::new(tour_detail(13.57, 10));

    let err = harness
        .orchestrator()
        .confirm(request(0, "0"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfirmError::InvalidInput(_)));
    assert!(harness.created().is_empty());
}

#[tokio::test]
async fn test_rider_count_is_checked_before_pricing() {
    let harness = Harness::new(tour_detail(13.57, 10));

    let err = harness
        .orchestrator()
        .confirm(request(0, "$13.57"))
        .await
        .unwrap_err();

    assert_eq!(err.public_message(), "Rider count must be at least 1, got 0");
    assert!(harness.created().is_empty());
    assert!(harness.charges().is_empty());
}

#[tokio::test]
async fn test_rider_count_beyond_storage_range_is_invalid_input() {
    let harness = Harness::new(tour_detail(1.0, 10));
    let too_many = i64::from(i32::MAX) + 1;

    let err = harness
        .orchestrator()
        .confirm(request(too_many, &too_many.to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfirmError::InvalidInput(_)));
    assert!(harness.created().is_empty());
}

#[tokio::test]
async fn test_decline_passes_message_and_keeps_unpaid_order() {
    let mut harness = Harness::new(tour_detail(13.57, 10));
    harness.gateway = std::sync::Arc::new(common::FakeGateway {
        outcome: GatewayOutcome::Decline("insufficient funds".to_string()),
        ..Default::default()
    });

    let err = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .unwrap_err();

    match &err {
        ConfirmError::PaymentDeclined { message, .. } => assert_eq!(message, "insufficient funds"),
        other => panic!("expected decline, got {:?}", other),
    }
    assert_eq!(err.public_message(), "insufficient funds");
    assert_eq!(harness.charges().len(), 1);
    assert_eq!(harness.created().len(), 1);
    assert!(harness.orders.payment_recorded.lock().unwrap().is_empty());
    assert!(harness.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_gateway_error_is_generic_and_not_retried() {
    let mut harness = Harness::new(tour_detail(13.57, 10));
    harness.gateway = std::sync::Arc::new(common::FakeGateway {
        outcome: GatewayOutcome::Fail,
        ..Default::default()
    });

    let err = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfirmError::PaymentFailed { .. }));
    assert_eq!(err.public_message(), "Server error");
    assert_eq!(harness.charges().len(), 1);
}

#[tokio::test]
async fn test_persist_failure_stops_before_charge() {
    let mut harness = Harness::new(tour_detail(13.57, 10));
    harness.orders = std::sync::Arc::new(common::FakeOrders {
        fail_create: true,
        ..Default::default()
    });

    let err = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfirmError::Persist(_)));
    assert!(harness.charges().is_empty());
}

#[tokio::test]
async fn test_missing_heights_warns_and_skips_customer_email() {
    let mut detail = tour_detail(20.0, 10);
    detail.tour.riders_require_height = true;
    let harness = Harness::new(detail);
    let mut req = request(3, "60.00");
    req.riders = vec![rider("F", 64), rider("M", 71)];

    let result = harness.orchestrator().confirm(req).await.unwrap();

    assert!(result.warnings.contains(WarningKind::InvalidHeights));
    assert_eq!(result.riders.len(), 2);
    assert_eq!(harness.created()[0].1.riders.len(), 2);
    assert_eq!(harness.created()[0].1.rider_count, 3);
    assert_eq!(harness.charges(), vec![6000]);
    assert!(result.email_skipped.contains("riders:invalid-heights"));
    assert!(harness.notifier.sent_to("ada@example.com").is_empty());
    assert!(harness.orders.confirmation_sent.lock().unwrap().is_empty());

    let operator = harness.notifier.sent_to(OPERATOR);
    assert_eq!(operator.len(), 1);
    assert!(operator[0].subject.starts_with(NO_CONF_SENT_PREFIX));
    assert!(operator[0].body.contains("Submitted:  2 of 3 rider entries"));
}

#[tokio::test]
async fn test_cancelled_tour_still_sells_but_skips_customer_email() {
    let mut detail = tour_detail(13.57, 10);
    detail.tour.cancelled = true;
    let harness = Harness::new(detail);

    let result = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .unwrap();

    assert!(result.warnings.contains(WarningKind::TourCancelled));
    assert_eq!(result.email_skipped, "blocked by warnings: tour:cancelled");
    assert!(harness.notifier.sent_to("ada@example.com").is_empty());
    let operator = harness.notifier.sent_to(OPERATOR);
    assert!(operator[0].body.contains("SKIPPED (blocked by warnings: tour:cancelled)"));
}

#[tokio::test]
async fn test_past_full_and_oversubscribed_are_advisory() {
    let mut detail = tour_detail(10.0, 2);
    detail.tour.time = chrono::Utc::now() - chrono::Duration::days(1);
    detail.tour.full = true;
    let harness = Harness::new(detail);

    let result = harness
        .orchestrator()
        .confirm(request(3, "30"))
        .await
        .unwrap();

    assert!(result.warnings.contains(WarningKind::TourPast));
    assert!(result.warnings.contains(WarningKind::TourFull));
    assert!(result.warnings.contains(WarningKind::Oversubscribed));
    assert!(result.warnings.to_string().contains("riders(3)>spots(2)"));
    assert_eq!(harness.charges(), vec![3000]);
}

#[tokio::test]
async fn test_manual_confirm_tour_skips_without_warning() {
    let mut detail = tour_detail(13.57, 10);
    detail.tour.auto_confirm = false;
    let harness = Harness::new(detail);

    let result = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .unwrap();

    assert!(result.warnings.is_empty());
    assert_eq!(result.email_skipped, "tour does not auto-confirm");
    assert_eq!(harness.notifier.sent_to(OPERATOR).len(), 1);
}

#[tokio::test]
async fn test_post_payment_failures_degrade_to_warnings() {
    let mut harness = Harness::new(tour_detail(13.57, 10));
    harness.orders = std::sync::Arc::new(common::FakeOrders {
        fail_payment_recorded: true,
        ..Default::default()
    });
    harness.notifier = std::sync::Arc::new(common::FakeNotifier {
        fail_to: Some("ada@example.com".to_string()),
        ..Default::default()
    });

    let result = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .expect("payment succeeded, so the request must succeed");

    assert!(result.warnings.contains(WarningKind::PaymentNotRecorded));
    assert!(result.warnings.contains(WarningKind::CustomerEmailFailed));
    assert_eq!(result.email_skipped, "customer email failed to send");
    assert!(harness.orders.confirmation_sent.lock().unwrap().is_empty());

    let operator = harness.notifier.sent_to(OPERATOR);
    assert_eq!(operator.len(), 1);
    assert!(operator[0].subject.starts_with(NO_CONF_SENT_PREFIX));
}

#[tokio::test]
async fn test_confirmation_flag_and_operator_failures_are_warnings() {
    let mut harness = Harness::new(tour_detail(13.57, 10));
    harness.orders = std::sync::Arc::new(common::FakeOrders {
        fail_confirmation_sent: true,
        ..Default::default()
    });
    harness.notifier = std::sync::Arc::new(common::FakeNotifier {
        fail_to: Some(OPERATOR.to_string()),
        ..Default::default()
    });
    harness.catalog = std::sync::Arc::new({
        let catalog = common::FakeCatalog {
            fail_teams: true,
            ..Default::default()
        };
        *catalog.detail.lock().unwrap() = Some(tour_detail(13.57, 10));
        catalog
    });

    let result = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .unwrap();

    assert!(result.email_skipped.is_empty());
    assert!(result.warnings.contains(WarningKind::ConfirmationNotRecorded));
    assert!(result.warnings.contains(WarningKind::TeamsLookupFailed));
    assert!(result.warnings.contains(WarningKind::OperatorEmailFailed));
    assert_eq!(harness.notifier.sent_to("ada@example.com").len(), 1);
}

#[tokio::test]
async fn test_blank_email_policy() {
    let mut harness = Harness::new(tour_detail(13.57, 10));
    let mut req = request(1, "13.57");
    req.email = "   ".to_string();

    let err = harness.orchestrator().confirm(req.clone()).await.unwrap_err();
    assert!(matches!(err, ConfirmError::InvalidInput(_)));
    assert!(harness.created().is_empty());

    harness.require_email = false;
    req.name = String::new();
    let result = harness.orchestrator().confirm(req).await.unwrap();
    assert!(result.warnings.contains(WarningKind::NoEmail));
    assert!(result.warnings.contains(WarningKind::NoName));
    assert!(result.email_skipped.starts_with("blocked by warnings"));
}

#[tokio::test]
async fn test_catalog_failure_is_fatal() {
    let mut harness = Harness::new(tour_detail(13.57, 10));
    harness.catalog = std::sync::Arc::new(common::FakeCatalog {
        fail_lookup: true,
        ..Default::default()
    });

    let err = harness
        .orchestrator()
        .confirm(request(1, "13.57"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfirmError::Catalog(_)));
    assert_eq!(err.public_message(), "Server error");
}

#[tokio::test]
async fn test_implausible_height_is_not_blocking() {
    let mut detail = tour_detail(10.0, 10);
    detail.tour.riders_require_height = true;
    let harness = Harness::new(detail);
    let mut req = request(1, "10");
    req.riders = vec![rider("F", 120)];

    let result = harness.orchestrator().confirm(req).await.unwrap();

    assert!(result.warnings.contains(WarningKind::UnknownHeights));
    assert!(result.email_skipped.is_empty());
    let operator = harness.notifier.sent_to(OPERATOR);
    assert!(operator[0].body.contains("Heights: UNKNOWN"));
}

#[tokio::test]
async fn test_past_tour_date_is_operator_local() {
    let mut detail = tour_detail(10.0, 10);
    // 9:00 PM on July 4 in New York.
    detail.tour.time = chrono::DateTime::parse_from_rfc3339("2020-07-05T01:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let harness = Harness::new(detail);

    let result = harness
        .orchestrator()
        .confirm(request(1, "$10.00"))
        .await
        .unwrap();

    assert!(result.warnings.to_string().contains("tour:past(2020/07/04)"));
}
