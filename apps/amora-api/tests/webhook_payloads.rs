use serde_json::json;

use amora_api::handlers::webhooks::{extract_charge, extract_subscription, parse_envelope};

#[test]
fn parse_charge_success_envelope() {
    let body = json!({
        "event": "charge.success",
        "data": {
            "id": 302961,
            "reference": "amora_9f3c2d1e8a4b4f0c",
            "amount": 3000,
            "status": "success",
            "customer": { "email": "ada@example.com" }
        }
    });
    let raw = serde_json::to_vec(&body).unwrap();

    let envelope = parse_envelope(&raw).expect("parse envelope");
    assert_eq!(envelope.event, "charge.success");

    let charge = extract_charge(&envelope.data).expect("extract charge");
    assert_eq!(charge.reference, "amora_9f3c2d1e8a4b4f0c");
    assert_eq!(charge.provider_txn_id.as_deref(), Some("302961"));
}

#[test]
fn charge_without_reference_is_rejected() {
    let envelope = parse_envelope(br#"{"event":"charge.success","data":{"id":1}}"#).unwrap();
    assert!(extract_charge(&envelope.data).is_none());
}

#[test]
fn envelope_without_data_still_parses() {
    let envelope = parse_envelope(br#"{"event":"charge.success"}"#).unwrap();
    assert_eq!(envelope.event, "charge.success");
    assert!(extract_charge(&envelope.data).is_none());
}

#[test]
fn malformed_body_yields_none() {
    assert!(parse_envelope(b"not json at all").is_none());
    assert!(parse_envelope(br#"{"no_event": true}"#).is_none());
}

#[test]
fn parse_subscription_create_envelope() {
    let body = json!({
        "event": "subscription.create",
        "data": {
            "subscription_code": "SUB_vsyqdmlzble3uii",
            "email_token": "d7gofp6yppn3qz7",
            "plan": { "plan_code": "PLN_monthly_chat", "name": "Monthly" },
            "customer": { "email": "ada@example.com" }
        }
    });
    let raw = serde_json::to_vec(&body).unwrap();

    let envelope = parse_envelope(&raw).unwrap();
    let sub = extract_subscription(&envelope.data).expect("extract subscription");
    assert_eq!(sub.subscription_code, "SUB_vsyqdmlzble3uii");
    assert_eq!(sub.plan_code.as_deref(), Some("PLN_monthly_chat"));
    assert_eq!(sub.customer_email.as_deref(), Some("ada@example.com"));
    assert_eq!(sub.email_token.as_deref(), Some("d7gofp6yppn3qz7"));
}

#[test]
fn subscription_disable_needs_only_the_code() {
    let envelope = parse_envelope(
        br#"{"event":"subscription.disable","data":{"subscription_code":"SUB_x"}}"#,
    )
    .unwrap();
    let sub = extract_subscription(&envelope.data).unwrap();
    assert_eq!(sub.subscription_code, "SUB_x");
    assert_eq!(sub.plan_code, None);
    assert_eq!(sub.customer_email, None);
}

#[test]
fn invoice_events_nest_the_subscription_code() {
    let body = json!({
        "event": "invoice.update",
        "data": {
            "invoice_code": "INV_1",
            "status": "success",
            "subscription": { "subscription_code": "SUB_y", "status": "active" }
        }
    });
    let raw = serde_json::to_vec(&body).unwrap();

    let envelope = parse_envelope(&raw).unwrap();
    let sub = extract_subscription(&envelope.data).unwrap();
    assert_eq!(sub.subscription_code, "SUB_y");
}

#[test]
fn string_provider_ids_pass_through_unquoted() {
    let envelope = parse_envelope(
        br#"{"event":"charge.success","data":{"id":"trx_abc","reference":"ref_1"}}"#,
    )
    .unwrap();
    let charge = extract_charge(&envelope.data).unwrap();
    assert_eq!(charge.provider_txn_id.as_deref(), Some("trx_abc"));
}
