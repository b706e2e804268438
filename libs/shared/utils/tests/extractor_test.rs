use assert_matches::assert_matches;
use axum::http::Request;
use chrono::Duration;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::test_utils::{clock_at, date, time};
use shared_utils::{Clock, RequestContext};

fn parts_with(headers: &[(&str, &str)]) -> axum::http::request::Parts {
    let mut builder = Request::builder().uri("/");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

#[test]
fn test_empty_headers_give_anonymous_context() {
    let context = RequestContext::from_parts(&parts_with(&[])).unwrap();
    assert_eq!(context, RequestContext::default());
    assert!(!context.emergency_override);
}

#[test]
fn test_headers_populate_context() {
    let actor = Uuid::new_v4();
    let actor_header = actor.to_string();
    let context = RequestContext::from_parts(&parts_with(&[
        ("x-actor-id", actor_header.as_str()),
        ("x-forwarded-for", "10.0.0.7, 172.16.0.1"),
        ("x-emergency-override", "true"),
    ]))
    .unwrap();

    assert_eq!(context.actor_id, Some(actor));
    assert_eq!(context.client_ip.as_deref(), Some("10.0.0.7"));
    assert!(context.emergency_override);
}

#[test]
fn test_malformed_headers_are_rejected() {
    let result = RequestContext::from_parts(&parts_with(&[("x-actor-id", "not-a-uuid")]));
    assert_matches!(result, Err(AppError::BadRequest(_)));

    let result = RequestContext::from_parts(&parts_with(&[("x-emergency-override", "maybe")]));
    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[test]
fn test_fixed_clock_only_moves_when_told() {
    let clock = clock_at(2025, 6, 2, 9, 0);
    let first = clock.now();
    assert_eq!(first, date(2025, 6, 2).and_time(time(9, 0)).and_utc());

    clock.advance(Duration::minutes(90));
    assert_eq!(clock.now(), date(2025, 6, 2).and_time(time(10, 30)).and_utc());
}
