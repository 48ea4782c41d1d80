mod common;

use common::*;
use cronofy_rs::error::{Error, ServiceErrorKind};
use cronofy_rs::{EventTime, UpsertEventRequest};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn board_meeting() -> UpsertEventRequest {
    UpsertEventRequest::new(EVENT_ID)
        .summary("Board meeting")
        .description("Discuss plans for the next quarter.")
        .start(EventTime::zoned("2014-08-05 15:30:00Z", "Etc/UTC"))
        .end(EventTime::zoned("2014-08-05 17:00:00Z", "Etc/UTC"))
        .location("Board room")
}

#[tokio::test]
async fn batch_submits_entries_in_order_and_correlates_results() {
    let mock_server = MockServer::start().await;

    // An exact body match pins both the envelope shape and the entry order.
    Mock::given(method("POST"))
        .and(path("/batch"))
        .and(bearer_token(ACCESS_TOKEN))
        .and(body_json(json!({
            "batch": [
                {
                    "method": "POST",
                    "relative_url": format!("/v1/calendars/{CALENDAR_ID}/events"),
                    "data": {
                        "event_id": EVENT_ID,
                        "summary": "Board meeting",
                        "description": "Discuss plans for the next quarter.",
                        "start": { "time": "2014-08-05 15:30:00Z", "tzid": "Etc/UTC" },
                        "end": { "time": "2014-08-05 17:00:00Z", "tzid": "Etc/UTC" },
                        "location": { "description": "Board room" }
                    }
                },
                {
                    "method": "DELETE",
                    "relative_url": format!("/v1/calendars/{CALENDAR_ID}/events"),
                    "data": { "event_id": "evt_gone" }
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "batch": [
                { "status": 202 },
                { "status": 404, "data": { "errors": { "event_id": [{ "key": "errors.not_found" }] } } }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server)
        .batch()
        .upsert_event(CALENDAR_ID, &board_meeting())
        .delete_event(CALENDAR_ID, "evt_gone")
        .execute()
        .await
        .unwrap();

    let entries = response.entries();
    assert_eq!(entries.len(), 2);

    // Result 0 pairs with the upsert, result 1 with the delete — a partial
    // failure never reorders results or fails the overall call.
    assert_eq!(entries[0].status().as_u16(), 202);
    assert!(entries[0].is_success());
    assert_eq!(entries[0].request().method(), "POST");
    assert_eq!(
        entries[0].request().data()["summary"],
        json!("Board meeting")
    );

    assert_eq!(entries[1].status().as_u16(), 404);
    assert!(!entries[1].is_success());
    assert_eq!(entries[1].request().method(), "DELETE");
    assert_eq!(entries[1].request().data()["event_id"], json!("evt_gone"));
    assert!(entries[1].data().is_some());

    assert!(response.has_errors());
    assert_eq!(response.errors().count(), 1);
}

#[tokio::test]
async fn all_successful_entries_report_no_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch"))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "batch": [{ "status": 202 }, { "status": 202 }]
        })))
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server)
        .batch()
        .delete_event(CALENDAR_ID, "evt_1")
        .delete_event(CALENDAR_ID, "evt_2")
        .execute()
        .await
        .unwrap();

    assert!(!response.has_errors());
    assert_eq!(response.errors().count(), 0);
}

#[tokio::test]
async fn mismatched_reply_length_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch"))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "batch": [{ "status": 202 }]
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .batch()
        .delete_event(CALENDAR_ID, "evt_1")
        .delete_event(CALENDAR_ID, "evt_2")
        .execute()
        .await
        .unwrap_err();

    let Error::Service(service) = err else {
        panic!("expected a service error, got {err:?}");
    };
    assert!(matches!(
        service.kind(),
        ServiceErrorKind::InvalidPayload(_)
    ));
}

#[tokio::test]
async fn rejected_envelope_is_an_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"errors":{"batch":"too large"}}"#),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .batch()
        .delete_event(CALENDAR_ID, "evt_1")
        .execute()
        .await
        .unwrap_err();

    let Error::Service(service) = err else {
        panic!("expected a service error, got {err:?}");
    };
    assert_eq!(service.status().as_u16(), 400);
    match service.kind() {
        ServiceErrorKind::Api(api) => {
            assert_eq!(api.body, r#"{"errors":{"batch":"too large"}}"#);
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}
