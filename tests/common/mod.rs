// --- CONSTANTS ---
#[allow(dead_code)]
pub const ACCESS_TOKEN: &str = "API_TOKEN_1234567890";
#[allow(dead_code)]
pub const CALENDAR_ID: &str = "cal_n23kjnwrw2_jsdfjksn234";
#[allow(dead_code)]
pub const EVENT_ID: &str = "qTtZdczOccgaPncGJaCiLg";

use cronofy_rs::Client;
use wiremock::MockServer;

/// Builds a client pointed at the given mock server.
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .auth(ACCESS_TOKEN)
        .build()
        .unwrap()
}

/// Builds a read-events page body with the given events and, optionally, a
/// next-page cursor.
#[allow(dead_code)]
pub fn events_page(events: serde_json::Value, next_page: Option<&str>) -> serde_json::Value {
    let mut pages = serde_json::json!({ "current": 1, "total": 1 });
    if let Some(next_page) = next_page {
        pages["next_page"] = serde_json::json!(next_page);
    }
    serde_json::json!({ "pages": pages, "events": events })
}

/// A minimal event body with the given summary.
#[allow(dead_code)]
pub fn an_event(summary: &str) -> serde_json::Value {
    serde_json::json!({
        "calendar_id": CALENDAR_ID,
        "event_uid": format!("evt_external_{summary}"),
        "summary": summary,
        "start": "2024-03-01 09:00:00Z",
        "end": "2024-03-01 10:00:00Z",
        "deleted": false
    })
}
