use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Local, NaiveDate};
use tower::ServiceExt;

use autobook::config::{AppConfig, AutomationSettings};
use autobook::models::BookingTarget;
use autobook::services::browser::{BrowserError, BrowserProvider, BrowserSession};
use autobook::services::datetime::months_to_advance;
use autobook::state::AppState;

// ── Mock Browser ──

#[derive(Clone, Copy)]
enum Fault {
    Timeout,
    Crash,
}

#[derive(Clone, Default)]
struct MockBrowser {
    calls: Arc<Mutex<Vec<String>>>,
    opened: Arc<Mutex<usize>>,
    closed: Arc<Mutex<usize>>,
    fault: Option<(&'static str, Fault)>,
    goto_delay: Duration,
}

impl MockBrowser {
    fn with_fault(prefix: &'static str, fault: Fault) -> Self {
        Self {
            fault: Some((prefix, fault)),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn opened(&self) -> usize {
        *self.opened.lock().unwrap()
    }

    fn closed(&self) -> usize {
        *self.closed.lock().unwrap()
    }
}

struct MockSession(MockBrowser);

impl MockSession {
    fn act(&self, call: String) -> Result<(), BrowserError> {
        let outcome = match self.0.fault {
            Some((prefix, Fault::Timeout)) if call.starts_with(prefix) => {
                Err(BrowserError::Timeout(format!("{call} timed out")))
            }
            Some((prefix, Fault::Crash)) if call.starts_with(prefix) => {
                Err(BrowserError::Other(format!("{call} crashed")))
            }
            _ => Ok(()),
        };
        self.0.calls.lock().unwrap().push(call);
        outcome
    }
}

#[async_trait]
impl BrowserProvider for MockBrowser {
    async fn open_session(&self, _headless: bool) -> Result<Box<dyn BrowserSession>, BrowserError> {
        *self.opened.lock().unwrap() += 1;
        Ok(Box::new(MockSession(self.clone())))
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        tokio::time::sleep(self.0.goto_delay).await;
        self.act(format!("goto {url}"))
    }

    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError> {
        self.act("idle".to_string())
    }

    async fn click_label(&mut self, label: &str) -> Result<(), BrowserError> {
        self.act(format!("click {label}"))
    }

    async fn click_button(&mut self, name: &str, _exact: bool) -> Result<(), BrowserError> {
        self.act(format!("button {name}"))
    }

    async fn fill_label(&mut self, label: &str, value: &str) -> Result<(), BrowserError> {
        self.act(format!("fill {label} = {value}"))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        *self.0.closed.lock().unwrap() += 1;
        Ok(())
    }
}

// ── Helpers ──

fn test_config(target: BookingTarget) -> AppConfig {
    AppConfig {
        port: 8080,
        webdriver_url: "http://localhost:9515".to_string(),
        target,
        automation: AutomationSettings {
            action_timeout: Duration::from_millis(100),
            navigation_timeout: Duration::from_millis(100),
            post_submit_delay: Duration::ZERO,
        },
    }
}

fn test_app(browser: MockBrowser, target: BookingTarget) -> Router {
    let state = Arc::new(AppState {
        config: test_config(target),
        browser: Box::new(browser),
    });
    autobook::router(state)
}

fn book_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/book")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body(date: &str) -> String {
    serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "+15551234567",
        "details": "Need help with\nthe analytical engine",
        "date": date,
    })
    .to_string()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let app = test_app(MockBrowser::default(), BookingTarget::processpulse());

    let (status, json) = send(
        app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["target"], "processpulse");
}

// ── Request validation ──

#[tokio::test]
async fn test_malformed_json() {
    let browser = MockBrowser::default();
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let (status, json) = send(app, book_request("{\"name\": \"Ada\",")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid JSON format.");
    assert_eq!(browser.opened(), 0);
}

#[tokio::test]
async fn test_json_without_content_type() {
    let browser = MockBrowser::default();
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let req = Request::builder()
        .method("POST")
        .uri("/book")
        .body(Body::from(valid_body("2020-01-15T10:00:00Z")))
        .unwrap();
    let (status, _) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(browser.opened(), 1);
}

#[tokio::test]
async fn test_missing_each_field() {
    for field in ["name", "email", "phone", "details", "date"] {
        let browser = MockBrowser::default();
        let app = test_app(browser.clone(), BookingTarget::rollins());

        let mut body: serde_json::Value =
            serde_json::from_str(&valid_body("2024-10-25T13:30:00Z")).unwrap();
        body.as_object_mut().unwrap().remove(field);

        let (status, json) = send(app, book_request(&body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(
            json["message"],
            "Invalid request. Please provide all required data."
        );
        assert_eq!(browser.opened(), 0, "missing {field} must not start a browser");
    }
}

#[tokio::test]
async fn test_empty_field_counts_as_missing() {
    let browser = MockBrowser::default();
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let body = serde_json::json!({
        "name": "",
        "email": "ada@example.com",
        "phone": "+15551234567",
        "details": "x",
        "date": "2024-10-25T13:30:00Z",
    });
    let (status, _) = send(app, book_request(&body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(browser.opened(), 0);
}

#[tokio::test]
async fn test_malformed_date() {
    let browser = MockBrowser::default();
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let (status, json) = send(app, book_request(&valid_body("next friday at 3"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Invalid request. Please provide all required data."
    );
    assert_eq!(browser.opened(), 0);
}

#[tokio::test]
async fn test_non_object_body() {
    let browser = MockBrowser::default();
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let (status, _) = send(app, book_request("[1, 2, 3]")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(browser.opened(), 0);
}

// ── Booking outcomes ──

#[tokio::test]
async fn test_successful_booking() {
    let browser = MockBrowser::default();
    let app = test_app(browser.clone(), BookingTarget::rollins());

    // A past month so no paging happens regardless of the current date.
    let (status, json) = send(app, book_request(&valid_body("2020-01-15T10:00:00Z"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Appointment booked successfully!");
    assert_eq!(browser.opened(), 1);
    assert_eq!(browser.closed(), 1);

    let calls = browser.calls();
    assert_eq!(calls[0], "goto https://calendly.com/arollins00/15min");
    assert!(calls.contains(&"click Wednesday, January 15 - Times".to_string()));
    assert!(calls.contains(&"button 10:00am".to_string()));
    assert!(calls.contains(&"click Next 10:00am".to_string()));
    assert!(calls.contains(&"fill Please share anything that = Need help with\nthe analytical engine".to_string()));
    assert!(calls.contains(&"fill Send text messages to = +15551234567".to_string()));
    assert_eq!(calls.last().unwrap(), "button Schedule Event");
}

#[tokio::test]
async fn test_month_paging_matches_month_difference() {
    let today = Local::now().date_naive();
    let requested = NaiveDate::from_ymd_opt(today.year() + 1, 3, 10).unwrap();
    let expected = months_to_advance(today, requested) as usize;

    let browser = MockBrowser::default();
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let iso = format!("{}T15:00:00Z", requested.format("%Y-%m-%d"));
    let (status, _) = send(app, book_request(&valid_body(&iso))).await;

    assert_eq!(status, StatusCode::OK);
    let clicks = browser
        .calls()
        .iter()
        .filter(|c| c.as_str() == "click Go to next month")
        .count();
    assert_eq!(clicks, expected);
    assert!(expected >= 3);
}

#[tokio::test]
async fn test_date_unavailable() {
    let browser = MockBrowser::with_fault("click Friday, October 25", Fault::Timeout);
    let app = test_app(browser.clone(), BookingTarget::processpulse());

    let (status, json) = send(app, book_request(&valid_body("2024-10-25T13:30:00Z"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Date 'Friday, October 25' not available.");
    assert_eq!(browser.closed(), 1);
}

#[tokio::test]
async fn test_time_slot_unavailable() {
    let browser = MockBrowser::with_fault("button 1:30pm", Fault::Timeout);
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let (status, json) = send(app, book_request(&valid_body("2024-10-25T13:30:00Z"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Time slot '1:30pm' not available.");
    assert_eq!(browser.closed(), 1);
}

#[tokio::test]
async fn test_timeout_while_filling_form() {
    let browser = MockBrowser::with_fault("fill Phone Number *", Fault::Timeout);
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let (status, json) = send(app, book_request(&valid_body("2024-10-25T13:30:00Z"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Failed to book appointment due to timeout.");
    assert_eq!(browser.closed(), 1);
    assert!(!browser.calls().iter().any(|c| c == "button Schedule Event"));
}

#[tokio::test]
async fn test_unexpected_error() {
    let browser = MockBrowser::with_fault("button Schedule Event", Fault::Crash);
    let app = test_app(browser.clone(), BookingTarget::rollins());

    let (status, json) = send(app, book_request(&valid_body("2024-10-25T13:30:00Z"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "An unexpected error occurred.");
    assert_eq!(browser.closed(), 1);
}

#[tokio::test]
async fn test_session_closed_once_per_request() {
    let cases = [
        MockBrowser::default(),
        MockBrowser::with_fault("goto", Fault::Crash),
        MockBrowser::with_fault("idle", Fault::Timeout),
        MockBrowser::with_fault("click Friday", Fault::Timeout),
        MockBrowser::with_fault("button 1:30pm", Fault::Crash),
        MockBrowser::with_fault("fill Email", Fault::Crash),
    ];

    for browser in cases {
        let app = test_app(browser.clone(), BookingTarget::rollins());
        send(app, book_request(&valid_body("2024-10-25T13:30:00Z"))).await;

        assert_eq!(browser.opened(), 1);
        assert_eq!(browser.closed(), 1);
    }
}

#[tokio::test]
async fn test_session_closed_when_client_disconnects() {
    let browser = MockBrowser {
        goto_delay: Duration::from_millis(500),
        ..Default::default()
    };
    let app = test_app(browser.clone(), BookingTarget::rollins());

    // The client gives up while the page is still loading.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        app.oneshot(book_request(&valid_body("2024-10-25T13:30:00Z"))),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(browser.opened(), 1);

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert_eq!(browser.closed(), 1);
    assert_eq!(browser.calls().last().unwrap(), "button Schedule Event");
}
