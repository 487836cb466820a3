//! W3C WebDriver backend. Talks JSON over HTTP to chromedriver (or any
//! compatible remote end) and maps label lookups onto XPath queries.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use super::{BrowserError, BrowserProvider, BrowserSession};
use crate::config::AutomationSettings;

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);
const IDLE_QUIET_WINDOW: Duration = Duration::from_millis(500);
/// Lifts the resource-timing buffer above the browser's default of 250 so the
/// entry count keeps growing on asset-heavy pages.
const IDLE_PROBE_SCRIPT: &str = "performance.setResourceTimingBufferSize(100000); \
     return [document.readyState, performance.getEntriesByType('resource').length];";

#[derive(Clone)]
struct WebDriverHttp {
    base_url: String,
    client: reqwest::Client,
}

impl WebDriverHttp {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, BrowserError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("failed to reach WebDriver at {url}"))?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse WebDriver response")?;

        if !status.is_success() {
            return Err(error_from_payload(&data));
        }

        Ok(data.get("value").cloned().unwrap_or(Value::Null))
    }
}

fn error_from_payload(data: &Value) -> BrowserError {
    let code = data["value"]["error"].as_str().unwrap_or("unknown error");
    let message = data["value"]["message"].as_str().unwrap_or_default();
    let text = if message.is_empty() {
        code.to_string()
    } else {
        format!("{code}: {message}")
    };

    match code {
        "no such element" | "timeout" | "script timeout" => BrowserError::Timeout(text),
        _ => BrowserError::Other(text),
    }
}

pub struct WebDriverProvider {
    http: WebDriverHttp,
    settings: AutomationSettings,
}

impl WebDriverProvider {
    pub fn new(base_url: String, settings: AutomationSettings) -> Self {
        Self {
            http: WebDriverHttp {
                base_url: base_url.trim_end_matches('/').to_string(),
                client: reqwest::Client::new(),
            },
            settings,
        }
    }
}

#[async_trait]
impl BrowserProvider for WebDriverProvider {
    async fn open_session(&self, headless: bool) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
        if headless {
            args.push("--headless=new");
        }

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args },
                }
            }
        });

        let value = self
            .http
            .send(Method::POST, "/session", Some(capabilities))
            .await?;
        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::Other(format!("no sessionId in response: {value}")))?
            .to_string();

        tracing::debug!(session_id = %session_id, headless, "webdriver session created");

        let mut session = WebDriverSession {
            http: self.http.clone(),
            session_id,
            settings: self.settings.clone(),
            closed: false,
        };

        if let Err(e) = session.apply_timeouts().await {
            if let Err(close_err) = session.close().await {
                tracing::warn!(error = %close_err, "failed to close session after setup error");
            }
            return Err(e);
        }

        Ok(Box::new(session))
    }
}

pub struct WebDriverSession {
    http: WebDriverHttp,
    session_id: String,
    settings: AutomationSettings,
    closed: bool,
}

impl WebDriverSession {
    async fn post(&self, suffix: &str, body: Value) -> Result<Value, BrowserError> {
        let path = format!("/session/{}{}", self.session_id, suffix);
        self.http.send(Method::POST, &path, Some(body)).await
    }

    async fn apply_timeouts(&self) -> Result<(), BrowserError> {
        let navigation = millis(self.settings.navigation_timeout);
        self.post(
            "/timeouts",
            json!({
                "implicit": millis(self.settings.action_timeout),
                "pageLoad": navigation,
                "script": navigation,
            }),
        )
        .await?;
        Ok(())
    }

    /// Relies on the implicit wait set at session start, so a missing element
    /// comes back as `no such element` only after the action timeout.
    async fn find(&self, xpath: &str, what: &str) -> Result<String, BrowserError> {
        let value = self
            .post("/element", json!({ "using": "xpath", "value": xpath }))
            .await
            .map_err(|e| match e {
                BrowserError::Timeout(_) => BrowserError::Timeout(format!(
                    "{what} not found within {}ms",
                    millis(self.settings.action_timeout)
                )),
                other => other,
            })?;

        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Other(format!("malformed element reference: {value}")))
    }

    async fn find_and_click(&self, xpath: &str, what: &str) -> Result<(), BrowserError> {
        let element = self.find(xpath, what).await?;
        self.post(&format!("/element/{element}/click"), json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError> {
        let started = Instant::now();
        let mut last_count = None;
        let mut quiet_since = Instant::now();

        loop {
            let probe = self
                .post("/execute/sync", json!({ "script": IDLE_PROBE_SCRIPT, "args": [] }))
                .await?;
            let complete = probe[0].as_str() == Some("complete");
            let count = probe[1].as_u64();

            if count != last_count {
                last_count = count;
                quiet_since = Instant::now();
            } else if complete && quiet_since.elapsed() >= IDLE_QUIET_WINDOW {
                return Ok(());
            }

            if started.elapsed() >= self.settings.navigation_timeout {
                return Err(BrowserError::Timeout(format!(
                    "page not idle after {}ms",
                    millis(self.settings.navigation_timeout)
                )));
            }
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }

    async fn click_label(&mut self, label: &str) -> Result<(), BrowserError> {
        self.find_and_click(&label_xpath(label), &format!("element labelled {label:?}"))
            .await
    }

    async fn click_button(&mut self, name: &str, exact: bool) -> Result<(), BrowserError> {
        self.find_and_click(&button_xpath(name, exact), &format!("button {name:?}"))
            .await
    }

    async fn fill_label(&mut self, label: &str, value: &str) -> Result<(), BrowserError> {
        let element = self
            .find(&label_xpath(label), &format!("field labelled {label:?}"))
            .await?;
        self.post(&format!("/element/{element}/clear"), json!({})).await?;
        self.post(&format!("/element/{element}/value"), json!({ "text": value }))
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let path = format!("/session/{}", self.session_id);
        self.http.send(Method::DELETE, &path, None).await?;
        tracing::debug!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }
}

/// WebDriver timeouts are integer milliseconds; oversized durations clamp.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Quotes `s` as an XPath 1.0 string literal. XPath has no escapes, so
/// strings holding both quote kinds are split with `concat()`.
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }

    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn lowercase(expr: &str) -> String {
    format!("translate({expr}, 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz')")
}

/// Case-insensitive substring match on `aria-label` or on the text of a
/// `<label>` tied to a form control.
fn label_xpath(label: &str) -> String {
    let needle = xpath_literal(&label.to_lowercase());
    let label_text = format!("contains({}, {needle})", lowercase("normalize-space(.)"));

    format!(
        "//*[contains({aria}, {needle})] \
         | //*[@id = //label[{label_text}]/@for] \
         | //label[{label_text}]//*[self::input or self::textarea or self::select]",
        aria = lowercase("@aria-label"),
    )
}

fn button_xpath(name: &str, exact: bool) -> String {
    let buttons = "//*[self::button or @role='button']";
    if exact {
        let lit = xpath_literal(name.trim());
        format!("{buttons}[normalize-space(.) = {lit} or normalize-space(@aria-label) = {lit}]")
    } else {
        let needle = xpath_literal(&name.to_lowercase());
        format!(
            "{buttons}[contains({}, {needle}) or contains({}, {needle})]",
            lowercase("normalize-space(.)"),
            lowercase("@aria-label"),
        )
    }
}
