use std::env;
use std::time::Duration;

use crate::models::BookingTarget;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub webdriver_url: String,
    pub target: BookingTarget,
    pub automation: AutomationSettings,
}

/// Timing knobs shared by every booking attempt.
#[derive(Clone, Debug)]
pub struct AutomationSettings {
    pub action_timeout: Duration,
    pub navigation_timeout: Duration,
    pub post_submit_delay: Duration,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_millis(30_000),
            navigation_timeout: Duration::from_millis(30_000),
            post_submit_delay: Duration::from_millis(5_000),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let target_name = env::var("BOOKING_TARGET").unwrap_or_else(|_| "rollins".to_string());
        let mut target = BookingTarget::preset(&target_name).unwrap_or_else(|| {
            tracing::warn!(booking_target = %target_name, "unknown BOOKING_TARGET, using rollins");
            BookingTarget::rollins()
        });

        if let Ok(url) = env::var("BOOKING_URL") {
            if !url.is_empty() {
                target.url = url;
            }
        }
        if let Some(headless) = env::var("BROWSER_HEADLESS").ok().and_then(|v| parse_bool(&v)) {
            target.headless = headless;
        }

        let defaults = AutomationSettings::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            webdriver_url: env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:9515".to_string()),
            target,
            automation: AutomationSettings {
                action_timeout: millis_var("ACTION_TIMEOUT_MS").unwrap_or(defaults.action_timeout),
                navigation_timeout: millis_var("NAVIGATION_TIMEOUT_MS")
                    .unwrap_or(defaults.navigation_timeout),
                post_submit_delay: millis_var("POST_SUBMIT_DELAY_MS")
                    .unwrap_or(defaults.post_submit_delay),
            },
        }
    }
}

fn millis_var(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
