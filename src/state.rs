use crate::config::AppConfig;
use crate::services::browser::BrowserProvider;

pub struct AppState {
    pub config: AppConfig,
    pub browser: Box<dyn BrowserProvider>,
}
