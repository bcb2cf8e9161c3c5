use std::time::Duration;

use async_trait::async_trait;
use campground_scan::{CalendarSource, ScanError, format_date};
use chrono::NaiveDate;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;

/// Environment variable with the WebDriver endpoint
pub const WEBDRIVER_URL: &str = "WEBDRIVER_URL";
/// Environment variable that turns on headless mode when `1` or `true`
pub const WEBDRIVER_HEADLESS: &str = "WEBDRIVER_HEADLESS";

const DATE_PICKER_NAME: &str = "single-date-picker";
const REFRESH_BUTTON_CLASS: &str = "rec-button-link-small";
const AVAILABILITY_MAIN_ID: &str = "per-availability-main";
const LOAD_MORE_CLASS: &str = "load-more-btn";
const SCROLL_TO_BOTTOM: &str = "arguments[0].scrollTop = arguments[0].scrollHeight";

/// Settings for the WebDriver session
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// WebDriver server, e.g. a local geckodriver
    pub webdriver_url: String,

    /// Run Firefox without a window
    pub headless: bool,

    /// How long element lookups wait for the element to appear (default: 30 seconds)
    pub implicit_wait: Duration,

    /// Pause after refreshing the calendar so it can re-render (default: 3 seconds)
    pub refresh_settle: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: false,
            implicit_wait: Duration::from_secs(30),
            refresh_settle: Duration::from_secs(3),
        }
    }
}

impl BrowserConfig {
    /// Defaults, overridden by `WEBDRIVER_URL` and `WEBDRIVER_HEADLESS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, overridden by whatever `lookup` returns for the two variables
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(WEBDRIVER_URL).filter(|url| !url.trim().is_empty()) {
            config.webdriver_url = url.trim().to_string();
        }

        if let Some(flag) = lookup(WEBDRIVER_HEADLESS) {
            config.headless = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true");
        }

        config
    }
}

fn browser_error(context: &str) -> impl FnOnce(WebDriverError) -> ScanError + '_ {
    move |e| ScanError::Browser(format!("{}: {}", context, e))
}

fn not_found(what: &str) -> impl FnOnce(WebDriverError) -> ScanError + '_ {
    move |e| {
        log::debug!("Lookup of {} failed: {}", what, e);
        ScanError::ElementNotFound(what.to_string())
    }
}

/// An open browser on the availability page.
///
/// Call [`BrowserSession::close`] when done; [`RecGovBrowser`] does this on
/// every exit path.
pub struct BrowserSession {
    driver: WebDriver,
    config: BrowserConfig,
}

impl BrowserSession {
    /// Start a Firefox session on the configured WebDriver server
    pub async fn open(config: &BrowserConfig) -> Result<Self, ScanError> {
        log::info!("🦊 Starting browser session at {}", config.webdriver_url);

        let mut caps = DesiredCapabilities::firefox();
        if config.headless {
            caps.set_headless()
                .map_err(browser_error("Failed to request headless mode"))?;
        }

        let driver = WebDriver::new(config.webdriver_url.as_str(), caps)
            .await
            .map_err(browser_error("Failed to start browser session"))?;

        let session = Self {
            driver,
            config: config.clone(),
        };

        let timeouts = session
            .driver
            .set_implicit_wait_timeout(session.config.implicit_wait)
            .await;

        if let Err(e) = timeouts {
            session.close().await;
            return Err(browser_error("Failed to set implicit wait")(e));
        }

        Ok(session)
    }

    /// Show the calendar from `start`, load every campsite and return the page source
    pub async fn load_calendar(&self, url: &str, start: NaiveDate) -> Result<String, ScanError> {
        log::info!("🌐 Opening {}", url);
        self.driver
            .goto(url)
            .await
            .map_err(browser_error("Failed to open campground page"))?;

        self.set_start_date(start).await?;
        self.refresh_availability().await?;
        self.load_all_campsites().await?;

        self.driver
            .source()
            .await
            .map_err(browser_error("Failed to read page source"))
    }

    async fn set_start_date(&self, start: NaiveDate) -> Result<(), ScanError> {
        let date_input = self
            .driver
            .find(By::Name(DATE_PICKER_NAME))
            .await
            .map_err(not_found(DATE_PICKER_NAME))?;

        date_input
            .clear()
            .await
            .map_err(browser_error("Failed to clear date picker"))?;
        date_input
            .send_keys(format_date(start))
            .await
            .map_err(browser_error("Failed to type start date"))?;

        log::debug!("Start date set to {}", format_date(start));
        Ok(())
    }

    async fn refresh_availability(&self) -> Result<(), ScanError> {
        self.driver
            .find(By::ClassName(REFRESH_BUTTON_CLASS))
            .await
            .map_err(not_found(REFRESH_BUTTON_CLASS))?
            .click()
            .await
            .map_err(browser_error("Failed to refresh availability"))?;

        // The grid re-renders asynchronously with no readiness signal
        tokio::time::sleep(self.config.refresh_settle).await;
        Ok(())
    }

    async fn scroll_to_bottom(&self, element: &WebElement) -> Result<(), ScanError> {
        let target = element
            .to_json()
            .map_err(browser_error("Failed to reference scroll container"))?;

        self.driver
            .execute(SCROLL_TO_BOTTOM, vec![target])
            .await
            .map_err(browser_error("Failed to scroll availability list"))?;

        Ok(())
    }

    async fn load_more_button(&self) -> Result<Option<WebElement>, ScanError> {
        let buttons = self
            .driver
            .find_all(By::ClassName(LOAD_MORE_CLASS))
            .await
            .map_err(browser_error("Failed to look for load more button"))?;

        Ok(buttons.into_iter().next())
    }

    /// Keep pressing "Load More" until every campsite row is on the page.
    ///
    /// A failed click ends loading instead of failing the run.
    async fn load_all_campsites(&self) -> Result<(), ScanError> {
        let main_availability = self
            .driver
            .find(By::Id(AVAILABILITY_MAIN_ID))
            .await
            .map_err(not_found(AVAILABILITY_MAIN_ID))?;

        self.scroll_to_bottom(&main_availability).await?;

        let mut pages_loaded = 0usize;
        while let Some(load_more_button) = self.load_more_button().await? {
            self.scroll_to_bottom(&main_availability).await?;

            if let Err(e) = load_more_button.click().await {
                log::warn!("Unable to click load more button: {}", e);
                break;
            }

            pages_loaded += 1;
            log::debug!("Loaded campsite page {}", pages_loaded);
        }

        log::info!("📋 All campsites loaded ({} extra pages)", pages_loaded);
        Ok(())
    }

    /// End the browser session, logging rather than failing if it is already gone
    pub async fn close(self) {
        match self.driver.quit().await {
            Ok(()) => log::debug!("Browser session closed"),
            Err(e) => log::warn!("Failed to close browser session: {}", e),
        }
    }
}

/// [`CalendarSource`] backed by a fresh browser session per call
pub struct RecGovBrowser {
    config: BrowserConfig,
}

impl RecGovBrowser {
    /// Create a page source using `config` (or the defaults)
    pub fn new(config: Option<BrowserConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl CalendarSource for RecGovBrowser {
    async fn fetch_calendar_markup(
        &self,
        url: &str,
        start: NaiveDate,
    ) -> Result<String, ScanError> {
        let session = BrowserSession::open(&self.config).await?;

        let markup = session.load_calendar(url, start).await;
        session.close().await;

        markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_browser_config_defaults() {
        let config = BrowserConfig::default();

        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert!(!config.headless);
        assert_eq!(config.implicit_wait, Duration::from_secs(30));
        assert_eq!(config.refresh_settle, Duration::from_secs(3));
    }

    #[test]
    fn test_browser_config_from_lookup() {
        let env: HashMap<&str, &str> = [
            (WEBDRIVER_URL, "http://selenium:4444/wd/hub"),
            (WEBDRIVER_HEADLESS, "TRUE"),
        ]
        .into_iter()
        .collect();

        let config = BrowserConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.webdriver_url, "http://selenium:4444/wd/hub");
        assert!(config.headless);
    }

    #[test]
    fn test_browser_config_ignores_blank_url() {
        let config = BrowserConfig::from_lookup(|k| match k {
            WEBDRIVER_URL => Some("  ".to_string()),
            WEBDRIVER_HEADLESS => Some("no".to_string()),
            _ => None,
        });

        assert_eq!(config.webdriver_url, BrowserConfig::default().webdriver_url);
        assert!(!config.headless);
    }

    #[tokio::test]
    async fn test_unreachable_webdriver_is_a_browser_error() {
        let browser = RecGovBrowser::new(Some(BrowserConfig {
            webdriver_url: "http://127.0.0.1:9".to_string(),
            ..BrowserConfig::default()
        }));

        let err = browser
            .fetch_calendar_markup(
                "https://www.recreation.gov/camping/campgrounds/232447",
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Browser(_)));
    }
}
