use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;

use draw::DrawConfig;
use roster::model::Prize;

use crate::cli::{Overrides, StoreKind};

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Which backend holds the roster and results.
    ///
    /// Defaults to `sheet` when a web-app url is set and `demo` otherwise.
    pub store: StoreKind,

    /// Spreadsheet web-app endpoint. Empty or the placeholder means
    /// unconfigured; the sheet store then reports a connectivity error.
    pub web_app_url: String,

    /// Database connection string for the SQLite store.
    pub database_url: String,

    pub demo_size: usize,

    pub draw: DrawConfig,

    pub muted: bool,

    /// Fixed seed for winner selection. `None` uses the thread RNG.
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Bad values fall back to the default with a warning.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = DrawConfig::default();

        let web_app_url = get("LUCKY_DRAW_WEB_APP_URL").unwrap_or_default();

        let store = match get("LUCKY_DRAW_STORE") {
            Some(raw) => <StoreKind as ValueEnum>::from_str(raw.trim(), true).unwrap_or_else(|_| {
                warn!(key = "LUCKY_DRAW_STORE", value = %raw, "unknown store kind; using demo");
                StoreKind::Demo
            }),
            None if web_app_url.trim().is_empty() => StoreKind::Demo,
            None => StoreKind::Sheet,
        };

        let digit_count = parse_or(&get, "LUCKY_DRAW_DIGITS", defaults.digit_count);
        let spin_ms = parse_or(
            &get,
            "LUCKY_DRAW_SPIN_MS",
            defaults.spin_base.as_millis() as u64,
        );
        let stagger_ms = parse_or(
            &get,
            "LUCKY_DRAW_STAGGER_MS",
            defaults.stagger.as_millis() as u64,
        );
        let volume = parse_or(&get, "LUCKY_DRAW_VOLUME", defaults.volume);

        let prize = Prize::new(
            get("LUCKY_DRAW_PRIZE_ID").unwrap_or(defaults.prize.id.clone()),
            get("LUCKY_DRAW_PRIZE_NAME").unwrap_or(defaults.prize.name.clone()),
        );

        Self {
            store,
            web_app_url,
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://lucky_draw.db".to_string()),
            demo_size: parse_or(&get, "LUCKY_DRAW_DEMO_SIZE", 50),
            draw: DrawConfig {
                digit_count,
                spin_base: Duration::from_millis(spin_ms),
                stagger: Duration::from_millis(stagger_ms),
                prize,
                volume,
                ..defaults
            },
            muted: false,
            seed: None,
        }
    }

    /// Command-line values win over the environment.
    pub fn apply(&mut self, o: &Overrides) {
        if let Some(store) = o.store {
            self.store = store;
        }
        if let Some(url) = &o.url {
            self.web_app_url = url.clone();
            if o.store.is_none() {
                self.store = StoreKind::Sheet;
            }
        }
        if let Some(db) = &o.database_url {
            self.database_url = db.clone();
        }
        if let Some(n) = o.demo_size {
            self.demo_size = n;
        }
        if let Some(n) = o.digits {
            self.draw.digit_count = n;
        }
        if let Some(ms) = o.spin_ms {
            self.draw.spin_base = Duration::from_millis(ms);
        }
        if let Some(ms) = o.stagger_ms {
            self.draw.stagger = Duration::from_millis(ms);
        }
        if let Some(id) = &o.prize_id {
            self.draw.prize.id = id.clone();
        }
        if let Some(name) = &o.prize_name {
            self.draw.prize.name = name.clone();
        }
        if let Some(v) = o.volume {
            self.draw.volume = v;
        }
        self.muted |= o.mute;
        if o.seed.is_some() {
            self.seed = o.seed;
        }
    }
}

fn parse_or<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = get(key) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(key, value = %raw, "unparseable value; using default");
            default
        }
    }
}
