// frontend/src/ac_dashboard/mod.rs

macro_rules! log {
    (warn: $($t:tt)*) => {{
        let s = format!($($t)*);
        crate::ac_dashboard::log_line(crate::ac_dashboard::LogLevel::Warn, &s);
    }};
    ($($t:tt)*) => {{
        let s = format!($($t)*);
        crate::ac_dashboard::log_line(crate::ac_dashboard::LogLevel::Info, &s);
    }};
}

pub mod chart;
pub mod db_status;
pub mod http;
pub mod session;
pub mod widgets;

mod aires_page;
mod auth_pages;
mod dashboard_page;
mod estadisticas_page;
mod lecturas_page;
mod mantenimientos_page;
mod otros_equipos_page;
mod umbrales_page;
mod usuarios_page;

pub use aires_page::Aires;
pub use auth_pages::{Login, Register};
pub use dashboard_page::Dashboard;
pub use estadisticas_page::Estadisticas;
pub use lecturas_page::Lecturas;
pub use mantenimientos_page::Mantenimientos;
pub use otros_equipos_page::OtrosEquipos;
pub use umbrales_page::Umbrales;
pub use usuarios_page::Usuarios;

use dioxus::prelude::*;
use dioxus_signals::Signal;

// unified storage keys
pub const TOKEN_STORAGE_KEY: &str = "access_token";
pub const USER_STORAGE_KEY: &str = "user";
pub const BASE_URL_STORAGE_KEY: &str = "ac_base_url";
pub const SIDEBAR_STORAGE_KEY: &str = "ac_sidebar_collapsed";

#[cfg(not(target_arch = "wasm32"))]
pub const NATIVE_DEFAULT_BASE: &str = "http://localhost:5000";

// ----------------------------
// Cross-platform persistence
//  - wasm32: localStorage
//  - native: JSON file in app data dir
// ----------------------------
pub mod persist {
    pub fn get_string(key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            use web_sys::window;
            let w = window()?;
            let ls = w.local_storage().ok()??;
            return ls.get_item(key).ok().flatten();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            native::get_string(key).ok().flatten()
        }
    }

    pub fn set_string(key: &str, value: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            use web_sys::window;
            if let Some(Ok(Some(ls))) = window().map(|w| w.local_storage()) {
                let _ = ls.set_item(key, value);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(e) = native::set_string(key, value) {
                log!(warn: "[persist] could not write {key}: {e}");
            }
        }
    }

    pub fn remove(key: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            use web_sys::window;
            if let Some(Ok(Some(ls))) = window().map(|w| w.local_storage()) {
                let _ = ls.remove_item(key);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(e) = native::remove(key) {
                log!(warn: "[persist] could not remove {key}: {e}");
            }
        }
    }

    pub fn get_bool(key: &str) -> bool {
        get_string(key).is_some_and(|v| v == "true")
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod native {
        use std::collections::HashMap;
        use std::io;

        fn storage_path() -> std::path::PathBuf {
            let mut base = dirs::data_local_dir()
                .or_else(dirs::data_dir)
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| ".".into()));
            base.push("aircontrol");
            base.push("storage.json");
            base
        }

        fn load_map() -> Result<HashMap<String, String>, io::Error> {
            let bytes = match std::fs::read(storage_path()) {
                Ok(b) => b,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
                Err(e) => return Err(e),
            };
            Ok(serde_json::from_slice(&bytes).unwrap_or_default())
        }

        fn save_map(map: &HashMap<String, String>) -> Result<(), io::Error> {
            let path = storage_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let bytes = serde_json::to_vec_pretty(map).map_err(io::Error::other)?;
            std::fs::write(path, bytes)
        }

        pub fn get_string(key: &str) -> Result<Option<String>, io::Error> {
            Ok(load_map()?.remove(key))
        }

        pub fn set_string(key: &str, value: &str) -> Result<(), io::Error> {
            let mut map = load_map()?;
            map.insert(key.to_string(), value.to_string());
            save_map(&map)
        }

        pub fn remove(key: &str) -> Result<(), io::Error> {
            let mut map = load_map()?;
            if map.remove(key).is_some() {
                save_map(&map)?;
            }
            Ok(())
        }
    }
}

/// Keeps `scheme://host[:port]`, drops path, fragment and trailing slashes.
pub fn normalize_base_url(mut url: String) -> String {
    if let Some(idx) = url.find('#') {
        url.truncate(idx);
    }
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        if let Some(slash) = rest.find('/') {
            url.truncate(scheme_end + 3 + slash);
        }
    }
    url.trim().trim_end_matches('/').to_string()
}

pub fn join_url(base: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    format!("{}{path}", base.trim_end_matches('/'))
}

// ---------- Base URL config ----------
pub struct UrlConfig;

static BASE_URL: GlobalSignal<String> = Signal::global(String::new);

impl UrlConfig {
    pub fn set_base_url_and_persist(url: String) {
        let clean = normalize_base_url(url);
        *BASE_URL.write() = clean.clone();
        persist::set_string(BASE_URL_STORAGE_KEY, &clean);
    }

    pub fn stored_base_url() -> Option<String> {
        persist::get_string(BASE_URL_STORAGE_KEY)
            .map(normalize_base_url)
            .filter(|s| !s.is_empty())
    }

    /// Empty on web means same origin.
    pub fn base_http() -> String {
        let base = UrlConfig::stored_base_url().unwrap_or_else(|| BASE_URL.read().clone());

        #[cfg(not(target_arch = "wasm32"))]
        if base.is_empty() {
            return NATIVE_DEFAULT_BASE.to_string();
        }

        base
    }
}

// ---------- Web vs Native logging ----------
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
}

pub fn log_line(level: LogLevel, msg: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        match level {
            LogLevel::Info => web_sys::console::log_1(&msg.into()),
            LogLevel::Warn => web_sys::console::warn_1(&msg.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        match level {
            LogLevel::Info => tracing::info!("{msg}"),
            LogLevel::Warn => tracing::warn!("{msg}"),
        }
    }
}

// ---------- loads ----------

/// Tickets for page loads. Only the newest ticket may write its result, so a
/// slow response for an old filter never replaces a newer one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadGuard {
    latest: u64,
}

impl LoadGuard {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest == ticket
    }
}

// ---------- time ----------
pub async fn sleep_ms(ms: u64) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(ms.min(u32::MAX as u64) as u32).await;

    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// Local date as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        let d = js_sys::Date::new_0();
        format!(
            "{:04}-{:02}-{:02}",
            d.get_full_year(),
            d.get_month() + 1,
            d.get_date()
        )
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Local time as `HH:MM`.
pub fn now_hhmm() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        let d = js_sys::Date::new_0();
        format!("{:02}:{:02}", d.get_hours(), d.get_minutes())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Local::now().format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_path_and_fragment() {
        assert_eq!(
            normalize_base_url("http://10.0.0.5:5000/api/aires#x".into()),
            "http://10.0.0.5:5000"
        );
        assert_eq!(
            normalize_base_url(" https://ac.example.org/ ".into()),
            "https://ac.example.org"
        );
        assert_eq!(normalize_base_url(String::new()), "");
    }

    #[test]
    fn join_adds_single_slash() {
        assert_eq!(join_url("http://h:5000/", "api/health"), "http://h:5000/api/health");
        assert_eq!(join_url("", "/api/aires"), "/api/aires");
    }

    #[test]
    fn only_the_newest_load_is_current() {
        let mut guard = LoadGuard::default();
        let all = guard.issue();
        let one_aire = guard.issue();
        assert!(!guard.is_latest(all));
        assert!(guard.is_latest(one_aire));
    }
}
