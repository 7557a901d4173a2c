// frontend/src/app.rs
//
// Router, authenticated layout and the native-only Connect screen.
// WASM talks to its own origin and never shows Connect.

use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, Router, use_navigator};

use crate::ac_dashboard::db_status::DbStatusIndicator;
use crate::ac_dashboard::session::{self, AUTH};
use crate::ac_dashboard::widgets::Spinner;
use crate::ac_dashboard::{
    Aires, Dashboard, Estadisticas, Lecturas, Login, Mantenimientos, OtrosEquipos, Register,
    SIDEBAR_STORAGE_KEY, Umbrales, Usuarios, persist,
};

#[allow(unused_imports)]
use crate::ac_dashboard::UrlConfig;

#[cfg(not(target_arch = "wasm32"))]
const PROBE_CONNECT_TIMEOUT_MS: u64 = 4000;
#[cfg(not(target_arch = "wasm32"))]
const PROBE_TIMEOUT_MS: u64 = 6000;

// --- global css ---
const GLOBAL_CSS: &str = r#"
html, body {
    margin: 0;
    padding: 0;
    width: 100%;
    height: 100%;
    background: #020617;
    font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif;
}

:root, html {
    color-scheme: dark;
}

#main {
    width: 100%;
    min-height: 100%;
    background: #020617;
}

* { box-sizing: border-box; }

a { color: #60a5fa; text-decoration: none; }

.ac-shell { display: flex; min-height: 100vh; }
.ac-sidebar {
    width: 230px; flex-shrink: 0; background: #0b1220; border-right: 1px solid #1f2937;
    display: flex; flex-direction: column; transition: width 0.15s ease;
}
.ac-sidebar.collapsed { width: 64px; }
.ac-sidebar.collapsed .ac-nav-text, .ac-sidebar.collapsed .ac-brand-text { display: none; }
.ac-brand { padding: 16px; font-weight: 700; font-size: 17px; display: flex; align-items: center; gap: 10px; border-bottom: 1px solid #1f2937; }
.ac-nav-link {
    display: flex; align-items: center; gap: 10px; padding: 10px 16px; color: #cbd5e1;
    border-left: 3px solid transparent; font-size: 14px;
}
.ac-nav-link:hover { background: #111827; }
.ac-nav-link.active { background: #111827; border-left-color: #3b82f6; color: #e5e7eb; }
.ac-main { flex: 1; display: flex; flex-direction: column; min-width: 0; }
.ac-topbar {
    display: flex; align-items: center; justify-content: space-between; gap: 12px;
    padding: 10px 20px; border-bottom: 1px solid #1f2937; background: #0b1220;
}

.ac-page { padding: 20px; color: #e5e7eb; }
.ac-page-head { display: flex; align-items: center; justify-content: space-between; gap: 12px; flex-wrap: wrap; margin-bottom: 16px; }
.ac-title { margin: 0 0 16px 0; font-size: 22px; }
.ac-page-head .ac-title { margin: 0; }
.ac-subtitle { margin: 18px 0 8px 0; font-size: 14px; color: #93c5fd; text-transform: uppercase; letter-spacing: 0.04em; }
.ac-card { background: #0b1220; border: 1px solid #1f2937; border-radius: 14px; padding: 16px; }
.ac-grid-2 { display: grid; grid-template-columns: repeat(auto-fit, minmax(260px, 1fr)); gap: 12px 16px; }

.ac-table { width: 100%; border-collapse: collapse; font-size: 14px; }
.ac-table th { text-align: left; padding: 10px 12px; color: #94a3b8; font-weight: 600; border-bottom: 1px solid #1f2937; white-space: nowrap; }
.ac-table td { padding: 10px 12px; border-bottom: 1px solid #111827; }
.ac-table-hover tbody tr { cursor: pointer; }
.ac-table-hover tbody tr:hover { background: #111827; }

.ac-btn {
    padding: 8px 14px; border-radius: 10px; border: 1px solid #334155; background: #0f172a;
    color: #e5e7eb; cursor: pointer; font-size: 14px;
}
.ac-btn:disabled { opacity: 0.6; cursor: default; }
.ac-btn-sm { padding: 4px 10px; font-size: 12px; margin-left: 6px; }
.ac-btn-primary { background: #1d4ed8; border-color: #2563eb; }
.ac-btn-danger { background: #7f1d1d; border-color: #b91c1c; }
.ac-btn-ghost { background: transparent; border: none; color: #94a3b8; cursor: pointer; }

.ac-field { display: flex; flex-direction: column; gap: 4px; margin-bottom: 10px; }
.ac-label { font-size: 12px; color: #94a3b8; }
.ac-input {
    width: 100%; padding: 9px 11px; border-radius: 10px; border: 1px solid #334155;
    background: #020617; color: #e5e7eb; outline: none; font-size: 14px;
}
.ac-input:focus { border-color: #3b82f6; }

.ac-alert { display: flex; gap: 12px; align-items: flex-start; padding: 12px 14px; border-radius: 12px; margin-bottom: 14px; font-size: 14px; }
.ac-alert-error { border: 1px solid #b91c1c; background: #2a0b0b; color: #fecaca; }
.ac-alert-success { border: 1px solid #15803d; background: #052e16; color: #bbf7d0; }

.ac-tabs { display: flex; gap: 4px; border-bottom: 1px solid #1f2937; margin-bottom: 16px; }
.ac-tab { padding: 8px 16px; background: transparent; border: none; border-bottom: 2px solid transparent; color: #94a3b8; cursor: pointer; font-size: 14px; }
.ac-tab-active { color: #e5e7eb; border-bottom-color: #3b82f6; }

.ac-modal-backdrop {
    position: fixed; inset: 0; background: rgba(2, 6, 23, 0.75); display: flex;
    align-items: center; justify-content: center; z-index: 50; padding: 16px;
}
.ac-modal { background: #0b1220; border: 1px solid #334155; border-radius: 16px; box-shadow: 0 12px 30px rgba(0,0,0,0.5); color: #e5e7eb; }

.ac-spinner {
    width: 22px; height: 22px; border-radius: 50%; border: 3px solid #1f2937;
    border-top-color: #3b82f6; animation: ac-spin 0.8s linear infinite;
}
@keyframes ac-spin { to { transform: rotate(360deg); } }
.ac-pulse { animation: ac-pulse 1.2s ease-in-out infinite; }
@keyframes ac-pulse { 50% { opacity: 0.3; } }
"#;

#[derive(Clone, Routable, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[route("/")]
    Root {},

    #[route("/login")]
    Login {},

    #[route("/register")]
    Register {},

    #[cfg(not(target_arch = "wasm32"))]
    #[route("/connect")]
    Connect {},

    #[layout(AppLayout)]
        #[route("/dashboard")]
        Dashboard {},
        #[route("/aires")]
        Aires {},
        #[route("/lecturas")]
        Lecturas {},
        #[route("/mantenimientos")]
        Mantenimientos {},
        #[route("/umbrales")]
        Umbrales {},
        #[route("/usuarios")]
        Usuarios {},
        #[route("/estadisticas")]
        Estadisticas {},
        #[route("/otros-equipos")]
        OtrosEquipos {},
    #[end_layout]

    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

struct NavItem {
    label: &'static str,
    icon: &'static str,
    route: Route,
    admin_only: bool,
}

fn nav_items(is_admin: bool) -> Vec<NavItem> {
    let all = vec![
        NavItem { label: "Dashboard", icon: "▦", route: Route::Dashboard {}, admin_only: false },
        NavItem { label: "Aires", icon: "❄", route: Route::Aires {}, admin_only: false },
        NavItem { label: "Lecturas", icon: "🌡", route: Route::Lecturas {}, admin_only: false },
        NavItem { label: "Mantenimientos", icon: "🔧", route: Route::Mantenimientos {}, admin_only: false },
        NavItem { label: "Umbrales", icon: "⚠", route: Route::Umbrales {}, admin_only: false },
        NavItem { label: "Otros Equipos", icon: "⚡", route: Route::OtrosEquipos {}, admin_only: false },
        NavItem { label: "Estadísticas", icon: "📈", route: Route::Estadisticas {}, admin_only: false },
        NavItem { label: "Usuarios", icon: "👤", route: Route::Usuarios {}, admin_only: true },
    ];
    all.into_iter().filter(|i| is_admin || !i.admin_only).collect()
}

// -------------------------
// App
// -------------------------
#[component]
pub fn App() -> Element {
    use_hook(|| {
        spawn(session::restore());
        spawn(session::health_loop());
    });

    rsx! {
        document::Style { "{GLOBAL_CSS}" }
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1" }
        document::Title { "AirControl" }

        div {
            style: "min-height: 100vh; width: 100%; background: #020617; color: #e5e7eb;",
            Router::<Route> {}
        }
    }
}

#[component]
pub fn Root() -> Element {
    let nav = use_navigator();

    use_effect(move || {
        #[cfg(not(target_arch = "wasm32"))]
        if UrlConfig::stored_base_url().is_none() {
            let _ = nav.replace(Route::Connect {});
            return;
        }
        let _ = nav.replace(Route::Dashboard {});
    });

    rsx! { div {} }
}

#[component]
fn AppLayout() -> Element {
    let nav = use_navigator();
    let mut collapsed = use_signal(|| persist::get_bool(SIDEBAR_STORAGE_KEY));

    use_effect(move || {
        let signed_out = {
            let st = AUTH.read();
            !st.loading && !st.is_authenticated()
        };
        if signed_out {
            let _ = nav.replace(Route::Login {});
        }
    });

    let auth = AUTH.read().clone();
    if auth.loading {
        return rsx! {
            div { style: "min-height:100vh; display:flex; align-items:center; justify-content:center;",
                Spinner { label: "Verificando sesión..." }
            }
        };
    }
    let Some(user) = auth.user.filter(|_| auth.token.is_some()) else {
        return rsx! { div {} };
    };

    let toggle = move |_| {
        let next = !collapsed();
        collapsed.set(next);
        persist::set_string(SIDEBAR_STORAGE_KEY, if next { "true" } else { "false" });
    };

    let logout = move |_| {
        session::logout();
        let _ = nav.replace(Route::Login {});
    };

    let sidebar_class = if collapsed() { "ac-sidebar collapsed" } else { "ac-sidebar" };

    rsx! {
        div { class: "ac-shell",
            nav { class: "{sidebar_class}",
                div { class: "ac-brand",
                    button { class: "ac-btn-ghost", style: "font-size:18px;", onclick: toggle, "☰" }
                    span { class: "ac-brand-text", "AirControl" }
                }
                for item in nav_items(user.rol.is_admin()) {
                    Link {
                        key: "{item.label}",
                        class: "ac-nav-link",
                        active_class: "active",
                        to: item.route,
                        span { style: "width:20px; text-align:center;", "{item.icon}" }
                        span { class: "ac-nav-text", "{item.label}" }
                    }
                }
            }
            div { class: "ac-main",
                header { class: "ac-topbar",
                    DbStatusIndicator {}
                    div { style: "display:flex; align-items:center; gap:12px; font-size:14px;",
                        span { "{user.display_name()}" }
                        span { style: "color:#94a3b8; font-size:12px;", "({user.rol.label()})" }
                        button { class: "ac-btn ac-btn-sm", onclick: logout, "Cerrar sesión" }
                    }
                }
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { style: "min-height:100vh; display:flex; align-items:center; justify-content:center;",
            div { class: "ac-card", style: "text-align:center;",
                h1 { style: "margin:0 0 8px 0; font-size:20px;", "Página no encontrada" }
                p { style: "margin:0 0 16px 0; color:#94a3b8;", "/{path}" }
                Link { to: Route::Root {}, "Volver al inicio" }
            }
        }
    }
}

// -------------------------
// Native Connect screen
// -------------------------
#[cfg(not(target_arch = "wasm32"))]
fn validate_base_url(raw: &str) -> Result<String, String> {
    let u = crate::ac_dashboard::normalize_base_url(raw.trim().to_string());
    if u.is_empty() {
        return Err("Ingresa una URL primero.".to_string());
    }
    let rest = u
        .strip_prefix("http://")
        .or_else(|| u.strip_prefix("https://"))
        .ok_or_else(|| "La URL debe comenzar con http:// o https://".to_string())?;
    if rest.split(':').next().unwrap_or_default().is_empty() {
        return Err("Falta el host en la URL".to_string());
    }
    Ok(u)
}

#[cfg(not(target_arch = "wasm32"))]
fn probe_report(url: &str, result: &Result<(u16, String), String>) -> String {
    use aircontrol_shared::{DbStatus, HealthStatus};

    match result {
        Err(e) => format!("❌ Sin respuesta de {url}\n    ERROR: {e}"),
        Ok((status, body)) if !(200..300).contains(status) => {
            format!("❌ {url} respondió HTTP {status}\n    BODY: {}", body.trim())
        }
        Ok((status, body)) => match serde_json::from_str::<HealthStatus>(body) {
            Ok(h) => {
                let db = DbStatus::from_health(&h);
                let icon = if db == DbStatus::Connected { "✅" } else { "⚠" };
                format!("{icon} Servidor OK (HTTP {status})\n    {}", db.label())
            }
            Err(_) => format!(
                "⚠ {url} respondió HTTP {status}, pero no es un endpoint de salud válido"
            ),
        },
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn probe_health(base: &str) -> Result<(u16, String), String> {
    use crate::ac_dashboard::http::classify_reqwest_error;

    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_millis(PROBE_CONNECT_TIMEOUT_MS))
        .timeout(std::time::Duration::from_millis(PROBE_TIMEOUT_MS))
        .build()
        .map_err(|e| format!("build client failed: {e}"))?;
    let resp = client
        .get(crate::ac_dashboard::join_url(base, "/api/health"))
        .send()
        .await
        .map_err(|e| classify_reqwest_error(&e))?;
    let status = resp.status().as_u16();
    let body = resp.text().await.map_err(|e| format!("read body failed: {e}"))?;
    Ok((status, body))
}

#[cfg(not(target_arch = "wasm32"))]
#[component]
pub fn Connect() -> Element {
    let nav = use_navigator();

    let initial = UrlConfig::stored_base_url()
        .unwrap_or_else(|| crate::ac_dashboard::NATIVE_DEFAULT_BASE.to_string());

    let mut url_edit = use_signal(|| initial);
    let mut test_status = use_signal(String::new);
    let mut testing = use_signal(|| false);

    rsx! {
        div {
            style: "height:100vh; display:flex; align-items:center; justify-content:center;",
            div { class: "ac-card", style: "width:min(640px, 94vw); padding:24px;",
                h1 { style: "margin:0 0 12px 0; font-size:20px;", "AirControl" }

                p { style: "margin:0 0 16px 0; color:#94a3b8;",
                    "Ingresa la URL del servidor (incluyendo http:// o https://). Ejemplo: "
                    code { "http://localhost:5000" }
                }

                input {
                    class: "ac-input",
                    value: "{url_edit}",
                    oninput: move |evt| {
                        url_edit.set(evt.value());
                        test_status.set(String::new());
                    },
                }

                if !test_status().is_empty() {
                    pre {
                        style: "margin:14px 0 0 0; padding:12px; border-radius:12px; border:1px solid #334155; background:#020617; color:#cbd5e1; font-size:12px; white-space:pre-wrap;",
                        "{test_status}"
                    }
                }

                div { style: "display:flex; gap:12px; margin-top:16px; justify-content:flex-end;",
                    button {
                        class: "ac-btn",
                        disabled: testing(),
                        onclick: move |_| {
                            let base = match validate_base_url(&url_edit()) {
                                Ok(u) => u,
                                Err(e) => {
                                    test_status.set(e);
                                    return;
                                }
                            };
                            testing.set(true);
                            test_status.set("Probando conexión...".to_string());
                            spawn(async move {
                                let res = probe_health(&base).await;
                                testing.set(false);
                                test_status.set(probe_report(&base, &res));
                            });
                        },
                        if testing() { "Probando..." } else { "Probar conexión" }
                    }
                    button {
                        class: "ac-btn ac-btn-primary",
                        onclick: move |_| {
                            match validate_base_url(&url_edit()) {
                                Ok(u) => {
                                    log!("[connect] using backend {u}");
                                    UrlConfig::set_base_url_and_persist(u);
                                    spawn(session::check_health());
                                    let _ = nav.replace(Route::Dashboard {});
                                }
                                Err(e) => test_status.set(e),
                            }
                        },
                        "Conectar"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usuarios_link_is_admin_only() {
        let admin: Vec<&str> = nav_items(true).iter().map(|i| i.label).collect();
        let other: Vec<&str> = nav_items(false).iter().map(|i| i.label).collect();
        assert!(admin.contains(&"Usuarios"));
        assert!(!other.contains(&"Usuarios"));
        assert_eq!(admin.len(), other.len() + 1);
    }

    #[test]
    fn routes_render_expected_paths() {
        assert_eq!(Route::OtrosEquipos {}.to_string(), "/otros-equipos");
        assert_eq!(Route::Login {}.to_string(), "/login");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn base_url_validation() {
        assert_eq!(
            validate_base_url(" http://10.0.0.5:5000/api/ ").as_deref(),
            Ok("http://10.0.0.5:5000")
        );
        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("ftp://host").is_err());
        assert!(validate_base_url("http://").is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn probe_report_reads_health_payload() {
        let ok = probe_report(
            "http://h",
            &Ok((200, r#"{"status":"ok","database":"connected"}"#.into())),
        );
        assert!(ok.starts_with("✅"));
        assert!(ok.contains("DB Conectada"));

        let down = probe_report("http://h", &Ok((503, "down".into())));
        assert!(down.contains("HTTP 503"));

        let err = probe_report("http://h", &Err("timeout".into()));
        assert!(err.contains("timeout"));
    }
}
