// frontend/src/ac_dashboard/session.rs
//
// Authentication state shared by every page, plus the database health poll.

use aircontrol_shared::api::FALLBACK_CONNECTION;
use aircontrol_shared::forms::RegisterForm;
use aircontrol_shared::{ApiError, DbStatus, HealthStatus, LoginRequest, LoginResponse, SessionUser};
use dioxus::prelude::*;
use dioxus_signals::Signal;

use super::http::{self, Body, Method};
use super::{TOKEN_STORAGE_KEY, USER_STORAGE_KEY, persist, sleep_ms};

pub const HEALTH_POLL_DEFAULT_MS: u64 = 30_000;
const HEALTH_POLL_MIN_MS: u64 = 5_000;
const HEALTH_POLL_MAX_MS: u64 = 300_000;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
    /// A stored token is being checked against the server.
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    fn from_storage() -> Self {
        let token = persist::get_string(TOKEN_STORAGE_KEY).filter(|t| !t.is_empty());
        let user = parse_stored_user(persist::get_string(USER_STORAGE_KEY).as_deref());
        AuthState {
            loading: token.is_some(),
            token,
            user,
            error: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// State after the server rejected the token, or `None` when there is no
    /// session left to drop.
    pub fn after_unauthorized(&self) -> Option<AuthState> {
        self.token.as_ref()?;
        Some(AuthState::default())
    }
}

pub static AUTH: GlobalSignal<AuthState> = Signal::global(AuthState::from_storage);
pub static DB_STATUS: GlobalSignal<DbStatus> = Signal::global(|| DbStatus::Checking);
/// One-shot notice shown on the login screen (e.g. after registering).
pub static LOGIN_NOTICE: GlobalSignal<Option<String>> = Signal::global(|| None);

pub fn parse_stored_user(raw: Option<&str>) -> Option<SessionUser> {
    serde_json::from_str(raw?).ok()
}

pub fn token() -> Option<String> {
    AUTH.peek().token.clone()
}

pub fn current_user() -> Option<SessionUser> {
    AUTH.read().user.clone()
}

fn clear_persisted() {
    persist::remove(TOKEN_STORAGE_KEY);
    persist::remove(USER_STORAGE_KEY);
}

/// Called by the HTTP layer on any 401.
pub fn expire() {
    let Some(next) = AUTH.peek().after_unauthorized() else {
        return;
    };
    log!(warn: "[auth] token rejected, clearing session");
    clear_persisted();
    *AUTH.write() = next;
}

/// Validates a stored token by asking the server who it belongs to.
pub async fn restore() {
    if persist::get_string(TOKEN_STORAGE_KEY).is_none() {
        AUTH.write().loading = false;
        return;
    }
    AUTH.write().loading = true;

    match http::get_record::<SessionUser>("/api/auth/user").await {
        Ok(user) => {
            if let Ok(raw) = serde_json::to_string(&user) {
                persist::set_string(USER_STORAGE_KEY, &raw);
            }
            let mut st = AUTH.write();
            st.token = persist::get_string(TOKEN_STORAGE_KEY);
            st.user = Some(user);
            st.loading = false;
        }
        Err(e) => {
            log!(warn: "[auth] could not restore session: {e}");
            clear_persisted();
            *AUTH.write() = AuthState::default();
        }
    }
}

pub async fn login(username: String, password: String) -> bool {
    {
        let mut st = AUTH.write();
        st.loading = true;
        st.error = None;
    }
    let req = LoginRequest { username, password };
    let body = match serde_json::to_string(&req) {
        Ok(s) => Body::Json(s),
        Err(e) => {
            log!(warn: "[auth] encode login: {e}");
            return fail("Error de autenticación".into());
        }
    };

    let (status, text) = match http::send_raw(Method::Post, "/api/auth/login", body).await {
        Ok(r) => r,
        Err(_) => return fail(FALLBACK_CONNECTION.into()),
    };

    match serde_json::from_str::<LoginResponse>(&text) {
        Ok(LoginResponse {
            success: true,
            access_token: Some(token),
            user: Some(user),
            ..
        }) if (200..300).contains(&status) => {
            persist::set_string(TOKEN_STORAGE_KEY, &token);
            if let Ok(raw) = serde_json::to_string(&user) {
                persist::set_string(USER_STORAGE_KEY, &raw);
            }
            log!("[auth] logged in as {}", user.username);
            *AUTH.write() = AuthState {
                token: Some(token),
                user: Some(user),
                loading: false,
                error: None,
            };
            true
        }
        Ok(resp) => fail(
            resp.mensaje
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Error de autenticación".into()),
        ),
        Err(_) => fail(login_error_fallback(status).into()),
    }
}

fn login_error_fallback(status: u16) -> &'static str {
    if (200..300).contains(&status) || status == 401 {
        "Error de autenticación"
    } else {
        FALLBACK_CONNECTION
    }
}

fn fail(msg: String) -> bool {
    log!(warn: "[auth] {msg}");
    let mut st = AUTH.write();
    st.loading = false;
    st.error = Some(msg);
    false
}

/// Returns true when the account was created.
pub async fn register(form: &RegisterForm) -> bool {
    let req = match form.validate() {
        Ok(r) => r,
        Err(msg) => {
            AUTH.write().error = Some(msg);
            return false;
        }
    };
    AUTH.write().error = None;

    match http::post_json("/api/auth/register", &req).await {
        Ok(_) => {
            *LOGIN_NOTICE.write() =
                Some("Registro exitoso. Ahora puedes iniciar sesión.".to_string());
            true
        }
        Err(e) => {
            AUTH.write().error = Some(e.user_message("Error al registrar usuario"));
            false
        }
    }
}

pub fn logout() {
    clear_persisted();
    *AUTH.write() = AuthState::default();
    log!("[auth] logged out");
}

pub fn clear_error() {
    AUTH.write().error = None;
}

// ---------- health ----------

pub fn status_from_health(res: &Result<HealthStatus, ApiError>) -> DbStatus {
    match res {
        Ok(h) => DbStatus::from_health(h),
        Err(ApiError::Network(_)) => DbStatus::Disconnected,
        Err(_) => DbStatus::Error,
    }
}

pub fn poll_interval_from(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(HEALTH_POLL_DEFAULT_MS)
        .clamp(HEALTH_POLL_MIN_MS, HEALTH_POLL_MAX_MS)
}

pub async fn check_health() {
    let res = http::get_json::<HealthStatus>("/api/health").await;
    let next = status_from_health(&res);
    if *DB_STATUS.peek() != next {
        log!("[health] database status: {}", next.label());
        *DB_STATUS.write() = next;
    }
}

/// Runs until the owning scope is dropped.
pub async fn health_loop() {
    let every = poll_interval_from(std::env::var("AIRCONTROL_HEALTH_POLL_MS").ok().as_deref());
    loop {
        check_health().await;
        sleep_ms(every).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircontrol_shared::Rol;

    #[test]
    fn stored_user_parsing() {
        let raw = r#"{"id":1,"username":"admin","nombre":"Ada","apellido":"L","email":"a@b.c","rol":"admin"}"#;
        let u = parse_stored_user(Some(raw)).unwrap();
        assert_eq!(u.rol, Rol::Admin);
        assert!(parse_stored_user(Some("not json")).is_none());
        assert!(parse_stored_user(None).is_none());
    }

    #[test]
    fn unauthorized_drops_the_whole_session() {
        let raw = r#"{"id":1,"username":"admin","rol":"admin"}"#;
        let signed_in = AuthState {
            token: Some("abc".into()),
            user: parse_stored_user(Some(raw)),
            loading: false,
            error: Some("previo".into()),
        };
        assert!(signed_in.is_authenticated());

        let next = signed_in.after_unauthorized().unwrap();
        assert_eq!(next, AuthState::default());
        assert!(!next.is_authenticated());
        assert!(!next.loading);

        assert!(next.after_unauthorized().is_none());
    }

    #[test]
    fn poll_interval_is_clamped() {
        assert_eq!(poll_interval_from(None), HEALTH_POLL_DEFAULT_MS);
        assert_eq!(poll_interval_from(Some("1000")), 5_000);
        assert_eq!(poll_interval_from(Some("60000")), 60_000);
        assert_eq!(poll_interval_from(Some("9999999")), 300_000);
        assert_eq!(poll_interval_from(Some("abc")), HEALTH_POLL_DEFAULT_MS);
    }

    #[test]
    fn health_results_map_to_status() {
        let ok = Ok(HealthStatus {
            status: "ok".into(),
            database: "connected".into(),
        });
        assert_eq!(status_from_health(&ok), DbStatus::Connected);
        let down = Ok(HealthStatus {
            status: "error".into(),
            database: "disconnected".into(),
        });
        assert_eq!(status_from_health(&down), DbStatus::Disconnected);
        let http_err = Err(ApiError::Server {
            status: 503,
            mensaje: None,
        });
        assert_eq!(status_from_health(&http_err), DbStatus::Error);
        let net = Err(ApiError::Network("refused".into()));
        assert_eq!(status_from_health(&net), DbStatus::Disconnected);
    }

    #[test]
    fn login_fallbacks() {
        assert_eq!(login_error_fallback(401), "Error de autenticación");
        assert_eq!(login_error_fallback(502), FALLBACK_CONNECTION);
    }
}
