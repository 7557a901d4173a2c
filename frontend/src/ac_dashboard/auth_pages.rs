use aircontrol_shared::forms::RegisterForm;
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use super::session::{self, AUTH, LOGIN_NOTICE};
use super::widgets::TextField;
use crate::app::Route;

#[component]
fn AuthCard(title: String, subtitle: String, children: Element) -> Element {
    rsx! {
        div { style: "min-height:100vh; display:flex; align-items:center; justify-content:center; padding:24px;",
            div { class: "ac-card", style: "width:min(440px, 94vw); padding:28px;",
                h1 { style: "margin:0 0 4px 0; font-size:22px;", "{title}" }
                p { style: "margin:0 0 20px 0; color:#94a3b8; font-size:14px;", "{subtitle}" }
                {children}
            }
        }
    }
}

/// Session error from the shared auth state, dismissed through `clear_error`.
#[component]
fn AuthError() -> Element {
    let Some(msg) = AUTH.read().error.clone() else {
        return rsx! {};
    };
    rsx! {
        div { class: "ac-alert ac-alert-error",
            span { style: "flex:1;", "{msg}" }
            button { class: "ac-btn-ghost", onclick: move |_| session::clear_error(), "×" }
        }
    }
}

#[component]
pub fn Login() -> Element {
    let nav = use_navigator();
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);

    use_effect(move || {
        if AUTH.read().is_authenticated() {
            let _ = nav.replace(Route::Dashboard {});
        }
    });

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let (u, p) = (username().trim().to_string(), password());
        if u.is_empty() || p.is_empty() {
            AUTH.write().error = Some("Usuario y contraseña son requeridos".into());
            return;
        }
        spawn(async move {
            if session::login(u, p).await {
                *LOGIN_NOTICE.write() = None;
                let _ = nav.replace(Route::Dashboard {});
            }
        });
    };

    let busy = AUTH.read().loading;
    let notice = LOGIN_NOTICE.read().clone();

    rsx! {
        AuthCard { title: "AirControl", subtitle: "Inicia sesión para continuar",
            if let Some(n) = notice {
                div { class: "ac-alert ac-alert-success",
                    span { style: "flex:1;", "{n}" }
                    button { class: "ac-btn-ghost", onclick: move |_| *LOGIN_NOTICE.write() = None, "×" }
                }
            }
            AuthError {}
            form { onsubmit: submit,
                TextField { label: "Usuario", value: username(), on_input: move |v| username.set(v) }
                TextField { label: "Contraseña", input_type: "password", value: password(), on_input: move |v| password.set(v) }
                button {
                    class: "ac-btn ac-btn-primary",
                    style: "width:100%; margin-top:10px;",
                    r#type: "submit",
                    disabled: busy,
                    if busy { "Ingresando..." } else { "Iniciar sesión" }
                }
            }
            p { style: "margin:18px 0 0 0; font-size:13px; color:#94a3b8; text-align:center;",
                "¿No tienes cuenta? "
                Link {
                    to: Route::Register {},
                    onclick: move |_| session::clear_error(),
                    "Regístrate"
                }
            }
        }
    }
}

#[component]
pub fn Register() -> Element {
    let nav = use_navigator();
    let mut form = use_signal(RegisterForm::default);
    let mut submitting = use_signal(|| false);

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let data = form.read().clone();
        submitting.set(true);
        spawn(async move {
            let ok = session::register(&data).await;
            submitting.set(false);
            if ok {
                let _ = nav.push(Route::Login {});
            }
        });
    };

    let f = form.read().clone();

    rsx! {
        AuthCard { title: "Crear cuenta", subtitle: "Registra un nuevo usuario operador",
            AuthError {}
            form { onsubmit: submit,
                div { class: "ac-grid-2",
                    TextField { label: "Nombre", value: f.nombre, on_input: move |v| form.write().nombre = v }
                    TextField { label: "Apellido", value: f.apellido, on_input: move |v| form.write().apellido = v }
                }
                TextField { label: "Email", input_type: "email", value: f.email, on_input: move |v| form.write().email = v }
                TextField { label: "Usuario", value: f.username, on_input: move |v| form.write().username = v }
                TextField { label: "Contraseña", input_type: "password", value: f.password, on_input: move |v| form.write().password = v }
                TextField {
                    label: "Confirmar contraseña",
                    input_type: "password",
                    value: f.confirm_password,
                    on_input: move |v| form.write().confirm_password = v,
                }
                button {
                    class: "ac-btn ac-btn-primary",
                    style: "width:100%; margin-top:10px;",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Registrando..." } else { "Registrarse" }
                }
            }
            p { style: "margin:18px 0 0 0; font-size:13px; color:#94a3b8; text-align:center;",
                "¿Ya tienes cuenta? "
                Link {
                    to: Route::Login {},
                    onclick: move |_| session::clear_error(),
                    "Inicia sesión"
                }
            }
        }
    }
}
