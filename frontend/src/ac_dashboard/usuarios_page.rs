use aircontrol_shared::dates::format_date_time;
use aircontrol_shared::forms::UsuarioForm;
use aircontrol_shared::{Rol, Usuario, UsuarioUpdate, optimistic};
use dioxus::prelude::*;

use super::widgets::{AlertBanner, AlertKind, Badge, CheckField, Field, Modal, Spinner, TextField};
use super::{LoadGuard, http, session};

pub fn rol_variant(r: Rol) -> &'static str {
    match r {
        Rol::Admin => "danger",
        Rol::Supervisor => "warning",
        Rol::Operador => "info",
        Rol::Desconocido => "secondary",
    }
}

#[component]
pub fn Usuarios() -> Element {
    let me = session::current_user();
    if !me.as_ref().is_some_and(|u| u.rol.is_admin()) {
        return rsx! {
            div { class: "ac-page",
                h2 { class: "ac-title", "Usuarios" }
                div { class: "ac-card", style: "color:#fde68a;",
                    "Acceso denegado. Solo los administradores pueden gestionar usuarios."
                }
            }
        };
    }
    let my_id = me.map(|u| u.id);
    rsx! { UsuariosAdmin { my_id } }
}

#[component]
fn UsuariosAdmin(my_id: Option<i64>) -> Element {
    let mut usuarios = use_signal(Vec::<Usuario>::new);
    let mut solo_activos = use_signal(|| false);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut reload = use_signal(|| 0u64);
    let mut guard = use_signal(LoadGuard::default);

    let mut editing = use_signal(|| None::<Option<i64>>);
    let mut form = use_signal(UsuarioForm::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);

    use_effect(move || {
        let _ = reload();
        let activos = solo_activos();
        let ticket = guard.write().issue();
        spawn(async move {
            loading.set(true);
            let path = http::with_query("/api/usuarios", &[("solo_activos", Some(activos.to_string()))]);
            let res = http::get_list::<Usuario>(&path).await;
            if !guard.peek().is_latest(ticket) {
                return;
            }
            match res {
                Ok(list) => usuarios.set(list),
                Err(e) => error.set(Some(e.user_message("Error al cargar los usuarios."))),
            }
            loading.set(false);
        });
    });

    let open_add = move |_| {
        form.set(UsuarioForm::default());
        form_error.set(None);
        editing.set(Some(None));
    };

    let mut open_edit = move |u: Usuario| {
        form.set(UsuarioForm::from_usuario(&u));
        form_error.set(None);
        editing.set(Some(Some(u.id)));
    };

    let submit = move |_| {
        let Some(target) = editing() else {
            return;
        };
        let f = form.read().clone();
        let checked = match target {
            Some(id) => f.validate_update().map(|p| (Some(id), serde_json::to_value(p))),
            None => f.validate_create().map(|p| (None, serde_json::to_value(p))),
        };
        let (id, body) = match checked {
            Ok((id, Ok(body))) => (id, body),
            Ok((_, Err(e))) => {
                form_error.set(Some(format!("Error interno: {e}")));
                return;
            }
            Err(msg) => {
                form_error.set(Some(msg));
                return;
            }
        };
        form_error.set(None);
        saving.set(true);
        spawn(async move {
            let res = match id {
                Some(id) => http::put_json(&format!("/api/usuarios/{id}"), &body).await,
                None => http::post_json("/api/admin/users", &body).await,
            };
            saving.set(false);
            match res {
                Ok(ack) => {
                    editing.set(None);
                    let fallback = if id.is_some() { "Usuario actualizado." } else { "Usuario creado." };
                    notice.set(Some(ack.mensaje.unwrap_or_else(|| fallback.into())));
                    reload += 1;
                }
                Err(e) if e.is_duplicate() => form_error.set(Some(
                    "Ya existe un usuario con ese nombre de usuario o email.".into(),
                )),
                Err(e) => form_error.set(Some(e.user_message("Error al guardar el usuario."))),
            }
        });
    };

    let mut toggle_activo = move |id: i64| {
        let Some(snapshot) = optimistic::modify(&mut usuarios.write(), id, |u| u.activo = !u.activo) else {
            return;
        };
        let Some(update) = usuarios.peek().iter().find(|u| u.id == id).map(UsuarioUpdate::from) else {
            return;
        };
        spawn(async move {
            match http::put_json(&format!("/api/usuarios/{id}"), &update).await {
                Ok(_) => {
                    let estado = if update.activo { "activado" } else { "desactivado" };
                    notice.set(Some(format!("Usuario {estado}.")));
                    if *solo_activos.peek() && !update.activo {
                        usuarios.write().retain(|u| u.id != id);
                    }
                }
                Err(e) => {
                    log!(warn: "[usuarios] toggle {id} failed, restoring list");
                    usuarios.set(snapshot);
                    error.set(Some(e.user_message("Error al cambiar el estado del usuario.")));
                }
            }
        });
    };

    let rows = usuarios.read().clone();
    let f = form.read().clone();

    rsx! {
        div { class: "ac-page",
            div { class: "ac-page-head",
                h2 { class: "ac-title", "Usuarios" }
                div { style: "display:flex; gap:14px; align-items:center;",
                    CheckField {
                        label: "Solo activos",
                        checked: solo_activos(),
                        on_toggle: move |v| solo_activos.set(v),
                    }
                    button { class: "ac-btn ac-btn-primary", onclick: open_add, "+ Nuevo Usuario" }
                }
            }
            AlertBanner { kind: AlertKind::Error, message: error }
            AlertBanner { kind: AlertKind::Success, message: notice }

            if loading() {
                Spinner { label: "Cargando usuarios..." }
            } else if rows.is_empty() {
                div { class: "ac-card", style: "color:#94a3b8;", "No hay usuarios para mostrar." }
            } else {
                div { class: "ac-card", style: "padding:0; overflow:auto;",
                    table { class: "ac-table",
                        thead {
                            tr {
                                th { "Nombre" }
                                th { "Usuario" }
                                th { "Email" }
                                th { "Rol" }
                                th { "Estado" }
                                th { "Registro" }
                                th { "Última conexión" }
                                th {}
                            }
                        }
                        tbody {
                            for u in rows {
                                tr { key: "{u.id}",
                                    td { "{u.nombre} {u.apellido}" }
                                    td { "{u.username}" }
                                    td { "{u.email}" }
                                    td { Badge { variant: "{rol_variant(u.rol)}", text: "{u.rol.label()}" } }
                                    td {
                                        if u.activo {
                                            Badge { variant: "success", text: "Activo" }
                                        } else {
                                            Badge { variant: "secondary", text: "Inactivo" }
                                        }
                                    }
                                    td { "{format_date_time(u.fecha_registro.as_deref())}" }
                                    td { "{format_date_time(u.ultima_conexion.as_deref())}" }
                                    td { style: "text-align:right; white-space:nowrap;",
                                        button {
                                            class: "ac-btn ac-btn-sm",
                                            onclick: {
                                                let u = u.clone();
                                                move |_| open_edit(u.clone())
                                            },
                                            "Editar"
                                        }
                                        if Some(u.id) != my_id {
                                            button {
                                                class: if u.activo { "ac-btn ac-btn-sm ac-btn-danger" } else { "ac-btn ac-btn-sm" },
                                                onclick: move |_| toggle_activo(u.id),
                                                if u.activo { "Desactivar" } else { "Activar" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if let Some(target) = editing() {
                Modal {
                    title: if target.is_some() { "Editar Usuario".to_string() } else { "Nuevo Usuario".to_string() },
                    on_close: move |_| editing.set(None),
                    footer: rsx! {
                        button { class: "ac-btn", onclick: move |_| editing.set(None), "Cancelar" }
                        button {
                            class: "ac-btn ac-btn-primary",
                            disabled: saving(),
                            onclick: submit,
                            if saving() { "Guardando..." } else { "Guardar" }
                        }
                    },
                    AlertBanner { kind: AlertKind::Error, message: form_error }
                    div { class: "ac-grid-2",
                        TextField { label: "Nombre *", value: f.nombre, on_input: move |v| form.write().nombre = v }
                        TextField { label: "Apellido *", value: f.apellido, on_input: move |v| form.write().apellido = v }
                        TextField { label: "Email *", input_type: "email", value: f.email, on_input: move |v| form.write().email = v }
                        if target.is_none() {
                            TextField { label: "Usuario *", value: f.username, on_input: move |v| form.write().username = v }
                            TextField {
                                label: "Contraseña *",
                                input_type: "password",
                                value: f.password,
                                on_input: move |v| form.write().password = v,
                            }
                        }
                        Field { label: "Rol *",
                            select {
                                class: "ac-input",
                                value: "{f.rol}",
                                onchange: move |e| form.write().rol = e.value(),
                                for r in Rol::ASSIGNABLE {
                                    option { key: "{r.as_str()}", value: "{r.as_str()}", "{r.label()}" }
                                }
                            }
                        }
                    }
                    if target.is_some() {
                        CheckField {
                            label: "Usuario activo",
                            checked: f.activo,
                            on_toggle: move |v| form.write().activo = v,
                        }
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
    fn role_badges() {
        assert_eq!(rol_variant(Rol::Admin), "danger");
        assert_eq!(rol_variant(Rol::Operador), "info");
        assert_eq!(rol_variant(Rol::from("otro".to_string())), "secondary");
    }
}
