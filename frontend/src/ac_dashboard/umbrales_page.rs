use aircontrol_shared::forms::UmbralForm;
use aircontrol_shared::{Aire, Umbral, optimistic};
use dioxus::prelude::*;

use super::widgets::{
    AlertBanner, AlertKind, Badge, CheckField, ConfirmModal, Field, Modal, Spinner, TextField,
};
use super::{http, session};

/// "Global" or the aire the threshold is pinned to.
pub fn alcance(u: &Umbral, aires: &[Aire]) -> String {
    if u.es_global {
        return "Global".to_string();
    }
    let from_list = u.aire_id.and_then(|id| aires.iter().find(|a| a.id == id));
    match (from_list, &u.aire_nombre) {
        (Some(a), _) => a.label(),
        (None, Some(nombre)) => match &u.ubicacion {
            Some(ub) => format!("{nombre} ({ub})"),
            None => nombre.clone(),
        },
        (None, None) => u
            .aire_id
            .map(|id| format!("Aire {id}"))
            .unwrap_or_else(|| "Específico".to_string()),
    }
}

#[component]
pub fn Umbrales() -> Element {
    let can_manage = session::current_user().is_some_and(|u| u.rol.can_manage());

    let mut aires = use_signal(Vec::<Aire>::new);
    let mut umbrales = use_signal(Vec::<Umbral>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut reload = use_signal(|| 0u64);

    // Some(None) = creating, Some(Some(id)) = editing.
    let mut editing = use_signal(|| None::<Option<i64>>);
    let mut form = use_signal(UmbralForm::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut confirm_delete = use_signal(|| None::<i64>);

    use_effect(move || {
        let _ = reload();
        spawn(async move {
            loading.set(true);
            match http::get_list::<Aire>("/api/aires").await {
                Ok(a) => aires.set(a),
                Err(e) => error.set(Some(e.user_message("Error al cargar los aires acondicionados."))),
            }
            match http::get_list::<Umbral>("/api/umbrales").await {
                Ok(u) => umbrales.set(u),
                Err(e) => error.set(Some(e.user_message("Error al cargar los umbrales."))),
            }
            loading.set(false);
        });
    });

    let open_add = move |_| {
        form.set(UmbralForm::default());
        form_error.set(None);
        editing.set(Some(None));
    };

    let mut open_edit = move |u: Umbral| {
        form.set(UmbralForm::from_umbral(&u));
        form_error.set(None);
        editing.set(Some(Some(u.id)));
    };

    let submit = move |_| {
        let Some(target) = editing() else {
            return;
        };
        let payload = match form.read().validate() {
            Ok(p) => p,
            Err(msg) => {
                form_error.set(Some(msg));
                return;
            }
        };
        form_error.set(None);
        saving.set(true);
        spawn(async move {
            let res = match target {
                Some(id) => http::put_json(&format!("/api/umbrales/{id}"), &payload).await,
                None => http::post_json("/api/umbrales", &payload).await,
            };
            saving.set(false);
            match res {
                Ok(ack) => {
                    editing.set(None);
                    notice.set(Some(ack.mensaje.unwrap_or_else(|| "Umbral guardado.".into())));
                    reload += 1;
                }
                Err(e) => form_error.set(Some(e.user_message("Error al guardar el umbral."))),
            }
        });
    };

    let mut do_delete = move |id: i64| {
        confirm_delete.set(None);
        let snapshot = optimistic::remove(&mut umbrales.write(), id);
        spawn(async move {
            if let Err(e) = http::delete(&format!("/api/umbrales/{id}")).await {
                log!(warn: "[umbrales] delete {id} failed, restoring list");
                umbrales.set(snapshot);
                error.set(Some(e.user_message("Error al eliminar el umbral.")));
            }
        });
    };

    let rows = umbrales.read().clone();
    let aire_opts = aires.read().clone();
    let f = form.read().clone();

    rsx! {
        div { class: "ac-page",
            div { class: "ac-page-head",
                h2 { class: "ac-title", "Umbrales de Alerta" }
                if can_manage {
                    button { class: "ac-btn ac-btn-primary", onclick: open_add, "+ Nuevo Umbral" }
                }
            }
            AlertBanner { kind: AlertKind::Error, message: error }
            AlertBanner { kind: AlertKind::Success, message: notice }

            if loading() {
                Spinner { label: "Cargando umbrales..." }
            } else if rows.is_empty() {
                div { class: "ac-card", style: "color:#94a3b8;",
                    "No hay umbrales configurados. Se usan los valores por defecto (18-25 °C, 30-70 %)."
                }
            } else {
                div { class: "ac-card", style: "padding:0; overflow:auto;",
                    table { class: "ac-table",
                        thead {
                            tr {
                                th { "Nombre" }
                                th { "Alcance" }
                                th { "Temperatura (°C)" }
                                th { "Humedad (%)" }
                                th { "Notificación" }
                                if can_manage {
                                    th {}
                                }
                            }
                        }
                        tbody {
                            for u in rows {
                                tr { key: "{u.id}",
                                    td { "{u.nombre}" }
                                    td {
                                        if u.es_global {
                                            Badge { variant: "primary", text: "Global" }
                                        } else {
                                            "{alcance(&u, &aire_opts)}"
                                        }
                                    }
                                    td { "{u.temp_min} - {u.temp_max}" }
                                    td { "{u.hum_min} - {u.hum_max}" }
                                    td {
                                        if u.notificar_activo {
                                            Badge { variant: "success", text: "Activa" }
                                        } else {
                                            Badge { variant: "secondary", text: "Inactiva" }
                                        }
                                    }
                                    if can_manage {
                                        td { style: "text-align:right; white-space:nowrap;",
                                            button {
                                                class: "ac-btn ac-btn-sm",
                                                onclick: {
                                                    let u = u.clone();
                                                    move |_| open_edit(u.clone())
                                                },
                                                "Editar"
                                            }
                                            button {
                                                class: "ac-btn ac-btn-sm ac-btn-danger",
                                                onclick: move |_| confirm_delete.set(Some(u.id)),
                                                "Eliminar"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if let Some(id) = confirm_delete() {
                ConfirmModal {
                    message: "¿Está seguro de que desea eliminar este umbral?",
                    on_confirm: move |_| do_delete(id),
                    on_cancel: move |_| confirm_delete.set(None),
                }
            }

            if let Some(target) = editing() {
                Modal {
                    title: if target.is_some() { "Editar Umbral".to_string() } else { "Nuevo Umbral".to_string() },
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
                    TextField { label: "Nombre *", value: f.nombre, on_input: move |v| form.write().nombre = v }
                    CheckField {
                        label: "Umbral global (aplica a todos los aires)",
                        checked: f.es_global,
                        on_toggle: move |v: bool| {
                            let mut w = form.write();
                            w.es_global = v;
                            if v {
                                w.aire_id.clear();
                            }
                        },
                    }
                    if !f.es_global {
                        Field { label: "Aire Acondicionado *",
                            select {
                                class: "ac-input",
                                value: "{f.aire_id}",
                                onchange: move |e| form.write().aire_id = e.value(),
                                option { value: "", "Seleccione un aire" }
                                for a in aire_opts.iter() {
                                    option { key: "{a.id}", value: "{a.id}", "{a.label()}" }
                                }
                            }
                        }
                    }
                    div { class: "ac-grid-2",
                        TextField { label: "Temperatura mínima (°C) *", input_type: "number", value: f.temp_min, on_input: move |v| form.write().temp_min = v }
                        TextField { label: "Temperatura máxima (°C) *", input_type: "number", value: f.temp_max, on_input: move |v| form.write().temp_max = v }
                        TextField { label: "Humedad mínima (%) *", input_type: "number", value: f.hum_min, on_input: move |v| form.write().hum_min = v }
                        TextField { label: "Humedad máxima (%) *", input_type: "number", value: f.hum_max, on_input: move |v| form.write().hum_max = v }
                    }
                    CheckField {
                        label: "Notificaciones activas",
                        checked: f.notificar_activo,
                        on_toggle: move |v| form.write().notificar_activo = v,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn umbral(es_global: bool, aire_id: Option<i64>) -> Umbral {
        Umbral {
            id: 1,
            nombre: "Sala".into(),
            es_global,
            aire_id,
            aire_nombre: None,
            ubicacion: None,
            temp_min: 18.0,
            temp_max: 25.0,
            hum_min: 30.0,
            hum_max: 70.0,
            notificar_activo: true,
        }
    }

    #[test]
    fn alcance_prefers_loaded_aire() {
        let aires = vec![Aire {
            id: 2,
            nombre: "AC-2".into(),
            ubicacion: "Piso 1".into(),
            fecha_instalacion: "2020-01-01".into(),
        }];
        assert_eq!(alcance(&umbral(true, None), &aires), "Global");
        assert_eq!(alcance(&umbral(false, Some(2)), &aires), aires[0].label());

        let mut u = umbral(false, Some(9));
        assert_eq!(alcance(&u, &aires), "Aire 9");
        u.aire_nombre = Some("AC-9".into());
        u.ubicacion = Some("Azotea".into());
        assert_eq!(alcance(&u, &aires), "AC-9 (Azotea)");
    }
}
