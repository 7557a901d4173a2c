use aircontrol_shared::dates::{format_date_display, format_date_time};
use aircontrol_shared::forms::OtroEquipoForm;
use aircontrol_shared::{ApiMessage, OtroEquipo, TipoEquipo, optimistic};
use dioxus::prelude::*;

use super::widgets::{
    AlertBanner, AlertKind, Badge, CheckField, ConfirmModal, DetailRow, Field, Modal, Spinner,
    TextArea, TextField, or_na, si_no,
};
use super::{http, session};

#[derive(Clone, Copy, PartialEq)]
enum EquipoModal {
    View(i64),
    Edit(Option<i64>),
}

impl EquipoModal {
    fn is_viewing(current: Option<EquipoModal>, id: i64) -> bool {
        current == Some(EquipoModal::View(id))
    }
}

fn marca_modelo(e: &OtroEquipo) -> String {
    match (e.marca.as_deref(), e.modelo.as_deref()) {
        (Some(m), Some(d)) if !m.is_empty() && !d.is_empty() => format!("{m} / {d}"),
        (Some(m), _) if !m.is_empty() => m.to_string(),
        (_, Some(d)) if !d.is_empty() => d.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Saved record echoed by the server, if it sent one with an id.
pub fn echoed_record(ack: &ApiMessage) -> Option<OtroEquipo> {
    ack.data_as::<OtroEquipo>().filter(|e| e.id > 0)
}

#[component]
pub fn OtrosEquipos() -> Element {
    let can_manage = session::current_user().is_some_and(|u| u.rol.can_manage());

    let mut equipos = use_signal(Vec::<OtroEquipo>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut reload = use_signal(|| 0u64);

    let mut modal = use_signal(|| None::<EquipoModal>);
    let mut form = use_signal(OtroEquipoForm::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut detalle = use_signal(|| None::<OtroEquipo>);
    let mut confirm_delete = use_signal(|| None::<i64>);

    use_effect(move || {
        let _ = reload();
        spawn(async move {
            loading.set(true);
            match http::get_list::<OtroEquipo>("/api/otros-equipos").await {
                Ok(list) => equipos.set(list),
                Err(e) => error.set(Some(e.user_message("Error al cargar los equipos."))),
            }
            loading.set(false);
        });
    });

    let mut open_view = move |e: OtroEquipo| {
        let id = e.id;
        detalle.set(Some(e));
        modal.set(Some(EquipoModal::View(id)));
        spawn(async move {
            let res = http::get_record::<OtroEquipo>(&format!("/api/otros-equipos/{id}")).await;
            if !EquipoModal::is_viewing(*modal.peek(), id) {
                return;
            }
            match res {
                Ok(full) => detalle.set(Some(full)),
                Err(err) => log!(warn: "[otros-equipos] detail {id} failed, showing list data: {err}"),
            }
        });
    };

    let open_add = move |_| {
        form.set(OtroEquipoForm::default());
        form_error.set(None);
        modal.set(Some(EquipoModal::Edit(None)));
    };

    let mut open_edit = move |e: OtroEquipo| {
        form.set(OtroEquipoForm::from_equipo(&e));
        form_error.set(None);
        modal.set(Some(EquipoModal::Edit(Some(e.id))));
    };

    let submit = move |_| {
        let Some(EquipoModal::Edit(editing)) = modal() else {
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
            let res = match editing {
                Some(id) => http::put_json(&format!("/api/otros-equipos/{id}"), &payload).await,
                None => http::post_json("/api/otros-equipos", &payload).await,
            };
            saving.set(false);
            match res {
                Ok(ack) => {
                    modal.set(None);
                    notice.set(Some(ack.mensaje.clone().unwrap_or_else(|| {
                        if editing.is_some() {
                            "Equipo actualizado.".into()
                        } else {
                            "Equipo agregado.".into()
                        }
                    })));
                    match echoed_record(&ack) {
                        Some(saved) => {
                            optimistic::upsert(&mut equipos.write(), saved);
                        }
                        None => reload += 1,
                    }
                }
                Err(e) => form_error.set(Some(e.user_message("Error al guardar el equipo."))),
            }
        });
    };

    let mut do_delete = move |id: i64| {
        confirm_delete.set(None);
        let snapshot = optimistic::remove(&mut equipos.write(), id);
        spawn(async move {
            if let Err(e) = http::delete(&format!("/api/otros-equipos/{id}")).await {
                log!(warn: "[otros-equipos] delete {id} failed, restoring list");
                equipos.set(snapshot);
                error.set(Some(e.user_message("Error al eliminar el equipo.")));
            }
        });
    };

    let rows = equipos.read().clone();
    let f = form.read().clone();

    rsx! {
        div { class: "ac-page",
            div { class: "ac-page-head",
                h2 { class: "ac-title", "Otros Equipos" }
                if can_manage {
                    button { class: "ac-btn ac-btn-primary", onclick: open_add, "+ Agregar Equipo" }
                }
            }
            AlertBanner { kind: AlertKind::Error, message: error }
            AlertBanner { kind: AlertKind::Success, message: notice }

            if loading() {
                Spinner { label: "Cargando equipos..." }
            } else if rows.is_empty() {
                div { class: "ac-card", style: "color:#94a3b8;", "No hay otros equipos registrados." }
            } else {
                div { class: "ac-card", style: "padding:0; overflow:auto;",
                    table { class: "ac-table ac-table-hover",
                        thead {
                            tr {
                                th { "Nombre" }
                                th { "Tipo" }
                                th { "Ubicación" }
                                th { "Marca / Modelo" }
                                th { "Estado" }
                                if can_manage {
                                    th {}
                                }
                            }
                        }
                        tbody {
                            for e in rows {
                                tr {
                                    key: "{e.id}",
                                    onclick: {
                                        let e = e.clone();
                                        move |_| open_view(e.clone())
                                    },
                                    td { "{e.nombre}" }
                                    td { Badge { variant: "info", text: "{e.tipo}" } }
                                    td { "{or_na(&e.ubicacion)}" }
                                    td { "{marca_modelo(&e)}" }
                                    td {
                                        if e.estado_operativo {
                                            Badge { variant: "success", text: "Operativo" }
                                        } else {
                                            Badge { variant: "danger", text: "No operativo" }
                                        }
                                    }
                                    if can_manage {
                                        td { style: "text-align:right; white-space:nowrap;",
                                            button {
                                                class: "ac-btn ac-btn-sm",
                                                onclick: {
                                                    let e = e.clone();
                                                    move |ev: MouseEvent| {
                                                        ev.stop_propagation();
                                                        open_edit(e.clone());
                                                    }
                                                },
                                                "Editar"
                                            }
                                            button {
                                                class: "ac-btn ac-btn-sm ac-btn-danger",
                                                onclick: move |ev: MouseEvent| {
                                                    ev.stop_propagation();
                                                    confirm_delete.set(Some(e.id));
                                                },
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
                    message: "¿Está seguro de que desea eliminar este equipo?",
                    on_confirm: move |_| do_delete(id),
                    on_cancel: move |_| confirm_delete.set(None),
                }
            }

            {match modal() {
                Some(EquipoModal::View(_)) => rsx! {
                    Modal {
                        title: "Detalles del Equipo",
                        on_close: move |_| modal.set(None),
                        if let Some(d) = detalle() {
                            EquipoDetalle { e: d }
                        }
                    }
                },
                Some(EquipoModal::Edit(editing)) => rsx! {
                    Modal {
                        title: if editing.is_some() { "Editar Equipo".to_string() } else { "Agregar Equipo".to_string() },
                        width: "760px",
                        on_close: move |_| modal.set(None),
                        footer: rsx! {
                            button { class: "ac-btn", onclick: move |_| modal.set(None), "Cancelar" }
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
                            Field { label: "Tipo *",
                                select {
                                    class: "ac-input",
                                    value: "{f.tipo}",
                                    onchange: move |e| form.write().tipo = e.value(),
                                    for t in TipoEquipo::ALL {
                                        option { key: "{t}", value: "{t}", "{t}" }
                                    }
                                }
                            }
                            TextField { label: "Ubicación", value: f.ubicacion, on_input: move |v| form.write().ubicacion = v }
                            TextField { label: "Marca", value: f.marca, on_input: move |v| form.write().marca = v }
                            TextField { label: "Modelo", value: f.modelo, on_input: move |v| form.write().modelo = v }
                            TextField { label: "Serial", value: f.serial, on_input: move |v| form.write().serial = v }
                            TextField {
                                label: "Código de Inventario",
                                value: f.codigo_inventario,
                                on_input: move |v| form.write().codigo_inventario = v,
                            }
                            TextField {
                                label: "Fecha de Instalación",
                                input_type: "date",
                                value: f.fecha_instalacion,
                                on_input: move |v| form.write().fecha_instalacion = v,
                            }
                        }
                        CheckField {
                            label: "Estado operativo",
                            checked: f.estado_operativo,
                            on_toggle: move |v| form.write().estado_operativo = v,
                        }
                        TextArea { label: "Notas", value: f.notas, on_input: move |v| form.write().notas = v }
                    }
                },
                None => rsx! {},
            }}
        }
    }
}

#[component]
fn EquipoDetalle(e: OtroEquipo) -> Element {
    let (op_v, op_t) = si_no(e.estado_operativo);
    let instalado = e
        .fecha_instalacion
        .as_deref()
        .map(format_date_display)
        .unwrap_or_else(|| "N/A".into());
    rsx! {
        DetailRow { label: "ID", "{e.id}" }
        DetailRow { label: "Nombre", "{e.nombre}" }
        DetailRow { label: "Tipo", "{e.tipo}" }
        DetailRow { label: "Ubicación", "{or_na(&e.ubicacion)}" }
        DetailRow { label: "Marca", "{or_na(&e.marca)}" }
        DetailRow { label: "Modelo", "{or_na(&e.modelo)}" }
        DetailRow { label: "Serial", "{or_na(&e.serial)}" }
        DetailRow { label: "Código de Inventario", "{or_na(&e.codigo_inventario)}" }
        DetailRow { label: "Fecha de Instalación", "{instalado}" }
        DetailRow { label: "Operativo", Badge { variant: "{op_v}", text: "{op_t}" } }
        DetailRow { label: "Notas",
            div { style: "white-space:pre-line;", "{or_na(&e.notas)}" }
        }
        DetailRow { label: "Creado", "{format_date_time(e.fecha_creacion.as_deref())}" }
        DetailRow { label: "Última modificación", "{format_date_time(e.ultima_modificacion.as_deref())}" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircontrol_shared::ApiEnvelope;
    use serde_json::json;

    fn equipo() -> OtroEquipo {
        serde_json::from_value(json!({
            "id": 5,
            "nombre": "Planta 1",
            "tipo": "Motogenerador",
            "marca": "Cummins",
            "modelo": null,
            "estado_operativo": true
        }))
        .unwrap()
    }

    #[test]
    fn marca_modelo_joins_available_parts() {
        let mut e = equipo();
        assert_eq!(marca_modelo(&e), "Cummins");
        e.modelo = Some("C150".into());
        assert_eq!(marca_modelo(&e), "Cummins / C150");
        e.marca = None;
        e.modelo = None;
        assert_eq!(marca_modelo(&e), "N/A");
    }

    #[test]
    fn echoed_record_needs_data_with_id() {
        let with = ApiEnvelope {
            success: Some(true),
            mensaje: Some("Equipo creado".into()),
            id: None,
            data: Some(json!({"id": 8, "nombre": "UPS A", "tipo": "UPS", "estado_operativo": false})),
        };
        let saved = echoed_record(&with).unwrap();
        assert_eq!(saved.id, 8);
        assert_eq!(saved.tipo, TipoEquipo::Ups);

        let without = ApiEnvelope {
            data: None,
            ..with
        };
        assert!(echoed_record(&without).is_none());
    }

    #[test]
    fn detail_only_applies_to_the_equipo_on_screen() {
        assert!(EquipoModal::is_viewing(Some(EquipoModal::View(4)), 4));
        assert!(!EquipoModal::is_viewing(Some(EquipoModal::View(5)), 4));
        assert!(!EquipoModal::is_viewing(Some(EquipoModal::Edit(Some(4))), 4));
        assert!(!EquipoModal::is_viewing(None, 4));
    }
}
