use aircontrol_shared::dates::format_date_display;
use aircontrol_shared::forms::AireForm;
use aircontrol_shared::{Aire, AireDetalle, ApiError, optimistic};
use dioxus::prelude::*;

use super::widgets::{
    AlertBanner, AlertKind, Badge, CheckField, ConfirmModal, DetailRow, Modal, Spinner, TextField,
    or_na, si_no,
};
use super::{http, session, today_iso};

#[derive(Clone, Copy, PartialEq)]
enum AireModal {
    View(i64),
    Edit(Option<i64>),
}

impl AireModal {
    /// Whether a detail response for `id` still belongs to the open modal.
    fn wants_detail(current: Option<AireModal>, id: i64, into_form: bool) -> bool {
        match current {
            Some(AireModal::Edit(Some(open))) => into_form && open == id,
            Some(AireModal::View(open)) => !into_form && open == id,
            _ => false,
        }
    }
}

fn save_error(e: &ApiError, editing: bool) -> String {
    if e.is_duplicate() {
        if editing {
            "Error: Ya existe otro registro con ese Serial o Código de Inventario.".to_string()
        } else {
            "Error: Ya existe un registro con ese Serial o Código de Inventario.".to_string()
        }
    } else {
        e.user_message("Error al guardar el aire acondicionado.")
    }
}

#[component]
pub fn Aires() -> Element {
    let can_manage = session::current_user().is_some_and(|u| u.rol.can_manage());

    let mut aires = use_signal(Vec::<Aire>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut reload = use_signal(|| 0u64);

    let mut modal = use_signal(|| None::<AireModal>);
    let mut form = use_signal(|| AireForm::new_blank(&today_iso()));
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut detalle = use_signal(|| None::<AireDetalle>);
    let mut detail_loading = use_signal(|| false);
    let mut confirm_delete = use_signal(|| None::<i64>);

    use_effect(move || {
        let _ = reload();
        spawn(async move {
            loading.set(true);
            match http::get_list::<Aire>("/api/aires").await {
                Ok(list) => aires.set(list),
                Err(ApiError::Decode(_)) => error.set(Some(
                    "Formato de respuesta inesperado del servidor al listar aires.".into(),
                )),
                Err(e) => error.set(Some(e.user_message("Error al cargar los aires acondicionados."))),
            }
            loading.set(false);
        });
    });

    let mut load_detalle = move |id: i64, into_form: bool| {
        detail_loading.set(true);
        spawn(async move {
            let res = http::get_record::<AireDetalle>(&format!("/api/aires/{id}")).await;
            let current = *modal.peek();
            if !AireModal::wants_detail(current, id, into_form) {
                log!("[aires] dropping stale detail for {id}");
                if !matches!(current, Some(AireModal::View(_)) | Some(AireModal::Edit(Some(_)))) {
                    detail_loading.set(false);
                }
                return;
            }
            match res {
                Ok(d) => {
                    if into_form {
                        form.set(AireForm::from_detalle(&d));
                    }
                    detalle.set(Some(d));
                }
                Err(e) => {
                    let msg = e.user_message("Error al cargar los detalles del aire.");
                    if into_form {
                        form_error.set(Some(msg));
                    } else {
                        error.set(Some(msg));
                        modal.set(None);
                    }
                }
            }
            detail_loading.set(false);
        });
    };

    let mut open_view = move |id: i64| {
        detalle.set(None);
        modal.set(Some(AireModal::View(id)));
        load_detalle(id, false);
    };

    let open_add = move |_| {
        form.set(AireForm::new_blank(&today_iso()));
        form_error.set(None);
        modal.set(Some(AireModal::Edit(None)));
    };

    let mut open_edit = move |a: Aire| {
        form.set(AireForm::from_list_item(&a));
        form_error.set(None);
        modal.set(Some(AireModal::Edit(Some(a.id))));
        load_detalle(a.id, true);
    };

    let submit = move |_| {
        let Some(AireModal::Edit(editing)) = *modal.read() else {
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
                Some(id) => http::put_json(&format!("/api/aires/{id}"), &payload).await,
                None => http::post_json("/api/aires", &payload).await,
            };
            saving.set(false);
            match res {
                Ok(ack) => {
                    modal.set(None);
                    notice.set(Some(ack.mensaje.unwrap_or_else(|| {
                        if editing.is_some() {
                            "Aire acondicionado actualizado.".into()
                        } else {
                            "Aire acondicionado agregado.".into()
                        }
                    })));
                    reload += 1;
                }
                Err(e) => form_error.set(Some(save_error(&e, editing.is_some()))),
            }
        });
    };

    let mut do_delete = move |id: i64| {
        confirm_delete.set(None);
        let snapshot = optimistic::remove(&mut aires.write(), id);
        spawn(async move {
            if let Err(e) = http::delete(&format!("/api/aires/{id}")).await {
                log!(warn: "[aires] delete {id} failed, restoring list");
                aires.set(snapshot);
                error.set(Some(e.user_message("Error al eliminar el aire acondicionado.")));
            }
        });
    };

    let rows = aires.read().clone();

    rsx! {
        div { class: "ac-page",
            div { class: "ac-page-head",
                h2 { class: "ac-title", "Aires Acondicionados" }
                if can_manage {
                    button { class: "ac-btn ac-btn-primary", onclick: open_add, "+ Agregar Aire" }
                }
            }
            AlertBanner { kind: AlertKind::Error, message: error }
            AlertBanner { kind: AlertKind::Success, message: notice }

            if loading() {
                Spinner { label: "Cargando aires..." }
            } else if rows.is_empty() {
                div { class: "ac-card", style: "color:#94a3b8;", "No hay aires acondicionados registrados." }
            } else {
                div { class: "ac-card", style: "padding:0; overflow:auto;",
                    table { class: "ac-table ac-table-hover",
                        thead {
                            tr {
                                th { "ID" }
                                th { "Nombre" }
                                th { "Ubicación" }
                                th { "Fecha de Instalación" }
                                if can_manage {
                                    th { style: "text-align:right;", "Acciones" }
                                }
                            }
                        }
                        tbody {
                            for a in rows {
                                tr {
                                    key: "{a.id}",
                                    onclick: move |_| open_view(a.id),
                                    td { "{a.id}" }
                                    td { "{a.nombre}" }
                                    td { "{a.ubicacion}" }
                                    td { "{format_date_display(&a.fecha_instalacion)}" }
                                    if can_manage {
                                        td { style: "text-align:right; white-space:nowrap;",
                                            button {
                                                class: "ac-btn ac-btn-sm",
                                                onclick: {
                                                    let a = a.clone();
                                                    move |e: MouseEvent| {
                                                        e.stop_propagation();
                                                        open_edit(a.clone());
                                                    }
                                                },
                                                "Editar"
                                            }
                                            button {
                                                class: "ac-btn ac-btn-sm ac-btn-danger",
                                                onclick: move |e: MouseEvent| {
                                                    e.stop_propagation();
                                                    confirm_delete.set(Some(a.id));
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
                    message: "¿Está seguro de que desea eliminar este aire acondicionado?",
                    on_confirm: move |_| do_delete(id),
                    on_cancel: move |_| confirm_delete.set(None),
                }
            }

            {match modal() {
                Some(AireModal::View(_)) => rsx! {
                    Modal {
                        title: "Detalles del Aire Acondicionado",
                        width: "760px",
                        on_close: move |_| modal.set(None),
                        if detail_loading() {
                            Spinner { label: "Cargando detalles..." }
                        } else if let Some(d) = detalle() {
                            AireDetalleView { d }
                        }
                    }
                },
                Some(AireModal::Edit(editing)) => rsx! {
                    Modal {
                        title: if editing.is_some() { "Editar Aire Acondicionado".to_string() } else { "Agregar Aire Acondicionado".to_string() },
                        width: "820px",
                        on_close: move |_| modal.set(None),
                        footer: rsx! {
                            button { class: "ac-btn", onclick: move |_| modal.set(None), "Cancelar" }
                            button {
                                class: "ac-btn ac-btn-primary",
                                disabled: saving() || detail_loading(),
                                onclick: submit,
                                if saving() { "Guardando..." } else { "Guardar" }
                            }
                        },
                        AlertBanner { kind: AlertKind::Error, message: form_error }
                        if detail_loading() {
                            div { style: "color:#94a3b8; font-size:13px; margin-bottom:8px;", "Cargando datos completos..." }
                        }
                        AireFormFields { form }
                    }
                },
                None => rsx! {},
            }}
        }
    }
}

#[component]
fn AireFormFields(form: Signal<AireForm>) -> Element {
    let f = form.read().clone();
    let mut form = form;
    rsx! {
        div { class: "ac-grid-2",
            TextField { label: "Nombre *", value: f.nombre, on_input: move |v| form.write().nombre = v }
            TextField { label: "Ubicación *", value: f.ubicacion, on_input: move |v| form.write().ubicacion = v }
            TextField {
                label: "Fecha de Instalación *",
                input_type: "date",
                value: f.fecha_instalacion,
                on_input: move |v| form.write().fecha_instalacion = v,
            }
            TextField { label: "Tipo", value: f.tipo, on_input: move |v| form.write().tipo = v }
            TextField {
                label: "Toneladas",
                input_type: "number",
                value: f.toneladas,
                on_input: move |v| form.write().toneladas = v,
            }
        }

        h4 { class: "ac-subtitle", "Evaporadora" }
        div { class: "ac-grid-2",
            TextField { label: "Marca", value: f.evaporadora_marca, on_input: move |v| form.write().evaporadora_marca = v }
            TextField { label: "Modelo", value: f.evaporadora_modelo, on_input: move |v| form.write().evaporadora_modelo = v }
            TextField { label: "Serial *", value: f.evaporadora_serial, on_input: move |v| form.write().evaporadora_serial = v }
            TextField {
                label: "Código de Inventario *",
                value: f.evaporadora_codigo_inventario,
                on_input: move |v| form.write().evaporadora_codigo_inventario = v,
            }
            TextField {
                label: "Ubicación de Instalación",
                value: f.evaporadora_ubicacion_instalacion,
                on_input: move |v| form.write().evaporadora_ubicacion_instalacion = v,
            }
        }
        CheckField {
            label: "Evaporadora operativa",
            checked: f.evaporadora_operativa,
            on_toggle: move |v| form.write().evaporadora_operativa = v,
        }

        h4 { class: "ac-subtitle", "Condensadora" }
        div { class: "ac-grid-2",
            TextField { label: "Marca", value: f.condensadora_marca, on_input: move |v| form.write().condensadora_marca = v }
            TextField { label: "Modelo", value: f.condensadora_modelo, on_input: move |v| form.write().condensadora_modelo = v }
            TextField { label: "Serial *", value: f.condensadora_serial, on_input: move |v| form.write().condensadora_serial = v }
            TextField {
                label: "Código de Inventario *",
                value: f.condensadora_codigo_inventario,
                on_input: move |v| form.write().condensadora_codigo_inventario = v,
            }
            TextField {
                label: "Ubicación de Instalación",
                value: f.condensadora_ubicacion_instalacion,
                on_input: move |v| form.write().condensadora_ubicacion_instalacion = v,
            }
        }
        CheckField {
            label: "Condensadora operativa",
            checked: f.condensadora_operativa,
            on_toggle: move |v| form.write().condensadora_operativa = v,
        }
    }
}

#[component]
fn AireDetalleView(d: AireDetalle) -> Element {
    let (ev_v, ev_t) = si_no(d.evaporadora_operativa);
    let (co_v, co_t) = si_no(d.condensadora_operativa);
    let toneladas = d.toneladas.map(|t| format!("{t}")).unwrap_or_else(|| "N/A".into());
    rsx! {
        DetailRow { label: "ID", "{d.id}" }
        DetailRow { label: "Nombre", "{d.nombre}" }
        DetailRow { label: "Ubicación", "{d.ubicacion}" }
        DetailRow { label: "Fecha de Instalación", "{format_date_display(&d.fecha_instalacion)}" }
        DetailRow { label: "Tipo", "{or_na(&d.tipo)}" }
        DetailRow { label: "Toneladas", "{toneladas}" }

        h4 { class: "ac-subtitle", "Evaporadora" }
        DetailRow { label: "Operativa", Badge { variant: "{ev_v}", text: "{ev_t}" } }
        DetailRow { label: "Marca", "{or_na(&d.evaporadora_marca)}" }
        DetailRow { label: "Modelo", "{or_na(&d.evaporadora_modelo)}" }
        DetailRow { label: "Serial", "{or_na(&d.evaporadora_serial)}" }
        DetailRow { label: "Código de Inventario", "{or_na(&d.evaporadora_codigo_inventario)}" }
        DetailRow { label: "Ubicación de Instalación", "{or_na(&d.evaporadora_ubicacion_instalacion)}" }

        h4 { class: "ac-subtitle", "Condensadora" }
        DetailRow { label: "Operativa", Badge { variant: "{co_v}", text: "{co_t}" } }
        DetailRow { label: "Marca", "{or_na(&d.condensadora_marca)}" }
        DetailRow { label: "Modelo", "{or_na(&d.condensadora_modelo)}" }
        DetailRow { label: "Serial", "{or_na(&d.condensadora_serial)}" }
        DetailRow { label: "Código de Inventario", "{or_na(&d.condensadora_codigo_inventario)}" }
        DetailRow { label: "Ubicación de Instalación", "{or_na(&d.condensadora_ubicacion_instalacion)}" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_messages_depend_on_mode() {
        let dup = ApiError::Rejected("duplicate key value violates unique constraint".into());
        assert!(save_error(&dup, false).starts_with("Error: Ya existe un registro"));
        assert!(save_error(&dup, true).starts_with("Error: Ya existe otro registro"));
        let other = ApiError::Rejected("Campo inválido".into());
        assert_eq!(save_error(&other, false), "Campo inválido");
    }

    #[test]
    fn detail_responses_only_land_in_their_own_modal() {
        let edit_b = Some(AireModal::Edit(Some(2)));
        assert!(AireModal::wants_detail(edit_b, 2, true));
        assert!(!AireModal::wants_detail(edit_b, 1, true));
        assert!(!AireModal::wants_detail(edit_b, 2, false));

        let view_a = Some(AireModal::View(1));
        assert!(AireModal::wants_detail(view_a, 1, false));
        assert!(!AireModal::wants_detail(view_a, 1, true));

        assert!(!AireModal::wants_detail(None, 1, false));
        assert!(!AireModal::wants_detail(Some(AireModal::Edit(None)), 1, true));
    }
}
