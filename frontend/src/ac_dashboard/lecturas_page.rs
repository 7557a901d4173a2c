use aircontrol_shared::dates::{format_date_display, format_time, parse_api_date};
use aircontrol_shared::forms::LecturaForm;
use aircontrol_shared::thresholds::{applicable_threshold, humidity_level, temperature_level};
use aircontrol_shared::{Aire, Lectura, Umbral, optimistic};
use dioxus::prelude::*;

use super::widgets::{
    AlertBanner, AlertKind, Badge, ConfirmModal, Field, Modal, Spinner, TextField,
    humidity_variant, temperature_variant,
};
use super::{LoadGuard, http, now_hhmm, session, today_iso};

/// Fills `aire_nombre`/`ubicacion` from the aires list and orders newest first.
pub fn enrich_lecturas(mut lecturas: Vec<Lectura>, aires: &[Aire]) -> Vec<Lectura> {
    for l in lecturas.iter_mut() {
        if let Some(a) = aires.iter().find(|a| a.id == l.aire_id) {
            l.aire_nombre.get_or_insert_with(|| a.nombre.clone());
            l.ubicacion.get_or_insert_with(|| a.ubicacion.clone());
        }
    }
    lecturas.sort_by(|a, b| parse_api_date(&b.fecha).cmp(&parse_api_date(&a.fecha)));
    lecturas
}

#[component]
pub fn Lecturas() -> Element {
    let can_delete = session::current_user().is_some_and(|u| u.rol.can_delete_lecturas());

    let mut aires = use_signal(Vec::<Aire>::new);
    let mut umbrales = use_signal(Vec::<Umbral>::new);
    let mut lecturas = use_signal(Vec::<Lectura>::new);
    let mut filtro = use_signal(String::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut reload = use_signal(|| 0u64);
    let mut guard = use_signal(LoadGuard::default);

    let mut show_add = use_signal(|| false);
    let mut form = use_signal(|| LecturaForm::new_blank(&today_iso(), &now_hhmm()));
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut confirm_delete = use_signal(|| None::<i64>);

    use_effect(move || {
        let _ = reload();
        let aire_id = filtro();
        let ticket = guard.write().issue();
        spawn(async move {
            loading.set(true);
            let lista_aires = match http::get_list::<Aire>("/api/aires").await {
                Ok(a) => a,
                Err(e) => {
                    if guard.peek().is_latest(ticket) {
                        error.set(Some(e.user_message("Error al cargar los aires acondicionados.")));
                        loading.set(false);
                    }
                    return;
                }
            };
            let umbrales_res = http::get_list::<Umbral>("/api/umbrales").await;
            let path = http::with_query(
                "/api/lecturas",
                &[("aire_id", Some(aire_id).filter(|s| !s.is_empty()))],
            );
            let lecturas_res = http::get_list::<Lectura>(&path).await;
            if !guard.peek().is_latest(ticket) {
                return;
            }
            match umbrales_res {
                Ok(u) => umbrales.set(u),
                Err(e) => log!(warn: "[lecturas] umbrales unavailable, using fallbacks: {e}"),
            }
            match lecturas_res {
                Ok(l) => lecturas.set(enrich_lecturas(l, &lista_aires)),
                Err(e) => error.set(Some(e.user_message("Error al cargar las lecturas."))),
            }
            aires.set(lista_aires);
            loading.set(false);
        });
    });

    let open_add = move |_| {
        let mut f = LecturaForm::new_blank(&today_iso(), &now_hhmm());
        f.aire_id = filtro();
        form.set(f);
        form_error.set(None);
        show_add.set(true);
    };

    let submit = move |_| {
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
            let res = http::post_json("/api/lecturas", &payload).await;
            saving.set(false);
            match res {
                Ok(ack) => {
                    show_add.set(false);
                    notice.set(Some(ack.mensaje.unwrap_or_else(|| "Lectura registrada.".into())));
                    reload += 1;
                }
                Err(e) => form_error.set(Some(e.user_message("Error al registrar la lectura."))),
            }
        });
    };

    let mut do_delete = move |id: i64| {
        confirm_delete.set(None);
        let snapshot = optimistic::remove(&mut lecturas.write(), id);
        spawn(async move {
            if let Err(e) = http::delete(&format!("/api/lecturas/{id}")).await {
                log!(warn: "[lecturas] delete {id} failed, restoring list");
                lecturas.set(snapshot);
                error.set(Some(e.user_message("Error al eliminar la lectura.")));
            }
        });
    };

    let rows = lecturas.read().clone();
    let umbrales_now = umbrales.read().clone();
    let aire_opts = aires.read().clone();
    let f = form.read().clone();

    rsx! {
        div { class: "ac-page",
            div { class: "ac-page-head",
                h2 { class: "ac-title", "Lecturas" }
                div { style: "display:flex; gap:10px; align-items:center;",
                    select {
                        class: "ac-input",
                        value: "{filtro}",
                        onchange: move |e| filtro.set(e.value()),
                        option { value: "", "Todos los aires" }
                        for a in aire_opts.iter() {
                            option { key: "{a.id}", value: "{a.id}", "{a.label()}" }
                        }
                    }
                    button { class: "ac-btn ac-btn-primary", onclick: open_add, "+ Nueva Lectura" }
                }
            }
            AlertBanner { kind: AlertKind::Error, message: error }
            AlertBanner { kind: AlertKind::Success, message: notice }

            if loading() {
                Spinner { label: "Cargando lecturas..." }
            } else if rows.is_empty() {
                div { class: "ac-card", style: "color:#94a3b8;", "No hay lecturas registradas." }
            } else {
                div { class: "ac-card", style: "padding:0; overflow:auto;",
                    table { class: "ac-table",
                        thead {
                            tr {
                                th { "ID" }
                                th { "Aire" }
                                th { "Ubicación" }
                                th { "Fecha" }
                                th { "Hora" }
                                th { "Temperatura" }
                                th { "Humedad" }
                                if can_delete {
                                    th {}
                                }
                            }
                        }
                        tbody {
                            for l in rows {
                                {
                                    let umbral = applicable_threshold(&umbrales_now, l.aire_id);
                                    let t = temperature_level(l.temperatura, umbral);
                                    let h = humidity_level(l.humedad, umbral);
                                    rsx! {
                                        tr { key: "{l.id}",
                                            td { "{l.id}" }
                                            td { {l.aire_nombre.clone().unwrap_or_else(|| format!("Aire {}", l.aire_id))} }
                                            td { {l.ubicacion.clone().unwrap_or_else(|| "N/A".into())} }
                                            td { "{format_date_display(&l.fecha)}" }
                                            td { "{format_time(&l.fecha)}" }
                                            td {
                                                Badge {
                                                    variant: "{temperature_variant(t)}",
                                                    text: format!("{:.1} °C · {}", l.temperatura, t.temperature_label()),
                                                }
                                            }
                                            td {
                                                Badge {
                                                    variant: "{humidity_variant(h)}",
                                                    text: format!("{:.1} % · {}", l.humedad, h.humidity_label()),
                                                }
                                            }
                                            if can_delete {
                                                td { style: "text-align:right;",
                                                    button {
                                                        class: "ac-btn ac-btn-sm ac-btn-danger",
                                                        onclick: move |_| confirm_delete.set(Some(l.id)),
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
                }
            }

            if let Some(id) = confirm_delete() {
                ConfirmModal {
                    message: "¿Está seguro de que desea eliminar esta lectura?",
                    on_confirm: move |_| do_delete(id),
                    on_cancel: move |_| confirm_delete.set(None),
                }
            }

            if show_add() {
                Modal {
                    title: "Nueva Lectura",
                    on_close: move |_| show_add.set(false),
                    footer: rsx! {
                        button { class: "ac-btn", onclick: move |_| show_add.set(false), "Cancelar" }
                        button {
                            class: "ac-btn ac-btn-primary",
                            disabled: saving(),
                            onclick: submit,
                            if saving() { "Guardando..." } else { "Guardar" }
                        }
                    },
                    AlertBanner { kind: AlertKind::Error, message: form_error }
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
                    div { class: "ac-grid-2",
                        TextField { label: "Fecha *", input_type: "date", value: f.fecha, on_input: move |v| form.write().fecha = v }
                        TextField { label: "Hora *", input_type: "time", value: f.hora, on_input: move |v| form.write().hora = v }
                        TextField { label: "Temperatura (°C) *", input_type: "number", value: f.temperatura, on_input: move |v| form.write().temperatura = v }
                        TextField { label: "Humedad (%) *", input_type: "number", value: f.humedad, on_input: move |v| form.write().humedad = v }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lectura(id: i64, aire_id: i64, fecha: &str) -> Lectura {
        Lectura {
            id,
            aire_id,
            fecha: fecha.into(),
            temperatura: 22.0,
            humedad: 50.0,
            aire_nombre: None,
            ubicacion: None,
        }
    }

    #[test]
    fn enrich_fills_names_and_sorts_newest_first() {
        let aires = vec![Aire {
            id: 1,
            nombre: "AC-1".into(),
            ubicacion: "Sala A".into(),
            fecha_instalacion: "2022-01-01".into(),
        }];
        let out = enrich_lecturas(
            vec![
                lectura(1, 1, "2024-05-01 08:00:00"),
                lectura(2, 9, "2024-05-02 08:00:00"),
                lectura(3, 1, "Wed, 01 May 2024 12:00:00 GMT"),
            ],
            &aires,
        );
        let ids: Vec<i64> = out.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(out[1].aire_nombre.as_deref(), Some("AC-1"));
        assert_eq!(out[1].ubicacion.as_deref(), Some("Sala A"));
        assert_eq!(out[0].aire_nombre, None);
    }
}
