use aircontrol_shared::dates::format_date_time;
use aircontrol_shared::forms::{
    EquipoRef, MantenimientoForm, MantenimientoPayload, TIPOS_MANTENIMIENTO,
    tipo_mantenimiento_color,
};
use aircontrol_shared::{Aire, ImagenResponse, Mantenimiento, OtroEquipo, optimistic};
use dioxus::prelude::*;

use super::http::{self, Upload};
use super::widgets::{
    AlertBanner, AlertKind, Badge, ConfirmModal, DetailRow, Field, Modal, Spinner, TextArea,
    TextField, or_na,
};
use super::{LoadGuard, session};

const TIPO_AIRE: &str = "Aire Acondicionado";
const TIPO_DESCONOCIDO: &str = "Desconocido";

/// Resolves the equipment name, location and kind for one record.
pub fn enrich_mantenimiento(
    mut m: Mantenimiento,
    aires: &[Aire],
    otros: &[OtroEquipo],
) -> Mantenimiento {
    let resolved = match (m.aire_id, m.otro_equipo_id) {
        (Some(id), _) => aires
            .iter()
            .find(|a| a.id == id)
            .map(|a| (a.nombre.clone(), Some(a.ubicacion.clone()), TIPO_AIRE.to_string())),
        (None, Some(id)) => otros
            .iter()
            .find(|o| o.id == id)
            .map(|o| (o.nombre.clone(), o.ubicacion.clone(), o.tipo.to_string())),
        (None, None) => None,
    };
    match resolved {
        Some((nombre, ubicacion, tipo)) => {
            m.equipo_nombre = Some(nombre);
            m.equipo_ubicacion = ubicacion;
            m.equipo_tipo = Some(tipo);
        }
        None => {
            m.equipo_nombre.get_or_insert_with(|| TIPO_DESCONOCIDO.to_string());
            m.equipo_tipo.get_or_insert_with(|| TIPO_DESCONOCIDO.to_string());
        }
    }
    m
}

/// Record built from the submitted form when the server only echoes an id.
fn from_payload(id: i64, p: &MantenimientoPayload, fecha: String, tiene_imagen: bool) -> Mantenimiento {
    let (aire_id, otro_equipo_id) = match p.target {
        EquipoRef::Aire(a) => (Some(a), None),
        EquipoRef::Otro(o) => (None, Some(o)),
    };
    Mantenimiento {
        id,
        aire_id,
        otro_equipo_id,
        fecha,
        tipo_mantenimiento: p.tipo_mantenimiento.clone(),
        descripcion: p.descripcion.clone(),
        tecnico: p.tecnico.clone(),
        tiene_imagen,
        equipo_nombre: None,
        equipo_ubicacion: None,
        equipo_tipo: None,
    }
}

fn matches_filter(m: &Mantenimiento, filtro: &str) -> bool {
    filtro.is_empty() || m.aire_id.map(|id| id.to_string()).as_deref() == Some(filtro)
}

pub fn mime_for(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

const OTROS_WARNING: &str = "Advertencia: no se pudieron cargar otros equipos";

/// Adds the otros-equipos warning to an existing error, replacing any earlier copy of it.
fn with_warning(prev: Option<&str>, warn: &str) -> String {
    let mut lines: Vec<&str> = prev
        .unwrap_or_default()
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with(OTROS_WARNING))
        .collect();
    lines.push(warn);
    lines.join("\n")
}

/// `imagen_base64` as an `<img src>`; already-prefixed data URLs pass through.
pub fn image_src(b64: &str) -> String {
    if b64.starts_with("data:") {
        b64.to_string()
    } else {
        format!("data:image/jpeg;base64,{b64}")
    }
}

#[derive(Clone, PartialEq)]
enum ImagenState {
    Loading,
    Ready(String),
    Failed(String),
}

#[component]
pub fn Mantenimientos() -> Element {
    let can_manage = session::current_user().is_some_and(|u| u.rol.can_manage());

    let mut aires = use_signal(Vec::<Aire>::new);
    let mut otros = use_signal(Vec::<OtroEquipo>::new);
    let mut registros = use_signal(Vec::<Mantenimiento>::new);
    let mut filtro = use_signal(String::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut reload = use_signal(|| 0u64);
    let mut guard = use_signal(LoadGuard::default);

    let mut show_add = use_signal(|| false);
    let mut form = use_signal(MantenimientoForm::default);
    let mut upload = use_signal(|| None::<Upload>);
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut viewing = use_signal(|| None::<Mantenimiento>);
    let mut imagen = use_signal(|| None::<ImagenState>);
    let mut confirm_delete = use_signal(|| None::<i64>);

    use_effect(move || {
        let _ = reload();
        let sel = filtro();
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
            let otros_res = http::get_list::<OtroEquipo>("/api/otros-equipos").await;
            if !guard.peek().is_latest(ticket) {
                return;
            }
            let lista_otros = match otros_res {
                Ok(o) => o,
                Err(e) => {
                    let warn = format!(
                        "{OTROS_WARNING} ({}).",
                        e.user_message("error desconocido")
                    );
                    let merged = with_warning(error.peek().as_deref(), &warn);
                    error.set(Some(merged));
                    Vec::new()
                }
            };

            if !sel.is_empty() && !lista_aires.iter().any(|a| a.id.to_string() == sel) {
                log!("[mantenimientos] filter {sel} no longer exists, showing all");
                aires.set(lista_aires);
                otros.set(lista_otros);
                filtro.set(String::new());
                return;
            }

            let path = http::with_query(
                "/api/mantenimientos",
                &[("aire_id", Some(sel).filter(|s| !s.is_empty()))],
            );
            let res = http::get_list::<Mantenimiento>(&path).await;
            if !guard.peek().is_latest(ticket) {
                return;
            }
            match res {
                Ok(list) => registros.set(
                    list.into_iter()
                        .map(|m| enrich_mantenimiento(m, &lista_aires, &lista_otros))
                        .collect(),
                ),
                Err(e) => error.set(Some(e.user_message("Error al cargar los mantenimientos."))),
            }
            aires.set(lista_aires);
            otros.set(lista_otros);
            loading.set(false);
        });
    });

    let open_add = move |_| {
        let mut f = MantenimientoForm::default();
        f.set_aire(filtro());
        form.set(f);
        upload.set(None);
        form_error.set(None);
        show_add.set(true);
    };

    let pick_file = move |evt: FormEvent| async move {
        let Some(file) = evt.files().into_iter().next() else {
            upload.set(None);
            return;
        };
        let filename = file.name();
        match file.read_bytes().await {
            Ok(bytes) => upload.set(Some(Upload {
                mime: mime_for(&filename).to_string(),
                filename,
                bytes: bytes.to_vec(),
            })),
            Err(e) => {
                log!(warn: "[mantenimientos] could not read {filename}: {e}");
                form_error.set(Some("No se pudo leer el archivo seleccionado.".into()));
            }
        }
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
        let file = upload.read().clone();
        spawn(async move {
            let has_file = file.is_some();
            let res = http::post_multipart(
                "/api/mantenimientos",
                payload.fields(),
                file.map(|u| ("imagen_file", u)),
            )
            .await;
            saving.set(false);
            let ack = match res {
                Ok(ack) => ack,
                Err(e) => {
                    form_error.set(Some(e.user_message("Error al registrar el mantenimiento.")));
                    return;
                }
            };
            show_add.set(false);
            notice.set(Some(
                ack.mensaje.clone().unwrap_or_else(|| "Mantenimiento registrado.".into()),
            ));

            let created = ack.data_as::<Mantenimiento>().or_else(|| {
                ack.data.as_ref()?;
                let id = ack.created_id()?;
                Some(from_payload(id, &payload, super::today_iso(), has_file))
            });
            match created {
                Some(m) => {
                    let m = enrich_mantenimiento(m, &aires.peek(), &otros.peek());
                    if matches_filter(&m, &filtro.peek()) {
                        optimistic::prepend(&mut registros.write(), m);
                    }
                }
                None => reload += 1,
            }
        });
    };

    let mut open_imagen = move |id: i64| {
        imagen.set(Some(ImagenState::Loading));
        spawn(async move {
            let state = match http::get_json::<ImagenResponse>(&format!("/api/mantenimientos/{id}/imagen")).await {
                Ok(ImagenResponse { imagen_base64: Some(b64), .. }) if !b64.is_empty() => {
                    ImagenState::Ready(image_src(&b64))
                }
                Ok(_) => ImagenState::Failed("No se encontró la imagen.".into()),
                Err(e) => ImagenState::Failed(e.user_message("Error al cargar la imagen.")),
            };
            imagen.set(Some(state));
        });
    };

    let mut do_delete = move |id: i64| {
        confirm_delete.set(None);
        let snapshot = optimistic::remove(&mut registros.write(), id);
        spawn(async move {
            if let Err(e) = http::delete(&format!("/api/mantenimientos/{id}")).await {
                log!(warn: "[mantenimientos] delete {id} failed, restoring list");
                registros.set(snapshot);
                error.set(Some(e.user_message("Error al eliminar el mantenimiento.")));
            }
        });
    };

    let rows = registros.read().clone();
    let aire_opts = aires.read().clone();
    let otro_opts = otros.read().clone();
    let f = form.read().clone();
    let file_name = upload.read().as_ref().map(|u| u.filename.clone());

    rsx! {
        div { class: "ac-page",
            div { class: "ac-page-head",
                h2 { class: "ac-title", "Mantenimientos" }
                div { style: "display:flex; gap:10px; align-items:center;",
                    select {
                        class: "ac-input",
                        value: "{filtro}",
                        onchange: move |e| filtro.set(e.value()),
                        option { value: "", "Todos los equipos" }
                        for a in aire_opts.iter() {
                            option { key: "{a.id}", value: "{a.id}", "{a.label()}" }
                        }
                    }
                    if can_manage {
                        button { class: "ac-btn ac-btn-primary", onclick: open_add, "+ Registrar Mantenimiento" }
                    }
                }
            }
            AlertBanner { kind: AlertKind::Error, message: error }
            AlertBanner { kind: AlertKind::Success, message: notice }

            if loading() {
                Spinner { label: "Cargando mantenimientos..." }
            } else if rows.is_empty() {
                div { class: "ac-card", style: "color:#94a3b8;", "No hay mantenimientos registrados." }
            } else {
                div { class: "ac-card", style: "padding:0; overflow:auto;",
                    table { class: "ac-table ac-table-hover",
                        thead {
                            tr {
                                th { "Fecha" }
                                th { "Equipo" }
                                th { "Tipo de Equipo" }
                                th { "Tipo" }
                                th { "Técnico" }
                                th { "Imagen" }
                                if can_manage {
                                    th {}
                                }
                            }
                        }
                        tbody {
                            for m in rows {
                                tr {
                                    key: "{m.id}",
                                    onclick: {
                                        let m = m.clone();
                                        move |_| viewing.set(Some(m.clone()))
                                    },
                                    td { "{format_date_time(Some(&m.fecha))}" }
                                    td { "{or_na(&m.equipo_nombre)}" }
                                    td { "{or_na(&m.equipo_tipo)}" }
                                    td {
                                        Badge {
                                            variant: "{tipo_mantenimiento_color(&m.tipo_mantenimiento)}",
                                            text: "{m.tipo_mantenimiento}",
                                        }
                                    }
                                    td { "{m.tecnico}" }
                                    td {
                                        if m.tiene_imagen {
                                            button {
                                                class: "ac-btn ac-btn-sm",
                                                onclick: move |e: MouseEvent| {
                                                    e.stop_propagation();
                                                    open_imagen(m.id);
                                                },
                                                "Ver imagen"
                                            }
                                        } else {
                                            span { style: "color:#64748b;", "-" }
                                        }
                                    }
                                    if can_manage {
                                        td { style: "text-align:right;",
                                            button {
                                                class: "ac-btn ac-btn-sm ac-btn-danger",
                                                onclick: move |e: MouseEvent| {
                                                    e.stop_propagation();
                                                    confirm_delete.set(Some(m.id));
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
                    message: "¿Está seguro de que desea eliminar este mantenimiento?",
                    on_confirm: move |_| do_delete(id),
                    on_cancel: move |_| confirm_delete.set(None),
                }
            }

            if let Some(m) = viewing() {
                Modal {
                    title: "Detalle del Mantenimiento",
                    on_close: move |_| viewing.set(None),
                    footer: rsx! {
                        if m.tiene_imagen {
                            button {
                                class: "ac-btn ac-btn-primary",
                                onclick: move |_| open_imagen(m.id),
                                "Ver imagen"
                            }
                        }
                        button { class: "ac-btn", onclick: move |_| viewing.set(None), "Cerrar" }
                    },
                    DetailRow { label: "ID", "{m.id}" }
                    DetailRow { label: "Fecha", "{format_date_time(Some(&m.fecha))}" }
                    DetailRow { label: "Equipo", "{or_na(&m.equipo_nombre)}" }
                    DetailRow { label: "Ubicación", "{or_na(&m.equipo_ubicacion)}" }
                    DetailRow { label: "Tipo de Equipo", "{or_na(&m.equipo_tipo)}" }
                    DetailRow { label: "Tipo de Mantenimiento",
                        Badge {
                            variant: "{tipo_mantenimiento_color(&m.tipo_mantenimiento)}",
                            text: "{m.tipo_mantenimiento}",
                        }
                    }
                    DetailRow { label: "Técnico", "{m.tecnico}" }
                    DetailRow { label: "Descripción",
                        div { style: "white-space:pre-line;", "{m.descripcion}" }
                    }
                }
            }

            if let Some(state) = imagen() {
                Modal {
                    title: "Imagen del Mantenimiento",
                    width: "820px",
                    on_close: move |_| imagen.set(None),
                    {match state {
                        ImagenState::Loading => rsx! { Spinner { label: "Cargando imagen..." } },
                        ImagenState::Ready(src) => rsx! {
                            img { src: "{src}", alt: "Imagen del mantenimiento", style: "max-width:100%; border-radius:10px;" }
                        },
                        ImagenState::Failed(msg) => rsx! {
                            div { style: "color:#fecaca; padding:24px; text-align:center;", "{msg}" }
                        },
                    }}
                }
            }

            if show_add() {
                Modal {
                    title: "Registrar Mantenimiento",
                    width: "720px",
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
                    div { class: "ac-grid-2",
                        Field { label: "Aire Acondicionado",
                            select {
                                class: "ac-input",
                                value: "{f.aire_id}",
                                onchange: move |e| form.write().set_aire(e.value()),
                                option { value: "", "Ninguno" }
                                for a in aire_opts.iter() {
                                    option { key: "{a.id}", value: "{a.id}", "{a.label()}" }
                                }
                            }
                        }
                        Field { label: "Otro Equipo",
                            select {
                                class: "ac-input",
                                value: "{f.otro_equipo_id}",
                                onchange: move |e| form.write().set_otro(e.value()),
                                option { value: "", "Ninguno" }
                                for o in otro_opts.iter() {
                                    option { key: "{o.id}", value: "{o.id}", "{o.nombre} ({o.tipo})" }
                                }
                            }
                        }
                    }
                    Field { label: "Tipo de Mantenimiento *",
                        select {
                            class: "ac-input",
                            value: "{f.tipo_mantenimiento}",
                            onchange: move |e| form.write().tipo_mantenimiento = e.value(),
                            option { value: "", "Seleccione un tipo" }
                            for t in TIPOS_MANTENIMIENTO {
                                option { key: "{t}", value: "{t}", "{t}" }
                            }
                        }
                    }
                    TextArea { label: "Descripción *", value: f.descripcion, on_input: move |v| form.write().descripcion = v }
                    TextField { label: "Técnico *", value: f.tecnico, on_input: move |v| form.write().tecnico = v }
                    Field { label: "Imagen (opcional)",
                        input {
                            class: "ac-input",
                            r#type: "file",
                            accept: "image/*",
                            onchange: pick_file,
                        }
                    }
                    if let Some(name) = file_name {
                        div { style: "font-size:12px; color:#94a3b8;", "Archivo: {name}" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircontrol_shared::TipoEquipo;

    fn registro(aire_id: Option<i64>, otro_equipo_id: Option<i64>) -> Mantenimiento {
        Mantenimiento {
            id: 1,
            aire_id,
            otro_equipo_id,
            fecha: "2024-03-01 10:00:00".into(),
            tipo_mantenimiento: "Preventivo".into(),
            descripcion: "Cambio de filtros".into(),
            tecnico: "J. Pérez".into(),
            tiene_imagen: false,
            equipo_nombre: None,
            equipo_ubicacion: None,
            equipo_tipo: None,
        }
    }

    fn otro(id: i64) -> OtroEquipo {
        OtroEquipo {
            id,
            nombre: "UPS Principal".into(),
            tipo: TipoEquipo::Ups,
            ubicacion: Some("Cuarto técnico".into()),
            marca: None,
            modelo: None,
            serial: None,
            codigo_inventario: None,
            fecha_instalacion: None,
            estado_operativo: true,
            notas: None,
            fecha_creacion: None,
            ultima_modificacion: None,
        }
    }

    #[test]
    fn enrich_resolves_each_target_kind() {
        let aires = vec![Aire {
            id: 4,
            nombre: "AC-4".into(),
            ubicacion: "Data center".into(),
            fecha_instalacion: "2021-06-01".into(),
        }];
        let otros = vec![otro(7)];

        let a = enrich_mantenimiento(registro(Some(4), None), &aires, &otros);
        assert_eq!(a.equipo_nombre.as_deref(), Some("AC-4"));
        assert_eq!(a.equipo_tipo.as_deref(), Some(TIPO_AIRE));

        let o = enrich_mantenimiento(registro(None, Some(7)), &aires, &otros);
        assert_eq!(o.equipo_tipo.as_deref(), Some("UPS"));
        assert_eq!(o.equipo_ubicacion.as_deref(), Some("Cuarto técnico"));

        let u = enrich_mantenimiento(registro(Some(99), None), &aires, &otros);
        assert_eq!(u.equipo_nombre.as_deref(), Some(TIPO_DESCONOCIDO));
        assert_eq!(u.equipo_tipo.as_deref(), Some(TIPO_DESCONOCIDO));
    }

    #[test]
    fn filter_matching() {
        let m = registro(Some(4), None);
        assert!(matches_filter(&m, ""));
        assert!(matches_filter(&m, "4"));
        assert!(!matches_filter(&m, "5"));
        assert!(!matches_filter(&registro(None, Some(4)), "4"));
    }

    #[test]
    fn image_helpers() {
        assert_eq!(mime_for("foto.PNG"), "image/png");
        assert_eq!(mime_for("sin_extension"), "application/octet-stream");
        assert_eq!(image_src("abc"), "data:image/jpeg;base64,abc");
        assert_eq!(image_src("data:image/png;base64,xyz"), "data:image/png;base64,xyz");
    }

    #[test]
    fn repeated_reloads_keep_a_single_warning() {
        let first = with_warning(None, &format!("{OTROS_WARNING} (timeout)."));
        let again = with_warning(Some(first.as_str()), &format!("{OTROS_WARNING} (timeout)."));
        assert_eq!(again, first);

        let mixed = with_warning(Some("Error al eliminar el mantenimiento."), &first);
        assert_eq!(mixed.lines().count(), 2);
        assert!(mixed.starts_with("Error al eliminar"));
    }
}
