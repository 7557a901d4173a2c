use aircontrol_shared::stats::{
    LAST_READINGS, group_by_location, last_readings, location_series, locations, reading_series,
};
use aircontrol_shared::{
    Aire, EstadisticasAire, EstadisticasGenerales, EstadisticasUbicacion, Lectura, fmt_opt,
};
use dioxus::prelude::*;
use futures_util::future::join4;

use super::chart::{BarChart, LineChart};
use super::widgets::{AlertBanner, AlertKind, Field, Spinner, StatCard};
use super::{LoadGuard, http};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    General,
    PorAire,
    PorUbicacion,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::General, Tab::PorAire, Tab::PorUbicacion];

    fn label(&self) -> &'static str {
        match self {
            Tab::General => "General",
            Tab::PorAire => "Por Aire",
            Tab::PorUbicacion => "Por Ubicación",
        }
    }
}

/// Server location stats when it has any, otherwise grouped locally.
pub fn resolve_location_stats(
    server: Option<Vec<EstadisticasUbicacion>>,
    lecturas: &[Lectura],
    aires: &[Aire],
) -> Vec<EstadisticasUbicacion> {
    match server {
        Some(s) if !s.is_empty() => s,
        _ => group_by_location(lecturas, aires),
    }
}

#[component]
pub fn Estadisticas() -> Element {
    let mut tab = use_signal(|| Tab::General);
    let mut aires = use_signal(Vec::<Aire>::new);
    let mut lecturas = use_signal(Vec::<Lectura>::new);
    let mut generales = use_signal(EstadisticasGenerales::default);
    let mut por_ubicacion = use_signal(Vec::<EstadisticasUbicacion>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);

    use_effect(move || {
        spawn(async move {
            loading.set(true);
            let (aires_res, general_res, lecturas_res, ubicacion_res) = join4(
                http::get_list::<Aire>("/api/aires"),
                http::get_record::<EstadisticasGenerales>("/api/estadisticas/general"),
                http::get_list::<Lectura>("/api/lecturas"),
                http::get_list::<EstadisticasUbicacion>("/api/estadisticas/ubicacion"),
            )
            .await;

            let lista_aires = match aires_res {
                Ok(a) => a,
                Err(e) => {
                    error.set(Some(e.user_message("Error al cargar los aires acondicionados.")));
                    Vec::new()
                }
            };
            match general_res {
                Ok(g) => generales.set(g),
                Err(e) => error.set(Some(e.user_message("Error al cargar las estadísticas generales."))),
            }
            let lista_lecturas = match lecturas_res {
                Ok(l) => l,
                Err(e) => {
                    error.set(Some(e.user_message("Error al cargar las lecturas.")));
                    Vec::new()
                }
            };
            let server = match ubicacion_res {
                Ok(s) => Some(s),
                Err(e) => {
                    log!(warn: "[estadisticas] location stats unavailable, grouping locally: {e}");
                    None
                }
            };
            por_ubicacion.set(resolve_location_stats(server, &lista_lecturas, &lista_aires));
            aires.set(lista_aires);
            lecturas.set(lista_lecturas);
            loading.set(false);
        });
    });

    let current = tab();

    rsx! {
        div { class: "ac-page",
            h2 { class: "ac-title", "Estadísticas" }
            AlertBanner { kind: AlertKind::Error, message: error }

            div { class: "ac-tabs",
                for t in Tab::ALL {
                    button {
                        key: "{t.label()}",
                        class: if t == current { "ac-tab ac-tab-active" } else { "ac-tab" },
                        onclick: move |_| tab.set(t),
                        "{t.label()}"
                    }
                }
            }

            if loading() {
                Spinner { label: "Cargando estadísticas..." }
            } else {
                {match current {
                    Tab::General => rsx! {
                        GeneralTab {
                            generales: generales(),
                            lecturas: lecturas(),
                            por_ubicacion: por_ubicacion(),
                        }
                    },
                    Tab::PorAire => rsx! { AireTab { aires: aires() } },
                    Tab::PorUbicacion => rsx! {
                        UbicacionTab { aires: aires(), por_ubicacion: por_ubicacion() }
                    },
                }}
            }
        }
    }
}

#[component]
fn GeneralTab(
    generales: EstadisticasGenerales,
    lecturas: Vec<Lectura>,
    por_ubicacion: Vec<EstadisticasUbicacion>,
) -> Element {
    let (temp, hum) = reading_series(&last_readings(&lecturas, LAST_READINGS, None));
    let (temp_loc, hum_loc) = location_series(&por_ubicacion);
    let g = generales;
    let total = g
        .total_lecturas
        .map(|n| n.to_string())
        .unwrap_or_else(|| lecturas.len().to_string());

    rsx! {
        div { style: "display:flex; gap:14px; flex-wrap:wrap; margin-bottom:18px;",
            StatCard { title: "Temp. promedio (°C)", value: fmt_opt(g.temperatura_promedio, 1), accent: "#f97316" }
            StatCard { title: "Temp. máx / mín", value: format!("{} / {}", fmt_opt(g.temperatura_maxima, 1), fmt_opt(g.temperatura_minima, 1)), accent: "#ef4444" }
            StatCard { title: "Humedad promedio (%)", value: fmt_opt(g.humedad_promedio, 1), accent: "#22d3ee" }
            StatCard { title: "Hum. máx / mín", value: format!("{} / {}", fmt_opt(g.humedad_maxima, 1), fmt_opt(g.humedad_minima, 1)), accent: "#0ea5e9" }
            StatCard { title: "Total lecturas", value: total, accent: "#16a34a" }
        }
        div { class: "ac-grid-2",
            LineChart { title: "Temperatura (últimas {LAST_READINGS} lecturas)", data: temp }
            LineChart { title: "Humedad (últimas {LAST_READINGS} lecturas)", data: hum }
            BarChart { title: "Temperatura promedio por ubicación", data: temp_loc }
            BarChart { title: "Humedad promedio por ubicación", data: hum_loc }
        }
    }
}

#[component]
fn AireTab(aires: Vec<Aire>) -> Element {
    let mut selected = use_signal(|| None::<i64>);
    let mut stats = use_signal(|| None::<EstadisticasAire>);
    let mut recientes = use_signal(Vec::<Lectura>::new);
    let mut loading = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut guard = use_signal(LoadGuard::default);

    use_effect(move || {
        let ticket = guard.write().issue();
        let Some(id) = selected() else {
            stats.set(None);
            recientes.set(Vec::new());
            loading.set(false);
            return;
        };
        spawn(async move {
            loading.set(true);
            let stats_res =
                http::get_record::<EstadisticasAire>(&format!("/api/estadisticas/aire/{id}")).await;
            let path = http::with_query("/api/lecturas", &[("aire_id", Some(id.to_string()))]);
            let lecturas_res = http::get_list::<Lectura>(&path).await;
            if !guard.peek().is_latest(ticket) {
                return;
            }
            match stats_res {
                Ok(s) => stats.set(Some(s)),
                Err(e) => {
                    stats.set(None);
                    error.set(Some(e.user_message("Error al cargar las estadísticas del aire.")));
                }
            }
            match lecturas_res {
                Ok(l) => recientes.set(last_readings(&l, LAST_READINGS, Some(id))),
                Err(e) => error.set(Some(e.user_message("Error al cargar las lecturas del aire."))),
            }
            loading.set(false);
        });
    });

    let (temp, hum) = reading_series(&recientes.read());
    let value = selected().map(|id| id.to_string()).unwrap_or_default();

    rsx! {
        AlertBanner { kind: AlertKind::Error, message: error }
        div { class: "ac-card", style: "margin-bottom:16px;",
            Field { label: "Aire Acondicionado",
                select {
                    class: "ac-input",
                    value: "{value}",
                    onchange: move |e| selected.set(e.value().parse().ok()),
                    option { value: "", "Seleccione un aire" }
                    for a in aires.iter() {
                        option { key: "{a.id}", value: "{a.id}", "{a.label()}" }
                    }
                }
            }
        }

        if selected().is_none() {
            div { class: "ac-card", style: "color:#94a3b8; text-align:center; padding:32px;",
                "Seleccione un aire acondicionado para ver sus estadísticas."
            }
        } else {
            if let Some(s) = stats() {
                div { style: "display:flex; gap:14px; flex-wrap:wrap; margin-bottom:18px;",
                    StatCard { title: "Temp. promedio (°C)", value: fmt_opt(s.temperatura_promedio, 1), accent: "#f97316" }
                    StatCard { title: "Temp. máx / mín", value: format!("{} / {}", fmt_opt(s.temperatura_maxima, 1), fmt_opt(s.temperatura_minima, 1)), accent: "#ef4444" }
                    StatCard { title: "Variación temp.", value: fmt_opt(s.variacion_temperatura, 2), accent: "#eab308" }
                    StatCard { title: "Humedad promedio (%)", value: fmt_opt(s.humedad_promedio, 1), accent: "#22d3ee" }
                    StatCard { title: "Hum. máx / mín", value: format!("{} / {}", fmt_opt(s.humedad_maxima, 1), fmt_opt(s.humedad_minima, 1)), accent: "#0ea5e9" }
                    StatCard { title: "Variación hum.", value: fmt_opt(s.variacion_humedad, 2), accent: "#8b5cf6" }
                }
            }
            div { class: "ac-grid-2",
                LineChart { title: "Temperatura", data: temp, loading: loading() }
                LineChart { title: "Humedad", data: hum, loading: loading() }
            }
        }
    }
}

#[component]
fn UbicacionTab(aires: Vec<Aire>, por_ubicacion: Vec<EstadisticasUbicacion>) -> Element {
    let mut selected = use_signal(String::new);
    let opciones = locations(&aires);
    let sel = selected();
    let filas: Vec<EstadisticasUbicacion> = por_ubicacion
        .into_iter()
        .filter(|s| sel.is_empty() || s.ubicacion == sel)
        .collect();

    rsx! {
        div { class: "ac-card", style: "margin-bottom:16px;",
            Field { label: "Ubicación",
                select {
                    class: "ac-input",
                    value: "{sel}",
                    onchange: move |e| selected.set(e.value()),
                    option { value: "", "Todas las ubicaciones" }
                    for u in opciones.iter() {
                        option { key: "{u}", value: "{u}", "{u}" }
                    }
                }
            }
        }
        if filas.is_empty() {
            div { class: "ac-card", style: "color:#94a3b8;", "No hay datos para la ubicación seleccionada." }
        } else {
            div { class: "ac-card", style: "padding:0; overflow:auto;",
                table { class: "ac-table",
                    thead {
                        tr {
                            th { "Ubicación" }
                            th { "Aires" }
                            th { "Temp. promedio (°C)" }
                            th { "Humedad promedio (%)" }
                        }
                    }
                    tbody {
                        for s in filas {
                            tr { key: "{s.ubicacion}",
                                td { "{s.ubicacion}" }
                                td { {s.aires.map(|n| n.to_string()).unwrap_or_else(|| "N/A".into())} }
                                td { "{fmt_opt(s.temperatura_promedio, 1)}" }
                                td { "{fmt_opt(s.humedad_promedio, 1)}" }
                            }
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
    fn location_stats_fall_back_to_local_grouping() {
        let aires = vec![Aire {
            id: 1,
            nombre: "AC-1".into(),
            ubicacion: "Sala A".into(),
            fecha_instalacion: "2022-01-01".into(),
        }];
        let lecturas = vec![Lectura {
            id: 1,
            aire_id: 1,
            fecha: "2024-01-01 10:00:00".into(),
            temperatura: 21.0,
            humedad: 40.0,
            aire_nombre: None,
            ubicacion: None,
        }];

        let local = resolve_location_stats(None, &lecturas, &aires);
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].temperatura_promedio, Some(21.0));
        assert_eq!(resolve_location_stats(Some(vec![]), &lecturas, &aires), local);

        let server = vec![EstadisticasUbicacion {
            ubicacion: "Remota".into(),
            aires: Some(3),
            temperatura_promedio: Some(23.0),
            humedad_promedio: None,
        }];
        assert_eq!(resolve_location_stats(Some(server.clone()), &lecturas, &aires), server);
    }
}
