use aircontrol_shared::dates::format_date_time;
use aircontrol_shared::{ResumenDashboard, fmt_opt};
use dioxus::prelude::*;

use super::http;
use super::widgets::{AlertBanner, AlertKind, Spinner, StatCard};

#[component]
pub fn Dashboard() -> Element {
    let mut resumen = use_signal(ResumenDashboard::default);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);

    use_effect(move || {
        spawn(async move {
            loading.set(true);
            match http::get_record::<ResumenDashboard>("/api/dashboard/resumen").await {
                Ok(r) => resumen.set(r),
                Err(e) => error.set(Some(e.user_message("Error al cargar los datos del resumen."))),
            }
            loading.set(false);
        });
    });

    let r = resumen.read().clone();

    rsx! {
        div { class: "ac-page",
            h2 { class: "ac-title", "Dashboard" }
            AlertBanner { kind: AlertKind::Error, message: error }

            if loading() {
                Spinner { label: "Cargando resumen..." }
            } else {
                div { style: "display:flex; gap:14px; flex-wrap:wrap; margin-bottom:20px;",
                    StatCard { title: "Aires", value: "{r.total_aires}", accent: "#2563eb" }
                    StatCard { title: "Lecturas", value: "{r.total_lecturas}", accent: "#16a34a" }
                    StatCard { title: "Mantenimientos", value: "{r.total_mantenimientos}", accent: "#0891b2" }
                    StatCard { title: "Alertas activas", value: "{r.alertas}", accent: "#dc2626" }
                }

                div { class: "ac-card",
                    h3 { style: "margin:0 0 12px 0; font-size:16px;", "Últimas Lecturas" }
                    if r.ultimas_lecturas.is_empty() {
                        p { style: "color:#94a3b8; margin:0;", "No hay lecturas recientes para mostrar." }
                    } else {
                        table { class: "ac-table",
                            thead {
                                tr {
                                    th { "Aire" }
                                    th { "Ubicación" }
                                    th { "Temperatura" }
                                    th { "Humedad" }
                                    th { "Fecha" }
                                }
                            }
                            tbody {
                                for l in r.ultimas_lecturas.iter() {
                                    tr { key: "{l.id}-{l.fecha}",
                                        td { "{l.nombre}" }
                                        td { "{l.ubicacion}" }
                                        td { "{fmt_opt(l.temperatura, 1)} °C" }
                                        td { "{fmt_opt(l.humedad, 1)} %" }
                                        td { "{format_date_time(Some(&l.fecha))}" }
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
