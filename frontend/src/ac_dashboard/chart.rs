// frontend/src/ac_dashboard/chart.rs
//
// SVG line and bar charts over index-spaced labels (no time axis).

use aircontrol_shared::stats::ChartData;
use dioxus::prelude::*;

const VIEW_W: f64 = 900.0;
const PAD_L: f64 = 60.0;
const PAD_R: f64 = 20.0;
const PAD_T: f64 = 20.0;
const PAD_B: f64 = 36.0;

pub fn series_color(i: usize) -> &'static str {
    match i {
        0 => "#f97316",
        1 => "#22d3ee",
        2 => "#a3e635",
        3 => "#f43f5e",
        4 => "#8b5cf6",
        _ => "#9ca3af",
    }
}

/// Min and max across every finite value; a flat range is widened by one.
pub fn value_range(data: &ChartData) -> Option<(f64, f64)> {
    let (mn, mx) = data
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), v| {
            (mn.min(v), mx.max(v))
        });
    if !mn.is_finite() {
        return None;
    }
    if (mx - mn).abs() < 1e-9 {
        return Some((mn - 0.5, mx + 0.5));
    }
    Some((mn, mx))
}

fn map_y(v: f64, min: f64, max: f64, height: f64) -> f64 {
    let inner_h = height - PAD_T - PAD_B;
    PAD_T + (1.0 - (v - min) / (max - min)) * inner_h
}

/// `"x,y x,y ..."` for one series, points spread evenly over `n` slots.
pub fn build_polyline(values: &[f64], n: usize, min: f64, max: f64, height: f64) -> String {
    let inner_w = VIEW_W - PAD_L - PAD_R;
    let step = if n > 1 { inner_w / (n - 1) as f64 } else { 0.0 };
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| {
            let x = PAD_L + step * i as f64;
            let y = map_y(*v, min, max, height);
            format!("{x:.2},{y:.2}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label indices to print under the x axis, at most `max` of them.
fn label_ticks(n: usize, max: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let every = n.div_ceil(max.max(1)).max(1);
    (0..n).filter(|i| i % every == 0).collect()
}

#[component]
fn ChartFrame(title: String, children: Element) -> Element {
    rsx! {
        div { style: "width:100%; background:#020617; border-radius:14px; border:1px solid #334155; padding:12px; display:flex; flex-direction:column; gap:8px;",
            div { style:"color:#94a3b8; font-size:12px;", "{title}" }
            {children}
        }
    }
}

#[component]
fn Placeholder(title: String, text: String) -> Element {
    rsx! {
        ChartFrame { title,
            div { style:"color:#64748b; font-size:13px; padding:40px 0; text-align:center;", "{text}" }
        }
    }
}

#[component]
fn Gridlines(height: f64) -> Element {
    let inner_h = height - PAD_T - PAD_B;
    let step = inner_h / 4.0;
    rsx! {
        for i in 1..4 {
            line {
                x1:"{PAD_L}", y1:"{PAD_T + step * (i as f64)}",
                x2:"{VIEW_W - PAD_R}", y2:"{PAD_T + step * (i as f64)}",
                stroke:"#1f2937", stroke_width:"1"
            }
        }
        line { x1:"{PAD_L}", y1:"{PAD_T}", x2:"{PAD_L}", y2:"{height - PAD_B}", stroke:"#334155", stroke_width:"1" }
        line { x1:"{PAD_L}", y1:"{height - PAD_B}", x2:"{VIEW_W - PAD_R}", y2:"{height - PAD_B}", stroke:"#334155", stroke_width:"1" }
    }
}

#[component]
fn YLabels(min: f64, max: f64, height: f64) -> Element {
    let mid = (min + max) * 0.5;
    rsx! {
        text { x:"8", y:"{PAD_T + 4.0}", fill:"#94a3b8", "font-size":"11", {format!("{max:.1}")} }
        text { x:"8", y:"{map_y(mid, min, max, height) + 4.0}", fill:"#94a3b8", "font-size":"11", {format!("{mid:.1}")} }
        text { x:"8", y:"{height - PAD_B + 4.0}", fill:"#94a3b8", "font-size":"11", {format!("{min:.1}")} }
    }
}

#[component]
fn Legend(names: Vec<String>) -> Element {
    rsx! {
        div { style: "display:flex; flex-wrap:wrap; gap:10px; padding:6px 10px; border:1px solid #1f2937; border-radius:10px;",
            for (i, name) in names.iter().enumerate() {
                div { style: "display:flex; align-items:center; gap:6px; font-size:12px; color:#cbd5f5;",
                    svg { width:"26", height:"8", view_box:"0 0 26 8",
                        line { x1:"1", y1:"4", x2:"25", y2:"4", stroke:"{series_color(i)}", stroke_width:"3", stroke_linecap:"round" }
                    }
                    "{name}"
                }
            }
        }
    }
}

#[component]
pub fn LineChart(
    title: String,
    data: ChartData,
    #[props(default = 260.0)] height: f64,
    #[props(default)] loading: bool,
) -> Element {
    if loading {
        return rsx! { Placeholder { title, text: "Cargando datos..." } };
    }
    let Some((min, max)) = value_range(&data).filter(|_| data.labels.len() >= 2) else {
        return rsx! { Placeholder { title, text: "No hay datos suficientes para mostrar." } };
    };

    let n = data.labels.len();
    let inner_w = VIEW_W - PAD_L - PAD_R;
    let step = if n > 1 { inner_w / (n - 1) as f64 } else { 0.0 };
    let ticks: Vec<(f64, String)> = label_ticks(n, 8)
        .into_iter()
        .map(|i| (PAD_L + step * i as f64, data.labels[i].clone()))
        .collect();
    let paths: Vec<String> = data
        .series
        .iter()
        .map(|s| build_polyline(&s.values, n, min, max, height))
        .collect();
    let names: Vec<String> = data.series.iter().map(|s| s.name.clone()).collect();

    rsx! {
        ChartFrame { title,
            svg {
                style: "width:100%; height:auto; display:block;",
                view_box: "0 0 {VIEW_W} {height}",
                Gridlines { height }
                YLabels { min, max, height }
                for (x, label) in ticks {
                    text {
                        x:"{x}", y:"{height - 12.0}",
                        fill:"#94a3b8", "font-size":"11", "text-anchor":"middle",
                        "{label}"
                    }
                }
                for (i, pts) in paths.iter().enumerate() {
                    polyline {
                        points: "{pts}",
                        fill: "none",
                        stroke: "{series_color(i)}",
                        stroke_width: "2",
                        stroke_linejoin: "round",
                        stroke_linecap: "round",
                    }
                }
            }
            Legend { names }
        }
    }
}

/// One bar per label, first series only; the bottom of the scale is zero
/// unless values go negative.
#[component]
pub fn BarChart(
    title: String,
    data: ChartData,
    #[props(default = 260.0)] height: f64,
    #[props(default)] loading: bool,
) -> Element {
    if loading {
        return rsx! { Placeholder { title, text: "Cargando datos..." } };
    }
    let values = data.series.first().map(|s| s.values.clone()).unwrap_or_default();
    let Some((lo, hi)) = value_range(&data).filter(|_| !values.is_empty()) else {
        return rsx! { Placeholder { title, text: "No hay datos para mostrar." } };
    };
    let min = lo.min(0.0);
    let max = hi;

    let n = values.len();
    let inner_w = VIEW_W - PAD_L - PAD_R;
    let slot = inner_w / n as f64;
    let bar_w = (slot * 0.6).min(80.0);
    let base_y = map_y(min.max(0.0).min(max), min, max, height);
    let color = series_color(0);
    let bars: Vec<(f64, f64, f64, String, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let cx = PAD_L + slot * (i as f64 + 0.5);
            let top = map_y(*v, min, max, height);
            let label = data.labels.get(i).cloned().unwrap_or_default();
            (cx, top.min(base_y), (base_y - top).abs(), label, *v)
        })
        .collect();
    let names: Vec<String> = data.series.iter().take(1).map(|s| s.name.clone()).collect();

    rsx! {
        ChartFrame { title,
            svg {
                style: "width:100%; height:auto; display:block;",
                view_box: "0 0 {VIEW_W} {height}",
                Gridlines { height }
                YLabels { min, max, height }
                for (cx, y, h, label, v) in bars {
                    rect {
                        x: "{cx - bar_w / 2.0}", y: "{y}", width: "{bar_w}", height: "{h.max(1.0)}",
                        fill: "{color}", "rx": "3",
                    }
                    text { x:"{cx}", y:"{y - 4.0}", fill:"#e5e7eb", "font-size":"11", "text-anchor":"middle", {format!("{v:.1}")} }
                    text { x:"{cx}", y:"{height - 12.0}", fill:"#94a3b8", "font-size":"11", "text-anchor":"middle", "{label}" }
                }
            }
            Legend { names }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircontrol_shared::stats::ChartSeries;

    fn data(values: Vec<f64>) -> ChartData {
        ChartData {
            labels: (0..values.len()).map(|i| format!("{i}")).collect(),
            series: vec![ChartSeries {
                name: "t".into(),
                values,
            }],
        }
    }

    #[test]
    fn range_widens_flat_series() {
        assert_eq!(value_range(&data(vec![20.0, 20.0])), Some((19.5, 20.5)));
        assert_eq!(value_range(&data(vec![18.0, 26.0, 22.0])), Some((18.0, 26.0)));
        assert_eq!(value_range(&data(vec![])), None);
    }

    #[test]
    fn polyline_spans_plot_width() {
        let p = build_polyline(&[0.0, 10.0], 2, 0.0, 10.0, 260.0);
        let pts: Vec<&str> = p.split(' ').collect();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0], format!("{PAD_L:.2},{:.2}", 260.0 - PAD_B));
        assert_eq!(pts[1], format!("{:.2},{PAD_T:.2}", VIEW_W - PAD_R));
    }

    #[test]
    fn ticks_are_capped() {
        assert_eq!(label_ticks(20, 8), vec![0, 3, 6, 9, 12, 15, 18]);
        assert_eq!(label_ticks(3, 8), vec![0, 1, 2]);
        assert!(label_ticks(0, 8).is_empty());
    }
}
