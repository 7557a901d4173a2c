use std::collections::{BTreeMap, BTreeSet};

use crate::dates::{format_time, parse_api_date};
use crate::models::{Aire, EstadisticasUbicacion, Lectura};

pub const LAST_READINGS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.iter().all(|s| s.values.is_empty())
    }
}

/// Oldest-first, last `n`, optionally restricted to one aire. Readings with
/// unparseable dates sort first.
pub fn last_readings(lecturas: &[Lectura], n: usize, aire_id: Option<i64>) -> Vec<Lectura> {
    let mut picked: Vec<Lectura> = lecturas
        .iter()
        .filter(|l| aire_id.is_none_or(|id| l.aire_id == id))
        .cloned()
        .collect();
    picked.sort_by_key(|l| parse_api_date(&l.fecha));
    let skip = picked.len().saturating_sub(n);
    picked.split_off(skip)
}

pub fn reading_series(lecturas: &[Lectura]) -> (ChartData, ChartData) {
    let labels: Vec<String> = lecturas.iter().map(|l| format_time(&l.fecha)).collect();
    let temp = ChartData {
        labels: labels.clone(),
        series: vec![ChartSeries {
            name: "Temperatura (°C)".into(),
            values: lecturas.iter().map(|l| l.temperatura).collect(),
        }],
    };
    let hum = ChartData {
        labels,
        series: vec![ChartSeries {
            name: "Humedad (%)".into(),
            values: lecturas.iter().map(|l| l.humedad).collect(),
        }],
    };
    (temp, hum)
}

#[derive(Default)]
struct Acc {
    aires: BTreeSet<i64>,
    temp: f64,
    hum: f64,
    count: usize,
}

/// Per-location averages computed client-side, used when the server has no
/// location statistics.
pub fn group_by_location(lecturas: &[Lectura], aires: &[Aire]) -> Vec<EstadisticasUbicacion> {
    let mut by_loc: BTreeMap<String, Acc> = BTreeMap::new();
    let mut loc_of: BTreeMap<i64, &str> = BTreeMap::new();
    for a in aires {
        let loc = a.ubicacion.trim();
        if loc.is_empty() {
            continue;
        }
        loc_of.insert(a.id, loc);
        by_loc.entry(loc.to_string()).or_default().aires.insert(a.id);
    }
    for l in lecturas {
        let Some(loc) = loc_of.get(&l.aire_id) else {
            continue;
        };
        let acc = by_loc.entry((*loc).to_string()).or_default();
        acc.temp += l.temperatura;
        acc.hum += l.humedad;
        acc.count += 1;
    }
    by_loc
        .into_iter()
        .map(|(ubicacion, acc)| {
            let avg = |sum: f64| (acc.count > 0).then(|| sum / acc.count as f64);
            EstadisticasUbicacion {
                ubicacion,
                aires: Some(acc.aires.len() as i64),
                temperatura_promedio: avg(acc.temp),
                humedad_promedio: avg(acc.hum),
            }
        })
        .collect()
}

/// Bar-chart data (temperature, humidity); locations without an average are skipped.
pub fn location_series(stats: &[EstadisticasUbicacion]) -> (ChartData, ChartData) {
    let pick = |name: &str, f: fn(&EstadisticasUbicacion) -> Option<f64>| {
        let (labels, values): (Vec<String>, Vec<f64>) = stats
            .iter()
            .filter_map(|s| f(s).map(|v| (s.ubicacion.clone(), v)))
            .unzip();
        ChartData {
            labels,
            series: vec![ChartSeries {
                name: name.to_string(),
                values,
            }],
        }
    };
    (
        pick("Temperatura promedio (°C)", |s| s.temperatura_promedio),
        pick("Humedad promedio (%)", |s| s.humedad_promedio),
    )
}

pub fn locations(aires: &[Aire]) -> Vec<String> {
    aires
        .iter()
        .map(|a| a.ubicacion.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aire(id: i64, ubicacion: &str) -> Aire {
        Aire {
            id,
            nombre: format!("AC-{id}"),
            ubicacion: ubicacion.into(),
            fecha_instalacion: "2022-01-01".into(),
        }
    }

    fn lectura(id: i64, aire_id: i64, fecha: &str, t: f64, h: f64) -> Lectura {
        Lectura {
            id,
            aire_id,
            fecha: fecha.into(),
            temperatura: t,
            humedad: h,
            aire_nombre: None,
            ubicacion: None,
        }
    }

    #[test]
    fn last_readings_sorts_and_truncates() {
        let ls = vec![
            lectura(1, 1, "2024-01-01 12:00:00", 20.0, 50.0),
            lectura(2, 1, "2024-01-01 10:00:00", 21.0, 51.0),
            lectura(3, 2, "2024-01-01 11:00:00", 22.0, 52.0),
            lectura(4, 1, "2024-01-01 13:00:00", 23.0, 53.0),
        ];
        let ids: Vec<i64> = last_readings(&ls, 2, None).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 4]);
        let ids: Vec<i64> = last_readings(&ls, 10, Some(1)).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 1, 4]);

        let (temp, hum) = reading_series(&last_readings(&ls, 2, None));
        assert_eq!(temp.labels, vec!["12:00", "13:00"]);
        assert_eq!(hum.series[0].values, vec![50.0, 53.0]);
    }

    #[test]
    fn grouping_keeps_locations_without_readings() {
        let aires = vec![aire(1, "Sala B"), aire(2, "Sala A"), aire(3, "Sala A")];
        let ls = vec![
            lectura(1, 2, "2024-01-01", 20.0, 40.0),
            lectura(2, 3, "2024-01-01", 24.0, 60.0),
            lectura(3, 99, "2024-01-01", 90.0, 90.0),
        ];
        let g = group_by_location(&ls, &aires);
        assert_eq!(g.len(), 2);
        assert_eq!(g[0].ubicacion, "Sala A");
        assert_eq!(g[0].aires, Some(2));
        assert_eq!(g[0].temperatura_promedio, Some(22.0));
        assert_eq!(g[1].humedad_promedio, None);

        let (temp, _) = location_series(&g);
        assert_eq!(temp.labels, vec!["Sala A"]);
        assert!(!temp.is_empty());
    }

    #[test]
    fn unique_locations() {
        let aires = vec![aire(1, "Z"), aire(2, "A"), aire(3, "Z"), aire(4, "  ")];
        assert_eq!(locations(&aires), vec!["A", "Z"]);
    }

    #[test]
    fn grouping_uses_the_same_names_as_the_location_picker() {
        let aires = vec![aire(1, "Sala A "), aire(2, "  ")];
        let lecturas = vec![
            lectura(1, 1, "2024-01-01 10:00:00", 22.0, 50.0),
            lectura(2, 2, "2024-01-01 10:00:00", 30.0, 60.0),
        ];

        let options = locations(&aires);
        let grouped = group_by_location(&lecturas, &aires);
        assert_eq!(options, vec!["Sala A".to_string()]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].ubicacion, options[0]);
        assert_eq!(grouped[0].temperatura_promedio, Some(22.0));
    }
}
