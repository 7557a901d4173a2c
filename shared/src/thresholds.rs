use crate::models::Umbral;

pub const FALLBACK_TEMP_MIN: f64 = 18.0;
pub const FALLBACK_TEMP_MAX: f64 = 25.0;
pub const FALLBACK_HUM_MIN: f64 = 30.0;
pub const FALLBACK_HUM_MAX: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nivel {
    Bajo,
    Normal,
    Alto,
}

impl Nivel {
    fn classify(value: f64, min: f64, max: f64) -> Nivel {
        if value < min {
            Nivel::Bajo
        } else if value > max {
            Nivel::Alto
        } else {
            Nivel::Normal
        }
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Nivel::Bajo => "Frío",
            Nivel::Normal => "Normal",
            Nivel::Alto => "Caliente",
        }
    }

    pub fn humidity_label(&self) -> &'static str {
        match self {
            Nivel::Bajo => "Seco",
            Nivel::Normal => "Normal",
            Nivel::Alto => "Húmedo",
        }
    }
}

/// Active threshold for one aire: a specific one wins over the global one.
pub fn applicable_threshold(umbrales: &[Umbral], aire_id: i64) -> Option<&Umbral> {
    let active = || umbrales.iter().filter(|u| u.notificar_activo);
    active()
        .find(|u| !u.es_global && u.aire_id == Some(aire_id))
        .or_else(|| active().find(|u| u.es_global))
}

pub fn temperature_level(value: f64, umbral: Option<&Umbral>) -> Nivel {
    match umbral {
        Some(u) => Nivel::classify(value, u.temp_min, u.temp_max),
        None => Nivel::classify(value, FALLBACK_TEMP_MIN, FALLBACK_TEMP_MAX),
    }
}

pub fn humidity_level(value: f64, umbral: Option<&Umbral>) -> Nivel {
    match umbral {
        Some(u) => Nivel::classify(value, u.hum_min, u.hum_max),
        None => Nivel::classify(value, FALLBACK_HUM_MIN, FALLBACK_HUM_MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn umbral(id: i64, global: bool, aire: Option<i64>, active: bool, t: (f64, f64)) -> Umbral {
        Umbral {
            id,
            nombre: format!("u{id}"),
            es_global: global,
            aire_id: aire,
            aire_nombre: None,
            ubicacion: None,
            temp_min: t.0,
            temp_max: t.1,
            hum_min: 40.0,
            hum_max: 60.0,
            notificar_activo: active,
        }
    }

    #[test]
    fn specific_beats_global_and_inactive_is_ignored() {
        let list = vec![
            umbral(1, true, None, true, (16.0, 24.0)),
            umbral(2, false, Some(7), true, (20.0, 22.0)),
            umbral(3, false, Some(8), false, (0.0, 1.0)),
        ];
        assert_eq!(applicable_threshold(&list, 7).map(|u| u.id), Some(2));
        assert_eq!(applicable_threshold(&list, 8).map(|u| u.id), Some(1));
        assert!(applicable_threshold(&list[2..], 8).is_none());
    }

    #[test]
    fn levels_with_and_without_threshold() {
        let u = umbral(1, true, None, true, (20.0, 22.0));
        assert_eq!(temperature_level(23.0, Some(&u)), Nivel::Alto);
        assert_eq!(temperature_level(21.0, Some(&u)), Nivel::Normal);
        assert_eq!(humidity_level(35.0, Some(&u)), Nivel::Bajo);

        assert_eq!(temperature_level(25.5, None), Nivel::Alto);
        assert_eq!(temperature_level(25.0, None), Nivel::Normal);
        assert_eq!(temperature_level(17.9, None), Nivel::Bajo);
        assert_eq!(humidity_level(71.0, None), Nivel::Alto);
        assert_eq!(humidity_level(29.0, None).humidity_label(), "Seco");
    }
}
