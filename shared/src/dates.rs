use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const INVALID_DATE: &str = "Fecha inválida";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse any date the API emits. Offsets are dropped; the backend stores
/// local wall-clock times.
pub fn parse_api_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `dd/mm/yyyy`, or "Fecha inválida".
pub fn format_date_display(raw: &str) -> String {
    match parse_api_date(raw) {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Value for an `<input type="date">`; empty when unparseable.
pub fn format_date_input(raw: &str) -> String {
    parse_api_date(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn format_date_time(raw: Option<&str>) -> String {
    raw.and_then(parse_api_date)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_time(raw: &str) -> String {
    parse_api_date(raw)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_backend_shape() {
        for s in [
            "2023-05-15",
            "2023-05-15 14:30:00",
            "2023-05-15T14:30:00",
            "2023-05-15T14:30:00.123",
            "2023-05-15T14:30:00Z",
            "Mon, 15 May 2023 14:30:00 GMT",
        ] {
            assert_eq!(format_date_display(s), "15/05/2023", "input {s}");
        }
    }

    #[test]
    fn invalid_dates() {
        assert_eq!(format_date_display("ayer"), INVALID_DATE);
        assert_eq!(format_date_display(""), INVALID_DATE);
        assert_eq!(format_date_input("nope"), "");
        assert_eq!(format_date_time(None), "N/A");
    }

    #[test]
    fn input_and_time_formats() {
        assert_eq!(format_date_input("Mon, 15 May 2023 00:00:00 GMT"), "2023-05-15");
        assert_eq!(format_time("2024-02-10 08:05:59"), "08:05");
        assert_eq!(
            format_date_time(Some("2024-02-10 08:05:59")),
            "10/02/2024 08:05"
        );
    }
}
