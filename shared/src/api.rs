//! Response envelopes and the single decoder every page goes through.
//!
//! The backend answers in three shapes: a bare JSON value, an envelope
//! `{success, mensaje, id, data}`, or an error body that only carries
//! `mensaje`. [`decode_response`] folds all of them into `Result<T, ApiError>`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FALLBACK_CONNECTION: &str = "Error de conexión con el servidor";
pub const FALLBACK_UNAUTHORIZED: &str = "No autorizado. Por favor, inicia sesión de nuevo.";
pub const FALLBACK_FORBIDDEN: &str = "No tienes permisos para realizar esta acción.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("server error {status}: {mensaje:?}")]
    Server { status: u16, mensaje: Option<String> },
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text shown in the dismissible alert. The backend's `mensaje` wins;
    /// `fallback` is used when the server said nothing useful.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized => FALLBACK_UNAUTHORIZED.to_string(),
            ApiError::Forbidden(m) if !m.is_empty() => m.clone(),
            ApiError::Forbidden(_) => FALLBACK_FORBIDDEN.to_string(),
            ApiError::Server {
                mensaje: Some(m), ..
            } if !m.is_empty() => m.clone(),
            ApiError::Rejected(m) if !m.is_empty() => m.clone(),
            ApiError::Network(_) => FALLBACK_CONNECTION.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Backend uniqueness violations on serial / inventory code.
    pub fn is_duplicate(&self) -> bool {
        let m = match self {
            ApiError::Rejected(m) => m.as_str(),
            ApiError::Server {
                mensaje: Some(m), ..
            } => m.as_str(),
            _ => return false,
        };
        let m = m.to_lowercase();
        m.contains("duplicate") || m.contains("único") || m.contains("unico")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: Option<bool>,
    pub mensaje: Option<String>,
    pub id: Option<i64>,
    pub data: Option<T>,
}

impl<T> Default for ApiEnvelope<T> {
    fn default() -> Self {
        ApiEnvelope {
            success: None,
            mensaje: None,
            id: None,
            data: None,
        }
    }
}

/// Acknowledgement of a write: whatever `data` the server sent is kept raw.
pub type ApiMessage = ApiEnvelope<serde_json::Value>;

impl ApiMessage {
    /// `data.id`, falling back to the top-level `id`.
    pub fn created_id(&self) -> Option<i64> {
        self.data
            .as_ref()
            .and_then(|d| d.get("id"))
            .and_then(|v| v.as_i64())
            .or(self.id)
    }

    /// Re-decode `data` as a concrete record.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        let v = self.data.clone()?;
        if v.is_null() {
            return None;
        }
        serde_json::from_value(v).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(v) | ListPayload::Wrapped { data: v } => v,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    mensaje: Option<String>,
    error: Option<String>,
    msg: Option<String>,
}

fn error_mensaje(body: &str) -> Option<String> {
    let b: ErrorBody = serde_json::from_str(body).ok()?;
    b.mensaje.or(b.error).or(b.msg)
}

/// Status classification shared by every decoder.
fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    match status {
        401 => Err(ApiError::Unauthorized),
        403 => Err(ApiError::Forbidden(error_mensaje(body).unwrap_or_default())),
        200..=299 => Ok(()),
        _ => Err(ApiError::Server {
            status,
            mensaje: error_mensaje(body),
        }),
    }
}

/// `{"success": false, "mensaje": ...}` on a 2xx is still a failure.
fn check_rejected(body: &str) -> Result<(), ApiError> {
    match serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body) {
        Ok(env) if env.success == Some(false) => {
            Err(ApiError::Rejected(env.mensaje.unwrap_or_default()))
        }
        _ => Ok(()),
    }
}

pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    check_status(status, body)?;
    check_rejected(body)?;
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode a list endpoint that may answer with a bare array or `{data: [...]}`.
pub fn decode_list<T: DeserializeOwned>(status: u16, body: &str) -> Result<Vec<T>, ApiError> {
    decode_response::<ListPayload<T>>(status, body).map(ListPayload::into_vec)
}

/// Decode a record that may come bare or wrapped in `{success, data}`.
pub fn decode_record<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    check_status(status, body)?;
    check_rejected(body)?;
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let inner = match value.get("data") {
        Some(d) if d.is_object() => d.clone(),
        _ => value,
    };
    serde_json::from_value(inner).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Writes often answer with an empty body or a bare message.
pub fn decode_ack(status: u16, body: &str) -> Result<ApiMessage, ApiError> {
    check_status(status, body)?;
    if body.trim().is_empty() {
        return Ok(ApiMessage::default());
    }
    check_rejected(body)?;
    Ok(serde_json::from_str(body).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Aire, Lectura, Umbral};

    #[test]
    fn list_accepts_bare_and_wrapped() {
        let bare = r#"[{"id":1,"nombre":"AC-1","ubicacion":"Sala","fecha_instalacion":"2023-05-15"}]"#;
        let aires: Vec<Aire> = decode_list(200, bare).unwrap();
        assert_eq!(aires.len(), 1);

        let wrapped = r#"{"success":true,"data":[{"id":5,"aire_id":1,"fecha":"2024-01-01 10:00:00","temperatura":22.0,"humedad":50.0}]}"#;
        let lecturas: Vec<Lectura> = decode_list(200, wrapped).unwrap();
        assert_eq!(lecturas[0].id, 5);
    }

    #[test]
    fn non_array_list_is_a_decode_error() {
        let err = decode_list::<Aire>(200, r#"{"foo":1}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            decode_list::<Umbral>(401, r#"{"msg":"Token has expired"}"#).unwrap_err(),
            ApiError::Unauthorized
        );
        let forbidden = decode_ack(403, r#"{"success":false,"mensaje":"Solo administradores"}"#)
            .unwrap_err();
        assert_eq!(forbidden, ApiError::Forbidden("Solo administradores".into()));
        let server = decode_ack(500, "<html>boom</html>").unwrap_err();
        assert_eq!(
            server,
            ApiError::Server {
                status: 500,
                mensaje: None
            }
        );
        assert_eq!(server.user_message("Error al eliminar"), "Error al eliminar");
    }

    #[test]
    fn success_false_is_rejected() {
        let err = decode_ack(200, r#"{"success":false,"mensaje":"Serial duplicate key"}"#)
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(err.user_message("x"), "Serial duplicate key");
    }

    #[test]
    fn ack_exposes_created_record() {
        let ack = decode_ack(
            201,
            r#"{"success":true,"mensaje":"Creado","data":{"id":42,"nombre":"UPS","tipo":"UPS","estado_operativo":true}}"#,
        )
        .unwrap();
        assert_eq!(ack.created_id(), Some(42));
        let eq: crate::models::OtroEquipo = ack.data_as().unwrap();
        assert_eq!(eq.nombre, "UPS");
        assert_eq!(decode_ack(204, "").unwrap(), ApiMessage::default());
    }

    #[test]
    fn record_unwraps_data_object() {
        let wrapped = r#"{"success":true,"data":{"id":3,"nombre":"AC","ubicacion":"B","fecha_instalacion":"2020-01-01"}}"#;
        let a: Aire = decode_record(200, wrapped).unwrap();
        assert_eq!(a.id, 3);
        let bare = r#"{"id":4,"nombre":"AC","ubicacion":"B","fecha_instalacion":"2020-01-01"}"#;
        let a: Aire = decode_record(200, bare).unwrap();
        assert_eq!(a.id, 4);
    }

    #[test]
    fn network_and_unauthorized_messages() {
        assert_eq!(
            ApiError::Network("timeout".into()).user_message("x"),
            FALLBACK_CONNECTION
        );
        assert_eq!(ApiError::Unauthorized.user_message("x"), FALLBACK_UNAUTHORIZED);
    }
}
