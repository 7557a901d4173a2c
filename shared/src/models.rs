use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rol {
    Admin,
    Supervisor,
    Operador,
    Desconocido,
}

impl Rol {
    pub const ASSIGNABLE: [Rol; 3] = [Rol::Admin, Rol::Supervisor, Rol::Operador];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Admin => "admin",
            Rol::Supervisor => "supervisor",
            Rol::Operador => "operador",
            Rol::Desconocido => "desconocido",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rol::Admin => "Administrador",
            Rol::Supervisor => "Supervisor",
            Rol::Operador => "Operador",
            Rol::Desconocido => "Desconocido",
        }
    }

    /// Create, edit and delete aires, mantenimientos, umbrales and otros equipos.
    pub fn can_manage(&self) -> bool {
        matches!(self, Rol::Admin | Rol::Supervisor)
    }

    pub fn can_delete_lecturas(&self) -> bool {
        !matches!(self, Rol::Operador | Rol::Desconocido)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Rol::Admin)
    }

    pub fn parse(s: &str) -> Option<Rol> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Rol::Admin),
            "supervisor" => Some(Rol::Supervisor),
            "operador" => Some(Rol::Operador),
            _ => None,
        }
    }
}

impl From<String> for Rol {
    fn from(s: String) -> Self {
        Rol::parse(&s).unwrap_or(Rol::Desconocido)
    }
}

impl From<Rol> for String {
    fn from(r: Rol) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for Rol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------- auth ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub apellido: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    pub rol: Rol,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.nombre, self.apellido);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub access_token: Option<String>,
    pub user: Option<SessionUser>,
    pub mensaje: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

// ---------- health ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub database: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbStatus {
    Checking,
    Connected,
    Disconnected,
    Error,
}

impl DbStatus {
    pub fn from_health(h: &HealthStatus) -> DbStatus {
        match h.database.trim().to_ascii_lowercase().as_str() {
            "connected" | "ok" | "up" => DbStatus::Connected,
            _ => DbStatus::Disconnected,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DbStatus::Checking => "Verificando DB...",
            DbStatus::Connected => "DB Conectada",
            DbStatus::Disconnected => "DB Desconectada",
            DbStatus::Error => "Error DB",
        }
    }
}

// ---------- aires ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aire {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ubicacion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fecha_instalacion: String,
}

impl Aire {
    pub fn label(&self) -> String {
        format!("{} ({})", self.nombre, self.ubicacion)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AireDetalle {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ubicacion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fecha_instalacion: String,
    pub tipo: Option<String>,
    pub toneladas: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evaporadora_operativa: bool,
    pub evaporadora_marca: Option<String>,
    pub evaporadora_modelo: Option<String>,
    pub evaporadora_serial: Option<String>,
    pub evaporadora_codigo_inventario: Option<String>,
    pub evaporadora_ubicacion_instalacion: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub condensadora_operativa: bool,
    pub condensadora_marca: Option<String>,
    pub condensadora_modelo: Option<String>,
    pub condensadora_serial: Option<String>,
    pub condensadora_codigo_inventario: Option<String>,
    pub condensadora_ubicacion_instalacion: Option<String>,
}

/// Body of `POST /api/aires` and `PUT /api/aires/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirePayload {
    pub nombre: String,
    pub ubicacion: String,
    pub fecha_instalacion: String,
    pub tipo: Option<String>,
    pub toneladas: Option<f64>,
    pub evaporadora_operativa: bool,
    pub evaporadora_marca: Option<String>,
    pub evaporadora_modelo: Option<String>,
    pub evaporadora_serial: String,
    pub evaporadora_codigo_inventario: String,
    pub evaporadora_ubicacion_instalacion: Option<String>,
    pub condensadora_operativa: bool,
    pub condensadora_marca: Option<String>,
    pub condensadora_modelo: Option<String>,
    pub condensadora_serial: String,
    pub condensadora_codigo_inventario: String,
    pub condensadora_ubicacion_instalacion: Option<String>,
}

// ---------- lecturas ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lectura {
    pub id: i64,
    pub aire_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fecha: String,
    pub temperatura: f64,
    pub humedad: f64,
    pub aire_nombre: Option<String>,
    pub ubicacion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuevaLectura {
    pub aire_id: i64,
    pub fecha: String,
    pub hora: String,
    pub temperatura: f64,
    pub humedad: f64,
}

// ---------- mantenimientos ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mantenimiento {
    pub id: i64,
    pub aire_id: Option<i64>,
    pub otro_equipo_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fecha: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tipo_mantenimiento: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub descripcion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tecnico: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tiene_imagen: bool,
    pub equipo_nombre: Option<String>,
    pub equipo_ubicacion: Option<String>,
    pub equipo_tipo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagenResponse {
    #[serde(default)]
    pub success: bool,
    pub imagen_base64: Option<String>,
}

// ---------- umbrales ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Umbral {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub es_global: bool,
    pub aire_id: Option<i64>,
    pub aire_nombre: Option<String>,
    pub ubicacion: Option<String>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub hum_min: f64,
    pub hum_max: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notificar_activo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UmbralPayload {
    pub nombre: String,
    pub es_global: bool,
    pub aire_id: Option<i64>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub hum_min: f64,
    pub hum_max: f64,
    pub notificar_activo: bool,
}

// ---------- usuarios ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub apellido: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    pub rol: Rol,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activo: bool,
    pub fecha_registro: Option<String>,
    pub ultima_conexion: Option<String>,
}

/// Body of `POST /api/admin/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuevoUsuario {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub rol: Rol,
}

/// Body of `PUT /api/usuarios/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsuarioUpdate {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub rol: Rol,
    pub activo: bool,
}

impl From<&Usuario> for UsuarioUpdate {
    fn from(u: &Usuario) -> Self {
        UsuarioUpdate {
            nombre: u.nombre.clone(),
            apellido: u.apellido.clone(),
            email: u.email.clone(),
            rol: u.rol,
            activo: u.activo,
        }
    }
}

// ---------- otros equipos ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TipoEquipo {
    Motogenerador,
    Ups,
    Pdu,
    Otro,
}

impl TipoEquipo {
    pub const ALL: [TipoEquipo; 4] = [
        TipoEquipo::Motogenerador,
        TipoEquipo::Ups,
        TipoEquipo::Pdu,
        TipoEquipo::Otro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoEquipo::Motogenerador => "Motogenerador",
            TipoEquipo::Ups => "UPS",
            TipoEquipo::Pdu => "PDU",
            TipoEquipo::Otro => "Otro",
        }
    }

    pub fn parse(s: &str) -> Option<TipoEquipo> {
        TipoEquipo::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl From<String> for TipoEquipo {
    fn from(s: String) -> Self {
        TipoEquipo::parse(&s).unwrap_or(TipoEquipo::Otro)
    }
}

impl From<TipoEquipo> for String {
    fn from(t: TipoEquipo) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TipoEquipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtroEquipo {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    pub tipo: TipoEquipo,
    pub ubicacion: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub serial: Option<String>,
    pub codigo_inventario: Option<String>,
    pub fecha_instalacion: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estado_operativo: bool,
    pub notas: Option<String>,
    pub fecha_creacion: Option<String>,
    pub ultima_modificacion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtroEquipoPayload {
    pub nombre: String,
    pub tipo: TipoEquipo,
    pub ubicacion: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub serial: Option<String>,
    pub codigo_inventario: Option<String>,
    pub fecha_instalacion: Option<String>,
    pub estado_operativo: bool,
    pub notas: Option<String>,
}

// ---------- dashboard / estadisticas ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LecturaReciente {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ubicacion: String,
    pub temperatura: Option<f64>,
    pub humedad: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fecha: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenDashboard {
    #[serde(default)]
    pub total_aires: i64,
    #[serde(default)]
    pub total_lecturas: i64,
    #[serde(default)]
    pub total_mantenimientos: i64,
    #[serde(default)]
    pub alertas: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ultimas_lecturas: Vec<LecturaReciente>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstadisticasGenerales {
    pub temperatura_promedio: Option<f64>,
    pub temperatura_maxima: Option<f64>,
    pub temperatura_minima: Option<f64>,
    pub humedad_promedio: Option<f64>,
    pub humedad_maxima: Option<f64>,
    pub humedad_minima: Option<f64>,
    pub total_lecturas: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstadisticasAire {
    pub aire_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ubicacion: String,
    pub temperatura_promedio: Option<f64>,
    pub temperatura_maxima: Option<f64>,
    pub temperatura_minima: Option<f64>,
    pub humedad_promedio: Option<f64>,
    pub humedad_maxima: Option<f64>,
    pub humedad_minima: Option<f64>,
    pub variacion_temperatura: Option<f64>,
    pub variacion_humedad: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstadisticasUbicacion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ubicacion: String,
    pub aires: Option<i64>,
    pub temperatura_promedio: Option<f64>,
    pub humedad_promedio: Option<f64>,
}

/// `12.345` -> `"12.3"`, missing -> `"N/A"`.
pub fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.decimals$}"),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_still_deserializes() {
        let u: Usuario = serde_json::from_str(
            r#"{"id":3,"nombre":"Ana","apellido":"Ruiz","email":"a@x.io","username":"ana",
                "rol":"invitado","activo":true,"fecha_registro":null}"#,
        )
        .unwrap();
        assert_eq!(u.rol, Rol::Desconocido);
        assert!(!u.rol.can_manage());
        assert!(u.fecha_registro.is_none());
    }

    #[test]
    fn role_permissions() {
        assert!(Rol::Admin.can_manage() && Rol::Admin.is_admin());
        assert!(Rol::Supervisor.can_manage() && !Rol::Supervisor.is_admin());
        assert!(!Rol::Operador.can_manage());
        assert!(!Rol::Operador.can_delete_lecturas());
        assert!(Rol::Supervisor.can_delete_lecturas());
        assert_eq!(serde_json::to_string(&Rol::Supervisor).unwrap(), "\"supervisor\"");
    }

    #[test]
    fn resumen_uses_camel_case() {
        let r: ResumenDashboard = serde_json::from_str(
            r#"{"totalAires":4,"totalLecturas":120,"totalMantenimientos":7,"alertas":2,
                "ultimasLecturas":[{"id":1,"nombre":"AC-1","ubicacion":"Sala A",
                "temperatura":21.5,"humedad":48.0,"fecha":"2024-03-01 10:00:00"}]}"#,
        )
        .unwrap();
        assert_eq!(r.total_aires, 4);
        assert_eq!(r.alertas, 2);
        assert_eq!(r.ultimas_lecturas[0].ubicacion, "Sala A");
    }

    #[test]
    fn nulls_become_defaults() {
        let m: Mantenimiento = serde_json::from_str(
            r#"{"id":9,"aire_id":2,"fecha":"2024-01-02 08:30:00","tipo_mantenimiento":"Preventivo",
                "descripcion":null,"tecnico":"Luis"}"#,
        )
        .unwrap();
        assert_eq!(m.descripcion, "");
        assert!(!m.tiene_imagen);
        assert!(m.otro_equipo_id.is_none());
    }

    #[test]
    fn tipo_equipo_wire_names() {
        let e: OtroEquipo = serde_json::from_str(
            r#"{"id":1,"nombre":"UPS Norte","tipo":"UPS","estado_operativo":true}"#,
        )
        .unwrap();
        assert_eq!(e.tipo, TipoEquipo::Ups);
        assert_eq!(serde_json::to_string(&TipoEquipo::Pdu).unwrap(), "\"PDU\"");
        assert_eq!(TipoEquipo::from("generador".to_string()), TipoEquipo::Otro);
    }

    #[test]
    fn db_status_from_health() {
        let ok = HealthStatus {
            status: "ok".into(),
            database: "connected".into(),
        };
        let down = HealthStatus {
            status: "degraded".into(),
            database: "disconnected".into(),
        };
        assert_eq!(DbStatus::from_health(&ok), DbStatus::Connected);
        assert_eq!(DbStatus::from_health(&down), DbStatus::Disconnected);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let u = SessionUser {
            id: 1,
            username: "root".into(),
            nombre: String::new(),
            apellido: String::new(),
            email: String::new(),
            rol: Rol::Admin,
        };
        assert_eq!(u.display_name(), "root");
        assert_eq!(fmt_opt(Some(21.456), 1), "21.5");
        assert_eq!(fmt_opt(None, 1), "N/A");
    }
}
