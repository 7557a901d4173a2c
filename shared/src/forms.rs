//! Form state as typed by the user and its validation into request bodies.
//!
//! Every form keeps raw strings so inputs can be bound directly; `validate`
//! turns them into the payload or a Spanish message for the modal.

use crate::dates::format_date_input;
use crate::models::*;

fn opt(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn parse_num(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn required_message(missing: &[&str]) -> String {
    format!(
        "Los siguientes campos son requeridos: {}.",
        missing.join(", ")
    )
}

// ---------- aires ----------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AireForm {
    pub nombre: String,
    pub ubicacion: String,
    pub fecha_instalacion: String,
    pub tipo: String,
    pub toneladas: String,
    pub evaporadora_operativa: bool,
    pub evaporadora_marca: String,
    pub evaporadora_modelo: String,
    pub evaporadora_serial: String,
    pub evaporadora_codigo_inventario: String,
    pub evaporadora_ubicacion_instalacion: String,
    pub condensadora_operativa: bool,
    pub condensadora_marca: String,
    pub condensadora_modelo: String,
    pub condensadora_serial: String,
    pub condensadora_codigo_inventario: String,
    pub condensadora_ubicacion_instalacion: String,
}

impl AireForm {
    pub fn new_blank(today: &str) -> Self {
        AireForm {
            fecha_instalacion: today.to_string(),
            evaporadora_operativa: true,
            condensadora_operativa: true,
            ..Default::default()
        }
    }

    pub fn from_list_item(a: &Aire) -> Self {
        AireForm {
            nombre: a.nombre.clone(),
            ubicacion: a.ubicacion.clone(),
            fecha_instalacion: format_date_input(&a.fecha_instalacion),
            evaporadora_operativa: true,
            condensadora_operativa: true,
            ..Default::default()
        }
    }

    pub fn from_detalle(d: &AireDetalle) -> Self {
        let s = |v: &Option<String>| v.clone().unwrap_or_default();
        AireForm {
            nombre: d.nombre.clone(),
            ubicacion: d.ubicacion.clone(),
            fecha_instalacion: format_date_input(&d.fecha_instalacion),
            tipo: s(&d.tipo),
            toneladas: d.toneladas.map(|t| t.to_string()).unwrap_or_default(),
            evaporadora_operativa: d.evaporadora_operativa,
            evaporadora_marca: s(&d.evaporadora_marca),
            evaporadora_modelo: s(&d.evaporadora_modelo),
            evaporadora_serial: s(&d.evaporadora_serial),
            evaporadora_codigo_inventario: s(&d.evaporadora_codigo_inventario),
            evaporadora_ubicacion_instalacion: s(&d.evaporadora_ubicacion_instalacion),
            condensadora_operativa: d.condensadora_operativa,
            condensadora_marca: s(&d.condensadora_marca),
            condensadora_modelo: s(&d.condensadora_modelo),
            condensadora_serial: s(&d.condensadora_serial),
            condensadora_codigo_inventario: s(&d.condensadora_codigo_inventario),
            condensadora_ubicacion_instalacion: s(&d.condensadora_ubicacion_instalacion),
        }
    }

    pub fn validate(&self) -> Result<AirePayload, String> {
        let required = [
            (&self.nombre, "Nombre"),
            (&self.ubicacion, "Ubicación"),
            (&self.fecha_instalacion, "Fecha de Instalación"),
            (&self.evaporadora_serial, "Serial Evaporadora"),
            (&self.evaporadora_codigo_inventario, "Cód. Inventario Evaporadora"),
            (&self.condensadora_serial, "Serial Condensadora"),
            (&self.condensadora_codigo_inventario, "Cód. Inventario Condensadora"),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(v, _)| v.trim().is_empty())
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(required_message(&missing));
        }
        let toneladas = match self.toneladas.trim() {
            "" => None,
            t => Some(parse_num(t).ok_or("Toneladas debe ser un número válido.")?),
        };
        Ok(AirePayload {
            nombre: self.nombre.trim().to_string(),
            ubicacion: self.ubicacion.trim().to_string(),
            fecha_instalacion: self.fecha_instalacion.trim().to_string(),
            tipo: opt(&self.tipo),
            toneladas,
            evaporadora_operativa: self.evaporadora_operativa,
            evaporadora_marca: opt(&self.evaporadora_marca),
            evaporadora_modelo: opt(&self.evaporadora_modelo),
            evaporadora_serial: self.evaporadora_serial.trim().to_string(),
            evaporadora_codigo_inventario: self.evaporadora_codigo_inventario.trim().to_string(),
            evaporadora_ubicacion_instalacion: opt(&self.evaporadora_ubicacion_instalacion),
            condensadora_operativa: self.condensadora_operativa,
            condensadora_marca: opt(&self.condensadora_marca),
            condensadora_modelo: opt(&self.condensadora_modelo),
            condensadora_serial: self.condensadora_serial.trim().to_string(),
            condensadora_codigo_inventario: self.condensadora_codigo_inventario.trim().to_string(),
            condensadora_ubicacion_instalacion: opt(&self.condensadora_ubicacion_instalacion),
        })
    }
}

// ---------- lecturas ----------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LecturaForm {
    pub aire_id: String,
    pub fecha: String,
    pub hora: String,
    pub temperatura: String,
    pub humedad: String,
}

impl LecturaForm {
    pub fn new_blank(today: &str, now_hhmm: &str) -> Self {
        LecturaForm {
            fecha: today.to_string(),
            hora: now_hhmm.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<NuevaLectura, String> {
        if [
            &self.aire_id,
            &self.fecha,
            &self.hora,
            &self.temperatura,
            &self.humedad,
        ]
        .iter()
        .any(|v| v.trim().is_empty())
        {
            return Err("Todos los campos son requeridos.".into());
        }
        let aire_id = self
            .aire_id
            .trim()
            .parse::<i64>()
            .map_err(|_| "Selecciona un aire válido.".to_string())?;
        let temperatura = parse_num(&self.temperatura)
            .ok_or("La temperatura debe ser un número válido.")?;
        let humedad =
            parse_num(&self.humedad).ok_or("La humedad debe ser un número válido.")?;
        if !(0.0..=100.0).contains(&humedad) {
            return Err("La humedad debe estar entre 0 y 100.".into());
        }
        Ok(NuevaLectura {
            aire_id,
            fecha: self.fecha.trim().to_string(),
            hora: self.hora.trim().to_string(),
            temperatura,
            humedad,
        })
    }
}

// ---------- mantenimientos ----------

pub const TIPOS_MANTENIMIENTO: [&str; 5] = [
    "Preventivo",
    "Correctivo",
    "Predictivo",
    "Instalación",
    "Limpieza",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipoRef {
    Aire(i64),
    Otro(i64),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MantenimientoForm {
    pub aire_id: String,
    pub otro_equipo_id: String,
    pub tipo_mantenimiento: String,
    pub descripcion: String,
    pub tecnico: String,
}

impl MantenimientoForm {
    pub fn set_aire(&mut self, id: String) {
        if !id.is_empty() {
            self.otro_equipo_id.clear();
        }
        self.aire_id = id;
    }

    pub fn set_otro(&mut self, id: String) {
        if !id.is_empty() {
            self.aire_id.clear();
        }
        self.otro_equipo_id = id;
    }

    pub fn validate(&self) -> Result<MantenimientoPayload, String> {
        let target = match (opt(&self.aire_id), opt(&self.otro_equipo_id)) {
            (Some(_), Some(_)) => {
                return Err("Selecciona solo un equipo (aire u otro equipo).".into());
            }
            (Some(a), None) => a.parse().map(EquipoRef::Aire),
            (None, Some(o)) => o.parse().map(EquipoRef::Otro),
            (None, None) => return Err("Debes seleccionar un equipo.".into()),
        }
        .map_err(|_| "Equipo seleccionado inválido.".to_string())?;

        let mut missing = Vec::new();
        if self.tipo_mantenimiento.trim().is_empty() {
            missing.push("Tipo");
        }
        if self.descripcion.trim().is_empty() {
            missing.push("Descripción");
        }
        if self.tecnico.trim().is_empty() {
            missing.push("Técnico");
        }
        if !missing.is_empty() {
            return Err(required_message(&missing));
        }
        Ok(MantenimientoPayload {
            target,
            tipo_mantenimiento: self.tipo_mantenimiento.trim().to_string(),
            descripcion: self.descripcion.trim().to_string(),
            tecnico: self.tecnico.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MantenimientoPayload {
    pub target: EquipoRef,
    pub tipo_mantenimiento: String,
    pub descripcion: String,
    pub tecnico: String,
}

impl MantenimientoPayload {
    /// Text parts of the multipart body; the image goes in `imagen_file`.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let equipo = match self.target {
            EquipoRef::Aire(id) => ("aire_id", id.to_string()),
            EquipoRef::Otro(id) => ("otro_equipo_id", id.to_string()),
        };
        vec![
            equipo,
            ("tipo_mantenimiento", self.tipo_mantenimiento.clone()),
            ("descripcion", self.descripcion.clone()),
            ("tecnico", self.tecnico.clone()),
        ]
    }
}

/// Bootstrap-style colour class for a maintenance type.
pub fn tipo_mantenimiento_color(tipo: &str) -> &'static str {
    match tipo.trim().to_lowercase().as_str() {
        "preventivo" => "success",
        "correctivo" => "danger",
        "predictivo" => "info",
        "instalación" | "instalacion" => "primary",
        "limpieza" => "warning",
        _ => "secondary",
    }
}

// ---------- umbrales ----------

#[derive(Debug, Clone, PartialEq)]
pub struct UmbralForm {
    pub nombre: String,
    pub es_global: bool,
    pub aire_id: String,
    pub temp_min: String,
    pub temp_max: String,
    pub hum_min: String,
    pub hum_max: String,
    pub notificar_activo: bool,
}

impl Default for UmbralForm {
    fn default() -> Self {
        UmbralForm {
            nombre: String::new(),
            es_global: true,
            aire_id: String::new(),
            temp_min: "18".into(),
            temp_max: "25".into(),
            hum_min: "30".into(),
            hum_max: "70".into(),
            notificar_activo: true,
        }
    }
}

impl UmbralForm {
    pub fn from_umbral(u: &Umbral) -> Self {
        UmbralForm {
            nombre: u.nombre.clone(),
            es_global: u.es_global,
            aire_id: u.aire_id.map(|id| id.to_string()).unwrap_or_default(),
            temp_min: u.temp_min.to_string(),
            temp_max: u.temp_max.to_string(),
            hum_min: u.hum_min.to_string(),
            hum_max: u.hum_max.to_string(),
            notificar_activo: u.notificar_activo,
        }
    }

    pub fn validate(&self) -> Result<UmbralPayload, String> {
        if self.nombre.trim().is_empty() {
            return Err("El nombre es requerido.".into());
        }
        let limits = [&self.temp_min, &self.temp_max, &self.hum_min, &self.hum_max];
        let parsed: Option<Vec<f64>> = limits.iter().map(|s| parse_num(s)).collect();
        let Some([temp_min, temp_max, hum_min, hum_max]) =
            parsed.and_then(|v| <[f64; 4]>::try_from(v).ok())
        else {
            return Err("Todos los límites deben ser números válidos.".into());
        };
        let aire_id = if self.es_global {
            None
        } else {
            match self.aire_id.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    return Err("Debe seleccionar un aire para un umbral específico.".into());
                }
            }
        };
        if temp_min >= temp_max {
            return Err("La temperatura mínima debe ser menor que la máxima.".into());
        }
        if hum_min >= hum_max {
            return Err("La humedad mínima debe ser menor que la máxima.".into());
        }
        Ok(UmbralPayload {
            nombre: self.nombre.trim().to_string(),
            es_global: self.es_global,
            aire_id,
            temp_min,
            temp_max,
            hum_min,
            hum_max,
            notificar_activo: self.notificar_activo,
        })
    }
}

// ---------- usuarios ----------

#[derive(Debug, Clone, PartialEq)]
pub struct UsuarioForm {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub rol: String,
    pub activo: bool,
}

impl Default for UsuarioForm {
    fn default() -> Self {
        UsuarioForm {
            nombre: String::new(),
            apellido: String::new(),
            email: String::new(),
            username: String::new(),
            password: String::new(),
            rol: Rol::Operador.as_str().to_string(),
            activo: true,
        }
    }
}

impl UsuarioForm {
    pub fn from_usuario(u: &Usuario) -> Self {
        UsuarioForm {
            nombre: u.nombre.clone(),
            apellido: u.apellido.clone(),
            email: u.email.clone(),
            username: u.username.clone(),
            password: String::new(),
            rol: u.rol.as_str().to_string(),
            activo: u.activo,
        }
    }

    fn checked_common(&self) -> Result<Rol, String> {
        if self.nombre.trim().is_empty()
            || self.apellido.trim().is_empty()
            || self.email.trim().is_empty()
        {
            return Err("Nombre, apellido y email son requeridos.".into());
        }
        if !self.email.contains('@') {
            return Err("El email no es válido.".into());
        }
        Rol::parse(&self.rol).ok_or_else(|| "Rol inválido.".to_string())
    }

    pub fn validate_create(&self) -> Result<NuevoUsuario, String> {
        let rol = self.checked_common()?;
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err("Usuario y contraseña son requeridos.".into());
        }
        if self.password.len() < 6 {
            return Err("La contraseña debe tener al menos 6 caracteres.".into());
        }
        Ok(NuevoUsuario {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            rol,
        })
    }

    pub fn validate_update(&self) -> Result<UsuarioUpdate, String> {
        let rol = self.checked_common()?;
        Ok(UsuarioUpdate {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            email: self.email.trim().to_string(),
            rol,
            activo: self.activo,
        })
    }
}

// ---------- otros equipos ----------

#[derive(Debug, Clone, PartialEq)]
pub struct OtroEquipoForm {
    pub nombre: String,
    pub tipo: String,
    pub ubicacion: String,
    pub marca: String,
    pub modelo: String,
    pub serial: String,
    pub codigo_inventario: String,
    pub fecha_instalacion: String,
    pub estado_operativo: bool,
    pub notas: String,
}

impl Default for OtroEquipoForm {
    fn default() -> Self {
        OtroEquipoForm {
            nombre: String::new(),
            tipo: TipoEquipo::Motogenerador.as_str().to_string(),
            ubicacion: String::new(),
            marca: String::new(),
            modelo: String::new(),
            serial: String::new(),
            codigo_inventario: String::new(),
            fecha_instalacion: String::new(),
            estado_operativo: true,
            notas: String::new(),
        }
    }
}

impl OtroEquipoForm {
    pub fn from_equipo(e: &OtroEquipo) -> Self {
        let s = |v: &Option<String>| v.clone().unwrap_or_default();
        OtroEquipoForm {
            nombre: e.nombre.clone(),
            tipo: e.tipo.as_str().to_string(),
            ubicacion: s(&e.ubicacion),
            marca: s(&e.marca),
            modelo: s(&e.modelo),
            serial: s(&e.serial),
            codigo_inventario: s(&e.codigo_inventario),
            fecha_instalacion: e
                .fecha_instalacion
                .as_deref()
                .map(format_date_input)
                .unwrap_or_default(),
            estado_operativo: e.estado_operativo,
            notas: s(&e.notas),
        }
    }

    pub fn validate(&self) -> Result<OtroEquipoPayload, String> {
        if self.nombre.trim().is_empty() || self.tipo.trim().is_empty() {
            return Err("Nombre y tipo son requeridos.".into());
        }
        let tipo = TipoEquipo::parse(&self.tipo).ok_or("Tipo de equipo inválido.")?;
        Ok(OtroEquipoPayload {
            nombre: self.nombre.trim().to_string(),
            tipo,
            ubicacion: opt(&self.ubicacion),
            marca: opt(&self.marca),
            modelo: opt(&self.modelo),
            serial: opt(&self.serial),
            codigo_inventario: opt(&self.codigo_inventario),
            fecha_instalacion: opt(&self.fecha_instalacion),
            estado_operativo: self.estado_operativo,
            notas: opt(&self.notas),
        })
    }
}

// ---------- registro ----------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, String> {
        let all = [
            &self.nombre,
            &self.apellido,
            &self.email,
            &self.username,
            &self.password,
            &self.confirm_password,
        ];
        if all.iter().any(|v| v.trim().is_empty()) {
            return Err("Todos los campos son obligatorios".into());
        }
        if self.password != self.confirm_password {
            return Err("Las contraseñas no coinciden".into());
        }
        if !self.email.contains('@') {
            return Err("El email no es válido".into());
        }
        if self.password.len() < 6 {
            return Err("La contraseña debe tener al menos 6 caracteres".into());
        }
        Ok(RegisterRequest {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_aire() -> AireForm {
        AireForm {
            nombre: "AC-01".into(),
            ubicacion: "Sala de servidores".into(),
            evaporadora_serial: "EV-1".into(),
            evaporadora_codigo_inventario: "INV-1".into(),
            condensadora_serial: "CO-1".into(),
            condensadora_codigo_inventario: "INV-2".into(),
            ..AireForm::new_blank("2024-03-01")
        }
    }

    #[test]
    fn aire_missing_fields_are_listed() {
        let form = AireForm::new_blank("2024-03-01");
        let err = form.validate().unwrap_err();
        assert!(err.starts_with("Los siguientes campos son requeridos: Nombre, Ubicación,"));
        assert!(!err.contains("Fecha de Instalación"));
        assert!(err.ends_with("Cód. Inventario Condensadora."));
    }

    #[test]
    fn aire_optional_fields() {
        let mut form = filled_aire();
        let p = form.validate().unwrap();
        assert_eq!(p.toneladas, None);
        assert_eq!(p.tipo, None);
        assert!(p.evaporadora_operativa && p.condensadora_operativa);

        form.toneladas = "2,5".into();
        assert_eq!(form.validate().unwrap().toneladas, Some(2.5));
        form.toneladas = "dos".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn aire_from_detalle_formats_date() {
        let d = AireDetalle {
            id: 1,
            nombre: "AC".into(),
            fecha_instalacion: "Mon, 15 May 2023 00:00:00 GMT".into(),
            toneladas: Some(3.0),
            evaporadora_serial: Some("S".into()),
            ..Default::default()
        };
        let f = AireForm::from_detalle(&d);
        assert_eq!(f.fecha_instalacion, "2023-05-15");
        assert_eq!(f.toneladas, "3");
        assert_eq!(f.evaporadora_serial, "S");
    }

    #[test]
    fn lectura_humidity_bounds() {
        let mut f = LecturaForm {
            aire_id: "3".into(),
            fecha: "2024-01-01".into(),
            hora: "10:30".into(),
            temperatura: "22.5".into(),
            humedad: "101".into(),
        };
        assert_eq!(
            f.validate().unwrap_err(),
            "La humedad debe estar entre 0 y 100."
        );
        f.humedad = "100".into();
        let l = f.validate().unwrap();
        assert_eq!(l.aire_id, 3);
        assert_eq!(l.humedad, 100.0);
        f.temperatura = "caliente".into();
        assert!(f.validate().is_err());
        f.hora.clear();
        assert_eq!(f.validate().unwrap_err(), "Todos los campos son requeridos.");
    }

    #[test]
    fn mantenimiento_single_target() {
        let mut f = MantenimientoForm {
            tipo_mantenimiento: "Preventivo".into(),
            descripcion: "Cambio de filtros".into(),
            tecnico: "Luis".into(),
            ..Default::default()
        };
        assert!(f.validate().is_err());
        f.set_aire("4".into());
        f.set_otro("9".into());
        assert!(f.aire_id.is_empty());
        let p = f.validate().unwrap();
        assert_eq!(p.target, EquipoRef::Otro(9));
        assert_eq!(p.fields()[0], ("otro_equipo_id", "9".to_string()));

        f.aire_id = "4".into();
        assert!(f.validate().is_err());
    }

    #[test]
    fn badge_colors() {
        assert_eq!(tipo_mantenimiento_color("Correctivo"), "danger");
        assert_eq!(tipo_mantenimiento_color("instalación"), "primary");
        assert_eq!(tipo_mantenimiento_color("Otro"), "secondary");
    }

    #[test]
    fn umbral_rules() {
        let mut f = UmbralForm {
            nombre: "Sala fría".into(),
            ..Default::default()
        };
        assert!(f.validate().unwrap().aire_id.is_none());

        f.es_global = false;
        assert!(f.validate().unwrap_err().contains("seleccionar un aire"));
        f.aire_id = "2".into();
        assert_eq!(f.validate().unwrap().aire_id, Some(2));

        f.temp_min = "30".into();
        assert!(f.validate().unwrap_err().contains("temperatura mínima"));
        f.temp_min = "x".into();
        assert!(f.validate().unwrap_err().contains("números válidos"));
    }

    #[test]
    fn usuario_create_and_update() {
        let mut f = UsuarioForm {
            nombre: "Ana".into(),
            apellido: "Ruiz".into(),
            email: "ana@dcce.io".into(),
            username: "ana".into(),
            password: "123".into(),
            ..Default::default()
        };
        assert!(f.validate_create().unwrap_err().contains("6 caracteres"));
        f.password = "secreto".into();
        assert_eq!(f.validate_create().unwrap().rol, Rol::Operador);
        f.rol = "root".into();
        assert_eq!(f.validate_update().unwrap_err(), "Rol inválido.");
    }

    #[test]
    fn otro_equipo_blank_optionals() {
        let f = OtroEquipoForm {
            nombre: "Planta".into(),
            marca: "  ".into(),
            ..Default::default()
        };
        let p = f.validate().unwrap();
        assert_eq!(p.tipo, TipoEquipo::Motogenerador);
        assert!(p.marca.is_none() && p.fecha_instalacion.is_none());
    }

    #[test]
    fn register_rules() {
        let mut f = RegisterForm {
            nombre: "Ana".into(),
            apellido: "Ruiz".into(),
            email: "ana.dcce.io".into(),
            username: "ana".into(),
            password: "secreto".into(),
            confirm_password: "secreta".into(),
        };
        assert_eq!(f.validate().unwrap_err(), "Las contraseñas no coinciden");
        f.confirm_password = "secreto".into();
        assert_eq!(f.validate().unwrap_err(), "El email no es válido");
        f.email = "ana@dcce.io".into();
        assert_eq!(f.validate().unwrap().username, "ana");
    }
}
