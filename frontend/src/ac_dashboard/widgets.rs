use aircontrol_shared::thresholds::Nivel;
use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Warning,
    Success,
    Info,
}

impl AlertKind {
    fn style(&self) -> &'static str {
        match self {
            AlertKind::Error => "border:1px solid #b91c1c; background:#2a0b0b; color:#fecaca;",
            AlertKind::Warning => "border:1px solid #a16207; background:#2a1a04; color:#fde68a;",
            AlertKind::Success => "border:1px solid #15803d; background:#052e16; color:#bbf7d0;",
            AlertKind::Info => "border:1px solid #0e7490; background:#042f2e; color:#a5f3fc;",
        }
    }
}

/// Dismissible alert bound to an optional message signal.
#[component]
pub fn AlertBanner(kind: AlertKind, mut message: Signal<Option<String>>) -> Element {
    let Some(text) = message.read().clone() else {
        return rsx! {};
    };
    rsx! {
        div {
            style: "{kind.style()} padding:12px 14px; border-radius:12px; margin-bottom:14px; display:flex; gap:12px; align-items:flex-start;",
            div { style: "flex:1; font-size:14px; white-space:pre-line;", "{text}" }
            button {
                class: "ac-btn-ghost",
                style: "padding:0 6px; font-size:16px; line-height:1;",
                onclick: move |_| message.set(None),
                "×"
            }
        }
    }
}

/// Bootstrap-style variant name to badge colours.
pub fn variant_colors(variant: &str) -> (&'static str, &'static str) {
    match variant {
        "success" => ("#14532d", "#bbf7d0"),
        "danger" => ("#7f1d1d", "#fecaca"),
        "info" => ("#164e63", "#a5f3fc"),
        "primary" => ("#1e3a8a", "#bfdbfe"),
        "warning" => ("#78350f", "#fde68a"),
        _ => ("#334155", "#e2e8f0"),
    }
}

#[component]
pub fn Badge(variant: String, text: String) -> Element {
    let (bg, fg) = variant_colors(&variant);
    rsx! {
        span {
            style: "display:inline-block; padding:2px 10px; border-radius:999px; font-size:12px; font-weight:600; background:{bg}; color:{fg}; white-space:nowrap;",
            "{text}"
        }
    }
}

pub fn temperature_variant(n: Nivel) -> &'static str {
    match n {
        Nivel::Bajo => "info",
        Nivel::Normal => "success",
        Nivel::Alto => "danger",
    }
}

pub fn humidity_variant(n: Nivel) -> &'static str {
    match n {
        Nivel::Bajo => "warning",
        Nivel::Normal => "success",
        Nivel::Alto => "primary",
    }
}

#[component]
pub fn Spinner(label: Option<String>) -> Element {
    rsx! {
        div { style: "display:flex; align-items:center; justify-content:center; gap:10px; padding:32px; color:#94a3b8;",
            div { class: "ac-spinner" }
            if let Some(l) = label {
                span { "{l}" }
            }
        }
    }
}

#[component]
pub fn StatCard(title: String, value: String, accent: String) -> Element {
    rsx! {
        div { class: "ac-card", style: "border-left:4px solid {accent}; min-width:180px; flex:1;",
            div { style: "font-size:12px; color:#94a3b8; text-transform:uppercase; letter-spacing:0.04em;", "{title}" }
            div { style: "font-size:28px; font-weight:700; margin-top:6px; color:#e5e7eb;", "{value}" }
        }
    }
}

#[component]
pub fn Modal(
    title: String,
    on_close: EventHandler<()>,
    children: Element,
    footer: Option<Element>,
    #[props(default = "640px".to_string())] width: String,
) -> Element {
    rsx! {
        div { class: "ac-modal-backdrop",
            div { class: "ac-modal", style: "width:min({width}, 94vw);",
                div { style: "display:flex; align-items:center; justify-content:space-between; padding:14px 18px; border-bottom:1px solid #1f2937;",
                    h3 { style: "margin:0; font-size:17px;", "{title}" }
                    button { class: "ac-btn-ghost", style: "font-size:18px;", onclick: move |_| on_close.call(()), "×" }
                }
                div { style: "padding:18px; max-height:70vh; overflow:auto;", {children} }
                if let Some(f) = footer {
                    div { style: "display:flex; justify-content:flex-end; gap:10px; padding:12px 18px; border-top:1px solid #1f2937;",
                        {f}
                    }
                }
            }
        }
    }
}

#[component]
pub fn ConfirmModal(
    message: String,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        Modal {
            title: "Confirmar",
            width: "420px",
            on_close: move |_| on_cancel.call(()),
            footer: rsx! {
                button { class: "ac-btn", onclick: move |_| on_cancel.call(()), "Cancelar" }
                button { class: "ac-btn ac-btn-danger", onclick: move |_| on_confirm.call(()), "Eliminar" }
            },
            p { style: "margin:0;", "{message}" }
        }
    }
}

/// Label + control column used by every form.
#[component]
pub fn Field(label: String, children: Element) -> Element {
    rsx! {
        label { class: "ac-field",
            span { class: "ac-label", "{label}" }
            {children}
        }
    }
}

#[component]
pub fn TextField(
    label: String,
    value: String,
    on_input: EventHandler<String>,
    #[props(default = "text".to_string())] input_type: String,
    #[props(default)] placeholder: String,
) -> Element {
    rsx! {
        Field { label,
            input {
                class: "ac-input",
                r#type: "{input_type}",
                placeholder: "{placeholder}",
                value: "{value}",
                oninput: move |e| on_input.call(e.value()),
            }
        }
    }
}

#[component]
pub fn TextArea(label: String, value: String, on_input: EventHandler<String>) -> Element {
    rsx! {
        Field { label,
            textarea {
                class: "ac-input",
                rows: "3",
                value: "{value}",
                oninput: move |e| on_input.call(e.value()),
            }
        }
    }
}

#[component]
pub fn CheckField(label: String, checked: bool, on_toggle: EventHandler<bool>) -> Element {
    rsx! {
        label { style: "display:flex; align-items:center; gap:8px; font-size:14px; margin:6px 0;",
            input {
                r#type: "checkbox",
                checked,
                onchange: move |e| on_toggle.call(e.checked()),
            }
            "{label}"
        }
    }
}

/// Two-column key/value row for view modals.
#[component]
pub fn DetailRow(label: String, children: Element) -> Element {
    rsx! {
        div { style: "display:flex; gap:12px; padding:6px 0; border-bottom:1px solid #111827;",
            div { style: "width:190px; color:#94a3b8; font-size:13px; flex-shrink:0;", "{label}" }
            div { style: "flex:1; font-size:14px;", {children} }
        }
    }
}

pub fn or_na(v: &Option<String>) -> String {
    match v.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "N/A".to_string(),
    }
}

pub fn si_no(v: bool) -> (&'static str, &'static str) {
    if v { ("success", "Sí") } else { ("danger", "No") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_na_handles_blank() {
        assert_eq!(or_na(&None), "N/A");
        assert_eq!(or_na(&Some("  ".into())), "N/A");
        assert_eq!(or_na(&Some("Carrier".into())), "Carrier");
    }

    #[test]
    fn level_variants() {
        assert_eq!(temperature_variant(Nivel::Alto), "danger");
        assert_eq!(humidity_variant(Nivel::Bajo), "warning");
        assert_eq!(variant_colors("unknown"), variant_colors("secondary"));
    }
}
