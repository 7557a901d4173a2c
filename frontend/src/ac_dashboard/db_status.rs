use aircontrol_shared::DbStatus;
use dioxus::prelude::*;

use super::session::DB_STATUS;
use super::widgets::variant_colors;

fn variant(s: DbStatus) -> &'static str {
    match s {
        DbStatus::Connected => "success",
        DbStatus::Disconnected => "danger",
        DbStatus::Error => "warning",
        DbStatus::Checking => "secondary",
    }
}

#[component]
pub fn DbStatusIndicator() -> Element {
    let status = *DB_STATUS.read();
    let (bg, fg) = variant_colors(variant(status));
    let dot = if status == DbStatus::Checking { "ac-pulse" } else { "" };
    rsx! {
        span {
            style: "display:inline-flex; align-items:center; gap:6px; padding:3px 10px; border-radius:999px; background:{bg}; color:{fg}; font-size:12px;",
            span { class: "{dot}", style: "width:8px; height:8px; border-radius:50%; background:{fg}; display:inline-block;" }
            "{status.label()}"
        }
    }
}
