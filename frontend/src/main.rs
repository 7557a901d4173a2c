#[macro_use]
mod ac_dashboard;
mod app;

use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(target_arch = "wasm32"))]
fn init_panic_hook() {}

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("AIRCONTROL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    init_panic_hook();
    launch(app::App);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    init_panic_hook();
    init_tracing();

    let window = dioxus_desktop::WindowBuilder::new()
        .with_title("AirControl")
        .with_inner_size(dioxus_desktop::LogicalSize::new(1280.0, 820.0));
    let cfg = dioxus_desktop::Config::new().with_window(window);
    LaunchBuilder::desktop().with_cfg(cfg).launch(app::App);
}
