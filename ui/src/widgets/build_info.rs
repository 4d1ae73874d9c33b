use egui::{Response, Ui};

/// Version and commit stamp for the status bar; stamped by `build.rs`.
pub fn build_info(ui: &mut Ui) -> Response {
    let text = format!("v{} {}", env!("CARGO_PKG_VERSION"), env!("BUILD_COMMIT"));
    ui.weak(text)
        .on_hover_text(format!("built {}", env!("BUILD_DATE")))
}
