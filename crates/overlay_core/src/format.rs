//! Linha de texto exibida pelo overlay.

use crate::types::OverlaySnapshot;

/// Formata um snapshot no layout do overlay:
///
/// ```text
/// CPU: 12% (max 40%) | 45°C   GPU: 30% | 60°C   RAM: 55%
/// ```
pub fn render_line(snapshot: &OverlaySnapshot, show_core_max: bool) -> String {
    let cpu = if show_core_max {
        format!(
            "{}% (max {}%)",
            snapshot.cpu_load.value, snapshot.cpu_core_max.value
        )
    } else {
        format!("{}%", snapshot.cpu_load.value)
    };

    format!(
        "CPU: {cpu} | {}°C   GPU: {}% | {}°C   RAM: {}%",
        snapshot.cpu_temp.value,
        snapshot.gpu_load.value,
        snapshot.gpu_temp.value,
        snapshot.memory_load.value,
    )
}
