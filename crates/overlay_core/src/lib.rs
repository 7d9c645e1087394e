//! # Overlay Core
//!
//! Crate compartilhada que define as estruturas de dados, a política de
//! seleção de sensores, a configuração TOML e a formatação do overlay de
//! desempenho.
//!
//! ## Módulos
//! - [`types`] – Classes de dispositivo/métrica, `SensorQuery`, leituras
//! - [`config`] – Configuração unificada via TOML
//! - [`format`] – Linha de texto renderizada pelo overlay
//! - [`diagnostics`] – Extração de mensagens de panic (fronteira do processo)

pub mod types;
pub mod config;
pub mod format;
pub mod diagnostics;

// Re-exports convenientes
pub use types::{DeviceClass, MetricClass, OverlaySnapshot, SensorQuery, TelemetryReading};
pub use config::{AppConfig, HotkeyConfig, OverlayConfig, SamplerConfig};
pub use format::render_line;
