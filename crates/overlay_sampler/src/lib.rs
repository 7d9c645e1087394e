//! # Overlay Sampler
//!
//! Amostragem de telemetria de hardware sobre provedores heterogêneos.
//!
//! **Provedores:**
//! - `sysinfo` – CPU, RAM e sensores térmicos (todas as plataformas)
//! - LibreHardwareMonitor WMI – todos os sensores do LHM (Windows, admin)
//! - `nvml-wrapper` – GPU NVIDIA: carga, temp, clocks, fan, VRAM (Windows)
//!
//! O [`TelemetrySampler`] nunca falha depois de aberto: sensores ausentes,
//! erros e panics do provedor viram o sentinela `0`.

pub mod background;
pub mod provider;
pub mod providers;
pub mod sampler;
pub mod selection;
pub mod sysinfo_provider;
#[cfg(windows)]
pub mod lhm_provider;
#[cfg(windows)]
pub mod nvml_gpu;

#[cfg(test)]
mod testing;

pub use background::{latest_snapshot, spawn_sampler_thread};
pub use provider::{HardwareDevice, HardwareProvider, ProviderError, Sensor};
pub use providers::open_sampler;
pub use sampler::{SamplerError, SamplerPolicy, TelemetrySampler};
pub use selection::select_sensor;
pub use sysinfo_provider::SysinfoProvider;
