//! Escolha do provedor conforme a configuração.
//!
//! Cadeia do modo `auto`:
//! 1. LibreHardwareMonitor WMI (Windows, sensores completos)
//! 2. `sysinfo` + NVML para GPU NVIDIA (Windows)
//! 3. `sysinfo` (demais plataformas)

use crate::sampler::{SamplerError, SamplerPolicy, TelemetrySampler};
use crate::sysinfo_provider::SysinfoProvider;
use overlay_core::config::SamplerConfig;
#[cfg(windows)]
use overlay_core::types::DeviceClass;
use tracing::warn;

/// Abre o sampler com o provedor configurado.
pub fn open_sampler(config: &SamplerConfig) -> Result<TelemetrySampler, SamplerError> {
    let policy = SamplerPolicy::from(config);

    match config.provider.as_str() {
        "sysinfo" => TelemetrySampler::open(Box::new(sysinfo_provider(&policy)), policy),
        "lhm" => open_lhm(policy),
        _ => {
            #[cfg(windows)]
            {
                match open_lhm(policy.clone()) {
                    Ok(sampler) => return Ok(sampler),
                    Err(e) => {
                        warn!("✗ {e}");
                        warn!("  → Para sensores completos (CPU temp, GPU AMD/Intel, Mobo):");
                        warn!("    Instale LibreHardwareMonitor e rode como admin ou serviço Windows");
                    }
                }
            }
            TelemetrySampler::open(Box::new(sysinfo_provider(&policy)), policy)
        }
    }
}

#[cfg(windows)]
fn open_lhm(policy: SamplerPolicy) -> Result<TelemetrySampler, SamplerError> {
    TelemetrySampler::open(Box::new(crate::lhm_provider::LhmProvider::new()), policy)
}

#[cfg(not(windows))]
fn open_lhm(_policy: SamplerPolicy) -> Result<TelemetrySampler, SamplerError> {
    warn!("LibreHardwareMonitor só existe no Windows");
    Err(SamplerError::Initialization {
        provider: "LHM WMI",
        source: crate::provider::ProviderError::Unsupported("LHM WMI"),
    })
}

/// `sysinfo`, com a GPU NVIDIA via NVML quando disponível.
fn sysinfo_provider(policy: &SamplerPolicy) -> SysinfoProvider {
    #[allow(unused_mut)]
    let mut provider = SysinfoProvider::new();

    #[cfg(windows)]
    {
        if policy.monitored.contains(&DeviceClass::GpuNvidia) {
            if let Some(gpu) = crate::nvml_gpu::NvmlGpuDevice::try_new() {
                provider.push_device(Box::new(gpu));
            }
        }
    }
    #[cfg(not(windows))]
    let _ = policy;

    provider
}
