//! Sampler de telemetria – superfície de consulta que nunca falha.
//!
//! Toda falha durante uma amostra (dispositivo ausente, sensor ausente, erro ou
//! panic do provedor) vira o sentinela `0` mais um log de diagnóstico. Só a
//! abertura do provedor pode falhar.

use crate::provider::{HardwareDevice, HardwareProvider, ProviderError};
use crate::selection::select_sensor;
use overlay_core::config::{QueryConfig, SamplerConfig};
use overlay_core::diagnostics::panic_message;
use overlay_core::types::{DeviceClass, OverlaySnapshot, SensorQuery, TelemetryReading};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, info, warn};

/// Erros do sampler.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Falha ao inicializar o monitoramento de hardware ({provider}): {source}")]
    Initialization {
        provider: &'static str,
        source: ProviderError,
    },
}

/// Classes monitoradas e políticas de seleção do sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerPolicy {
    pub monitored: Vec<DeviceClass>,
    pub queries: QueryConfig,
}

impl Default for SamplerPolicy {
    fn default() -> Self {
        SamplerPolicy::from(&SamplerConfig::default())
    }
}

impl From<&SamplerConfig> for SamplerPolicy {
    fn from(config: &SamplerConfig) -> Self {
        Self {
            monitored: config.monitored.clone(),
            queries: config.queries.clone(),
        }
    }
}

/// Sampler de telemetria sobre um provedor de hardware.
pub struct TelemetrySampler {
    provider: Box<dyn HardwareProvider>,
    policy: SamplerPolicy,
}

impl TelemetrySampler {
    /// Abre o provedor declarando as classes monitoradas.
    pub fn open(
        mut provider: Box<dyn HardwareProvider>,
        policy: SamplerPolicy,
    ) -> Result<Self, SamplerError> {
        let name = provider.name();
        provider
            .open(&policy.monitored)
            .map_err(|source| SamplerError::Initialization {
                provider: name,
                source,
            })?;

        let devices = provider.devices_mut();
        info!("✓ {name}: {} dispositivo(s) monitorado(s)", devices.len());
        for device in devices.iter() {
            debug!(
                "  {} – {} ({} sensores)",
                device.class(),
                device.name(),
                device.sensors().len()
            );
        }

        Ok(Self { provider, policy })
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    // ──────────────────────────────────────────
    // Getters públicos
    // ──────────────────────────────────────────

    pub fn sample_cpu_load(&mut self) -> i32 {
        let query = self.policy.queries.cpu_load.clone();
        self.read(&query).value
    }

    pub fn sample_cpu_core_max(&mut self) -> i32 {
        let query = self.policy.queries.cpu_core_max.clone();
        self.read(&query).value
    }

    pub fn sample_cpu_temperature(&mut self) -> i32 {
        let query = self.policy.queries.cpu_temp.clone();
        self.read(&query).value
    }

    pub fn sample_memory_load(&mut self) -> i32 {
        let query = self.policy.queries.memory_load.clone();
        self.read(&query).value
    }

    pub fn sample_gpu_load(&mut self) -> i32 {
        let query = self.policy.queries.gpu_load.clone();
        self.read(&query).value
    }

    pub fn sample_gpu_temperature(&mut self) -> i32 {
        let query = self.policy.queries.gpu_temp.clone();
        self.read(&query).value
    }

    /// Todas as leituras do overlay em um ciclo.
    pub fn snapshot(&mut self) -> OverlaySnapshot {
        let queries = self.policy.queries.clone();
        OverlaySnapshot {
            cpu_load: self.read(&queries.cpu_load),
            cpu_core_max: self.read(&queries.cpu_core_max),
            cpu_temp: self.read(&queries.cpu_temp),
            memory_load: self.read(&queries.memory_load),
            gpu_load: self.read(&queries.gpu_load),
            gpu_temp: self.read(&queries.gpu_temp),
        }
    }

    /// Executa uma consulta. Nunca falha: qualquer erro vira sentinela.
    pub fn read(&mut self, query: &SensorQuery) -> TelemetryReading {
        let provider = &mut self.provider;
        match catch_unwind(AssertUnwindSafe(|| read_query(provider.devices_mut(), query))) {
            Ok(reading) => reading,
            Err(payload) => {
                warn!(
                    "Provedor {} entrou em panic durante a leitura de {:?}: {}",
                    self.provider.name(),
                    query.metric,
                    panic_message(payload.as_ref())
                );
                TelemetryReading::ABSENT
            }
        }
    }
}

/// Sonda as classes da consulta em ordem e lê o sensor escolhido.
///
/// A sondagem para no primeiro dispositivo presente, mesmo que ele não tenha
/// o sensor pedido.
fn read_query(devices: &mut [Box<dyn HardwareDevice>], query: &SensorQuery) -> TelemetryReading {
    for class in &query.devices {
        let Some(device) = devices.iter_mut().find(|d| d.class() == *class) else {
            continue;
        };

        if let Err(e) = device.update() {
            warn!("{e}");
            return TelemetryReading::ABSENT;
        }

        return match select_sensor(device.sensors(), query.metric, query.name_hints.as_slice()) {
            Some(sensor) => {
                if sensor.value.is_none() {
                    debug!("{}: sensor '{}' sem valor", device.name(), sensor.name);
                }
                TelemetryReading::from_sensor_value(sensor.value)
            }
            None => {
                debug!("{}: nenhum sensor {:?}", device.name(), query.metric);
                TelemetryReading::ABSENT
            }
        };
    }

    debug!("Nenhum dispositivo para {:?} em {:?}", query.metric, query.devices);
    TelemetryReading::ABSENT
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
