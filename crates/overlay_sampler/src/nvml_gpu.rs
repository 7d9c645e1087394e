//! NVIDIA GPU monitoring via NVML (nvidia-ml).
//!
//! Carrega `nvml.dll` dinamicamente – funciona com qualquer driver NVIDIA.
//! Sem GPU NVIDIA? `try_new()` retorna `None` e o dispositivo não é criado.

use crate::provider::{HardwareDevice, ProviderError, Sensor};
use nvml_wrapper::Nvml;
use nvml_wrapper::enum_wrappers::device::{Clock, TemperatureSensor};
use overlay_core::types::{DeviceClass, MetricClass};
use tracing::{debug, info};

/// GPU NVIDIA exposta como dispositivo `GpuNvidia`.
pub struct NvmlGpuDevice {
    nvml: Nvml,
    index: u32,
    name: String,
    sensors: Vec<Sensor>,
}

impl NvmlGpuDevice {
    /// Tenta inicializar NVML. Retorna `None` se não houver GPU NVIDIA.
    pub fn try_new() -> Option<Self> {
        let nvml = match Nvml::init() {
            Ok(nvml) => nvml,
            Err(e) => {
                debug!("NVML não disponível: {e}");
                return None;
            }
        };

        let count = nvml.device_count().unwrap_or(0);
        if count == 0 {
            debug!("NVML init OK mas nenhuma GPU encontrada");
            return None;
        }

        let name = nvml
            .device_by_index(0)
            .and_then(|dev| dev.name())
            .unwrap_or_else(|_| "NVIDIA GPU".into());
        info!("✓ NVML: {name} ({count} GPU(s))");

        Some(Self {
            nvml,
            index: 0,
            name,
            sensors: Vec::new(),
        })
    }
}

impl HardwareDevice for NvmlGpuDevice {
    fn class(&self) -> DeviceClass {
        DeviceClass::GpuNvidia
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ProviderError> {
        let device = self
            .nvml
            .device_by_index(self.index)
            .map_err(|e| ProviderError::Refresh {
                device: self.name.clone(),
                detail: e.to_string(),
            })?;

        // Cada consulta pode falhar isoladamente; falha vira sensor sem valor
        let util = device.utilization_rates().ok();
        let temp = device.temperature(TemperatureSensor::Gpu).ok();
        let clock_core = device.clock_info(Clock::Graphics).ok();
        let clock_mem = device.clock_info(Clock::Memory).ok();
        // NVML retorna % 0-100, NÃO RPM
        let fan = device.fan_speed(0).ok();
        let mem = device.memory_info().ok();

        self.sensors = vec![
            Sensor::new(MetricClass::Load, "GPU Core", util.as_ref().map(|u| u.gpu as f32)),
            Sensor::new(
                MetricClass::Load,
                "GPU Memory Controller",
                util.as_ref().map(|u| u.memory as f32),
            ),
            Sensor::new(MetricClass::Temperature, "GPU Core", temp.map(|t| t as f32)),
            Sensor::new(MetricClass::Clock, "GPU Core", clock_core.map(|c| c as f32)),
            Sensor::new(MetricClass::Clock, "GPU Memory", clock_mem.map(|c| c as f32)),
            Sensor::new(MetricClass::Fan, "GPU Fan", fan.map(|f| f as f32)),
            Sensor::new(
                MetricClass::Data,
                "GPU Memory Used",
                // bytes → MB
                mem.map(|m| (m.used as f64 / (1024.0 * 1024.0)) as f32),
            ),
        ];
        Ok(())
    }

    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}
