//! Provedor portátil via `sysinfo`.
//!
//! - CPU: carga total, core máximo e por core; temperaturas dos components
//!   com rótulo de CPU (`k10temp`, `coretemp`, `Tctl`, `Package`...)
//! - Memória: carga percentual e GB usados/disponíveis
//! - GPU: temperaturas de components com rótulo de driver (`amdgpu`,
//!   `nvidia`/`nouveau`, `i915`/`xe`)
//! - Motherboard: demais sensores térmicos (`acpitz`, `nct67xx`...)
//!
//! Cada dispositivo tem seu próprio `System`/`Components`, então `update()`
//! atualiza só o subsistema necessário.

use crate::provider::{HardwareDevice, HardwareProvider, ProviderError, Sensor};
use overlay_core::types::{DeviceClass, MetricClass};
use sysinfo::{Components, CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use std::time::Instant;
use tracing::debug;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Provedor baseado em `sysinfo`.
#[derive(Default)]
pub struct SysinfoProvider {
    devices: Vec<Box<dyn HardwareDevice>>,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acrescenta um dispositivo externo (ex: GPU via NVML).
    pub fn push_device(&mut self, device: Box<dyn HardwareDevice>) {
        self.devices.push(device);
    }
}

impl HardwareProvider for SysinfoProvider {
    fn name(&self) -> &'static str {
        "sysinfo"
    }

    fn open(&mut self, classes: &[DeviceClass]) -> Result<(), ProviderError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProviderError::Unsupported("sysinfo"));
        }

        // Dispositivos externos já adicionados têm prioridade sobre os
        // equivalentes derivados de components.
        let external: Vec<DeviceClass> = self.devices.iter().map(|d| d.class()).collect();
        let wanted = |class: DeviceClass| classes.contains(&class) && !external.contains(&class);

        if wanted(DeviceClass::Cpu) {
            self.devices.push(Box::new(CpuDevice::new()));
        }
        if wanted(DeviceClass::Memory) {
            self.devices.push(Box::new(MemoryDevice::new()));
        }

        let components = Components::new_with_refreshed_list();
        for class in [
            DeviceClass::GpuNvidia,
            DeviceClass::GpuAmd,
            DeviceClass::GpuIntel,
            DeviceClass::Motherboard,
        ] {
            let has_sensor = components
                .iter()
                .any(|c| classify_component(c.label()) == Some(class));
            if wanted(class) && has_sensor {
                self.devices.push(Box::new(ThermalDevice::new(class)));
            }
        }

        if self.devices.is_empty() {
            return Err(ProviderError::Unavailable {
                provider: "sysinfo",
                detail: "nenhum dispositivo das classes monitoradas".into(),
            });
        }
        Ok(())
    }

    fn devices_mut(&mut self) -> &mut [Box<dyn HardwareDevice>] {
        &mut self.devices
    }
}

// ──────────────────────────────────────────────
// Classificação de components por rótulo
// ──────────────────────────────────────────────

/// Classifica um component térmico do sysinfo pelo rótulo.
fn classify_component(label: &str) -> Option<DeviceClass> {
    let label = label.to_lowercase();
    if label.contains("fan") {
        return None;
    }
    if label.contains("amdgpu") || label.contains("radeon") {
        Some(DeviceClass::GpuAmd)
    } else if label.contains("nvidia") || label.contains("nouveau") || label.contains("geforce") {
        Some(DeviceClass::GpuNvidia)
    } else if label.contains("i915") || label.starts_with("xe ") || label.contains("intel gpu") {
        Some(DeviceClass::GpuIntel)
    } else if label.contains("cpu")
        || label.contains("k10temp")
        || label.contains("coretemp")
        || label.contains("tctl")
        || label.contains("tdie")
        || label.contains("tccd")
        || label.contains("package")
        || label.contains("core")
    {
        Some(DeviceClass::Cpu)
    } else {
        Some(DeviceClass::Motherboard)
    }
}

/// Converte os components de uma classe em sensores de temperatura.
fn thermal_sensors(components: &Components, class: DeviceClass) -> impl Iterator<Item = Sensor> + '_ {
    components
        .iter()
        .filter(move |c| classify_component(c.label()) == Some(class))
        .map(|c| {
            // Leituras fora da faixa física são tratadas como ausentes
            let value = c.temperature().filter(|t| *t > 0.0 && *t < 150.0);
            Sensor::new(MetricClass::Temperature, c.label(), value)
        })
}

// ──────────────────────────────────────────────
// CPU
// ──────────────────────────────────────────────

/// Leituras de CPU só mudam depois de `MINIMUM_CPU_UPDATE_INTERVAL`; dentro
/// dessa janela `update()` mantém os sensores do último refresh. Um snapshot
/// consulta a CPU três vezes seguidas.
struct CpuDevice {
    sys: System,
    components: Components,
    name: String,
    sensors: Vec<Sensor>,
    last_refresh: Option<Instant>,
}

impl CpuDevice {
    fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()),
        );
        let name = sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "CPU".into());

        Self {
            sys,
            components: Components::new_with_refreshed_list(),
            name,
            sensors: Vec::new(),
            last_refresh: None,
        }
    }

    fn is_fresh(&self) -> bool {
        self.last_refresh
            .is_some_and(|t| t.elapsed() < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)
    }
}

impl HardwareDevice for CpuDevice {
    fn class(&self) -> DeviceClass {
        DeviceClass::Cpu
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ProviderError> {
        if self.is_fresh() {
            return Ok(());
        }
        self.sys.refresh_cpu_all();
        self.components.refresh(true);
        self.last_refresh = Some(Instant::now());

        let mut sensors = Vec::with_capacity(self.sys.cpus().len() + 4);
        sensors.push(Sensor::new(
            MetricClass::Load,
            "CPU Total",
            Some(self.sys.global_cpu_usage()),
        ));

        let core_max = self
            .sys
            .cpus()
            .iter()
            .map(|c| c.cpu_usage())
            .fold(None, |max: Option<f32>, u| Some(max.map_or(u, |m| m.max(u))));
        sensors.push(Sensor::new(MetricClass::Load, "CPU Core Max", core_max));

        for (i, cpu) in self.sys.cpus().iter().enumerate() {
            sensors.push(Sensor::new(
                MetricClass::Load,
                format!("CPU Core #{}", i + 1),
                Some(cpu.cpu_usage()),
            ));
        }
        for (i, cpu) in self.sys.cpus().iter().enumerate() {
            sensors.push(Sensor::new(
                MetricClass::Clock,
                format!("CPU Core #{}", i + 1),
                Some(cpu.frequency() as f32),
            ));
        }

        sensors.extend(thermal_sensors(&self.components, DeviceClass::Cpu));

        debug!("sysinfo CPU: {} sensores", sensors.len());
        self.sensors = sensors;
        Ok(())
    }

    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}

// ──────────────────────────────────────────────
// Memória
// ──────────────────────────────────────────────

struct MemoryDevice {
    sys: System,
    sensors: Vec<Sensor>,
}

impl MemoryDevice {
    fn new() -> Self {
        Self {
            sys: System::new_with_specifics(
                RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
            ),
            sensors: Vec::new(),
        }
    }
}

impl HardwareDevice for MemoryDevice {
    fn class(&self) -> DeviceClass {
        DeviceClass::Memory
    }

    fn name(&self) -> &str {
        "Generic Memory"
    }

    fn update(&mut self) -> Result<(), ProviderError> {
        self.sys.refresh_memory();

        let total = self.sys.total_memory() as f64;
        let used = self.sys.used_memory() as f64;
        let available = self.sys.available_memory() as f64;
        let percent = if total > 0.0 {
            Some((used / total * 100.0) as f32)
        } else {
            None
        };

        self.sensors = vec![
            Sensor::new(MetricClass::Load, "Memory", percent),
            Sensor::new(MetricClass::Data, "Memory Used", Some((used / GIB) as f32)),
            Sensor::new(
                MetricClass::Data,
                "Memory Available",
                Some((available / GIB) as f32),
            ),
        ];
        Ok(())
    }

    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}

// ──────────────────────────────────────────────
// GPU / Motherboard (somente temperatura)
// ──────────────────────────────────────────────

struct ThermalDevice {
    class: DeviceClass,
    name: String,
    components: Components,
    sensors: Vec<Sensor>,
}

impl ThermalDevice {
    fn new(class: DeviceClass) -> Self {
        Self {
            class,
            name: class.to_string(),
            components: Components::new_with_refreshed_list(),
            sensors: Vec::new(),
        }
    }
}

impl HardwareDevice for ThermalDevice {
    fn class(&self) -> DeviceClass {
        self.class
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ProviderError> {
        self.components.refresh(true);
        self.sensors = thermal_sensors(&self.components, self.class).collect();
        Ok(())
    }

    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn classifies_gpu_driver_labels() {
        assert_eq!(classify_component("amdgpu edge"), Some(DeviceClass::GpuAmd));
        assert_eq!(classify_component("nouveau temp1"), Some(DeviceClass::GpuNvidia));
        assert_eq!(classify_component("i915 pkg"), Some(DeviceClass::GpuIntel));
    }

    #[test]
    fn classifies_cpu_and_board_labels() {
        assert_eq!(classify_component("k10temp Tctl"), Some(DeviceClass::Cpu));
        assert_eq!(classify_component("coretemp Package id 0"), Some(DeviceClass::Cpu));
        assert_eq!(classify_component("acpitz temp1"), Some(DeviceClass::Motherboard));
        assert_eq!(classify_component("nct6798 CPU Fan"), None);
    }

    fn core_max(device: &CpuDevice) -> Option<f32> {
        device
            .sensors()
            .iter()
            .find(|s| s.name == "CPU Core Max")
            .and_then(|s| s.value)
    }

    #[test]
    fn back_to_back_cpu_updates_reuse_last_refresh() {
        let mut cpu = CpuDevice::new();
        cpu.update().unwrap();
        let first = cpu.sensors().to_vec();
        let first_max = core_max(&cpu);
        let refreshed_at = cpu.last_refresh;
        assert!(refreshed_at.is_some());

        cpu.update().unwrap();
        cpu.update().unwrap();
        assert_eq!(cpu.last_refresh, refreshed_at);
        assert_eq!(core_max(&cpu), first_max);
        assert_eq!(cpu.sensors(), first.as_slice());
    }

    #[test]
    fn cpu_refreshes_again_after_minimum_interval() {
        let mut cpu = CpuDevice::new();
        cpu.update().unwrap();
        let refreshed_at = cpu.last_refresh;

        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL + Duration::from_millis(20));
        cpu.update().unwrap();
        assert!(cpu.last_refresh > refreshed_at);
    }
}
