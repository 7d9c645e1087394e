//! Sensores detalhados via LibreHardwareMonitor WMI.
//!
//! Quando o LHM roda como admin ou serviço Windows, ele expõe **todos** os
//! sensores de hardware via WMI em `root\LibreHardwareMonitor`.
//!
//! Cada `Hardware` do LHM vira um dispositivo; `update()` relê os sensores
//! daquele hardware filtrando pelo `Parent`.
//!
//! ## Instalação do LHM como serviço
//! 1. Baixe LibreHardwareMonitor: <https://github.com/LibreHardwareMonitor/LibreHardwareMonitor>
//! 2. Execute como admin → Options → "Run On Windows Startup"
//!    **OU** instale como serviço via `sc create` / tarefa agendada.

use crate::provider::{HardwareDevice, HardwareProvider, ProviderError, Sensor};
use overlay_core::types::{DeviceClass, MetricClass};
use serde::Deserialize;
use std::rc::Rc;
use tracing::debug;
use wmi::{COMLibrary, WMIConnection};

const NAMESPACE: &str = "root\\LibreHardwareMonitor";

// ──────────────────────────────────────────────
// WMI structs de deserialização
// ──────────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct LhmHardware {
    identifier: String,
    name: String,
    hardware_type: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct LhmSensor {
    sensor_type: String,
    value: Option<f32>,
    name: String,
}

/// Mapeia o `HardwareType` do LHM. Tipos sem interesse (rede, bateria...) → `None`.
fn device_class(hardware_type: &str) -> Option<DeviceClass> {
    match hardware_type {
        "Cpu" => Some(DeviceClass::Cpu),
        "Memory" => Some(DeviceClass::Memory),
        "GpuNvidia" => Some(DeviceClass::GpuNvidia),
        "GpuAmd" => Some(DeviceClass::GpuAmd),
        "GpuIntel" => Some(DeviceClass::GpuIntel),
        "Motherboard" => Some(DeviceClass::Motherboard),
        "Storage" => Some(DeviceClass::Storage),
        _ => None,
    }
}

/// Escapa um literal para uso entre aspas simples numa consulta WQL.
fn wql_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

// ──────────────────────────────────────────────
// Provedor
// ──────────────────────────────────────────────

/// Provedor sobre o namespace WMI do LibreHardwareMonitor.
#[derive(Default)]
pub struct LhmProvider {
    devices: Vec<Box<dyn HardwareDevice>>,
}

impl LhmProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HardwareProvider for LhmProvider {
    fn name(&self) -> &'static str {
        "LHM WMI"
    }

    fn open(&mut self, classes: &[DeviceClass]) -> Result<(), ProviderError> {
        let unavailable = |detail: String| ProviderError::Unavailable {
            provider: "LHM WMI",
            detail,
        };

        let com = COMLibrary::new().map_err(|e| unavailable(format!("COM: {e}")))?;
        let wmi = WMIConnection::with_namespace_path(NAMESPACE, com)
            .map_err(|e| unavailable(format!("{NAMESPACE}: {e}")))?;
        let hardware: Vec<LhmHardware> = wmi
            .raw_query("SELECT Identifier, Name, HardwareType FROM Hardware")
            .map_err(|e| unavailable(format!("Hardware query: {e}")))?;

        if hardware.is_empty() {
            return Err(unavailable("nenhum hardware exposto (LHM não está rodando?)".into()));
        }

        let wmi = Rc::new(wmi);
        for hw in hardware {
            let Some(class) = device_class(&hw.hardware_type) else {
                continue;
            };
            if !classes.contains(&class) {
                continue;
            }
            debug!("LHM: {} ({}) → {class}", hw.name, hw.identifier);
            self.devices.push(Box::new(LhmDevice {
                class,
                identifier: hw.identifier,
                name: hw.name,
                wmi: Rc::clone(&wmi),
                sensors: Vec::new(),
            }));
        }

        Ok(())
    }

    fn devices_mut(&mut self) -> &mut [Box<dyn HardwareDevice>] {
        &mut self.devices
    }
}

// ──────────────────────────────────────────────
// Dispositivo
// ──────────────────────────────────────────────

struct LhmDevice {
    class: DeviceClass,
    identifier: String,
    name: String,
    wmi: Rc<WMIConnection>,
    sensors: Vec<Sensor>,
}

impl HardwareDevice for LhmDevice {
    fn class(&self) -> DeviceClass {
        self.class
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ProviderError> {
        let query = format!(
            "SELECT SensorType, Value, Name FROM Sensor WHERE Parent = '{}'",
            wql_literal(&self.identifier)
        );
        let sensors: Vec<LhmSensor> =
            self.wmi
                .raw_query(&query)
                .map_err(|e| ProviderError::Refresh {
                    device: self.name.clone(),
                    detail: e.to_string(),
                })?;

        self.sensors = sensors
            .into_iter()
            .map(|s| Sensor::new(MetricClass::from_sensor_type(&s.sensor_type), s.name, s.value))
            .collect();
        Ok(())
    }

    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}
