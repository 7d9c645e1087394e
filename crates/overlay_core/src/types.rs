//! Tipos compartilhados entre o sampler, o host e a configuração.

use serde::{Deserialize, Serialize};
use std::fmt;

// ──────────────────────────────────────────────
// Classes de hardware
// ──────────────────────────────────────────────

/// Categoria de dispositivo exposta por um provedor de hardware.
///
/// Os nomes seguem o `HardwareType` do LibreHardwareMonitor, o que permite
/// escrever `devices = ["GpuNvidia", "GpuAmd"]` direto no `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Cpu,
    Memory,
    GpuNvidia,
    GpuAmd,
    GpuIntel,
    Motherboard,
    Storage,
}

impl DeviceClass {
    /// Ordem fixa de sondagem dos fabricantes de GPU.
    pub const GPU_VENDORS: [DeviceClass; 3] =
        [DeviceClass::GpuNvidia, DeviceClass::GpuAmd, DeviceClass::GpuIntel];
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceClass::Cpu => "CPU",
            DeviceClass::Memory => "Memory",
            DeviceClass::GpuNvidia => "GPU NVIDIA",
            DeviceClass::GpuAmd => "GPU AMD",
            DeviceClass::GpuIntel => "GPU Intel",
            DeviceClass::Motherboard => "Motherboard",
            DeviceClass::Storage => "Storage",
        };
        f.write_str(name)
    }
}

/// Tipo de grandeza medida por um sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricClass {
    Load,
    Temperature,
    Clock,
    Power,
    Voltage,
    Fan,
    Data,
    Other,
}

impl MetricClass {
    /// Converte o `SensorType` textual do LHM. Tipos desconhecidos viram `Other`.
    pub fn from_sensor_type(sensor_type: &str) -> Self {
        match sensor_type {
            "Load" => MetricClass::Load,
            "Temperature" => MetricClass::Temperature,
            "Clock" => MetricClass::Clock,
            "Power" => MetricClass::Power,
            "Voltage" => MetricClass::Voltage,
            "Fan" => MetricClass::Fan,
            "Data" | "SmallData" => MetricClass::Data,
            _ => MetricClass::Other,
        }
    }
}

// ──────────────────────────────────────────────
// Política de seleção
// ──────────────────────────────────────────────

/// Política de seleção de um sensor entre vários candidatos.
///
/// - `devices`: classes sondadas em ordem; a primeira presente é usada e a
///   sondagem para ali, mesmo que nenhum sensor seja encontrado nela.
/// - `metric`: classe de métrica exigida.
/// - `name_hints`: substrings em ordem de prioridade (case-insensitive). Sem
///   match, vale o primeiro sensor da classe de métrica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorQuery {
    pub devices: Vec<DeviceClass>,
    pub metric: MetricClass,
    #[serde(default)]
    pub name_hints: Vec<String>,
}

impl SensorQuery {
    pub fn new(devices: &[DeviceClass], metric: MetricClass) -> Self {
        Self {
            devices: devices.to_vec(),
            metric,
            name_hints: Vec::new(),
        }
    }

    pub fn with_hints(mut self, hints: &[&str]) -> Self {
        self.name_hints = hints.iter().map(|h| (*h).to_string()).collect();
        self
    }

    /// Carga agregada da CPU.
    pub fn cpu_load() -> Self {
        Self::new(&[DeviceClass::Cpu], MetricClass::Load).with_hints(&["Total"])
    }

    /// Carga do core mais ocupado.
    pub fn cpu_core_max() -> Self {
        Self::new(&[DeviceClass::Cpu], MetricClass::Load).with_hints(&["Core Max"])
    }

    /// Temperatura da CPU: nomes AMD (`Tctl`/`Tdie`) antes do pacote Intel.
    pub fn cpu_temperature() -> Self {
        Self::new(&[DeviceClass::Cpu], MetricClass::Temperature)
            .with_hints(&["Tctl", "Tdie", "Package"])
    }

    pub fn memory_load() -> Self {
        Self::new(&[DeviceClass::Memory], MetricClass::Load)
    }

    pub fn gpu_load() -> Self {
        Self::new(&DeviceClass::GPU_VENDORS, MetricClass::Load).with_hints(&["Core", "Total"])
    }

    pub fn gpu_temperature() -> Self {
        Self::new(&DeviceClass::GPU_VENDORS, MetricClass::Temperature).with_hints(&["Core"])
    }
}

// ──────────────────────────────────────────────
// Leituras
// ──────────────────────────────────────────────

/// Valor arredondado de uma consulta, recalculado a cada amostra.
///
/// `present == false` indica que o valor é o sentinela `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub value: i32,
    pub present: bool,
}

impl TelemetryReading {
    /// Sentinela: nenhuma leitura real disponível.
    pub const ABSENT: TelemetryReading = TelemetryReading {
        value: 0,
        present: false,
    };

    /// Converte o valor opcional de um sensor. Ausente ou não finito → sentinela.
    pub fn from_sensor_value(value: Option<f32>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self {
                value: round_half_up(v),
                present: true,
            },
            _ => Self::ABSENT,
        }
    }
}

/// Arredonda para o inteiro mais próximo, meio para cima (42.5 → 43, -0.5 → 0).
///
/// Valores acima de 100 são preservados.
pub fn round_half_up(value: f32) -> i32 {
    (f64::from(value) + 0.5).floor() as i32
}

/// Leituras de um ciclo do overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySnapshot {
    pub cpu_load: TelemetryReading,
    pub cpu_core_max: TelemetryReading,
    pub cpu_temp: TelemetryReading,
    pub memory_load: TelemetryReading,
    pub gpu_load: TelemetryReading,
    pub gpu_temp: TelemetryReading,
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(42.6), 43);
        assert_eq!(round_half_up(42.5), 43);
        assert_eq!(round_half_up(42.4), 42);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn values_above_100_are_kept() {
        let reading = TelemetryReading::from_sensor_value(Some(104.7));
        assert_eq!(reading.value, 105);
        assert!(reading.present);
    }

    #[test]
    fn missing_or_nan_is_sentinel() {
        assert_eq!(TelemetryReading::from_sensor_value(None), TelemetryReading::ABSENT);
        assert_eq!(
            TelemetryReading::from_sensor_value(Some(f32::NAN)),
            TelemetryReading::ABSENT
        );
    }

    #[test]
    fn gpu_queries_probe_vendors_in_fixed_order() {
        let q = SensorQuery::gpu_load();
        assert_eq!(
            q.devices,
            vec![DeviceClass::GpuNvidia, DeviceClass::GpuAmd, DeviceClass::GpuIntel]
        );
        assert_eq!(q.name_hints, vec!["Core", "Total"]);
    }

    #[test]
    fn lhm_sensor_types_map_to_metrics() {
        assert_eq!(MetricClass::from_sensor_type("Load"), MetricClass::Load);
        assert_eq!(MetricClass::from_sensor_type("SmallData"), MetricClass::Data);
        assert_eq!(MetricClass::from_sensor_type("Throughput"), MetricClass::Other);
    }
}
