//! Contrato do provedor de hardware.
//!
//! Um provedor expõe dispositivos por classe; cada dispositivo precisa de um
//! `update()` explícito (síncrono e possivelmente lento) antes que seus
//! sensores reflitam o estado atual.

use overlay_core::types::{DeviceClass, MetricClass};

/// Erros do provedor de hardware.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provedor {0} não suportado nesta plataforma")]
    Unsupported(&'static str),

    #[error("Provedor {provider} indisponível: {detail}")]
    Unavailable {
        provider: &'static str,
        detail: String,
    },

    #[error("Falha ao atualizar {device}: {detail}")]
    Refresh { device: String, detail: String },
}

/// Um sensor nomeado e tipado. `value` ausente significa sem leitura.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub metric: MetricClass,
    pub name: String,
    pub value: Option<f32>,
}

impl Sensor {
    pub fn new(metric: MetricClass, name: impl Into<String>, value: Option<f32>) -> Self {
        Self {
            metric,
            name: name.into(),
            value,
        }
    }
}

/// Um componente de hardware (CPU, memória, uma GPU...).
pub trait HardwareDevice {
    fn class(&self) -> DeviceClass;

    /// Nome amigável (ex: "AMD Ryzen 7 5800X").
    fn name(&self) -> &str;

    /// Atualiza os sensores. Bloqueante.
    fn update(&mut self) -> Result<(), ProviderError>;

    /// Sensores conforme o último `update()`.
    fn sensors(&self) -> &[Sensor];
}

/// Fonte de dispositivos de hardware.
pub trait HardwareProvider {
    /// Nome curto para logs.
    fn name(&self) -> &'static str;

    /// Conecta ao hardware e enumera dispositivos das classes pedidas.
    fn open(&mut self, classes: &[DeviceClass]) -> Result<(), ProviderError>;

    fn devices_mut(&mut self) -> &mut [Box<dyn HardwareDevice>];
}
