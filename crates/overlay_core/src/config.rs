//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável define o provedor de sensores,
//! as políticas de seleção, o atalho global e o comportamento do overlay.

use crate::types::{DeviceClass, SensorQuery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Erros ao persistir a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro de serialização TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro ao escrever {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Políticas de seleção de cada leitura exibida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub cpu_load: SensorQuery,
    pub cpu_core_max: SensorQuery,
    pub cpu_temp: SensorQuery,
    pub memory_load: SensorQuery,
    pub gpu_load: SensorQuery,
    pub gpu_temp: SensorQuery,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cpu_load: SensorQuery::cpu_load(),
            cpu_core_max: SensorQuery::cpu_core_max(),
            cpu_temp: SensorQuery::cpu_temperature(),
            memory_load: SensorQuery::memory_load(),
            gpu_load: SensorQuery::gpu_load(),
            gpu_temp: SensorQuery::gpu_temperature(),
        }
    }
}

/// Configuração do sampler de telemetria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Provedor: "auto", "lhm" ou "sysinfo"
    pub provider: String,
    /// Intervalo entre amostras em segundos
    pub interval_secs: f64,
    /// Amostrar numa thread dedicada em vez da thread do message loop
    pub background: bool,
    /// Classes de dispositivo monitoradas (declaradas na abertura do provedor)
    pub monitored: Vec<DeviceClass>,
    /// Políticas de seleção por leitura
    pub queries: QueryConfig,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            provider: "auto".into(),
            interval_secs: 1.0,
            background: false,
            monitored: vec![
                DeviceClass::Cpu,
                DeviceClass::GpuNvidia,
                DeviceClass::GpuAmd,
                DeviceClass::GpuIntel,
                DeviceClass::Memory,
                DeviceClass::Motherboard,
            ],
            queries: QueryConfig::default(),
        }
    }
}

/// Configuração do atalho global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Combinação que alterna a visibilidade (ex: "F10", "Ctrl+Shift+P")
    pub toggle: String,
    /// Falha no registro encerra o aplicativo
    pub required: bool,
    /// Suprime auto-repeat enquanto a tecla está pressionada
    pub no_repeat: bool,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            toggle: "F10".into(),
            required: false,
            no_repeat: true,
        }
    }
}

/// Configuração da renderização do overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub start_visible: bool,
    /// Exibe a carga do core mais ocupado ao lado da carga total
    pub show_core_max: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            start_visible: true,
            show_core_max: true,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampler: SamplerConfig,
    pub hotkey: HotkeyConfig,
    pub overlay: OverlayConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML. Erros caem na configuração padrão.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !matches!(self.sampler.provider.as_str(), "auto" | "lhm" | "sysinfo") {
            errors.push(format!(
                "Provedor desconhecido: {} (auto, lhm, sysinfo)",
                self.sampler.provider
            ));
        }
        if self.sampler.interval_secs < 0.1 || self.sampler.interval_secs > 60.0 {
            errors.push(format!(
                "Intervalo do sampler inválido: {} (0.1–60.0)",
                self.sampler.interval_secs
            ));
        }
        if self.sampler.monitored.is_empty() {
            errors.push("Nenhuma classe de dispositivo monitorada".into());
        }

        let q = &self.sampler.queries;
        for (name, query) in [
            ("cpu_load", &q.cpu_load),
            ("cpu_core_max", &q.cpu_core_max),
            ("cpu_temp", &q.cpu_temp),
            ("memory_load", &q.memory_load),
            ("gpu_load", &q.gpu_load),
            ("gpu_temp", &q.gpu_temp),
        ] {
            if query.devices.is_empty() {
                errors.push(format!("Consulta {name} sem classes de dispositivo"));
            }
            if query.name_hints.iter().any(|h| h.trim().is_empty()) {
                errors.push(format!("Consulta {name} contém dica de nome vazia"));
            }
        }

        if self.hotkey.toggle.trim().is_empty() {
            errors.push("Atalho de visibilidade vazio".into());
        }

        errors
    }
}
