//! # Perf Overlay
//!
//! Overlay de desempenho: amostra CPU, GPU e memória em intervalo fixo e
//! alterna a visibilidade com um atalho global (F10 por padrão).
//!
//! ## Uso
//! ```bash
//! perf_overlay.exe          # Loop contínuo
//! perf_overlay.exe --once   # Uma amostra e sai
//! ```
//!
//! Sensores térmicos no Windows exigem o LibreHardwareMonitor rodando e,
//! em geral, privilégios de administrador.

mod host;

use overlay_core::config::AppConfig;
use overlay_core::diagnostics;
use overlay_core::format::render_line;
use overlay_sampler::open_sampler;
use std::process::ExitCode;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    diagnostics::install_panic_hook();

    // ── Verificar Admin (Windows) ──
    #[cfg(windows)]
    {
        if !is_admin() {
            warn!("Sem privilégios de administrador: sensores térmicos podem ficar ausentes");
        }
    }

    // ── Configuração ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);
    if !config_path.exists() {
        match config.save(&config_path) {
            Ok(()) => info!("Config padrão salva em {}", config_path.display()),
            Err(e) => warn!("{e}"),
        }
    }
    for problem in config.validate() {
        warn!("config.toml: {problem}");
    }

    info!(
        "Provider: {} | Intervalo: {:.1}s | Atalho: {}",
        config.sampler.provider, config.sampler.interval_secs, config.hotkey.toggle
    );

    if std::env::args().any(|a| a == "--once") {
        return match open_sampler(&config.sampler) {
            Ok(mut sampler) => {
                let snapshot = sampler.snapshot();
                println!("{}", render_line(&snapshot, config.overlay.show_core_max));
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    match host::run(&config) {
        Ok(()) => {
            info!("Overlay encerrado");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

// ──────────────────────────────────────────────
// Windows: Verificação de admin
// ──────────────────────────────────────────────

#[cfg(windows)]
fn is_admin() -> bool {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{GetTokenInformation, TOKEN_ELEVATION, TOKEN_QUERY, TokenElevation};
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    unsafe {
        let mut token = HANDLE::default();
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
            return false;
        }

        let mut elevation = TOKEN_ELEVATION::default();
        let mut size = 0u32;
        let result = GetTokenInformation(
            token,
            TokenElevation,
            Some(&mut elevation as *mut _ as *mut _),
            std::mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut size,
        );

        let _ = CloseHandle(token);
        result.is_ok() && elevation.TokenIsElevated != 0
    }
}
