//! Host do overlay: timer de amostragem, message loop e renderização.
//!
//! Tudo roda na thread do message loop. Com `sampler.background = true`, só a
//! amostragem vai para uma thread dedicada; o dispatch de atalhos continua
//! aqui, onde o SO entrega o `WM_HOTKEY`.

use crossbeam_channel::Receiver;
use overlay_core::config::{AppConfig, HotkeyConfig, OverlayConfig, SamplerConfig};
use overlay_core::format::render_line;
use overlay_core::types::OverlaySnapshot;
use overlay_hotkey::{Hotkey, HotkeyBackend, HotkeyError, HotkeyId, HotkeyRegistry, KeyParseError};
use overlay_sampler::{SamplerError, TelemetrySampler, latest_snapshot, open_sampler, spawn_sampler_thread};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

/// Erros fatais de inicialização do host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    #[error("Atalho inválido em config.toml: {0}")]
    InvalidHotkey(#[from] KeyParseError),
}

// ──────────────────────────────────────────────
// Fonte de snapshots
// ──────────────────────────────────────────────

/// Amostragem na própria thread ou via channel de uma thread dedicada.
pub enum SnapshotSource {
    Inline(TelemetrySampler),
    Background {
        rx: Receiver<OverlaySnapshot>,
        last: OverlaySnapshot,
    },
}

impl SnapshotSource {
    pub fn open(config: &SamplerConfig, interval: Duration) -> Result<Self, HostError> {
        if config.background {
            let sampler_config = config.clone();
            let rx = spawn_sampler_thread(move || open_sampler(&sampler_config), interval)?;
            Ok(SnapshotSource::Background {
                rx,
                last: OverlaySnapshot::default(),
            })
        } else {
            let sampler = open_sampler(config)?;
            info!("Amostragem inline via {}", sampler.provider_name());
            Ok(SnapshotSource::Inline(sampler))
        }
    }

    /// Snapshot mais recente. Bloqueia durante o refresh no modo inline.
    pub fn next(&mut self) -> OverlaySnapshot {
        match self {
            SnapshotSource::Inline(sampler) => sampler.snapshot(),
            SnapshotSource::Background { rx, last } => {
                if let Some(snapshot) = latest_snapshot(rx) {
                    *last = snapshot;
                }
                *last
            }
        }
    }
}

const MIN_INTERVAL_SECS: f64 = 0.1;
const MAX_INTERVAL_SECS: f64 = 60.0;

/// Intervalo efetivo de amostragem.
///
/// Valores fora de 0.1–60 s são ajustados ao limite mais próximo e valores
/// não finitos voltam ao padrão; ambos os casos são registrados.
pub fn interval(config: &SamplerConfig) -> Duration {
    let requested = config.interval_secs;
    if !requested.is_finite() {
        let fallback = SamplerConfig::default().interval_secs;
        warn!("interval_secs = {requested} inválido, usando {fallback:.1}s");
        return Duration::from_secs_f64(fallback);
    }

    let secs = requested.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
    if secs != requested {
        warn!("interval_secs = {requested} fora de {MIN_INTERVAL_SECS}–{MAX_INTERVAL_SECS}s, usando {secs:.1}s");
    }
    Duration::from_secs_f64(secs)
}

// ──────────────────────────────────────────────
// Overlay
// ──────────────────────────────────────────────

/// Estado de visibilidade e renderização em texto.
pub struct Overlay {
    visible: Rc<Cell<bool>>,
    show_core_max: bool,
}

impl Overlay {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            visible: Rc::new(Cell::new(config.start_visible)),
            show_core_max: config.show_core_max,
        }
    }

    pub fn visibility(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.visible)
    }

    /// Linha a exibir, ou `None` com o overlay oculto.
    pub fn line(&self, snapshot: &OverlaySnapshot) -> Option<String> {
        self.visible
            .get()
            .then(|| render_line(snapshot, self.show_core_max))
    }

    pub fn render(&self, snapshot: &OverlaySnapshot) {
        if let Some(line) = self.line(snapshot) {
            println!("{line}");
        }
    }
}

/// Callback do atalho: alterna a visibilidade.
fn toggle_action(visible: Rc<Cell<bool>>) -> impl FnMut() + 'static {
    move || {
        let now = !visible.get();
        visible.set(now);
        info!("Overlay {}", if now { "visível" } else { "oculto" });
    }
}

/// Registra o atalho de visibilidade.
///
/// Falha é fatal só com `hotkey.required = true`; caso contrário o overlay
/// segue sem atalho.
pub fn register_toggle<B: HotkeyBackend>(
    registry: &mut HotkeyRegistry<B>,
    config: &HotkeyConfig,
    visible: Rc<Cell<bool>>,
) -> Result<Option<HotkeyId>, HostError> {
    let result = config
        .toggle
        .parse::<Hotkey>()
        .map_err(HostError::from)
        .and_then(|hotkey| {
            registry
                .register_hotkey(hotkey, toggle_action(visible))
                .map_err(HostError::from)
        });

    match result {
        Ok(id) => {
            info!("Atalho {} alterna o overlay", config.toggle);
            Ok(Some(id))
        }
        Err(e) if !config.required => {
            warn!("{e}");
            warn!("Continuando sem atalho de visibilidade");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// ──────────────────────────────────────────────
// Loop principal
// ──────────────────────────────────────────────

/// Message loop do Windows com timer de thread.
#[cfg(windows)]
pub fn run(config: &AppConfig) -> Result<(), HostError> {
    use overlay_hotkey::{NativeMessage, Win32Backend};
    use tracing::error;
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, KillTimer, MSG, SetTimer, TranslateMessage, WM_TIMER,
    };

    let interval = interval(&config.sampler);
    let mut source = SnapshotSource::open(&config.sampler, interval)?;
    let overlay = Overlay::new(&config.overlay);

    // Sem janela: WM_HOTKEY e WM_TIMER chegam na fila desta thread
    let backend = Win32Backend::for_current_thread().with_no_repeat(config.hotkey.no_repeat);
    let mut registry = HotkeyRegistry::new(backend);
    register_toggle(&mut registry, &config.hotkey, overlay.visibility())?;

    // Limitado a 60 s por `interval()`
    let interval_ms = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
    let timer = unsafe { SetTimer(None, 0, interval_ms, None) };
    if timer == 0 {
        error!("SetTimer falhou; overlay não será atualizado");
    }

    overlay.render(&source.next());

    let mut msg = MSG::default();
    loop {
        // 0 = WM_QUIT, -1 = erro
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if ret.0 == 0 {
            break;
        }
        if ret.0 == -1 {
            error!("GetMessageW falhou, encerrando message loop");
            break;
        }

        let native = NativeMessage {
            message: msg.message,
            wparam: msg.wParam.0,
            lparam: msg.lParam.0,
        };
        if registry.dispatch(&native) {
            continue;
        }

        if msg.message == WM_TIMER && msg.wParam.0 == timer {
            overlay.render(&source.next());
            continue;
        }

        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    if timer != 0 {
        let _ = unsafe { KillTimer(None, timer) };
    }
    Ok(())
}

/// Ticker portátil: sem message pump, sem atalhos globais.
#[cfg(not(windows))]
pub fn run(config: &AppConfig) -> Result<(), HostError> {
    use overlay_hotkey::UnsupportedBackend;
    use std::time::Instant;

    let interval = interval(&config.sampler);
    let mut source = SnapshotSource::open(&config.sampler, interval)?;
    let overlay = Overlay::new(&config.overlay);

    let mut registry = HotkeyRegistry::new(UnsupportedBackend);
    register_toggle(&mut registry, &config.hotkey, overlay.visibility())?;

    loop {
        let cycle_start = Instant::now();

        overlay.render(&source.next());

        // Dormir pelo tempo restante do intervalo
        let elapsed = cycle_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }
}
