//! Thread de amostragem que envia snapshots para a thread do message loop.
//!
//! O sampler é construído dentro da própria thread (provedores como o WMI não
//! são `Send`). A thread termina quando o receiver é descartado.

use crate::provider::ProviderError;
use crate::sampler::{SamplerError, TelemetrySampler};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use overlay_core::diagnostics::panic_message;
use overlay_core::types::OverlaySnapshot;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Inicia a thread de amostragem. Retorna o receiver do channel.
///
/// Falha ao criar a thread, erro de abertura do provedor ou panic durante a
/// abertura são devolvidos ao chamador como `SamplerError::Initialization`
/// antes da thread começar a amostrar.
pub fn spawn_sampler_thread<F>(
    open: F,
    interval: Duration,
) -> Result<Receiver<OverlaySnapshot>, SamplerError>
where
    F: FnOnce() -> Result<TelemetrySampler, SamplerError> + Send + 'static,
{
    let (tx, rx) = bounded::<OverlaySnapshot>(4);
    let (ready_tx, ready_rx) = bounded::<Result<(), SamplerError>>(1);

    std::thread::Builder::new()
        .name("telemetry-sampler".into())
        .spawn(move || {
            let opened = catch_unwind(AssertUnwindSafe(open)).unwrap_or_else(|payload| {
                Err(thread_failure(format!(
                    "panic ao abrir o provedor: {}",
                    panic_message(payload.as_ref())
                )))
            });
            match opened {
                Ok(mut sampler) => {
                    let _ = ready_tx.send(Ok(()));
                    sampler_loop(&mut sampler, &tx, interval);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        })
        .map_err(|e| thread_failure(format!("falha ao criar thread: {e}")))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(rx),
        Ok(Err(e)) => Err(e),
        // Só acontece se a thread morrer sem responder
        Err(_) => Err(thread_failure("thread terminou durante a inicialização".into())),
    }
}

fn thread_failure(detail: String) -> SamplerError {
    SamplerError::Initialization {
        provider: "telemetry-sampler",
        source: ProviderError::Unavailable {
            provider: "telemetry-sampler",
            detail,
        },
    }
}

fn sampler_loop(sampler: &mut TelemetrySampler, tx: &Sender<OverlaySnapshot>, interval: Duration) {
    info!(
        "Amostragem em thread dedicada via {} – intervalo {:.1}s",
        sampler.provider_name(),
        interval.as_secs_f64()
    );

    loop {
        let cycle_start = Instant::now();

        let snapshot = sampler.snapshot();
        match tx.try_send(snapshot) {
            Ok(()) => {}
            // UI lenta: descarta o snapshot, o próximo é mais recente
            Err(TrySendError::Full(_)) => debug!("Channel cheio, descartando snapshot"),
            Err(TrySendError::Disconnected(_)) => {
                debug!("Receiver descartado, encerrando amostragem");
                return;
            }
        }

        // Dormir pelo tempo restante do intervalo
        let elapsed = cycle_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }
}

/// Último snapshot disponível no channel, descartando os anteriores.
pub fn latest_snapshot(rx: &Receiver<OverlaySnapshot>) -> Option<OverlaySnapshot> {
    rx.try_iter().last()
}
