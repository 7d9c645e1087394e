//! Diagnóstico de panics na fronteira do processo.
//!
//! O payload de um panic é `Box<dyn Any>`; só `&str` e `String` têm forma
//! conhecida. Qualquer outro tipo é tratado como opaco.

use std::any::Any;
use tracing::error;

/// Texto usado quando o payload não é uma string.
pub const OPAQUE_PAYLOAD: &str = "<payload de panic não textual>";

/// Extrai a mensagem de um payload de panic sem assumir seu tipo.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        OPAQUE_PAYLOAD.to_string()
    }
}

/// Instala um panic hook que registra panics não tratados via `tracing`.
///
/// O hook padrão continua sendo chamado depois do log.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "?".into());
        error!("Panic não tratado em {location}: {message}");
        default_hook(info);
    }));
}
