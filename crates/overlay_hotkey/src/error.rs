//! Erros do subsistema de atalhos globais.

use crate::keys::Hotkey;
use crate::registry::HotkeyId;

/// Falha reportada pelo serviço de atalhos do sistema operacional.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OsError {
    /// Código de erro bruto do SO (HRESULT no Windows).
    #[error("código de erro do SO 0x{code:08X}")]
    Code { code: i32 },

    #[error("atalhos globais não suportados nesta plataforma")]
    Unsupported,
}

/// Erros de registro e remoção de atalhos.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("Falha ao registrar o atalho {hotkey}: {source}")]
    Registration { hotkey: Hotkey, source: OsError },

    #[error("Falha ao remover o atalho {id}: {source}")]
    Unregistration { id: HotkeyId, source: OsError },

    #[error("Atalho {0} já registrado por este processo")]
    AlreadyRegistered(Hotkey),

    #[error("Identificadores de atalho esgotados")]
    IdsExhausted,
}
