//! Serviço de atalhos globais do sistema operacional.

use crate::error::OsError;
use crate::keys::{Modifiers, VirtualKey};
use crate::registry::HotkeyId;

/// Vínculo exclusivo de combinações de teclas a um alvo nativo (janela ou
/// thread do message loop).
pub trait HotkeyBackend {
    fn bind(&mut self, id: HotkeyId, modifiers: Modifiers, key: VirtualKey) -> Result<(), OsError>;

    fn unbind(&mut self, id: HotkeyId) -> Result<(), OsError>;
}

/// Backend para plataformas sem atalhos globais: todo `bind` falha.
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

impl HotkeyBackend for UnsupportedBackend {
    fn bind(&mut self, _id: HotkeyId, _modifiers: Modifiers, _key: VirtualKey) -> Result<(), OsError> {
        Err(OsError::Unsupported)
    }

    fn unbind(&mut self, _id: HotkeyId) -> Result<(), OsError> {
        Err(OsError::Unsupported)
    }
}
