//! Backend Win32: `RegisterHotKey` / `UnregisterHotKey`.
//!
//! Sem janela, o SO posta `WM_HOTKEY` na fila da thread que registrou; a
//! mensagem só chega ao message loop dessa thread.

use crate::backend::HotkeyBackend;
use crate::error::OsError;
use crate::keys::{Modifiers, VirtualKey};
use crate::registry::HotkeyId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    HOT_KEY_MODIFIERS, MOD_NOREPEAT, RegisterHotKey, UnregisterHotKey,
};

fn os_error(e: windows::core::Error) -> OsError {
    OsError::Code { code: e.code().0 }
}

/// Backend vinculado à fila de mensagens de uma thread.
#[derive(Debug)]
pub struct Win32Backend {
    no_repeat: bool,
}

impl Win32Backend {
    /// `WM_HOTKEY` chega com `hwnd` nulo na fila da thread atual.
    pub fn for_current_thread() -> Self {
        Self { no_repeat: true }
    }

    /// Com `MOD_NOREPEAT`, segurar a tecla não gera mensagens repetidas.
    pub fn with_no_repeat(mut self, no_repeat: bool) -> Self {
        self.no_repeat = no_repeat;
        self
    }
}

impl HotkeyBackend for Win32Backend {
    fn bind(&mut self, id: HotkeyId, modifiers: Modifiers, key: VirtualKey) -> Result<(), OsError> {
        let mut flags = HOT_KEY_MODIFIERS(modifiers.bits());
        if self.no_repeat {
            flags = flags | MOD_NOREPEAT;
        }
        // Ids ficam em 1..=0xBFFF, cabem em i32
        unsafe { RegisterHotKey(None, id.get() as i32, flags, key.0) }.map_err(os_error)
    }

    fn unbind(&mut self, id: HotkeyId) -> Result<(), OsError> {
        unsafe { UnregisterHotKey(None, id.get() as i32) }.map_err(os_error)
    }
}
