//! # Overlay Hotkey
//!
//! Atalhos de teclado globais (válidos mesmo sem foco na janela) despachados
//! a partir do message loop do host.
//!
//! ## Módulos
//! - [`keys`] – Modificadores, virtual-keys e o formato `"Ctrl+Shift+F10"`
//! - [`registry`] – [`HotkeyRegistry`]: registro, remoção e dispatch
//! - [`backend`] – Contrato com o serviço de atalhos do SO
//! - `win32` – `RegisterHotKey`/`UnregisterHotKey` (Windows only)

pub mod backend;
pub mod error;
pub mod keys;
pub mod registry;
#[cfg(windows)]
pub mod win32;

pub use backend::{HotkeyBackend, UnsupportedBackend};
pub use error::{HotkeyError, OsError};
pub use keys::{Hotkey, KeyParseError, Modifiers, VirtualKey};
pub use registry::{HotkeyCallback, HotkeyId, HotkeyRegistry, NativeMessage, WM_HOTKEY};
#[cfg(windows)]
pub use win32::Win32Backend;
