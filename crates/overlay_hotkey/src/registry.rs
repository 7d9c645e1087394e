//! Registro de atalhos globais e dispatch a partir do message loop.
//!
//! O registro é dono exclusivo do mapa id → callback e vive na thread do
//! message loop; por isso não há locks e os callbacks não precisam ser `Send`.
//! Ids são atribuídos de forma monotônica e nunca reutilizados, mesmo depois
//! de um `unregister`.

use crate::backend::HotkeyBackend;
use crate::error::HotkeyError;
use crate::keys::{Hotkey, Modifiers, VirtualKey};
use overlay_core::diagnostics::panic_message;
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error, info, warn};

/// Mensagem nativa que sinaliza um atalho global pressionado (`WM_HOTKEY`).
pub const WM_HOTKEY: u32 = 0x0312;

/// Maior id aceito pelo `RegisterHotKey` para aplicações.
pub const MAX_HOTKEY_ID: u32 = 0xBFFF;

/// Identificador de um atalho registrado. Sempre positivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotkeyId(u32);

impl HotkeyId {
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HotkeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mensagem recebida pelo message loop do host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMessage {
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl NativeMessage {
    /// `WM_HOTKEY` para o id dado, como o SO entregaria.
    pub fn hotkey(id: HotkeyId) -> Self {
        Self {
            message: WM_HOTKEY,
            wparam: id.get() as usize,
            lparam: 0,
        }
    }
}

/// Ação associada a um atalho.
pub type HotkeyCallback = Box<dyn FnMut()>;

struct Registration {
    hotkey: Hotkey,
    callback: HotkeyCallback,
}

/// Ponte entre atalhos globais do SO e callbacks do processo.
pub struct HotkeyRegistry<B: HotkeyBackend> {
    backend: B,
    next_id: u32,
    registrations: HashMap<HotkeyId, Registration>,
}

impl<B: HotkeyBackend> HotkeyRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            next_id: 1,
            registrations: HashMap::new(),
        }
    }

    /// Pede ao SO o vínculo exclusivo da combinação e guarda o callback.
    pub fn register<F>(
        &mut self,
        key: VirtualKey,
        modifiers: Modifiers,
        callback: F,
    ) -> Result<HotkeyId, HotkeyError>
    where
        F: FnMut() + 'static,
    {
        self.register_hotkey(Hotkey::new(modifiers, key), callback)
    }

    pub fn register_hotkey<F>(&mut self, hotkey: Hotkey, callback: F) -> Result<HotkeyId, HotkeyError>
    where
        F: FnMut() + 'static,
    {
        if self.registrations.values().any(|r| r.hotkey == hotkey) {
            let err = HotkeyError::AlreadyRegistered(hotkey);
            warn!("{err}");
            return Err(err);
        }
        if self.next_id > MAX_HOTKEY_ID {
            error!("{}", HotkeyError::IdsExhausted);
            return Err(HotkeyError::IdsExhausted);
        }

        // O id é consumido mesmo se o SO recusar: nunca é reutilizado
        let id = HotkeyId(self.next_id);
        self.next_id += 1;

        if let Err(source) = self.backend.bind(id, hotkey.modifiers, hotkey.key) {
            let err = HotkeyError::Registration { hotkey, source };
            error!("{err}");
            return Err(err);
        }

        self.registrations.insert(
            id,
            Registration {
                hotkey,
                callback: Box::new(callback),
            },
        );
        info!("✓ Atalho {hotkey} registrado ({id})");
        Ok(id)
    }

    /// Libera o atalho. Id desconhecido é no-op.
    ///
    /// Se o SO recusar, a entrada permanece no mapa e o erro é devolvido.
    pub fn unregister(&mut self, id: HotkeyId) -> Result<(), HotkeyError> {
        let Some(hotkey) = self.registrations.get(&id).map(|r| r.hotkey) else {
            debug!("unregister de id desconhecido {id}");
            return Ok(());
        };

        if let Err(source) = self.backend.unbind(id) {
            let err = HotkeyError::Unregistration { id, source };
            warn!("{err}");
            return Err(err);
        }

        self.registrations.remove(&id);
        info!("Atalho {hotkey} removido ({id})");
        Ok(())
    }

    /// Filtro chamado para **toda** mensagem do message loop.
    ///
    /// Retorna `true` quando a mensagem foi consumida por um callback. Panics
    /// do callback são registrados e não saem daqui.
    pub fn dispatch(&mut self, msg: &NativeMessage) -> bool {
        if msg.message != WM_HOTKEY {
            return false;
        }

        let Ok(raw) = u32::try_from(msg.wparam) else {
            return false;
        };
        let id = HotkeyId(raw);
        let Some(registration) = self.registrations.get_mut(&id) else {
            debug!("WM_HOTKEY com id desconhecido {id}");
            return false;
        };

        let hotkey = registration.hotkey;
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| (registration.callback)())) {
            error!(
                "Callback do atalho {hotkey} ({id}) entrou em panic: {}",
                panic_message(payload.as_ref())
            );
        }
        true
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn contains(&self, id: HotkeyId) -> bool {
        self.registrations.contains_key(&id)
    }

    /// Combinação associada a um id ativo.
    pub fn hotkey(&self, id: HotkeyId) -> Option<Hotkey> {
        self.registrations.get(&id).map(|r| r.hotkey)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: HotkeyBackend> Drop for HotkeyRegistry<B> {
    fn drop(&mut self) {
        let mut ids: Vec<HotkeyId> = self.registrations.keys().copied().collect();
        ids.sort();
        for id in ids {
            if let Err(e) = self.backend.unbind(id) {
                warn!("Falha ao liberar o atalho {id} no encerramento: {e}");
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OsError;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// `ERROR_HOTKEY_ALREADY_REGISTERED` como HRESULT.
    const ALREADY_CLAIMED: i32 = 0x8007_0581_u32 as i32;

    #[derive(Default)]
    struct FakeBackend {
        bound: HashMap<HotkeyId, (Modifiers, VirtualKey)>,
        fail_bind: Option<i32>,
        fail_unbind: Option<i32>,
        calls: usize,
        unbound: Rc<RefCell<Vec<HotkeyId>>>,
    }

    impl HotkeyBackend for FakeBackend {
        fn bind(&mut self, id: HotkeyId, modifiers: Modifiers, key: VirtualKey) -> Result<(), OsError> {
            self.calls += 1;
            if let Some(code) = self.fail_bind {
                return Err(OsError::Code { code });
            }
            self.bound.insert(id, (modifiers, key));
            Ok(())
        }

        fn unbind(&mut self, id: HotkeyId) -> Result<(), OsError> {
            self.calls += 1;
            if let Some(code) = self.fail_unbind {
                return Err(OsError::Code { code });
            }
            self.bound.remove(&id);
            self.unbound.borrow_mut().push(id);
            Ok(())
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        let a = registry.register(VirtualKey(0x41), Modifiers::ALT, || {}).unwrap();
        let b = registry.register(VirtualKey(0x42), Modifiers::ALT, || {}).unwrap();
        registry.unregister(a).unwrap();
        registry.unregister(b).unwrap();
        // Mesma combinação de `a` depois da remoção recebe id novo
        let c = registry.register(VirtualKey(0x41), Modifiers::ALT, || {}).unwrap();
        assert!(a.get() > 0);
        assert!(a < b && b < c);
    }

    #[test]
    fn failed_registration_consumes_id() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        registry.backend_mut().fail_bind = Some(ALREADY_CLAIMED);
        let err = registry
            .register(VirtualKey::F10, Modifiers::NONE, || {})
            .unwrap_err();
        assert_eq!(
            err,
            HotkeyError::Registration {
                hotkey: Hotkey::new(Modifiers::NONE, VirtualKey::F10),
                source: OsError::Code { code: ALREADY_CLAIMED },
            }
        );
        assert!(registry.is_empty());

        registry.backend_mut().fail_bind = None;
        let id = registry.register(VirtualKey::F10, Modifiers::NONE, || {}).unwrap();
        assert_eq!(id.get(), 2);
    }

    #[test]
    fn duplicate_combination_is_rejected_without_os_call() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        registry
            .register(VirtualKey::F10, Modifiers::CONTROL, || {})
            .unwrap();
        let calls = registry.backend().calls;
        let err = registry
            .register(VirtualKey::F10, Modifiers::CONTROL, || {})
            .unwrap_err();
        assert!(matches!(err, HotkeyError::AlreadyRegistered(_)));
        assert_eq!(registry.backend().calls, calls);
        // Mesma tecla com outros modificadores é outra combinação
        assert!(registry.register(VirtualKey::F10, Modifiers::SHIFT, || {}).is_ok());
    }

    #[test]
    fn non_hotkey_messages_are_ignored() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        let (count, cb) = counter();
        let id = registry.register(VirtualKey::F10, Modifiers::NONE, cb).unwrap();
        let calls = registry.backend().calls;

        const WM_TIMER: u32 = 0x0113;
        let msg = NativeMessage {
            message: WM_TIMER,
            wparam: id.get() as usize,
            lparam: 0,
        };
        for _ in 0..3 {
            assert!(!registry.dispatch(&msg));
        }
        assert_eq!(count.get(), 0);
        assert_eq!(registry.backend().calls, calls);
        assert!(registry.contains(id));
    }

    #[test]
    fn dispatch_runs_only_the_matching_callback() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        let (count_a, cb_a) = counter();
        let (count_b, cb_b) = counter();
        let a = registry.register(VirtualKey(0x41), Modifiers::ALT, cb_a).unwrap();
        let _b = registry.register(VirtualKey(0x42), Modifiers::ALT, cb_b).unwrap();

        assert!(registry.dispatch(&NativeMessage::hotkey(a)));
        assert_eq!(count_a.get(), 1);
        assert_eq!(count_b.get(), 0);
    }

    #[test]
    fn unknown_id_is_unhandled() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        let (count, cb) = counter();
        registry.register(VirtualKey::F10, Modifiers::NONE, cb).unwrap();
        assert!(!registry.dispatch(&NativeMessage::hotkey(HotkeyId(999))));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn unregister_unknown_id_is_noop() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        assert!(registry.unregister(HotkeyId(42)).is_ok());
        assert_eq!(registry.backend().calls, 0);
    }

    #[test]
    fn failed_unregistration_keeps_entry() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        let (count, cb) = counter();
        let id = registry.register(VirtualKey::F10, Modifiers::NONE, cb).unwrap();

        registry.backend_mut().fail_unbind = Some(5);
        let err = registry.unregister(id).unwrap_err();
        assert_eq!(
            err,
            HotkeyError::Unregistration {
                id,
                source: OsError::Code { code: 5 },
            }
        );
        assert!(registry.contains(id));
        assert!(registry.dispatch(&NativeMessage::hotkey(id)));
        assert_eq!(count.get(), 1);

        // Nova tentativa depois que o SO volta a responder
        registry.backend_mut().fail_unbind = None;
        registry.unregister(id).unwrap();
        assert!(!registry.contains(id));
    }

    #[test]
    fn panicking_callback_does_not_escape_dispatch() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        let id = registry
            .register(VirtualKey::F10, Modifiers::NONE, || panic!("overlay destruído"))
            .unwrap();
        assert!(registry.dispatch(&NativeMessage::hotkey(id)));
        // Continua utilizável
        assert!(registry.dispatch(&NativeMessage::hotkey(id)));
        assert!(registry.contains(id));
    }

    #[test]
    fn toggle_scenario_f10() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        let visible = Rc::new(Cell::new(true));
        let toggles = Rc::new(Cell::new(0));
        let (v, t) = (Rc::clone(&visible), Rc::clone(&toggles));
        let id = registry
            .register(VirtualKey::F10, Modifiers::NONE, move || {
                v.set(!v.get());
                t.set(t.get() + 1);
            })
            .unwrap();
        assert_eq!(
            registry.backend().bound.get(&id),
            Some(&(Modifiers::NONE, VirtualKey(0x79)))
        );

        let msg = NativeMessage::hotkey(id);
        assert!(registry.dispatch(&msg));
        assert_eq!(toggles.get(), 1);
        assert!(!visible.get());

        // Sem debounce
        assert!(registry.dispatch(&msg));
        assert_eq!(toggles.get(), 2);
        assert!(visible.get());

        registry.unregister(id).unwrap();
        assert!(!registry.dispatch(&msg));
        assert_eq!(toggles.get(), 2);
    }

    #[test]
    fn ids_run_out_at_win32_limit() {
        let mut registry = HotkeyRegistry::new(FakeBackend::default());
        registry.next_id = MAX_HOTKEY_ID;
        let last = registry.register(VirtualKey(0x41), Modifiers::ALT, || {}).unwrap();
        assert_eq!(last.get(), MAX_HOTKEY_ID);
        let err = registry
            .register(VirtualKey(0x42), Modifiers::ALT, || {})
            .unwrap_err();
        assert_eq!(err, HotkeyError::IdsExhausted);
    }

    #[test]
    fn drop_releases_remaining_bindings() {
        let backend = FakeBackend::default();
        let unbound = Rc::clone(&backend.unbound);
        {
            let mut registry = HotkeyRegistry::new(backend);
            let a = registry.register(VirtualKey(0x41), Modifiers::ALT, || {}).unwrap();
            registry.register(VirtualKey(0x42), Modifiers::ALT, || {}).unwrap();
            registry.unregister(a).unwrap();
        }
        assert_eq!(*unbound.borrow(), vec![HotkeyId(1), HotkeyId(2)]);
    }
}
