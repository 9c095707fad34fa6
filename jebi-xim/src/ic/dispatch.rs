//! The per-key decision tree.

use encoding_rs::Encoding;
use jebi_engine::{CompositionHooks, TransitionContext, jamo};
use tracing::trace;

use crate::backend::{Backend, IcAddr};
use crate::config::InputMode;
use crate::connection::charset_accepts;
use crate::keysym::{Keysym, mask};
use crate::server::Server;

/// Transition filter applied per key: the auto-reorder policy plus charset
/// validation, so nothing the client locale cannot carry ever enters the
/// preedit.
pub(super) struct IcHooks {
    pub auto_reorder: bool,
    pub charset: Option<&'static Encoding>,
}

impl CompositionHooks for IcHooks {
    fn translate(&self, key: u8, jamo: char) {
        trace!("translate: '{}' -> {jamo}", key as char);
    }

    fn transition(&self, jamo_ch: char, ctx: &TransitionContext<'_>) -> bool {
        if !self.auto_reorder {
            if jamo::is_choseong(jamo_ch) && (ctx.has_jungseong || ctx.has_jongseong) {
                return false;
            }
            if jamo::is_jungseong(jamo_ch) && ctx.has_jongseong {
                return false;
            }
        }

        let ok = charset_accepts(self.charset, ctx.preedit);
        trace!("transition: {}: {ok}", ctx.preedit);
        ok
    }
}

impl Server {
    /// Handle one KeyPress. An unconsumed event is forwarded to the client
    /// by the transport.
    pub fn key_press(
        &mut self,
        addr: IcAddr,
        keysym: Keysym,
        state: u32,
        backend: &mut dyn Backend,
    ) -> bool {
        let Some(ic) = self.ic(addr) else {
            return false;
        };

        // An open candidate window captures everything.
        if ic.candidate.is_some() {
            return self.process_candidate_key(addr, keysym, backend);
        }

        if self.is_trigger_key(keysym, state) {
            let mode = match ic.mode {
                InputMode::Direct => InputMode::Compose,
                InputMode::Compose => InputMode::Direct,
            };
            self.set_mode(addr, mode, backend);
            return true;
        }

        // Bare shift never commits and is silently ignored.
        if keysym.is_shift() {
            return false;
        }

        // For vi users: the off-key drops to direct mode and the event
        // still reaches the client.
        if self.is_off_key(keysym, state) {
            self.set_mode(addr, InputMode::Direct, backend);
            return false;
        }

        if self.ic(addr).map(|ic| ic.mode) != Some(InputMode::Compose) {
            return false;
        }

        if self.is_candidate_key(keysym, state) {
            self.request_client_text(addr, backend);
            let key = self.ic(addr).map(|ic| ic.preedit_text()).unwrap_or_default();
            return self.popup_candidate_window(addr, &key, backend);
        }

        // A modifier chord belongs to the client; release the composition
        // in front of it.
        if state & mask::BYPASS != 0 {
            let empty = self.ic(addr).map(|ic| ic.is_empty()).unwrap_or(true);
            if !empty {
                self.ic_flush(addr, backend);
            }
            return false;
        }

        if keysym == Keysym::BACKSPACE {
            return self.backspace(addr, backend);
        }

        let keysym = self.normalize_keysym(keysym);
        if keysym.is_printable() {
            let hooks = IcHooks {
                auto_reorder: self.settings.input.auto_reorder,
                charset: self.connection(addr.conn).and_then(|c| c.charset()),
            };
            let consumed = {
                let Some(ic) = self.ic_mut(addr) else {
                    return false;
                };
                let Some(ch) = keysym.to_char() else {
                    return false;
                };
                ic.hic.process(ch, &hooks)
            };
            self.ic_commit(addr, backend);
            self.preedit_update(addr, backend);
            return consumed;
        }

        self.ic_flush(addr, backend);
        false
    }

    /// The automaton eats backspace first; only once it is empty does the
    /// preedit buffer give up its last scalar.
    fn backspace(&mut self, addr: IcAddr, backend: &mut dyn Backend) -> bool {
        let consumed = {
            let Some(ic) = self.ic_mut(addr) else {
                return false;
            };
            if ic.hic.backspace() {
                true
            } else {
                let len = ic.preedit.buffer.len();
                if len > 0 {
                    ic.preedit.buffer.erase(len - 1, 1);
                    true
                } else {
                    false
                }
            }
        };
        if consumed {
            self.preedit_update(addr, backend);
        }
        consumed
    }
}
