//! The commit path: how finished text reaches the client.

use tracing::debug;

use crate::backend::{Backend, IcAddr};
use crate::server::Server;
use crate::wire::{InputStyle, WireText};

/// When text leaves the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStrategy {
    /// Send each automaton commit as it happens.
    Immediate,
    /// Accumulate in the preedit buffer and send whole words on syllable
    /// breaks.
    Word,
}

impl Server {
    fn commit_strategy(&self) -> CommitStrategy {
        if self.settings.input.commit_by_word {
            CommitStrategy::Word
        } else {
            CommitStrategy::Immediate
        }
    }

    /// Send `text` as an XIM commit.
    ///
    /// Callback-style preedits are cleared before the commit, as the
    /// protocol asks. The drawn styles clear afterwards: clearing first
    /// makes legacy clients flicker, and on Position-style gtk1 widgets it
    /// reorders the input.
    pub(super) fn commit_utf8(&mut self, addr: IcAddr, text: &str, backend: &mut dyn Backend) {
        let callbacks = self
            .ic(addr)
            .map(|ic| ic.input_style.contains(InputStyle::PREEDIT_CALLBACKS))
            .unwrap_or(false);

        if callbacks {
            self.preedit_clear(addr, backend);
        }

        debug!("commit: id = {}-{}, '{text}'", addr.conn, addr.ic);
        let encoded = self.encode_outbound(text, backend);
        backend.commit(addr, &encoded);

        if !callbacks {
            self.preedit_clear(addr, backend);
        }
    }

    /// Drain the automaton's commit string after a key was processed.
    pub(super) fn ic_commit(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        match self.commit_strategy() {
            CommitStrategy::Word => {
                let hic_empty = {
                    let Some(ic) = self.ic_mut(addr) else { return };
                    let committed = ic.hic.commit_string().to_owned();
                    ic.preedit.buffer.push_str(&committed);
                    ic.hic.is_empty()
                };
                // a syllable break emptied the automaton: the word is done
                if hic_empty {
                    self.ic_flush(addr, backend);
                }
            }
            CommitStrategy::Immediate => {
                let committed = {
                    let Some(ic) = self.ic(addr) else { return };
                    ic.hic.commit_string().to_owned()
                };
                if !committed.is_empty() {
                    self.commit_utf8(addr, &committed, backend);
                }
            }
        }
    }

    /// The complete pending composition: buffer plus flushed automaton.
    /// Empties both.
    pub(super) fn take_flush_string(&mut self, addr: IcAddr) -> String {
        let Some(ic) = self.ic_mut(addr) else {
            return String::new();
        };
        let mut text = ic.preedit.buffer.to_string();
        text.push_str(&ic.hic.flush());
        ic.preedit.buffer.clear();
        text
    }

    /// Commit everything still pending.
    pub fn ic_flush(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let text = self.take_flush_string(addr);
        if !text.is_empty() {
            self.commit_utf8(addr, &text, backend);
        }
    }

    /// Handle IMResetIC: the pending composition goes back in the reply
    /// rather than through a commit callback.
    pub fn reset_ic(&mut self, addr: IcAddr, backend: &mut dyn Backend) -> WireText {
        let text = self.take_flush_string(addr);
        let reply = if text.is_empty() {
            WireText::default()
        } else {
            self.encode_outbound(&text, backend)
        };

        let drawn = self
            .ic(addr)
            .map(|ic| {
                ic.input_style.intersects(
                    InputStyle::PREEDIT_POSITION
                        | InputStyle::PREEDIT_AREA
                        | InputStyle::PREEDIT_NOTHING,
                )
            })
            .unwrap_or(false);
        if drawn {
            self.preedit_hide(addr, backend);
        }
        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.prev_length = 0;
        }
        reply
    }
}
