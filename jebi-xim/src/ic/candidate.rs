//! Hanja candidate flow: lookup, navigation and insertion.

use jebi_engine::{Hanja, traditional_to_simplified};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::backend::{Backend, CandidatePage, IcAddr};
use crate::candidate::CandidateSelection;
use crate::config::CandidateFormat;
use crate::connection::charset_accepts;
use crate::keysym::Keysym;
use crate::server::Server;
use crate::ustring::UString;

/// How many characters of client text to ask for before a lookup.
const CLIENT_TEXT_FACTOR: u16 = 10;

// Numpad cells select a fixed position on the current page.
fn numpad_position(keysym: Keysym) -> Option<usize> {
    let n = match keysym {
        Keysym::KP_END => 0,
        Keysym::KP_DOWN => 1,
        Keysym::KP_NEXT => 2,
        Keysym::KP_LEFT => 3,
        Keysym::KP_BEGIN => 4,
        Keysym::KP_RIGHT => 5,
        Keysym::KP_HOME => 6,
        Keysym::KP_UP => 7,
        Keysym::KP_PRIOR => 8,
        _ => return None,
    };
    Some(n)
}

impl Server {
    /// Snapshot the text left of the client's cursor before a lookup.
    pub(super) fn request_client_text(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        backend.request_client_text(addr, CLIENT_TEXT_FACTOR);
    }

    /// Reply to a Retrieval string conversion: remember the client text and
    /// rebuild the candidate window over the full lookup key.
    pub fn string_conversion_reply(&mut self, addr: IcAddr, text: &str, backend: &mut dyn Backend) {
        let preedit = {
            let Some(ic) = self.ic_mut(addr) else { return };
            let snapshot = ic.client_text.get_or_insert_with(UString::new);
            snapshot.clear();
            snapshot.push_str(text);
            ic.preedit_text()
        };
        let key = format!("{text}{preedit}");
        self.popup_candidate_window(addr, &key, backend);
    }

    /// Look `key` up and open the overlay when anything matches. The key is
    /// cut at the last space and leading whitespace and punctuation are
    /// dropped.
    pub(super) fn popup_candidate_window(
        &mut self,
        addr: IcAddr,
        key: &str,
        backend: &mut dyn Backend,
    ) -> bool {
        let parent = {
            let Some(ic) = self.ic_mut(addr) else {
                return false;
            };
            if ic.candidate.take().is_some() {
                backend.close_candidate_window(addr);
            }
            ic.preedit_parent()
        };

        let key = match key.rfind(' ') {
            Some(pos) => &key[pos..],
            None => key,
        };
        let key = key.trim_start_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
        if key.is_empty() {
            return true;
        }

        // A jamo-typed key has to match the precomposed table spelling.
        let normalized: String = key.nfc().collect();
        debug!("lookup string: {normalized}");

        let charset = self.connection(addr.conn).and_then(|c| c.charset());
        let hits: Vec<Hanja> = {
            let mut list = self.symbol_table.match_suffix(&normalized);
            if list.is_empty() {
                list = self.hanja_table.match_suffix(&normalized);
            }
            list.into_iter()
                .filter(|h| charset_accepts(charset, h.value()))
                .cloned()
                .collect()
        };
        if hits.is_empty() {
            return true;
        }

        if let Some(ic) = self.ic_mut(addr) {
            ic.candidate = Some(CandidateSelection::new(key, hits));
        } else {
            return true;
        }
        backend.open_candidate_window(addr, parent);
        self.candidate_update(addr, backend);
        true
    }

    fn candidate_update(&self, addr: IcAddr, backend: &mut dyn Backend) {
        let Some(ic) = self.ic(addr) else { return };
        let Some(selection) = &ic.candidate else {
            return;
        };
        backend.update_candidate_window(
            addr,
            &CandidatePage {
                entries: selection.page_candidates(),
                cursor: selection.page_cursor(),
                page: selection.current_page(),
                total_pages: selection.total_pages(),
            },
        );
    }

    /// Keymap while the candidate window is open. Every key is swallowed.
    pub(super) fn process_candidate_key(
        &mut self,
        addr: IcAddr,
        keysym: Keysym,
        backend: &mut dyn Backend,
    ) -> bool {
        let chosen: Option<Hanja> = {
            let Some(ic) = self.ic_mut(addr) else {
                return false;
            };
            let Some(selection) = ic.candidate.as_mut() else {
                return false;
            };
            match keysym {
                Keysym::UP | Keysym::KEY_K => {
                    selection.prev();
                    None
                }
                Keysym::DOWN | Keysym::KEY_J => {
                    selection.next();
                    None
                }
                Keysym::LEFT
                | Keysym::KEY_H
                | Keysym::PAGE_UP
                | Keysym::BACKSPACE
                | Keysym::KP_SUBTRACT => {
                    selection.prev_page();
                    None
                }
                Keysym::RIGHT
                | Keysym::KEY_L
                | Keysym::SPACE
                | Keysym::PAGE_DOWN
                | Keysym::KP_ADD
                | Keysym::TAB => {
                    selection.next_page();
                    None
                }
                Keysym::ESCAPE => {
                    ic.candidate = None;
                    backend.close_candidate_window(addr);
                    return true;
                }
                Keysym::RETURN | Keysym::KP_ENTER => selection.current().cloned(),
                _ => {
                    if let Some(n) = keysym.digit().or_else(|| keysym.kp_digit()) {
                        selection.nth_in_page(n - 1).cloned()
                    } else if let Some(n) = numpad_position(keysym) {
                        selection.nth_in_page(n).cloned()
                    } else {
                        // anything else is swallowed while the window is up
                        return true;
                    }
                }
            }
        };

        match chosen {
            Some(hanja) => {
                self.insert_candidate(addr, &hanja, backend);
                if let Some(ic) = self.ic_mut(addr) {
                    ic.candidate = None;
                }
                backend.close_candidate_window(addr);
            }
            None => self.candidate_update(addr, backend),
        }
        true
    }

    /// Replace the looked-up key with the chosen candidate.
    ///
    /// The key length decides how much source text to retract, walking the
    /// three buffers newest-first: the automaton counts as one syllable,
    /// then whole syllables off the preedit buffer, then client text via a
    /// Substitution request. Only then is the replacement committed, so the
    /// client sees delete-and-commit as one exchange.
    pub(super) fn insert_candidate(&mut self, addr: IcAddr, hanja: &Hanja, backend: &mut dyn Backend) {
        let mut remaining = hanja.key().chars().count();

        {
            let Some(ic) = self.ic_mut(addr) else { return };

            if remaining > 0 && !ic.hic.is_empty() {
                ic.hic.reset();
                remaining -= 1;
            }

            while remaining > 0 && !ic.preedit.buffer.is_empty() {
                let len = ic.preedit.buffer.len();
                let pos = ic.preedit.buffer.prev_syllable_start(len);
                ic.preedit.buffer.erase(pos, len - pos);
                remaining -= 1;
            }

            if let Some(client_text) = &ic.client_text {
                let end = client_text.len();
                let mut iter = end;
                while remaining > 0 && iter > 0 {
                    iter = client_text.prev_syllable_start(iter);
                    remaining -= 1;
                }
                if end > iter {
                    backend.delete_client_text(addr, end - iter);
                }
            }
        }

        if !hanja.value().is_empty() {
            // Any unconverted preedit left of the match has to lead the
            // committed text or it would reappear after the replacement.
            let preedit_left = self
                .ic(addr)
                .map(|ic| ic.preedit.buffer.to_string())
                .unwrap_or_default();

            let charset = self.connection(addr.conn).and_then(|c| c.charset());
            let value = if self.settings.candidate.use_simplified_chinese {
                let converted = traditional_to_simplified(hanja.value());
                if charset_accepts(charset, &converted) {
                    converted
                } else {
                    hanja.value().to_owned()
                }
            } else {
                hanja.value().to_owned()
            };

            let replacement = match self.settings.candidate.format {
                CandidateFormat::Hanja => format!("{preedit_left}{value}"),
                CandidateFormat::HanjaHangul => {
                    format!("{preedit_left}{value}({})", hanja.key())
                }
                CandidateFormat::HangulHanja => {
                    format!("{preedit_left}{}({value})", hanja.key())
                }
            };
            self.commit_utf8(addr, &replacement, backend);
        }

        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.buffer.clear();
            if let Some(client_text) = &mut ic.client_text {
                client_text.clear();
            }
        }
        self.preedit_update(addr, backend);
    }
}
