//! The preedit contract.
//!
//! Callback-style clients get PreeditStart/Draw/Done over the wire; drawn
//! styles (Position, Area, Nothing) get a server-side window that is shown,
//! moved and hidden here. Status rendering for callback-style status areas
//! also lives here.

use tracing::{debug, warn};

use crate::backend::{Backend, IcAddr};
use crate::config::InputMode;
use crate::server::Server;
use crate::wire::{Feedback, InputStyle, PreeditDraw, WireText};

// Styles rendered by a server-drawn window.
const DRAWN_STYLES: InputStyle = InputStyle::PREEDIT_POSITION
    .union(InputStyle::PREEDIT_AREA)
    .union(InputStyle::PREEDIT_NOTHING);

/// Feedback run for a preedit draw: the committed buffer underlined, the
/// automaton syllable reversed.
pub(super) fn preedit_feedback(underline_len: usize, reverse_len: usize) -> Vec<Feedback> {
    let mut feedback = Vec::with_capacity(underline_len + reverse_len);
    feedback.extend(std::iter::repeat_n(Feedback::Underline, underline_len));
    feedback.extend(std::iter::repeat_n(Feedback::Reverse, reverse_len));
    feedback
}

impl Server {
    /// Enter the Started state: announce the preedit or make sure the
    /// drawn window exists.
    pub fn preedit_start(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let (style, dynamic_flow) = {
            let Some(ic) = self.ic(addr) else { return };
            if ic.preedit.started {
                return;
            }
            (ic.input_style, self.settings.xim.dynamic_event_flow)
        };

        if dynamic_flow {
            backend.preedit_state_started(addr);
        }

        if style.contains(InputStyle::PREEDIT_CALLBACKS) {
            backend.preedit_start(addr);
        } else if style.intersects(DRAWN_STYLES) {
            self.preedit_window_new(addr, backend);
        }

        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.started = true;
        }
    }

    /// Leave for Idle: close the preedit on the wire or hide the window.
    pub fn preedit_done(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let (style, dynamic_flow) = {
            let Some(ic) = self.ic(addr) else { return };
            if !ic.preedit.started {
                return;
            }
            (ic.input_style, self.settings.xim.dynamic_event_flow)
        };

        if style.contains(InputStyle::PREEDIT_CALLBACKS) {
            backend.preedit_done(addr);
        } else if style.intersects(DRAWN_STYLES) {
            self.preedit_hide(addr, backend);
        }

        if dynamic_flow {
            backend.preedit_state_ended(addr);
        }

        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.started = false;
        }
    }

    /// Push the current composition to the client.
    pub fn preedit_update(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let (style, window, normal, hilight) = {
            let Some(ic) = self.ic(addr) else { return };
            (
                ic.input_style,
                ic.preedit.window,
                ic.preedit.buffer.to_string(),
                ic.hic.preedit_string(),
            )
        };

        let normal_len = normal.chars().count();
        let hilight_len = hilight.chars().count();
        let preedit_len = normal_len + hilight_len;

        if preedit_len == 0 {
            self.preedit_clear(addr, backend);
            return;
        }

        debug!(
            "update preedit: id = {}-{}, '{normal}' + '{hilight}'",
            addr.conn, addr.ic
        );

        if style.contains(InputStyle::PREEDIT_CALLBACKS) {
            let prev_length = self.ic(addr).map(|ic| ic.preedit.prev_length).unwrap_or(0);
            let text = format!("{normal}{hilight}");
            let encoded = self.encode_outbound(&text, backend);
            backend.preedit_draw(
                addr,
                &PreeditDraw {
                    caret: preedit_len,
                    chg_first: 0,
                    chg_length: prev_length,
                    text: encoded,
                    feedback: preedit_feedback(normal_len, hilight_len),
                },
            );
        } else if style.intersects(DRAWN_STYLES) {
            self.preedit_show(addr, backend);
            if let Some(window) = window {
                backend.draw_preedit(window, &normal, &hilight);
            }
        }

        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.prev_length = preedit_len;
        }
    }

    /// Blank whatever the client is still showing.
    pub fn preedit_clear(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let (style, prev_length) = {
            let Some(ic) = self.ic(addr) else { return };
            (ic.input_style, ic.preedit.prev_length)
        };
        if prev_length == 0 {
            return;
        }

        if style.contains(InputStyle::PREEDIT_CALLBACKS) {
            debug!("clear preedit: id = {}-{}", addr.conn, addr.ic);
            backend.preedit_draw(
                addr,
                &PreeditDraw {
                    caret: 0,
                    chg_first: 0,
                    chg_length: prev_length,
                    text: WireText::default(),
                    feedback: Vec::new(),
                },
            );
        } else if style.intersects(DRAWN_STYLES) {
            self.preedit_hide(addr, backend);
        }

        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.prev_length = 0;
        }
    }

    /// Encode outbound text, logging a partial conversion but sending it
    /// anyway.
    pub(super) fn encode_outbound(&self, utf8: &str, backend: &mut dyn Backend) -> WireText {
        let encoded = backend.encode_text(utf8);
        if encoded.missed > 0 {
            warn!("conversion failure: {} characters dropped", encoded.missed);
        }
        encoded
    }

    // Server-drawn window management.

    fn preedit_window_new(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let parent = {
            let Some(ic) = self.ic(addr) else { return };
            if ic.preedit.window.is_some() {
                return;
            }
            ic.preedit_parent()
        };
        if parent == 0 {
            return;
        }
        let window = backend.create_preedit_window(addr, parent);
        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.window = window;
        }
        self.preedit_configure(addr, backend);
    }

    /// Place the window for the IC's style: at the spot for Position and
    /// Nothing, at the negotiated area for Area.
    pub(super) fn preedit_configure(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let Some(ic) = self.ic(addr) else { return };
        let Some(window) = ic.preedit.window else {
            return;
        };
        let style = ic.input_style;
        let (x, y) = if style.contains(InputStyle::PREEDIT_AREA) {
            (ic.preedit.area.x, ic.preedit.area.y)
        } else {
            (
                ic.preedit.spot.x,
                ic.preedit.spot.y - ic.preedit.ascent as i16,
            )
        };
        backend.move_preedit_window(window, x, y);
    }

    pub(super) fn preedit_show(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let Some(ic) = self.ic(addr) else { return };
        let Some(window) = ic.preedit.window else {
            return;
        };
        // only show when there is something to draw
        let empty = ic.is_empty();
        self.preedit_configure(addr, backend);
        if !empty {
            debug!("show preedit window: id = {}-{}", addr.conn, addr.ic);
            backend.show_preedit_window(window);
        }
    }

    pub(super) fn preedit_hide(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let Some(ic) = self.ic(addr) else { return };
        if let Some(window) = ic.preedit.window {
            debug!("hide preedit window: id = {}-{}", addr.conn, addr.ic);
            backend.hide_preedit_window(window);
        }
    }

    /// DestroyNotify for a server-drawn preedit window: detach without
    /// touching the window again.
    pub fn preedit_window_destroyed(&mut self, addr: IcAddr) {
        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.window = None;
        }
    }

    // Status area, callback style only.

    pub fn status_start(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        if !self.settings.xim.show_status {
            return;
        }
        if self.status_style(addr) {
            backend.status_start(addr);
        }
    }

    pub fn status_done(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        if !self.settings.xim.show_status {
            return;
        }
        if self.status_style(addr) {
            backend.status_done(addr);
        }
    }

    pub fn status_update(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        if !self.settings.xim.show_status {
            return;
        }
        let Some(ic) = self.ic(addr) else { return };
        if !ic.input_style.contains(InputStyle::STATUS_CALLBACKS) {
            return;
        }
        let label = match ic.mode {
            InputMode::Direct => "영어",
            InputMode::Compose => "한글",
        };
        let text = self.encode_outbound(label, backend);
        backend.status_draw(addr, &text);
    }

    fn status_style(&self, addr: IcAddr) -> bool {
        self.ic(addr)
            .map(|ic| ic.input_style.contains(InputStyle::STATUS_CALLBACKS))
            .unwrap_or(false)
    }
}
