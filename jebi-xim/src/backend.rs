//! The outward-effect boundary.
//!
//! Everything the core asks of the outside world goes through [`Backend`]:
//! XIM callbacks back to the client, Compound Text encoding, window-tree
//! queries, the server-drawn preedit window and the candidate overlay.
//! Calls are synchronous send-and-return and never re-enter the dispatcher.

use jebi_engine::Hanja;

use crate::wire::{PreeditDraw, WireText, Window};

/// Addresses one input context across the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IcAddr {
    pub conn: u16,
    pub ic: u16,
}

impl IcAddr {
    pub fn new(conn: u16, ic: u16) -> Self {
        Self { conn, ic }
    }
}

/// Value of the desktop-wide `_HANGUL_INPUT_MODE` root-window property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeIndicator {
    None = 0,
    Direct = 1,
    Compose = 2,
}

/// One page of the candidate overlay.
#[derive(Debug)]
pub struct CandidatePage<'a> {
    pub entries: &'a [Hanja],
    /// Cursor position within this page.
    pub cursor: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Outward side effects of the IC subsystem.
pub trait Backend {
    /// Encode UTF-8 for the wire (Compound Text in the client's locale).
    /// Characters the encoding cannot carry are counted in `missed`; the
    /// partial result is still delivered.
    fn encode_text(&self, utf8: &str) -> WireText {
        WireText {
            bytes: utf8.as_bytes().to_vec(),
            missed: 0,
        }
    }

    // XIM callbacks toward the client.

    /// XIM_COMMIT with flag XimLookupChars.
    fn commit(&mut self, addr: IcAddr, text: &WireText);
    fn preedit_start(&mut self, addr: IcAddr);
    fn preedit_draw(&mut self, addr: IcAddr, draw: &PreeditDraw);
    fn preedit_done(&mut self, addr: IcAddr);
    /// IMPreeditStart state message (dynamic event flow only).
    fn preedit_state_started(&mut self, addr: IcAddr);
    /// IMPreeditEnd state message (dynamic event flow only).
    fn preedit_state_ended(&mut self, addr: IcAddr);
    fn status_start(&mut self, addr: IcAddr);
    fn status_draw(&mut self, addr: IcAddr, text: &WireText);
    fn status_done(&mut self, addr: IcAddr);
    /// String conversion, operation Retrieval, direction backward: ask for
    /// the text left of the client's cursor.
    fn request_client_text(&mut self, addr: IcAddr, factor: u16);
    /// String conversion, operation Substitution, direction backward:
    /// delete `length` characters left of the client's cursor.
    fn delete_client_text(&mut self, addr: IcAddr, length: usize);

    // Windowing.

    /// Root-most non-root ancestor of a window.
    fn toplevel_of(&mut self, window: Window) -> Window;
    /// Post the desktop-wide mode indicator property.
    fn set_mode_indicator(&mut self, mode: ModeIndicator);

    // Server-drawn preedit window.

    fn create_preedit_window(&mut self, addr: IcAddr, parent: Window) -> Option<Window>;
    fn move_preedit_window(&mut self, window: Window, x: i16, y: i16);
    fn show_preedit_window(&mut self, window: Window);
    fn hide_preedit_window(&mut self, window: Window);
    /// Draw the two preedit runs: `normal` underlined, `hilight` reversed.
    fn draw_preedit(&mut self, window: Window, normal: &str, hilight: &str);
    fn destroy_preedit_window(&mut self, window: Window);

    // Candidate overlay.

    fn open_candidate_window(&mut self, addr: IcAddr, parent: Window);
    fn update_candidate_window(&mut self, addr: IcAddr, page: &CandidatePage<'_>);
    fn close_candidate_window(&mut self, addr: IcAddr);
}
