//! The input context: the per-widget composition state machine.
//!
//! Split by concern: attribute negotiation and mode scoping here, the
//! preedit contract in `preedit`, the commit path in `commit`, Hanja
//! selection in `candidate` and the per-key decision tree in `dispatch`.

mod candidate;
mod commit;
mod dispatch;
mod preedit;

#[cfg(test)]
mod tests;

use jebi_engine::{HangulIc, KeyboardLayout};
use tracing::debug;

use crate::backend::{Backend, IcAddr};
use crate::candidate::CandidateSelection;
use crate::config::{InputMode, InputModeScope};
use crate::server::Server;
use crate::ustring::UString;
use crate::wire::{
    AttrValue, IcAttr, IcQuery, IcValues, IcValuesReply, InputStyle, Point, PreeditAttr,
    PreeditQuery, PreeditState, Rect, StatusAttr, StatusQuery, Window,
};

/// Preedit state of one IC: the committed-but-not-flushed buffer, the
/// server-drawn window when a drawn style asked for one, and the geometry
/// and look negotiated over SetICValues.
#[derive(Debug)]
pub struct Preedit {
    pub buffer: UString,
    pub window: Option<Window>,
    pub area: Rect,
    pub area_needed: Rect,
    pub spot: Point,
    pub foreground: u32,
    pub background: u32,
    pub ascent: u16,
    pub descent: u16,
    pub line_space: i32,
    pub base_font: Option<String>,
    pub state: PreeditState,
    /// PreeditStart has been delivered and PreeditDone has not.
    pub started: bool,
    /// Unicode-scalar length of the preedit most recently sent, so the next
    /// draw can replace it.
    pub prev_length: usize,
}

impl Default for Preedit {
    fn default() -> Self {
        Self {
            buffer: UString::new(),
            window: None,
            area: Rect::default(),
            area_needed: Rect::default(),
            spot: Point::default(),
            foreground: 0,
            background: 0,
            ascent: 0,
            descent: 0,
            line_space: 0,
            base_font: None,
            state: PreeditState::Enable,
            started: false,
            prev_length: 0,
        }
    }
}

/// Status-area attributes. Only callback-style clients get drawn status.
#[derive(Debug, Default)]
pub struct StatusAttrs {
    pub area: Rect,
    pub area_needed: Rect,
    pub foreground: u32,
    pub background: u32,
    pub line_space: i32,
    pub base_font: Option<String>,
}

/// One input context, owned by its connection.
#[derive(Debug)]
pub struct InputContext {
    pub id: u16,
    pub conn_id: u16,
    pub input_style: InputStyle,
    pub client_window: Window,
    pub focus_window: Window,
    pub mode: InputMode,
    pub preedit: Preedit,
    pub status: StatusAttrs,
    pub hic: HangulIc,
    pub candidate: Option<CandidateSelection>,
    pub client_text: Option<UString>,
    pub toplevel: Option<Window>,
}

impl InputContext {
    pub fn new(conn_id: u16, id: u16, keyboard: KeyboardLayout, mode: InputMode) -> Self {
        Self {
            id,
            conn_id,
            input_style: InputStyle::empty(),
            client_window: 0,
            focus_window: 0,
            mode,
            preedit: Preedit::default(),
            status: StatusAttrs::default(),
            hic: HangulIc::new(keyboard),
            candidate: None,
            client_text: None,
            toplevel: None,
        }
    }

    pub fn addr(&self) -> IcAddr {
        IcAddr::new(self.conn_id, self.id)
    }

    /// Nothing composed anywhere: automaton and buffer both drained.
    pub fn is_empty(&self) -> bool {
        self.hic.is_empty() && self.preedit.buffer.is_empty()
    }

    /// Full preedit as shown to the user: buffer then automaton syllable.
    pub fn preedit_text(&self) -> String {
        let mut text = self.preedit.buffer.to_string();
        text.push_str(&self.hic.preedit_string());
        text
    }

    /// Window a server-drawn preedit parents to.
    pub fn preedit_parent(&self) -> Window {
        if self.focus_window != 0 {
            self.focus_window
        } else {
            self.client_window
        }
    }
}

impl Server {
    /// Apply CreateIC / SetICValues attribute lists.
    pub fn ic_set_values(&mut self, addr: IcAddr, values: IcValues, backend: &mut dyn Backend) {
        for attr in values.ic {
            match attr {
                IcAttr::InputStyle(style) => {
                    if let Some(ic) = self.ic_mut(addr) {
                        ic.input_style = style;
                    }
                }
                IcAttr::ClientWindow(window) => self.ic_set_client_window(addr, window, backend),
                IcAttr::FocusWindow(window) => {
                    if let Some(ic) = self.ic_mut(addr) {
                        ic.focus_window = window;
                    }
                }
                IcAttr::Unknown(name) => debug!("set unknown ic attribute: {name}"),
            }
        }

        for attr in values.preedit {
            match attr {
                PreeditAttr::SpotLocation(point) => self.ic_set_spot(addr, point, backend),
                PreeditAttr::Foreground(pixel) => {
                    if let Some(ic) = self.ic_mut(addr) {
                        ic.preedit.foreground = pixel;
                    }
                }
                PreeditAttr::Background(pixel) => {
                    if let Some(ic) = self.ic_mut(addr) {
                        ic.preedit.background = pixel;
                    }
                }
                PreeditAttr::Area(rect) => self.ic_set_area(addr, rect, backend),
                PreeditAttr::LineSpace(space) => {
                    if let Some(ic) = self.ic_mut(addr) {
                        ic.preedit.line_space = space;
                    }
                }
                PreeditAttr::State(state) => {
                    if let Some(ic) = self.ic_mut(addr) {
                        ic.preedit.state = state;
                    }
                }
                PreeditAttr::FontSet(name) => {
                    if let Some(ic) = self.ic_mut(addr) {
                        debug!("set ic fontset: id = {}-{}, {name}", addr.conn, addr.ic);
                        ic.preedit.base_font = Some(name);
                    }
                }
                PreeditAttr::Unknown(name) => debug!("set unknown preedit attribute: {name}"),
            }
        }

        for attr in values.status {
            let Some(ic) = self.ic_mut(addr) else { return };
            match attr {
                StatusAttr::Area(rect) => ic.status.area = rect,
                StatusAttr::AreaNeeded(rect) => ic.status.area_needed = rect,
                StatusAttr::Foreground(pixel) => ic.status.foreground = pixel,
                StatusAttr::Background(pixel) => ic.status.background = pixel,
                StatusAttr::LineSpace(space) => ic.status.line_space = space,
                StatusAttr::FontSet(name) => ic.status.base_font = Some(name),
                StatusAttr::Unknown(name) => debug!("set unknown status attribute: {name}"),
            }
        }
    }

    /// Answer a GetICValues request. Unknown attributes are logged and get
    /// no reply entry.
    pub fn ic_get_values(
        &self,
        addr: IcAddr,
        ic_queries: &[IcQuery],
        preedit_queries: &[PreeditQuery],
        status_queries: &[StatusQuery],
    ) -> IcValuesReply {
        let mut reply = IcValuesReply::default();
        let Some(ic) = self.ic(addr) else {
            return reply;
        };

        for query in ic_queries {
            match query {
                // KeyPressMask | KeyReleaseMask
                IcQuery::FilterEvents => reply.ic.push(AttrValue::Card32(0x0003)),
                IcQuery::InputStyle => reply.ic.push(AttrValue::Style(ic.input_style)),
                // Some Java clients ask for the preedit state in the IC
                // list, so it is honoured here too
                IcQuery::PreeditState => reply.ic.push(AttrValue::State(ic.preedit.state)),
                IcQuery::SeparatorOfNestedList => {}
                IcQuery::Unknown(name) => debug!("get unknown ic attribute: {name}"),
            }
        }

        for query in preedit_queries {
            match query {
                PreeditQuery::Area => reply.preedit.push(AttrValue::Rect(ic.preedit.area)),
                PreeditQuery::AreaNeeded => {
                    reply.preedit.push(AttrValue::Rect(ic.preedit.area_needed))
                }
                PreeditQuery::SpotLocation => {
                    reply.preedit.push(AttrValue::Point(ic.preedit.spot))
                }
                PreeditQuery::Foreground => {
                    reply.preedit.push(AttrValue::Card32(ic.preedit.foreground))
                }
                PreeditQuery::Background => {
                    reply.preedit.push(AttrValue::Card32(ic.preedit.background))
                }
                PreeditQuery::LineSpace => reply
                    .preedit
                    .push(AttrValue::Card32(ic.preedit.line_space as u32)),
                PreeditQuery::State => reply.preedit.push(AttrValue::State(ic.preedit.state)),
                PreeditQuery::FontSet => reply.preedit.push(AttrValue::FontSet(
                    ic.preedit.base_font.clone().unwrap_or_default(),
                )),
                PreeditQuery::Unknown(name) => debug!("get unknown preedit attribute: {name}"),
            }
        }

        for query in status_queries {
            match query {
                StatusQuery::Area => reply.status.push(AttrValue::Rect(ic.status.area)),
                StatusQuery::AreaNeeded => {
                    reply.status.push(AttrValue::Rect(ic.status.area_needed))
                }
                StatusQuery::Foreground => {
                    reply.status.push(AttrValue::Card32(ic.status.foreground))
                }
                StatusQuery::Background => {
                    reply.status.push(AttrValue::Card32(ic.status.background))
                }
                StatusQuery::LineSpace => reply
                    .status
                    .push(AttrValue::Card32(ic.status.line_space as u32)),
                StatusQuery::FontSet => reply.status.push(AttrValue::FontSet(
                    ic.status.base_font.clone().unwrap_or_default(),
                )),
                StatusQuery::Unknown(name) => debug!("get unknown status attribute: {name}"),
            }
        }

        reply
    }

    /// Re-anchor the IC to the toplevel above `window`.
    fn ic_set_client_window(&mut self, addr: IcAddr, window: Window, backend: &mut dyn Backend) {
        let toplevel = backend.toplevel_of(window);
        debug!("ic {}-{} toplevel: {toplevel:#x}", addr.conn, addr.ic);

        let default_mode = self.settings.input.default_mode;
        let previous = match self.ic_mut(addr) {
            Some(ic) => {
                ic.client_window = window;
                ic.toplevel.take()
            }
            None => return,
        };
        if let Some(previous) = previous {
            self.toplevels.release(previous);
        }
        let key = self.toplevels.acquire(toplevel, default_mode);
        if let Some(ic) = self.ic_mut(addr) {
            ic.toplevel = Some(key);
        }
    }

    fn ic_set_spot(&mut self, addr: IcAddr, point: Point, backend: &mut dyn Backend) {
        if let Some(ic) = self.ic_mut(addr) {
            ic.preedit.spot = point;
            // keep the preedit window inside the negotiated area
            if ic.preedit.area.width != 0 {
                let limit = ic.preedit.area.width as i16;
                if ic.preedit.spot.x > limit {
                    ic.preedit.spot.x = limit;
                }
            }
        }
        self.preedit_configure(addr, backend);
    }

    fn ic_set_area(&mut self, addr: IcAddr, rect: Rect, backend: &mut dyn Backend) {
        let Some(ic) = self.ic_mut(addr) else { return };
        ic.preedit.area = rect;
        let empty = ic.is_empty();
        self.preedit_configure(addr, backend);
        if empty {
            self.preedit_hide(addr, backend);
        } else {
            self.preedit_show(addr, backend);
        }
    }

    /// Focus-in: adopt the mode from the configured scope source.
    pub fn set_focus(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let Some(ic) = self.ic(addr) else { return };
        let mode = match self.settings.input.mode_scope {
            InputModeScope::PerDesktop => self.input_mode,
            InputModeScope::PerApplication => self
                .connection(addr.conn)
                .map(|conn| conn.mode)
                .unwrap_or(ic.mode),
            InputModeScope::PerToplevel => ic
                .toplevel
                .and_then(|t| self.toplevels.mode(t))
                .unwrap_or(ic.mode),
            InputModeScope::PerIc => ic.mode,
        };
        self.set_mode(addr, mode, backend);

        let keyboard = self.settings.input.keyboard.clone();
        if let Some(ic) = self.ic_mut(addr) {
            ic.hic.select_keyboard(&keyboard);
        }
    }

    /// Focus-out: release any pending composition to the client.
    pub fn unset_focus(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        self.ic_flush(addr, backend);
    }

    /// Switch the IC's input mode, writing it back to the scope source.
    pub fn set_mode(&mut self, addr: IcAddr, mode: InputMode, backend: &mut dyn Backend) {
        match self.settings.input.mode_scope {
            InputModeScope::PerDesktop => self.input_mode = mode,
            InputModeScope::PerApplication => {
                if let Some(conn) = self.connection_mut(addr.conn) {
                    conn.mode = mode;
                }
            }
            InputModeScope::PerToplevel => {
                if let Some(toplevel) = self.ic(addr).and_then(|ic| ic.toplevel) {
                    self.toplevels.set_mode(toplevel, mode);
                }
            }
            InputModeScope::PerIc => {}
        }

        match self.ic_mut(addr) {
            Some(ic) => ic.mode = mode,
            None => return,
        }

        match mode {
            InputMode::Direct => {
                self.ic_flush(addr, backend);
                self.preedit_done(addr, backend);
                backend.set_mode_indicator(crate::backend::ModeIndicator::Direct);
            }
            InputMode::Compose => {
                self.preedit_start(addr, backend);
                backend.set_mode_indicator(crate::backend::ModeIndicator::Compose);
            }
        }

        self.status_update(addr, backend);
    }
}
