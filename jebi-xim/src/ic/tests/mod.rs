//! Tests for the input context subsystem.
//!
//! Everything runs against a recording backend: wire callbacks, windowing
//! calls and the mode indicator all land in one event list that the tests
//! assert over.

use jebi_engine::{Hanja, HanjaTable};

use crate::backend::{Backend, CandidatePage, IcAddr, ModeIndicator};
use crate::config::{InputMode, Settings};
use crate::keysym::Keysym;
use crate::server::Server;
use crate::wire::{IcValues, InputStyle, PreeditDraw, WireText, Window};

mod modes;

/// Everything the core asked of the outside world, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Commit(String),
    PreeditStart,
    PreeditDraw {
        text: String,
        caret: usize,
        chg_length: usize,
        underline: usize,
        reverse: usize,
    },
    PreeditDone,
    PreeditStateStarted,
    PreeditStateEnded,
    StatusStart,
    StatusDraw(String),
    StatusDone,
    RequestClientText,
    DeleteClientText(usize),
    Indicator(ModeIndicator),
    CreateWindow(Window),
    MoveWindow,
    ShowWindow,
    HideWindow,
    DrawWindow { normal: String, hilight: String },
    DestroyWindow,
    OpenCandidates,
    UpdateCandidates { values: Vec<String>, cursor: usize },
    CloseCandidates,
}

/// Records every backend call. Window ids are handed out sequentially and
/// the toplevel of any window is the window itself.
#[derive(Debug, Default)]
pub struct MockBackend {
    pub events: Vec<Event>,
    next_window: Window,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_window: 1000,
        }
    }

    pub fn commits(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Commit(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_draw_text(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            Event::PreeditDraw { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Backend for MockBackend {
    fn commit(&mut self, _addr: IcAddr, text: &WireText) {
        let text = String::from_utf8(text.bytes.clone()).unwrap();
        self.events.push(Event::Commit(text));
    }

    fn preedit_start(&mut self, _addr: IcAddr) {
        self.events.push(Event::PreeditStart);
    }

    fn preedit_draw(&mut self, _addr: IcAddr, draw: &PreeditDraw) {
        let underline = draw
            .feedback
            .iter()
            .filter(|f| matches!(f, crate::wire::Feedback::Underline))
            .count();
        self.events.push(Event::PreeditDraw {
            text: String::from_utf8(draw.text.bytes.clone()).unwrap(),
            caret: draw.caret,
            chg_length: draw.chg_length,
            underline,
            reverse: draw.feedback.len() - underline,
        });
    }

    fn preedit_done(&mut self, _addr: IcAddr) {
        self.events.push(Event::PreeditDone);
    }

    fn preedit_state_started(&mut self, _addr: IcAddr) {
        self.events.push(Event::PreeditStateStarted);
    }

    fn preedit_state_ended(&mut self, _addr: IcAddr) {
        self.events.push(Event::PreeditStateEnded);
    }

    fn status_start(&mut self, _addr: IcAddr) {
        self.events.push(Event::StatusStart);
    }

    fn status_draw(&mut self, _addr: IcAddr, text: &WireText) {
        self.events
            .push(Event::StatusDraw(String::from_utf8(text.bytes.clone()).unwrap()));
    }

    fn status_done(&mut self, _addr: IcAddr) {
        self.events.push(Event::StatusDone);
    }

    fn request_client_text(&mut self, _addr: IcAddr, _factor: u16) {
        self.events.push(Event::RequestClientText);
    }

    fn delete_client_text(&mut self, _addr: IcAddr, length: usize) {
        self.events.push(Event::DeleteClientText(length));
    }

    fn toplevel_of(&mut self, window: Window) -> Window {
        window
    }

    fn set_mode_indicator(&mut self, mode: ModeIndicator) {
        self.events.push(Event::Indicator(mode));
    }

    fn create_preedit_window(&mut self, _addr: IcAddr, _parent: Window) -> Option<Window> {
        self.next_window += 1;
        self.events.push(Event::CreateWindow(self.next_window));
        Some(self.next_window)
    }

    fn move_preedit_window(&mut self, _window: Window, _x: i16, _y: i16) {
        self.events.push(Event::MoveWindow);
    }

    fn show_preedit_window(&mut self, _window: Window) {
        self.events.push(Event::ShowWindow);
    }

    fn hide_preedit_window(&mut self, _window: Window) {
        self.events.push(Event::HideWindow);
    }

    fn draw_preedit(&mut self, _window: Window, normal: &str, hilight: &str) {
        self.events.push(Event::DrawWindow {
            normal: normal.into(),
            hilight: hilight.into(),
        });
    }

    fn destroy_preedit_window(&mut self, _window: Window) {
        self.events.push(Event::DestroyWindow);
    }

    fn open_candidate_window(&mut self, _addr: IcAddr, _parent: Window) {
        self.events.push(Event::OpenCandidates);
    }

    fn update_candidate_window(&mut self, _addr: IcAddr, page: &CandidatePage<'_>) {
        self.events.push(Event::UpdateCandidates {
            values: page.entries.iter().map(|h| h.value().to_owned()).collect(),
            cursor: page.cursor,
        });
    }

    fn close_candidate_window(&mut self, _addr: IcAddr) {
        self.events.push(Event::CloseCandidates);
    }
}

fn test_tables() -> (HanjaTable, HanjaTable) {
    let mut hanja = HanjaTable::new();
    hanja.insert(Hanja::new("가", "家", "집 가"));
    hanja.insert(Hanja::new("가", "價", "값 가"));
    hanja.insert(Hanja::new("나", "奈", ""));
    hanja.insert(Hanja::new("한자", "漢字", ""));
    // value a Korean locale cannot encode
    hanja.insert(Hanja::new("가", "🀄", ""));
    let symbols = HanjaTable::new();
    (hanja, symbols)
}

/// A server with one connection and one callbacks-style IC in compose mode.
pub fn compose_setup(
    mutate: impl FnOnce(&mut Settings),
) -> (Server, MockBackend, IcAddr) {
    compose_setup_with_locale(mutate, None)
}

pub fn compose_setup_with_locale(
    mutate: impl FnOnce(&mut Settings),
    locale: Option<&str>,
) -> (Server, MockBackend, IcAddr) {
    let mut settings = Settings::default();
    mutate(&mut settings);
    let (hanja, symbols) = test_tables();
    let mut server = Server::with_tables(settings, hanja, symbols);
    let mut backend = MockBackend::new();

    server.connect(1, locale);
    let values = IcValues::new()
        .with_style(InputStyle::PREEDIT_CALLBACKS | InputStyle::STATUS_NOTHING)
        .with_client_window(100);
    let addr = server.create_ic(1, values, &mut backend).unwrap();
    server.set_mode(addr, InputMode::Compose, &mut backend);
    backend.clear();
    (server, backend, addr)
}

/// Feed printable keys through the dispatcher.
pub fn type_keys(server: &mut Server, backend: &mut MockBackend, addr: IcAddr, keys: &str) {
    for ch in keys.chars() {
        server.key_press(addr, Keysym(ch as u32), 0, backend);
    }
}

pub fn preedit_text(server: &Server, addr: IcAddr) -> String {
    server.ic(addr).unwrap().preedit_text()
}
