//! Typed model of the XIM wire data the core consumes and produces.
//!
//! The transport owns the byte-level framing; these types carry exactly the
//! payloads the input context subsystem cares about. Reply values encode
//! themselves the way the protocol lays them out in attribute buffers.

use bitflags::bitflags;

/// An X window id.
pub type Window = u32;

bitflags! {
    /// XIM input style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InputStyle: u32 {
        const PREEDIT_AREA      = 0x0001;
        const PREEDIT_CALLBACKS = 0x0002;
        const PREEDIT_POSITION  = 0x0004;
        const PREEDIT_NOTHING   = 0x0008;
        const PREEDIT_NONE      = 0x0010;
        const STATUS_AREA       = 0x0100;
        const STATUS_CALLBACKS  = 0x0200;
        const STATUS_NOTHING    = 0x0400;
        const STATUS_NONE       = 0x0800;
    }
}

/// XIMPreeditEnable / XIMPreeditDisable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreeditState {
    #[default]
    Enable,
    Disable,
}

impl PreeditState {
    pub fn to_wire(self) -> u32 {
        match self {
            PreeditState::Enable => 0x0001,
            PreeditState::Disable => 0x0002,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

/// Per-character preedit rendering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Reverse,
    Underline,
}

impl Feedback {
    pub fn to_wire(self) -> u32 {
        match self {
            Feedback::Reverse => 0x0001,
            Feedback::Underline => 0x0002,
        }
    }
}

/// Text encoded for the wire, plus how many characters the encoder had to
/// drop. A partial property is still sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireText {
    pub bytes: Vec<u8>,
    pub missed: usize,
}

impl WireText {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Payload of a PreeditDraw callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreeditDraw {
    /// Caret position after the draw, in characters.
    pub caret: usize,
    /// First character to replace.
    pub chg_first: usize,
    /// Number of characters to replace (the previously drawn length).
    pub chg_length: usize,
    pub text: WireText,
    pub feedback: Vec<Feedback>,
}

// Attribute lists carried by CreateIC / SetICValues.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcAttr {
    InputStyle(InputStyle),
    ClientWindow(Window),
    FocusWindow(Window),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreeditAttr {
    SpotLocation(Point),
    Foreground(u32),
    Background(u32),
    Area(Rect),
    LineSpace(i32),
    State(PreeditState),
    FontSet(String),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusAttr {
    Area(Rect),
    AreaNeeded(Rect),
    Foreground(u32),
    Background(u32),
    LineSpace(i32),
    FontSet(String),
    Unknown(String),
}

/// The three attribute lists of an IMChangeIC request.
#[derive(Debug, Clone, Default)]
pub struct IcValues {
    pub ic: Vec<IcAttr>,
    pub preedit: Vec<PreeditAttr>,
    pub status: Vec<StatusAttr>,
}

impl IcValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: InputStyle) -> Self {
        self.ic.push(IcAttr::InputStyle(style));
        self
    }

    pub fn with_client_window(mut self, window: Window) -> Self {
        self.ic.push(IcAttr::ClientWindow(window));
        self
    }

    pub fn with_spot(mut self, x: i16, y: i16) -> Self {
        self.preedit.push(PreeditAttr::SpotLocation(Point { x, y }));
        self
    }
}

// Attribute queries carried by GetICValues.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcQuery {
    FilterEvents,
    InputStyle,
    PreeditState,
    SeparatorOfNestedList,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreeditQuery {
    Area,
    AreaNeeded,
    SpotLocation,
    Foreground,
    Background,
    LineSpace,
    State,
    FontSet,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusQuery {
    Area,
    AreaNeeded,
    Foreground,
    Background,
    LineSpace,
    FontSet,
    Unknown(String),
}

/// A reply value for one queried attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Card32(u32),
    Style(InputStyle),
    Point(Point),
    Rect(Rect),
    State(PreeditState),
    FontSet(String),
}

impl AttrValue {
    /// Lay the value out the way the protocol expects it in an attribute
    /// buffer. Font set names are length-prefixed with a 16-bit count and
    /// carry no terminator.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            AttrValue::Card32(v) => v.to_ne_bytes().to_vec(),
            AttrValue::Style(style) => style.bits().to_ne_bytes().to_vec(),
            AttrValue::Point(p) => {
                let mut out = Vec::with_capacity(4);
                out.extend_from_slice(&p.x.to_ne_bytes());
                out.extend_from_slice(&p.y.to_ne_bytes());
                out
            }
            AttrValue::Rect(r) => {
                let mut out = Vec::with_capacity(8);
                out.extend_from_slice(&r.x.to_ne_bytes());
                out.extend_from_slice(&r.y.to_ne_bytes());
                out.extend_from_slice(&r.width.to_ne_bytes());
                out.extend_from_slice(&r.height.to_ne_bytes());
                out
            }
            AttrValue::State(state) => state.to_wire().to_ne_bytes().to_vec(),
            AttrValue::FontSet(name) => {
                let mut out = Vec::with_capacity(2 + name.len());
                out.extend_from_slice(&(name.len() as u16).to_ne_bytes());
                out.extend_from_slice(name.as_bytes());
                out
            }
        }
    }
}

/// Replies to a GetICValues request, one entry per recognised query, in
/// query order.
#[derive(Debug, Clone, Default)]
pub struct IcValuesReply {
    pub ic: Vec<AttrValue>,
    pub preedit: Vec<AttrValue>,
    pub status: Vec<AttrValue>,
}
