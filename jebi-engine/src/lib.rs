//! jebi-engine: Hangul composition for the jebi input method server.
//!
//! Provides the jamo automaton that turns printable keys into syllables,
//! the keyboard tables it reads from, and the Hanja/symbol dictionaries
//! used for candidate lookup.

pub mod automaton;
pub mod hanja;
pub mod jamo;
pub mod keyboard;
pub mod simplified;

pub use automaton::{CompositionHooks, HangulIc, NoHooks, OutputMode, TransitionContext};
pub use hanja::{Hanja, HanjaTable, HanjaTableError};
pub use keyboard::{KeyboardLayout, LayoutKind};
pub use simplified::traditional_to_simplified;
