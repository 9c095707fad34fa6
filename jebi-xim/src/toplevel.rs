//! Server-wide registry of toplevel windows.
//!
//! Every IC whose client window climbs to the same root-most ancestor
//! shares one entry. Entries are refcounted and evicted when the last IC
//! lets go, and carry the per-toplevel input mode.

use std::collections::HashMap;

use crate::config::InputMode;
use crate::wire::Window;

#[derive(Debug)]
struct Toplevel {
    mode: InputMode,
    refs: usize,
}

#[derive(Debug, Default)]
pub struct ToplevelRegistry {
    entries: HashMap<Window, Toplevel>,
}

impl ToplevelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference the entry for `window`, creating it with `default_mode`
    /// when it does not exist yet. Returns the registry key the IC keeps.
    pub fn acquire(&mut self, window: Window, default_mode: InputMode) -> Window {
        self.entries
            .entry(window)
            .and_modify(|t| t.refs += 1)
            .or_insert(Toplevel {
                mode: default_mode,
                refs: 1,
            });
        window
    }

    /// Drop one reference; the entry disappears with the last one.
    pub fn release(&mut self, window: Window) {
        if let Some(toplevel) = self.entries.get_mut(&window) {
            toplevel.refs -= 1;
            if toplevel.refs == 0 {
                self.entries.remove(&window);
            }
        }
    }

    pub fn mode(&self, window: Window) -> Option<InputMode> {
        self.entries.get(&window).map(|t| t.mode)
    }

    pub fn set_mode(&mut self, window: Window, mode: InputMode) {
        if let Some(toplevel) = self.entries.get_mut(&window) {
            toplevel.mode = mode;
        }
    }

    pub fn contains(&self, window: Window) -> bool {
        self.entries.contains_key(&window)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
