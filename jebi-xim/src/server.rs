//! The server context: connections, toplevels, tables and hot-keys.
//!
//! There are no globals; every entry point takes the server and a backend.

use std::collections::HashMap;

use jebi_engine::{HanjaTable, KeyboardLayout};
use tracing::debug;

use crate::backend::{Backend, IcAddr};
use crate::config::{InputMode, KeySpec, Settings, parse_keyspecs};
use crate::connection::Connection;
use crate::ic::InputContext;
use crate::keysym::Keysym;
use crate::toplevel::ToplevelRegistry;
use crate::wire::IcValues;

/// Parsed hot-key sets.
#[derive(Debug, Default)]
struct HotKeys {
    trigger: Vec<KeySpec>,
    off: Vec<KeySpec>,
    candidate: Vec<KeySpec>,
}

impl HotKeys {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            trigger: parse_keyspecs(&settings.hotkeys.trigger),
            off: parse_keyspecs(&settings.hotkeys.off),
            candidate: parse_keyspecs(&settings.hotkeys.candidate),
        }
    }
}

/// Two-key compose sequences, packed `(first << 16) | second` and binary
/// searched. Supplied by the compose-map loader.
#[derive(Debug, Default)]
pub struct ComposeMap {
    items: Vec<(u32, char)>,
}

impl ComposeMap {
    pub fn new(mut items: Vec<(u32, char)>) -> Self {
        items.sort_by_key(|(k, _)| *k);
        Self { items }
    }

    pub fn lookup(&self, first: Keysym, second: Keysym) -> Option<char> {
        let key = ((first.0 & 0xffff) << 16) | (second.0 & 0xffff);
        self.items
            .binary_search_by_key(&key, |(k, _)| *k)
            .ok()
            .map(|i| self.items[i].1)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The whole server: explicit state threaded through every entry point.
pub struct Server {
    pub settings: Settings,
    pub toplevels: ToplevelRegistry,
    pub hanja_table: HanjaTable,
    pub symbol_table: HanjaTable,
    pub compose_map: ComposeMap,
    /// Desktop-wide input mode, the per-desktop scope source.
    pub input_mode: InputMode,
    connections: HashMap<u16, Connection>,
    hotkeys: HotKeys,
    /// Keysym translation for non-QWERTY latin layouts, indexed by
    /// `keysym - '!'`.
    latin_remap: Option<Box<[Keysym; 94]>>,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self::with_tables(settings, HanjaTable::new(), HanjaTable::new())
    }

    pub fn with_tables(settings: Settings, hanja: HanjaTable, symbols: HanjaTable) -> Self {
        let hotkeys = HotKeys::from_settings(&settings);
        let input_mode = settings.input.default_mode;
        Self {
            settings,
            toplevels: ToplevelRegistry::new(),
            hanja_table: hanja,
            symbol_table: symbols,
            compose_map: ComposeMap::default(),
            input_mode,
            connections: HashMap::new(),
            hotkeys,
            latin_remap: None,
        }
    }

    /// Re-read the hot-key sets after a settings change.
    pub fn reload_hotkeys(&mut self) {
        self.hotkeys = HotKeys::from_settings(&self.settings);
    }

    /// Install a latin keyboard translation table.
    pub fn set_latin_remap(&mut self, table: [Keysym; 94]) {
        self.latin_remap = Some(Box::new(table));
    }

    /// Map a keysym through the latin layout table, if one is loaded.
    pub fn normalize_keysym(&self, keysym: Keysym) -> Keysym {
        match &self.latin_remap {
            Some(table) if keysym.is_printable() => {
                table[(keysym.0 - Keysym::EXCLAM.0) as usize]
            }
            _ => keysym,
        }
    }

    // Connection lifecycle.

    /// Register a client connection.
    pub fn connect(&mut self, id: u16, locale: Option<&str>) {
        debug!("new connection {id}, locale {locale:?}");
        let conn = Connection::new(id, locale, self.settings.input.default_mode);
        self.connections.insert(id, conn);
    }

    /// Drop a connection, cascading to all its ICs.
    pub fn disconnect(&mut self, id: u16, backend: &mut dyn Backend) {
        let Some(conn) = self.connections.get(&id) else {
            return;
        };
        for ic_id in conn.ic_ids() {
            self.destroy_ic(IcAddr::new(id, ic_id), backend);
        }
        self.connections.remove(&id);
        debug!("connection {id} closed");
    }

    pub fn connection(&self, id: u16) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connection_mut(&mut self, id: u16) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // IC lifecycle.

    /// Handle a CreateIC request. Returns the address of the new IC.
    pub fn create_ic(
        &mut self,
        conn_id: u16,
        values: IcValues,
        backend: &mut dyn Backend,
    ) -> Option<IcAddr> {
        let keyboard = KeyboardLayout::by_name(&self.settings.input.keyboard);
        let default_mode = self.settings.input.default_mode;
        let output_mode = self.settings.input.output_mode.into();

        let conn = self.connections.get_mut(&conn_id)?;
        let id = conn.alloc_ic_id();
        let mut ic = InputContext::new(conn_id, id, keyboard, default_mode);
        ic.hic.set_output_mode(output_mode);
        conn.insert_ic(ic);

        let addr = IcAddr::new(conn_id, id);
        self.ic_set_values(addr, values, backend);
        debug!("ic created: {}-{}", addr.conn, addr.ic);
        Some(addr)
    }

    /// Handle a DestroyIC request or a teardown cascade.
    pub fn destroy_ic(&mut self, addr: IcAddr, backend: &mut dyn Backend) {
        let Some(conn) = self.connections.get_mut(&addr.conn) else {
            return;
        };
        let Some(ic) = conn.remove_ic(addr.ic) else {
            return;
        };
        if ic.candidate.is_some() {
            backend.close_candidate_window(addr);
        }
        if let Some(window) = ic.preedit.window {
            backend.destroy_preedit_window(window);
        }
        if let Some(toplevel) = ic.toplevel {
            self.toplevels.release(toplevel);
        }
        debug!("ic destroyed: {}-{}", addr.conn, addr.ic);
    }

    pub fn ic(&self, addr: IcAddr) -> Option<&InputContext> {
        self.connections.get(&addr.conn)?.ic(addr.ic)
    }

    pub fn ic_mut(&mut self, addr: IcAddr) -> Option<&mut InputContext> {
        self.connections.get_mut(&addr.conn)?.ic_mut(addr.ic)
    }

    // Hot-keys.

    pub fn is_trigger_key(&self, keysym: Keysym, state: u32) -> bool {
        self.hotkeys.trigger.iter().any(|k| k.matches(keysym, state))
    }

    pub fn is_off_key(&self, keysym: Keysym, state: u32) -> bool {
        self.hotkeys.off.iter().any(|k| k.matches(keysym, state))
    }

    pub fn is_candidate_key(&self, keysym: Keysym, state: u32) -> bool {
        self.hotkeys
            .candidate
            .iter()
            .any(|k| k.matches(keysym, state))
    }
}
