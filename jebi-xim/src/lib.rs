//! jebi-xim: the input context core of the jebi XIM server.
//!
//! Clients speak the XIM wire protocol and receive composed Hangul
//! syllables as they type. This crate owns everything between the decoded
//! wire requests and the outward effects: connections and their input
//! contexts, the preedit lifecycle, the commit path, Hanja candidate
//! selection and the key dispatcher. The transport framing, window drawing
//! and tray UI live behind the [`backend::Backend`] trait.

pub mod backend;
pub mod candidate;
pub mod config;
pub mod connection;
pub mod ic;
pub mod keysym;
pub mod server;
pub mod toplevel;
pub mod ustring;
pub mod wire;

pub use backend::{Backend, IcAddr, ModeIndicator};
pub use config::{InputMode, InputModeScope, Settings};
pub use ic::InputContext;
pub use keysym::Keysym;
pub use server::Server;
pub use ustring::UString;
pub use wire::{IcValues, InputStyle};

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Install the tracing subscriber once, for embedding binaries.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    });
}
