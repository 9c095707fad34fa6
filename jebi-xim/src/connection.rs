//! One XIM client connection and its input contexts.

use std::collections::HashMap;

use encoding_rs::Encoding;
use tracing::debug;

use crate::config::InputMode;
use crate::ic::InputContext;

/// Per-client state. Owns every IC created over this connection; dropping
/// the connection drops them all.
#[derive(Debug)]
pub struct Connection {
    pub id: u16,
    /// Default mode for the per-application scope.
    pub mode: InputMode,
    next_ic_id: u16,
    ics: HashMap<u16, InputContext>,
    /// Client locale encoding, present only when it is not a UTF-8 alias.
    charset: Option<&'static Encoding>,
}

impl Connection {
    pub fn new(id: u16, locale: Option<&str>, default_mode: InputMode) -> Self {
        let charset = locale.and_then(encoding_for_locale);
        if let Some(charset) = charset {
            debug!("connection {id} uses encoding {}", charset.name());
        }
        Self {
            id,
            mode: default_mode,
            next_ic_id: 1,
            ics: HashMap::new(),
            charset,
        }
    }

    /// Allocate the next IC id; wraps around skipping zero.
    pub fn alloc_ic_id(&mut self) -> u16 {
        let id = self.next_ic_id;
        self.next_ic_id = self.next_ic_id.wrapping_add(1);
        if self.next_ic_id == 0 {
            self.next_ic_id = 1;
        }
        id
    }

    pub fn insert_ic(&mut self, ic: InputContext) {
        self.ics.insert(ic.id, ic);
    }

    pub fn remove_ic(&mut self, id: u16) -> Option<InputContext> {
        self.ics.remove(&id)
    }

    pub fn ic(&self, id: u16) -> Option<&InputContext> {
        if id == 0 {
            return None;
        }
        self.ics.get(&id)
    }

    pub fn ic_mut(&mut self, id: u16) -> Option<&mut InputContext> {
        if id == 0 {
            return None;
        }
        self.ics.get_mut(&id)
    }

    pub fn ic_ids(&self) -> Vec<u16> {
        self.ics.keys().copied().collect()
    }

    pub fn ic_count(&self) -> usize {
        self.ics.len()
    }

    pub fn charset(&self) -> Option<&'static Encoding> {
        self.charset
    }

    /// Whether outbound text has to be checked against the client locale.
    pub fn need_check_charset(&self) -> bool {
        self.charset.is_some()
    }

    /// True when `s` survives conversion into the client's encoding.
    pub fn is_valid_str(&self, s: &str) -> bool {
        charset_accepts(self.charset, s)
    }
}

/// True when `s` survives conversion into `charset` (no charset means any
/// text is fine).
pub fn charset_accepts(charset: Option<&'static Encoding>, s: &str) -> bool {
    match charset {
        Some(encoding) => {
            let (_, _, had_errors) = encoding.encode(s);
            !had_errors
        }
        None => true,
    }
}

/// Resolve the encoding part of a locale name like "ko_KR.eucKR". UTF-8
/// aliases yield `None`: no conversion is needed for them.
pub fn encoding_for_locale(locale: &str) -> Option<&'static Encoding> {
    let encoding = locale.split_once('.')?.1;
    let mut label = encoding.to_ascii_lowercase();
    if matches!(label.as_str(), "utf-8" | "utf8") {
        return None;
    }
    // X locale names write "eucKR" where the label registry wants "euc-kr"
    if let Some(rest) = label.strip_prefix("euc")
        && !rest.starts_with('-')
    {
        label = format!("euc-{rest}");
    }
    Encoding::for_label(label.as_bytes())
}
