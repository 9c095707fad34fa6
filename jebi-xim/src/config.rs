//! Server configuration.
//!
//! Default values live in `config/default.toml`; the user's file is merged
//! on top of them, so a partial config only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::keysym::{Keysym, mask};

/// Default configuration TOML embedded from config/default.toml
const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Input mode of an input context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Keys go to the client untouched.
    Direct,
    /// Keys feed the Hangul automaton.
    Compose,
}

/// Where a mode change is remembered and re-read on focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModeScope {
    #[default]
    PerIc,
    PerToplevel,
    PerApplication,
    PerDesktop,
}

/// Shape of the committed candidate text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateFormat {
    #[default]
    #[serde(rename = "hanja")]
    Hanja,
    #[serde(rename = "hanja(hangul)")]
    HanjaHangul,
    #[serde(rename = "hangul(hanja)")]
    HangulHanja,
}

/// Automaton output granularity, mirrored into the engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Syllable,
    Jamo,
}

impl From<OutputMode> for jebi_engine::OutputMode {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Syllable => jebi_engine::OutputMode::Syllable,
            OutputMode::Jamo => jebi_engine::OutputMode::Jamo,
        }
    }
}

/// Configuration settings for the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub input: InputSettings,
    pub xim: XimSettings,
    pub candidate: CandidateSettings,
    pub hotkeys: HotkeySettings,
}

/// Composition-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    /// Mode a fresh input context starts in.
    pub default_mode: InputMode,
    /// Scope a mode change is written back to.
    #[serde(default)]
    pub mode_scope: InputModeScope,
    /// Hangul keyboard layout name.
    pub keyboard: String,
    /// Let out-of-order jamo rearrange into the current syllable; when off,
    /// they open a new syllable instead.
    pub auto_reorder: bool,
    /// Hold syllables and commit whole words on syllable breaks.
    pub commit_by_word: bool,
    #[serde(default)]
    pub output_mode: OutputMode,
}

/// Wire-level behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XimSettings {
    /// Send PreeditStart/PreeditEnd state messages around the lifecycle.
    pub dynamic_event_flow: bool,
    /// Drive the status area of clients that request one.
    pub show_status: bool,
}

/// Candidate window behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSettings {
    pub format: CandidateFormat,
    pub use_simplified_chinese: bool,
}

/// Hot-key sets, each a list of key specs like "Hangul" or "Shift+space".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeySettings {
    pub trigger: Vec<String>,
    pub off: Vec<String>,
    pub candidate: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("embedded default.toml must be valid")
    }
}

/// Recursively merge `overlay` TOML values on top of `base`.
fn merge_toml(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(key) {
                    merge_toml(base_value, value);
                } else {
                    base_table.insert(key.clone(), value.clone());
                }
            }
        }
        (base, _) => {
            *base = overlay.clone();
        }
    }
}

/// Parse user TOML content merged on top of default.toml.
fn parse_with_defaults(user_content: &str) -> Result<Settings> {
    let mut base: toml::Value = toml::from_str(DEFAULT_CONFIG_TOML)?;
    let user: toml::Value = toml::from_str(user_content)?;
    merge_toml(&mut base, &user);
    let settings: Settings = base.try_into()?;
    Ok(settings)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("im", "jebi", "jebi")
}

impl Settings {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the data directory path (Hanja and symbol tables live here).
    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load settings from the default configuration file.
    /// Falls back to embedded default.toml if the config file does not exist.
    pub fn load() -> Result<Self> {
        let Some(config_file) = Self::config_file() else {
            warn!("Could not determine config directory, using defaults");
            return Ok(Self::default());
        };

        if !config_file.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        debug!("Loading config from {:?}", config_file);
        let content = fs::read_to_string(&config_file)?;
        parse_with_defaults(&content)
    }

    /// Load settings from a specific file, merged on top of defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        parse_with_defaults(&content)
    }

    /// Save settings to the default configuration file
    pub fn save(&self) -> Result<()> {
        let Some(config_file) = Self::config_file() else {
            anyhow::bail!("Could not determine config directory");
        };

        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!("Saving config to {:?}", config_file);
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_file, content)?;
        Ok(())
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// A parsed hot-key: keysym plus exact modifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub keysym: Keysym,
    pub modifiers: u32,
}

impl KeySpec {
    /// Parse a spec like "Hangul", "Shift+space" or "Ctrl+F9".
    /// Returns `None` for names this server does not know.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut modifiers = 0u32;
        let mut keysym = None;
        for part in spec.split('+') {
            match part {
                "Shift" => modifiers |= mask::SHIFT,
                "Ctrl" | "Control" => modifiers |= mask::CONTROL,
                "Alt" => modifiers |= mask::MOD1,
                "Super" => modifiers |= mask::MOD4,
                "Mod3" => modifiers |= mask::MOD3,
                "Mod5" => modifiers |= mask::MOD5,
                name => keysym = Some(keysym_by_name(name)?),
            }
        }
        keysym.map(|keysym| Self { keysym, modifiers })
    }

    /// True when the event matches this spec, ignoring lock bits.
    pub fn matches(&self, keysym: Keysym, state: u32) -> bool {
        self.keysym == keysym && (state & mask::HOTKEY) == self.modifiers
    }
}

fn keysym_by_name(name: &str) -> Option<Keysym> {
    let keysym = match name {
        "space" => Keysym::SPACE,
        "BackSpace" => Keysym::BACKSPACE,
        "Tab" => Keysym::TAB,
        "Return" => Keysym::RETURN,
        "Escape" => Keysym::ESCAPE,
        "Delete" => Keysym::DELETE,
        "Hangul" => Keysym::HANGUL,
        "Hangul_Hanja" => Keysym::HANGUL_HANJA,
        _ => {
            if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok())
                && (1..=12).contains(&n)
            {
                return Some(Keysym(Keysym::F1.0 + n - 1));
            }
            let mut chars = name.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return None;
            };
            if !c.is_ascii_graphic() {
                return None;
            }
            Keysym(c as u32)
        }
    };
    Some(keysym)
}

/// Parse a hot-key list, dropping specs that do not resolve.
pub fn parse_keyspecs(specs: &[String]) -> Vec<KeySpec> {
    specs
        .iter()
        .filter_map(|s| {
            let parsed = KeySpec::parse(s);
            if parsed.is_none() {
                warn!("ignoring unknown hot-key spec '{s}'");
            }
            parsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.input.default_mode, InputMode::Direct);
        assert_eq!(settings.input.mode_scope, InputModeScope::PerIc);
        assert!(settings.input.auto_reorder);
        assert!(!settings.input.commit_by_word);
        assert_eq!(settings.candidate.format, CandidateFormat::Hanja);
        assert_eq!(settings.hotkeys.off, ["Escape"]);
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = Settings::default();
        let toml_str = toml::to_string(&settings).unwrap();
        let loaded: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded.input.default_mode, settings.input.default_mode);
        assert_eq!(loaded.candidate.format, settings.candidate.format);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[input]
commit_by_word = true
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert!(settings.input.commit_by_word);
        // Unspecified values fall back to the embedded defaults
        assert_eq!(settings.input.keyboard, "2set");
        assert_eq!(settings.hotkeys.trigger, ["Hangul", "Shift+space"]);
    }

    #[test]
    fn test_candidate_format_names() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[candidate]
format = "hanja(hangul)"
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.candidate.format, CandidateFormat::HanjaHangul);
    }

    #[test]
    fn test_keyspec_parse() {
        let spec = KeySpec::parse("Shift+space").unwrap();
        assert_eq!(spec.keysym, Keysym::SPACE);
        assert_eq!(spec.modifiers, mask::SHIFT);

        let spec = KeySpec::parse("Hangul").unwrap();
        assert_eq!(spec.keysym, Keysym::HANGUL);
        assert_eq!(spec.modifiers, 0);

        let spec = KeySpec::parse("F9").unwrap();
        assert_eq!(spec.keysym, Keysym::F9);

        assert!(KeySpec::parse("NoSuchKey").is_none());
    }

    #[test]
    fn test_keyspec_matches_exact_modifiers() {
        let spec = KeySpec::parse("Shift+space").unwrap();
        assert!(spec.matches(Keysym::SPACE, mask::SHIFT));
        // Caps lock does not break the match
        assert!(spec.matches(Keysym::SPACE, mask::SHIFT | mask::LOCK));
        assert!(!spec.matches(Keysym::SPACE, 0));
        assert!(!spec.matches(Keysym::SPACE, mask::SHIFT | mask::CONTROL));
    }

    #[test]
    fn test_parse_keyspecs_drops_unknown() {
        let specs = parse_keyspecs(&["Hangul".into(), "Bogus+".into()]);
        assert_eq!(specs.len(), 1);
    }
}
