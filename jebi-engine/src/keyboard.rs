//! Keyboard layouts: printable ASCII keys to jamo.
//!
//! A layout is a 94-entry table indexed by `key - b'!'`. Keys with no Hangul
//! assignment stay `None` and fall through to the client untouched.

/// Layout family. 2-set layouts share one key between choseong and
/// jongseong roles; 3-set layouts assign them separate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Set2,
    Set3,
}

/// A named key-to-jamo table.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    pub kind: LayoutKind,
    pub name: &'static str,
    table: [Option<char>; 94],
}

impl KeyboardLayout {
    /// The standard Korean 2-set layout (dubeolsik, KS X 5002).
    pub fn dubeolsik() -> Self {
        let mut table: [Option<char>; 94] = [None; 94];
        let assign = |table: &mut [Option<char>; 94], key: u8, jamo: u32| {
            table[(key - b'!') as usize] = char::from_u32(jamo);
        };

        // Consonant row, stored as choseong. The automaton converts to
        // jongseong when the key closes a syllable.
        assign(&mut table, b'r', 0x1100); // ㄱ
        assign(&mut table, b'R', 0x1101); // ㄲ
        assign(&mut table, b's', 0x1102); // ㄴ
        assign(&mut table, b'e', 0x1103); // ㄷ
        assign(&mut table, b'E', 0x1104); // ㄸ
        assign(&mut table, b'f', 0x1105); // ㄹ
        assign(&mut table, b'a', 0x1106); // ㅁ
        assign(&mut table, b'q', 0x1107); // ㅂ
        assign(&mut table, b'Q', 0x1108); // ㅃ
        assign(&mut table, b't', 0x1109); // ㅅ
        assign(&mut table, b'T', 0x110A); // ㅆ
        assign(&mut table, b'd', 0x110B); // ㅇ
        assign(&mut table, b'w', 0x110C); // ㅈ
        assign(&mut table, b'W', 0x110D); // ㅉ
        assign(&mut table, b'c', 0x110E); // ㅊ
        assign(&mut table, b'z', 0x110F); // ㅋ
        assign(&mut table, b'x', 0x1110); // ㅌ
        assign(&mut table, b'v', 0x1111); // ㅍ
        assign(&mut table, b'g', 0x1112); // ㅎ

        // Vowel row, stored as jungseong.
        assign(&mut table, b'k', 0x1161); // ㅏ
        assign(&mut table, b'o', 0x1162); // ㅐ
        assign(&mut table, b'i', 0x1163); // ㅑ
        assign(&mut table, b'O', 0x1164); // ㅒ
        assign(&mut table, b'j', 0x1165); // ㅓ
        assign(&mut table, b'p', 0x1166); // ㅔ
        assign(&mut table, b'u', 0x1167); // ㅕ
        assign(&mut table, b'P', 0x1168); // ㅖ
        assign(&mut table, b'h', 0x1169); // ㅗ
        assign(&mut table, b'y', 0x116D); // ㅛ
        assign(&mut table, b'n', 0x116E); // ㅜ
        assign(&mut table, b'b', 0x1172); // ㅠ
        assign(&mut table, b'm', 0x1173); // ㅡ
        assign(&mut table, b'l', 0x1175); // ㅣ

        // Shifted vowels with no distinct assignment inherit the base key.
        assign(&mut table, b'K', 0x1161);
        assign(&mut table, b'I', 0x1163);
        assign(&mut table, b'J', 0x1165);
        assign(&mut table, b'U', 0x1167);
        assign(&mut table, b'H', 0x1169);
        assign(&mut table, b'Y', 0x116D);
        assign(&mut table, b'N', 0x116E);
        assign(&mut table, b'B', 0x1172);
        assign(&mut table, b'M', 0x1173);
        assign(&mut table, b'L', 0x1175);
        assign(&mut table, b'A', 0x1106);
        assign(&mut table, b'S', 0x1102);
        assign(&mut table, b'D', 0x110B);
        assign(&mut table, b'F', 0x1105);
        assign(&mut table, b'G', 0x1112);
        assign(&mut table, b'Z', 0x110F);
        assign(&mut table, b'X', 0x1110);
        assign(&mut table, b'C', 0x110E);
        assign(&mut table, b'V', 0x1111);

        Self {
            kind: LayoutKind::Set2,
            name: "2set",
            table,
        }
    }

    /// Resolve a layout by its configured name. Unknown names fall back to
    /// the 2-set layout.
    pub fn by_name(name: &str) -> Self {
        match name {
            "2" | "2set" | "dubeolsik" => Self::dubeolsik(),
            "3" | "3set" | "sebeolsik" => {
                tracing::debug!("no 3-set table bundled, using 2set");
                Self::dubeolsik()
            }
            other => {
                tracing::warn!("unknown keyboard layout '{other}', using 2set");
                Self::dubeolsik()
            }
        }
    }

    /// Jamo assigned to a printable ASCII key, if any.
    pub fn lookup(&self, key: char) -> Option<char> {
        if !key.is_ascii() {
            return None;
        }
        let idx = (key as u32).wrapping_sub('!' as u32);
        *self.table.get(idx as usize)?
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::dubeolsik()
    }
}
