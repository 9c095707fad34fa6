//! The Hangul jamo automaton.
//!
//! Holds at most one syllable in progress (choseong, jungseong, jongseong)
//! and spills finished syllables into a commit string as keys arrive. The
//! embedding input context observes every transition through
//! [`CompositionHooks`] and may veto it, for example when the composed
//! preedit would not survive the client's locale encoding.

use crate::jamo;
use crate::keyboard::KeyboardLayout;

/// How finished text leaves the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Precomposed syllables, compatibility jamo for incomplete input.
    #[default]
    Syllable,
    /// Raw conjoining jamo.
    Jamo,
}

/// State snapshot handed to the transition hook.
///
/// The flags mirror the syllable the automaton holds when the jamo arrives;
/// on the flush-and-start-fresh plan both are false. `preedit` is the
/// preedit string as it would look after the transition.
#[derive(Debug)]
pub struct TransitionContext<'a> {
    pub has_jungseong: bool,
    pub has_jongseong: bool,
    pub preedit: &'a str,
}

/// Observation points into the automaton.
pub trait CompositionHooks {
    /// An ASCII key resolved to a jamo. Diagnostic only.
    fn translate(&self, key: u8, jamo: char) {
        let _ = (key, jamo);
    }

    /// The automaton is about to advance to a new jamo. Returning false
    /// vetoes the transition; a vetoed jamo is swallowed without any state
    /// change.
    fn transition(&self, jamo: char, ctx: &TransitionContext<'_>) -> bool {
        let _ = (jamo, ctx);
        true
    }
}

/// Hooks that approve everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl CompositionHooks for NoHooks {}

// Compound vowels reachable on a 2-set layout.
const JUNGSEONG_COMBOS: [(u32, u32, u32); 7] = [
    (0x1169, 0x1161, 0x116A), // ㅗ + ㅏ = ㅘ
    (0x1169, 0x1162, 0x116B), // ㅗ + ㅐ = ㅙ
    (0x1169, 0x1175, 0x116C), // ㅗ + ㅣ = ㅚ
    (0x116E, 0x1165, 0x116F), // ㅜ + ㅓ = ㅝ
    (0x116E, 0x1166, 0x1170), // ㅜ + ㅔ = ㅞ
    (0x116E, 0x1175, 0x1171), // ㅜ + ㅣ = ㅟ
    (0x1173, 0x1175, 0x1174), // ㅡ + ㅣ = ㅢ
];

// Jongseong clusters.
const JONGSEONG_COMBOS: [(u32, u32, u32); 11] = [
    (0x11A8, 0x11BA, 0x11AA), // ㄱ + ㅅ = ㄳ
    (0x11AB, 0x11BD, 0x11AC), // ㄴ + ㅈ = ㄵ
    (0x11AB, 0x11C2, 0x11AD), // ㄴ + ㅎ = ㄶ
    (0x11AF, 0x11A8, 0x11B0), // ㄹ + ㄱ = ㄺ
    (0x11AF, 0x11B7, 0x11B1), // ㄹ + ㅁ = ㄻ
    (0x11AF, 0x11B8, 0x11B2), // ㄹ + ㅂ = ㄼ
    (0x11AF, 0x11BA, 0x11B3), // ㄹ + ㅅ = ㄽ
    (0x11AF, 0x11C0, 0x11B4), // ㄹ + ㅌ = ㄾ
    (0x11AF, 0x11C1, 0x11B5), // ㄹ + ㅍ = ㄿ
    (0x11AF, 0x11C2, 0x11B6), // ㄹ + ㅎ = ㅀ
    (0x11B8, 0x11BA, 0x11B9), // ㅂ + ㅅ = ㅄ
];

fn combine_jungseong(a: char, b: char) -> Option<char> {
    JUNGSEONG_COMBOS
        .iter()
        .find(|(x, y, _)| *x == a as u32 && *y == b as u32)
        .and_then(|(_, _, c)| char::from_u32(*c))
}

fn combine_jongseong(a: char, b: char) -> Option<char> {
    JONGSEONG_COMBOS
        .iter()
        .find(|(x, y, _)| *x == a as u32 && *y == b as u32)
        .and_then(|(_, _, c)| char::from_u32(*c))
}

// Backspace peels one element: a cluster keeps its first component, a
// compound vowel keeps its first vowel, a simple jamo is removed.
fn decompose_jongseong(j: char) -> Option<char> {
    JONGSEONG_COMBOS
        .iter()
        .find(|(_, _, c)| *c == j as u32)
        .and_then(|(first, _, _)| char::from_u32(*first))
}

fn decompose_jungseong(v: char) -> Option<char> {
    JUNGSEONG_COMBOS
        .iter()
        .find(|(_, _, c)| *c == v as u32)
        .and_then(|(first, _, _)| char::from_u32(*first))
}

// When a vowel follows a closed syllable the (last) final consonant moves
// to the next syllable as its initial. Returns the jongseong left behind
// and the migrating choseong.
fn split_jongseong(j: char) -> Option<(Option<char>, char)> {
    if let Some(&(first, second, _)) = JONGSEONG_COMBOS.iter().find(|(_, _, c)| *c == j as u32) {
        let moved = jamo::jongseong_to_choseong(char::from_u32(second)?)?;
        return Some((char::from_u32(first), moved));
    }
    jamo::jongseong_to_choseong(j).map(|moved| (None, moved))
}

/// One in-progress Hangul syllable plus the commit spill-over of the most
/// recent `process` call.
#[derive(Debug)]
pub struct HangulIc {
    keyboard: KeyboardLayout,
    output_mode: OutputMode,
    cho: Option<char>,
    jung: Option<char>,
    jong: Option<char>,
    commit: String,
}

impl HangulIc {
    pub fn new(keyboard: KeyboardLayout) -> Self {
        Self {
            keyboard,
            output_mode: OutputMode::Syllable,
            cho: None,
            jung: None,
            jong: None,
            commit: String::new(),
        }
    }

    /// Replace the active keyboard layout by name.
    pub fn select_keyboard(&mut self, name: &str) {
        self.keyboard = KeyboardLayout::by_name(name);
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn is_empty(&self) -> bool {
        self.cho.is_none() && self.jung.is_none() && self.jong.is_none()
    }

    pub fn has_choseong(&self) -> bool {
        self.cho.is_some()
    }

    pub fn has_jungseong(&self) -> bool {
        self.jung.is_some()
    }

    pub fn has_jongseong(&self) -> bool {
        self.jong.is_some()
    }

    /// The in-progress syllable in display form.
    pub fn preedit_string(&self) -> String {
        Self::render(self.output_mode, self.cho, self.jung, self.jong)
    }

    /// Text finished by the most recent `process` call.
    pub fn commit_string(&self) -> &str {
        &self.commit
    }

    /// Drop the in-progress syllable without committing it.
    pub fn reset(&mut self) {
        self.cho = None;
        self.jung = None;
        self.jong = None;
        self.commit.clear();
    }

    /// Return the in-progress syllable as commit text and empty the
    /// automaton.
    pub fn flush(&mut self) -> String {
        let out = self.preedit_string();
        self.reset();
        out
    }

    /// Remove the most recently added jamo. Returns false when there is
    /// nothing left to remove.
    pub fn backspace(&mut self) -> bool {
        if let Some(jong) = self.jong {
            self.jong = decompose_jongseong(jong);
            true
        } else if let Some(jung) = self.jung {
            self.jung = decompose_jungseong(jung);
            true
        } else if self.cho.is_some() {
            self.cho = None;
            true
        } else {
            false
        }
    }

    /// Feed one printable key. Returns whether the key was consumed; the
    /// commit string is replaced either way and must be drained by the
    /// caller before the next call.
    pub fn process(&mut self, key: char, hooks: &dyn CompositionHooks) -> bool {
        self.commit.clear();
        let Some(target) = self.keyboard.lookup(key) else {
            // Not a Hangul key. Release the composition so the key can
            // follow it to the client in the right order.
            let flushed = self.preedit_string();
            self.cho = None;
            self.jung = None;
            self.jong = None;
            self.commit.push_str(&flushed);
            return false;
        };

        if key.is_ascii() {
            hooks.translate(key as u8, target);
        }

        if jamo::is_choseong(target) {
            self.process_choseong(target, hooks)
        } else if jamo::is_jungseong(target) {
            self.process_jungseong(target, hooks)
        } else {
            self.process_jongseong(target, hooks)
        }
    }

    fn render(mode: OutputMode, cho: Option<char>, jung: Option<char>, jong: Option<char>) -> String {
        match mode {
            OutputMode::Syllable => {
                if let (Some(c), Some(v)) = (cho, jung)
                    && let Some(s) = jamo::compose_syllable(c, v, jong)
                {
                    return s.to_string();
                }
                [cho, jung, jong]
                    .into_iter()
                    .flatten()
                    .map(jamo::to_compat)
                    .collect()
            }
            OutputMode::Jamo => [cho, jung, jong].into_iter().flatten().collect(),
        }
    }

    // Ask the hooks about a transition against the currently held syllable.
    fn approve(&self, jamo: char, preedit: &str, hooks: &dyn CompositionHooks) -> bool {
        hooks.transition(
            jamo,
            &TransitionContext {
                has_jungseong: self.has_jungseong(),
                has_jongseong: self.has_jongseong(),
                preedit,
            },
        )
    }

    // Flush the current syllable and begin a fresh one, unless the hooks
    // veto even the fresh state; then the jamo is swallowed whole.
    fn replace_syllable(
        &mut self,
        cho: Option<char>,
        jung: Option<char>,
        jong: Option<char>,
        jamo: char,
        hooks: &dyn CompositionHooks,
    ) -> bool {
        let preedit = Self::render(self.output_mode, cho, jung, jong);
        let ctx = TransitionContext {
            has_jungseong: false,
            has_jongseong: false,
            preedit: &preedit,
        };
        if !hooks.transition(jamo, &ctx) {
            return true;
        }
        let flushed = self.preedit_string();
        self.commit.push_str(&flushed);
        self.cho = cho;
        self.jung = jung;
        self.jong = jong;
        true
    }

    fn process_choseong(&mut self, cho: char, hooks: &dyn CompositionHooks) -> bool {
        if self.cho.is_none() && !self.is_empty() {
            // Vowel-initial syllable: joining here reorders the consonant
            // in front of the vowel. The hooks decide whether that is
            // allowed.
            let preedit = Self::render(self.output_mode, Some(cho), self.jung, self.jong);
            if self.approve(cho, &preedit, hooks) {
                self.cho = Some(cho);
                return true;
            }
        } else if self.cho.is_some() && self.jung.is_some() && self.jong.is_none() {
            if let Some(jong) = jamo::choseong_to_jongseong(cho) {
                let preedit = Self::render(self.output_mode, self.cho, self.jung, Some(jong));
                if self.approve(jong, &preedit, hooks) {
                    self.jong = Some(jong);
                    return true;
                }
            }
        } else if let Some(existing) = self.jong {
            if let Some(cluster) =
                jamo::choseong_to_jongseong(cho).and_then(|j| combine_jongseong(existing, j))
            {
                let preedit = Self::render(self.output_mode, self.cho, self.jung, Some(cluster));
                if self.approve(cluster, &preedit, hooks) {
                    self.jong = Some(cluster);
                    return true;
                }
            }
        }
        self.replace_syllable(Some(cho), None, None, cho, hooks)
    }

    fn process_jungseong(&mut self, jung: char, hooks: &dyn CompositionHooks) -> bool {
        if let Some(existing_jong) = self.jong {
            // A vowel after a closed syllable pulls the final consonant
            // over as the initial of the next one (간 + ㅏ = 가나). The
            // hooks see the still-closed syllable and may keep it closed.
            if let Some((remaining, moved_cho)) = split_jongseong(existing_jong) {
                let preedit = Self::render(self.output_mode, Some(moved_cho), Some(jung), None);
                if self.approve(jung, &preedit, hooks) {
                    let flushed = Self::render(self.output_mode, self.cho, self.jung, remaining);
                    self.commit.push_str(&flushed);
                    self.cho = Some(moved_cho);
                    self.jung = Some(jung);
                    self.jong = None;
                    return true;
                }
            }
        } else if self.jung.is_none() {
            if self.cho.is_some() {
                let preedit = Self::render(self.output_mode, self.cho, Some(jung), None);
                if self.approve(jung, &preedit, hooks) {
                    self.jung = Some(jung);
                    return true;
                }
            }
        } else if let Some(compound) = combine_jungseong(self.jung.unwrap(), jung) {
            let preedit = Self::render(self.output_mode, self.cho, Some(compound), None);
            if self.approve(compound, &preedit, hooks) {
                self.jung = Some(compound);
                return true;
            }
        }
        self.replace_syllable(None, Some(jung), None, jung, hooks)
    }

    // Only 3-set layouts produce jongseong directly.
    fn process_jongseong(&mut self, jong: char, hooks: &dyn CompositionHooks) -> bool {
        if self.cho.is_some() && self.jung.is_some() {
            if self.jong.is_none() {
                let preedit = Self::render(self.output_mode, self.cho, self.jung, Some(jong));
                if self.approve(jong, &preedit, hooks) {
                    self.jong = Some(jong);
                    return true;
                }
            } else if let Some(cluster) = combine_jongseong(self.jong.unwrap(), jong) {
                let preedit = Self::render(self.output_mode, self.cho, self.jung, Some(cluster));
                if self.approve(cluster, &preedit, hooks) {
                    self.jong = Some(cluster);
                    return true;
                }
            }
        }
        self.replace_syllable(None, None, Some(jong), jong, hooks)
    }
}

impl Default for HangulIc {
    fn default() -> Self {
        Self::new(KeyboardLayout::default())
    }
}
