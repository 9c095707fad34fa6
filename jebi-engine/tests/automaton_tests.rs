use jebi_engine::{
    CompositionHooks, HangulIc, KeyboardLayout, NoHooks, OutputMode, TransitionContext,
};

/// Type a key sequence, collecting everything the automaton commits along
/// the way.
fn type_keys(ic: &mut HangulIc, keys: &str) -> String {
    let mut committed = String::new();
    for key in keys.chars() {
        ic.process(key, &NoHooks);
        committed.push_str(ic.commit_string());
    }
    committed
}

#[test]
fn test_single_syllable() {
    let mut ic = HangulIc::default();

    // ㄱ + ㅏ = 가
    let committed = type_keys(&mut ic, "rk");
    assert_eq!(committed, "");
    assert_eq!(ic.preedit_string(), "가");
}

#[test]
fn test_closed_syllable() {
    let mut ic = HangulIc::default();

    // ㄱ + ㅏ + ㄴ = 간
    type_keys(&mut ic, "rks");
    assert_eq!(ic.preedit_string(), "간");
}

#[test]
fn test_lone_jamo_display() {
    let mut ic = HangulIc::default();

    type_keys(&mut ic, "r");
    assert_eq!(ic.preedit_string(), "ㄱ");

    ic.reset();
    type_keys(&mut ic, "k");
    assert_eq!(ic.preedit_string(), "ㅏ");
}

#[test]
fn test_jongseong_moves_to_next_syllable() {
    let mut ic = HangulIc::default();

    // 가 + ㄴ + ㅏ: the ㄴ closes 간, then moves over when ㅏ arrives
    let committed = type_keys(&mut ic, "rksk");
    assert_eq!(committed, "가");
    assert_eq!(ic.preedit_string(), "나");
}

#[test]
fn test_three_syllables() {
    let mut ic = HangulIc::default();

    // 가나다 over six keys
    let mut committed = type_keys(&mut ic, "rkskek");
    committed.push_str(&ic.flush());
    assert_eq!(committed, "가나다");
    assert!(ic.is_empty());
}

#[test]
fn test_compound_vowel() {
    let mut ic = HangulIc::default();

    // ㅇ + ㅗ + ㅏ = 와
    type_keys(&mut ic, "dhk");
    assert_eq!(ic.preedit_string(), "와");
}

#[test]
fn test_jongseong_cluster() {
    let mut ic = HangulIc::default();

    // ㄷ + ㅏ + ㄹ + ㄱ = 닭
    type_keys(&mut ic, "ekfr");
    assert_eq!(ic.preedit_string(), "닭");
}

#[test]
fn test_cluster_splits_on_vowel() {
    let mut ic = HangulIc::default();

    // 닭 + ㅣ: the ㄱ migrates, leaving 달 behind
    let committed = type_keys(&mut ic, "ekfrl");
    assert_eq!(committed, "달");
    assert_eq!(ic.preedit_string(), "기");
}

#[test]
fn test_backspace_steps_through_jamo() {
    let mut ic = HangulIc::default();

    type_keys(&mut ic, "rks");
    assert_eq!(ic.preedit_string(), "간");

    assert!(ic.backspace());
    assert_eq!(ic.preedit_string(), "가");
    assert!(ic.backspace());
    assert_eq!(ic.preedit_string(), "ㄱ");
    assert!(ic.backspace());
    assert!(ic.is_empty());
    assert!(!ic.backspace());
}

#[test]
fn test_backspace_decomposes_cluster() {
    let mut ic = HangulIc::default();

    type_keys(&mut ic, "ekfr");
    assert!(ic.backspace());
    assert_eq!(ic.preedit_string(), "달");
}

#[test]
fn test_backspace_decomposes_compound_vowel() {
    let mut ic = HangulIc::default();

    type_keys(&mut ic, "dhk");
    assert!(ic.backspace());
    assert_eq!(ic.preedit_string(), "오");
}

#[test]
fn test_non_hangul_key_releases_composition() {
    let mut ic = HangulIc::default();

    type_keys(&mut ic, "rk");
    let consumed = ic.process('1', &NoHooks);
    assert!(!consumed);
    assert_eq!(ic.commit_string(), "가");
    assert!(ic.is_empty());
}

#[test]
fn test_flush_empties_the_automaton() {
    let mut ic = HangulIc::default();

    type_keys(&mut ic, "rk");
    assert_eq!(ic.flush(), "가");
    assert!(ic.is_empty());
    assert_eq!(ic.flush(), "");
}

#[test]
fn test_reset_discards_preedit() {
    let mut ic = HangulIc::default();

    type_keys(&mut ic, "rk");
    ic.reset();
    assert!(ic.is_empty());
    assert_eq!(ic.commit_string(), "");
}

#[test]
fn test_jamo_output_mode() {
    let mut ic = HangulIc::default();
    ic.set_output_mode(OutputMode::Jamo);

    type_keys(&mut ic, "rk");
    assert_eq!(ic.preedit_string(), "\u{1100}\u{1161}");
}

#[test]
fn test_double_consonants() {
    let mut ic = HangulIc::default();

    // ㄲ + ㅏ + ㅆ = 깠
    type_keys(&mut ic, "RkT");
    assert_eq!(ic.preedit_string(), "깠");
}

#[test]
fn test_tense_consonant_cannot_close_syllable() {
    let mut ic = HangulIc::default();

    // ㄸ has no jongseong form, so it opens a new syllable
    let committed = type_keys(&mut ic, "rkE");
    assert_eq!(committed, "가");
    assert_eq!(ic.preedit_string(), "ㄸ");
}

/// Mirrors the auto-reorder-off policy of the server: no consonant may
/// reorder in front of a vowel, and no vowel may open a closed syllable.
struct NoReorder;

impl CompositionHooks for NoReorder {
    fn transition(&self, jamo: char, ctx: &TransitionContext<'_>) -> bool {
        if jebi_engine::jamo::is_choseong(jamo) && (ctx.has_jungseong || ctx.has_jongseong) {
            return false;
        }
        if jebi_engine::jamo::is_jungseong(jamo) && ctx.has_jongseong {
            return false;
        }
        true
    }
}

#[test]
fn test_reorder_allowed_by_default() {
    let mut ic = HangulIc::default();

    // ㅏ then ㄱ: permissive hooks reorder into 가
    ic.process('k', &NoHooks);
    ic.process('r', &NoHooks);
    assert_eq!(ic.preedit_string(), "가");
}

#[test]
fn test_reorder_vetoed_starts_new_syllable() {
    let mut ic = HangulIc::default();

    ic.process('k', &NoReorder);
    let consumed = ic.process('r', &NoReorder);
    assert!(consumed);
    assert_eq!(ic.commit_string(), "ㅏ");
    assert_eq!(ic.preedit_string(), "ㄱ");
}

#[test]
fn test_reassociation_vetoed_keeps_syllable_closed() {
    let mut ic = HangulIc::default();

    for key in "rks".chars() {
        ic.process(key, &NoReorder);
    }
    assert_eq!(ic.preedit_string(), "간");

    // 간 + ㅏ: the ㄴ may not move over, so 간 commits and ㅏ starts fresh
    let consumed = ic.process('k', &NoReorder);
    assert!(consumed);
    assert_eq!(ic.commit_string(), "간");
    assert_eq!(ic.preedit_string(), "ㅏ");
}

/// Vetoes every transition, as a charset filter would for a client locale
/// that cannot represent Hangul at all.
struct VetoAll;

impl CompositionHooks for VetoAll {
    fn transition(&self, _jamo: char, _ctx: &TransitionContext<'_>) -> bool {
        false
    }
}

#[test]
fn test_full_veto_swallows_without_state_change() {
    let mut ic = HangulIc::default();

    let consumed = ic.process('r', &VetoAll);
    assert!(consumed);
    assert!(ic.is_empty());
    assert_eq!(ic.commit_string(), "");

    // An existing composition also survives a vetoed key untouched.
    type_keys(&mut ic, "rk");
    let consumed = ic.process('s', &VetoAll);
    assert!(consumed);
    assert_eq!(ic.preedit_string(), "가");
    assert_eq!(ic.commit_string(), "");
}

#[test]
fn test_translate_hook_sees_jamo() {
    use std::cell::Cell;

    struct Recorder(Cell<Option<(u8, char)>>);

    impl CompositionHooks for Recorder {
        fn translate(&self, key: u8, jamo: char) {
            self.0.set(Some((key, jamo)));
        }
    }

    let mut ic = HangulIc::default();
    let hooks = Recorder(Cell::new(None));
    ic.process('r', &hooks);
    assert_eq!(hooks.0.get(), Some((b'r', '\u{1100}')));
}

#[test]
fn test_select_keyboard_keeps_state_shape() {
    let mut ic = HangulIc::new(KeyboardLayout::by_name("2set"));
    ic.select_keyboard("2");
    type_keys(&mut ic, "rk");
    assert_eq!(ic.preedit_string(), "가");
}
