use super::*;
use crate::config::InputModeScope;
use crate::keysym::mask;

#[test]
fn test_modifier_chord_flushes_and_passes() {
    let (mut server, mut backend, addr) = compose_setup(|_| {});

    type_keys(&mut server, &mut backend, addr, "rk");
    // Ctrl+A
    let consumed = server.key_press(addr, Keysym(b'a' as u32), mask::CONTROL, &mut backend);
    assert!(!consumed);
    assert_eq!(backend.commits(), ["가"]);
    assert!(server.ic(addr).unwrap().is_empty());
}

#[test]
fn test_off_key_commits_switches_and_forwards() {
    let (mut server, mut backend, addr) = compose_setup(|_| {});

    type_keys(&mut server, &mut backend, addr, "rk");
    let consumed = server.key_press(addr, Keysym::ESCAPE, 0, &mut backend);
    assert!(!consumed);
    assert_eq!(backend.commits(), ["가"]);
    assert_eq!(server.ic(addr).unwrap().mode, InputMode::Direct);
    assert!(backend.events.contains(&Event::Indicator(ModeIndicator::Direct)));
}

#[test]
fn test_trigger_key_toggles_mode() {
    let (mut server, mut backend, addr) = compose_setup(|_| {});

    assert!(server.key_press(addr, Keysym::HANGUL, 0, &mut backend));
    assert_eq!(server.ic(addr).unwrap().mode, InputMode::Direct);

    assert!(server.key_press(addr, Keysym::SPACE, mask::SHIFT, &mut backend));
    assert_eq!(server.ic(addr).unwrap().mode, InputMode::Compose);
    assert!(backend.events.contains(&Event::Indicator(ModeIndicator::Compose)));
}

#[test]
fn test_trigger_flushes_pending_composition() {
    let (mut server, mut backend, addr) = compose_setup(|_| {});

    type_keys(&mut server, &mut backend, addr, "rk");
    server.key_press(addr, Keysym::HANGUL, 0, &mut backend);
    assert_eq!(backend.commits(), ["가"]);
}

#[test]
fn test_bare_shift_is_ignored() {
    let (mut server, mut backend, addr) = compose_setup(|_| {});

    type_keys(&mut server, &mut backend, addr, "rk");
    let consumed = server.key_press(addr, Keysym::SHIFT_L, 0, &mut backend);
    assert!(!consumed);
    // no commit, composition untouched
    assert!(backend.commits().is_empty());
    assert_eq!(preedit_text(&server, addr), "가");
}

#[test]
fn test_per_toplevel_scope_shares_mode() {
    let mut settings = Settings::default();
    settings.input.mode_scope = InputModeScope::PerToplevel;
    let mut server = Server::with_tables(settings, Default::default(), Default::default());
    let mut backend = MockBackend::new();

    server.connect(1, None);
    let style = InputStyle::PREEDIT_CALLBACKS | InputStyle::STATUS_NOTHING;
    let a = server
        .create_ic(
            1,
            IcValues::new().with_style(style).with_client_window(100),
            &mut backend,
        )
        .unwrap();
    let b = server
        .create_ic(
            1,
            IcValues::new().with_style(style).with_client_window(100),
            &mut backend,
        )
        .unwrap();

    server.set_mode(a, InputMode::Compose, &mut backend);
    // the second IC still carries its creation mode until it focuses
    assert_eq!(server.ic(b).unwrap().mode, InputMode::Direct);
    server.set_focus(b, &mut backend);
    assert_eq!(server.ic(b).unwrap().mode, InputMode::Compose);
}

#[test]
fn test_per_application_scope_shares_mode() {
    let mut settings = Settings::default();
    settings.input.mode_scope = InputModeScope::PerApplication;
    let mut server = Server::with_tables(settings, Default::default(), Default::default());
    let mut backend = MockBackend::new();

    server.connect(1, None);
    let style = InputStyle::PREEDIT_CALLBACKS | InputStyle::STATUS_NOTHING;
    let a = server
        .create_ic(1, IcValues::new().with_style(style), &mut backend)
        .unwrap();
    let b = server
        .create_ic(1, IcValues::new().with_style(style), &mut backend)
        .unwrap();

    server.set_mode(a, InputMode::Compose, &mut backend);
    assert_eq!(server.connection(1).unwrap().mode, InputMode::Compose);
    server.set_focus(b, &mut backend);
    assert_eq!(server.ic(b).unwrap().mode, InputMode::Compose);
}

#[test]
fn test_per_desktop_scope_spans_connections() {
    let mut settings = Settings::default();
    settings.input.mode_scope = InputModeScope::PerDesktop;
    let mut server = Server::with_tables(settings, Default::default(), Default::default());
    let mut backend = MockBackend::new();

    server.connect(1, None);
    server.connect(2, None);
    let style = InputStyle::PREEDIT_CALLBACKS | InputStyle::STATUS_NOTHING;
    let a = server
        .create_ic(1, IcValues::new().with_style(style), &mut backend)
        .unwrap();
    let b = server
        .create_ic(2, IcValues::new().with_style(style), &mut backend)
        .unwrap();

    server.set_mode(a, InputMode::Compose, &mut backend);
    assert_eq!(server.input_mode, InputMode::Compose);
    server.set_focus(b, &mut backend);
    assert_eq!(server.ic(b).unwrap().mode, InputMode::Compose);
}

#[test]
fn test_per_ic_scope_keeps_modes_separate() {
    let (mut server, mut backend, addr) = compose_setup(|_| {});
    server.connect(2, None);
    let b = server
        .create_ic(
            2,
            IcValues::new().with_style(InputStyle::PREEDIT_CALLBACKS | InputStyle::STATUS_NOTHING),
            &mut backend,
        )
        .unwrap();

    server.set_focus(b, &mut backend);
    assert_eq!(server.ic(addr).unwrap().mode, InputMode::Compose);
    assert_eq!(server.ic(b).unwrap().mode, InputMode::Direct);
}

#[test]
fn test_dynamic_event_flow_wraps_lifecycle() {
    let (mut server, mut backend, addr) =
        compose_setup(|settings| settings.xim.dynamic_event_flow = true);

    server.set_mode(addr, InputMode::Direct, &mut backend);
    let done = backend
        .events
        .iter()
        .position(|e| *e == Event::PreeditDone)
        .unwrap();
    let ended = backend
        .events
        .iter()
        .position(|e| *e == Event::PreeditStateEnded)
        .unwrap();
    assert!(done < ended);

    backend.clear();
    server.set_mode(addr, InputMode::Compose, &mut backend);
    let started = backend
        .events
        .iter()
        .position(|e| *e == Event::PreeditStateStarted)
        .unwrap();
    let start = backend
        .events
        .iter()
        .position(|e| *e == Event::PreeditStart)
        .unwrap();
    assert!(started < start);
}

#[test]
fn test_status_callbacks_follow_mode() {
    let mut settings = Settings::default();
    settings.xim.show_status = true;
    let mut server = Server::with_tables(settings, Default::default(), Default::default());
    let mut backend = MockBackend::new();

    server.connect(1, None);
    let addr = server
        .create_ic(
            1,
            IcValues::new()
                .with_style(InputStyle::PREEDIT_CALLBACKS | InputStyle::STATUS_CALLBACKS),
            &mut backend,
        )
        .unwrap();

    server.set_mode(addr, InputMode::Compose, &mut backend);
    assert!(backend.events.contains(&Event::StatusDraw("한글".into())));

    backend.clear();
    server.set_mode(addr, InputMode::Direct, &mut backend);
    assert!(backend.events.contains(&Event::StatusDraw("영어".into())));
}

#[test]
fn test_unset_focus_flushes() {
    let (mut server, mut backend, addr) = compose_setup(|_| {});

    type_keys(&mut server, &mut backend, addr, "rk");
    server.unset_focus(addr, &mut backend);
    assert_eq!(backend.commits(), ["가"]);
    assert!(server.ic(addr).unwrap().is_empty());
}
