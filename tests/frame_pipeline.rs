use retroinput::config::CoreConfig;
use retroinput::device::{keys, DeviceKind, JoypadButton, MouseId};
use retroinput::gesture::{AccumulatorPolicy, KeyQueue, Point, RawKeyEvent, WidgetKey};
use retroinput::host::{HostBindings, InputHost, VideoSink};
use retroinput::plugin::Core;
use retroinput::surface::{FocusTarget, FrameBuffer, MouseButton, WidgetEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Host whose device levels are set by the test between frames.
#[derive(Default)]
struct ScriptedHost {
    levels: HashMap<(DeviceKind, u32, u32), u16>,
    polls: usize,
    presented: Vec<(u32, u32, usize)>,
}

impl ScriptedHost {
    fn set(&mut self, device: DeviceKind, index: u32, id: u32, value: u16) {
        self.levels.insert((device, index, id), value);
    }

    fn mouse(&mut self, dx: i16, dy: i16) {
        self.set(DeviceKind::Mouse, 0, MouseId::X.id(), dx as u16);
        self.set(DeviceKind::Mouse, 0, MouseId::Y.id(), dy as u16);
    }

    fn press(&mut self, button: JoypadButton, held: bool) {
        self.set(DeviceKind::Joypad, 0, button.id(), u16::from(held));
    }
}

impl InputHost for ScriptedHost {
    fn poll(&mut self) {
        self.polls += 1;
    }

    fn sample(&mut self, port: u32, device: DeviceKind, index: u32, id: u32) -> u16 {
        if port != 0 {
            return 0;
        }
        self.levels.get(&(device, index, id)).copied().unwrap_or(0)
    }
}

impl VideoSink for ScriptedHost {
    fn present(&mut self, frame: &FrameBuffer) {
        self.presented
            .push((frame.width(), frame.height(), frame.pitch()));
    }
}

fn small_core(policy: AccumulatorPolicy) -> Core {
    let mut config = CoreConfig::default();
    config.surface.width = 200;
    config.surface.height = 150;
    config.pointer.accumulator = policy;
    Core::new(config).unwrap()
}

fn moves(events: &[WidgetEvent]) -> Vec<Point> {
    events
        .iter()
        .filter_map(|event| match event {
            WidgetEvent::MouseMove { position } => Some(*position),
            _ => None,
        })
        .collect()
}

#[test]
fn mouse_motion_is_clamped_at_the_surface_edge() {
    let mut core = small_core(AccumulatorPolicy::Clamped);
    let mut host = ScriptedHost::default();
    let queue = KeyQueue::new();

    host.mouse(100, 100);
    let first = core.run(&mut host, &queue).unwrap();
    assert_eq!(moves(&first.widget_events), vec![Point::new(100, 100)]);

    host.mouse(5, -3);
    let second = core.run(&mut host, &queue).unwrap();
    assert_eq!(second.frame.mouse.new, Point::new(105, 97));
    assert_eq!(moves(&second.widget_events), vec![Point::new(105, 97)]);

    host.mouse(500, 3);
    let third = core.run(&mut host, &queue).unwrap();
    assert_eq!(third.frame.mouse.new, Point::new(605, 100));
    assert_eq!(moves(&third.widget_events), vec![Point::new(200, 100)]);
}

#[test]
fn unbounded_accumulator_stays_pinned_until_it_returns() {
    let mut core = small_core(AccumulatorPolicy::Unbounded);
    let mut host = ScriptedHost::default();
    let queue = KeyQueue::new();

    host.mouse(300, 0);
    core.run(&mut host, &queue).unwrap();
    assert_eq!(core.surface().position(), Point::new(200, 0));

    host.mouse(-50, 0);
    let back = core.run(&mut host, &queue).unwrap();
    assert_eq!(back.frame.mouse.new, Point::new(250, 0));
    assert_eq!(moves(&back.widget_events), vec![Point::new(200, 0)]);
    assert_eq!(core.surface().position(), Point::new(200, 0));
}

#[test]
fn still_frames_emit_no_changes_but_keep_presenting() {
    let mut core = small_core(AccumulatorPolicy::Clamped);
    let mut host = ScriptedHost::default();
    let queue = KeyQueue::new();

    host.set(DeviceKind::Keyboard, 0, keys::UNDO, 1);
    let first = core.run(&mut host, &queue).unwrap();
    assert_eq!(first.frame.changes.len(), 1);
    assert_eq!(first.frame.changes[0].device, DeviceKind::Keyboard);

    for _ in 0..3 {
        let report = core.run(&mut host, &queue).unwrap();
        assert!(report.frame.changes.is_empty());
        assert!(report.widget_events.is_empty());
    }

    assert_eq!(host.polls, 4);
    assert_eq!(host.presented, vec![(200, 150, 800); 4]);
}

#[test]
fn dpad_moves_pointer_and_held_a_clicks_there() {
    let mut core = small_core(AccumulatorPolicy::Clamped);
    let mut host = ScriptedHost::default();
    let queue = KeyQueue::new();

    host.press(JoypadButton::Right, true);
    core.run(&mut host, &queue).unwrap();
    core.run(&mut host, &queue).unwrap();
    assert_eq!(core.surface().position(), Point::new(40, 0));

    host.press(JoypadButton::Right, false);
    host.press(JoypadButton::A, true);
    let report = core.run(&mut host, &queue).unwrap();
    assert_eq!(
        report.widget_events,
        vec![
            WidgetEvent::MouseButtonPress {
                button: MouseButton::Left,
                position: Point::new(40, 0),
            },
            WidgetEvent::MouseButtonRelease {
                button: MouseButton::Left,
                position: Point::new(40, 0),
            },
        ]
    );
}

#[test]
fn select_toggles_focus_once_per_press() {
    let mut core = small_core(AccumulatorPolicy::Clamped);
    let mut host = ScriptedHost::default();
    let queue = KeyQueue::new();

    host.press(JoypadButton::Select, true);
    let mut toggles = 0;
    for _ in 0..5 {
        let report = core.run(&mut host, &queue).unwrap();
        toggles += report
            .widget_events
            .iter()
            .filter(|e| matches!(e, WidgetEvent::FocusChanged { .. }))
            .count();
    }
    assert_eq!(toggles, 1);
    assert_eq!(core.surface().focus(), FocusTarget::AddressBar);

    host.press(JoypadButton::Select, false);
    core.run(&mut host, &queue).unwrap();
    host.press(JoypadButton::Select, true);
    core.run(&mut host, &queue).unwrap();
    assert_eq!(core.surface().focus(), FocusTarget::Page);
}

#[test]
fn keys_pushed_during_poll_reach_the_widget_that_frame() {
    let queue = Arc::new(KeyQueue::new());
    let pusher = Arc::clone(&queue);
    let presented = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&presented);

    let mut bindings = HostBindings::builder()
        .poll(move || {
            pusher.push(RawKeyEvent {
                down: true,
                code: u32::from(b'h'),
                character: u32::from('h'),
                modifiers: 0,
            });
            pusher.push(RawKeyEvent {
                down: false,
                code: u32::from(b'h'),
                character: u32::from('h'),
                modifiers: 0,
            });
        })
        .sample(|_, _, _, _| 0)
        .video(move |_| *counter.lock().unwrap() += 1)
        .build()
        .unwrap();

    let mut core = Core::new(CoreConfig::default()).unwrap();
    let report = core.run(&mut bindings, &queue).unwrap();

    let keys_seen: Vec<(bool, WidgetKey)> = report
        .widget_events
        .iter()
        .filter_map(|event| match event {
            WidgetEvent::KeyPress { key, .. } => Some((true, *key)),
            WidgetEvent::KeyRelease { key, .. } => Some((false, *key)),
            _ => None,
        })
        .collect();
    assert_eq!(keys_seen, vec![(true, WidgetKey::H), (false, WidgetKey::H)]);
    assert_eq!(*presented.lock().unwrap(), 1);
}

#[test]
fn teardown_twice_is_safe() {
    let mut core = small_core(AccumulatorPolicy::Clamped);
    let mut host = ScriptedHost::default();
    core.run(&mut host, &KeyQueue::new()).unwrap();

    assert!(core.deinit());
    assert!(!core.deinit());
    assert!(core.run(&mut host, &KeyQueue::new()).is_err());
}
