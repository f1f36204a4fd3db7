//! End-to-end behaviour of a source and a sink wired back to back.

use std::cell::RefCell;
use std::rc::Rc;

use firmware::config::{LEFT_MATRIX, RIGHT_MATRIX};
use firmware::{
    DebounceConfig, HostLink, KeySource, Keyboard, KeyboardConfig, KeyboardReport, LinkError,
    NoPeer, PeerLink, ProtocolMode, Role, SimMatrix, SyncMessage,
};
use splitkb_keymap::{defaults, Code, Keycode, Keymap};

#[derive(Default)]
struct Host {
    reports: Vec<[u8; 8]>,
}

impl HostLink for Host {
    fn send_report(&mut self, _mode: ProtocolMode, report: &KeyboardReport) -> Result<(), LinkError> {
        self.reports.push(report.to_bytes());
        Ok(())
    }
}

/// One direction of the peer link. Messages wait in `outbox` until the test
/// delivers (or loses) them.
#[derive(Clone, Default)]
struct Wire {
    outbox: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl PeerLink for Wire {
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.outbox.borrow_mut().push(bytes.to_vec());
        Ok(())
    }
}

/// Rows and columns of the left half that hold a position, in the default
/// layout.
fn left(position: u8) -> (usize, usize) {
    let index = usize::from(position - 1);
    (index / 6, index % 6)
}

fn right(position: u8) -> (usize, usize) {
    let index = usize::from(position - 25);
    (index / 6, index % 6)
}

struct Split {
    source: Keyboard<'static, SimMatrix, Host, NoPeer>,
    sink: Keyboard<'static, SimMatrix, Host, Wire>,
    wire: Wire,
}

impl Split {
    fn new() -> Self {
        Self::with(|_| {})
    }

    fn with(tweak: impl Fn(&mut KeyboardConfig<'static>)) -> Self {
        let mut source_config = KeyboardConfig::new(Role::Source, &LEFT_MATRIX);
        tweak(&mut source_config);
        let mut sink_config = KeyboardConfig::new(Role::Sink, &RIGHT_MATRIX);
        tweak(&mut sink_config);

        let wire = Wire::default();
        let mut source = Keyboard::new(
            source_config,
            defaults::keymap(),
            SimMatrix::new(),
            Host::default(),
            NoPeer,
        )
        .unwrap();
        let mut sink = Keyboard::new(
            sink_config,
            defaults::keymap(),
            SimMatrix::new(),
            Host::default(),
            wire.clone(),
        )
        .unwrap();
        source.on_host_connected();
        source.on_peer_connected();
        sink.on_peer_connected();
        Self { source, sink, wire }
    }

    /// One timer period on both halves, delivering every sync message.
    fn tick(&mut self) {
        self.sink.on_timer().unwrap();
        self.sink.run_pending().unwrap();
        self.deliver();
        self.source.on_timer().unwrap();
        self.source.run_pending().unwrap();
    }

    /// Enough periods for a transition to pass the default debounce.
    fn settle(&mut self) {
        self.tick();
        self.tick();
    }

    fn deliver(&mut self) {
        let messages: Vec<Vec<u8>> = self.wire.outbox.borrow_mut().drain(..).collect();
        for message in messages {
            self.source.on_peer_data(&message).unwrap();
        }
    }

    fn lose_messages(&mut self) {
        self.wire.outbox.borrow_mut().clear();
    }

    fn press_left(&mut self, position: u8) {
        let (row, col) = left(position);
        self.source.pins_mut().press(row, col);
    }

    fn release_left(&mut self, position: u8) {
        let (row, col) = left(position);
        self.source.pins_mut().release(row, col);
    }

    fn press_right(&mut self, position: u8) {
        let (row, col) = right(position);
        self.sink.pins_mut().press(row, col);
    }

    fn release_right(&mut self, position: u8) {
        let (row, col) = right(position);
        self.sink.pins_mut().release(row, col);
    }

    fn report(&self) -> [u8; 8] {
        self.source.last_report().to_bytes()
    }
}

const LOWER: u8 = 23;
const RAISE: u8 = 44;

#[test]
fn two_by_two_matrix_reports_a_then_nothing() {
    static ROW0: [u8; 2] = [1, 2];
    static ROW1: [u8; 2] = [3, 4];
    static MATRIX: [&[u8]; 2] = [&ROW0, &ROW1];
    static BASE: [Code; 4] = [Code::key(Keycode::A), Code::TRANS, Code::TRANS, Code::TRANS];
    static LAYERS: [&[Code]; 1] = [&BASE];

    let mut config = KeyboardConfig::new(Role::Source, &MATRIX);
    // One scan period of debounce.
    config.debounce = DebounceConfig {
        press_ms: 5,
        release_ms: 5,
        scan_interval_ms: 5,
    };
    config.report_keys = 6;
    let mut keyboard = Keyboard::new(
        config,
        Keymap::new(&LAYERS),
        SimMatrix::new(),
        Host::default(),
        NoPeer,
    )
    .unwrap();
    keyboard.on_host_connected();

    keyboard.pins_mut().press(0, 0);
    for _ in 0..2 {
        keyboard.on_timer().unwrap();
        keyboard.run_pending().unwrap();
    }
    assert_eq!(keyboard.host().reports, [[0, 0, 0x04, 0, 0, 0, 0, 0]]);

    keyboard.pins_mut().release(0, 0);
    for _ in 0..2 {
        keyboard.on_timer().unwrap();
        keyboard.run_pending().unwrap();
    }
    assert_eq!(keyboard.host().reports.last(), Some(&[0; 8]));
    assert_eq!(keyboard.host().reports.len(), 2);
}

#[test]
fn modifier_only_key_sets_modifier_byte() {
    let mut split = Split::new();
    split.press_left(13);
    split.settle();
    assert_eq!(split.report(), [0x02, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn sink_keys_reach_the_host_through_the_source() {
    let mut split = Split::new();
    split.press_right(25);
    split.settle();
    assert_eq!(split.report(), [0, 0, Keycode::Y as u8, 0, 0, 0, 0, 0]);
    assert!(split.source.keys().contains(25, KeySource::Remote));

    split.release_right(25);
    split.settle();
    assert_eq!(split.report(), [0; 8]);
    assert!(split.source.keys().is_empty());
}

#[test]
fn one_sink_scan_is_one_message_in_scan_order() {
    let mut split = Split::new();
    split.press_right(26);
    split.settle();
    split.deliver();

    split.release_right(26);
    split.press_right(31);
    split.sink.on_timer().unwrap();
    split.sink.run_pending().unwrap();
    assert!(split.wire.outbox.borrow().is_empty());
    split.sink.on_timer().unwrap();
    split.sink.run_pending().unwrap();

    // Column 0 (position 31) is scanned before column 1 (position 26).
    let outbox = split.wire.outbox.borrow();
    assert_eq!(outbox.len(), 1);
    let message = SyncMessage::decode(&outbox[0]).unwrap();
    assert_eq!(message.deltas(), &[31, -26]);
}

#[test]
fn press_and_release_in_one_message_leave_the_key_set_unchanged() {
    let mut split = Split::new();
    split.press_left(2);
    split.settle();
    let before: Vec<_> = split.source.keys().iter().copied().collect();

    let mut message = SyncMessage::new(10);
    message.push(firmware::KeyEvent::press(30, KeySource::Local).unwrap()).unwrap();
    message.push(firmware::KeyEvent::release(30, KeySource::Local).unwrap()).unwrap();
    assert_eq!(message.len(), 2);
    split.source.on_peer_data(&message.encode()).unwrap();
    split.source.run_pending().unwrap();

    let after: Vec<_> = split.source.keys().iter().copied().collect();
    assert_eq!(before, after);
    assert_eq!(split.report(), [0, 0, Keycode::Q as u8, 0, 0, 0, 0, 0]);
}

#[test]
fn lower_on_the_source_shifts_keys_from_the_sink() {
    let mut split = Split::new();
    split.press_left(LOWER);
    split.settle();
    split.press_right(26);
    split.settle();
    assert_eq!(split.report(), [0, 0, Keycode::N7 as u8, 0, 0, 0, 0, 0]);
    assert_eq!(split.source.layer(), 1);
}

#[test]
fn raise_on_the_sink_shifts_keys_on_the_source() {
    let mut split = Split::new();
    split.press_right(RAISE);
    split.settle();
    split.press_left(2);
    split.settle();
    assert_eq!(split.report(), [0, 0, Keycode::F2 as u8, 0, 0, 0, 0, 0]);
}

#[test]
fn later_layer_key_wins() {
    let mut split = Split::new();
    split.press_left(LOWER);
    split.settle();
    split.press_right(RAISE);
    split.settle();
    split.press_left(3);
    split.settle();
    assert_eq!(split.report(), [0, 0, Keycode::F3 as u8, 0, 0, 0, 0, 0]);
    assert_eq!(split.source.layer(), 2);
}

#[test]
fn transparent_on_raise_falls_back_to_base() {
    let mut split = Split::new();
    split.press_right(RAISE);
    split.settle();
    // Position 13 is Left Shift on the base layer, transparent on raise.
    split.press_left(13);
    split.settle();
    assert_eq!(split.report(), [0x02, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn shifted_symbol_on_lower_carries_its_modifier() {
    let mut split = Split::new();
    split.press_left(LOWER);
    split.settle();
    split.press_left(8);
    split.settle();
    assert_eq!(split.report(), [0x02, 0, Keycode::N1 as u8, 0, 0, 0, 0, 0]);
}

#[test]
fn key_set_overflow_drops_presses_and_their_releases() {
    let mut split = Split::with(|config| config.max_keys = 4);
    for position in [2, 3, 4, 5] {
        split.press_left(position);
    }
    split.settle();
    split.press_left(6);
    split.settle();
    assert_eq!(split.source.keys().len(), 4);
    assert!(!split.source.keys().contains(6, KeySource::Local));

    split.release_left(6);
    split.settle();
    let positions: Vec<u8> = split.source.keys().iter().map(|k| k.position).collect();
    assert_eq!(positions, [2, 3, 4, 5]);
}

#[test]
fn report_truncates_to_capacity_in_press_order() {
    let mut split = Split::with(|config| config.report_keys = 2);
    split.press_left(2);
    split.settle();
    split.press_left(3);
    split.settle();
    split.press_left(4);
    split.settle();
    assert_eq!(
        split.report(),
        [0, 0, Keycode::Q as u8, Keycode::W as u8, 0, 0, 0, 0]
    );

    split.release_left(2);
    split.settle();
    assert_eq!(
        split.report(),
        [0, 0, Keycode::W as u8, Keycode::E as u8, 0, 0, 0, 0]
    );
}

#[test]
fn lost_release_leaves_a_stuck_remote_key() {
    let mut split = Split::new();
    split.press_right(25);
    split.settle();

    split.release_right(25);
    split.sink.on_timer().unwrap();
    split.sink.run_pending().unwrap();
    split.sink.on_timer().unwrap();
    split.sink.run_pending().unwrap();
    split.lose_messages();
    split.settle();
    assert!(split.source.keys().contains(25, KeySource::Remote));

    // A fresh press/release pair brings the halves back in step.
    split.press_right(25);
    split.settle();
    split.release_right(25);
    split.settle();
    assert!(split.source.keys().is_empty());
}

#[test]
fn opt_in_reset_clears_stuck_remote_keys_on_disconnect() {
    let mut split = Split::with(|config| config.release_remote_on_disconnect = true);
    split.press_right(25);
    split.press_left(2);
    split.settle();
    assert_eq!(split.source.keys().len(), 2);

    split.source.on_peer_disconnected().unwrap();
    split.source.run_pending().unwrap();
    assert!(!split.source.keys().contains(25, KeySource::Remote));
    assert_eq!(split.report(), [0, 0, Keycode::Q as u8, 0, 0, 0, 0, 0]);
}

#[test]
fn messages_sent_while_the_peer_is_down_are_lost() {
    let mut split = Split::new();
    split.sink.on_peer_disconnected().unwrap();
    split.press_right(25);
    split.settle();
    assert!(split.source.keys().is_empty());

    split.sink.on_peer_connected();
    split.release_right(25);
    split.settle();
    assert!(split.source.keys().is_empty());
    assert_eq!(split.report(), [0; 8]);
}
