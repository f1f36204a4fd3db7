//! The pipeline aggregate.
//!
//! [`Keyboard`] owns every piece of mutable pipeline state: debounce grid,
//! held keys, task queue, connection flags and the transports. Producers
//! ([`Keyboard::on_timer`], [`Keyboard::on_peer_data`]) only enqueue work;
//! [`Keyboard::run_pending`] is the single consumer and runs each task to
//! completion in FIFO order.

use splitkb_keymap::Keymap;

use crate::config::{KeySource, KeyboardConfig, Role};
use crate::error::{ConfigError, Fault, LinkError};
use crate::hid::{build_report, HostLeds, HostLink, KeyboardReport, ProtocolMode};
use crate::keys::KeyTracker;
use crate::link::{PeerLink, SyncMessage};
use crate::matrix::{MatrixPins, Scanner};
use crate::sched::{Task, TaskQueue};
use crate::translate::{translate, BASE_LAYER};

pub struct Keyboard<'a, P, H, L> {
    config: KeyboardConfig<'a>,
    keymap: Keymap<'a>,
    scanner: Scanner<'a>,
    tracker: KeyTracker,
    queue: TaskQueue,
    pins: P,
    host: H,
    peer: L,
    host_connected: bool,
    peer_connected: bool,
    protocol_mode: ProtocolMode,
    leds: HostLeds,
    layer: usize,
    last_report: KeyboardReport,
}

impl<'a, P, H, L> Keyboard<'a, P, H, L>
where
    P: MatrixPins,
    H: HostLink,
    L: PeerLink,
{
    /// Build a keyboard after checking the configuration and keymap. Both
    /// links start out disconnected.
    pub fn new(
        config: KeyboardConfig<'a>,
        keymap: Keymap<'a>,
        pins: P,
        host: H,
        peer: L,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        keymap.validate().map_err(ConfigError::Keymap)?;

        tracing::info!(
            role = ?config.role,
            rows = config.rows(),
            cols = config.cols(),
            layers = keymap.num_layers(),
            "keyboard ready"
        );

        Ok(Self {
            scanner: Scanner::new(&config),
            tracker: KeyTracker::new(config.max_keys),
            queue: TaskQueue::new(),
            config,
            keymap,
            pins,
            host,
            peer,
            host_connected: false,
            peer_connected: false,
            protocol_mode: ProtocolMode::default(),
            leds: HostLeds::default(),
            layer: BASE_LAYER,
            last_report: KeyboardReport::empty(),
        })
    }

    /// Scan timer tick. Coalesces with a scan that has not run yet.
    pub fn on_timer(&mut self) -> Result<(), Fault> {
        self.queue.request_scan()
    }

    /// Sync payload from the peer. Malformed payloads are dropped like any
    /// other lost message.
    pub fn on_peer_data(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        if self.config.role == Role::Sink {
            tracing::debug!(len = bytes.len(), "sink ignores sync data");
            return Ok(());
        }
        match SyncMessage::decode(bytes) {
            Ok(message) => {
                tracing::trace!(deltas = message.len(), "sync message received");
                self.queue.post(Task::Remote(message))
            }
            Err(error) => {
                tracing::warn!(%error, len = bytes.len(), "dropping malformed sync message");
                Ok(())
            }
        }
    }

    pub fn on_peer_connected(&mut self) {
        self.peer_connected = true;
        tracing::info!(role = ?self.config.role, "peer connected");
        if self.config.role == Role::Source {
            if let Err(error) = self.peer.enable_notifications() {
                tracing::warn!(%error, "could not enable peer notifications");
            }
        }
    }

    /// Remote keys stay held across a disconnect unless the configuration
    /// asks for them to be released.
    pub fn on_peer_disconnected(&mut self) -> Result<(), Fault> {
        self.peer_connected = false;
        tracing::info!(role = ?self.config.role, "peer disconnected");
        if self.config.role == Role::Source && self.config.release_remote_on_disconnect {
            let released = self.tracker.release_all(KeySource::Remote);
            if released > 0 {
                tracing::info!(released, "released remote keys");
                self.queue.post(Task::Report)?;
            }
        }
        Ok(())
    }

    pub fn on_host_connected(&mut self) {
        self.host_connected = true;
        tracing::info!("host connected");
    }

    pub fn on_host_disconnected(&mut self) {
        self.host_connected = false;
        self.protocol_mode = ProtocolMode::default();
        tracing::info!("host disconnected");
    }

    pub fn set_protocol_mode(&mut self, mode: ProtocolMode) {
        if mode != self.protocol_mode {
            tracing::info!(?mode, "protocol mode changed");
        }
        self.protocol_mode = mode;
    }

    /// Output report written by the host (lock LEDs).
    pub fn on_host_output_report(&mut self, report: &[u8]) {
        let leds = HostLeds::from_report(report);
        if leds.caps_lock() != self.leds.caps_lock() {
            tracing::info!(caps_lock = leds.caps_lock(), "caps lock changed");
        }
        self.leds = leds;
    }

    /// Drain the task queue. Returns how many tasks ran; a fault leaves the
    /// remaining tasks queued.
    pub fn run_pending(&mut self) -> Result<usize, Fault> {
        let mut ran = 0;
        while let Some(task) = self.queue.pop() {
            self.run_task(task)?;
            ran += 1;
        }
        Ok(ran)
    }

    fn run_task(&mut self, task: Task) -> Result<(), Fault> {
        match task {
            Task::Scan => self.scan(),
            Task::Translate => {
                self.layer = translate(&mut self.tracker, &self.keymap);
                tracing::trace!(layer = self.layer, keys = self.tracker.len(), "translated");
                self.queue.post(Task::Report)
            }
            Task::Report => {
                self.report();
                Ok(())
            }
            Task::Remote(message) => {
                for event in message.events(KeySource::Remote) {
                    self.tracker.apply(event);
                }
                self.queue.post(Task::Translate)
            }
        }
    }

    fn scan(&mut self) -> Result<(), Fault> {
        match self.config.role {
            Role::Source => {
                let tracker = &mut self.tracker;
                let summary = self.scanner.scan(&mut self.pins, |event| {
                    tracker.apply(event);
                    Ok(())
                })?;
                if summary.presses > 0 {
                    self.queue.post(Task::Translate)?;
                } else if summary.releases > 0 {
                    self.queue.post(Task::Report)?;
                }
            }
            Role::Sink => {
                let mut message = SyncMessage::new(self.config.max_keys);
                self.scanner.scan(&mut self.pins, |event| message.push(event))?;
                if !message.is_empty() {
                    self.send_sync(&message);
                }
            }
        }
        Ok(())
    }

    fn send_sync(&mut self, message: &SyncMessage) {
        if !self.peer_connected {
            tracing::debug!(deltas = message.len(), "peer not connected, sync message lost");
            return;
        }
        let bytes = message.encode();
        match self.peer.send(&bytes) {
            Ok(()) => tracing::trace!(deltas = message.len(), "sync message sent"),
            Err(LinkError::NotConnected) => {
                tracing::debug!(deltas = message.len(), "peer gone, sync message lost")
            }
        }
    }

    fn report(&mut self) {
        let report = build_report(&self.tracker, self.config.report_keys);
        self.last_report = report;
        if !self.host_connected {
            tracing::trace!("host not connected, report not sent");
            return;
        }
        match self.host.send_report(self.protocol_mode, &report) {
            Ok(()) => tracing::trace!(modifiers = report.modifiers, "report sent"),
            Err(LinkError::NotConnected) => tracing::trace!("host gone, report not sent"),
        }
    }

    pub fn keys(&self) -> &KeyTracker {
        &self.tracker
    }

    /// Most recently built report, whether or not it reached the host.
    pub fn last_report(&self) -> &KeyboardReport {
        &self.last_report
    }

    /// Layer in effect at the end of the last translation pass.
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn protocol_mode(&self) -> ProtocolMode {
        self.protocol_mode
    }

    pub fn host_leds(&self) -> HostLeds {
        self.leds
    }

    pub fn is_host_connected(&self) -> bool {
        self.host_connected
    }

    pub fn is_peer_connected(&self) -> bool {
        self.peer_connected
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn peer(&self) -> &L {
        &self.peer
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use splitkb_keymap::{Code, Keycode, Keymap};

    use super::Keyboard;
    use crate::config::{DebounceConfig, KeySource, KeyboardConfig, Role};
    use crate::error::{ConfigError, Fault, LinkError};
    use crate::hid::{HostLink, KeyboardReport, ProtocolMode};
    use crate::link::PeerLink;
    use crate::matrix::SimMatrix;

    #[derive(Default)]
    struct Host {
        reports: Vec<(ProtocolMode, [u8; 8])>,
    }

    impl HostLink for Host {
        fn send_report(
            &mut self,
            mode: ProtocolMode,
            report: &KeyboardReport,
        ) -> Result<(), LinkError> {
            self.reports.push((mode, report.to_bytes()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Peer {
        sent: Vec<Vec<u8>>,
        notifications: usize,
    }

    impl PeerLink for Peer {
        fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
            self.sent.push(bytes.to_vec());
            Ok(())
        }

        fn enable_notifications(&mut self) -> Result<(), LinkError> {
            self.notifications += 1;
            Ok(())
        }
    }

    static ROW0: [u8; 2] = [1, 2];
    static ROW1: [u8; 2] = [3, 4];
    static MATRIX: [&[u8]; 2] = [&ROW0, &ROW1];

    static BASE: [Code; 4] = [
        Code::key(Keycode::A),
        Code::key(Keycode::B),
        Code::key(Keycode::LShift),
        Code::key(Keycode::C),
    ];
    static LAYERS: [&[Code]; 1] = [&BASE];

    type TestKeyboard = Keyboard<'static, SimMatrix, Host, Peer>;

    fn keyboard(role: Role) -> TestKeyboard {
        let mut config = KeyboardConfig::new(role, &MATRIX);
        config.debounce = DebounceConfig {
            press_ms: 0,
            release_ms: 0,
            scan_interval_ms: 5,
        };
        let mut keyboard = Keyboard::new(
            config,
            Keymap::new(&LAYERS),
            SimMatrix::new(),
            Host::default(),
            Peer::default(),
        )
        .unwrap();
        keyboard.on_host_connected();
        keyboard.on_peer_connected();
        keyboard
    }

    fn tick(keyboard: &mut TestKeyboard) {
        keyboard.on_timer().unwrap();
        keyboard.run_pending().unwrap();
    }

    #[test]
    fn invalid_keymap_is_rejected() {
        static RAGGED: [&[Code]; 2] = [&BASE, &[Code::TRANS]];
        let result = Keyboard::new(
            KeyboardConfig::new(Role::Source, &MATRIX),
            Keymap::new(&RAGGED),
            SimMatrix::new(),
            Host::default(),
            Peer::default(),
        );
        assert!(matches!(result, Err(ConfigError::Keymap(_))));
    }

    #[test]
    fn source_press_translates_and_reports() {
        let mut keyboard = keyboard(Role::Source);
        keyboard.pins_mut().press(0, 1);
        tick(&mut keyboard);
        assert_eq!(
            keyboard.host().reports,
            [(ProtocolMode::Report, [0, 0, Keycode::B as u8, 0, 0, 0, 0, 0])]
        );

        keyboard.pins_mut().release(0, 1);
        tick(&mut keyboard);
        assert_eq!(keyboard.host().reports.len(), 2);
        assert!(keyboard.last_report().is_empty());
    }

    #[test]
    fn quiet_scan_sends_nothing() {
        let mut keyboard = keyboard(Role::Source);
        for _ in 0..3 {
            tick(&mut keyboard);
        }
        assert!(keyboard.host().reports.is_empty());
    }

    #[test]
    fn timer_ticks_coalesce_before_the_queue_drains() {
        let mut keyboard = keyboard(Role::Source);
        for _ in 0..100 {
            keyboard.on_timer().unwrap();
        }
        assert_eq!(keyboard.pending_tasks(), 1);
        assert_eq!(keyboard.run_pending(), Ok(1));
    }

    #[test]
    fn report_is_built_but_not_sent_without_host() {
        let mut keyboard = keyboard(Role::Source);
        assert!(keyboard.is_host_connected());
        keyboard.on_host_disconnected();
        assert!(!keyboard.is_host_connected());
        keyboard.pins_mut().press(0, 0);
        tick(&mut keyboard);
        assert!(keyboard.host().reports.is_empty());
        assert_eq!(keyboard.last_report().keys[0], Keycode::A as u8);
    }

    #[test]
    fn boot_mode_is_passed_to_the_host_link() {
        let mut keyboard = keyboard(Role::Source);
        keyboard.set_protocol_mode(ProtocolMode::Boot);
        keyboard.pins_mut().press(1, 0);
        tick(&mut keyboard);
        assert_eq!(keyboard.host().reports[0].0, ProtocolMode::Boot);
        assert_eq!(keyboard.host().reports[0].1[0], 0x02);
    }

    #[test]
    fn remote_release_only_message_still_retranslates() {
        let mut keyboard = keyboard(Role::Source);
        keyboard.on_peer_data(&[1, 2]).unwrap();
        keyboard.run_pending().unwrap();
        assert!(keyboard.keys().contains(2, KeySource::Remote));
        assert_eq!(keyboard.last_report().keys[0], Keycode::B as u8);

        keyboard.on_peer_data(&[1, (-2i8) as u8]).unwrap();
        assert_eq!(keyboard.run_pending(), Ok(3));
        assert!(keyboard.keys().is_empty());
        assert_eq!(keyboard.host().reports.len(), 2);
    }

    #[test]
    fn malformed_sync_data_is_dropped() {
        let mut keyboard = keyboard(Role::Source);
        keyboard.on_peer_data(&[]).unwrap();
        keyboard.on_peer_data(&[3, 1]).unwrap();
        keyboard.on_peer_data(&[1, 0]).unwrap();
        keyboard.on_peer_data(&[1, 0x80]).unwrap();
        assert_eq!(keyboard.pending_tasks(), 0);
    }

    #[test]
    fn sink_forwards_one_message_per_scan() {
        let mut keyboard = keyboard(Role::Sink);
        keyboard.pins_mut().press(0, 0);
        keyboard.pins_mut().press(1, 1);
        tick(&mut keyboard);
        assert_eq!(keyboard.peer().sent, [vec![2, 1, 4]]);
        assert!(keyboard.keys().is_empty());
        assert!(keyboard.host().reports.is_empty());

        tick(&mut keyboard);
        assert_eq!(keyboard.peer().sent.len(), 1);
    }

    #[test]
    fn sink_transition_overflow_is_fatal() {
        let mut config = KeyboardConfig::new(Role::Sink, &MATRIX);
        config.max_keys = 1;
        config.debounce.press_ms = 0;
        let mut keyboard = Keyboard::new(
            config,
            Keymap::new(&LAYERS),
            SimMatrix::new(),
            Host::default(),
            Peer::default(),
        )
        .unwrap();
        keyboard.pins_mut().press(0, 0);
        keyboard.pins_mut().press(0, 1);
        keyboard.on_timer().unwrap();
        assert_eq!(keyboard.run_pending(), Err(Fault::SyncBufferFull));
    }

    #[test]
    fn notifications_enabled_on_source_link_up() {
        let source = keyboard(Role::Source);
        assert_eq!(source.peer().notifications, 1);
        let sink = keyboard(Role::Sink);
        assert_eq!(sink.peer().notifications, 0);
    }

    #[test]
    fn remote_keys_survive_disconnect_by_default() {
        let mut keyboard = keyboard(Role::Source);
        keyboard.on_peer_data(&[1, 3]).unwrap();
        keyboard.run_pending().unwrap();
        assert!(keyboard.is_peer_connected());
        keyboard.on_peer_disconnected().unwrap();
        assert!(!keyboard.is_peer_connected());
        keyboard.run_pending().unwrap();
        assert!(keyboard.keys().contains(3, KeySource::Remote));
        assert_eq!(keyboard.last_report().modifiers, 0x02);
    }

    #[test]
    fn opt_in_disconnect_releases_remote_keys() {
        let mut config = KeyboardConfig::new(Role::Source, &MATRIX);
        config.release_remote_on_disconnect = true;
        config.debounce.press_ms = 0;
        let mut keyboard = Keyboard::new(
            config,
            Keymap::new(&LAYERS),
            SimMatrix::new(),
            Host::default(),
            Peer::default(),
        )
        .unwrap();
        keyboard.on_host_connected();
        keyboard.pins_mut().press(0, 0);
        tick(&mut keyboard);
        keyboard.on_peer_data(&[1, 3]).unwrap();
        keyboard.run_pending().unwrap();
        assert_eq!(keyboard.last_report().modifiers, 0x02);

        keyboard.on_peer_disconnected().unwrap();
        keyboard.run_pending().unwrap();
        assert!(!keyboard.keys().contains(3, KeySource::Remote));
        assert!(keyboard.keys().contains(1, KeySource::Local));
        assert_eq!(
            keyboard.last_report().to_bytes(),
            [0, 0, Keycode::A as u8, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn caps_lock_follows_host_output_report() {
        let mut keyboard = keyboard(Role::Source);
        assert!(!keyboard.host_leds().caps_lock());
        keyboard.on_host_output_report(&[0x02]);
        assert!(keyboard.host_leds().caps_lock());
        keyboard.on_host_output_report(&[0x00]);
        assert!(!keyboard.host_leds().caps_lock());
    }
}
