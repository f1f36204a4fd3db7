//! Scripted runs of a source and a sink half on simulated hardware.
//!
//! A scenario is a JSON document: a few configuration overrides and a list
//! of steps. Keys are named by their logical position in the default layout;
//! each half's matrix locates the switch to close.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use firmware::config::{LEFT_MATRIX, RIGHT_MATRIX};
use firmware::{
    DebounceConfig, HostLink, Keyboard, KeyboardConfig, KeyboardReport, LinkError, NoPeer,
    PeerLink, ProtocolMode, Role, SimMatrix,
};
use serde::Deserialize;
use splitkb_keymap::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Press { half: Half, position: u8 },
    Release { half: Half, position: u8 },
    /// Run both halves for `count` timer periods.
    Tick {
        #[serde(default = "one")]
        count: u32,
    },
    /// Drop the next `count` sync messages on the link.
    Lose {
        #[serde(default = "one")]
        count: u32,
    },
    PeerDisconnect,
    PeerConnect,
    HostDisconnect,
    HostConnect,
    BootMode,
    ReportMode,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub debounce: Option<DebounceSettings>,
    #[serde(default)]
    pub max_keys: Option<usize>,
    #[serde(default)]
    pub report_keys: Option<usize>,
    #[serde(default)]
    pub release_remote_on_disconnect: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DebounceSettings {
    pub press_ms: u16,
    pub release_ms: u16,
    pub scan_interval_ms: u16,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing scenario")
    }

    fn apply(&self, config: &mut KeyboardConfig<'_>) {
        if let Some(d) = self.debounce {
            config.debounce = DebounceConfig {
                press_ms: d.press_ms,
                release_ms: d.release_ms,
                scan_interval_ms: d.scan_interval_ms,
            };
        }
        if let Some(max_keys) = self.max_keys {
            config.max_keys = max_keys;
        }
        if let Some(report_keys) = self.report_keys {
            config.report_keys = report_keys;
        }
        config.release_remote_on_disconnect = self.release_remote_on_disconnect;
    }
}

/// A report the source handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub tick: u32,
    pub mode: ProtocolMode,
    pub bytes: [u8; 8],
}

#[derive(Default)]
struct Host {
    frames: Rc<RefCell<Vec<(ProtocolMode, [u8; 8])>>>,
}

impl HostLink for Host {
    fn send_report(&mut self, mode: ProtocolMode, report: &KeyboardReport) -> Result<(), LinkError> {
        self.frames.borrow_mut().push((mode, report.to_bytes()));
        Ok(())
    }
}

/// Sink-to-source direction of the peer link.
#[derive(Clone, Default)]
struct Wire {
    queue: Rc<RefCell<VecDeque<Vec<u8>>>>,
}

impl PeerLink for Wire {
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.queue.borrow_mut().push_back(bytes.to_vec());
        Ok(())
    }
}

/// Summary of one scenario run.
#[derive(Debug, Default)]
pub struct Outcome {
    pub frames: Vec<Frame>,
    pub sync_messages: usize,
    pub lost_messages: usize,
    /// Positions still held on the source at the end, with their half.
    pub held: Vec<(Half, u8)>,
}

fn locate(matrix: &[&[u8]], position: u8) -> Option<(usize, usize)> {
    matrix.iter().enumerate().find_map(|(row, cells)| {
        cells
            .iter()
            .position(|&p| p == position)
            .map(|col| (row, col))
    })
}

pub fn run(scenario: &Scenario) -> Result<Outcome> {
    let mut source_config = KeyboardConfig::new(Role::Source, &LEFT_MATRIX);
    scenario.apply(&mut source_config);
    let mut sink_config = KeyboardConfig::new(Role::Sink, &RIGHT_MATRIX);
    scenario.apply(&mut sink_config);

    let host = Host::default();
    let frames = host.frames.clone();
    let wire = Wire::default();
    let queue = wire.queue.clone();

    let mut source = Keyboard::new(source_config, defaults::keymap(), SimMatrix::new(), host, NoPeer)
        .context("configuring source half")?;
    let mut sink = Keyboard::new(
        sink_config,
        defaults::keymap(),
        SimMatrix::new(),
        Host::default(),
        wire,
    )
    .context("configuring sink half")?;

    source.on_host_connected();
    source.on_peer_connected();
    sink.on_peer_connected();

    let mut outcome = Outcome::default();
    let mut tick = 0;
    let mut to_lose = 0;
    let mut seen = 0;

    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(index, ?step, "step");
        match *step {
            Step::Press { half, position } | Step::Release { half, position } => {
                let closed = matches!(step, Step::Press { .. });
                let (matrix, pins) = match half {
                    Half::Left => (&LEFT_MATRIX[..], source.pins_mut()),
                    Half::Right => (&RIGHT_MATRIX[..], sink.pins_mut()),
                };
                let (row, col) = locate(matrix, position).ok_or_else(|| {
                    anyhow!("step {}: position {} is not on the {:?} half", index, position, half)
                })?;
                pins.set(row, col, closed);
            }
            Step::Tick { count } => {
                for _ in 0..count {
                    tick += 1;
                    sink.on_timer()?;
                    sink.run_pending()?;

                    let messages: Vec<Vec<u8>> = queue.borrow_mut().drain(..).collect();
                    for message in messages {
                        outcome.sync_messages += 1;
                        if to_lose > 0 {
                            to_lose -= 1;
                            outcome.lost_messages += 1;
                            tracing::info!(tick, "sync message lost");
                            continue;
                        }
                        source.on_peer_data(&message)?;
                    }

                    source.on_timer()?;
                    source.run_pending()?;

                    let frames = frames.borrow();
                    for &(mode, bytes) in &frames[seen..] {
                        outcome.frames.push(Frame { tick, mode, bytes });
                    }
                    seen = frames.len();
                }
            }
            Step::Lose { count } => to_lose += count,
            Step::PeerDisconnect => {
                source.on_peer_disconnected()?;
                sink.on_peer_disconnected()?;
            }
            Step::PeerConnect => {
                source.on_peer_connected();
                sink.on_peer_connected();
            }
            Step::HostDisconnect => source.on_host_disconnected(),
            Step::HostConnect => source.on_host_connected(),
            Step::BootMode => source.set_protocol_mode(ProtocolMode::Boot),
            Step::ReportMode => source.set_protocol_mode(ProtocolMode::Report),
        }
    }

    outcome.held = source
        .keys()
        .iter()
        .map(|key| {
            let half = match key.source {
                firmware::KeySource::Local => Half::Left,
                firmware::KeySource::Remote => Half::Right,
            };
            (half, key.position)
        })
        .collect();

    Ok(outcome)
}
