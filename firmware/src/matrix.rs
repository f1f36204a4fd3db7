//! Key matrix scanning.
//!
//! Columns are outputs and rows are inputs: each column is driven active in
//! turn, allowed to settle, and every row is sampled. Samples go through the
//! per-cell debouncer; a debounced flip on a cell that carries a logical
//! position becomes a [`KeyEvent`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;

use crate::config::{KeySource, KeyboardConfig, MAX_COLS, MAX_ROWS};
use crate::debounce::Debouncer;
use crate::error::Fault;
use crate::keys::KeyEvent;

/// Logical pin access for the scanner. Lines are numbered from 0; `true`
/// always means "active" / "key closed", whatever the electrical polarity.
pub trait MatrixPins {
    fn drive_output(&mut self, line: usize, active: bool);
    fn read_input(&mut self, line: usize) -> bool;
    /// Wait for a freshly driven output to reach the inputs.
    fn settle(&mut self);
}

/// Transitions seen by one scan.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub presses: usize,
    pub releases: usize,
}

impl ScanSummary {
    pub fn is_empty(&self) -> bool {
        self.presses == 0 && self.releases == 0
    }
}

pub struct Scanner<'a> {
    matrix: &'a [&'a [u8]],
    debouncer: Debouncer,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &KeyboardConfig<'a>) -> Self {
        Self {
            matrix: config.matrix,
            debouncer: Debouncer::new(config.debounce),
        }
    }

    /// Scan every cell once, handing each debounced transition to `emit` in
    /// scan order. Stops at the first fault `emit` reports.
    pub fn scan<P, F>(&mut self, pins: &mut P, mut emit: F) -> Result<ScanSummary, Fault>
    where
        P: MatrixPins,
        F: FnMut(KeyEvent) -> Result<(), Fault>,
    {
        let mut summary = ScanSummary::default();
        let cols = self.matrix.first().map_or(0, |row| row.len());

        for col in 0..cols {
            pins.drive_output(col, true);
            pins.settle();

            for (row, positions) in self.matrix.iter().enumerate() {
                let raw = pins.read_input(row);
                let Some(pressed) = self.debouncer.update(row, col, raw) else {
                    continue;
                };
                let position = positions.get(col).copied().unwrap_or(0);
                let event = if pressed {
                    KeyEvent::press(position, KeySource::Local)
                } else {
                    KeyEvent::release(position, KeySource::Local)
                };
                let Some(event) = event else {
                    continue;
                };

                if pressed {
                    tracing::debug!(position, row, col, "key press");
                    summary.presses += 1;
                } else {
                    tracing::debug!(position, row, col, "key release");
                    summary.releases += 1;
                }

                if let Err(fault) = emit(event) {
                    pins.drive_output(col, false);
                    return Err(fault);
                }
            }

            pins.drive_output(col, false);
        }

        Ok(summary)
    }

    /// Debounced state of a cell.
    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.debouncer.is_pressed(row, col)
    }
}

/// [`MatrixPins`] over `embedded-hal` GPIO.
///
/// Pin errors are ignored: a failed read counts as an open switch and a
/// failed write leaves the line as it was.
pub struct GpioMatrix<I, O, D> {
    inputs: Vec<I, MAX_ROWS>,
    outputs: Vec<O, MAX_COLS>,
    delay: D,
    active_high: bool,
    settle_us: u32,
}

impl<I, O, D> GpioMatrix<I, O, D>
where
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    /// Diode matrix with outputs driven high and inputs pulled down.
    /// Outputs are released to the inactive level immediately.
    pub fn new(inputs: Vec<I, MAX_ROWS>, outputs: Vec<O, MAX_COLS>, delay: D) -> Self {
        let mut matrix = Self {
            inputs,
            outputs,
            delay,
            active_high: true,
            settle_us: 100,
        };
        for line in 0..matrix.outputs.len() {
            matrix.drive_output(line, false);
        }
        matrix
    }

    /// Use active-low outputs and pulled-up inputs instead.
    pub fn active_low(mut self) -> Self {
        self.active_high = false;
        for line in 0..self.outputs.len() {
            self.drive_output(line, false);
        }
        self
    }

    pub fn with_settle_us(mut self, settle_us: u32) -> Self {
        self.settle_us = settle_us;
        self
    }
}

impl<I, O, D> MatrixPins for GpioMatrix<I, O, D>
where
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    fn drive_output(&mut self, line: usize, active: bool) {
        let high = active == self.active_high;
        if let Some(pin) = self.outputs.get_mut(line) {
            let _ = if high { pin.set_high() } else { pin.set_low() };
        }
    }

    fn read_input(&mut self, line: usize) -> bool {
        let active_high = self.active_high;
        self.inputs
            .get_mut(line)
            .and_then(|pin| pin.is_high().ok())
            .is_some_and(|high| high == active_high)
    }

    fn settle(&mut self) {
        self.delay.delay_us(self.settle_us);
    }
}

/// In-memory matrix of switch states, for tests and host simulation.
#[derive(Clone, Debug, Default)]
pub struct SimMatrix {
    closed: [[bool; MAX_COLS]; MAX_ROWS],
    driven: Option<usize>,
}

impl SimMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, row: usize, col: usize, closed: bool) {
        if let Some(cell) = self.closed.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = closed;
        }
    }

    pub fn press(&mut self, row: usize, col: usize) {
        self.set(row, col, true);
    }

    pub fn release(&mut self, row: usize, col: usize) {
        self.set(row, col, false);
    }
}

impl MatrixPins for SimMatrix {
    fn drive_output(&mut self, line: usize, active: bool) {
        if active {
            self.driven = Some(line);
        } else if self.driven == Some(line) {
            self.driven = None;
        }
    }

    fn read_input(&mut self, line: usize) -> bool {
        let Some(col) = self.driven else {
            return false;
        };
        self.closed
            .get(line)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    fn settle(&mut self) {}
}
