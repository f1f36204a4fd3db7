//! Per-key debounce logic.
//!
//! Each cell carries a budget of milliseconds that the raw reading must stay
//! away from the debounced state before the state flips. Every scan that
//! disagrees spends one scan interval; every scan that agrees refills the
//! budget for the *next* transition (a pressed key is loaded with the release
//! threshold and vice versa), so a bounce has to persist for the full
//! threshold to count.

use crate::config::{DebounceConfig, MAX_COLS, MAX_ROWS};

/// Debounced state of one matrix cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub pressed: bool,
    /// Milliseconds of disagreeing raw state still needed before a flip.
    pub budget: u16,
}

impl Cell {
    pub const fn new(debounce: &DebounceConfig) -> Self {
        Self {
            pressed: false,
            budget: debounce.press_ms,
        }
    }

    /// Feed one raw sample. Returns `Some(pressed)` when the debounced state
    /// flips.
    pub fn update(&mut self, raw: bool, debounce: &DebounceConfig) -> Option<bool> {
        if raw == self.pressed {
            self.budget = threshold_for_leaving(self.pressed, debounce);
            return None;
        }

        if self.budget == 0 {
            self.pressed = raw;
            self.budget = threshold_for_leaving(raw, debounce);
            Some(raw)
        } else {
            self.budget = self.budget.saturating_sub(debounce.scan_interval_ms);
            None
        }
    }
}

/// Budget to load into a cell that currently sits in `pressed`.
fn threshold_for_leaving(pressed: bool, debounce: &DebounceConfig) -> u16 {
    if pressed {
        debounce.release_ms
    } else {
        debounce.press_ms
    }
}

/// Debounced state of the whole matrix.
pub struct Debouncer {
    cells: [[Cell; MAX_COLS]; MAX_ROWS],
    config: DebounceConfig,
}

impl Debouncer {
    pub const fn new(config: DebounceConfig) -> Self {
        Self {
            cells: [[Cell::new(&config); MAX_COLS]; MAX_ROWS],
            config,
        }
    }

    /// Feed the raw sample for `(row, col)`. Out-of-bounds cells never flip.
    pub fn update(&mut self, row: usize, col: usize, raw: bool) -> Option<bool> {
        let config = self.config;
        self.cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .and_then(|cell| cell.update(raw, &config))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Debounced pressed state of `(row, col)`.
    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(|cell| cell.pressed)
    }
}
