//! Keyboard configuration.
//!
//! Capacities are compile-time bounds so every buffer can live in a fixed
//! `heapless` container; the runtime configuration picks values at or below
//! those bounds.

use splitkb_keymap::defaults::KEYS_PER_HALF;

use crate::error::ConfigError;

/// Largest supported number of matrix rows (input lines).
pub const MAX_ROWS: usize = 8;
/// Largest supported number of matrix columns (output lines).
pub const MAX_COLS: usize = 16;
/// Capacity of the active key set.
pub const MAX_KEYS: usize = 16;
/// Capacity of one sync message, in deltas.
pub const MAX_SYNC_DELTAS: usize = 16;
/// Depth of the task queue.
pub const QUEUE_DEPTH: usize = 16;
/// Key slots in a keyboard input report.
pub const REPORT_KEYS: usize = 6;
/// Bytes in a keyboard input report: modifiers, reserved, key slots.
pub const REPORT_LEN: usize = REPORT_KEYS + 2;

/// Which half this unit is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Owns the host connection and runs translation.
    Source,
    /// Scans and forwards raw transitions to the source.
    Sink,
}

/// Which half produced a key event. Both halves number their positions
/// independently, so this tag is part of a key's identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeySource {
    Local,
    Remote,
}

/// Debounce thresholds, in milliseconds of stable raw state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DebounceConfig {
    pub press_ms: u16,
    pub release_ms: u16,
    /// Period of the scan timer; each scan spends this much budget.
    pub scan_interval_ms: u16,
}

impl DebounceConfig {
    pub const fn new() -> Self {
        Self {
            press_ms: 5,
            release_ms: 5,
            scan_interval_ms: 5,
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug)]
pub struct KeyboardConfig<'a> {
    pub role: Role,
    /// Logical position of every matrix cell, `matrix[row][col]`. Rows are
    /// inputs, columns are driven outputs. 0 marks a cell with no switch.
    pub matrix: &'a [&'a [u8]],
    pub debounce: DebounceConfig,
    /// Most keys tracked at once; further presses are dropped. On a sink
    /// this also bounds one sync message.
    pub max_keys: usize,
    /// Key slots filled in each report.
    pub report_keys: usize,
    /// Forget every remote key when the peer link drops.
    pub release_remote_on_disconnect: bool,
}

impl<'a> KeyboardConfig<'a> {
    pub const fn new(role: Role, matrix: &'a [&'a [u8]]) -> Self {
        Self {
            role,
            matrix,
            debounce: DebounceConfig::new(),
            max_keys: 10,
            report_keys: REPORT_KEYS,
            release_remote_on_disconnect: false,
        }
    }

    pub fn rows(&self) -> usize {
        self.matrix.len()
    }

    pub fn cols(&self) -> usize {
        self.matrix.first().map_or(0, |row| row.len())
    }

    /// Logical position at `(row, col)`, 0 if none.
    pub fn position(&self, row: usize, col: usize) -> u8 {
        self.matrix
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rows = self.rows();
        let cols = self.cols();
        if rows > MAX_ROWS {
            return Err(ConfigError::TooManyRows { rows, max: MAX_ROWS });
        }
        if cols > MAX_COLS {
            return Err(ConfigError::TooManyCols { cols, max: MAX_COLS });
        }
        for (row, cells) in self.matrix.iter().enumerate() {
            if cells.len() != cols {
                return Err(ConfigError::RaggedMatrix {
                    row,
                    cols: cells.len(),
                    expected: cols,
                });
            }
            for (col, &position) in cells.iter().enumerate() {
                if position > i8::MAX as u8 {
                    return Err(ConfigError::PositionOutOfRange { row, col, position });
                }
            }
        }

        let max_keys = match self.role {
            Role::Source => MAX_KEYS,
            Role::Sink => MAX_SYNC_DELTAS,
        };
        if self.max_keys == 0 || self.max_keys > max_keys {
            return Err(ConfigError::MaxKeys {
                value: self.max_keys,
                max: max_keys,
            });
        }
        if self.report_keys == 0 || self.report_keys > REPORT_KEYS {
            return Err(ConfigError::ReportKeys {
                value: self.report_keys,
                max: REPORT_KEYS,
            });
        }
        if self.debounce.scan_interval_ms == 0 {
            return Err(ConfigError::ZeroScanInterval);
        }

        Ok(())
    }
}

const fn half_row(first: u8) -> [u8; 6] {
    [first, first + 1, first + 2, first + 3, first + 4, first + 5]
}

static LEFT_ROWS: [[u8; 6]; 4] = [half_row(1), half_row(7), half_row(13), half_row(19)];
static RIGHT_ROWS: [[u8; 6]; 4] = [half_row(25), half_row(31), half_row(37), half_row(43)];

/// Matrix of the default left half (source), positions 1–24.
pub static LEFT_MATRIX: [&[u8]; 4] = [&LEFT_ROWS[0], &LEFT_ROWS[1], &LEFT_ROWS[2], &LEFT_ROWS[3]];
/// Matrix of the default right half (sink), positions 25–48.
pub static RIGHT_MATRIX: [&[u8]; 4] = [&RIGHT_ROWS[0], &RIGHT_ROWS[1], &RIGHT_ROWS[2], &RIGHT_ROWS[3]];

// Default matrices must cover exactly one half of the default keymap.
const _: () = assert!(4 * 6 == KEYS_PER_HALF);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_halves_validate() {
        assert_eq!(KeyboardConfig::new(Role::Source, &LEFT_MATRIX).validate(), Ok(()));
        assert_eq!(KeyboardConfig::new(Role::Sink, &RIGHT_MATRIX).validate(), Ok(()));
    }

    #[test]
    fn default_halves_do_not_share_positions() {
        let left = KeyboardConfig::new(Role::Source, &LEFT_MATRIX);
        let right = KeyboardConfig::new(Role::Sink, &RIGHT_MATRIX);
        assert_eq!(left.position(0, 0), 1);
        assert_eq!(left.position(3, 5), 24);
        assert_eq!(right.position(0, 0), 25);
        assert_eq!(right.position(3, 5), 48);
        assert_eq!(right.position(4, 0), 0);
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        static ROW0: [u8; 2] = [1, 2];
        static ROW1: [u8; 1] = [3];
        static MATRIX: [&[u8]; 2] = [&ROW0, &ROW1];
        assert_eq!(
            KeyboardConfig::new(Role::Source, &MATRIX).validate(),
            Err(ConfigError::RaggedMatrix {
                row: 1,
                cols: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn positions_above_127_are_rejected() {
        static ROW: [u8; 1] = [200];
        static MATRIX: [&[u8]; 1] = [&ROW];
        assert!(matches!(
            KeyboardConfig::new(Role::Source, &MATRIX).validate(),
            Err(ConfigError::PositionOutOfRange { position: 200, .. })
        ));
    }

    #[test]
    fn capacities_are_bounded() {
        let mut config = KeyboardConfig::new(Role::Source, &LEFT_MATRIX);
        config.max_keys = MAX_KEYS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::MaxKeys { .. })));

        config.max_keys = 4;
        config.report_keys = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ReportKeys { .. })));

        config.report_keys = 6;
        config.debounce.scan_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroScanInterval));
    }
}
