//! Layer table and transparent fall-through lookup.

use core::fmt;

use crate::Code;

/// A stack of layers, each a table of codes indexed by logical key position.
///
/// Positions are 1-based (position `p` lives at index `p - 1`) because the
/// matrix reports releases as negated positions and 0 has no negation.
#[derive(Copy, Clone, Debug)]
pub struct Keymap<'a> {
    layers: &'a [&'a [Code]],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeymapError {
    /// The keymap has no layers at all.
    Empty,
    /// A layer has a different number of positions than layer 0.
    RaggedLayer { layer: usize },
    /// A layer-shift code targets a layer that does not exist.
    MissingLayer { layer: usize, position: u8, target: usize },
}

impl fmt::Display for KeymapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeymapError::Empty => write!(f, "keymap has no layers"),
            KeymapError::RaggedLayer { layer } => {
                write!(f, "layer {layer} has a different size than layer 0")
            }
            KeymapError::MissingLayer {
                layer,
                position,
                target,
            } => write!(
                f,
                "layer {layer} position {position} shifts to missing layer {target}"
            ),
        }
    }
}

impl<'a> Keymap<'a> {
    pub const fn new(layers: &'a [&'a [Code]]) -> Self {
        Self { layers }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of positions per layer (taken from layer 0).
    pub fn num_positions(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.len())
    }

    /// Raw entry at `(layer, position)`, transparent entries included.
    pub fn get(&self, layer: usize, position: u8) -> Option<Code> {
        let index = usize::from(position).checked_sub(1)?;
        self.layers.get(layer)?.get(index).copied()
    }

    /// Look up the code for a position, resolving transparent entries by
    /// walking down from `layer` toward layer 0.
    ///
    /// Returns `None` when every layer down to 0 is transparent, or when the
    /// position is outside the table.
    pub fn lookup(&self, layer: usize, position: u8) -> Option<Code> {
        let top = layer.min(self.num_layers().checked_sub(1)?);
        (0..=top)
            .rev()
            .filter_map(|l| self.get(l, position))
            .find(|code| !code.is_transparent())
    }

    /// Check that every layer has the same size and every layer shift lands
    /// on an existing layer.
    pub fn validate(&self) -> Result<(), KeymapError> {
        let size = match self.layers.first() {
            Some(layer) => layer.len(),
            None => return Err(KeymapError::Empty),
        };

        for (layer, codes) in self.layers.iter().enumerate() {
            if codes.len() != size {
                return Err(KeymapError::RaggedLayer { layer });
            }
            for (index, code) in codes.iter().enumerate() {
                let Some(target) = code.layer_number() else {
                    continue;
                };
                if target >= self.layers.len() {
                    return Err(KeymapError::MissingLayer {
                        layer,
                        position: u8::try_from(index + 1).unwrap_or(u8::MAX),
                        target,
                    });
                }
            }
        }

        Ok(())
    }
}
