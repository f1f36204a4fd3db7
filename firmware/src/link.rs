//! Key sync protocol between the two halves.
//!
//! The sink packs every transition of one scan into a single message and
//! sends it once. Delivery is at-most-once: nothing is acknowledged or
//! retried, and separate messages may be lost. Deltas inside one message
//! stay in scan order.
//!
//! Wire format:
//!
//! ```text
//! [len: u8] [delta_0: i8] ... [delta_{len-1}: i8]
//! ```
//!
//! A positive delta is a press of that position, a negative one a release.

use heapless::Vec;

use crate::config::{KeySource, MAX_SYNC_DELTAS};
use crate::error::{DecodeError, Fault, LinkError};
use crate::keys::KeyEvent;

/// Largest encoded message.
pub const WIRE_MAX: usize = MAX_SYNC_DELTAS + 1;

/// Ordered key deltas from one sink scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncMessage {
    deltas: Vec<i8, MAX_SYNC_DELTAS>,
    capacity: usize,
}

impl SyncMessage {
    /// Message holding at most `capacity` deltas (capped at [`MAX_SYNC_DELTAS`]).
    pub fn new(capacity: usize) -> Self {
        Self {
            deltas: Vec::new(),
            capacity: capacity.min(MAX_SYNC_DELTAS),
        }
    }

    /// Append one transition. Overflow means a scan produced more
    /// transitions than the link was sized for, which is fatal.
    pub fn push(&mut self, event: KeyEvent) -> Result<(), Fault> {
        if self.deltas.len() >= self.capacity {
            return Err(Fault::SyncBufferFull);
        }
        self.deltas.push(event.code).map_err(|_| Fault::SyncBufferFull)
    }

    pub fn deltas(&self) -> &[i8] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Deltas as events tagged with `source`, in message order.
    pub fn events(&self, source: KeySource) -> impl Iterator<Item = KeyEvent> + '_ {
        self.deltas
            .iter()
            .filter_map(move |&code| KeyEvent::from_delta(code, source))
    }

    pub fn encode(&self) -> Vec<u8, WIRE_MAX> {
        let mut out = Vec::new();
        // len <= MAX_SYNC_DELTAS, so every push fits.
        let _ = out.push(self.deltas.len() as u8);
        for &delta in &self.deltas {
            let _ = out.push(delta as u8);
        }
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (&len, payload) = bytes.split_first().ok_or(DecodeError::Empty)?;
        let declared = usize::from(len);
        if declared != payload.len() {
            return Err(DecodeError::LengthMismatch {
                declared,
                actual: payload.len(),
            });
        }
        if declared > MAX_SYNC_DELTAS {
            return Err(DecodeError::TooManyDeltas(declared));
        }

        let mut message = Self::new(MAX_SYNC_DELTAS);
        for (index, &byte) in payload.iter().enumerate() {
            let delta = byte as i8;
            if delta == 0 {
                return Err(DecodeError::ZeroDelta { index });
            }
            if delta == i8::MIN {
                return Err(DecodeError::InvalidDelta { index, delta });
            }
            message
                .deltas
                .push(delta)
                .map_err(|_| DecodeError::TooManyDeltas(declared))?;
        }
        Ok(message)
    }
}

/// The private channel to the other half.
pub trait PeerLink {
    /// Fire-and-forget send of an encoded sync message.
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Ask the peer to start notifying sync messages. Called by the source
    /// once the link is up.
    fn enable_notifications(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}

/// A link that is never connected, for a unit without a peer.
pub struct NoPeer;

impl PeerLink for NoPeer {
    fn send(&mut self, _bytes: &[u8]) -> Result<(), LinkError> {
        Err(LinkError::NotConnected)
    }
}
