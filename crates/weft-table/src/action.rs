//! Parse actions (4 bytes each).
//!
//! ```text
//! byte 0     kind (1 = shift, 2 = reduce, 3 = accept)
//! byte 1     reserved
//! bytes 2-3  payload: target state or production id
//! ```
//!
//! A shift keyed by a nonterminal is the goto of that nonterminal.

use weft_core::{ProductionId, StateId};

const KIND_SHIFT: u8 = 1;
const KIND_REDUCE: u8 = 2;
const KIND_ACCEPT: u8 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

impl Action {
    pub fn to_bytes(self) -> [u8; 4] {
        let (kind, payload) = match self {
            Action::Shift(s) => (KIND_SHIFT, s.0),
            Action::Reduce(p) => (KIND_REDUCE, p.0),
            Action::Accept => (KIND_ACCEPT, 0),
        };
        let [lo, hi] = payload.to_le_bytes();
        [kind, 0, lo, hi]
    }

    /// Decode, or `None` for an unknown kind.
    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        let payload = u16::from_le_bytes([bytes[2], bytes[3]]);
        match bytes[0] {
            KIND_SHIFT => Some(Action::Shift(StateId(payload))),
            KIND_REDUCE => Some(Action::Reduce(ProductionId(payload))),
            KIND_ACCEPT => Some(Action::Accept),
            _ => None,
        }
    }

    pub fn is_shift(self) -> bool {
        matches!(self, Action::Shift(_))
    }
}
