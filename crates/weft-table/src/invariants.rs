//! Invariant checks excluded from coverage reports.
//!
//! Each of these was established by `ParseTable::verify`; failing one means
//! a bug in this crate, not a bad blob.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::action::Action;
use crate::table::ParseTable;

pub(crate) fn ensure_action(raw: [u8; 4]) -> Action {
    Action::from_bytes(raw)
        .unwrap_or_else(|| {
            panic!("ParseTable: unverified action kind {} (verify must run first)", raw[0])
        })
}

pub(crate) fn ensure_utf8(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes)
        .unwrap_or_else(|e| panic!("ParseTable: unverified string ({e}); verify must run first"))
}

impl ParseTable {
    pub(crate) fn ensure_index(&self, index: usize, count: usize, what: &str) -> usize {
        if index >= count {
            panic!("ParseTable: {what} {index} out of range (count {count})");
        }
        index
    }
}
