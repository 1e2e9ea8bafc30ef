use crate::constants::HEADER_SIZE;
use crate::{Header, MAGIC, SECTION_ALIGN, VERSION};

#[test]
fn header_size_and_alignment() {
    assert_eq!(std::mem::size_of::<Header>(), 64);
    assert_eq!(std::mem::align_of::<Header>(), 64);
}

#[test]
fn default_carries_identity() {
    let h = Header::default();
    assert!(h.validate_magic());
    assert!(h.validate_version());
    assert_eq!(&h.to_bytes()[0..4], b"WFTB");
    assert_eq!(h.magic, MAGIC);
    assert_eq!(h.version, VERSION);
}

#[test]
fn bytes_roundtrip() {
    let h = Header {
        checksum: 0xDEAD_BEEF,
        total_size: 4096,
        str_blob_size: 100,
        entry_count: 321,
        action_count: 400,
        lex_transition_count: 77,
        lex_accept_count: 12,
        str_table_count: 9,
        symbol_count: 8,
        terminal_count: 5,
        production_count: 6,
        state_count: 30,
        lex_mode_count: 4,
        lex_state_count: 11,
        start_symbol: 5,
        ..Default::default()
    };

    let bytes = h.to_bytes();
    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(Header::from_bytes(&bytes), h);
}

#[test]
fn field_positions() {
    let h = Header {
        checksum: 1,
        terminal_count: 0x0203,
        start_symbol: 0x0405,
        ..Default::default()
    };
    let bytes = h.to_bytes();

    assert_eq!(&bytes[8..12], &[1, 0, 0, 0]);
    assert_eq!(&bytes[40..42], &[3, 2]);
    assert_eq!(&bytes[50..52], &[5, 4]);
    assert_eq!(&bytes[52..64], &[0; 12]);
}

#[test]
fn empty_layout() {
    let offsets = Header::default().compute_offsets().unwrap();

    // Every section is empty except the string table sentinel.
    assert_eq!(offsets.str_blob, 64);
    assert_eq!(offsets.str_table, 64);
    assert_eq!(offsets.symbols, 128);
    assert_eq!(offsets.lex_accepts, 128);
    assert_eq!(offsets.end, 128);
}

#[test]
fn sections_are_aligned() {
    let h = Header {
        str_blob_size: 70,
        str_table_count: 3,
        symbol_count: 5,
        terminal_count: 65,
        production_count: 2,
        state_count: 9,
        entry_count: 13,
        action_count: 14,
        lex_mode_count: 3,
        lex_state_count: 6,
        lex_transition_count: 10,
        lex_accept_count: 4,
        ..Default::default()
    };
    let o = h.compute_offsets().unwrap();

    for offset in [
        o.str_blob,
        o.str_table,
        o.symbols,
        o.productions,
        o.states,
        o.entries,
        o.actions,
        o.lex_modes,
        o.lex_states,
        o.lex_transitions,
        o.lex_accepts,
        o.end,
    ] {
        assert_eq!(offset as usize % SECTION_ALIGN, 0);
    }

    // 70 bytes of strings spill into a second block.
    assert_eq!(o.str_table, 64 + 128);
    // 65 terminals need two words per mode: 3 × 16 bytes.
    assert_eq!(o.lex_states - o.lex_modes, 64);
}

#[test]
fn oversized_counts_do_not_wrap() {
    let h = Header {
        str_blob_size: u32::MAX,
        entry_count: u32::MAX,
        ..Default::default()
    };
    assert_eq!(h.compute_offsets(), None);
}
