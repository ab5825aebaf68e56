//! 64-bit schema fingerprints (CRC-64-AVRO).
//!
//! The fingerprint is a table-driven 64-bit Rabin CRC over the UTF-8 bytes
//! of the schema's parsing canonical form. The polynomial constant doubles
//! as the empty-input value and there is no final xor; these parameters are
//! wire-format constants, not configurable.

use std::sync::OnceLock;

use crate::schema::Schema;

/// CRC-64-AVRO polynomial; also the fingerprint of empty input.
const EMPTY: u64 = 0xc15d_213a_a4d7_a795;

fn table() -> &'static [u64; 256] {
    static TABLE: OnceLock<[u64; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u64; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut fp = i as u64;
            for _ in 0..8 {
                fp = (fp >> 1) ^ (EMPTY & 0u64.wrapping_sub(fp & 1));
            }
            *entry = fp;
        }
        table
    })
}

/// The 64-bit Rabin fingerprint of raw bytes.
pub fn rabin64(bytes: &[u8]) -> u64 {
    let table = table();
    let mut fp = EMPTY;
    for &byte in bytes {
        fp = (fp >> 8) ^ table[((fp ^ byte as u64) & 0xff) as usize];
    }
    fp
}

/// The fingerprint of a schema: [`rabin64`] over its canonical form.
pub fn fingerprint64(schema: &Schema) -> u64 {
    rabin64(schema.canonical_form().as_bytes())
}
