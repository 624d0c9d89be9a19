//! The metadata byte (§3, §4.2): one byte per slot, bit0 `used`, bit1
//! `tombstone`, bits2..7 a 6-bit fingerprint.
//!
//! The teacher's control byte (`src/index/hash/table.rs`'s `EMPTY`/
//! `DELETED`/`h2`/`is_full`/`is_special`) uses a different encoding
//! entirely — top bit clear means "full", `0xFF` means empty, `0x80` means
//! deleted, and the fingerprint occupies the low 7 bits — because it's
//! built to be compared 16-at-a-time against a SIMD-broadcast byte. This
//! spec's byte is compared one at a time (scalar linear probing, §4.4), so
//! the encoding here follows the spec's own bit assignment instead of the
//! teacher's, packaged the way the retrieval pack's `cornedbeef` SwissTable
//! sketch packages its single-byte `Metadata` (`from_h2`/`is_empty`/
//! `is_tombstone`/`h2` accessor methods) rather than the teacher's free
//! functions over a bare `u8`.

const USED_BIT: u8 = 0b0000_0001;
const TOMBSTONE_BIT: u8 = 0b0000_0010;
const FINGERPRINT_SHIFT: u32 = 2;
const FINGERPRINT_MASK: u8 = 0b1111_1100;

/// One metadata byte. `#[repr(transparent)]` so a `[Control; N]` has
/// exactly the single-byte-per-slot layout §4.1 requires.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub(crate) struct Control(u8);

impl Control {
    pub(crate) const EMPTY: Control = Control(0);
    pub(crate) const TOMBSTONE: Control = Control(TOMBSTONE_BIT);

    #[inline]
    pub(crate) fn used(fingerprint: u8) -> Self {
        debug_assert!(fingerprint < 64, "fingerprint must fit in 6 bits");
        Control(USED_BIT | (fingerprint << FINGERPRINT_SHIFT))
    }

    #[inline]
    pub(crate) fn is_used(self) -> bool {
        self.0 & USED_BIT != 0
    }

    #[inline]
    pub(crate) fn is_tombstone(self) -> bool {
        self.0 & TOMBSTONE_BIT != 0
    }

    #[inline]
    pub(crate) fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` for used or tombstone slots: the probe scan must continue
    /// past either (§4.4: "Tombstones are skipped but do not terminate
    /// the scan").
    #[inline]
    pub(crate) fn is_occupied_or_tombstone(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub(crate) fn fingerprint(self) -> u8 {
        (self.0 & FINGERPRINT_MASK) >> FINGERPRINT_SHIFT
    }

    #[inline]
    pub(crate) fn from_raw(byte: u8) -> Self {
        Control(byte)
    }

    #[inline]
    pub(crate) fn raw(self) -> u8 {
        self.0
    }
}

/// Top 6 bits of a 64-bit hash, used as the fingerprint (§4.2).
#[inline]
pub(crate) fn fingerprint_of(hash: u64) -> u8 {
    (hash >> 58) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_mutually_exclusive() {
        assert!(Control::EMPTY.is_empty());
        assert!(!Control::EMPTY.is_used());
        assert!(!Control::EMPTY.is_tombstone());

        assert!(Control::TOMBSTONE.is_tombstone());
        assert!(!Control::TOMBSTONE.is_used());
        assert!(!Control::TOMBSTONE.is_empty());

        let used = Control::used(0x2a);
        assert!(used.is_used());
        assert!(!used.is_tombstone());
        assert!(!used.is_empty());
        assert_eq!(used.fingerprint(), 0x2a);
    }

    #[test]
    fn fingerprint_round_trips_through_every_6_bit_value() {
        for fp in 0u8..64 {
            assert_eq!(Control::used(fp).fingerprint(), fp);
        }
    }

    #[test]
    fn fingerprint_of_hash_takes_the_top_six_bits() {
        let hash: u64 = 0b11_0101 << 58;
        assert_eq!(fingerprint_of(hash), 0b11_0101);
    }
}
