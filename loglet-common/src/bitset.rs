// Copyright (C) 2023 Loglet, Inc.
//
// Loglet is offered under the AGPL v3.0 and as commercial software.
// For commercial licensing, contact us at hello@loglet.io.
//
// AGPL:
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

/// A fixed-capacity set of bit positions.
///
/// Replication uses one per log entry to record which follower cursors have
/// acknowledged the entry. Cursor indices are bounded by the replication
/// factor, far below the 64 positions available here. `set` is idempotent,
/// which makes duplicate acknowledgments from the same cursor harmless.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BitSet {
    bits: u64,
}

impl BitSet {
    pub fn set(&mut self, position: u32) {
        debug_assert!(position < u64::BITS, "bit position out of range");
        self.bits |= 1 << position;
    }

    pub fn test(&self, position: u32) -> bool {
        debug_assert!(position < u64::BITS, "bit position out of range");
        self.bits & (1 << position) != 0
    }

    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitset_set_and_count() {
        let mut bitset = BitSet::default();
        assert_eq!(bitset.count(), 0);
        assert!(!bitset.test(0));

        bitset.set(0);
        assert!(bitset.test(0));
        assert_eq!(bitset.count(), 1);

        bitset.set(5);
        assert!(bitset.test(5));
        assert!(!bitset.test(4));
        assert_eq!(bitset.count(), 2);
    }

    #[test]
    fn test_bitset_set_is_idempotent() {
        let mut bitset = BitSet::default();
        bitset.set(3);
        bitset.set(3);
        bitset.set(3);
        assert_eq!(bitset.count(), 1);
    }
}
