//! Uuid byte layout.
//!
//! Uuid is sent as its most significant and least significant halves, each
//! written as a little endian `i64`. In terms of the 16 logical (big endian)
//! uuid bytes, wire byte `i` holds logical byte `WIRE_ORDER[i]`.
use uuid::Uuid;

const WIRE_ORDER: [usize; 16] = [7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8];

pub(crate) fn to_wire(uuid: &Uuid) -> [u8; 16] {
    let logical = uuid.as_bytes();
    std::array::from_fn(|i| logical[WIRE_ORDER[i]])
}

pub(crate) fn from_wire(wire: [u8; 16]) -> Uuid {
    let mut logical = [0u8; 16];
    for (i, &src) in WIRE_ORDER.iter().enumerate() {
        logical[src] = wire[i];
    }
    Uuid::from_bytes(logical)
}

#[cfg(test)]
mod test {
    use super::*;

    const ID: Uuid = Uuid::from_bytes([
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ]);

    #[test]
    fn permutation() {
        assert_eq!(
            to_wire(&ID),
            [
                0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x00,
                0xff, 0xee, 0xdd, 0xcc, 0xbb, 0xaa, 0x99, 0x88,
            ]
        );
    }

    #[test]
    fn matches_little_endian_halves() {
        let (msb, lsb) = ID.as_u64_pair();
        let wire = to_wire(&ID);
        assert_eq!(wire[..8], msb.to_le_bytes());
        assert_eq!(wire[8..], lsb.to_le_bytes());
    }

    #[test]
    fn inverse() {
        let id = Uuid::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        assert_eq!(from_wire(to_wire(&id)), id);
    }
}
