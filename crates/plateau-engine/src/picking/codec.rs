use super::PickError;

/// Number of ids the RGB encoding can carry.
pub const PICKABLE_IDS: u32 = 1 << 24;

/// Value of a picking pixel no object was drawn on (the white clear color).
pub const NO_OBJECT: u32 = PICKABLE_IDS - 1;

/// Packs `id` into RGBA8 as `(id >> 16, id >> 8, id, 255)`.
pub fn encode_id(id: u32) -> Result<[u8; 4], PickError> {
    if id >= PICKABLE_IDS {
        return Err(PickError::IdOutOfRange(id));
    }
    Ok([(id >> 16) as u8, (id >> 8) as u8, id as u8, 255])
}

#[inline]
pub fn decode_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) + ((g as u32) << 8) + b as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_encodable_id_round_trips() {
        for id in 0..PICKABLE_IDS {
            let [r, g, b, a] = encode_id(id).unwrap();
            assert_eq!(a, 255);
            assert_eq!(decode_rgb(r, g, b), id);
        }
    }

    #[test]
    fn byte_order_is_red_high() {
        assert_eq!(encode_id(0x0A0B0C).unwrap(), [0x0A, 0x0B, 0x0C, 255]);
        assert_eq!(encode_id(1).unwrap(), [0, 0, 1, 255]);
    }

    #[test]
    fn white_decodes_to_the_sentinel() {
        assert_eq!(decode_rgb(255, 255, 255), NO_OBJECT);
    }

    #[test]
    fn ids_past_24_bits_are_rejected() {
        assert_eq!(encode_id(PICKABLE_IDS), Err(PickError::IdOutOfRange(PICKABLE_IDS)));
        assert!(encode_id(u32::MAX).is_err());
    }
}
