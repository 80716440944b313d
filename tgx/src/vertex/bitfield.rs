//! Decoders for the vertex components that pack several values into one scalar.

/// Flag added to a bone group number stored in `position.w`.
pub const BONE_GROUP_FLAG: i64 = 0x800;

/// Skinning selector packed into `position.w`.
///
/// ```text
/// FFFF FBBB BBBB BBBB
/// B: bone index or bone group
/// F: 0x0    no skin buffer entry, B is the bone index (0..=255)
///    0x800  two bone group, w = 0x800 + group
///    0xF000 four bone group, w = -(0x800 + group)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoneBinding {
    SingleBone(f32),
    TwoBone { group: usize },
    FourBone { group: usize },
    /// Positive values between 256 and 0x800 name no group.
    Invalid(f32),
}

impl BoneBinding {
    pub fn decode(w: f32) -> Self {
        if (0.0..=255.0).contains(&w) {
            return BoneBinding::SingleBone(w);
        }

        let (group, four_bone) = if w < 0.0 {
            ((-w) as i64 - BONE_GROUP_FLAG, true)
        } else {
            (w as i64 - BONE_GROUP_FLAG, false)
        };

        match usize::try_from(group) {
            Ok(group) if four_bone => BoneBinding::FourBone { group },
            Ok(group) => BoneBinding::TwoBone { group },
            Err(_) => BoneBinding::Invalid(w),
        }
    }
}

/// Values packed into the 4th component of a normal.
///
/// Only the low 16 bits are meaningful, so signed and unsigned storage of
/// the component decode the same way.
///
/// ```text
/// bit 15      unused
/// bits 3..15  uv-scale stride index (12 bits)
/// bits 0..3   dye slot
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalW {
    pub dye_slot: u8,
    pub uv_scale_stride_index: u16,
}

impl NormalW {
    pub fn decode(raw: f64) -> Self {
        let bits = (raw as i64) & 0xFFFF;
        Self {
            dye_slot: (bits & 0x7) as u8,
            uv_scale_stride_index: ((bits >> 3) & 0xFFF) as u16,
        }
    }
}

#[cfg(test)]
mod bitfield_tests {
    use super::*;

    #[test]
    fn bone_bindings() {
        assert_eq!(BoneBinding::decode(0.0), BoneBinding::SingleBone(0.0));
        assert_eq!(BoneBinding::decode(255.0), BoneBinding::SingleBone(255.0));
        assert_eq!(BoneBinding::decode(2048.0), BoneBinding::TwoBone { group: 0 });
        assert_eq!(BoneBinding::decode(2051.0), BoneBinding::TwoBone { group: 3 });
        assert_eq!(BoneBinding::decode(-2048.0), BoneBinding::FourBone { group: 0 });
        assert_eq!(BoneBinding::decode(-2060.0), BoneBinding::FourBone { group: 12 });
        assert_eq!(BoneBinding::decode(300.0), BoneBinding::Invalid(300.0));
        assert_eq!(BoneBinding::decode(-5.0), BoneBinding::Invalid(-5.0));
    }

    #[test]
    fn normal_w_matches_for_signed_and_unsigned() {
        // 0x8089 as ushort and as short
        let unsigned = NormalW::decode(32905.0);
        let signed = NormalW::decode(-32631.0);
        assert_eq!(unsigned, signed);
        assert_eq!(unsigned.dye_slot, 1);
        assert_eq!(unsigned.uv_scale_stride_index, (0x8089 >> 3) & 0xFFF);
    }

    #[test]
    fn normal_w_fields() {
        let w = NormalW::decode(((42 << 3) | 5) as f64);
        assert_eq!(w.dye_slot, 5);
        assert_eq!(w.uv_scale_stride_index, 42);
    }
}
