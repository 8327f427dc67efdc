//! Chroma upsampling: map a luma-plane pixel coordinate to the chroma
//! sample it should read from, for components with a lower sampling
//! factor than the frame's maximum.
//!
//! This uses the general nearest-neighbor formula `chroma = luma *
//! chroma_samp / max_samp` rather than dividing by the component's own
//! vertical/horizontal sampling factor. The two agree whenever every
//! component shares one sampling factor (4:4:4) or the chroma planes are
//! subsampled on both axes equally, but diverge for the asymmetric ratios
//! JPEG also allows (e.g. 4:2:2), where dividing by the component's own
//! factor reads the wrong chroma sample past the first subsampled row.

/// Map one axis of a luma pixel coordinate to the chroma sample index a
/// component with sampling factor `chroma_samp` (out of the frame's
/// `max_samp`) should be read from.
pub(crate) fn chroma_sample_coordinate(luma_coord: usize, chroma_samp: usize, max_samp: usize) -> usize {
    debug_assert!(chroma_samp <= max_samp);
    luma_coord * chroma_samp / max_samp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_resolution_component_maps_identically() {
        for luma in 0..16 {
            assert_eq!(chroma_sample_coordinate(luma, 2, 2), luma);
        }
    }

    #[test]
    fn four_two_zero_maps_the_documented_example() {
        // Global (15, 15) in a 4:2:0 frame (max sampling 2, chroma sampling
        // 1 on both axes) lands on chroma sample (7, 7).
        assert_eq!(chroma_sample_coordinate(15, 1, 2), 7);
    }

    #[test]
    fn asymmetric_four_two_two_keeps_vertical_axis_full_resolution() {
        // 4:2:2: chroma sampling is 1 horizontally, 2 vertically, against a
        // max sampling of 2. Vertical axis should be untouched.
        assert_eq!(chroma_sample_coordinate(9, 2, 2), 9);
        assert_eq!(chroma_sample_coordinate(9, 1, 2), 4);
    }
}
