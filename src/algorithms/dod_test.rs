/// Tests for the DoD 5220.22-M schedules
///
/// Tests verify:
/// - 3-pass sequence (0x00, 0xFF, random)
/// - 7-pass sequence including the repeated zero pass
/// - Generator yields exactly the declared passes

#[cfg(test)]
mod dod_algorithm_tests {
    use crate::algorithms::dod::{self, PASS_1_PATTERN, PASS_2_PATTERN};
    use crate::algorithms::{PassSpec, PatternGenerator, WipePattern};

    #[test]
    fn test_dod_constants() {
        assert_eq!(dod::DOD_3_PASS_COUNT, 3, "DoD 5220.22-M requires exactly 3 passes");
        assert_eq!(PASS_1_PATTERN, 0x00, "Pass 1 must be all zeros");
        assert_eq!(PASS_2_PATTERN, 0xFF, "Pass 2 must be all ones");
    }

    #[test]
    fn test_dod_3_pass_sequence() {
        let blocks: Vec<_> = PatternGenerator::new(WipePattern::Dod3Pass, 64)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].as_slice().iter().all(|&b| b == 0x00));
        assert!(blocks[1].as_slice().iter().all(|&b| b == 0xFF));
        assert!(blocks[2].is_random());
        assert_eq!(blocks[2].len(), 64);
    }

    #[test]
    fn test_dod_7_pass_sequence() {
        let blocks: Vec<_> = PatternGenerator::new(WipePattern::Dod7Pass, 32)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(blocks.len(), 7);
        let expected = [0x00u8, 0xFF, 0x92, 0x49, 0x24, 0x00];
        for (block, byte) in blocks.iter().zip(expected) {
            assert!(
                block.as_slice().iter().all(|&b| b == byte),
                "pass {} should be 0x{:02X}",
                block.pass_number(),
                byte
            );
        }
        assert!(blocks[6].is_random(), "last pass must be random");
    }

    #[test]
    fn test_dod_7_pass_repeats_zero_fill() {
        assert_eq!(dod::DOD_7_PASS[0], dod::DOD_7_PASS[5]);
        assert_eq!(dod::DOD_7_PASS[5], PassSpec::Fill(0x00));
    }

    #[test]
    fn test_pass_numbers_are_sequential() {
        let numbers: Vec<u32> = PatternGenerator::new(WipePattern::Dod7Pass, 8)
            .map(|b| b.unwrap().pass_number())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
