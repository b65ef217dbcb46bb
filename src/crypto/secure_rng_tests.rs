#[cfg(test)]
mod tests {
    use crate::algorithms::random::calculate_entropy;
    use crate::crypto::secure_rng::{secure_random_bytes, ContinuousTest, SecureRng};

    #[test]
    fn test_rng_initialization() {
        let rng = SecureRng::new();
        assert!(rng.is_healthy(), "RNG should be healthy after init");
    }

    #[test]
    fn test_fill_bytes_produces_entropy() {
        let mut rng = SecureRng::new();
        let mut buf = vec![0u8; 64 * 1024];
        rng.fill_bytes(&mut buf).unwrap();

        let entropy = calculate_entropy(&buf);
        assert!(entropy > 7.9, "random output entropy too low: {entropy}");
        assert!(rng.is_healthy());
    }

    #[test]
    fn test_entropy_calculation() {
        assert!(calculate_entropy(&[0u8; 1000]) < 0.1);
        assert!(calculate_entropy(&[0xFFu8; 1000]) < 0.1);
        assert_eq!(calculate_entropy(&[]), 0.0);

        let perfect: Vec<u8> = (0..4).flat_map(|_| 0..=255u8).collect();
        assert!(calculate_entropy(&perfect) > 7.99);

        let mut half = vec![0u8; 500];
        half.extend(vec![0xFF; 500]);
        let entropy = calculate_entropy(&half);
        assert!(entropy > 0.9 && entropy < 1.1);
    }

    #[test]
    fn test_continuous_test_detects_repeats() {
        let mut test = ContinuousTest::default();
        let block = [0xA5u8; 32];

        assert!(test.check(&block));
        assert!(!test.check(&block), "identical consecutive output must fail");
        assert_eq!(test.failures(), 1);

        assert!(test.check(&[0x5Au8; 32]));
        assert_eq!(test.failures(), 1);
    }

    #[test]
    fn test_continuous_test_ignores_short_outputs() {
        let mut test = ContinuousTest::default();
        assert!(test.check(&[1u8; 4]));
        assert!(test.check(&[1u8; 4]));
        assert_eq!(test.failures(), 0);
    }

    #[test]
    fn test_one_shot_random_bytes() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        secure_random_bytes(&mut a).unwrap();
        secure_random_bytes(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
