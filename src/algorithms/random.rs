use super::PassSpec;

/// Single pass of cryptographically secure random data
pub const RANDOM_FILL: PassSpec = PassSpec::Random;

/// Shannon entropy of `data` in bits per byte (0.0 for empty input, 8.0 at most)
pub fn calculate_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let histogram = data.iter().fold([0usize; 256], |mut acc, &b| {
        acc[b as usize] += 1;
        acc
    });

    let n = data.len() as f64;
    histogram
        .iter()
        .filter(|&&count| count != 0)
        .map(|&count| count as f64 / n)
        .fold(0.0, |h, p| h - p * p.log2())
}
