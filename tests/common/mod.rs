/// Common test utilities and mock infrastructure
///
/// This module provides shared functionality for integration tests including:
/// - In-memory mock target with write logging and fault injection
/// - File-backed fixtures and content checks
#[allow(dead_code)]
pub mod mock_target;
#[allow(dead_code)]
pub mod test_helpers;
