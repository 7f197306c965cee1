//! Configuration validation

/// Validation for configuration sections.
///
/// Returns a human-readable description of the first problem found.
pub trait Validate {
    /// Check invariants, returning an error message on violation
    fn validate(&self) -> Result<(), String>;
}
