//! Pattern-constrained string generation.
//!
//! A pattern is parsed with `regex-syntax` and lowered into a small operator
//! tree. Generation is structural recursion over that tree: each operator
//! emits output that satisfies itself given that its children already do, so
//! the result matches the pattern by construction rather than by search.

mod errors;
mod pattern;

pub use errors::PatternError;
pub use pattern::Pattern;

/// Upper bound on unbounded repetitions (`*`, `+`, `{m,}`).
pub const DEFAULT_MAX_REPEAT: u32 = 9;

/// Generates one string matching `pattern` with the thread-local RNG.
pub fn generate(pattern: &str) -> Result<String, PatternError> {
    let pattern = Pattern::new(pattern)?;
    Ok(pattern.generate(&mut rand::rng()))
}
