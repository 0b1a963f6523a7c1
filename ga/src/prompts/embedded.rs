//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// System instruction: rating rubric and reply format
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Sent after each batch of search results
pub const FOLLOWUP: &str = include_str!("../../prompts/followup.pmt");

/// Sent once the query budget is spent
pub const FINAL: &str = include_str!("../../prompts/final.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "system" => Some(SYSTEM),
        "followup" => Some(FOLLOWUP),
        "final" => Some(FINAL),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_system() {
        let system = get_embedded("system").unwrap();
        assert!(system.contains("material"));
        assert!(system.contains("disposability"));
        assert!(system.contains("\"result\""));
        assert!(system.contains("\"query\""));
        assert!(system.contains("originalSustainabilityRating"));
    }

    #[test]
    fn test_get_embedded_followup_has_placeholder() {
        assert!(get_embedded("followup").unwrap().contains("{{remaining}}"));
    }

    #[test]
    fn test_get_embedded_final() {
        assert!(get_embedded("final").unwrap().starts_with("QUERY ITERATIONS EXCEEDED"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
