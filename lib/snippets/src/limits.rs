use serde::{Deserialize, Serialize};

fn default_max_code_steps() -> usize {
    14
}

fn default_max_diagram_edges() -> usize {
    220
}

fn default_max_io_candidates() -> usize {
    8
}

/// Output caps applied by the artifact builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorLimits {
    /// Steps listed in each code stub.
    #[serde(default = "default_max_code_steps")]
    pub max_code_steps: usize,
    /// Edges drawn in the diagram.
    #[serde(default = "default_max_diagram_edges")]
    pub max_diagram_edges: usize,
    /// Names listed under External I/O Candidates in the notes.
    #[serde(default = "default_max_io_candidates")]
    pub max_io_candidates: usize,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            max_code_steps: default_max_code_steps(),
            max_diagram_edges: default_max_diagram_edges(),
            max_io_candidates: default_max_io_candidates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = GeneratorLimits::default();
        assert_eq!(limits.max_code_steps, 14);
        assert_eq!(limits.max_diagram_edges, 220);
        assert_eq!(limits.max_io_candidates, 8);
    }

    #[test]
    fn partial_deserialize_fills_defaults() {
        let limits: GeneratorLimits =
            serde_json::from_str(r#"{"max_diagram_edges": 10}"#).expect("deserialize");
        assert_eq!(limits.max_diagram_edges, 10);
        assert_eq!(limits.max_code_steps, 14);
    }
}
