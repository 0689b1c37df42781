//! Layout engine selection.

use std::{fmt, str::FromStr};

use serde::Deserialize;

/// Layout algorithm offered by the Graphviz toolchain.
///
/// The variant is passed to the engine as `-K<name>`.
///
/// # Examples
///
/// ```
/// # use dotweave_core::engine::LayoutEngine;
/// let engine: LayoutEngine = "neato".parse().unwrap();
/// assert_eq!(engine, LayoutEngine::Neato);
/// assert_eq!(engine.command_flag(), "-Kneato");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Hierarchical layout for directed graphs.
    #[default]
    Dot,
    /// Spring model layout.
    Neato,
    /// Force-directed placement.
    Fdp,
    /// Multiscale force-directed placement for large graphs.
    Sfdp,
    /// Radial layout.
    Twopi,
    /// Circular layout.
    Circo,
}

impl LayoutEngine {
    /// Every supported engine, in documentation order.
    pub const ALL: [LayoutEngine; 6] = [
        Self::Dot,
        Self::Neato,
        Self::Fdp,
        Self::Sfdp,
        Self::Twopi,
        Self::Circo,
    ];

    /// Returns the engine name as the Graphviz tools spell it.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Neato => "neato",
            Self::Fdp => "fdp",
            Self::Sfdp => "sfdp",
            Self::Twopi => "twopi",
            Self::Circo => "circo",
        }
    }

    /// Returns the command line flag that selects this engine.
    pub fn command_flag(self) -> String {
        format!("-K{}", self.name())
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|engine| engine.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|e| e.name()).collect();
                format!(
                    "unknown layout engine `{s}`, expected one of: {}",
                    names.join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for engine in LayoutEngine::ALL {
            assert_eq!(engine.name().parse::<LayoutEngine>().unwrap(), engine);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SFDP".parse::<LayoutEngine>().unwrap(), LayoutEngine::Sfdp);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "osage".parse::<LayoutEngine>().unwrap_err();
        assert!(err.contains("osage"));
        assert!(err.contains("circo"));
    }

    #[test]
    fn test_command_flag() {
        assert_eq!(LayoutEngine::Dot.command_flag(), "-Kdot");
        assert_eq!(LayoutEngine::Twopi.command_flag(), "-Ktwopi");
    }

    #[test]
    fn test_default_is_dot() {
        assert_eq!(LayoutEngine::default(), LayoutEngine::Dot);
    }
}
