use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Order in which the search pops frontier nodes.
///
/// - `DepthFirst`: LIFO stack; memory stays proportional to depth times
///   branching factor (default).
/// - `BestFirst`: lowest lower bound first; tightens the incumbent sooner at
///   the price of a larger frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Traversal {
    DepthFirst,
    BestFirst,
}

impl Default for Traversal {
    fn default() -> Self {
        Traversal::DepthFirst
    }
}

impl FromStr for Traversal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "depth-first" | "dfs" => Ok(Traversal::DepthFirst),
            "best-first" | "bfs" => Ok(Traversal::BestFirst),
            other => Err(format!(
                "invalid traversal: {other} (expected \"depth-first\" or \"best-first\")"
            )),
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::DepthFirst => f.write_str("depth-first"),
            Traversal::BestFirst => f.write_str("best-first"),
        }
    }
}

/// How the final schedule is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `(task,processor,start);` triples in commit order.
    Triples,
    /// The input graph annotated with `Start` and `Processor` attributes.
    Dot,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Triples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_parses_common_spellings() {
        assert_eq!("depth-first".parse::<Traversal>(), Ok(Traversal::DepthFirst));
        assert_eq!("Best_First".parse::<Traversal>(), Ok(Traversal::BestFirst));
        assert_eq!("dfs".parse::<Traversal>(), Ok(Traversal::DepthFirst));
        assert!("sideways".parse::<Traversal>().is_err());
    }

    #[test]
    fn traversal_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            traversal: Traversal,
        }
        let w: Wrapper = toml::from_str(r#"traversal = "best-first""#).unwrap();
        assert_eq!(w.traversal, Traversal::BestFirst);
    }
}
