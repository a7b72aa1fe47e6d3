use std::io::Read;

/// Runtime configuration, loaded from an optional TOML file. Every field
/// has a default so an empty (or absent) file is valid; CLI flags override
/// file values where both exist.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Config {
    /// Base RNG seed. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub selfplay: Selfplay,

    #[serde(default)]
    pub report: Report,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Selfplay {
    /// Number of games per run.
    #[serde(default = "defaults::games")]
    pub games: u32,

    /// Optional per-game step cap; unlimited when absent.
    #[serde(default)]
    pub max_steps: Option<u64>,
}

impl Default for Selfplay {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            max_steps: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Report {
    /// When set, self-play writes per-game summaries here as JSON.
    #[serde(default)]
    pub results_file: Option<std::path::PathBuf>,
}

impl Config {
    pub fn from_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

mod defaults {
    pub fn games() -> u32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.selfplay.games, 1);
        assert!(cfg.seed.is_none());
        assert!(cfg.report.results_file.is_none());
    }

    #[test]
    fn full_config_parses() {
        let cfg: Config = toml::from_str(
            r#"
            seed = 42

            [selfplay]
            games = 8
            max_steps = 100000

            [report]
            results_file = "out.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.selfplay.games, 8);
        assert_eq!(cfg.selfplay.max_steps, Some(100_000));
        assert_eq!(
            cfg.report.results_file.as_deref(),
            Some(std::path::Path::new("out.json"))
        );
    }

    #[test]
    fn from_toml_reads_file() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "seed = 7\n\n[selfplay]\ngames = 3").unwrap();
        let cfg = Config::from_toml(&path).expect("parse config");
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.selfplay.games, 3);
        assert_eq!(cfg.selfplay.max_steps, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let td = tempfile::tempdir().unwrap();
        assert!(Config::from_toml(td.path().join("absent.toml")).is_err());
    }
}
