use crate::error::{FisherPrepError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default worker count for build mode.
const DEFAULT_PROCESSES: usize = 8;

/// Default cap on written clip length, in milliseconds.
const DEFAULT_MAX_CLIP_MS: u64 = 10_000;

/// Process-wide settings for a corpus run, resolved once at startup.
///
/// Values layer in order: built-in defaults, then an optional config file,
/// then `FISHERPREP_*` environment variables, then command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Destination root for prepared data.
    pub dst: PathBuf,
    /// Fisher corpus root, expected to hold `trans/` and `audio/` trees.
    pub fisher: PathBuf,
    /// Worker count for build mode.
    pub processes: usize,
    /// Path to the sph2pipe executable.
    pub sph2pipe: PathBuf,
    /// Longest clip written, in milliseconds.
    pub max_clip_ms: u64,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            dst: PathBuf::from("./data_dir"),
            fisher: PathBuf::from("./fisher"),
            processes: DEFAULT_PROCESSES,
            sph2pipe: PathBuf::from("./sph2pipe_v2.5/sph2pipe"),
            max_clip_ms: DEFAULT_MAX_CLIP_MS,
        }
    }
}

impl PrepareConfig {
    /// Load defaults layered with the config file and environment variables.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<PrepareConfig>(&contents) {
                    config = file_config;
                }
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(dst) = std::env::var("FISHERPREP_DST") {
            self.dst = PathBuf::from(dst);
        }
        if let Ok(fisher) = std::env::var("FISHERPREP_FISHER") {
            self.fisher = PathBuf::from(fisher);
        }
        if let Ok(processes) = std::env::var("FISHERPREP_PROCESSES") {
            if let Ok(p) = processes.parse() {
                self.processes = p;
            }
        }
        if let Ok(sph2pipe) = std::env::var("FISHERPREP_SPH2PIPE") {
            self.sph2pipe = PathBuf::from(sph2pipe);
        }
    }

    /// Apply command-line overrides, the final layer.
    pub fn apply_cli(
        &mut self,
        dst: Option<PathBuf>,
        fisher: Option<PathBuf>,
        processes: Option<usize>,
        sph2pipe: Option<PathBuf>,
    ) {
        if let Some(dst) = dst {
            self.dst = dst;
        }
        if let Some(fisher) = fisher {
            self.fisher = fisher;
        }
        if let Some(processes) = processes {
            self.processes = processes;
        }
        if let Some(sph2pipe) = sph2pipe {
            self.sph2pipe = sph2pipe;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.processes == 0 {
            return Err(FisherPrepError::Config(
                "process count must be greater than 0".to_string(),
            ));
        }
        if self.max_clip_ms == 0 {
            return Err(FisherPrepError::Config(
                "max clip duration must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Root for exported audio.
    pub fn audio_dir(&self) -> PathBuf {
        self.dst.join("audio")
    }

    /// Root for exported clips, one subdirectory per scenario.
    pub fn clips_dir(&self) -> PathBuf {
        self.audio_dir().join("fisher")
    }

    /// Text directory, pre-created but not populated by this pipeline.
    pub fn text_dir(&self) -> PathBuf {
        self.dst.join("text")
    }

    /// Root for list files.
    pub fn lists_dir(&self) -> PathBuf {
        self.dst.join("lists")
    }

    /// The training list this pipeline builds and verifies.
    pub fn train_list_path(&self) -> PathBuf {
        self.lists_dir().join("fisher-train.lst")
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fisherprep").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PrepareConfig::default();
        assert_eq!(config.dst, PathBuf::from("./data_dir"));
        assert_eq!(config.fisher, PathBuf::from("./fisher"));
        assert_eq!(config.processes, 8);
        assert_eq!(config.sph2pipe, PathBuf::from("./sph2pipe_v2.5/sph2pipe"));
        assert_eq!(config.max_clip_ms, 10_000);
    }

    #[test]
    fn test_layout_paths() {
        let config = PrepareConfig {
            dst: PathBuf::from("/out"),
            ..Default::default()
        };
        assert_eq!(config.audio_dir(), PathBuf::from("/out/audio"));
        assert_eq!(config.clips_dir(), PathBuf::from("/out/audio/fisher"));
        assert_eq!(config.text_dir(), PathBuf::from("/out/text"));
        assert_eq!(config.lists_dir(), PathBuf::from("/out/lists"));
        assert_eq!(
            config.train_list_path(),
            PathBuf::from("/out/lists/fisher-train.lst")
        );
    }

    #[test]
    fn test_validate_rejects_zero_processes() {
        let config = PrepareConfig {
            processes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(PrepareConfig::default().validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = PrepareConfig::default();
        config.apply_cli(
            Some(PathBuf::from("/cli-out")),
            None,
            Some(2),
            None,
        );
        assert_eq!(config.dst, PathBuf::from("/cli-out"));
        assert_eq!(config.fisher, PathBuf::from("./fisher"));
        assert_eq!(config.processes, 2);
    }

    // Tests run concurrently; keep this the only test touching FISHERPREP_*.
    #[test]
    fn test_env_overrides_defaults_and_loses_to_cli() {
        std::env::set_var("FISHERPREP_DST", "/env-out");
        std::env::set_var("FISHERPREP_FISHER", "/env-fisher");
        std::env::set_var("FISHERPREP_PROCESSES", "3");
        std::env::set_var("FISHERPREP_SPH2PIPE", "/env/sph2pipe");

        let mut config = PrepareConfig::default();
        config.apply_env();
        assert_eq!(config.dst, PathBuf::from("/env-out"));
        assert_eq!(config.fisher, PathBuf::from("/env-fisher"));
        assert_eq!(config.processes, 3);
        assert_eq!(config.sph2pipe, PathBuf::from("/env/sph2pipe"));

        config.apply_cli(Some(PathBuf::from("/cli-out")), None, Some(5), None);
        assert_eq!(config.dst, PathBuf::from("/cli-out"));
        assert_eq!(config.processes, 5);
        assert_eq!(config.fisher, PathBuf::from("/env-fisher"));
        assert_eq!(config.sph2pipe, PathBuf::from("/env/sph2pipe"));

        for var in [
            "FISHERPREP_DST",
            "FISHERPREP_FISHER",
            "FISHERPREP_PROCESSES",
            "FISHERPREP_SPH2PIPE",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_partial_config_file_fills_in_defaults() {
        let parsed: PrepareConfig = toml::from_str("processes = 3\n").unwrap();
        assert_eq!(parsed.processes, 3);
        assert_eq!(parsed.dst, PathBuf::from("./data_dir"));
    }
}
