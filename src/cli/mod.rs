//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for confluence-dump using clap.

pub mod commands;

use crate::config::{load_config, load_config_or_default, DumpConfig, DEFAULT_CONFIG_PATH};
use crate::domain::Result;
use clap::Parser;

/// Confluence Dump - export Confluence Cloud pages to HTML and RST
#[derive(Parser, Debug)]
#[command(name = "confluence-dump")]
#[command(version, about, long_about = None)]
#[command(author = "Confluence Dump Contributors")]
pub struct Cli {
    /// Path to configuration file [default: confluence-dump.toml if present]
    #[arg(short, long, env = "CONFLUENCE_DUMP_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CONFLUENCE_DUMP_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub export: commands::export::ExportArgs,
}

impl Cli {
    /// Load the configuration named by `--config`
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_config(&self) -> Result<DumpConfig> {
        match &self.config {
            Some(path) => load_config(path),
            None => load_config_or_default(DEFAULT_CONFIG_PATH),
        }
    }

    /// `--log-level` wins over the configured level
    pub fn effective_log_level<'a>(&'a self, config: &'a DumpConfig) -> &'a str {
        self.log_level.as_deref().unwrap_or(&config.logging.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::export::ModeArg;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_parse_space() {
        let cli = Cli::parse_from(["confluence-dump", "-m", "space", "-S", "acme", "-s", "DOCS"]);
        assert_eq!(cli.export.mode, ModeArg::Space);
        assert_eq!(cli.export.site, "acme");
        assert_eq!(cli.export.space.as_deref(), Some("DOCS"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parse_modes() {
        for (name, mode) in [
            ("single", ModeArg::Single),
            ("space", ModeArg::Space),
            ("bylabel", ModeArg::ByLabel),
            ("pageprops", ModeArg::PageProps),
        ] {
            let cli = Cli::parse_from(["confluence-dump", "--mode", name, "--site", "acme"]);
            assert_eq!(cli.export.mode, mode);
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from([
            "confluence-dump",
            "--config",
            "custom.toml",
            "-m",
            "single",
            "-S",
            "acme",
            "-p",
            "42",
        ]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from([
            "confluence-dump",
            "--log-level",
            "debug",
            "-m",
            "space",
            "-S",
            "acme",
        ]);
        assert_eq!(cli.log_level, Some("debug".to_string()));

        let config = DumpConfig::default();
        assert_eq!(cli.effective_log_level(&config), "debug");
    }

    #[test]
    fn test_cli_requires_mode_and_site() {
        let err = Cli::try_parse_from(["confluence-dump", "-S", "acme"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["confluence-dump", "-m", "space"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let err =
            Cli::try_parse_from(["confluence-dump", "-m", "everything", "-S", "acme"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_rejects_non_numeric_page() {
        let err = Cli::try_parse_from(["confluence-dump", "-m", "single", "-S", "acme", "-p", "abc"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
