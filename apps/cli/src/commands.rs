//! CLI definition, config resolution, and tracing setup.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use docbundle_core::pipeline::{BundleOutcome, ProgressReporter};
use docbundle_shared::{BundleConfig, DEFAULT_TREE_URL, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Download docs/ from GitHub (if needed) and combine them into one file.
#[derive(Parser, Debug)]
#[command(
    name = "docbundle",
    version,
    about = "Download docs/ from GitHub (if needed) and combine them into a single Markdown file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Root folder to scan or download into [default: ./docs]
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output Markdown file [default: ./zama-llm.txt]
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// GitHub tree URL to fetch docs from if the root is missing or empty
    #[arg(long, value_name = "URL", env = "DOCBUNDLE_GITHUB_URL",
          long_help = format!("GitHub tree URL to fetch docs from if the root is missing or empty [default: {DEFAULT_TREE_URL}]"))]
    pub github: Option<String>,

    /// Additional file extension to include (repeatable), e.g. --ext .rst
    #[arg(long = "ext", value_name = "EXT")]
    pub ext: Vec<String>,

    /// Do not exclude common folders like .git, .gitbook, node_modules
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Title line of the combined document.
    #[arg(long)]
    pub title: Option<String>,

    /// Config file to use instead of ~/.docbundle/docbundle.toml.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docbundle=info",
        1 => "docbundle=debug",
        _ => "docbundle=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Config resolution
// ---------------------------------------------------------------------------

/// Merge defaults, the config file, and CLI flags (highest precedence).
pub(crate) fn resolve_config(cli: &Cli) -> Result<BundleConfig> {
    let app = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let mut config = BundleConfig::try_from(&app)?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut BundleConfig, cli: &Cli) {
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(out) = &cli.out {
        config.out = out.clone();
    }
    if let Some(github) = &cli.github {
        config.source_url = github.clone();
    }
    if let Some(title) = &cli.title {
        config.title = title.clone();
    }
    config.add_extensions(&cli.ext);
    if cli.no_default_excludes {
        config.clear_excludes();
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Run the bundle command and print the outcome.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    info!(
        root = %config.root.display(),
        out = %config.out.display(),
        extensions = ?config.include_extensions,
        "bundling documentation"
    );

    let reporter = CliProgress::new();
    let outcome = docbundle_core::pipeline::bundle(&config, &reporter).await;
    reporter.finish();

    match outcome? {
        BundleOutcome::NothingToDo => {
            println!("No input files found. Nothing to do.");
        }
        BundleOutcome::Written(summary) => {
            println!(
                "Wrote {} with {} files combined.",
                summary.out_path.display(),
                summary.file_count
            );
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &BundleOutcome) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbundle_shared::AppConfig;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["docbundle"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid args")
    }

    fn defaults() -> BundleConfig {
        BundleConfig::try_from(&AppConfig::default()).unwrap()
    }

    #[test]
    fn no_flags_keep_defaults() {
        let cli = parse(&[]);
        let mut config = defaults();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.root, PathBuf::from("docs"));
        assert_eq!(config.out, PathBuf::from("zama-llm.txt"));
        assert_eq!(config.include_extensions.len(), 3);
        assert_eq!(config.exclude_dirs.len(), 5);
    }

    #[test]
    fn short_and_long_flags_override() {
        let cli = parse(&[
            "-r",
            "site/docs",
            "--out",
            "bundle.md",
            "--github",
            "https://github.com/org/repo/tree/dev/guides",
            "--title",
            "Org Guides",
        ]);
        let mut config = defaults();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.root, PathBuf::from("site/docs"));
        assert_eq!(config.out, PathBuf::from("bundle.md"));
        assert_eq!(config.source_url, "https://github.com/org/repo/tree/dev/guides");
        assert_eq!(config.title, "Org Guides");
    }

    #[test]
    fn ext_is_repeatable_and_normalized() {
        let cli = parse(&["--ext", ".rst", "--ext", "ADOC"]);
        assert_eq!(cli.ext, vec![".rst", "ADOC"]);

        let mut config = defaults();
        apply_overrides(&mut config, &cli);
        assert!(config.include_extensions.contains(".rst"));
        assert!(config.include_extensions.contains(".adoc"));
        assert!(config.include_extensions.contains(".md"));
    }

    #[test]
    fn no_default_excludes_clears_set() {
        let cli = parse(&["--no-default-excludes"]);
        let mut config = defaults();
        apply_overrides(&mut config, &cli);
        assert!(config.exclude_dirs.is_empty());
    }

    #[test]
    fn verbosity_and_log_format() {
        let cli = parse(&["-vv", "--log-format", "json"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(Cli::try_parse_from(["docbundle", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn explicit_config_file_is_layered_under_flags() {
        let dir = std::env::temp_dir().join(format!("db-cli-config-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("docbundle.toml");
        std::fs::write(
            &path,
            "[defaults]\nroot = \"from-config\"\ntitle = \"Config Title\"\n\n[filters]\nexclude_dirs = [\"build\"]\n",
        )
        .unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let cli = parse(&["--config", &path_arg, "--title", "Flag Title"]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.root, PathBuf::from("from-config"));
        assert_eq!(config.title, "Flag Title");
        assert_eq!(config.exclude_dirs.len(), 1);
        assert!(config.exclude_dirs.contains("build"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = parse(&["--config", "/nonexistent/docbundle.toml"]);
        assert!(resolve_config(&cli).is_err());
    }
}
