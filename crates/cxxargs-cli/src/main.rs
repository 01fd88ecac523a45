use clap::{Parser, Subcommand};
use cxxargs_project::{PathNormalizer, Project, ProjectConfig};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cxxargs")]
#[command(author, version, about = "Resolve the compiler arguments for C/C++ source files")]
struct Cli {
    /// Config file (default: <root>/.cxxargs.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the arguments used to parse a file
    Args {
        /// Source or header file
        file: PathBuf,

        /// Project root (holds compile_commands.json or clang_args)
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Print the entry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the quote and angle include search directories
    Includes {
        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// List the entries that pass the index filter
    Entries {
        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Args { file, root, json } => {
            let (project, config) = load(&root, cli.config.as_deref())?;
            let file = query_key(&file, config.normalizer().as_ref())?;
            let entry = project.find(&file);

            if entry.is_inferred {
                eprintln!("{}: no compile command, arguments inferred", entry.filename);
            }
            if json {
                let text = serde_json::to_string_pretty(&entry).into_diagnostic()?;
                println!("{}", text);
            } else {
                println!("{}", entry.args.join(" "));
            }
        }

        Commands::Includes { root } => {
            let (project, _) = load(&root, cli.config.as_deref())?;

            for dir in project.quote_include_directories() {
                println!("quote {}", dir);
            }
            for dir in project.angle_include_directories() {
                println!("angle {}", dir);
            }
        }

        Commands::Entries { root } => {
            let (project, config) = load(&root, cli.config.as_deref())?;
            let filter = config
                .index_filter()
                .into_diagnostic()
                .wrap_err("Invalid index whitelist/blacklist")?;

            project.for_each_filtered(&filter, config.index.log_skipped_paths, |index, entry| {
                println!("{}\t{}", index, entry.filename);
            });
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(root: &Path, config_path: Option<&Path>) -> Result<(Project, ProjectConfig)> {
    let root = root
        .canonicalize()
        .into_diagnostic()
        .wrap_err_with(|| format!("Project root {} is not accessible", root.display()))?;

    let config = match config_path {
        Some(path) => ProjectConfig::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to load {}", path.display()))?,
        None => ProjectConfig::discover(&root).into_diagnostic()?,
    };

    let project = Project::load(&root, &config);
    tracing::debug!(
        "Loaded {} entries from {} ({:?})",
        project.entries().len(),
        root.display(),
        project.source()
    );
    Ok((project, config))
}

/// Entries are keyed by absolute path, spelled the way the loader's
/// normalizer spelled them.
fn query_key(file: &Path, normalizer: &dyn PathNormalizer) -> Result<String> {
    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        std::env::current_dir().into_diagnostic()?.join(file)
    };
    Ok(normalizer.normalize(&path.to_string_lossy().replace('\\', "/")))
}
