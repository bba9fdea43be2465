//! Folio CLI - extract document titles with Gemini
//!
//! A command-line front end for the folio title-extraction app.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use folio::prelude::*;
use folio_cli::config::{self, FolioConfig, IssueLevel};
use folio_cli::error::{CliError, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Folio - read uploaded documents and extract their titles
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "FOLIO_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and ask for its title
    Extract(ExtractArgs),

    /// Start an interactive chat session
    Chat(ChatArgs),

    /// Show configuration and environment status
    Status,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the extract command
#[derive(Args)]
struct ExtractArgs {
    /// File to upload
    file: PathBuf,

    /// Message sent along with the file
    #[arg(short, long, default_value = "What is the title of this document?")]
    message: String,

    /// MIME type of the file (guessed from the extension by default)
    #[arg(long)]
    mime: Option<String>,

    /// Session ID
    #[arg(short, long, default_value = "cli")]
    session: String,
}

/// Arguments for the chat command
#[derive(Args)]
struct ChatArgs {
    /// Prompt prefix
    #[arg(short, long, default_value = "You: ")]
    prompt: String,

    /// Session ID
    #[arg(short, long, default_value = "cli")]
    session: String,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "folio={level},folio_cli={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.unwrap_or_else(config::config_path);
    match cli.command {
        Commands::Extract(args) => cmd_extract(args, &config_file).await,
        Commands::Chat(args) => cmd_chat(args, &config_file).await,
        Commands::Status => cmd_status(&config_file).await,
        Commands::Config(args) => cmd_config(args, &config_file).await,
    }
}

/// Load the config file, merge the environment and build the app.
async fn build_app(config_file: &Path) -> Result<(App, FolioConfig)> {
    let config = config::load_config_from(config_file).await?.with_env();
    for issue in config.validate() {
        match issue.level {
            IssueLevel::Error => tracing::error!("{issue}"),
            IssueLevel::Warning => tracing::warn!("{issue}"),
        }
    }
    if !config.is_valid() {
        return Err(CliError::usage(format!(
            "invalid configuration in {}",
            config_file.display()
        )));
    }

    let gemini: SharedChatProvider = Arc::new(Gemini::new(config.gemini_config()?)?);
    tracing::info!(
        model = %config.agents.root_model,
        vertex = config.gemini.vertex_project.is_some(),
        "Using Gemini backend"
    );

    let options = config.title_options();
    let extractor = options.title_extractor_agent(Arc::clone(&gemini));
    let app = App::new(config.app.name.clone(), options.root_agent(gemini, extractor))
        .plugin(SaveFilesAsArtifactsPlugin);
    Ok((app, config))
}

/// Read `path` into an inline data part named after the file.
async fn upload_part(path: &Path, mime: Option<&str>) -> Result<ContentPart> {
    let data = tokio::fs::read(path).await?;
    let mime_type = mime.map_or_else(
        || {
            mime_guess::from_path(path)
                .first()
                .map(|m| m.essence_str().to_owned())
                .unwrap_or_default()
        },
        str::to_owned,
    );
    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::usage(format!("not a file: {}", path.display())))?;

    tracing::debug!(file = %display_name, mime = %mime_type, bytes = data.len(), "Uploading file");
    Ok(ContentPart::inline_data(
        Blob::new(mime_type, data).with_display_name(display_name),
    ))
}

/// Upload a file and print the reply.
async fn cmd_extract(args: ExtractArgs, config_file: &Path) -> Result<()> {
    let (app, config) = build_app(config_file).await?;
    let session = AppSession::new(&config.app.user_id, &args.session);

    let upload = upload_part(&args.file, args.mime.as_deref()).await?;
    let result = app
        .run(&session, vec![ContentPart::text(args.message), upload])
        .await?;

    println!("{}", result.output);
    tracing::info!(
        steps = result.steps,
        input_tokens = result.usage.input_tokens,
        output_tokens = result.usage.output_tokens,
        "Run complete"
    );
    Ok(())
}

/// Start interactive chat.
async fn cmd_chat(args: ChatArgs, config_file: &Path) -> Result<()> {
    let (app, config) = build_app(config_file).await?;
    let session = AppSession::new(&config.app.user_id, &args.session);

    println!("Folio Chat | '/upload <path> [message]' attaches a file, 'exit' quits\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", args.prompt);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let input: UserInput = if let Some(rest) = line.strip_prefix("/upload") {
            let rest = rest.trim();
            let (path, message) = rest.split_once(' ').unwrap_or((rest, ""));
            if path.is_empty() {
                println!("usage: /upload <path> [message]");
                continue;
            }
            match upload_part(Path::new(path), None).await {
                Ok(part) if message.trim().is_empty() => vec![part].into(),
                Ok(part) => vec![ContentPart::text(message.trim()), part].into(),
                Err(e) => {
                    println!("error: {e}");
                    continue;
                }
            }
        } else {
            line.into()
        };

        match app.run(&session, input).await {
            Ok(result) => println!("\n{}\n", result.output),
            Err(e) => println!("\nerror: {e}\n"),
        }
    }

    Ok(())
}

/// Show status.
async fn cmd_status(config_file: &Path) -> Result<()> {
    println!("Folio Status\n");

    println!("Configuration:");
    println!("  Path:   {}", config_file.display());
    println!(
        "  Exists: {}",
        if config_file.exists() { "yes" } else { "no" }
    );

    match config::load_config_from(config_file).await {
        Ok(config) => {
            let config = config.with_env();
            let issues = config.validate();
            if config.is_valid() {
                println!("  Valid:  yes");
            } else {
                println!("  Valid:  no");
            }
            for issue in &issues {
                println!("    {issue}");
            }
            println!();
            println!("App:");
            println!("  Name:             {}", config.app.name);
            println!("  User:             {}", config.app.user_id);
            println!("Agents:");
            println!("  Root model:       {}", config.agents.root_model);
            println!("  Extractor model:  {}", config.agents.extractor_model);
            println!("  Extraction model: {}", config.extraction.model);
            println!("  Max steps:        {}", config.agents.max_steps);
            println!("Gemini:");
            println!(
                "  Backend:          {}",
                if config.gemini.vertex_project.is_some() {
                    "Vertex AI"
                } else {
                    "Developer API"
                }
            );
            println!(
                "  Credentials:      {}",
                if config.gemini_config().is_ok() { "ok" } else { "missing" }
            );
        }
        Err(e) => println!("  Valid:  no ({e})"),
    }

    println!();
    println!("Environment:");
    for name in [
        "GEMINI_API_KEY",
        "GOOGLE_API_KEY",
        "GOOGLE_GENAI_USE_VERTEXAI",
        "GOOGLE_CLOUD_PROJECT",
        "GOOGLE_CLOUD_LOCATION",
        "GOOGLE_ACCESS_TOKEN",
        "FOLIO_CONFIG",
    ] {
        print_env_status(name);
    }

    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            let config = config::load_config_from(config_file).await?;
            let text = toml::to_string_pretty(&config).map_err(config::ConfigError::from)?;
            if !config_file.exists() {
                println!("# {} does not exist; showing defaults", config_file.display());
            }
            println!("{text}");
        }
        ConfigCommands::Init { force } => {
            if config::init_config_at(config_file, force).await? {
                println!("Configuration created: {}", config_file.display());
                println!();
                println!("Next steps:");
                println!("  1. export GEMINI_API_KEY=<key>");
                println!("  2. folio extract paper.pdf");
            } else {
                println!("Configuration already exists at: {}", config_file.display());
                println!("Use --force to overwrite.");
            }
        }
    }

    Ok(())
}

/// Print environment variable status.
fn print_env_status(name: &str) {
    let status = if std::env::var(name).is_ok() {
        "set"
    } else {
        "-"
    };
    println!("  {name}: {status}");
}
