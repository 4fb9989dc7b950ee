//! `photomark` binary entry point.

use clap::{Parser, Subcommand};
use photomark_app::commands::{self, AnnotateArgs, FetchArgs, RenderArgs, SaveArgs};
use photomark_app::{AppConfig, CliError, HttpClient};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "photomark", version, about = "Annotate photos with strokes and circles")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project API base URL; overrides the config file.
    #[arg(long, global = true, env = "PHOTOMARK_API_URL")]
    api_url: Option<String>,

    #[arg(long, global = true, env = "PHOTOMARK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite an annotation log over an image.
    Render(RenderArgs),
    /// Replay a recorded input script against an image.
    Annotate(AnnotateArgs),
    /// Download an image through the cached/fresh URL fallback chain.
    Fetch(FetchArgs),
    /// Flatten an annotated image and upload it to a project.
    Save(SaveArgs),
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    match cli.command {
        Command::Render(args) => {
            let out = commands::render(&config, &args)?;
            println!("{}", out.display());
        }
        Command::Annotate(args) => {
            let out = commands::annotate(&config, &args)?;
            println!("{}", out.display());
        }
        Command::Fetch(args) => {
            let client = HttpClient::new(&config.api_url, cli.token)?;
            let out = commands::fetch(&client, &client, &args).await?;
            println!("{}", out.display());
        }
        Command::Save(args) => {
            let client = HttpClient::new(&config.api_url, cli.token)?;
            let ack = commands::save(&config, &client, &args).await?;
            println!("{}", ack.file_id.as_deref().unwrap_or("saved"));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Starting PhotoMark: {:?}", cli.command);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
