use clap::{Parser, Subcommand};
use rgenstudio::{
    logger::{self, LogLevel, LoggerConfig},
    session::save_image,
    CreativeApp, GeminiClient, ImageClient, MockIdentityProvider, StudioConfig, View,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rgenstudio", version, about = "Generate or edit images with Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory results are saved to (overrides STUDIO_DOWNLOAD_DIR)
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// File name prefix for saved results (overrides STUDIO_DOWNLOAD_PREFIX)
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Model id (overrides GEMINI_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an image from a text prompt
    Generate { prompt: String },
    /// Edit an image (max 5MB) according to a text instruction
    Edit { image: PathBuf, prompt: String },
    /// List known image models
    Models,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut log_config = LoggerConfig::from_env();
    if cli.verbose {
        log_config = log_config.with_level(LogLevel::Debug);
    }
    logger::init_with_config(log_config)?;

    if dotenv_loaded {
        log::debug!("✅ .env file loaded successfully");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    let (image, prompt) = match cli.command {
        Command::Models => {
            for model in ImageClient::supported_models() {
                println!("{}  {} ({}): {}", model.id, model.name, model.provider, model.description);
            }
            return Ok(());
        }
        Command::Generate { prompt } => (None, prompt),
        Command::Edit { image, prompt } => (Some(image), prompt),
    };

    let mut config = StudioConfig::from_env();
    if let Some(model) = cli.model {
        config.gemini = config.gemini.with_model(model);
    }
    if let Some(out) = cli.out {
        config = config.with_download_dir(out);
    }
    if let Some(prefix) = cli.prefix {
        config = config.with_download_prefix(prefix);
    }
    logger::log_config_info(&config);

    let client = GeminiClient::new(config.gemini.clone())?;

    let mut app = CreativeApp::new(MockIdentityProvider);
    app.sign_in()?;
    let studio = app.studio_mut().ok_or("no active session")?;

    if let Some(path) = image {
        studio.attach_file(&path)?;
    }
    studio.set_prompt(prompt);
    if !studio.can_submit() {
        return Err("prompt must not be empty".into());
    }

    log::info!("🔄 {}", studio.mode().progress_label());
    studio.submit(client.image()).await;

    let outcome = match studio.view() {
        View::Result(image) => {
            let path = save_image(image, &config.download_dir, &config.download_prefix)?;
            println!("{}", path.display());
            Ok(())
        }
        View::Error(message) => {
            log::error!("❌ {}", message);
            Err(message.to_string().into())
        }
        View::Welcome | View::Loading { .. } => Err("request did not complete".into()),
    };

    app.sign_out();
    outcome
}
