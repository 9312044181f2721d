use anyhow::{Result, anyhow};
use api::{AppState, category_icon};
use clap::{Parser, Subcommand};
use common::ClientConfig;
use media::{ContentKind, NoGeolocation, NoMediaDevices};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "corpus-client", version, about = "Contribute content to the corpus platform")]
struct Cli {
    /// Backend base URL, overriding CORPUS_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a one-time password to a phone number
    RequestOtp { phone: String },

    /// Log in with the one-time password
    VerifyOtp { phone: String, otp: String },

    /// Log in with phone number and password
    Login {
        phone: String,
        #[arg(long, env = "CORPUS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    Logout,

    /// Show the signed-in user
    Whoami {
        /// Show the phone number and email unmasked
        #[arg(long)]
        reveal: bool,
    },

    /// List the published categories
    Categories,

    /// Submit one contribution
    Submit {
        #[arg(long)]
        category: String,

        /// text, audio, video or image
        #[arg(long, default_value = "text")]
        kind: ContentKind,

        #[arg(long)]
        title: String,

        /// Body of a text contribution
        #[arg(long)]
        text: Option<String>,

        /// Media file for audio, video or image contributions
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long, allow_hyphen_values = true, requires = "longitude")]
        latitude: Option<String>,

        #[arg(long, allow_hyphen_values = true, requires = "latitude")]
        longitude: Option<String>,
    },

    /// Show contribution statistics
    Stats,

    /// Request an export of your data
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    info!("Using backend {}", config.api_base_url);

    // The CLI has no camera, microphone or positioning; files and typed
    // coordinates stand in for them
    let state =
        AppState::with_file_store(config, Arc::new(NoMediaDevices), Arc::new(NoGeolocation))?;
    state.sessions.restore().await?;

    run(&state, cli.command).await
}

async fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::RequestOtp { phone } => {
            state.sessions.request_otp(&phone).await.map_err(notice)?;
            println!("OTP sent successfully!");
        }
        Command::VerifyOtp { phone, otp } => {
            let session = state.sessions.verify_otp(&phone, &otp).await.map_err(notice)?;
            println!("Login successful! Welcome, {}", session.user.display_name());
        }
        Command::Login { phone, password } => {
            let session = state
                .sessions
                .login_with_password(&phone, &password)
                .await
                .map_err(notice)?;
            println!("Login successful! Welcome, {}", session.user.display_name());
        }
        Command::Logout => {
            state.sessions.logout().await?;
            println!("Logged out");
        }
        Command::Whoami { reveal } => match state.profile.contact_details(reveal).await {
            Some(contact) => {
                println!("{}", contact.name);
                if let Some(phone) = contact.phone {
                    println!("  phone: {}", phone);
                }
                if let Some(email) = contact.email {
                    println!("  email: {}", email);
                }
            }
            None => println!("Not logged in"),
        },
        Command::Categories => {
            let listing = state.categories.list_categories().await;
            if let Some(message) = listing.notice() {
                return Err(anyhow!(message));
            }
            for category in &listing.categories {
                println!(
                    "{} {} [{}]",
                    category_icon(&category.name),
                    category.display_title(),
                    category.id
                );
                if !category.description.is_empty() {
                    println!("    {}", category.description);
                }
            }
        }
        Command::Submit {
            category,
            kind,
            title,
            text,
            file,
            latitude,
            longitude,
        } => {
            let mut upload = state.upload(category, kind).map_err(notice)?;
            upload.set_title(title);
            if let Some(text) = text {
                upload.set_text(text);
            }
            if let Some(path) = file {
                upload.select_file(&path).await.map_err(notice)?;
            }

            match (latitude, longitude) {
                (Some(lat), Some(lng)) => {
                    upload.enter_location(&lat, &lng).map_err(notice)?;
                }
                _ => {
                    upload
                        .locate()
                        .await
                        .map_err(|e| anyhow!(e.user_message()))?;
                }
            }

            let result = upload.submit().await;
            upload.leave().await;
            let receipt = result.map_err(|e| anyhow!(e.user_message()))?;

            println!("Content submitted successfully!");
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Command::Stats => {
            let stats = state.profile.stats().await.map_err(notice)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Export => {
            let job = state.profile.request_export().await.map_err(notice)?;
            println!("Export {} is {}", job.task_id, job.status);
            if !job.message.is_empty() {
                println!("{}", job.message);
            }
        }
    }

    Ok(())
}

/// Turn a client error into the notice the user sees
fn notice(err: impl Into<common::ClientError>) -> anyhow::Error {
    anyhow!(err.into().user_message())
}
