use anyhow::Result;
use clap::{Parser, Subcommand};
use relive_core::user::Role;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "relive")]
#[command(about = "ReLive CLI - keep memories with photos, videos and voice notes", long_about = None)]
struct Cli {
    /// Directory holding config.toml and the session file
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value_t = Role::Family)]
        role: Role,
    },
    /// Show the logged-in user
    Whoami,
    /// Forget the stored session
    Logout,
    /// List memories
    List,
    /// Create a memory, or update one with --memory-id, and attach media files
    Submit(commands::memory::SubmitArgs),
    /// List the patients you can add memories for
    Patients,
    /// Link to a patient with the code they shared
    Connect { code: String },
    /// Show your connect code as a patient
    Code {
        /// Issue a new code, replacing the current one
        #[arg(long, conflicts_with = "revoke")]
        new: bool,
        /// Revoke the current code
        #[arg(long)]
        revoke: bool,
    },
    /// Toggle the like on a memory
    Like { id: u64 },
    /// Delete a memory
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,relive=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = commands::App::connect(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&app, &email, &password).await?
        }
        Commands::Register {
            username,
            email,
            password,
            role,
        } => commands::auth::register(&app, &username, &email, &password, role).await?,
        Commands::Whoami => commands::auth::whoami(&app).await?,
        Commands::Logout => commands::auth::logout(&app).await?,
        Commands::List => commands::memory::list(&app).await?,
        Commands::Submit(args) => commands::memory::submit(&app, args).await?,
        Commands::Patients => commands::family::patients(&app).await?,
        Commands::Connect { code } => commands::family::connect(&app, &code).await?,
        Commands::Code { new, revoke } => commands::family::code(&app, new, revoke).await?,
        Commands::Like { id } => commands::memory::toggle_like(&app, id).await?,
        Commands::Delete { id } => commands::memory::delete(&app, id).await?,
    }

    Ok(())
}
