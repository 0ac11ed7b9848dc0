//! Keepsake CLI - inspect and reset encrypted local app state

use anyhow::bail;
use clap::{Parser, Subcommand};
use keepsake_core::application::AppState;
use keepsake_core::config::Config;
use keepsake_core::domain::stores::Theme;

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(author, version, about = "Encrypted local state store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the key source and a summary of every domain
    Status,

    /// Print one domain's state document as JSON
    Show {
        /// Domain name (user, settings, app-data, scratch)
        domain: String,
    },

    /// Set the color theme
    SetTheme {
        /// light, dark or system
        theme: String,
    },

    /// Set the UI language
    SetLanguage {
        /// Language code, e.g. "en"
        language: String,
    },

    /// Flip the notifications preference
    ToggleNotifications,

    /// Reset every registered domain to its initial state
    Reset {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },

    /// Wipe the encrypted store wholesale (does not touch in-memory state)
    ClearStorage {
        /// Required; this is destructive
        #[arg(long)]
        yes: bool,
    },
}

fn parse_theme(value: &str) -> anyhow::Result<Theme> {
    match value.to_lowercase().as_str() {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        "system" => Ok(Theme::System),
        other => bail!("Unknown theme '{}'. Expected light, dark or system.", other),
    }
}

async fn cmd_status(state: &AppState, quiet: bool) -> anyhow::Result<()> {
    let user = state.user().snapshot().await;
    let settings = state.settings().snapshot().await;
    let app_data = state.app_data().snapshot().await;

    if quiet {
        println!("{}", state.key_source());
        return Ok(());
    }

    println!("Key source:    {}", state.key_source());
    println!("Database:      {}", state.database().path().display());
    println!("Domains:       {}", state.domains().join(", "));
    println!();
    println!(
        "User:          {} ({})",
        user.user
            .as_ref()
            .map(|u| u.email.as_str())
            .unwrap_or("none"),
        if user.is_logged_in {
            "logged in"
        } else {
            "logged out"
        }
    );
    println!(
        "Settings:      theme={} language={} notifications={}",
        settings.theme, settings.language, settings.notifications
    );
    println!(
        "Sync:          last={} loading={}",
        app_data
            .last_sync_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string()),
        app_data.is_loading
    );
    Ok(())
}

async fn cmd_show(state: &AppState, domain: &str) -> anyhow::Result<()> {
    let json = match domain {
        "user" => serde_json::to_string_pretty(&state.user().snapshot().await)?,
        "settings" => serde_json::to_string_pretty(&state.settings().snapshot().await)?,
        "app-data" => serde_json::to_string_pretty(&state.app_data().snapshot().await)?,
        "scratch" => serde_json::to_string_pretty(&state.scratch().snapshot().await)?,
        other => bail!(
            "Unknown domain '{}'. Expected user, settings, app-data or scratch.",
            other
        ),
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keepsake=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let state = AppState::init(&config).await?;

    match cli.command {
        Commands::Status => cmd_status(&state, cli.quiet).await?,

        Commands::Show { domain } => cmd_show(&state, &domain).await?,

        Commands::SetTheme { theme } => {
            let theme = parse_theme(&theme)?;
            state.settings().set_theme(theme).await?;
            if !cli.quiet {
                println!("Theme set to {}", theme);
            }
        }

        Commands::SetLanguage { language } => {
            state.settings().set_language(&language).await?;
            if !cli.quiet {
                println!("Language set to {}", language);
            }
        }

        Commands::ToggleNotifications => {
            state.settings().toggle_notifications().await?;
            let now = state.settings().snapshot().await.notifications;
            if !cli.quiet {
                println!("Notifications {}", if now { "on" } else { "off" });
            }
        }

        Commands::Reset { yes } => {
            if !yes {
                bail!("Refusing to reset all domains without --yes");
            }
            state.reset_all().await?;
            if !cli.quiet {
                println!("All registered domains reset to initial state");
            }
        }

        Commands::ClearStorage { yes } => {
            if !yes {
                bail!("Refusing to clear storage without --yes");
            }
            state.clear_storage().await?;
            if !cli.quiet {
                println!("Encrypted store cleared");
            }
        }
    }

    Ok(())
}
