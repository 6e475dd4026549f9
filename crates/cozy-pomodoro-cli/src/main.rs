use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use cozy_pomodoro_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "cozy-pomodoro", version, about = "Cozy Pomodoro CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Timer settings (durations, auto-start, notifications, focus mode)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Task list
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Free-form notes
    Notes {
        #[command(subcommand)]
        action: commands::task::NotesAction,
    },
    /// Background, ambient sound, volume and theme
    Ambience {
        #[command(subcommand)]
        action: commands::ambience::AmbienceAction,
    },
    /// Application configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
/// `COZY_POMODORO_LOG` wins over `RUST_LOG`, which wins over the config file.
fn init_logging() {
    let filter = std::env::var("COZY_POMODORO_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| {
            let spec = AppConfig::load().map(|c| c.logging.filter).unwrap_or_default();
            EnvFilter::try_new(spec).unwrap_or_else(|_| EnvFilter::new("warn"))
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Notes { action } => commands::task::run_notes(action),
        Commands::Ambience { action } => commands::ambience::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "cozy-pomodoro", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
