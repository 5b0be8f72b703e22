use std::cell::RefCell;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use youtube_rotate::{
    authenticate, run_cycle, AutoConfirm, Confirm, Config, CycleOutcome, FileCredentialStore,
    Schedule, StdinConfirm, YouTube,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Playlist to rotate, overrides the config file
    #[arg(long)]
    playlist: Option<String>,
    #[arg(long)]
    client_secret: Option<PathBuf>,
    #[arg(long)]
    token_cache: Option<PathBuf>,
    /// Rotate without asking
    #[arg(short, long)]
    yes: bool,
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        let path = self.config.clone().unwrap_or_else(Config::default_path);
        let mut config = Config::load(&path)?;

        if let Some(playlist) = &self.playlist {
            config.playlist_id = playlist.clone();
        }
        if let Some(path) = &self.client_secret {
            config.client_secret_path = path.clone();
        }
        if let Some(path) = &self.token_cache {
            config.token_cache_path = path.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// A declined rotation ends the process with a failure status.
fn exit_code(last: Option<CycleOutcome>) -> i32 {
    match last {
        Some(CycleOutcome::Declined) => 1,
        _ => 0,
    }
}

fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .try_init()?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    let config = cli.load_config()?;
    tracing::info!(playlist = %config.playlist_id, "starting rotation loop");

    let mut schedule = Schedule::from_config(&config);
    if cli.once {
        schedule = schedule.once();
    }

    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(StdinConfirm::stdin())
    };
    let confirm = RefCell::new(confirm);

    let config = &config;
    let confirm = &confirm;
    let last = schedule
        .run(move || async move {
            let store = FileCredentialStore::new(&config.token_cache_path);
            let token = authenticate(config, store).await?;
            let api = YouTube::new(&token, &config.api_base_url)?;
            run_cycle(&api, &mut **confirm.borrow_mut(), config).await
        })
        .await;

    match exit_code(last) {
        0 => Ok(()),
        code => std::process::exit(code),
    }
}
