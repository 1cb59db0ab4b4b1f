// crates/edge/src/cli.rs

use crate::{settings, sweeper::spawn_sweeper, Error};
use adapt::service::Services;
use adapt::store::{DocumentStore, InMemoryStore, JsonFileStore};
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::security::password::{hash_password, validate_policy};
use domain::setting::{Settings, StoreBackend};
use secrecy::{ExposeSecret, SecretString};
use serve::{app_router, AppState};
use std::{net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info, warn};

pub type Result<T> = std::result::Result<T, Error>;

/// Pledge book CLI
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result: anyhow::Result<()> = match cli.command {
        Commands::Start(start) => do_start(start).await.map_err(Into::into),
        Commands::HashPassword(cmd) => do_hash_password(cmd).map_err(Into::into),
    };

    result.map_or_else(
        |e| {
            error!("pledgebook failed: {:#}", e);
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

#[tracing::instrument(skip_all)]
async fn do_start(start: StartCmd) -> Result<()> {
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(start)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.inject_dependencies()?;
    info!(
        "Dependencies injected in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let process = process.start_server().await?;
    process.run_until_shutdown().await
}

#[tracing::instrument(skip_all)]
fn do_hash_password(cmd: HashPasswordCmd) -> Result<()> {
    let secret = SecretString::from(cmd.password);
    let pw = secret.expose_secret();
    if validate_policy(pw).is_err() {
        warn!("password is shorter than the minimum admins may register with");
    }
    println!("{}", hash_password(pw)?);
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "pledgebook", version, about = "Wedding pledge book server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the pledge book using the specified directory
    Start(StartCmd),
    /// Print an argon2 hash for `[default_admin] password_hash`
    HashPassword(HashPasswordCmd),
}

#[derive(Parser, Debug)]
pub struct StartCmd {
    /// Site directory holding settings.toml (or set PLEDGEBOOK_DIR)
    ///
    /// Must exist and be a directory.
    #[arg(
        value_name = "DIR",
        env = "PLEDGEBOOK_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct HashPasswordCmd {
    /// Password to hash (or set PLEDGEBOOK_PASSWORD)
    #[arg(value_name = "PASSWORD", env = "PLEDGEBOOK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    settings: Settings,
}

struct ServicesWired {
    settings: Settings,
    services: Services,
}

struct ServerStarted {
    server: JoinHandle<std::io::Result<()>>,
    sweeper: JoinHandle<()>,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for ServicesWired {}
impl ProcessState for ServerStarted {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    /// Load `<dir>/settings.toml` plus environment overrides.
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(command: StartCmd) -> Result<StartProcess<SettingsLoaded>> {
        let settings = settings::load(&command.dir)?;
        Ok(StartProcess {
            state: SettingsLoaded { settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    fn inject_dependencies(self) -> Result<StartProcess<ServicesWired>> {
        let settings = self.state.settings;
        let store = open_store(&settings);
        let services = Services::new(store, &settings)?;
        Ok(StartProcess {
            state: ServicesWired { settings, services },
        })
    }
}

fn open_store(settings: &Settings) -> Arc<dyn DocumentStore> {
    match settings.store.backend {
        StoreBackend::Memory => {
            warn!("using the in-memory store; nothing will survive a restart");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Json => {
            let store = JsonFileStore::new(settings.store.dir.clone());
            info!("storing documents under {}", store.dir().display());
            Arc::new(store)
        }
    }
}

impl StartProcess<ServicesWired> {
    #[tracing::instrument(skip_all)]
    async fn start_server(self) -> Result<StartProcess<ServerStarted>> {
        let ServicesWired { settings, services } = self.state;
        let addr = SocketAddr::new(settings.server.ip, settings.server.port);

        let sweeper = spawn_sweeper(
            Arc::clone(&services.sessions),
            settings.session.sweep_interval(),
        );

        let app = app_router(AppState::new(services, settings.event));
        let listener = TcpListener::bind(addr).await?;
        info!("pledgebook listening on http://{}", listener.local_addr()?);

        let server = tokio::spawn(async move {
            axum::serve(
                listener,
                axum::ServiceExt::<axum::extract::Request>::into_make_service(app),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await
        });

        Ok(StartProcess {
            state: ServerStarted { server, sweeper },
        })
    }
}

impl StartProcess<ServerStarted> {
    #[tracing::instrument(skip_all)]
    async fn run_until_shutdown(self) -> Result<()> {
        let ServerStarted { server, sweeper } = self.state;
        let outcome = server.await;
        sweeper.abort();
        match outcome {
            Ok(result) => {
                result?;
                info!("pledgebook stopped");
                Ok(())
            }
            Err(join) => Err(Error::Config(format!("server task failed: {join}"))),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
