use clap::Parser;
use seam_server::http::{self, AppState};
use seam_server::producer::{ScriptedProducer, UpdateProducer};
use seam_session::{FileStore, MemoryStore, SessionStore, ThreadLocks};
use seam_stream::{AgentUpdate, PauseRequest};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seam-server")]
struct Args {
    #[arg(long, env = "SEAM_HTTP_ADDR", default_value = "127.0.0.1:8080")]
    http_addr: String,

    /// Persist sessions as JSON documents under this directory.
    /// Sessions stay in process memory when unset.
    #[arg(long, env = "SEAM_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// JSON turn script for the reference producer.
    #[arg(long, env = "SEAM_SCRIPT")]
    script: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    turns: Vec<ScriptTurn>,
}

/// One scripted turn: an assistant reply, optionally followed by a pause
/// asking approval for a tool call.
#[derive(Debug, Deserialize)]
struct ScriptTurn {
    #[serde(default)]
    reply: String,
    #[serde(default)]
    approval: Option<ScriptApproval>,
}

#[derive(Debug, Deserialize)]
struct ScriptApproval {
    id: String,
    function_name: String,
    #[serde(default)]
    function_arguments: serde_json::Value,
}

fn build_producer(script: Option<ScriptFile>) -> ScriptedProducer {
    let turns = match script {
        Some(s) => s.turns,
        None => vec![ScriptTurn {
            reply: "Hello from the seam reference server.".to_string(),
            approval: None,
        }],
    };

    let turns: Vec<Vec<AgentUpdate>> = turns
        .into_iter()
        .enumerate()
        .map(|(i, turn)| {
            let mut updates = Vec::new();
            if !turn.reply.is_empty() {
                updates.push(AgentUpdate::text(format!("msg_turn_{i}"), turn.reply));
            }
            if let Some(approval) = turn.approval {
                updates.push(AgentUpdate::Pause(PauseRequest::approval(
                    approval.id,
                    approval.function_name,
                    approval.function_arguments,
                )));
            }
            updates
        })
        .collect();
    ScriptedProducer::new(turns)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let script = match args.script {
        Some(path) => {
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    eprintln!("failed to read script {}: {e}", path.display());
                    std::process::exit(2);
                }
            };
            let parsed = match serde_json::from_str::<ScriptFile>(&raw) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("failed to parse script (JSON): {e}");
                    std::process::exit(2);
                }
            };
            Some(parsed)
        }
        None => None,
    };

    let store: Arc<dyn SessionStore> = match args.storage_dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    };
    let producer: Arc<dyn UpdateProducer> = Arc::new(build_producer(script));

    let app = http::router(AppState {
        store,
        producer,
        locks: Arc::new(ThreadLocks::new()),
    })
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&args.http_addr)
        .await
        .expect("failed to bind http listener");
    info!(addr = %args.http_addr, "seam server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("http server crashed");
}
