use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, Mutex};

use supplychain_state::{execute, timestamp_now, FileWorldState};

use crate::error::{io_err, PeerError};
use crate::paths::socket_path;
use crate::protocol::{InvokeResult, PeerRequest, PeerResponse};

/// Committed state plus counters, guarded by one lock so transactions apply
/// strictly one after another.
struct Ledger {
    world: FileWorldState,
    committed: u64,
}

type SharedLedger = Arc<Mutex<Ledger>>;

/// Start the peer runtime and block the current thread until it exits.
pub fn start_blocking(home: &Path) -> Result<(), PeerError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf()))
}

/// Run the peer runtime.
pub async fn run(home: PathBuf) -> Result<(), PeerError> {
    let world = FileWorldState::open_at(&home)?;
    let ledger: SharedLedger = Arc::new(Mutex::new(Ledger {
        world,
        committed: 0,
    }));
    let started_at_unix = unix_seconds_now();

    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let socket_handle = {
        let shutdown = shutdown_tx.clone();
        let home = home.clone();
        let ledger = ledger.clone();
        tokio::spawn(async move {
            let result = socket_server_task(
                home,
                ledger,
                shutdown.clone(),
                shutdown.subscribe(),
                started_at_unix,
            )
            .await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down peer");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(PeerError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (socket_result, signal_result) = tokio::join!(socket_handle, signal_handle);

    handle_join("socket_server", socket_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn socket_server_task(
    home: PathBuf,
    ledger: SharedLedger,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
    started_at_unix: u64,
) -> Result<(), PeerError> {
    let socket = socket_path(&home);
    prepare_socket_for_bind(&socket)?;

    let listener = UnixListener::bind(&socket).map_err(|e| io_err(&socket, e))?;
    set_socket_permissions(&socket)?;
    tracing::info!(socket = %socket.display(), "peer listening");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let ledger = ledger.clone();
                let shutdown_tx = shutdown_tx.clone();
                let socket = socket.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_socket_client(
                        stream,
                        ledger,
                        shutdown_tx,
                        socket,
                        started_at_unix,
                    ).await {
                        tracing::error!(error = %err, "socket client error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

async fn handle_socket_client(
    stream: UnixStream,
    ledger: SharedLedger,
    shutdown_tx: broadcast::Sender<()>,
    socket: PathBuf,
    started_at_unix: u64,
) -> Result<(), PeerError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("peer socket read", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request: PeerRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                write_response(
                    &mut writer,
                    &PeerResponse::error(format!("invalid request JSON: {err}")),
                )
                .await?;
                continue;
            }
        };

        let stop = request.cmd == "stop";
        let response =
            handle_request(request, &ledger, &shutdown_tx, &socket, started_at_unix).await;
        write_response(&mut writer, &response).await?;
        if stop {
            break;
        }
    }

    Ok(())
}

async fn handle_request(
    request: PeerRequest,
    ledger: &SharedLedger,
    shutdown_tx: &broadcast::Sender<()>,
    socket: &Path,
    started_at_unix: u64,
) -> PeerResponse {
    match request.cmd.as_str() {
        "status" => match build_status_payload(ledger, socket, started_at_unix).await {
            Ok(payload) => PeerResponse::ok(payload),
            Err(err) => PeerResponse::error(err.to_string()),
        },
        "invoke" => {
            let Some(function) = request.function else {
                return PeerResponse::error("invoke requires a function name");
            };
            match invoke(ledger, function, request.args).await {
                Ok(result) => match serde_json::to_value(result) {
                    Ok(data) => PeerResponse::ok(data),
                    Err(err) => PeerResponse::error(err.to_string()),
                },
                Err(PeerError::Rejected(message)) => PeerResponse::error(message),
                Err(err) => PeerResponse::error(err.to_string()),
            }
        }
        "stop" => {
            let _ = shutdown_tx.send(());
            PeerResponse::ok(json!({ "stopping": true }))
        }
        other => PeerResponse::error(format!("unknown command '{other}'")),
    }
}

/// Execute one transaction under the ledger lock on the blocking pool.
async fn invoke(
    ledger: &SharedLedger,
    function: String,
    args: Vec<String>,
) -> Result<InvokeResult, PeerError> {
    let mut guard = ledger.clone().lock_owned().await;
    let outcome = tokio::task::spawn_blocking(move || {
        let result = execute(&guard.world, &function, &args, timestamp_now());
        if matches!(&result, Ok(execution) if execution.commit.is_some()) {
            guard.committed += 1;
        }
        (function, result)
    })
    .await
    .map_err(|err| PeerError::Protocol(format!("transaction task join failure: {err}")))?;

    let (function, result) = outcome;
    let execution = match result {
        Ok(execution) => execution,
        Err(err) => {
            tracing::warn!(function = %function, error = %err, "transaction rejected");
            return Err(PeerError::Rejected(err.to_string()));
        }
    };

    let tx_id = execution.commit.map(|commit| {
        tracing::info!(
            function = %function,
            tx_id = %commit.tx_id,
            written = commit.written.len(),
            "transaction committed"
        );
        commit.tx_id
    });
    let payload = if execution.payload.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&execution.payload)?
    };
    Ok(InvokeResult { tx_id, payload })
}

async fn build_status_payload(
    ledger: &SharedLedger,
    socket: &Path,
    started_at_unix: u64,
) -> Result<Value, PeerError> {
    let guard = ledger.lock().await;
    Ok(json!({
        "running": true,
        "started_at_unix": started_at_unix,
        "socket": socket.display().to_string(),
        "committed_transactions": guard.committed,
        "records": guard.world.len()?,
    }))
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), PeerError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(PeerError::Protocol(format!(
                "peer socket already in use: {}",
                socket.display()
            )));
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale peer socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    response: &PeerResponse,
) -> Result<(), PeerError> {
    let payload = serde_json::to_string(response)?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("peer socket write", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("peer socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("peer socket flush", e))?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), PeerError>, tokio::task::JoinError>,
) -> Result<(), PeerError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(PeerError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), PeerError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), PeerError> {
    Ok(())
}
