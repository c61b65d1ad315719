use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{io_err, PeerError};
use crate::paths::socket_path;

/// JSON newline-delimited request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRequest {
    pub cmd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl PeerRequest {
    pub fn command(cmd: &str) -> Self {
        Self {
            cmd: cmd.to_string(),
            function: None,
            args: Vec::new(),
        }
    }

    pub fn invoke(function: &str, args: Vec<String>) -> Self {
        Self {
            cmd: "invoke".to_string(),
            function: Some(function.to_string()),
            args,
        }
    }
}

/// JSON newline-delimited response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PeerResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// `data` of a successful `invoke` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResult {
    /// Absent for read-only functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    /// Decoded contract payload; `null` when the function returns nothing.
    #[serde(default)]
    pub payload: Value,
}

/// Send one JSON request to the peer socket and return one response.
pub fn send_request(home: &Path, request: &PeerRequest) -> Result<PeerResponse, PeerError> {
    let socket = socket_path(home);
    if !socket.exists() {
        return Err(PeerError::PeerNotRunning { socket });
    }

    let mut stream = UnixStream::connect(&socket).map_err(|err| {
        if matches!(
            err.kind(),
            std::io::ErrorKind::NotFound
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
        ) {
            PeerError::PeerNotRunning {
                socket: socket.clone(),
            }
        } else {
            io_err(&socket, err)
        }
    })?;

    let payload = serde_json::to_string(request)?;
    stream
        .write_all(payload.as_bytes())
        .map_err(|e| io_err(&socket, e))?;
    stream.write_all(b"\n").map_err(|e| io_err(&socket, e))?;
    stream.flush().map_err(|e| io_err(&socket, e))?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| io_err(&socket, e))?;
    if read == 0 {
        return Err(PeerError::Protocol(
            "peer closed connection before responding".to_string(),
        ));
    }

    let response: PeerResponse = serde_json::from_str(line.trim_end())?;
    Ok(response)
}

/// Query runtime status, retrying briefly while the socket comes up.
pub fn request_status(home: &Path) -> Result<Value, PeerError> {
    let request = PeerRequest::command("status");

    let mut last_not_running: Option<PeerError> = None;
    for attempt in 0..5 {
        match send_request(home, &request) {
            Ok(response) => return response_into_data(response),
            Err(err @ PeerError::PeerNotRunning { .. }) => {
                last_not_running = Some(err);
                if attempt < 4 {
                    sleep(Duration::from_millis(100));
                    continue;
                }
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_not_running.unwrap_or_else(|| {
        PeerError::Protocol("peer status retry loop exited unexpectedly".to_string())
    }))
}

pub fn request_stop(home: &Path) -> Result<(), PeerError> {
    let response = send_request(home, &PeerRequest::command("stop"))?;
    response_into_data(response).map(|_| ())
}

/// Submit `function(args)` as one transaction.
///
/// A contract refusal comes back as [`PeerError::Rejected`] carrying the
/// contract's message.
pub fn request_invoke(
    home: &Path,
    function: &str,
    args: Vec<String>,
) -> Result<InvokeResult, PeerError> {
    let response = send_request(home, &PeerRequest::invoke(function, args))?;
    if !response.ok {
        return Err(PeerError::Rejected(
            response
                .error
                .unwrap_or_else(|| "unknown peer error".to_string()),
        ));
    }
    Ok(serde_json::from_value(response.data.unwrap_or(Value::Null))?)
}

fn response_into_data(response: PeerResponse) -> Result<Value, PeerError> {
    if response.ok {
        Ok(response.data.unwrap_or(Value::Null))
    } else {
        Err(PeerError::Protocol(
            response
                .error
                .unwrap_or_else(|| "unknown peer error".to_string()),
        ))
    }
}
