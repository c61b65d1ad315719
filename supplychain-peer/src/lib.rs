//! Local peer: executes contract invocations submitted over a Unix socket,
//! one transaction at a time.

mod error;
pub mod paths;
pub mod protocol;
mod runtime;

pub use error::PeerError;
pub use protocol::{
    request_invoke, request_status, request_stop, send_request, InvokeResult, PeerRequest,
    PeerResponse,
};
pub use runtime::{run, start_blocking};
