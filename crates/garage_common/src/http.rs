// --- File: crates/garage_common/src/http.rs ---
use reqwest::{Response, StatusCode};

// Include the client module
pub mod client;


/// Passes a response through when its status is 2xx, otherwise yields the status.
///
/// Callers decide how a non-success status maps onto their own error type;
/// no status is treated as retryable.
pub fn ensure_success(response: Response) -> Result<Response, StatusCode> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(status)
    }
}
