use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError, Response};
use std::time::Duration;

/// A static HTTP client that can be reused across the application.
/// No timeout is set, requests run until the transport gives up.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Creates a client, optionally with a request timeout.
///
/// `None` returns a clone of [`HTTP_CLIENT`], which shares its connection pool.
pub fn create_client(timeout: Option<Duration>) -> Result<Client, ReqwestError> {
    match timeout {
        Some(timeout) => Client::builder().timeout(timeout).build(),
        None => Ok(HTTP_CLIENT.clone()),
    }
}

/// A utility function to make a GET request to the specified URL.
pub async fn get(client: &Client, url: &str) -> Result<Response, ReqwestError> {
    client.get(url).send().await
}

/// A utility function to make a POST request with a JSON body.
pub async fn post<T: serde::Serialize + ?Sized>(
    client: &Client,
    url: &str,
    body: &T,
) -> Result<Response, ReqwestError> {
    client.post(url).json(body).send().await
}
