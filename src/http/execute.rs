use std::collections::BTreeMap;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::{debug, error};

use crate::error::{ExecError, RequestError};

use super::headers::HeaderSet;
use super::outcome::{Cookie, HEADER_VALUE_SEPARATOR, Outcome, Reply};
use super::request::Request;
use super::transport::HttpTransport;

/// Executes `request` on the transport it was built with.
pub async fn execute(request: &Request) -> Outcome {
    execute_with(request, request.transport()).await
}

/// Executes `request` on an explicit transport.
///
/// Never fails: transport and body errors are stored on the returned
/// [`Outcome`] together with the time spent up to the failure.
pub async fn execute_with(request: &Request, transport: &dyn HttpTransport) -> Outcome {
    let url = request.target().as_str();
    debug!("Executing {} {}", request.method(), url);
    let start = Instant::now();

    let response = match transport.execute(request.to_wire()).await {
        Ok(response) => response,
        Err(err) => {
            error!("Request to {} failed: {}", url, err);
            return Outcome::failure(
                ExecError::SendFailed {
                    url: url.to_owned(),
                    source: err,
                },
                start.elapsed(),
            );
        }
    };

    let status = response.status().as_u16();
    let headers = collect_headers(response.headers());
    let cookies: Vec<Cookie> = response.cookies().map(|cookie| Cookie::from_reqwest(&cookie)).collect();

    match drain_response_body(response).await {
        Ok(body) => {
            let elapsed = start.elapsed();
            debug!("{} {} -> {} in {:?}", request.method(), url, status, elapsed);
            Outcome::success(
                Reply {
                    status,
                    headers,
                    cookies,
                    body,
                },
                elapsed,
            )
        }
        Err(err) => {
            error!("Failed to read response body from {}: {}", url, err);
            Outcome::failure(
                ExecError::ReadFailed {
                    url: url.to_owned(),
                    status,
                    source: err,
                },
                start.elapsed(),
            )
        }
    }
}

/// Builds and executes a single request.
///
/// # Errors
///
/// Returns a [`RequestError`] when the request fails validation; execution
/// errors are reported on the [`Outcome`].
pub async fn send_request(
    url: &str,
    method: &str,
    body: Option<&[u8]>,
    headers: &HeaderSet,
    skip_tls_verification: bool,
    timeout_ms: i64,
) -> Result<Outcome, RequestError> {
    let request = Request::build(url, method, body, headers, skip_tls_verification, timeout_ms)?;
    Ok(execute(&request).await)
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_owned())
            .and_modify(|joined| {
                joined.push_str(HEADER_VALUE_SEPARATOR);
                joined.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}

// Takes the response by value so the connection is released on every path.
async fn drain_response_body(response: reqwest::Response) -> Result<Bytes, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut body = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk?);
    }
    Ok(body.freeze())
}
