mod support;

use std::ffi::OsStr;
use std::future::Future;

use batchreq::error::ExecError;
use batchreq::http::{HeaderSet, Request, RequestSpec};
use batchreq::{dispatch, dispatch_blocking, execute, send_request};
use tempfile::tempdir;

use support::{run_batchreq, spawn_echo_server};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn build(url: &str, method: &str, body: Option<&[u8]>) -> Result<Request, String> {
    Request::build(url, method, body, &HeaderSet::new(), false, 5000)
        .map_err(|err| format!("build failed: {}", err))
}

#[test]
fn e2e_get_merges_body_into_query() -> Result<(), String> {
    let (base, _server) = spawn_echo_server()?;
    run_async_test(async move {
        let request = build(&format!("{}/search/", base), "GET", Some(b"q=rust lang&page=1"))?;
        let reply = execute(&request).await.reply.map_err(|err| format!("{}", err))?;

        if reply.status != 200 {
            return Err(format!("Unexpected status: {}", reply.status));
        }
        if reply.text() != "GET /search?q=rust%20lang&page=1\n" {
            return Err(format!("Unexpected echo: {:?}", reply.text()));
        }
        if reply.header("x-echo") != Some("one,two") {
            return Err(format!("Unexpected joined header: {:?}", reply.header("x-echo")));
        }
        let cookie = reply
            .cookies
            .first()
            .ok_or_else(|| "Expected a cookie".to_owned())?;
        if cookie.name != "visit" || cookie.value != "1" {
            return Err(format!("Unexpected cookie: {:?}", cookie));
        }
        Ok(())
    })
}

#[test]
fn e2e_post_sends_body() -> Result<(), String> {
    let (base, _server) = spawn_echo_server()?;
    run_async_test(async move {
        let headers = HeaderSet::build(&["Content-Type", "application/json"])
            .map_err(|err| format!("{}", err))?;
        let outcome = send_request(
            &format!("{}/items", base),
            "POST",
            Some(br#"{"name":"widget"}"#),
            &headers,
            false,
            5000,
        )
        .await
        .map_err(|err| format!("{}", err))?;
        let reply = outcome.reply.map_err(|err| format!("{}", err))?;
        if reply.text() != "POST /items\n{\"name\":\"widget\"}" {
            return Err(format!("Unexpected echo: {:?}", reply.text()));
        }
        Ok(())
    })
}

#[test]
fn e2e_unreachable_request_is_isolated() -> Result<(), String> {
    let (base, _server) = spawn_echo_server()?;
    run_async_test(async move {
        let requests = vec![
            build(&format!("{}/first", base), "GET", None)?,
            build("http://127.0.0.1:1/", "GET", None)?,
            build(&format!("{}/third", base), "DELETE", None)?,
        ];

        let batch = dispatch(&requests, 2).await;

        let echoes: Vec<Option<String>> = batch
            .outcomes
            .iter()
            .map(|outcome| outcome.reply.as_ref().ok().map(|reply| reply.text()))
            .collect();
        let expected = [
            Some("GET /first\n".to_owned()),
            None,
            Some("DELETE /third\n".to_owned()),
        ];
        if echoes != expected {
            return Err(format!("Unexpected outcomes: {:?}", echoes));
        }
        match batch.outcomes.get(1).and_then(|outcome| outcome.error()) {
            Some(ExecError::SendFailed { .. }) => Ok(()),
            other => Err(format!("Expected SendFailed, got {:?}", other)),
        }
    })
}

#[test]
fn e2e_timeout_is_reported_per_request() -> Result<(), String> {
    let (base, _server) = spawn_echo_server()?;
    run_async_test(async move {
        let request = Request::new(
            RequestSpec::new(format!("{}/slow/1000", base), "GET").timeout_ms(100),
        )
        .map_err(|err| format!("{}", err))?;
        let outcome = execute(&request).await;
        if !outcome.is_timeout() {
            return Err(format!("Expected timeout, got {:?}", outcome.reply.map(|r| r.status)));
        }
        Ok(())
    })
}

#[test]
fn e2e_blocking_dispatch_keeps_order() -> Result<(), String> {
    let (base, _server) = spawn_echo_server()?;
    let requests: Vec<Request> = (0..12u64)
        .map(|idx| {
            let delay = 12u64.saturating_sub(idx).saturating_mul(10);
            build(&format!("{}/slow/{}/{}", base, delay, idx), "GET", None)
        })
        .collect::<Result<_, _>>()?;

    let batch = dispatch_blocking(&requests, 4).map_err(|err| format!("{}", err))?;

    if batch.succeeded() != requests.len() {
        return Err(format!("Expected all to succeed, {} failed", batch.failed()));
    }
    for (request, outcome) in requests.iter().zip(&batch.outcomes) {
        let reply = outcome.reply.as_ref().map_err(|err| format!("{}", err))?;
        let path = request
            .url()
            .strip_prefix(base.as_str())
            .ok_or_else(|| "Unexpected base".to_owned())?;
        if reply.text() != format!("GET {}\n", path) {
            return Err(format!("Outcome {:?} does not match {}", reply.text(), path));
        }
    }
    Ok(())
}

#[test]
fn e2e_cli_runs_plan() -> Result<(), String> {
    let (base, _server) = spawn_echo_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let plan_path = dir.path().join("plan.toml");
    let plan = format!(
        r#"
concurrency = 2

[defaults]
timeout = "5s"

[[requests]]
url = "{base}/a"

[[requests]]
url = "{base}/b"
method = "POST"
body = "hello"
"#
    );
    std::fs::write(&plan_path, plan).map_err(|err| format!("write failed: {}", err))?;

    let output = run_batchreq([OsStr::new("--plan"), plan_path.as_os_str()])?;
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(())
}

#[test]
fn e2e_cli_fails_when_a_request_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let plan_path = dir.path().join("plan.json");
    std::fs::write(
        &plan_path,
        r#"{ "requests": [ { "url": "http://127.0.0.1:1/", "timeout": 2000 } ] }"#,
    )
    .map_err(|err| format!("write failed: {}", err))?;

    let output = run_batchreq([OsStr::new("--plan"), plan_path.as_os_str()])?;
    if output.status.success() {
        return Err("Expected a non-zero exit status".to_owned());
    }
    Ok(())
}
