use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use batchreq::config::load_plan;
use batchreq::dispatch::Dispatcher;
use batchreq::error::{AppError, AppResult};
use batchreq::logger::init_logging;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Runs a batch of HTTP requests from a plan file with bounded concurrency."
)]
struct Args {
    /// Plan file describing the requests (.toml or .json)
    #[arg(long = "plan", short = 'p', env = "BATCHREQ_PLAN")]
    plan: PathBuf,

    /// Maximum requests in flight (overrides the plan)
    #[arg(long = "concurrency", short = 'c')]
    concurrency: Option<usize>,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR")]
    no_color: bool,
}

fn main() -> AppResult<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.no_color);

    let plan = load_plan(&args.plan)?;
    let settings = plan.dispatch_settings()?;
    let concurrency = args.concurrency.unwrap_or_else(|| plan.concurrency());
    let requests = plan.into_requests()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let dispatch = runtime.block_on(Dispatcher::new(settings).run_all(&requests, concurrency));

    for (idx, (request, outcome)) in requests.iter().zip(&dispatch.outcomes).enumerate() {
        match &outcome.reply {
            Ok(reply) => info!(
                "[{}] {} {} -> {} ({} bytes) in {:?}",
                idx,
                request.method(),
                request.target(),
                reply.status,
                reply.body.len(),
                outcome.elapsed
            ),
            Err(err) if err.is_timeout() => warn!(
                "[{}] {} {} timed out after {:?}",
                idx,
                request.method(),
                request.target(),
                outcome.elapsed
            ),
            Err(err) => error!("[{}] {} {} failed: {}", idx, request.method(), request.target(), err),
        }
    }

    let failed = dispatch.failed();
    if failed > 0 {
        return Err(AppError::BatchFailed {
            failed,
            total: dispatch.outcomes.len(),
        });
    }
    Ok(())
}
