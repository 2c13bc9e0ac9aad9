use std::io;

/// Default share of the open-file ceiling the dispatcher may occupy.
pub const DEFAULT_HEADROOM_PERCENT: u8 = 70;

/// Open-file ceilings of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFileLimit {
    pub soft: u64,
    pub hard: u64,
}

/// Source of the process open-file ceiling.
pub trait ResourceLimits: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the limit cannot be queried on this platform.
    fn open_files(&self) -> io::Result<OpenFileLimit>;
}

/// Reads `RLIMIT_NOFILE` of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLimits;

impl ResourceLimits for ProcessLimits {
    #[cfg(unix)]
    fn open_files(&self) -> io::Result<OpenFileLimit> {
        let mut limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // Safety: getrlimit only writes into the rlimit struct we own.
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(OpenFileLimit {
            soft: rlim_to_u64(limit.rlim_cur),
            hard: rlim_to_u64(limit.rlim_max),
        })
    }

    #[cfg(not(unix))]
    fn open_files(&self) -> io::Result<OpenFileLimit> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "open-file limits are not available on this platform",
        ))
    }
}

#[cfg(unix)]
fn rlim_to_u64(value: libc::rlim_t) -> u64 {
    if value == libc::RLIM_INFINITY {
        return u64::MAX;
    }
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Fixed ceiling, for callers that manage limits themselves and for tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticLimits(pub OpenFileLimit);

impl ResourceLimits for StaticLimits {
    fn open_files(&self) -> io::Result<OpenFileLimit> {
        Ok(self.0)
    }
}

/// Why the requested concurrency was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampReason {
    /// A request for zero workers was raised to one.
    Zero,
    /// The request exceeded the allowed share of the open-file ceiling.
    ResourceCeiling { ceiling: u64, allowed: usize },
}

/// Concurrency actually enforced for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimit {
    pub requested: usize,
    pub effective: usize,
    /// Soft open-file ceiling, when it could be read.
    pub ceiling: Option<u64>,
    pub clamped: Option<ClampReason>,
}

/// Largest concurrency allowed under `ceiling`: `floor(ceiling * percent / 100)`,
/// never below one. `headroom_percent` is clamped to `1..=100`.
#[must_use]
pub fn allowed_concurrency(ceiling: u64, headroom_percent: u8) -> usize {
    let allowed = u128::from(ceiling)
        .saturating_mul(u128::from(headroom_percent.clamp(1, 100)))
        .checked_div(100)
        .unwrap_or(0);
    usize::try_from(allowed).unwrap_or(usize::MAX).max(1)
}

/// Clamps `requested` against the queried ceiling.
pub(crate) fn clamp_concurrency(
    requested: usize,
    ceiling: Option<u64>,
    headroom_percent: u8,
) -> ConcurrencyLimit {
    let mut limit = ConcurrencyLimit {
        requested,
        effective: requested,
        ceiling,
        clamped: None,
    };
    if requested == 0 {
        limit.effective = 1;
        limit.clamped = Some(ClampReason::Zero);
    }
    if let Some(ceiling) = ceiling {
        let allowed = allowed_concurrency(ceiling, headroom_percent);
        if limit.effective > allowed {
            limit.effective = allowed;
            limit.clamped = Some(ClampReason::ResourceCeiling { ceiling, allowed });
        }
    }
    limit
}
