//! The end-to-end scrape pipeline and its worker-thread harness. The
//! browser and everything driving it live on one dedicated thread with
//! its own runtime; the caller keeps a progress receiver, a cancel flag,
//! and a handle that resolves to the run's result exactly once.

use std::path::PathBuf;
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{error, info};
use typed_builder::TypedBuilder;

use groupsift_common::{CancelFlag, Credentials, EnrichedPost, GroupSiftError, ProgressSink};
use groupsift_session::{cookies, login, navigate, Session, SessionError};

use crate::collector::{collect, CollectTuning};
use crate::enricher::{enrich, EnrichBudget};
use crate::feed::ChromeFeed;
use crate::stats::RunStats;

/// One scrape run at a time per process. A second browser fighting over
/// the profile and the network is never what the user wants.
static RUN_SLOT: Mutex<()> = Mutex::new(());

/// Everything a scrape run needs, assembled by the caller.
#[derive(TypedBuilder)]
pub struct ScrapeRequest {
    pub group_url: String,
    #[builder(default)]
    pub credentials: Credentials,
    /// Where session cookies are read from and written back to.
    pub session_file: PathBuf,
    #[builder(default = true)]
    pub save_session: bool,
    #[builder(default = true)]
    pub headless: bool,
    #[builder(default)]
    pub tuning: CollectTuning,
    #[builder(default)]
    pub budget: EnrichBudget,
}

pub struct ScrapeOutcome {
    pub posts: Vec<EnrichedPost>,
    pub group_name: String,
    pub stats: RunStats,
}

/// Handle to a running scrape. Joining yields the run's result; the
/// result is produced exactly once, by the worker, at the end of the run.
pub struct ScrapeWorker {
    handle: JoinHandle<Result<ScrapeOutcome, GroupSiftError>>,
}

impl ScrapeWorker {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the run finishes. A panicked worker reports as a
    /// browser error rather than propagating the panic.
    pub fn join(self) -> Result<ScrapeOutcome, GroupSiftError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(GroupSiftError::Browser("scrape worker panicked".into())),
        }
    }
}

/// Start a scrape on a dedicated worker thread.
///
/// The cancel flag is cleared here, at run start, and only here — a
/// cancellation requested after this point sticks for the whole run. The
/// progress channel always ends with its end-of-stream marker, even if
/// the worker panics.
pub fn spawn_scrape(request: ScrapeRequest, progress: ProgressSink, cancel: CancelFlag) -> ScrapeWorker {
    cancel.clear();
    let handle = thread::Builder::new()
        .name("groupsift-scrape".into())
        .spawn(move || {
            let _slot = RUN_SLOT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let _sentinel = progress.sentinel_guard();
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| GroupSiftError::Browser(format!("runtime setup failed: {e}")))?;
            runtime.block_on(run(request, &progress, &cancel))
        })
        .unwrap_or_else(|e| {
            // Thread spawn only fails when the OS is out of resources.
            panic!("failed to spawn scrape worker: {e}")
        });
    ScrapeWorker { handle }
}

async fn run(
    request: ScrapeRequest,
    progress: &ProgressSink,
    cancel: &CancelFlag,
) -> Result<ScrapeOutcome, GroupSiftError> {
    let started = Instant::now();
    if cancel.is_cancelled() {
        progress.line("Run cancelled before start.");
        return Ok(ScrapeOutcome {
            posts: Vec::new(),
            group_name: String::new(),
            stats: RunStats::default(),
        });
    }

    progress.line("Starting browser…");
    let session = Session::launch(request.headless).await.map_err(map_session)?;

    let result = run_in_session(&request, &session, progress, cancel).await;
    session.close().await;

    let mut outcome = result?;
    outcome.stats.elapsed = started.elapsed();
    info!(
        group = %outcome.group_name,
        posts = outcome.posts.len(),
        "Scrape finished"
    );
    Ok(outcome)
}

/// The run body, split out so the session is closed on every exit path.
async fn run_in_session(
    request: &ScrapeRequest,
    session: &Session,
    progress: &ProgressSink,
    cancel: &CancelFlag,
) -> Result<ScrapeOutcome, GroupSiftError> {
    authenticate(request, session, progress).await?;

    navigate::goto_group(session, &request.group_url, progress).await;
    let group_name = navigate::discover_group_name(session).await;
    if !group_name.is_empty() {
        progress.line(format!("Group: {group_name}"));
    }

    let feed = ChromeFeed::new(session.page().clone());

    progress.line("Collecting posts…");
    let harvest = collect(&feed, &request.tuning, cancel, progress).await?;
    let collected = harvest.posts.len();
    let rounds = harvest.rounds;

    progress.line(format!("Enriching {collected} posts with engagement counts…"));
    let report = enrich(&feed, harvest.posts, &request.budget, cancel, progress).await;

    Ok(ScrapeOutcome {
        group_name,
        stats: RunStats {
            rounds,
            collected,
            enriched: report.posts.len(),
            degraded: report.degraded,
            elapsed: Default::default(),
        },
        posts: report.posts,
    })
}

/// Restore a saved session if possible, otherwise log in with the given
/// credentials. Missing credentials with no restorable session is the one
/// fatal configuration error of the pipeline.
async fn authenticate(
    request: &ScrapeRequest,
    session: &Session,
    progress: &ProgressSink,
) -> Result<(), GroupSiftError> {
    let mut restored = false;
    if request.save_session {
        restored = cookies::load_into(session.page(), &request.session_file)
            .await
            .map_err(map_session)?;
        if restored {
            progress.line("Restored saved session cookies.");
        }
    }

    session
        .goto(login::BASE_URL, std::time::Duration::from_secs(30))
        .await
        .map_err(map_session)?;

    if restored && login::is_logged_in(session).await {
        progress.line("Saved session is still valid.");
        return Ok(());
    }

    if request.credentials.is_empty() {
        progress.line("No saved session and no credentials provided.");
        return Err(GroupSiftError::Auth(
            "no valid saved session and no credentials provided".into(),
        ));
    }

    progress.line("Logging in…");
    login::login(session, &request.credentials, progress)
        .await
        .map_err(map_session)?;

    if request.save_session {
        if let Err(e) = cookies::save_from(session.page(), &request.session_file).await {
            // A failed cookie save costs the next run a login, nothing more.
            error!(error = %e, "Could not persist session cookies");
            progress.line("Warning: could not save session cookies.");
        } else {
            progress.line("Session cookies saved.");
        }
    }
    Ok(())
}

fn map_session(err: SessionError) -> GroupSiftError {
    match err {
        SessionError::Auth(msg) => GroupSiftError::Auth(msg),
        SessionError::Browser(msg) => GroupSiftError::Browser(msg),
        SessionError::CookieStore(msg) => GroupSiftError::Store(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsift_common::progress_channel;

    #[test]
    fn cancelled_before_spawn_is_cleared_at_run_start() {
        // The flag is reset when the run starts, so a stale cancellation
        // from a previous run does not poison the next one. We verify the
        // clearing without a browser by checking the flag directly.
        let cancel = CancelFlag::new();
        cancel.request();
        assert!(cancel.is_cancelled());
        cancel.clear();
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_requested_after_start_yields_empty_outcome() {
        let request = ScrapeRequest::builder()
            .group_url("https://www.facebook.com/groups/example".to_string())
            .session_file(PathBuf::from("/nonexistent/.fb_session.json"))
            .build();
        let (progress, rx) = progress_channel();
        let cancel = CancelFlag::new();
        cancel.request();

        let outcome = run(request, &progress, &cancel).await.unwrap();
        assert!(outcome.posts.is_empty());
        assert_eq!(outcome.stats.collected, 0);
        drop(progress);
        let lines: Vec<String> = rx.iter().flatten().collect();
        assert!(lines.iter().any(|l| l.contains("cancelled before start")));
    }

    #[test]
    fn worker_delivers_sentinel_even_on_panic_path() {
        let (progress, rx) = progress_channel();
        let handle = thread::spawn(move || {
            let _sentinel = progress.sentinel_guard();
            panic!("worker died");
        });
        let _ = handle.join();
        // End-of-stream marker arrives despite the panic.
        assert_eq!(rx.recv().unwrap(), None);
    }
}
