use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use groupsift_analyzer::{summarize, GeminiClient, RankOptions};
use groupsift_common::{progress_channel, CancelFlag, Credentials};
use groupsift_scraper::{spawn_scrape, CollectTuning, EnrichBudget, ScrapeRequest};
use groupsift_store::{parse_keywords, Store};

/// Scrape a social group feed and rank posts by engagement.
#[derive(Parser, Debug)]
#[command(name = "groupsift", version)]
struct Cli {
    /// Group feed URL. Falls back to the last saved one.
    group_url: Option<String>,

    /// Account email. Needed only when no saved session is valid.
    #[arg(long)]
    email: Option<String>,

    /// Account password. Falls back to $GROUPSIFT_PASSWORD.
    #[arg(long)]
    password: Option<String>,

    /// How many unique posts to collect.
    #[arg(long)]
    max_posts: Option<usize>,

    /// Ranking length in the report.
    #[arg(long)]
    top_n: Option<usize>,

    /// Comma-separated keywords; only matching posts are ranked.
    #[arg(long)]
    keywords: Option<String>,

    /// What the report should focus on.
    #[arg(long)]
    criteria: Option<String>,

    /// Gemini API key; empty skips the report.
    #[arg(long)]
    gemini_api_key: Option<String>,

    #[arg(long)]
    model: Option<String>,

    /// Run the browser with a visible window.
    #[arg(long)]
    headed: bool,

    /// Do not restore or persist session cookies.
    #[arg(long)]
    no_save_session: bool,

    /// Directory for settings, history, and session files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Delete the saved session for the given email and exit.
    #[arg(long)]
    clear_session: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("groupsift=info".parse()?))
        .init();

    let cli = Cli::parse();
    let store = match &cli.data_dir {
        Some(dir) => Store::new(dir.clone()),
        None => Store::in_current_dir(),
    };
    let mut settings = store.load_settings();

    // CLI arguments override saved settings for this run and are saved
    // back, so the next run picks up where this one left off.
    if let Some(url) = &cli.group_url {
        settings.group_url = url.clone();
    }
    if let Some(email) = &cli.email {
        settings.email = email.clone();
    }
    if let Some(n) = cli.max_posts {
        settings.max_posts = n;
    }
    if let Some(n) = cli.top_n {
        settings.top_n = n;
    }
    if let Some(kw) = &cli.keywords {
        settings.custom_keywords = kw.clone();
    }
    if let Some(criteria) = &cli.criteria {
        settings.criteria_description = criteria.clone();
    }
    if let Some(key) = &cli.gemini_api_key {
        settings.gemini_api_key = key.clone();
    }
    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }
    if cli.headed {
        settings.headless = false;
    }
    if cli.no_save_session {
        settings.save_session = false;
    }

    if cli.clear_session {
        let removed = store.clear_session(&settings.email)?;
        println!(
            "{}",
            if removed { "Session cleared." } else { "No saved session." }
        );
        return Ok(());
    }

    if settings.group_url.is_empty() {
        let history = store.load_history();
        if history.is_empty() {
            bail!("no group URL given and none saved; pass one as the first argument");
        }
        eprintln!("No group URL given. Recent groups:");
        for entry in &history {
            eprintln!("  {}", entry.url);
        }
        bail!("pass a group URL as the first argument");
    }

    let password = cli
        .password
        .clone()
        .or_else(|| std::env::var("GROUPSIFT_PASSWORD").ok())
        .unwrap_or_default();
    let credentials = Credentials {
        email: settings.email.clone(),
        password,
    };

    store.save_settings(&settings)?;
    store.record_group(&settings.group_url, None)?;
    if !settings.custom_keywords.trim().is_empty() {
        store.save_preset("keywords", settings.custom_keywords.trim())?;
    }
    if !settings.criteria_description.trim().is_empty() {
        store.save_preset("criteria", settings.criteria_description.trim())?;
    }

    let request = ScrapeRequest::builder()
        .group_url(settings.group_url.clone())
        .credentials(credentials)
        .session_file(store.session_file(&settings.email))
        .save_session(settings.save_session)
        .headless(settings.headless)
        .tuning(CollectTuning {
            target_count: settings.max_posts,
            scroll_wait: Duration::from_millis(settings.scroll_wait_ms),
            ..CollectTuning::default()
        })
        .budget(EnrichBudget {
            per_item: Duration::from_secs_f64(settings.per_post_timeout),
            total: Duration::from_secs_f64(settings.enrich_total_timeout),
        })
        .build();

    let (progress, rx) = progress_channel();
    let cancel = CancelFlag::new();
    let worker = spawn_scrape(request, progress, cancel);

    // Relay progress until the end-of-stream marker.
    loop {
        match rx.recv_timeout(Duration::from_millis(300)) {
            Ok(Some(line)) => println!("{line}"),
            Ok(None) => break,
            Err(RecvTimeoutError::Timeout) => {
                if worker.is_finished() {
                    for line in rx.try_iter().flatten() {
                        println!("{line}");
                    }
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let outcome = worker.join()?;
    if !outcome.group_name.is_empty() {
        store.record_group(&settings.group_url, Some(&outcome.group_name))?;
    }
    println!("\n{}", outcome.stats);

    if outcome.posts.is_empty() {
        println!("No posts collected; check the group URL and login state.");
        return Ok(());
    }

    if settings.gemini_api_key.is_empty() {
        info!("No Gemini API key, skipping report");
        println!("No Gemini API key configured; skipping the report.");
        return Ok(());
    }

    println!("Generating report for {} posts…", outcome.posts.len());
    let client = GeminiClient::new(&settings.gemini_api_key, &settings.model);
    let options = RankOptions {
        keywords: parse_keywords(&settings.custom_keywords),
        top_n: settings.top_n,
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(summarize(
        &client,
        &outcome.posts,
        &options,
        &settings.criteria_description,
    ))?;
    println!("\n{report}");
    Ok(())
}
