use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use matchmakr::browser::decision::DecisionDispatcher;
use matchmakr::browser::source::ProfileSource;
use matchmakr::terminal::{render_options, render_view, transition_glyph, Command, HELP};
use matchmakr::{ApiClient, BrowserState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so they never interleave with the card on stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Matchmakr v{}", env!("CARGO_PKG_VERSION"));

    let client = Arc::new(
        ApiClient::with_timeout(config.session(), config.http_timeout)
            .context("Failed to build HTTP client")?
            .max_retries(config.max_retries),
    );
    info!("API client initialized ({})", client.session().base_url());

    let mut dispatcher = DecisionDispatcher::new(client.clone(), config.job_id, config.pass_policy);
    info!(
        "Recording matches for job {} (pass policy: {:?})",
        config.job_id, config.pass_policy
    );

    let mut browser = BrowserState::new();
    println!("{}", render_view(&browser.view()));
    load(&mut browser, client.as_ref()).await;
    println!("{}", render_view(&browser.view()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            Command::Decide(decision) => {
                let Some(event) = browser.decide(decision.is_interested()) else {
                    println!("{}", render_view(&browser.view()));
                    continue;
                };
                dispatcher.dispatch(event);
                println!("{}\n", transition_glyph(decision));
                if let Some(next) = browser.peek_next() {
                    debug!("Prefetch candidate {} image {}", next.id, next.image_url);
                }
                // The terminal has no animation; the transition ends as soon as it is printed.
                browser.finish_transition();
            }
            Command::Filter(dimension, value) => browser.select_filter(dimension, value),
            Command::Clear(Some(dimension)) => browser.clear_filter(dimension),
            Command::Clear(None) => browser.clear_all_filters(),
            Command::Options => {
                println!(
                    "{}",
                    render_options(browser.filter_options(), browser.filters())
                );
                continue;
            }
            Command::Retry => load(&mut browser, client.as_ref()).await,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
        }

        println!("{}", render_view(&browser.view()));
    }

    // Quitting or EOF must not cancel matches that are still being recorded.
    let unsent = dispatcher.flush(config.http_timeout).await;
    if unsent > 0 {
        warn!("{unsent} decision(s) were not recorded before exit");
    }

    info!("Goodbye");
    Ok(())
}

/// Runs the initial (or retried) load; failures are already reflected in the view.
async fn load(browser: &mut BrowserState, source: &dyn ProfileSource) {
    if let Err(e) = browser.load(source).await {
        warn!("{e}");
    }
}
