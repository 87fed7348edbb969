//! Command handlers for the `oddsline` binary.

use super::output::{
    print_error, print_field, print_json, print_rows, print_success, print_warn, OutputMode,
};
use super::Commands;
use crate::client::{OddsClient, PollKind};
use crate::domain::{Event, Sport, SportConfig};
use crate::error::OddsError;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

#[derive(Tabled, Serialize)]
struct SportRow {
    key: String,
    group: String,
    title: String,
    active: bool,
}

impl From<&Sport> for SportRow {
    fn from(s: &Sport) -> Self {
        Self {
            key: s.key.clone(),
            group: s.group.clone(),
            title: s.title.clone(),
            active: s.active,
        }
    }
}

#[derive(Tabled, Serialize)]
struct EventRow {
    fixture: String,
    commence: String,
    books: usize,
    best: String,
}

impl EventRow {
    fn new(event: &Event, market: &str) -> Self {
        let best = event
            .best_prices(market)
            .iter()
            .map(|o| {
                let pct = (o.implied_probability() * Decimal::ONE_HUNDRED).round_dp(1);
                format!("{} {:.2} ({}%)", o.name, o.price, pct)
            })
            .collect::<Vec<_>>()
            .join(" | ");
        Self {
            fixture: event.fixture(),
            commence: event.commence_time.clone(),
            books: event.bookmakers.len(),
            best: if best.is_empty() { "-".to_string() } else { best },
        }
    }
}

#[derive(Tabled, Serialize)]
struct ScoreRow {
    fixture: String,
    score: String,
    completed: String,
}

impl From<&Event> for ScoreRow {
    fn from(event: &Event) -> Self {
        Self {
            fixture: event.fixture(),
            score: event.score_line().unwrap_or_else(|| "-".to_string()),
            completed: match event.completed {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => "-".to_string(),
            },
        }
    }
}

#[derive(Tabled, Serialize)]
struct SportConfigRow {
    sport: String,
    name: String,
    enabled: bool,
    #[tabled(rename = "interval (s)")]
    refresh_interval_seconds: u32,
    last_updated: String,
}

impl SportConfigRow {
    fn new(sport: &str, name: &str, config: &SportConfig) -> Self {
        Self {
            sport: sport.to_string(),
            name: name.to_string(),
            enabled: config.enabled,
            refresh_interval_seconds: config.refresh_interval_seconds,
            last_updated: config.last_updated.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct StatusReport {
    configured: bool,
    state: String,
    api_key: String,
    sports: Vec<SportConfigRow>,
    cached_entries: usize,
    cache_ttl_secs: u64,
    request_delay_ms: u64,
    stats: crate::client::ClientStatsSnapshot,
}

/// Hide all but the last four characters of a credential.
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(none)".to_string();
    }
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", visible)
}

/// Render a command failure the way a user should see it.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<OddsError>().and_then(OddsError::api_error) {
        Some(api) => print_error(&format!("[{}] {}", api.code(), api.user_message())),
        None => print_error(&err.to_string()),
    }
}

/// Run one command, printing a user-facing message when it fails.
pub async fn run(command: Commands, client: &OddsClient, mode: OutputMode, market: &str) -> Result<()> {
    client.initialize().await;

    let outcome = dispatch(command, client, mode, market).await;
    if let Err(e) = &outcome {
        report(e);
    }
    outcome
}

async fn dispatch(command: Commands, client: &OddsClient, mode: OutputMode, market: &str) -> Result<()> {
    match command {
        Commands::Sports => list_sports(client, mode).await,
        Commands::Odds { sport, region } => {
            let events = match region {
                Some(region) => client.get_odds_in_region(&sport, &region).await,
                None => client.get_odds(&sport).await,
            };
            show_events(events?, mode, market)
        }
        Commands::Live { sport } => show_events(client.get_live_events(&sport).await?, mode, market),
        Commands::Scores { sport, days_from } => {
            let events = match days_from {
                Some(days) => client.get_scores_since(&sport, days).await,
                None => client.get_scores(&sport).await,
            };
            show_scores(events?, mode)
        }
        Commands::SetKey { key } => set_key(client, key).await,
        Commands::SetSport {
            sport,
            enabled,
            interval,
        } => set_sport(client, &sport, enabled, interval, mode).await,
        Commands::Status => show_status(client, mode),
        Commands::Watch { sport, kind } => {
            let kind: PollKind = kind.parse().map_err(anyhow::Error::msg)?;
            watch(client, &sport, kind, mode, market).await
        }
    }
}

async fn list_sports(client: &OddsClient, mode: OutputMode) -> Result<()> {
    let sports = client.list_sports().await?;
    let rows: Vec<SportRow> = sports.iter().map(SportRow::from).collect();
    print_rows(&rows, mode)
}

fn show_events(events: Vec<Event>, mode: OutputMode, market: &str) -> Result<()> {
    match mode {
        OutputMode::Json => print_json(&events),
        OutputMode::Table => {
            let rows: Vec<EventRow> = events.iter().map(|e| EventRow::new(e, market)).collect();
            print_rows(&rows, mode)
        }
    }
}

fn show_scores(events: Vec<Event>, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Json => print_json(&events),
        OutputMode::Table => {
            let rows: Vec<ScoreRow> = events.iter().map(ScoreRow::from).collect();
            print_rows(&rows, mode)
        }
    }
}

async fn set_key(client: &OddsClient, key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => rpassword::prompt_password("Odds API key: ")
            .map_err(|e| anyhow::anyhow!("failed to read key: {}", e))?,
    };

    client.set_api_key(&key).await?;
    print_success(&format!("API key saved ({})", mask_key(&key)));
    Ok(())
}

async fn set_sport(
    client: &OddsClient,
    sport: &str,
    enabled: bool,
    interval: u32,
    mode: OutputMode,
) -> Result<()> {
    let stored = client.set_sport_config(sport, enabled, interval).await?;
    match mode {
        OutputMode::Json => print_json(&stored),
        OutputMode::Table => {
            print_success(&format!("Saved settings for {}", sport));
            print_rows(
                &[SportConfigRow::new(sport, client.registry().display_name(sport), &stored)],
                mode,
            )
        }
    }
}

fn show_status(client: &OddsClient, mode: OutputMode) -> Result<()> {
    let status = StatusReport {
        configured: client.is_configured(),
        state: format!("{:?}", client.state()),
        api_key: mask_key(&client.api_key()),
        sports: client
            .sport_configs()
            .iter()
            .map(|(id, config)| SportConfigRow::new(id, client.registry().display_name(id), config))
            .collect(),
        cached_entries: client.cache().len(),
        cache_ttl_secs: client.cache().ttl().as_secs(),
        request_delay_ms: client.request_delay().as_millis() as u64,
        stats: client.stats(),
    };

    match mode {
        OutputMode::Json => print_json(&status)?,
        OutputMode::Table => {
            print_field("configured", status.configured);
            print_field("state", &status.state);
            print_field("api key", &status.api_key);
            print_field("cached entries", status.cached_entries);
            print_field("cache ttl", format!("{}s", status.cache_ttl_secs));
            print_field("request delay", format!("{}ms", status.request_delay_ms));
            if !status.configured {
                print_warn("No verified API key; run `oddsline set-key`");
            }
            println!();
            print_rows(&status.sports, mode)?;
        }
    }
    Ok(())
}

async fn poll_once(client: &OddsClient, sport: &str, kind: PollKind) -> crate::error::Result<Vec<Event>> {
    match kind {
        PollKind::Odds => client.get_odds(sport).await,
        PollKind::Live => client.get_live_events(sport).await,
        PollKind::Scores => client.get_scores(sport).await,
    }
}

/// Poll one sport at its configured cadence until Ctrl+C.
async fn watch(
    client: &OddsClient,
    sport: &str,
    kind: PollKind,
    mode: OutputMode,
    market: &str,
) -> Result<()> {
    info!(sport, kind = %kind, "Starting watch");

    loop {
        match poll_once(client, sport, kind).await {
            Ok(events) if kind == PollKind::Scores => show_scores(events, mode)?,
            Ok(events) => show_events(events, mode, market)?,
            Err(e) => match e.api_error() {
                Some(api) if api.is_retryable() => {
                    print_warn(api.user_message());
                    warn!(sport, code = api.code(), "Poll failed, retrying on next tick");
                }
                _ => return Err(e.into()),
            },
        }

        let interval = client.poll_interval(kind, sport);
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Watch interrupted");
                return Ok(());
            }
        }
    }
}
