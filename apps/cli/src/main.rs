#![deny(warnings)]

//! Headless runner: loads the latest save for a slot, plays for a while with
//! an optional greedy auto-player and writes the result back.

use anyhow::{Context, Result};
use idle_core::{default_catalog, validate_catalog};
use idle_econ::BuyAmount;
use idle_runtime::{CommandError, Engine, EngineConfig, GameEvent, SaveReason};
use persistence::{SaveStore, SaveWorker};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Save rows kept per slot after each write.
const KEEP_SAVES: u32 = 20;
/// Queued snapshots before the writer starts dropping them.
const SAVE_QUEUE: usize = 8;
/// Upper bound on purchases per auto-buy pass.
const MAX_BUYS_PER_PASS: u32 = 200;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    seconds: Option<u64>,
    db: Option<String>,
    slot: Option<String>,
    clicks_per_second: u32,
    auto_buy: bool,
    auto_rebirth: bool,
    realtime: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = it.next().map(PathBuf::from),
            "--seconds" => out.seconds = it.next().and_then(|s| s.parse().ok()),
            "--db" => out.db = it.next(),
            "--slot" => out.slot = it.next(),
            "--clicks" => {
                out.clicks_per_second = it.next().and_then(|s| s.parse().ok()).unwrap_or(0)
            }
            "--auto-buy" => out.auto_buy = true,
            "--auto-rebirth" => out.auto_rebirth = true,
            "--realtime" => out.realtime = true,
            _ => {}
        }
    }
    out
}

/// Optional YAML run configuration. Flags win over file values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    engine: EngineConfig,
    database_url: Option<String>,
    slot: Option<String>,
    seconds: Option<u64>,
}

async fn load_file_config(path: Option<&PathBuf>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Buy the cheapest affordable upgrade or producer until nothing fits.
fn auto_buy(engine: &mut Engine) -> Result<u32, CommandError> {
    let mut bought = 0;
    while bought < MAX_BUYS_PER_PASS {
        let current = engine.state().run.current;
        let upgrade = engine
            .available_upgrades()
            .into_iter()
            .filter(|u| u.cost <= current)
            .min_by(|a, b| a.cost.total_cmp(&b.cost))
            .map(|u| u.id.clone());
        if let Some(id) = upgrade {
            if engine.purchase_upgrade(&id)?.is_some() {
                bought += 1;
                continue;
            }
        }
        let producer = engine
            .visible_producers()
            .into_iter()
            .filter(|p| !p.capstone)
            .filter_map(|p| {
                let q = engine.quote(&p.id, BuyAmount::One)?;
                q.affordable.then(|| (p.id.clone(), q.cost))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);
        match producer {
            Some(id) if engine.purchase_producer(&id, 1)?.is_some() => bought += 1,
            _ => break,
        }
    }
    Ok(bought)
}

/// Buy the capstone when affordable and confirm the rebirth straight away.
fn auto_rebirth(engine: &mut Engine) -> Result<bool, CommandError> {
    let Some(id) = engine.catalog().capstone().map(|p| p.id.clone()) else {
        return Ok(false);
    };
    if engine.purchase_producer(&id, 1)?.is_none() {
        return Ok(false);
    }
    Ok(engine.rebirth().is_some())
}

/// Log drained notifications and hand queued saves to the writer.
fn flush(engine: &mut Engine, worker: &SaveWorker) {
    for stamped in engine.drain_events() {
        match stamped.event {
            GameEvent::AchievementUnlocked { id, name } => {
                info!(tick = stamped.tick, achievement = %id, %name, "achievement unlocked")
            }
            GameEvent::RebirthOffered { prestige_level } => {
                info!(tick = stamped.tick, prestige_level, "rebirth offered")
            }
            GameEvent::PrestigeCompleted { prestige_level } => {
                info!(tick = stamped.tick, prestige_level, "prestige completed")
            }
            GameEvent::Saved { reason } => debug!(tick = stamped.tick, ?reason, "save queued"),
        }
    }
    for request in engine.drain_saves() {
        if request.reason == SaveReason::Prestige {
            info!(tick = request.tick, "saving after rebirth");
        }
        worker.submit(request.snapshot);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args(std::env::args().skip(1));
    let file = load_file_config(args.config.as_ref()).await?;
    let db_url = args
        .db
        .or(file.database_url)
        .unwrap_or_else(|| persistence::default_sqlite_url().to_string());
    let slot = args
        .slot
        .or(file.slot)
        .unwrap_or_else(|| persistence::DEFAULT_SLOT.to_string());
    let seconds = args.seconds.or(file.seconds).unwrap_or(60);
    info!(%db_url, %slot, seconds, realtime = args.realtime, "starting run");

    let catalog = Arc::new(default_catalog());
    validate_catalog(&catalog)?;
    let store = SaveStore::open(&db_url).await?;
    let state = store.load_state(&slot, &catalog).await?;
    info!(
        current = state.run.current,
        prestige_level = state.run.prestige_level,
        "save loaded"
    );

    let mut engine = Engine::new(catalog, state, file.engine);
    let ticks_per_second = u64::from(engine.config().ticks_per_second);
    let worker = SaveWorker::spawn(store, slot, SAVE_QUEUE, KEEP_SAVES);
    let mut pacer = args
        .realtime
        .then(|| tokio::time::interval(Duration::from_secs(1)));
    let mut rebirths = 0u32;

    for _ in 0..seconds {
        if let Some(pacer) = pacer.as_mut() {
            pacer.tick().await;
        }
        for _ in 0..args.clicks_per_second {
            engine.perform_click();
        }
        if args.auto_buy {
            auto_buy(&mut engine)?;
        }
        if args.auto_rebirth && auto_rebirth(&mut engine)? {
            rebirths += 1;
        }
        engine.advance(ticks_per_second);
        flush(&mut engine, &worker);
    }

    worker.submit(engine.snapshot());
    let written = worker.finish().await?;

    let state = engine.state();
    println!(
        "KPI | seconds: {} | bananas: {:.0} | earned: {:.0} | prestige: {} | rebirths: {} | bps: {:.1} | click: {:.2} | achievements: {}/{} | skin: {:?} | saves: {}",
        seconds,
        state.run.current,
        state.run.cumulative,
        state.run.prestige_level,
        rebirths,
        engine.banana_per_second(),
        engine.click_value(),
        state.unlock_count(),
        engine.catalog().achievements.len(),
        engine.minion_skin(),
        written
    );

    Ok(())
}
