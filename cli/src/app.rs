use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use draw::{
    Celebration, DrawOrchestrator, DrawStatus, Effects, NoopEffects, RandomSource, SeededRandom,
    ThreadRandom,
};
use roster::model::Participant;
use roster::store::{MemoryStore, ResultStore, SheetStore, SqliteStore};

use crate::cli::StoreKind;
use crate::config::AppConfig;
use crate::effects::TerminalEffects;
use crate::render;

type Orchestrator = DrawOrchestrator<dyn ResultStore>;

/// Open the configured backend.
pub async fn build_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ResultStore>> {
    let store: Arc<dyn ResultStore> = match cfg.store {
        StoreKind::Sheet => {
            let sheet = SheetStore::new(cfg.web_app_url.clone())
                .context("failed to build http client")?;
            if !sheet.is_configured() {
                warn!("web app url is not configured; loading will fail");
            }
            Arc::new(sheet)
        }
        StoreKind::Sqlite => Arc::new(
            SqliteStore::new(&cfg.database_url)
                .await
                .with_context(|| format!("failed to open {}", cfg.database_url))?,
        ),
        StoreKind::Demo => Arc::new(MemoryStore::demo(cfg.demo_size)),
    };

    info!(store = ?cfg.store, "result store ready");
    Ok(store)
}

pub fn build_orchestrator(
    cfg: &AppConfig,
    store: Arc<dyn ResultStore>,
    effects: Arc<dyn Effects>,
) -> anyhow::Result<Orchestrator> {
    let rng: Box<dyn RandomSource> = match cfg.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };

    Ok(DrawOrchestrator::new(cfg.draw.clone(), store, effects, rng)?)
}

/// Interactive loop: one line of input per action.
pub async fn run(cfg: &AppConfig, store: Arc<dyn ResultStore>) -> anyhow::Result<()> {
    let effects = Arc::new(TerminalEffects::new(cfg.muted));
    let mut orch = build_orchestrator(cfg, store, effects.clone())?;

    println!("Lucky draw: {}", cfg.draw.prize.name);
    if effects.is_muted() {
        println!("  sound off ([m] to unmute)");
    }
    if let Err(e) = orch.load().await {
        println!("  {e}");
    }
    print_prompt(&orch);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match line.trim() {
            "q" | "quit" => break,
            "r" => {
                if let Err(e) = orch.retry().await {
                    println!("  {e}");
                }
            }
            "m" => {
                let muted = orch.effects().toggle_mute();
                println!("  sound {}", if muted { "off" } else { "on" });
            }
            "" => match orch.status() {
                DrawStatus::Celebrating => {
                    orch.acknowledge();
                }
                DrawStatus::Idle => {
                    let drawn = tokio::select! {
                        c = draw_once(&mut orch) => Some(c),
                        _ = tokio::signal::ctrl_c() => None,
                    };
                    match drawn {
                        Some(Some(c)) => print!("{}", render::winner_card(&c)),
                        Some(None) => {}
                        None => break,
                    }
                }
                _ => {}
            },
            other => println!("  unknown input {other:?}"),
        }

        print_prompt(&orch);
    }

    orch.shutdown();
    println!();
    Ok(())
}

/// One full draw with live reels. `None` if the gate was closed.
async fn draw_once(orch: &mut Orchestrator) -> Option<Celebration> {
    if let Err(e) = orch.try_start_draw() {
        println!("  {e}");
        return None;
    }

    let renderer = render::spawn_reel_renderer(orch.reel_faces(), orch.config().flicker_every);
    let celebration = orch.run_until_celebrating().await;
    renderer.abort();

    let faces: Vec<_> = orch.reel_faces().iter().map(|f| *f.borrow()).collect();
    println!("\r  {}", render::reel_line(&faces));

    celebration
}

fn print_prompt(orch: &Orchestrator) {
    let prompt = render::prompt(orch.status(), orch.pool().len());
    if !prompt.is_empty() {
        println!("{prompt}");
    }
}

async fn loaded(cfg: &AppConfig, store: Arc<dyn ResultStore>) -> anyhow::Result<Orchestrator> {
    let mut orch = build_orchestrator(cfg, store, Arc::new(NoopEffects))?;
    orch.load().await.context("failed to load draw data")?;
    Ok(orch)
}

pub async fn list_pool(cfg: &AppConfig, store: Arc<dyn ResultStore>) -> anyhow::Result<()> {
    let orch = loaded(cfg, store).await?;

    for p in orch.pool() {
        println!("{}", render::participant_row(p));
    }
    println!(
        "{} of {} participants eligible",
        orch.pool().len(),
        orch.participants().len()
    );
    Ok(())
}

pub async fn list_results(cfg: &AppConfig, store: Arc<dyn ResultStore>) -> anyhow::Result<()> {
    let orch = loaded(cfg, store).await?;

    for r in orch.results() {
        println!("{}", render::result_row(r));
    }
    println!("{} results", orch.results().len());
    Ok(())
}

pub async fn reset(
    cfg: &AppConfig,
    store: Arc<dyn ResultStore>,
    confirmed: bool,
) -> anyhow::Result<()> {
    if !confirmed {
        bail!("refusing to delete results without --yes");
    }

    let mut orch = loaded(cfg, store).await?;
    if !orch.reset_results().await? {
        bail!("the store did not confirm the reset");
    }

    println!("results cleared; {} participants eligible", orch.pool().len());
    Ok(())
}

/// Read a JSON roster and upsert it into the SQLite store.
pub async fn import(cfg: &AppConfig, path: &Path) -> anyhow::Result<()> {
    if cfg.store != StoreKind::Sqlite {
        bail!("import needs --store sqlite");
    }

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let roster: Vec<Participant> =
        serde_json::from_str(&raw).context("roster must be a JSON array of participants")?;

    let store = SqliteStore::new(&cfg.database_url)
        .await
        .with_context(|| format!("failed to open {}", cfg.database_url))?;
    store.seed_participants(&roster).await?;

    info!(count = roster.len(), "roster imported");
    println!("imported {} participants", roster.len());
    Ok(())
}
