use std::io::{self, Write};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use draw::sequencer::{ReelFace, ReelPhase};
use draw::{Celebration, CommitOutcome, DrawStatus};
use roster::model::{DrawResult, Participant};

/// `[4]` once settled, ` 7 ` while spinning.
pub fn reel_line(faces: &[ReelFace]) -> String {
    faces
        .iter()
        .map(|f| match f.phase {
            ReelPhase::Settled => format!("[{}]", f.digit),
            ReelPhase::Spinning | ReelPhase::Idle => format!(" {} ", f.digit),
        })
        .collect()
}

/// Redraw the reels in place until aborted.
pub fn spawn_reel_renderer(
    faces: Vec<watch::Receiver<ReelFace>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            let snapshot: Vec<ReelFace> = faces.iter().map(|f| *f.borrow()).collect();
            overwrite_line(&reel_line(&snapshot));
        }
    })
}

fn overwrite_line(line: &str) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "\r  {line}");
    let _ = out.flush();
}

pub fn winner_card(c: &Celebration) -> String {
    let mut card = format!(
        "\n  WINNER  #{}\n  {}\n  {}\n",
        c.display, c.winner.name, c.winner.team
    );
    if let CommitOutcome::Failed { error, .. } = &c.commit {
        card.push_str(&format!("  (not saved: {error})\n"));
    }
    card
}

pub fn prompt(status: DrawStatus, pool: usize) -> String {
    match status {
        DrawStatus::Idle if pool == 0 => "No eligible participants left. [q]uit".to_string(),
        DrawStatus::Idle => format!("{pool} eligible. [Enter] draw  [m]ute  [q]uit"),
        DrawStatus::Celebrating => "[Enter] continue  [q]uit".to_string(),
        DrawStatus::Error => "Could not load data. [r]etry  [q]uit".to_string(),
        DrawStatus::Loading | DrawStatus::Spinning => String::new(),
    }
}

pub fn participant_row(p: &Participant) -> String {
    format!("{:>8}  {:<28}  {}", p.id.normalized(), p.name, p.team)
}

pub fn result_row(r: &DrawResult) -> String {
    format!(
        "{}  {:<14}  {:>8}  {:<28}  {}",
        r.time,
        r.prize_name,
        r.participant_id.normalized(),
        r.name,
        r.team
    )
}
