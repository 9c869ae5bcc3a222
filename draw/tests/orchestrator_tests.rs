use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use draw::effects::Cue;
use draw::sequencer::ReelSettled;
use draw::{
    DrawConfig, DrawError, DrawGate, DrawOrchestrator, DrawStatus, SeededRandom, Transition,
};
use roster::model::{DrawResult, EligibleFlag, Participant, ParticipantId};
use roster::store::{MemoryStore, ResultStore};

use mock_effects::{EffectCall, RecordingEffects};

fn cfg(digit_count: usize) -> DrawConfig {
    DrawConfig {
        digit_count,
        spin_base: Duration::from_millis(200),
        stagger: Duration::from_millis(50),
        flicker_every: Duration::from_millis(20),
        ..Default::default()
    }
}

fn build(
    digit_count: usize,
    store: Arc<MemoryStore>,
) -> (DrawOrchestrator<MemoryStore>, Arc<RecordingEffects>) {
    let effects = Arc::new(RecordingEffects::default());
    let orch = DrawOrchestrator::new(
        cfg(digit_count),
        store,
        effects.clone(),
        Box::new(SeededRandom::new(17)),
    )
    .unwrap();
    (orch, effects)
}

fn settled(index: usize, epoch: u64) -> ReelSettled {
    ReelSettled {
        index,
        epoch,
        digit: '0',
    }
}

#[tokio::test(start_paused = true)]
async fn single_participant_wins_once_and_pool_empties() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_participants(vec![Participant::new(
        1u64, "An", "Data", true,
    )]));
    let (mut orch, _effects) = build(6, store.clone());

    assert_eq!(orch.status(), DrawStatus::Loading);
    orch.load().await?;
    assert_eq!(orch.status(), DrawStatus::Idle);

    let winner = orch.start_draw().expect("draw should start");
    assert_eq!(winner.id.normalized(), "1");
    assert_eq!(orch.status(), DrawStatus::Spinning);

    let celebration = orch.run_until_celebrating().await.expect("celebration");
    assert_eq!(orch.status(), DrawStatus::Celebrating);
    assert_eq!(celebration.display, "000001");
    assert!(celebration.commit.is_persisted());
    assert_eq!(celebration.commit.result().participant_id.normalized(), "1");

    assert_eq!(orch.results().len(), 1);
    assert_eq!(store.append_calls(), 1);

    assert!(orch.acknowledge());
    assert_eq!(orch.status(), DrawStatus::Idle);
    assert!(orch.session().selected_winner().is_none());
    assert!(orch.pool().is_empty());

    assert_eq!(orch.draw_gate(), DrawGate::EmptyPool);
    assert!(orch.start_draw().is_none());
    assert_eq!(orch.status(), DrawStatus::Idle);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_append_still_celebrates_but_keeps_results() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_participants(vec![Participant::new(
        42u64, "Lan", "Mobile", true,
    )]));
    store.set_fail_appends(true);
    let (mut orch, _effects) = build(6, store.clone());
    orch.load().await?;

    orch.start_draw().unwrap();
    let celebration = orch.run_until_celebrating().await.unwrap();

    assert_eq!(orch.status(), DrawStatus::Celebrating);
    assert_eq!(celebration.winner.name, "Lan");
    assert_eq!(celebration.display, "000042");
    assert!(!celebration.commit.is_persisted());

    assert!(orch.results().is_empty());
    assert_eq!(orch.pool().len(), 1);
    assert_eq!(store.append_calls(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn winner_id_is_zero_padded_on_the_reels() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_participants(vec![Participant::new(
        "42",
        "Minh",
        "Design",
        EligibleFlag::Text("TRUE".into()),
    )]));
    let (mut orch, _effects) = build(6, store);
    orch.load().await?;

    orch.start_draw().unwrap();
    assert_eq!(orch.session().digit_targets().iter().collect::<String>(), "000042");

    orch.run_until_celebrating().await.unwrap();
    assert_eq!(orch.displayed_digits(), "000042");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn long_ids_are_truncated_for_display_only() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_participants(vec![Participant::new(
        1234567u64, "Quang", "Data", true,
    )]));
    let (mut orch, _effects) = build(4, store);
    orch.load().await?;

    orch.start_draw().unwrap();
    let celebration = orch.run_until_celebrating().await.unwrap();

    assert_eq!(celebration.display, "4567");
    assert_eq!(celebration.commit.result().participant_id.normalized(), "1234567");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn completions_in_any_order_celebrate_exactly_once() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(5));
    let (mut orch, effects) = build(4, store.clone());
    orch.load().await?;
    orch.start_draw().unwrap();

    let epoch = orch.session().epoch();

    for index in [3, 1, 0] {
        let t = orch.on_reel_settled(settled(index, epoch)).await;
        assert!(matches!(t, Some(Transition::DigitLocked { .. })));
        assert_eq!(orch.status(), DrawStatus::Spinning);
    }

    // Repeating a reel does not advance the count.
    assert!(orch.on_reel_settled(settled(1, epoch)).await.is_none());
    assert_eq!(orch.session().stopped_count(), 3);

    let last = orch.on_reel_settled(settled(2, epoch)).await;
    assert!(matches!(last, Some(Transition::Celebrating(_))));
    assert_eq!(orch.status(), DrawStatus::Celebrating);
    assert_eq!(orch.session().stopped_count(), 4);

    // Late arrivals after the celebration change nothing.
    assert!(orch.on_reel_settled(settled(0, epoch)).await.is_none());
    sleep(Duration::from_secs(5)).await;
    assert_eq!(orch.pending_reels(), 0);

    assert_eq!(effects.count(&EffectCall::Play(Cue::Win)), 1);
    assert_eq!(effects.count(&EffectCall::Celebrate), 1);
    assert_eq!(effects.count(&EffectCall::Play(Cue::Tick)), 4);
    assert_eq!(store.append_calls(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reels_lock_left_to_right_on_schedule() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(3));
    let (mut orch, _effects) = build(3, store);
    orch.load().await?;

    let started = Instant::now();
    orch.start_draw().unwrap();

    let mut locked = Vec::new();
    while let Some(t) = orch.next_transition().await {
        match t {
            Transition::DigitLocked { index, .. } => {
                assert!(started.elapsed() >= orch.config().delay_for(index));
                locked.push(index);
            }
            Transition::Celebrating(_) => {
                assert!(started.elapsed() >= orch.config().delay_for(2));
                locked.push(2);
            }
        }
    }

    assert_eq!(locked, [0, 1, 2]);
    assert_eq!(orch.status(), DrawStatus::Celebrating);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn acknowledging_twice_is_a_no_op() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(4));
    let (mut orch, effects) = build(3, store.clone());
    orch.load().await?;

    orch.start_draw().unwrap();
    orch.run_until_celebrating().await.unwrap();

    assert!(orch.acknowledge());
    assert!(!orch.acknowledge());

    assert_eq!(store.append_calls(), 1);
    assert_eq!(orch.results().len(), 1);
    assert_eq!(effects.count(&EffectCall::Stop(Cue::Cheer)), 1);
    assert_eq!(effects.count(&EffectCall::Play(Cue::Win)), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn draw_requested_while_spinning_is_rejected() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(4));
    let (mut orch, _effects) = build(3, store);
    orch.load().await?;

    let first = orch.start_draw().unwrap();
    let epoch = orch.session().epoch();

    assert!(orch.start_draw().is_none());
    assert_eq!(
        orch.try_start_draw().unwrap_err(),
        DrawError::Precondition(DrawGate::Busy)
    );
    assert_eq!(orch.session().epoch(), epoch);
    assert_eq!(orch.session().selected_winner(), Some(&first));

    let celebration = orch.run_until_celebrating().await.unwrap();
    assert_eq!(celebration.winner, first);

    // Still busy until acknowledged.
    assert_eq!(orch.draw_gate(), DrawGate::Busy);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn consecutive_draws_never_repeat_a_winner() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(5));
    let (mut orch, _effects) = build(3, store.clone());
    orch.load().await?;

    let mut winners = Vec::new();
    while orch.can_draw() {
        let w = orch.start_draw().unwrap();
        orch.run_until_celebrating().await.unwrap();
        orch.acknowledge();
        winners.push(w.id.normalized());
    }

    winners.sort();
    winners.dedup();
    assert_eq!(winners.len(), 5);
    assert_eq!(orch.session().epoch(), 5);
    assert_eq!(store.fetch_results().await.len(), 5);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn effects_fire_in_draw_order() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(2));
    let (mut orch, effects) = build(2, store);
    orch.load().await?;

    orch.start_draw().unwrap();
    orch.run_until_celebrating().await.unwrap();
    orch.acknowledge();

    assert_eq!(
        effects.calls(),
        vec![
            EffectCall::Configure(0.5),
            EffectCall::Play(Cue::Spin),
            EffectCall::Play(Cue::Tick),
            EffectCall::Play(Cue::Tick),
            EffectCall::Stop(Cue::Spin),
            EffectCall::Play(Cue::Win),
            EffectCall::Play(Cue::Cheer),
            EffectCall::Celebrate,
            EffectCall::Stop(Cue::Cheer),
        ]
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn load_failure_enters_error_and_retry_recovers() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(2));
    store.set_offline(true);
    let (mut orch, _effects) = build(3, store.clone());

    let err = orch.load().await.unwrap_err();
    assert!(matches!(err, DrawError::Connectivity(_)));
    assert_eq!(orch.status(), DrawStatus::Error);
    assert_eq!(orch.draw_gate(), DrawGate::NotReady);
    assert!(orch.start_draw().is_none());
    assert!(orch.last_error().is_some());

    store.set_offline(false);
    orch.retry().await?;

    assert_eq!(orch.status(), DrawStatus::Idle);
    assert!(orch.last_error().is_none());
    assert_eq!(orch.pool().len(), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn prior_results_exclude_their_winners() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(3));
    store
        .insert_result_direct(DrawResult {
            time: "earlier".into(),
            prize_id: "P".into(),
            prize_name: "Prize".into(),
            participant_id: ParticipantId::from(2u64),
            name: "Participant 002".into(),
            team: "Data".into(),
        })
        .await;

    let (mut orch, _effects) = build(3, store);
    orch.load().await?;

    let ids: Vec<String> = orch.pool().iter().map(|p| p.id.normalized()).collect();
    assert_eq!(ids, ["1", "3"]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_mid_spin_cancels_every_reel() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(3));
    let (mut orch, effects) = build(4, store.clone());
    orch.load().await?;

    orch.start_draw().unwrap();
    assert_eq!(orch.pending_reels(), 4);

    orch.shutdown();
    assert_eq!(orch.pending_reels(), 0);
    assert_eq!(orch.status(), DrawStatus::Idle);
    assert_eq!(effects.count(&EffectCall::Dispose), 1);

    sleep(Duration::from_secs(5)).await;
    assert!(orch.next_transition().await.is_none());
    assert_eq!(store.append_calls(), 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reset_restores_previous_winners_to_the_pool() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::demo(1));
    let (mut orch, _effects) = build(2, store);
    orch.load().await?;

    orch.start_draw().unwrap();
    orch.run_until_celebrating().await.unwrap();

    // Not while celebrating.
    assert_eq!(
        orch.reset_results().await.unwrap_err(),
        DrawError::Precondition(DrawGate::Busy)
    );

    orch.acknowledge();
    assert!(orch.pool().is_empty());

    assert!(orch.reset_results().await?);
    assert!(orch.results().is_empty());
    assert_eq!(orch.pool().len(), 1);

    Ok(())
}
