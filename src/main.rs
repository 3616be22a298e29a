//! Anser Round Demo
//!
//! Plays today's themed round headlessly, then replays the recorded inputs
//! and checks that both runs hash the same.

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use anser::{
    derive_round_seed, RoundInput, RoundPhase, RoundState, ThemeSelector, VERSION,
    game::{events::RoundEventKind, item::ItemType, tick::replay_round},
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Anser Round Engine v{}", VERSION);

    demo_round()
}

/// Play one round with a greedy tapper and verify it replays identically.
fn demo_round() -> anyhow::Result<()> {
    info!("=== Starting Demo Round ===");

    let today = chrono::Local::now().date_naive();
    let selector = ThemeSelector::builtin(today);
    let theme = selector.current();
    let level = 1;
    let seed = derive_round_seed(today, theme.id, level);

    info!("Theme: {} ({:?})", theme.name, theme.category);
    info!("Seed: {}", seed);

    let mut state = RoundState::with_palette(seed, theme.item_types.clone());
    state.start(level)?;
    let config = state.config.clone();
    info!(
        "{} items over {} types, clear {} in {}",
        config.item_count,
        config.item_types.len(),
        config.target_eliminations,
        state.formatted_time()
    );

    let mut inputs = Vec::new();
    let mut record = |state: &mut RoundState, input: RoundInput| {
        input.apply(state);
        inputs.push(input);
    };

    // One shake up front, then a few seconds of "thinking" per match
    record(&mut state, RoundInput::Shake);
    while state.is_playing() {
        let Some(item_type) = next_type(&state) else {
            break;
        };
        let picks: Vec<_> = state
            .active_items()
            .filter(|i| i.item_type == item_type && i.is_selectable())
            .map(|i| i.id)
            .take(3)
            .collect();
        for id in picks {
            record(&mut state, RoundInput::select(id));
        }
        record(&mut state, RoundInput::seconds(4));
    }

    for event in state.take_events() {
        match event.kind {
            RoundEventKind::Eliminated { item_type, points, score, .. } => {
                info!("[{:>3}s] Cleared {} +{} (score {})", event.at, item_type.display_name(), points, score);
            }
            RoundEventKind::Shaken { moved, .. } => {
                info!("[{:>3}s] Shake moved {} items", event.at, moved);
            }
            RoundEventKind::RoundWon { score, time_remaining } => {
                info!("Round won! Score {} with {}s left", score, time_remaining);
            }
            RoundEventKind::RoundLost { reason, score, .. } => {
                info!("Round lost ({:?}), score {}", reason, score);
            }
            _ => {}
        }
    }

    info!("=== Round Results ===");
    let hash = state.compute_hash();
    info!("Final phase: {:?}", state.phase);
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Inputs recorded: {}", inputs.len());

    info!("=== Verifying Determinism ===");
    let (replayed, events) = replay_round(seed, config, &inputs)?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));
    info!("Replay events: {}", events.len());

    if hash == replay_hash && replayed.phase == state.phase {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        anyhow::bail!("replay diverged: phase {:?} vs {:?}", replayed.phase, state.phase);
    }

    if state.phase == RoundPhase::Won {
        info!("Reward unlocked: {}", theme.unlock_reward_id);
    }
    Ok(())
}

/// Type with the most selectable items left, lowest type first on ties.
fn next_type(state: &RoundState) -> Option<ItemType> {
    let mut best: Option<(ItemType, usize)> = None;
    for item in state.active_items().filter(|i| i.is_selectable()) {
        let count = state
            .active_items()
            .filter(|i| i.item_type == item.item_type && i.is_selectable())
            .count();
        let better = match best {
            Some((kind, n)) => count > n || (count == n && item.item_type < kind),
            None => true,
        };
        if better {
            best = Some((item.item_type, count));
        }
    }
    best.filter(|(_, n)| *n >= 3).map(|(kind, _)| kind)
}
