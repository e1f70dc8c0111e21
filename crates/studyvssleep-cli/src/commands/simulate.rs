use clap::Args;
use studyvssleep_core::{Config, DifficultyLevel, GameEngine, Phase, RunSnapshot};

#[derive(Args)]
pub struct SimulateArgs {
    /// Difficulty level (defaults to game.default_difficulty)
    #[arg(long, short, value_parser = super::parse_difficulty)]
    difficulty: Option<DifficultyLevel>,
    /// Tap once after every N ticks (0 = never tap)
    #[arg(long, default_value = "0")]
    tap_every: u64,
    /// Give up after this many ticks
    #[arg(long, default_value = "100000")]
    max_ticks: u64,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Apply ticks one at a time, tapping after every `tap_every`-th tick, until
/// the run ends or `max_ticks` is spent.
pub fn simulate(
    engine: &mut GameEngine,
    difficulty: DifficultyLevel,
    tap_every: u64,
    max_ticks: u64,
) -> Result<RunSnapshot, Box<dyn std::error::Error>> {
    engine.start(difficulty);
    for tick in 1..=max_ticks {
        if !engine.is_accepting_input() {
            break;
        }
        engine.on_tick()?;
        if tap_every > 0 && tick % tap_every == 0 {
            engine.tap()?;
        }
    }
    let snapshot = engine.snapshot().ok_or("simulation produced no run")?;
    Ok(snapshot)
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let difficulty = args.difficulty.unwrap_or(config.game.default_difficulty);
    let mut engine = GameEngine::manual(&config.engine_settings())?;

    let snapshot = simulate(&mut engine, difficulty, args.tap_every, args.max_ticks)?;
    tracing::debug!(?snapshot, "simulation finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let outcome = match snapshot.phase {
        Phase::Won => "won",
        Phase::Lost => "lost",
        Phase::Playing => "still playing",
    };
    println!(
        "{} on {} after {} ticks ({:.2}s), {} taps, progress {:.2}",
        outcome,
        snapshot.difficulty,
        snapshot.ticks,
        snapshot.elapsed_ms as f64 / 1000.0,
        snapshot.taps,
        snapshot.progress
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyvssleep_core::EngineSettings;

    fn engine() -> GameEngine {
        GameEngine::manual(&EngineSettings::default()).unwrap()
    }

    #[test]
    fn untouched_easy_run_is_lost() {
        let snap = simulate(&mut engine(), DifficultyLevel::Easy, 0, 100_000).unwrap();
        assert_eq!(snap.phase, Phase::Lost);
        assert_eq!(snap.ticks, 1000);
    }

    #[test]
    fn steady_tapping_wins_easy() {
        // -3.0 per 60 ticks from decay, +5.0 from the tap
        let snap = simulate(&mut engine(), DifficultyLevel::Easy, 60, 100_000).unwrap();
        assert_eq!(snap.phase, Phase::Won);
        assert_eq!(snap.progress, 100.0);
    }

    #[test]
    fn tick_budget_leaves_run_playing() {
        let snap = simulate(&mut engine(), DifficultyLevel::Medium, 0, 10).unwrap();
        assert_eq!(snap.phase, Phase::Playing);
        assert_eq!(snap.ticks, 10);
        assert_eq!(snap.progress, 48.5);
    }
}
