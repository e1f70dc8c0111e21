use std::io::Write;
use std::time::Duration;

use clap::Args;
use studyvssleep_core::{
    AdvertisementGateway, Config, DifficultyLevel, EngineSettings, GameEvent, GameSession,
    NoopAds, PlaceholderAds, SessionCommand,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const BAR_WIDTH: usize = 20;

#[derive(Args)]
pub struct PlayArgs {
    /// Difficulty level (defaults to game.default_difficulty)
    #[arg(long, short, value_parser = super::parse_difficulty)]
    difficulty: Option<DifficultyLevel>,
    /// Skip the placeholder ads regardless of configuration
    #[arg(long)]
    no_ads: bool,
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let difficulty = args.difficulty.unwrap_or(config.game.default_difficulty);
    let settings = config.engine_settings();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async {
        if config.ads.enabled && !args.no_ads {
            let ads = PlaceholderAds::new(config.interstitial_delay(), config.ads.banner_id.clone())
                .with_app_id(config.ads.app_id.clone());
            play(&settings, ads, difficulty).await
        } else {
            play(&settings, NoopAds, difficulty).await
        }
    });
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn play<A>(
    settings: &EngineSettings,
    ads: A,
    difficulty: DifficultyLevel,
) -> Result<(), Box<dyn std::error::Error>>
where
    A: AdvertisementGateway + Send + 'static,
{
    let mut session = GameSession::new(settings, ads)?;
    session.engine_mut().subscribe(render);

    println!("Study vs Sleep -- {difficulty} ({})", difficulty.description());
    println!("Enter: study!   r + Enter: try again   q + Enter: quit");
    session.ads().initialize().await;
    println!("Banner Ad Area ({})", session.ads().banner_id());
    session.select_difficulty(difficulty).await;

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(read_commands(tx));

    let last = session.run(rx).await?;
    println!();
    if let Some(snapshot) = last {
        println!(
            "{} on {} after {:.1}s with {} taps",
            snapshot.phase,
            snapshot.difficulty,
            snapshot.elapsed_ms as f64 / 1000.0,
            snapshot.taps
        );
    }
    Ok(())
}

async fn read_commands(tx: mpsc::Sender<SessionCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let command = match lines.next_line().await {
            Ok(Some(line)) => match line.trim() {
                "" => SessionCommand::Tap,
                "r" | "R" => SessionCommand::Restart,
                "q" | "Q" => SessionCommand::Stop,
                other => {
                    tracing::debug!(input = other, "ignoring unknown input");
                    continue;
                }
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("stdin read failed: {e}");
                break;
            }
        };
        let stop = command == SessionCommand::Stop;
        if tx.send(command).await.is_err() || stop {
            break;
        }
    }
}

fn render(event: &GameEvent) {
    let mut out = std::io::stdout().lock();
    let _ = match event {
        GameEvent::StateSnapshot { progress, .. } => {
            write!(out, "\r{}", progress_bar(*progress))
        }
        GameEvent::RunWon { .. } => {
            writeln!(out, "\nYou Passed! You stayed awake long enough to finish studying.")
        }
        GameEvent::RunLost { .. } => {
            writeln!(out, "\nYou Fell Asleep. The urge to sleep was too strong.")
        }
        GameEvent::RunStarted { .. } | GameEvent::RunStopped { .. } => Ok(()),
    };
    let _ = out.flush();
}

fn progress_bar(progress: f64) -> String {
    let filled = ((progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "STUDY [{}{}] SLEEP {:6.2}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_with_progress() {
        assert_eq!(progress_bar(0.0), format!("STUDY [{}] SLEEP   0.00%", "-".repeat(20)));
        assert_eq!(progress_bar(100.0), format!("STUDY [{}] SLEEP 100.00%", "#".repeat(20)));
        assert!(progress_bar(50.0).contains(&format!("{}{}", "#".repeat(10), "-".repeat(10))));
    }
}
