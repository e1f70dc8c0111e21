use serde::Serialize;
use studyvssleep_core::{rate_for, DifficultyLevel};

#[derive(Serialize)]
struct Row {
    level: DifficultyLevel,
    decay_per_tick: f64,
    description: &'static str,
}

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<Row> = DifficultyLevel::ALL
        .iter()
        .map(|&level| Row {
            level,
            decay_per_tick: rate_for(level).as_f64(),
            description: level.description(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in rows {
        println!(
            "{:<11} {:>5}  {}",
            row.level.to_string(),
            rate_for(row.level).to_string(),
            row.description
        );
    }
    Ok(())
}
