//! One scheduler tick for a single task snapshot.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Args;
use hubtasks_core::{Task, TaskScheduler, TaskStatus, Trigger};

use super::{load_config, parse_timestamp};

#[derive(Args)]
pub struct EvaluateArgs {
    /// Task snapshot as JSON ("-" reads stdin)
    #[arg(long)]
    task: PathBuf,
    /// Evaluation time (RFC 3339, defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    now: Option<DateTime<Utc>>,
    /// Status the task had before this tick, if it just changed
    #[arg(long)]
    transitioned_from: Option<TaskStatus>,
}

pub fn run(args: EvaluateArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let task = read_task(&args.task)?;
    let now = args.now.unwrap_or_else(Utc::now);
    let trigger = match args.transitioned_from {
        Some(from) => Trigger::Transitioned { from },
        None => Trigger::Tick,
    };

    let scheduler = TaskScheduler::with_config(config.scheduler);
    let decision = scheduler.evaluate(&task, &config.tasks, now, trigger)?;

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn read_task(path: &Path) -> Result<Task, Box<dyn std::error::Error>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read task file {}: {e}", path.display()))?
    };
    Ok(serde_json::from_str(&content)?)
}
