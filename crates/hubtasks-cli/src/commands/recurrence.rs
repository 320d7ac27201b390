use chrono::{DateTime, Utc};
use clap::Subcommand;
use hubtasks_core::RecurrenceRule;

use super::parse_timestamp;

#[derive(Subcommand)]
pub enum RecurrenceAction {
    /// Check a rule document and print its normalized form
    Validate {
        /// Rule as JSON, e.g. '{"frequency": "weekly", "by_weekday": ["mon"]}'
        #[arg(long)]
        rule: String,
    },
    /// List the occurrences of a series
    Preview {
        /// Rule as JSON
        #[arg(long)]
        rule: String,
        /// Due date of the first occurrence (RFC 3339)
        #[arg(long, value_parser = parse_timestamp)]
        start: DateTime<Utc>,
        /// Maximum number of occurrences to print
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Output as JSON array
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: RecurrenceAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RecurrenceAction::Validate { rule } => {
            let rule = RecurrenceRule::parse(&rule)?;
            println!("{}", serde_json::to_string(&rule)?);
        }
        RecurrenceAction::Preview {
            rule,
            start,
            limit,
            json,
        } => {
            let rule = RecurrenceRule::parse(&rule)?;
            let series: Vec<DateTime<Utc>> = rule.occurrences(start)?.take(limit).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                for (i, due) in series.iter().enumerate() {
                    println!("{:>3}  {}", i + 1, due.to_rfc3339());
                }
            }
        }
    }
    Ok(())
}
