//! timespeak - parse English time phrases into time ranges
//!
//! Reads a phrase from the command line and prints the resolved range,
//! either human-readable or as JSON.

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use timespeak::{PhraseParser, TimeRange};

#[derive(Parser)]
#[command(name = "timespeak")]
#[command(about = "Parse English time phrases like 'since yesterday' or 'from 8am to 6pm'", long_about = None)]
struct Cli {
    /// The phrase to parse; quoting is optional, trailing words are joined
    #[arg(value_name = "PHRASE", required = true)]
    phrase: Vec<String>,

    /// IANA timezone to interpret the phrase in (default: UTC, or an
    /// 'in <zone>' clause inside the phrase)
    #[arg(short, long, value_name = "ZONE")]
    timezone: Option<String>,

    /// Print the range as JSON instead of the human-readable form
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let phrase = cli.phrase.join(" ");

    let range: TimeRange = match cli.timezone {
        Some(name) => {
            let zone: Tz = name
                .parse()
                .ok()
                .with_context(|| format!("unknown timezone: {name}"))?;
            if let Some(clause) = zone_clause(&phrase) {
                bail!("phrase already names a timezone ('in {clause}'); drop it or the --timezone flag");
            }
            PhraseParser::new(zone)
                .parse(&phrase)
                .with_context(|| format!("could not parse phrase: {phrase}"))?
        }
        // Without --timezone the phrase itself may carry an 'in <zone>'
        // clause; FromStr handles both that and the UTC default.
        None => phrase
            .parse()
            .with_context(|| format!("could not parse phrase: {phrase}"))?,
    };

    print_range(&range, cli.json)
}

/// A trailing `in <zone>` clause naming a real IANA zone, if the phrase
/// carries one. Plain words after "in" don't count.
fn zone_clause(phrase: &str) -> Option<&str> {
    let idx = phrase.rfind(" in ")?;
    let name = phrase[idx + 4..].trim();
    name.parse::<Tz>().ok().map(|_| name)
}

fn print_range(range: &TimeRange, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&range)?);
    } else {
        println!("{range}");
    }
    Ok(())
}
