use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

use crate::helpers::parse_instant;
use crate::models::Granularity;
use crate::services::FetchTarget;

#[derive(Debug, Parser)]
#[command(author, version, about = "Download historical candles from the GDAX exchange into a JSON file", long_about = None)]
pub struct Args {
    /// Trading pair, e.g. BTC-USD.
    #[arg(long, value_parser = parse_product)]
    pub product: String,

    /// Candle period, by name or in seconds.
    #[arg(long, value_enum)]
    pub granularity: Granularity,

    /// Earliest instant to download. Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub start: Option<DateTime<Utc>>,

    /// Latest instant to download. Defaults to the most recent data.
    #[arg(long, value_parser = parse_instant)]
    pub end: Option<DateTime<Utc>>,

    /// Output file, or a directory to place the default file name in.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(format!("--start ({start}) must not be after --end ({end})"))
            }
            _ => Ok(()),
        }
    }

    pub fn target(&self) -> FetchTarget {
        FetchTarget {
            product: self.product.clone(),
            granularity: self.granularity,
            start: self.start,
            end: self.end,
        }
    }
}

/// Three uppercase letters, a dash, three uppercase letters.
pub fn parse_product(s: &str) -> Result<String, String> {
    let valid = match s.split_once('-') {
        Some((base, quote)) => [base, quote]
            .iter()
            .all(|part| part.len() == 3 && part.bytes().all(|b| b.is_ascii_uppercase())),
        None => false,
    };
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("invalid product '{s}'. Expected a pair like BTC-USD."))
    }
}
