//! Runtime configuration
//!
//! Command line flags (each with an environment fallback) are resolved
//! into an [`AppConfig`] holding concrete paths, the listen address and
//! the calendar-day convention.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::domain::{DayZone, DomainError};

const DATABASE_FILE: &str = "habits.db";
const DOCUMENT_FILE: &str = "habits.json";

/// Command line arguments for the habit calendar server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding the database and the anonymous habit document
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "HABIT_CALENDAR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database used for signed-in users
    #[arg(long, env = "HABIT_CALENDAR_DB")]
    pub database: Option<PathBuf>,

    /// Path to the JSON document used for anonymous users
    #[arg(long, env = "HABIT_CALENDAR_DOCUMENT")]
    pub document: Option<PathBuf>,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Cut days at this fixed UTC offset instead of host local time
    #[arg(long, env = "HABIT_CALENDAR_UTC_OFFSET_MINUTES", allow_negative_numbers = true)]
    pub utc_offset_minutes: Option<i32>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Log filter directive for the chosen verbosity
    pub fn log_directive(&self) -> String {
        let level = if self.verbose {
            "debug"
        } else if self.debug {
            "info"
        } else {
            "warn"
        };
        format!("habit_calendar={}", level)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: PathBuf,
    pub document: PathBuf,
    pub listen: SocketAddr,
    pub zone: DayZone,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, std::io::Error> {
        let zone = match args.utc_offset_minutes {
            Some(minutes) => DayZone::from_offset_minutes(minutes).map_err(invalid_input)?,
            None => DayZone::Local,
        };

        let data_dir = match (&args.data_dir, &args.database, &args.document) {
            (Some(dir), _, _) => {
                std::fs::create_dir_all(dir)?;
                dir.clone()
            }
            // Both files given explicitly; no data dir needed
            (None, Some(_), Some(_)) => PathBuf::new(),
            (None, _, _) => get_default_data_dir()?,
        };

        let database = args
            .database
            .clone()
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE));
        let document = args
            .document
            .clone()
            .unwrap_or_else(|| data_dir.join(DOCUMENT_FILE));
        ensure_parent(&database)?;
        ensure_parent(&document)?;

        Ok(Self {
            database,
            document,
            listen: SocketAddr::new(args.bind, args.port),
            zone,
        })
    }
}

fn invalid_input(err: DomainError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
}

fn ensure_parent(path: &Path) -> Result<(), std::io::Error> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

/// Get the default data directory with robust fallback strategy
fn get_default_data_dir() -> Result<PathBuf, std::io::Error> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".habit_calendar")),
        dirs::data_dir().map(|p| p.join("habit_calendar")),
        dirs::config_dir().map(|p| p.join("habit_calendar")),
        std::env::current_dir().ok().map(|p| p.join(".habit_calendar")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() && is_writable(potential_path) {
            return Ok(potential_path.clone());
        }
    }

    // Ultimate fallback: use a temporary directory
    let temp_path = std::env::temp_dir().join("habit_calendar");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for data: {}", temp_path.display());
    Ok(temp_path)
}

fn is_writable(dir: &Path) -> bool {
    let test_file = dir.join(".test_write");
    if std::fs::write(&test_file, "test").is_ok() {
        let _ = std::fs::remove_file(&test_file);
        true
    } else {
        false
    }
}
