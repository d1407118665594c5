// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;

use crate::models::question::Difficulty;

/// Number of questions asked in phase 1.
pub const PHASE1_QUESTION_COUNT: usize = 5;

/// Minimum phase-1 correct answers for `unlock_next`.
pub const PHASE1_PASS_COUNT: usize = 3;

/// Number of adaptive questions asked in phase 2.
pub const PHASE2_QUESTION_COUNT: usize = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub bank_dir: PathBuf,
    pub tutorials_dir: PathBuf,
    pub log_dir: PathBuf,
    pub session_ttl: Duration,
    pub reaper_interval: Duration,
    pub cors_origins: Vec<String>,
    pub rust_log: String,
    pub quiz: QuizSettings,
    /// Malformed settings that fell back to defaults. Logged once tracing is up.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let mut warnings = Vec::new();

        let bind_addr = parse_var(
            "BIND_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8010)),
            &mut warnings,
        );

        let bank_dir = env::var("BANK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/banks"));

        let tutorials_dir = env::var("TUTORIALS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/tutorials"));

        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        let session_ttl = Duration::from_secs(parse_var("SESSION_TTL_SECS", 3600, &mut warnings));
        let reaper_interval =
            Duration::from_secs(parse_var("REAPER_INTERVAL_SECS", 60, &mut warnings));

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8501".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let seed = match env::var("QUIZ_SEED") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    warnings.push(format!(
                        "Ignoring malformed QUIZ_SEED={:?}, seeding from the OS",
                        raw
                    ));
                    None
                }
            },
            Err(_) => None,
        };

        let quiz = QuizSettings {
            seed,
            ..QuizSettings::default()
        };

        Self {
            bind_addr,
            bank_dir,
            tutorials_dir,
            log_dir,
            session_ttl,
            reaper_interval,
            cors_origins,
            rust_log,
            quiz,
            warnings,
        }
    }
}

/// Reads an env var and parses it, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr>(key: &str, default: T, warnings: &mut Vec<String>) -> T {
    parse_value(key, env::var(key).ok(), default, warnings)
}

/// Records a warning instead of logging it: `from_env` runs before the
/// subscriber is installed.
fn parse_value<T: FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warnings.push(format!("Ignoring malformed {}={:?}, using default", key, raw));
            default
        }),
        None => default,
    }
}

/// Tuning knobs for the adaptive quiz engine.
///
/// The fallback orders list the tiers searched when drawing a question that
/// prefers a given difficulty. Each order should name all three tiers.
#[derive(Debug, Clone)]
pub struct QuizSettings {
    pub phase1_count: usize,
    pub phase1_pass: usize,
    pub phase2_count: usize,
    pub phase1_order: Vec<Difficulty>,
    pub easy_order: Vec<Difficulty>,
    pub medium_order: Vec<Difficulty>,
    pub hard_order: Vec<Difficulty>,
    /// Seeds the engine's RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl QuizSettings {
    /// Fallback order rooted at `preferred`.
    pub fn order_for(&self, preferred: Difficulty) -> &[Difficulty] {
        match preferred {
            Difficulty::Easy => &self.easy_order,
            Difficulty::Medium => &self.medium_order,
            Difficulty::Hard => &self.hard_order,
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        use Difficulty::*;
        Self {
            phase1_count: PHASE1_QUESTION_COUNT,
            phase1_pass: PHASE1_PASS_COUNT,
            phase2_count: PHASE2_QUESTION_COUNT,
            phase1_order: vec![Easy, Medium, Hard],
            easy_order: vec![Easy, Medium, Hard],
            medium_order: vec![Medium, Easy, Hard],
            hard_order: vec![Hard, Medium, Easy],
            seed: None,
        }
    }
}
