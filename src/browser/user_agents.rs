use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Non-empty, trimmed lines of a user agents file.
pub fn load(path: &Path) -> std::io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Picks one user agent at random, falling back to a fixed desktop agent
/// when the file is missing or empty.
pub fn pick(path: &Path) -> String {
    let agents = match load(path) {
        Ok(agents) => agents,
        Err(e) => {
            warn!("⚠️ Could not read user agents from {}: {e}", path.display());
            Vec::new()
        }
    };

    match agents.choose(&mut rand::thread_rng()) {
        Some(agent) => {
            debug!(user_agent = %agent, "picked user agent");
            agent.clone()
        }
        None => {
            warn!("⚠️ No user agents available, using the built-in default");
            DEFAULT_USER_AGENT.to_string()
        }
    }
}
