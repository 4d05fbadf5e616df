//! Lock command implementation

use std::path::Path;

use colored::Colorize;

use super::open_current;
use crate::cli::LockAction;
use crate::error::Result;

pub fn run_lock(path: &Path, action: LockAction) -> Result<()> {
    let dir = open_current(path)?;
    let lock = dir.lock();
    match action {
        LockAction::Status => match lock.read()? {
            None => println!("{}", "Unlocked".green()),
            Some(info) => {
                let now = dir.actor().now();
                let state = if info.is_expired(now) {
                    "expired".dimmed()
                } else {
                    "held".yellow().bold()
                };
                println!("{}: {}", "Lock".bold(), state);
                println!("{}:   {} ({})", "Owner".dimmed(), info.owner(), info.user);
                println!("{}: {}", "Acquired".dimmed(), info.acquired_at.to_rfc3339());
                println!("{}:  {}", "Expires".dimmed(), info.expires_at.to_rfc3339());
            }
        },
        LockAction::Acquire => {
            let info = lock.acquire()?;
            println!(
                "{} Lock acquired by {} until {}",
                "OK".green().bold(),
                info.owner().cyan(),
                info.expires_at.to_rfc3339()
            );
        }
        LockAction::Release => {
            lock.release()?;
            println!(
                "{} Lock released by {}",
                "OK".green().bold(),
                dir.actor().lock_owner().cyan()
            );
        }
    }
    Ok(())
}
