pub mod ambience;
pub mod config;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

use std::rc::Rc;

use cozy_pomodoro_core::Database;
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Shared handle so several stores can sit on one connection.
pub fn open_db() -> Result<Rc<Database>, Box<dyn std::error::Error>> {
    Ok(Rc::new(Database::open()?))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
