use std::rc::Rc;

use chrono::Utc;
use clap::Subcommand;
use cozy_pomodoro_core::TaskList;

use super::{open_db, print_json, CommandResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        text: String,
    },
    /// List tasks, open ones first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip a task between open and done
    Toggle {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum NotesAction {
    /// Print the notes
    Show,
    /// Replace the notes
    Set {
        /// New notes text
        text: String,
    },
}

pub fn run(action: TaskAction) -> CommandResult {
    let db = open_db()?;
    let mut tasks = TaskList::load(Rc::clone(&db));

    match action {
        TaskAction::Add { text } => {
            let task = tasks.add(&text, Utc::now())?;
            print_json(task)?;
        }
        TaskAction::List { json } => {
            let sorted = tasks.sorted();
            if json {
                print_json(&sorted)?;
            } else if sorted.is_empty() {
                println!("No tasks.");
            } else {
                for task in sorted {
                    let mark = if task.completed { "x" } else { " " };
                    println!("[{mark}] {} {}", task.id, task.text);
                }
            }
        }
        TaskAction::Toggle { id } => {
            let completed = tasks.toggle(id)?;
            println!("task {id} {}", if completed { "done" } else { "open" });
        }
        TaskAction::Delete { id } => {
            let task = tasks.delete(id)?;
            println!("deleted: {}", task.text);
        }
    }
    Ok(())
}

pub fn run_notes(action: NotesAction) -> CommandResult {
    let db = open_db()?;
    let tasks = TaskList::load(Rc::clone(&db));

    match action {
        NotesAction::Show => println!("{}", tasks.notes()),
        NotesAction::Set { text } => {
            tasks.set_notes(&text)?;
            println!("notes saved");
        }
    }
    Ok(())
}
