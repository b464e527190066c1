//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{Confirm, Select};

use crate::pipeline::View;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm overwriting an existing export file
pub fn confirm_overwrite(path: &std::path::Path) -> Result<bool> {
    confirm_step(&format!("{} already exists. Overwrite?", path.display()))
}

/// Prompt user to pick a view
pub fn select_view() -> Result<View> {
    let items: Vec<String> = View::ALL
        .iter()
        .map(|v| format!("{:<10} {}", v.name(), v.title()))
        .collect();
    let selection = Select::new()
        .with_prompt("Select a view")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(View::ALL[selection])
}
