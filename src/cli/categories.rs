use anyhow::Result;

use crate::AppState;

use super::CategoryAction;

pub fn categories_command(state: &AppState, action: CategoryAction) -> Result<()> {
    match action {
        CategoryAction::List => {
            let list = state.settings.categories();
            for name in list.names() {
                let marker = if name == list.selected() { "*" } else { " " };
                println!("{marker} {name}");
            }
        }
        CategoryAction::Add { name } => {
            let added = state
                .settings
                .update_categories(|list| list.add(&name).map(str::to_string))?;
            println!("Category \"{added}\" added successfully!");
        }
        CategoryAction::Select { name } => {
            let selected = state
                .settings
                .update_categories(|list| list.select(&name).map(str::to_string))?;
            println!("Selected category \"{selected}\"");
        }
    }
    Ok(())
}
