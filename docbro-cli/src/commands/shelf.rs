//! ABOUTME: `docbro shelf` subcommands

use docbro_core::error::{DocBroError, Result};
use serde::Serialize;

use crate::cli::{OutputFormat, ShelfCommands};
use crate::config::Runtime;
use crate::output::print_ok;

#[derive(Serialize)]
struct ShelfView {
    name: String,
    description: Option<String>,
    default_box_type: String,
    auto_fill: bool,
    tags: Vec<String>,
    is_current: bool,
    protected: bool,
}

impl From<docbro_core::shelf::Shelf> for ShelfView {
    fn from(s: docbro_core::shelf::Shelf) -> Self {
        Self {
            name: s.name,
            description: s.description,
            default_box_type: s.default_box_type.to_string(),
            auto_fill: s.auto_fill,
            tags: s.tags,
            is_current: s.is_current,
            protected: s.protected,
        }
    }
}

pub fn run(command: ShelfCommands, runtime: &Runtime, force: bool, output: OutputFormat) -> Result<()> {
    match command {
        ShelfCommands::Create { name, description, r#type, auto_fill, tags, current } => {
            let shelf = runtime.catalog.create_shelf(&name, description, r#type.into(), auto_fill, tags, current)?;
            print_ok(output, &ShelfView::from(shelf), |v| format!("created shelf '{}'", v.name));
        }
        ShelfCommands::List { current_only, limit } => {
            let shelves: Vec<ShelfView> =
                runtime.catalog.list_shelves(current_only, limit)?.into_iter().map(ShelfView::from).collect();
            print_ok(output, &shelves, |views| {
                if views.is_empty() {
                    "no shelves".to_string()
                } else {
                    views
                        .iter()
                        .map(|s| format!("{}{}", s.name, if s.is_current { " (current)" } else { "" }))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            });
        }
        ShelfCommands::Current => {
            let shelf = runtime.catalog.current_shelf()?;
            print_ok(output, &ShelfView::from(shelf), |v| v.name.clone());
        }
        ShelfCommands::Rename { old_name, new_name } => {
            let shelf = runtime.catalog.rename_shelf(&old_name, &new_name)?;
            print_ok(output, &ShelfView::from(shelf), |v| format!("renamed to '{}'", v.name));
        }
        ShelfCommands::Delete { name } => {
            if !force {
                return Err(DocBroError::InvalidInput { message: "shelf delete requires --force".to_string() });
            }
            runtime.catalog.delete_shelf(&name, force)?;
            print_ok(output, &serde_json::json!({ "deleted": &name }), |_| format!("deleted shelf '{name}'"));
        }
    }
    Ok(())
}
