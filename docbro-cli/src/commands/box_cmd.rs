//! ABOUTME: `docbro box` subcommands

use docbro_core::boxes::{BagConfig, BoxConfig, DragConfig, RagConfig};
use docbro_core::error::{DocBroError, Result};
use serde::Serialize;

use crate::cli::{BoxCommands, OutputFormat};
use crate::config::Runtime;
use crate::output::print_ok;

#[derive(Serialize)]
struct BoxView {
    name: String,
    box_type: String,
    description: Option<String>,
    is_configured: bool,
    has_content: bool,
}

impl From<docbro_core::boxes::DocBox> for BoxView {
    fn from(b: docbro_core::boxes::DocBox) -> Self {
        Self {
            name: b.name,
            box_type: b.config.box_type().to_string(),
            description: b.description,
            is_configured: b.configuration_state.is_configured,
            has_content: b.configuration_state.has_content,
        }
    }
}

fn config_for(box_type: docbro_core::shelf::BoxType, source: Option<String>) -> BoxConfig {
    match box_type {
        docbro_core::shelf::BoxType::Drag => BoxConfig::Drag(DragConfig { initial_url: source, ..Default::default() }),
        docbro_core::shelf::BoxType::Rag => BoxConfig::Rag(RagConfig { initial_path: source, ..Default::default() }),
        docbro_core::shelf::BoxType::Bag => BoxConfig::Bag(BagConfig { initial_path: source, ..Default::default() }),
    }
}

pub async fn run(command: BoxCommands, runtime: &Runtime, force: bool, output: OutputFormat) -> Result<()> {
    match command {
        BoxCommands::Create { name, box_type, shelf, source, description } => {
            let config = config_for(box_type.into(), source);
            let dbox = runtime.catalog.create_box(&name, config, description, &shelf)?;
            print_ok(output, &BoxView::from(dbox), |v| format!("created box '{}' ({})", v.name, v.box_type));
        }
        BoxCommands::List { shelf, r#type } => {
            let boxes: Vec<BoxView> = runtime
                .catalog
                .list_boxes(shelf.as_deref(), r#type.map(Into::into))?
                .into_iter()
                .map(BoxView::from)
                .collect();
            print_ok(output, &boxes, |views| {
                if views.is_empty() {
                    "no boxes".to_string()
                } else {
                    views.iter().map(|b| format!("{} ({})", b.name, b.box_type)).collect::<Vec<_>>().join("\n")
                }
            });
        }
        BoxCommands::Add { name, shelf } => {
            runtime.catalog.add_box_to_shelf(&name, &shelf)?;
            print_ok(output, &serde_json::json!({ "box": &name, "shelf": &shelf }), |_| {
                format!("added '{name}' to shelf '{shelf}'")
            });
        }
        BoxCommands::Remove { name, shelf } => {
            runtime.catalog.remove_box_from_shelf(&name, &shelf)?;
            print_ok(output, &serde_json::json!({ "box": &name, "shelf": &shelf }), |_| {
                format!("removed '{name}' from shelf '{shelf}'")
            });
        }
        BoxCommands::Rename { old_name, new_name } => {
            let dbox = runtime.catalog.rename_box(&old_name, &new_name)?;
            print_ok(output, &BoxView::from(dbox), |v| format!("renamed to '{}'", v.name));
        }
        BoxCommands::Inspect { name } => {
            let dbox = runtime.catalog.get_box(&name)?;
            print_ok(output, &BoxView::from(dbox), |v| {
                format!(
                    "{} ({}) configured={} has_content={}",
                    v.name, v.box_type, v.is_configured, v.has_content
                )
            });
        }
        BoxCommands::Delete { name } => {
            if !force {
                return Err(DocBroError::InvalidInput { message: "box delete requires --force".to_string() });
            }
            let id = runtime.catalog.delete_box(&name, force)?;
            // The box's vector collection is keyed by its id (spec §4.B); an
            // empty filter matches every point, so this drops the whole
            // collection's worth of vectors for the deleted box.
            runtime.vector_store.delete_by_filter(&id.to_string(), docbro_storage::prelude::VectorFilter::new()).await?;
            print_ok(output, &serde_json::json!({ "deleted": &name }), |_| format!("deleted box '{name}'"));
        }
    }
    Ok(())
}
