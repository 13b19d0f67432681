//! ABOUTME: `docbro health` — system/services/config/projects checks (spec §6)

use docbro_core::error::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Runtime;
use crate::output::print_ok;

#[derive(Serialize, Default)]
struct HealthReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<SystemHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<ServicesHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ConfigHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projects: Option<ProjectsHealth>,
}

#[derive(Serialize)]
struct SystemHealth {
    config_dir: String,
    data_dir: String,
    settings_file_present: bool,
}

#[derive(Serialize)]
struct ServicesHealth {
    embedder_ok: bool,
    embedder_model: String,
    vector_store_ok: bool,
    vector_backend: String,
}

#[derive(Serialize)]
struct ConfigHealth {
    vector_backend: String,
    embedder_model: String,
    mcp_read_only_addr: String,
    mcp_admin_addr: String,
}

#[derive(Serialize)]
struct ProjectsHealth {
    shelf_count: usize,
    box_count: usize,
}

pub async fn run(
    runtime: &Runtime,
    system: bool,
    services: bool,
    config: bool,
    projects: bool,
    output: OutputFormat,
) -> Result<()> {
    // No flags means "check everything" (spec §6).
    let all = !(system || services || config || projects);
    let mut report = HealthReport::default();

    if system || all {
        report.system = Some(SystemHealth {
            config_dir: runtime.paths.config_dir().display().to_string(),
            data_dir: runtime.paths.data_dir().display().to_string(),
            settings_file_present: runtime.paths.settings_file().exists(),
        });
    }

    if services || all {
        let embedder_health = runtime.embedder.health().await;
        let vector_health = runtime.vector_store.health().await;
        report.services = Some(ServicesHealth {
            embedder_ok: embedder_health.ok,
            embedder_model: embedder_health.model,
            vector_store_ok: vector_health.ok,
            vector_backend: vector_health.backend,
        });
    }

    if config || all {
        report.config = Some(ConfigHealth {
            vector_backend: format!("{:?}", runtime.settings.vector_backend),
            embedder_model: runtime.settings.embedder_model.clone(),
            mcp_read_only_addr: format!("{}:{}", runtime.settings.mcp_read_only_host, runtime.settings.mcp_read_only_port),
            mcp_admin_addr: format!("{}:{}", runtime.settings.mcp_admin_host, runtime.settings.mcp_admin_port),
        });
    }

    if projects || all {
        let shelf_count = runtime.catalog.list_shelves(false, None)?.len();
        let box_count = runtime.catalog.list_boxes(None, None)?.len();
        report.projects = Some(ProjectsHealth { shelf_count, box_count });
    }

    print_ok(output, &report, |r| {
        let mut lines = Vec::new();
        if let Some(s) = &r.system {
            lines.push(format!("system: config={} data={} settings_present={}", s.config_dir, s.data_dir, s.settings_file_present));
        }
        if let Some(s) = &r.services {
            lines.push(format!(
                "services: embedder={} ({}) vector_store={} ({})",
                if s.embedder_ok { "ok" } else { "down" },
                s.embedder_model,
                if s.vector_store_ok { "ok" } else { "down" },
                s.vector_backend
            ));
        }
        if let Some(c) = &r.config {
            lines.push(format!(
                "config: vector_backend={} embedder_model={} read_only={} admin={}",
                c.vector_backend, c.embedder_model, c.mcp_read_only_addr, c.mcp_admin_addr
            ));
        }
        if let Some(p) = &r.projects {
            lines.push(format!("projects: shelves={} boxes={}", p.shelf_count, p.box_count));
        }
        lines.join("\n")
    });
    Ok(())
}
