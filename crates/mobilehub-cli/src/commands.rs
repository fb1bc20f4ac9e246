use std::path::Path;

use eyre::Result;
use mobilehub_core::models::starter::starter_snapshot;
use mobilehub_provisioner::{RunOptions, UpdatePlan};
use mobilehub_storage::{ProjectLayout, ResourceManager};

use crate::aws::connect;
use crate::cli::AppsyncCommands;
use crate::config::{self, DEFAULT_REGION, ProjectConfig};

/// Per-invocation state: the resolved project settings and its snapshots.
pub struct Project {
    pub config: ProjectConfig,
    pub manager: ResourceManager,
}

impl Project {
    pub fn open(project_dir: &Path, region: Option<&str>, profile: Option<&str>) -> Result<Self> {
        if !config::has_config(project_dir) {
            return Err(eyre::eyre!(
                "no {} in {}; run `mobilehub init` first",
                config::CONFIG_FILE,
                project_dir.display()
            ));
        }
        let config = config::load_config(project_dir)?.with_overrides(region, profile);
        Ok(Self {
            config,
            manager: ResourceManager::new(ProjectLayout::new(project_dir)),
        })
    }

    fn options(&self) -> RunOptions {
        RunOptions::new(&self.config.project_name, &self.config.region)
    }
}

pub fn init(project_dir: &Path, name: &str, region: Option<&str>) -> Result<ProjectConfig> {
    if config::has_config(project_dir) {
        return Err(eyre::eyre!(
            "{} already exists in {}",
            config::CONFIG_FILE,
            project_dir.display()
        ));
    }
    let config = ProjectConfig::new(name, region.unwrap_or(DEFAULT_REGION));
    config::save_config(project_dir, &config)?;
    tracing::info!(project = %name, region = %config.region, "project initialised");
    Ok(config)
}

pub async fn appsync(project: &Project, command: &AppsyncCommands) -> Result<()> {
    match command {
        AppsyncCommands::Enable => {
            if enable(project)? {
                println!(
                    "AppSync enabled; edit {} and run `mobilehub appsync create`",
                    project.manager.layout().dev_dir().display()
                );
            } else {
                println!("AppSync is already enabled");
            }
        }
        AppsyncCommands::Disable => {
            project.manager.disable()?;
            println!("AppSync disabled; remote resources were left untouched");
        }
        AppsyncCommands::Create => {
            let clients = connect(&project.config.region, &project.config.credentials).await;
            let report =
                mobilehub_provisioner::create(&project.manager, &clients, &project.options())
                    .await?;
            println!(
                "Created {} ({}): {} tables, {} roles, {} data sources, {} resolvers, {} api keys",
                report.api_name,
                report.api_id,
                report.tables,
                report.roles,
                report.data_sources,
                report.resolvers,
                report.api_keys,
            );
            if let Some(endpoint) = report.graphql_endpoint {
                println!("Endpoint: {endpoint}");
            }
        }
        AppsyncCommands::Update => {
            let clients = connect(&project.config.region, &project.config.credentials).await;
            let report =
                mobilehub_provisioner::update(&project.manager, &clients, &project.options())
                    .await?;
            if report.applied.is_empty() {
                println!("Nothing to update");
            }
            for entry in &report.applied {
                println!("{:<7} {}", entry.mark, entry.addr);
            }
        }
        AppsyncCommands::Pull => {
            let clients = connect(&project.config.region, &project.config.credentials).await;
            let report =
                mobilehub_provisioner::retrieve(&project.manager, &clients, &project.options())
                    .await?;
            println!(
                "Pulled {} ({}): {} tables, {} data sources, {} resolvers, {} api keys",
                report.api_name,
                report.api_id,
                report.tables,
                report.data_sources,
                report.resolvers,
                report.api_keys,
            );
        }
        AppsyncCommands::Diff => {
            let plan = mobilehub_provisioner::preview(&project.manager)?;
            for line in render_plan(&plan) {
                println!("{line}");
            }
        }
        AppsyncCommands::Console => {
            println!("{}", console(project)?);
        }
    }
    Ok(())
}

/// Write the starter dev snapshot. `false` when the feature was already on.
pub fn enable(project: &Project) -> Result<bool> {
    let starter = starter_snapshot(&project.config.project_name, &project.config.region);
    Ok(project.manager.enable(&starter)?)
}

pub fn render_plan(plan: &UpdatePlan) -> Vec<String> {
    if !plan.has_changes() {
        return vec!["No changes".to_string()];
    }
    let mut lines: Vec<String> = plan
        .entries()
        .iter()
        .map(|e| format!("{:<7} {}", e.mark, e.addr))
        .collect();
    if let Some(delete) = plan.first_delete() {
        lines.push(format!(
            "update will stop at {}: deletes are not supported",
            delete.addr
        ));
    }
    lines
}

/// Console URL of the provisioned API.
pub fn console(project: &Project) -> Result<String> {
    let current = project.manager.load_current()?;
    let api_id = current
        .api_id()
        .ok_or_else(|| eyre::eyre!("no provisioned API; run `mobilehub appsync create` first"))?;
    Ok(console_url(&project.config.region, api_id))
}

pub fn console_url(region: &str, api_id: &str) -> String {
    format!("https://{region}.console.aws.amazon.com/appsync/home?region={region}#/{api_id}/v1/home")
}
