//! Supervision health commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

use crate::output;
use koinonia_core::supervision;

#[derive(Subcommand)]
pub enum SupervisionCommands {
    /// Create a supervision
    New(NewSupervisionArgs),

    /// List supervisions
    List,

    /// Show the health dashboard for a supervision
    Dashboard(DashboardArgs),

    /// Sweep all cells and raise alerts
    Alerts,

    /// Traffic-light status of a supervision
    Status(DashboardArgs),
}

#[derive(Args)]
pub struct NewSupervisionArgs {
    /// Supervision name
    pub name: String,

    /// Parent supervision ID
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Supervisor (person ID)
    #[arg(short, long)]
    pub supervisor: Option<String>,
}

#[derive(Args)]
pub struct DashboardArgs {
    /// Supervision ID
    pub supervision_id: String,
}

pub fn execute(cmd: SupervisionCommands, data_dir: &Path, tenant: &str) -> Result<()> {
    let pool = koinonia_db::init_pool(&super::db_path(data_dir))?;

    match cmd {
        SupervisionCommands::New(args) => {
            let supervision = supervision::create_supervision(
                &pool,
                tenant,
                &args.name,
                args.parent.as_deref(),
                args.supervisor.as_deref(),
            )?;
            println!(
                "{} Created supervision: {} ({})",
                "✓".green().bold(),
                supervision.name.cyan(),
                supervision.id.dimmed()
            );
        }

        SupervisionCommands::List => {
            let supervisions = supervision::list_supervisions(&pool, tenant)?;
            if supervisions.is_empty() {
                println!("{}", "No supervisions found.".dimmed());
            }
            for s in supervisions {
                println!("{:<36} {}", s.id.dimmed(), s.name);
            }
        }

        SupervisionCommands::Dashboard(args) => {
            let dashboard = supervision::get_dashboard(&pool, tenant, &args.supervision_id)?;
            output::print_dashboard(&dashboard);
        }

        SupervisionCommands::Alerts => {
            let alerts = supervision::generate_alerts(&pool, tenant)?;
            output::print_alerts(&alerts);
        }

        SupervisionCommands::Status(args) => {
            let status = supervision::get_status(&pool, tenant, &args.supervision_id)?;
            println!(
                "Supervision {}: {}",
                args.supervision_id.dimmed(),
                output::format_health(status)
            );
        }
    }

    Ok(())
}
