//! Consolidation commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

use crate::output;
use koinonia_core::consolidation::{self, DecisionInput};

#[derive(Subcommand)]
pub enum ConsolidationCommands {
    /// Register a decision (creates the person when new)
    Register(RegisterArgs),

    /// List converts
    List,

    /// Move a convert to a new funnel status
    Status(StatusArgs),

    /// Log a consolidation event
    Event(EventArgs),

    /// Compute and persist a convert's evasion-risk score
    Risk(RiskArgs),

    /// Show the consolidation funnel
    Funnel,

    /// Show consolidation stats
    Stats,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Full name of the new convert
    pub full_name: String,

    /// Decision date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: String,

    /// Decision context (accept, reconcile, visitor, transfer)
    #[arg(short, long, default_value = "accept")]
    pub context: String,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Neighborhood
    #[arg(long)]
    pub neighborhood: Option<String>,

    /// Consolidator (person ID) to assign
    #[arg(long)]
    pub consolidator: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Convert ID
    pub convert_id: String,

    /// Target status (new, contacted, connected, integrated, lost)
    pub status: String,
}

#[derive(Args)]
pub struct EventArgs {
    /// Convert ID
    pub convert_id: String,

    /// Event type (contact_attempt, contact_success, visit, note)
    pub event_type: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct RiskArgs {
    /// Convert ID
    pub convert_id: String,
}

pub fn execute(cmd: ConsolidationCommands, data_dir: &Path, tenant: &str) -> Result<()> {
    let pool = koinonia_db::init_pool(&super::db_path(data_dir))?;

    match cmd {
        ConsolidationCommands::Register(args) => {
            let convert = consolidation::register_decision(
                &pool,
                tenant,
                &DecisionInput {
                    full_name: args.full_name.clone(),
                    phone: args.phone,
                    decision_date: args.date,
                    decision_context: args.context,
                    neighborhood: args.neighborhood,
                    consolidator_id: args.consolidator,
                    ..Default::default()
                },
            )?;
            println!(
                "{} Registered decision for {} ({})",
                "✓".green().bold(),
                args.full_name.cyan(),
                convert.id.dimmed()
            );
        }

        ConsolidationCommands::List => {
            let converts = consolidation::list_converts(&pool, tenant)?;
            output::print_converts_table(&converts);
        }

        ConsolidationCommands::Status(args) => {
            let convert =
                consolidation::update_convert_status(&pool, tenant, &args.convert_id, &args.status)?;
            println!(
                "{} Convert {} is now {}",
                "✓".green().bold(),
                args.convert_id.dimmed(),
                convert.status.as_str().yellow()
            );
        }

        ConsolidationCommands::Event(args) => {
            let event = consolidation::log_event(
                &pool,
                tenant,
                &args.convert_id,
                &args.event_type,
                args.description.as_deref(),
                None,
            )?;
            println!(
                "{} Logged {} event ({})",
                "✓".green().bold(),
                event.event_type.as_str().cyan(),
                event.id.dimmed()
            );
        }

        ConsolidationCommands::Risk(args) => {
            let score = consolidation::compute_evasion_risk(&pool, tenant, &args.convert_id)?;
            println!(
                "Evasion risk for {}: {}",
                args.convert_id.dimmed(),
                output::format_risk(score)
            );
        }

        ConsolidationCommands::Funnel => {
            let funnel = consolidation::get_funnel_data(&pool, tenant)?;
            output::print_funnel(&funnel);
        }

        ConsolidationCommands::Stats => {
            let stats = consolidation::get_consolidation_stats(&pool, tenant)?;
            output::print_stats(&stats);
        }
    }

    Ok(())
}
