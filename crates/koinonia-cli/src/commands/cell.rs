//! Cell management commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

use koinonia_core::cell::{self, model::AttendanceMark};

#[derive(Subcommand)]
pub enum CellCommands {
    /// Create a new cell
    New(NewCellArgs),

    /// List cells
    List,

    /// Record a held meeting with attendance
    Meeting(MeetingArgs),
}

#[derive(Args)]
pub struct NewCellArgs {
    /// Cell name
    pub name: String,

    /// Supervision ID
    #[arg(short, long)]
    pub supervision: Option<String>,

    /// Leader (person ID)
    #[arg(short, long)]
    pub leader: Option<String>,
}

#[derive(Args)]
pub struct MeetingArgs {
    /// Cell ID
    pub cell_id: String,

    /// Meeting date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: String,

    /// Notes
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Person IDs marked present (repeatable)
    #[arg(long = "present")]
    pub present: Vec<String>,

    /// Person IDs marked absent (repeatable)
    #[arg(long = "absent")]
    pub absent: Vec<String>,
}

pub fn execute(cmd: CellCommands, data_dir: &Path, tenant: &str) -> Result<()> {
    let pool = koinonia_db::init_pool(&super::db_path(data_dir))?;

    match cmd {
        CellCommands::New(args) => {
            let cell = cell::create_cell(
                &pool,
                tenant,
                &args.name,
                args.supervision.as_deref(),
                args.leader.as_deref(),
            )?;
            println!(
                "{} Created cell: {} ({})",
                "✓".green().bold(),
                cell.name.cyan(),
                cell.id.dimmed()
            );
        }

        CellCommands::List => {
            let cells = cell::list_cells(&pool, tenant)?;
            if cells.is_empty() {
                println!("{}", "No cells found.".dimmed());
            }
            for cell in cells {
                println!("{:<36} {}", cell.id.dimmed(), cell.name);
            }
        }

        CellCommands::Meeting(args) => {
            let mut attendance: Vec<AttendanceMark> = args
                .present
                .iter()
                .map(|id| AttendanceMark { person_id: id.clone(), present: true })
                .collect();
            attendance.extend(args.absent.iter().map(|id| AttendanceMark {
                person_id: id.clone(),
                present: false,
            }));

            let meeting = cell::record_meeting(
                &pool,
                tenant,
                &args.cell_id,
                &args.date,
                args.notes.as_deref(),
                &attendance,
            )?;
            println!(
                "{} Recorded meeting on {} ({} marks)",
                "✓".green().bold(),
                meeting.meeting_date.cyan(),
                attendance.len()
            );
        }
    }

    Ok(())
}
