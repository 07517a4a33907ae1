use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use staffing_core::{
    open_store,
    staff::required_last_name,
    wizard::{StaffingWizard, WizardSession},
    CoreConfig, NewStaff, ShiftLabel, ShiftRecordService, StaffDirectoryService, StaffId,
    StaffPatch, StaffShift,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "staffing")]
#[command(about = "NICU staffing sheet CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the staff directory
    List,
    /// Load the default roster into an empty directory
    Seed,
    /// Add a staff member
    Add {
        /// Last name
        last_name: String,
        /// First name
        #[arg(default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        extension: String,
        #[arg(long, default_value = "RN")]
        role: String,
        /// Day, Night or unset
        #[arg(long, default_value = "")]
        shift: String,
        #[arg(long)]
        preceptee: bool,
        #[arg(long)]
        traveler: bool,
        #[arg(long)]
        charge_nurse: bool,
    },
    /// Change fields on one staff member; omitted fields are left alone
    Update {
        /// Staff id
        id: String,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        extension: Option<String>,
        #[arg(long)]
        role: Option<String>,
        /// Day, Night or unset
        #[arg(long)]
        shift: Option<String>,
        #[arg(long)]
        preceptee: Option<bool>,
        #[arg(long)]
        traveler: Option<bool>,
        #[arg(long)]
        charge_nurse: Option<bool>,
    },
    /// Delete one staff member
    Delete {
        /// Staff id
        id: String,
    },
    /// Delete every staff member
    Clear {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Import staff from a text file, one person per line
    Import {
        /// Path to the file
        file: PathBuf,
    },
    /// Set the shift on several staff members
    BulkShift {
        /// Day, Night or unset
        #[arg(long)]
        shift: String,
        /// Staff ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Render the staffing sheet for a saved wizard session
    Render {
        /// Wizard session JSON file
        session: PathBuf,
    },
    /// Print the stored patient assignments for a shift
    Shift {
        /// Shift date (YYYY-MM-DD)
        date: NaiveDate,
        /// 7P-7A or 7A-7P
        label: ShiftLabel,
    },
}

fn parse_shift(raw: &str) -> anyhow::Result<StaffShift> {
    StaffShift::parse_lenient(raw).with_context(|| format!("invalid shift: {raw:?}"))
}

fn core_config() -> anyhow::Result<CoreConfig> {
    Ok(CoreConfig::from_env_values(
        std::env::var("STAFFING_DATA_DIR").ok(),
        std::env::var("STAFFING_STORE").ok(),
        std::env::var("STAFFING_MAX_BATCH_OPS").ok(),
        std::env::var("STAFFING_AUTOSAVE_MS").ok(),
    )?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = core_config()?;
    let store = open_store(&cfg);
    let directory = StaffDirectoryService::new(store.clone());

    match cli.command {
        Commands::List => {
            let staff = directory.list_all().await?;
            if staff.is_empty() {
                println!("No staff found.");
            }
            for s in staff {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    s.id,
                    s.display_name(),
                    s.phone,
                    s.role,
                    s.shift
                );
            }
        }
        Commands::Seed => {
            let seeded = directory.seed_if_empty().await?;
            if seeded == 0 {
                println!("Directory already has staff; nothing seeded.");
            } else {
                println!("Seeded {seeded} staff members.");
            }
        }
        Commands::Add {
            last_name,
            first_name,
            phone,
            extension,
            role,
            shift,
            preceptee,
            traveler,
            charge_nurse,
        } => {
            let id = directory
                .add(NewStaff {
                    last_name,
                    first_name,
                    phone,
                    extension,
                    role,
                    shift: parse_shift(&shift)?,
                    is_preceptee: preceptee,
                    is_traveler: traveler,
                    is_charge_nurse: charge_nurse,
                })
                .await?;
            println!("Added staff member with id: {id}");
        }
        Commands::Update {
            id,
            last_name,
            first_name,
            phone,
            extension,
            role,
            shift,
            preceptee,
            traveler,
            charge_nurse,
        } => {
            let patch = StaffPatch {
                last_name: last_name.as_deref().map(required_last_name).transpose()?,
                first_name,
                phone,
                extension,
                role,
                shift: shift.as_deref().map(parse_shift).transpose()?,
                is_preceptee: preceptee,
                is_traveler: traveler,
                is_charge_nurse: charge_nurse,
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to update");
            }
            directory.update(&StaffId::parse(&id)?, patch).await?;
            println!("Updated.");
        }
        Commands::Delete { id } => {
            directory.delete(&StaffId::parse(&id)?).await?;
            println!("Deleted.");
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete every staff member without --yes");
            }
            let deleted = directory.clear_all().await?;
            println!("Deleted {deleted} staff members.");
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let report = directory.import_text(&text).await?;
            println!("Imported {} staff members.", report.success_count);
            for message in report.error_messages() {
                eprintln!("{message}");
            }
        }
        Commands::BulkShift { shift, ids } => {
            let ids = ids
                .iter()
                .map(|id| StaffId::parse(id))
                .collect::<Result<Vec<_>, _>>()?;
            let updated = directory
                .bulk_update_shift(&ids, parse_shift(&shift)?)
                .await?;
            println!("Updated {updated} staff members.");
        }
        Commands::Render { session } => {
            let raw = std::fs::read_to_string(&session)
                .with_context(|| format!("reading {}", session.display()))?;
            let session: WizardSession =
                serde_json::from_str(&raw).context("parsing wizard session")?;
            let mut wizard = StaffingWizard::new(store, &cfg, session);
            wizard.load_roster().await;
            if let Some(notice) = wizard.roster_notice() {
                eprintln!("{notice}");
            }
            print!("{}", wizard.render_sheet());
        }
        Commands::Shift { date, label } => {
            let shifts = ShiftRecordService::new(store);
            match shifts.load(date, label).await? {
                None => println!("Nothing saved for {date} {label}."),
                Some(record) => {
                    for (room, patients) in &record.room_babies {
                        let labels: Vec<String> = patients.iter().map(|p| p.label()).collect();
                        println!("{room}: {}", labels.join(", "));
                    }
                }
            }
        }
    }

    Ok(())
}
