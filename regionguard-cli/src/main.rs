//! RegionGuard command-line tool
//!
//! Inspects and maintains the region store a server uses, without the
//! server running:
//! 1. Check or migrate stored worlds to the current schema
//! 2. Look up regions and resolve flags at a block
//! 3. Define, edit and remove regions
//!
//! Usage:
//!   regionguard --config regionguard.toml query world 10,64,-3 pvp

use std::path::PathBuf;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use regionguard_cli::{
    QueryReport, RegionSummary, WorldStatus, define, known_worlds, load_worlds, migrate_worlds,
    query, region_info, regions_at, set_flag,
};
use regionguard_engine::{EngineConfig, RegionEngine};
use regionguard_flags::SettingPart;
use regionguard_geometry::Selection;
use regionguard_types::{ActorId, BlockVector, RegionId, Subject, WorldId};
use serde::Serialize;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "regionguard")]
#[command(about = "Inspect and maintain RegionGuard region stores")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "regionguard.toml")]
    config: PathBuf,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List worlds present in storage
    Worlds,
    /// Load worlds and report what was found (nothing is written)
    Check {
        /// Worlds to check; defaults to configured and stored worlds
        worlds: Vec<WorldId>,
    },
    /// Upgrade stored worlds to the current schema
    Migrate {
        /// Worlds to migrate; defaults to configured and stored worlds
        worlds: Vec<WorldId>,
    },
    /// List regions containing a block
    Regions { world: WorldId, point: BlockVector },
    /// Show one region
    Info { world: WorldId, id: RegionId },
    /// Resolve a flag at a block
    Query {
        world: WorldId,
        point: BlockVector,
        flag: String,
        #[command(flatten)]
        subject: SubjectArgs,
    },
    /// Define a cuboid region, or the global region
    Define {
        world: WorldId,
        id: RegionId,
        /// First corner block (inclusive)
        #[arg(long, required_unless_present = "global")]
        pos1: Option<BlockVector>,
        /// Opposite corner block (inclusive)
        #[arg(long, required_unless_present = "global")]
        pos2: Option<BlockVector>,
        /// Define the world's global region instead
        #[arg(long, conflicts_with_all = ["pos1", "pos2"])]
        global: bool,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        priority: i32,
        #[arg(long)]
        parent: Option<RegionId>,
    },
    /// Set or clear a flag on a region
    Flag {
        world: WorldId,
        id: RegionId,
        flag: String,
        /// New value; omit to clear the flag
        value: Option<String>,
        /// Set the owner override instead of the plain value
        #[arg(long, conflicts_with = "members")]
        owners: bool,
        /// Set the member override instead of the plain value
        #[arg(long)]
        members: bool,
    },
    /// Remove a region; its children are detached
    Remove { world: WorldId, id: RegionId },
}

#[derive(Args, Debug)]
struct SubjectArgs {
    /// Player UUID to query as; omit for environmental actions
    #[arg(long)]
    player: Option<ActorId>,
    /// Permission group of the player (repeatable)
    #[arg(long = "group", requires = "player")]
    groups: Vec<String>,
}

impl SubjectArgs {
    fn subject(&self) -> Subject {
        match self.player {
            Some(id) => Subject::player_in_groups(id, self.groups.iter()),
            None => Subject::Nobody,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = EngineConfig::load_from(&cli.config);
    let engine = RegionEngine::from_config(&config).context("Failed to start region engine")?;
    let configured = config.world_ids()?;
    debug!("Configured worlds: {:?}", configured);

    match cli.command {
        Command::Worlds => {
            let worlds = engine.storage().stored_worlds()?;
            let names: Vec<String> = worlds.iter().map(ToString::to_string).collect();
            emit(cli.json, &names, |names| names.join("\n"))?;
        }
        Command::Check { worlds } => {
            let worlds = pick_worlds(&engine, &configured, worlds)?;
            let statuses = load_worlds(&engine, &worlds);
            emit(cli.json, &statuses, |s| render_statuses(s))?;
            fail_on_errors(&statuses)?;
        }
        Command::Migrate { worlds } => {
            let worlds = pick_worlds(&engine, &configured, worlds)?;
            let statuses = migrate_worlds(&engine, &worlds);
            let migrated = statuses.iter().filter(|s| s.saved).count();
            info!("Migrated {} of {} worlds", migrated, statuses.len());
            emit(cli.json, &statuses, |s| render_statuses(s))?;
            fail_on_errors(&statuses)?;
        }
        Command::Regions { world, point } => {
            engine.load_world(&world)?;
            let regions = regions_at(&engine, &world, point)?;
            emit(cli.json, &regions, |r| {
                r.iter().map(render_region).collect::<Vec<_>>().join("\n\n")
            })?;
        }
        Command::Info { world, id } => {
            engine.load_world(&world)?;
            let region = region_info(&engine, &world, &id)?;
            emit(cli.json, &region, render_region)?;
        }
        Command::Query { world, point, flag, subject } => {
            engine.load_world(&world)?;
            let report = query(&engine, &world, point, &flag, &subject.subject())?;
            emit(cli.json, &report, render_query)?;
        }
        Command::Define { world, id, pos1, pos2, global, priority, parent } => {
            engine.load_world(&world)?;
            let selection = match (global, pos1, pos2) {
                (true, _, _) => None,
                (false, Some(pos1), Some(pos2)) => Some(Selection::Cuboid { pos1, pos2 }),
                _ => bail!("--pos1 and --pos2 are required unless --global is given"),
            };
            define(&engine, &world, &id, selection, priority, parent)?;
            engine.save_world(&world)?;
            info!("Defined region {} in {}", id, world);
        }
        Command::Flag { world, id, flag, value, owners, members } => {
            engine.load_world(&world)?;
            let part = if owners {
                SettingPart::Owners
            } else if members {
                SettingPart::Members
            } else {
                SettingPart::Value
            };
            set_flag(&engine, &world, &id, &flag, part, value.as_deref())?;
            engine.save_world(&world)?;
            info!("Updated {} on {}", flag, id);
        }
        Command::Remove { world, id } => {
            engine.load_world(&world)?;
            let removed = engine.remove_region(&world, &id)?;
            engine.save_world(&world)?;
            info!(
                "Removed {} ({} children detached)",
                id,
                removed.detached_children.len()
            );
        }
    }
    Ok(())
}

fn pick_worlds(engine: &RegionEngine, configured: &[WorldId], requested: Vec<WorldId>) -> Result<Vec<WorldId>> {
    if requested.is_empty() {
        known_worlds(engine, configured)
    } else {
        Ok(requested)
    }
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn fail_on_errors(statuses: &[WorldStatus]) -> Result<()> {
    let failed = statuses.iter().filter(|s| !s.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} worlds failed", failed, statuses.len());
    }
    Ok(())
}

fn render_statuses(statuses: &[WorldStatus]) -> String {
    statuses
        .iter()
        .map(|s| match (&s.error, s.regions) {
            (Some(e), _) => format!("{:<20} FAILED  {}", s.world, e),
            (None, regions) => {
                let mut line = format!("{:<20} ok      {} regions", s.world, regions.unwrap_or(0));
                if let Some(v) = s.migrated_from {
                    line.push_str(&format!(", schema v{v}"));
                    line.push_str(if s.saved { " (migrated)" } else { " (needs migration)" });
                }
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_region(r: &RegionSummary) -> String {
    let mut out = format!("{} [{}] priority {}", r.id, r.shape, r.priority);
    if let Some(parent) = &r.parent {
        out.push_str(&format!("\n  parent:  {parent}"));
    }
    if !r.owners.is_empty() {
        out.push_str(&format!("\n  owners:  {}", r.owners.join(", ")));
    }
    if !r.members.is_empty() {
        out.push_str(&format!("\n  members: {}", r.members.join(", ")));
    }
    for (flag, value) in &r.flags {
        out.push_str(&format!("\n  {flag}: {value}"));
    }
    out
}

fn render_query(q: &QueryReport) -> String {
    let regions = if q.regions.is_empty() {
        "(none)".to_string()
    } else {
        q.regions.join(", ")
    };
    format!("{} at {} in {}: {}\n  regions: {}", q.flag, q.point, q.world, q.outcome, regions)
}
