use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hrportal_store::model::{Kind, Role};
use hrportal_store::service::Status;
use hrportal_store::{Config, Portal};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overrides HRPORTAL_DATA_DIR.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Overrides HRPORTAL_SERVICE_ADDR.
    #[arg(short, long)]
    service_addr: Option<String>,

    #[arg(long)]
    force_local: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Prints one collection.
    List { kind: String },
    /// Storage usage per kind.
    Info,
    /// Writes a backup of every collection.
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// 32-byte key; seals the backup with AES-256-GCM.
        #[arg(short, long)]
        key: Option<String>,
    },
    Import {
        file: PathBuf,
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Removes every persisted collection.
    Clear,
    /// Lists accounts through the selected user service.
    Users {
        #[arg(short, long)]
        role: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Probes the user service and reports which backend serves it.
    Status,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if cli.service_addr.is_some() {
        config.service_addr = cli.service_addr;
    }
    config.force_local |= cli.force_local;

    let portal = Portal::open(&config)?;
    let repos = &portal.repos;

    match cli.command {
        Commands::List { kind } => match kind.parse::<Kind>()? {
            Kind::Employees => print_json(&repos.employees.list())?,
            Kind::Objectives => print_json(&repos.objectives.list())?,
            Kind::Trainings => print_json(&repos.trainings.list())?,
            Kind::Vacations => print_json(&repos.vacations.list())?,
            Kind::Users => print_json(&repos.users.list())?,
        },
        Commands::Info => print_json(&portal.store.info())?,
        Commands::Export { out, key } => {
            let doc = match key {
                Some(key) => portal.store.export_sealed(key.as_bytes())?,
                None => portal.store.export_all()?,
            };
            match out {
                Some(path) => fs::write(&path, doc).with_context(|| format!("writing {}", path.display()))?,
                None => println!("{}", doc),
            }
        }
        Commands::Import { file, key } => {
            let doc = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let imported = match key {
                Some(key) => portal.store.import_sealed(&doc, key.as_bytes()),
                None => portal.store.import_all(&doc),
            };
            if !imported {
                bail!("{} is not a valid backup", file.display());
            }
            println!("OK");
        }
        Commands::Clear => {
            portal.store.clear_all();
            println!("OK");
        }
        Commands::Users { role, department } => {
            let service = portal.users.get_service().await;
            let users = match (role, department) {
                (Some(role), _) => service.by_role(role.parse::<Role>()?).await?,
                (None, Some(department)) => service.by_department(&department).await?,
                (None, None) => service.list().await?,
            };
            print_json(&users)?;
        }
        Commands::Status => {
            portal.users.get_service().await;
            match portal.users.status().await {
                Status::Checked(backend) => println!("{} service: {:?}", portal.users.capability(), backend),
                Status::Unchecked => println!("{} service: unchecked", portal.users.capability()),
            }
        }
    }

    Ok(())
}
