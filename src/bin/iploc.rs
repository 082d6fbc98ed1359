// Copyright 2023 IPQualityScore LLC
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use iploc::{Database, Location, Variant};
use serde::Serialize;

const DEFAULT_DB: &str = "17monipdb.dat";
const DEFAULT_DBX: &str = "17monipdb.datx";

#[derive(Parser)]
#[command(name = "iploc")]
#[command(about = "Look up IPv4 addresses in 17MON geolocation databases (.dat / .datx)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive prompt: read addresses from stdin, one per line
    Query {
        #[command(flatten)]
        db: DbArgs,
    },
    /// Look up the given addresses and exit
    Locate {
        /// Read the file as an extended (.datx) database
        #[arg(short = 'x', long)]
        extended: bool,

        /// Database file
        #[arg(value_name = "DB")]
        path: PathBuf,

        /// Addresses to look up
        #[arg(value_name = "IP", required = true)]
        ips: Vec<String>,

        /// Print one JSON object per address
        #[arg(long)]
        json: bool,
    },
    /// Print every range upper bound and its description
    Dump {
        #[command(flatten)]
        db: DbArgs,

        /// Print one JSON object per record
        #[arg(long)]
        json: bool,
    },
    /// Print the decoded header of a database
    Info {
        #[command(flatten)]
        db: DbArgs,
    },
}

#[derive(Args)]
struct DbArgs {
    /// Read the file as an extended (.datx) database
    #[arg(short = 'x', long)]
    extended: bool,

    /// Database file [default: 17monipdb.dat, or 17monipdb.datx with -x]
    #[arg(value_name = "DB")]
    path: Option<PathBuf>,
}

impl DbArgs {
    fn open(&self) -> Result<Database> {
        let (path, variant) = match (&self.path, self.extended) {
            (Some(path), true) => (path.clone(), Variant::Extended),
            (Some(path), false) => (path.clone(), Variant::from_path(path)),
            (None, true) => (PathBuf::from(DEFAULT_DBX), Variant::Extended),
            (None, false) => (PathBuf::from(DEFAULT_DB), Variant::Standard),
        };
        open(&path, variant)
    }
}

fn open(path: &Path, variant: Variant) -> Result<Database> {
    Database::open(path, variant)
        .with_context(|| format!("Failed to load database: {}", path.display()))
}

#[derive(Serialize)]
struct Lookup<'a> {
    ip: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Location<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Query { db } => cmd_query(&db.open()?),
        Commands::Locate {
            extended,
            path,
            ips,
            json,
        } => {
            let db = DbArgs {
                extended,
                path: Some(path),
            };
            cmd_locate(&db.open()?, &ips, json)
        }
        Commands::Dump { db, json } => cmd_dump(&db.open()?, json),
        Commands::Info { db } => cmd_info(&db.open()?),
    }
}

fn cmd_query(db: &Database) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    writeln!(out, "Enter an IP address like 8.8.8.8 to query its location.")?;
    writeln!(out, "Enter q or quit to exit.")?;
    write!(out, ">>> ")?;
    out.flush()?;

    for line in stdin.lock().lines() {
        // lines() strips the line ending; anything else is part of the query
        let line = line?;
        let ip = line.as_str();
        if ip.is_empty() {
            write!(out, ">>> ")?;
            out.flush()?;
            continue;
        }
        if ip == "q" || ip == "quit" {
            break;
        }

        match db.locate(ip) {
            Ok(location) => writeln!(out, "{ip} -> {location}")?,
            Err(err) => {
                tracing::debug!(ip, %err, "lookup failed");
                writeln!(out, "{ip} -> no location info")?
            }
        }
        write!(out, ">>> ")?;
        out.flush()?;
    }

    writeln!(out, "\nExit loop...")?;
    Ok(())
}

fn cmd_locate(db: &Database, ips: &[String], json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    let mut failed = 0;
    for ip in ips {
        let result = db.locate(ip);
        if result.is_err() {
            failed += 1;
        }
        if json {
            let (location, error) = match result {
                Ok(location) => (Some(location), None),
                Err(err) => (None, Some(err.to_string())),
            };
            let line = serde_json::to_string(&Lookup { ip, location, error })?;
            writeln!(out, "{line}")?;
        } else {
            match result {
                Ok(location) => writeln!(out, "{ip} -> {location}")?,
                Err(err) => {
                    writeln!(out, "{ip} -> no location info")?;
                    eprintln!("{ip}: {err}");
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} lookups failed", ips.len());
    }
    Ok(())
}

fn cmd_dump(db: &Database, json: bool) -> Result<()> {
    eprintln!(
        "extended={}, index_num={}",
        u8::from(db.variant().is_extended()),
        db.index_count()
    );

    let mut out = io::BufWriter::new(io::stdout().lock());
    for (n, entry) in db.entries().enumerate() {
        let entry = entry.with_context(|| format!("Failed to read record {n}"))?;
        if json {
            serde_json::to_writer(&mut out, &entry)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{entry}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn cmd_info(db: &Database) -> Result<()> {
    println!("variant:        {:?}", db.variant());
    println!("records:        {}", db.index_count());
    println!("hint buckets:   {}", db.hint_table().len());
    println!("text offset:    {}", db.text_section_offset());
    println!("file size:      {} bytes", db.byte_len());
    Ok(())
}
