use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{apply_overrides, load_settings},
    view::format_probability,
    HttpSimulationClient, SimulationQuery, SimulationView, TriggerOutcome,
};
use shared::domain::Winner;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "redline", about = "Championship simulation odds from the Redline API")]
struct Args {
    /// API base URL; overrides REDLINE_API_BASE_URL and the config file.
    #[arg(long)]
    api_base_url: Option<String>,
    /// TOML config file (defaults to ./redline.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print views as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Read commands from stdin: `s` simulate, `r` reset, `q` quit.
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = apply_overrides(
        load_settings(args.config.as_deref())?,
        args.api_base_url,
        args.timeout_secs,
    )?;

    let client = HttpSimulationClient::new(&settings)
        .context("failed to configure the simulation client")?;
    let query = SimulationQuery::new(Arc::new(client));

    if args.interactive {
        run_interactive(query, args.json).await?;
        return Ok(ExitCode::SUCCESS);
    }

    query.trigger();
    let view = SimulationView::from_state(&query.settled().await);
    print_view(&view, args.json)?;

    Ok(match view {
        SimulationView::ConnectivityError => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

async fn run_interactive(query: Arc<SimulationQuery>, json: bool) -> Result<()> {
    let mut updates = query.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = SimulationView::from_state(&updates.borrow_and_update());
            if let Err(err) = print_view(&view, json) {
                warn!(error = %err, "failed to render simulation view");
            }
        }
    });

    print_view(&SimulationView::Idle, json)?;
    println!("commands: [s]imulate, [r]eset, [q]uit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "s" | "simulate" => {
                if query.trigger() == TriggerOutcome::AlreadyPending {
                    println!("A simulation is already running.");
                }
            }
            "r" | "reset" => query.reset(),
            "q" | "quit" => break,
            "" => {}
            other => println!("unknown command '{other}'"),
        }
    }

    renderer.abort();
    Ok(())
}

fn print_view(view: &SimulationView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    println!("{}", view.headline());
    if let SimulationView::Standings(standings) = view {
        if let Winner::Driver(_) = standings.winner {
            println!(
                "  artwork: {} (helmet: {})",
                standings.asset.main, standings.asset.helmet
            );
        }
        println!();
        println!("Championship Odds");
        for entry in &standings.entries {
            println!(
                "{:>3}  {:<28} {:>8}",
                entry.rank,
                entry.driver,
                format_probability(entry.probability)
            );
        }
    }
    Ok(())
}
