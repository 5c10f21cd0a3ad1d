//! Benzene demo CLI.
//!
//! - `benzene-demo` - play a short scripted game and report connections
//! - `benzene-demo stats` - build from scratch on an empty board and print
//!   the resulting build statistics

use anyhow::Context;
use clap::{Parser, Subcommand};

use benzene::cell::{cell_at, Color};
use benzene::engine::VcEngine;
use benzene::env::BenzeneEnv;
use benzene::player::GameState;

#[derive(Parser)]
#[command(name = "benzene-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build from scratch on an empty board and print statistics
    Stats,
    /// Play a short scripted game and report on terminal connections
    Demo,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Stats) => run_stats(),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_stats() -> anyhow::Result<()> {
    let env = BenzeneEnv::new();
    let engine = VcEngine::new(&env);
    println!("Black: {}", engine.stats(Color::Black));
    println!("White: {}", engine.stats(Color::White));
    Ok(())
}

fn run_demo() -> anyhow::Result<()> {
    println!("Benzene: a Hex virtual-connection engine\n");

    let env = BenzeneEnv::new();
    let mut engine = VcEngine::new(&env);

    let moves = [
        (Color::Black, cell_at(3, 2)),
        (Color::White, cell_at(5, 3)),
        (Color::Black, cell_at(3, 3)),
        (Color::White, cell_at(4, 5)),
    ];

    for (color, cell) in moves {
        engine
            .execute_move(color, cell)
            .with_context(|| format!("playing {color:?} at {cell}"))?;
        log::info!("played {color:?} at {cell}");
    }

    println!("Black connected:  {}", engine.has_winning_connection(Color::Black));
    println!("White connected:  {}", engine.has_winning_connection(Color::White));
    println!("Terminal:         {}", engine.is_terminal());
    println!("Black build stats: {}", engine.stats(Color::Black));
    println!("White build stats: {}", engine.stats(Color::White));

    Ok(())
}
