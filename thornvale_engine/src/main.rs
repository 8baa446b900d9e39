#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Thornvale **
//! Text-adventure engine and shell

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use log::info;

use thornvale_engine::config::load_config;
use thornvale_engine::parser::CommandRegistry;
use thornvale_engine::style::GameStyle;
use thornvale_engine::{GameEngine, loader, run_repl};

fn main() -> Result<()> {
    env_logger::init();
    let config = load_config(Path::new("thornvale.toml"));

    info!("Start: loading Thornvale world tables...");
    let tables = loader::load_tables_or_empty(&config.data_dir);
    let mut engine = GameEngine::new(tables, config.clone());

    // clear the screen
    print!("\x1B[2J\x1B[H");
    std::io::stdout().flush()?;
    info!("Starting the game!");

    println!("{:^84}", "THORNVALE: THE MEDALLION OF EMBERWOOD".banner_style().underline());
    println!(
        "\nYou are {}, a traveler with an eye for trouble.\n",
        config.player_name.bold().bright_blue()
    );
    if let Ok(introduction) = fs::read_to_string(config.data_dir.join("intro.txt")) {
        println!("{}", introduction.description_style());
    }

    engine.initialize(&config.start_location);

    let registry = CommandRegistry::standard();
    run_repl(&mut engine, &registry)
}
