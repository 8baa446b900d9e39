#![allow(dead_code)]

use std::path::Path;

use thornvale_engine::parser::CommandRegistry;
use thornvale_engine::repl::dispatch;
use thornvale_engine::{GameConfig, GameEngine, loader};

/// Engine over the shipped world tables, initialized at the town square
/// with the medallion quest auto-started.
pub fn medallion_engine() -> GameEngine {
    let tables = loader::load_tables(Path::new("data")).expect("shipped world data loads");
    let mut engine = GameEngine::new(tables, GameConfig::default());
    engine.initialize("loc_1");
    engine
}

/// Push one line of player input through parse and dispatch.
pub fn run(engine: &mut GameEngine, registry: &CommandRegistry, line: &str) {
    let command = registry.parse(line, engine.state().in_dialog());
    dispatch(engine, &command);
}
