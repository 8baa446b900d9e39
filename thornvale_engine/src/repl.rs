//! The read-eval-print shell.
//!
//! The shell owns nothing but presentation: it reads a line, hands it to
//! the injected [`CommandRegistry`], resolves noun phrases against the
//! engine's visible candidate sets, invokes exactly one engine operation,
//! and renders whatever the operation appended to the game log.

pub mod input;

use anyhow::Result;
use log::{info, warn};
use textwrap::{fill, termwidth};

use crate::engine::GameEngine;
use crate::parser::{Command, CommandRegistry};
use crate::save;
use crate::search::{SearchScope, find_target};
use crate::style::GameStyle;

use input::{InputEvent, InputManager};

/// Control flow signal used by handlers to exit the loop.
pub enum ReplControl {
    Continue,
    Quit,
}

const HELP_TEXT: &str = "\
Available commands:
- go/move/walk [direction or location]: move somewhere connected
- look [target]: look around, or examine something specific
- take/get [item]: pick up an item
- drop [item]: drop an item from your inventory
- use [item] (on/with [target]): use an item, optionally on a target
- talk/speak [character]: start a conversation
- say [number or text]: choose a dialog response (goodbye to leave)
- inventory (i, inv): list what you are carrying
- quests (q): list your active quests
- save/load [slot]: snapshot the game, or restore one
- help: show this text
- quit: leave the game";

/// Run the shell until the player quits.
///
/// # Errors
/// Propagates input failures from the plain stdin backend; everything the
/// player can do wrong is handled as a log line, not an error.
pub fn run_repl(engine: &mut GameEngine, registry: &CommandRegistry) -> Result<()> {
    let mut input_manager = InputManager::new();
    let mut rendered = 0;
    render_new_log(engine, &mut rendered);

    loop {
        let here = engine.world().name_of(&engine.state().current_location).to_string();
        let prompt = format!("\n[{here}]>> ").prompt_style().to_string();

        let event = input_manager.read_line(&prompt)?;
        let line = match event {
            InputEvent::Line(line) => line,
            InputEvent::Eof => {
                engine.append_log("Thanks for playing!");
                render_new_log(engine, &mut rendered);
                info!("input closed; exiting");
                break;
            },
            InputEvent::Interrupted => {
                println!("{}", "Command canceled.".error_style());
                continue;
            },
        };

        let command = registry.parse(&line, engine.state().in_dialog());
        let control = dispatch(engine, &command);
        render_new_log(engine, &mut rendered);
        if let ReplControl::Quit = control {
            break;
        }
    }
    Ok(())
}

/// Route one parsed command to its engine operation.
pub fn dispatch(engine: &mut GameEngine, command: &Command) -> ReplControl {
    match command {
        Command::Go(phrase) => go_handler(engine, phrase),
        Command::Look => {
            engine.look_around();
        },
        Command::LookAt(phrase) => look_at_handler(engine, phrase),
        Command::Take(phrase) => take_handler(engine, phrase),
        Command::Drop(phrase) => drop_handler(engine, phrase),
        Command::Use { item, target } => use_handler(engine, item, target.as_deref()),
        Command::Talk(phrase) => talk_handler(engine, phrase),
        Command::Say(text) => say_handler(engine, text),
        Command::Farewell => {
            engine.end_conversation();
        },
        Command::Inventory => {
            engine.inventory_list();
        },
        Command::Quests => {
            engine.quest_list();
        },
        Command::Help => engine.append_log(HELP_TEXT),
        Command::Save(slot) => save_handler(engine, slot),
        Command::Load(slot) => load_handler(engine, slot),
        Command::Quit => {
            engine.append_log("Thanks for playing!");
            info!("player quit");
            return ReplControl::Quit;
        },
        Command::Empty => engine.append_log("Type a command, or 'help' for a list of commands."),
        Command::Unknown(raw) => {
            engine.append_log(format!("I don't understand '{raw}'. Type 'help' for a list of commands."));
        },
    }
    ReplControl::Continue
}

fn go_handler(engine: &mut GameEngine, phrase: &str) {
    if phrase.is_empty() {
        engine.append_log("Go where? Try 'go north' or name a location.");
        return;
    }
    match find_target(engine, phrase, &[SearchScope::Exits]) {
        Ok(node) => {
            let id = node.id.clone();
            engine.move_to_location(&id);
        },
        Err(_) => engine.append_log(format!("You can't go to {phrase} from here.")),
    }
}

fn look_at_handler(engine: &mut GameEngine, phrase: &str) {
    let scopes = [
        SearchScope::Inventory,
        SearchScope::RoomItems,
        SearchScope::RoomCharacters,
        SearchScope::RoomObjects,
    ];
    match find_target(engine, phrase, &scopes) {
        Ok(node) => {
            let id = node.id.clone();
            engine.examine(&id);
        },
        Err(_) => engine.append_log(format!("You don't see {phrase} here.")),
    }
}

fn take_handler(engine: &mut GameEngine, phrase: &str) {
    if phrase.is_empty() {
        engine.append_log("Take what?");
        return;
    }
    match find_target(engine, phrase, &[SearchScope::RoomItems]) {
        Ok(node) => {
            let id = node.id.clone();
            engine.take_item(&id);
        },
        Err(_) => engine.append_log(format!("You don't see {phrase} here.")),
    }
}

fn drop_handler(engine: &mut GameEngine, phrase: &str) {
    if phrase.is_empty() {
        engine.append_log("Drop what?");
        return;
    }
    match find_target(engine, phrase, &[SearchScope::Inventory]) {
        Ok(node) => {
            let id = node.id.clone();
            engine.drop_item(&id);
        },
        Err(_) => engine.append_log(format!("You don't have {phrase}.")),
    }
}

fn use_handler(engine: &mut GameEngine, item_phrase: &str, target_phrase: Option<&str>) {
    if item_phrase.is_empty() {
        engine.append_log("Use what?");
        return;
    }
    let item_id = match find_target(engine, item_phrase, &[SearchScope::Inventory]) {
        Ok(node) => node.id.clone(),
        Err(_) => {
            engine.append_log(format!("You don't have {item_phrase}."));
            return;
        },
    };
    let Some(target_phrase) = target_phrase else {
        engine.use_item(&item_id, None);
        return;
    };
    let scopes = [
        SearchScope::RoomItems,
        SearchScope::RoomCharacters,
        SearchScope::RoomObjects,
    ];
    match find_target(engine, target_phrase, &scopes) {
        Ok(node) => {
            let target_id = node.id.clone();
            engine.use_item(&item_id, Some(&target_id));
        },
        Err(_) => engine.append_log(format!("You don't see {target_phrase} here.")),
    }
}

fn talk_handler(engine: &mut GameEngine, phrase: &str) {
    if phrase.is_empty() {
        engine.append_log("Talk to whom?");
        return;
    }
    match find_target(engine, phrase, &[SearchScope::RoomCharacters]) {
        Ok(node) => {
            let id = node.id.clone();
            engine.talk_to(&id);
        },
        Err(_) => engine.append_log(format!("You don't see {phrase} here.")),
    }
}

fn say_handler(engine: &mut GameEngine, text: &str) {
    if text.trim().is_empty() {
        engine.append_log("Say what?");
        return;
    }
    engine.respond_to_dialog(text);
}

fn save_handler(engine: &mut GameEngine, slot: &str) {
    let snapshot = match engine.save_game() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("failed to serialize game state: {err:#}");
            engine.append_log("Failed to save the game.");
            return;
        },
    };
    match save::write_snapshot(slot, &snapshot) {
        Ok(_) => engine.append_log(format!("Game saved as {}.", save::sanitize_slot(slot))),
        Err(err) => {
            warn!("failed to write save file: {err:#}");
            engine.append_log("Failed to save the game.");
        },
    }
}

fn load_handler(engine: &mut GameEngine, slot: &str) {
    match save::read_snapshot(slot) {
        Ok(snapshot) => {
            engine.load_game(&snapshot);
        },
        Err(err) => {
            warn!("failed to read save file: {err:#}");
            let known = save::list_slots();
            if known.is_empty() {
                engine.append_log(format!("No save named {slot} found."));
            } else {
                engine.append_log(format!("No save named {slot} found. Saved games: {}", known.join(", ")));
            }
        },
    }
}

/// Print any log lines appended since the last render, wrapped to the
/// terminal.
fn render_new_log(engine: &GameEngine, rendered: &mut usize) {
    let log = &engine.state().game_log;
    // a restored snapshot replaces the whole log; show just its tail
    if *rendered > log.len() {
        *rendered = log.len().saturating_sub(1);
    }
    let width = termwidth().clamp(40, 100);
    for entry in &log[*rendered..] {
        for line in entry.split('\n') {
            println!("{}", fill(line, width).description_style());
        }
    }
    *rendered = log.len();
}
