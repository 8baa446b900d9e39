//! Command parsing.
//!
//! Translates one raw input line into exactly one [`Command`]. Resolution
//! order: active dialog captures everything (except an explicit farewell);
//! then registered verbs; then the alias table (which may bake in
//! arguments, e.g. `north` -> `go north`); then a small set of
//! sentence-pattern regexes; and finally `Unknown`.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use variantly::Variantly;

/// One fully resolved player command.
#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum Command {
    Go(String),
    Look,
    LookAt(String),
    Take(String),
    Drop(String),
    Use { item: String, target: Option<String> },
    Talk(String),
    Say(String),
    Farewell,
    Inventory,
    Quests,
    Help,
    Save(String),
    Load(String),
    Quit,
    Empty,
    Unknown(String),
}

lazy_static! {
    static ref PICK_UP_RE: Regex =
        Regex::new(r"^(?:pick|take|get)\s+up\s+(?:the\s+)?(.+)$").expect("pick-up pattern");
    static ref LOOK_AT_RE: Regex =
        Regex::new(r"^(?:look|examine|inspect)\s+at\s+(?:the\s+)?(.+)$").expect("look-at pattern");
    static ref TALK_TO_RE: Regex = Regex::new(r"^talk\s+to\s+(?:the\s+)?(.+)$").expect("talk-to pattern");
}

const FAREWELL_WORDS: &[&str] = &["goodbye", "bye", "farewell", "leave"];
const SAY_VERBS: &[&str] = &["say", "respond", "answer"];
const FILLER_WORDS: &[&str] = &["the", "a", "an", "to", "at", "up", "in"];

const DEFAULT_SLOT: &str = "quick";

/// Verb and alias tables, built once and injected into the shell.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    aliases: HashMap<String, String>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CommandRegistry {
    /// The standard alias table.
    pub fn standard() -> Self {
        let mut registry = Self {
            aliases: HashMap::new(),
        };
        registry.alias("move", "go");
        registry.alias("walk", "go");
        for dir in ["north", "south", "east", "west"] {
            registry.alias(dir, &format!("go {dir}"));
            registry.alias(&dir[..1], &format!("go {dir}"));
        }
        registry.alias("examine", "look");
        registry.alias("inspect", "look");
        registry.alias("l", "look");
        registry.alias("x", "look");
        registry.alias("get", "take");
        registry.alias("pickup", "take");
        registry.alias("speak", "talk");
        registry.alias("respond", "say");
        registry.alias("answer", "say");
        registry.alias("i", "inventory");
        registry.alias("inv", "inventory");
        registry.alias("q", "quests");
        registry.alias("exit", "quit");
        registry
    }

    /// Map a shorthand to a canonical verb, optionally with baked-in args.
    pub fn alias(&mut self, alias: &str, expansion: &str) {
        self.aliases.insert(alias.to_lowercase(), expansion.to_lowercase());
    }

    /// Parse one line of input into a command.
    pub fn parse(&self, input: &str, in_dialog: bool) -> Command {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        let lower = trimmed.to_lowercase();
        let tokens: Vec<&str> = lower.split_whitespace().collect();

        // a live conversation captures all input until it ends or the
        // player says goodbye
        if in_dialog {
            if tokens.len() == 1 && FAREWELL_WORDS.contains(&tokens[0]) {
                return Command::Farewell;
            }
            if SAY_VERBS.contains(&tokens[0]) && tokens.len() > 1 {
                return Command::Say(tokens[1..].join(" "));
            }
            return Command::Say(lower);
        }

        let (verb, args) = (tokens[0], &tokens[1..]);
        if let Some(command) = build_command(verb, args) {
            return command;
        }

        if let Some(expansion) = self.aliases.get(verb) {
            let mut merged: Vec<&str> = expansion.split_whitespace().collect();
            merged.extend_from_slice(args);
            if let Some(command) = build_command(merged[0], &merged[1..]) {
                return command;
            }
        }

        if let Some(caps) = PICK_UP_RE.captures(&lower) {
            return Command::Take(caps[1].to_string());
        }
        if let Some(caps) = LOOK_AT_RE.captures(&lower) {
            return Command::LookAt(caps[1].to_string());
        }
        if let Some(caps) = TALK_TO_RE.captures(&lower) {
            return Command::Talk(caps[1].to_string());
        }

        Command::Unknown(trimmed.to_string())
    }
}

/// Build a command for a registered verb, or `None` if the verb is not
/// part of the command set.
fn build_command(verb: &str, args: &[&str]) -> Option<Command> {
    let command = match verb {
        "go" => Command::Go(noun_phrase(args)),
        "look" => {
            if args.is_empty() {
                Command::Look
            } else {
                Command::LookAt(noun_phrase(args))
            }
        },
        "take" => Command::Take(noun_phrase(args)),
        "drop" => Command::Drop(noun_phrase(args)),
        "use" => parse_use(args),
        "talk" => Command::Talk(noun_phrase(args)),
        "say" => Command::Say(args.join(" ")),
        "inventory" => Command::Inventory,
        "quests" => Command::Quests,
        "help" => Command::Help,
        "save" => Command::Save(args.first().map_or(DEFAULT_SLOT, |s| *s).to_string()),
        "load" => Command::Load(args.first().map_or(DEFAULT_SLOT, |s| *s).to_string()),
        "quit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// `use X` or `use X on/with Y`.
fn parse_use(args: &[&str]) -> Command {
    let split = args
        .iter()
        .position(|word| *word == "on" || *word == "with")
        .filter(|&i| i > 0 && i + 1 < args.len());
    match split {
        Some(i) => Command::Use {
            item: noun_phrase(&args[..i]),
            target: Some(noun_phrase(&args[i + 1..])),
        },
        None => Command::Use {
            item: noun_phrase(args),
            target: None,
        },
    }
}

/// Join argument tokens into a noun phrase, dropping leading filler words.
fn noun_phrase(args: &[&str]) -> String {
    let mut words = args;
    while let Some((first, rest)) = words.split_first() {
        if FILLER_WORDS.contains(first) && !rest.is_empty() {
            words = rest;
        } else {
            break;
        }
    }
    words.join(" ")
}
