use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{self, Config, ConfigError};
use crate::key_normalizer::clean_key;
use crate::logging;
use crate::model::{PrefEntry, ValueType};
use crate::pref_index::{IndexError, PreferenceIndex};
use crate::registry_store::RegistryStore;
use crate::store::PreferenceStore;
use crate::transport;

const USAGE: &str = "usage: prefview-core [--config <path>] <command>

commands:
  list [--search <text>] [--raw] [--json]   show stored preferences
  add <key> <string|int|float> <value>      store a new preference
  edit <raw-key> <string|int|float> <value> [--as <key>]
                                            replace a preference (stored under its clean key)
  delete <raw-key>                          remove one preference
  delete-all --yes                          remove every preference
  serve                                     answer JSON requests on stdin, one per line
  config                                    show (and create) the config file

arguments after -- are always read as values";

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Index(IndexError),
    Io(std::io::Error),
    Encode(String),
    Usage(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Index(error) => write!(f, "{error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Encode(error) => write!(f, "encode error: {error}"),
            Self::Usage(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<IndexError> for RuntimeError {
    fn from(value: IndexError) -> Self {
        Self::Index(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        query: String,
        show_raw_keys: Option<bool>,
        json: bool,
    },
    Add {
        key: String,
        value_type: ValueType,
        value: String,
    },
    Edit {
        raw_key: String,
        clean_key: Option<String>,
        value_type: ValueType,
        value: String,
    },
    Delete {
        raw_key: String,
    },
    DeleteAll {
        confirmed: bool,
    },
    Serve,
    Config,
    Help,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::DeleteAll { .. } => "delete-all",
            Self::Serve => "serve",
            Self::Config => "config",
            Self::Help => "help",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, Default)]
struct Flags {
    search: Option<String>,
    raw: bool,
    json: bool,
    yes: bool,
    clean_as: Option<String>,
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, String> {
    let mut config_path = None;
    let mut flags = Flags::default();
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--" => {
                positional.extend(iter.by_ref().cloned());
                break;
            }
            // A short option in a slot the command still needs is a value, such as `-h`.
            short if short.len() == 2 && awaiting_argument(&positional) => {
                positional.push(short.to_string())
            }
            "--config" => config_path = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--search" | "-s" => flags.search = Some(flag_value(&mut iter, arg)?),
            "--as" => flags.clean_as = Some(flag_value(&mut iter, arg)?),
            "--raw" => flags.raw = true,
            "--json" => flags.json = true,
            "--yes" | "-y" => flags.yes = true,
            "--help" | "-h" => {
                return Ok(CliOptions {
                    config_path,
                    command: Command::Help,
                })
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'")),
            _ => positional.push(arg.clone()),
        }
    }

    let command = parse_command(&positional, flags)?;
    Ok(CliOptions {
        config_path,
        command,
    })
}

fn awaiting_argument(positional: &[String]) -> bool {
    let Some(name) = positional.first() else {
        return false;
    };
    let arity = match name.as_str() {
        "add" | "edit" => 3,
        "delete" | "rm" => 1,
        _ => 0,
    };
    positional.len() <= arity
}

fn flag_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("flag '{flag}' requires a value"))
}

fn parse_command(positional: &[String], flags: Flags) -> Result<Command, String> {
    let Some((name, rest)) = positional.split_first() else {
        return Ok(Command::List {
            query: flags.search.unwrap_or_default(),
            show_raw_keys: flags.raw.then_some(true),
            json: flags.json,
        });
    };

    let command = match name.as_str() {
        "list" => {
            expect_arity(name, rest, 0)?;
            Command::List {
                query: flags.search.unwrap_or_default(),
                show_raw_keys: flags.raw.then_some(true),
                json: flags.json,
            }
        }
        "add" => {
            expect_arity(name, rest, 3)?;
            Command::Add {
                key: rest[0].clone(),
                value_type: rest[1].parse()?,
                value: rest[2].clone(),
            }
        }
        "edit" => {
            expect_arity(name, rest, 3)?;
            Command::Edit {
                raw_key: rest[0].clone(),
                clean_key: flags.clean_as,
                value_type: rest[1].parse()?,
                value: rest[2].clone(),
            }
        }
        "delete" | "rm" => {
            expect_arity(name, rest, 1)?;
            Command::Delete {
                raw_key: rest[0].clone(),
            }
        }
        "delete-all" => {
            expect_arity(name, rest, 0)?;
            Command::DeleteAll { confirmed: flags.yes }
        }
        "serve" => {
            expect_arity(name, rest, 0)?;
            Command::Serve
        }
        "config" => {
            expect_arity(name, rest, 0)?;
            Command::Config
        }
        "help" => Command::Help,
        other => return Err(format!("unknown command '{other}'\n\n{USAGE}")),
    };

    Ok(command)
}

fn expect_arity(name: &str, rest: &[String], expected: usize) -> Result<(), String> {
    if rest.len() == expected {
        return Ok(());
    }
    Err(format!(
        "'{name}' expects {expected} argument(s), got {}\n\n{USAGE}",
        rest.len()
    ))
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    if options.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    if let Err(error) = logging::init() {
        eprintln!("[prefview-core] file logging disabled: {error}");
    }

    let config = config::load(options.config_path.as_deref())?;
    let store = RegistryStore::from_config(&config);
    logging::info(&format!(
        "startup command={} subkey={} config_path={}",
        options.command.name(),
        store.subkey(),
        config.config_path.display(),
    ));

    let mut index = PreferenceIndex::with_strategy(store, config.probe_strategy);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match options.command {
        Command::Serve => {
            let stdin = std::io::stdin();
            let handled = serve(&mut index, stdin.lock(), &mut out)?;
            logging::info(&format!("serve finished requests={handled}"));
            Ok(())
        }
        command => run_command(&mut index, &config, &command, &mut out),
    }
}

/// Runs one command against `index`, writing user-facing output to `out`.
pub fn run_command<S, W>(
    index: &mut PreferenceIndex<S>,
    config: &Config,
    command: &Command,
    out: &mut W,
) -> Result<(), RuntimeError>
where
    S: PreferenceStore,
    W: Write,
{
    match command {
        Command::List {
            query,
            show_raw_keys,
            json,
        } => {
            let show_raw_keys = show_raw_keys.unwrap_or(config.show_raw_keys);
            let entries = index.refresh(query, show_raw_keys)?;
            if *json {
                let encoded = serde_json::to_string_pretty(entries)
                    .map_err(|e| RuntimeError::Encode(e.to_string()))?;
                writeln!(out, "{encoded}")?;
            } else if entries.is_empty() {
                writeln!(out, "No preferences found")?;
            } else {
                write!(out, "{}", format_table(entries))?;
            }
            if !index.enumeration_supported() {
                writeln!(
                    out,
                    "[prefview-core] preference enumeration is not supported on this platform"
                )?;
            }
        }
        Command::Add {
            key,
            value_type,
            value,
        } => {
            index.add(key, *value_type, value)?;
            logging::info(&format!("added key={key} type={value_type}"));
            writeln!(out, "added '{key}' ({value_type})")?;
        }
        Command::Edit {
            raw_key,
            clean_key: clean_override,
            value_type,
            value,
        } => {
            let clean = clean_override
                .clone()
                .unwrap_or_else(|| clean_key(raw_key));
            let result = index.edit(raw_key, &clean, *value_type, value);
            if let Err(IndexError::InvalidValue { .. }) = &result {
                logging::warn(&format!(
                    "edit of {raw_key} removed the old value but the new one was rejected"
                ));
            }
            result?;
            logging::info(&format!("edited raw_key={raw_key} key={clean} type={value_type}"));
            writeln!(out, "updated '{clean}' ({value_type})")?;
        }
        Command::Delete { raw_key } => {
            index.delete(raw_key)?;
            logging::info(&format!("deleted raw_key={raw_key}"));
            writeln!(out, "deleted '{}'", clean_key(raw_key))?;
        }
        Command::DeleteAll { confirmed } => {
            if !confirmed {
                return Err(RuntimeError::Usage(
                    "refusing to delete all preferences without --yes".to_string(),
                ));
            }
            index.delete_all()?;
            logging::info("deleted all preferences");
            writeln!(out, "deleted all preferences")?;
        }
        Command::Config => {
            if !config.config_path.exists() {
                config::save(config)?;
                writeln!(
                    out,
                    "[prefview-core] wrote default config to {}",
                    config.config_path.display()
                )?;
            }
            writeln!(out, "config_path={}", config.config_path.display())?;
            writeln!(out, "registry_subkey={}", config.registry_subkey())?;
            writeln!(out, "probe_strategy={:?}", config.probe_strategy)?;
            if let Some(path) = logging::log_path() {
                writeln!(out, "log_path={}", path.display())?;
            }
        }
        Command::Serve => {
            return Err(RuntimeError::Usage(
                "serve reads from stdin; run it through run_with_options".to_string(),
            ))
        }
        Command::Help => writeln!(out, "{USAGE}")?,
    }

    Ok(())
}

/// Answers one JSON request per input line, in order, until input ends.
pub fn serve<S, R, W>(
    index: &mut PreferenceIndex<S>,
    mut input: R,
    output: &mut W,
) -> Result<usize, RuntimeError>
where
    S: PreferenceStore,
    R: BufRead,
    W: Write,
{
    let mut handled = 0_usize;
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&line) {
            Ok(text) => {
                let payload = text.trim();
                if payload.is_empty() {
                    continue;
                }
                transport::handle_json(index, payload)
            }
            Err(error) => transport::reject_json(&format!("request is not valid UTF-8: {error}")),
        };
        writeln!(output, "{response}")?;
        output.flush()?;
        handled += 1;
    }
    Ok(handled)
}

pub fn format_table(entries: &[PrefEntry]) -> String {
    let key_width = column_width("Key", entries.iter().map(|e| e.display_key.as_str()));
    let type_width = column_width("Type", entries.iter().map(|e| e.value_type.label()));

    let mut table = format!("{:<key_width$}  {:<type_width$}  Value\n", "Key", "Type");
    for entry in entries {
        table.push_str(&format!(
            "{:<key_width$}  {:<type_width$}  {}\n",
            entry.display_key,
            entry.value_type.label(),
            entry.value
        ));
    }
    table
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}
