use std::io::Read;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rekey_core::{record, FieldPolicy, KeySelector, ProjectOptions, ValueSelector};
use rekey_project::Projector;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "rekeyctl", version, about = "Key, group and flatten JSON records")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Json)]
    output: Output,

    /// Fail when a selected field is missing instead of reading null
    #[arg(long = "strict", global = true, action = ArgAction::SetTrue)]
    strict: bool,

    /// Field that holds scalar values when records are rebuilt
    #[arg(long = "value-field", global = true)]
    value_field: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Args, Debug)]
struct Selection {
    /// Field to key by (or to restore the key under)
    #[arg(long = "key", short = 'k')]
    key: String,
    /// Store a single field instead of the whole record
    #[arg(long = "value", conflicts_with = "fields")]
    value: Option<String>,
    /// Store a sub-record of these fields, e.g. "name,age"
    #[arg(long = "fields", value_delimiter = ',')]
    fields: Vec<String>,
    /// Input file; stdin when absent or "-"
    input: Option<String>,
}

impl Selection {
    fn value_selector(&self) -> ValueSelector {
        if let Some(name) = &self.value {
            ValueSelector::field(name.as_str())
        } else if !self.fields.is_empty() {
            ValueSelector::fields(self.fields.iter().map(String::as_str))
        } else {
            ValueSelector::Whole
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Array of records -> one value per key (last record wins)
    Map {
        #[command(flatten)]
        sel: Selection,
        /// Emit a keyed object (string keys) instead of an ordered entry list
        #[arg(long = "object", action = ArgAction::SetTrue)]
        object: bool,
    },
    /// Array of records -> list of values per key
    Group {
        #[command(flatten)]
        sel: Selection,
        /// Emit a keyed object (string keys) instead of an ordered entry list
        #[arg(long = "object", action = ArgAction::SetTrue)]
        object: bool,
    },
    /// Keyed object or `map`/`group` entry list -> array of records
    Unmap {
        #[command(flatten)]
        sel: Selection,
        /// Input values are arrays (output of `group`)
        #[arg(long = "grouped", action = ArgAction::SetTrue)]
        grouped: bool,
    },
    /// Field names and values of the first record
    Fields {
        /// Input file; stdin when absent or "-"
        input: Option<String>,
    },
}

/// Ordered-mapping output: keys keep their JSON type.
#[derive(Serialize)]
struct Entry<'a, V: Serialize> {
    key: &'a rekey_core::Key,
    value: &'a V,
}

fn init_tracing() {
    let env = std::env::var("REKEY_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn read_input(path: Option<&str>) -> Result<Value> {
    let mut buf = String::new();
    match path {
        None | Some("-") => {
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        }
        Some(p) => {
            buf = std::fs::read_to_string(p).with_context(|| format!("reading {}", p))?;
        }
    }
    serde_json::from_str(&buf).context("parsing JSON input")
}

fn options(cli: &Cli) -> ProjectOptions {
    let mut opts = ProjectOptions::from_env();
    if cli.strict { opts.field_policy = FieldPolicy::Strict; }
    if let Some(v) = &cli.value_field { opts.value_field = v.clone(); }
    opts
}

fn print_json<T: Serialize + ?Sized>(v: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}

fn print_pairs<'a, K, V>(pairs: impl Iterator<Item = (K, &'a V)>) -> Result<()>
where
    K: std::fmt::Display,
    V: Serialize + 'a,
{
    for (k, v) in pairs {
        println!("{:<16} → {}", k, serde_json::to_string(v)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let projector = Projector::new(options(&cli));
    debug!(options = ?projector.options(), "projector configured");

    match &cli.command {
        Commands::Map { sel, object } => {
            let doc = read_input(sel.input.as_deref())?;
            let key = KeySelector::field(sel.key.as_str());
            let value = sel.value_selector();
            info!(key = %sel.key, value = ?value, object, "map invoked");
            if *object {
                let m = projector.to_object_value(&doc, &key, &value)?;
                match cli.output {
                    Output::Human => print_pairs(m.iter())?,
                    Output::Json => print_json(&m)?,
                }
            } else {
                let m = projector.to_map_value(&doc, &key, &value)?;
                match cli.output {
                    Output::Human => print_pairs(m.iter())?,
                    Output::Json => {
                        let entries: Vec<_> = m.iter().map(|(key, value)| Entry { key, value }).collect();
                        print_json(&entries)?
                    }
                }
            }
        }
        Commands::Group { sel, object } => {
            let doc = read_input(sel.input.as_deref())?;
            let key = KeySelector::field(sel.key.as_str());
            let value = sel.value_selector();
            info!(key = %sel.key, value = ?value, object, "group invoked");
            if *object {
                let m = projector.group_object_value(&doc, &key, &value)?;
                match cli.output {
                    Output::Human => print_pairs(m.iter())?,
                    Output::Json => print_json(&m)?,
                }
            } else {
                let m = projector.group_map_value(&doc, &key, &value)?;
                match cli.output {
                    Output::Human => print_pairs(m.iter())?,
                    Output::Json => {
                        let entries: Vec<_> = m.iter().map(|(key, value)| Entry { key, value }).collect();
                        print_json(&entries)?
                    }
                }
            }
        }
        Commands::Unmap { sel, grouped } => {
            let doc = read_input(sel.input.as_deref())?;
            let value = sel.value_selector();
            info!(key = %sel.key, value = ?value, grouped, "unmap invoked");
            let rows = if *grouped {
                projector.ungroup_value(&doc, &sel.key, &value)?
            } else {
                projector.unmap_value(&doc, &sel.key, &value)?
            };
            match cli.output {
                Output::Human => {
                    for r in &rows { println!("{}", r); }
                }
                Output::Json => print_json(&rows)?,
            }
        }
        Commands::Fields { input } => {
            let doc = read_input(input.as_deref())?;
            let first = rekey_project::sequence(&doc)?.first().cloned().unwrap_or(Value::Null);
            match cli.output {
                Output::Human => print_pairs(record::entries(&first).into_iter())?,
                Output::Json => print_json(&record::keys(&first))?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn map_json_output_pipes_into_unmap() {
        let projector = Projector::default();
        let doc = serde_json::json!([{"id": 1, "n": "a"}, {"id": 2.5, "n": "b"}]);
        let m = projector.to_map_value(&doc, &KeySelector::field("id"), &ValueSelector::Whole).unwrap();
        let entries: Vec<_> = m.iter().map(|(key, value)| Entry { key, value }).collect();
        let printed: Value = serde_json::from_str(&serde_json::to_string_pretty(&entries).unwrap()).unwrap();
        let back = projector.unmap_value(&printed, "id", &ValueSelector::Whole).unwrap();
        assert_eq!(Value::Array(back), doc);

        let g = projector.group_map_value(&doc, &KeySelector::field("n"), &ValueSelector::field("id")).unwrap();
        let entries: Vec<_> = g.iter().map(|(key, value)| Entry { key, value }).collect();
        let printed = serde_json::to_value(&entries).unwrap();
        let back = projector.ungroup_value(&printed, "n", &ValueSelector::field("id")).unwrap();
        assert_eq!(back, vec![serde_json::json!({"n": "a", "id": 1}), serde_json::json!({"n": "b", "id": 2.5})]);
    }

    #[test]
    fn selection_picks_value_selector() {
        let cli = Cli::parse_from(["rekeyctl", "map", "--key", "id", "--fields", "name,age"]);
        match cli.command {
            Commands::Map { sel, object } => {
                assert!(!object);
                assert!(matches!(sel.value_selector(), ValueSelector::Fields(ref f) if f.as_slice() == ["name", "age"]));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["rekeyctl", "--strict", "group", "-k", "id", "--value", "name", "in.json"]);
        assert!(options(&cli).is_strict());
        match cli.command {
            Commands::Group { sel, .. } => {
                assert!(matches!(sel.value_selector(), ValueSelector::Field(ref f) if f == "name"));
                assert_eq!(sel.input.as_deref(), Some("in.json"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
