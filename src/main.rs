//! CLI for wpconf: get, set, replace, and batch-apply `define()`
//! directives in PHP configuration files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use wpconf::{DefineEditor, Error, Value};

#[derive(Parser)]
#[command(name = "wpconf", about = "Edit define() directives in PHP configuration files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every directive in a TOML table, then save once
    Apply {
        /// PHP configuration file to edit
        file: PathBuf,
        /// TOML file of `NAME = value` pairs
        changes: PathBuf,
    },
    /// Print the value of a directive
    Get {
        /// PHP configuration file to read
        file: PathBuf,
        /// Constant name, e.g. WP_DEBUG
        name: String,
        /// Fallback printed when the directive is absent
        #[arg(long)]
        default: Option<String>,
        /// Print as JSON instead of PHP-ish text
        #[arg(long)]
        json: bool,
    },
    /// Replace a directive's value only where it already exists
    Replace {
        /// PHP configuration file to edit
        file: PathBuf,
        /// Constant name
        name: String,
        /// New value
        value: String,
        /// How to interpret the value argument
        #[arg(long = "as", value_enum, default_value = "auto")]
        kind: ValueKind,
    },
    /// Set a directive, inserting it before the first include if absent
    Set {
        /// PHP configuration file to edit
        file: PathBuf,
        /// Constant name
        name: String,
        /// New value
        value: String,
        /// How to interpret the value argument
        #[arg(long = "as", value_enum, default_value = "auto")]
        kind: ValueKind,
    },
}

/// Coercion applied to a command-line value argument.
#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
    /// Infer like PHP: true/false/null keywords, numeric forms, else string
    Auto,
    Bool,
    Float,
    Int,
    Null,
    /// Inject the argument verbatim as PHP source
    Raw,
    String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Dispatch one subcommand.
///
/// # Errors
///
/// Returns whatever the command handlers return; `main` renders it.
fn run(command: Commands) -> Result<ExitCode, Error> {
    match command {
        Commands::Apply { file, changes } => {
            cmd_apply(&file, &changes)?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Get { file, name, default, json } => {
            cmd_get(&file, &name, default.as_deref(), json)
        },
        Commands::Replace { file, name, value, kind } => {
            cmd_edit(&file, &name, &value, kind, false)?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Set { file, name, value, kind } => {
            cmd_edit(&file, &name, &value, kind, true)?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Print one directive. Exit code 1 means "absent, no default given" so
/// scripts can distinguish absence from failure without parsing stderr.
///
/// # Errors
///
/// Returns load errors; absence is an exit code, not an error.
fn cmd_get(file: &Path, name: &str, default: Option<&str>, json: bool) -> Result<ExitCode, Error> {
    let editor = DefineEditor::load(file)?;

    let Some(value) = editor.get(name) else {
        return match default {
            Some(fallback) => {
                println!("{fallback}");
                Ok(ExitCode::SUCCESS)
            },
            None => Ok(ExitCode::from(1)),
        };
    };

    if json {
        println!("{}", json_form(&value));
    } else {
        println!("{}", display_form(&value));
    }
    Ok(ExitCode::SUCCESS)
}

/// Set or replace one directive and save.
///
/// # Errors
///
/// Returns load, coercion, and save errors.
fn cmd_edit(
    file: &Path,
    name: &str,
    raw: &str,
    kind: ValueKind,
    append: bool,
) -> Result<(), Error> {
    let value = coerce_value(raw, kind)?;
    let mut editor = DefineEditor::load(file)?;
    if append {
        editor.set(name, value);
    } else {
        editor.replace(name, value);
    }
    editor.save()
}

/// Batch mode: set every pair from a TOML table on one editor, one save.
/// Mirrors how install/update flows push a whole map of directives at once.
///
/// # Errors
///
/// Returns load errors, TOML errors, unsupported-value errors, and save
/// errors. Nothing is written unless every pair converts.
fn cmd_apply(file: &Path, changes: &Path) -> Result<(), Error> {
    let content = std::fs::read_to_string(changes)?;
    let table: toml::Table = toml::from_str(&content)?;

    let mut pairs = Vec::with_capacity(table.len());
    for (key, value) in table {
        let converted = toml_to_value(&key, value)?;
        pairs.push((key, converted));
    }

    let mut editor = DefineEditor::load(file)?;
    let count = pairs.len();
    for (key, value) in pairs {
        editor.set(&key, value);
    }
    editor.save()?;

    println!("Updated {count} directives in {}", file.display());
    Ok(())
}

/// Coerce a raw CLI argument to a `Value`.
///
/// # Errors
///
/// Returns `Error::InvalidValue` when the argument doesn't fit the
/// requested type.
fn coerce_value(raw: &str, kind: ValueKind) -> Result<Value, Error> {
    match kind {
        ValueKind::Auto => Ok(infer_value(raw)),
        ValueKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "off" => Ok(Value::Bool(false)),
            _ => Err(Error::InvalidValue {
                raw: raw.to_string(),
                expected: "true/false/1/0/on/off",
            }),
        },
        ValueKind::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| {
            Error::InvalidValue { raw: raw.to_string(), expected: "a float" }
        }),
        ValueKind::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| {
            Error::InvalidValue { raw: raw.to_string(), expected: "an integer" }
        }),
        ValueKind::Null => Ok(Value::Null),
        ValueKind::Raw => Ok(Value::Raw(raw.to_string())),
        ValueKind::String => Ok(Value::Str(raw.to_string())),
    }
}

/// Infer a value the way PHP reads loosely-typed input: bare keywords
/// first, then numeric forms, otherwise a string.
fn infer_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(raw.to_string())
}

/// Convert a TOML value to a directive value. Datetimes and tables have
/// no PHP literal form and are rejected before any edit happens.
///
/// # Errors
///
/// Returns `Error::UnsupportedValue` for datetimes and nested tables.
fn toml_to_value(key: &str, value: toml::Value) -> Result<Value, Error> {
    match value {
        toml::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(toml_to_value(key, item)?);
            }
            Ok(Value::Array(out))
        },
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::Datetime(_) => Err(Error::UnsupportedValue {
            key: key.to_string(),
            reason: "datetimes have no PHP literal form",
        }),
        toml::Value::Float(f) => Ok(Value::Float(f)),
        toml::Value::Integer(i) => Ok(Value::Int(i)),
        toml::Value::String(s) => Ok(Value::Str(s)),
        toml::Value::Table(_) => Err(Error::UnsupportedValue {
            key: key.to_string(),
            reason: "nested tables have no PHP literal form",
        }),
    }
}

/// Human-facing form: strings and raw fragments bare, everything else as
/// its PHP literal.
fn display_form(value: &Value) -> String {
    match value {
        Value::Raw(fragment) => fragment.clone(),
        Value::Str(s) => s.clone(),
        other => other.php_literal(),
    }
}

/// Machine-facing form. Non-finite floats fall back to their PHP constant
/// spelling since JSON has no representation for them.
fn json_form(value: &Value) -> serde_json::Value {
    match value {
        Value::Array(items) => serde_json::Value::Array(items.iter().map(json_form).collect()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or_else(|| serde_json::Value::String(value.php_literal()), serde_json::Value::Number),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Null => serde_json::Value::Null,
        Value::Raw(fragment) => serde_json::Value::String(fragment.clone()),
        Value::Str(s) => serde_json::Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_inference_matches_php_keywords() {
        assert_eq!(infer_value("true"), Value::Bool(true));
        assert_eq!(infer_value("FALSE"), Value::Bool(false));
        assert_eq!(infer_value("null"), Value::Null);
        assert_eq!(infer_value("128"), Value::Int(128));
        assert_eq!(infer_value("1.5"), Value::Float(1.5));
        assert_eq!(infer_value("direct"), Value::Str("direct".to_string()));
    }

    #[test]
    fn bool_coercion_rejects_garbage() {
        assert!(coerce_value("maybe", ValueKind::Bool).is_err());
        assert_eq!(coerce_value("on", ValueKind::Bool).unwrap(), Value::Bool(true));
    }

    #[test]
    fn string_coercion_never_infers() {
        assert_eq!(
            coerce_value("true", ValueKind::String).unwrap(),
            Value::Str("true".to_string())
        );
    }

    #[test]
    fn toml_scalars_convert() {
        assert_eq!(
            toml_to_value("K", toml::Value::Boolean(true)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            toml_to_value("K", toml::Value::String("direct".to_string())).unwrap(),
            Value::Str("direct".to_string())
        );
        assert!(toml_to_value("K", toml::Value::Table(toml::Table::new())).is_err());
    }
}
