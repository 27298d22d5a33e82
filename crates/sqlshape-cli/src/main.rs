//! sqlshape CLI
//!
//! Command-line front end for parsing, inspecting and rendering SQL scripts.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use sqlshape_core::{
    render, serialize, serialize_batch, Batch, DialectKind, ParamStyle, ParamValues,
    ParserConfig, RenderOptions, SqlParser,
};

/// Parse, inspect and render SQL statements.
#[derive(Parser)]
#[command(name = "sqlshape")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQL dialect of the input.
    #[arg(short, long, env = "SQLSHAPE_DIALECT")]
    dialect: Option<DialectKind>,

    /// Longest accepted statement, in bytes.
    #[arg(long, env = "SQLSHAPE_MAX_STATEMENT_LEN")]
    max_statement_len: Option<usize>,

    /// Reject parameters redeclared with another type.
    #[arg(long)]
    strict: bool,

    /// JSON file with `parser` and `render` settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the serialized form of every statement.
    Parse {
        /// Script to read (stdin if not specified).
        input: Option<PathBuf>,

        /// Print one JSON object per line instead of a batch.
        #[arg(long)]
        lines: bool,
    },

    /// List the parameters of every statement.
    Params {
        /// Script to read (stdin if not specified).
        input: Option<PathBuf>,
    },

    /// Render the script back to SQL.
    Render {
        /// Script to read (stdin if not specified).
        input: Option<PathBuf>,

        /// Parameter values as a JSON object.
        #[arg(short, long)]
        params: Option<String>,

        /// Dialect to render for (the input dialect if not specified).
        #[arg(short, long)]
        target: Option<DialectKind>,

        /// How parameters are written.
        #[arg(short, long, value_enum)]
        style: Option<StyleArg>,

        /// Put each clause on its own line.
        #[arg(long)]
        pretty: bool,

        /// Quote every identifier.
        #[arg(long)]
        force_quotes: bool,

        /// Convert timestamps with an offset to GMT.
        #[arg(long)]
        gmt: bool,
    },

    /// Parse the script and report the first error.
    Check {
        /// Script to read (stdin if not specified).
        input: Option<PathBuf>,
    },

    /// Print each statement of the script with its type.
    Split {
        /// Script to read (stdin if not specified).
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Inline,
    Short,
    Long,
    Colon,
    Dollar,
    Qmark,
    Uqmark,
}

impl From<StyleArg> for ParamStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Inline => Self::Inline,
            StyleArg::Short => Self::Short,
            StyleArg::Long => Self::Long,
            StyleArg::Colon => Self::Colon,
            StyleArg::Dollar => Self::Dollar,
            StyleArg::Qmark => Self::QMark,
            StyleArg::Uqmark => Self::UQMark,
        }
    }
}

/// Settings loaded from `--config`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    parser: ParserConfig,
    render: RenderOptions,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Applies command-line and environment overrides on top of the file settings.
fn parser_config(cli: &Cli, file: &FileConfig) -> ParserConfig {
    let mut config = file.parser;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if let Some(len) = cli.max_statement_len {
        config.max_statement_len = len;
    }
    config.strict_param_types |= cli.strict;
    config
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("cannot read stdin")?;
            Ok(text)
        }
    }
}

fn parse_input(config: ParserConfig, input: Option<&Path>) -> anyhow::Result<Batch> {
    let text = read_input(input)?;
    let batch = SqlParser::new(config).parse_batch(&text)?;
    debug!(statements = batch.len(), dialect = %config.dialect, "parsed script");
    Ok(batch)
}

#[derive(Serialize)]
struct ParamRow {
    name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_name: Option<String>,
    value_type: String,
    nullok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    descr: Option<String>,
}

#[derive(Serialize)]
struct StatementParams {
    stmt_type: &'static str,
    params: Vec<ParamRow>,
}

fn params_report(batch: &Batch) -> Vec<StatementParams> {
    batch
        .iter()
        .map(|stmt| StatementParams {
            stmt_type: stmt.stmt_type(),
            params: stmt
                .parameters()
                .iter()
                .map(|spec| ParamRow {
                    name: spec.name(),
                    type_name: spec.type_name.clone(),
                    value_type: spec.value_type.to_string(),
                    nullok: spec.nullok,
                    descr: spec.descr.clone(),
                })
                .collect(),
        })
        .collect()
}

fn render_script(
    batch: &Batch,
    values: &ParamValues,
    options: &RenderOptions,
    dialect: DialectKind,
) -> anyhow::Result<String> {
    let mut out = String::new();
    for (n, stmt) in batch.iter().enumerate() {
        let sql = render(stmt, values, options, dialect)
            .with_context(|| format!("statement {} ({})", n + 1, stmt.stmt_type()))?;
        out.push_str(&sql);
        out.push_str(";\n");
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let file = load_config(cli.config.as_deref())?;
    let config = parser_config(&cli, &file);

    match &cli.command {
        Commands::Parse { input, lines } => {
            let batch = parse_input(config, input.as_deref())?;
            if *lines {
                for stmt in batch.iter() {
                    println!("{}", serialize(stmt));
                }
            } else {
                println!("{}", serialize_batch(&batch));
            }
        }

        Commands::Params { input } => {
            let batch = parse_input(config, input.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&params_report(&batch))?);
        }

        Commands::Render {
            input,
            params,
            target,
            style,
            pretty,
            force_quotes,
            gmt,
        } => {
            let batch = parse_input(config, input.as_deref())?;
            let values = match params {
                Some(json) => {
                    let json: serde_json::Value =
                        serde_json::from_str(json).context("--params is not valid JSON")?;
                    ParamValues::from_json(&json)?
                }
                None => ParamValues::new(),
            };
            let mut options = file.render;
            if let Some(style) = style {
                options.param_style = (*style).into();
            }
            options.pretty |= *pretty;
            options.force_quotes |= *force_quotes;
            options.gmt |= *gmt;
            let dialect = target.unwrap_or(config.dialect);
            print!("{}", render_script(&batch, &values, &options, dialect)?);
        }

        Commands::Check { input } => {
            let batch = parse_input(config, input.as_deref())?;
            let conflicts: usize = batch.iter().map(|s| s.parameters().conflicts().len()).sum();
            println!(
                "{} statement(s), {} parameter type conflict(s)",
                batch.len(),
                conflicts
            );
        }

        Commands::Split { input } => {
            let batch = parse_input(config, input.as_deref())?;
            for stmt in batch.iter() {
                println!("-- {}", stmt.stmt_type());
                println!("{};", stmt.sql);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn script(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sqlshape").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_input_from_file() {
        let file = script("SELECT 1;\nDELETE FROM t WHERE id = ##id::int;");
        let batch = parse_input(ParserConfig::default(), Some(file.path())).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.statements[1].stmt_type(), "DELETE");
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.sql");
        let err = parse_input(ParserConfig::default(), Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_config_file_and_overrides() {
        let file = script(
            r#"{"parser": {"dialect": "mysql", "max_depth": 50}, "render": {"pretty": true}}"#,
        );
        let loaded = load_config(Some(file.path())).unwrap();
        assert!(loaded.render.pretty);

        let plain = cli(&["check"]);
        let config = parser_config(&plain, &loaded);
        assert_eq!(config.dialect, DialectKind::Mysql);
        assert_eq!(config.max_depth, 50);

        let overridden = cli(&["--dialect", "pg", "--strict", "check"]);
        let config = parser_config(&overridden, &loaded);
        assert_eq!(config.dialect, DialectKind::Postgresql);
        assert!(config.strict_param_types);
    }

    #[test]
    fn test_bad_config_rejected() {
        let file = script(r#"{"parser": {"dialekt": "mysql"}}"#);
        assert!(load_config(Some(file.path())).is_err());
        assert!(load_config(None).is_ok());
    }

    #[test]
    fn test_render_script() {
        let file = script("SELECT * FROM t WHERE id = ##id::int::null; COMMIT");
        let batch = parse_input(ParserConfig::default(), Some(file.path())).unwrap();
        let values = ParamValues::new().with("id", None::<i64>);
        let sql = render_script(
            &batch,
            &values,
            &RenderOptions::default(),
            DialectKind::Standard,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE id IS NULL;\nCOMMIT;\n");
    }

    #[test]
    fn test_render_error_names_statement() {
        let file = script("SELECT 1; SELECT ##a::int");
        let batch = parse_input(ParserConfig::default(), Some(file.path())).unwrap();
        let err = render_script(
            &batch,
            &ParamValues::new(),
            &RenderOptions::default(),
            DialectKind::Standard,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("statement 2 (SELECT)"));
    }

    #[test]
    fn test_params_report() {
        let file = script("SELECT ##a::gint, ##b::string::null; COMMIT");
        let batch = parse_input(ParserConfig::default(), Some(file.path())).unwrap();
        let report = params_report(&batch);
        assert_eq!(report.len(), 2);
        assert!(report[1].params.is_empty());
        let json = serde_json::to_value(&report[0]).unwrap();
        assert_eq!(json["params"][0]["type"], "gint");
        assert_eq!(json["params"][0]["value_type"], "int");
        assert_eq!(json["params"][1]["nullok"], true);
    }

    #[test]
    fn test_style_flag() {
        let parsed = cli(&["render", "--style", "qmark"]);
        let Commands::Render { style: Some(style), .. } = parsed.command else {
            panic!("Expected render with a style");
        };
        assert_eq!(ParamStyle::from(style), ParamStyle::QMark);
    }
}
