use crate::config::DEFAULT_CONFIG;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Schema,
    SchemaDump,
    SchemaValidate,
    Sql,
    SqlInterpolate,
}

#[derive(Debug, Clone)]
pub struct Command {
    pub verbose: bool,
    pub kind: CommandKind,
}

#[derive(Debug, Clone)]
pub enum CommandKind {
    Help(HelpTopic),
    Schema(SchemaCommand),
    Sql(SqlCommand),
}

#[derive(Debug, Clone)]
pub enum SchemaCommand {
    Dump(SchemaDumpArgs),
    Validate(SchemaValidateArgs),
}

#[derive(Debug, Clone)]
pub struct SchemaDumpArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    pub tables: Option<Vec<String>>,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SchemaValidateArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum SqlCommand {
    Interpolate(SqlInterpolateArgs),
}

#[derive(Debug, Clone)]
pub struct SqlInterpolateArgs {
    pub template: String,
    pub args: Vec<String>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut verbose = false;
    let rest: Vec<&str> = args
        .iter()
        .skip(1)
        .map(|s| s.as_str())
        .filter(|s| match *s {
            "-v" | "--verbose" => {
                verbose = true;
                false
            }
            _ => true,
        })
        .collect();

    let mut it = rest.into_iter();
    let kind = match it.next() {
        None | Some("-h" | "--help") => CommandKind::Help(HelpTopic::Root),
        Some("schema") => parse_schema(it)?,
        Some("sql") => parse_sql(it)?,
        Some(other) => anyhow::bail!("unknown command: {other}"),
    };
    Ok(Command { verbose, kind })
}

fn parse_schema<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<CommandKind> {
    let mut subcmd: Option<&str> = None;

    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut database: Option<String> = None;
    let mut tables: Option<Vec<String>> = None;
    let mut out: Option<PathBuf> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => {
                return Ok(CommandKind::Help(match subcmd {
                    None => HelpTopic::Schema,
                    Some("dump") => HelpTopic::SchemaDump,
                    Some("validate") => HelpTopic::SchemaValidate,
                    Some(other) => anyhow::bail!("unknown subcommand: {other}"),
                }));
            }
            "dump" | "validate" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                database = Some(token.trim_start_matches("--database=").to_string());
            }
            "--tables" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--tables requires a value");
                };
                tables = Some(parse_tables(v)?);
            }
            _ if token.starts_with("--tables=") => {
                tables = Some(parse_tables(token.trim_start_matches("--tables="))?);
            }
            "--out" | "--snapshot" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("{token} requires a value");
                };
                out = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--out=") => {
                out = Some(PathBuf::from(token.trim_start_matches("--out=")));
            }
            _ if token.starts_with("--snapshot=") => {
                out = Some(PathBuf::from(token.trim_start_matches("--snapshot=")));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    let cmd = match subcmd {
        None => return Ok(CommandKind::Help(HelpTopic::Schema)),
        Some("dump") => SchemaCommand::Dump(SchemaDumpArgs {
            config,
            database,
            tables,
            out,
        }),
        Some("validate") => {
            if tables.is_some() {
                anyhow::bail!("--tables is not supported by `dmlkit schema validate`");
            }
            SchemaCommand::Validate(SchemaValidateArgs {
                config,
                database,
                snapshot: out,
            })
        }
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(CommandKind::Schema(cmd))
}

fn parse_tables(v: &str) -> anyhow::Result<Vec<String>> {
    let parsed = split_csv(v);
    if parsed.is_empty() {
        anyhow::bail!("--tables must not be empty");
    }
    Ok(parsed)
}

fn split_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_sql<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<CommandKind> {
    let mut subcmd: Option<&str> = None;
    let mut positional: Vec<String> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => {
                return Ok(CommandKind::Help(match subcmd {
                    None => HelpTopic::Sql,
                    Some("interpolate") => HelpTopic::SqlInterpolate,
                    Some(other) => anyhow::bail!("unknown subcommand: {other}"),
                }));
            }
            "interpolate" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            // Everything after `--` is positional, including values like `-1`.
            "--" => positional.extend(it.by_ref().map(str::to_string)),
            other if subcmd.is_some() => positional.push(other.to_string()),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    match subcmd {
        None => Ok(CommandKind::Help(HelpTopic::Sql)),
        Some("interpolate") => {
            let mut positional = positional.into_iter();
            let Some(template) = positional.next() else {
                anyhow::bail!("missing TEMPLATE: expected `dmlkit sql interpolate TEMPLATE [ARG...]`");
            };
            Ok(CommandKind::Sql(SqlCommand::Interpolate(SqlInterpolateArgs {
                template,
                args: positional.collect(),
            })))
        }
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    }
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
dmlkit - MySQL table metadata and SQL interpolation

USAGE:
  dmlkit <COMMAND> [OPTIONS]

COMMANDS:
  schema dump           Load table metadata from the database into a snapshot
  schema validate       Compare a snapshot with the live database
  sql interpolate       Interpolate arguments into a SQL template

GLOBAL OPTIONS:
  -v, --verbose         Debug logging (RUST_LOG overrides)
  -h, --help            Print help

Run `dmlkit <command> --help` for more."
            );
        }
        HelpTopic::Schema => {
            println!(
                "\
USAGE:
  dmlkit schema <SUBCOMMAND> [OPTIONS]

SUBCOMMANDS:
  dump                  Load table metadata from the database into a snapshot
  validate              Compare a snapshot with the live database

Run `dmlkit schema <subcommand> --help` for more."
            );
        }
        HelpTopic::SchemaDump => {
            println!(
                "\
USAGE:
  dmlkit schema dump [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: dmlkit.toml)
  --database <URL>      Database URL (overrides config)
  --tables <CSV>        Comma-separated table list (default: from config, or all tables)
  --out <FILE>          Snapshot file (default: tables.snapshot from config)
  -h, --help            Print help"
            );
        }
        HelpTopic::SchemaValidate => {
            println!(
                "\
USAGE:
  dmlkit schema validate [OPTIONS]

NOTES:
  - Exits with status 1 when the database does not match the snapshot.

OPTIONS:
  --config <FILE>       Config file path (default: dmlkit.toml)
  --database <URL>      Database URL (overrides config)
  --snapshot <FILE>     Snapshot file (default: tables.snapshot from config)
  -h, --help            Print help"
            );
        }
        HelpTopic::Sql => {
            println!(
                "\
USAGE:
  dmlkit sql <SUBCOMMAND>

SUBCOMMANDS:
  interpolate           Interpolate arguments into a SQL template

Run `dmlkit sql <subcommand> --help` for more."
            );
        }
        HelpTopic::SqlInterpolate => {
            println!(
                "\
USAGE:
  dmlkit sql interpolate [--] TEMPLATE [ARG...]

NOTES:
  - Each ARG fills the next `?` or `(?)` placeholder.
  - Integers and floats become numbers, `null` becomes NULL,
    `true`/`false` become 1/0, anything else is a quoted string.

OPTIONS:
  -h, --help            Print help"
            );
        }
    }
}
