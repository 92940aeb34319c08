use anyhow::{Context, Result};
use char_lockr::{Codec, SubstitutionTable, TableChoice};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// char-lockr - reversible per-character substitution codec
///
/// Encodes text with directory-defined substitution tables and decodes it
/// back. Table definitions live in two directories, one per case mode.
#[derive(Parser)]
#[command(name = "char-lockr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode plaintext into a token string
    Encode {
        /// Input file (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Write the token string to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        tables: TableArgs,
    },

    /// Decode a token string back into plaintext
    Decode {
        /// Input file (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Write the plaintext to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Which table to decode with. `auto` applies the case test to the
        /// token string itself; token strings rarely test all-uppercase, so
        /// auto usually means the lower table
        #[arg(long, value_enum, default_value_t = TableArg::Auto)]
        table: TableArg,

        #[command(flatten)]
        tables: TableArgs,
    },

    /// Check loaded tables for prefix collisions and duplicate tokens
    Check {
        #[command(flatten)]
        tables: TableArgs,
    },

    /// Show loaded table summaries
    Tables {
        /// Dump both tables as YAML
        #[arg(long, default_value_t = false)]
        dump: bool,

        #[command(flatten)]
        tables: TableArgs,
    },

    /// Show version information
    Version,
}

/// Where the two definition directories live.
///
/// Resolution order: explicit per-table flags, then --tables ROOT (meaning
/// ROOT/upper and ROOT/lower), then $CHAR_LOCKR_TABLE_DIR as ROOT, then
/// <config dir>/char-lockr/tables, then ./tables. A missing directory is
/// not an error; it loads as an empty table.
#[derive(Args, Debug)]
struct TableArgs {
    /// Directory with uppercase table definitions
    #[arg(long)]
    upper_dir: Option<PathBuf>,

    /// Directory with lowercase table definitions
    #[arg(long)]
    lower_dir: Option<PathBuf>,

    /// Root directory containing upper/ and lower/ definition directories
    #[arg(long)]
    tables: Option<PathBuf>,
}

impl TableArgs {
    fn resolve(&self) -> (PathBuf, PathBuf) {
        let root = self.root();
        (
            self.upper_dir.clone().unwrap_or_else(|| root.join("upper")),
            self.lower_dir.clone().unwrap_or_else(|| root.join("lower")),
        )
    }

    fn root(&self) -> PathBuf {
        if let Some(root) = &self.tables {
            return root.clone();
        }
        if let Ok(env_root) = std::env::var("CHAR_LOCKR_TABLE_DIR") {
            return PathBuf::from(env_root);
        }
        if let Some(config_dir) = dirs::config_dir() {
            let candidate = config_dir.join("char-lockr").join("tables");
            if candidate.exists() {
                return candidate;
            }
        }
        PathBuf::from("tables")
    }

    fn load_codec(&self) -> Codec {
        let (upper_dir, lower_dir) = self.resolve();
        Codec::load(upper_dir, lower_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TableArg {
    Auto,
    Upper,
    Lower,
}

impl From<TableArg> for TableChoice {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Auto => TableChoice::Auto,
            TableArg::Upper => TableChoice::Upper,
            TableArg::Lower => TableChoice::Lower,
        }
    }
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read input {:?}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(output: Option<&PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            // the persisted artifact is the exact string produced, verbatim
            fs::write(path, text)
                .with_context(|| format!("Failed to write output {:?}", path))?;
            eprintln!("✓ Wrote {:?}", path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn handle_encode(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    tables: TableArgs,
) -> Result<()> {
    let codec = tables.load_codec();
    let message = read_input(input.as_ref())?;
    write_output(output.as_ref(), &codec.encode(&message))
}

fn handle_decode(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    table: TableArg,
    tables: TableArgs,
) -> Result<()> {
    let codec = tables.load_codec();
    let token_string = read_input(input.as_ref())?;
    write_output(output.as_ref(), &codec.decode_with(&token_string, table.into()))
}

fn report_issues(name: &str, table: &SubstitutionTable) -> usize {
    let issues = table.validate();
    if issues.is_empty() {
        println!("✓ {} table: {} entries, no issues", name, table.len());
    } else {
        println!(
            "✗ {} table: {} entries, {} issue(s)",
            name,
            table.len(),
            issues.len()
        );
        for issue in &issues {
            println!("    - {}", issue);
        }
    }
    issues.len()
}

fn handle_check(tables: TableArgs) -> Result<()> {
    let (upper_dir, lower_dir) = tables.resolve();
    println!("Checking tables:");
    println!("  upper: {:?}", upper_dir);
    println!("  lower: {:?}", lower_dir);

    let codec = Codec::load(&upper_dir, &lower_dir);
    let total = report_issues("upper", codec.table(char_lockr::CaseMode::Upper))
        + report_issues("lower", codec.table(char_lockr::CaseMode::Lower));

    if total > 0 {
        anyhow::bail!("{} table issue(s) found", total);
    }
    Ok(())
}

#[derive(Serialize)]
struct TableDump<'a> {
    upper: &'a SubstitutionTable,
    lower: &'a SubstitutionTable,
}

fn handle_tables(dump: bool, tables: TableArgs) -> Result<()> {
    let (upper_dir, lower_dir) = tables.resolve();
    let codec = Codec::load(&upper_dir, &lower_dir);
    let upper = codec.table(char_lockr::CaseMode::Upper);
    let lower = codec.table(char_lockr::CaseMode::Lower);

    println!("upper: {} entries from {:?}", upper.len(), upper_dir);
    println!("lower: {} entries from {:?}", lower.len(), lower_dir);

    if dump {
        let yaml = serde_yaml::to_string(&TableDump { upper, lower })
            .context("Failed to serialize tables")?;
        print!("{}", yaml);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            tables,
        } => handle_encode(input, output, tables),
        Commands::Decode {
            input,
            output,
            table,
            tables,
        } => handle_decode(input, output, table, tables),
        Commands::Check { tables } => handle_check(tables),
        Commands::Tables { dump, tables } => handle_tables(dump, tables),
        Commands::Version => {
            println!("char-lockr {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_encode_basic() {
        let cli = Cli::parse_from(["char-lockr", "encode", "/some/message.txt"]);
        match cli.command {
            Commands::Encode { input, output, .. } => {
                assert_eq!(input, Some(PathBuf::from("/some/message.txt")));
                assert_eq!(output, None);
            }
            _ => panic!("Expected Encode command"),
        }
    }

    #[test]
    fn test_cli_parses_encode_with_output_and_dirs() {
        let cli = Cli::parse_from([
            "char-lockr",
            "encode",
            "in.txt",
            "--output",
            "out.txt",
            "--upper-dir",
            "/defs/up",
            "--lower-dir",
            "/defs/low",
        ]);
        match cli.command {
            Commands::Encode {
                output, tables, ..
            } => {
                assert_eq!(output, Some(PathBuf::from("out.txt")));
                assert_eq!(tables.upper_dir, Some(PathBuf::from("/defs/up")));
                assert_eq!(tables.lower_dir, Some(PathBuf::from("/defs/low")));
            }
            _ => panic!("Expected Encode command"),
        }
    }

    #[test]
    fn test_cli_parses_decode_table_choice() {
        let cli = Cli::parse_from(["char-lockr", "decode", "--table", "upper"]);
        match cli.command {
            Commands::Decode { table, input, .. } => {
                assert_eq!(table, TableArg::Upper);
                assert_eq!(input, None);
            }
            _ => panic!("Expected Decode command"),
        }
    }

    #[test]
    fn test_cli_decode_defaults_to_auto() {
        let cli = Cli::parse_from(["char-lockr", "decode"]);
        match cli.command {
            Commands::Decode { table, .. } => assert_eq!(table, TableArg::Auto),
            _ => panic!("Expected Decode command"),
        }
    }

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::parse_from(["char-lockr", "check", "--tables", "/defs"]);
        match cli.command {
            Commands::Check { tables } => {
                assert_eq!(tables.tables, Some(PathBuf::from("/defs")));
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_parses_tables_dump() {
        let cli = Cli::parse_from(["char-lockr", "tables", "--dump"]);
        match cli.command {
            Commands::Tables { dump, .. } => assert!(dump),
            _ => panic!("Expected Tables command"),
        }
    }

    #[test]
    fn test_table_args_explicit_dirs_win() {
        let args = TableArgs {
            upper_dir: Some(PathBuf::from("/u")),
            lower_dir: Some(PathBuf::from("/l")),
            tables: Some(PathBuf::from("/root")),
        };
        assert_eq!(args.resolve(), (PathBuf::from("/u"), PathBuf::from("/l")));
    }

    #[test]
    fn test_table_args_root_flag() {
        let args = TableArgs {
            upper_dir: None,
            lower_dir: None,
            tables: Some(PathBuf::from("/defs")),
        };
        assert_eq!(
            args.resolve(),
            (PathBuf::from("/defs/upper"), PathBuf::from("/defs/lower"))
        );
    }
}
