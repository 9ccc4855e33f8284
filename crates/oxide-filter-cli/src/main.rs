//! oxide-filter CLI
//!
//! Compiles JSON-described filters into SQL for a chosen driver.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use oxide_filter::{Compiler, CompilerConfig, DialectRegistry, Filter};

/// Compile structured filters into SQL.
#[derive(Parser)]
#[command(name = "oxide-filter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Compiler configuration file (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Driver name, overriding the configuration.
    #[arg(short, long, env = "OXIDE_FILTER_DRIVER")]
    driver: Option<String>,

    /// Table prefix, overriding the configuration.
    #[arg(short, long)]
    prefix: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a filter description into a statement.
    Compile {
        /// Filter JSON file, `-` for stdin.
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Print only the SQL text.
        #[arg(long)]
        sql_only: bool,
    },

    /// Render a single-table helper statement.
    Table {
        /// Helper to render.
        #[arg(value_enum)]
        helper: Helper,

        /// Table name.
        table: String,

        /// Column, required by the aggregate helpers.
        column: Option<String>,
    },

    /// List the registered drivers.
    Drivers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Helper {
    Max,
    Min,
    Avg,
    Sum,
    Size,
    Truncate,
    Drop,
    Show,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = registry();

    match &cli.command {
        Commands::Drivers => {
            for driver in registry.drivers() {
                println!("{driver}");
            }
        }

        Commands::Compile { input, sql_only } => {
            let config = load_config(&cli)?;
            let (filter, sql) = compile_filter(&config, &registry, read_filter(input)?)?;
            info!("Compiled {} statement", filter.action());
            if *sql_only {
                println!("{sql}");
            } else {
                println!("{}", render_output(&sql, &filter)?);
            }
        }

        Commands::Table {
            helper,
            table,
            column,
        } => {
            let config = load_config(&cli)?;
            let compiler = Compiler::from_config(&config, &registry)?;
            println!("{}", render_helper(&compiler, *helper, table, column.as_deref())?);
        }
    }

    Ok(())
}

/// Registry holding every driver shipped with the workspace.
fn registry() -> DialectRegistry {
    let mut registry = DialectRegistry::with_defaults();
    oxide_filter_mysql::register(&mut registry);
    oxide_filter_sqlite::register(&mut registry);
    registry
}

/// Loads the configuration file, then applies command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<CompilerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<CompilerConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => CompilerConfig::default(),
    };
    if let Some(driver) = &cli.driver {
        config.driver.clone_from(driver);
    }
    if let Some(prefix) = &cli.prefix {
        config.table_prefix = Some(prefix.clone());
    }
    debug!(driver = %config.driver, prefix = ?config.table_prefix, "Loaded configuration");
    Ok(config)
}

fn read_filter(input: &Path) -> anyhow::Result<Filter> {
    let text = if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading filter from stdin")?;
        text
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("reading filter {}", input.display()))?
    };
    parse_filter(&text)
}

fn parse_filter(text: &str) -> anyhow::Result<Filter> {
    serde_json::from_str(text).context("parsing filter description")
}

/// Compiles `filter` for the configured driver. String values naming one of
/// the configured known columns are turned into column references first.
fn compile_filter(
    config: &CompilerConfig,
    registry: &DialectRegistry,
    filter: Filter,
) -> anyhow::Result<(Filter, String)> {
    let compiler = Compiler::from_config(config, registry)?;
    let filter = match config.column_lookup() {
        Some(lookup) => filter.resolve_columns(lookup),
        None => filter,
    };
    let sql = compiler.execute(&filter)?;
    Ok((filter, sql))
}

fn render_output(sql: &str, filter: &Filter) -> anyhow::Result<String> {
    let output = serde_json::json!({
        "sql": sql,
        "values": filter.values(),
        "bindings": filter.bindings(),
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_helper(
    compiler: &Compiler,
    helper: Helper,
    table: &str,
    column: Option<&str>,
) -> anyhow::Result<String> {
    let aggregate = |render: fn(&Compiler, &str, &str) -> String| match column {
        Some(column) => Ok(render(compiler, table, column)),
        None => bail!("the {helper:?} helper needs a column"),
    };
    match helper {
        Helper::Max => aggregate(Compiler::max),
        Helper::Min => aggregate(Compiler::min),
        Helper::Avg => aggregate(Compiler::avg),
        Helper::Sum => aggregate(Compiler::sum),
        Helper::Size => Ok(compiler.size(table)),
        Helper::Truncate => Ok(compiler.truncate(table)),
        Helper::Drop => Ok(compiler.drop(table)),
        Helper::Show => Ok(compiler.show(table)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use oxide_filter::SqlValue;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("oxide-filter").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_registry_has_all_drivers() {
        assert_eq!(registry().drivers(), vec!["generic", "mysql", "sqlite"]);
    }

    #[test]
    fn test_overrides_apply_without_config_file() {
        let cli = cli(&["--driver", "mysql", "--prefix", "app_", "drivers"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.driver, "mysql");
        assert_eq!(config.table_prefix.as_deref(), Some("app_"));
    }

    #[test]
    fn test_compile_round_trip_through_json() {
        let filter = Filter::select("users").where_clause("id", 7).limit(1);
        let text = serde_json::to_string(&filter).unwrap();
        let parsed = parse_filter(&text).unwrap();

        let compiler = Compiler::for_driver("mysql", &registry()).unwrap();
        let sql = compiler.execute(&parsed).unwrap();
        assert_eq!(sql, "SELECT * FROM `users` WHERE `id` = ? LIMIT 1");

        let output: serde_json::Value =
            serde_json::from_str(&render_output(&sql, &parsed).unwrap()).unwrap();
        assert_eq!(output["sql"], sql);
        assert_eq!(output["values"], serde_json::json!([7]));
        assert_eq!(parsed.values(), &[SqlValue::Int(7)]);
    }

    #[test]
    fn test_known_columns_from_config() {
        let config: CompilerConfig = serde_json::from_str(
            r#"{"driver": "sqlite", "known_columns": {"orders": ["user_id"]}}"#,
        )
        .unwrap();
        let filter = parse_filter(
            r#"{
                "action": "select",
                "table": [{"table": "users"}, {"table": "orders"}],
                "where": [
                    {"column": "users.id", "value": {"scalar": "orders.user_id"}},
                    {"column": "orders.total", "operator": "GREATER_THAN", "value": {"scalar": 10}}
                ],
                "values": ["orders.user_id", 10]
            }"#,
        )
        .unwrap();

        let (filter, sql) = compile_filter(&config, &registry(), filter).unwrap();
        assert_eq!(
            sql,
            concat!(
                r#"SELECT * FROM "users", "orders" "#,
                r#"WHERE "users"."id" = "orders"."user_id" AND "orders"."total" > ?"#
            )
        );
        assert_eq!(filter.values(), &[SqlValue::Int(10)]);
    }

    #[test]
    fn test_json_bindings_keep_plain_names() {
        let filter = parse_filter(
            r#"{"action": "insert", "table": [{"table": "users"}], "bindings": {":name": "bob"}}"#,
        )
        .unwrap();
        let (_, sql) = compile_filter(&CompilerConfig::default(), &registry(), filter).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" SET "name" = :name"#);
    }

    #[test]
    fn test_parse_filter_rejects_garbage() {
        assert!(parse_filter("{not json").is_err());
    }

    #[test]
    fn test_helpers() {
        let compiler = Compiler::for_driver("sqlite", &registry())
            .unwrap()
            .with_table_prefix("app_");
        assert_eq!(
            render_helper(&compiler, Helper::Max, "orders", Some("total")).unwrap(),
            r#"SELECT MAX("total") AS max FROM "app_orders""#
        );
        assert_eq!(
            render_helper(&compiler, Helper::Truncate, "orders", None).unwrap(),
            r#"DELETE FROM "app_orders""#
        );
        assert!(render_helper(&compiler, Helper::Avg, "orders", None).is_err());
    }
}
