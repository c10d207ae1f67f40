mod cli;
mod config;
mod schema;
mod sql;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cmd = cli::parse_args(&args)?;
    init_tracing(cmd.verbose);

    match cmd.kind {
        cli::CommandKind::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::CommandKind::Schema(cmd) => match cmd {
            cli::SchemaCommand::Dump(args) => schema::run_dump(args).await,
            cli::SchemaCommand::Validate(args) => schema::run_validate(args).await,
        },
        cli::CommandKind::Sql(cmd) => match cmd {
            cli::SqlCommand::Interpolate(args) => sql::run(args),
        },
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second run in the same process keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
