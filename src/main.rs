mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use inne_core::config::Config;
use inne_db::{migrations, pool, queries};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter};

/// Log filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "inneapp=debug,inne_server=debug,inne_db=debug,inne_core=debug,tower_http=debug"
    } else {
        "inneapp=info,inne_server=info,inne_db=info,inne_core=info,tower_http=info"
    }
}

fn start_server(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!(
        "Starting inneapp on {}:{}",
        config.server.host,
        config.server.port
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(inne_server::start(config))?;
    Ok(())
}

fn open(config: &Config) -> Result<rusqlite::Connection> {
    let db_path = config.database.path.to_string_lossy();
    pool::open_connection(&db_path, &config.database)
        .with_context(|| format!("opening database {db_path}"))
}

fn migrate(config: &Config, down_to: Option<i64>) -> Result<()> {
    let conn = open(config)?;

    match down_to {
        Some(target) => {
            let reverted = migrations::rollback_to(&conn, target)?;
            if reverted.is_empty() {
                println!(
                    "Nothing to roll back (at version {})",
                    migrations::current_version(&conn)?
                );
            }
            for version in reverted {
                println!("Reverted V{version}");
            }
        }
        None => {
            let pending = migrations::pending_migrations(&conn)?;
            migrations::run_migrations(&conn)?;
            if pending.is_empty() {
                println!("Schema is up to date");
            }
            for m in pending {
                println!("Applied V{} {}", m.version, m.name);
            }
        }
    }

    println!("Current version: {}", migrations::current_version(&conn)?);
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    println!("Database: {}", config.database.path.display());
    if !config.database.path.exists() {
        println!("No database; run `inneapp migrate` to create it");
        return Ok(());
    }

    let conn = open(config)?;
    println!("Migrations:");
    for m in migrations::applied_migrations(&conn)? {
        println!("  V{} {} (applied {})", m.version, m.name, m.applied_at);
    }
    for m in migrations::pending_migrations(&conn)? {
        println!("  V{} {} (pending)", m.version, m.name);
    }

    if migrations::current_version(&conn)? == 0 {
        println!("Schema not created; run `inneapp migrate`");
        return Ok(());
    }

    println!("Rows:");
    for (table, count) in queries::table_counts(&conn)? {
        println!("  {table:<16} {count}");
    }
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let contents = std::fs::read_to_string(p)
                .with_context(|| format!("reading {}", p.display()))?;
            Config::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration is valid");
    } else {
        for warning in &warnings {
            println!("warning: {warning}");
        }
    }
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Debug: {}", config.server.debug);
    println!("  Database: {}", config.database.path.display());
    println!("  Pool size: {}", config.database.pool_size);
    Ok(())
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise `--verbose` or `server.debug` select the debug
/// filter. The returned closure applies `server.debug` once the config has
/// been loaded.
fn init_logging(verbose: bool) -> impl FnOnce(&Config) {
    let from_env = EnvFilter::try_from_default_env().ok();
    let pinned = from_env.is_some() || verbose;
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(default_filter(verbose)));

    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    move |config: &Config| {
        if !pinned && config.server.debug {
            if let Err(e) = handle.reload(EnvFilter::new(default_filter(true))) {
                tracing::warn!("Failed to switch to debug logging: {e}");
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let apply_config = init_logging(cli.verbose);
    let config = Config::load_or_default(cli.config.as_deref());
    apply_config(&config);

    match cli.command.unwrap_or(Commands::Start {
        host: None,
        port: None,
    }) {
        Commands::Start { host, port } => start_server(config, host, port),
        Commands::Migrate { down_to } => migrate(&config, down_to),
        Commands::Status => status(&config),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("inneapp {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_filter_enables_debug() {
        assert!(default_filter(true).contains("inne_db=debug"));
        assert!(default_filter(false).contains("tower_http=info"));
    }
}
