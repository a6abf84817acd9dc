//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ConnectionConfig;
use crate::connector::Connector;
use crate::error::{Error, Result, ResultExt};
use crate::filter::Qualifiers;
use crate::tables::{QueryContext, RowSink};
use crate::types::{Row, RowBudget};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Tables { table } => self.tables(table.as_deref()),
            Commands::List {
                table,
                quals,
                columns,
                limit,
            } => self.list(table, quals, columns, *limit).await,
            Commands::Get {
                table,
                keys,
                columns,
            } => self.get(table, keys, columns).await,
        }
    }

    /// Connection settings from the config file, then command-line overrides
    fn load_config(&self) -> Result<ConnectionConfig> {
        let mut config = match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "loading connection config");
                ConnectionConfig::from_file(path)
                    .with_context(|| format!("loading {}", path.display()))?
            }
            None => ConnectionConfig::new(),
        };

        if let Some(token) = &self.cli.token {
            config = config.with_token(token.clone());
        }
        if let Some(url) = &self.cli.api_url {
            config = config.with_api_url(url.clone());
        }

        config.validate()?;
        Ok(config)
    }

    fn connector(&self) -> Result<Connector> {
        Ok(Connector::new(self.load_config()?))
    }

    /// Context for one command; Ctrl-C cancels it until the watch is dropped
    fn context(
        &self,
        connector: &Connector,
        quals: Qualifiers,
        columns: &[String],
    ) -> (QueryContext, InterruptWatch) {
        let cancel = CancellationToken::new();
        let watch = InterruptWatch::spawn(cancel.clone());

        let ctx = connector
            .context()
            .with_quals(quals)
            .with_columns(columns.iter().cloned())
            .with_cancel(cancel);
        (ctx, watch)
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let connector = self.connector()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Checking connection to {}",
                    connector.session().config().api_url()
                )
            }
        }));

        let (ctx, _watch) = self.context(&connector, Qualifiers::new(), &[]);
        let result = connector.check(&ctx).await;

        let status = if result.success { "SUCCEEDED" } else { "FAILED" };
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": status,
                "message": result.message
            }
        }));

        if result.success {
            Ok(())
        } else {
            Err(Error::Other("connection check failed".to_string()))
        }
    }

    /// List table definitions
    fn tables(&self, table: Option<&str>) -> Result<()> {
        let connector = self.connector()?;

        match table {
            Some(name) => {
                let definition = connector.table(name)?.definition();
                self.output_message(&json!({
                    "type": "TABLE",
                    "table": definition
                }));
            }
            None => {
                self.output_message(&json!({
                    "type": "TABLES",
                    "tables": connector.tables()
                }));
            }
        }
        Ok(())
    }

    /// Stream rows of a table
    async fn list(
        &self,
        table: &str,
        quals: &[String],
        columns: &[String],
        limit: Option<u64>,
    ) -> Result<()> {
        let connector = self.connector()?;
        let quals = Qualifiers::parse_all(quals.iter().map(String::as_str))?;
        let (ctx, _watch) = self.context(&connector, quals, columns);

        let mut sink = JsonLinesSink::new(self, table, limit);
        let stats = connector.list(table, &ctx, &mut sink).await?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "{table}: {} rows from {} pages{}",
                    stats.items_emitted,
                    stats.pages_fetched,
                    if stats.stopped_early { " (limit reached)" } else { "" }
                )
            }
        }));
        Ok(())
    }

    /// Fetch one row by key
    async fn get(&self, table: &str, keys: &[String], columns: &[String]) -> Result<()> {
        let connector = self.connector()?;
        let quals = Qualifiers::parse_all(keys.iter().map(String::as_str))?;
        let (ctx, _watch) = self.context(&connector, quals, columns);

        match connector.get(table, &ctx).await? {
            Some(row) => self.output_record(table, row),
            None => self.output_message(&json!({
                "type": "LOG",
                "log": {
                    "level": "INFO",
                    "message": format!("{table}: no row for the given key")
                }
            })),
        }
        Ok(())
    }

    fn output_record(&self, table: &str, row: Row) {
        self.output_message(&json!({
            "type": "RECORD",
            "record": {
                "table": table,
                "data": Value::Object(row)
            }
        }));
    }

    /// Output a JSON message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Ctrl-C watcher for one command
///
/// Dropping it aborts the background task, so a finished command leaves no
/// signal listener behind.
struct InterruptWatch {
    handle: JoinHandle<()>,
}

impl InterruptWatch {
    fn spawn(cancel: CancellationToken) -> Self {
        let handle = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling");
                cancel.cancel();
            }
        });
        Self { handle }
    }
}

impl Drop for InterruptWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Prints each row as a RECORD message as soon as it arrives
struct JsonLinesSink<'a> {
    runner: &'a Runner,
    table: &'a str,
    budget: RowBudget,
}

impl<'a> JsonLinesSink<'a> {
    fn new(runner: &'a Runner, table: &'a str, limit: Option<u64>) -> Self {
        Self {
            runner,
            table,
            budget: RowBudget::from_limit(limit),
        }
    }
}

impl RowSink for JsonLinesSink<'_> {
    fn stream_row(&mut self, row: Row) -> RowBudget {
        self.runner.output_record(self.table, row);
        self.budget = self.budget.decrement();
        self.budget
    }

    fn rows_remaining(&self) -> RowBudget {
        self.budget
    }
}
