//! CLI runner - executes commands

use crate::cli::commands::{parse_assignment, Cli, Commands, OutputFormat};
use crate::cli::server::{self, ServerConfig};
use crate::cli::session::BrowseSession;
use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::fetch::{HttpFetcher, MemoryFetcher, RemoteFetcher};
use crate::store::MemoryStore;
use crate::types::FilterSet;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Base URL used when browsing a local data file without a config
const LOCAL_BASE_URL: &str = "http://localhost";

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
            Commands::Browse {
                data,
                script,
                page_size,
                filters,
            } => {
                self.browse(data.as_deref(), script.as_deref(), *page_size, filters)
                    .await
            }
            Commands::Serve {
                data,
                port,
                aliases,
            } => self.serve(data, *port, aliases).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load the pager config, or defaults when no file was given
    fn load_config(&self) -> Result<Option<PagerConfig>> {
        self.cli
            .config
            .as_ref()
            .map(|path| {
                let config = PagerConfig::from_file(path)?;
                config.validate()?;
                Ok(config)
            })
            .transpose()
    }

    /// Browse pages interactively or through a script
    async fn browse(
        &self,
        data: Option<&Path>,
        script: Option<&str>,
        page_size: Option<u32>,
        filter_args: &[String],
    ) -> Result<()> {
        let mut config = match (self.load_config()?, data) {
            (Some(config), _) => config,
            (None, Some(_)) => PagerConfig::new(LOCAL_BASE_URL),
            (None, None) => {
                return Err(Error::config(
                    "Nothing to browse: pass a config file (-c) or a data file (--data)",
                ))
            }
        };
        if let Some(size) = page_size {
            config.page_size = size;
            config.validate()?;
        }

        let filters = initial_filters(&config, filter_args)?;

        let fetcher: Box<dyn RemoteFetcher> = match data {
            Some(path) => {
                let store = MemoryStore::from_file(path, &config.cursor_field)?;
                tracing::info!(items = store.len(), path = %path.display(), "Loaded data file");
                Box::new(MemoryFetcher::new(store))
            }
            None => {
                tracing::info!(url = %config.base_url, path = %config.path, "Browsing endpoint");
                Box::new(HttpFetcher::from_config(&config)?)
            }
        };

        let mut session = BrowseSession::new(config, filters, fetcher.as_ref(), self.cli.format);
        let mut out = std::io::stdout();

        match script {
            Some(script) => run_script(&mut session, script, &mut out).await,
            None => run_interactive(&mut session, &mut out).await,
        }
    }

    /// Serve a data file over the listing endpoint
    async fn serve(&self, data: &Path, port: u16, alias_args: &[String]) -> Result<()> {
        let pager = self
            .load_config()?
            .unwrap_or_else(|| PagerConfig::new(format!("http://localhost:{port}")));

        let mut store = MemoryStore::from_file(data, &pager.cursor_field)?;
        for raw in alias_args {
            let (filter, field) = parse_assignment(raw).ok_or_else(|| {
                Error::invalid_value("alias", format!("expected FILTER=FIELD, got '{raw}'"))
            })?;
            store = store.with_alias(filter, field);
        }

        server::serve(ServerConfig { pager }, store, port).await
    }

    /// Validate the config file
    fn validate(&self) -> Result<()> {
        let config = self
            .load_config()?
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;

        let message = format!(
            "Config is valid: {}/{} with page size {} and {} filters",
            config.base_url.trim_end_matches('/'),
            config.path.trim_start_matches('/'),
            config.page_size,
            config.filters.len()
        );
        match self.cli.format {
            OutputFormat::Json => println!("{}", json!({ "valid": true, "message": message })),
            OutputFormat::Pretty => println!("{message}"),
        }
        Ok(())
    }
}

/// Declared filters, unselected, with `--filter NAME=VALUE` selections applied
fn initial_filters(config: &PagerConfig, args: &[String]) -> Result<FilterSet> {
    let mut filters = config.initial_filters();
    for raw in args {
        let (name, value) = parse_assignment(raw).ok_or_else(|| {
            Error::invalid_value("filter", format!("expected NAME=VALUE, got '{raw}'"))
        })?;
        config.check_filter(&name, &value)?;
        filters.set(name, value);
    }
    Ok(filters)
}

/// Run comma-separated commands after loading the first page
async fn run_script(
    session: &mut BrowseSession<'_>,
    script: &str,
    out: &mut dyn Write,
) -> Result<()> {
    session.open(out).await?;
    for line in script.split(',') {
        if !session.execute_line(line, out).await? {
            break;
        }
    }
    Ok(())
}

/// Read commands from stdin until `quit` or end of input
async fn run_interactive(session: &mut BrowseSession<'_>, out: &mut dyn Write) -> Result<()> {
    session.open(out).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(out, "{}", session.prompt())?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        if !session.execute_line(&line, out).await? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> PagerConfig {
        let mut config = PagerConfig::new(LOCAL_BASE_URL);
        config.filters[1].options = vec!["High".into(), "Low".into()];
        config
    }

    #[test]
    fn test_initial_filters_applies_selections() {
        let filters = initial_filters(
            &config(),
            &["priority=High".to_string(), "subsystem=Auth".to_string()],
        )
        .unwrap();
        assert_eq!(filters.get("priority"), Some("High"));
        assert_eq!(filters.get("subsystem"), Some("Auth"));
        assert_eq!(filters.get("status"), Some(""));
    }

    #[test]
    fn test_initial_filters_rejects_bad_selections() {
        assert!(initial_filters(&config(), &["priority=Urgent".to_string()]).is_err());
        assert!(initial_filters(&config(), &["owner=me".to_string()]).is_err());
        assert!(initial_filters(&config(), &["priority".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_run_script_stops_at_quit() {
        let fetcher = MemoryFetcher::new(MemoryStore::sequential("id_", 50));
        let mut pager = config();
        pager.page_size = 10;
        let filters = pager.initial_filters();
        let mut session = BrowseSession::new(pager, filters, &fetcher, OutputFormat::Json);
        let mut out = Vec::new();

        run_script(&mut session, "next, next, prev, quit, next", &mut out)
            .await
            .unwrap();

        let pages: Vec<u64> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| {
                serde_json::from_str::<serde_json::Value>(line).unwrap()["page"]
                    .as_u64()
                    .unwrap()
            })
            .collect();
        assert_eq!(pages, vec![1, 2, 3, 2]);
        assert_eq!(session.controller().page_number(), 2);
        assert_eq!(fetcher.requests().await.len(), 4);
    }

    #[tokio::test]
    async fn test_browse_requires_a_source() {
        let cli = Cli {
            config: None,
            format: OutputFormat::Pretty,
            verbose: false,
            command: Commands::Validate,
        };
        let runner = Runner::new(cli);
        let err = runner.browse(None, Some("quit"), None, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_browse_data_file_script() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("issues.json");
        std::fs::write(&data, r#"[{"id": "a"}, {"id": "b"}, {"id": "c"}]"#).unwrap();

        let cli = Cli {
            config: None,
            format: OutputFormat::Json,
            verbose: false,
            command: Commands::Validate,
        };
        Runner::new(cli)
            .browse(Some(&data), Some("next,prev,q"), Some(2), &[])
            .await
            .unwrap();
    }
}
