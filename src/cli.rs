//! The `kubera` command-line interface.
//!
//! Commands write their normal output to the writer passed to [`run`] and
//! leave error rendering to [`report`], so the binary and the tests share one
//! code path.

use crate::cache::PortfolioCache;
use crate::client::{Client, ClientConfig};
use crate::credentials::{default_sources, resolve_credentials};
use crate::error::KuberaError;
use crate::format;
use crate::response::decode;
use crate::types::{Category, Item, PortfolioDetail, PortfolioSummary, UpdateItemRequest};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

const UPDATE_PERMISSION_HINT: &str =
    "Hint: enable update permissions for this API key in Kubera, or use a key that has them.";

/// Kubera API command-line interface.
///
/// Credentials are read from --api-key/--secret, then the KUBERA_API_KEY and
/// KUBERA_SECRET environment variables, then ~/.env.
///
/// Update operations require an API key with update permissions enabled.
/// Some API keys are restricted to specific IP addresses.
#[derive(Debug, Parser)]
#[command(name = "kubera", version)]
pub struct Cli {
    /// Kubera API key
    #[arg(long, env = "KUBERA_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Kubera API secret
    #[arg(long, env = "KUBERA_SECRET", global = true, hide_env_values = true)]
    pub secret: Option<String>,

    /// API base URL
    #[arg(long, env = "KUBERA_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    pub raw: bool,

    /// Location of the portfolio index cache
    #[arg(long, env = "KUBERA_CACHE_PATH", global = true, hide = true)]
    pub cache_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Test the API connection and verify credentials
    Test,
    /// List all portfolios and remember their indexes
    List,
    /// Show detailed portfolio information
    Show {
        /// Portfolio index from `kubera list` (1, 2, ...) or full ID
        portfolio: String,
        /// Show as a tree view
        #[arg(long)]
        tree: bool,
    },
    /// Drill down into one sheet of a category
    Drill {
        /// Portfolio index or full ID
        portfolio: String,
        /// Category: asset, debt or insurance
        category: String,
        /// Sheet name, e.g. "Investments"
        sheet: String,
    },
    /// Update an asset or debt (needs an API key with update permissions)
    Update {
        /// Asset or debt ID
        item_id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New value
        #[arg(long)]
        value: Option<f64>,
        /// New cost basis
        #[arg(long)]
        cost: Option<f64>,
    },
    /// Browse portfolios interactively
    Interactive,
}

/// A failed command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{context}: {}", .source.message())]
    Api {
        context: &'static str,
        #[source]
        source: KuberaError,
    },

    #[error("{0}")]
    Usage(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The command already printed its own failure report.
    #[error("command failed")]
    Reported,
}

impl CliError {
    fn api(context: &'static str) -> impl FnOnce(KuberaError) -> CliError {
        move |source| CliError::Api { context, source }
    }
}

/// Print a failed command to stderr.
pub fn report(err: &CliError) {
    match err {
        CliError::Reported => {}
        CliError::Api {
            source: KuberaError::Permission { .. },
            ..
        } => {
            eprintln!("✗ {err}");
            eprintln!("  {UPDATE_PERMISSION_HINT}");
        }
        _ => eprintln!("✗ {err}"),
    }
}

/// Run one CLI invocation, writing its output to `out`.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<(), CliError> {
    let client = connect(&cli)?;
    let cache = match &cli.cache_path {
        Some(path) => PortfolioCache::new(path),
        None => PortfolioCache::default_location()
            .map_err(CliError::api("Failed to open portfolio cache"))?,
    };

    let mut session = Session {
        client: &client,
        cache: &cache,
        raw: cli.raw,
        out,
    };

    let result = match cli.command {
        Command::Test => session.test().await,
        Command::List => session.list().await,
        Command::Show { portfolio, tree } => session.show(&portfolio, tree).await,
        Command::Drill {
            portfolio,
            category,
            sheet,
        } => session.drill(&portfolio, &category, &sheet).await,
        Command::Update {
            item_id,
            name,
            description,
            value,
            cost,
        } => {
            let updates = UpdateItemRequest {
                name,
                description,
                value,
                cost,
            };
            session.update(&item_id, &updates).await
        }
        Command::Interactive => session.interactive().await,
    };

    client.close();
    result
}

fn connect(cli: &Cli) -> Result<Client, CliError> {
    let sources = default_sources(cli.api_key.clone(), cli.secret.clone());
    let credentials =
        resolve_credentials(&sources).map_err(CliError::api("Failed to initialize client"))?;
    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        ..Default::default()
    };
    Client::with_config(credentials, config).map_err(CliError::api("Failed to initialize client"))
}

struct Session<'a, W> {
    client: &'a Client,
    cache: &'a PortfolioCache,
    raw: bool,
    out: &'a mut W,
}

impl<W: Write> Session<'_, W> {
    async fn list(&mut self) -> Result<(), CliError> {
        let (raw, portfolios) = self.fetch_portfolios().await?;
        self.remember(&portfolios);

        if self.raw {
            writeln!(self.out, "{}", format::raw_json(&raw))?;
        } else {
            writeln!(self.out, "{}", format::portfolio_list(&portfolios))?;
        }
        Ok(())
    }

    async fn show(&mut self, portfolio: &str, tree: bool) -> Result<(), CliError> {
        let id = self.resolve(portfolio)?;
        let (raw, detail) = self.fetch_portfolio(&id).await?;

        if tree {
            write!(self.out, "{}", format::portfolio_tree(&detail))?;
        } else if self.raw {
            writeln!(self.out, "{}", format::raw_json(&raw))?;
        } else {
            write!(self.out, "{}", format::portfolio_detail(&detail))?;
        }
        Ok(())
    }

    async fn drill(
        &mut self,
        portfolio: &str,
        category: &str,
        sheet: &str,
    ) -> Result<(), CliError> {
        let category: Category = category.parse().map_err(CliError::Usage)?;
        let id = self.resolve(portfolio)?;
        let (_, detail) = self.fetch_portfolio(&id).await?;

        let items = detail.sheet_items(category, sheet);
        if items.is_empty() {
            return Err(CliError::Usage(format!(
                "No items found in sheet '{sheet}' for category '{category}'. \
                 Check sheet name with 'kubera show {portfolio}'"
            )));
        }

        if self.raw {
            let value = serde_json::to_value(&items)
                .map_err(|e| KuberaError::Decode(e.to_string()))
                .map_err(CliError::api("Failed to render sheet"))?;
            writeln!(self.out, "{}", format::raw_json(&value))?;
        } else {
            let name = detail.name.as_deref().unwrap_or("Portfolio");
            write!(self.out, "{}", format::sheet_detail(&items, sheet, category, name))?;
        }
        Ok(())
    }

    async fn update(&mut self, item_id: &str, updates: &UpdateItemRequest) -> Result<(), CliError> {
        if updates.is_empty() {
            return Err(CliError::Usage(
                "No updates specified. Use --name, --description, --value, or --cost".to_string(),
            ));
        }

        let raw = self
            .client
            .items()
            .update_raw(item_id, updates)
            .await
            .map_err(CliError::api("Failed to update item"))?;
        let item: Item = decode(raw.clone()).map_err(CliError::api("Failed to update item"))?;

        writeln!(
            self.out,
            "✓ Successfully updated item: {}",
            item.name.as_deref().unwrap_or(item_id)
        )?;
        if self.raw {
            writeln!(self.out, "{}", format::raw_json(&raw))?;
        } else {
            write!(self.out, "{}", format::item_detail(&item))?;
        }
        Ok(())
    }

    async fn test(&mut self) -> Result<(), CliError> {
        if !self.raw {
            writeln!(self.out, "Testing Kubera API connection...\n")?;
            writeln!(self.out, "→ Loading credentials...")?;
            writeln!(self.out, "→ Fetching portfolios...")?;
        }

        match self.run_checks().await {
            Ok(()) => Ok(()),
            Err(CliError::Api { source, .. }) => {
                self.report_failed_checks(&source)?;
                Err(CliError::Reported)
            }
            Err(other) => Err(other),
        }
    }

    async fn run_checks(&mut self) -> Result<(), CliError> {
        let (raw_list, portfolios) = self.fetch_portfolios().await?;

        if self.raw {
            let mut result = json!({
                "status": "success",
                "portfolios_count": portfolios.len(),
                "portfolios": raw_list,
            });
            if let Some(first) = portfolios.first() {
                let (raw_detail, _) = self.fetch_portfolio(&first.id).await?;
                result["sample_portfolio"] = raw_detail;
            }
            writeln!(self.out, "{}", format::raw_json(&result))?;
            return Ok(());
        }

        writeln!(self.out, "✓ Successfully connected to Kubera API!")?;
        writeln!(self.out, "✓ Found {} portfolio(s)", portfolios.len())?;

        let Some(first) = portfolios.first() else {
            writeln!(self.out, "\nNo portfolios found (account may be empty).")?;
            writeln!(self.out, "✓ Connection successful, but no portfolios available.")?;
            return Ok(());
        };

        writeln!(self.out, "\nPortfolios:")?;
        for (idx, p) in portfolios.iter().enumerate() {
            writeln!(
                self.out,
                "  {}. {} (ID: {}, Currency: {})",
                idx + 1,
                p.name,
                p.id,
                p.currency
            )?;
        }

        writeln!(self.out, "\n→ Fetching detailed data for first portfolio...")?;
        let (_, detail) = self.fetch_portfolio(&first.id).await?;
        writeln!(
            self.out,
            "✓ Portfolio: {}",
            detail.name.as_deref().unwrap_or(&first.name)
        )?;
        writeln!(self.out, "  - Assets: {}", detail.assets.len())?;
        writeln!(self.out, "  - Debts: {}", detail.debts.len())?;
        writeln!(self.out, "  - Insurance: {}", detail.insurance.len())?;
        if let Some(net_worth) = &detail.net_worth {
            let currency = net_worth
                .currency()
                .or(detail.currency.as_deref())
                .unwrap_or(&first.currency);
            writeln!(
                self.out,
                "  - Net Worth: {}",
                format::format_currency(net_worth.amount(), currency)
            )?;
        }

        writeln!(self.out, "\n{}", "=".repeat(50))?;
        writeln!(
            self.out,
            "✓ All tests passed! Your Kubera API client is working correctly."
        )?;
        Ok(())
    }

    fn report_failed_checks(&mut self, err: &KuberaError) -> Result<(), CliError> {
        if self.raw {
            let mut doc = json!({"status": "error", "error": err.message()});
            if let Some(status) = err.status_code() {
                doc["status_code"] = json!(status);
            }
            writeln!(self.out, "{}", format::raw_json(&doc))?;
            return Ok(());
        }

        writeln!(self.out, "✗ API Error: {}", err.message())?;
        if let Some(status) = err.status_code() {
            writeln!(self.out, "  Status Code: {status}")?;
        }
        writeln!(self.out, "\nPlease check:")?;
        writeln!(self.out, "  1. Your credentials in ~/.env are correct")?;
        writeln!(self.out, "  2. KUBERA_API_KEY and KUBERA_SECRET are set")?;
        writeln!(self.out, "  3. Your API key has not exceeded rate limits")?;
        writeln!(
            self.out,
            "  4. Your IP address is allowed (if IP restrictions are enabled)"
        )?;
        writeln!(
            self.out,
            "  5. API key has required permissions (read for list/show, update for modifications)"
        )?;
        Ok(())
    }

    async fn interactive(&mut self) -> Result<(), CliError> {
        let mut input = BufReader::new(tokio::io::stdin()).lines();
        let outcome = tokio::select! {
            result = self.browse(&mut input) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(result) => result,
            None => {
                writeln!(self.out, "\n\nGoodbye!")?;
                Ok(())
            }
        }
    }

    async fn browse<R>(&mut self, input: &mut Lines<R>) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
    {
        let (_, portfolios) = self.fetch_portfolios().await?;
        if portfolios.is_empty() {
            return Err(CliError::Usage("No portfolios found.".to_string()));
        }
        self.remember(&portfolios);
        writeln!(self.out, "{}", format::portfolio_list(&portfolios))?;

        write!(
            self.out,
            "\nEnter portfolio index or ID to view details (or 'q' to quit): "
        )?;
        self.out.flush()?;
        let choice = input.next_line().await?.unwrap_or_default();
        let choice = choice.trim();
        if choice.is_empty() || choice.eq_ignore_ascii_case("q") {
            return Ok(());
        }

        let id = self.cache.resolve(choice).ok_or_else(|| {
            CliError::Usage(format!("Invalid portfolio identifier: '{choice}'"))
        })?;
        let (_, detail) = self.fetch_portfolio(&id).await?;
        write!(self.out, "{}", format::portfolio_detail(&detail))?;

        write!(self.out, "\nShow as tree view? (y/n): ")?;
        self.out.flush()?;
        let answer = input.next_line().await?.unwrap_or_default();
        if answer.trim().eq_ignore_ascii_case("y") {
            write!(self.out, "{}", format::portfolio_tree(&detail))?;
        }
        Ok(())
    }

    async fn fetch_portfolios(&self) -> Result<(Value, Vec<PortfolioSummary>), CliError> {
        let raw = self
            .client
            .portfolios()
            .list_raw()
            .await
            .map_err(CliError::api("Failed to fetch portfolios"))?;
        let portfolios = decode(raw.clone()).map_err(CliError::api("Failed to fetch portfolios"))?;
        Ok((raw, portfolios))
    }

    async fn fetch_portfolio(&self, id: &str) -> Result<(Value, PortfolioDetail), CliError> {
        let raw = self
            .client
            .portfolios()
            .get_raw(id)
            .await
            .map_err(CliError::api("Failed to fetch portfolio"))?;
        let detail = decode(raw.clone()).map_err(CliError::api("Failed to fetch portfolio"))?;
        Ok((raw, detail))
    }

    fn resolve(&self, id_or_index: &str) -> Result<String, CliError> {
        self.cache.resolve(id_or_index).ok_or_else(|| {
            CliError::Usage(format!(
                "Invalid portfolio identifier: '{id_or_index}'. \
                 Run 'kubera list' to see available portfolios."
            ))
        })
    }

    fn remember(&self, portfolios: &[PortfolioSummary]) {
        if let Err(e) = self.cache.save(portfolios) {
            tracing::warn!(error = %e, "could not save portfolio cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use crate::credentials::Credentials;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_flags() {
        let cli = Cli::try_parse_from([
            "kubera", "update", "item123", "--value", "50000", "--cost", "45000", "--raw",
        ])
        .unwrap();

        assert!(cli.raw);
        match cli.command {
            Command::Update {
                item_id,
                value,
                cost,
                name,
                ..
            } => {
                assert_eq!(item_id, "item123");
                assert_eq!(value, Some(50000.0));
                assert_eq!(cost, Some(45000.0));
                assert_eq!(name, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_tree_and_drill() {
        let cli = Cli::try_parse_from(["kubera", "show", "1", "--tree"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Show { ref portfolio, tree: true } if portfolio == "1"
        ));

        let cli = Cli::try_parse_from(["kubera", "drill", "2", "asset", "Investments"]).unwrap();
        assert!(matches!(cli.command, Command::Drill { ref sheet, .. } if sheet == "Investments"));

        assert!(Cli::try_parse_from(["kubera", "drill", "2", "asset"]).is_err());
    }

    #[test]
    fn test_error_rendering() {
        let err = CliError::Api {
            context: "Failed to update item",
            source: KuberaError::Permission {
                message: "Permission denied: Forbidden".to_string(),
                status_code: 403,
                raw_body: None,
            },
        };
        assert_eq!(
            err.to_string(),
            "Failed to update item: Permission denied: Forbidden"
        );

        let err = CliError::Usage("No portfolios found.".to_string());
        assert_eq!(err.to_string(), "No portfolios found.");
    }

    #[tokio::test]
    async fn test_browse_quits_on_q() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/data/portfolio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "portfolio_001", "name": "Personal", "currency": "USD"}],
                "errorCode": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::with_config(
            Credentials::new("test_key", "test_secret").unwrap(),
            ClientConfig {
                base_url: Some(server.uri()),
                ..Default::default()
            },
        )
        .unwrap();
        let cache = PortfolioCache::new(
            std::env::temp_dir()
                .join(format!("kubera-cli-{}", uuid::Uuid::new_v4()))
                .join("portfolio_cache.json"),
        );
        let mut out = Vec::new();
        let mut session = Session {
            client: &client,
            cache: &cache,
            raw: false,
            out: &mut out,
        };

        let mut input = BufReader::new(&b"q\n"[..]).lines();
        session.browse(&mut input).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Personal"));
        assert!(text.contains("'q' to quit"));
        assert_eq!(cache.resolve("1").as_deref(), Some("portfolio_001"));
        std::fs::remove_dir_all(cache.path().parent().unwrap()).unwrap();
    }
}
