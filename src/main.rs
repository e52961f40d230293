use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cryptodash::config::{ClientConfig, ConfigError};
use cryptodash::net::api::Api;
use cryptodash::net::error::ApiError;
use cryptodash::net::gateway::{Gateway, Navigator};
use cryptodash::net::transport::{ReqwestTransport, TransportError};
use cryptodash::net::types::{
    CryptoPage, Credentials, Currency, Favorite, HistoryQuery, ListQuery, MarketMover, NewUser, PriceHistory,
};
use cryptodash::state::credential::{CredentialSlot, FileCredentialStore};
use cryptodash::state::gate::{self, GateDecision};
use cryptodash::state::pagination::PaginationState;
use cryptodash::state::request::RequestState;
use cryptodash::state::session::{SessionFailure, SessionStore};
use cryptodash::util::format::{format_day, format_market_cap, format_percentage, format_price};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Session(#[from] SessionFailure),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("request failed: {0}")]
    Request(String),
    #[error("not logged in; run `cryptodash login <username>` first")]
    NotLoggedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "cryptodash", about = "CryptoDash BFF command-line client")]
struct Cli {
    /// Overrides `CRYPTODASH_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "CRYPTODASH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        username: String,
        #[arg(long, env = "CRYPTODASH_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        role: Option<String>,
    },
    Logout,
    Whoami,
    List {
        #[arg(long, default_value = "usd")]
        currency: Currency,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
    },
    History(HistoryArgs),
    Summary {
        #[arg(long, default_value = "usd")]
        currency: Currency,
    },
    Favorites(FavoritesCommand),
}

#[derive(Args, Debug)]
struct HistoryArgs {
    coin_id: String,
    #[arg(long, default_value = "usd")]
    currency: Currency,
    #[arg(long, help = "YYYY-MM-DD; defaults to --days before today")]
    start_date: Option<String>,
    #[arg(long, help = "YYYY-MM-DD; defaults to today")]
    end_date: Option<String>,
    #[arg(long, help = "Window length in days [default: 7]")]
    days: Option<i64>,
}

#[derive(Args, Debug)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FavoritesSubcommand {
    List,
    Add { coin_id: String },
    Remove { favorite_id: i64 },
}

/// Points the user back at `login` when the backend rejects the stored token.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect_to_login(&self) {
        eprintln!("session expired; run `cryptodash login <username>` to sign in again");
    }
}

struct App {
    session: SessionStore,
    api: Api,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = build_app(cli.base_url.as_deref(), cli.json)?;

    match cli.command {
        Command::Login { username, password } => run_login(&app, username, password).await,
        Command::Signup { username, password, role } => run_signup(&app, username, password, role).await,
        Command::Logout => {
            app.session.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&app).await,
        Command::List { currency, page, per_page } => run_list(&app, currency, page, per_page).await,
        Command::History(args) => run_history(&app, args).await,
        Command::Summary { currency } => run_summary(&app, currency).await,
        Command::Favorites(favorites) => run_favorites(&app, favorites).await,
    }
}

fn build_app(base_url: Option<&str>, json: bool) -> Result<App, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url)?;
    }
    tracing::debug!(base_url = %config.base_url, state_dir = %config.state_dir.display(), "client configured");

    let store = Arc::new(FileCredentialStore::new(&config.state_dir));
    let slot = Arc::new(CredentialSlot::new(store));
    let transport = Arc::new(ReqwestTransport::from_config(&config)?);
    let gateway = Arc::new(Gateway::new(transport, slot, Arc::new(TerminalNavigator)));

    Ok(App { session: SessionStore::new(gateway.clone()), api: Api::new(&gateway), json })
}

/// Validate the stored credential and refuse protected commands without one.
async fn require_session(app: &App) -> Result<(), CliError> {
    app.session.bootstrap().await;
    let mut rx = app.session.subscribe();
    match gate::settle(&mut rx).await {
        GateDecision::Authenticated => Ok(()),
        GateDecision::Pending | GateDecision::Unauthenticated => Err(CliError::NotLoggedIn),
    }
}

// =============================================================================
// AUTH
// =============================================================================

async fn run_login(app: &App, username: String, password: String) -> Result<(), CliError> {
    app.session
        .login(&Credentials::new(username, password))
        .await?;
    let session = app.session.session();
    match session.user() {
        Some(user) if app.json => print_json(user),
        Some(user) => {
            println!("logged in as {}", user.name);
            Ok(())
        }
        None => Err(CliError::NotLoggedIn),
    }
}

async fn run_signup(app: &App, username: String, password: String, role: Option<String>) -> Result<(), CliError> {
    let user = NewUser { name: username, password, role };
    app.session.signup(&user).await?;
    println!("account created for {}; run `cryptodash login {}` to sign in", user.name, user.name);
    Ok(())
}

async fn run_whoami(app: &App) -> Result<(), CliError> {
    require_session(app).await?;
    let session = app.session.session();
    let Some(user) = session.user() else {
        return Err(CliError::NotLoggedIn);
    };
    if app.json {
        return print_json(user);
    }
    match &user.role {
        Some(role) => println!("{} ({role})", user.name),
        None => println!("{}", user.name),
    }
    Ok(())
}

// =============================================================================
// MARKET DATA
// =============================================================================

async fn run_list(app: &App, currency: Currency, page: u32, per_page: u32) -> Result<(), CliError> {
    require_session(app).await?;

    let mut pagination = PaginationState::starting_at(page);
    let query = ListQuery { currency, page: pagination.current_page(), per_page };
    let listing = RequestState::new(CryptoPage::default());
    listing
        .execute(|| app.api.crypto.list(&query))
        .await
        .map_err(CliError::Request)?;

    let page = listing.data();
    pagination.update_pagination(&page.page_info());
    if app.json {
        return print_json(&page);
    }

    for coin in &page.cryptocurrencies {
        let rank = coin
            .market_cap_rank
            .map_or_else(|| "-".to_owned(), |rank| rank.to_string());
        let price = coin
            .current_price
            .map_or_else(|| "N/A".to_owned(), |price| format_price(price, currency));
        let market_cap = coin
            .market_cap
            .map_or_else(|| "N/A".to_owned(), |cap| format_market_cap(cap, currency));
        println!(
            "{rank:>4}  {:<20} {:<6} {price:>16} {market_cap:>12} {:>9}",
            coin.name,
            coin.symbol.to_uppercase(),
            format_percentage(coin.price_change_percentage_24h),
        );
    }
    let full_page = page.cryptocurrencies.len() >= usize::try_from(per_page).unwrap_or(usize::MAX);
    let more = pagination.has_next() || (!pagination.total_known() && full_page);
    println!(
        "{}{}{}",
        pagination.position_label(),
        if pagination.has_prev() { "  [--page to go back]" } else { "" },
        if more { "  [more with --page]" } else { "" },
    );
    Ok(())
}

async fn run_history(app: &App, args: HistoryArgs) -> Result<(), CliError> {
    require_session(app).await?;

    let mut query = match args.days {
        Some(days) => HistoryQuery::ending_on(args.currency, time::OffsetDateTime::now_utc().date(), days),
        None => HistoryQuery::last_week(args.currency),
    };
    if args.start_date.is_some() {
        query.start_date = args.start_date;
    }
    if args.end_date.is_some() {
        query.end_date = args.end_date;
    }

    let history = RequestState::new(PriceHistory::default());
    history
        .execute(|| app.api.crypto.history(&args.coin_id, &query))
        .await
        .map_err(CliError::Request)?;
    let history = history.data();
    if app.json {
        return print_json(&history);
    }

    for point in &history.history {
        println!("{}  {:>16}", format_day(point.date), format_price(point.price, args.currency));
    }
    if let Some(stats) = history.stats() {
        println!(
            "min {}  max {}  avg {}",
            format_price(stats.min, args.currency),
            format_price(stats.max, args.currency),
            format_price(stats.avg, args.currency),
        );
    } else {
        println!("no price points in this window");
    }
    Ok(())
}

async fn run_summary(app: &App, currency: Currency) -> Result<(), CliError> {
    require_session(app).await?;
    let summary = app.api.market.summary(currency).await?;
    if app.json {
        return print_json(&summary);
    }

    if let Some(gainer) = &summary.top_gainer {
        println!("top gainer  {}", describe_mover(gainer, currency));
    }
    if let Some(loser) = &summary.top_loser {
        println!("top loser   {}", describe_mover(loser, currency));
    }
    for (i, mover) in summary.top_market_cap.iter().enumerate() {
        println!("#{:<2}        {}", i + 1, describe_mover(mover, currency));
    }
    Ok(())
}

fn describe_mover(mover: &MarketMover, currency: Currency) -> String {
    format!(
        "{} ({})  cap {}  24h {}",
        mover.name.as_deref().unwrap_or("?"),
        mover.symbol.as_deref().unwrap_or("?").to_uppercase(),
        mover
            .market_cap
            .map_or_else(|| "N/A".to_owned(), |cap| format_market_cap(cap, currency)),
        format_percentage(mover.percentage_change_24h),
    )
}

// =============================================================================
// FAVORITES
// =============================================================================

async fn run_favorites(app: &App, favorites: FavoritesCommand) -> Result<(), CliError> {
    require_session(app).await?;
    match favorites.command {
        FavoritesSubcommand::List => {
            let list = app.api.favorites.list().await?;
            if app.json {
                return print_json(&list);
            }
            if list.is_empty() {
                println!("no favorites yet");
            }
            for favorite in &list {
                print_favorite(favorite);
            }
            Ok(())
        }
        FavoritesSubcommand::Add { coin_id } => {
            let favorite = app.api.favorites.add(&coin_id).await?;
            if app.json {
                return print_json(&favorite);
            }
            print_favorite(&favorite);
            Ok(())
        }
        FavoritesSubcommand::Remove { favorite_id } => {
            app.api.favorites.remove(favorite_id).await?;
            println!("removed favorite {favorite_id}");
            Ok(())
        }
    }
}

fn print_favorite(favorite: &Favorite) {
    println!("{:>6}  {}", favorite.id, favorite.coin_id);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
