use buysearch_cli::CliContext;
use buysearch_cli::commands::{self, StatusArgs};
use buysearch_cli::logging;
use buysearch_cli::readline;
use clap::{Parser, Subcommand};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let ctx = CliContext::new()?;
    ctx.restart_pollers().await;

    while let Some(line) = readline()? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "buysearch shell")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search products, optionally replacing the search text
    Search { text: Option<String> },
    /// Next page of the last search
    Page,
    #[command(subcommand)]
    Filter(FilterCommand),
    /// Let the backend turn free text into filters
    Parse { text: String },
    /// Print the current filters as a url fragment
    Url,
    /// Replace the current filters with a url fragment
    OpenUrl { fragment: String },
    #[command(subcommand)]
    Saved(SavedCommand),
    #[command(subcommand)]
    Fav(FavCommand),
    /// Price history of a product
    History { product_id: i64 },
    #[command(subcommand)]
    Notifications(NotificationCommand),
    /// Scraper status tables (admin)
    Status {
        /// Header click on a scraper column (name, startTime, eta, ...)
        #[arg(long)]
        sort: Option<String>,
        /// Filter scrapers by name; pass "" to clear
        #[arg(long)]
        search: Option<String>,
        /// Expand or collapse a scraper's run history
        #[arg(long)]
        expand: Option<String>,
        /// Scraper whose history table --history-sort/--history-search target
        #[arg(long)]
        history: Option<String>,
        #[arg(long, requires = "history")]
        history_sort: Option<String>,
        #[arg(long, requires = "history")]
        history_search: Option<String>,
        #[arg(long)]
        collapse_all: bool,
    },
    /// Admin statistics
    Stats,
    Login { email: String, password: String },
    Logout,
    Whoami,
    #[command(subcommand)]
    Config(ConfigCommand),
    Exit,
}

#[derive(Subcommand)]
enum FilterCommand {
    Show,
    /// Set a field: search, sort, gender, price, favourites, price-change,
    /// on-sale, or a facet (brand, category, color, source) as a comma list
    Set { field: String, value: String },
    Toggle { facet: String, value: String },
    Clear { facet: String },
    Reset,
    /// Applied filter actions, oldest first
    Journal,
}

#[derive(Subcommand)]
enum SavedCommand {
    List,
    Save { name: String },
    Load { name: String },
    Delete { name: String },
}

#[derive(Subcommand)]
enum FavCommand {
    List,
    Toggle { product_id: i64 },
}

#[derive(Subcommand)]
enum NotificationCommand {
    List {
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    Seen { ids: Vec<i64> },
    Count,
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    Set { key: String, value: String },
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "buysearch".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Search { text }) => commands::search(ctx, text).await?,
        Some(Commands::Page) => commands::next_page(ctx).await?,
        Some(Commands::Filter(cmd)) => match cmd {
            FilterCommand::Show => commands::show_filters(ctx).await?,
            FilterCommand::Set { field, value } => commands::set_filter(ctx, &field, &value).await?,
            FilterCommand::Toggle { facet, value } => {
                commands::toggle_filter(ctx, &facet, &value).await?
            }
            FilterCommand::Clear { facet } => commands::clear_filter(ctx, &facet).await?,
            FilterCommand::Reset => commands::reset_filters(ctx).await?,
            FilterCommand::Journal => commands::filter_journal(ctx).await?,
        },
        Some(Commands::Parse { text }) => commands::parse_text(ctx, &text).await?,
        Some(Commands::Url) => commands::print_url(ctx).await?,
        Some(Commands::OpenUrl { fragment }) => commands::open_url(ctx, &fragment).await?,
        Some(Commands::Saved(cmd)) => match cmd {
            SavedCommand::List => commands::list_saved(ctx).await?,
            SavedCommand::Save { name } => commands::save_filters(ctx, &name).await?,
            SavedCommand::Load { name } => commands::load_saved(ctx, &name).await?,
            SavedCommand::Delete { name } => commands::delete_saved(ctx, &name).await?,
        },
        Some(Commands::Fav(cmd)) => match cmd {
            FavCommand::List => commands::list_favourites(ctx).await?,
            FavCommand::Toggle { product_id } => commands::toggle_favourite(ctx, product_id).await?,
        },
        Some(Commands::History { product_id }) => commands::price_history(ctx, product_id).await?,
        Some(Commands::Notifications(cmd)) => match cmd {
            NotificationCommand::List { offset } => commands::list_notifications(ctx, offset).await?,
            NotificationCommand::Seen { ids } => commands::mark_seen(ctx, &ids).await?,
            NotificationCommand::Count => commands::unseen_count(ctx).await?,
        },
        Some(Commands::Status {
            sort,
            search,
            expand,
            history,
            history_sort,
            history_search,
            collapse_all,
        }) => {
            let args = StatusArgs {
                sort,
                search,
                expand,
                history,
                history_sort,
                history_search,
                collapse_all,
            };
            commands::scraper_status(ctx, args).await?
        }
        Some(Commands::Stats) => commands::show_stats(ctx).await?,
        Some(Commands::Login { email, password }) => commands::login(ctx, &email, &password).await?,
        Some(Commands::Logout) => commands::logout(ctx).await?,
        Some(Commands::Whoami) => commands::whoami(ctx).await?,
        Some(Commands::Config(cmd)) => match cmd {
            ConfigCommand::Show => commands::show_config(ctx).await?,
            ConfigCommand::Set { key, value } => commands::set_config(ctx, &key, &value).await?,
        },
        Some(Commands::Exit) => {
            commands::exit(ctx).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
