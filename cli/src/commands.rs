use std::io::Write;

use chrono::Utc;

use buysearch_core::scrape::{history_rows, scraper_rows};
use buysearch_core::types::{
    Facet, Gender, LoginRequest, MultiSelect, NewSavedFilterSet, PriceRange, SortMode,
};
use buysearch_core::{
    AdminGate, AdminStats, ApiError, FavouriteAction, FavouritesStore, FilterAction, Loadable,
    ProductQuery, SavedFilters, codec,
};

use crate::CliContext;
use crate::render;

const NOTIFICATION_PAGE: u64 = 20;
const STATS_TOP: usize = 10;

fn api_err(e: ApiError) -> String {
    if e.is_auth() {
        "not logged in or session expired (use `login`)".to_string()
    } else {
        e.to_string()
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected true/false, got '{other}'")),
    }
}

/// Parse `50-100`, `-50`, `500-` or a preset label such as `Under 50`.
fn parse_price_range(value: &str) -> Result<PriceRange, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("all") {
        return Ok(PriceRange::all());
    }
    if let Some(preset) = PriceRange::presets()
        .into_iter()
        .find(|p| p.label.eq_ignore_ascii_case(value))
    {
        return Ok(preset);
    }
    let (from, to) = value
        .split_once('-')
        .ok_or_else(|| format!("invalid price range '{value}'"))?;
    let bound = |s: &str| -> Result<Option<f64>, String> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
                _ => Err(format!("invalid price '{s}'")),
            }
        }
    };
    let (from, to) = (bound(from)?, bound(to)?);
    match (from, to) {
        (None, None) => Err("price range needs at least one bound".to_string()),
        (Some(f), Some(t)) if f > t => Err(format!("{f} is above {t}")),
        _ => Ok(PriceRange::new(
            buysearch_core::filters::price_label(from, to),
            from,
            to,
        )),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Products
// ─────────────────────────────────────────────────────────────────────────────

pub async fn search(ctx: &CliContext, text: Option<String>) -> Result<(), String> {
    if let Some(text) = text {
        ctx.dispatch(FilterAction::SetSearch(text)).await;
    }
    let limit = ctx.config.read().await.page_size;
    fetch_products(ctx, ProductQuery::new(ctx.selection().await, 0, limit)).await
}

pub async fn next_page(ctx: &CliContext) -> Result<(), String> {
    let offset = ctx
        .last_page
        .read()
        .await
        .as_ref()
        .and_then(|page| page.next_offset())
        .ok_or("no further pages (run `search` first)")?;
    let limit = ctx.config.read().await.page_size;
    fetch_products(ctx, ProductQuery::new(ctx.selection().await, offset, limit)).await
}

async fn fetch_products(ctx: &CliContext, query: ProductQuery) -> Result<(), String> {
    let ticket = ctx.product_fence.issue();
    let result = ctx.api().await.products(&query).await;
    let Some(result) = ctx.product_fence.accept(ticket, result) else {
        return Ok(());
    };
    let mut page = result.map_err(api_err)?;
    ctx.favourites.read().await.mark(&mut page.items);
    render::print_products(&page);
    *ctx.last_page.write().await = Some(page);
    Ok(())
}

pub async fn price_history(ctx: &CliContext, product_id: i64) -> Result<(), String> {
    let history = ctx.api().await.price_history(product_id).await.map_err(|e| {
        if e.is_not_found() {
            format!("product {product_id} has no price history")
        } else {
            api_err(e)
        }
    })?;
    render::print_price_history(&history);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_filters(ctx: &CliContext) -> Result<(), String> {
    render::print_selection(&ctx.selection().await);
    Ok(())
}

pub async fn set_filter(ctx: &CliContext, field: &str, value: &str) -> Result<(), String> {
    let action = match field {
        "search" => FilterAction::SetSearch(value.to_string()),
        "sort" => FilterAction::SetSort(value.parse::<SortMode>()?),
        "gender" => FilterAction::SetGender(value.parse::<Gender>()?),
        "price" => FilterAction::SetPriceRange(parse_price_range(value)?),
        "favourites" => FilterAction::SetFavouritesOnly(parse_bool(value)?),
        "price-change" => FilterAction::SetPriceChangeOnly(parse_bool(value)?),
        "on-sale" => FilterAction::SetOnSale(match value {
            "any" => None,
            other => Some(parse_bool(other)?),
        }),
        facet => {
            let facet = facet.parse::<Facet>()?;
            let values = value.split(',').map(str::trim).filter(|v| !v.is_empty());
            FilterAction::SetFacet(facet, MultiSelect::from_values(values))
        }
    };
    report_change(ctx, action).await
}

pub async fn toggle_filter(ctx: &CliContext, facet: &str, value: &str) -> Result<(), String> {
    let facet = facet.parse::<Facet>()?;
    report_change(ctx, FilterAction::ToggleFacet(facet, value.to_string())).await
}

pub async fn clear_filter(ctx: &CliContext, facet: &str) -> Result<(), String> {
    let facet = facet.parse::<Facet>()?;
    report_change(ctx, FilterAction::ClearFacet(facet)).await
}

pub async fn reset_filters(ctx: &CliContext) -> Result<(), String> {
    report_change(ctx, FilterAction::Reset).await
}

async fn report_change(ctx: &CliContext, action: FilterAction) -> Result<(), String> {
    let name = action.name();
    if ctx.dispatch(action).await {
        println!("{name}: {}", codec::to_fragment(&ctx.selection().await));
    } else {
        println!("{name}: unchanged");
    }
    Ok(())
}

/// Send free text to the backend parser and apply whatever it recognised.
pub async fn parse_text(ctx: &CliContext, text: &str) -> Result<(), String> {
    let ticket = ctx.parse_fence.issue();
    let result = ctx.api().await.parse_search(text).await;
    let Some(result) = ctx.parse_fence.accept(ticket, result) else {
        return Ok(());
    };
    let parsed = result.map_err(api_err)?;
    report_change(ctx, FilterAction::ApplyParsedQuery(parsed)).await
}

pub async fn print_url(ctx: &CliContext) -> Result<(), String> {
    println!("{}", codec::to_fragment(&ctx.selection().await));
    Ok(())
}

/// Replace the selection with defaults overlaid by a fragment.
pub async fn open_url(ctx: &CliContext, fragment: &str) -> Result<(), String> {
    let patch = codec::decode(fragment);
    if patch.is_empty() {
        println!("fragment carried no recognised filters, using defaults");
    }
    report_change(ctx, FilterAction::Reseed(patch)).await
}

pub async fn filter_journal(ctx: &CliContext) -> Result<(), String> {
    let store = ctx.filters.lock().await;
    for transition in store.journal() {
        println!("{:>5} {}", transition.revision, transition.action.name());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Saved filters & favourites
// ─────────────────────────────────────────────────────────────────────────────

async fn refresh_saved(ctx: &CliContext) -> Result<(), String> {
    let sets = ctx.api().await.saved_filters().await.map_err(api_err)?;
    *ctx.saved.write().await = SavedFilters::new(sets);
    Ok(())
}

pub async fn list_saved(ctx: &CliContext) -> Result<(), String> {
    refresh_saved(ctx).await?;
    render::print_saved(ctx.saved.read().await.sets());
    Ok(())
}

/// Save the current selection, overwriting a set with the same name.
pub async fn save_filters(ctx: &CliContext, name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("a saved filter set needs a name".to_string());
    }
    refresh_saved(ctx).await?;
    let request: NewSavedFilterSet = SavedFilters::snapshot(name, &*ctx.filters.lock().await);
    let existing = ctx.saved.read().await.find_by_name(name).map(|s| s.id);

    let api = ctx.api().await;
    let saved = match existing {
        Some(id) => api.update_saved_filter(id, &request).await,
        None => api.create_saved_filter(&request).await,
    }
    .map_err(api_err)?;

    println!("saved '{}' ({} filters)", saved.name, saved.filters.active_constraints());
    ctx.saved.write().await.upsert(saved);
    Ok(())
}

pub async fn load_saved(ctx: &CliContext, name: &str) -> Result<(), String> {
    refresh_saved(ctx).await?;
    let changed = {
        let saved = ctx.saved.read().await;
        let id = saved
            .find_by_name(name)
            .map(|s| s.id)
            .ok_or_else(|| format!("no saved filter set named '{name}'"))?;
        saved.load_into(id, &mut *ctx.filters.lock().await)
    };
    if changed {
        ctx.persist_fragment().await;
    }
    report_loaded(ctx, name, changed).await
}

async fn report_loaded(ctx: &CliContext, name: &str, changed: bool) -> Result<(), String> {
    if changed {
        println!("loaded '{name}'");
        render::print_selection(&ctx.selection().await);
    } else {
        println!("'{name}' already matches the current filters");
    }
    Ok(())
}

pub async fn delete_saved(ctx: &CliContext, name: &str) -> Result<(), String> {
    refresh_saved(ctx).await?;
    let id = ctx
        .saved
        .read()
        .await
        .find_by_name(name)
        .map(|s| s.id)
        .ok_or_else(|| format!("no saved filter set named '{name}'"))?;
    ctx.api().await.delete_saved_filter(id).await.map_err(api_err)?;
    ctx.saved.write().await.remove(id);
    println!("deleted '{name}'");
    Ok(())
}

pub async fn list_favourites(ctx: &CliContext) -> Result<(), String> {
    let products = ctx.api().await.favourites().await.map_err(api_err)?;
    *ctx.favourites.write().await = FavouritesStore::from_products(&products);
    if products.is_empty() {
        println!("No favourites yet");
        return Ok(());
    }
    for product in &products {
        println!(
            "{:<8} {} {}",
            product.id,
            product.brand.as_deref().unwrap_or(""),
            product.title
        );
    }
    Ok(())
}

pub async fn toggle_favourite(ctx: &CliContext, product_id: i64) -> Result<(), String> {
    let action = ctx
        .favourites
        .read()
        .await
        .resolve(FavouriteAction::Toggle(product_id));
    let api = ctx.api().await;
    match &action {
        FavouriteAction::Add(id) => api.add_favourite(*id).await,
        FavouriteAction::Remove(id) => api.remove_favourite(*id).await,
        _ => Ok(()),
    }
    .map_err(api_err)?;

    let added = matches!(action, FavouriteAction::Add(_));
    ctx.favourites.write().await.dispatch(action);
    if let Some(page) = ctx.last_page.write().await.as_mut() {
        ctx.favourites.read().await.mark(&mut page.items);
    }
    println!(
        "product {product_id} {}",
        if added { "added to favourites" } else { "removed from favourites" }
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Notifications
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list_notifications(ctx: &CliContext, offset: u64) -> Result<(), String> {
    let page = ctx
        .api()
        .await
        .notifications(offset, NOTIFICATION_PAGE)
        .await
        .map_err(api_err)?;
    render::print_notifications(&page);
    Ok(())
}

pub async fn mark_seen(ctx: &CliContext, ids: &[i64]) -> Result<(), String> {
    if ids.is_empty() {
        return Err("give at least one notification id".to_string());
    }
    ctx.api().await.mark_seen(ids).await.map_err(api_err)?;
    if let Some(poller) = ctx.tasks.lock().await.unseen_notifications.as_ref() {
        poller.refresh_now();
    }
    println!("marked {} as seen", ids.len());
    Ok(())
}

/// Unseen count from the background poller, or a direct fetch if none runs.
pub async fn unseen_count(ctx: &CliContext) -> Result<(), String> {
    let polled = ctx
        .tasks
        .lock()
        .await
        .unseen_notifications
        .as_ref()
        .map(|p| p.latest());
    let count = match polled {
        Some(Loadable::Ready(count)) => count,
        Some(Loadable::Failed(e)) => return Err(e),
        Some(Loadable::Loading) | None => ctx.api().await.unseen_count().await.map_err(api_err)?,
    };
    println!("{count} unseen");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin
// ─────────────────────────────────────────────────────────────────────────────

async fn require_admin(ctx: &CliContext) -> Result<(), String> {
    match ctx.session.read().await.admin_gate(Utc::now()) {
        AdminGate::Allowed => Ok(()),
        AdminGate::Pending | AdminGate::Denied => Err("admin access required".to_string()),
    }
}

#[derive(Debug, Default)]
pub struct StatusArgs {
    pub sort: Option<String>,
    pub search: Option<String>,
    pub expand: Option<String>,
    pub history: Option<String>,
    pub history_sort: Option<String>,
    pub history_search: Option<String>,
    pub collapse_all: bool,
}

pub async fn scraper_status(ctx: &CliContext, args: StatusArgs) -> Result<(), String> {
    require_admin(ctx).await?;
    let summaries = ctx.api().await.scraping_summary().await.map_err(api_err)?;
    let cap = ctx.config.read().await.row_cap;
    let now = Utc::now();

    let mut table = ctx.scraper_table.lock().await;
    if let Some(search) = args.search {
        table.search = search;
    }
    if let Some(column) = args.sort {
        table.handle_sort(column.parse()?);
    }

    let mut view = ctx.history_view.lock().await;
    if args.collapse_all {
        view.collapse_all();
    }
    if let Some(name) = args.expand {
        view.toggle_expanded(&name);
    }
    if let Some(name) = args.history {
        if let Some(search) = args.history_search {
            view.set_search(&name, search);
        }
        if let Some(column) = args.history_sort {
            view.handle_sort(&name, column.parse()?);
        }
    }

    let rows = scraper_rows(&summaries, &table, now, cap);
    render::print_scrapers(&rows, &table.sort);

    for summary in &summaries {
        if !view.is_expanded(&summary.name) || !rows.iter().any(|r| r.name == summary.name) {
            continue;
        }
        let sort = view.sort_state(&summary.name);
        let runs = history_rows(&summary.history, view.search(&summary.name), &sort, now, cap);
        println!("\n  {} ({} runs)", summary.name, summary.history.len());
        render::print_history(&runs, &sort);
    }
    Ok(())
}

/// Fetch every statistics panel concurrently; each resolves on its own.
pub async fn show_stats(ctx: &CliContext) -> Result<(), String> {
    require_admin(ctx).await?;
    let api = ctx.api().await;
    let (products, sources, brands, categories, price_changes) = tokio::join!(
        api.product_totals(),
        api.source_counts(),
        api.brand_counts(),
        api.category_counts(),
        api.price_change_counts(),
    );
    let stats = AdminStats {
        products: Loadable::from_result(products),
        sources: Loadable::from_result(sources),
        brands: Loadable::from_result(brands),
        categories: Loadable::from_result(categories),
        price_changes: Loadable::from_result(price_changes),
    };
    for (panel, error) in stats.failures() {
        tracing::warn!(panel, error, "stats panel failed");
    }
    render::print_stats(&stats, STATS_TOP);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Session & config
// ─────────────────────────────────────────────────────────────────────────────

pub async fn login(ctx: &CliContext, email: &str, password: &str) -> Result<(), String> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let outcome = ctx.api().await.login(&request).await.map_err(|e| {
        if e.is_auth() {
            "invalid email or password".to_string()
        } else {
            e.to_string()
        }
    })?;
    let token = outcome
        .token
        .ok_or("login succeeded but no session cookie was returned")?;
    ctx.set_token(Some(token)).await;

    let products = ctx.api().await.favourites().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load favourites after login");
        Vec::new()
    });
    *ctx.favourites.write().await = FavouritesStore::from_products(&products);

    let admin = ctx.session.read().await.admin_gate(Utc::now()).is_allowed();
    println!(
        "logged in as {}{}",
        outcome.user.name.as_deref().unwrap_or(&outcome.user.email),
        if admin { " (admin)" } else { "" }
    );
    Ok(())
}

pub async fn logout(ctx: &CliContext) -> Result<(), String> {
    if let Err(e) = ctx.api().await.logout().await {
        tracing::warn!(error = %e, "server logout failed, clearing local session anyway");
    }
    ctx.set_token(None).await;
    *ctx.favourites.write().await = FavouritesStore::new();
    println!("logged out");
    Ok(())
}

pub async fn whoami(ctx: &CliContext) -> Result<(), String> {
    let user = ctx.api().await.me().await.map_err(api_err)?;
    println!("{} <{}>", user.name.as_deref().unwrap_or("-"), user.email);
    Ok(())
}

pub async fn show_config(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    if let Some(path) = buysearch_core::ClientConfig::path() {
        println!("file                 {}", path.display());
    }
    println!("api_base_url         {}", config.api_base_url);
    println!("page_size            {}", config.page_size);
    println!("row_cap              {}", config.row_cap);
    println!("poll_interval_secs   {}", config.poll_interval_secs);
    println!("request_timeout_secs {}", config.request_timeout_secs);
    println!(
        "logged in            {}",
        ctx.session.read().await.is_logged_in()
    );
    Ok(())
}

pub async fn set_config(ctx: &CliContext, key: &str, value: &str) -> Result<(), String> {
    {
        let mut config = ctx.config.write().await;
        config.set(key, value).map_err(|e| e.to_string())?;
        config.save().map_err(|e| e.to_string())?;
    }
    if matches!(key, "api_base_url" | "request_timeout_secs") {
        ctx.rebuild_api().await?;
    }
    if key == "poll_interval_secs" {
        ctx.restart_pollers().await;
    }
    println!("{key} = {value}");
    Ok(())
}

pub async fn exit(ctx: &CliContext) {
    ctx.shutdown().await;
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "quitting...");
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_range() {
        let band = parse_price_range("50-100").unwrap();
        assert_eq!((band.from, band.to), (Some(50.0), Some(100.0)));

        let upper = parse_price_range("-50").unwrap();
        assert_eq!((upper.from, upper.to), (None, Some(50.0)));
        assert_eq!(upper.label, "Under 50");

        let preset = parse_price_range("500+").unwrap();
        assert_eq!(preset.from, Some(500.0));

        assert!(parse_price_range("all").unwrap().is_all());
        assert!(parse_price_range("100-50").is_err());
        assert!(parse_price_range("-").is_err());
        assert!(parse_price_range("cheap").is_err());
        assert!(parse_price_range("nan-5").is_err());
        assert!(parse_price_range("5-inf").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Yes"), Ok(true));
        assert_eq!(parse_bool("off"), Ok(false));
        assert!(parse_bool("maybe").is_err());
    }
}
