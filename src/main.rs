use std::{process, sync::Arc};

use folio::{
    application::{
        context::RequestContext,
        error::AppError,
        fixture::PostFixture,
        links::{LinkResolver, PrefixLinkResolver, Route, resolve_or_fallback},
        listing::ListingService,
        menus::MenuRegistry,
        navigation::NavigationService,
        posts::PostWriteService,
        repos::PostsRepo,
    },
    cache::{CacheConfig, CacheTrigger, MenuCache},
    config::{self, Command, EntriesArgs, MenusArgs, PostsArgs, RenderArgs, Settings},
    domain::entities::PostRecord,
    domain::posts::{MonthCount, TagCount},
    domain::types::Locale,
    infra::{memory::InMemoryPostStore, telemetry},
};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        Command::Menus(args) => run_menus(settings, args).await,
        Command::Aggregates(args) => run_aggregates(settings, args).await,
        Command::Posts(args) => run_posts(settings, args).await,
        Command::Entries(args) => run_entries(settings, args).await,
    }
}

/// Store, cache and request shared by every subcommand.
struct Workspace {
    store: Arc<InMemoryPostStore>,
    cache: Arc<MenuCache>,
    links: Arc<dyn LinkResolver>,
    request: RequestContext,
}

async fn prepare(settings: &Settings, args: &RenderArgs) -> Result<Workspace, AppError> {
    let store = Arc::new(InMemoryPostStore::new());
    let cache = Arc::new(MenuCache::new(CacheConfig::from(&settings.cache)));
    let trigger = Arc::new(CacheTrigger::for_cache(cache.clone()));
    let writer = PostWriteService::new(store.clone(), store.clone(), store.clone(), trigger);

    let summary = PostFixture::read(&args.fixture)
        .await?
        .import(store.as_ref(), &writer)
        .await?;
    info!(
        fixture = %args.fixture.display(),
        posts = summary.posts,
        "Fixture loaded"
    );

    let links: Arc<dyn LinkResolver> = Arc::new(PrefixLinkResolver::new(
        &settings.listing.mount,
        settings.locales.available.iter().cloned(),
    ));

    let locale = match args.locale.as_deref() {
        Some(tag) => Locale::new(tag)?,
        None => settings.locales.default.clone(),
    };
    let at = match args.at.as_deref() {
        Some(raw) => OffsetDateTime::parse(raw, &Rfc3339)
            .map_err(|err| AppError::validation(format!("invalid --at timestamp `{raw}`: {err}")))?,
        None => OffsetDateTime::now_utc(),
    };
    let request = RequestContext::new(locale)
        .privileged(args.privileged)
        .at(at);

    Ok(Workspace {
        store,
        cache,
        links,
        request,
    })
}

async fn run_menus(settings: Settings, args: MenusArgs) -> Result<(), AppError> {
    let workspace = prepare(&settings, &args.render).await?;
    let registry = MenuRegistry::from_settings(
        &settings.menus,
        workspace.store.clone(),
        workspace.links.clone(),
    );
    let navigation = NavigationService::new(Arc::new(registry), workspace.cache);

    let request = workspace.request.breadcrumb(args.breadcrumb);
    let rendered = navigation.render(&request).await;

    let menus = if args.flat {
        serde_json::to_value(rendered.tree.nodes())
    } else {
        serde_json::to_value(rendered.tree.to_nested())
    }
    .map_err(|err| AppError::unexpected(format!("failed to encode menus: {err}")))?;

    print_json(&MenusOutput {
        locale: request.locale.as_str(),
        menus,
        failed: rendered.failed.iter().map(|kind| kind.key()).collect(),
    })
}

async fn run_aggregates(settings: Settings, args: RenderArgs) -> Result<(), AppError> {
    let workspace = prepare(&settings, &args).await?;
    let request = &workspace.request;

    let tags = workspace
        .store
        .tag_counts(request.scope(), &request.locale)
        .await?;
    let months = workspace
        .store
        .month_counts(request.scope(), &request.locale)
        .await?;

    print_json(&AggregatesOutput {
        locale: request.locale.as_str(),
        tags: tags.iter().map(TagRow::from).collect(),
        months: months.iter().map(MonthRow::from).collect(),
    })
}

async fn run_posts(settings: Settings, args: PostsArgs) -> Result<(), AppError> {
    let workspace = prepare(&settings, &args.render).await?;
    let listing = listing_service(&settings, &workspace);
    let request = &workspace.request;

    let page = listing.latest(request, args.page).await?;
    print_json(&PostsOutput {
        locale: request.locale.as_str(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        posts: post_rows(&workspace, &page.items),
    })
}

async fn run_entries(settings: Settings, args: EntriesArgs) -> Result<(), AppError> {
    let workspace = prepare(&settings, &args.render).await?;
    let listing = listing_service(&settings, &workspace);
    let request = &workspace.request;

    let posts = if args.authors.is_empty() {
        listing
            .latest_entries(request, &args.tags, args.count)
            .await?
    } else {
        listing
            .author_entries(request, &args.authors, args.count)
            .await?
    };
    print_json(&PostsOutput {
        locale: request.locale.as_str(),
        page: 1,
        total_pages: 1,
        total_items: posts.len(),
        posts: post_rows(&workspace, &posts),
    })
}

fn listing_service(settings: &Settings, workspace: &Workspace) -> ListingService {
    ListingService::new(
        workspace.store.clone(),
        workspace.links.clone(),
        settings.locales.available.clone(),
    )
    .with_page_size(settings.listing.page_size.get())
}

fn post_rows<'a>(workspace: &Workspace, posts: &'a [PostRecord]) -> Vec<PostRow<'a>> {
    posts
        .iter()
        .map(|post| PostRow {
            title: &post.title,
            slug: &post.slug,
            author: &post.author.username,
            published: post.publication_start,
            link: resolve_or_fallback(
                workspace.links.as_ref(),
                &workspace.request.locale,
                &Route::post_detail(post),
            ),
        })
        .collect()
}

fn print_json(value: &impl Serialize) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{rendered}");
    Ok(())
}

#[derive(Serialize)]
struct MenusOutput<'a> {
    locale: &'a str,
    menus: serde_json::Value,
    failed: Vec<&'static str>,
}

#[derive(Serialize)]
struct PostsOutput<'a> {
    locale: &'a str,
    page: usize,
    total_pages: usize,
    total_items: usize,
    posts: Vec<PostRow<'a>>,
}

#[derive(Serialize)]
struct PostRow<'a> {
    title: &'a str,
    slug: &'a str,
    author: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    published: OffsetDateTime,
    link: String,
}

#[derive(Serialize)]
struct AggregatesOutput<'a> {
    locale: &'a str,
    tags: Vec<TagRow<'a>>,
    months: Vec<MonthRow>,
}

#[derive(Serialize)]
struct TagRow<'a> {
    name: &'a str,
    slug: &'a str,
    count: usize,
}

impl<'a> From<&'a TagCount> for TagRow<'a> {
    fn from(entry: &'a TagCount) -> Self {
        Self {
            name: &entry.tag.name,
            slug: &entry.tag.slug,
            count: entry.count,
        }
    }
}

#[derive(Serialize)]
struct MonthRow {
    month: String,
    label: String,
    count: usize,
}

impl From<&MonthCount> for MonthRow {
    fn from(entry: &MonthCount) -> Self {
        Self {
            month: entry.key(),
            label: entry.label(),
            count: entry.count,
        }
    }
}
