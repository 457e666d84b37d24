use anyhow::{Context, Result};
use cache_store::{CacheStore, Clock};
use catalog::{CatalogItem, ItemId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use intent::{ChatConfig, IntentType, Persona, Turn};
use server::{AppConfig, AppState, CacheBackend, ChatResponse, DetailView};
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

/// reel-chat - conversational movie recommendations
#[derive(Parser)]
#[command(name = "reel-chat")]
#[command(about = "Conversational movie recommendation service", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "REEL_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Serve the catalog from a JSON fixture instead of the live API
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Keep caches in memory for this run only
    #[arg(long)]
    memory_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address, overriding the config (e.g. 0.0.0.0:5000)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Chat in the terminal
    Chat {
        /// Persona label ("다정한 친구", "츤데레 친구")
        #[arg(long, default_value = "다정한 친구")]
        persona: String,

        /// Item ids already seen; never recommended
        #[arg(long, value_delimiter = ',')]
        seen: Vec<ItemId>,

        /// Send one message and exit instead of starting a session
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show the enriched detail view for an item
    Detail {
        id: ItemId,

        /// Discard the cached commentary and excerpts and generate new ones
        #[arg(long)]
        regenerate: bool,
    },

    /// Titles trending this week
    Trending,

    /// Titles about to open
    Upcoming,

    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Remove every expired entry
    Purge,

    /// Forget the cached intent for a message
    Forget { message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Keep terminal output readable unless serving or RUST_LOG says otherwise
    let default_filter = match cli.command {
        Commands::Serve { .. } => server::DEFAULT_LOG_FILTER,
        _ => "warn",
    };
    server::init_tracing(default_filter);

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(fixture) = cli.fixture {
        config.catalog.fixture_path = Some(fixture);
    }
    if cli.memory_cache {
        config.cache.backend = CacheBackend::Memory;
    }

    match cli.command {
        Commands::Serve { bind } => handle_serve(config, bind).await?,
        Commands::Chat {
            persona,
            seen,
            message,
        } => {
            let chat_config = ChatConfig {
                persona: Persona::from_label(&persona),
                excluded_ids: seen,
                ..Default::default()
            };
            handle_chat(&build_state(&config)?, chat_config, message).await?
        }
        Commands::Detail { id, regenerate } => handle_detail(&build_state(&config)?, id, regenerate).await?,
        Commands::Trending => {
            let state = build_state(&config)?;
            print_items("Trending this week", &state.discovery.trending().await);
        }
        Commands::Upcoming => {
            let state = build_state(&config)?;
            print_items("Coming soon", &state.discovery.upcoming().await);
        }
        Commands::Cache { command } => handle_cache(&build_state(&config)?, command).await?,
    }

    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState> {
    AppState::from_config(config).context("Failed to initialize services")
}

/// Handle the 'serve' command
async fn handle_serve(mut config: AppConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let addr = config.bind_addr()?;
    let state = build_state(&config)?;
    server::run(state, addr).await
}

/// Handle the 'chat' command
async fn handle_chat(state: &AppState, config: ChatConfig, message: Option<String>) -> Result<()> {
    let mut history: Vec<Turn> = Vec::new();

    if let Some(message) = message {
        let response = state.orchestrator.handle(&message, &history, &config).await;
        print_chat_response(&response);
        return Ok(());
    }

    println!(
        "{} {} (empty line or Ctrl-D to quit)",
        "Chatting as".bold().blue(),
        config.persona.label().bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".green().bold());
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            break;
        }

        let start = Instant::now();
        let response = state.orchestrator.handle(message, &history, &config).await;
        print_chat_response(&response);
        println!("{}", format!("({:.2?})", start.elapsed()).dimmed());

        history.push(Turn::user(message));
        history.push(Turn::assistant(response.text.clone(), response.kind));
    }
    Ok(())
}

/// Handle the 'detail' command
async fn handle_detail(state: &AppState, id: ItemId, regenerate: bool) -> Result<()> {
    if regenerate {
        let regenerated = state.enricher.regenerate(id).await?;
        if regenerated.is_none() {
            println!("{} Item {} not found", "✗".red(), id);
            return Ok(());
        }
        println!("{} Regenerated commentary for item {}", "✓".green(), id);
    }

    match state.enricher.detail_view(id).await? {
        Some(view) => print_detail(&view),
        None => println!("{} Item {} not found", "✗".red(), id),
    }
    Ok(())
}

/// Handle the 'cache' command
async fn handle_cache(state: &AppState, command: CacheCommands) -> Result<()> {
    match command {
        CacheCommands::Purge => {
            let removed = state.store.purge_expired(state.clock.now()).await?;
            println!("{} Removed {} expired entries", "✓".green(), removed);
        }
        CacheCommands::Forget { message } => {
            if state.intent_cache.invalidate(&message).await {
                println!("{} Forgot cached intent for '{}'", "✓".green(), message);
            } else {
                println!("No cached intent for '{}'", message);
            }
        }
    }
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_chat_response(response: &ChatResponse) {
    let label = match response.kind {
        IntentType::Reply => "reply".normal(),
        IntentType::Recommendation => "recommendation".green(),
        IntentType::SearchResult => "search".cyan(),
        IntentType::FollowUpQuestion => "question".yellow(),
    };
    println!("[{}] {}", label, response.text);

    if !response.keywords.is_empty() {
        println!("   {} {}", "keywords:".dimmed(), response.keywords.join(", "));
    }
    match &response.recommendations {
        Some(cards) if cards.is_empty() => println!("   {}", "Nothing found this time.".dimmed()),
        Some(cards) => {
            for (rank, card) in cards.iter().enumerate() {
                println!(
                    "   {}. {} (#{}) ★ {:.1}",
                    (rank + 1).to_string().green(),
                    card.title.bold(),
                    card.id,
                    card.rating
                );
            }
        }
        None => {}
    }
}

fn print_detail(view: &DetailView) {
    let mut facts = vec![view.year.clone(), view.runtime.clone(), view.genre.clone()];
    facts.retain(|fact| !fact.is_empty());

    println!("{} ({})", view.title.bold().blue(), facts.join(" | "));
    println!("{} {:.1}", "★".yellow(), view.rating);
    println!("{} {}", "•".green(), view.commentary);
    if !view.plot.is_empty() {
        println!("\n{}", view.plot);
    }

    if !view.platforms.is_empty() {
        let names: Vec<&str> = view.platforms.iter().map(|p| p.name.as_str()).collect();
        println!("\n{} {}", "Watch on:".bold(), names.join(", "));
    }

    println!("\n{}", "What people say:".bold());
    for excerpt in &view.excerpts {
        println!("  - {}", excerpt);
    }

    if !view.cast.is_empty() {
        println!("\n{}", "Cast:".bold());
        for member in &view.cast {
            println!("  {} as {}", member.name, member.character.dimmed());
        }
    }
}

fn print_items(header: &str, items: &[CatalogItem]) {
    println!("{}", header.bold().blue());
    if items.is_empty() {
        println!("  {}", "Nothing to show (is the catalog reachable?)".dimmed());
        return;
    }
    for (rank, item) in items.iter().enumerate() {
        let year = item
            .release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .unwrap_or("????");
        println!(
            "{}. {} ({}) ★ {:.1} [#{}]",
            (rank + 1).to_string().green(),
            item.title,
            year,
            item.rating,
            item.id
        );
    }
}
