use bakunawa_duel::card::{CardCatalog, CardDefinition};
use bakunawa_duel::config::GameConfig;
use bakunawa_duel::simulation::{parse_deck_file, run_game, simulate_batch, BatchSummary};
use clap::{Args, Parser, Subcommand};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::cmp::max;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bakunawa-duel")]
#[command(about = "Bakunawa card duel engine and simulator", long_about = None)]
struct Cli {
    #[clap(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Debug)]
struct GlobalOpts {
    /// Shorthand for --log-level debug
    #[arg(global = true, long, default_value_t = false)]
    debug: bool,

    /// Log level for engine diagnostics
    #[arg(global = true, long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Game config JSON (defaults apply to missing fields)
    #[arg(global = true, long)]
    config: Option<String>,

    /// Card catalog JSON; the built-in catalog is used when omitted
    #[arg(global = true, long)]
    catalog: Option<String>,

    /// Player deck file
    #[arg(global = true, long, default_value = "decks/player.txt")]
    player_deck: String,

    /// Bakunawa deck file
    #[arg(global = true, long, default_value = "decks/bakunawa.txt")]
    opponent_deck: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of headless games and print statistics (default)
    Run {
        /// Number of games to simulate
        #[arg(short, long, default_value = "1000")]
        num_games: usize,

        /// Base seed; game i uses seed + i
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play one narrated game with the autopilot on the player side
    Play {
        /// Seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// List every card in the catalog
    Catalog,
}

fn init_logging(opts: &GlobalOpts) {
    let level = if opts.debug {
        max(LevelFilter::Debug, opts.log_level)
    } else {
        opts.log_level
    };

    let mut builder = simplelog::ConfigBuilder::new();
    builder.set_time_level(LevelFilter::Off);
    builder.set_thread_level(LevelFilter::Off);
    builder.set_target_level(LevelFilter::Off);
    builder.set_location_level(LevelFilter::Off);

    if let Err(e) = TermLogger::init(level, builder.build(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("✗ Failed to initialize logging: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let catalog = match load_catalog(cli.global.catalog.as_deref()) {
        Ok(catalog) => {
            eprintln!("✓ Loaded {} cards", catalog.card_count());
            catalog
        }
        Err(e) => {
            eprintln!("✗ Failed to load cards: {}", e);
            std::process::exit(1);
        }
    };

    let config = match &cli.global.config {
        Some(path) => match GameConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ Failed to load config '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => GameConfig::headless(),
    };

    match cli.command {
        Some(Commands::Run {
            num_games,
            seed,
            json,
        }) => run_simulation(&catalog, &config, &cli.global, num_games, seed, json),
        Some(Commands::Play { seed }) => play_game(&catalog, &config, &cli.global, seed),
        Some(Commands::Catalog) => list_catalog(&catalog),
        None => run_simulation(&catalog, &config, &cli.global, 1000, None, false),
    }
}

fn load_catalog(path: Option<&str>) -> Result<CardCatalog, bakunawa_duel::card::CatalogError> {
    let catalog = match path {
        Some(path) => CardCatalog::from_file(path)?,
        None => CardCatalog::builtin()?,
    };
    catalog.validate()?;
    Ok(catalog)
}

fn load_decks(
    catalog: &CardCatalog,
    opts: &GlobalOpts,
) -> (Vec<Arc<CardDefinition>>, Vec<Arc<CardDefinition>>) {
    let load = |path: &str| match parse_deck_file(path, catalog) {
        Ok(deck) => deck,
        Err(e) => {
            eprintln!("✗ Failed to parse deck file '{}': {}", path, e);
            std::process::exit(1);
        }
    };
    (load(&opts.player_deck), load(&opts.opponent_deck))
}

fn fresh_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn run_simulation(
    catalog: &CardCatalog,
    config: &GameConfig,
    opts: &GlobalOpts,
    num_games: usize,
    seed: Option<u64>,
    json: bool,
) {
    let (player, opponent) = load_decks(catalog, opts);
    let base_seed = seed.unwrap_or_else(fresh_seed);

    if !json {
        println!("\n=== Bakunawa Duel Simulator ===\n");
        println!("Player deck: {} ({} cards)", opts.player_deck, player.len());
        println!("Bakunawa deck: {} ({} cards)", opts.opponent_deck, opponent.len());
        println!("Games: {}", num_games);
        println!("Seed: {}", base_seed);
        println!();
    }

    let start = std::time::Instant::now();
    let (results, summary) = simulate_batch(
        &player, &opponent, catalog, config, num_games, base_seed, !json,
    );
    let elapsed = start.elapsed();

    for error in results.iter().filter_map(|r| r.as_ref().err()).take(3) {
        log::warn!("{}", error);
    }

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("✗ Failed to serialize summary: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    print_summary(&summary);
    println!();
    println!(
        "Simulation completed in {:.2?} ({:.0} games/sec)",
        elapsed,
        num_games as f64 / elapsed.as_secs_f64()
    );
}

fn print_summary(summary: &BatchSummary) {
    let pct = |n: usize| {
        if summary.games == 0 {
            0.0
        } else {
            n as f64 / summary.games as f64 * 100.0
        }
    };

    println!("=== Results ({}) ===\n", summary.generated_at);
    println!(
        "Player wins:   {:5.1}% ({}/{})",
        pct(summary.player_wins),
        summary.player_wins,
        summary.games
    );
    println!(
        "Bakunawa wins: {:5.1}% ({}/{})",
        pct(summary.opponent_wins),
        summary.opponent_wins,
        summary.games
    );
    println!("Draws:         {:5.1}% ({})", pct(summary.draws), summary.draws);
    println!(
        "Instant wins:  {:5.1}% ({})",
        pct(summary.instant_wins),
        summary.instant_wins
    );
    if summary.failed > 0 {
        println!("Failed:        {:5.1}% ({})", pct(summary.failed), summary.failed);
    }
    println!("Average rounds: {:.2}", summary.average_rounds);
    println!();

    println!("Round distribution:");
    for (rounds, count) in &summary.round_distribution {
        let share = pct(*count);
        let bar = "█".repeat((share / 2.0) as usize);
        println!("  Round {:2}: {:5.1}% {} ({})", rounds, share, bar, count);
    }
}

fn play_game(catalog: &CardCatalog, config: &GameConfig, opts: &GlobalOpts, seed: Option<u64>) {
    let (player, opponent) = load_decks(catalog, opts);
    let seed = seed.unwrap_or_else(fresh_seed);

    match run_game(&player, &opponent, catalog, config, seed, true) {
        Ok(result) => {
            println!();
            println!(
                "Winner: {:?} | rounds {} | tower {} | rounds won {}-{}",
                result.winner,
                result.rounds_played,
                result.final_tower,
                result.player_rounds_won,
                result.opponent_rounds_won
            );
        }
        Err(e) => {
            eprintln!("✗ Game could not finish: {}", e);
            std::process::exit(1);
        }
    }
}

fn list_catalog(catalog: &CardCatalog) {
    println!("\n=== Card Catalog ({} cards) ===\n", catalog.card_count());
    println!(
        "{:<14} {:<22} {:<8} {:>4} {:>4}  {}",
        "ID", "NAME", "TYPE", "COST", "ATK", "EFFECT"
    );
    println!("{:-<70}", "");
    for card in catalog.cards() {
        println!(
            "{:<14} {:<22} {:<8} {:>4} {:>4}  {}",
            card.id,
            card.name,
            format!("{:?}", card.card_type),
            card.energy_cost,
            card.base_attack,
            card.effect_id.as_deref().unwrap_or("-")
        );
    }
}
