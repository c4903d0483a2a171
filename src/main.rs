use std::env;

use impostor::{
    avatars,
    config::Config,
    create_store,
    game::{rules, GamePhase, GameSession, Winner},
    store::SharedStore,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    let env: String = env::var("RUN_ENV").unwrap_or_else(|_| "default".into());
    let config: Config = Config::load().expect("Failed to load config.");

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::info!(run_env = %env, "Starting Impostor table...");

    let store = create_store(&config);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("--- 🕵️ IMPOSTOR ---");
    println!("One device, one secret word, one player who doesn't know it.");

    loop {
        let phase = store.snapshot().await.get_phase();
        match phase {
            GamePhase::Setup => run_setup(&store, &mut input).await,
            GamePhase::Reveal => run_reveal(&store, &mut input).await,
            GamePhase::Discussion => run_discussion(&store, &mut input).await,
            GamePhase::Voting => run_voting(&store, &mut input).await,
            GamePhase::Results => run_results(&store, &mut input).await,
        }
    }
}

/// Next trimmed stdin line; a closed stdin ends the session.
async fn read_line(input: &mut Input) -> String {
    match input.next_line().await {
        Ok(Some(line)) => line.trim().to_string(),
        _ => {
            println!("Good night, agents.");
            std::process::exit(0);
        }
    }
}

fn avatar_label(player_avatar: &str) -> &'static str {
    avatars::avatar(player_avatar)
        .unwrap_or_else(avatars::default_avatar)
        .name
}

fn print_roster(snapshot: &GameSession) {
    for (seat, player) in snapshot.get_players().iter().enumerate() {
        println!(
            "  {}. {} ({})",
            seat + 1,
            player.name,
            avatar_label(&player.avatar)
        );
    }
}

async fn run_setup(store: &SharedStore, input: &mut Input) {
    let snapshot = store.snapshot().await;
    let table_rules = *snapshot.get_rules();

    println!(
        "\n[SETUP] {} player(s) at the table (need {}-{}).",
        snapshot.get_players().len(),
        table_rules.min_players,
        table_rules.max_players
    );
    print_roster(&snapshot);
    let recommended = rules::recommended_impostor_count(snapshot.get_players().len());
    if recommended > table_rules.impostor_count {
        println!(
            "(A table this size usually plays with {recommended} impostors; set APP__GAME__IMPOSTOR_COUNT to change.)"
        );
    }
    println!("Commands: add <name> | remove <seat> | categories | start <category>");

    let line = read_line(input).await;
    let (command, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));

    match command {
        "add" => {
            // Hand out catalog avatars round-robin
            let avatar_id = avatars::ids()
                .nth(snapshot.get_players().len() % avatars::AVATARS.len())
                .unwrap_or(avatars::default_avatar().id);
            if let Err(e) = store.add_player(rest, avatar_id).await {
                println!("!! {e}");
            }
        }
        "remove" => match rest.parse::<usize>() {
            Ok(seat) if (1..=snapshot.get_players().len()).contains(&seat) => {
                let id = snapshot.get_players()[seat - 1].id;
                if let Err(e) = store.remove_player(id).await {
                    println!("!! {e}");
                }
            }
            _ => println!("!! remove wants a seat number from the roster"),
        },
        "categories" => {
            for name in store.category_names() {
                println!("  - {name}");
            }
        }
        "start" => {
            if let Err(e) = store.start_game(rest).await {
                println!("!! {e}");
            }
        }
        "" => {}
        other => println!("!! unknown command: {other}"),
    }
}

async fn run_reveal(store: &SharedStore, input: &mut Input) {
    let snapshot = store.snapshot().await;
    let Some(player) = snapshot.get_current_player() else {
        return;
    };

    println!("\n[REVEAL] Pass the device to {}. Press Enter.", player.name);
    read_line(input).await;

    if player.is_impostor {
        println!("You are the IMPOSTOR. You don't know the word - bluff.");
    } else {
        println!(
            "The secret word is: {} (category: {})",
            snapshot.get_secret_word().unwrap_or("?"),
            snapshot.get_word_category().unwrap_or("?")
        );
    }
    println!("Memorize it, press Enter, and pass the device on.");
    read_line(input).await;

    if let Err(e) = store.next_player().await {
        println!("!! {e}");
    }
}

async fn run_discussion(store: &SharedStore, input: &mut Input) {
    let snapshot = store.snapshot().await;
    println!(
        "\n[DISCUSSION] Round {}. Everyone gives a one-word clue out loud.",
        snapshot.get_current_round()
    );
    println!("Press Enter when the table is ready to vote.");
    read_line(input).await;

    if let Err(e) = store.set_phase(GamePhase::Voting).await {
        println!("!! {e}");
    }
}

async fn run_voting(store: &SharedStore, input: &mut Input) {
    let snapshot = store.snapshot().await;

    let Some(voter) = snapshot.get_players().iter().find(|p| !p.has_voted) else {
        // Every ballot is in; wait for the store to reveal the results
        println!("\nAll votes are in...");
        let mut rx = store.subscribe();
        let _ = rx.wait_for(|s| s.get_phase() != GamePhase::Voting).await;
        return;
    };
    let voter_id = voter.id;

    println!("\n[VOTING] Pass the device to {}.", voter.name);
    println!("Who is the impostor?");
    let candidates: Vec<_> = snapshot
        .get_players()
        .iter()
        .filter(|p| p.id != voter_id)
        .collect();
    for (index, candidate) in candidates.iter().enumerate() {
        println!("  {}. {}", index + 1, candidate.name);
    }

    let line = read_line(input).await;
    match line.parse::<usize>() {
        Ok(pick) if (1..=candidates.len()).contains(&pick) => {
            let target_id = candidates[pick - 1].id;
            if let Err(e) = store.cast_vote(voter_id, target_id).await {
                println!("!! {e}");
            }
        }
        _ => println!("!! pick a number from the list"),
    }
}

async fn run_results(store: &SharedStore, input: &mut Input) {
    let snapshot = store.snapshot().await;
    let tally = store.calculate_votes().await;

    println!("\n[RESULTS] Round {} ballots:", snapshot.get_current_round());
    for player in snapshot.get_players() {
        let votes = tally.counts.get(&player.id).copied().unwrap_or(0);
        println!("  {} - {} vote(s)", player.name, votes);
    }

    match snapshot
        .get_eliminated_player_id()
        .and_then(|id| snapshot.get_player(id))
    {
        Some(eliminated) if eliminated.is_impostor => {
            println!("{} was eliminated - and WAS the impostor!", eliminated.name);
        }
        Some(eliminated) => {
            println!("{} was eliminated - an innocent civilian.", eliminated.name);
        }
        None => println!("The vote was tied. Nobody was eliminated."),
    }

    let impostors: Vec<_> = snapshot
        .get_players()
        .iter()
        .filter(|p| p.is_impostor)
        .map(|p| p.name.as_str())
        .collect();
    println!(
        "The impostor was {} and the word was \"{}\".",
        impostors.join(", "),
        snapshot.get_secret_word().unwrap_or("?")
    );

    match snapshot.get_winner() {
        Some(Winner::Civilians) => println!("🎉 The civilians win!"),
        Some(Winner::Impostors) => println!("😈 The impostor wins!"),
        None => println!("No verdict yet - the table plays on."),
    }

    println!("Commands: again (same word, new vote) | new (fresh game) | quit");
    loop {
        let line = read_line(input).await;
        match line.as_str() {
            "again" => {
                if let Err(e) = store.next_round().await {
                    println!("!! {e}");
                }
                return;
            }
            "new" => {
                store.reset_game().await;
                return;
            }
            "quit" => {
                println!("Good night, agents.");
                std::process::exit(0);
            }
            _ => println!("!! again, new, or quit"),
        }
    }
}
