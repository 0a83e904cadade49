use anyhow::Result;
use tracing_subscriber::EnvFilter;

use snakeduel::terminal::{play, TerminalContext};
use snakeduel::{Game, GameConfig};

fn main() -> Result<()> {
    // logs go to stderr so they do not tear the board apart
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::default();
    let mut game = Game::new(config.clone(), rand::rng());
    let mut context = TerminalContext::init(&config)?;
    let result = play(&mut game, &mut context);
    drop(context);
    result?;

    if let Some(message) = game.result_message() {
        println!("{message}");
    }
    Ok(())
}
