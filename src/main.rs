use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use wordgame_server::actor::GameActor;
use wordgame_server::connection;
use wordgame_server::dictionary::Dictionary;
use wordgame_server::logger::Logger;
use wordgame_server::protocol::DEFAULT_PORT;

#[derive(Parser, Debug)]
#[command(
    name = "wordgame-server",
    version,
    about = "Multiplayer line-oriented Hangman server",
    long_about = "Accepts any number of TCP clients into one shared, turn-based \
                  Hangman game. Protocol is CRLF-terminated lines; see src/protocol.rs."
)]
struct Args {
    /// Path to a newline-delimited word list
    dictionary: PathBuf,

    /// Address to listen on
    #[arg(short, long, default_value_t = format!("0.0.0.0:{DEFAULT_PORT}"))]
    bind: String,

    /// Increase output verbosity (-v verbose, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let logger = Logger::new(args.verbose);

    let dictionary = match Dictionary::load(&args.dictionary) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let listener = match TcpListener::bind(&args.bind).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {e}", args.bind);
            return ExitCode::FAILURE;
        }
    };
    logger.info(format!("Listening on {}", args.bind));

    let (actor_tx, actor_rx) = mpsc::unbounded_channel();
    let actor = GameActor::new(dictionary, logger.clone());
    tokio::spawn(actor.run(actor_rx));

    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                connection::handle_connection(socket, addr, actor_tx.clone());
            }
            Err(e) => {
                logger.warn(format!("accept error: {e}"));
            }
        }
    }
}
