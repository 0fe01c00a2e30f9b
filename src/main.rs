use std::sync::Arc;
use log::{error, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use vote_ledger::handlers;
use vote_ledger::{StoreConfig, VoteStore};

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    // Open the vote file
    let store = match VoteStore::open(config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open vote store: {}", e);
            return;
        }
    };
    info!("Accepting votes as \"<id> <choice>\" lines; \"results\" shows the tally, \"quit\" exits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        // Store calls do blocking file I/O
        let store = Arc::clone(&store);
        let reply = tokio::task::spawn_blocking(move || {
            handlers::handle_command(&store, handlers::parse_line(&line))
        })
        .await;

        let message = match reply {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(e) => {
                error!("Vote handler panicked: {}", e);
                break;
            }
        };

        if message.is_empty() {
            continue;
        }
        let written = match stdout.write_all(format!("{}\n", message).as_bytes()).await {
            Ok(()) => stdout.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            error!("Failed to write output: {}", e);
            break;
        }
    }
}
