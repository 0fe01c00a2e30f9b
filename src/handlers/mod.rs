use crate::db::VoteStore;
use crate::error::StoreError;
use crate::models::{Ballot, Outcome};
use crate::voting::plurality;
use log::{error, info};

pub const VOTE_CAST: &str = "Your vote has been cast.";
pub const ALREADY_VOTED: &str = "This ID has already voted.";
pub const INVALID_BALLOT: &str = "Enter a numeric ID and select a candidate.";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Vote(Ballot),
    Results,
    Quit,
    Blank,
}

// "<id> <choice text>" votes; a lone "<id>" is a ballot with nothing selected
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" => return Command::Blank,
        "results" => return Command::Results,
        "quit" | "exit" => return Command::Quit,
        _ => {}
    }

    let (id, choice) = match line.split_once(char::is_whitespace) {
        Some((id, rest)) => (id, Some(rest.trim().to_string()).filter(|c| !c.is_empty())),
        None => (line, None),
    };
    Command::Vote(Ballot::new(id, choice))
}

pub fn notice(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Accepted => VOTE_CAST,
        Outcome::Duplicate => ALREADY_VOTED,
        Outcome::Invalid => INVALID_BALLOT,
    }
}

// Runs one command against the store and returns the text to show, or None to stop
pub fn handle_command(store: &VoteStore, command: Command) -> Option<String> {
    match command {
        Command::Blank => Some(String::new()),
        Command::Quit => None,
        Command::Results => match store.records() {
            Ok(records) => Some(plurality::calculate_results(&records).summary),
            Err(e) => {
                error!("Failed to read votes: {}", e);
                Some(format!("Could not read votes: {}", e))
            }
        },
        Command::Vote(ballot) => Some(render_vote(store.cast(&ballot))),
    }
}

fn render_vote(result: Result<Outcome, StoreError>) -> String {
    match result {
        Ok(outcome) => {
            info!("Submission finished: {:?}", outcome);
            notice(outcome).to_string()
        }
        Err(e) => {
            error!("Failed to record vote: {}", e);
            format!("Could not record vote: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use tempfile::TempDir;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), Command::Blank);
        assert_eq!(parse_line("results"), Command::Results);
        assert_eq!(parse_line("quit\n"), Command::Quit);
        assert_eq!(
            parse_line("101 Alice Smith\n"),
            Command::Vote(Ballot::new("101", Some("Alice Smith".to_string())))
        );
        assert_eq!(parse_line("101"), Command::Vote(Ballot::new("101", None)));
        assert_eq!(parse_line("101\t "), Command::Vote(Ballot::new("101", None)));
    }

    #[test]
    fn test_handle_commands_against_store() {
        let tmp = TempDir::new().unwrap();
        let store = VoteStore::open(StoreConfig::new(tmp.path().join("votes.csv"))).unwrap();

        let run = |line: &str| handle_command(&store, parse_line(line));
        assert_eq!(run("101 Alice").as_deref(), Some(VOTE_CAST));
        assert_eq!(run("101 Bob").as_deref(), Some(ALREADY_VOTED));
        assert_eq!(run("abc Alice").as_deref(), Some(INVALID_BALLOT));
        assert_eq!(run("102").as_deref(), Some(INVALID_BALLOT));
        assert_eq!(run("102 Alice").as_deref(), Some(VOTE_CAST));

        let summary = run("results").unwrap();
        assert!(summary.contains("Winner: Alice"));
        assert_eq!(run("quit"), None);
    }
}
