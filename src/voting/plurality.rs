use crate::models::VoteRecord;
use crate::voting::{ChoiceCount, TallyResults};
use std::collections::HashMap;

pub fn calculate_results(records: &[VoteRecord]) -> TallyResults {
    // If no votes were cast
    if records.is_empty() {
        return TallyResults {
            winner: None,
            summary: "No votes have been cast.".to_string(),
            counts: Vec::new(),
            total_votes: 0,
        };
    }

    // One stored record is one vote
    let mut vote_counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *vote_counts.entry(record.choice.as_str()).or_insert(0) += 1;
    }

    // Most votes first, ties broken alphabetically so output is stable
    let mut sorted_votes: Vec<(&str, usize)> = vote_counts.into_iter().collect();
    sorted_votes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    // Equal counts share a rank
    let mut counts: Vec<ChoiceCount> = Vec::with_capacity(sorted_votes.len());
    for (i, (choice, votes)) in sorted_votes.iter().enumerate() {
        let rank = match counts.last() {
            Some(ChoiceCount { votes: prev, rank, .. }) if prev == votes => *rank,
            _ => i + 1,
        };
        counts.push(ChoiceCount {
            choice: choice.to_string(),
            votes: *votes,
            rank,
        });
    }

    let total_votes = records.len();
    let tied_for_first = counts.iter().filter(|c| c.rank == 1).count() > 1;
    let winner = if tied_for_first {
        None
    } else {
        Some(counts[0].choice.clone())
    };

    let mut summary = String::new();
    for count in &counts {
        let percent = count.votes as f64 * 100.0 / total_votes as f64;
        summary.push_str(&format!(
            "{}. {}: {} vote{} ({:.1}%)\n",
            count.rank,
            count.choice,
            count.votes,
            if count.votes == 1 { "" } else { "s" },
            percent
        ));
    }
    match &winner {
        Some(name) => summary.push_str(&format!("\nWinner: {}", name)),
        None => summary.push_str("\nResult: tie for first place"),
    }
    summary.push_str(&format!("\n{} votes cast.", total_votes));

    TallyResults {
        winner,
        summary,
        counts,
        total_votes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(pairs: &[(&str, &str)]) -> Vec<VoteRecord> {
        pairs.iter().map(|(id, choice)| VoteRecord::new(*id, *choice)).collect()
    }

    #[test]
    fn test_no_votes() {
        let results = calculate_results(&[]);
        assert_eq!(results.winner, None);
        assert_eq!(results.total_votes, 0);
        assert!(results.counts.is_empty());
    }

    #[test]
    fn test_plurality_winner() {
        let records = votes(&[("1", "Bob"), ("2", "Alice"), ("3", "Bob"), ("4", "Carol")]);
        let results = calculate_results(&records);

        assert_eq!(results.winner.as_deref(), Some("Bob"));
        assert_eq!(results.total_votes, 4);
        assert_eq!(
            results.counts,
            vec![
                ChoiceCount { choice: "Bob".to_string(), votes: 2, rank: 1 },
                ChoiceCount { choice: "Alice".to_string(), votes: 1, rank: 2 },
                ChoiceCount { choice: "Carol".to_string(), votes: 1, rank: 2 },
            ]
        );
        assert!(results.summary.contains("1. Bob: 2 votes (50.0%)"));
        assert!(results.summary.contains("Winner: Bob"));
    }

    #[test]
    fn test_tie_has_no_winner() {
        let records = votes(&[("1", "Bob"), ("2", "Alice")]);
        let results = calculate_results(&records);

        assert_eq!(results.winner, None);
        assert_eq!(results.counts[0].choice, "Alice");
        assert!(results.counts.iter().all(|c| c.rank == 1));
        assert!(results.summary.contains("tie for first place"));
    }
}
