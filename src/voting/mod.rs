pub mod plurality;

// Tally of a vote file
#[derive(Debug, Clone, PartialEq)]
pub struct TallyResults {
    pub winner: Option<String>,    // None when nothing was cast or the top spot is tied
    pub summary: String,           // Human readable breakdown
    pub counts: Vec<ChoiceCount>,  // Sorted by votes, most first
    pub total_votes: usize,
}

// Votes received by one choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceCount {
    pub choice: String,
    pub votes: usize,
    pub rank: usize,
}
