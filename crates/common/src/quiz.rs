//! Quiz content and scoring state.
//!
//! Pure state management for a multiple-choice quiz run: answer selection,
//! per-question explanation reveal, and final score summary. Rendering is out
//! of scope.

use serde::{Deserialize, Serialize};

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
}

/// The built-in sample quiz.
pub fn sample_questions() -> Vec<Question> {
    fn question(
        id: u32,
        prompt: &str,
        options: [&str; 4],
        correct_answer: usize,
        explanation: &str,
    ) -> Question {
        Question {
            id,
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
            explanation: explanation.to_string(),
        }
    }

    vec![
        question(
            1,
            "What is the native token of the Base network?",
            ["ETH", "BASE", "USD", "BTC"],
            0,
            "Base uses ETH as its native token, just like Ethereum mainnet.",
        ),
        question(
            2,
            "Which company developed the Base blockchain?",
            ["Meta", "Coinbase", "Google", "OpenSea"],
            1,
            "Base is an Ethereum Layer 2 blockchain developed by Coinbase.",
        ),
        question(
            3,
            "What type of blockchain is Base?",
            ["Layer 1", "Layer 2", "Sidechain", "Private"],
            1,
            "Base is a Layer 2 blockchain built on top of Ethereum using Optimism's OP Stack.",
        ),
        question(
            4,
            "What is the purpose of Farcaster?",
            ["DeFi protocol", "Social network", "NFT marketplace", "Gaming platform"],
            1,
            "Farcaster is a decentralized social network protocol built on Ethereum.",
        ),
        question(
            5,
            "What does 'FID' stand for in Farcaster?",
            ["Farcaster ID", "Frame ID", "Function ID", "File ID"],
            0,
            "FID stands for Farcaster ID, which is a unique identifier for each user on the network.",
        ),
    ]
}

/// Outcome of answering the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub explanation: String,
}

/// Score tiers for the completion screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    /// 80% and above.
    Excellent,
    /// 60% to 79%.
    Good,
    /// Below 60%.
    KeepLearning,
}

/// Final score of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub score: usize,
    pub total: usize,
}

impl ScoreSummary {
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.score as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn tier(&self) -> ScoreTier {
        match self.percentage() {
            p if p >= 80 => ScoreTier::Excellent,
            p if p >= 60 => ScoreTier::Good,
            _ => ScoreTier::KeepLearning,
        }
    }
}

/// State of one quiz run.
///
/// Each question is answered exactly once; the answer locks until the player
/// advances. Advancing past the last question completes the run.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    selected: Option<usize>,
    score: usize,
    completed: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current: 0,
            selected: None,
            score: 0,
            completed: false,
        }
    }

    /// Start a run over the built-in sample quiz.
    pub fn sample() -> Self {
        Self::new(sample_questions())
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.completed {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    /// One-based progress indicator (current question, total).
    pub fn progress(&self) -> (usize, usize) {
        (self.current + 1, self.questions.len())
    }

    /// Select an answer for the current question.
    ///
    /// Returns `None` when the selection is ignored: run completed, answer
    /// already locked in, or the index is out of range.
    pub fn select_answer(&mut self, index: usize) -> Option<AnswerOutcome> {
        if self.completed || self.selected.is_some() {
            return None;
        }
        let question = self.questions.get(self.current)?;
        if index >= question.options.len() {
            return None;
        }

        self.selected = Some(index);
        let correct = index == question.correct_answer;
        if correct {
            self.score += 1;
        }

        Some(AnswerOutcome {
            correct,
            explanation: question.explanation.clone(),
        })
    }

    /// Move to the next question once the current one is answered.
    ///
    /// Returns false when ignored (unanswered question or completed run).
    /// Advancing from the last question completes the run.
    pub fn advance(&mut self) -> bool {
        if self.completed || self.selected.is_none() {
            return false;
        }
        if self.is_last_question() {
            self.completed = true;
        } else {
            self.current += 1;
            self.selected = None;
        }
        true
    }

    /// Reset to the first question with a zero score.
    pub fn restart(&mut self) {
        self.current = 0;
        self.selected = None;
        self.score = 0;
        self.completed = false;
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            score: self.score,
            total: self.questions.len(),
        }
    }
}
