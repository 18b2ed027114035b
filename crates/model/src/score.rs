use alloc::string::String;
use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

/// Outcome of grading one quiz attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    /// `correct / total` as a whole percentage, rounded half up. Zero when `total` is zero.
    pub percentage: u32,
}

impl Score {
    pub const fn new(correct: u32, total: u32) -> Self {
        Self { correct, total, percentage: percentage(correct, total) }
    }

    pub const fn wrong(&self) -> u32 {
        self.total.saturating_sub(self.correct)
    }

    pub const fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage)
    }
}

/// Integer form of `round(correct / total * 100)`.
pub const fn percentage(correct: u32, total: u32) -> u32 {
    wide_percentage(correct as u64, total as u64)
}

const fn wide_percentage(correct: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct * 200 + total) / (total * 2)) as u32
}

/// Aggregate over the attempts of one user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_attempts: u32,
    /// `round(sum(score) / sum(total_questions) * 100)`, pooled over every attempt.
    pub average_score: u32,
}

impl Stats {
    /// Tallies `(score, total_questions)` pairs. Negative counts are treated as zero.
    pub fn tally<I: IntoIterator<Item = (i32, i32)>>(results: I) -> Self {
        let (mut attempts, mut correct, mut total) = (0u32, 0u64, 0u64);
        for (score, questions) in results {
            attempts = attempts.saturating_add(1);
            correct += u64::try_from(score).unwrap_or(0);
            total += u64::try_from(questions).unwrap_or(0);
        }
        Self { total_attempts: attempts, average_score: wide_percentage(correct, total) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Self::A,
            75..=89 => Self::B,
            60..=74 => Self::C,
            40..=59 => Self::D,
            _ => Self::F,
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        })
    }
}

/// Renders a duration in seconds as `m:ss`.
pub fn format_time(seconds: u64) -> String {
    alloc::format!("{}:{:02}", seconds / 60, seconds % 60)
}
