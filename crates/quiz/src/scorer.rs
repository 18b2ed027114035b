use crate::session::Answers;
use model::{Question, Score};

/// Grades `answers` against the correct labels of `questions`. Unanswered questions count as wrong
/// and answers to questions outside the bank are ignored.
pub fn score(questions: &[Question], answers: &Answers) -> Score {
    let correct = questions
        .iter()
        .filter(|question| answers.get(&question.id).is_some_and(|label| question.is_correct(label)))
        .count();
    let correct = u32::try_from(correct).unwrap_or(u32::MAX);
    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    Score::new(correct, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::bank;

    fn answer_all(questions: &[Question], label: &str) -> Answers {
        questions.iter().map(|question| (question.id, label.into())).collect()
    }

    #[test]
    fn all_correct() {
        let quiz = bank(20);
        let answers = answer_all(&quiz.questions, "C");
        assert_eq!(score(&quiz.questions, &answers), Score { correct: 20, total: 20, percentage: 100 });
    }

    #[test]
    fn none_correct() {
        let quiz = bank(20);
        let answers = answer_all(&quiz.questions, "A");
        assert_eq!(score(&quiz.questions, &answers), Score { correct: 0, total: 20, percentage: 0 });
        assert_eq!(score(&quiz.questions, &Answers::new()), Score { correct: 0, total: 20, percentage: 0 });
    }

    #[test]
    fn partial_and_foreign_answers() {
        let quiz = bank(3);
        let mut answers = Answers::new();
        answers.insert(1, "C".into());
        answers.insert(2, "B".into());
        answers.insert(99, "C".into());
        let result = score(&quiz.questions, &answers);
        assert_eq!(result, Score { correct: 1, total: 3, percentage: 33 });
    }

    #[test]
    fn percentage_matches_rounded_ratio_for_every_count() {
        let quiz = bank(7);
        for correct in 0..=7u32 {
            let answers: Answers = quiz
                .questions
                .iter()
                .map(|question| (question.id, (if question.id <= correct { "C" } else { "D" }).into()))
                .collect();
            let result = score(&quiz.questions, &answers);
            assert!(result.correct <= result.total);
            assert_eq!(result.correct, correct);
            let expected = (f64::from(correct) * 100.0 / 7.0).round() as u32;
            assert_eq!(result.percentage, expected);
        }
    }

    #[test]
    fn empty_bank_scores_zero_percent() {
        assert_eq!(score(&[], &Answers::new()), Score { correct: 0, total: 0, percentage: 0 });
    }
}
