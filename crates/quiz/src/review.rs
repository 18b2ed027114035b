use crate::{scorer, session::Answers};
use model::{
    play::{Filter, Review, ReviewRow},
    QuizContent,
};

/// Grades handed-off answers question by question for the result page.
pub fn build<'a>(slug: &'a str, quiz: &'a QuizContent, answers: &'a Answers, filter: Filter) -> Review<'a> {
    let score = scorer::score(&quiz.questions, answers);
    let questions = quiz
        .questions
        .iter()
        .map(|question| {
            let user_answer = answers.get(&question.id).map(|label| &**label);
            let is_correct = user_answer.is_some_and(|label| question.is_correct(label));
            ReviewRow {
                id: question.id,
                question_text: &question.question_text,
                difficulty: question.difficulty,
                choices: &question.choices,
                correct_answer: &question.correct_answer,
                user_answer,
                is_correct,
                explanation: &question.explanation,
                wrong_reason: user_answer.and_then(|label| question.wrong_reason(label)),
            }
        })
        .filter(|row| filter.admits(row.is_correct))
        .collect();

    Review {
        topic_slug: slug,
        topic_name: &quiz.topic_name,
        correct_count: score.correct,
        wrong_count: score.wrong(),
        score,
        grade: score.grade(),
        questions,
    }
}
