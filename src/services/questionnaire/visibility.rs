use std::collections::HashMap;

use uuid::Uuid;

use crate::models::question;

/// Answers keyed by question id
pub type AnswerMap = HashMap<Uuid, String>;

/// Questions the respondent should see, in `order_index` order.
///
/// With an active invite the first question (the invite-code question) is
/// skipped. A conditional question is shown when its rule matches the answer
/// of the question it depends on; a dependency that is itself hidden, comes
/// later, or is unanswered counts as an empty answer.
pub fn compute_visible_questions<'a>(
    questions: &'a [question::Model],
    answers: &AnswerMap,
    invite_active: bool,
) -> Vec<&'a question::Model> {
    let mut ordered: Vec<&question::Model> = questions.iter().collect();
    ordered.sort_by_key(|q| q.order_index);

    let skip = usize::from(invite_active);
    let mut visible: Vec<&question::Model> = Vec::with_capacity(ordered.len());

    for question in ordered.into_iter().skip(skip) {
        if is_visible(question, &visible, answers) {
            visible.push(question);
        }
    }

    visible
}

fn is_visible(
    question: &question::Model,
    shown_so_far: &[&question::Model],
    answers: &AnswerMap,
) -> bool {
    let Some(dependency) = question.depends_on_question_id else {
        return true;
    };
    let Some(rule) = question.visibility_rule() else {
        return true;
    };

    let answer = if shown_so_far.iter().any(|q| q.id == dependency) {
        answers.get(&dependency).map(String::as_str).unwrap_or("")
    } else {
        ""
    };

    rule.matches(answer)
}
