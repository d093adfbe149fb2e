use std::error::Error;

use quiz_core::model::{OptionLetter, Question, SessionOutcome, ViewMode};
use services::{
    AnswerIntake, AppServices, Navigation, QuestionView, SessionError, SessionPhase,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Answer(OptionLetter),
    Submit,
    Next,
    Prev,
    Favorite,
    Quit,
}

impl Key {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "s" => Some(Self::Submit),
            "n" => Some(Self::Next),
            "p" => Some(Self::Prev),
            "f" => Some(Self::Favorite),
            "q" => Some(Self::Quit),
            other => other.parse().ok().map(Self::Answer),
        }
    }
}

/// Drive one session from stdin until it finishes or the user quits.
pub async fn run_practice(
    services: &AppServices,
    title: &str,
    mode: ViewMode,
    questions: Vec<Question>,
) -> Result<(), Box<dyn Error>> {
    let mut session = services.launcher().launch(title, mode, questions).await;
    if session.phase() == SessionPhase::Empty {
        println!("No questions available for {title} ({mode}).");
        return Ok(());
    }

    println!("{title} [{mode}]  a-e answer, s submit, n next, p prev, f favorite, q quit");
    if let Some(view) = session.view() {
        render(&view);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(key) = Key::parse(&line) else {
            println!("? unrecognized input: {}", line.trim());
            continue;
        };

        let step: Result<Option<SessionOutcome>, SessionError> = match key {
            Key::Quit => break,
            Key::Answer(letter) => session.select(letter).await.map(|intake| {
                if let AnswerIntake::Submitted { is_correct } = intake {
                    println!("{}", verdict(is_correct));
                }
                None
            }),
            Key::Submit => session.submit_selection().await.map(|is_correct| {
                println!("{}", verdict(is_correct));
                None
            }),
            Key::Next => session.next().await.map(|nav| match nav {
                Navigation::Moved(_) => None,
                Navigation::Finished(outcome) => Some(outcome),
            }),
            Key::Prev => session.prev().await.map(|_| None),
            Key::Favorite => session.toggle_favorite().await.map(|favorite| {
                println!("{}", if favorite { "* favorited" } else { "* unfavorited" });
                None
            }),
        };

        match step {
            Ok(Some(outcome)) => {
                print_outcome(&outcome);
                break;
            }
            Ok(None) => {
                if let Some(view) = session.view() {
                    render(&view);
                }
            }
            Err(err) => println!("! {err}"),
        }
    }

    Ok(())
}

fn verdict(is_correct: bool) -> &'static str {
    if is_correct { "correct" } else { "incorrect" }
}

fn render(view: &QuestionView) {
    let question = &view.question;
    println!();
    println!(
        "[{}/{}] ({}){} {}",
        view.index + 1,
        view.total,
        view.kind.label(),
        if view.is_favorite { " *" } else { "" },
        question.stem()
    );
    let grouping: Vec<&str> = [
        Some(question.series_no()).filter(|s| !s.is_empty()),
        question.test_name(),
        question.subject(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !grouping.is_empty() {
        println!("   ({})", grouping.join(" / "));
    }
    for letter in question.options() {
        let marker = if view.selected.contains(&letter) { '>' } else { ' ' };
        println!(
            " {marker} {letter}. {}",
            question.option_text(letter).unwrap_or_default()
        );
    }
    if let Some(answer) = view.answer() {
        println!("   answer: {answer}");
    }
    if let Some(explanation) = view.explanation().filter(|text| !text.is_empty()) {
        println!("   {explanation}");
    }
}

fn print_outcome(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Scored(summary) => println!(
            "Finished: {} / {} correct, score {}",
            summary.correct_count(),
            summary.total(),
            summary.score()
        ),
        SessionOutcome::ReviewComplete => println!("Review complete."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!(Key::parse("C"), Some(Key::Answer(OptionLetter::C)));
        assert_eq!(Key::parse(" s "), Some(Key::Submit));
        assert_eq!(Key::parse("q"), Some(Key::Quit));
        assert_eq!(Key::parse("z"), None);
        assert_eq!(Key::parse(""), None);
    }
}
