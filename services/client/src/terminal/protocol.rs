//! services/client/src/terminal/protocol.rs
//!
//! Defines the line protocol between the person at the terminal and the
//! client. Each input line is parsed into a `Command` according to the screen
//! currently shown.

use finbuddy_core::{LifeStage, NavAction, QuizPhase, View};

/// Which part of the quiz screen is active; the same words mean different
/// things in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    Browsing,
    InProgress,
    Results,
}

impl From<&QuizPhase> for QuizMode {
    fn from(phase: &QuizPhase) -> Self {
        match phase {
            QuizPhase::Browsing => QuizMode::Browsing,
            QuizPhase::InProgress(_) => QuizMode::InProgress,
            QuizPhase::Results(_) => QuizMode::Results,
        }
    }
}

/// Everything a line of input can ask for. Positions are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Navigate(NavAction),

    /// A chat line. `continued` lines end in a backslash and stand for
    /// Shift+Enter: they add a line break instead of sending.
    ChatLine { text: String, continued: bool },

    OpenModule(usize),
    CloseModule,
    CompleteModule,

    StartQuiz(usize),
    SelectOption(usize),
    NextQuestion,
    PrevQuestion,
    ExitQuiz,

    Refresh,

    /// Input that means nothing on the current screen.
    Unknown(String),
}

/// Parses `line` for the given screen.
pub fn parse_command(view: View, quiz: QuizMode, line: &str) -> Command {
    let trimmed = line.trim();

    match trimmed {
        "/quit" => return Command::Quit,
        "/help" => return Command::Help,
        "/stage" => return Command::Navigate(NavAction::ChangeStage),
        // Bare words are chat text on the chat screen.
        "quit" if view != View::Chat => return Command::Quit,
        "help" if view != View::Chat => return Command::Help,
        _ => {}
    }

    match view {
        View::StageSelect => parse_stage(trimmed),
        View::Chat => parse_chat(line),
        View::Learning => parse_learning(trimmed),
        View::Quiz => parse_quiz(quiz, trimmed),
        View::Profile => match trimmed {
            "back" => Command::Navigate(NavAction::Back),
            "refresh" => Command::Refresh,
            _ => Command::Unknown(trimmed.to_string()),
        },
    }
}

/// Parses a one-based position as typed by the user.
fn position(word: &str) -> Option<usize> {
    word.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

fn parse_stage(input: &str) -> Command {
    if let Some(stage) = position(input).and_then(|i| LifeStage::ALL.get(i)) {
        return Command::Navigate(NavAction::SelectStage(*stage));
    }
    match input.parse::<LifeStage>() {
        Ok(stage) => Command::Navigate(NavAction::SelectStage(stage)),
        Err(_) => Command::Unknown(input.to_string()),
    }
}

fn parse_chat(line: &str) -> Command {
    match line.trim() {
        "/learn" => return Command::Navigate(NavAction::ShowLearning),
        "/quiz" => return Command::Navigate(NavAction::ShowQuiz),
        "/profile" => return Command::Navigate(NavAction::ShowProfile),
        _ => {}
    }
    match line.strip_suffix('\\') {
        Some(text) => Command::ChatLine {
            text: text.to_string(),
            continued: true,
        },
        None => Command::ChatLine {
            text: line.to_string(),
            continued: false,
        },
    }
}

fn parse_learning(input: &str) -> Command {
    let mut words = input.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("back"), None, None) => Command::Navigate(NavAction::Back),
        (Some("close"), None, None) => Command::CloseModule,
        (Some("complete"), None, None) => Command::CompleteModule,
        (Some("open"), Some(n), None) => position(n)
            .map(Command::OpenModule)
            .unwrap_or_else(|| Command::Unknown(input.to_string())),
        _ => Command::Unknown(input.to_string()),
    }
}

fn parse_quiz(mode: QuizMode, input: &str) -> Command {
    let mut words = input.split_whitespace();
    let command = match (mode, words.next(), words.next(), words.next()) {
        (QuizMode::Browsing, Some("back"), None, None) => Some(Command::Navigate(NavAction::Back)),
        (QuizMode::Browsing, Some("start"), Some(n), None) => position(n).map(Command::StartQuiz),
        (QuizMode::InProgress, Some("next"), None, None) => Some(Command::NextQuestion),
        (QuizMode::InProgress, Some("prev"), None, None) => Some(Command::PrevQuestion),
        (QuizMode::InProgress, Some(n), None, None) => position(n).map(Command::SelectOption),
        (QuizMode::InProgress | QuizMode::Results, Some("exit"), None, None) => {
            Some(Command::ExitQuiz)
        }
        _ => None,
    };
    command.unwrap_or_else(|| Command::Unknown(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(view: View, line: &str) -> Command {
        parse_command(view, QuizMode::Browsing, line)
    }

    #[test]
    fn stage_select_accepts_numbers_and_names() {
        assert_eq!(
            parse(View::StageSelect, "2"),
            Command::Navigate(NavAction::SelectStage(LifeStage::EarlyCareer))
        );
        assert_eq!(
            parse(View::StageSelect, "retiree"),
            Command::Navigate(NavAction::SelectStage(LifeStage::Retiree))
        );
        assert!(matches!(parse(View::StageSelect, "0"), Command::Unknown(_)));
        assert!(matches!(parse(View::StageSelect, "5"), Command::Unknown(_)));
    }

    #[test]
    fn global_commands_work_everywhere() {
        for view in [View::StageSelect, View::Chat, View::Learning, View::Quiz, View::Profile] {
            assert_eq!(parse(view, "/stage"), Command::Navigate(NavAction::ChangeStage));
            assert_eq!(parse(view, "/quit"), Command::Quit);
        }
    }

    #[test]
    fn chat_lines_keep_text_and_detect_continuation() {
        assert_eq!(
            parse(View::Chat, "How do I budget?"),
            Command::ChatLine {
                text: "How do I budget?".into(),
                continued: false
            }
        );
        assert_eq!(
            parse(View::Chat, "first line\\"),
            Command::ChatLine {
                text: "first line".into(),
                continued: true
            }
        );
        assert_eq!(parse(View::Chat, "/quiz"), Command::Navigate(NavAction::ShowQuiz));
        assert_eq!(
            parse(View::Chat, "back"),
            Command::ChatLine {
                text: "back".into(),
                continued: false
            }
        );
    }

    #[test]
    fn bare_quit_and_help_are_chat_text_in_chat() {
        for word in ["quit", "help"] {
            assert_eq!(
                parse(View::Chat, word),
                Command::ChatLine {
                    text: word.into(),
                    continued: false
                }
            );
        }
        assert_eq!(parse(View::Chat, "/help"), Command::Help);
        assert_eq!(parse(View::Learning, "quit"), Command::Quit);
        assert_eq!(parse(View::Profile, "help"), Command::Help);
    }

    #[test]
    fn learning_commands_are_one_based() {
        assert_eq!(parse(View::Learning, "open 1"), Command::OpenModule(0));
        assert_eq!(parse(View::Learning, "complete"), Command::CompleteModule);
        assert!(matches!(parse(View::Learning, "open"), Command::Unknown(_)));
        assert!(matches!(parse(View::Learning, "open zero"), Command::Unknown(_)));
    }

    #[test]
    fn quiz_words_depend_on_mode() {
        assert_eq!(
            parse_command(View::Quiz, QuizMode::Browsing, "start 3"),
            Command::StartQuiz(2)
        );
        assert_eq!(
            parse_command(View::Quiz, QuizMode::InProgress, "2"),
            Command::SelectOption(1)
        );
        assert_eq!(
            parse_command(View::Quiz, QuizMode::InProgress, "next"),
            Command::NextQuestion
        );
        assert_eq!(
            parse_command(View::Quiz, QuizMode::Results, "exit"),
            Command::ExitQuiz
        );
        assert!(matches!(
            parse_command(View::Quiz, QuizMode::Results, "next"),
            Command::Unknown(_)
        ));
        assert!(matches!(
            parse_command(View::Quiz, QuizMode::InProgress, "back"),
            Command::Unknown(_)
        ));
    }
}
