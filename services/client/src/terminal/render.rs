//! services/client/src/terminal/render.rs
//!
//! Turns controller state into plain text for the terminal. Every function
//! here is pure; the handler decides when to print.

use finbuddy_core::{
    markup::{render_body, Block},
    modules::{is_completed, ModuleBrowser},
    profile::BadgePartition,
    quiz::QuizAttempt,
    ChatRole, ChatTurn, LifeStage, Module, Notification, Profile, Quiz, QuizResult, View,
};

use super::protocol::QuizMode;

pub fn stage_menu() -> String {
    let mut lines = vec!["Welcome to FinBuddy! Which best describes you?".to_string()];
    for (i, stage) in LifeStage::ALL.iter().enumerate() {
        lines.push(format!("  {}. {}", i + 1, stage.label()));
    }
    lines.join("\n")
}

pub fn chat_turn(turn: &ChatTurn) -> String {
    let speaker = match turn.role {
        ChatRole::User => "You",
        ChatRole::Assistant => "FinBuddy",
    };
    match turn.at {
        Some(at) => format!("[{}] {}: {}", at.format("%Y-%m-%d %H:%M"), speaker, turn.text),
        None => format!("{}: {}", speaker, turn.text),
    }
}

pub fn chat_header(stage: Option<LifeStage>) -> String {
    match stage {
        Some(stage) => format!("Chatting as: {}  (/learn, /quiz, /profile, /stage)", stage.label()),
        None => "Chat".to_string(),
    }
}

//=========================================================================================
// Learning
//=========================================================================================

pub fn module_list(browser: &ModuleBrowser) -> String {
    let modules = browser.modules();
    if modules.is_empty() {
        return "No learning modules are available for this stage.".to_string();
    }
    let mut lines = vec![format!(
        "Learning modules ({}/{} completed)",
        browser.completed_count(),
        modules.len()
    )];
    for (i, module) in modules.iter().enumerate() {
        let mark = if is_completed(browser.completed_ids(), module) { "x" } else { " " };
        lines.push(format!(
            "  {}. [{}] {} - {} ({} min, {} XP)",
            i + 1,
            mark,
            module.title,
            module.difficulty,
            module.estimated_minutes,
            module.xp_reward
        ));
    }
    lines.join("\n")
}

pub fn module_page(module: &Module, completed: bool) -> String {
    let mut lines = vec![format!("== {} ==", module.title), module.description.clone()];
    lines.push(String::new());
    for block in render_body(&module.content) {
        lines.push(match block {
            Block::Heading { level, text } => {
                format!("{} {}", "#".repeat(usize::from(level)), text.to_uppercase())
            }
            Block::ListItem(text) => format!("  * {}", text),
            Block::Break => String::new(),
            Block::Paragraph(text) => text.to_string(),
        });
    }
    lines.push(String::new());
    if completed {
        lines.push("Completed.".to_string());
    } else {
        lines.push(format!("Type `complete` to earn {} XP.", module.xp_reward));
    }
    lines.join("\n")
}

//=========================================================================================
// Quizzes
//=========================================================================================

pub fn quiz_list(quizzes: &[Quiz]) -> String {
    if quizzes.is_empty() {
        return "No quizzes are available for this stage.".to_string();
    }
    let mut lines = vec!["Quizzes".to_string()];
    for (i, quiz) in quizzes.iter().enumerate() {
        lines.push(format!(
            "  {}. {} - {} questions, pass at {}%, {} XP",
            i + 1,
            quiz.title,
            quiz.questions.len(),
            quiz.passing_score,
            quiz.xp_reward
        ));
    }
    lines.join("\n")
}

pub fn question(attempt: &QuizAttempt) -> String {
    let current = attempt.current_question();
    let mut lines = vec![
        format!(
            "{}  question {} of {} ({:.0}%)",
            attempt.quiz().title,
            attempt.cursor() + 1,
            attempt.question_count(),
            attempt.progress() * 100.0
        ),
        current.prompt.clone(),
    ];
    for (i, option) in current.options.iter().enumerate() {
        let mark = if attempt.selected() == Some(i) { ">" } else { " " };
        lines.push(format!(" {} {}. {}", mark, i + 1, option));
    }
    let control = if attempt.is_last_question() { "submit" } else { "next" };
    if attempt.can_advance() {
        lines.push(format!("Type `next` to {}.", control));
    } else {
        lines.push(format!("Pick an option to enable {}.", control));
    }
    lines.join("\n")
}

pub fn quiz_result(result: &QuizResult) -> String {
    let verdict = if result.passed { "Passed!" } else { "Not passed this time." };
    let mut lines = vec![
        format!(
            "{} Score: {}% ({}/{} correct), +{} XP",
            verdict, result.score, result.correct_answers, result.total_questions, result.xp_earned
        ),
    ];
    for (i, item) in result.results.iter().enumerate() {
        let mark = if item.is_correct { "correct" } else { "wrong" };
        lines.push(format!("  {}. {} [{}]", i + 1, item.question, mark));
        lines.push(format!("     your answer: {}", item.your_answer));
        if !item.is_correct {
            lines.push(format!("     correct answer: {}", item.correct_answer));
        }
        if let Some(explanation) = &item.explanation {
            lines.push(format!("     {}", explanation));
        }
    }
    lines.join("\n")
}

//=========================================================================================
// Profile & Notifications
//=========================================================================================

pub fn profile(profile: Option<&Profile>, badges: &BadgePartition<'_>) -> String {
    let mut lines = Vec::new();
    match profile {
        Some(p) => {
            lines.push(format!("Level {}  |  {} XP", p.level, p.total_xp));
            lines.push(format!(
                "Streak: {} (best {})  |  Questions asked: {}  |  Modules completed: {}",
                p.current_streak,
                p.max_streak,
                p.total_questions,
                p.modules_completed.len()
            ));
        }
        None => lines.push("No profile yet. Start chatting to build one.".to_string()),
    }

    lines.push(format!("Earned badges ({})", badges.earned.len()));
    for badge in &badges.earned {
        lines.push(format!("  {} {} - {}", badge.icon, badge.name, badge.description));
    }
    lines.push(format!("Available badges ({})", badges.available.len()));
    for badge in &badges.available {
        lines.push(format!("  {} {} - {}", badge.icon, badge.name, badge.requirement));
    }
    lines.join("\n")
}

pub fn notification(notification: &Notification) -> String {
    let (headline, xp, badges) = match notification {
        Notification::ModuleCompleted {
            module_id,
            xp_earned,
            new_badges,
            new_level,
        } => {
            let mut headline = format!("Module {} completed!", module_id);
            if let Some(level) = new_level {
                headline.push_str(&format!(" You reached level {}.", level));
            }
            (headline, xp_earned, new_badges)
        }
        Notification::QuizSubmitted {
            quiz_id,
            passed,
            xp_earned,
            new_badges,
        } => {
            let outcome = if *passed { "passed" } else { "submitted" };
            (format!("Quiz {} {}!", quiz_id, outcome), xp_earned, new_badges)
        }
    };

    let mut text = format!("*** {} +{} XP", headline, xp);
    if !badges.is_empty() {
        text.push_str(&format!(" New badges: {}", badges.join(", ")));
    }
    text
}

pub fn help(view: View, quiz: QuizMode) -> String {
    let local = match (view, quiz) {
        (View::StageSelect, _) => "1-4 or a stage name to choose",
        (View::Chat, _) => "type a message; end a line with \\ to continue it; /learn /quiz /profile",
        (View::Learning, _) => "open N, close, complete, back",
        (View::Quiz, QuizMode::Browsing) => "start N, back",
        (View::Quiz, QuizMode::InProgress) => "N to pick an option, next, prev, exit",
        (View::Quiz, QuizMode::Results) => "exit",
        (View::Profile, _) => "refresh, back",
    };
    format!("[{}] {}  |  /stage, /quit", view, local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn module(id: &str, content: &str) -> Module {
        Module {
            id: id.into(),
            title: format!("Title {}", id),
            description: "desc".into(),
            content: content.into(),
            difficulty: "beginner".into(),
            category: "budgeting".into(),
            estimated_minutes: 5,
            xp_reward: 20,
            order_index: 1,
        }
    }

    #[test]
    fn history_turns_show_their_time() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 30).single();
        let turn = ChatTurn::assistant("Start with an emergency fund.").stamped(at);
        assert_eq!(
            chat_turn(&turn),
            "[2024-05-01 10:15] FinBuddy: Start with an emergency fund."
        );
        assert_eq!(chat_turn(&ChatTurn::user("hi")), "You: hi");
    }

    #[test]
    fn module_page_renders_markup_blocks() {
        let page = module_page(&module("a", "# Budget\n- needs\n\nplain text"), false);
        assert!(page.contains("# BUDGET"));
        assert!(page.contains("  * needs"));
        assert!(page.contains("plain text"));
        assert!(page.contains("earn 20 XP"));
    }

    #[test]
    fn notifications_mention_level_and_badges() {
        let text = notification(&Notification::ModuleCompleted {
            module_id: "m1".into(),
            xp_earned: 20,
            new_badges: vec!["module_explorer".into()],
            new_level: Some(2),
        });
        assert!(text.contains("+20 XP"));
        assert!(text.contains("level 2"));
        assert!(text.contains("module_explorer"));

        let text = notification(&Notification::QuizSubmitted {
            quiz_id: "q1".into(),
            passed: false,
            xp_earned: 0,
            new_badges: vec![],
        });
        assert!(!text.contains("New badges"));
    }

    #[test]
    fn missing_profile_still_lists_badges() {
        let text = profile(None, &BadgePartition::default());
        assert!(text.contains("No profile yet"));
        assert!(text.contains("Earned badges (0)"));
    }
}
