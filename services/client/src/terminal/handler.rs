//! services/client/src/terminal/handler.rs
//!
//! The main control loop for an interactive terminal session. It reads one
//! line at a time, parses it for the current screen, drives the navigator and
//! its controllers, and prints whatever changed.

use std::io::{self, Write};

use finbuddy_core::{
    input::{Key, KeyPress, Modifiers},
    NavAction, Navigator, Notification, QuizPhase, View,
};
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{info, warn};

use super::{
    protocol::{parse_command, Command, QuizMode},
    render,
};
use crate::error::ClientError;

/// Longest accepted input line.
const MAX_LINE_BYTES: usize = 16 * 1024;

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs the session against stdin and stdout until `quit` or end of input.
pub async fn run(
    navigator: Navigator,
    notifications: UnboundedReceiver<Notification>,
) -> Result<(), ClientError> {
    let mut session = TerminalSession::new(navigator, notifications, io::stdout());
    session.show_screen()?;
    session.prompt()?;

    let mut lines = input_lines(tokio::io::stdin());
    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                warn!("Discarded an input line longer than {} bytes.", MAX_LINE_BYTES);
                session.say("That line is too long and was ignored.")?;
                session.prompt()?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if session.handle_line(&line).await? == Flow::Quit {
            break;
        }
        session.prompt()?;
    }

    info!("Terminal session {} ended.", session.navigator.session_id());
    Ok(())
}

/// Splits `reader` into lines, refusing any line over `MAX_LINE_BYTES`.
fn input_lines<R: AsyncRead>(reader: R) -> FramedRead<R, LinesCodec> {
    FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_BYTES))
}

pub struct TerminalSession<W> {
    navigator: Navigator,
    notifications: UnboundedReceiver<Notification>,
    out: W,
    /// Transcript turns already printed on the chat screen.
    shown_turns: usize,
}

impl<W: Write> TerminalSession<W> {
    pub fn new(
        navigator: Navigator,
        notifications: UnboundedReceiver<Notification>,
        out: W,
    ) -> Self {
        Self {
            navigator,
            notifications,
            out,
            shown_turns: 0,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    fn quiz_mode(&self) -> QuizMode {
        QuizMode::from(self.navigator.quiz().phase())
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}> ", self.navigator.view())?;
        self.out.flush()
    }

    pub fn show_screen(&mut self) -> io::Result<()> {
        let screen = self.screen();
        self.say(&screen)
    }

    /// Handles one input line, then prints any notifications it produced.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow, ClientError> {
        let command = parse_command(self.navigator.view(), self.quiz_mode(), line);
        let flow = self.apply(command).await?;

        while let Ok(notification) = self.notifications.try_recv() {
            self.say(&render::notification(&notification))?;
        }
        Ok(flow)
    }

    async fn apply(&mut self, command: Command) -> Result<Flow, ClientError> {
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                let help = render::help(self.navigator.view(), self.quiz_mode());
                self.say(&help)?;
            }
            Command::Navigate(action) => self.navigate(action).await?,
            Command::ChatLine { text, continued } => self.chat_line(&text, continued).await?,

            Command::OpenModule(position) => {
                let id = self
                    .navigator
                    .modules()
                    .modules()
                    .get(position)
                    .map(|m| m.id.clone());
                match id {
                    Some(id) => {
                        self.navigator.modules_mut().open(&id);
                        self.show_screen()?;
                    }
                    None => self.say(&format!("There is no module {}.", position + 1))?,
                }
            }
            Command::CloseModule => {
                self.navigator.modules_mut().close();
                self.show_screen()?;
            }
            Command::CompleteModule => {
                let modules = self.navigator.modules();
                let open = modules
                    .open_module()
                    .map(|m| (m.id.clone(), modules.is_completed(m)));
                let Some((id, done)) = open else {
                    self.say("Open a module first.")?;
                    return Ok(Flow::Continue);
                };
                if done {
                    self.say("You have already completed this module.")?;
                    return Ok(Flow::Continue);
                }
                match self.navigator.modules_mut().complete(&id).await {
                    Ok(_) => self.show_screen()?,
                    Err(e) => self.say(&format!("Could not mark the module complete ({}). Try again.", e))?,
                }
            }

            Command::StartQuiz(position) => {
                match self.navigator.quiz_mut().start_at(position) {
                    Ok(()) => self.show_screen()?,
                    Err(e) => self.say(&e.to_string())?,
                }
            }
            Command::SelectOption(index) => {
                match self.navigator.quiz_mut().select_answer(index) {
                    Ok(()) => self.show_screen()?,
                    Err(e) => self.say(&e.to_string())?,
                }
            }
            Command::NextQuestion => {
                let submitting = self
                    .navigator
                    .quiz()
                    .attempt()
                    .is_some_and(|a| a.is_last_question() && a.can_advance());
                if submitting {
                    self.say("Submitting...")?;
                }
                match self.navigator.quiz_mut().next().await {
                    Ok(_) => self.show_screen()?,
                    Err(e) => self.say(&e.to_string())?,
                }
            }
            Command::PrevQuestion => {
                if self.navigator.quiz_mut().prev() {
                    self.show_screen()?;
                }
            }
            Command::ExitQuiz => {
                self.navigator.quiz_mut().exit();
                self.show_screen()?;
            }

            Command::Refresh => {
                self.say("Loading...")?;
                self.navigator.profile_mut().refresh().await;
                self.show_screen()?;
            }

            Command::Unknown(input) if input.is_empty() => {}
            Command::Unknown(input) => {
                self.say(&format!("Unknown command `{}`. Type /help for options.", input))?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn navigate(&mut self, action: NavAction) -> Result<(), ClientError> {
        let from = self.navigator.view();
        let Some(target) = from.transition(action) else {
            self.say("That is not available from this screen.")?;
            return Ok(());
        };
        if matches!(target, View::Learning | View::Quiz | View::Profile) {
            self.say("Loading...")?;
        }
        self.navigator.dispatch(action).await;
        self.show_screen()?;
        Ok(())
    }

    /// Feeds a chat line through the composer. A continued line becomes a
    /// modified Enter (a line break); anything else is the commit key.
    async fn chat_line(&mut self, text: &str, continued: bool) -> Result<(), ClientError> {
        let chat = self.navigator.chat_mut();
        chat.input_mut().type_str(text);
        let modifiers = if continued { Modifiers::SHIFT } else { Modifiers::NONE };
        let will_send =
            !continued && !chat.is_pending() && !chat.input().text().trim().is_empty();

        if will_send && self.navigator.stage().is_some() {
            self.say("FinBuddy is thinking...")?;
        }
        let sent = self
            .navigator
            .press_chat(KeyPress::with(Key::Enter, modifiers))
            .await;
        if sent {
            let turns = self.new_turns();
            self.say(&turns)?;
        }
        Ok(())
    }

    /// Renders the transcript turns not printed yet.
    fn new_turns(&mut self) -> String {
        let transcript = self.navigator.chat().transcript();
        let start = self.shown_turns.min(transcript.len());
        let text = transcript[start..]
            .iter()
            .map(render::chat_turn)
            .collect::<Vec<_>>()
            .join("\n");
        self.shown_turns = transcript.len();
        text
    }

    /// Renders the whole current screen.
    fn screen(&mut self) -> String {
        let nav = &self.navigator;
        match nav.view() {
            View::StageSelect => render::stage_menu(),
            View::Chat => {
                let transcript = nav.chat().transcript();
                let mut lines = vec![render::chat_header(nav.stage())];
                lines.extend(transcript.iter().map(render::chat_turn));
                self.shown_turns = transcript.len();
                lines.join("\n")
            }
            View::Learning => {
                let modules = nav.modules();
                match modules.open_module() {
                    Some(module) => render::module_page(module, modules.is_completed(module)),
                    None => render::module_list(modules),
                }
            }
            View::Quiz => match nav.quiz().phase() {
                QuizPhase::Browsing => render::quiz_list(nav.quiz().quizzes()),
                QuizPhase::InProgress(attempt) => render::question(attempt),
                QuizPhase::Results(attempt) => {
                    attempt.result().map(render::quiz_result).unwrap_or_default()
                }
            },
            View::Profile => {
                let view = nav.profile();
                render::profile(view.profile(), &view.partition())
            }
        }
    }
}
