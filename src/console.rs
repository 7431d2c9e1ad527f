use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::interview::hints::{HintOutcome, RecordingState};
use crate::interview::session::{InterviewCoordinator, SubmitOutcome};
use crate::interview::Collaborators;
use crate::problems::problem::Problem;
use crate::report::{build_report, render_report, render_session_line};
use crate::routes;
use crate::sessions::Role;
use crate::state::app::AppState;

const HELP: &str = "\
Type code lines to add them to your solution.
  :hint [question]   ask the interviewer (blank = \"I'd like a hint.\")
  :mic               start or cancel a spoken question
  :code              show your current code
  :clear             reset your code to the starter code
  :submit [language] submit your solution
  :quit              leave the interview";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Code(String),
    Hint(Option<String>),
    Mic,
    ShowCode,
    Clear,
    Submit(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> ConsoleCommand {
    let Some(rest) = line.trim_end().strip_prefix(':') else {
        return ConsoleCommand::Code(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let (word, arg) = match rest.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    match word {
        "hint" => ConsoleCommand::Hint(arg),
        "mic" => ConsoleCommand::Mic,
        "code" => ConsoleCommand::ShowCode,
        "clear" => ConsoleCommand::Clear,
        "submit" => ConsoleCommand::Submit(arg),
        "help" => ConsoleCommand::Help,
        "quit" | "q" => ConsoleCommand::Quit,
        other => ConsoleCommand::Unknown(other.to_string()),
    }
}

fn present(problem: &Problem) {
    println!();
    println!("### {} ({})", problem.title, problem.difficulty);
    println!("{}", problem.description);
    println!();
    println!("Starter code:");
    println!("{}", problem.initial_code);
}

fn report_hint(outcome: HintOutcome) {
    match outcome {
        HintOutcome::Fallback(apology) => println!("interviewer> {}", apology),
        HintOutcome::Dropped(reason) => println!("! Hint not requested ({:?})", reason),
        HintOutcome::Answered { .. } | HintOutcome::Discarded => {}
    }
}

/// Print chat messages and notices that appeared since the last call.
fn flush(coordinator: &InterviewCoordinator, printed: &mut usize) {
    let Some(controller) = coordinator.hints() else {
        return;
    };

    let history = controller.chat_history();
    for message in history.iter().skip(*printed) {
        match message.role {
            Role::Ai => println!("interviewer> {}", message.content),
            Role::User => println!("you> {}", message.content),
        }
    }
    *printed = history.len();

    for notice in controller.take_notices() {
        println!("! {}", notice);
    }
}

/// Run one interview on stdin/stdout until it finishes or the candidate quits.
pub async fn run_interview(state: &AppState, collaborators: Collaborators, language: String) -> Result<()> {
    let mut coordinator = InterviewCoordinator::new(
        state.catalog.clone(),
        collaborators.clone(),
        state.metrics.clone(),
        state.config.interview.idle_settings(),
    );

    let problem = routes::start_interview(&mut coordinator).map_err(anyhow::Error::msg)?;
    println!("{}", HELP);
    present(&problem);

    let mut code = problem.initial_code.clone();
    let mut printed = 0usize;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    // Hints run off this task so code lines keep flowing while one is pending.
    let (hint_tx, mut hint_rx) = mpsc::unbounded_channel::<HintOutcome>();

    loop {
        tokio::select! {
            _ = ticker.tick() => flush(&coordinator, &mut printed),
            Some(outcome) = hint_rx.recv() => {
                report_hint(outcome);
                flush(&coordinator, &mut printed);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    tracing::info!("stdin closed, leaving interview");
                    break;
                };

                match parse_line(&line) {
                    ConsoleCommand::Code(text) => {
                        code.push_str(&text);
                        code.push('\n');
                        routes::update_code(&coordinator, code.clone()).map_err(anyhow::Error::msg)?;
                    }
                    ConsoleCommand::Hint(question) => {
                        let handle = routes::hint_handle(&coordinator).map_err(anyhow::Error::msg)?;
                        let tx = hint_tx.clone();
                        tokio::spawn(async move {
                            let _ = tx.send(routes::get_hint(handle, question).await);
                        });
                        println!("(asking the interviewer...)");
                    }
                    ConsoleCommand::Mic => {
                        match routes::toggle_recording(&coordinator).map_err(anyhow::Error::msg)? {
                            RecordingState::Recording => println!("(listening...)"),
                            RecordingState::Idle => {}
                        }
                    }
                    ConsoleCommand::ShowCode => println!("{}", code),
                    ConsoleCommand::Clear => {
                        if let Some(controller) = coordinator.hints() {
                            code = controller.problem().initial_code.clone();
                            controller.update_code(code.clone());
                        }
                    }
                    ConsoleCommand::Submit(lang) => {
                        let lang = lang.unwrap_or_else(|| language.clone());
                        println!("(assessing your {} solution...)", lang);
                        flush(&coordinator, &mut printed);

                        match routes::submit_solution(&mut coordinator, code.clone(), &lang).await {
                            Ok(SubmitOutcome::Next(next)) => {
                                printed = 0;
                                code = next.initial_code.clone();
                                present(&next);
                            }
                            Ok(SubmitOutcome::Finished(session)) => {
                                let report = routes::get_final_report(&collaborators, &session, &lang).await;
                                println!();
                                println!("{}", render_report(&report));
                                return Ok(());
                            }
                            Err(e) => println!("! {}", e),
                        }
                    }
                    ConsoleCommand::Help => println!("{}", HELP),
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Unknown(word) => println!("! Unknown command ':{}', try :help", word),
                }
                flush(&coordinator, &mut printed);
            }
        }
    }

    routes::reset_interview(&mut coordinator);
    Ok(())
}

/// Hiring-manager view: every stored session, newest first.
pub async fn run_dashboard(state: &AppState, collaborators: Collaborators) -> Result<()> {
    let mut coordinator = InterviewCoordinator::new(
        state.catalog.clone(),
        collaborators.clone(),
        state.metrics.clone(),
        state.config.interview.idle_settings(),
    );

    let sessions = routes::list_sessions(&mut coordinator).await;
    if sessions.is_empty() {
        println!("No interview sessions recorded yet.");
        return Ok(());
    }

    println!("{} session(s)", sessions.len());
    for session in &sessions {
        println!("{}", render_session_line(session));
    }

    let language = state.config.interview.default_language.clone();
    for session in &sessions {
        let report = build_report(session, collaborators.summary.as_ref(), None, &language).await;
        println!();
        println!("{}", render_report(&report));
    }
    Ok(())
}
