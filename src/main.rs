use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use screener_api::RunStreamEvent;
use screener_chat::app::{ChatApp, CommandOutcome};
use screener_chat::commands::parse_slash_command;
use screener_chat::controller::{SubmitOutcome, STREAM_FAILED_TEXT};
use screener_chat::providers;
use screener_chat::session::SessionManager;
use screener_chat::transcript::{ChatMessage, ChatRole};
use session_store::SessionStore;

const STATE_DIR_ENV_VAR: &str = "SCREENER_STATE_DIR";

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt::init();

    let backend = providers::backend_from_env().map_err(io::Error::other)?;
    let state_dir = state_dir()?;
    let manager = SessionManager::new(SessionStore::at_dir(&state_dir));
    let mut app = ChatApp::new(backend, manager);

    let resumed = app.startup().await.map_err(io::Error::other)?;
    if !resumed {
        sign_in(&mut app).await?;
    }

    if let Some(session) = app.session() {
        println!(
            "Chatting as {} (user {}, thread {}).",
            session.user_name, session.user_id, session.thread_id
        );
    }
    render_transcript(app.messages());

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = parse_slash_command(line) {
            let rendered_from = app.messages().len();
            match app.handle_command(command).map_err(io::Error::other)? {
                CommandOutcome::Continue => {
                    render_messages_from(app.messages(), rendered_from);
                }
                CommandOutcome::SignedOut => {
                    println!("Session cleared.");
                    sign_in(&mut app).await?;
                    render_transcript(app.messages());
                }
                CommandOutcome::Quit => break,
            }
            continue;
        }

        let outcome = app
            .submit_line(line, &mut |event| {
                if let RunStreamEvent::Token { text } = event {
                    print!("{text}");
                    let _ = io::stdout().flush();
                }
            })
            .await;
        println!();

        match outcome {
            SubmitOutcome::Completed => {
                if let Some(message) = app.messages().last() {
                    if !message.sources.is_empty() {
                        println!("[sources: {}]", message.sources.join(", "));
                    }
                }
            }
            SubmitOutcome::Cancelled => println!("[cancelled]"),
            SubmitOutcome::Failed => println!("{STREAM_FAILED_TEXT}"),
            SubmitOutcome::Rejected => println!("Message was not sent."),
        }
    }

    Ok(())
}

fn state_dir() -> io::Result<PathBuf> {
    match std::env::var(STATE_DIR_ENV_VAR) {
        Ok(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => std::env::current_dir(),
    }
}

/// Blocking name prompt; acceptable because nothing else runs while the
/// client is unauthenticated.
async fn sign_in(app: &mut ChatApp) -> io::Result<()> {
    let stdin = io::stdin();
    loop {
        print!("Enter your name to get started: ");
        io::stdout().flush()?;

        let mut name = String::new();
        if stdin.lock().read_line(&mut name)? == 0 {
            return Err(io::Error::other("stdin closed during sign-in"));
        }
        let name = name.trim().to_string();
        if name.is_empty() {
            continue;
        }

        match app.sign_in(&name).await {
            Ok(()) => return Ok(()),
            Err(error) => println!("Could not start a session: {error}"),
        }
    }
}

fn render_transcript(messages: &[ChatMessage]) {
    render_messages_from(messages, 0);
}

fn render_messages_from(messages: &[ChatMessage], from: usize) {
    for message in &messages[from.min(messages.len())..] {
        render_message(message);
    }
}

fn render_message(message: &ChatMessage) {
    let label = match message.role {
        ChatRole::User => "you",
        ChatRole::Assistant => "assistant",
        ChatRole::System => "system",
    };
    println!("{label}: {}", message.content);
    if !message.sources.is_empty() {
        println!("  [sources: {}]", message.sources.join(", "));
    }
}
