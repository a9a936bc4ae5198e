//! A simple program demonstrates how to use `support-desk` as a library.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use support_desk::core::conversation::{ConfidenceLevel, Message};
use support_desk::core::{USER_ENDED_REASON, VoiceStatus};
use support_desk::http::HttpGateway;
use support_desk::{Settings, SupportDesk, SupportDeskBuilder};
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Chat(&'a str),
    Clear,
    Call(&'a str),
    HangUp,
    Status,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Some(Command::Chat(line));
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map(|(name, arg)| (name, arg.trim()))
            .unwrap_or((command, ""));
        Some(match name {
            "clear" => Command::Clear,
            "call" => Command::Call(arg),
            "hangup" => Command::HangUp,
            "status" => Command::Status,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(name),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let gateway = HttpGateway::new(settings.gateway_config());
    if let Err(err) = gateway.check_health().await {
        let bar = BAR_CHAR.bright_yellow();
        println!(
            "{bar}⚠️  {} is not healthy: {err}",
            gateway.config().base_url()
        );
    }
    let desk = settings
        .apply(SupportDeskBuilder::with_gateway(gateway))
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    print_help();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Chat(text) => {
                let answer = with_spinner(
                    &progress_style,
                    "🤔 Thinking...",
                    desk.chat().send_message(text),
                )
                .await;
                match answer {
                    Ok(msg) => print_answer(&msg),
                    Err(err) => print_error(&err.reason()),
                }
            }
            Command::Clear => {
                desk.chat().clear_conversation();
                println!("{}Conversation cleared.", BAR_CHAR.bright_black());
            }
            Command::Call(number) => {
                let started = with_spinner(
                    &progress_style,
                    "📞 Calling...",
                    desk.voice().start(number),
                )
                .await;
                match started {
                    Ok(session_id) => println!(
                        "{}📞 Call {} is live. Type /hangup to end it.",
                        BAR_CHAR.bright_green(),
                        session_id.bright_white()
                    ),
                    Err(err) => print_error(&err.reason()),
                }
            }
            Command::HangUp => {
                let elapsed = desk.voice().snapshot().elapsed_display();
                let ended = with_spinner(
                    &progress_style,
                    "📞 Hanging up...",
                    desk.voice().end(USER_ENDED_REASON),
                )
                .await;
                match ended {
                    Ok(_) => println!(
                        "{}📞 Call ended after {elapsed}.",
                        BAR_CHAR.bright_green()
                    ),
                    Err(err) => print_error(&err.reason()),
                }
            }
            Command::Status => print_status(&desk),
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Unknown(name) => {
                print_error(&format!("unknown command /{name}, try /help"));
            }
        }
    }

    if desk.voice().status() == VoiceStatus::Active {
        desk.voice().end(USER_ENDED_REASON).await.ok();
    }
}

/// Drives `fut` to completion while showing a spinner.
async fn with_spinner<T>(
    style: &ProgressStyle,
    message: &'static str,
    fut: impl Future<Output = T>,
) -> T {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(style.clone());
    progress_bar.set_message(message);

    let mut fut = pin!(fut);
    loop {
        progress_bar.inc(1);
        select! {
            output = &mut fut => {
                // Finish the progress bar before printing anything else.
                progress_bar.finish_and_clear();
                return output;
            }
            _ = sleep(Duration::from_millis(100)) => {}
        }
    }
}

fn print_answer(msg: &Message) {
    println!("{}🤖 {}", BAR_CHAR.bright_cyan(), msg.content().bright_white());
    let Some(annotations) = msg.annotations() else {
        return;
    };

    let percent = (annotations.confidence * 100.0).round();
    let confidence = format!("{percent}% confident");
    let confidence = match annotations.confidence_level() {
        ConfidenceLevel::High => confidence.green().to_string(),
        ConfidenceLevel::Medium => confidence.yellow().to_string(),
        ConfidenceLevel::Low => confidence.red().to_string(),
    };
    println!(
        "{}   {confidence} · {} source(s)",
        BAR_CHAR.bright_cyan(),
        annotations.sources.len()
    );
    for source in &annotations.sources {
        let url = source.url.as_deref().unwrap_or_default();
        println!(
            "{}   - {} {}",
            BAR_CHAR.bright_cyan(),
            source.display_title(),
            url.bright_black()
        );
    }
    if let Some(meeting_id) = &annotations.meeting_id {
        println!("{}   📅 Meeting {meeting_id} booked", BAR_CHAR.bright_cyan());
    }
    if annotations.guardrail_triggered {
        let kind = annotations.guardrail_type.as_deref().unwrap_or("safety");
        println!(
            "{}⚠️  The {kind} check was triggered for this message.",
            BAR_CHAR.bright_yellow()
        );
    }
}

fn print_status(desk: &SupportDesk) {
    let chat = desk.chat().snapshot();
    let voice = desk.voice().snapshot();
    let bar = BAR_CHAR.bright_black();
    println!(
        "{bar}Conversation: {} ({} messages)",
        chat.conversation_id.as_deref().unwrap_or("not started"),
        chat.messages.len()
    );
    match voice.status {
        VoiceStatus::Idle => println!("{bar}Call: none"),
        VoiceStatus::Active => println!(
            "{bar}Call: {} with {}, {}",
            voice.status,
            voice.phone_number.as_deref().unwrap_or_default(),
            voice.elapsed_display()
        ),
        status => println!("{bar}Call: {status}"),
    }
}

fn print_help() {
    let bar = BAR_CHAR.bright_black();
    println!("{bar}Type a question to chat with the assistant.");
    println!("{bar}/call <number>  place a voice call");
    println!("{bar}/hangup         end the call");
    println!("{bar}/status         show the conversation and call status");
    println!("{bar}/clear          start a new conversation");
    println!("{bar}/quit           leave");
}

fn print_error(reason: &str) {
    println!("{}❌ {}", BAR_CHAR.bright_red(), reason.red());
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
