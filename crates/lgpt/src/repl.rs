//! Interactive chat loop.
//!
//! Lines starting with `/` are commands; anything else is sent to the
//! configured vendor.

use anyhow::Result;
use chrono::Local;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

use crate::conversation::{ConversationStore, Message, Sender, StoreError, SubmitOutcome};
use crate::llm::{ProviderConfig, Vendor};

const HELP: &str = "\
Commands:
  /clear            start a new conversation
  /vendor [name]    show or switch vendor (openai, groq)
  /key <api-key>    set the API key for the current vendor
  /config           show the current configuration
  /help             show this help
  /quit             exit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Send(String),
    Clear,
    Vendor(Option<String>),
    Key(String),
    Config,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Send(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let arg = (!arg.is_empty()).then(|| arg.to_string());

    match name {
        "clear" => ReplCommand::Clear,
        "vendor" | "provider" => ReplCommand::Vendor(arg),
        "key" => match arg {
            Some(key) => ReplCommand::Key(key),
            None => ReplCommand::Unknown("/key needs an API key".to_string()),
        },
        "config" | "settings" => ReplCommand::Config,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(format!("unknown command: /{other}")),
    }
}

/// One transcript line, e.g. `[14:02] ai: 4`.
pub fn render_message(message: &Message) -> String {
    let label = match message.sender {
        Sender::User => "you",
        Sender::Assistant => "ai",
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    let text = if message.pending {
        "…"
    } else {
        message.text.as_str()
    };
    format!("[{time}] {label}: {text}")
}

/// Show only the edges of a secret.
pub fn mask_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

pub fn describe_config(config: &ProviderConfig) -> String {
    let credential = match config.credential() {
        Some(c) => mask_credential(c),
        None => format!("not set (get one at {})", config.vendor.key_console_url()),
    };
    format!(
        "vendor:   {} ({})\nmodel:    {}\napi key:  {}",
        config.vendor.as_str(),
        config.vendor,
        config.vendor.model(),
        credential
    )
}

/// Run the interactive loop until `/quit`, Ctrl-C, or Ctrl-D.
pub async fn run(store: ConversationStore) -> Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("lgpt".to_string()),
        DefaultPromptSegment::Empty,
    );

    let config = store.config().await;
    println!(
        "Chatting with {} ({}). Type /help for commands.",
        config.vendor,
        config.vendor.model()
    );
    if !config.has_credential() {
        println!("No API key set. Use /key <api-key> first.");
    }

    loop {
        let line = match line_editor.read_line(&prompt)? {
            Signal::Success(line) => line,
            _ => break,
        };

        match parse_command(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Send(text) => send(&store, &text).await,
            ReplCommand::Clear => {
                store.clear().await;
                println!("Conversation cleared.");
            }
            ReplCommand::Vendor(None) => {
                let vendor = store.config().await.vendor;
                let names: Vec<_> = Vendor::all().iter().map(Vendor::as_str).collect();
                println!("vendor: {} (available: {})", vendor.as_str(), names.join(", "));
            }
            ReplCommand::Vendor(Some(name)) => match name.parse::<Vendor>() {
                Ok(vendor) => match store.set_vendor(vendor).await {
                    Ok(()) => println!("Switched to {vendor} ({}).", vendor.model()),
                    Err(e) => println!("error: {e}"),
                },
                Err(e) => println!("error: {e}"),
            },
            ReplCommand::Key(key) => {
                let vendor = store.config().await.vendor;
                match store.configure(vendor, &key).await {
                    Ok(()) => println!("API key saved for {vendor}."),
                    Err(e) => println!("error: {e}"),
                }
            }
            ReplCommand::Config => println!("{}", describe_config(&store.config().await)),
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(message) => println!("{message}. Type /help for commands."),
        }
    }

    Ok(())
}

async fn send(store: &ConversationStore, text: &str) {
    println!("ai is thinking…");
    match store.submit(text).await {
        Ok(SubmitOutcome::Ignored) => {}
        Ok(SubmitOutcome::Replied { message_id, .. }) => {
            if let Some(message) = store.message(message_id).await {
                println!("{}", render_message(&message));
            }
        }
        Ok(SubmitOutcome::Failed { message_id, error }) => {
            if let Some(message) = store.message(message_id).await {
                println!("{}", render_message(&message));
            }
            println!("error: {error}");
        }
        Err(StoreError::Configuration(message)) => {
            let vendor = store.config().await.vendor;
            println!(
                "{message}. Use /key <api-key> (get one at {}).",
                vendor.key_console_url()
            );
        }
        Err(e) => println!("error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_sent_trimmed() {
        assert_eq!(
            parse_command("  what is 2+2?  "),
            ReplCommand::Send("what is 2+2?".to_string())
        );
        assert_eq!(parse_command("   "), ReplCommand::Empty);
    }

    #[test]
    fn slash_commands_parse() {
        assert_eq!(parse_command("/clear"), ReplCommand::Clear);
        assert_eq!(parse_command("/vendor"), ReplCommand::Vendor(None));
        assert_eq!(
            parse_command("/vendor  openai "),
            ReplCommand::Vendor(Some("openai".to_string()))
        );
        assert_eq!(
            parse_command("/key gsk-123"),
            ReplCommand::Key("gsk-123".to_string())
        );
        assert_eq!(parse_command("/config"), ReplCommand::Config);
        assert_eq!(parse_command("/help"), ReplCommand::Help);
        assert_eq!(parse_command("/exit"), ReplCommand::Quit);
    }

    #[test]
    fn key_without_argument_is_rejected() {
        assert!(matches!(parse_command("/key"), ReplCommand::Unknown(_)));
        assert!(matches!(parse_command("/bogus"), ReplCommand::Unknown(_)));
    }

    #[test]
    fn render_marks_pending_messages() {
        let pending = Message::pending_assistant(2);
        assert!(render_message(&pending).ends_with("ai: …"));

        let user = Message::user(1, "2+2?");
        assert!(render_message(&user).ends_with("you: 2+2?"));
    }

    #[test]
    fn mask_hides_middle_of_credential() {
        assert_eq!(mask_credential("sk-1234567890abcd"), "sk-1…abcd");
        assert_eq!(mask_credential("short"), "****");
    }

    #[test]
    fn describe_config_points_to_key_console_when_unset() {
        let described = describe_config(&ProviderConfig::new(Vendor::Groq, None));
        assert!(described.contains("llama3-8b-8192"));
        assert!(described.contains("https://console.groq.com/keys"));

        let described = describe_config(&ProviderConfig::new(
            Vendor::OpenAI,
            Some("sk-1234567890abcd".to_string()),
        ));
        assert!(described.contains("sk-1…abcd"));
        assert!(!described.contains("1234567890"));
    }
}
