use crate::platform::telegram::Message;

pub const ECHO_USAGE: &str = "Send `/echo <your text>` to hear it back.";

pub const HELP_TEXT: &str = "Here’s what I can do right now:\n\
                         - /start: Show the welcome flow\n\
                         - /help: Display this cheat sheet\n\
                         - /echo <text>: Echo any text you provide\n\
                         \n\
                         Extend me by editing `src/commands.rs`.";

/// Work out the reply for `message`, or `None` if it should go unanswered.
///
/// Commands are matched by prefix against the trimmed text, in a fixed
/// order, so `/startfoo` is handled as `/start`.
pub fn route(message: &Message) -> Option<String> {
    let text = message.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }

    if text.starts_with("/start") {
        let name = message
            .from
            .as_ref()
            .and_then(|u| u.first_name.as_deref())
            .unwrap_or("there");
        return Some(welcome(name));
    }

    if text.starts_with("/help") {
        return Some(HELP_TEXT.to_string());
    }

    if let Some(rest) = text.strip_prefix("/echo") {
        let payload = rest.trim();
        return Some(if payload.is_empty() {
            ECHO_USAGE.to_string()
        } else {
            format!("🔁 {}", payload)
        });
    }

    Some(format!("You said: \"{}\"", text))
}

fn welcome(name: &str) -> String {
    format!(
        "Hey {}!\n\
         I'm a Rust powered Telegram bot and I just received your webhook update.\n\
         \n\
         Available commands:\n\
         • /start - show this welcome message\n\
         • /help - learn what I can do\n\
         • /echo <text> - mirror back what you send",
        name
    )
}
