//! Slash commands typed into the chat

/// A command addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/{cmd} <title>` or `/{cmd} search <title>`
    Search(String),
    /// `/{cmd} list`
    List,
    /// `/{cmd} queue`
    Queue,
    /// `/{cmd} help`, or `/{cmd}` with no arguments
    Help,
    /// `/auth <password>`
    Auth(String),
}

impl Command {
    /// Parse a message text.
    ///
    /// Returns `None` for anything that is not one of our commands, so the
    /// caller can ignore ordinary chat messages. A `@botname` suffix on the
    /// command word is accepted.
    pub fn parse(text: &str, command: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (word, args) = match rest.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args.trim()),
            None => (rest, ""),
        };
        let word = word.split_once('@').map_or(word, |(w, _)| w);

        if word == "auth" {
            return Some(Command::Auth(args.to_string()));
        }
        if word != command {
            return None;
        }

        let (sub, sub_args) = match args.split_once(char::is_whitespace) {
            Some((sub, sub_args)) => (sub, sub_args.trim()),
            None => (args, ""),
        };
        Some(match sub {
            "" | "help" if sub_args.is_empty() => Command::Help,
            "list" if sub_args.is_empty() => Command::List,
            "queue" if sub_args.is_empty() => Command::Queue,
            "search" if !sub_args.is_empty() => Command::Search(sub_args.to_string()),
            _ => Command::Search(args.to_string()),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Search(_) => "search",
            Command::List => "list",
            Command::Queue => "queue",
            Command::Help => "help",
            Command::Auth(_) => "auth",
        }
    }
}

/// Usage text listing every command
pub fn help_text(command: &str) -> String {
    format!(
        "Sonarr commands:\n\n\
         /{command} <title> - Search for a series\n\
         /{command} search <title> - Search for a series\n\
         /{command} list - List all series in the library\n\
         /{command} queue - Shows the download queue\n\
         /{command} help - Shows this help page\n\
         /auth <password> - Authorize yourself"
    )
}
