//! Actions carried by inline-button callbacks

use std::fmt;
use thiserror::Error;

/// How an `add` submission treats monitoring and searching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMode {
    /// Monitor all episodes and search for missing ones right away
    Search,
    /// Monitor all episodes without searching
    NoSearch,
    /// Add without monitoring anything
    NoMonitor,
}

impl AddMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AddMode::Search => "search",
            AddMode::NoSearch => "no-search",
            AddMode::NoMonitor => "no-monitor",
        }
    }

    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "search" => Some(AddMode::Search),
            "no-search" => Some(AddMode::NoSearch),
            "no-monitor" => Some(AddMode::NoMonitor),
            _ => None,
        }
    }
}

/// User actions that drive the navigation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move to a result, or just return to the top level when `None`
    Goto(Option<usize>),
    Seasons,
    SearchSeason(i32),
    Tags,
    AddTag(i64),
    RemTag(i64),
    Path,
    SelectPath(i64),
    Quality,
    SelectQuality(i64),
    Language,
    SelectLanguage(i64),
    AddMenu,
    UseSeasonFolder,
    SelectUseSeasonFolder(bool),
    Add(AddMode),
    Cancel,
    Remove,
    /// Header and placeholder buttons
    Noop,
}

/// Argument-free discriminant of [`Action`], used for permission lookups and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Goto,
    Seasons,
    SearchSeason,
    Tags,
    AddTag,
    RemTag,
    Path,
    SelectPath,
    Quality,
    SelectQuality,
    Language,
    SelectLanguage,
    AddMenu,
    UseSeasonFolder,
    SelectUseSeasonFolder,
    Add,
    Cancel,
    Remove,
    Noop,
}

impl ActionKind {
    /// Wire name used in callback data
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Goto => "goto",
            ActionKind::Seasons => "seasons",
            ActionKind::SearchSeason => "searchseason",
            ActionKind::Tags => "tags",
            ActionKind::AddTag => "addtag",
            ActionKind::RemTag => "remtag",
            ActionKind::Path => "path",
            ActionKind::SelectPath => "selectpath",
            ActionKind::Quality => "quality",
            ActionKind::SelectQuality => "selectquality",
            ActionKind::Language => "language",
            ActionKind::SelectLanguage => "selectlanguage",
            ActionKind::AddMenu => "addmenu",
            ActionKind::UseSeasonFolder => "useseasonfolder",
            ActionKind::SelectUseSeasonFolder => "selectuseseasonfolder",
            ActionKind::Add => "add",
            ActionKind::Cancel => "cancel",
            ActionKind::Remove => "remove",
            ActionKind::Noop => "noop",
        }
    }

    /// Actions that end the session
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionKind::Add | ActionKind::Cancel | ActionKind::Remove)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback data that could not be turned into an [`Action`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("Empty callback data")]
    Empty,
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Action {action} is missing its argument")]
    MissingArgument { action: &'static str },
    #[error("Invalid argument for {action}: {value}")]
    InvalidArgument {
        action: &'static str,
        value: String,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Goto(_) => ActionKind::Goto,
            Action::Seasons => ActionKind::Seasons,
            Action::SearchSeason(_) => ActionKind::SearchSeason,
            Action::Tags => ActionKind::Tags,
            Action::AddTag(_) => ActionKind::AddTag,
            Action::RemTag(_) => ActionKind::RemTag,
            Action::Path => ActionKind::Path,
            Action::SelectPath(_) => ActionKind::SelectPath,
            Action::Quality => ActionKind::Quality,
            Action::SelectQuality(_) => ActionKind::SelectQuality,
            Action::Language => ActionKind::Language,
            Action::SelectLanguage(_) => ActionKind::SelectLanguage,
            Action::AddMenu => ActionKind::AddMenu,
            Action::UseSeasonFolder => ActionKind::UseSeasonFolder,
            Action::SelectUseSeasonFolder(_) => ActionKind::SelectUseSeasonFolder,
            Action::Add(_) => ActionKind::Add,
            Action::Cancel => ActionKind::Cancel,
            Action::Remove => ActionKind::Remove,
            Action::Noop => ActionKind::Noop,
        }
    }

    /// Parse callback data of the form `"<name> [<arg>]"`.
    ///
    /// Extra trailing arguments are ignored. `useseasonfolder` accepts and
    /// discards any argument since it always flips the current value.
    pub fn parse(data: &str) -> Result<Self, ActionParseError> {
        let mut parts = data.split_whitespace();
        let name = parts.next().ok_or(ActionParseError::Empty)?;
        let arg = parts.next();

        let action = match name {
            "goto" => Action::Goto(arg.map(|a| parse_arg("goto", a)).transpose()?),
            "seasons" => Action::Seasons,
            "searchseason" => Action::SearchSeason(required("searchseason", arg)?),
            "tags" => Action::Tags,
            "addtag" => Action::AddTag(required("addtag", arg)?),
            "remtag" => Action::RemTag(required("remtag", arg)?),
            "path" => Action::Path,
            "selectpath" => Action::SelectPath(required("selectpath", arg)?),
            "quality" => Action::Quality,
            "selectquality" => Action::SelectQuality(required("selectquality", arg)?),
            "language" => Action::Language,
            "selectlanguage" => Action::SelectLanguage(required("selectlanguage", arg)?),
            "addmenu" => Action::AddMenu,
            "useseasonfolder" => Action::UseSeasonFolder,
            "selectuseseasonfolder" => {
                let value = arg.ok_or(ActionParseError::MissingArgument {
                    action: "selectuseseasonfolder",
                })?;
                Action::SelectUseSeasonFolder(parse_bool("selectuseseasonfolder", value)?)
            }
            "add" => {
                let value = arg.ok_or(ActionParseError::MissingArgument { action: "add" })?;
                Action::Add(AddMode::parse(value).ok_or_else(|| {
                    ActionParseError::InvalidArgument {
                        action: "add",
                        value: value.to_string(),
                    }
                })?)
            }
            "cancel" => Action::Cancel,
            "remove" => Action::Remove,
            "noop" => Action::Noop,
            other => return Err(ActionParseError::UnknownAction(other.to_string())),
        };

        Ok(action)
    }

    /// Encode as callback data, the inverse of [`Action::parse`]
    pub fn to_callback_data(&self) -> String {
        let name = self.kind().name();
        match self {
            Action::Goto(Some(idx)) => format!("{name} {idx}"),
            Action::SearchSeason(n) => format!("{name} {n}"),
            Action::AddTag(id)
            | Action::RemTag(id)
            | Action::SelectPath(id)
            | Action::SelectQuality(id)
            | Action::SelectLanguage(id) => format!("{name} {id}"),
            Action::SelectUseSeasonFolder(value) => format!("{name} {value}"),
            Action::Add(mode) => format!("{name} {}", mode.as_str()),
            _ => name.to_string(),
        }
    }
}

fn required<T: std::str::FromStr>(
    action: &'static str,
    arg: Option<&str>,
) -> Result<T, ActionParseError> {
    let value = arg.ok_or(ActionParseError::MissingArgument { action })?;
    parse_arg(action, value)
}

fn parse_arg<T: std::str::FromStr>(
    action: &'static str,
    value: &str,
) -> Result<T, ActionParseError> {
    value.parse().map_err(|_| ActionParseError::InvalidArgument {
        action,
        value: value.to_string(),
    })
}

/// Strict boolean literal, case-insensitive
fn parse_bool(action: &'static str, value: &str) -> Result<bool, ActionParseError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ActionParseError::InvalidArgument {
            action,
            value: value.to_string(),
        })
    }
}
