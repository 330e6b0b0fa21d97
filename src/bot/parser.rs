//! Command parser: raw message text → structured command.
//!
//! Supported surfaces:
//! - `owo <action> @user [then <action> [@user]] ...` (prefix optional
//!   for action chains, both `action@user` and `action @user` forms)
//! - `owo help` / `owo f.c` for the category listing
//! - named commands (`owo stats`, `owo add-action <name>`, ...), which
//!   always require the trigger word so ordinary chat is left alone.

use regex::Regex;
use std::sync::LazyLock;

/// A raw target token, resolved against mentions and the member
/// directory later.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetToken {
    /// Bare numeric user id.
    Id(i64),
    /// `@username` or display name (leading `@` stripped).
    Name(String),
}

/// One step of an action chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionStep {
    pub action: String,
    pub target: Option<TargetToken>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    Cooldown(u64),
    AutoReact(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Enable,
    Disable,
    Settings(Option<SettingChange>),
    AddAction(String),
    RemoveAction(String),
    Alias { action: String, alias: String },
    ActionList,
    Stats,
    Suggest(String),
    Favorites,
    FavUse(String),
    Chain(Vec<ActionStep>),
}

static THEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+then\s+").unwrap());

// `hug@user`, the no-space form.
static NO_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?P<action>[a-z][a-z0-9_-]*)@(?P<target>\S+)").unwrap());

// `hug @user` / `hug user` / bare `hug`. Trailing text is ignored.
static SPACED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?P<action>[a-z][a-z0-9_-]*)(?:\s+@?(?P<target>\S+))?").unwrap());

/// Parse a message. `None` means "not for us" and must be silently
/// ignored by the caller.
pub fn parse(text: &str, trigger: &str) -> Option<Command> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (prefixed, rest) = match strip_trigger(text, trigger) {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    if prefixed {
        match parse_named(rest) {
            Named::Command(cmd) => return Some(cmd),
            // Recognized command word with bad arguments: swallow it
            // rather than letting it fall through as a chain.
            Named::Malformed => return None,
            Named::NotNamed => {}
        }
    }

    parse_chain(rest)
}

fn strip_trigger<'a>(text: &'a str, trigger: &str) -> Option<&'a str> {
    let mut parts = text.splitn(2, char::is_whitespace);
    let head = parts.next()?;
    if head.eq_ignore_ascii_case(trigger) {
        Some(parts.next().unwrap_or("").trim_start())
    } else {
        None
    }
}

enum Named {
    Command(Command),
    Malformed,
    NotNamed,
}

fn parse_named(rest: &str) -> Named {
    let mut words = rest.split_whitespace();
    let Some(head) = words.next() else {
        return Named::NotNamed;
    };
    let head = head.to_ascii_lowercase();

    fn one_token<'a>(words: &mut impl Iterator<Item = &'a str>) -> Option<String> {
        let token = words.next()?.trim_start_matches('@').to_ascii_lowercase();
        valid_token(&token).then_some(token)
    }

    match head.as_str() {
        "help" | "f.c" | "fc" | "f.c." => Named::Command(Command::Help),
        "enable" => Named::Command(Command::Enable),
        "disable" => Named::Command(Command::Disable),
        "settings" => match words.next().map(str::to_ascii_lowercase).as_deref() {
            None => Named::Command(Command::Settings(None)),
            Some("cooldown") => match words.next().and_then(|n| n.parse::<u64>().ok()) {
                Some(n) => Named::Command(Command::Settings(Some(SettingChange::Cooldown(n)))),
                None => Named::Malformed,
            },
            Some("react") => match words.next().map(str::to_ascii_lowercase).as_deref() {
                Some("on") => Named::Command(Command::Settings(Some(SettingChange::AutoReact(true)))),
                Some("off") => Named::Command(Command::Settings(Some(SettingChange::AutoReact(false)))),
                _ => Named::Malformed,
            },
            Some(_) => Named::Malformed,
        },
        "add-action" => match one_token(&mut words) {
            Some(name) => Named::Command(Command::AddAction(name)),
            None => Named::Malformed,
        },
        "remove-action" => match one_token(&mut words) {
            Some(name) => Named::Command(Command::RemoveAction(name)),
            None => Named::Malformed,
        },
        "alias" => match (one_token(&mut words), one_token(&mut words)) {
            (Some(action), Some(alias)) => Named::Command(Command::Alias { action, alias }),
            _ => Named::Malformed,
        },
        "action-list" | "actions" => Named::Command(Command::ActionList),
        "stats" => Named::Command(Command::Stats),
        "suggest" => match one_token(&mut words) {
            Some(name) => Named::Command(Command::Suggest(name)),
            None => Named::Malformed,
        },
        "favs" | "favorites" => Named::Command(Command::Favorites),
        "fav-use" => match one_token(&mut words) {
            Some(name) => Named::Command(Command::FavUse(name)),
            None => Named::Malformed,
        },
        _ => Named::NotNamed,
    }
}

fn parse_chain(rest: &str) -> Option<Command> {
    let mut steps = Vec::new();
    for (i, segment) in THEN_RE.split(rest).enumerate() {
        match parse_segment(segment.trim()) {
            Some(step) => {
                // The first step anchors the chain and must carry an
                // explicit target.
                if i == 0 && step.target.is_none() {
                    return None;
                }
                steps.push(step);
            }
            // Malformed later segments are skipped; a malformed first
            // segment drops the whole command.
            None if i == 0 => return None,
            None => {}
        }
    }
    if steps.is_empty() { None } else { Some(Command::Chain(steps)) }
}

fn parse_segment(segment: &str) -> Option<ActionStep> {
    let caps = NO_SPACE_RE
        .captures(segment)
        .or_else(|| SPACED_RE.captures(segment))?;

    let action = caps["action"].to_ascii_lowercase();
    if !valid_token(&action) {
        return None;
    }
    let target = caps.name("target").map(|m| parse_target(m.as_str()));
    Some(ActionStep { action, target })
}

fn parse_target(token: &str) -> TargetToken {
    let token = token.trim_start_matches('@');
    match token.parse::<i64>() {
        Ok(id) if id > 0 => TargetToken::Id(id),
        _ => TargetToken::Name(token.to_string()),
    }
}

fn valid_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_owo(text: &str) -> Option<Command> {
        parse(text, "owo")
    }

    fn chain(cmd: Command) -> Vec<ActionStep> {
        match cmd {
            Command::Chain(steps) => steps,
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_action_with_mention() {
        let steps = chain(parse_owo("hug @alice").unwrap());
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].action, "hug");
        assert_eq!(steps[0].target, Some(TargetToken::Name("alice".into())));
    }

    #[test]
    fn test_no_space_form() {
        let steps = chain(parse_owo("hug@alice").unwrap());
        assert_eq!(steps[0].action, "hug");
        assert_eq!(steps[0].target, Some(TargetToken::Name("alice".into())));
    }

    #[test]
    fn test_prefixed_form() {
        let steps = chain(parse_owo("owo hug @alice").unwrap());
        assert_eq!(steps[0].action, "hug");
    }

    #[test]
    fn test_numeric_id_target() {
        let steps = chain(parse_owo("slap 12345").unwrap());
        assert_eq!(steps[0].target, Some(TargetToken::Id(12345)));
    }

    #[test]
    fn test_chain_carries_target() {
        let steps = chain(parse_owo("hug @u1 then pat then slap").unwrap());
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].action, "hug");
        assert_eq!(steps[0].target, Some(TargetToken::Name("u1".into())));
        assert_eq!(steps[1].action, "pat");
        assert_eq!(steps[1].target, None);
        assert_eq!(steps[2].action, "slap");
        assert_eq!(steps[2].target, None);
    }

    #[test]
    fn test_chain_then_is_case_insensitive() {
        let steps = chain(parse_owo("hug @u1 THEN pat").unwrap());
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_later_step_with_own_target() {
        let steps = chain(parse_owo("hug @u1 then pat @u2").unwrap());
        assert_eq!(steps[1].target, Some(TargetToken::Name("u2".into())));
    }

    #[test]
    fn test_first_step_requires_target() {
        assert_eq!(parse_owo("hug"), None);
        assert_eq!(parse_owo("hug then pat @u1"), None);
    }

    #[test]
    fn test_malformed_later_segment_is_skipped() {
        let steps = chain(parse_owo("hug @u1 then !!! then pat").unwrap());
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].action, "pat");
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert_eq!(parse_owo(""), None);
        assert_eq!(parse_owo("   "), None);
        assert_eq!(parse_owo("@@@"), None);
    }

    #[test]
    fn test_help_variants() {
        assert_eq!(parse_owo("owo help"), Some(Command::Help));
        assert_eq!(parse_owo("owo f.c"), Some(Command::Help));
        assert_eq!(parse_owo("OWO FC"), Some(Command::Help));
    }

    #[test]
    fn test_help_requires_prefix() {
        assert_eq!(parse_owo("help"), None);
    }

    #[test]
    fn test_named_commands() {
        assert_eq!(parse_owo("owo enable"), Some(Command::Enable));
        assert_eq!(parse_owo("owo disable"), Some(Command::Disable));
        assert_eq!(parse_owo("owo stats"), Some(Command::Stats));
        assert_eq!(parse_owo("owo action-list"), Some(Command::ActionList));
        assert_eq!(parse_owo("owo favs"), Some(Command::Favorites));
        assert_eq!(parse_owo("owo add-action snuggle"), Some(Command::AddAction("snuggle".into())));
        assert_eq!(parse_owo("owo remove-action snuggle"), Some(Command::RemoveAction("snuggle".into())));
        assert_eq!(parse_owo("owo suggest yeet"), Some(Command::Suggest("yeet".into())));
        assert_eq!(parse_owo("owo fav-use hug"), Some(Command::FavUse("hug".into())));
        assert_eq!(
            parse_owo("owo alias hug hugs"),
            Some(Command::Alias { action: "hug".into(), alias: "hugs".into() })
        );
    }

    #[test]
    fn test_settings_changes() {
        assert_eq!(parse_owo("owo settings"), Some(Command::Settings(None)));
        assert_eq!(
            parse_owo("owo settings cooldown 10"),
            Some(Command::Settings(Some(SettingChange::Cooldown(10))))
        );
        assert_eq!(
            parse_owo("owo settings react off"),
            Some(Command::Settings(Some(SettingChange::AutoReact(false))))
        );
    }

    #[test]
    fn test_malformed_named_command_is_swallowed() {
        // Must not fall through and become a placeholder action chain.
        assert_eq!(parse_owo("owo settings cooldown abc"), None);
        assert_eq!(parse_owo("owo alias hug"), None);
        assert_eq!(parse_owo("owo add-action !!!"), None);
    }

    #[test]
    fn test_unknown_word_becomes_chain_step() {
        // Permissive path: unknown tokens are still parsed as actions.
        let steps = chain(parse_owo("yeet @u1").unwrap());
        assert_eq!(steps[0].action, "yeet");
    }
}
