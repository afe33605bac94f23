//! Line commands accepted by the interactive session

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use notistack_api::{FireAt, NotificationType, Target};
use notistack_util::{NotificationId, parse_duration};
use std::time::Duration;

pub const HELP: &str = "\
Commands:
  send <target> <when> <title> [body...]            stage a one-shot notification
  repeat <target> <when> <every> <title> [body...]  stage a repeating notification
  cancel <target>                                   cancel one notification
  status <target>                                   is it live in the OS scheduler?
  cancel-all                                        cancel everything
  pause | resume                                    app lifecycle transitions
  list                                              show staged entries
  deliver                                           fire everything due now
  health                                            check store and scheduler
  help | quit

  <target>  type1, type2, type3 or an integer id
  <when>    +10s, +5m, +1h30m (relative) or an RFC 3339 instant
  <every>   10s, 5m, 1h30m";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send {
        target: Target,
        when: FireAt,
        every: Option<Duration>,
        title: String,
        body: String,
    },
    Cancel(Target),
    Status(Target),
    CancelAll,
    Pause,
    Resume,
    List,
    Deliver,
    Health,
    Help,
    Quit,
}

fn parse_target(s: &str) -> Result<Target> {
    if let Some(t) = NotificationType::from_name(s) {
        return Ok(Target::Type(t));
    }
    let id: NotificationId = s
        .parse()
        .with_context(|| format!("'{s}' is neither a notification type nor an integer id"))?;
    Ok(Target::Id(id))
}

fn parse_when(s: &str) -> Result<FireAt> {
    if let Some(rel) = s.strip_prefix('+') {
        let delay = parse_duration(rel).ok_or_else(|| anyhow!("invalid delay '{s}'"))?;
        return Ok(FireAt::After(delay));
    }
    let at = DateTime::parse_from_rfc3339(s).with_context(|| format!("invalid time '{s}'"))?;
    Ok(FireAt::At(at.with_timezone(&Utc)))
}

fn parse_every(s: &str) -> Result<Duration> {
    parse_duration(s).ok_or_else(|| anyhow!("invalid interval '{s}'"))
}

/// Parse one input line. Blank lines yield None.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let mut arg = |name: &str| {
        words
            .next()
            .ok_or_else(|| anyhow!("missing <{name}> for '{verb}'"))
    };

    let command = match verb.to_lowercase().as_str() {
        "send" | "repeat" => {
            let target = parse_target(arg("target")?)?;
            let when = parse_when(arg("when")?)?;
            let every = if verb.eq_ignore_ascii_case("repeat") {
                Some(parse_every(arg("every")?)?)
            } else {
                None
            };
            let title = arg("title")?.to_string();
            let body = words.collect::<Vec<_>>().join(" ");
            Command::Send {
                target,
                when,
                every,
                title,
                body,
            }
        }
        "cancel" => Command::Cancel(parse_target(arg("target")?)?),
        "status" => Command::Status(parse_target(arg("target")?)?),
        "cancel-all" => Command::CancelAll,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "list" | "ls" => Command::List,
        "deliver" => Command::Deliver,
        "health" => Command::Health,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}', try 'help'"),
    };
    Ok(Some(command))
}
