//! Line command parsing
//!
//! One command per line, whitespace separated. Parsing is pure; the shell
//! executes the result.

use serde_json::Value;
use session_store::CredentialKind;

use crate::error::{Error, Result};

pub const HELP: &str = "\
commands:
  login user|admin <token>   bind a credential and continue to the pending view
  logout user|admin          clear a credential
  goto <path>                navigate to an in-app path
  get <url>                  GET through the session pipeline
  post <url> [json]          POST a JSON body (default {})
  whoami                     fetch the current user's profile
  status                     show credentials and the current view
  help                       this text
  quit                       exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { kind: CredentialKind, token: String },
    Logout(CredentialKind),
    Goto(String),
    Get(String),
    Post { url: String, body: Value },
    Whoami,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match name {
        "login" => {
            let usage = || Error::Usage("login user|admin <token>");
            let kind = args.next().and_then(parse_kind).ok_or_else(usage)?;
            let token = args.next().ok_or_else(usage)?;
            Command::Login {
                kind,
                token: token.to_string(),
            }
        }
        "logout" => {
            let kind = args
                .next()
                .and_then(parse_kind)
                .ok_or(Error::Usage("logout user|admin"))?;
            Command::Logout(kind)
        }
        "goto" => Command::Goto(single(rest, "goto <path>")?),
        "get" => Command::Get(single(rest, "get <url>")?),
        "post" => {
            let (url, body) = match rest.split_once(char::is_whitespace) {
                Some((url, body)) => (url, body.trim()),
                None => (rest, ""),
            };
            if url.is_empty() {
                return Err(Error::Usage("post <url> [json]"));
            }
            let body = if body.is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(body).map_err(|e| Error::InvalidJson(e.to_string()))?
            };
            Command::Post {
                url: url.to_string(),
                body,
            }
        }
        "whoami" => Command::Whoami,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(Error::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_kind(word: &str) -> Option<CredentialKind> {
    match word {
        "user" => Some(CredentialKind::User),
        "admin" => Some(CredentialKind::Admin),
        _ => None,
    }
}

fn single(rest: &str, usage: &'static str) -> Result<String> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None) => Ok(word.to_string()),
        _ => Err(Error::Usage(usage)),
    }
}
