//! Command execution against the live session
//!
//! The shell owns nothing but handles: the credential store, the navigator
//! and the client all share state through `Arc`s, so a 401 seen by the
//! client's pipeline is visible to the next `status` immediately.

use std::sync::Arc;

use chrono::{Local, TimeZone, Utc};
use formatting::{DEFAULT_PATTERN, Locale, format_date, format_file_size, format_relative_time};
use interceptor::{ApiResponse, PendingRequest, SessionClient, endpoints};
use navigation::{NavigationDecision, NavigationOutcome, Navigator};
use session_store::{Credential, CredentialKind, CredentialStore};
use tracing::{debug, warn};

use crate::command::{self, Command, HELP};
use crate::error::{Error, Result};

/// What the read loop should do after a line.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

pub struct Shell {
    store: Arc<CredentialStore>,
    navigator: Arc<Navigator>,
    client: SessionClient,
    locale: Locale,
}

impl Shell {
    pub fn new(
        store: Arc<CredentialStore>,
        navigator: Arc<Navigator>,
        client: SessionClient,
        locale: Locale,
    ) -> Self {
        Self {
            store,
            navigator,
            client,
            locale,
        }
    }

    /// Parse and execute one input line, rendering errors as text.
    pub async fn run_line(&self, line: &str) -> Reply {
        let command = match command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Reply::Text(String::new()),
            Err(e) => return Reply::Text(format!("error: {e}")),
        };

        let before = self.navigator.current();
        match self.execute(command).await {
            Ok(reply) => reply,
            Err(Error::Request(failure)) => {
                let mut text = format!("error: {failure}");
                let after = self.navigator.current();
                if after != before
                    && let Some(route) = after
                {
                    text.push_str(&format!("\nredirected to {}", route.location));
                }
                Reply::Text(text)
            }
            Err(e) => Reply::Text(format!("error: {e}")),
        }
    }

    pub async fn execute(&self, command: Command) -> Result<Reply> {
        let text = match command {
            Command::Login { kind, token } => self.login(kind, token).await?,
            Command::Logout(kind) => self.logout(kind).await?,
            Command::Goto(target) => {
                let outcome = self.navigator.navigate(&target).await?;
                describe_outcome(&outcome)
            }
            Command::Get(url) => self.request(PendingRequest::get(url)).await?,
            Command::Post { url, body } => {
                self.request(PendingRequest::post(url).with_json(body))
                    .await?
            }
            Command::Whoami => self.request(PendingRequest::get(endpoints::USER_INFO)).await?,
            Command::Status => self.status().await,
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    async fn login(&self, kind: CredentialKind, token: String) -> Result<String> {
        self.store.set(kind, token).await?;
        debug!(%kind, "credential bound from console");
        let outcome = self.navigator.resume_after_login(kind).await?;
        Ok(format!(
            "logged in as {kind}\n{}",
            describe_outcome(&outcome)
        ))
    }

    async fn logout(&self, kind: CredentialKind) -> Result<String> {
        let was_bound = self.store.presence().await.has(kind);
        if kind == CredentialKind::User && was_bound {
            // Server-side logout is best effort; the local credential goes regardless.
            if let Err(e) = self
                .client
                .send(PendingRequest::post(endpoints::LOGOUT).with_json(serde_json::json!({})))
                .await
            {
                warn!(error = %e, "server logout failed");
            }
        }

        self.store.clear(kind).await?;
        let mut text = if was_bound {
            format!("{kind} credential cleared")
        } else {
            format!("no {kind} credential was bound")
        };

        if self.navigator.current_requirement().credential() == Some(kind) {
            let outcome = self.navigator.redirect_to_login(kind, None).await?;
            text.push('\n');
            text.push_str(&describe_outcome(&outcome));
        }
        Ok(text)
    }

    async fn request(&self, request: PendingRequest) -> Result<String> {
        let response = self.client.send(request).await?;
        Ok(describe_response(&response))
    }

    async fn status(&self) -> String {
        let view = match self.navigator.current() {
            Some(route) => format!("view: {} (requires {})", route.location, route.requirement),
            None => "view: (none)".to_string(),
        };
        let mut lines = vec![view];
        for kind in [CredentialKind::User, CredentialKind::Admin] {
            let line = match self.store.get(kind).await {
                Some(credential) => format!("{kind}: {}", self.describe_credential(&credential)),
                None => format!("{kind}: not bound"),
            };
            lines.push(line);
        }
        lines.push(format!("api: {}", self.client.base_url()));
        lines.join("\n")
    }

    fn describe_credential(&self, credential: &Credential) -> String {
        let hint = credential.token.hint();
        let stored = i64::try_from(credential.stored_at)
            .ok()
            .filter(|ms| *ms > 0)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
        match stored {
            Some(at) => {
                let local = at.with_timezone(&Local);
                format!(
                    "bound {hint}, {} ({})",
                    format_relative_time(&local, self.locale),
                    format_date(&local, DEFAULT_PATTERN)
                )
            }
            None => format!("bound {hint}"),
        }
    }
}

fn describe_outcome(outcome: &NavigationOutcome) -> String {
    match &outcome.decision {
        NavigationDecision::Allowed => format!("view: {}", outcome.route.location),
        NavigationDecision::RedirectToUserLogin { .. } => format!(
            "user login required, redirected to {}",
            outcome.route.location
        ),
        NavigationDecision::RedirectToAdminLogin { .. } => format!(
            "admin login required, redirected to {}",
            outcome.route.location
        ),
    }
}

fn describe_response(response: &ApiResponse) -> String {
    let size = format_file_size(response.body.len() as u64);
    let body = response.text();
    if body.is_empty() {
        format!("{} ({size})", response.status)
    } else {
        format!("{} ({size})\n{body}", response.status)
    }
}
