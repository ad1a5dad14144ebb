use chrono::SecondsFormat;

use super::command::{Command, IdpOverrides, TokenField};
use super::errors::DispatchError;
use super::help::{general_help, verb_help};
use crate::capture::store_token_response;
use crate::idp::{IdpKind, IdpSettings, refresh_access_token};
use crate::module::ModuleRegistry;
use crate::state::SharedState;
use crate::token::{Token, parse_expiry_hhmm};

/// What the console does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text (if any) and prompt again
    Continue(String),
    Exit,
}

/// Routes parsed console commands to the token store, target, IDP session and modules.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    state: SharedState,
    modules: ModuleRegistry,
    defaults: IdpSettings,
}

impl Dispatcher {
    /// `defaults` seed every `idp configure`; per-command overrides apply on top.
    pub fn new(state: SharedState, modules: ModuleRegistry, defaults: IdpSettings) -> Self {
        Self {
            state,
            modules,
            defaults,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Parse and run one console line.
    pub async fn dispatch(&self, line: &str) -> Result<Outcome, DispatchError> {
        match Command::parse(line)? {
            Some(command) => self.execute(command).await,
            None => Ok(Outcome::Continue(String::new())),
        }
    }

    pub async fn execute(&self, command: Command) -> Result<Outcome, DispatchError> {
        tracing::debug!(?command, "Dispatching command");
        let text = match command {
            Command::Exit => return Ok(Outcome::Exit),
            Command::Module {
                module,
                sub_module,
                args,
            } => self.run_module(&module, &sub_module, args).await?,
            Command::TokensList(None) => self.list_tokens().await,
            Command::TokensList(Some(key)) => self.show_token(&key).await?,
            Command::TokensDelete(key) => self.delete_token(&key).await?,
            Command::TokensSet { key, field, value } => self.set_token_field(&key, field, &value).await?,
            Command::TokensRefresh(key) => self.refresh_token(&key).await?,
            Command::IdpList => self.list_idps().await,
            Command::IdpConfigure { name, overrides } => self.configure_idp(&name, overrides).await?,
            Command::TargetList => self.show_target().await,
            Command::TargetSet(key) => {
                self.state.target.set(&key).await?;
                format!("Target set to {key}")
            }
            Command::TargetClear => {
                self.state.target.clear().await;
                "Target cleared".to_string()
            }
            Command::Url => self.url().await?,
            Command::Help(None) => general_help(),
            Command::Help(Some(verb)) => verb_help(&verb, &self.modules)?,
        };
        Ok(Outcome::Continue(text))
    }

    async fn run_module(
        &self,
        module_name: &str,
        sub_module_name: &str,
        args: Vec<String>,
    ) -> Result<String, DispatchError> {
        // Target first: without one nothing is looked up or sent
        let token = self.state.target.resolve().await?;

        let qualified = format!("{module_name}.{sub_module_name}");
        let module = self
            .modules
            .get(module_name, sub_module_name)
            .ok_or_else(|| DispatchError::NotFound {
                resource: "Module".to_string(),
                id: qualified.clone(),
            })?;

        tracing::info!(module = %qualified, target = %token.key(), "Running module");
        let raw = token.raw().to_string();
        let handle = tokio::spawn(async move { module.run(&raw, &args).await });

        match handle.await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(DispatchError::ModuleExecution {
                module: qualified,
                message: e.to_string(),
            }),
            Err(join_error) => Err(DispatchError::ModuleExecution {
                module: qualified,
                message: if join_error.is_panic() {
                    "module panicked".to_string()
                } else {
                    join_error.to_string()
                },
            }),
        }
    }

    async fn list_tokens(&self) -> String {
        let keys = self.state.tokens.list().await;
        if keys.is_empty() {
            return "No tokens captured yet".to_string();
        }
        let mut text = "Available token keys:".to_string();
        for key in keys {
            text.push('\n');
            text.push_str(&key);
        }
        text
    }

    async fn show_token(&self, key: &str) -> Result<String, DispatchError> {
        let token = self.state.tokens.get(key).await?;
        Ok(token_details(key, &token))
    }

    async fn delete_token(&self, key: &str) -> Result<String, DispatchError> {
        if !self.state.tokens.delete(key).await {
            return Err(DispatchError::token_not_found(key));
        }
        let mut text = format!("Token {key} deleted");
        if self.state.target.clear_if(key).await {
            text.push_str("; target cleared");
        }
        Ok(text)
    }

    async fn set_token_field(
        &self,
        key: &str,
        field: TokenField,
        value: &str,
    ) -> Result<String, DispatchError> {
        let new_key = match field {
            TokenField::Upn => {
                self.state
                    .tokens
                    .update(key, |t| t.set_principal(value))
                    .await?
            }
            TokenField::Scope => self.state.tokens.update(key, |t| t.set_scope(value)).await?,
            TokenField::Expiry => {
                let delta = parse_expiry_hhmm(value)?;
                self.state
                    .tokens
                    .update(key, |t| t.set_expiry(delta))
                    .await?
            }
        };

        if new_key == key {
            return Ok(format!("Token {key} updated"));
        }
        self.state.target.follow_rename(key, &new_key).await;
        Ok(format!("Token {key} updated and re-keyed to {new_key}"))
    }

    async fn refresh_token(&self, key: &str) -> Result<String, DispatchError> {
        let session = self.state.idp.session().await.ok_or_else(|| {
            DispatchError::Precondition(
                "IDP not configured yet. Run 'idp configure <idp_name>' first".to_string(),
            )
        })?;
        let token = self.state.tokens.get(key).await?;
        let refresh_token = token.refresh_token().ok_or_else(|| {
            DispatchError::Precondition(format!("Token {key} has no refresh token"))
        })?;

        let mut response = refresh_access_token(
            &session.token_url,
            &session.client_id,
            &session.scope,
            refresh_token,
        )
        .await?;
        if response.refresh_token.is_none() {
            response.refresh_token = Some(refresh_token.to_string());
        }

        let new_key = store_token_response(&self.state.tokens, response).await?;
        Ok(format!("Refreshed {key}: new access token stored as {new_key}"))
    }

    async fn list_idps(&self) -> String {
        let configured = self.state.idp.kind().await;
        let mut text = "Supported IDPs:".to_string();
        for kind in IdpKind::SUPPORTED {
            text.push_str("\n  ");
            text.push_str(kind.as_str());
            if configured == Some(kind) {
                text.push_str(" (configured)");
            }
        }
        text
    }

    async fn configure_idp(
        &self,
        name: &str,
        overrides: IdpOverrides,
    ) -> Result<String, DispatchError> {
        let kind: IdpKind = name.parse()?;

        let mut settings = self.defaults.clone();
        if let Some(client_id) = overrides.client_id {
            settings.client_id = Some(client_id);
        }
        if let Some(scope) = overrides.scope {
            settings.scope = scope;
        }
        if let Some(final_destination) = overrides.final_destination {
            settings.final_destination = final_destination;
        }

        let url = self.state.idp.configure(kind, &settings).await?;
        Ok(format!("IDP {kind} configured. Authorization URL:\n{url}"))
    }

    async fn show_target(&self) -> String {
        match self.state.target.get().await {
            Some(key) if self.state.tokens.contains(&key).await => format!("Current target: {key}"),
            Some(key) => format!("Current target: {key} (stale: no longer in the token store)"),
            None => "No target set. To set a target use: target set <token_key>".to_string(),
        }
    }

    async fn url(&self) -> Result<String, DispatchError> {
        self.state.idp.url().await.ok_or_else(|| {
            DispatchError::Precondition(
                "IDP not configured yet. Run 'idp configure <idp_name>' first".to_string(),
            )
        })
    }
}

fn token_details(key: &str, token: &Token) -> String {
    let or_na = |v: Option<&str>| v.unwrap_or("N/A").to_string();
    let mut lines = vec![
        format!("Details for token {key}:"),
        format!("  Kind: {}", token.kind()),
        format!("  User Principal Name (UPN): {}", or_na(token.principal())),
        format!("  Scope: {}", or_na(token.scope())),
        format!("  Expiry: {}", token.time_until_expiry()),
        format!(
            "  Issued at: {}",
            token.issued_at().to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    ];
    if token.is_jwt() {
        lines.push(format!("  Algorithm: {}", or_na(token.algorithm())));
    }
    if let Some(refresh_token) = token.refresh_token() {
        lines.push(format!("  Refresh Token: {refresh_token}"));
    }
    lines.push(format!("  Raw Token: {}", token.raw()));
    lines.join("\n")
}
