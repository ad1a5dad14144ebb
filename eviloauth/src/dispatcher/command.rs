use super::errors::DispatchError;

/// Top-level verbs, in the order `help` lists them.
pub const VERBS: [&str; 7] = ["exit", "module", "tokens", "idp", "target", "url", "help"];

/// Editable field of an opaque token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    Upn,
    Scope,
    Expiry,
}

impl std::str::FromStr for TokenField {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upn" => Ok(Self::Upn),
            "scope" => Ok(Self::Scope),
            "expiry" => Ok(Self::Expiry),
            _ => Err(DispatchError::Validation(format!(
                "unknown token field '{s}', expected upn, scope or expiry"
            ))),
        }
    }
}

/// Per-session overrides given as `key=value` words to `idp configure`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdpOverrides {
    pub client_id: Option<String>,
    pub scope: Option<String>,
    pub final_destination: Option<String>,
}

impl IdpOverrides {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name.to_ascii_lowercase().as_str() {
            "client_id" => Some(&mut self.client_id),
            "scope" => Some(&mut self.scope),
            "final_destination" => Some(&mut self.final_destination),
            _ => None,
        }
    }

    /// Words without `=` continue the previous value, so `scope=openid Mail.Read`
    /// yields a two-word scope.
    fn parse(words: &[&str]) -> Result<Self, DispatchError> {
        let mut overrides = Self::default();
        let mut last: Option<&str> = None;

        for word in words {
            if let Some((name, value)) = word.split_once('=') {
                let slot = overrides.slot(name).ok_or_else(|| {
                    DispatchError::Validation(format!(
                        "unknown idp option '{name}', expected client_id, scope or final_destination"
                    ))
                })?;
                *slot = Some(value.to_string());
                last = Some(name);
            } else if let Some(Some(value)) = last.and_then(|name| overrides.slot(name)) {
                value.push(' ');
                value.push_str(word);
            } else {
                return Err(DispatchError::Validation(format!(
                    "expected key=value, got '{word}'"
                )));
            }
        }
        Ok(overrides)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Module {
        module: String,
        sub_module: String,
        args: Vec<String>,
    },
    TokensList(Option<String>),
    TokensDelete(String),
    TokensSet {
        key: String,
        field: TokenField,
        value: String,
    },
    TokensRefresh(String),
    IdpList,
    IdpConfigure {
        name: String,
        overrides: IdpOverrides,
    },
    TargetList,
    TargetSet(String),
    TargetClear,
    Url,
    Help(Option<String>),
}

impl Command {
    /// Parse one console line. Returns `Ok(None)` for a blank line.
    ///
    /// Verbs and subcommands are matched case-insensitively; keys and values keep
    /// their case.
    pub fn parse(line: &str) -> Result<Option<Self>, DispatchError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, rest)) = words.split_first() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "exit" => Self::Exit,
            "module" => Self::parse_module(rest)?,
            "tokens" => Self::parse_tokens(rest)?,
            "idp" => Self::parse_idp(rest)?,
            "target" => Self::parse_target(rest)?,
            "url" => Self::Url,
            "help" => Self::Help(rest.first().map(|v| v.to_ascii_lowercase())),
            _ => return Err(DispatchError::UnknownCommand(verb.to_string())),
        };
        Ok(Some(command))
    }

    fn parse_module(rest: &[&str]) -> Result<Self, DispatchError> {
        match rest {
            [module, sub_module, args @ ..] => Ok(Self::Module {
                module: module.to_string(),
                sub_module: sub_module.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            }),
            _ => Err(DispatchError::Usage(
                "module <module_name> <sub_module_name> [args...]".to_string(),
            )),
        }
    }

    fn parse_tokens(rest: &[&str]) -> Result<Self, DispatchError> {
        let Some((sub, args)) = rest.split_first() else {
            return Err(DispatchError::Usage(
                "tokens <list|delete|set|refresh> [args...]".to_string(),
            ));
        };

        match (sub.to_ascii_lowercase().as_str(), args) {
            ("list", []) => Ok(Self::TokensList(None)),
            ("list", [key]) => Ok(Self::TokensList(Some(key.to_string()))),
            ("list", _) => Err(DispatchError::Usage("tokens list [<token_key>]".to_string())),
            ("delete", [key]) => Ok(Self::TokensDelete(key.to_string())),
            ("delete", _) => Err(DispatchError::Usage("tokens delete <token_key>".to_string())),
            ("set", [key, field, value @ ..]) if !value.is_empty() => Ok(Self::TokensSet {
                key: key.to_string(),
                field: field.parse()?,
                value: value.join(" "),
            }),
            ("set", _) => Err(DispatchError::Usage(
                "tokens set <token_key> <upn|scope|expiry> <value>".to_string(),
            )),
            ("refresh", [key]) => Ok(Self::TokensRefresh(key.to_string())),
            ("refresh", _) => Err(DispatchError::Usage("tokens refresh <token_key>".to_string())),
            (_, _) => Err(DispatchError::UnknownSubcommand {
                verb: "tokens".to_string(),
                sub: sub.to_string(),
            }),
        }
    }

    fn parse_idp(rest: &[&str]) -> Result<Self, DispatchError> {
        let Some((sub, args)) = rest.split_first() else {
            return Err(DispatchError::Usage("idp <list|configure> [args...]".to_string()));
        };

        match (sub.to_ascii_lowercase().as_str(), args) {
            ("list", _) => Ok(Self::IdpList),
            ("configure", [name, options @ ..]) => Ok(Self::IdpConfigure {
                name: name.to_string(),
                overrides: IdpOverrides::parse(options)?,
            }),
            ("configure", []) => Err(DispatchError::Usage(
                "idp configure <idp_name> [client_id=..] [scope=..] [final_destination=..]"
                    .to_string(),
            )),
            (_, _) => Err(DispatchError::UnknownSubcommand {
                verb: "idp".to_string(),
                sub: sub.to_string(),
            }),
        }
    }

    fn parse_target(rest: &[&str]) -> Result<Self, DispatchError> {
        let Some((sub, args)) = rest.split_first() else {
            return Err(DispatchError::Usage("target <list|set|clear> [args...]".to_string()));
        };

        match (sub.to_ascii_lowercase().as_str(), args) {
            ("list", _) => Ok(Self::TargetList),
            ("set", [key]) => Ok(Self::TargetSet(key.to_string())),
            ("set", _) => Err(DispatchError::Usage("target set <token_key>".to_string())),
            ("clear", _) => Ok(Self::TargetClear),
            (_, _) => Err(DispatchError::UnknownSubcommand {
                verb: "target".to_string(),
                sub: sub.to_string(),
            }),
        }
    }
}
