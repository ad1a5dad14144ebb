use super::errors::DispatchError;
use crate::idp::IdpKind;
use crate::module::ModuleRegistry;

pub(super) fn general_help() -> String {
    let mut lines = vec![
        "Commands:".to_string(),
        "  exit                                    Stop the listener and quit".to_string(),
        "  module <module> <sub_module> [args...]  Run a module against the current target".to_string(),
        "  tokens list [<token_key>]               List captured tokens or show one".to_string(),
        "  tokens delete <token_key>               Delete a token".to_string(),
        "  tokens set <token_key> <field> <value>  Edit upn, scope or expiry of an opaque token".to_string(),
        "  tokens refresh <token_key>              Redeem the token's refresh token".to_string(),
        "  idp list                                List supported IDPs".to_string(),
        "  idp configure <idp_name> [options]      Start a new IDP session".to_string(),
        "  target list | set <token_key> | clear   Manage the module target".to_string(),
        "  url                                     Show the authorization URL".to_string(),
        "  help [<command>]                        Show help".to_string(),
    ];
    lines.push(String::new());
    lines.push("Type 'help <command>' for details.".to_string());
    lines.join("\n")
}

pub(super) fn verb_help(verb: &str, modules: &ModuleRegistry) -> Result<String, DispatchError> {
    let text = match verb {
        "exit" => "Usage: exit\n\nStops the capture listener and quits. Ctrl-C and Ctrl-D do the same."
            .to_string(),
        "module" => {
            let mut text = "Usage: module <module_name> <sub_module_name> [args...]\n\n\
                 Runs a module with the raw bearer token of the current target.\n\
                 A target must be set first (target set <token_key>).\n\nModules:"
                .to_string();
            if modules.is_empty() {
                text.push_str("\n  (none loaded)");
            }
            for module in modules.iter() {
                text.push_str(&format!(
                    "\n  {} {}  {}",
                    module.module_name(),
                    module.sub_module_name(),
                    module.description()
                ));
            }
            text
        }
        "tokens" => "Usage: tokens <subcommand> [<args>]\n\n\
             Subcommands:\n  \
             list [<token_key>]                    List all token keys, or details of one token\n  \
             delete <token_key>                    Delete a token (clears the target if it pointed there)\n  \
             set <token_key> <field> <value>       Edit an opaque token\n  \
             refresh <token_key>                   Trade the stored refresh token for a new access token\n\n\
             Fields for 'set' (opaque tokens only, JWT fields come from the token):\n  \
             upn <name>      Assign a principal; the token is re-keyed to OAT-<name>\n  \
             scope <scope>   Set the scope\n  \
             expiry <HHMM>   Expire HH hours and MM minutes from now\n\n\
             Example: tokens set OAT-1234567890 upn victim@corp.example"
            .to_string(),
        "idp" => format!(
            "Usage: idp list\n       idp configure <idp_name> [client_id=..] [scope=..] [final_destination=..]\n\n\
             Supported IDPs: {}\n\
             Options override the values given on the command line for this session only.\n\
             Words without '=' extend the previous option, e.g. scope=openid Mail.Read",
            IdpKind::supported_names()
        ),
        "target" => "Usage: target list | target set <token_key> | target clear\n\n\
             The target is the token whose raw value modules run with."
            .to_string(),
        "url" => "Usage: url\n\nShows the authorization URL of the last 'idp configure'.".to_string(),
        "help" => "Usage: help [<command>]".to_string(),
        other => return Err(DispatchError::UnknownCommand(other.to_string())),
    };
    Ok(text)
}
