use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{to_body, ExtraFields};
use crate::client::{EventStream, RequestSpec, XenoClient};
use crate::error::Result;
use crate::types::{ChatCompletion, ChatCompletionChunk, ChatMessage, Tool};

const COMPLETIONS_PATH: &str = "/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";

/// The incremental chunks of a streamed chat completion.
pub type ChatCompletionStream = EventStream<ChatCompletionChunk>;

/// One or more sequences at which generation stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stop {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for Stop {
    fn from(stop: &str) -> Self {
        Stop::Single(stop.to_string())
    }
}

impl From<Vec<String>> for Stop {
    fn from(stops: Vec<String>) -> Self {
        Stop::Multiple(stops)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFunction {
    pub name: String,
}

/// Controls whether and which tool the model calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
    /// `"auto"`, `"none"` or `"required"`.
    Mode(String),
    /// Forces a call to the named function.
    Function {
        #[serde(rename = "type")]
        type_: String,
        function: NamedFunction,
    },
}

impl ToolChoice {
    pub fn auto() -> Self {
        ToolChoice::Mode("auto".to_string())
    }

    pub fn none() -> Self {
        ToolChoice::Mode("none".to_string())
    }

    pub fn required() -> Self {
        ToolChoice::Mode("required".to_string())
    }

    pub fn function(name: impl Into<String>) -> Self {
        ToolChoice::Function {
            type_: "function".to_string(),
            function: NamedFunction { name: name.into() },
        }
    }
}

/// The output format requested from the model, e.g. `json_object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub type_: String,
}

impl ResponseFormat {
    pub fn text() -> Self {
        Self {
            type_: "text".to_string(),
        }
    }

    pub fn json_object() -> Self {
        Self {
            type_: "json_object".to_string(),
        }
    }
}

/// Options for [`Chat::create`] and [`Chat::create_stream`].
#[derive(Debug, Clone)]
pub struct ChatCompletionOptions {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Option<Stop>,
    pub tools: Option<Vec<Tool>>,
    pub tool_choice: Option<ToolChoice>,
    pub response_format: Option<ResponseFormat>,
    pub seed: Option<i64>,
    /// An end-user identifier for abuse monitoring.
    pub user: Option<String>,
    pub extra: ExtraFields,
}

impl ChatCompletionOptions {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop: None,
            tools: None,
            tool_choice: None,
            response_format: None,
            seed: None,
            user: None,
            extra: ExtraFields::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stop(mut self, stop: impl Into<Stop>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = Some(response_format);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[derive(Serialize)]
struct CompletionPayload<'a> {
    #[serde(flatten)]
    extra: &'a ExtraFields,
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a Stop>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Tool]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

impl<'a> CompletionPayload<'a> {
    fn new(options: &'a ChatCompletionOptions, stream: bool) -> Self {
        Self {
            extra: &options.extra,
            model: &options.model,
            messages: &options.messages,
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            stop: options.stop.as_ref(),
            stream,
            tools: options.tools.as_deref(),
            tool_choice: options.tool_choice.as_ref(),
            response_format: options.response_format.as_ref(),
            seed: options.seed,
            user: options.user.as_deref().filter(|u| !u.is_empty()),
        }
    }
}

/// Chat completions, whole or streamed.
pub struct Chat<'c> {
    client: &'c XenoClient,
}

impl<'c> Chat<'c> {
    pub(crate) fn new(client: &'c XenoClient) -> Self {
        Self { client }
    }

    /// Creates a chat completion and returns it once fully generated.
    pub async fn create(&self, options: ChatCompletionOptions) -> Result<ChatCompletion> {
        let body = to_body(&CompletionPayload::new(&options, false))?;
        self.client
            .request_json(RequestSpec::post(COMPLETIONS_PATH, body))
            .await
    }

    /// Creates a chat completion and streams it as it is generated.
    ///
    /// The request is not retried. An error response is classified before
    /// this returns; afterwards, chunks are read from the network only as
    /// the stream is polled.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use futures_util::StreamExt;
    /// # use xeno::{ChatCompletionOptions, ChatMessage, XenoClient};
    /// # #[tokio::main]
    /// # async fn main() -> xeno::Result<()> {
    /// # let client = XenoClient::new(None)?;
    /// let options = ChatCompletionOptions::new(vec![ChatMessage::user("Tell me a story")]);
    /// let mut stream = client.chat().create_stream(options).await?;
    /// while let Some(chunk) = stream.next().await {
    ///     print!("{}", chunk?.content().unwrap_or_default());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_stream(
        &self,
        options: ChatCompletionOptions,
    ) -> Result<ChatCompletionStream> {
        let body = to_body(&CompletionPayload::new(&options, true))?;
        self.client
            .stream(RequestSpec::post(COMPLETIONS_PATH, body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FunctionDefinition;
    use serde_json::json;

    #[test]
    fn test_payload_defaults() {
        let options = ChatCompletionOptions::new(vec![ChatMessage::user("Hello!")]);
        let body = to_body(&CompletionPayload::new(&options, false)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [{ "role": "user", "content": "Hello!" }]
            })
        );
    }

    #[test]
    fn test_stream_flag() {
        let options = ChatCompletionOptions::new(vec![ChatMessage::user("Hi")]);
        let body = to_body(&CompletionPayload::new(&options, true)).unwrap();
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_payload_optional_fields() {
        let options = ChatCompletionOptions::new(vec![
            ChatMessage::system("Be brief."),
            ChatMessage::tool("call_1", "42"),
        ])
        .with_temperature(0.5)
        .with_max_tokens(256)
        .with_stop("\n")
        .with_tools(vec![Tool::function(FunctionDefinition {
            name: "lookup".to_string(),
            description: None,
            parameters: Some(json!({ "type": "object" })),
        })])
        .with_tool_choice(ToolChoice::function("lookup"))
        .with_response_format(ResponseFormat::json_object())
        .with_seed(7);
        let body = to_body(&CompletionPayload::new(&options, false)).unwrap();

        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["stop"], "\n");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "lookup");
        assert_eq!(
            body["tool_choice"],
            json!({ "type": "function", "function": { "name": "lookup" } })
        );
        assert_eq!(body["response_format"], json!({ "type": "json_object" }));
        assert_eq!(body["seed"], 7);
        assert_eq!(body["messages"][1]["tool_call_id"], "call_1");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_tool_choice_mode() {
        let options = ChatCompletionOptions::new(vec![ChatMessage::user("Hi")])
            .with_tool_choice(ToolChoice::auto());
        let body = to_body(&CompletionPayload::new(&options, false)).unwrap();
        assert_eq!(body["tool_choice"], "auto");
    }
}
