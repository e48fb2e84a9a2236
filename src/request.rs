//! Wire types for the generate call and the display protocol

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest
{   pub model: String
  , pub prompt: String
  , /// Always false; the whole answer comes back in one body
    pub stream: bool
  , pub max_tokens: u32
}

impl GenerateRequest
{   pub fn new(prompt: &str, config: &crate::config::Configuration)
      -> Self
    {   GenerateRequest
        {   model: config.model_name.clone()
          , prompt: prompt.to_string()
          , stream: false
          , max_tokens: config.max_tokens
        }
    }
}

/// Successful generate body. Other fields the server sends
/// (timings, context) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse
{   pub response: String
}

/// Who a chat message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   User
  , Assistant
  , System
}

/// A rendered chat line; held only by the display side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

/// Core -> UI messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DisplayMessage
{   AddUserMessage { content: String }
  , AddAssistantMessage { content: String }
  , AddSystemMessage { content: String }
  , AddLoadingIndicator
}

impl DisplayMessage
{   /// The chat line this message renders as, if any
    pub fn as_chat(&self) -> Option<ChatMessage>
    {   let (role, content) = match self
        {   DisplayMessage::AddUserMessage { content } => {
              (Role::User, content)
            }
          , DisplayMessage::AddAssistantMessage { content } => {
              (Role::Assistant, content)
            }
          , DisplayMessage::AddSystemMessage { content } => {
              (Role::System, content)
            }
          , DisplayMessage::AddLoadingIndicator => return None
        };
        Some(ChatMessage { role, content: content.clone() })
    }
}

/// UI -> core messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiMessage
{   UserMessage { content: String }
}

#[cfg(test)]
mod tests
{   use super::*;
    use serde_json::json;

    #[test]
    fn generate_request_body_shape()
    {   let config = crate::config::Configuration::default();
        let body = serde_json::to_value(
          GenerateRequest::new("hi", &config)
        ).unwrap();
        assert_eq!(body, json!({
          "model": config.model_name,
          "prompt": "hi",
          "stream": false,
          "max_tokens": config.max_tokens
        }));
    }

    #[test]
    fn display_messages_use_host_tags()
    {   let v = serde_json::to_value(DisplayMessage::AddAssistantMessage {
          content: "ok".to_string()
        }).unwrap();
        assert_eq!(v, json!({"type": "addAssistantMessage", "content": "ok"}));

        let v = serde_json::to_value(DisplayMessage::AddLoadingIndicator)
          .unwrap();
        assert_eq!(v, json!({"type": "addLoadingIndicator"}));
    }

    #[test]
    fn ui_message_decodes()
    {   let m: UiMessage = serde_json::from_str(
          r#"{"type":"userMessage","content":"hello"}"#
        ).unwrap();
        assert_eq!(m, UiMessage::UserMessage { content: "hello".to_string() });
    }

    #[test]
    fn loading_indicator_is_not_a_chat_line()
    {   assert!(DisplayMessage::AddLoadingIndicator.as_chat().is_none());
        let chat = DisplayMessage::AddSystemMessage {
          content: "Error: x".to_string()
        }.as_chat().unwrap();
        assert_eq!(chat.role, Role::System);
    }
}
