//! Host-triggered entry points: open chat, generate code, explain code

use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::config::ConfigSource;
use crate::error::Error;
use crate::extract::extract_code;
use crate::prompt::{build_prompt, language_for_file, Intent};
use crate::providers::ModelClient;
use crate::registry::{Opened, SurfaceId, SurfaceRegistry};
use crate::relay::{ExplainReply, SurfaceHandle};

/// The active editor, as far as the commands care
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContext
{   /// Path or name of the open document
    pub file_name: String
  , /// Selected text, empty when nothing is selected
    pub selection: String
}

impl EditorContext
{   pub fn language(&self) -> String
    {   language_for_file(&self.file_name)
    }
}

fn no_editor() -> Error
{   Error::InputMissing("No active editor".to_string())
}

/// Open the chat panel, or bring the existing one forward
pub fn open_chat(registry: &mut SurfaceRegistry)
  -> (SurfaceHandle, Opened)
{   registry.open_or_reveal(SurfaceId::Panel)
}

/// Generate code for `instruction` in the editor's language and return
/// the text to insert at the cursor. `instruction` is `None` when the
/// user dismissed the input box.
pub async fn generate_code(
  client: &dyn ModelClient
, config: &dyn ConfigSource
, editor: Option<&EditorContext>
, instruction: Option<&str>
) -> Result<String, Error>
{   let editor = editor.ok_or_else(no_editor)?;
    let instruction = match instruction
    {   Some(text) if !text.trim().is_empty() => text
      , _ => {
          debug!("Generate cancelled, no instruction");
          return Err(Error::InputMissing(String::new()));
        }
    };

    let language = editor.language();
    info!("Generating {} code", language);
    let prompt = build_prompt(&Intent::GenerateCode
    {   instruction: instruction.to_string()
      , language
    });

    let snapshot = config.current()?;
    let raw = client.query(&prompt, &snapshot).await
      .map_err(|e| {
        error!("Code generation failed: {}", e);
        Error::from(e)
      })?;
    Ok(extract_code(&raw))
}

/// Explanation in flight. Owns only the reply channel, so the
/// registry is free again as soon as `explain_code` returns.
#[derive(Debug)]
pub struct PendingExplanation
{   reply_rx: mpsc::UnboundedReceiver<ExplainReply>
}

impl PendingExplanation
{   /// Wait for the relay to settle the request
    pub async fn wait(mut self) -> Result<String, Error>
    {   self.reply_rx.recv().await.ok_or(Error::Disconnected)?
    }
}

/// Send the editor selection to the chat panel (opening it if needed).
/// The registry is only borrowed while the request is dispatched.
pub fn explain_code(
  registry: &mut SurfaceRegistry
, editor: Option<&EditorContext>
) -> Result<PendingExplanation, Error>
{   let editor = editor.ok_or_else(no_editor)?;
    if editor.selection.trim().is_empty()
    {   return Err(Error::InputMissing("No code selected".to_string()));
    }

    let language = editor.language();
    let (panel, _) = registry.open_or_reveal(SurfaceId::Panel);
    let reply_rx = panel.explain(editor.selection.clone(), language)?;
    Ok(PendingExplanation { reply_rx })
}

/// Notification text for a failed generate command
pub fn generate_failure_notice(e: &Error) -> String
{   format!("Code generation failed: {}", e)
}

/// Notification text for a failed explain command
pub fn explain_failure_notice(e: &Error) -> String
{   format!("Code explanation failed: {}", e)
}
