//! Conversation relay: one actor per chat surface.
//!
//! The actor owns the surface's state. Commands arrive on an unbounded
//! channel, query completions come back on a second one, and
//! `tokio::select!` only routes; the model call itself runs in its own
//! task so the loop never waits on the network.

use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, trace, error, info};

use crate::config::ConfigSource;
use crate::error::Error;
use crate::prompt::{build_prompt, explain_echo, Intent};
use crate::providers::ModelClient;
use crate::request::{DisplayMessage, UiMessage};

pub type ExplainReply = Result<String, Error>;
pub type ExplainReplySender = mpsc::UnboundedSender<ExplainReply>;

/// Where a surface is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState
{   Idle
  , AwaitingResponse
}

/// Commands accepted by a relay actor
pub enum SurfaceCommand
{   /// Message posted by the display surface
    Ui(UiMessage)
  , /// Explain request from the host; echoed into the chat
    Explain
    {   source: String
      , language: String
      , reply: ExplainReplySender
    }
  , /// Report the current state
    State
    {   reply: mpsc::UnboundedSender<RelayState>
    }
  , /// Signal once no prompt is in flight
    WhenIdle
    {   reply: mpsc::UnboundedSender<()>
    }
  , Shutdown
}

/// Outcome of offering a prompt to a [`Conversation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission
{   /// Blank input, nothing happens
    Ignored
  , /// A prompt is already in flight
    Rejected
  , /// Show the loading indicator and send the prompt
    Started
}

/// Per-surface state machine, kept apart from the actor so the
/// transitions can be driven directly.
#[derive(Debug)]
pub struct Conversation
{   state: RelayState
}

impl Default for Conversation
{   fn default() -> Self
    {   Conversation { state: RelayState::Idle }
    }
}

impl Conversation
{   pub fn state(&self) -> RelayState
    {   self.state
    }

    /// Offer a prompt. Only an idle conversation with non-blank text
    /// moves to `AwaitingResponse`.
    pub fn submit(&mut self, text: &str) -> Submission
    {   if text.trim().is_empty()
        {   return Submission::Ignored;
        }
        match self.state
        {   RelayState::AwaitingResponse => Submission::Rejected
          , RelayState::Idle => {
              self.state = RelayState::AwaitingResponse;
              Submission::Started
            }
        }
    }

    /// Settle the in-flight prompt and produce what the surface shows
    pub fn finish(&mut self, result: &Result<String, Error>)
      -> DisplayMessage
    {   self.state = RelayState::Idle;
        match result
        {   Ok(text) => DisplayMessage::AddAssistantMessage {
              content: text.clone()
            }
          , Err(e) => DisplayMessage::AddSystemMessage {
              content: format!("Error: {}", e)
            }
        }
    }
}

struct Completion
{   result: Result<String, Error>
  , reply: Option<ExplainReplySender>
}

/// Cloneable sender side of a relay actor
#[derive(Clone)]
pub struct SurfaceHandle
{   tx: mpsc::UnboundedSender<SurfaceCommand>
}

/// A running relay: its handle plus the task it owns
pub struct Surface
{   handle: SurfaceHandle
  , _task: tokio::task::JoinHandle<()>
}

impl Surface
{   /// Spawn a relay. Returns immediately; display messages arrive on
    /// the returned receiver.
    pub fn spawn(
      client: Arc<dyn ModelClient>
    , config: Arc<dyn ConfigSource>
    ) -> (Self, mpsc::UnboundedReceiver<DisplayMessage>)
    {   debug!("Spawning chat surface relay");
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (display_tx, display_rx) = mpsc::unbounded_channel();

        let _task = tokio::spawn(async move {
          run_relay_loop(cmd_rx, display_tx, client, config).await
        });

        let surface = Surface
        {   handle: SurfaceHandle { tx: cmd_tx }
          , _task
        };
        (surface, display_rx)
    }

    pub fn handle(&self) -> SurfaceHandle
    {   self.handle.clone()
    }
}

impl SurfaceHandle
{   fn send(&self, cmd: SurfaceCommand) -> Result<(), Error>
    {   self.tx.send(cmd).map_err(|_| {
          error!("Relay channel closed");
          Error::Disconnected
        })
    }

    /// Forward a message from the display surface
    pub fn post(&self, msg: UiMessage) -> Result<(), Error>
    {   trace!("Posting {:?}", msg);
        self.send(SurfaceCommand::Ui(msg))
    }

    /// Shorthand for posting a `userMessage`
    pub fn user_message(&self, content: impl Into<String>)
      -> Result<(), Error>
    {   self.post(UiMessage::UserMessage { content: content.into() })
    }

    /// Queue an explain request - returns immediately
    pub fn explain(
      &self
    , source: String
    , language: String
    ) -> Result<mpsc::UnboundedReceiver<ExplainReply>, Error>
    {   debug!("explain queued for {} source", language);
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        self.send(SurfaceCommand::Explain
        {   source
          , language
          , reply: reply_tx
        })?;
        Ok(reply_rx)
    }

    /// Current state, after every command sent before this one
    pub async fn state(&self) -> Result<RelayState, Error>
    {   let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        self.send(SurfaceCommand::State { reply: reply_tx })?;
        reply_rx.recv().await.ok_or(Error::Disconnected)
    }

    /// Resolves once the surface has no prompt in flight
    pub async fn idle(&self) -> Result<(), Error>
    {   let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        self.send(SurfaceCommand::WhenIdle { reply: reply_tx })?;
        reply_rx.recv().await.ok_or(Error::Disconnected)
    }

    /// Stop the relay. In-flight queries still finish; their result
    /// is dropped.
    pub fn shutdown(&self) -> Result<(), Error>
    {   debug!("Shutting down chat surface relay");
        self.send(SurfaceCommand::Shutdown)
    }

    /// Whether the relay task is still accepting commands
    pub fn is_alive(&self) -> bool
    {   !self.tx.is_closed()
    }
}

fn emit(
  display_tx: &mpsc::UnboundedSender<DisplayMessage>
, msg: DisplayMessage
)
{   trace!("Display <- {:?}", msg);
    if display_tx.send(msg).is_err()
    {   debug!("Display surface gone, message dropped");
    }
}

fn settle(reply: &Option<ExplainReplySender>, err: Error)
{   if let Some(reply) = reply
    {   let _ = reply.send(Err(err));
    }
}

/// Transition and launch the query for one prompt
fn start_query(
  conversation: &mut Conversation
, intent: Intent
, reply: Option<ExplainReplySender>
, display_tx: &mpsc::UnboundedSender<DisplayMessage>
, done_tx: &mpsc::UnboundedSender<Completion>
, client: &Arc<dyn ModelClient>
, config: &Arc<dyn ConfigSource>
)
{   let prompt = build_prompt(&intent);

    match conversation.submit(&prompt)
    {   Submission::Ignored => {
          debug!("Blank prompt ignored");
          settle(&reply, Error::InputMissing(String::new()));
        }
      , Submission::Rejected => {
          info!("Prompt rejected, response still pending");
          emit(display_tx, DisplayMessage::AddSystemMessage {
            content: Error::Busy.to_string()
          });
          settle(&reply, Error::Busy);
        }
      , Submission::Started => {
          // settings are read fresh for every prompt
          let snapshot = match config.current()
          {   Ok(c) => c
            , Err(e) => {
                error!("Configuration unusable: {}", e);
                emit(display_tx, conversation.finish(&Err(e.clone())));
                settle(&reply, e);
                return;
              }
          };
          emit(display_tx, DisplayMessage::AddLoadingIndicator);
          let client = client.clone();
          let done_tx = done_tx.clone();
          tokio::spawn(async move {
            let result = client.query(&prompt, &snapshot).await
              .map_err(Error::from);
            let _ = done_tx.send(Completion { result, reply });
          });
        }
    }
}

/// Main relay event loop
async fn run_relay_loop(
  mut cmd_rx: mpsc::UnboundedReceiver<SurfaceCommand>
, display_tx: mpsc::UnboundedSender<DisplayMessage>
, client: Arc<dyn ModelClient>
, config: Arc<dyn ConfigSource>
)
{   debug!("Starting relay loop");
    let mut conversation = Conversation::default();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut idle_waiters: Vec<mpsc::UnboundedSender<()>> = Vec::new();

    loop
    { tokio::select!
      { cmd = cmd_rx.recv() => match cmd
        {   Some(SurfaceCommand::Ui(UiMessage::UserMessage { content })) => {
              debug!("Received userMessage ({} bytes)", content.len());
              start_query(
                &mut conversation,
                Intent::FreeformChat(content),
                None,
                &display_tx, &done_tx, &client, &config
              );
            }
          , Some(SurfaceCommand::Explain { source, language, reply }) => {
              debug!("Received Explain for {}", language);
              if source.trim().is_empty()
              {   let _ = reply.send(Err(Error::InputMissing(
                    "No code selected".to_string()
                  )));
              } else
              {   if conversation.state() == RelayState::Idle
                  {   emit(&display_tx, DisplayMessage::AddUserMessage {
                        content: explain_echo(&source, &language)
                      });
                  }
                  start_query(
                    &mut conversation,
                    Intent::ExplainCode { source, language },
                    Some(reply),
                    &display_tx, &done_tx, &client, &config
                  );
              }
            }
          , Some(SurfaceCommand::State { reply }) => {
              let _ = reply.send(conversation.state());
            }
          , Some(SurfaceCommand::WhenIdle { reply }) => {
              if conversation.state() == RelayState::Idle
              {   let _ = reply.send(());
              } else
              {   idle_waiters.push(reply);
              }
            }
          , Some(SurfaceCommand::Shutdown) => {
              info!("Relay shutting down");
              break;
            }
          , None => {
              debug!("Command channel closed");
              break;
            }
        }
      , Some(done) = done_rx.recv() => {
          match &done.result
          {   Ok(text) => debug!("Query finished, {} bytes", text.len())
            , Err(e) => error!("Error querying model: {}", e)
          }
          let msg = conversation.finish(&done.result);
          emit(&display_tx, msg);
          if let Some(reply) = done.reply
          {   let _ = reply.send(done.result);
          }
          for waiter in idle_waiters.drain(..)
          {   let _ = waiter.send(());
          }
        }
      }
    }
}
