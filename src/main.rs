//! Terminal front-end: a chat surface on stdin/stdout plus the
//! generate and explain commands.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use log::{debug, error};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use lassist::commands::{self, EditorContext};
use lassist::registry::AttachFn;
use lassist::{
  ConfigSource, DisplayMessage, Error, OllamaClient, Role,
  SettingsFile, SurfaceId, SurfaceRegistry,
};

#[derive(Parser)]
#[command(name = "lassist", about = "Local coding assistant")]
struct Cli
{   /// Settings file (JSON: modelEndpoint, modelName, maxTokens)
    #[arg(long, default_value = "lassist.json")]
    settings: PathBuf
  , #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
enum Command
{   /// Chat with the model, one message per line
    Chat
  , /// Generate code in the language of FILE and print it
    Generate
    {   #[arg(long)]
        file: String
      , /// What to generate
        instruction: Vec<String>
    }
  , /// Explain code from FILE
    Explain
    {   #[arg(long)]
        file: PathBuf
      , /// Text to explain instead of the whole file
        #[arg(long)]
        selection: Option<String>
    }
}

fn render(msg: DisplayMessage)
{   match msg.as_chat()
    {   None => println!("... thinking")
      , Some(chat) => {
          let who = match chat.role
          {   Role::User => "you"
            , Role::Assistant => "assistant"
            , Role::System => "system"
          };
          println!("[{}] {}", who, chat.content);
        }
    }
}

/// Printer tasks for every surface the registry creates
fn printers() -> (AttachFn, Arc<Mutex<Vec<JoinHandle<()>>>>)
{   let tasks: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::default();
    let registered = tasks.clone();
    let attach: AttachFn = Box::new(
      move |id: SurfaceId, mut rx: mpsc::UnboundedReceiver<DisplayMessage>| {
        debug!("Attaching terminal to {:?}", id);
        let task = tokio::spawn(async move {
          while let Some(msg) = rx.recv().await
          {   render(msg);
          }
        });
        if let Ok(mut tasks) = registered.lock()
        {   tasks.push(task);
        }
      }
    );
    (attach, tasks)
}

async fn drain(
  registry: &mut SurfaceRegistry
, tasks: Arc<Mutex<Vec<JoinHandle<()>>>>
)
{   registry.close(SurfaceId::Panel);
    let pending: Vec<_> = match tasks.lock()
    {   Ok(mut tasks) => tasks.drain(..).collect()
      , Err(_) => vec![]
    };
    for task in pending
    {   let _ = task.await;
    }
}

async fn run_chat(mut registry: SurfaceRegistry
, tasks: Arc<Mutex<Vec<JoinHandle<()>>>>
) -> Result<(), Error>
{   let (panel, _) = commands::open_chat(&mut registry);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut read_error = None;
    loop
    {   match lines.next_line().await
        {   Ok(Some(line)) => panel.user_message(line)?
          , Ok(None) => break
          , Err(e) => {
              error!("Reading stdin failed: {}", e);
              read_error = Some(format!("Cannot read input: {}", e));
              break;
            }
        }
    }

    // let the last answer land before leaving
    panel.idle().await?;
    drain(&mut registry, tasks).await;
    if let Some(msg) = read_error
    {   return Err(Error::InputMissing(msg));
    }
    Ok(())
}

fn report(e: &Error, notice: impl Fn(&Error) -> String) -> ExitCode
{   match e
    {   Error::InputMissing(_) => {
          if let Some(text) = e.notice()
          {   eprintln!("{}", text);
          }
        }
      , _ => eprintln!("{}", notice(e))
    }
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();
    let cli = Cli::parse();

    let config: Arc<dyn ConfigSource>
      = Arc::new(SettingsFile::new(cli.settings));
    let client = Arc::new(OllamaClient::new());

    match cli.command
    {   Command::Chat => {
          let (attach, tasks) = printers();
          let registry = SurfaceRegistry::new(client, config, attach);
          match run_chat(registry, tasks).await
          {   Ok(()) => ExitCode::SUCCESS
            , Err(e) => {
                error!("Chat ended: {}", e);
                eprintln!("{}", e);
                ExitCode::FAILURE
              }
          }
        }
      , Command::Generate { file, instruction } => {
          let editor = EditorContext
          {   file_name: file
            , selection: String::new()
          };
          let instruction = instruction.join(" ");
          let instruction
            = (!instruction.is_empty()).then_some(instruction.as_str());
          match commands::generate_code(
            &*client, &*config, Some(&editor), instruction
          ).await
          {   Ok(code) => {
                println!("{}", code);
                ExitCode::SUCCESS
              }
            , Err(e) => report(&e, commands::generate_failure_notice)
          }
        }
      , Command::Explain { file, selection } => {
          let selection = match selection
          {   Some(text) => text
            , None => match tokio::fs::read_to_string(&file).await
              {   Ok(text) => text
                , Err(e) => {
                    eprintln!("Cannot read {}: {}", file.display(), e);
                    return ExitCode::FAILURE;
                  }
              }
          };
          let editor = EditorContext
          {   file_name: file.display().to_string()
            , selection
          };
          let (attach, tasks) = printers();
          let mut registry = SurfaceRegistry::new(client, config, attach);
          let outcome
            = match commands::explain_code(&mut registry, Some(&editor))
            {   Ok(pending) => pending.wait().await
              , Err(e) => Err(e)
            };
          drain(&mut registry, tasks).await;
          match outcome
          {   Ok(_) => ExitCode::SUCCESS
            , Err(e) => report(&e, commands::explain_failure_notice)
          }
        }
    }
}
