//! Post-processing of raw model output

use std::sync::OnceLock;
use regex::Regex;
use log::trace;

fn fence() -> &'static Regex
{   static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
      Regex::new(r"```(?:\w+)?\s*([\s\S]*?)```")
        .expect("fence pattern compiles")
    })
}

/// Body of the first fenced block in `raw`, trimmed. Without a
/// complete fenced block the input is returned unchanged.
pub fn extract_code(raw: &str) -> String
{   match fence().captures(raw).and_then(|c| c.get(1))
    {   Some(body) => {
          trace!("Fenced block found at {}..{}", body.start(), body.end());
          body.as_str().trim().to_string()
        }
      , None => raw.to_string()
    }
}
