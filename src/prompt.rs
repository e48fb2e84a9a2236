//! Prompt construction for chat, generate and explain requests

/// Extension -> display name of the languages we know by name
const LANGUAGES: &[(&str, &str)] = &[
    ("js", "JavaScript")
  , ("ts", "TypeScript")
  , ("py", "Python")
  , ("java", "Java")
  , ("c", "C")
  , ("cpp", "C++")
  , ("cs", "C#")
  , ("go", "Go")
  , ("rb", "Ruby")
  , ("php", "PHP")
  , ("html", "HTML")
  , ("css", "CSS")
  , ("json", "JSON")
  , ("md", "Markdown")
  , ("sh", "Shell")
  , ("rs", "Rust")
  , ("swift", "Swift")
  , ("kt", "Kotlin")
  , ("dart", "Dart")
];

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent
{   /// Chat input, sent as typed
    FreeformChat(String)
  , /// Instruction for new code in `language`
    GenerateCode
    {   instruction: String
      , language: String
    }
  , /// Selected source to explain
    ExplainCode
    {   source: String
      , language: String
    }
}

/// Display name for a file extension. Unknown extensions come back
/// as-is, an empty one as "code".
pub fn resolve_language_name(ext: &str) -> String
{   LANGUAGES.iter()
      .find(|(e, _)| *e == ext)
      .map(|(_, name)| name.to_string())
      .unwrap_or_else(|| {
        if ext.is_empty() { "code".to_string() } else { ext.to_string() }
      })
}

/// Language name for a file, taken from whatever follows its last dot
pub fn language_for_file(file_name: &str) -> String
{   let ext = file_name.rsplit('.').next().unwrap_or("");
    resolve_language_name(ext)
}

/// Assemble the exact prompt text for an intent
pub fn build_prompt(intent: &Intent) -> String
{   match intent
    {   Intent::FreeformChat(text) => text.clone()
      , Intent::GenerateCode { instruction, language } => {
          format!(
            "Generate code in {} for: {}\n        Only provide the code, no explanations.",
            language, instruction
          )
        }
      , Intent::ExplainCode { source, language } => {
          format!(
            "Explain the following {lang} code in detail, including what it does, any important patterns or techniques used, and potential improvements:\n      \n      ```{lang}\n      {source}\n      ```\n      \n      Provide a clear and concise explanation that would help someone understand this code.",
            lang = language,
            source = source
          )
        }
    }
}

/// What the chat shows as the user's side of an explain request
pub fn explain_echo(source: &str, language: &str) -> String
{   format!(
      "Explain this {lang} code:\n```{lang}\n{source}\n```",
      lang = language,
      source = source
    )
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn every_table_entry_resolves()
    {   for (ext, name) in LANGUAGES
        {   assert_eq!(resolve_language_name(ext), *name);
        }
        assert_eq!(resolve_language_name("cpp"), "C++");
        assert_eq!(resolve_language_name("cs"), "C#");
    }

    #[test]
    fn unmapped_and_empty_extensions()
    {   assert_eq!(resolve_language_name("zig"), "zig");
        assert_eq!(resolve_language_name(""), "code");
    }

    #[test]
    fn language_from_file_name()
    {   assert_eq!(language_for_file("src/main.rs"), "Rust");
        assert_eq!(language_for_file("archive.tar.py"), "Python");
        assert_eq!(language_for_file("notes."), "code");
        // no dot: the whole name is taken as the extension
        assert_eq!(language_for_file("Makefile"), "Makefile");
    }

    #[test]
    fn generate_template_is_exact()
    {   let p = build_prompt(&Intent::GenerateCode
        {   instruction: "sort an array".to_string()
          , language: "TypeScript".to_string()
        });
        assert_eq!(
          p,
          "Generate code in TypeScript for: sort an array\n        Only provide the code, no explanations."
        );
    }

    #[test]
    fn explain_template_embeds_source()
    {   let p = build_prompt(&Intent::ExplainCode
        {   source: "fn main() {}".to_string()
          , language: "Rust".to_string()
        });
        assert!(p.starts_with("Explain the following Rust code in detail"));
        assert!(p.contains("      ```Rust\n      fn main() {}\n      ```\n"));
        assert!(p.ends_with("help someone understand this code."));
    }

    #[test]
    fn chat_passes_through()
    {   let text = "  what is a monad?\n".to_string();
        assert_eq!(build_prompt(&Intent::FreeformChat(text.clone())), text);
    }

    #[test]
    fn explain_echo_fences_the_source()
    {   assert_eq!(
          explain_echo("x = 1", "Python"),
          "Explain this Python code:\n```Python\nx = 1\n```"
        );
    }
}
