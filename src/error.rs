use std::fmt;

/// Failure of a single model query.
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError
{   /// No response was received (connection refused, DNS, reset...)
    Transport(String)
  , /// Endpoint answered with a non-2xx status; body kept verbatim
    ApiError(u16, String)
  , /// 2xx answer without a `response` field
    MalformedResponse
}

impl fmt::Display for QueryError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   QueryError::Transport(msg) => {
              write!(f, "Transport error: {}", msg)
            }
          , QueryError::ApiError(status, body) => {
              write!(f, "API Error ({}): {}", status, body)
            }
          , QueryError::MalformedResponse => {
              write!(f, "No response data from model")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Custom error type for lassist operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Required user input is absent; carries the notice to show,
    /// empty when the user cancelled and nothing should be shown
    InputMissing(String)
  , /// Model query failed
    Query(QueryError)
  , /// Surface is still waiting on an earlier prompt
    Busy
  , /// Relay task for a surface is gone
    Disconnected
  , /// Invalid configuration
    InvalidConfiguration(String)
}

impl Error
{   /// Notice for the user, if this error warrants one
    pub fn notice(&self) -> Option<&str>
    {   match self
        {   Error::InputMissing(msg) if msg.is_empty() => None
          , Error::InputMissing(msg) => Some(msg.as_str())
          , _ => None
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InputMissing(msg) if msg.is_empty() => {
              write!(f, "Input cancelled")
            }
          , Error::InputMissing(msg) => {
              write!(f, "{}", msg)
            }
          , Error::Query(e) => {
              write!(f, "{}", e)
            }
          , Error::Busy => {
              write!(f,
                "Still waiting for the previous response, try again when it arrives"
              )
            }
          , Error::Disconnected => {
              write!(f, "Chat surface disconnected")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error
{   fn source(&self) -> Option<&(dyn std::error::Error + 'static)>
    {   match self
        {   Error::Query(e) => Some(e)
          , _ => None
        }
    }
}

impl From<QueryError> for Error
{   fn from(e: QueryError) -> Self
    {   Error::Query(e)
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn api_error_keeps_status_and_body()
    {   let e = QueryError::ApiError(500, r#"{"error":"oom"}"#.to_string());
        assert_eq!(e.to_string(), r#"API Error (500): {"error":"oom"}"#);
    }

    #[test]
    fn cancelled_input_has_no_notice()
    {   assert_eq!(Error::InputMissing(String::new()).notice(), None);
        assert_eq!(
          Error::InputMissing("No code selected".to_string()).notice(),
          Some("No code selected")
        );
        assert_eq!(
          Error::from(QueryError::MalformedResponse).notice(),
          None
        );
    }
}
