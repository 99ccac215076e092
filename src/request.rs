//! Generation request and result types

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{Error, FailureKind};

/// Copywriting style offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style
{   /// 种草: recommending a product or experience
    Seeding
  , /// 干货: practical tips
    Practical
  , /// 测评: hands-on review
    Review
  , /// 情感: emotional story
    Emotional
  , /// 搞笑: humor
    Funny
  , /// 治愈: comforting, healing tone
    Healing
  , /// 教程: step-by-step tutorial
    Tutorial
}

impl Style
{   pub const ALL: [Style; 7] =
    [   Style::Seeding
      , Style::Practical
      , Style::Review
      , Style::Emotional
      , Style::Funny
      , Style::Healing
      , Style::Tutorial
    ];

    /// Label shown to the user and substituted into the prompt
    pub fn label(&self) -> &'static str
    {   match self
        {   Style::Seeding => "种草"
          , Style::Practical => "干货"
          , Style::Review => "测评"
          , Style::Emotional => "情感"
          , Style::Funny => "搞笑"
          , Style::Healing => "治愈"
          , Style::Tutorial => "教程"
        }
    }
}

/// Requested copy length
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Length
{   Short
  , Medium
  , Long
  , /// Any label outside the fixed set; kept verbatim
    Unrecognized(String)
}

impl Length
{   /// Output-size budget in model tokens
    pub fn max_tokens(&self) -> u32
    {   match self
        {   Length::Short => 300
          , Length::Medium => 500
          , Length::Long => 800
          , Length::Unrecognized(_) => 500
        }
    }

    pub fn label(&self) -> &str
    {   match self
        {   Length::Short => "短（100字内）"
          , Length::Medium => "中（200字）"
          , Length::Long => "长（300字）"
          , Length::Unrecognized(label) => label.as_str()
        }
    }
}

impl From<&str> for Length
{   fn from(s: &str) -> Self
    {   let s = s.trim();
        match s
        {   "短（100字内）" | "短" | "short" | "Short" => Length::Short
          , "中（200字）" | "中" | "medium" | "Medium" => Length::Medium
          , "长（300字）" | "长" | "long" | "Long" => Length::Long
          , other => Length::Unrecognized(other.to_string())
        }
    }
}

/// Content category of the note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category
{   Beauty
  , Food
  , Career
  , Travel
  , Tech
  , Education
  , Health
  , Other
}

impl Category
{   pub const ALL: [Category; 8] =
    [   Category::Beauty
      , Category::Food
      , Category::Career
      , Category::Travel
      , Category::Tech
      , Category::Education
      , Category::Health
      , Category::Other
    ];

    pub fn label(&self) -> &'static str
    {   match self
        {   Category::Beauty => "美妆"
          , Category::Food => "美食"
          , Category::Career => "职场"
          , Category::Travel => "旅行"
          , Category::Tech => "数码"
          , Category::Education => "教育"
          , Category::Health => "健康"
          , Category::Other => "其他"
        }
    }
}

impl FromStr for Style
{   type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   let s = s.trim();
        Style::ALL.iter()
          .copied()
          .find(|style| {
            style.label() == s
              || format!("{:?}", style).eq_ignore_ascii_case(s)
          })
          .ok_or_else(|| {
            Error::InvalidInput(format!("unknown style: {}", s))
          })
    }
}

impl FromStr for Category
{   type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   let s = s.trim();
        Category::ALL.iter()
          .copied()
          .find(|category| {
            category.label() == s
              || format!("{:?}", category).eq_ignore_ascii_case(s)
          })
          .ok_or_else(|| {
            Error::InvalidInput(format!("unknown category: {}", s))
          })
    }
}

impl fmt::Display for Style
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.label())
    }
}

impl fmt::Display for Length
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.label())
    }
}

impl fmt::Display for Category
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.label())
    }
}

/// Opaque API credential; never printed
pub struct Credential(SecretString);

impl Credential
{   pub fn new(key: impl Into<String>) -> Self
    {   Credential(SecretString::new(key.into().into_boxed_str()))
    }

    pub(crate) fn expose(&self) -> &str
    {   self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool
    {   self.expose().trim().is_empty()
    }
}

impl fmt::Debug for Credential
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str("Credential([REDACTED])")
    }
}

impl From<String> for Credential
{   fn from(key: String) -> Self
    {   Credential::new(key)
    }
}

/// Creative parameters plus the credential for one generation
#[derive(Debug)]
pub struct GenerationRequest
{   pub theme: String
  , pub style: Style
  , pub length: Length
  , pub category: Category
  , pub credential: Credential
}

impl GenerationRequest
{   pub fn new(
      theme: impl Into<String>
    , style: Style
    , length: Length
    , category: Category
    , credential: impl Into<String>
    ) -> Self
    {   GenerationRequest
        {   theme: theme.into()
          , style
          , length
          , category
          , credential: Credential::new(credential)
        }
    }

    /// Pre-dispatch guard: theme and credential must be present
    pub fn validate(&self) -> Result<(), Error>
    {   if self.theme.trim().is_empty()
        {   return Err(Error::InvalidInput(
              "theme must not be empty".to_string()
            ));
        }
        if self.credential.is_empty()
        {   return Err(Error::MissingApiKey);
        }
        Ok(())
    }
}

/// Classified failure, ready to show to an operator verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure
{   pub kind: FailureKind
  , pub message: String
  , /// Diagnostic trace; always present for unexpected errors
    pub trace: Option<String>
}

impl From<Error> for Failure
{   fn from(err: Error) -> Self
    {   Failure
        {   kind: err.kind()
          , message: err.to_string()
          , trace: err.trace()
        }
    }
}

impl fmt::Display for Failure
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of a single generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult
{   Success
    {   text: String
    }
  , Failure(Failure)
}

impl GenerationResult
{   pub fn is_success(&self) -> bool
    {   matches!(self, GenerationResult::Success { .. })
    }

    pub fn text(&self) -> Option<&str>
    {   match self
        {   GenerationResult::Success { text } => Some(text)
          , GenerationResult::Failure(_) => None
        }
    }

    pub fn failure(&self) -> Option<&Failure>
    {   match self
        {   GenerationResult::Failure(failure) => Some(failure)
          , GenerationResult::Success { .. } => None
        }
    }
}

impl From<Result<String, Error>> for GenerationResult
{   fn from(result: Result<String, Error>) -> Self
    {   match result
        {   Ok(text) => GenerationResult::Success { text }
          , Err(err) => GenerationResult::Failure(err.into())
        }
    }
}
