//! Caller-owned session history of generated notes
//!
//! The generator never reads or writes this; callers thread a `History`
//! value through their own state and drop it when the session ends.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::request::{Category, GenerationRequest, Style};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One successful generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry
{   pub timestamp: DateTime<Local>
  , pub theme: String
  , pub style: Style
  , pub category: Category
  , pub text: String
}

impl HistoryEntry
{   /// Stamp a successful result with the current local time
    pub fn from_success(
      request: &GenerationRequest
    , text: impl Into<String>
    ) -> Self
    {   HistoryEntry::at(Local::now(), request, text)
    }

    pub fn at(
      timestamp: DateTime<Local>
    , request: &GenerationRequest
    , text: impl Into<String>
    ) -> Self
    {   HistoryEntry
        {   timestamp
          , theme: request.theme.clone()
          , style: request.style
          , category: request.category
          , text: text.into()
        }
    }

    pub fn formatted_time(&self) -> String
    {   self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Header line for a history listing
    pub fn title(&self) -> String
    {   format!(
          "{} - {} ({}风格)",
          self.formatted_time(),
          self.theme,
          self.style.label()
        )
    }

    /// File name for a plain-text export of this entry
    ///
    /// Always a single path component; characters that are not allowed
    /// in file names become `_`.
    pub fn export_file_name(&self) -> String
    {   format!(
          "小红书文案_{}_{}.txt",
          sanitize_file_component(&self.theme),
          self.formatted_time().replace(':', "-")
        )
    }
}

fn sanitize_file_component(raw: &str) -> String
{   raw.chars()
      .map(|c| match c
      {   '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_'
        , c if c.is_control() => '_'
        , c => c
      })
      .collect()
}

/// Ordered history, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct History
{   entries: Vec<HistoryEntry>
}

impl History
{   pub fn new() -> Self
    {   History::default()
    }

    /// Append an entry and hand the history back
    pub fn record(mut self, entry: HistoryEntry) -> Self
    {   self.entries.push(entry);
        self
    }

    /// Drop every entry
    pub fn cleared(mut self) -> Self
    {   self.entries.clear();
        self
    }

    pub fn entries(&self) -> &[HistoryEntry]
    {   &self.entries
    }

    /// Display order: most recent first
    pub fn newest_first(&self)
      -> impl Iterator<Item = &HistoryEntry>
    {   self.entries.iter().rev()
    }

    pub fn len(&self) -> usize
    {   self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.entries.is_empty()
    }
}
