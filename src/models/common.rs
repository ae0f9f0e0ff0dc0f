use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub description: String,
}

/// Which kind of request a submit produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Produce an image from text alone.
    Generate,
    /// Transform a user-supplied image using a text instruction.
    Edit,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Generate => "GENERATE",
            Mode::Edit => "EDIT",
        }
    }

    /// Label shown while a request of this mode is in flight.
    pub fn progress_label(&self) -> &'static str {
        match self {
            Mode::Generate => "GENERATING...",
            Mode::Edit => "EDITING...",
        }
    }

    pub fn prompt_placeholder(&self) -> &'static str {
        match self {
            Mode::Generate => "Describe an image...",
            Mode::Edit => "How should we edit this?",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
