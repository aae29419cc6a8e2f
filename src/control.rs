//! Line protocol for driving galleries from outside, one JSON object per line:
//!
//! ```text
//! {"gallery":"hero","command":"next"}
//! {"gallery":"hero","command":"select-thumb","index":3}
//! {"gallery":"hero","command":"open","index":2,"direction":"previous"}
//! ```
//!
//! Control-named commands (`next`, `previous`, `close`, `next-page`, `previous-page`,
//! `select-thumb`) are treated as user interactions; the rest are programmatic calls.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::events::{Control, Direction, DisplayId, GalleryCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum RequestDirection {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
enum RequestCommand {
    Next,
    Previous,
    Close,
    NextPage,
    PreviousPage,
    SelectThumb {
        index: usize,
    },
    Open {
        index: usize,
        #[serde(default = "RequestCommand::default_direction")]
        direction: RequestDirection,
    },
    Reset,
    SetSize {
        size: i64,
    },
    StartAutoRotate,
    ClearAutoRotate,
}

impl RequestCommand {
    const fn default_direction() -> RequestDirection {
        RequestDirection::Next
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ControlRequest {
    gallery: String,
    #[serde(flatten)]
    command: RequestCommand,
}

impl From<RequestCommand> for GalleryCommand {
    fn from(value: RequestCommand) -> Self {
        match value {
            RequestCommand::Next => Self::Interact(Control::Next),
            RequestCommand::Previous => Self::Interact(Control::Previous),
            RequestCommand::Close => Self::Interact(Control::Close),
            RequestCommand::NextPage => Self::Interact(Control::NextPage),
            RequestCommand::PreviousPage => Self::Interact(Control::PreviousPage),
            RequestCommand::SelectThumb { index } => Self::Interact(Control::SelectThumb(index)),
            RequestCommand::Open { index, direction } => Self::Open {
                index,
                direction: match direction {
                    RequestDirection::Next => Direction::Next,
                    RequestDirection::Previous => Direction::Previous,
                },
            },
            RequestCommand::Reset => Self::Reset,
            RequestCommand::SetSize { size } => Self::SetSetSize(size),
            RequestCommand::StartAutoRotate => Self::StartAutoRotate,
            RequestCommand::ClearAutoRotate => Self::ClearAutoRotate,
        }
    }
}

/// Parse one request line into its target display and command.
pub fn parse_line(line: &str) -> Result<(DisplayId, GalleryCommand)> {
    let request: ControlRequest = serde_json::from_str(line.trim())
        .with_context(|| format!("invalid control request: {}", line.trim()))?;
    Ok((DisplayId::new(request.gallery), request.command.into()))
}
