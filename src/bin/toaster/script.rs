use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use toaster::Result;
use toaster::config::HumantimeDuration;
use toaster::error::Error as ToastError;
use toaster::toast::Extra;
use toaster::types::{Position, Variant};
use toaster::{ToastAction, ToastSpec, ToastUpdate};

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Notify(NotifyStep),
    Update(UpdateStep),
    Dismiss(KeyStep),
    DismissAll,
    Pause(KeyStep),
    Resume(KeyStep),
    Sleep(SleepStep),
    Render,
}

/// `key` names the toast for later steps of the same script.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotifyStep {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action: Option<ToastAction>,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateStep {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action: Option<ToastAction>,
    #[serde(default)]
    pub variant: Option<Variant>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyStep {
    pub key: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SleepStep {
    #[serde(rename = "for")]
    #[serde_as(as = "HumantimeDuration")]
    pub duration: Duration,
}

impl NotifyStep {
    pub fn to_spec(&self) -> ToastSpec {
        ToastSpec {
            title: self.title.clone(),
            description: self.description.clone(),
            action: self.action.clone(),
            variant: self.variant,
            duration: self.duration,
            position: self.position,
            extra: self.extra.clone(),
        }
    }
}

impl UpdateStep {
    pub fn to_update(&self) -> ToastUpdate {
        ToastUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            action: self.action.clone(),
            variant: self.variant,
            position: self.position,
            extra: self.extra.clone(),
        }
    }
}

/// Steps paired with their 1-based line number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    steps: Vec<(usize, Step)>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ToastError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let step = serde_json::from_str::<Step>(line).map_err(|err| ToastError::Script {
                line: index + 1,
                message: err.to_string(),
            })?;
            steps.push((index + 1, step));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[(usize, Step)] {
        &self.steps
    }
}
