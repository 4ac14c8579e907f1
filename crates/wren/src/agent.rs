//! Agent mode: turns a free-text description into a generated multi-file
//! project on disk. One specialized streamed call, then a fence-tag parse
//! of the response, then materialization under the caller's base directory.
//! The conversation transcript is never involved, so a failed invocation
//! cannot corrupt chat-mode state.

use std::io;
use std::path::{Component, Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tokio::fs;

use crate::chat::{ChatEngine, SendOptions};
use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;

pub const AGENT_MAX_OUTPUT_TOKENS: i32 = 8192;
pub const AGENT_TEMPERATURE: f32 = 0.3;
const DEFAULT_FOLDER_NAME: &str = "generated-app";
const RESPONSE_PREVIEW_CHARS: usize = 500;

/// Instructs the model to emit a fenced, structured project layout that
/// [`parse_project`] understands.
pub const AGENT_SYSTEM_PROMPT: &str = r#"You are an expert software engineer who creates complete, working applications from descriptions.

Generate every file needed for the application to run, including dependency manifests, configuration files, and a README with instructions.

Format your response using this EXACT structure:

```STRUCTURE
folder-name/
├── file1.ext
├── file2.ext
└── ...
```

Then for each file:

```file:folder-name/file1.ext
[file content here]
```

Finally, provide shell commands:

```bash
# Setup commands
cd folder-name
# ... install dependencies
```

```bash:run
# Run commands
# ... start the application
```

IMPORTANT:
- Use a meaningful, descriptive kebab-case folder name
- Declare ALL dependencies in the manifest
- Produce complete, working code with error handling
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub folder_name: String,
    pub files: Vec<GeneratedFile>,
    pub setup_commands: Vec<String>,
}

/// Result of one agent invocation. `NoFiles` is a reportable anomaly, not
/// an error: the model ignored the format, nothing touched the filesystem.
#[derive(Debug)]
pub enum AgentOutcome {
    Created {
        project_dir: PathBuf,
        files: Vec<String>,
        commands: Vec<String>,
    },
    NoFiles {
        preview: String,
    },
}

lazy_static! {
    static ref FILE_BLOCK: Regex = Regex::new(r"(?s)```file:([^\n]+)\n(.*?)```").unwrap();
    static ref SHELL_BLOCK: Regex = Regex::new(r"(?s)```bash(?::run)?\n(.*?)```").unwrap();
    static ref STRUCTURE_BLOCK: Regex = Regex::new(r"(?s)```STRUCTURE\n(.*?)```").unwrap();
    static ref FOLDER_SEGMENT: Regex = Regex::new(r"([^\s/]+)/").unwrap();
}

/// Every `file:`-tagged fenced block, in response order. The trimmed block
/// body is the file content.
pub fn parse_files(response: &str) -> Vec<GeneratedFile> {
    FILE_BLOCK
        .captures_iter(response)
        .map(|caps| GeneratedFile {
            path: caps[1].trim().to_string(),
            content: caps[2].trim().to_string(),
        })
        .collect()
}

/// Surviving lines of every `bash` / `bash:run` block, in order, with
/// blanks and `#` comments dropped.
pub fn parse_commands(response: &str) -> Vec<String> {
    let mut commands = Vec::new();
    for caps in SHELL_BLOCK.captures_iter(response) {
        for line in caps[1].lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            commands.push(line.to_string());
        }
    }
    commands
}

/// Project folder name: first path segment of the STRUCTURE diagram if one
/// is present, else the first segment of the first file path, else a fixed
/// default.
pub fn resolve_folder_name(response: &str, files: &[GeneratedFile]) -> String {
    if let Some(caps) = STRUCTURE_BLOCK.captures(response) {
        if let Some(first_line) = caps[1].trim_start().lines().next() {
            if let Some(segment) = FOLDER_SEGMENT.captures(first_line) {
                return segment[1].to_string();
            }
        }
    }
    if let Some(first) = files.first() {
        if let Some(segment) = first.path.split('/').next() {
            if !segment.is_empty() {
                return segment.to_string();
            }
        }
    }
    DEFAULT_FOLDER_NAME.to_string()
}

pub fn parse_project(response: &str) -> GeneratedProject {
    let files = parse_files(response);
    let folder_name = resolve_folder_name(response, &files);
    GeneratedProject {
        folder_name,
        files,
        setup_commands: parse_commands(response),
    }
}

/// Confine a model-emitted path to the project root. A leading `/` is
/// dropped so absolute paths become relative; `..` components are refused
/// outright, since `Path::join` would otherwise let either escape the root
/// and overwrite arbitrary files.
fn confine_relative_path(raw: &str) -> ChatResult<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(raw.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => {
                return Err(ChatError::Filesystem(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("refusing file path outside the project root: {}", raw),
                )))
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(ChatError::Filesystem(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing empty file path: {}", raw),
        )));
    }
    Ok(clean)
}

/// Write the project under `base_dir/<folder_name>`, creating intermediate
/// directories and overwriting existing files. Safe to re-run. Returns the
/// project directory and the relative paths written.
pub async fn write_project(
    base_dir: &Path,
    project: &GeneratedProject,
) -> ChatResult<(PathBuf, Vec<String>)> {
    let project_dir = base_dir.join(&project.folder_name);
    fs::create_dir_all(&project_dir).await?;

    let redundant_prefix = format!("{}/", project.folder_name);
    let mut written = Vec::new();
    for file in &project.files {
        let relative = confine_relative_path(
            file.path
                .strip_prefix(&redundant_prefix)
                .unwrap_or(&file.path),
        )?;
        let target = project_dir.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &file.content).await?;
        written.push(relative.display().to_string());
    }

    Ok((project_dir, written))
}

/// Full agent flow: one streamed call with the specialized system prompt,
/// parse, materialize. Chunks still go to `on_chunk` for display.
pub async fn generate_project(
    engine: &ChatEngine,
    description: &str,
    base_dir: &Path,
    on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
) -> ChatResult<AgentOutcome> {
    let conversation = vec![Message::user(format!(
        "Create a complete application for: {}",
        description
    ))];
    let options = SendOptions {
        system: Some(AGENT_SYSTEM_PROMPT.to_string()),
        max_output_tokens: Some(AGENT_MAX_OUTPUT_TOKENS),
        temperature: Some(AGENT_TEMPERATURE),
        ..Default::default()
    };
    let response = engine.send(&conversation, options, on_chunk).await?;

    let project = parse_project(&response);
    if project.files.is_empty() {
        return Ok(AgentOutcome::NoFiles {
            preview: response.chars().take(RESPONSE_PREVIEW_CHARS).collect(),
        });
    }

    let (project_dir, files) = write_project(base_dir, &project).await?;
    Ok(AgentOutcome::Created {
        project_dir,
        files,
        commands: project.setup_commands,
    })
}
