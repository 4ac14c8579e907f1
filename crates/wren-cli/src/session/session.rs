use std::path::PathBuf;

use anyhow::Result;

use wren::agent::{self, AgentOutcome};
use wren::chat::{ChatEngine, SendOptions};
use wren::options::extract_options;
use wren::tools::ToolRegistry;
use wren::transcript::Transcript;

use crate::prompt::prompt::{Prompt, SubsetItem};

const MIN_AGENT_DESCRIPTION_LEN: usize = 10;

/// One interactive chat session: reads input, dispatches slash commands,
/// and otherwise drives the engine over the growing transcript. Strictly
/// single-threaded; at most one model call is in flight at any time.
pub struct Session<'a> {
    engine: ChatEngine,
    tools: ToolRegistry,
    transcript: Transcript,
    prompt: Box<dyn Prompt + 'a>,
    base_dir: PathBuf,
}

impl<'a> Session<'a> {
    pub fn new(
        engine: ChatEngine,
        tools: ToolRegistry,
        prompt: Box<impl Prompt + 'a>,
        base_dir: PathBuf,
    ) -> Self {
        Session {
            engine,
            tools,
            transcript: Transcript::new(),
            prompt,
            base_dir,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let input = self.prompt.ask_text("wren")?;
            if input.is_empty() {
                continue;
            }

            let lower = input.to_lowercase();
            if lower == "/exit" || lower == "/quit" {
                break;
            }
            if lower == "/help" {
                self.show_help();
                continue;
            }
            if lower == "/tools" {
                self.configure_tools()?;
                continue;
            }
            // Only the first whitespace-delimited token is the command, so
            // a chat message like "/agentic ..." is not a dispatch.
            let mut tokens = input.splitn(2, char::is_whitespace);
            if tokens.next().unwrap_or("").to_lowercase() == "/agent" {
                let description = tokens.next().unwrap_or("").trim().to_string();
                self.run_agent(description).await?;
                continue;
            }

            self.chat_turn(input).await?;
        }
        Ok(())
    }

    /// One chat turn: append the user message, stream a reply, commit it,
    /// then offer an option branch if the reply enumerates choices. A
    /// failed reply is rendered and the turn ends with history intact.
    async fn chat_turn(&mut self, text: String) -> Result<()> {
        self.transcript.push_user(text);
        let Some(reply) = self.streamed_reply().await else {
            return Ok(());
        };
        self.transcript.push_assistant(reply.clone());

        let options = extract_options(&reply);
        if options.is_empty() {
            return Ok(());
        }
        let Some(choice) = self
            .prompt
            .ask_one_of("The reply lists some options. Continue with one?", &options)?
        else {
            return Ok(());
        };

        // The branch re-sends the entire history, skipped context included.
        self.transcript.push_user(choice);
        if let Some(branch_reply) = self.streamed_reply().await {
            self.transcript.push_assistant(branch_reply);
        }
        Ok(())
    }

    /// One streamed call over the whole transcript. Returns `None` after
    /// rendering a failure; committing a successful reply is the caller's
    /// job, so nothing partial ever lands in the transcript.
    async fn streamed_reply(&mut self) -> Option<String> {
        let options = SendOptions {
            tools: self.tools.enabled_tools(),
            ..Default::default()
        };

        self.prompt.assistant_start();
        let result = {
            let prompt = &mut self.prompt;
            let mut on_chunk = |chunk: &str| prompt.assistant_chunk(chunk);
            self.engine
                .send(self.transcript.messages(), options, &mut on_chunk)
                .await
        };
        self.prompt.assistant_end();

        match result {
            Ok(reply) => Some(reply),
            Err(error) => {
                self.prompt.render_system(&error.to_string());
                None
            }
        }
    }

    fn configure_tools(&mut self) -> Result<()> {
        let items: Vec<SubsetItem> = self
            .tools
            .descriptors()
            .iter()
            .map(|tool| {
                (
                    tool.id.to_string(),
                    tool.name.to_string(),
                    tool.description.to_string(),
                )
            })
            .collect();
        let checked = self.tools.enabled_ids();

        let selected = self
            .prompt
            .ask_subset("Select the tools to enable:", &items, &checked)?;

        self.tools.reset_all();
        for id in &selected {
            self.tools.toggle(id);
        }

        if selected.is_empty() {
            self.prompt.render_system("All tools disabled.");
        } else {
            self.prompt
                .render_system(&format!("Enabled tools: {}", selected.join(", ")));
        }
        Ok(())
    }

    async fn run_agent(&mut self, inline_description: String) -> Result<()> {
        let description = if inline_description.is_empty() {
            self.prompt.ask_long_text(
                "Describe the project to generate:",
                MIN_AGENT_DESCRIPTION_LEN,
            )?
        } else {
            inline_description
        };

        self.prompt
            .render_system("Agent mode: generating your project...");
        self.prompt.assistant_start();
        let outcome = {
            let prompt = &mut self.prompt;
            let mut on_chunk = |chunk: &str| prompt.assistant_chunk(chunk);
            agent::generate_project(&self.engine, &description, &self.base_dir, &mut on_chunk)
                .await
        };
        self.prompt.assistant_end();

        match outcome {
            Ok(AgentOutcome::Created {
                project_dir,
                files,
                commands,
            }) => {
                self.prompt
                    .render_system(&format!("Project created in: {}", project_dir.display()));
                for file in &files {
                    self.prompt.render_system(&format!("  created: {}", file));
                }
                if !commands.is_empty() {
                    self.prompt.render_system("Setup & run commands:");
                    for command in &commands {
                        self.prompt.render_system(&format!("  {}", command));
                    }
                }
            }
            Ok(AgentOutcome::NoFiles { preview }) => {
                self.prompt.render_system(
                    "No files found in the response. The model may not have followed the format.",
                );
                self.prompt
                    .render_system(&format!("Raw response preview:\n{}", preview));
            }
            Err(error) => {
                self.prompt
                    .render_system(&format!("Agent mode failed: {}", error));
            }
        }
        Ok(())
    }

    fn show_help(&mut self) {
        self.prompt.render_system("Commands:");
        self.prompt
            .render_system("/help            - Display this help message");
        self.prompt
            .render_system("/tools           - Choose which model tools are enabled");
        self.prompt
            .render_system("/agent [request] - Generate a project from a description");
        self.prompt
            .render_system("/exit            - Quit the session");
        self.prompt
            .render_system("Anything else is sent to the model as a chat message.");
    }
}
