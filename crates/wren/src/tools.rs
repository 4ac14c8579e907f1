use serde_json::{json, Value};

/// A toggleable provider capability. `wire` builds the request fragment the
/// provider understands; everything else is catalog metadata.
pub struct ToolDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub enabled: bool,
    wire: fn() -> Value,
}

impl ToolDescriptor {
    pub fn wire_value(&self) -> Value {
        (self.wire)()
    }
}

fn google_search() -> Value {
    json!({ "google_search": {} })
}

fn code_execution() -> Value {
    json!({ "code_execution": {} })
}

fn url_context() -> Value {
    json!({ "url_context": {} })
}

/// Catalog of optional model capabilities with per-tool enabled state.
/// Held by the session rather than shared globally; ids are unique and
/// stable for the life of the process. Single-threaded mutation only — a
/// multi-session reuse must put this behind a mutex.
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            tools: vec![
                ToolDescriptor {
                    id: "google_search",
                    name: "Google Search",
                    description: "Search the web for current events and real-time information.",
                    enabled: false,
                    wire: google_search,
                },
                ToolDescriptor {
                    id: "code_execution",
                    name: "Code Execution",
                    description: "Generate and run Python code for calculations and analysis.",
                    enabled: false,
                    wire: code_execution,
                },
                ToolDescriptor {
                    id: "url_context",
                    name: "URL Context",
                    description: "Let the model read URLs mentioned in the prompt directly.",
                    enabled: false,
                    wire: url_context,
                },
            ],
        }
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Flip a tool's enabled state. Returns the new state, or `None` when
    /// the id is unknown, in which case the catalog is left untouched.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let tool = self.tools.iter_mut().find(|tool| tool.id == id)?;
        tool.enabled = !tool.enabled;
        Some(tool.enabled)
    }

    pub fn reset_all(&mut self) {
        for tool in &mut self.tools {
            tool.enabled = false;
        }
    }

    pub fn enabled_ids(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|tool| tool.enabled)
            .map(|tool| tool.id.to_string())
            .collect()
    }

    /// Wire fragments for the enabled tools, or `None` when nothing is
    /// enabled so callers omit the tools parameter entirely. An empty tool
    /// set is not the same thing to every provider.
    pub fn enabled_tools(&self) -> Option<Vec<Value>> {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .filter(|tool| tool.enabled)
            .map(|tool| tool.wire_value())
            .collect();
        if tools.is_empty() {
            None
        } else {
            Some(tools)
        }
    }
}
