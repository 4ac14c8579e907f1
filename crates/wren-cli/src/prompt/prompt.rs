use anyhow::Result;

/// An item offered in a multi-select: id, display label, hint.
pub type SubsetItem = (String, String, String);

/// Terminal boundary for the session loop. `Send` because the streaming
/// chunk callback borrows the prompt across await points.
pub trait Prompt: Send {
    /// One line of free text, trimmed. Empty means "ask again".
    fn ask_text(&mut self, message: &str) -> Result<String>;

    /// Single pick from labeled options; `None` when the user declines.
    fn ask_one_of(&mut self, message: &str, labels: &[String]) -> Result<Option<String>>;

    /// Subset pick; `checked` ids start selected.
    fn ask_subset(
        &mut self,
        message: &str,
        items: &[SubsetItem],
        checked: &[String],
    ) -> Result<Vec<String>>;

    /// Free text validated to a minimum trimmed length.
    fn ask_long_text(&mut self, message: &str, min_len: usize) -> Result<String>;

    fn render_system(&mut self, text: &str);

    /// Streamed assistant output: a start marker, raw chunks flushed as they
    /// arrive, and an end marker. `assistant_chunk` must stay cheap and must
    /// never re-enter the session or the engine.
    fn assistant_start(&mut self);
    fn assistant_chunk(&mut self, chunk: &str);
    fn assistant_end(&mut self);
}
