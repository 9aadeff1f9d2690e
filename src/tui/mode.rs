// state local to the tui: only what's needed to resolve keys into semantic
// InputEvents. Everything else comes from DisplayState each frame.
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    // Some while the upload prompt is open; holds the path typed so far
    pub upload_prompt: Option<String>,
}

impl TuiState {
    pub fn prompt_open(&self) -> bool {
        self.upload_prompt.is_some()
    }
}
