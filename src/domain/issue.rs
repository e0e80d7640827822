#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueInput {
    Text(String),
    Url(String),
}

impl IssueInput {
    /// A non-empty issue URL takes precedence over the literal text.
    pub fn from_form(issue_text: String, issue_url: String) -> Self {
        let url = issue_url.trim();
        if url.is_empty() {
            IssueInput::Text(issue_text)
        } else {
            IssueInput::Url(url.to_string())
        }
    }
}
