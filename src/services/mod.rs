pub mod issue_fetcher;
pub mod sample_issues;
pub mod summarizer;

pub use issue_fetcher::IssueFetcherService;
pub use sample_issues::SampleIssueService;
pub use summarizer::SummarizerService;

#[cfg(test)]
pub mod fakes;
