/// Turns an article description into a short summary.
///
/// Implementations are pure: same input, same output, no side effects. The
/// ingestion pipeline never calls this with an empty description.
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    fn summarize(&self, text: &str) -> String;
}
