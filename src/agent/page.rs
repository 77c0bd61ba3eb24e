//! Built-in single-page agent.
//!
//! Deliberately thin: the model proposes a starting URL, the agent
//! navigates the session's tab there, converts the page to markdown and
//! asks the model to complete the task against that content. No clicking,
//! form filling or multi-step planning.

use std::sync::Arc;

use async_trait::async_trait;
use headless_chrome::{Browser, Tab};
use log::info;

use crate::agent::{TaskAgent, TaskOutcome};
use crate::browser::ChromeBackend;
use crate::error::{Error, Result};
use crate::llm::ModelClient;

/// Upper bound on the page text forwarded to the model.
const PAGE_TEXT_LIMIT: usize = 12_000;

#[derive(Debug, Clone, Copy, Default)]
pub struct PageAgent;

impl PageAgent {
    fn starting_url_prompt(task: &str) -> String {
        format!(
            "You plan browser automation. For the task below, reply with the single best URL \
             to open first. Reply with the URL only, nothing else.\n\nTask: {}",
            task
        )
    }

    fn answer_prompt(task: &str, url: &str, page_text: &str) -> String {
        format!(
            "You are a browser automation agent. You opened {} for this task:\n{}\n\n\
             Page content as markdown:\n{}\n\n\
             Complete the task using the page content above and reply with the result \
             for the operator.",
            url, task, page_text
        )
    }
}

#[async_trait]
impl TaskAgent<ChromeBackend> for PageAgent {
    async fn run(
        &self,
        task: &str,
        model: &dyn ModelClient,
        _engine: &Browser,
        context: &Arc<Tab>,
    ) -> Result<TaskOutcome> {
        let suggestion = model.invoke(&Self::starting_url_prompt(task)).await?;
        let first_line = suggestion.trim().lines().next().unwrap_or("").trim();
        if first_line.is_empty() {
            return Err(Error::Task("model suggested no starting URL".to_string()));
        }
        let url = normalize_url(first_line);

        info!("navigating to {}", url);
        context
            .navigate_to(&url)
            .map_err(|e| Error::Task(format!("failed to navigate to {}: {}", url, e)))?;
        context
            .wait_until_navigated()
            .map_err(|e| Error::Task(format!("navigation timeout: {}", e)))?;

        let html = context
            .get_content()
            .map_err(|e| Error::Task(format!("failed to read page content: {}", e)))?;
        let mut page_text = html2md::parse_html(&html);
        if page_text.len() > PAGE_TEXT_LIMIT {
            page_text = page_text.chars().take(PAGE_TEXT_LIMIT).collect();
        }

        let summary = model
            .invoke(&Self::answer_prompt(task, &url, &page_text))
            .await?;

        Ok(TaskOutcome {
            summary,
            final_url: Some(url),
        })
    }
}

/// Normalize an incomplete URL by adding a missing protocol.
fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("file://")
        || trimmed.starts_with("about:")
    {
        return trimmed.to_string();
    }

    // localhost special case - use http by default
    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    // Looks like a domain - add https://
    if trimmed.contains('.') {
        return format!("https://{}", trimmed);
    }

    // Single word - assume it's a domain name
    format!("https://www.{}.com", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_complete() {
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("about:blank"), "about:blank");
    }

    #[test]
    fn test_normalize_url_missing_protocol() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("sub.example.com/path"), "https://sub.example.com/path");
    }

    #[test]
    fn test_normalize_url_localhost() {
        assert_eq!(normalize_url("localhost:3000"), "http://localhost:3000");
        assert_eq!(normalize_url("127.0.0.1:8080"), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_normalize_url_single_word() {
        assert_eq!(normalize_url("wikipedia"), "https://www.wikipedia.com");
    }

    #[test]
    fn test_normalize_url_whitespace() {
        assert_eq!(normalize_url("  example.com  "), "https://example.com");
    }

    #[test]
    fn test_prompts_mention_task_and_url() {
        let url_prompt = PageAgent::starting_url_prompt("find the weather in Oslo");
        assert!(url_prompt.contains("find the weather in Oslo"));

        let answer = PageAgent::answer_prompt("find the weather", "https://example.com", "# Page");
        assert!(answer.contains("https://example.com"));
        assert!(answer.contains("# Page"));
    }
}
