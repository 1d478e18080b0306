use crate::cli::OutputFormat;
use crate::route::Route;
use crate::state::ViewState;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

const LOGO: &str = "GitHub Explorer";
const BACK_LABEL: &str = "Back";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Render a line for each failed fetch instead of leaving the block out.
    pub show_errors: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub logo: String,
    pub back: Link,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            logo: LOGO.to_string(),
            back: Link {
                label: BACK_LABEL.to_string(),
                href: Route::Dashboard.path(),
            },
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub src: String,
    pub alt: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub value: u64,
    pub label: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SummaryBlock {
    pub avatar: Avatar,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stats: Vec<Stat>,
}

/// One rendered issue. `key` is the issue id and identifies the entry
/// across re-renders.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IssueEntry {
    pub key: String,
    pub href: String,
    pub title: String,
    pub author: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub header: Header,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryBlock>,
    pub issues: Vec<IssueEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

impl Page {
    pub fn dashboard() -> Self {
        Self {
            hint: Some("Enter a repository as owner/name to explore it".to_string()),
            ..Self::default()
        }
    }

    pub fn from_state(state: &ViewState, options: &RenderOptions) -> Self {
        let summary = state.summary.loaded().map(|repo| SummaryBlock {
            avatar: Avatar {
                src: repo.owner.avatar_url.clone(),
                alt: repo.owner.login.clone(),
            },
            full_name: repo.full_name.clone(),
            description: repo.description.clone(),
            stats: vec![
                Stat {
                    value: repo.stargazers_count,
                    label: "stars",
                },
                Stat {
                    value: repo.forks_count,
                    label: "forks",
                },
                Stat {
                    value: repo.open_issues_count,
                    label: "open issues",
                },
            ],
        });

        let issues = state
            .issues
            .loaded()
            .map(|issues| {
                issues
                    .iter()
                    .map(|issue| IssueEntry {
                        key: issue.id.to_string(),
                        href: issue.html_url.clone(),
                        title: issue.title.clone(),
                        author: issue.user.login.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut failures = Vec::new();
        if options.show_errors {
            if let Some(message) = state.summary.failure() {
                failures.push(format!("Could not load repository: {}", message));
            }
            if let Some(message) = state.issues.failure() {
                failures.push(format!("Could not load issues: {}", message));
            }
        }

        Self {
            header: Header::default(),
            hint: None,
            summary,
            issues,
            failures,
        }
    }

    pub fn display(&self) -> String {
        let mut output = format!(
            "{}\n{} {}",
            self.header.logo.bold(),
            format!("< {}", self.header.back.label).cyan(),
            format!("({})", self.header.back.href).dimmed()
        );

        if let Some(hint) = &self.hint {
            output.push_str(&format!("\n\n{}", hint.dimmed()));
        }

        if let Some(summary) = &self.summary {
            output.push_str(&format!(
                "\n\n{} {}",
                summary.full_name.white().bold(),
                format!("[{}: {}]", summary.avatar.alt, summary.avatar.src).dimmed()
            ));
            if let Some(description) = &summary.description {
                output.push_str(&format!("\n{}", description));
            }
            let stats: Vec<String> = summary
                .stats
                .iter()
                .map(|stat| format!("{} {}", stat.value.to_string().bold(), stat.label.dimmed()))
                .collect();
            output.push_str(&format!("\n{}", stats.join("   ")));
        }

        if !self.issues.is_empty() {
            output.push('\n');
        }
        for issue in &self.issues {
            output.push_str(&format!(
                "\n{} {}\n  {}  {}",
                ">".cyan(),
                issue.title.white().bold(),
                issue.author.magenta(),
                issue.href.dimmed()
            ));
        }

        for failure in &self.failures {
            output.push_str(&format!("\n\n{}", failure.red()));
        }

        output
    }
}

pub fn write_page<W: Write>(out: &mut W, page: &Page, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(page).context("Failed to serialize page")?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{}", page.display())?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
