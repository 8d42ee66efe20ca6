use crate::domain::model::{QaEntry, Snippet};
use crate::utils::error::{PrimerError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// A loaded study guide: an ordered collection of numbered Q&A entries.
#[derive(Debug, Clone)]
pub struct Guide {
    entries: Vec<QaEntry>,
}

impl Guide {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse markdown where each entry starts with `## <n>. <title>` or
    /// `### <n>) <title>`. Preamble before the first numbered heading is
    /// ignored; unnumbered headings become body text.
    pub fn parse(text: &str) -> Result<Self> {
        let heading_re = Regex::new(r"^#{2,3}\s*(\d+)[.)]\s+(.+?)\s*$").unwrap();

        let mut entries: Vec<QaEntry> = Vec::new();
        let mut current: Option<EntryBuilder> = None;
        let mut fence: Option<SnippetBuilder> = None;

        for raw_line in text.lines() {
            let line = raw_line.trim_end_matches('\r');

            if fence.is_none() {
                if let Some(caps) = heading_re.captures(line) {
                    if let Ok(id) = caps[1].parse::<u32>() {
                        if let Some(builder) = current.take() {
                            entries.push(builder.finish());
                        }
                        current = Some(EntryBuilder::new(id, caps[2].to_string()));
                        continue;
                    }
                }
            }

            let Some(builder) = current.as_mut() else {
                // Preamble before the first numbered heading.
                continue;
            };

            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                match fence.take() {
                    Some(snippet) => builder.snippets.push(snippet.finish()),
                    None => {
                        fence = Some(SnippetBuilder::new(
                            trimmed.trim_start_matches('`').trim().to_string(),
                        ));
                    }
                }
                continue;
            }

            match fence.as_mut() {
                Some(snippet) => snippet.lines.push(line.to_string()),
                None => builder.body.push(line.to_string()),
            }
        }

        // An unclosed fence runs to the end of the entry.
        if let Some(mut builder) = current.take() {
            if let Some(snippet) = fence.take() {
                builder.snippets.push(snippet.finish());
            }
            entries.push(builder.finish());
        }

        let guide = Self { entries };
        guide.validate_structure()?;
        Ok(guide)
    }

    fn validate_structure(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(PrimerError::GuideError {
                message: "no numbered Q&A entries found".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id) {
                return Err(PrimerError::GuideError {
                    message: format!("duplicate entry id: {}", entry.id),
                });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match over title and answer, in document
    /// order.
    pub fn search(&self, query: &str) -> Vec<&QaEntry> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.title.to_lowercase().contains(&needle)
                    || e.answer.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Entries that violate the "every question has a non-empty answer"
    /// property.
    pub fn unanswered(&self) -> Vec<&QaEntry> {
        self.entries.iter().filter(|e| !e.has_answer()).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Summary table: one row per entry.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["id", "title", "answer_words", "snippets"])?;
        for entry in &self.entries {
            writer.write_record([
                entry.id.to_string(),
                entry.title.clone(),
                entry.answer_words().to_string(),
                entry.snippets.len().to_string(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| PrimerError::GuideError {
                message: format!("csv buffer error: {}", e),
            })?;
        String::from_utf8(bytes).map_err(|e| PrimerError::GuideError {
            message: format!("csv output was not UTF-8: {}", e),
        })
    }
}

struct EntryBuilder {
    id: u32,
    title: String,
    body: Vec<String>,
    snippets: Vec<Snippet>,
}

impl EntryBuilder {
    fn new(id: u32, title: String) -> Self {
        Self {
            id,
            title,
            body: Vec::new(),
            snippets: Vec::new(),
        }
    }

    fn finish(self) -> QaEntry {
        QaEntry {
            id: self.id,
            title: self.title,
            answer: self.body.join("\n").trim().to_string(),
            snippets: self.snippets,
        }
    }
}

struct SnippetBuilder {
    lang: String,
    lines: Vec<String>,
}

impl SnippetBuilder {
    fn new(lang: String) -> Self {
        Self {
            lang,
            lines: Vec::new(),
        }
    }

    fn finish(self) -> Snippet {
        Snippet {
            lang: self.lang,
            source: self.lines.join("\n"),
        }
    }
}
