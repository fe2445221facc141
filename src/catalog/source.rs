use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceSnippet {
    pub language: Option<String>,
    /// Nearest preceding heading text.
    pub title: Option<String>,
    pub code: String,
}

enum Capture {
    Idle,
    Heading(String),
    Code {
        language: Option<String>,
        code: String,
    },
}

/// Fenced and indented code blocks of a Markdown document, in document order.
pub fn extract_snippets(markdown: &str) -> Vec<SourceSnippet> {
    let mut snippets = Vec::new();
    let mut title = None;
    let mut capture = Capture::Idle;

    for event in Parser::new_ext(markdown, Options::empty()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) if level != HeadingLevel::H1 => {
                capture = Capture::Heading(String::new());
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                capture = Capture::Code {
                    language,
                    code: String::new(),
                };
            }
            Event::Text(text) | Event::Code(text) => match &mut capture {
                Capture::Heading(heading) => heading.push_str(&text),
                Capture::Code { code, .. } => code.push_str(&text),
                Capture::Idle => {}
            },
            Event::End(TagEnd::Heading(_)) => {
                if let Capture::Heading(heading) = std::mem::replace(&mut capture, Capture::Idle) {
                    let heading = heading.trim();
                    title = (!heading.is_empty()).then(|| heading.to_string());
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Capture::Code { language, code } =
                    std::mem::replace(&mut capture, Capture::Idle)
                {
                    snippets.push(SourceSnippet {
                        language,
                        title: title.clone(),
                        code: code.trim_end().to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    snippets
}
