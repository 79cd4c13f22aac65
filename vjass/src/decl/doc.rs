use super::LineComment;

/// Documentation recovered from the comment lines above a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Doc {
    /// Free text lines, markers stripped.
    pub contents: Vec<String>,
    /// `@param name description` entries.
    pub params: Vec<DocParam>,
    /// Whether an `@deprecated` tag is present.
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParam {
    pub name: String,
    pub description: String,
}

impl Doc {
    pub fn from_comments(comments: &[LineComment]) -> Doc {
        let mut doc = Doc::default();

        for comment in comments {
            let text = comment.text.trim();
            let text = text.strip_prefix("//").unwrap_or(text).trim();

            if let Some(rest) = text.strip_prefix("@param") {
                let rest = rest.trim_start();
                let (name, description) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if !name.is_empty() {
                    doc.params.push(DocParam {
                        name: name.to_string(),
                        description: description.trim().to_string(),
                    });
                }
            } else if text.starts_with("@deprecated") {
                doc.deprecated = true;
            } else if !text.is_empty() {
                doc.contents.push(text.to_string());
            }
        }

        doc
    }

    pub fn param(&self, name: &str) -> Option<&DocParam> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() && self.params.is_empty() && !self.deprecated
    }
}
