pub const DEFAULT_ATTRIBUTION: &str =
    "This article was automatically converted from the Help Center.";

/// A saved article: provenance header, converted body, attribution footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub header_block: String,
    pub converted_body: String,
    pub footer: String,
}

impl MarkdownDocument {
    /// The header is fixed before the body is attached.
    pub fn new(title: &str, source_url: &str, category: &str, attribution: &str) -> Self {
        let header_block =
            format!("# {title}\n\n> Source: {source_url}\n> Category: {category}\n\n---\n\n");
        Self {
            header_block,
            converted_body: String::new(),
            footer: format!("\n\n---\n*{attribution}*\n"),
        }
    }

    pub fn with_body(mut self, converted_body: String) -> Self {
        self.converted_body = converted_body;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.header_block.len() + self.converted_body.len() + self.footer.len(),
        );
        out.push_str(&self.header_block);
        out.push_str(&self.converted_body);
        out.push_str(&self.footer);
        out
    }
}
