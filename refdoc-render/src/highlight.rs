//! Code block highlighting
//!
//! Fenced blocks are highlighted with syntect's bundled grammars. Output is class-based HTML
//! (`<span class="hljs-source hljs-rust">`) so the site stylesheet controls colors.

use crate::error::RenderError;
use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

/// Pick a grammar from the first word of a fence info string, or from the code itself.
fn find_syntax(info: &str, code: &str) -> &'static SyntaxReference {
    let syntaxes = Lazy::force(&SYNTAXES);
    if let Some(token) = info.split_whitespace().next() {
        if let Some(syntax) = syntaxes.find_syntax_by_token(token) {
            return syntax;
        }
        tracing::debug!(language = token, "unknown code block language, detecting");
    }
    let first_line = code.lines().next().unwrap_or_default();
    syntaxes
        .find_syntax_by_first_line(first_line)
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
}

/// Highlight `code` and return the inner HTML of the code block.
pub fn highlight(code: &str, info: &str) -> Result<String, RenderError> {
    let syntax = find_syntax(info, code);
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, Lazy::force(&SYNTAXES), CLASS_STYLE);

    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlight {
                language: syntax.name.clone(),
                message: err.to_string(),
            })?;
    }
    Ok(generator.finalize())
}

/// Wrap highlighted HTML in the code element the site styles.
pub fn code_block_html(highlighted: &str, css_class: &str) -> String {
    format!("<code class=\"{}\">{}</code>", css_class, highlighted)
}
