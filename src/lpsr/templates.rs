//! LilyPond document template
//!
//! The emitter produces the voice definitions and the score block as text;
//! the surrounding document (version, language, header, layout) comes from
//! a Mustache template.

use serde::Serialize;

/// Template selection for LilyPond output
#[derive(Debug, Clone, Copy)]
pub enum LilyPondTemplate {
    /// Version, language, header, definitions and `\score`
    Score,
    /// Same without the `\header` block
    Bare,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderField {
    pub name: String,
    /// Already escaped for a LilyPond string
    pub value: String,
}

/// Context data for template rendering
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    /// LilyPond version (e.g., "2.24.0")
    pub version: String,

    /// `\language` value
    pub language: String,

    pub header_fields: Vec<HeaderField>,

    /// `\accidentalStyle` value
    pub accidental_style: String,

    /// Voice and figured bass definitions
    pub definitions: String,

    /// Contents of the `\score` block
    pub score_block: String,
}

impl TemplateContext {
    pub fn builder(version: impl Into<String>, language: impl Into<String>) -> TemplateContextBuilder {
        TemplateContextBuilder {
            context: TemplateContext {
                version: version.into(),
                language: language.into(),
                header_fields: Vec::new(),
                accidental_style: "default".to_string(),
                definitions: String::new(),
                score_block: String::new(),
            },
        }
    }
}

/// Builder for TemplateContext
pub struct TemplateContextBuilder {
    context: TemplateContext,
}

impl TemplateContextBuilder {
    pub fn header_field(mut self, name: &str, value: &str) -> Self {
        self.context.header_fields.push(HeaderField {
            name: name.to_string(),
            value: escape_lilypond_string(value),
        });
        self
    }

    pub fn accidental_style(mut self, style: impl Into<String>) -> Self {
        self.context.accidental_style = style.into();
        self
    }

    pub fn definitions(mut self, definitions: impl Into<String>) -> Self {
        self.context.definitions = definitions.into();
        self
    }

    pub fn score_block(mut self, score_block: impl Into<String>) -> Self {
        self.context.score_block = score_block.into();
        self
    }

    pub fn build(self) -> TemplateContext {
        self.context
    }
}

/// Get template content by type
pub fn get_template_content(template_type: LilyPondTemplate) -> &'static str {
    match template_type {
        LilyPondTemplate::Score => include_str!("templates/score.ly.mustache"),
        LilyPondTemplate::Bare => include_str!("templates/bare.ly.mustache"),
    }
}

/// Render a LilyPond document using a template
pub fn render_lilypond(
    template_type: LilyPondTemplate,
    context: &TemplateContext,
) -> Result<String, mustache::Error> {
    let template = mustache::compile_str(get_template_content(template_type))?;
    template.render_to_string(context)
}

/// Escape a value for use inside a LilyPond string literal
pub fn escape_lilypond_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_score_template() {
        let context = TemplateContext::builder("2.24.0", "nederlands")
            .header_field("title", "Sonata \"facile\"")
            .definitions("Part_POne_Staff_One_Voice_One = \\absolute {\n  c'4 |\n}\n")
            .score_block("  <<\n  >>\n")
            .build();
        let rendered = render_lilypond(LilyPondTemplate::Score, &context).unwrap();

        assert!(rendered.contains("\\version \"2.24.0\""));
        assert!(rendered.contains("\\language \"nederlands\""));
        assert!(rendered.contains("title = \"Sonata \\\"facile\\\"\""));
        assert!(rendered.contains("Part_POne_Staff_One_Voice_One = \\absolute {"));
        assert!(rendered.contains("\\accidentalStyle default"));
    }

    #[test]
    fn test_bare_template_has_no_header() {
        let context = TemplateContext::builder("2.24.0", "english").build();
        let rendered = render_lilypond(LilyPondTemplate::Bare, &context).unwrap();
        assert!(!rendered.contains("\\header"));
        assert!(rendered.contains("\\score"));
    }
}
