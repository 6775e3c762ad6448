//! Style templates and prompt text shared by every generation path.

use crate::models::StyleTag;

pub const EDIT_QUALITY_DIRECTIVE: &str = include_str!("../data/prompts/edit_quality.txt");
pub const REGENERATE: &str = include_str!("../data/prompts/regenerate.txt");

/// Fixed wording attached to one style tag.
#[derive(Debug)]
pub struct StyleTemplate {
    pub tag: StyleTag,
    pub label: &'static str,
    pub summary: &'static str,
    /// Literal prefix every enhanced prompt for this style starts with.
    pub opening_phrase: &'static str,
    /// Instruction sent with a reference image to the vision model.
    pub describe_instruction: &'static str,
    /// Instruction sent with a source image to the image edit model.
    pub edit_instruction: &'static str,
    /// Appended to feedback-driven regenerations.
    pub regeneration_directive: &'static str,
}

static STYLE_TEMPLATES: [StyleTemplate; 3] = [
    StyleTemplate {
        tag: StyleTag::Ecommerce,
        label: "E-commerce Product",
        summary: "Clean, professional photos with studio lighting, neutral backgrounds, and commercial appeal - perfect for product catalogs and online retail.",
        opening_phrase: "Create a professional e commerce product image, showing the exact same product with all details preserved",
        describe_instruction: include_str!("../data/prompts/ecommerce_describe.txt"),
        edit_instruction: include_str!("../data/prompts/ecommerce_edit.txt"),
        regeneration_directive: "Maintain clean, commercial photography style suitable for online retail with studio lighting and professional composition.",
    },
    StyleTemplate {
        tag: StyleTag::Lifestyle,
        label: "Real-world Lifestyle",
        summary: "Natural, authentic images showing products in everyday use with natural lighting and relatable settings - ideal for lifestyle marketing.",
        opening_phrase: "Create a realistic lifestyle image, showing the exact same product with all details preserved",
        describe_instruction: include_str!("../data/prompts/lifestyle_describe.txt"),
        edit_instruction: include_str!("../data/prompts/lifestyle_edit.txt"),
        regeneration_directive: "Keep the natural, everyday setting with natural lighting and authentic atmosphere. For food, plants, or small objects: maintain macro lens perspective with precise focusing and detailed textures.",
    },
    StyleTemplate {
        tag: StyleTag::Artistic,
        label: "Creative Artistic",
        summary: "Dramatic, artistic photos with creative lighting, artistic backgrounds, and artistic composition - great for creative campaigns and social media.",
        opening_phrase: "Create an artistic, creative image, showing the exact same product with all details preserved",
        describe_instruction: include_str!("../data/prompts/artistic_describe.txt"),
        edit_instruction: include_str!("../data/prompts/artistic_edit.txt"),
        regeneration_directive: "Maintain artistic, creative style with dramatic lighting and artistic composition.",
    },
];

pub fn style_template(tag: StyleTag) -> &'static StyleTemplate {
    match tag {
        StyleTag::Ecommerce => &STYLE_TEMPLATES[0],
        StyleTag::Lifestyle => &STYLE_TEMPLATES[1],
        StyleTag::Artistic => &STYLE_TEMPLATES[2],
    }
}

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Prompt for a feedback-driven regeneration of `previous`.
pub fn regeneration_prompt(previous: &str, feedback: &str, style: StyleTag) -> String {
    render(
        REGENERATE.trim(),
        &[
            ("prompt", previous),
            ("feedback", feedback.trim()),
            ("directive", style_template(style).regeneration_directive),
        ],
    )
}

/// Full instruction for the image edit model: style wording, then the
/// optional user instruction and exclusions, then the quality directive.
pub fn edit_instruction(style: StyleTag, instruction: Option<&str>, negative: Option<&str>) -> String {
    let mut text = format!("{}\n\n", style_template(style).edit_instruction.trim());
    if let Some(extra) = instruction.map(str::trim).filter(|s| !s.is_empty()) {
        text.push_str(&format!("Additional specific instructions: {}\n\n", extra));
    }
    if let Some(avoid) = negative.map(str::trim).filter(|s| !s.is_empty()) {
        text.push_str(&format!("Avoid these elements: {}\n\n", avoid));
    }
    text.push_str(EDIT_QUALITY_DIRECTIVE.trim());
    text
}
