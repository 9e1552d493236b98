use crate::stay::Stay;
use crate::template::MessageTemplate;
use thiserror::Error;

/// Placeholders replaced by the guest name
pub const GUEST_NAME_PLACEHOLDER: &str = "name";
/// Placeholders replaced by the property name
pub const PROPERTY_NAME_PLACEHOLDER: &str = "accommodation";

#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("Unknown placeholder: `{{{0}}}`")]
    UnknownPlaceholder(String),
    #[error("Unbalanced brace at position {0}")]
    UnbalancedBrace(usize),
    #[error("The stay has no value for placeholder: `{{{0}}}`")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub subject: Option<String>,
    pub body: String,
}

/// Renders the subject and body of a `MessageTemplate` for a `Stay`.
///
/// The body has to render, otherwise the whole message is rejected.
/// A subject that fails to render is sent as written.
pub fn render(template: &MessageTemplate, stay: &Stay) -> Result<RenderedMessage, RenderError> {
    let body = render_text(&template.body, stay)?;
    let subject = template
        .subject
        .as_ref()
        .filter(|subject| !subject.trim().is_empty())
        .map(|subject| render_text(subject, stay).unwrap_or_else(|_| subject.clone()));

    Ok(RenderedMessage { subject, body })
}

fn lookup<'a>(placeholder: &str, stay: &'a Stay) -> Result<&'a str, RenderError> {
    let (key, value) = match placeholder {
        GUEST_NAME_PLACEHOLDER => (GUEST_NAME_PLACEHOLDER, stay.guest_name.as_str()),
        PROPERTY_NAME_PLACEHOLDER => (PROPERTY_NAME_PLACEHOLDER, stay.property_name.as_str()),
        _ => return Err(RenderError::UnknownPlaceholder(placeholder.to_string())),
    };
    if value.trim().is_empty() {
        return Err(RenderError::MissingField(key));
    }
    Ok(value)
}

/// Substitutes `{name}` and `{accommodation}` in `text`.
/// `{{` and `}}` produce literal braces.
pub fn render_text(text: &str, stay: &Stay) -> Result<String, RenderError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut placeholder = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(RenderError::UnbalancedBrace(pos)),
                        c => placeholder.push(c),
                    }
                }
                if !closed {
                    return Err(RenderError::UnbalancedBrace(pos));
                }
                out.push_str(lookup(&placeholder, stay)?);
            }
            '}' => match chars.peek() {
                Some((_, '}')) => {
                    chars.next();
                    out.push('}');
                }
                _ => return Err(RenderError::UnbalancedBrace(pos)),
            },
            c => out.push(c),
        }
    }

    Ok(out)
}
