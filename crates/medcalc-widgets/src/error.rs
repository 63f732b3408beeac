use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("template parse error: {0}")]
    TemplateParse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tera::Error> for WidgetError {
    fn from(e: tera::Error) -> Self {
        WidgetError::TemplateRender(e.to_string())
    }
}
