/// Backend LLM configurations the server knows how to route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelId {
    #[default]
    DeepSeek,
    Qwen,
    QwenCoder,
    Glm,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::DeepSeek => "deepseek",
            ModelId::Qwen => "qwen",
            ModelId::QwenCoder => "qwen_coder",
            ModelId::Glm => "glm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deepseek" => Some(ModelId::DeepSeek),
            "qwen" => Some(ModelId::Qwen),
            "qwen_coder" | "qwen-coder" => Some(ModelId::QwenCoder),
            "glm" => Some(ModelId::Glm),
            _ => None,
        }
    }

    pub fn all() -> Vec<ModelId> {
        vec![ModelId::DeepSeek, ModelId::Qwen, ModelId::QwenCoder, ModelId::Glm]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::DeepSeek => "DeepSeek V3",
            ModelId::Qwen => "Qwen 2.5 72B",
            ModelId::QwenCoder => "Qwen Coder 32B",
            ModelId::Glm => "GLM-4 9B",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelId::DeepSeek => "Code generation expert",
            ModelId::Qwen => "Chinese language expert",
            ModelId::QwenCoder => "Programming model",
            ModelId::Glm => "General conversation",
        }
    }

    /// Position in [`ModelId::all`], used by the picker.
    pub fn index(&self) -> usize {
        Self::all().iter().position(|m| m == self).unwrap_or(0)
    }
}
