//! Compiler options for virtual code generation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Options shared by every plugin of a [`LanguageSession`](crate::LanguageSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Component document extensions (default: `[".vue"]`)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Markdown page extensions (default: `[".md"]`)
    #[serde(default = "default_vitepress_extensions")]
    pub vitepress_extensions: Vec<String>,

    /// Plain HTML files whose markup is a template (default: `[".html"]`)
    #[serde(default = "default_petite_vue_extensions")]
    pub petite_vue_extensions: Vec<String>,

    /// Module that provides the runtime types (default: `vue`)
    #[serde(default = "default_lib")]
    pub lib: String,

    /// Path of the global type declarations, referenced from every script
    #[serde(default)]
    pub global_types_path: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            vitepress_extensions: default_vitepress_extensions(),
            petite_vue_extensions: default_petite_vue_extensions(),
            lib: default_lib(),
            global_types_path: None,
        }
    }
}

impl CompilerOptions {
    /// Parse options from a JSON object. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        if let Some(ext) = options
            .extensions
            .iter()
            .chain(&options.vitepress_extensions)
            .chain(&options.petite_vue_extensions)
            .find(|ext| !ext.starts_with('.'))
        {
            return Err(ConfigError::InvalidExtension(ext.clone()));
        }
        Ok(options)
    }

    #[inline]
    pub fn is_component_file(&self, file_name: &str) -> bool {
        has_extension(&self.extensions, file_name)
    }

    #[inline]
    pub fn is_markdown_file(&self, file_name: &str) -> bool {
        has_extension(&self.vitepress_extensions, file_name)
    }

    #[inline]
    pub fn is_petite_vue_file(&self, file_name: &str) -> bool {
        has_extension(&self.petite_vue_extensions, file_name)
    }
}

fn has_extension(extensions: &[String], file_name: &str) -> bool {
    extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
}

fn default_extensions() -> Vec<String> {
    vec![".vue".to_string()]
}

fn default_vitepress_extensions() -> Vec<String> {
    vec![".md".to_string()]
}

fn default_petite_vue_extensions() -> Vec<String> {
    vec![".html".to_string()]
}

fn default_lib() -> String {
    "vue".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let options = CompilerOptions::from_json("{}").unwrap();
        assert_eq!(options, CompilerOptions::default());
        assert!(options.is_component_file("App.vue"));
        assert!(options.is_markdown_file("docs/index.md"));
        assert!(options.is_petite_vue_file("index.html"));
        assert!(!options.is_component_file("main.ts"));
    }

    #[test]
    fn test_camel_case_fields() {
        let options = CompilerOptions::from_json(
            r#"{ "extensions": [".vue", ".nvue"], "globalTypesPath": "./types/global.d.ts" }"#,
        )
        .unwrap();
        assert!(options.is_component_file("Page.nvue"));
        assert_eq!(options.global_types_path.as_deref(), Some("./types/global.d.ts"));
        assert_eq!(options.vitepress_extensions, vec![".md".to_string()]);
    }

    #[test]
    fn test_invalid_json() {
        let err = CompilerOptions::from_json("{ extensions: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_extension_without_dot() {
        let err = CompilerOptions::from_json(r#"{ "petiteVueExtensions": ["html"] }"#).unwrap_err();
        assert_eq!(err.to_string(), "Extension must start with '.': html");
    }
}
