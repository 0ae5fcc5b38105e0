use super::{InputError, InputResult};
use minijinja::Environment;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Jinja2 template source read from disk.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    source: String,
}

impl Template {
    pub fn from_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders with `context`; undefined variables render empty.
    pub fn render<S: Serialize>(&self, context: S) -> InputResult<String> {
        let mut env = Environment::new();
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        env.render_str(&self.source, context).map_err(InputError::from)
    }
}

pub fn load_template(path: &Path) -> InputResult<Template> {
    let source = std::fs::read_to_string(path).map_err(|err| InputError::io(path, err))?;
    Ok(Template::from_source(path, source))
}
