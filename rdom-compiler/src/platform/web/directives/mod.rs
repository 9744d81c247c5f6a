mod html;
mod model;

pub use html::html;
pub use model::model;

use crate::options::DirectiveRegistry;

/// Base directives plus `r-model` and `r-html`.
pub fn web_directives() -> DirectiveRegistry {
    let mut registry = DirectiveRegistry::base();
    registry.register("model", model);
    registry.register("html", html);
    registry
}
