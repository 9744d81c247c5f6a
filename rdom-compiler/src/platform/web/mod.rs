pub mod directives;
pub mod modules;
pub mod tags;

use crate::options::CompilerOptions;

/// Options for compiling templates that render to the DOM.
pub fn base_options() -> CompilerOptions {
    CompilerOptions {
        tags: tags::web_tag_table(),
        must_use_prop: tags::must_use_prop,
        modules: modules::web_modules(),
        directives: directives::web_directives(),
        ..CompilerOptions::default()
    }
}
