mod class;
mod model;
mod style;

pub use class::ClassModule;
pub use model::{ModelTypeModule, expand_dynamic_type};
pub use style::{StyleModule, parse_style_text};

use crate::options::Module;

/// Registration order is also the order of their data fragments.
pub fn web_modules() -> Vec<Box<dyn Module>> {
    vec![Box::new(ClassModule), Box::new(StyleModule), Box::new(ModelTypeModule)]
}
