use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::filters::parse_filters;
use crate::options::{Branch, Expansion, IfLink, Module};
use crate::template_ast::{Attr, Element};

/// Splits `<input r-model :type="t">` into checkbox, radio and other
/// branches so each can get its own model code.
pub struct ModelTypeModule;

impl Module for ModelTypeModule {
    fn name(&self) -> &str {
        "model"
    }

    fn pre_transform_node(
        &self,
        el: &Element,
        ctx: &mut CompileContext<'_>,
    ) -> Result<Option<Expansion>, CompileError> {
        Ok(expand_dynamic_type(el, &ctx.options.directive_prefix))
    }
}

pub fn expand_dynamic_type(el: &Element, prefix: &str) -> Option<Expansion> {
    if el.tag != "input" || !el.has_attr(&format!("{prefix}model")) {
        return None;
    }
    let bind_type = format!("{prefix}bind:type");
    let type_binding = match el.attr(":type").or_else(|| el.attr(&bind_type)) {
        Some(value) => parse_filters(value),
        None if !el.has_attr("type") => format!("({}).type", el.attr(&format!("{prefix}bind"))?),
        None => return None,
    };

    let if_attr = format!("{prefix}if");
    let else_attr = format!("{prefix}else");
    let else_if_attr = format!("{prefix}else-if");
    let if_condition = el.attr(&if_attr).map(str::to_string);
    let guard = if_condition
        .as_deref()
        .map(|c| format!("&&({c})"))
        .unwrap_or_default();

    let stripped = [":type", bind_type.as_str(), if_attr.as_str(), else_attr.as_str(), else_if_attr.as_str()];
    let base: Vec<Attr> = el
        .attrs_list
        .iter()
        .filter(|a| !stripped.contains(&a.name.as_str()))
        .cloned()
        .collect();
    let with = |extra: Attr| {
        let mut attrs = base.clone();
        attrs.push(extra);
        attrs
    };

    let branches = vec![
        Branch {
            attrs: with(Attr::new("type", "checkbox")),
            condition: Some(format!("({type_binding})==='checkbox'{guard}")),
        },
        Branch {
            attrs: with(Attr::new("type", "radio")),
            condition: Some(format!("({type_binding})==='radio'{guard}")),
        },
        Branch {
            attrs: with(Attr::new(":type", type_binding.clone())),
            condition: if_condition,
        },
    ];
    let link = if el.has_attr(&else_attr) {
        IfLink::Else
    } else if let Some(exp) = el.attr(&else_if_attr) {
        IfLink::ElseIf(exp.to_string())
    } else {
        IfLink::None
    };
    Some(Expansion { branches, link })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(attrs: &[(&str, &str)]) -> Element {
        Element::new("input", attrs.iter().map(|(n, v)| Attr::new(*n, *v)).collect())
    }

    #[test]
    fn static_type_is_left_alone() {
        assert!(expand_dynamic_type(&input(&[("r-model", "x"), ("type", "text")]), "r-").is_none());
        assert!(expand_dynamic_type(&input(&[(":type", "t")]), "r-").is_none());
    }

    #[test]
    fn dynamic_type_becomes_three_branches() {
        let el = input(&[("r-model", "x"), (":type", "t"), ("r-if", "ok")]);
        let expansion = expand_dynamic_type(&el, "r-").expect("expanded");
        assert_eq!(expansion.link, IfLink::None);
        let conditions: Vec<_> = expansion.branches.iter().map(|b| b.condition.clone()).collect();
        assert_eq!(
            conditions,
            vec![
                Some("(t)==='checkbox'&&(ok)".to_string()),
                Some("(t)==='radio'&&(ok)".to_string()),
                Some("ok".to_string()),
            ]
        );
        let names: Vec<_> = expansion.branches[2].attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["r-model", ":type"]);
    }

    #[test]
    fn object_bind_supplies_the_type() {
        let el = input(&[("r-model", "x"), ("r-bind", "opts"), ("r-else", "")]);
        let expansion = expand_dynamic_type(&el, "r-").expect("expanded");
        assert_eq!(expansion.link, IfLink::Else);
        assert_eq!(expansion.branches[0].condition.as_deref(), Some("((opts).type)==='checkbox'"));
    }
}
