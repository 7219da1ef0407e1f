/// Registry of all available lint rules
use crate::rules::{
    DeprecatedFieldsRuleImpl, DuplicateLabelsRuleImpl, DuplicateNamesRuleImpl,
    NameMatchesFolderRuleImpl, NavigationPanelRuleImpl, NoopMacrosRuleImpl,
    RegexExcludesRuleImpl, RelativePathsRuleImpl, TemplateContentsRuleImpl,
    UnknownVariablesRuleImpl, VariableTypesRuleImpl,
};
use crate::traits::TemplateLintRule;
use std::sync::{Arc, LazyLock};

/// Lazily initialized rule list, in fixed execution order.
/// Rules are created once and reused across all calls.
static TEMPLATE_RULES: LazyLock<Vec<Arc<dyn TemplateLintRule>>> = LazyLock::new(|| {
    vec![
        Arc::new(TemplateContentsRuleImpl),
        Arc::new(RelativePathsRuleImpl),
        Arc::new(DuplicateLabelsRuleImpl),
        Arc::new(NameMatchesFolderRuleImpl),
        Arc::new(DeprecatedFieldsRuleImpl),
        Arc::new(DuplicateNamesRuleImpl),
        Arc::new(NoopMacrosRuleImpl),
        Arc::new(UnknownVariablesRuleImpl),
        Arc::new(VariableTypesRuleImpl),
        Arc::new(RegexExcludesRuleImpl),
        Arc::new(NavigationPanelRuleImpl),
    ]
});

#[must_use]
pub fn template_rules() -> &'static [Arc<dyn TemplateLintRule>] {
    &TEMPLATE_RULES
}

#[must_use]
pub fn all_rule_names() -> Vec<&'static str> {
    let mut names: Vec<_> = template_rules().iter().map(|rule| rule.name()).collect();
    names.sort_unstable();
    names
}
