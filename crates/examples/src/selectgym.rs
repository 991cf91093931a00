use terrace::{
    error::Result,
    widgets::{Selector, SelectorComponent, SelectorItem},
};

/// Options for building the gym's selector.
#[derive(Debug, Clone, Default)]
pub struct SelectGymOptions {
    /// Pick several items instead of one.
    pub multi: bool,
    /// Visible rows, if not the default.
    pub max_items: Option<usize>,
    /// Item to show under the cursor initially.
    pub default: Option<String>,
}

/// The items on offer. Durian is out of season, so it cannot be selected
/// in multi mode.
pub fn fruit() -> Vec<SelectorItem<String>> {
    [
        "apple",
        "banana",
        "cherry",
        "damson",
        "durian",
        "elderberry",
        "fig",
        "grape",
        "honeydew",
        "kiwi",
        "lemon",
        "mango",
    ]
    .into_iter()
    .map(|n| SelectorItem::new(n, n.to_string()).with_enabled(n != "durian"))
    .collect()
}

/// Build the selector component.
pub fn build(opts: &SelectGymOptions) -> Result<SelectorComponent<String>> {
    let mut sel = if opts.multi {
        Selector::multi("Pick some fruit", fruit())
    } else {
        Selector::single("Pick a fruit", fruit())
    };
    if let Some(n) = opts.max_items {
        sel = sel.with_max_items(n)?;
    }
    if let Some(d) = &opts.default {
        sel = sel.with_default_expose(d.as_str());
    }
    Ok(SelectorComponent::new(sel))
}

/// A one-line description of the outcome.
pub fn summary(picked: &[String]) -> String {
    match picked {
        [] => "nothing picked".into(),
        [one] => format!("picked {one}"),
        many => format!("picked {} fruit: {}", many.len(), many.join(", ")),
    }
}
