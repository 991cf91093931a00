//! Selector components driven through the runtime.

#[cfg(test)]
mod tests {
    use terrace::{
        component::{RunloopOptions, run},
        error::Result,
        testing::ScriptedTerminal,
        widgets::{Selector, SelectorComponent, SelectorItem},
    };

    fn fruit() -> Vec<SelectorItem<&'static str>> {
        ["apple", "banana", "cherry", "damson", "elderberry", "fig", "grape"]
            .into_iter()
            .map(|n| SelectorItem::new(n, n))
            .collect()
    }

    #[test]
    fn single_pick_with_arrows() -> Result<()> {
        let sel = Selector::single("fruit", fruit()).with_max_items(3)?;
        let mut c = SelectorComponent::new(sel);
        // Down twice, up once, enter.
        let mut term = ScriptedTerminal::new(6, 40, "\x1b[B\x1b[B\x1b[A\r")?;
        let got = run(&mut c, &mut term, &RunloopOptions::default())?;
        assert_eq!(got, vec!["banana"]);
        assert_eq!(
            term.last_frame().map(|f| f[0].trim_end().to_string()),
            Some("? fruit banana".into())
        );
        assert!(!term.is_raw());
        Ok(())
    }

    #[test]
    fn multi_pick_with_filter() -> Result<()> {
        let sel = Selector::multi("fruit", fruit());
        let mut c = SelectorComponent::new(sel);
        // Select apple, filter to "an", select banana, clear the filter, exit.
        let mut term = ScriptedTerminal::new(8, 40, " an \x7f\x7f\r")?;
        let got = run(&mut c, &mut term, &RunloopOptions::default())?;
        assert_eq!(got, vec!["apple", "banana"]);
        Ok(())
    }

    #[test]
    fn renders_window() -> Result<()> {
        let sel = Selector::multi("fruit", fruit()).with_max_items(3)?;
        let mut c = SelectorComponent::new(sel);
        let mut term = ScriptedTerminal::new(5, 40, " \x05")?;
        run(&mut c, &mut term, &RunloopOptions::default())?;
        let frame: Vec<String> = term
            .last_frame()
            .map(|f| f.iter().map(|l| l.trim_end().to_string()).collect())
            .unwrap_or_default();
        assert_eq!(frame[1], "  [x] apple");
        assert_eq!(frame[2], "> [ ] banana");
        assert_eq!(frame[3], "  [ ] cherry");
        assert_eq!(frame[4], "");
        assert!(term.last_cursor().is_some());
        Ok(())
    }

    #[test]
    fn ctrl_keys_scroll() -> Result<()> {
        let sel = Selector::single("fruit", fruit()).with_max_items(3)?;
        let mut c = SelectorComponent::new(sel);
        // Ctrl-Y from the top wraps to the last item.
        let mut term = ScriptedTerminal::new(5, 40, "\x19\r")?;
        let got = run(&mut c, &mut term, &RunloopOptions::default())?;
        assert_eq!(got, vec!["grape"]);
        Ok(())
    }
}
