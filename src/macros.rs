/// Compile a regex literal once and hand out a `&'static Regex`.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __category_weight {
    () => {
        1.0
    };
    ($weight:expr) => {
        $weight
    };
}

/// Declare a [`CategoryDefinition`](crate::CategoryDefinition) in table form.
///
/// ```text
/// category! {
///     name: "evidence",
///     indicators: ["data", "measured", "observed"],
///     weight: 1.2,                                   // optional, default 1.0
///     bonuses: [BonusRule::contains("?", 0.1)],      // optional
/// }
/// ```
#[macro_export]
macro_rules! category {
    (
        name: $name:expr,
        indicators: [ $($indicator:expr),* $(,)? ]
        $(, weight: $weight:expr)?
        $(, bonuses: [ $($bonus:expr),* $(,)? ])?
        $(,)?
    ) => {{
        let indicators: ::std::vec::Vec<::std::string::String> = vec![ $( ::std::string::String::from($indicator) ),* ];
        let bonuses: ::std::vec::Vec<$crate::BonusRule> = vec![ $($($bonus),*)? ];
        $crate::CategoryDefinition::new($name, indicators, $crate::__category_weight!($($weight)?))
            .with_bonuses(bonuses)
    }};
}

#[cfg(test)]
mod tests {
    use crate::BonusRule;

    #[test]
    fn category_macro_defaults_weight_and_bonuses() {
        let def = category! {
            name: "plain",
            indicators: ["a", "b"],
        };
        assert_eq!(def.name(), "plain");
        assert_eq!(def.weight(), 1.0);
        assert!(def.bonus_rules().is_empty());
    }

    #[test]
    fn category_macro_accepts_weight_and_bonuses() {
        let def = category! {
            name: "rich",
            indicators: [],
            weight: 2.5,
            bonuses: [BonusRule::contains("!", 0.1), BonusRule::regex(regex!(r"\d").clone(), 0.05)],
        };
        assert_eq!(def.weight(), 2.5);
        assert!(def.folded_indicators().is_empty());
        assert_eq!(def.bonus_rules().len(), 2);
    }
}
