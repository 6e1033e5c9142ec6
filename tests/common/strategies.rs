use bizcore::models::IntervalGranularity;
use proptest::prelude::*;

pub fn granularity_strategy() -> impl Strategy<Value = IntervalGranularity> {
    prop_oneof![
        Just(IntervalGranularity::Day),
        Just(IntervalGranularity::Month),
        Just(IntervalGranularity::Year),
        Just(IntervalGranularity::None),
    ]
}

/// Prefixes and suffixes without digits, so the numeric part can be located
pub fn affix_strategy() -> impl Strategy<Value = String> {
    "[A-Z-]{0,5}"
}

/// Free text that does not start with a quick-search prefix
pub fn name_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{0,30}".prop_filter("no command prefix", |text| {
        let lower = text.trim().to_lowercase();
        !lower.starts_with("id:") && !lower.starts_with("code:")
    })
}
