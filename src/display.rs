// Presentation lookups - how sources, amounts and times are shown
//
// Kept apart from the entities so the stored data never carries display
// concerns. Amounts are always shown as USD.

use crate::entities::{Amount, Source};
use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;

/// Display attributes of one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStyle {
    pub label: String,
    /// Color name or `#rrggbb`
    pub color: String,
}

/// Lookup table: source -> display attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDisplayTable {
    styles: BTreeMap<Source, SourceStyle>,
}

impl SourceDisplayTable {
    /// Labels as shown in the "Where it's stored" picker
    pub fn with_defaults() -> Self {
        let defaults = [
            (Source::ApoalimStocks, "Apoalim stocks", "#4f86f7"),
            (Source::Binance, "Binance", "#f3ba2f"),
            (Source::KupatGemel, "Kupat", "#3cb371"),
            (Source::ApoalimUsd, "USD Appoalim", "#b07cd8"),
        ];

        let styles = defaults
            .into_iter()
            .map(|(source, label, color)| {
                (
                    source,
                    SourceStyle {
                        label: label.to_string(),
                        color: color.to_string(),
                    },
                )
            })
            .collect();

        SourceDisplayTable { styles }
    }

    /// Defaults with colors replaced from configuration
    pub fn with_color_overrides(overrides: &BTreeMap<Source, String>) -> Self {
        let mut table = Self::with_defaults();
        for (source, color) in overrides {
            if let Some(style) = table.styles.get_mut(source) {
                style.color = color.clone();
            }
        }
        table
    }

    pub fn style(&self, source: Source) -> &SourceStyle {
        // Every source is inserted by with_defaults
        &self.styles[&source]
    }

    pub fn label(&self, source: Source) -> &str {
        &self.style(source).label
    }

    pub fn color(&self, source: Source) -> &str {
        &self.style(source).color
    }
}

impl Default for SourceDisplayTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// `1234` -> `"$1,234.00"`
pub fn format_usd(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("${}.00", grouped)
}

/// Abbreviated date and short time in the local zone, e.g. `Jan 19, 2024 at 3:04 PM`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    format_timestamp_in(timestamp.with_timezone(&Local))
}

fn format_timestamp_in<Tz>(timestamp: DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%b %-d, %Y at %-I:%M %p").to_string()
}
