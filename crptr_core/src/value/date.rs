use super::ValueCorruptor;
use crate::error::ConfigError;
use rand::Rng;
use rand_core::RngCore;
use serde::Deserialize;

const FULL_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ABBR_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Order of the three components in a date value.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    #[serde(rename = "dd-mm-yyyy")]
    DayMonthYear,
    #[serde(rename = "mm-dd-yyyy")]
    MonthDayYear,
    #[serde(rename = "yyyy-mm-dd")]
    YearMonthDay,
}

impl DateOrder {
    /// Component stored at each position of the date string.
    fn layout(self) -> [DateComponent; 3] {
        use DateComponent::*;
        match self {
            DateOrder::DayMonthYear => [Day, Month, Year],
            DateOrder::MonthDayYear => [Month, Day, Year],
            DateOrder::YearMonthDay => [Year, Month, Day],
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateComponent {
    Day,
    Month,
    Year,
}

impl DateComponent {
    fn index(self) -> usize {
        match self {
            DateComponent::Day => 0,
            DateComponent::Month => 1,
            DateComponent::Year => 2,
        }
    }

    fn others(self) -> [DateComponent; 2] {
        match self {
            DateComponent::Day => [DateComponent::Month, DateComponent::Year],
            DateComponent::Month => [DateComponent::Day, DateComponent::Year],
            DateComponent::Year => [DateComponent::Day, DateComponent::Month],
        }
    }

    fn render(self, number: i64) -> String {
        match self {
            DateComponent::Day | DateComponent::Month => format!("{:02}", number),
            DateComponent::Year => number.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateMethod {
    /// Add 1 to 10 to the component.
    Add,
    /// Subtract 1 to 10; day and month never drop below 1.
    Decline,
    /// Set day and month to the first.
    First,
    /// Replace the component with a random plausible value.
    Random,
    /// Exchange the raw text of the component with another component.
    SwapComp,
    /// Transpose two digits inside the component.
    SwapDigit,
    FullMonth,
    AbbrMonth,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct DateConfig {
    pub date_order: DateOrder,
    pub separator: String,
    pub components_to_modify: Vec<DateComponent>,
    pub date_corruption_methods: Vec<DateMethod>,
}

/// Corrupts one component of a delimited date such as `03-11-1892`.
///
/// Values that do not split into exactly three parts, and numeric methods
/// applied to a non-numeric component, leave the value unchanged.
#[derive(Debug, Clone)]
pub struct DateCorruptor {
    order: DateOrder,
    separator: String,
    components: Vec<DateComponent>,
    methods: Vec<DateMethod>,
}

impl DateCorruptor {
    pub fn new(config: DateConfig) -> Result<Self, ConfigError> {
        if config.separator.is_empty() {
            return Err(ConfigError::invalid(
                "separator",
                "date separator must not be empty",
            ));
        }
        if config.components_to_modify.is_empty() {
            return Err(ConfigError::invalid(
                "components_to_modify",
                "at least one date component is required",
            ));
        }
        if config.date_corruption_methods.is_empty() {
            return Err(ConfigError::invalid(
                "date_corruption_methods",
                "at least one date corruption method is required",
            ));
        }
        Ok(Self {
            order: config.date_order,
            separator: config.separator,
            components: config.components_to_modify,
            methods: config.date_corruption_methods,
        })
    }

    /// Splits `value` into `[day, month, year]`, zero padded.
    fn split(&self, value: &str) -> Option<[String; 3]> {
        let parts: Vec<&str> = value.split(self.separator.as_str()).collect();
        if parts.len() != 3 {
            return None;
        }
        let mut fields: [String; 3] = Default::default();
        for (component, part) in self.order.layout().into_iter().zip(parts) {
            let width = if component == DateComponent::Year { 4 } else { 2 };
            fields[component.index()] = format!("{:0>width$}", part, width = width);
        }
        Some(fields)
    }

    fn join(&self, fields: &[String; 3]) -> String {
        self.order
            .layout()
            .iter()
            .map(|c| fields[c.index()].as_str())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

impl ValueCorruptor for DateCorruptor {
    fn name(&self) -> &str {
        "Date"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let Some(mut fields) = self.split(value) else {
            return value.to_string();
        };

        let component = self.components[rng.random_range(0..self.components.len())];
        let method = self.methods[rng.random_range(0..self.methods.len())];
        let step: i64 = rng.random_range(1..=10);
        let idx = component.index();

        match method {
            DateMethod::Add | DateMethod::Decline => {
                let Ok(current) = fields[idx].parse::<i64>() else {
                    return value.to_string();
                };
                let updated = match (method, component) {
                    (DateMethod::Add, _) => current + step,
                    (_, DateComponent::Year) => current - step,
                    _ => (current - step).max(1),
                };
                fields[idx] = component.render(updated);
            }
            DateMethod::First => {
                fields[DateComponent::Day.index()] = "01".to_string();
                fields[DateComponent::Month.index()] = "01".to_string();
            }
            DateMethod::Random => {
                let updated = match component {
                    DateComponent::Day => rng.random_range(1..=30),
                    DateComponent::Month => rng.random_range(1..=12),
                    DateComponent::Year => rng.random_range(1750..=2100),
                };
                fields[idx] = component.render(updated);
            }
            DateMethod::SwapComp => {
                let other = component.others()[rng.random_range(0..2)];
                fields.swap(idx, other.index());
            }
            DateMethod::SwapDigit => {
                let mut digits: Vec<char> = fields[idx].chars().collect();
                if digits.len() < 2 {
                    return value.to_string();
                }
                let first = rng.random_range(0..digits.len());
                let mut second = rng.random_range(0..digits.len() - 1);
                if second >= first {
                    second += 1;
                }
                digits.swap(first, second);
                fields[idx] = digits.into_iter().collect();
            }
            DateMethod::FullMonth | DateMethod::AbbrMonth => {
                let month_idx = DateComponent::Month.index();
                let Ok(month) = fields[month_idx].parse::<i64>() else {
                    return value.to_string();
                };
                let names = if method == DateMethod::FullMonth {
                    &FULL_MONTHS
                } else {
                    &ABBR_MONTHS
                };
                fields[month_idx] = match usize::try_from(month - 1).ok().and_then(|m| names.get(m)) {
                    Some(name) => name.to_string(),
                    None => month.to_string(),
                };
            }
        }
        self.join(&fields)
    }
}
