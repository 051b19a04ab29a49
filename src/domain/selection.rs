// User-selectable dashboard parameters
use serde::{Deserialize, Serialize};

/// A dropdown option: provider code plus a human label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub code: String,
    pub name: String,
}

impl Choice {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    /// Dropdown label, e.g. "New York (US-NY)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }

    pub fn find<'a>(choices: &'a [Choice], code: &str) -> Option<&'a Choice> {
        choices.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }
}

/// Bounds of the "number of observations" slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsSlider {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl Default for ResultsSlider {
    fn default() -> Self {
        Self {
            min: 10,
            max: 200,
            step: 10,
            default: 60,
        }
    }
}

impl ResultsSlider {
    /// Clamp into `[min, max]` and snap down to the nearest step mark.
    pub fn clamp(&self, requested: Option<u32>) -> u32 {
        let value = requested.unwrap_or(self.default).clamp(self.min, self.max);
        if self.step == 0 {
            return value;
        }
        let snapped = self.min + (value - self.min) / self.step * self.step;
        snapped.max(self.min)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirdSelection {
    pub region: Choice,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSelection {
    pub symbol: Choice,
}
