//! Pricing table and the pre-submission cost gate
//!
//! Every descriptor passes through `CostGuard::check_generation_cost`
//! before submission. Prices at or below the threshold proceed without
//! interaction; anything above requires an explicit yes from the operator.
//! A garbled or unanswered prompt counts as decline.

use crate::config::PricingConfig;
use std::collections::HashMap;
use std::io::BufRead;

/// Read-only mapping from model identifier to unit cost.
///
/// Lookup is strict on the exact model key; unknown models fall back to the
/// configured fallback price (0.0 by default, which always auto-proceeds).
#[derive(Debug, Clone)]
pub struct PricingTable {
    models: HashMap<String, f64>,
    fallback: f64,
}

impl PricingTable {
    pub fn new(models: HashMap<String, f64>, fallback: f64) -> Self {
        Self { models, fallback }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.models.clone(), config.fallback_price)
    }

    /// Unit cost for one generation with this model
    pub fn price_for(&self, model: &str) -> f64 {
        self.models.get(model).copied().unwrap_or(self.fallback)
    }

    /// Whether the model has an explicit price entry
    pub fn knows(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }
}

/// Interactive yes/no decision, injected so tests and `--yes` runs can
/// answer without a terminal
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Reads one line from stdin; only "y"/"yes" proceeds, everything else
/// (including EOF and read errors) declines
#[derive(Default)]
pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        println!("{} [y/N]", message);
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => {
                let answer = line.trim();
                answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
            }
        }
    }
}

/// Fixed answer, for `--yes` runs and tests
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        self.0
    }
}

/// The pre-submission price-check/confirmation gate
pub struct CostGuard<'a> {
    table: PricingTable,
    threshold: f64,
    prompt: &'a mut dyn ConfirmPrompt,
}

impl<'a> CostGuard<'a> {
    pub fn new(table: PricingTable, threshold: f64, prompt: &'a mut dyn ConfirmPrompt) -> Self {
        Self {
            table,
            threshold,
            prompt,
        }
    }

    /// Returns true when generation with this model may proceed.
    ///
    /// Always prints cost information; suspends for confirmation only when
    /// the unit price exceeds the threshold.
    pub fn check_generation_cost(&mut self, model: &str) -> bool {
        let price = self.table.price_for(model);

        if self.table.knows(model) {
            println!("  cost: {} at ${:.2} per generation", model, price);
        } else {
            println!(
                "  cost: {} not in pricing table, assuming ${:.2}",
                model, price
            );
        }

        if price <= self.threshold {
            return true;
        }

        self.prompt.confirm(&format!(
            "  ${:.2} exceeds the ${:.2} confirmation threshold for {}. Proceed?",
            price, self.threshold, model
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, f64)], fallback: f64) -> PricingTable {
        let models = entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        PricingTable::new(models, fallback)
    }

    /// Records whether the prompt was consulted at all
    struct CountingConfirm {
        answer: bool,
        asked: usize,
    }

    impl ConfirmPrompt for CountingConfirm {
        fn confirm(&mut self, _message: &str) -> bool {
            self.asked += 1;
            self.answer
        }
    }

    #[test]
    fn test_below_threshold_no_prompt() {
        let mut confirm = CountingConfirm {
            answer: false,
            asked: 0,
        };
        let mut guard = CostGuard::new(table(&[("cheap", 0.05)], 0.0), 0.50, &mut confirm);
        assert!(guard.check_generation_cost("cheap"));
        assert_eq!(confirm.asked, 0);
    }

    #[test]
    fn test_above_threshold_returns_operator_decision() {
        let mut accept = CountingConfirm {
            answer: true,
            asked: 0,
        };
        let mut guard = CostGuard::new(table(&[("pricey", 2.0)], 0.0), 0.50, &mut accept);
        assert!(guard.check_generation_cost("pricey"));
        assert_eq!(accept.asked, 1);

        let mut decline = CountingConfirm {
            answer: false,
            asked: 0,
        };
        let mut guard = CostGuard::new(table(&[("pricey", 2.0)], 0.0), 0.50, &mut decline);
        assert!(!guard.check_generation_cost("pricey"));
        assert_eq!(decline.asked, 1);
    }

    #[test]
    fn test_unknown_model_uses_fallback() {
        let mut confirm = CountingConfirm {
            answer: false,
            asked: 0,
        };
        // Fallback 0.0: unknown models auto-proceed
        let mut guard = CostGuard::new(table(&[], 0.0), 0.50, &mut confirm);
        assert!(guard.check_generation_cost("never-seen"));
        assert_eq!(confirm.asked, 0);

        // High fallback forces confirmation even for unknown models
        let mut guard = CostGuard::new(table(&[], 5.0), 0.50, &mut confirm);
        assert!(!guard.check_generation_cost("never-seen"));
        assert_eq!(confirm.asked, 1);
    }

    #[test]
    fn test_exact_threshold_proceeds() {
        let mut confirm = CountingConfirm {
            answer: false,
            asked: 0,
        };
        let mut guard = CostGuard::new(table(&[("edge", 0.50)], 0.0), 0.50, &mut confirm);
        assert!(guard.check_generation_cost("edge"));
        assert_eq!(confirm.asked, 0);
    }

    #[test]
    fn test_strict_lookup_no_substring_match() {
        let t = table(&[("fal-ai/flux-pro/v1.1", 0.05)], 0.9);
        // A prefix of a known key must not match
        assert_eq!(t.price_for("fal-ai/flux-pro"), 0.9);
        assert!(!t.knows("fal-ai/flux-pro"));
    }
}
