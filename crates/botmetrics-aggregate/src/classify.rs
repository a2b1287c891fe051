//! Metric classification table: decides how each metric is reduced and derived.

use crate::names;
use serde::{Deserialize, Serialize};

/// How a metric combines across raw points and across periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Running sum (the default)
    Sum,
    /// Largest observed value
    Maximum,
    /// Ratio of two summed metrics, expressed in percent
    Percentage,
    /// Ratio of two summed metrics
    Average,
}

impl MetricKind {
    /// Whether the metric is computed from other metrics rather than read from raw input.
    pub const fn is_derived(&self) -> bool {
        matches!(self, MetricKind::Percentage | MetricKind::Average)
    }
}

/// Name pattern matched by a classification rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricPattern {
    /// Whole metric name
    Exact(String),
    /// Leading part of the metric name
    Prefix(String),
}

impl MetricPattern {
    fn matches(&self, name: &str) -> bool {
        match self {
            MetricPattern::Exact(exact) => name == exact,
            MetricPattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Names this rule applies to
    pub pattern: MetricPattern,
    /// Kind assigned on match
    pub kind: MetricKind,
}

/// A derived metric defined as `round(numerator / denominator * scale) / 100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioDefinition {
    /// Name of the derived metric
    pub name: String,
    /// Summed metric on top
    pub numerator: String,
    /// Summed metric below
    pub denominator: String,
    /// Pre-rounding multiplier: 10 000 yields a two-decimal percentage, 100 a two-decimal ratio
    pub scale: f64,
}

impl RatioDefinition {
    /// Creates a ratio definition.
    pub fn new(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
        scale: f64,
    ) -> Self {
        Self {
            name: name.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
            scale,
        }
    }

    /// Evaluates the ratio; a zero denominator yields 0.
    pub fn compute(&self, numerator: f64, denominator: f64) -> f64 {
        if denominator == 0.0 {
            return 0.0;
        }
        // f64::round is half away from zero
        (numerator / denominator * self.scale).round() / 100.0
    }
}

/// Ordered rule table plus the derived-metric formulas. First matching rule wins.
#[derive(Debug, Clone)]
pub struct MetricClassifier {
    rules: Vec<ClassificationRule>,
    ratios: Vec<RatioDefinition>,
}

impl Default for MetricClassifier {
    fn default() -> Self {
        let ratios = vec![
            RatioDefinition::new(
                names::CLICK_THROUGH_RATE,
                names::USER_CONSENTED_SESSIONS,
                names::TOTAL_UNIQUE_SESSIONS,
                10_000.0,
            ),
            RatioDefinition::new(
                names::AVG_MESSAGES_PER_CHAT_SESSION,
                names::TOTAL_CHAT_MESSAGES,
                names::ACTIVE_CHAT_SESSIONS,
                100.0,
            ),
            RatioDefinition::new(
                names::AVG_SESSION_DURATION_MINUTES,
                names::TOTAL_ENGAGEMENT_MINUTES,
                names::ACTIVE_CHAT_SESSIONS,
                100.0,
            ),
        ];
        let rules = vec![
            ClassificationRule {
                pattern: MetricPattern::Exact(names::CLICK_THROUGH_RATE.to_string()),
                kind: MetricKind::Percentage,
            },
            ClassificationRule {
                pattern: MetricPattern::Exact(names::AVG_MESSAGES_PER_CHAT_SESSION.to_string()),
                kind: MetricKind::Average,
            },
            ClassificationRule {
                pattern: MetricPattern::Exact(names::AVG_SESSION_DURATION_MINUTES.to_string()),
                kind: MetricKind::Average,
            },
            ClassificationRule {
                pattern: MetricPattern::Prefix(names::MAXIMUM_PREFIX.to_string()),
                kind: MetricKind::Maximum,
            },
        ];
        Self { rules, ratios }
    }
}

impl MetricClassifier {
    /// A classifier with no rules: every metric sums, nothing is derived.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            ratios: Vec::new(),
        }
    }

    /// Appends a rule after the existing ones.
    pub fn with_rule(mut self, pattern: MetricPattern, kind: MetricKind) -> Self {
        self.rules.push(ClassificationRule { pattern, kind });
        self
    }

    /// Adds a derived metric, classified as `kind` ahead of every existing rule.
    pub fn with_ratio(mut self, ratio: RatioDefinition, kind: MetricKind) -> Self {
        self.rules.insert(
            0,
            ClassificationRule {
                pattern: MetricPattern::Exact(ratio.name.clone()),
                kind,
            },
        );
        self.ratios.push(ratio);
        self
    }

    /// Kind of `name`; [`MetricKind::Sum`] when no rule matches.
    pub fn classify(&self, name: &str) -> MetricKind {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(name))
            .map_or(MetricKind::Sum, |rule| rule.kind)
    }

    /// Formula for a derived metric.
    pub fn ratio(&self, name: &str) -> Option<&RatioDefinition> {
        self.ratios.iter().find(|ratio| ratio.name == name)
    }

    /// Every derived metric, in definition order.
    pub fn ratios(&self) -> &[RatioDefinition] {
        &self.ratios
    }

    /// The rule table, in match order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let classifier = MetricClassifier::default();
        assert_eq!(classifier.classify("Max active sessions"), MetricKind::Maximum);
        assert_eq!(classifier.classify(names::MAX_SESSION_DURATION_MINUTES), MetricKind::Maximum);
        assert_eq!(classifier.classify(names::CLICK_THROUGH_RATE), MetricKind::Percentage);
        assert_eq!(classifier.classify(names::AVG_MESSAGES_PER_CHAT_SESSION), MetricKind::Average);
        assert_eq!(classifier.classify(names::AVG_SESSION_DURATION_MINUTES), MetricKind::Average);
        assert_eq!(classifier.classify(names::TOTAL_UNIQUE_SESSIONS), MetricKind::Sum);
        // prefix is case and space sensitive
        assert_eq!(classifier.classify("Maximum sessions"), MetricKind::Sum);
        assert_eq!(classifier.classify("max active sessions"), MetricKind::Sum);
    }

    #[test]
    fn test_every_derived_kind_has_a_formula() {
        let classifier = MetricClassifier::default();
        for rule in classifier.rules() {
            if let (MetricPattern::Exact(name), true) = (&rule.pattern, rule.kind.is_derived()) {
                assert!(classifier.ratio(name).is_some(), "{name} has no formula");
            }
        }
        assert_eq!(classifier.ratios().len(), 3);
    }

    #[test]
    fn test_ratio_rounding() {
        let ctr = MetricClassifier::default();
        let ctr = ctr.ratio(names::CLICK_THROUGH_RATE).unwrap();
        assert_eq!(ctr.compute(15.0, 30.0), 50.0);
        assert_eq!(ctr.compute(1.0, 3.0), 33.33);
        assert_eq!(ctr.compute(2.0, 3.0), 66.67);
        assert_eq!(ctr.compute(5.0, 0.0), 0.0);

        let avg = RatioDefinition::new("avg", "n", "d", 100.0);
        assert_eq!(avg.compute(10.0, 4.0), 2.5);
        assert_eq!(avg.compute(1.0, 8.0), 0.13); // 12.5 rounds away from zero
        assert_eq!(avg.compute(-1.0, 8.0), -0.13);
    }

    #[test]
    fn test_custom_rules() {
        let classifier = MetricClassifier::empty()
            .with_rule(MetricPattern::Prefix("Peak ".into()), MetricKind::Maximum)
            .with_ratio(RatioDefinition::new("Conversion", "Won", "Leads", 10_000.0), MetricKind::Percentage);

        assert_eq!(classifier.classify("Peak concurrency"), MetricKind::Maximum);
        assert_eq!(classifier.classify("Max active sessions"), MetricKind::Sum);
        assert_eq!(classifier.classify("Conversion"), MetricKind::Percentage);
        assert_eq!(classifier.ratio("Conversion").unwrap().denominator, "Leads");
    }
}
