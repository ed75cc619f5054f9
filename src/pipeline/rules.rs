//! Rule tables for categorising and prioritising support messages.
//!
//! Both engines hold an explicit, ordered list of rule groups. The first
//! group that matches wins, so list order is the tie-break contract:
//! - Categories: Billing → Bug → Feature Request → General (fallback)
//! - Priorities: High → Low → Medium (fallback)
//!
//! Category rules use whole-word matching for keywords plus substring
//! matching for multi-word phrases. Priority rules use substring matching
//! only, so "crash" also fires on "crashes" and "crashed".

use std::sync::LazyLock;

use tracing::debug;

use crate::pipeline::matcher::{WordSet, contains_any_phrase};
use crate::pipeline::types::{Category, Priority};

static CATEGORISER: LazyLock<Categoriser> = LazyLock::new(Categoriser::default_rules);
static PRIORITISER: LazyLock<Prioritiser> = LazyLock::new(Prioritiser::default_rules);

/// Assign a category to a message body using the default rules.
pub fn categorise(body: &str) -> Category {
    CATEGORISER.categorise(body)
}

/// Assign a priority to a message body using the default rules.
pub fn prioritise(body: &str) -> Priority {
    PRIORITISER.prioritise(body)
}

// ── Categoriser ─────────────────────────────────────────────────────

/// One category rule group: any word or any phrase selects `category`.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    /// Whole-word keywords.
    pub words: WordSet,
    /// Substring phrases (already lower-case).
    pub phrases: &'static [&'static str],
}

impl CategoryRule {
    fn matches(&self, text: &str) -> bool {
        self.words.matches(text) || contains_any_phrase(text, self.phrases)
    }
}

/// Ordered category rules with a fallback.
pub struct Categoriser {
    rules: Vec<CategoryRule>,
    fallback: Category,
}

impl Categoriser {
    /// The built-in rule set.
    pub fn default_rules() -> Self {
        let rules = vec![
            // Billing is checked first: "charged" + "error" is a billing issue.
            CategoryRule {
                category: Category::Billing,
                words: WordSet::new(&[
                    "invoice",
                    "charged",
                    "charge",
                    "billing",
                    "payment",
                    "refund",
                    "subscription",
                    "renewal",
                    "card",
                ])
                .expect("billing keywords compile"),
                phrases: &[],
            },
            CategoryRule {
                category: Category::Bug,
                words: WordSet::new(&[
                    "crash", "crashes", "crashing", "bug", "error", "broken", "fails", "failed",
                ])
                .expect("bug keywords compile"),
                phrases: &["not working"],
            },
            // Never a bare "add" here; it would match "address".
            CategoryRule {
                category: Category::FeatureRequest,
                words: WordSet::new(&["request", "support", "suggestion", "integration"])
                    .expect("feature keywords compile"),
                phrases: &[
                    "feature request",
                    "support for",
                    "would be nice",
                    "please add",
                    "can you add",
                    "could you add",
                    "dark mode",
                ],
            },
        ];

        Self {
            rules,
            fallback: Category::General,
        }
    }

    /// Evaluate the rules in order against the lower-cased body.
    pub fn categorise(&self, body: &str) -> Category {
        let text = body.to_lowercase();
        for rule in &self.rules {
            if rule.matches(&text) {
                debug!(category = %rule.category, "Message matched category rule");
                return rule.category;
            }
        }
        self.fallback
    }
}

// ── Prioritiser ─────────────────────────────────────────────────────

/// One priority signal group: any substring selects `priority`.
#[derive(Debug, Clone)]
pub struct PriorityRule {
    pub priority: Priority,
    /// Substring signals (already lower-case).
    pub signals: &'static [&'static str],
}

/// Ordered priority rules with a fallback.
pub struct Prioritiser {
    rules: Vec<PriorityRule>,
    fallback: Priority,
}

impl Prioritiser {
    /// The built-in rule set.
    pub fn default_rules() -> Self {
        const HIGH: &[&str] = &[
            "urgent",
            "asap",
            "can't access",
            "cannot access",
            // U+2019 apostrophe decoded as Windows-1252. Alias only; do not
            // add further mojibake variants here.
            "can\u{e2}\u{20ac}\u{2122}t access",
            "locked out",
            "crash",
            "crashing",
            "charged twice",
            "double charged",
            "payment failed",
        ];
        const LOW: &[&str] = &[
            "would be nice",
            "suggestion",
            "nice to have",
            "not urgent",
            "when you get a chance",
        ];

        Self {
            rules: vec![
                PriorityRule {
                    priority: Priority::High,
                    signals: HIGH,
                },
                PriorityRule {
                    priority: Priority::Low,
                    signals: LOW,
                },
            ],
            fallback: Priority::Medium,
        }
    }

    /// Evaluate the signal groups in order against the lower-cased body.
    pub fn prioritise(&self, body: &str) -> Priority {
        let text = body.to_lowercase();
        for rule in &self.rules {
            if contains_any_phrase(&text, rule.signals) {
                debug!(priority = %rule.priority, "Message matched priority signal");
                return rule.priority;
            }
        }
        self.fallback
    }
}
