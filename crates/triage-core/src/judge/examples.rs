use crate::errors::{TriageError, TriageResult};
use crate::model::Category;
use std::collections::BTreeMap;

pub const MIN_EXAMPLES: usize = 3;

const URGENT: &[&str] = &[
    "Thank you for your urgent message. We are addressing this immediately and will respond as soon as possible.",
    "We've received your urgent request and are prioritizing it. Our team is on it right away.",
    "This urgent matter has our immediate attention. We'll respond promptly.",
];

const NORMAL: &[&str] = &[
    "Thank you for your email. We'll review it and get back to you within 24-48 hours.",
    "We've received your message and will respond soon. Thank you for reaching out.",
    "Thank you for contacting us. We'll process your request and respond shortly.",
    "Thank you for the update. I will review the information and follow up as needed.",
    "Thank you for the update on the project status. I will review and follow up by the end of the week.",
    "Thanks for sharing this update. We'll review and respond accordingly.",
];

const SPAM: &[&str] = &[
    "This message has been flagged as spam and filtered.",
    "This email has been identified as promotional content.",
    "This message has been marked as spam.",
];

/// Exemplar replies per category; the baseline the judge compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceExamples {
    sets: BTreeMap<Category, Vec<String>>,
}

impl Default for ReferenceExamples {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ReferenceExamples {
    pub fn defaults() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let sets = BTreeMap::from([
            (Category::Urgent, owned(URGENT)),
            (Category::Normal, owned(NORMAL)),
            (Category::Spam, owned(SPAM)),
        ]);
        Self { sets }
    }

    pub fn new(sets: BTreeMap<Category, Vec<String>>) -> TriageResult<Self> {
        for (category, examples) in &sets {
            check_set(*category, examples)?;
        }
        Ok(Self { sets })
    }

    /// Replaces the sets named in `overrides`; other categories keep their current examples.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<Category, Vec<String>>,
    ) -> TriageResult<Self> {
        for (category, examples) in overrides {
            check_set(*category, examples)?;
            self.sets.insert(*category, examples.clone());
        }
        Ok(self)
    }

    pub fn get(&self, category: Category) -> Option<&[String]> {
        self.sets.get(&category).map(Vec::as_slice)
    }

    pub fn for_label(&self, label: &str) -> TriageResult<(Category, &[String])> {
        let category: Category = label.parse()?;
        let examples = self
            .get(category)
            .ok_or_else(|| TriageError::UnknownCategory(label.to_string()))?;
        Ok((category, examples))
    }
}

fn check_set(category: Category, examples: &[String]) -> TriageResult<()> {
    if examples.len() < MIN_EXAMPLES {
        return Err(TriageError::Config(format!(
            "reference examples for '{}' need at least {} entries, got {}",
            category,
            MIN_EXAMPLES,
            examples.len()
        )));
    }
    if examples.iter().any(|e| e.trim().is_empty()) {
        return Err(TriageError::Config(format!(
            "reference examples for '{}' contain a blank entry",
            category
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_enough_defaults() {
        let ex = ReferenceExamples::defaults();
        for category in Category::ALL {
            let set = ex.get(category).unwrap();
            assert!(set.len() >= MIN_EXAMPLES, "{} has {}", category, set.len());
        }
        assert_eq!(ex.get(Category::Normal).unwrap().len(), 6);
        assert_eq!(
            ex.get(Category::Spam).unwrap()[2],
            "This message has been marked as spam."
        );
    }

    #[test]
    fn overrides_replace_only_named_categories() {
        let overrides = BTreeMap::from([(
            Category::Spam,
            vec!["Junk.".to_string(), "Filtered.".to_string(), "Blocked.".to_string()],
        )]);
        let ex = ReferenceExamples::defaults()
            .with_overrides(&overrides)
            .unwrap();
        assert_eq!(ex.get(Category::Spam).unwrap()[0], "Junk.");
        assert_eq!(ex.get(Category::Urgent).unwrap().len(), 3);
    }

    #[test]
    fn short_or_blank_sets_are_rejected() {
        let short = BTreeMap::from([(Category::Urgent, vec!["a".to_string(), "b".to_string()])]);
        assert!(ReferenceExamples::new(short).is_err());

        let blank = BTreeMap::from([(
            Category::Urgent,
            vec!["a".to_string(), " ".to_string(), "c".to_string()],
        )]);
        assert!(ReferenceExamples::defaults().with_overrides(&blank).is_err());
    }

    #[test]
    fn lookup_by_label() {
        let ex = ReferenceExamples::defaults();
        let (category, set) = ex.for_label("URGENT").unwrap();
        assert_eq!(category, Category::Urgent);
        assert_eq!(set.len(), 3);

        let err = ex.for_label("newsletter").unwrap_err();
        assert!(matches!(err, TriageError::UnknownCategory(_)));

        let partial = ReferenceExamples::new(BTreeMap::from([(
            Category::Spam,
            vec!["x".to_string(), "y".to_string(), "z".to_string()],
        )]))
        .unwrap();
        assert!(matches!(
            partial.for_label("normal"),
            Err(TriageError::UnknownCategory(_))
        ));
    }
}
