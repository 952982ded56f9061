//! Keyword-driven spending category heuristics.

use crate::models::{Category, Direction};

use super::patterns::{CATEGORY_KEYWORDS, INCOME_KEYWORDS};

/// Classify free text against the ordered keyword table. First match wins;
/// no match is [`Category::Other`].
pub fn classify(text: &str) -> Category {
    match_keywords(text).unwrap_or(Category::Other)
}

/// Like [`classify`], but an unmatched credit whose text mentions salary,
/// interest or a refund is income.
pub fn classify_with_direction(text: &str, direction: Direction) -> Category {
    if let Some(category) = match_keywords(text) {
        return category;
    }

    let lower = text.to_lowercase();
    if direction == Direction::Credit && INCOME_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Income
    } else {
        Category::Other
    }
}

fn match_keywords(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| category.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_basic() {
        assert_eq!(classify("Swiggy order #123"), Category::Food);
        assert_eq!(classify("Uber ride"), Category::Transport);
        assert_eq!(classify("AMAZON.IN purchase"), Category::Shopping);
        assert_eq!(classify("Netflix subscription"), Category::Entertainment);
        assert_eq!(classify("random text"), Category::Other);
    }

    #[test]
    fn test_first_match_wins() {
        // Shopping and Food both present; Food comes first in the table.
        assert_eq!(classify("amazon fresh food"), Category::Food);
        // Transport outranks Entertainment.
        assert_eq!(classify("movie night uber"), Category::Transport);
    }

    #[test]
    fn test_income_only_for_credits() {
        assert_eq!(classify_with_direction("Salary credit", Direction::Credit), Category::Income);
        assert_eq!(classify_with_direction("Interest paid", Direction::Debit), Category::Other);
        assert_eq!(classify_with_direction("Refund from Zomato", Direction::Credit), Category::Food);
    }
}
