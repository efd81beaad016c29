use std::collections::HashSet;

use thiserror::Error;

use crate::error::ApiError;
use crate::models::IngredientAmount;

/// Invariant failures for a recipe write payload. All of these are checked
/// before any row is written.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RecipeValidationError {
    #[error("at least one tag is required")]
    EmptyTagSet,
    #[error("at least one ingredient is required")]
    EmptyIngredientSet,
    #[error("ingredient {ingredient_id} is listed more than once")]
    DuplicateIngredient { ingredient_id: i64 },
    #[error("amount for ingredient {ingredient_id} must be at least 1, got {amount}")]
    InvalidAmount { ingredient_id: i64, amount: i32 },
    #[error("cooking time must be at least 1 minute, got {value}")]
    InvalidCookingTime { value: i32 },
}

impl RecipeValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            RecipeValidationError::EmptyTagSet => "tags",
            RecipeValidationError::EmptyIngredientSet
            | RecipeValidationError::DuplicateIngredient { .. }
            | RecipeValidationError::InvalidAmount { .. } => "ingredients",
            RecipeValidationError::InvalidCookingTime { .. } => "cooking_time",
        }
    }
}

impl From<RecipeValidationError> for ApiError {
    fn from(err: RecipeValidationError) -> Self {
        ApiError::validation(err.field(), err.to_string())
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SubscriptionValidationError {
    #[error("you cannot subscribe to yourself")]
    SelfSubscription,
    #[error("you are already subscribed to this author")]
    DuplicateSubscription,
}

impl From<SubscriptionValidationError> for ApiError {
    fn from(err: SubscriptionValidationError) -> Self {
        match err {
            SubscriptionValidationError::SelfSubscription => {
                ApiError::validation("author", err.to_string())
            }
            // Duplicates share the toggle-action conflict semantics.
            SubscriptionValidationError::DuplicateSubscription => {
                ApiError::conflict(err.to_string())
            }
        }
    }
}

/// Checks the cross-field invariants of a recipe payload. A repeated
/// ingredient id is a hard failure reported before any per-entry amount
/// problem, so duplicates always surface as `DuplicateIngredient`.
pub fn validate_recipe_payload(
    tags: &[i64],
    ingredients: &[IngredientAmount],
    cooking_time: i32,
) -> Result<(), RecipeValidationError> {
    if tags.is_empty() {
        return Err(RecipeValidationError::EmptyTagSet);
    }
    if ingredients.is_empty() {
        return Err(RecipeValidationError::EmptyIngredientSet);
    }
    let mut seen = HashSet::with_capacity(ingredients.len());
    for entry in ingredients {
        if !seen.insert(entry.id) {
            return Err(RecipeValidationError::DuplicateIngredient {
                ingredient_id: entry.id,
            });
        }
    }
    for entry in ingredients {
        if entry.amount < 1 {
            return Err(RecipeValidationError::InvalidAmount {
                ingredient_id: entry.id,
                amount: entry.amount,
            });
        }
    }
    if cooking_time < 1 {
        return Err(RecipeValidationError::InvalidCookingTime {
            value: cooking_time,
        });
    }
    Ok(())
}

/// The store-independent half of subscription validation; the duplicate
/// check runs against the live store in the handler.
pub fn validate_subscription(
    subscriber_id: i64,
    author_id: i64,
) -> Result<(), SubscriptionValidationError> {
    if subscriber_id == author_id {
        return Err(SubscriptionValidationError::SelfSubscription);
    }
    Ok(())
}

/// Tag colors are stored as `#RGB` or `#RRGGBB` hex codes.
pub fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[test]
    fn accepts_a_well_formed_payload() {
        let ingredients = vec![entry(1, 200), entry(2, 3)];
        assert_eq!(validate_recipe_payload(&[1, 2], &ingredients, 30), Ok(()));
    }

    #[test]
    fn rejects_empty_tag_set() {
        let ingredients = vec![entry(1, 200)];
        assert_eq!(
            validate_recipe_payload(&[], &ingredients, 30),
            Err(RecipeValidationError::EmptyTagSet)
        );
    }

    #[test]
    fn rejects_empty_ingredient_set() {
        assert_eq!(
            validate_recipe_payload(&[1], &[], 30),
            Err(RecipeValidationError::EmptyIngredientSet)
        );
    }

    #[test]
    fn rejects_duplicate_ingredient_regardless_of_amounts() {
        // Even with an invalid amount on the repeated entry, the duplicate
        // is what gets reported.
        let ingredients = vec![entry(7, 100), entry(7, 0)];
        assert_eq!(
            validate_recipe_payload(&[1], &ingredients, 30),
            Err(RecipeValidationError::DuplicateIngredient { ingredient_id: 7 })
        );

        let ingredients = vec![entry(7, 100), entry(7, 250)];
        assert_eq!(
            validate_recipe_payload(&[1], &ingredients, 30),
            Err(RecipeValidationError::DuplicateIngredient { ingredient_id: 7 })
        );
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let ingredients = vec![entry(1, 100), entry(2, 0)];
        assert_eq!(
            validate_recipe_payload(&[1], &ingredients, 30),
            Err(RecipeValidationError::InvalidAmount {
                ingredient_id: 2,
                amount: 0
            })
        );
    }

    #[test]
    fn rejects_non_positive_cooking_time() {
        let ingredients = vec![entry(1, 100)];
        assert_eq!(
            validate_recipe_payload(&[1], &ingredients, 0),
            Err(RecipeValidationError::InvalidCookingTime { value: 0 })
        );
    }

    #[test]
    fn rejects_self_subscription() {
        assert_eq!(
            validate_subscription(5, 5),
            Err(SubscriptionValidationError::SelfSubscription)
        );
        assert_eq!(validate_subscription(5, 6), Ok(()));
    }

    #[test]
    fn validation_errors_name_their_field() {
        assert_eq!(RecipeValidationError::EmptyTagSet.field(), "tags");
        assert_eq!(
            RecipeValidationError::DuplicateIngredient { ingredient_id: 1 }.field(),
            "ingredients"
        );
        assert_eq!(
            RecipeValidationError::InvalidCookingTime { value: 0 }.field(),
            "cooking_time"
        );
    }

    #[test]
    fn hex_colors_need_a_hash_and_three_or_six_digits() {
        assert!(is_hex_color("#49B64E"));
        assert!(is_hex_color("#fff"));
        assert!(!is_hex_color("49B64E"));
        assert!(!is_hex_color("#49B64"));
        assert!(!is_hex_color("#49B64G"));
        assert!(!is_hex_color("#"));
    }
}
