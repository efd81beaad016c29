use std::collections::{BTreeMap, HashMap};

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::db::DbPool;
use crate::entities::{ingredient, recipe_ingredient, shopping_cart};
use crate::error::ApiError;

pub const LIST_HEADER: &str = "Shopping list:";
pub const LIST_FILENAME: &str = "list_of_products.txt";

/// One aggregated purchase line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Collapses raw (name, unit, amount) triples into one line per
/// (name, unit) pair with amounts summed. Output is name-ascending.
pub fn aggregate(lines: impl IntoIterator<Item = (String, String, i32)>) -> Vec<ShoppingListLine> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for (name, unit, amount) in lines {
        *totals.entry((name, unit)).or_insert(0) += i64::from(amount);
    }
    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingListLine {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

/// Plain-text download body: the header line, then one line per aggregated
/// ingredient. No trailing newline.
pub fn render(lines: &[ShoppingListLine]) -> String {
    let mut out = String::from(LIST_HEADER);
    for line in lines {
        out.push_str(&format!(
            "\n{} ({}) - {}",
            line.name, line.measurement_unit, line.amount
        ));
    }
    out
}

/// Aggregates everything currently in `user_id`'s cart into the download
/// body. An empty cart yields just the header, not an error.
pub async fn build_shopping_list(db: &DbPool, user_id: i64) -> Result<String, ApiError> {
    let cart = shopping_cart::Entity::find()
        .filter(shopping_cart::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    if cart.is_empty() {
        return Ok(render(&[]));
    }
    let recipe_ids: Vec<i64> = cart.iter().map(|entry| entry.recipe_id).collect();

    let lines = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids))
        .all(db)
        .await?;
    let ingredient_ids: Vec<i64> = lines.iter().map(|line| line.ingredient_id).collect();
    let by_id: HashMap<i64, ingredient::Model> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|reference| (reference.id, reference))
        .collect();

    let triples = lines.iter().filter_map(|line| {
        by_id.get(&line.ingredient_id).map(|reference| {
            (
                reference.name.clone(),
                reference.measurement_unit.clone(),
                line.amount,
            )
        })
    });

    Ok(render(&aggregate(triples)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn amounts_sum_across_recipes() {
        // Flour appears in two carted recipes; one line with the total.
        let lines = aggregate([
            ("flour".to_string(), "g".to_string(), 200),
            ("flour".to_string(), "g".to_string(), 300),
            ("egg".to_string(), "pcs".to_string(), 2),
        ]);

        assert_eq!(
            lines,
            vec![
                ShoppingListLine {
                    name: "egg".to_string(),
                    measurement_unit: "pcs".to_string(),
                    amount: 2,
                },
                ShoppingListLine {
                    name: "flour".to_string(),
                    measurement_unit: "g".to_string(),
                    amount: 500,
                },
            ]
        );
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let lines = aggregate([
            ("milk".to_string(), "ml".to_string(), 100),
            ("milk".to_string(), "g".to_string(), 50),
        ]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].measurement_unit, "g");
        assert_eq!(lines[1].measurement_unit, "ml");
    }

    #[test]
    fn rendered_body_matches_the_download_format() {
        let lines = aggregate([
            ("flour".to_string(), "g".to_string(), 200),
            ("flour".to_string(), "g".to_string(), 300),
            ("egg".to_string(), "pcs".to_string(), 2),
        ]);

        assert_eq!(
            render(&lines),
            "Shopping list:\negg (pcs) - 2\nflour (g) - 500"
        );
    }

    #[test]
    fn empty_cart_renders_only_the_header() {
        assert_eq!(render(&[]), "Shopping list:");
    }

    #[tokio::test]
    async fn build_walks_cart_to_ingredient_rows() {
        // Result sets in query order: cart entries, ingredient lines,
        // ingredient reference rows.
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![
                shopping_cart::Model {
                    id: 1,
                    user_id: 5,
                    recipe_id: 10,
                },
                shopping_cart::Model {
                    id: 2,
                    user_id: 5,
                    recipe_id: 11,
                },
            ]])
            .append_query_results([vec![
                recipe_ingredient::Model {
                    id: 1,
                    recipe_id: 10,
                    ingredient_id: 7,
                    amount: 200,
                },
                recipe_ingredient::Model {
                    id: 2,
                    recipe_id: 11,
                    ingredient_id: 7,
                    amount: 300,
                },
                recipe_ingredient::Model {
                    id: 3,
                    recipe_id: 11,
                    ingredient_id: 3,
                    amount: 2,
                },
            ]])
            .append_query_results([vec![
                ingredient::Model {
                    id: 3,
                    name: "egg".to_string(),
                    measurement_unit: "pcs".to_string(),
                },
                ingredient::Model {
                    id: 7,
                    name: "flour".to_string(),
                    measurement_unit: "g".to_string(),
                },
            ]])
            .into_connection();

        let body = build_shopping_list(&db, 5).await.unwrap();
        assert_eq!(body, "Shopping list:\negg (pcs) - 2\nflour (g) - 500");
    }

    #[tokio::test]
    async fn empty_cart_skips_the_ingredient_queries() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<shopping_cart::Model>::new()])
            .into_connection();

        let body = build_shopping_list(&db, 5).await.unwrap();
        assert_eq!(body, "Shopping list:");
    }
}
