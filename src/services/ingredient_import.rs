use std::collections::HashSet;
use std::path::Path;

use log::info;
use sea_orm::{EntityTrait, Set};
use tokio::fs;

use crate::db::DbPool;
use crate::entities::ingredient;

/// Parses one `name,measurement_unit` line. Names may themselves contain
/// commas, so the split happens at the last one.
pub fn parse_line(line: &str) -> Option<(String, String)> {
    let (name, unit) = line.rsplit_once(',')?;
    let name = name.trim().trim_matches('"');
    let unit = unit.trim().trim_matches('"');
    if name.is_empty() || unit.is_empty() {
        return None;
    }
    Some((name.to_string(), unit.to_string()))
}

/// Loads ingredient reference data from a CSV file on startup. The first
/// line is a header. Runs only against an empty table, so restarting the
/// service never duplicates rows. Returns the number of rows inserted.
pub async fn import_ingredients_csv(db: &DbPool, path: &Path) -> Result<usize, anyhow::Error> {
    let populated = ingredient::Entity::find().one(db).await?.is_some();
    if populated {
        info!("Ingredient table already populated, skipping CSV import");
        return Ok(0);
    }

    let content = fs::read_to_string(path).await?;
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rows = Vec::new();
    for line in content.lines().skip(1) {
        let Some((name, unit)) = parse_line(line) else {
            continue;
        };
        if !seen.insert((name.clone(), unit.clone())) {
            continue;
        }
        rows.push(ingredient::ActiveModel {
            name: Set(name),
            measurement_unit: Set(unit),
            ..Default::default()
        });
    }

    if rows.is_empty() {
        return Ok(0);
    }
    let inserted = rows.len();
    ingredient::Entity::insert_many(rows).exec(db).await?;
    info!("Imported {} ingredients from {}", inserted, path.display());
    Ok(inserted)
}
