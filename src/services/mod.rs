pub mod ingredient_import;
pub mod shopping_list;
