//! Naming conventions for tables and keys.

use heck::ToSnakeCase;

/// Default table name for an entity: snake_case plural (`BlogPost` → `blog_posts`).
pub fn table_name(entity: &str) -> String {
    pluralize(&entity.to_snake_case())
}

/// Default foreign key pointing at an entity or association (`Post` → `post_id`).
pub fn foreign_key(name: &str) -> String {
    format!("{}_id", name.to_snake_case())
}

/// Default many-to-many join table: both table names sorted and joined by `_`.
pub fn join_table(left_table: &str, right_table: &str) -> String {
    if left_table <= right_table {
        format!("{left_table}_{right_table}")
    } else {
        format!("{right_table}_{left_table}")
    }
}

fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
        && !stem.is_empty()
    {
        return format!("{stem}ies");
    }
    if word.ends_with(['s', 'x', 'z']) || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{word}es");
    }
    format!("{word}s")
}
