mod dialects;
mod predicates;
mod schema;
