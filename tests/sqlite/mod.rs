mod batches;
mod finders;
mod relation;
mod scopes;
