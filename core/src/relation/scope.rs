use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::expr::Predicate;
use crate::value::Value;

use super::Relation;

type ScopeFn = dyn Fn(&Relation, &[Value]) -> Result<Relation> + Send + Sync;

/// A reusable, optionally parameterized relation transform.
///
/// Scopes are plain functions over relation values; applying one never
/// changes its input. Compose them with [`Scope::then`].
///
/// ```
/// use relq_core::{Relation, Scope};
///
/// let published = Scope::new(|r: &Relation, _| r.where_eq("published", true));
/// let created_before = Scope::raw("created_at < ?");
/// let recent_published = published.then(created_before);
/// # let _ = recent_published;
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeFn>,
}

impl Scope {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Relation, &[Value]) -> Result<Relation> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// A scope adding a raw condition whose `?` placeholders are bound to
    /// the scope arguments. The argument count is checked on application.
    ///
    /// The template is spliced in verbatim. Qualify its columns
    /// (`clients.removed_at IS NULL`) when the relation may be joined to a
    /// table with a column of the same name, or build the condition with
    /// [`Relation::predicates`], which always qualifies:
    ///
    /// ```
    /// use relq_core::{Relation, Scope};
    ///
    /// let kept = Scope::new(|r: &Relation, _| Ok(r.r#where(r.predicates().is_null("removed_at")?)));
    /// # let _ = kept;
    /// ```
    pub fn raw(template: impl Into<String>) -> Self {
        let template = template.into();
        Self::new(move |relation, args| {
            let predicate = Predicate::raw(template.as_str(), args.iter().cloned())?;
            Ok(relation.r#where(predicate))
        })
    }

    /// A scope adding a fixed predicate, ignoring any arguments.
    pub fn filter(predicate: Predicate) -> Self {
        Self::new(move |relation, _| Ok(relation.r#where(predicate.clone())))
    }

    pub fn apply(&self, relation: &Relation, args: &[Value]) -> Result<Relation> {
        (self.inner)(relation, args)
    }

    /// Applies `self`, then `next`, passing both the same arguments.
    #[must_use]
    pub fn then(self, next: Scope) -> Scope {
        Self::new(move |relation, args| next.apply(&self.apply(relation, args)?, args))
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Scope(..)")
    }
}
