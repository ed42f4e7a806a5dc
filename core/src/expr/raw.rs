use std::borrow::Cow;

use crate::error::CompileError;
use crate::sql::{SQL, SQLChunk};
use crate::value::Value;

/// A textual condition with positional `?` placeholders.
///
/// The template is split into verbatim fragments and parameter chunks when
/// constructed, so no value can ever end up inside the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    template: String,
    sql: SQL,
}

impl RawFragment {
    /// Splits `template` on `?` (ignoring those inside single-quoted
    /// literals) and binds `params` in order.
    pub fn parse(template: impl Into<String>, params: Vec<Value>) -> Result<Self, CompileError> {
        let template = template.into();
        let placeholders = count_placeholders(&template);
        if placeholders != params.len() {
            return Err(CompileError::PlaceholderMismatch {
                template,
                placeholders,
                params: params.len(),
            });
        }

        let mut sql = SQL::empty();
        let mut params = params.into_iter();
        let mut fragment = String::new();
        let mut quoted = false;
        for c in template.chars() {
            match c {
                '\'' => {
                    quoted = !quoted;
                    fragment.push(c);
                }
                '?' if !quoted => {
                    flush(&mut sql, &mut fragment);
                    if let Some(value) = params.next() {
                        sql.push_mut(SQLChunk::Param(value));
                    }
                }
                _ => fragment.push(c),
            }
        }
        flush(&mut sql, &mut fragment);

        Ok(Self { template, sql })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.sql.params()
    }

    pub(crate) fn sql(&self) -> &SQL {
        &self.sql
    }
}

fn flush(sql: &mut SQL, fragment: &mut String) {
    if !fragment.is_empty() {
        sql.push_mut(SQLChunk::Fragment(Cow::Owned(std::mem::take(fragment))));
    }
}

fn count_placeholders(template: &str) -> usize {
    let mut quoted = false;
    template
        .chars()
        .filter(|&c| {
            if c == '\'' {
                quoted = !quoted;
            }
            c == '?' && !quoted
        })
        .count()
}
