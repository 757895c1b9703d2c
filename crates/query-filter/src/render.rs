//! Renders condition trees to SQL text.

use crate::ast::{ConditionNode, Ident};

/// Accumulates rendered SQL text.
#[derive(Debug, Default)]
pub struct Renderer {
    pub sql: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.sql
    }
}

pub trait Render {
    fn render(&self, r: &mut Renderer);
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
    }
}

impl Render for ConditionNode {
    fn render(&self, r: &mut Renderer) {
        match self {
            ConditionNode::Comparison { column, op, value } => {
                column.render(r);
                r.sql.push_str(op.as_sql());
                r.sql.push_str(&value.to_string());
            }

            ConditionNode::NullCheck { column, want_null } => {
                column.render(r);
                r.sql
                    .push_str(if *want_null { " Is Null" } else { " Is Not Null" });
            }

            ConditionNode::Logical { op, children } => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        r.sql.push(' ');
                        r.sql.push_str(op.keyword());
                        r.sql.push(' ');
                    }

                    // Logical children carry their own operator and need
                    // grouping; leaf conditions do not.
                    if matches!(child, ConditionNode::Logical { .. }) {
                        r.sql.push('(');
                        child.render(r);
                        r.sql.push(')');
                    } else {
                        child.render(r);
                    }
                }
            }
        }
    }
}
