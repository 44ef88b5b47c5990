use crate::{
    ast::statement::{DeleteStatement, Statement, UpdateStatement},
    render::{Render, Renderer},
};

impl Render for Statement {
    fn render(&self, r: &mut Renderer) {
        match self {
            Statement::Select(query) => query.render(r),
            Statement::Update(update) => update.render(r),
            Statement::Delete(delete) => delete.render(r),
        }
    }
}

impl Render for UpdateStatement {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("UPDATE ");
        if let Some(schema) = &self.table.schema {
            r.push_ident(schema);
            r.sql.push('.');
        }
        r.push_ident(&self.table.name);
        r.sql.push_str(" SET ");
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            r.push_ident(&assignment.column);
            r.sql.push_str(" = ");
            assignment.value.render(r);
        }
        if let Some(predicate) = &self.predicate {
            r.sql.push_str(" WHERE ");
            predicate.render(r);
        }
    }
}

impl Render for DeleteStatement {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("DELETE FROM ");
        if let Some(schema) = &self.table.schema {
            r.push_ident(schema);
            r.sql.push('.');
        }
        r.push_ident(&self.table.name);
        if let Some(predicate) = &self.predicate {
            r.sql.push_str(" WHERE ");
            predicate.render(r);
        }
    }
}
