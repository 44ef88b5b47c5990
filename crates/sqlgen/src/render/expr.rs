use crate::{
    ast::expr::{
        BinaryExpr, BinaryOperator, CaseExpr, ColumnRef, FunctionCall, InExpr, InSet, LikeExpr,
        RowNumberExpr, ScalarExpr, UnaryExpr, UnaryOperator,
    },
    render::{Render, Renderer},
};

impl Render for ScalarExpr {
    fn render(&self, r: &mut Renderer) {
        match self {
            ScalarExpr::Column(column) => column.render(r),
            ScalarExpr::Constant(constant) => r.push_literal(&constant.value),
            ScalarExpr::Parameter(p) => r.add_param(p.name.clone(), p.transform.clone()),
            ScalarExpr::Function(func) => func.render(r),
            ScalarExpr::Binary(op) => op.render(r),
            ScalarExpr::Unary(op) => op.render(r),
            ScalarExpr::Case(case) => case.render(r),
            ScalarExpr::Subquery(sub) => {
                r.sql.push('(');
                sub.query.render(r);
                r.sql.push(')');
            }
            ScalarExpr::Exists(exists) => {
                if exists.negated {
                    r.sql.push_str("NOT ");
                }
                r.sql.push_str("EXISTS (");
                exists.query.render(r);
                r.sql.push(')');
            }
            ScalarExpr::In(in_expr) => in_expr.render(r),
            ScalarExpr::Like(like) => like.render(r),
            ScalarExpr::RowNumber(row) => row.render(r),
            // A non-empty path never survives the guard; the bare column is
            // the only renderable form.
            ScalarExpr::JsonAccess(access) => access.column.render(r),
            // Untranslated calls never survive the guard either.
            ScalarExpr::Call(call) => {
                r.sql.push_str(&call.call.describe());
                r.sql.push('(');
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    arg.render(r);
                }
                r.sql.push(')');
            }
        }
    }
}

impl Render for ColumnRef {
    fn render(&self, r: &mut Renderer) {
        if let Some(table) = &self.table {
            r.push_ident(table);
            r.sql.push('.');
        }
        r.push_ident(&self.name);
    }
}

impl Render for BinaryExpr {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
            BinaryOperator::Xor => " XOR ",
            BinaryOperator::Add => " + ",
            BinaryOperator::Sub => " - ",
            BinaryOperator::Mul => " * ",
            BinaryOperator::Div => " / ",
            BinaryOperator::Mod => " MOD ",
            BinaryOperator::Pow => " ^ ",
            BinaryOperator::Concat => " & ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}

impl Render for UnaryExpr {
    fn render(&self, r: &mut Renderer) {
        match self.op {
            UnaryOperator::Not => {
                r.sql.push_str("NOT (");
                self.operand.render(r);
                r.sql.push(')');
            }
            UnaryOperator::Negate => {
                r.sql.push_str("-(");
                self.operand.render(r);
                r.sql.push(')');
            }
            UnaryOperator::IsNull => {
                r.sql.push('(');
                self.operand.render(r);
                r.sql.push_str(" IS NULL)");
            }
            UnaryOperator::IsNotNull => {
                r.sql.push('(');
                self.operand.render(r);
                r.sql.push_str(" IS NOT NULL)");
            }
        }
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            arg.render(r);
        }
        r.sql.push(')');
    }
}

/// The engine has no `CASE` expression; the multi-branch `SWITCH` built-in
/// is the closest construct, with a `TRUE` guard standing in for `ELSE`.
impl Render for CaseExpr {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SWITCH(");
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            match &self.operand {
                Some(operand) => {
                    r.sql.push('(');
                    operand.render(r);
                    r.sql.push_str(" = ");
                    branch.when.render(r);
                    r.sql.push(')');
                }
                None => branch.when.render(r),
            }
            r.sql.push_str(", ");
            branch.then.render(r);
        }
        if let Some(else_result) = &self.else_result {
            if !self.branches.is_empty() {
                r.sql.push_str(", ");
            }
            r.sql.push_str("TRUE, ");
            else_result.render(r);
        }
        r.sql.push(')');
    }
}

impl Render for InExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if self.negated {
            r.sql.push_str(" NOT");
        }
        r.sql.push_str(" IN (");
        match &self.set {
            InSet::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    item.render(r);
                }
            }
            InSet::Subquery(query) => query.render(r),
        }
        r.sql.push(')');
    }
}

impl Render for LikeExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        r.sql.push_str(" LIKE ");
        self.pattern.render(r);
        if let Some(escape) = self.escape {
            r.sql.push_str(&format!(" ESCAPE '{escape}'"));
        }
    }
}

impl Render for RowNumberExpr {
    fn render(&self, r: &mut Renderer) {
        // Never survives the guard; rendered only for diagnostics.
        r.sql.push_str("ROW_NUMBER() OVER (");
        if !self.partition_by.is_empty() {
            r.sql.push_str("PARTITION BY ");
            for (i, expr) in self.partition_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                expr.render(r);
            }
        }
        if !self.order_by.is_empty() {
            if !self.partition_by.is_empty() {
                r.sql.push(' ');
            }
            r.sql.push_str("ORDER BY ");
            for (i, ordering) in self.order_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                ordering.render(r);
            }
        }
        r.sql.push(')');
    }
}
