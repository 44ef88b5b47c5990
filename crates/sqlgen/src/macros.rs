#[macro_export]
macro_rules! value {
    ($val:expr) => {
        $crate::ast::expr::ScalarExpr::Constant($crate::ast::expr::Constant {
            value: $val,
            ty: None,
        })
    };
}

#[macro_export]
macro_rules! table_ref {
    ($name:expr) => {
        $crate::ast::common::TableRef {
            schema: None,
            name: $name.to_string(),
        }
    };
    ($schema:expr, $name:expr) => {
        $crate::ast::common::TableRef {
            schema: Some($schema.to_string()),
            name: $name.to_string(),
        }
    };
}

#[macro_export]
macro_rules! ident {
    ($name:expr) => {
        $crate::ast::expr::ScalarExpr::Column($crate::ast::expr::ColumnRef {
            table: None,
            name: $name.to_string(),
            ty: None,
        })
    };
    ($table:expr, $name:expr) => {
        $crate::ast::expr::ScalarExpr::Column($crate::ast::expr::ColumnRef {
            table: Some($table.to_string()),
            name: $name.to_string(),
            ty: None,
        })
    };
}

/// Creates an aliased projection.
#[macro_export]
macro_rules! proj_as {
    ($expr:expr, $alias:expr) => {
        $crate::ast::select::Projection {
            expr: $expr,
            alias: Some($alias.to_string()),
        }
    };
}
