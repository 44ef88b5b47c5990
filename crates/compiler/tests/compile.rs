//! End-to-end compilations: relational tree in, engine SQL text out.

use compiler::{CompilerOptions, TranslationError, compile};
use model::core::data_type::SemanticType;
use model::core::value::Value;
use model::params::ParameterValues;
use sqlgen::ast::calls::{DatePart, DateTimeCall, HostCall, StringCall};
use sqlgen::ast::common::SetOpKind;
use sqlgen::ast::expr::{ParamTransform, ScalarExpr, SubqueryExpr};
use sqlgen::ast::select::{Query, SetOpQuery};
use sqlgen::ast::statement::{Assignment, DeleteStatement, Statement, UpdateStatement};
use sqlgen::build::select::SelectBuilder;
use sqlgen::{
    column, eq, host_call, ident, int, param, proj, proj_as, table_ref, text, typed_column,
};

fn compile_select(query: Query) -> compiler::Compilation {
    compile(
        Statement::Select(query),
        &ParameterValues::new(),
        &CompilerOptions::default(),
    )
    .expect("compilation should succeed")
}

fn compile_err(query: Query) -> TranslationError {
    compile(
        Statement::Select(query),
        &ParameterValues::new(),
        &CompilerOptions::default(),
    )
    .expect_err("compilation should fail")
}

#[test]
fn test_boolean_column_predicate_gets_comparison() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(
            typed_column("u", "is_active", SemanticType::Boolean),
            "is_active",
        )])
        .from(table_ref!("users"), Some("u"))
        .where_clause(typed_column("u", "is_active", SemanticType::Boolean))
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT [u].[is_active] FROM [users] AS [u] WHERE ([u].[is_active] = TRUE)"
    );
    assert!(compiled.can_cache);
}

#[test]
fn test_predicate_in_projection_is_materialized() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(eq(column("u", "age"), int(30)), "is_thirty")])
        .from(table_ref!("users"), Some("u"))
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT IIF(([u].[age] = 30), 1, 0) AS [is_thirty] FROM [users] AS [u]"
    );
}

#[test]
fn test_bit_equality_renders_as_xor() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(column("u", "id"), "id")])
        .from(table_ref!("users"), Some("u"))
        .where_clause(eq(
            typed_column("u", "a", SemanticType::Boolean),
            typed_column("u", "b", SemanticType::Boolean),
        ))
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT [u].[id] FROM [users] AS [u] WHERE (([u].[a] XOR [u].[b]) XOR TRUE)"
    );
}

#[test]
fn test_skip_take_compiles_to_double_reversed_caps() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .order_by(ident("id"), true)
        .into_query()
        .skip(int(3))
        .take(int(4));

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT [t1].[id] FROM (SELECT TOP 4 [t0].[id] FROM (SELECT TOP 7 [id] FROM [rows] \
         ORDER BY [id]) AS [t0] ORDER BY [t0].[id] DESC) AS [t1] ORDER BY [t1].[id]"
    );
    assert!(compiled.can_cache);
}

#[test]
fn test_first_after_skip_completes_the_window() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .order_by(ident("id"), true)
        .into_query()
        .skip(int(5))
        .first();

    let compiled = compile_select(query);
    assert!(compiled.sql.contains("TOP 6"));
    assert!(compiled.sql.contains("TOP 1"));
}

#[test]
fn test_skip_without_take_is_fatal() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .order_by(ident("id"), true)
        .into_query()
        .skip(int(3));

    assert_eq!(compile_err(query), TranslationError::SkipWithoutTake);
}

#[test]
fn test_split_query_offset_without_order_is_fatal() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .into_query()
        .skip(int(3))
        .take(int(4));

    let err = compile(
        Statement::Select(query),
        &ParameterValues::new(),
        &CompilerOptions { split_query: true },
    )
    .expect_err("split-query offset without order must fail");
    assert_eq!(err, TranslationError::SplitQueryOffsetWithoutOrderBy);
}

#[test]
fn test_literal_take_zero_collapses_to_constant_false() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .where_clause(eq(ident("status"), text("open")))
        .order_by(ident("id"), true)
        .into_query()
        .take(int(0));

    let compiled = compile_select(query);
    assert_eq!(compiled.sql, "SELECT [id] FROM [rows] WHERE (0 = 1)");
    assert!(compiled.can_cache);
}

#[test]
fn test_parameterized_take_zero_collapses_but_poisons_cache() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .order_by(ident("id"), true)
        .into_query()
        .take(param("n"));

    let params = ParameterValues::new().with("n", Value::Int(0));
    let compiled = compile(
        Statement::Select(query),
        &params,
        &CompilerOptions::default(),
    )
    .unwrap();

    assert_eq!(compiled.sql, "SELECT [id] FROM [rows] WHERE (0 = 1)");
    assert!(!compiled.can_cache);
}

#[test]
fn test_parameterized_take_is_inlined_and_poisons_cache() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .order_by(ident("id"), true)
        .into_query()
        .take(param("n"));

    let params = ParameterValues::new().with("n", Value::Int(7));
    let compiled = compile(
        Statement::Select(query),
        &params,
        &CompilerOptions::default(),
    )
    .unwrap();

    assert_eq!(compiled.sql, "SELECT TOP 7 [id] FROM [rows] ORDER BY [id]");
    assert!(!compiled.can_cache);
}

#[test]
fn test_contains_escapes_every_metacharacter() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(column("p", "title"), "title")])
        .from(table_ref!("products"), Some("p"))
        .where_clause(host_call(
            HostCall::Str(StringCall::Contains { comparison: None }),
            vec![column("p", "title"), text("50%")],
        ))
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        r"SELECT [p].[title] FROM [products] AS [p] WHERE [p].[title] LIKE '%50\%%' ESCAPE '\'"
    );
}

#[test]
fn test_parameterized_pattern_registers_bind_time_escaping() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(column("p", "title"), "title")])
        .from(table_ref!("products"), Some("p"))
        .where_clause(host_call(
            HostCall::Str(StringCall::StartsWith { comparison: None }),
            vec![column("p", "title"), param("prefix")],
        ))
        .into_query();

    let compiled = compile_select(query);
    assert!(compiled.sql.ends_with(r"[p].[title] LIKE ? ESCAPE '\'"));
    assert_eq!(compiled.params.len(), 1);
    assert_eq!(
        compiled.params[0].transform,
        ParamTransform::LikePattern {
            prefix: String::new(),
            suffix: "%".into(),
        }
    );
}

#[test]
fn test_index_of_empty_needle_is_constant_zero() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(
            host_call(
                HostCall::Str(StringCall::IndexOf { comparison: None }),
                vec![column("p", "title"), text("")],
            ),
            "pos",
        )])
        .from(table_ref!("products"), Some("p"))
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT 0 AS [pos] FROM [products] AS [p]"
    );
}

#[test]
fn test_date_arithmetic_uses_date_part_codes() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(
            host_call(
                HostCall::DateTime(DateTimeCall::Add(DatePart::Month)),
                vec![column("o", "created_at"), int(2)],
            ),
            "due",
        )])
        .from(table_ref!("orders"), Some("o"))
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT DATEADD('m', 2, [o].[created_at]) AS [due] FROM [orders] AS [o]"
    );
}

#[test]
fn test_millisecond_date_part_is_fatal() {
    let query = SelectBuilder::new()
        .select(vec![proj(host_call(
            HostCall::DateTime(DateTimeCall::Part(DatePart::Millisecond)),
            vec![column("o", "created_at")],
        ))])
        .from(table_ref!("orders"), Some("o"))
        .into_query();

    assert_eq!(compile_err(query), TranslationError::MillisecondDatePart);
}

#[test]
fn test_ordering_by_scalar_subquery_is_lifted() {
    let rating = ScalarExpr::Subquery(Box::new(SubqueryExpr {
        query: SelectBuilder::new()
            .select(vec![proj(ident("score"))])
            .from(table_ref!("ratings"), None)
            .into_query(),
        ty: None,
    }));
    let query = SelectBuilder::new()
        .select(vec![proj_as(column("u", "id"), "id")])
        .from(table_ref!("users"), Some("u"))
        .order_by(rating, false)
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT [t0].[id] FROM (SELECT [u].[id], (SELECT [score] FROM [ratings]) AS [o0] \
         FROM [users] AS [u]) AS [t0] ORDER BY [t0].[o0] DESC"
    );
}

#[test]
fn test_guard_rejects_every_unsupported_shape() {
    use sqlgen::ast::common::ApplyKind;
    use sqlgen::ast::expr::{JsonAccessExpr, RowNumberExpr};
    use sqlgen::ast::select::{ApplySource, Source, TableSource};

    // Row-numbering window.
    let row_number = SelectBuilder::new()
        .select(vec![proj(ScalarExpr::RowNumber(Box::new(RowNumberExpr {
            partition_by: vec![],
            order_by: vec![],
        })))])
        .from(table_ref!("rows"), None)
        .into_query();
    assert_eq!(compile_err(row_number), TranslationError::RowNumber);

    // Correlated apply, both kinds.
    for (kind, expected) in [
        (ApplyKind::Cross, TranslationError::CrossApply),
        (ApplyKind::Outer, TranslationError::OuterApply),
    ] {
        let mut select = SelectBuilder::new()
            .select(vec![proj(ident("id"))])
            .from(table_ref!("rows"), None)
            .build();
        select.from.push(Source::Apply(Box::new(ApplySource {
            kind,
            source: Source::Table(TableSource {
                table: table_ref!("details"),
                alias: None,
            }),
        })));
        assert_eq!(compile_err(Query::Select(select)), expected);
    }

    // Set difference and intersection.
    let base = || {
        SelectBuilder::new()
            .select(vec![proj(ident("id"))])
            .from(table_ref!("rows"), None)
            .into_query()
    };
    for (kind, expected) in [
        (SetOpKind::Except, TranslationError::Except),
        (SetOpKind::Intersect, TranslationError::Intersect),
    ] {
        let query = Query::SetOp(Box::new(SetOpQuery {
            kind,
            all: false,
            left: base(),
            right: base(),
        }));
        assert_eq!(compile_err(query), expected);
    }

    // JSON path access with a non-empty path.
    let json = SelectBuilder::new()
        .select(vec![proj(ScalarExpr::JsonAccess(Box::new(JsonAccessExpr {
            column: sqlgen::ast::expr::ColumnRef {
                table: None,
                name: "payload".into(),
                ty: None,
            },
            path: vec!["customer".into(), "name".into()],
        })))])
        .from(table_ref!("rows"), None)
        .into_query();
    assert_eq!(
        compile_err(json),
        TranslationError::JsonPath {
            path: "customer.name".into()
        }
    );
}

#[test]
fn test_union_compiles() {
    let base = |table: &str| {
        SelectBuilder::new()
            .select(vec![proj_as(ident("id"), "id")])
            .from(table_ref!(table), None)
            .into_query()
    };
    let query = Query::SetOp(Box::new(SetOpQuery {
        kind: SetOpKind::Union,
        all: true,
        left: base("current_orders"),
        right: base("archived_orders"),
    }));

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT [id] FROM [current_orders] UNION ALL SELECT [id] FROM [archived_orders]"
    );
}

#[test]
fn test_update_statement_runs_through_the_pipeline() {
    let statement = Statement::Update(UpdateStatement {
        table: table_ref!("orders"),
        assignments: vec![Assignment {
            column: "status".into(),
            value: text("shipped"),
        }],
        predicate: Some(sqlgen::not(eq(ident("id"), param("id")))),
    });

    let compiled = compile(
        statement,
        &ParameterValues::new().with("id", Value::Int(9)),
        &CompilerOptions::default(),
    )
    .unwrap();

    // NOT (id = ?) simplifies to the complementary operator.
    assert_eq!(
        compiled.sql,
        "UPDATE [orders] SET [status] = 'shipped' WHERE ([id] <> ?)"
    );
    assert_eq!(compiled.params[0].name, "id");
    assert!(compiled.can_cache);
}

#[test]
fn test_delete_statement_compiles() {
    let statement = Statement::Delete(DeleteStatement {
        table: table_ref!("sessions"),
        predicate: Some(eq(ident("expired"), sqlgen::boolean(true))),
    });

    let compiled = compile(
        statement,
        &ParameterValues::new(),
        &CompilerOptions::default(),
    )
    .unwrap();
    assert_eq!(
        compiled.sql,
        "DELETE FROM [sessions] WHERE ([expired] = TRUE)"
    );
}

#[test]
fn test_comparison_to_null_constant_becomes_is_null() {
    let query = SelectBuilder::new()
        .select(vec![proj_as(ident("id"), "id")])
        .from(table_ref!("rows"), None)
        .where_clause(eq(ident("closed_at"), sqlgen::value(Value::Null)))
        .into_query();

    let compiled = compile_select(query);
    assert_eq!(
        compiled.sql,
        "SELECT [id] FROM [rows] WHERE ([closed_at] IS NULL)"
    );
}
