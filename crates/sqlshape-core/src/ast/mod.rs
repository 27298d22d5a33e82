//! Abstract Syntax Tree (AST) types for SQL statements.

mod compound;
mod expression;
mod statement;
mod transaction;
mod types;
mod unknown;
mod walk;

pub use compound::{CompoundOp, CompoundStatement, SelectQuery};
pub use expression::{
    Arity, CaseExpr, Expr, FunctionCall, Identifier, Literal, Operation, Operator, ParamRef,
};
pub use statement::{
    Batch, DeleteStatement, FromClause, InsertSource, InsertStatement, Join, JoinCondition,
    JoinType, OrderBy, OrderDirection, SelectColumn, SelectStatement, SelectTarget, Statement,
    StatementBody, TableSource, UpdateAssignment, UpdateStatement,
};
pub use transaction::{IsolationLevel, TransactionKind, TransactionMode, TransactionStatement};
pub use types::DataType;
pub use unknown::{UnknownPart, UnknownStatement};
pub use walk::{for_each_expr, map_exprs, parent_of};
