//! Transaction control statements.

/// Which transaction command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// BEGIN / START TRANSACTION
    Begin,
    /// COMMIT / END
    Commit,
    /// ROLLBACK
    Rollback,
    /// SAVEPOINT name
    Savepoint,
    /// ROLLBACK TO SAVEPOINT name
    RollbackSavepoint,
    /// RELEASE SAVEPOINT name
    ReleaseSavepoint,
}

impl TransactionKind {
    /// Returns the statement type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Savepoint => "SAVEPOINT",
            Self::RollbackSavepoint => "ROLLBACK_SAVEPOINT",
            Self::ReleaseSavepoint => "DELETE_SAVEPOINT",
        }
    }
}

/// Transaction isolation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// READ COMMITTED
    ReadCommitted,
    /// READ UNCOMMITTED
    ReadUncommitted,
    /// REPEATABLE READ
    RepeatableRead,
    /// SERIALIZABLE
    Serializable,
}

impl IsolationLevel {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReadCommitted => "READ COMMITTED",
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// Locking or access mode of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// DEFERRED (SQLite)
    Deferred,
    /// IMMEDIATE (SQLite)
    Immediate,
    /// EXCLUSIVE (SQLite)
    Exclusive,
    /// READ ONLY
    ReadOnly,
    /// READ WRITE
    ReadWrite,
}

impl TransactionMode {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deferred => "DEFERRED",
            Self::Immediate => "IMMEDIATE",
            Self::Exclusive => "EXCLUSIVE",
            Self::ReadOnly => "READ ONLY",
            Self::ReadWrite => "READ WRITE",
        }
    }
}

/// BEGIN, COMMIT, ROLLBACK and savepoint commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatement {
    /// The command.
    pub kind: TransactionKind,
    /// Transaction or savepoint name.
    pub name: Option<String>,
    /// Requested isolation level.
    pub isolation_level: Option<IsolationLevel>,
    /// Requested mode.
    pub mode: Option<TransactionMode>,
}

impl TransactionStatement {
    /// Creates a command with no options.
    #[must_use]
    pub const fn new(kind: TransactionKind) -> Self {
        Self {
            kind,
            name: None,
            isolation_level: None,
            mode: None,
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
