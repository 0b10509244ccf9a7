//! Database kind value object

use serde::{Deserialize, Serialize};

/// Kind of data store an application needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Postgresql,
    Mysql,
    Mongodb,
    Sqlite,
}

impl DatabaseKind {
    /// Matching order; the first kind is the stable default
    pub const ALL: [DatabaseKind; 4] = [
        DatabaseKind::Postgresql,
        DatabaseKind::Mysql,
        DatabaseKind::Mongodb,
        DatabaseKind::Sqlite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Postgresql => "postgresql",
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Mongodb => "mongodb",
            DatabaseKind::Sqlite => "sqlite",
        }
    }

    /// Dependency-name keywords (lowercase substrings)
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            DatabaseKind::Postgresql => &["psycopg2", "pg", "postgres", "postgresql"],
            DatabaseKind::Mysql => &["mysql", "pymysql", "mysql2"],
            DatabaseKind::Mongodb => &["pymongo", "mongoose", "mongodb"],
            DatabaseKind::Sqlite => &["sqlite3", "sqlite"],
        }
    }

    /// Recommended managed engine version
    pub fn engine_version(&self) -> &'static str {
        match self {
            DatabaseKind::Postgresql => "14.7",
            DatabaseKind::Mysql => "8.0",
            DatabaseKind::Mongodb => "6.0",
            DatabaseKind::Sqlite => "14.7",
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            DatabaseKind::Postgresql | DatabaseKind::Sqlite => 5432,
            DatabaseKind::Mysql => 3306,
            DatabaseKind::Mongodb => 27017,
        }
    }

    /// Whether a managed relational instance can host this kind
    pub fn is_relational(&self) -> bool {
        !matches!(self, DatabaseKind::Mongodb)
    }

    /// Engine name for a managed relational instance
    ///
    /// SQLite has no managed offering; it is hosted on PostgreSQL.
    pub fn relational_engine(&self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "mysql",
            _ => "postgres",
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords that mark a dependency as a Redis client
pub const REDIS_KEYWORDS: [&str; 3] = ["redis", "redis-py", "ioredis"];
