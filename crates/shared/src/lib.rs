mod command;
mod date;

pub use command::*;
pub use date::*;

#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
}

impl State {
    /// Single pool used for both reads and writes (tests, CLI commands).
    pub fn single(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
        }
    }
}
