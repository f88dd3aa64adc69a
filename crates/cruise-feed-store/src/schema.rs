use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE cruise_lines (
            line_id         INTEGER PRIMARY KEY,
            last_synced_at  TEXT
        );

        CREATE TABLE cruises (
            cruise_id         TEXT PRIMARY KEY,
            line_id           INTEGER NOT NULL,
            ship_id           INTEGER,
            name              TEXT,
            sail_date         TEXT NOT NULL,
            nights            INTEGER,
            currency          TEXT,
            cheapest_inside   REAL,
            cheapest_outside  REAL,
            cheapest_balcony  REAL,
            cheapest_suite    REAL,
            cabin_prices_json TEXT NOT NULL DEFAULT '[]',
            updated_at        TEXT NOT NULL
        );

        CREATE INDEX idx_cruises_line ON cruises(line_id);
        CREATE INDEX idx_cruises_sail_date ON cruises(sail_date);",
    )])
}
