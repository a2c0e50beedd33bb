use crate::error::Result;
use crate::types::{NormalizedRecord, ReportRow, Song};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS songs (
        song_id     INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        artist      TEXT NOT NULL,
        bpm         TEXT NOT NULL,
        youtube_url TEXT
    );
    CREATE TABLE IF NOT EXISTS dances (
        dance_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT UNIQUE NOT NULL
    );
    CREATE TABLE IF NOT EXISTS song_dances (
        song_id  INTEGER NOT NULL,
        dance_id INTEGER NOT NULL,
        PRIMARY KEY (song_id, dance_id),
        FOREIGN KEY (song_id) REFERENCES songs(song_id),
        FOREIGN KEY (dance_id) REFERENCES dances(dance_id)
    );
"#;

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub distinct_dances: usize,
    pub songs_inserted: usize,
    pub associations_inserted: usize,
    /// Dance names that could not be resolved to an id
    pub skipped_dances: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub songs: i64,
    pub dances: i64,
    pub song_dances: i64,
}

/// SQLite-backed song/dance store
pub struct ChartStore {
    conn: Connection,
}

impl ChartStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Create the three tables if absent. A `songs` table from an older
    /// database without the video column gets it added.
    pub fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        if !self.has_column("songs", "youtube_url")? {
            info!("Adding youtube_url column to existing songs table");
            self.conn.execute_batch("ALTER TABLE songs ADD COLUMN youtube_url TEXT;")?;
        }
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for name in names {
            if name? == column {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Insert every record as a new song. Dances are inserted once per
    /// distinct name; songs are never matched against existing rows.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn load_records(&mut self, records: &[NormalizedRecord]) -> Result<LoadSummary> {
        let unique_dances: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.dances.iter().map(String::as_str))
            .collect();
        info!("Inserting {} unique dances", unique_dances.len());

        let tx = self.conn.transaction()?;
        let mut summary = LoadSummary {
            distinct_dances: unique_dances.len(),
            ..LoadSummary::default()
        };

        {
            let mut insert_dance = tx.prepare("INSERT OR IGNORE INTO dances (name) VALUES (?1)")?;
            for dance in &unique_dances {
                insert_dance.execute(params![dance])?;
            }

            let mut select_dances = tx.prepare("SELECT dance_id, name FROM dances")?;
            let dance_map = select_dances
                .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(0)?)))?
                .collect::<rusqlite::Result<HashMap<String, i64>>>()?;

            info!("Inserting {} songs", records.len());
            let mut insert_song =
                tx.prepare("INSERT INTO songs (title, artist, bpm) VALUES (?1, ?2, ?3)")?;
            let mut insert_link =
                tx.prepare("INSERT INTO song_dances (song_id, dance_id) VALUES (?1, ?2)")?;

            for record in records {
                insert_song.execute(params![record.title, record.artist, record.tempo])?;
                let song_id = tx.last_insert_rowid();
                summary.songs_inserted += 1;

                for dance in &record.dances {
                    match dance_map.get(dance) {
                        Some(dance_id) => {
                            insert_link.execute(params![song_id, dance_id])?;
                            summary.associations_inserted += 1;
                        }
                        None => {
                            warn!(song_id, dance = %dance, "Dance has no id, skipping association");
                            summary.skipped_dances.push(dance.clone());
                        }
                    }
                }
            }
        }

        tx.commit()?;
        debug!(?summary, "Load committed");
        Ok(summary)
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<i64> {
            let n = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n)
        };
        Ok(StoreCounts {
            songs: count("songs")?,
            dances: count("dances")?,
            song_dances: count("song_dances")?,
        })
    }

    pub fn dance_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM dances ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn songs_for_dance(&self, dance: &str, limit: usize) -> Result<Vec<Song>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.song_id, s.title, s.artist, s.bpm, s.youtube_url
             FROM songs s
             JOIN song_dances sd ON s.song_id = sd.song_id
             JOIN dances d ON sd.dance_id = d.dance_id
             WHERE d.name = ?1
             ORDER BY s.bpm
             LIMIT ?2",
        )?;
        let songs = stmt
            .query_map(params![dance, limit as i64], song_from_row)?
            .collect::<rusqlite::Result<Vec<Song>>>()?;
        Ok(songs)
    }

    pub fn dances_for_title(&self, title: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.name
             FROM songs s
             JOIN song_dances sd ON s.song_id = sd.song_id
             JOIN dances d ON sd.dance_id = d.dance_id
             WHERE s.title = ?1
             ORDER BY sd.rowid",
        )?;
        let names = stmt
            .query_map(params![title], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn song(&self, song_id: i64) -> Result<Option<Song>> {
        let song = self
            .conn
            .query_row(
                "SELECT song_id, title, artist, bpm, youtube_url FROM songs WHERE song_id = ?1",
                params![song_id],
                song_from_row,
            )
            .optional()?;
        Ok(song)
    }

    /// Up to `limit` songs that have no video link yet, oldest first
    pub fn songs_missing_video(&self, limit: usize) -> Result<Vec<Song>> {
        let mut stmt = self.conn.prepare(
            "SELECT song_id, title, artist, bpm, youtube_url
             FROM songs
             WHERE youtube_url IS NULL
             ORDER BY song_id
             LIMIT ?1",
        )?;
        let songs = stmt
            .query_map(params![limit as i64], song_from_row)?
            .collect::<rusqlite::Result<Vec<Song>>>()?;
        Ok(songs)
    }

    /// Runs outside any transaction so each link is durable on return
    pub fn set_video_url(&self, song_id: i64, url: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE songs SET youtube_url = ?1 WHERE song_id = ?2",
            params![url, song_id],
        )?;
        Ok(())
    }

    /// Every song with its dances joined by ", " in the order they were
    /// linked, in song id order.
    pub fn report_rows(&self) -> Result<Vec<ReportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.song_id, s.title, s.artist, s.bpm, d.name
             FROM songs s
             LEFT JOIN song_dances sd ON s.song_id = sd.song_id
             LEFT JOIN dances d ON sd.dance_id = d.dance_id
             ORDER BY s.song_id, sd.rowid",
        )?;
        let mut rows = stmt.query([])?;

        let mut report: Vec<ReportRow> = Vec::new();
        while let Some(row) = rows.next()? {
            let song_id: i64 = row.get(0)?;
            let dance: Option<String> = row.get(4)?;

            let starts_song = report.last().map_or(true, |last| last.song_id != song_id);
            if starts_song {
                report.push(ReportRow {
                    song_id,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                    tempo: row.get(3)?,
                    dances: String::new(),
                });
            }

            if let (Some(dance), Some(current)) = (dance, report.last_mut()) {
                if !current.dances.is_empty() {
                    current.dances.push_str(", ");
                }
                current.dances.push_str(&dance);
            }
        }
        Ok(report)
    }
}

fn song_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        tempo: row.get(3)?,
        video_url: row.get(4)?,
    })
}
