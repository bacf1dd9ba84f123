// src/bulk/sessions.rs
use crate::bulk::preview::{build_preview, PreviewRow};
use crate::bulk::reader::{SpreadsheetError, UploadedWorkbook};
use base64::Engine;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const SESSION_COOKIE: &str = "bulk_session";
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
const TOKEN_BYTES: usize = 32;

/// Generate a URL-safe token from random bytes (base64, no padding).
pub fn generate_token<R: RngCore>(rng: &mut R, nbytes: usize) -> String {
    let mut buf = vec![0u8; nbytes];
    rng.fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buf)
}

/// Everything one upload needs between requests: the decoded workbook,
/// which sheet is active, and that sheet's validated rows.
#[derive(Debug, Clone)]
pub struct BulkSession {
    pub workbook: UploadedWorkbook,
    pub selected_sheet: String,
    pub preview_rows: Vec<PreviewRow>,
    last_seen: Instant,
}

impl BulkSession {
    pub fn new(workbook: UploadedWorkbook) -> Self {
        let first = workbook.first_sheet();
        let selected_sheet = first.name.clone();
        let preview_rows = build_preview(first);

        Self {
            workbook,
            selected_sheet,
            preview_rows,
            last_seen: Instant::now(),
        }
    }

    /// Re-validates against another sheet of the already decoded workbook.
    pub fn select_sheet(&mut self, name: &str) -> Result<(), SpreadsheetError> {
        let sheet = self.workbook.sheet(name)?;
        self.preview_rows = build_preview(sheet);
        self.selected_sheet = sheet.name.clone();
        Ok(())
    }

    pub fn valid_rows(&self) -> Vec<PreviewRow> {
        self.preview_rows
            .iter()
            .filter(|r| r.is_valid)
            .cloned()
            .collect()
    }

    pub fn has_valid_rows(&self) -> bool {
        self.preview_rows.iter().any(|r| r.is_valid)
    }
}

/// In-memory bulk sessions keyed by the token in the `bulk_session` cookie.
pub struct BulkSessions {
    sessions: Mutex<HashMap<String, BulkSession>>,
    idle_ttl: Duration,
}

impl Default for BulkSessions {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl BulkSessions {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Stores `session` under a fresh token and returns the token.
    pub fn create(&self, session: BulkSession) -> String {
        let token = generate_token(&mut OsRng, TOKEN_BYTES);
        self.prune_idle(Instant::now());

        let mut sessions = self.sessions.lock();
        sessions.insert(token.clone(), session);
        tracing::debug!(active = sessions.len(), "bulk session created");
        token
    }

    /// Runs `f` on the session for `token`, marking it as used.
    pub fn with_session<R>(&self, token: &str, f: impl FnOnce(&mut BulkSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(token)?;
        session.last_seen = Instant::now();
        Some(f(session))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn prune_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.last_seen) <= self.idle_ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, "idle bulk sessions dropped");
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::reader::SheetData;
    use rand::{rngs::StdRng, SeedableRng};

    fn workbook() -> UploadedWorkbook {
        let grid = |rows: &[&[&str]]| -> Vec<Vec<String>> {
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect()
        };
        UploadedWorkbook {
            filename: "upload.xlsx".into(),
            sheets: vec![
                SheetData::from_grid("First", grid(&[&["Address", "Postcode"], &["1 Example Road", ""]])),
                SheetData::from_grid(
                    "Second",
                    grid(&[&["Address", "Postcode"], &["1 Example Road", "SW1A 1AA"], &["2 Example Road", "SW1A 1AA"]]),
                ),
            ],
        }
    }

    #[test]
    fn token_is_url_safe_no_pad() {
        let mut rng = StdRng::seed_from_u64(123);
        let t = generate_token(&mut rng, 32);
        assert!(t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(t.len(), 43);
        assert_ne!(t, generate_token(&mut rng, 32));
    }

    #[test]
    fn new_session_previews_first_sheet() {
        let session = BulkSession::new(workbook());
        assert_eq!(session.selected_sheet, "First");
        assert_eq!(session.preview_rows.len(), 1);
        assert!(!session.has_valid_rows());
    }

    #[test]
    fn switching_sheets_rebuilds_preview() {
        let mut session = BulkSession::new(workbook());
        session.select_sheet("Second").unwrap();
        assert_eq!(session.selected_sheet, "Second");
        assert_eq!(session.valid_rows().len(), 2);

        assert!(session.select_sheet("Nope").is_err());
        assert_eq!(session.selected_sheet, "Second");
    }

    #[test]
    fn store_round_trip_and_prune() {
        let store = BulkSessions::new(Duration::from_secs(60));
        let token = store.create(BulkSession::new(workbook()));

        let sheet = store.with_session(&token, |s| s.selected_sheet.clone());
        assert_eq!(sheet.as_deref(), Some("First"));
        assert!(store.with_session("unknown", |_| ()).is_none());

        assert_eq!(store.prune_idle(Instant::now()), 0);
        assert_eq!(store.prune_idle(Instant::now() + Duration::from_secs(120)), 1);
        assert_eq!(store.len(), 0);
    }
}
