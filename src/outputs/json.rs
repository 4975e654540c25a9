//! JSON rendering of a [`ResultSet`] for the dashboard.
//!
//! ```json
//! {
//!   "generated_at": "2025-05-06T14:30:00Z",
//!   "count": 1,
//!   "articles": [
//!     {"title": "...", "url": "...", "source": "spiegel.de",
//!      "publish_time": "2025-05-06T14:00:00Z", "language": "german",
//!      "fact_check": null,
//!      "risk": {"score": 0.0, "category": "LOW", "source_category": null}}
//!   ]
//! }
//! ```

use crate::error::PersistenceError;
use crate::models::ResultSet;

/// Pretty-printed UTF-8 JSON, non-ASCII characters left unescaped.
pub fn render(result_set: &ResultSet) -> Result<Vec<u8>, PersistenceError> {
    let mut out = serde_json::to_vec_pretty(result_set)?;
    out.push(b'\n');
    Ok(out)
}
