//! Request -> response entries inside a partition.
//!
//! Entries are immutable snapshots; a later `put` for the same request
//! replaces the whole row. Only GET requests are stored or matched.

use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};
use url::Url;

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::http::{Headers, Request, Response};

/// A stored entry as listed by [`CacheDb::entries`].
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub method: String,
    pub url: String,
    pub stored_at: String,
    pub response: Response,
}

/// Row shape shared by every entry query.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
    response_url: Option<String>,
    response_type: String,
    stored_at: String,
}

impl EntryRow {
    fn encode(request: &Request, response: &Response, stored_at: &str) -> Result<Self, Error> {
        let mut url = request.url.clone();
        url.set_fragment(None);
        Ok(Self {
            key_hash: compute_request_key(&request.method, &url),
            method: request.method.to_ascii_uppercase(),
            url: url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json: serde_json::to_string(&response.headers)?,
            body: response.body.to_vec(),
            response_url: response.url.as_ref().map(Url::to_string),
            response_type: response.response_type.as_str().to_string(),
            stored_at: stored_at.to_string(),
        })
    }

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key_hash: row.get(0)?,
            method: row.get(1)?,
            url: row.get(2)?,
            status: row.get(3)?,
            status_text: row.get(4)?,
            headers_json: row.get(5)?,
            body: row.get(6)?,
            response_url: row.get(7)?,
            response_type: row.get(8)?,
            stored_at: row.get(9)?,
        })
    }

    fn into_entry(self) -> Result<CachedEntry, Error> {
        let headers: Headers = serde_json::from_str(&self.headers_json)?;
        let url = self
            .response_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| Error::CorruptEntry(format!("{}: {e}", self.key_hash)))?;

        Ok(CachedEntry {
            method: self.method,
            url: self.url,
            stored_at: self.stored_at,
            response: Response {
                status: self.status,
                status_text: self.status_text,
                headers,
                body: Bytes::from(self.body),
                url,
                response_type: self.response_type.parse()?,
            },
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT key_hash, method, url, status, status_text, headers_json, body,
        response_url, response_type, stored_at FROM entries";

const UPSERT: &str = "INSERT INTO entries (
        partition, key_hash, method, url, status, status_text, headers_json, body,
        response_url, response_type, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(partition, key_hash) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        status = excluded.status,
        status_text = excluded.status_text,
        headers_json = excluded.headers_json,
        body = excluded.body,
        response_url = excluded.response_url,
        response_type = excluded.response_type,
        stored_at = excluded.stored_at";

fn upsert(conn: &rusqlite::Connection, partition: &str, row: &EntryRow) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![partition, row.stored_at],
    )?;
    conn.execute(
        UPSERT,
        params![
            partition,
            row.key_hash,
            row.method,
            row.url,
            row.status,
            row.status_text,
            row.headers_json,
            row.body,
            row.response_url,
            row.response_type,
            row.stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Store a response for a request, opening the partition if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for non-GET requests.
    pub async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let pair = [(request.clone(), response.clone())];
        self.put_all(partition, &pair).await
    }

    /// Store several entries in one transaction; either all land or none do.
    pub async fn put_all(&self, partition: &str, pairs: &[(Request, Response)]) -> Result<(), Error> {
        let stored_at = chrono::Utc::now().to_rfc3339();
        let rows = pairs
            .iter()
            .map(|(request, response)| {
                if !request.is_get() {
                    return Err(Error::InvalidInput(format!(
                        "only GET requests can be cached, got {} {}",
                        request.method, request.url
                    )));
                }
                EntryRow::encode(request, response, &stored_at)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    upsert(&tx, &partition, row)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the response stored for `request` in one partition.
    ///
    /// Non-GET requests never match.
    pub async fn match_request(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }
        self.match_url(partition, &request.url).await
    }

    /// Look up the response stored for a GET of `url` in one partition.
    pub async fn match_url(&self, partition: &str, url: &Url) -> Result<Option<Response>, Error> {
        let partition = partition.to_string();
        let key_hash = compute_request_key("GET", url);
        let row = self
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE partition = ?1 AND key_hash = ?2"))?;
                match stmt.query_row(params![partition, key_hash], EntryRow::read) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(|r| r.into_entry().map(|entry| entry.response)).transpose()
    }

    /// Every entry in a partition, in insertion order.
    pub async fn entries(&self, partition: &str) -> Result<Vec<CachedEntry>, Error> {
        let partition = partition.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<EntryRow>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE partition = ?1 ORDER BY rowid"))?;
                let rows = stmt
                    .query_map(params![partition], EntryRow::read)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }
}
