use serde::{Deserialize, Serialize};

pub mod sync {
    use super::*;

    /// Path appended to the configured endpoint for uploads.
    ///
    /// `POST {endpoint}/insertDataEvent` with a JSON array of
    /// [`RemoteEvent`] as the body.
    pub const UPLOAD_PATH: &str = "insertDataEvent";

    /// Path appended to the configured endpoint for downloads.
    ///
    /// `GET {endpoint}/getAllDataEvent?month=M&year=Y`; the response body
    /// must be a JSON array of [`RemoteEvent`].
    pub const DOWNLOAD_PATH: &str = "getAllDataEvent";

    /// One event as it travels over the wire, in both directions.
    ///
    /// `category` carries what the local ledger stores as `tag`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RemoteEvent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        pub amount: i64,
        pub category: String,
        /// 4-digit `HHMM`.
        pub time: String,
        /// Owning day key, `YYYY-MM-DD`.
        pub date: String,
        /// `DD/MM/YYYY HH:MM` display string; uploads carry it, downloads
        /// may not.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub formatted_time: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub user_pay: Option<String>,
    }

    /// Query string of a download request.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DownloadQuery {
        pub month: u32,
        pub year: i32,
    }
}
