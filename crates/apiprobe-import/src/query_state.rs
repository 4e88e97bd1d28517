// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Import state carried in the navigable URL's query string.

use std::borrow::Cow;
use std::fmt;
use std::sync::Mutex;
use url::Url;

/// Query key for the service description URL.
pub const SERVICE_URL_KEY: &str = "serviceURL";
/// Query key for the import mode.
pub const IMPORT_MODE_KEY: &str = "importModeType";
/// Query key for the "already reconciled" marker.
pub const LOGON_KEY: &str = "logon";

/// How the service description was provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportMode {
    /// Fetched from a URL.
    Url,
    /// Uploaded as a file.
    File,
    /// Pasted as text.
    Text,
    /// Any other value, kept verbatim.
    Other(String),
}

impl ImportMode {
    /// Decode a query value.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "url" => Self::Url,
            "file" => Self::File,
            "text" => Self::Text,
            other => Self::Other(other.to_string()),
        }
    }

    /// Query value for this mode.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url => "url",
            Self::File => "file",
            Self::Text => "text",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three import keys of the query string. Other keys are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportQueryState {
    /// `serviceURL`.
    pub service_url: Option<String>,
    /// `importModeType`.
    pub import_mode: Option<ImportMode>,
    /// `logon`; `"yes"` once the initial reconciliation was attempted.
    pub logon: Option<String>,
}

impl ImportQueryState {
    /// Read the import keys from `url`. Later duplicates win.
    pub fn from_url(url: &Url) -> Self {
        let mut state = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                SERVICE_URL_KEY => state.service_url = Some(value.into_owned()),
                IMPORT_MODE_KEY => state.import_mode = Some(ImportMode::parse(&value)),
                LOGON_KEY => state.logon = Some(value.into_owned()),
                _ => {}
            }
        }
        state
    }

    /// True when `logon` is present and non-empty.
    pub fn logon_set(&self) -> bool {
        self.logon.as_deref().is_some_and(|l| !l.is_empty())
    }

    /// URL the startup reconciliation should fetch, if any.
    pub fn fetch_target(&self) -> Option<&str> {
        let url = self.service_url.as_deref().filter(|u| !u.is_empty())?;
        (self.import_mode == Some(ImportMode::Url) && !self.logon_set()).then_some(url)
    }

    /// Write the import keys into `url`. Keys set to `None` are removed;
    /// existing keys keep their position and unrelated pairs are untouched.
    pub fn write_to(&self, url: &mut Url) {
        let own: [(&str, Option<Cow<'_, str>>); 3] = [
            (SERVICE_URL_KEY, self.service_url.as_deref().map(Cow::Borrowed)),
            (
                IMPORT_MODE_KEY,
                self.import_mode.as_ref().map(|m| Cow::Borrowed(m.as_str())),
            ),
            (LOGON_KEY, self.logon.as_deref().map(Cow::Borrowed)),
        ];
        let mut written = [false; 3];
        let mut pairs: Vec<(String, String)> = Vec::new();

        for (key, value) in url.query_pairs() {
            match own.iter().position(|(k, _)| *k == key) {
                Some(idx) => {
                    if !written[idx] {
                        written[idx] = true;
                        if let Some(v) = &own[idx].1 {
                            pairs.push((key.into_owned(), v.to_string()));
                        }
                    }
                }
                None => pairs.push((key.into_owned(), value.into_owned())),
            }
        }
        for (idx, (key, value)) in own.iter().enumerate() {
            if let (false, Some(v)) = (written[idx], value) {
                pairs.push(((*key).to_string(), v.to_string()));
            }
        }

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }
}

/// Read/replace access to the navigable URL's import state.
pub trait QueryLocation: Send + Sync {
    /// Current import state.
    fn import_query(&self) -> ImportQueryState;
    /// Replace the import keys, preserving everything else in the URL.
    fn set_import_query(&self, state: &ImportQueryState);
}

/// A location held in memory, for hosts without a real address bar.
pub struct MemoryLocation {
    url: Mutex<Url>,
}

impl MemoryLocation {
    /// Location starting at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url: Mutex::new(url),
        }
    }

    /// Parse `raw` as the starting URL.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::new)
    }

    /// Snapshot of the current URL.
    pub fn current_url(&self) -> Url {
        self.url.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl QueryLocation for MemoryLocation {
    fn import_query(&self) -> ImportQueryState {
        ImportQueryState::from_url(&self.url.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn set_import_query(&self, state: &ImportQueryState) {
        let mut url = self.url.lock().unwrap_or_else(|e| e.into_inner());
        state.write_to(&mut url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_of(raw: &str) -> ImportQueryState {
        ImportQueryState::from_url(&Url::parse(raw).unwrap())
    }

    #[test]
    fn reads_import_keys() {
        let state = state_of("http://app/?importModeType=url&serviceURL=http://x/api.json&logon=yes");
        assert_eq!(state.import_mode, Some(ImportMode::Url));
        assert_eq!(state.service_url.as_deref(), Some("http://x/api.json"));
        assert!(state.logon_set());
        assert_eq!(state.fetch_target(), None);
    }

    #[test]
    fn fetch_target_needs_url_mode_service_url_and_no_logon() {
        let fetch = state_of("http://app/?importModeType=url&serviceURL=http%3A%2F%2Fx%2Fa.json");
        assert_eq!(fetch.fetch_target(), Some("http://x/a.json"));

        let empty_logon = state_of("http://app/?importModeType=url&serviceURL=http://x/a&logon=");
        assert_eq!(empty_logon.fetch_target(), Some("http://x/a"));

        assert_eq!(state_of("http://app/?importModeType=url").fetch_target(), None);
        assert_eq!(
            state_of("http://app/?importModeType=file&serviceURL=http://x/a").fetch_target(),
            None
        );
        assert_eq!(
            state_of("http://app/?importModeType=url&serviceURL=").fetch_target(),
            None
        );
    }

    #[test]
    fn unknown_mode_is_kept_verbatim() {
        let state = state_of("http://app/?importModeType=git");
        assert_eq!(state.import_mode, Some(ImportMode::Other("git".into())));
        assert_eq!(state.import_mode.unwrap().to_string(), "git");
    }

    #[test]
    fn write_keeps_positions_and_unrelated_pairs() {
        let mut url = Url::parse("http://app/path?a=1&logon=yes&serviceURL=old&z=2").unwrap();
        let mut state = ImportQueryState::from_url(&url);
        state.logon = None;
        state.service_url = Some("http://x/new.json".into());
        state.write_to(&mut url);

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("a".into(), "1".into()),
                ("serviceURL".into(), "http://x/new.json".into()),
                ("z".into(), "2".into()),
            ]
        );
        assert_eq!(url.path(), "/path");
    }

    #[test]
    fn write_appends_missing_keys_and_drops_empty_query() {
        let mut url = Url::parse("http://app/").unwrap();
        ImportQueryState {
            service_url: Some("u".into()),
            import_mode: Some(ImportMode::Url),
            logon: None,
        }
        .write_to(&mut url);
        assert_eq!(url.query(), Some("serviceURL=u&importModeType=url"));

        let mut url = Url::parse("http://app/?logon=yes").unwrap();
        ImportQueryState::default().write_to(&mut url);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn memory_location_round_trips_state() {
        let location = MemoryLocation::parse("http://app/?logon=yes&keep=1").unwrap();
        let mut state = location.import_query();
        state.logon = None;
        location.set_import_query(&state);
        assert_eq!(location.current_url().query(), Some("keep=1"));
    }
}
