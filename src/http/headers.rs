//! HTTP header map shared by [`RequestContext`](crate::http::request::RequestContext)
//! and [`HttpResponse`](crate::http::response::HttpResponse).
//!
//! Names are stored exactly as received. Lookups are case-sensitive, so a
//! client sending `content-length` is not seen by a lookup for
//! `Content-Length`. Setting a name that already exists overwrites its value;
//! there is no multi-value support.
//!
//! Entries keep arrival order, which only matters when the map is written
//! back out.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    headers: IndexMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    pub fn set_raw(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.headers.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in &self.headers {
            result.push_str(&format!("{}: {}\r\n", name, value));
        }
        result
    }
}
