// meteoblue_relay - HTTP relay for daily temperatures from the Meteoblue API
//
// Copyright 2024 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use std::fmt;

pub const DEFAULT_API_URL: &str = "http://my.meteoblue.com/packages/basic-day";

/// Settings shared by every relay request, fixed at startup.
///
/// A missing API key is not an error here: the relay still starts and reports the
/// problem on each request instead.
#[derive(Clone)]
pub struct RelayConfig {
    api_key: Option<String>,
    api_url: String,
}

impl RelayConfig {
    pub fn new<S: Into<String>>(api_key: Option<String>, api_url: S) -> Self {
        RelayConfig {
            api_key: api_key.filter(|k| !k.is_empty()),
            api_url: api_url.into(),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .finish()
    }
}
