//! Platform abstraction layer
//!
//! Browser resource resolution that does not need a browser to reason about:
//! - Chart links pasted from GitHub pages
//! - Audio source candidates for a chart id

/// Local audio directory served next to the page
pub const LOCAL_AUDIO_DIR: &str = "assets";

const ASSET_DELIVERY_URL: &str = "https://assetdelivery.roblox.com/v1/asset/?id=";
const CORS_PROXY_URL: &str = "https://api.allorigins.win/raw?url=";

/// Raw-content URL for a pasted GitHub link, or `None` if the text is not one
pub fn chart_fetch_url(input: &str) -> Option<String> {
    let input = input.trim();
    if !input.contains("github") {
        return None;
    }
    Some(
        input
            .replacen("github.com", "raw.githubusercontent.com", 1)
            .replacen("/blob/", "/", 1),
    )
}

/// Where the music for a chart may come from, in preference order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSources {
    /// Bundled file, probed first
    pub local: String,
    /// Remote asset through a CORS proxy
    pub remote: String,
}

impl AudioSources {
    pub fn for_chart(id: &str) -> Self {
        let asset = format!("{ASSET_DELIVERY_URL}{id}");
        Self {
            local: format!("{LOCAL_AUDIO_DIR}/{id}.mp3"),
            remote: format!("{CORS_PROXY_URL}{}", urlencoding::encode(&asset)),
        }
    }
}
