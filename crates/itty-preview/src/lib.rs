//! Itty Preview - link previews for documents that live in their URL.
//!
//! The whole document is encoded in the URL path, so there is nothing to
//! look up server-side. Browsers get the client app, which decodes the path
//! itself. Link-preview crawlers cannot run that app, so for them the server
//! decodes the path and answers with Open Graph / Twitter-card tags.
//!
//! # Architecture
//!
//! - **Decode**: pretty-segment, Base64 and percent decoding with literal fallback
//! - **Metadata**: path → ordered field mapping
//! - **Render**: field mapping → meta tags, escaped by maud
//! - **Crawler**: user-agent gates (preview crawlers, block list)
//! - **Rasterize**: inline SVG payloads → JPEG via resvg
//!
//! # URL Pattern
//!
//! ```text
//! GET /{title}/{key}/{value}/.../
//! ```
//!
//! Recognised keys: `s` site name, `t` type, `d` description, `c` theme
//! color, `i`/`iw`/`ih` image, `v`/`vw`/`vh` video, `f` favicon.

pub mod config;
pub mod crawler;
pub mod decode;
pub mod error;
pub mod metadata;
pub mod rasterize;
pub mod render;
pub mod routes;
pub mod state;

pub use config::Config;
pub use metadata::Metadata;
pub use routes::router;
pub use state::AppState;
