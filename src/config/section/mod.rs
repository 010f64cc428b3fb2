//! Configuration section definitions.
//!
//! Each module corresponds to a section in `lathe.toml`:
//!
//! | Module     | TOML Section   | Purpose                                   |
//! |------------|----------------|-------------------------------------------|
//! | `site`     | `[site]`       | Site metadata, passed to templates        |
//! | `build`    | `[build]`      | Source/output paths, ignore globs         |
//! | `markdown` | `[markdown]`   | Markdown extensions                       |
//! | `layouts`  | `[layouts]`    | Template directories and matching         |
//! | `sass`     | `[sass]`       | Sass compilation output and load paths    |
//! | `style`    | `[style]`      | CSS prefixing targets                     |
//! | `beautify` | `[beautify]`   | Output indentation                        |
//! | `content`  | `[content]`    | Content record export                     |
//! | `serve`    | `[serve]`      | Development server                        |
//! | `deploy`   | `[deploy]`     | Deployable build rewriting                |

mod beautify;
mod build;
mod content;
mod deploy;
mod layouts;
mod markdown;
mod sass;
mod serve;
mod site;
mod style;

pub use beautify::BeautifyConfig;
pub use build::BuildConfig;
pub use content::ContentConfig;
pub use deploy::DeployConfig;
pub use layouts::LayoutsConfig;
pub use markdown::MarkdownConfig;
pub use sass::SassConfig;
pub use serve::ServeConfig;
pub use site::SiteSection;
pub use style::StyleConfig;
