#![doc = include_str!("../README.md")]

mod conflict;
mod error;
mod generator;
mod merge;
mod naming;
mod options;
mod profile;
mod prune;
mod report;
mod session;
mod source;
mod writer;

pub use conflict::{ConflictResolver, Decision};
pub use error::{Error, Result};
pub use generator::Generator;
pub use merge::merge;
pub use naming::{DEFAULT_TEMPLATE, NameResolver, validate_profile_name};
pub use options::MergeOptions;
pub use profile::{
    AccountProfile, Profile, RenderMode, SectionFields, SsoSession, ToSection, keys,
    normalize_name,
};
pub use prune::{is_generated, prune, section_start_url};
pub use report::{
    Duplicate, Level, MergeReport, NullReporter, RecordingReporter, Reporter, SkippedProfile,
    TracingReporter,
};
pub use session::SessionAssigner;
pub use source::{JsonSource, Source, SourceError, StaticSource};
pub use ssoconfig_ini::{Document, IniError, Section};
pub use writer::{report_duplicates, write_section};
